//! Parsing of `List Containers` and `List Blobs` response bodies.

use blobstore_core::time::parse_http_date;
use blobstore_core::{Error, Result};
use quick_xml::de;
use serde::Deserialize;

use crate::BlobDescriptor;

#[derive(Default, Debug, Deserialize)]
#[serde(default, rename_all = "PascalCase")]
struct EnumerationResults {
    containers: Containers,
    blobs: Blobs,
}

#[derive(Default, Debug, Deserialize)]
#[serde(default, rename_all = "PascalCase")]
struct Containers {
    container: Vec<ContainerEntry>,
}

#[derive(Default, Debug, Deserialize)]
#[serde(default, rename_all = "PascalCase")]
struct ContainerEntry {
    name: String,
}

#[derive(Default, Debug, Deserialize)]
#[serde(default, rename_all = "PascalCase")]
struct Blobs {
    blob: Vec<BlobEntry>,
}

/// Blob entry in either the `Properties` layout or the older flat layout.
#[derive(Default, Debug, Deserialize)]
#[serde(default, rename_all = "PascalCase")]
struct BlobEntry {
    name: String,
    properties: Option<BlobProperties>,

    etag: Option<String>,
    last_modified: Option<String>,
    size: Option<String>,
}

#[derive(Default, Debug, Deserialize)]
#[serde(default)]
struct BlobProperties {
    #[serde(rename = "Last-Modified")]
    last_modified: Option<String>,
    #[serde(rename = "Etag")]
    etag: Option<String>,
    #[serde(rename = "Content-Length")]
    content_length: Option<String>,
}

fn parse_enumeration(body: &[u8]) -> Result<EnumerationResults> {
    let text = std::str::from_utf8(body).map_err(|e| {
        Error::response_handling("list response is not valid utf-8").with_source(e)
    })?;
    // Azure may prefix XML bodies with a byte order mark.
    let text = text.trim_start_matches('\u{feff}');

    de::from_str(text)
        .map_err(|e| Error::response_handling("failed to parse list response").with_source(e))
}

/// Container names of a `List Containers` response, in listing order.
pub fn parse_container_names(body: &[u8]) -> Result<Vec<String>> {
    let results = parse_enumeration(body)?;

    Ok(results
        .containers
        .container
        .into_iter()
        .map(|c| c.name)
        .collect())
}

/// Blob descriptors of a `List Blobs` response, in listing order.
pub fn parse_blob_descriptors(container: &str, body: &[u8]) -> Result<Vec<BlobDescriptor>> {
    let results = parse_enumeration(body)?;

    results
        .blobs
        .blob
        .into_iter()
        .map(|entry| descriptor(container, entry))
        .collect()
}

fn descriptor(container: &str, entry: BlobEntry) -> Result<BlobDescriptor> {
    let props = entry.properties.unwrap_or_default();

    let etag = props.etag.or(entry.etag).unwrap_or_default();
    let last_modified = match non_empty(props.last_modified.or(entry.last_modified)) {
        Some(v) => Some(parse_http_date(&v).map_err(|e| {
            Error::response_handling("invalid Last-Modified in list response")
                .with_context("object", entry.name.clone())
                .with_source(e)
        })?),
        None => None,
    };
    let content_length = match non_empty(props.content_length.or(entry.size)) {
        Some(v) => Some(v.parse::<u64>().map_err(|e| {
            Error::response_handling("invalid Content-Length in list response")
                .with_context("object", entry.name.clone())
                .with_source(e)
        })?),
        None => None,
    };

    Ok(BlobDescriptor {
        container_name: container.to_string(),
        name: entry.name,
        etag,
        last_modified,
        content_length,
    })
}

fn non_empty(v: Option<String>) -> Option<String> {
    v.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}
