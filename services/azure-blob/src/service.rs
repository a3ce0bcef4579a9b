use std::future::Future;

use blobstore_core::{Context, Error, ErrorKind, Result};
use bytes::Bytes;
use http::{HeaderMap, HeaderValue, Request, Response};
use log::debug;
use percent_encoding::utf8_percent_encode;

use crate::constants::*;
use crate::{response, Blob, BlobDescriptor, ContainerStatus, RequestFactory};

/// AzureRestService executes blob operations against the Azure Blob REST API.
///
/// Every operation builds one signed request, sends it once through the
/// [`Context`] transport and maps the response. Failures carry the operation
/// name and the container/object they were about.
#[derive(Debug, Clone)]
pub struct AzureRestService {
    ctx: Context,
    factory: RequestFactory,
}

impl AzureRestService {
    /// Create a new service.
    pub fn new(ctx: Context, factory: RequestFactory) -> Self {
        Self { ctx, factory }
    }

    /// Request factory of this service.
    pub fn factory(&self) -> &RequestFactory {
        &self.factory
    }

    /// Create container `name`.
    pub async fn create_container(&self, name: &str) -> Result<()> {
        with_context("create_container", &[("container", name)], async {
            let url = format!("{}?restype=container", encode_container(name)?);
            let req = self.factory.put(&url, HeaderMap::new(), None)?;
            response::create_container(self.send(req).await?)
        })
        .await
    }

    /// Delete container `name`.
    pub async fn delete_container(&self, name: &str) -> Result<()> {
        with_context("delete_container", &[("container", name)], async {
            let url = format!("{}?restype=container", encode_container(name)?);
            let req = self.factory.delete(&url, HeaderMap::new())?;
            response::delete_container(self.send(req).await?)
        })
        .await
    }

    /// List the names of all containers of the account.
    pub async fn list_containers(&self) -> Result<Vec<String>> {
        with_context("list_containers", &[], async {
            let req = self.factory.get("?comp=list", HeaderMap::new())?;
            response::list_containers(self.send(req).await?)
        })
        .await
    }

    /// Delete blob `name` in `container`.
    pub async fn delete_object(&self, container: &str, name: &str) -> Result<()> {
        with_context(
            "delete_object",
            &[("container", container), ("object", name)],
            async {
                let req = self
                    .factory
                    .delete(&blob_path(container, name)?, HeaderMap::new())?;
                response::delete_object(self.send(req).await?)
            },
        )
        .await
    }

    /// Upload `blob` into `container` as a block blob.
    pub async fn put_object(&self, container: &str, blob: Blob) -> Result<()> {
        let name = blob.name().to_string();
        with_context(
            "put_object",
            &[("container", container), ("object", name.as_str())],
            async {
                let url = blob_path(container, &name)?;
                let payload = blob.into_payload();
                let content_type = payload.content_type();
                let content = payload.into_bytes().await?;

                let req = self
                    .factory
                    .put(&url, block_blob_headers(), Some((content, content_type)))?;
                response::put_object(self.send(req).await?)
            },
        )
        .await
    }

    /// Download blob `name` from `container`.
    ///
    /// The returned blob holds a stream payload owned by the caller.
    pub async fn get_object(&self, container: &str, name: &str) -> Result<Blob> {
        with_context(
            "get_object",
            &[("container", container), ("object", name)],
            async {
                let req = self
                    .factory
                    .get(&blob_path(container, name)?, block_blob_headers())?;
                response::get_object(self.send(req).await?, name)
            },
        )
        .await
    }

    /// List the blobs of `container`.
    pub async fn list_container_objects(&self, container: &str) -> Result<Vec<BlobDescriptor>> {
        with_context(
            "list_container_objects",
            &[("container", container)],
            async {
                let req = self.factory.get(&list_blobs_url(container)?, HeaderMap::new())?;
                response::list_container_objects(self.send(req).await?, container)
            },
        )
        .await
    }

    /// Check whether `container` exists for this account.
    pub async fn check_container_status(&self, container: &str) -> Result<ContainerStatus> {
        with_context(
            "check_container_status",
            &[("container", container)],
            async {
                let req = self.factory.get(&list_blobs_url(container)?, HeaderMap::new())?;
                response::check_container_status(self.send(req).await?)
            },
        )
        .await
    }

    async fn send(&self, req: Request<Bytes>) -> Result<Response<Bytes>> {
        debug!("sending request: {} {}", req.method(), req.uri());

        let resp = self.ctx.http_send(req).await.map_err(|e| match e.kind() {
            ErrorKind::RequestInvalid | ErrorKind::Communication => e,
            _ => Error::communication("http transport failed").with_source(e),
        })?;

        debug!("got response: {}", resp.status());
        Ok(resp)
    }
}

async fn with_context<T>(
    operation: &'static str,
    context: &[(&'static str, &str)],
    fut: impl Future<Output = Result<T>>,
) -> Result<T> {
    fut.await.map_err(|err| {
        context
            .iter()
            .fold(err.with_operation(operation), |err, (k, v)| {
                err.with_context(*k, *v)
            })
    })
}

fn block_blob_headers() -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(X_MS_BLOB_TYPE, HeaderValue::from_static(BLOCK_BLOB));
    headers
}

fn list_blobs_url(container: &str) -> Result<String> {
    Ok(format!(
        "{}?restype=container&comp=list",
        encode_container(container)?
    ))
}

fn blob_path(container: &str, name: &str) -> Result<String> {
    if name.is_empty() {
        return Err(Error::request_invalid("object name must not be empty"));
    }

    Ok(format!(
        "{}/{}",
        encode_container(container)?,
        utf8_percent_encode(name, &AZURE_PATH_ENCODE_SET)
    ))
}

fn encode_container(name: &str) -> Result<String> {
    if name.is_empty() {
        return Err(Error::request_invalid("container name must not be empty"));
    }

    Ok(utf8_percent_encode(name, &AZURE_PATH_ENCODE_SET).to_string())
}
