use std::fmt::{Debug, Formatter};
use std::io::Cursor;
use std::path::PathBuf;
use std::pin::Pin;
use std::task::{Context, Poll};

use blobstore_core::{Error, Result};
use bytes::Bytes;
use chrono::{DateTime, Utc};
use tokio::io::{AsyncRead, AsyncReadExt, ReadBuf};

use crate::constants::{APPLICATION_OCTET_STREAM, TEXT_PLAIN_UTF8};

/// Status of a container as seen by this account.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContainerStatus {
    /// The container exists and this account can list it.
    Mine,
    /// No container with this name exists.
    DoesNotExist,
    /// The name is taken by another account.
    ///
    /// Azure gives no way to tell this apart through a listing, so the
    /// Azure backend never returns it.
    AlreadyClaimed,
}

/// Listing entry of a blob.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlobDescriptor {
    /// Container the blob was listed from.
    pub container_name: String,
    /// Blob name.
    pub name: String,
    /// Entity tag, empty if the service did not return one.
    pub etag: String,
    /// Last modified time.
    pub last_modified: Option<DateTime<Utc>>,
    /// Size in bytes.
    pub content_length: Option<u64>,
}

/// Owned async reader over the content of a blob.
///
/// Dropping the stream releases it.
pub struct BlobStream {
    inner: Box<dyn AsyncRead + Send + Unpin>,
}

impl Debug for BlobStream {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BlobStream").finish_non_exhaustive()
    }
}

impl BlobStream {
    /// Wrap an async reader.
    pub fn new(reader: impl AsyncRead + Send + Unpin + 'static) -> Self {
        Self {
            inner: Box::new(reader),
        }
    }

    /// Stream over bytes already in memory.
    pub fn from_bytes(content: impl Into<Bytes>) -> Self {
        Self::new(Cursor::new(content.into()))
    }

    /// Read the stream to its end and release it.
    pub async fn read_all(mut self) -> std::io::Result<Bytes> {
        let mut buf = Vec::new();
        self.read_to_end(&mut buf).await?;
        Ok(buf.into())
    }
}

impl AsyncRead for BlobStream {
    fn poll_read(
        mut self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &mut ReadBuf<'_>,
    ) -> Poll<std::io::Result<()>> {
        Pin::new(&mut self.inner).poll_read(cx, buf)
    }
}

/// Content of a blob.
#[derive(Debug)]
pub enum Payload {
    /// Raw bytes in memory.
    Bytes(Bytes),
    /// UTF-8 text in memory.
    Text(String),
    /// Content of a local file.
    File(PathBuf),
    /// Content of an async reader.
    Stream(BlobStream),
}

impl Payload {
    /// Payload read from the local file at `path` when it's sent.
    pub fn file(path: impl Into<PathBuf>) -> Self {
        Payload::File(path.into())
    }

    /// Payload read from `reader` when it's sent.
    pub fn stream(reader: impl AsyncRead + Send + Unpin + 'static) -> Self {
        Payload::Stream(BlobStream::new(reader))
    }

    /// Content type sent with this payload.
    pub fn content_type(&self) -> &'static str {
        match self {
            Payload::Text(_) => TEXT_PLAIN_UTF8,
            _ => APPLICATION_OCTET_STREAM,
        }
    }

    /// Collect the full content.
    ///
    /// The body is signed with its exact length, so it has to be known
    /// before the request is built.
    pub async fn into_bytes(self) -> Result<Bytes> {
        match self {
            Payload::Bytes(bs) => Ok(bs),
            Payload::Text(s) => Ok(Bytes::from(s)),
            Payload::File(path) => tokio::fs::read(&path).await.map(Bytes::from).map_err(|e| {
                Error::request_invalid("failed to read payload file")
                    .with_context("path", path.display().to_string())
                    .with_source(e)
            }),
            Payload::Stream(stream) => stream.read_all().await.map_err(|e| {
                Error::request_invalid("failed to read payload stream").with_source(e)
            }),
        }
    }

    /// Turn the payload into a stream.
    pub async fn into_stream(self) -> Result<BlobStream> {
        match self {
            Payload::Bytes(bs) => Ok(BlobStream::from_bytes(bs)),
            Payload::Text(s) => Ok(BlobStream::from_bytes(s)),
            Payload::File(path) => {
                let f = tokio::fs::File::open(&path).await.map_err(|e| {
                    Error::request_invalid("failed to open payload file")
                        .with_context("path", path.display().to_string())
                        .with_source(e)
                })?;
                Ok(BlobStream::new(f))
            }
            Payload::Stream(stream) => Ok(stream),
        }
    }
}

impl From<&str> for Payload {
    fn from(s: &str) -> Self {
        Payload::Text(s.to_string())
    }
}

impl From<String> for Payload {
    fn from(s: String) -> Self {
        Payload::Text(s)
    }
}

impl From<Vec<u8>> for Payload {
    fn from(bs: Vec<u8>) -> Self {
        Payload::Bytes(bs.into())
    }
}

impl From<&'static [u8]> for Payload {
    fn from(bs: &'static [u8]) -> Self {
        Payload::Bytes(Bytes::from_static(bs))
    }
}

impl From<Bytes> for Payload {
    fn from(bs: Bytes) -> Self {
        Payload::Bytes(bs)
    }
}

impl From<BlobStream> for Payload {
    fn from(stream: BlobStream) -> Self {
        Payload::Stream(stream)
    }
}

/// A named blob and its content.
#[derive(Debug)]
pub struct Blob {
    name: String,
    payload: Payload,
}

impl Blob {
    /// Create a new blob.
    pub fn new(name: impl Into<String>, payload: impl Into<Payload>) -> Self {
        Self {
            name: name.into(),
            payload: payload.into(),
        }
    }

    /// Blob name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Blob content.
    pub fn payload(&self) -> &Payload {
        &self.payload
    }

    /// Take the content out of the blob.
    pub fn into_payload(self) -> Payload {
        self.payload
    }
}
