//! Reqwest-based HTTP transport for blobstore.
//!
//! This crate provides `ReqwestHttpSend`, which implements the `HttpSend`
//! trait from `blobstore_core` on top of a shared `reqwest::Client`.
//!
//! Connection pooling, TLS and timeouts are configured on the client:
//!
//! ```no_run
//! use blobstore_core::Context;
//! use blobstore_http_send_reqwest::ReqwestHttpSend;
//! use std::time::Duration;
//!
//! let client = reqwest::Client::builder()
//!     .timeout(Duration::from_secs(30))
//!     .build()
//!     .unwrap();
//! let ctx = Context::new().with_http_send(ReqwestHttpSend::new(client));
//! ```

use async_trait::async_trait;
use blobstore_core::{Error, HttpSend, ReasonPhrase, Result};
use bytes::Bytes;
use http_body_util::BodyExt;
use log::debug;
use reqwest::{Client, Request};

/// HttpSend implementation backed by `reqwest::Client`.
#[derive(Debug, Default, Clone)]
pub struct ReqwestHttpSend {
    client: Client,
}

impl ReqwestHttpSend {
    /// Create a new ReqwestHttpSend with a reqwest::Client.
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl HttpSend for ReqwestHttpSend {
    async fn http_send(&self, req: http::Request<Bytes>) -> Result<http::Response<Bytes>> {
        debug!("sending request: {} {}", req.method(), req.uri());

        let req = Request::try_from(req).map_err(|e| {
            Error::request_invalid("failed to convert http request").with_source(e)
        })?;
        let resp: http::Response<_> = self
            .client
            .execute(req)
            .await
            .map_err(|e| Error::communication("failed to send http request").with_source(e))?
            .into();

        let (mut parts, body) = resp.into_parts();
        if let Some(reason) = parts.extensions.remove::<hyper::ext::ReasonPhrase>() {
            parts.extensions.insert(ReasonPhrase(
                String::from_utf8_lossy(reason.as_bytes()).into_owned(),
            ));
        }

        let bs = BodyExt::collect(body)
            .await
            .map(|buf| buf.to_bytes())
            .map_err(|e| Error::communication("failed to read response body").with_source(e))?;
        Ok(http::Response::from_parts(parts, bs))
    }
}
