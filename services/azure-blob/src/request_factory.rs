use blobstore_core::time::{format_http_date, now, DateTime};
use blobstore_core::Result;
use bytes::Bytes;
use http::header::{CONTENT_LENGTH, CONTENT_TYPE};
use http::{HeaderMap, HeaderValue, Method, Request};
use log::debug;

use crate::constants::*;
use crate::{Config, Credential, RequestSigner};

/// RequestFactory builds signed requests against one blob endpoint.
///
/// A factory is bound to a single credential set and can be shared freely
/// between calls.
#[derive(Debug, Clone)]
pub struct RequestFactory {
    credential: Credential,
    endpoint: String,
    signer: RequestSigner,

    #[cfg(test)]
    time: Option<DateTime>,
}

impl RequestFactory {
    /// Create a factory for `endpoint`, which must not end with `/`.
    pub fn new(credential: Credential, endpoint: impl Into<String>) -> Self {
        Self {
            credential,
            endpoint: endpoint.into(),
            signer: RequestSigner::new(),

            #[cfg(test)]
            time: None,
        }
    }

    /// Create a factory out of the credential and endpoint of `config`.
    pub fn from_config(config: &Config) -> Result<Self> {
        Ok(Self::new(config.credential()?, config.endpoint_or_default()?))
    }

    /// Specify the signing time.
    ///
    /// # Note
    ///
    /// We should always take current time to sign requests.
    /// Only use this function for testing.
    #[cfg(test)]
    pub fn with_time(mut self, time: DateTime) -> Self {
        self.time = Some(time);
        self
    }

    /// Blob service endpoint requests are sent to.
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Credential requests are signed with.
    pub fn credential(&self) -> &Credential {
        &self.credential
    }

    /// Build a signed GET request for `{endpoint}/{url_suffix}`.
    pub fn get(&self, url_suffix: &str, headers: HeaderMap) -> Result<Request<Bytes>> {
        self.build(Method::GET, url_suffix, headers, None)
    }

    /// Build a signed DELETE request for `{endpoint}/{url_suffix}`.
    pub fn delete(&self, url_suffix: &str, headers: HeaderMap) -> Result<Request<Bytes>> {
        self.build(Method::DELETE, url_suffix, headers, None)
    }

    /// Build a signed PUT request for `{endpoint}/{url_suffix}`.
    ///
    /// `entity` is the body and its content type. The `Content-Length` of a
    /// non-empty body is signed but not left on the request: the transport
    /// sets it from the body it sends. An empty body or a PUT without entity
    /// keeps its signed `Content-Length: 0`, since transports send no length
    /// for an empty body.
    pub fn put(
        &self,
        url_suffix: &str,
        headers: HeaderMap,
        entity: Option<(Bytes, &str)>,
    ) -> Result<Request<Bytes>> {
        self.build(Method::PUT, url_suffix, headers, entity)
    }

    fn build(
        &self,
        method: Method,
        url_suffix: &str,
        mut headers: HeaderMap,
        entity: Option<(Bytes, &str)>,
    ) -> Result<Request<Bytes>> {
        let url = format!("{}/{}", self.endpoint, url_suffix);

        headers.insert(X_MS_DATE, format_http_date(self.signing_time()).parse()?);
        headers.insert(X_MS_VERSION, HeaderValue::from_static(AZURE_VERSION));

        let mut strip_content_length = false;
        let body = match entity {
            Some((content, content_type)) => {
                headers.insert(CONTENT_LENGTH, HeaderValue::from(content.len()));
                headers.insert(CONTENT_TYPE, content_type.parse()?);
                strip_content_length = !content.is_empty();
                content
            }
            None => {
                if method == Method::PUT {
                    headers.insert(CONTENT_LENGTH, HeaderValue::from_static("0"));
                }
                Bytes::new()
            }
        };

        let mut req = Request::builder().method(method).uri(url).body(body)?;
        *req.headers_mut() = headers;

        let (mut parts, body) = req.into_parts();
        self.signer.sign(&mut parts, &self.credential)?;
        if strip_content_length {
            parts.headers.remove(CONTENT_LENGTH);
        }

        debug!("built request: {} {}", parts.method, parts.uri);
        Ok(Request::from_parts(parts, body))
    }

    fn signing_time(&self) -> DateTime {
        #[cfg(test)]
        let pinned = self.time;
        #[cfg(not(test))]
        let pinned: Option<DateTime> = None;

        pinned.unwrap_or_else(now)
    }
}
