use std::fmt::Write;

use blobstore_core::hash::{base64_decode, base64_hmac_sha256};
use blobstore_core::{Error, Result, SigningRequest};
use http::header::{self, HeaderName};
use http::request::Parts;
use http::HeaderValue;
use log::debug;

use crate::constants::*;
use crate::Credential;

/// RequestSigner that implements Azure Storage Shared Key authorization.
///
/// Signing is a pure function of the credential and the request: the signer
/// holds no clock and adds no headers besides `Authorization`. Callers must
/// put every header that will be sent (`x-ms-date` included) on the request
/// before signing it.
///
/// - [Authorize with Shared Key](https://docs.microsoft.com/en-us/rest/api/storageservices/authorize-with-shared-key)
#[derive(Debug, Default, Clone, Copy)]
pub struct RequestSigner;

impl RequestSigner {
    /// Create a new signer.
    pub fn new() -> Self {
        Self
    }

    /// Sign the request in place.
    ///
    /// Any existing `Authorization` header is replaced. On error the request
    /// is left as it was.
    pub fn sign(&self, parts: &mut Parts, cred: &Credential) -> Result<()> {
        let mut req = SigningRequest::build(parts)?;

        let signed = self.authorization(&req, cred).map(|value| {
            req.headers.insert(header::AUTHORIZATION, value);
        });

        req.apply(parts)?;
        signed
    }

    /// Compute the `Authorization` header value for the signing snapshot.
    pub fn authorization(&self, req: &SigningRequest, cred: &Credential) -> Result<HeaderValue> {
        let account_name = cred.account_name();
        let string_to_sign = string_to_sign(req, account_name)?;

        let key = base64_decode(cred.account_key()).map_err(|e| {
            Error::request_invalid("failed to decode account key")
                .with_context("account", account_name)
                .with_source(e)
        })?;
        let signature = base64_hmac_sha256(&key, string_to_sign.as_bytes());

        let mut value: HeaderValue = format!("SharedKey {account_name}:{signature}")
            .parse()
            .map_err(|e| {
                Error::request_invalid("failed to build authorization header").with_source(e)
            })?;
        value.set_sensitive(true);
        Ok(value)
    }
}

/// Construct string to sign
///
/// ## Format
///
/// ```text
/// VERB + "\n" +
/// Content-Encoding + "\n" +
/// Content-Language + "\n" +
/// Content-Length + "\n" +
/// Content-MD5 + "\n" +
/// Content-Type + "\n" +
/// Date + "\n" +
/// If-Modified-Since + "\n" +
/// If-Match + "\n" +
/// If-None-Match + "\n" +
/// If-Unmodified-Since + "\n" +
/// Range + "\n" +
/// CanonicalizedHeaders +
/// CanonicalizedResource;
/// ```
///
/// ## Note
///
/// Date is always empty: the request date travels in `x-ms-date`, which is
/// part of the canonicalized headers instead.
///
/// ## Reference
///
/// - [Blob, Queue, and File Services (Shared Key authorization)](https://docs.microsoft.com/en-us/rest/api/storageservices/authorize-with-shared-key)
pub fn string_to_sign(req: &SigningRequest, account_name: &str) -> Result<String> {
    let mut s = String::with_capacity(256);

    writeln!(&mut s, "{}", req.method.as_str().to_ascii_uppercase())?;
    writeln!(&mut s, "{}", req.header_get_or_default(&header::CONTENT_ENCODING)?)?;
    writeln!(&mut s, "{}", req.header_get_or_default(&header::CONTENT_LANGUAGE)?)?;
    writeln!(&mut s, "{}", req.header_get_or_default(&header::CONTENT_LENGTH)?)?;
    writeln!(
        &mut s,
        "{}",
        req.header_get_or_default(&HeaderName::from_static(CONTENT_MD5))?
    )?;
    writeln!(&mut s, "{}", req.header_get_or_default(&header::CONTENT_TYPE)?)?;
    // Date
    writeln!(&mut s)?;
    writeln!(&mut s, "{}", req.header_get_or_default(&header::IF_MODIFIED_SINCE)?)?;
    writeln!(&mut s, "{}", req.header_get_or_default(&header::IF_MATCH)?)?;
    writeln!(&mut s, "{}", req.header_get_or_default(&header::IF_NONE_MATCH)?)?;
    writeln!(
        &mut s,
        "{}",
        req.header_get_or_default(&header::IF_UNMODIFIED_SINCE)?
    )?;
    writeln!(&mut s, "{}", req.header_get_or_default(&header::RANGE)?)?;
    s.push_str(&canonicalize_header(req)?);
    s.push_str(&canonicalize_resource(req, account_name));

    debug!("string to sign: {}", &s);

    Ok(s)
}

/// Every `x-ms-*` header as `name:value\n`, sorted by name.
///
/// ## Reference
///
/// - [Constructing the canonicalized headers string](https://docs.microsoft.com/en-us/rest/api/storageservices/authorize-with-shared-key#constructing-the-canonicalized-headers-string)
fn canonicalize_header(req: &SigningRequest) -> Result<String> {
    let headers = req.header_to_vec_with_prefix("x-ms-")?;
    if headers.is_empty() {
        return Ok(String::new());
    }

    let mut s = SigningRequest::header_to_string(headers, ":", "\n");
    s.push('\n');
    Ok(s)
}

/// `/{account}{path}`, then one `\n key:value` line per query token.
///
/// Tokens are sorted as whole `key=value` strings and kept exactly as they
/// are sent.
///
/// ## Reference
///
/// - [Constructing the canonicalized resource string](https://docs.microsoft.com/en-us/rest/api/storageservices/authorize-with-shared-key#constructing-the-canonicalized-resource-string)
fn canonicalize_resource(req: &SigningRequest, account_name: &str) -> String {
    let mut s = format!("/{}{}", account_name, req.path);

    let mut query: Vec<&str> = req.query.iter().map(String::as_str).collect();
    query.sort_unstable();

    for token in query {
        s.push('\n');
        match token.split_once('=') {
            Some((k, v)) => {
                s.push_str(k);
                s.push(':');
                s.push_str(v);
            }
            None => s.push_str(token),
        }
    }

    s
}

#[cfg(test)]
mod tests {
    use super::*;
    use blobstore_core::ErrorKind;
    use pretty_assertions::assert_eq;

    const ACCOUNT: &str = "myaccount";
    // base64("key")
    const KEY: &str = "a2V5";
    const DATE: &str = "Tue, 01 Jan 2030 00:00:00 GMT";

    fn credential() -> Credential {
        Credential::new(ACCOUNT, KEY).unwrap()
    }

    fn snapshot(builder: http::request::Builder) -> SigningRequest {
        let mut parts = builder.body(()).unwrap().into_parts().0;
        SigningRequest::build(&mut parts).unwrap()
    }

    #[test]
    fn test_string_to_sign_put_blob() {
        let req = snapshot(
            http::Request::put("http://myaccount.blob.core.windows.net/c1/k1")
                .header(X_MS_DATE, DATE)
                .header(X_MS_VERSION, AZURE_VERSION)
                .header(X_MS_BLOB_TYPE, BLOCK_BLOB)
                .header("content-length", "5")
                .header("content-type", TEXT_PLAIN_UTF8),
        );

        assert_eq!(
            string_to_sign(&req, ACCOUNT).unwrap(),
            "PUT\n\n\n5\n\ntext/plain; charset=UTF-8\n\n\n\n\n\n\n\
             x-ms-blob-type:BlockBlob\n\
             x-ms-date:Tue, 01 Jan 2030 00:00:00 GMT\n\
             x-ms-version:2009-09-19\n\
             /myaccount/c1/k1"
        );
    }

    #[test]
    fn test_string_to_sign_list_containers() {
        let req = snapshot(
            http::Request::get("http://myaccount.blob.core.windows.net/?comp=list")
                .header(X_MS_DATE, DATE)
                .header(X_MS_VERSION, AZURE_VERSION),
        );

        assert_eq!(
            string_to_sign(&req, ACCOUNT).unwrap(),
            "GET\n\n\n\n\n\n\n\n\n\n\n\n\
             x-ms-date:Tue, 01 Jan 2030 00:00:00 GMT\n\
             x-ms-version:2009-09-19\n\
             /myaccount/\ncomp:list"
        );
    }

    #[test]
    fn test_date_header_is_never_signed() {
        let with_date = snapshot(
            http::Request::get("http://myaccount.blob.core.windows.net/c1/k1")
                .header("date", DATE)
                .header(X_MS_DATE, DATE),
        );
        let without_date = snapshot(
            http::Request::get("http://myaccount.blob.core.windows.net/c1/k1")
                .header(X_MS_DATE, DATE),
        );

        assert_eq!(
            string_to_sign(&with_date, ACCOUNT).unwrap(),
            string_to_sign(&without_date, ACCOUNT).unwrap()
        );
    }

    #[test]
    fn test_zero_content_length_is_signed() {
        let req = snapshot(
            http::Request::put("http://myaccount.blob.core.windows.net/c1?restype=container")
                .header("content-length", "0"),
        );

        assert!(string_to_sign(&req, ACCOUNT)
            .unwrap()
            .starts_with("PUT\n\n\n0\n"));
    }

    #[test]
    fn test_header_canonicalization_ignores_order_and_case() {
        let a = snapshot(
            http::Request::get("http://myaccount.blob.core.windows.net/c1")
                .header("X-MS-Version", AZURE_VERSION)
                .header("x-ms-meta-Zeta", " z ")
                .header("X-Ms-Date", DATE),
        );
        let b = snapshot(
            http::Request::get("http://myaccount.blob.core.windows.net/c1")
                .header("x-ms-date", DATE)
                .header("X-MS-META-ZETA", "z")
                .header("x-ms-version", AZURE_VERSION),
        );

        let sa = string_to_sign(&a, ACCOUNT).unwrap();
        assert_eq!(sa, string_to_sign(&b, ACCOUNT).unwrap());
        assert!(sa.contains(
            "x-ms-date:Tue, 01 Jan 2030 00:00:00 GMT\nx-ms-meta-zeta:z\nx-ms-version:2009-09-19\n"
        ));
    }

    #[test]
    fn test_query_canonicalization_ignores_order() {
        let a = snapshot(http::Request::get(
            "http://myaccount.blob.core.windows.net/c1?b=2&a=1",
        ));
        let b = snapshot(http::Request::get(
            "http://myaccount.blob.core.windows.net/c1?a=1&b=2",
        ));

        let sa = string_to_sign(&a, ACCOUNT).unwrap();
        assert_eq!(sa, string_to_sign(&b, ACCOUNT).unwrap());
        assert!(sa.ends_with("/myaccount/c1\na:1\nb:2"));
    }

    #[test]
    fn test_query_only_first_equal_is_replaced() {
        let req = snapshot(http::Request::get(
            "http://myaccount.blob.core.windows.net/c1?restype=container&comp=list&prefix=a=b",
        ));

        assert!(string_to_sign(&req, ACCOUNT)
            .unwrap()
            .ends_with("/myaccount/c1\ncomp:list\nprefix:a=b\nrestype:container"));
    }

    #[test]
    fn test_sign_is_deterministic() {
        let signer = RequestSigner::new();
        let build = || {
            http::Request::delete("http://myaccount.blob.core.windows.net/c1/k1")
                .header(X_MS_DATE, DATE)
                .header(X_MS_VERSION, AZURE_VERSION)
                .body(())
                .unwrap()
                .into_parts()
                .0
        };

        let mut first = build();
        let mut second = build();
        signer.sign(&mut first, &credential()).unwrap();
        signer.sign(&mut second, &credential()).unwrap();

        assert_eq!(
            first.headers.get(header::AUTHORIZATION),
            second.headers.get(header::AUTHORIZATION)
        );
        assert_eq!(first.uri, "http://myaccount.blob.core.windows.net/c1/k1");
        assert_eq!(first.headers.get_all(header::AUTHORIZATION).iter().count(), 1);
    }

    #[test]
    fn test_sign_known_signature() {
        let mut parts = http::Request::get("http://myaccount.blob.core.windows.net/?comp=list")
            .header(X_MS_DATE, DATE)
            .header(X_MS_VERSION, AZURE_VERSION)
            .body(())
            .unwrap()
            .into_parts()
            .0;

        RequestSigner::new().sign(&mut parts, &credential()).unwrap();

        let auth = parts.headers.get(header::AUTHORIZATION).unwrap();
        assert!(auth.is_sensitive());
        assert_eq!(
            auth.to_str().unwrap(),
            "SharedKey myaccount:e+IFxSqx5obdUm4nRhbLBFeWSIPazQarOIdbiuFm7lk="
        );
    }

    #[test]
    fn test_sign_with_invalid_key() {
        let cred = Credential::new(ACCOUNT, "not base64!").unwrap();
        let mut parts = http::Request::get("http://myaccount.blob.core.windows.net/c1")
            .header(X_MS_DATE, DATE)
            .body(())
            .unwrap()
            .into_parts()
            .0;

        let err = RequestSigner::new().sign(&mut parts, &cred).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::RequestInvalid);
        assert!(!err.is_retryable());

        // The request is handed back untouched.
        assert_eq!(parts.uri, "http://myaccount.blob.core.windows.net/c1");
        assert!(parts.headers.contains_key(X_MS_DATE));
        assert!(!parts.headers.contains_key(header::AUTHORIZATION));
    }

    #[test]
    fn test_sign_with_non_ascii_header() {
        let mut parts = http::Request::get("http://myaccount.blob.core.windows.net/c1")
            .header("x-ms-meta-name", HeaderValue::from_bytes(b"caf\xc3\xa9").unwrap())
            .body(())
            .unwrap()
            .into_parts()
            .0;

        let err = RequestSigner::new()
            .sign(&mut parts, &credential())
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::RequestInvalid);
    }

    #[test]
    fn test_sign_without_authority() {
        let mut parts = http::Request::get("/c1?comp=list")
            .header(X_MS_DATE, DATE)
            .body(())
            .unwrap()
            .into_parts()
            .0;

        let err = RequestSigner::new()
            .sign(&mut parts, &credential())
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::RequestInvalid);
        assert_eq!(parts.uri, "/c1?comp=list");
        assert!(parts.headers.contains_key(X_MS_DATE));
        assert!(!parts.headers.contains_key(header::AUTHORIZATION));
    }
}
