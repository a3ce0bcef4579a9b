//! Mapping of HTTP responses to blob operation results.
//!
//! Every function only looks at the response it is given. An unexpected
//! status is always a communication error that carries the status.

use blobstore_core::{Error, ReasonPhrase, Result};
use bytes::Bytes;
use http::{Response, StatusCode};
use log::warn;

use crate::list::{parse_blob_descriptors, parse_container_names};
use crate::{Blob, BlobDescriptor, BlobStream, ContainerStatus, Payload};

/// `Create Container` succeeds with `201 Created`.
pub fn create_container(resp: Response<Bytes>) -> Result<()> {
    expect_status(&resp, StatusCode::CREATED)
}

/// `Delete Container` succeeds with `202 Accepted`.
pub fn delete_container(resp: Response<Bytes>) -> Result<()> {
    expect_status(&resp, StatusCode::ACCEPTED)
}

/// `List Containers` succeeds with `200 OK` and a listing body.
pub fn list_containers(resp: Response<Bytes>) -> Result<Vec<String>> {
    expect_status(&resp, StatusCode::OK)?;
    parse_container_names(resp.body())
}

/// `Delete Blob` succeeds with `202 Accepted`.
pub fn delete_object(resp: Response<Bytes>) -> Result<()> {
    expect_status(&resp, StatusCode::ACCEPTED)
}

/// `Put Blob` succeeds with `201 Created`.
pub fn put_object(resp: Response<Bytes>) -> Result<()> {
    expect_status(&resp, StatusCode::CREATED)
}

/// `Get Blob` succeeds with `200 OK`; the body becomes the stream of `name`.
pub fn get_object(resp: Response<Bytes>, name: &str) -> Result<Blob> {
    expect_status(&resp, StatusCode::OK)?;

    let stream = BlobStream::from_bytes(resp.into_body());
    Ok(Blob::new(name, Payload::Stream(stream)))
}

/// `List Blobs` succeeds with `200 OK` and a listing body.
pub fn list_container_objects(
    resp: Response<Bytes>,
    container: &str,
) -> Result<Vec<BlobDescriptor>> {
    expect_status(&resp, StatusCode::OK)?;
    parse_blob_descriptors(container, resp.body())
}

/// A container listing answers whether the container exists.
pub fn check_container_status(resp: Response<Bytes>) -> Result<ContainerStatus> {
    match resp.status() {
        StatusCode::OK => Ok(ContainerStatus::Mine),
        StatusCode::NOT_FOUND => Ok(ContainerStatus::DoesNotExist),
        _ => Err(unexpected_status(&resp)),
    }
}

fn expect_status(resp: &Response<Bytes>, expected: StatusCode) -> Result<()> {
    if resp.status() == expected {
        Ok(())
    } else {
        Err(unexpected_status(resp))
    }
}

/// Error for a response whose status the operation does not expect.
///
/// The message carries the status line, e.g. `HTTP/1.1 500 Internal Server Error`.
/// The reason phrase is the one the transport received, or the canonical
/// reason of the status when none was attached.
pub fn unexpected_status(resp: &Response<Bytes>) -> Error {
    let status = resp.status();
    let reason = match resp.extensions().get::<ReasonPhrase>() {
        Some(reason) => reason.as_str(),
        None => status.canonical_reason().unwrap_or_default(),
    };
    let status_line = format!("{:?} {} {}", resp.version(), status.as_u16(), reason);
    warn!(
        "unexpected response status: {}, body: {}",
        status_line,
        String::from_utf8_lossy(resp.body())
    );

    Error::communication(format!("unexpected status: {}", status_line.trim_end()))
        .with_status(status)
}

#[cfg(test)]
mod tests {
    use super::*;
    use blobstore_core::ErrorKind;
    use pretty_assertions::assert_eq;
    use test_case::test_case;

    fn response(status: u16, body: &'static str) -> Response<Bytes> {
        Response::builder()
            .status(status)
            .body(Bytes::from_static(body.as_bytes()))
            .unwrap()
    }

    #[test_case(201, true; "created")]
    #[test_case(200, false; "ok")]
    #[test_case(202, false; "accepted")]
    #[test_case(409, false; "conflict")]
    fn test_create_container(status: u16, ok: bool) {
        assert_eq!(create_container(response(status, "")).is_ok(), ok);
    }

    #[test_case(202, true; "accepted")]
    #[test_case(200, false; "ok")]
    #[test_case(404, false; "not found")]
    fn test_delete_container(status: u16, ok: bool) {
        assert_eq!(delete_container(response(status, "")).is_ok(), ok);
        assert_eq!(delete_object(response(status, "")).is_ok(), ok);
    }

    #[test_case(201, true; "created")]
    #[test_case(200, false; "ok")]
    #[test_case(403, false; "forbidden")]
    fn test_put_object(status: u16, ok: bool) {
        assert_eq!(put_object(response(status, "")).is_ok(), ok);
    }

    #[test_case(200, Some(ContainerStatus::Mine); "ok")]
    #[test_case(404, Some(ContainerStatus::DoesNotExist); "not found")]
    #[test_case(403, None; "forbidden")]
    #[test_case(500, None; "server error")]
    fn test_check_container_status(status: u16, expected: Option<ContainerStatus>) {
        let actual = check_container_status(response(status, ""));
        match expected {
            Some(expected) => assert_eq!(actual.unwrap(), expected),
            None => {
                let err = actual.unwrap_err();
                assert_eq!(err.kind(), ErrorKind::Communication);
                assert_eq!(err.status(), Some(StatusCode::from_u16(status).unwrap()));
            }
        }
    }

    #[tokio::test]
    async fn test_get_object() {
        let blob = get_object(response(200, "hello"), "k1").unwrap();
        assert_eq!(blob.name(), "k1");

        let Payload::Stream(stream) = blob.into_payload() else {
            panic!("get_object must return a stream payload");
        };
        assert_eq!(stream.read_all().await.unwrap(), "hello");
    }

    #[test]
    fn test_list_containers_requires_ok() {
        let err = list_containers(response(201, "")).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Communication);

        let err = list_containers(response(200, "<EnumerationResults><Containers>")).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ResponseHandling);
    }

    #[test_case(499, None, "HTTP/1.1 499"; "non standard without reason")]
    #[test_case(499, Some("Client Closed Request"), "HTTP/1.1 499 Client Closed Request"; "non standard with reason")]
    #[test_case(503, Some("Server Busy"), "HTTP/1.1 503 Server Busy"; "reason as received")]
    #[test_case(503, None, "HTTP/1.1 503 Service Unavailable"; "canonical fallback")]
    fn test_unexpected_status_reason_phrase(status: u16, reason: Option<&str>, line: &str) {
        let mut resp = response(status, "");
        if let Some(reason) = reason {
            resp.extensions_mut()
                .insert(ReasonPhrase(reason.to_string()));
        }

        let err = unexpected_status(&resp);
        assert_eq!(err.status(), Some(StatusCode::from_u16(status).unwrap()));
        assert_eq!(
            err.to_string(),
            format!("communication failed => unexpected status: {line}")
        );
    }

    #[test]
    fn test_unexpected_status_message() {
        let err = unexpected_status(&response(500, "boom"));

        assert_eq!(err.kind(), ErrorKind::Communication);
        assert_eq!(err.status(), Some(StatusCode::INTERNAL_SERVER_ERROR));
        assert_eq!(
            err.to_string(),
            "communication failed => unexpected status: HTTP/1.1 500 Internal Server Error"
        );
    }
}
