use std::fmt;

use http::StatusCode;
use thiserror::Error;

/// The error type for blobstore operations.
///
/// Every error carries the logical operation it happened in and the
/// container/object it was about, so a failure can be diagnosed from its
/// message alone.
#[derive(Error, Debug)]
pub struct Error {
    kind: ErrorKind,
    message: String,
    status: Option<StatusCode>,
    operation: &'static str,
    context: Vec<(&'static str, String)>,
    #[source]
    source: Option<anyhow::Error>,
}

/// The kind of error that occurred
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Request could not be built or signed (bad key, bad header value, empty name).
    RequestInvalid,

    /// The HTTP exchange failed: transport error or unexpected status code.
    Communication,

    /// The exchange succeeded but its result could not be consumed
    /// (body not parseable, content not convertible, file not writable).
    ResponseHandling,

    /// Credentials exist but are invalid/malformed
    CredentialInvalid,

    /// Configuration error (missing fields, invalid values)
    ConfigInvalid,

    /// Unexpected errors
    Unexpected,
}

impl Error {
    /// Create a new error with the given kind and message
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            status: None,
            operation: "",
            context: Vec::new(),
            source: None,
        }
    }

    /// Add a source error
    pub fn with_source(mut self, source: impl Into<anyhow::Error>) -> Self {
        self.source = Some(source.into());
        self
    }

    /// Set the operation this error happened in.
    ///
    /// An operation set by an inner layer is kept: the innermost operation is
    /// the most precise one.
    pub fn with_operation(mut self, operation: &'static str) -> Self {
        if self.operation.is_empty() {
            self.operation = operation;
        }
        self
    }

    /// Add a key/value pair of context, e.g. `("container", "c1")`.
    pub fn with_context(mut self, key: &'static str, value: impl Into<String>) -> Self {
        let value = value.into();
        if !self.context.iter().any(|(k, v)| *k == key && *v == value) {
            self.context.push((key, value));
        }
        self
    }

    /// Attach the HTTP status code that caused this error.
    pub fn with_status(mut self, status: StatusCode) -> Self {
        self.status = Some(status);
        self
    }

    /// Get the error kind
    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    /// Get the HTTP status code, if this error was caused by one.
    pub fn status(&self) -> Option<StatusCode> {
        self.status
    }

    /// Get the operation this error happened in, empty if unknown.
    pub fn operation(&self) -> &'static str {
        self.operation
    }

    /// Get the context value recorded under `key`.
    pub fn context(&self, key: &str) -> Option<&str> {
        self.context
            .iter()
            .find(|(k, _)| *k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Check if retrying the same call could succeed.
    ///
    /// Construction, credential, config and response handling failures
    /// reproduce with identical inputs. Whether a communication failure is
    /// worth retrying is up to the caller.
    pub fn is_retryable(&self) -> bool {
        matches!(self.kind, ErrorKind::Communication | ErrorKind::Unexpected)
    }
}

// Convenience constructors
impl Error {
    /// Create a request invalid error
    pub fn request_invalid(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::RequestInvalid, message)
    }

    /// Create a communication error
    pub fn communication(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Communication, message)
    }

    /// Create a response handling error
    pub fn response_handling(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::ResponseHandling, message)
    }

    /// Create a credential invalid error
    pub fn credential_invalid(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::CredentialInvalid, message)
    }

    /// Create a config invalid error
    pub fn config_invalid(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::ConfigInvalid, message)
    }

    /// Create an unexpected error
    pub fn unexpected(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Unexpected, message)
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.kind)?;

        if !self.operation.is_empty() {
            write!(f, " at {}", self.operation)?;
        }

        if !self.context.is_empty() {
            f.write_str(", context: { ")?;
            for (idx, (k, v)) in self.context.iter().enumerate() {
                if idx != 0 {
                    f.write_str(", ")?;
                }
                write!(f, "{k}: {v}")?;
            }
            f.write_str(" }")?;
        }

        write!(f, " => {}", self.message)?;

        if let Some(source) = &self.source {
            write!(f, ", source: {source}")?;
        }

        Ok(())
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorKind::RequestInvalid => write!(f, "request construction failed"),
            ErrorKind::Communication => write!(f, "communication failed"),
            ErrorKind::ResponseHandling => write!(f, "response handling failed"),
            ErrorKind::CredentialInvalid => write!(f, "invalid credentials"),
            ErrorKind::ConfigInvalid => write!(f, "invalid configuration"),
            ErrorKind::Unexpected => write!(f, "unexpected error"),
        }
    }
}

/// Convenience type alias for Results
pub type Result<T> = std::result::Result<T, Error>;

// Common From implementations
impl From<anyhow::Error> for Error {
    fn from(err: anyhow::Error) -> Self {
        Self::unexpected(err.to_string()).with_source(err)
    }
}

impl From<http::Error> for Error {
    fn from(err: http::Error) -> Self {
        Self::request_invalid(err.to_string()).with_source(anyhow::Error::from(err))
    }
}

impl From<http::header::InvalidHeaderValue> for Error {
    fn from(err: http::header::InvalidHeaderValue) -> Self {
        Self::request_invalid(err.to_string()).with_source(anyhow::Error::from(err))
    }
}

impl From<http::header::InvalidHeaderName> for Error {
    fn from(err: http::header::InvalidHeaderName) -> Self {
        Self::request_invalid(err.to_string()).with_source(anyhow::Error::from(err))
    }
}

impl From<http::header::ToStrError> for Error {
    fn from(err: http::header::ToStrError) -> Self {
        Self::request_invalid(err.to_string()).with_source(anyhow::Error::from(err))
    }
}

impl From<http::uri::InvalidUri> for Error {
    fn from(err: http::uri::InvalidUri) -> Self {
        Self::request_invalid(err.to_string()).with_source(anyhow::Error::from(err))
    }
}

impl From<http::uri::InvalidUriParts> for Error {
    fn from(err: http::uri::InvalidUriParts) -> Self {
        Self::request_invalid(err.to_string()).with_source(anyhow::Error::from(err))
    }
}

impl From<std::fmt::Error> for Error {
    fn from(err: std::fmt::Error) -> Self {
        Self::request_invalid(err.to_string()).with_source(anyhow::Error::from(err))
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Self::unexpected(err.to_string()).with_source(anyhow::Error::from(err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_display_with_context() {
        let err = Error::communication("unexpected status HTTP/1.1 409 Conflict")
            .with_operation("put_object")
            .with_context("container", "c1")
            .with_context("object", "k1")
            .with_status(StatusCode::CONFLICT);

        assert_eq!(
            err.to_string(),
            "communication failed at put_object, context: { container: c1, object: k1 } => unexpected status HTTP/1.1 409 Conflict"
        );
        assert_eq!(err.status(), Some(StatusCode::CONFLICT));
        assert_eq!(err.context("object"), Some("k1"));
    }

    #[test]
    fn test_display_with_source() {
        let err = Error::request_invalid("failed to decode account key")
            .with_source(anyhow::anyhow!("invalid byte 42"));

        assert_eq!(
            err.to_string(),
            "request construction failed => failed to decode account key, source: invalid byte 42"
        );
        assert!(std::error::Error::source(&err).is_some());
    }

    #[test]
    fn test_inner_operation_wins() {
        let err = Error::communication("timeout")
            .with_operation("put_object")
            .with_operation("send")
            .with_context("container", "c1")
            .with_context("container", "c1");

        assert_eq!(err.operation(), "put_object");
        assert_eq!(
            err.to_string(),
            "communication failed at put_object, context: { container: c1 } => timeout"
        );
    }

    #[test]
    fn test_retryable() {
        assert!(!Error::request_invalid("x").is_retryable());
        assert!(!Error::response_handling("x").is_retryable());
        assert!(Error::communication("x").is_retryable());
    }
}
