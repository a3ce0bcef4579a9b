//! Core components for blobstore.
//!
//! This crate provides the foundational types shared by the storage
//! templates: the error taxonomy, the [`Context`] that carries the HTTP
//! transport and environment, and the [`SigningRequest`] snapshot a request
//! signer works on.
//!
//! ## Overview
//!
//! - **Context**: a container that holds implementations for HTTP sending and
//!   environment access. Nothing global: build one per client.
//! - **SigningRequest**: a snapshot of method, URI and headers taken out of
//!   `http::request::Parts`, signed, then applied back.
//! - **Error**: one error type whose [`ErrorKind`] tells request construction
//!   failures, communication failures and response handling failures apart.
//!
//! ## Example
//!
//! ```no_run
//! use blobstore_core::{Context, HttpSend, Result};
//! use bytes::Bytes;
//!
//! #[derive(Debug)]
//! struct MyTransport;
//!
//! #[async_trait::async_trait]
//! impl HttpSend for MyTransport {
//!     async fn http_send(&self, _req: http::Request<Bytes>) -> Result<http::Response<Bytes>> {
//!         Ok(http::Response::new(Bytes::new()))
//!     }
//! }
//!
//! let ctx = Context::new().with_http_send(MyTransport);
//! ```
//!
//! ## Utilities
//!
//! - [`hash`]: Base64 and HMAC helpers
//! - [`time`]: Time manipulation utilities
//! - [`utils`]: General utilities including data redaction

// Make sure all our public APIs have docs.
#![warn(missing_docs)]

pub mod hash;
pub mod time;
pub mod utils;

mod context;
pub use context::Context;
pub use context::Env;
pub use context::HttpSend;
pub use context::NoopEnv;
pub use context::NoopHttpSend;
pub use context::OsEnv;
pub use context::ReasonPhrase;
pub use context::StaticEnv;

mod error;
pub use error::{Error, ErrorKind, Result};

mod request;
pub use request::SigningRequest;
