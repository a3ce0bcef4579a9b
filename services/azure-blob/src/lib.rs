//! Azure Blob storage template
//!
//! This crate stores and fetches blobs through the Azure Blob REST API,
//! signing every request with Shared Key authorization:
//!
//! - [`RequestSigner`] builds the string to sign and the `Authorization` header.
//! - [`RequestFactory`] builds signed GET/PUT/DELETE requests for one endpoint.
//! - [`AzureRestService`] runs the blob operations and maps their responses.
//! - [`StorageTemplate`] is the facade most users want.
//!
//! # Example
//!
//! ```rust,no_run
//! use anyhow::Result;
//! use blobstore_azure_blob::{Config, ContainerStatus, StorageTemplate};
//! use blobstore_core::Context;
//!
//! async fn run(ctx: Context) -> Result<()> {
//!     let config = Config::new().from_env(&ctx);
//!     let template = StorageTemplate::new(ctx, config)?;
//!
//!     if template.check_container_status("c1").await? == ContainerStatus::DoesNotExist {
//!         template.create_container("c1").await?;
//!     }
//!
//!     let c1 = template.container("c1");
//!     c1.send("k1", "hello").await?;
//!     println!("{}", c1.receive_as_string("k1").await?);
//!
//!     for blob in c1.list_objects().await? {
//!         println!("{} {:?}", blob.name, blob.content_length);
//!     }
//!
//!     Ok(())
//! }
//! ```

mod constants;

mod blob;
pub use blob::{Blob, BlobDescriptor, BlobStream, ContainerStatus, Payload};

mod config;
pub use config::Config;

mod connection_string;

mod credential;
pub use credential::Credential;

mod sign_request;
pub use sign_request::{string_to_sign, RequestSigner};

mod request_factory;
pub use request_factory::RequestFactory;

mod list;

pub mod response;

mod service;
pub use service::AzureRestService;

mod template;
pub use template::{ContainerTemplate, StorageTemplate};
