//! Blob storage templates.
//!
//! This crate bundles the blobstore crates behind features:
//!
//! - `azure`: Azure Blob storage template, see [`azure`].
//! - `default-context`: [`default_context`], a [`Context`] sending requests
//!   with reqwest and reading the process environment.
//!
//! # Example
//!
//! ```no_run
//! use blobstore::azure::{Config, StorageTemplate};
//!
//! # async fn example() -> anyhow::Result<()> {
//! let ctx = blobstore::default_context();
//! let config = Config::new().from_env(&ctx);
//! let template = StorageTemplate::new(ctx, config)?;
//!
//! template.send("c1", "k1", "hello").await?;
//! # Ok(())
//! # }
//! ```

#![cfg_attr(docsrs, feature(doc_auto_cfg))]

pub use blobstore_core::*;

#[cfg(feature = "default-context")]
mod context;
#[cfg(feature = "default-context")]
pub use context::default_context;

#[cfg(feature = "azure")]
pub mod azure {
    //! Azure Blob storage template.
    pub use blobstore_azure_blob::*;
}
