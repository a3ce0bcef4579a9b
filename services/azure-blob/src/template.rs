use std::path::{Path, PathBuf};

use blobstore_core::{Context, Error, Result};
use log::debug;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWriteExt};

use crate::{
    AzureRestService, Blob, BlobDescriptor, BlobStream, Config, ContainerStatus, Payload,
    RequestFactory,
};

/// StorageTemplate is the entry point for storing and fetching blobs.
///
/// ```no_run
/// use blobstore_azure_blob::{Config, StorageTemplate};
/// use blobstore_core::Context;
///
/// # async fn example(ctx: Context) -> blobstore_core::Result<()> {
/// let config = Config::new().from_env(&ctx);
/// let template = StorageTemplate::new(ctx, config)?;
///
/// template.create_container("c1").await?;
/// template.send("c1", "k1", "hello").await?;
/// assert_eq!(template.receive_as_string("c1", "k1").await?, "hello");
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct StorageTemplate {
    service: AzureRestService,
    default_container: Option<String>,
}

impl StorageTemplate {
    /// Build a template out of `config`, sending requests through `ctx`.
    pub fn new(ctx: Context, config: Config) -> Result<Self> {
        let factory = RequestFactory::from_config(&config)?;
        debug!(
            "storage template created for account {} at {}",
            factory.credential().account_name(),
            factory.endpoint()
        );

        Ok(Self {
            service: AzureRestService::new(ctx, factory),
            default_container: config.default_container,
        })
    }

    /// The REST service this template delegates to.
    pub fn service(&self) -> &AzureRestService {
        &self.service
    }

    /// Handle bound to container `name`.
    pub fn container(&self, name: impl Into<String>) -> ContainerTemplate<'_> {
        ContainerTemplate {
            template: self,
            container: name.into(),
        }
    }

    /// Handle bound to the configured default container.
    pub fn default_container(&self) -> Result<ContainerTemplate<'_>> {
        let name = self
            .default_container
            .as_deref()
            .ok_or_else(|| Error::config_invalid("no default container configured"))?;
        Ok(self.container(name))
    }

    /// Create container `name`.
    pub async fn create_container(&self, name: &str) -> Result<()> {
        self.service.create_container(name).await
    }

    /// Delete container `name`.
    pub async fn delete_container(&self, name: &str) -> Result<()> {
        self.service.delete_container(name).await
    }

    /// Names of all containers of the account.
    pub async fn list_containers(&self) -> Result<Vec<String>> {
        self.service.list_containers().await
    }

    /// Whether container `name` exists for this account.
    pub async fn check_container_status(&self, name: &str) -> Result<ContainerStatus> {
        self.service.check_container_status(name).await
    }

    /// Delete blob `name` in `container`.
    pub async fn delete_object(&self, container: &str, name: &str) -> Result<()> {
        self.service.delete_object(container, name).await
    }

    /// Blobs of `container`.
    pub async fn list_container_objects(&self, container: &str) -> Result<Vec<BlobDescriptor>> {
        self.service.list_container_objects(container).await
    }

    /// Store `payload` as blob `name` in `container` and return the name.
    ///
    /// ```no_run
    /// # use blobstore_azure_blob::{Payload, StorageTemplate};
    /// # async fn example(template: StorageTemplate) -> blobstore_core::Result<()> {
    /// template.send("c1", "text", "hello").await?;
    /// template.send("c1", "bytes", vec![0u8, 1, 2]).await?;
    /// template.send("c1", "file", Payload::file("/tmp/report.pdf")).await?;
    /// # Ok(())
    /// # }
    /// ```
    pub async fn send(
        &self,
        container: &str,
        name: &str,
        payload: impl Into<Payload>,
    ) -> Result<String> {
        self.service
            .put_object(container, Blob::new(name, payload))
            .await?;
        Ok(name.to_string())
    }

    /// Stream over blob `name` in `container`.
    ///
    /// The caller owns the stream; dropping it releases it.
    pub async fn receive_as_stream(&self, container: &str, name: &str) -> Result<BlobStream> {
        let blob = self.service.get_object(container, name).await?;
        blob.into_payload()
            .into_stream()
            .await
            .map_err(|e| decorate(e, "receive_as_stream", container, name))
    }

    /// Content of blob `name` in `container` as UTF-8 text.
    pub async fn receive_as_string(&self, container: &str, name: &str) -> Result<String> {
        let stream = self.receive_as_stream(container, name).await?;
        read_to_string(stream)
            .await
            .map_err(|e| decorate(e, "receive_as_string", container, name))
    }

    /// Save blob `name` in `container` to `path` and return the path.
    ///
    /// Missing parent directories are created. The file is flushed and
    /// synced before this returns.
    pub async fn receive_and_save_to_file(
        &self,
        container: &str,
        name: &str,
        path: impl AsRef<Path>,
    ) -> Result<PathBuf> {
        let path = path.as_ref().to_path_buf();
        let stream = self.receive_as_stream(container, name).await?;
        save_to_file(stream, &path)
            .await
            .map_err(|e| decorate(e, "receive_and_save_to_file", container, name))?;
        Ok(path)
    }
}

/// StorageTemplate operations bound to one container.
///
/// Created by [`StorageTemplate::container`] or
/// [`StorageTemplate::default_container`].
#[derive(Debug, Clone)]
pub struct ContainerTemplate<'a> {
    template: &'a StorageTemplate,
    container: String,
}

impl ContainerTemplate<'_> {
    /// Name of the bound container.
    pub fn name(&self) -> &str {
        &self.container
    }

    /// Store `payload` as blob `name` and return the name.
    pub async fn send(&self, name: &str, payload: impl Into<Payload>) -> Result<String> {
        self.template.send(&self.container, name, payload).await
    }

    /// Content of blob `name` as UTF-8 text.
    pub async fn receive_as_string(&self, name: &str) -> Result<String> {
        self.template.receive_as_string(&self.container, name).await
    }

    /// Save blob `name` to `path` and return the path.
    pub async fn receive_and_save_to_file(
        &self,
        name: &str,
        path: impl AsRef<Path>,
    ) -> Result<PathBuf> {
        self.template
            .receive_and_save_to_file(&self.container, name, path)
            .await
    }

    /// Stream over blob `name`.
    pub async fn receive_as_stream(&self, name: &str) -> Result<BlobStream> {
        self.template.receive_as_stream(&self.container, name).await
    }

    /// Delete blob `name`.
    pub async fn delete_object(&self, name: &str) -> Result<()> {
        self.template.delete_object(&self.container, name).await
    }

    /// Blobs of the bound container.
    pub async fn list_objects(&self) -> Result<Vec<BlobDescriptor>> {
        self.template.list_container_objects(&self.container).await
    }

    /// Whether the bound container exists for this account.
    pub async fn status(&self) -> Result<ContainerStatus> {
        self.template.check_container_status(&self.container).await
    }
}

fn decorate(err: Error, operation: &'static str, container: &str, name: &str) -> Error {
    err.with_operation(operation)
        .with_context("container", container)
        .with_context("object", name)
}

/// Read `reader` to its end as UTF-8. `reader` is dropped before this returns.
async fn read_to_string<R: AsyncRead + Unpin>(mut reader: R) -> Result<String> {
    let mut buf = Vec::new();
    reader
        .read_to_end(&mut buf)
        .await
        .map_err(|e| Error::response_handling("failed to read blob content").with_source(e))?;

    String::from_utf8(buf)
        .map_err(|e| Error::response_handling("blob content is not valid utf-8").with_source(e))
}

/// Copy `reader` into the file at `path`. `reader` is dropped before this
/// returns.
async fn save_to_file<R: AsyncRead + Unpin>(mut reader: R, path: &Path) -> Result<()> {
    let io_err = |message: &'static str| {
        let path = path.display().to_string();
        move |e: std::io::Error| {
            Error::response_handling(message)
                .with_context("path", path)
                .with_source(e)
        }
    };

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent)
            .await
            .map_err(io_err("failed to create parent directories"))?;
    }

    let mut file = tokio::fs::File::create(path)
        .await
        .map_err(io_err("failed to create file"))?;
    tokio::io::copy(&mut reader, &mut file)
        .await
        .map_err(io_err("failed to write blob content to file"))?;
    file.flush().await.map_err(io_err("failed to flush file"))?;
    file.sync_all().await.map_err(io_err("failed to sync file"))?;

    debug!("saved blob content to {}", path.display());
    Ok(())
}
