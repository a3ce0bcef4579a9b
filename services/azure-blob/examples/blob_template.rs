use anyhow::Result;
use blobstore_azure_blob::{Config, ContainerStatus, Payload, StorageTemplate};
use blobstore_core::{Context, OsEnv};
use blobstore_http_send_reqwest::ReqwestHttpSend;

#[tokio::main]
async fn main() -> Result<()> {
    let _ = env_logger::builder().try_init();

    let ctx = Context::new()
        .with_http_send(ReqwestHttpSend::default())
        .with_env(OsEnv);

    // Without an account in env, talk to a local Azurite.
    let config = if ctx.env_var("AZBLOB_ACCOUNT_NAME").is_some() {
        Config::new().from_env(&ctx)
    } else {
        println!("AZBLOB_ACCOUNT_NAME is not set, using Azurite at 127.0.0.1:10000");
        Config::try_from_connection_string("UseDevelopmentStorage=true")?
            .with_default_container("blobstore-example")
    };
    let template = StorageTemplate::new(ctx, config)?;
    let container = template.default_container()?;

    if container.status().await? == ContainerStatus::DoesNotExist {
        template.create_container(container.name()).await?;
        println!("created container {}", container.name());
    }

    container.send("hello.txt", "hello, blob").await?;
    container
        .send("raw.bin", Payload::from(vec![0u8, 1, 2, 3]))
        .await?;
    println!(
        "hello.txt: {}",
        container.receive_as_string("hello.txt").await?
    );

    let path = std::env::temp_dir().join("blobstore-example/raw.bin");
    let saved = container.receive_and_save_to_file("raw.bin", &path).await?;
    println!("raw.bin saved to {}", saved.display());

    for blob in container.list_objects().await? {
        println!(
            "{} etag={} size={:?} last_modified={:?}",
            blob.name, blob.etag, blob.content_length, blob.last_modified
        );
    }

    for name in ["hello.txt", "raw.bin"] {
        container.delete_object(name).await?;
    }
    Ok(())
}
