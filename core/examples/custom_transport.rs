use async_trait::async_trait;
use blobstore_core::{Context, Error, HttpSend, Result, StaticEnv};
use bytes::Bytes;
use std::collections::HashMap;

/// Transport that answers every request locally.
///
/// Handy to run a storage template without network access.
#[derive(Debug)]
struct EchoHttpSend;

#[async_trait]
impl HttpSend for EchoHttpSend {
    async fn http_send(&self, req: http::Request<Bytes>) -> Result<http::Response<Bytes>> {
        if req.uri().host() == Some("unreachable.invalid") {
            return Err(Error::communication("host is unreachable")
                .with_context("uri", req.uri().to_string()));
        }

        let body = format!("{} {}", req.method(), req.uri());
        Ok(http::Response::builder()
            .status(200)
            .body(Bytes::from(body))?)
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let ctx = Context::new()
        .with_http_send(EchoHttpSend)
        .with_env(StaticEnv {
            envs: HashMap::from([("AZBLOB_CONTAINER".to_string(), "c1".to_string())]),
        });

    println!("AZBLOB_CONTAINER = {:?}", ctx.env_var("AZBLOB_CONTAINER"));

    let req = http::Request::get("http://myaccount.blob.core.windows.net/c1?restype=container")
        .body(Bytes::new())?;
    let resp = ctx.http_send(req).await?;
    println!(
        "{} => {}",
        resp.status(),
        String::from_utf8_lossy(resp.body())
    );

    let req = http::Request::get("http://unreachable.invalid/c1").body(Bytes::new())?;
    if let Err(err) = ctx.http_send(req).await {
        println!("retryable: {}, error: {err}", err.is_retryable());
    }

    Ok(())
}
