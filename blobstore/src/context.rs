use blobstore_core::{Context, OsEnv};
use blobstore_http_send_reqwest::ReqwestHttpSend;

/// Context that sends requests with a default `reqwest::Client` and reads
/// the process environment.
///
/// Build the context by hand with `ReqwestHttpSend::new(client)` to bound
/// request duration or tune the connection pool.
pub fn default_context() -> Context {
    Context::new()
        .with_http_send(ReqwestHttpSend::default())
        .with_env(OsEnv)
}
