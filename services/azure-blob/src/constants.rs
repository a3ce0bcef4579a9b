use percent_encoding::AsciiSet;
use percent_encoding::NON_ALPHANUMERIC;

// Headers used in azure blob requests.
pub const X_MS_DATE: &str = "x-ms-date";
pub const X_MS_VERSION: &str = "x-ms-version";
pub const X_MS_BLOB_TYPE: &str = "x-ms-blob-type";
pub const CONTENT_MD5: &str = "content-md5";

/// Storage service version sent with every request.
pub const AZURE_VERSION: &str = "2009-09-19";
pub const BLOCK_BLOB: &str = "BlockBlob";

// Content types of outgoing payloads.
pub const TEXT_PLAIN_UTF8: &str = "text/plain; charset=UTF-8";
pub const APPLICATION_OCTET_STREAM: &str = "application/octet-stream";

// Env values used by `Config::from_env`.
pub const AZBLOB_ACCOUNT_NAME: &str = "AZBLOB_ACCOUNT_NAME";
pub const AZBLOB_ACCOUNT_KEY: &str = "AZBLOB_ACCOUNT_KEY";
pub const AZBLOB_ENDPOINT: &str = "AZBLOB_ENDPOINT";
pub const AZBLOB_CONTAINER: &str = "AZBLOB_CONTAINER";
pub const AZURE_STORAGE_ACCOUNT_NAME: &str = "AZURE_STORAGE_ACCOUNT_NAME";
pub const AZURE_STORAGE_ACCOUNT_KEY: &str = "AZURE_STORAGE_ACCOUNT_KEY";

pub const DEFAULT_ENDPOINT_SUFFIX: &str = "core.windows.net";

/// Encode set for blob names placed in a URL path.
///
/// Unreserved characters and `/` (virtual directories) stay as they are.
pub static AZURE_PATH_ENCODE_SET: AsciiSet = NON_ALPHANUMERIC
    .remove(b'/')
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~');
