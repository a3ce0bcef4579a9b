use std::fmt::{Debug, Formatter};

use blobstore_core::utils::Redact;
use blobstore_core::{Context, Error, Result};

use crate::connection_string;
use crate::constants::*;
use crate::Credential;

/// Config carries all the configuration for an Azure Blob storage template.
#[derive(Clone, Default)]
#[cfg_attr(test, derive(PartialEq))]
pub struct Config {
    /// `account_name` will be loaded from
    ///
    /// - this field if it's `is_some`
    /// - env value: [`AZBLOB_ACCOUNT_NAME`] or [`AZURE_STORAGE_ACCOUNT_NAME`]
    pub account_name: Option<String>,
    /// `account_key` will be loaded from
    ///
    /// - this field if it's `is_some`
    /// - env value: [`AZBLOB_ACCOUNT_KEY`] or [`AZURE_STORAGE_ACCOUNT_KEY`]
    pub account_key: Option<String>,
    /// Blob service endpoint, e.g. `http://127.0.0.1:10000/devstoreaccount1`.
    ///
    /// Defaults to `http://{account_name}.blob.core.windows.net`.
    ///
    /// - env value: [`AZBLOB_ENDPOINT`]
    pub endpoint: Option<String>,
    /// Container used by the default-container variants of the template.
    ///
    /// - env value: [`AZBLOB_CONTAINER`]
    pub default_container: Option<String>,
}

impl Debug for Config {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("account_name", &self.account_name)
            .field("account_key", &self.account_key.as_ref().map(Redact::from))
            .field("endpoint", &self.endpoint)
            .field("default_container", &self.default_container)
            .finish()
    }
}

impl Config {
    /// Create an empty config.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the account name.
    pub fn with_account_name(mut self, account_name: impl Into<String>) -> Self {
        self.account_name = Some(account_name.into());
        self
    }

    /// Set the account key.
    pub fn with_account_key(mut self, account_key: impl Into<String>) -> Self {
        self.account_key = Some(account_key.into());
        self
    }

    /// Set the blob service endpoint.
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = Some(endpoint.into());
        self
    }

    /// Set the default container.
    pub fn with_default_container(mut self, container: impl Into<String>) -> Self {
        self.default_container = Some(container.into());
        self
    }

    /// Load config from env.
    ///
    /// Values already set on the config take precedence.
    pub fn from_env(mut self, ctx: &Context) -> Self {
        let envs = ctx.env_vars();

        if self.account_name.is_none() {
            self.account_name = envs
                .get(AZBLOB_ACCOUNT_NAME)
                .or_else(|| envs.get(AZURE_STORAGE_ACCOUNT_NAME))
                .cloned();
        }

        if self.account_key.is_none() {
            self.account_key = envs
                .get(AZBLOB_ACCOUNT_KEY)
                .or_else(|| envs.get(AZURE_STORAGE_ACCOUNT_KEY))
                .cloned();
        }

        if self.endpoint.is_none() {
            self.endpoint = envs.get(AZBLOB_ENDPOINT).cloned();
        }

        if self.default_container.is_none() {
            self.default_container = envs.get(AZBLOB_CONTAINER).cloned();
        }

        self
    }

    /// Parses an [Azure connection string][1] into a configuration object.
    ///
    /// An example of a connection string looks like:
    ///
    /// ```txt
    /// AccountName=mystorageaccount;
    /// AccountKey=Eby8vdM02xNOcqFlqUwJPLlmEtlCDXJ1OUzFT50uSRZ6IFsuFq2UVErCz4I6tq/K1SZFPTOtr/KBHBeksoGMGw==;
    /// BlobEndpoint=https://mystorageaccount.blob.core.windows.net
    /// ```
    ///
    /// [1]: https://learn.microsoft.com/en-us/azure/storage/common/storage-configure-connection-string
    pub fn try_from_connection_string(conn_str: &str) -> Result<Self> {
        connection_string::parse(conn_str)
    }

    /// Build the shared key credential out of this config.
    pub fn credential(&self) -> Result<Credential> {
        let account_name = self
            .account_name
            .as_deref()
            .ok_or_else(|| Error::config_invalid("account_name is required"))?;
        let account_key = self
            .account_key
            .as_deref()
            .ok_or_else(|| Error::config_invalid("account_key is required"))?;

        Credential::new(account_name, account_key)
    }

    /// The configured endpoint without trailing `/`, or the public
    /// endpoint of the account.
    pub fn endpoint_or_default(&self) -> Result<String> {
        if let Some(endpoint) = &self.endpoint {
            let endpoint = endpoint.trim().trim_end_matches('/');
            if !endpoint.starts_with("http://") && !endpoint.starts_with("https://") {
                return Err(Error::config_invalid(format!(
                    "endpoint {endpoint:?} must start with http:// or https://"
                )));
            }
            return Ok(endpoint.to_string());
        }

        let account_name = self
            .account_name
            .as_deref()
            .ok_or_else(|| Error::config_invalid("account_name is required"))?;
        Ok(format!(
            "http://{account_name}.blob.{DEFAULT_ENDPOINT_SUFFIX}"
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use blobstore_core::{ErrorKind, StaticEnv};
    use std::collections::HashMap;

    fn ctx(envs: &[(&str, &str)]) -> Context {
        Context::new().with_env(StaticEnv {
            envs: envs
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect::<HashMap<_, _>>(),
        })
    }

    #[test]
    fn test_from_env() {
        let ctx = ctx(&[
            (AZBLOB_ACCOUNT_NAME, "myaccount"),
            (AZURE_STORAGE_ACCOUNT_KEY, "bXlrZXk="),
            (AZBLOB_CONTAINER, "c1"),
        ]);

        let config = Config::new().from_env(&ctx);
        assert_eq!(config.account_name.as_deref(), Some("myaccount"));
        assert_eq!(config.account_key.as_deref(), Some("bXlrZXk="));
        assert_eq!(config.default_container.as_deref(), Some("c1"));
        assert_eq!(config.endpoint, None);
        assert_eq!(
            config.endpoint_or_default().unwrap(),
            "http://myaccount.blob.core.windows.net"
        );
    }

    #[test]
    fn test_from_env_keeps_explicit_values() {
        let ctx = ctx(&[(AZBLOB_ACCOUNT_NAME, "fromenv")]);

        let config = Config::new().with_account_name("explicit").from_env(&ctx);
        assert_eq!(config.account_name.as_deref(), Some("explicit"));
    }

    #[test]
    fn test_credential_requires_fields() {
        let err = Config::new()
            .with_account_name("myaccount")
            .credential()
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ConfigInvalid);

        let err = Config::new()
            .with_account_name("myaccount")
            .with_account_key("")
            .credential()
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::CredentialInvalid);
    }

    #[test]
    fn test_endpoint_or_default() {
        let config = Config::new().with_endpoint("http://127.0.0.1:10000/devstoreaccount1/");
        assert_eq!(
            config.endpoint_or_default().unwrap(),
            "http://127.0.0.1:10000/devstoreaccount1"
        );

        let err = Config::new()
            .with_endpoint("127.0.0.1:10000")
            .endpoint_or_default()
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ConfigInvalid);

        assert!(Config::new().endpoint_or_default().is_err());
    }

    #[test]
    fn test_debug_redacts_key() {
        let config = Config::new().with_account_key("secretsecretsecret");
        assert!(!format!("{config:?}").contains("secretsecretsecret"));
    }
}
