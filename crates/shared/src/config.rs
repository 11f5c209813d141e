//! Application configuration management.

use serde::Deserialize;

/// Application configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Server configuration.
    #[serde(default)]
    pub server: ServerConfig,
    /// Object storage configuration.
    #[serde(default)]
    pub storage: StorageSettings,
}

/// Server configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Host to bind to.
    #[serde(default = "default_host")]
    pub host: String,
    /// Port to listen on.
    #[serde(default = "default_port")]
    pub port: u16,
    /// Largest request body accepted by the upload endpoint.
    #[serde(default = "default_max_upload_bytes")]
    pub max_upload_bytes: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            max_upload_bytes: default_max_upload_bytes(),
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_max_upload_bytes() -> usize {
    10 * 1024 * 1024 // 10MB
}

/// Object storage settings as they appear in config files and the environment.
///
/// Only the fields relevant to the selected `provider` are read:
///
/// | provider | fields |
/// |----------|--------|
/// | `s3`     | `bucket`, `region`, `endpoint`, `access_key_id`, `secret_access_key`, `public_url_base` |
/// | `azblob` | `account`, `access_key`, `bucket` (container) |
/// | `fs`     | `root` |
/// | `memory` | none |
#[derive(Debug, Clone, Deserialize)]
pub struct StorageSettings {
    /// Provider name: `s3`, `azblob`, `fs` or `memory`.
    #[serde(default = "default_provider")]
    pub provider: String,
    /// Bucket (or container) name. Left empty, every storage call fails.
    #[serde(default)]
    pub bucket: String,
    /// Bucket region.
    #[serde(default = "default_region")]
    pub region: String,
    /// Custom endpoint for S3-compatible services.
    #[serde(default)]
    pub endpoint: Option<String>,
    /// Access key ID. Falls back to the provider's default credential chain.
    #[serde(default)]
    pub access_key_id: Option<String>,
    /// Secret access key.
    #[serde(default)]
    pub secret_access_key: Option<String>,
    /// Base used to build public object URLs instead of the AWS convention.
    #[serde(default)]
    pub public_url_base: Option<String>,
    /// Azure storage account name.
    #[serde(default)]
    pub account: Option<String>,
    /// Azure storage account key.
    #[serde(default)]
    pub access_key: Option<String>,
    /// Root directory for the `fs` provider.
    #[serde(default)]
    pub root: Option<String>,
}

impl Default for StorageSettings {
    fn default() -> Self {
        Self {
            provider: default_provider(),
            bucket: String::new(),
            region: default_region(),
            endpoint: None,
            access_key_id: None,
            secret_access_key: None,
            public_url_base: None,
            account: None,
            access_key: None,
            root: None,
        }
    }
}

fn default_provider() -> String {
    "s3".to_string()
}

fn default_region() -> String {
    "us-east-1".to_string()
}

impl AppConfig {
    /// Loads configuration from environment and config files.
    ///
    /// Sources, later ones winning: `config/default`, `config/{RUN_MODE}`,
    /// then `FILEGATE__*` environment variables (e.g. `FILEGATE__STORAGE__BUCKET`).
    ///
    /// # Errors
    ///
    /// Returns an error if configuration cannot be loaded.
    pub fn load() -> Result<Self, config::ConfigError> {
        let run_mode = std::env::var("RUN_MODE").unwrap_or_else(|_| "development".to_string());

        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{run_mode}")).required(false))
            .add_source(config::Environment::with_prefix("FILEGATE").separator("__"))
            .build()?;

        config.try_deserialize()
    }

    /// Address the server binds to.
    #[must_use]
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_without_sources() {
        temp_env::with_vars_unset(
            [
                "RUN_MODE",
                "FILEGATE__SERVER__PORT",
                "FILEGATE__STORAGE__BUCKET",
                "FILEGATE__STORAGE__PROVIDER",
            ],
            || {
                let config = AppConfig::load().expect("config should load");
                assert_eq!(config.server.host, "0.0.0.0");
                assert_eq!(config.server.port, 8080);
                assert_eq!(config.server.max_upload_bytes, 10 * 1024 * 1024);
                assert_eq!(config.storage.provider, "s3");
                assert_eq!(config.storage.region, "us-east-1");
                assert!(config.storage.bucket.is_empty());
                assert!(config.storage.access_key_id.is_none());
            },
        );
    }

    #[test]
    fn test_environment_overrides() {
        temp_env::with_vars(
            [
                ("RUN_MODE", Some("test")),
                ("FILEGATE__SERVER__PORT", Some("9001")),
                ("FILEGATE__STORAGE__BUCKET", Some("uploads")),
                ("FILEGATE__STORAGE__REGION", Some("eu-west-1")),
            ],
            || {
                let config = AppConfig::load().expect("config should load");
                assert_eq!(config.server.port, 9001);
                assert_eq!(config.storage.bucket, "uploads");
                assert_eq!(config.storage.region, "eu-west-1");
                assert_eq!(config.bind_addr(), "0.0.0.0:9001");
            },
        );
    }

    #[test]
    fn test_storage_settings_default() {
        let settings = StorageSettings::default();
        assert_eq!(settings.provider, "s3");
        assert!(settings.endpoint.is_none());
        assert!(settings.root.is_none());
    }
}
