//! Storage configuration types.

use filegate_shared::StorageSettings;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use super::error::StorageError;

/// Storage provider configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StorageProvider {
    /// S3-compatible storage: AWS S3, Cloudflare R2, MinIO, DigitalOcean Spaces
    S3 {
        /// S3 bucket name.
        bucket: String,
        /// AWS region.
        region: String,
        /// Custom endpoint URL; `None` targets AWS itself.
        endpoint: Option<String>,
        /// AWS access key ID; `None` defers to the default credential chain.
        access_key_id: Option<String>,
        /// AWS secret access key.
        secret_access_key: Option<String>,
    },
    /// Azure Blob Storage
    AzureBlob {
        /// Azure storage account name.
        account: String,
        /// Azure storage access key.
        access_key: String,
        /// Azure container name.
        container: String,
    },
    /// Local filesystem (development only)
    LocalFs {
        /// Root directory path.
        root: PathBuf,
    },
    /// Process-local memory (tests)
    Memory,
}

impl StorageProvider {
    /// Create an AWS S3 provider using the default credential chain.
    #[must_use]
    pub fn s3(bucket: impl Into<String>, region: impl Into<String>) -> Self {
        Self::S3 {
            bucket: bucket.into(),
            region: region.into(),
            endpoint: None,
            access_key_id: None,
            secret_access_key: None,
        }
    }

    /// Create Azure Blob Storage provider.
    #[must_use]
    pub fn azure_blob(
        account: impl Into<String>,
        access_key: impl Into<String>,
        container: impl Into<String>,
    ) -> Self {
        Self::AzureBlob {
            account: account.into(),
            access_key: access_key.into(),
            container: container.into(),
        }
    }

    /// Create local filesystem provider (development only).
    #[must_use]
    pub fn local_fs(root: impl Into<PathBuf>) -> Self {
        Self::LocalFs { root: root.into() }
    }

    /// Get the provider name.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::S3 { .. } => "s3",
            Self::AzureBlob { .. } => "azure_blob",
            Self::LocalFs { .. } => "local",
            Self::Memory => "memory",
        }
    }

    /// Get the bucket/container name.
    #[must_use]
    pub fn bucket(&self) -> &str {
        match self {
            Self::S3 { bucket, .. } => bucket,
            Self::AzureBlob { container, .. } => container,
            Self::LocalFs { root } => root.to_str().unwrap_or("local"),
            Self::Memory => "memory",
        }
    }

    /// Whether a destination bucket has been named.
    #[must_use]
    pub fn has_bucket(&self) -> bool {
        match self {
            Self::S3 { bucket, .. } => !bucket.trim().is_empty(),
            Self::AzureBlob { container, .. } => !container.trim().is_empty(),
            Self::LocalFs { .. } | Self::Memory => true,
        }
    }

    /// Whether listing returns size and modification time for every entry,
    /// so no follow-up `stat` is needed.
    #[must_use]
    pub fn lists_full_metadata(&self) -> bool {
        matches!(self, Self::S3 { .. } | Self::AzureBlob { .. })
    }

    /// Whether listing yields keys in ascending byte order, so a scan can
    /// stop once it has walked past a prefix.
    #[must_use]
    pub fn lists_in_key_order(&self) -> bool {
        !matches!(self, Self::LocalFs { .. })
    }
}

/// Storage service configuration.
#[derive(Debug, Clone)]
pub struct StorageConfig {
    /// Storage provider configuration.
    pub provider: StorageProvider,
    /// Base for public object URLs, overriding the provider convention.
    pub public_url_base: Option<String>,
}

impl StorageConfig {
    /// Create a new storage config.
    #[must_use]
    pub fn new(provider: StorageProvider) -> Self {
        Self {
            provider,
            public_url_base: None,
        }
    }

    /// Set the public URL base.
    #[must_use]
    pub fn with_public_url_base(mut self, base: impl Into<String>) -> Self {
        self.public_url_base = Some(base.into());
        self
    }

    /// Public URL of an object under this configuration.
    ///
    /// S3 follows `https://{bucket}.s3.{region}.amazonaws.com/{key}`.
    #[must_use]
    pub fn object_url(&self, key: &str) -> String {
        if let Some(base) = &self.public_url_base {
            return format!("{}/{key}", base.trim_end_matches('/'));
        }

        match &self.provider {
            StorageProvider::S3 { bucket, region, .. } => {
                format!("https://{bucket}.s3.{region}.amazonaws.com/{key}")
            }
            StorageProvider::AzureBlob {
                account, container, ..
            } => format!("https://{account}.blob.core.windows.net/{container}/{key}"),
            StorageProvider::LocalFs { root } => {
                format!("file://{}/{key}", root.display().to_string().trim_end_matches('/'))
            }
            StorageProvider::Memory => format!("memory:///{key}"),
        }
    }
}

impl TryFrom<&StorageSettings> for StorageConfig {
    type Error = StorageError;

    fn try_from(settings: &StorageSettings) -> Result<Self, Self::Error> {
        let provider = match settings.provider.as_str() {
            "s3" => StorageProvider::S3 {
                bucket: settings.bucket.clone(),
                region: settings.region.clone(),
                endpoint: non_empty(settings.endpoint.as_ref()),
                access_key_id: non_empty(settings.access_key_id.as_ref()),
                secret_access_key: non_empty(settings.secret_access_key.as_ref()),
            },
            "azblob" => StorageProvider::AzureBlob {
                account: required(settings.account.as_ref(), "account")?,
                access_key: required(settings.access_key.as_ref(), "access_key")?,
                container: settings.bucket.clone(),
            },
            "fs" => StorageProvider::LocalFs {
                root: required(settings.root.as_ref(), "root")?.into(),
            },
            "memory" => StorageProvider::Memory,
            other => {
                return Err(StorageError::configuration(format!(
                    "unknown storage provider '{other}'"
                )));
            }
        };

        Ok(Self {
            provider,
            public_url_base: non_empty(settings.public_url_base.as_ref()),
        })
    }
}

fn non_empty(value: Option<&String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty()).cloned()
}

fn required(value: Option<&String>, field: &str) -> Result<String, StorageError> {
    non_empty(value)
        .ok_or_else(|| StorageError::configuration(format!("storage.{field} is required")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_storage_provider_s3() {
        let provider = StorageProvider::s3("attachments", "us-east-1");
        assert_eq!(provider.name(), "s3");
        assert_eq!(provider.bucket(), "attachments");
        assert!(provider.has_bucket());
        assert!(provider.lists_full_metadata());
        assert!(provider.lists_in_key_order());
    }

    #[test]
    fn test_storage_provider_s3_blank_bucket() {
        let provider = StorageProvider::s3("  ", "us-east-1");
        assert!(!provider.has_bucket());
    }

    #[test]
    fn test_storage_provider_azure() {
        let provider = StorageProvider::azure_blob("filegatedev", "access_key", "uploads");
        assert_eq!(provider.name(), "azure_blob");
        assert_eq!(provider.bucket(), "uploads");
    }

    #[test]
    fn test_storage_provider_local_and_memory() {
        let provider = StorageProvider::local_fs("./storage");
        assert_eq!(provider.name(), "local");
        assert!(!provider.lists_full_metadata());
        assert!(!provider.lists_in_key_order());
        assert_eq!(StorageProvider::Memory.name(), "memory");
        assert!(StorageProvider::Memory.lists_in_key_order());
        assert!(StorageProvider::Memory.has_bucket());
    }

    #[test]
    fn test_object_url_aws_convention() {
        let config = StorageConfig::new(StorageProvider::s3("my-bucket", "eu-west-1"));
        assert_eq!(
            config.object_url("abc_hello.txt"),
            "https://my-bucket.s3.eu-west-1.amazonaws.com/abc_hello.txt"
        );
    }

    #[test]
    fn test_object_url_public_base_override() {
        let config = StorageConfig::new(StorageProvider::s3("my-bucket", "auto"))
            .with_public_url_base("https://cdn.example.com/");
        assert_eq!(
            config.object_url("abc_hello.txt"),
            "https://cdn.example.com/abc_hello.txt"
        );
    }

    #[test]
    fn test_object_url_azure() {
        let config = StorageConfig::new(StorageProvider::azure_blob("acct", "key", "files"));
        assert_eq!(
            config.object_url("k"),
            "https://acct.blob.core.windows.net/files/k"
        );
    }

    #[test]
    fn test_from_settings_s3() {
        let settings = StorageSettings {
            bucket: "uploads".into(),
            region: "ap-south-1".into(),
            access_key_id: Some(String::new()),
            ..StorageSettings::default()
        };
        let config = StorageConfig::try_from(&settings).expect("valid settings");
        match config.provider {
            StorageProvider::S3 {
                bucket,
                region,
                access_key_id,
                ..
            } => {
                assert_eq!(bucket, "uploads");
                assert_eq!(region, "ap-south-1");
                assert!(access_key_id.is_none());
            }
            other => panic!("unexpected provider {other:?}"),
        }
    }

    #[test]
    fn test_from_settings_fs_requires_root() {
        let settings = StorageSettings {
            provider: "fs".into(),
            ..StorageSettings::default()
        };
        let err = StorageConfig::try_from(&settings).unwrap_err();
        assert!(matches!(err, StorageError::Configuration(_)));
    }

    #[test]
    fn test_from_settings_unknown_provider() {
        let settings = StorageSettings {
            provider: "gcs".into(),
            ..StorageSettings::default()
        };
        let err = StorageConfig::try_from(&settings).unwrap_err();
        assert!(err.to_string().contains("unknown storage provider 'gcs'"));
    }

    #[test]
    fn test_from_settings_memory() {
        let settings = StorageSettings {
            provider: "memory".into(),
            ..StorageSettings::default()
        };
        let config = StorageConfig::try_from(&settings).expect("valid settings");
        assert_eq!(config.provider.name(), "memory");
    }
}
