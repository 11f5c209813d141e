//! Storage service implementation using Apache OpenDAL.

use std::collections::BTreeMap;

use bytes::Bytes;
use futures::TryStreamExt;
use opendal::{Builder, ErrorKind, Metadata, Operator, services};
use serde::Serialize;
use tracing::{error, info, warn};
use uuid::Uuid;

use super::config::{StorageConfig, StorageProvider};
use super::error::StorageError;

/// Separator between the random token and the original filename in a key.
pub const KEY_SEPARATOR: char = '_';

/// Content type reported when the provider has none on record.
pub const DEFAULT_CONTENT_TYPE: &str = "application/octet-stream";

const BUCKET_NOT_CONFIGURED: &str = "S3 bucket name not configured";

/// Result of a successful upload.
#[derive(Debug, Clone)]
pub struct UploadedObject {
    /// Generated storage key.
    pub file_key: String,
    /// Public URL of the object.
    pub url: String,
    /// Filename supplied by the caller.
    pub original_filename: String,
}

/// Result of a successful download.
#[derive(Debug, Clone)]
pub struct DownloadedObject {
    /// Storage key.
    pub file_key: String,
    /// Full object content.
    pub content: Bytes,
    /// Stored content type, or [`DEFAULT_CONTENT_TYPE`].
    pub content_type: String,
}

/// One entry of a listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ObjectSummary {
    /// Storage key.
    pub key: String,
    /// Object size in bytes.
    pub size: u64,
    /// Last modification time (RFC 3339), when the provider reports one.
    pub last_modified: Option<String>,
}

/// Storage service over a single bucket.
pub struct StorageService {
    operator: Option<Operator>,
    config: StorageConfig,
}

impl StorageService {
    /// Create a new storage service from configuration.
    ///
    /// A missing bucket name does not fail construction; every operation
    /// reports it instead.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage provider cannot be initialized.
    pub fn from_config(config: StorageConfig) -> Result<Self, StorageError> {
        let operator = if config.provider.has_bucket() {
            Some(Self::create_operator(&config.provider)?)
        } else {
            warn!(
                provider = config.provider.name(),
                "Storage bucket name not configured; all storage calls will fail"
            );
            None
        };

        Ok(Self { operator, config })
    }

    /// Create OpenDAL operator from provider config.
    fn create_operator(provider: &StorageProvider) -> Result<Operator, StorageError> {
        match provider {
            StorageProvider::S3 {
                bucket,
                region,
                endpoint,
                access_key_id,
                secret_access_key,
            } => {
                let mut builder = services::S3::default().bucket(bucket).region(region);
                if let Some(endpoint) = endpoint {
                    builder = builder.endpoint(endpoint);
                }
                if let Some(access_key_id) = access_key_id {
                    builder = builder.access_key_id(access_key_id);
                }
                if let Some(secret_access_key) = secret_access_key {
                    builder = builder.secret_access_key(secret_access_key);
                }
                finish(builder)
            }
            StorageProvider::AzureBlob {
                account,
                access_key,
                container,
            } => finish(
                services::Azblob::default()
                    .account_name(account)
                    .account_key(access_key)
                    .container(container),
            ),
            StorageProvider::LocalFs { root } => {
                let root = root
                    .to_str()
                    .ok_or_else(|| StorageError::configuration("invalid path"))?;
                finish(services::Fs::default().root(root))
            }
            StorageProvider::Memory => finish(services::Memory::default()),
        }
    }

    fn operator(&self) -> Result<&Operator, StorageError> {
        self.operator
            .as_ref()
            .ok_or_else(|| StorageError::configuration(BUCKET_NOT_CONFIGURED))
    }

    /// Upload `content` under a freshly generated key.
    ///
    /// # Errors
    ///
    /// Returns a configuration error when no bucket is set, otherwise the
    /// provider's error.
    pub async fn put(
        &self,
        content: Bytes,
        filename: &str,
        content_type: Option<&str>,
    ) -> Result<UploadedObject, StorageError> {
        let operator = self.operator().inspect_err(|e| {
            error!(operation = "put", filename, error = %e, "Upload rejected");
        })?;

        let key = generate_object_key(filename);
        let size = content.len();

        let mut write = operator.write_with(&key, content);
        if let Some(content_type) = content_type {
            write = write.content_type(content_type);
        }

        if let Err(e) = write.await {
            let err = StorageError::from_provider(&key, &e);
            error!(operation = "put", key = %key, error = %err, "Failed to upload object");
            return Err(err);
        }

        info!(operation = "put", key = %key, size, "Uploaded object");

        Ok(UploadedObject {
            url: self.config.object_url(&key),
            file_key: key,
            original_filename: filename.to_string(),
        })
    }

    /// Fetch the full content and content type of an object.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::NotFound`] when the key does not exist.
    pub async fn get(&self, key: &str) -> Result<DownloadedObject, StorageError> {
        let result = self.fetch(key).await;

        match &result {
            Ok(object) => {
                info!(operation = "get", key, size = object.content.len(), "Downloaded object");
            }
            Err(e) => error!(operation = "get", key, error = %e, "Failed to download object"),
        }

        result
    }

    async fn fetch(&self, key: &str) -> Result<DownloadedObject, StorageError> {
        let operator = self.operator()?;

        let meta = operator
            .stat(key)
            .await
            .map_err(|e| StorageError::from_provider(key, &e))?;
        let content = operator
            .read(key)
            .await
            .map_err(|e| StorageError::from_provider(key, &e))?
            .to_bytes();

        Ok(DownloadedObject {
            file_key: key.to_string(),
            content,
            content_type: meta
                .content_type()
                .unwrap_or(DEFAULT_CONTENT_TYPE)
                .to_string(),
        })
    }

    /// Delete an object. Deleting a key that does not exist succeeds.
    ///
    /// # Errors
    ///
    /// Returns an error if the provider rejects the call.
    pub async fn delete(&self, key: &str) -> Result<String, StorageError> {
        let result = match self.operator() {
            Ok(operator) => operator
                .delete(key)
                .await
                .map_err(|e| StorageError::from_provider(key, &e)),
            Err(e) => Err(e),
        };

        match result {
            Ok(()) => {
                info!(operation = "delete", key, "Deleted object");
                Ok(key.to_string())
            }
            Err(e) => {
                error!(operation = "delete", key, error = %e, "Failed to delete object");
                Err(e)
            }
        }
    }

    /// List up to `max_keys` objects whose key starts with `prefix`, in key
    /// order. There is no continuation; callers cannot page past `max_keys`.
    ///
    /// # Errors
    ///
    /// Returns an error if the provider rejects the call.
    pub async fn list(
        &self,
        prefix: &str,
        max_keys: usize,
    ) -> Result<Vec<ObjectSummary>, StorageError> {
        let result = self.scan(prefix, max_keys).await;

        match &result {
            Ok(files) => info!(operation = "list", prefix, count = files.len(), "Listed objects"),
            Err(e) => error!(operation = "list", prefix, error = %e, "Failed to list objects"),
        }

        result
    }

    async fn scan(&self, prefix: &str, max_keys: usize) -> Result<Vec<ObjectSummary>, StorageError> {
        let operator = self.operator()?;
        if max_keys == 0 {
            return Ok(Vec::new());
        }

        let dir = list_dir(prefix);
        let mut lister = match operator.lister_with(dir).recursive(true).await {
            Ok(lister) => lister,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(StorageError::from_provider(dir, &e)),
        };

        let in_key_order = self.config.provider.lists_in_key_order();
        // The `max_keys` smallest matching keys seen so far.
        let mut matches = BTreeMap::new();
        while let Some(entry) = lister
            .try_next()
            .await
            .map_err(|e| StorageError::from_provider(dir, &e))?
        {
            let (path, meta) = entry.into_parts();
            if meta.is_dir() {
                continue;
            }
            if !path.starts_with(prefix) {
                // Past the block of keys sharing the prefix.
                if in_key_order && path.as_str() > prefix {
                    break;
                }
                continue;
            }

            matches.insert(path, meta);
            if matches.len() > max_keys {
                matches.pop_last();
            }
            if in_key_order && matches.len() == max_keys {
                break;
            }
        }

        let mut files = Vec::with_capacity(matches.len());
        for (path, meta) in matches {
            let meta = if self.config.provider.lists_full_metadata() {
                meta
            } else {
                match operator.stat(&path).await {
                    Ok(meta) => meta,
                    // Removed between list and stat.
                    Err(e) if e.kind() == ErrorKind::NotFound => continue,
                    Err(e) => return Err(StorageError::from_provider(&path, &e)),
                }
            };
            files.push(summarize(&path, &meta));
        }

        Ok(files)
    }

    /// Get the storage provider name.
    #[must_use]
    pub fn provider_name(&self) -> &'static str {
        self.config.provider.name()
    }

    /// Get the bucket/container name.
    #[must_use]
    pub fn bucket(&self) -> &str {
        self.config.provider.bucket()
    }
}

/// Generate the storage key for an upload: `{32-hex token}_{filename}`.
#[must_use]
pub fn generate_object_key(filename: &str) -> String {
    format!("{}{KEY_SEPARATOR}{filename}", Uuid::new_v4().simple())
}

/// Recover the caller's filename from a key by dropping everything up to
/// the first separator. Keys without a separator are returned whole.
#[must_use]
pub fn original_filename(key: &str) -> &str {
    key.split_once(KEY_SEPARATOR).map_or(key, |(_, name)| name)
}

fn finish(builder: impl Builder) -> Result<Operator, StorageError> {
    Ok(Operator::new(builder)
        .map_err(|e| StorageError::configuration(e.to_string()))?
        .finish())
}

/// Deepest directory that can contain every key starting with `prefix`.
fn list_dir(prefix: &str) -> &str {
    match prefix.rfind('/') {
        Some(idx) => &prefix[..=idx],
        None => "/",
    }
}

fn summarize(key: &str, meta: &Metadata) -> ObjectSummary {
    ObjectSummary {
        key: key.to_string(),
        size: meta.content_length(),
        last_modified: meta.last_modified().map(|ts| ts.to_string()),
    }
}


#[cfg(test)]
mod property_tests {
    use super::*;
    use proptest::prelude::*;

    // Generated keys always have the `{32-hex}_{filename}` shape.
    proptest! {
        #[test]
        fn prop_object_key_format(filename in "[a-zA-Z0-9 ._()-]{1,60}") {
            let key = generate_object_key(&filename);
            let (token, rest) = key.split_at(32);

            prop_assert!(token.chars().all(|c| c.is_ascii_hexdigit()));
            prop_assert_eq!(rest, format!("_{filename}"));
        }
    }

    // Stripping the token recovers exactly the filename, underscores included.
    proptest! {
        #[test]
        fn prop_original_filename_round_trip(filename in ".{0,60}") {
            let key = generate_object_key(&filename);
            prop_assert_eq!(original_filename(&key), filename.as_str());
        }
    }
}
