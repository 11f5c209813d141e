//! Storage error types.

use thiserror::Error;

/// Storage operation errors.
#[derive(Debug, Error)]
pub enum StorageError {
    /// Object not found in storage.
    #[error("file not found: {key}")]
    NotFound {
        /// Storage key that was not found.
        key: String,
    },

    /// Storage provider configuration error.
    #[error("storage configuration error: {0}")]
    Configuration(String),

    /// Provider call failed (transport, auth, permission, ...).
    #[error("storage operation failed: {0}")]
    Operation(String),
}

impl StorageError {
    /// Create a not found error.
    #[must_use]
    pub fn not_found(key: impl Into<String>) -> Self {
        Self::NotFound { key: key.into() }
    }

    /// Create a configuration error.
    #[must_use]
    pub fn configuration(msg: impl Into<String>) -> Self {
        Self::Configuration(msg.into())
    }

    /// Normalize an OpenDAL error raised while working on `key`.
    ///
    /// The provider's error code decides the variant: `NoSuchKey` and its
    /// equivalents surface as [`StorageError::NotFound`].
    #[must_use]
    pub fn from_provider(key: &str, err: &opendal::Error) -> Self {
        match err.kind() {
            opendal::ErrorKind::NotFound => Self::not_found(key),
            opendal::ErrorKind::ConfigInvalid => Self::Configuration(err.to_string()),
            _ => Self::Operation(err.to_string()),
        }
    }

    /// Whether this is a missing-object error.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_provider_not_found_keeps_key() {
        let err = opendal::Error::new(opendal::ErrorKind::NotFound, "NoSuchKey");
        let mapped = StorageError::from_provider("abc_hello.txt", &err);
        assert!(mapped.is_not_found());
        assert_eq!(mapped.to_string(), "file not found: abc_hello.txt");
    }

    #[test]
    fn test_from_provider_other_kinds() {
        let err = opendal::Error::new(opendal::ErrorKind::PermissionDenied, "AccessDenied");
        let mapped = StorageError::from_provider("k", &err);
        assert!(matches!(mapped, StorageError::Operation(ref msg) if msg.contains("AccessDenied")));

        let err = opendal::Error::new(opendal::ErrorKind::ConfigInvalid, "bad region");
        let mapped = StorageError::from_provider("k", &err);
        assert!(matches!(mapped, StorageError::Configuration(_)));
    }
}
