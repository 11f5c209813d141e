//! Object storage adapter using Apache OpenDAL.
//!
//! This module provides vendor-agnostic object storage with support for:
//! - S3-compatible: AWS S3, Cloudflare R2, MinIO, DigitalOcean Spaces
//! - Azure Blob Storage
//! - Local filesystem (development only)
//! - In-memory (tests)
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                      Apache OpenDAL                              │
//! │                   (Unified Storage API)                          │
//! ├─────────────────────────────────────────────────────────────────┤
//! │ put    -> op.write_with(key, data).content_type(..)              │
//! │ get    -> op.stat(key) + op.read(key)                            │
//! │ delete -> op.delete(key)                                         │
//! │ list   -> op.list_with(dir).recursive(true)                      │
//! └─────────────────────────────────────────────────────────────────┘
//! ```

mod config;
mod error;
mod service;

pub use config::{StorageConfig, StorageProvider};
pub use error::StorageError;
pub use service::{
    DEFAULT_CONTENT_TYPE, DownloadedObject, KEY_SEPARATOR, ObjectSummary, StorageService,
    UploadedObject, generate_object_key, original_filename,
};
