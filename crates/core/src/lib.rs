//! Storage adapter for Filegate.
//!
//! This crate wraps an object-storage bucket behind four operations
//! (put, get, delete, list) with a uniform error type. It has ZERO web
//! dependencies; the HTTP layer lives in `filegate-api`.
//!
//! # Modules
//!
//! - `storage` - OpenDAL-backed storage service, provider config and errors

pub mod storage;
