//! Tenderbox Storage Library
//!
//! Storage abstraction for tender documents and its local filesystem implementation.
//!
//! # Storage key format
//!
//! - **Committed documents**: `tenders/{stored_name}`
//! - **Staged uploads**: `.staging/{stored_name}`
//!
//! `stored_name` is `tenderDocument-{unix_millis}-{8 hex}.{ext}`. Keys must not contain `..`
//! or a leading `/`. Key generation is centralized in the `keys` module.

#[cfg(feature = "storage-local")]
pub mod factory;
pub mod keys;
#[cfg(feature = "storage-local")]
pub mod local;
pub mod traits;

// Re-export commonly used types
#[cfg(feature = "storage-local")]
pub use factory::create_storage;
#[cfg(feature = "storage-local")]
pub use local::LocalStorage;
pub use traits::{ByteStream, StagedFile, Storage, StorageError, StorageResult};
