//! Storage abstraction trait
//!
//! This module defines the Storage trait that all storage backends must implement.

use async_trait::async_trait;
use bytes::Bytes;
use futures::Stream;
use std::pin::Pin;
use thiserror::Error;

/// Storage operation errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Upload failed: {0}")]
    UploadFailed(String),

    #[error("Download failed: {0}")]
    DownloadFailed(String),

    #[error("Delete failed: {0}")]
    DeleteFailed(String),

    #[error("Promote failed: {0}")]
    PromoteFailed(String),

    #[error("File not found: {0}")]
    NotFound(String),

    #[error("Invalid storage key: {0}")]
    InvalidKey(String),

    #[error("Storage backend error: {0}")]
    BackendError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Chunked file body
pub type ByteStream = Pin<Box<dyn Stream<Item = Result<Bytes, StorageError>> + Send>>;

/// Bytes written to the staging area, not yet visible under their final key
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StagedFile {
    /// Where the bytes currently live (`.staging/...`)
    pub staging_key: String,
    /// Where the bytes will live once promoted (`tenders/...`); this is what records reference
    pub key: String,
    pub size_bytes: u64,
}

/// Storage abstraction trait
///
/// Uploads go through two phases: `stage` writes the bytes under a staging key and reserves the
/// final key, then `promote` moves them into place once the owning record is committed. A staged
/// file that is never promoted must be released with `discard`.
#[async_trait]
pub trait Storage: Send + Sync {
    /// Write `data` to the staging area under a freshly generated name derived from
    /// `original_filename`'s extension.
    async fn stage(&self, original_filename: &str, data: Bytes) -> StorageResult<StagedFile>;

    /// Move a staged file to its final key
    async fn promote(&self, staged: &StagedFile) -> StorageResult<()>;

    /// Remove a staged file that will not be promoted
    async fn discard(&self, staged: &StagedFile) -> StorageResult<()>;

    /// Delete a file by its storage key. Deleting a missing key is not an error.
    async fn delete(&self, storage_key: &str) -> StorageResult<()>;

    /// Check if a file exists
    async fn exists(&self, storage_key: &str) -> StorageResult<bool>;

    /// Get the size in bytes of an object, if it exists.
    async fn content_length(&self, storage_key: &str) -> StorageResult<u64>;

    /// Read a whole file into memory (small files and tests only)
    async fn download(&self, storage_key: &str) -> StorageResult<Vec<u8>>;

    /// Download a file as a stream of chunks without buffering it in memory.
    ///
    /// Dropping the stream closes the underlying file.
    async fn download_stream(&self, storage_key: &str) -> StorageResult<ByteStream>;

    /// Verify the backend is usable
    async fn health_check(&self) -> StorageResult<()>;
}
