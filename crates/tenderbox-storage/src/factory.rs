use crate::{LocalStorage, Storage, StorageResult};
use std::sync::Arc;
use tenderbox_core::Config;

/// Create the storage backend described by the configuration
pub async fn create_storage(config: &Config) -> StorageResult<Arc<dyn Storage>> {
    let storage = LocalStorage::new(config.upload_dir().clone()).await?;
    tracing::info!(
        path = %storage.base_path().display(),
        "Local storage initialized"
    );
    Ok(Arc::new(storage))
}
