//! Storage setup and initialization

use anyhow::{Context, Result};
use std::sync::Arc;
use tenderbox_core::Config;
use tenderbox_storage::{create_storage, Storage};

/// Create the document store and confirm it is writable before accepting traffic
pub async fn setup_storage(config: &Config) -> Result<Arc<dyn Storage>> {
    tracing::info!("Initializing document storage...");
    let storage = create_storage(config)
        .await
        .context("Failed to initialize document storage")?;
    storage
        .health_check()
        .await
        .context("Document storage is not usable")?;

    tracing::info!(
        upload_dir = %config.upload_dir().display(),
        "Document storage initialized successfully"
    );
    Ok(storage)
}
