//! Wiring of services into the shared application state

use crate::services::{DownloadService, TenderService};
use crate::state::{AppState, UploadLimits};
use std::sync::Arc;
use tenderbox_core::{Clock, Config, UploadValidator};
use tenderbox_db::TenderStore;
use tenderbox_storage::Storage;

/// Build the application state around the given record store, document storage and clock
pub fn initialize_services(
    config: &Config,
    store: Arc<dyn TenderStore>,
    storage: Arc<dyn Storage>,
    clock: Arc<dyn Clock>,
) -> Arc<AppState> {
    let validator = UploadValidator::new(config.max_upload_size_bytes());

    let tenders = TenderService::new(
        store.clone(),
        storage.clone(),
        clock.clone(),
        validator,
        config.remove_orphaned_files(),
    );
    let downloads = DownloadService::new(store.clone(), storage.clone());

    tracing::info!(
        remove_orphaned_files = config.remove_orphaned_files(),
        max_upload_size_bytes = config.max_upload_size_bytes(),
        "Tender services initialized"
    );

    Arc::new(AppState {
        tenders,
        downloads,
        store,
        storage,
        clock,
        limits: UploadLimits {
            max_file_size: config.max_upload_size_bytes(),
            inline_cache_max_age_secs: config.inline_cache_max_age_secs(),
        },
    })
}
