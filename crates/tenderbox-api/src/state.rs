//! Application state shared by every handler.

use crate::services::{DownloadService, TenderService};
use std::sync::Arc;
use tenderbox_core::Clock;
use tenderbox_db::TenderStore;
use tenderbox_storage::Storage;

/// Limits applied while reading upload bodies
#[derive(Debug, Clone, Copy)]
pub struct UploadLimits {
    /// Largest accepted document; anything larger is counted but not buffered
    pub max_file_size: u64,
    /// Browser cache lifetime for inline document views
    pub inline_cache_max_age_secs: u64,
}

#[derive(Clone)]
pub struct AppState {
    pub tenders: TenderService,
    pub downloads: DownloadService,
    pub store: Arc<dyn TenderStore>,
    pub storage: Arc<dyn Storage>,
    pub clock: Arc<dyn Clock>,
    pub limits: UploadLimits,
}
