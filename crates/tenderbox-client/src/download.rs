//! Tender document downloads
//!
//! The primary path fetches the bytes and hands them to the platform for saving. Mobile
//! browsers often refuse programmatic saves, so on those user agents a failed fetch falls back
//! to navigating to the force-download URL and then to opening the inline view in a new tab.

use crate::api::DownloadedDocument;
use crate::TenderClient;
use regex::Regex;
use std::collections::HashSet;
use std::sync::{Arc, LazyLock, Mutex};
use uuid::Uuid;

static MOBILE_USER_AGENT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)android|webos|iphone|ipad|ipod|blackberry|iemobile|opera mini|mobile")
        .expect("mobile user agent pattern is valid")
});

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DownloadStrategy {
    /// Fetch through the API and save the bytes locally
    FetchAndSave,
    /// Point the browser at the force-download URL
    DirectNavigation,
    /// Open the inline view in a new tab
    InlineNewTab,
}

impl DownloadStrategy {
    pub fn label(&self) -> &'static str {
        match self {
            DownloadStrategy::FetchAndSave => "Download",
            DownloadStrategy::DirectNavigation => "Open download link",
            DownloadStrategy::InlineNewTab => "View in new tab",
        }
    }
}

const MANUAL_ALTERNATIVES: &[DownloadStrategy] = &[
    DownloadStrategy::DirectNavigation,
    DownloadStrategy::InlineNewTab,
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Platform {
    Desktop,
    Mobile,
}

impl Platform {
    pub fn from_user_agent(user_agent: &str) -> Self {
        if MOBILE_USER_AGENT.is_match(user_agent) {
            Platform::Mobile
        } else {
            Platform::Desktop
        }
    }

    /// Strategies tried automatically, in order
    pub fn strategies(&self) -> &'static [DownloadStrategy] {
        match self {
            Platform::Desktop => &[DownloadStrategy::FetchAndSave],
            Platform::Mobile => &[
                DownloadStrategy::FetchAndSave,
                DownloadStrategy::DirectNavigation,
                DownloadStrategy::InlineNewTab,
            ],
        }
    }
}

/// Platform hooks that actually deliver the document to the user
pub trait DownloadSink: Send {
    fn save(&mut self, document: &DownloadedDocument) -> Result<(), String>;
    fn navigate(&mut self, url: &str) -> Result<(), String>;
    fn open_in_new_tab(&mut self, url: &str) -> Result<(), String>;
}

/// Tenders with a download running; their trigger controls stay disabled
#[derive(Debug, Clone, Default)]
pub struct InFlightDownloads {
    active: Arc<Mutex<HashSet<Uuid>>>,
}

impl InFlightDownloads {
    pub fn new() -> Self {
        Self::default()
    }

    /// `None` when a download for this tender is already running
    pub fn try_begin(&self, id: Uuid) -> Option<DownloadGuard> {
        let inserted = self.lock().insert(id);
        inserted.then(|| DownloadGuard {
            id,
            active: Arc::clone(&self.active),
        })
    }

    pub fn is_in_flight(&self, id: Uuid) -> bool {
        self.lock().contains(&id)
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashSet<Uuid>> {
        self.active
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

/// Marks the tender as no longer downloading when dropped
#[derive(Debug)]
pub struct DownloadGuard {
    id: Uuid,
    active: Arc<Mutex<HashSet<Uuid>>>,
}

impl Drop for DownloadGuard {
    fn drop(&mut self) {
        self.active
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .remove(&self.id);
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DownloadOutcome {
    Completed(DownloadStrategy),
    /// Ignored because the same tender is already downloading
    AlreadyInProgress,
}

/// Shown to the user with links for the alternatives
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadFailure {
    pub message: String,
    pub alternatives: Vec<DownloadStrategy>,
}

#[derive(Clone)]
pub struct Downloader {
    client: TenderClient,
    platform: Platform,
    in_flight: InFlightDownloads,
}

impl Downloader {
    pub fn new(client: TenderClient, platform: Platform) -> Self {
        Self {
            client,
            platform,
            in_flight: InFlightDownloads::new(),
        }
    }

    pub fn platform(&self) -> Platform {
        self.platform
    }

    pub fn is_in_flight(&self, id: Uuid) -> bool {
        self.in_flight.is_in_flight(id)
    }

    /// Try the platform's strategies in order until one succeeds
    pub async fn download(
        &self,
        id: Uuid,
        sink: &mut dyn DownloadSink,
    ) -> Result<DownloadOutcome, DownloadFailure> {
        let Some(_guard) = self.in_flight.try_begin(id) else {
            tracing::debug!(tender_id = %id, "Download already in progress");
            return Ok(DownloadOutcome::AlreadyInProgress);
        };

        let mut last_error = String::new();
        for strategy in self.platform.strategies() {
            match self.run(*strategy, id, sink).await {
                Ok(()) => return Ok(DownloadOutcome::Completed(*strategy)),
                Err(e) => {
                    tracing::warn!(
                        tender_id = %id,
                        strategy = ?strategy,
                        error = %e,
                        "Download strategy failed"
                    );
                    last_error = e;
                }
            }
        }

        Err(DownloadFailure {
            message: format!(
                "Failed to download the tender document ({}). Try opening the link directly or viewing it in a new tab.",
                last_error
            ),
            alternatives: MANUAL_ALTERNATIVES.to_vec(),
        })
    }

    /// Run one strategy, e.g. when the user picks an alternative by hand
    pub async fn run(
        &self,
        strategy: DownloadStrategy,
        id: Uuid,
        sink: &mut dyn DownloadSink,
    ) -> Result<(), String> {
        match strategy {
            DownloadStrategy::FetchAndSave => {
                let document = self.client.download(id).await.map_err(|e| e.to_string())?;
                sink.save(&document)
            }
            DownloadStrategy::DirectNavigation => sink.navigate(&self.client.download_url(id)),
            DownloadStrategy::InlineNewTab => sink.open_in_new_tab(&self.client.view_url(id)),
        }
    }
}
