//! Tenderbox API Library
//!
//! HTTP handlers, the tender and download services, and application setup.

// Module declarations
mod api_doc;
pub mod constants;
mod handlers;
pub mod services;
pub mod setup;
mod telemetry;
mod utils;

// Public modules
pub mod error;
pub mod state;

// Re-exports
pub use error::{ErrorResponse, HttpAppError};
pub use services::{DownloadService, TenderService};
pub use state::AppState;
