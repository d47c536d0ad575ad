//! Tender and download services
//!
//! Keeps handler logic thin and allows unit testing without HTTP.

pub mod download;
pub mod tender;

pub use download::{content_disposition, mime_type_for, DispositionMode, DownloadService, OpenedDocument};
pub use tender::{TenderService, UploadedDocument};
