//! Tenderbox Core Library
//!
//! This crate provides the tender domain model, error types, configuration, and validation
//! rules shared by the storage, database, API, and client crates.

pub mod clock;
pub mod config;
pub mod error;
pub mod models;
pub mod validation;

// Re-export commonly used types
pub use clock::{Clock, FixedClock, SystemClock};
pub use config::{BaseConfig, Config, LogFormat, TenderServiceConfig};
pub use error::{AppError, ErrorMetadata, LogLevel, NotFoundReason};
pub use validation::{FieldError, FieldErrors, UploadValidator};
