//! Error types module
//!
//! All failures that cross a crate boundary are unified under `AppError`. Each variant is a
//! closed, tagged kind; presentation text is derived from the tag through `ErrorMetadata`.
//!
//! The `Database` variant and `From<sqlx::Error>` are gated behind the `sqlx` feature.

use std::io;

#[cfg(feature = "sqlx")]
use sqlx::Error as SqlxError;

use crate::validation::FieldErrors;

/// Log level for error reporting
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    /// Debug level - for expected errors like validation failures
    Debug,
    /// Warning level - for conditions worth a look, like storage drift
    Warn,
    /// Error level - for unexpected failures
    Error,
}

/// Metadata for error responses - defines how an error should be presented
pub trait ErrorMetadata {
    /// HTTP status code to return
    fn http_status_code(&self) -> u16;

    /// Machine-readable error code (e.g., "VALIDATION_ERROR")
    fn error_code(&self) -> &'static str;

    /// Whether this error is recoverable (can be retried)
    fn is_recoverable(&self) -> bool;

    /// Suggested action for the client
    fn suggested_action(&self) -> Option<&'static str>;

    /// Client-facing message (may differ from internal error message)
    fn client_message(&self) -> String;

    /// Whether details should be hidden from clients
    fn is_sensitive(&self) -> bool;

    /// Log level for this error
    fn log_level(&self) -> LogLevel;
}

/// Why a tender or its document could not be resolved
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotFoundReason {
    /// No record for the id (or the id is malformed)
    TenderMissing,
    /// The record exists but carries no file reference
    NoFileAttached,
    /// The record references a file that is absent from storage
    FileMissingOnDisk,
}

impl NotFoundReason {
    pub fn message(&self) -> &'static str {
        match self {
            NotFoundReason::TenderMissing => "Tender not found",
            NotFoundReason::NoFileAttached => "No file found for this tender",
            NotFoundReason::FileMissingOnDisk => "File not found on server",
        }
    }

    /// Stable label used in logs
    pub fn as_str(&self) -> &'static str {
        match self {
            NotFoundReason::TenderMissing => "tender_missing",
            NotFoundReason::NoFileAttached => "no_file_attached",
            NotFoundReason::FileMissingOnDisk => "file_missing_on_disk",
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[cfg(feature = "sqlx")]
    #[error("Database error: {0}")]
    Database(#[source] SqlxError),

    #[cfg(not(feature = "sqlx"))]
    #[error("Database error: {0}")]
    Database(String),

    #[error("Validation failed: {0}")]
    Validation(FieldErrors),

    #[error("Not found: {}", .0.message())]
    NotFound(NotFoundReason),

    #[error("Version conflict: expected {expected}, found {actual}")]
    Conflict { expected: i64, actual: i64 },

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Internal error: {0}")]
    Internal(String),

    #[error("Internal error with source")]
    InternalWithSource {
        message: String,
        #[source]
        source: anyhow::Error,
    },
}

#[cfg(feature = "sqlx")]
impl From<SqlxError> for AppError {
    fn from(err: SqlxError) -> Self {
        AppError::Database(err)
    }
}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        AppError::InternalWithSource {
            message: err.to_string(),
            source: err,
        }
    }
}

impl From<io::Error> for AppError {
    fn from(err: io::Error) -> Self {
        AppError::Storage(format!("IO error: {}", err))
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::InvalidInput(format!("JSON parsing error: {}", err))
    }
}

impl From<FieldErrors> for AppError {
    fn from(errors: FieldErrors) -> Self {
        AppError::Validation(errors)
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(err: validator::ValidationErrors) -> Self {
        AppError::Validation(FieldErrors::from(err))
    }
}

/// Static metadata for each variant: (http_status, error_code, recoverable, suggested_action, sensitive, log_level).
fn app_error_static_metadata(
    err: &AppError,
) -> (
    u16,
    &'static str,
    bool,
    Option<&'static str>,
    bool,
    LogLevel,
) {
    match err {
        AppError::Database(_) => (
            500,
            "DATABASE_ERROR",
            true,
            Some("Retry after a short delay"),
            true,
            LogLevel::Error,
        ),
        AppError::Validation(_) => (
            400,
            "VALIDATION_ERROR",
            true,
            Some("Correct the highlighted fields and resubmit"),
            false,
            LogLevel::Debug,
        ),
        AppError::NotFound(NotFoundReason::TenderMissing) => (
            404,
            "TENDER_NOT_FOUND",
            false,
            Some("Verify the tender ID exists"),
            false,
            LogLevel::Debug,
        ),
        AppError::NotFound(NotFoundReason::NoFileAttached) => (
            404,
            "TENDER_FILE_NOT_ATTACHED",
            false,
            Some("Upload a document for this tender"),
            false,
            LogLevel::Debug,
        ),
        AppError::NotFound(NotFoundReason::FileMissingOnDisk) => (
            404,
            "TENDER_FILE_MISSING",
            false,
            Some("Re-upload the tender document"),
            false,
            LogLevel::Warn,
        ),
        AppError::Conflict { .. } => (
            409,
            "VERSION_CONFLICT",
            true,
            Some("Reload the tender and apply your changes again"),
            false,
            LogLevel::Debug,
        ),
        AppError::Storage(_) => (
            500,
            "STORAGE_ERROR",
            true,
            Some("Retry after a short delay"),
            true,
            LogLevel::Error,
        ),
        AppError::InvalidInput(_) => (
            400,
            "INVALID_INPUT",
            false,
            Some("Check request parameters and try again"),
            false,
            LogLevel::Debug,
        ),
        AppError::Internal(_) | AppError::InternalWithSource { .. } => (
            500,
            "INTERNAL_ERROR",
            true,
            Some("Retry after a short delay"),
            true,
            LogLevel::Error,
        ),
    }
}

impl AppError {
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        AppError::Validation(FieldErrors::single(field, message))
    }

    /// Get the error type name for detailed error responses
    pub fn error_type(&self) -> &str {
        match self {
            AppError::Database(_) => "Database",
            AppError::Validation(_) => "Validation",
            AppError::NotFound(_) => "NotFound",
            AppError::Conflict { .. } => "Conflict",
            AppError::Storage(_) => "Storage",
            AppError::InvalidInput(_) => "InvalidInput",
            AppError::Internal(_) => "Internal",
            AppError::InternalWithSource { .. } => "Internal",
        }
    }

    /// Field-level failures, when this is a validation error
    pub fn field_errors(&self) -> Option<&FieldErrors> {
        match self {
            AppError::Validation(errors) => Some(errors),
            _ => None,
        }
    }

    /// Get detailed error information including error chain
    pub fn detailed_message(&self) -> String {
        use std::error::Error;

        let mut details = self.to_string();

        let mut source = self.source();
        let mut depth = 0;
        while let Some(err) = source {
            depth += 1;
            if depth > 5 {
                details.push_str("\n  ... (truncated)");
                break;
            }
            details.push_str(&format!("\n  Caused by: {}", err));
            source = err.source();
        }

        details
    }
}

impl ErrorMetadata for AppError {
    fn http_status_code(&self) -> u16 {
        app_error_static_metadata(self).0
    }

    fn error_code(&self) -> &'static str {
        app_error_static_metadata(self).1
    }

    fn is_recoverable(&self) -> bool {
        app_error_static_metadata(self).2
    }

    fn suggested_action(&self) -> Option<&'static str> {
        app_error_static_metadata(self).3
    }

    fn is_sensitive(&self) -> bool {
        app_error_static_metadata(self).4
    }

    fn log_level(&self) -> LogLevel {
        app_error_static_metadata(self).5
    }

    fn client_message(&self) -> String {
        match self {
            AppError::Database(_) => "Failed to access database".to_string(),
            AppError::Validation(errors) => errors.to_string(),
            AppError::NotFound(reason) => reason.message().to_string(),
            AppError::Conflict { .. } => {
                "This tender was changed by someone else. Reload it and try again.".to_string()
            }
            AppError::Storage(_) => "Failed to access file storage".to_string(),
            AppError::InvalidInput(ref msg) => msg.clone(),
            AppError::Internal(_) => "Internal server error".to_string(),
            AppError::InternalWithSource { .. } => "Internal server error".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validation::field;

    #[test]
    fn test_error_metadata_database() {
        #[cfg(feature = "sqlx")]
        let err = AppError::from(sqlx::Error::PoolClosed);
        #[cfg(not(feature = "sqlx"))]
        let err = AppError::Database("pool closed".to_string());
        assert_eq!(err.http_status_code(), 500);
        assert_eq!(err.error_code(), "DATABASE_ERROR");
        assert!(err.is_recoverable());
        assert_eq!(err.client_message(), "Failed to access database");
        assert!(err.is_sensitive());
        assert_eq!(err.log_level(), LogLevel::Error);
    }

    #[test]
    fn test_not_found_reasons_share_status_but_not_code() {
        let missing = AppError::NotFound(NotFoundReason::TenderMissing);
        let no_file = AppError::NotFound(NotFoundReason::NoFileAttached);
        let on_disk = AppError::NotFound(NotFoundReason::FileMissingOnDisk);

        for err in [&missing, &no_file, &on_disk] {
            assert_eq!(err.http_status_code(), 404);
            assert!(!err.is_sensitive());
        }
        assert_eq!(missing.client_message(), "Tender not found");
        assert_eq!(no_file.client_message(), "No file found for this tender");
        assert_eq!(on_disk.client_message(), "File not found on server");
        assert_ne!(missing.error_code(), no_file.error_code());
        assert_ne!(no_file.error_code(), on_disk.error_code());
        assert_eq!(on_disk.log_level(), LogLevel::Warn);
    }

    #[test]
    fn test_validation_error_keeps_every_field() {
        let mut errors = FieldErrors::new();
        errors.push(field::TITLE, "Please enter a title for the tender.");
        errors.push(field::DEADLINE, "The deadline must be a future date.");
        let err = AppError::from(errors);

        assert_eq!(err.http_status_code(), 400);
        assert_eq!(err.error_code(), "VALIDATION_ERROR");
        assert_eq!(err.field_errors().map(|e| e.len()), Some(2));
        assert!(err
            .client_message()
            .contains("The deadline must be a future date."));
    }

    #[test]
    fn test_derived_validation_errors_map_per_field() {
        use validator::Validate;

        #[derive(Validate)]
        struct VersionOnly {
            #[validate(range(min = 1, message = "Version must be a positive whole number."))]
            version: Option<i64>,
        }

        let err = AppError::from(VersionOnly { version: Some(0) }.validate().unwrap_err());
        assert_eq!(err.http_status_code(), 400);
        assert_eq!(
            err.field_errors()
                .map(|e| e.for_field(field::VERSION).collect::<Vec<_>>()),
            Some(vec!["Version must be a positive whole number."])
        );
    }

    #[test]
    fn test_conflict_metadata() {
        let err = AppError::Conflict {
            expected: 2,
            actual: 3,
        };
        assert_eq!(err.http_status_code(), 409);
        assert_eq!(err.error_code(), "VERSION_CONFLICT");
        assert!(err.to_string().contains("expected 2"));
    }

    #[test]
    fn test_storage_error_hides_details() {
        let err = AppError::from(io::Error::new(io::ErrorKind::PermissionDenied, "/srv/uploads"));
        assert_eq!(err.http_status_code(), 500);
        assert!(err.is_sensitive());
        assert!(!err.client_message().contains("/srv/uploads"));
        assert!(err.detailed_message().contains("/srv/uploads"));
    }
}
