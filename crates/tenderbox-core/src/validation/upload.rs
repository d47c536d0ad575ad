//! Upload validation for tender documents
//!
//! The validator is a pure check over (filename, declared content type, size). It never touches
//! the bytes themselves; callers drop the buffered upload when validation fails.

use std::path::Path;

use super::fields::{field, FieldErrors};

/// Default upload ceiling in bytes (10 MB, decimal)
pub const DEFAULT_MAX_UPLOAD_SIZE_BYTES: u64 = 10_000_000;

/// Extensions accepted for tender documents
pub const ALLOWED_EXTENSIONS: &[&str] = &["pdf", "png", "jpg", "jpeg"];

/// Declared MIME types accepted for tender documents
pub const ALLOWED_CONTENT_TYPES: &[&str] = &["application/pdf", "image/png", "image/jpeg"];

const TYPE_NOT_ALLOWED_MESSAGE: &str = "Only PNG, JPG, JPEG, and PDF files are allowed";

/// One failed upload rule
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum UploadViolation {
    #[error("Empty file")]
    EmptyFile,

    #[error("File too large: {size} bytes (max: {max} bytes)")]
    FileTooLarge { size: u64, max: u64 },

    #[error("Missing file extension: {0}")]
    MissingExtension(String),

    #[error("Invalid file extension: {0}")]
    InvalidExtension(String),

    #[error("Invalid content type: {0}")]
    InvalidContentType(String),

    #[error("Content type {content_type} does not match extension {extension}")]
    ExtensionContentTypeMismatch {
        extension: String,
        content_type: String,
    },
}

impl UploadViolation {
    /// Text shown to the person who submitted the file
    pub fn user_message(&self) -> String {
        match self {
            UploadViolation::EmptyFile => "The uploaded file is empty".to_string(),
            UploadViolation::FileTooLarge { max, .. } => {
                format!("File size must be less than {}", format_megabytes(*max))
            }
            UploadViolation::MissingExtension(_)
            | UploadViolation::InvalidExtension(_)
            | UploadViolation::InvalidContentType(_) => TYPE_NOT_ALLOWED_MESSAGE.to_string(),
            UploadViolation::ExtensionContentTypeMismatch { .. } => {
                "The file extension does not match its content type".to_string()
            }
        }
    }
}

/// Render a byte ceiling as decimal megabytes, e.g. 10_000_000 -> "10MB"
pub fn format_megabytes(bytes: u64) -> String {
    if bytes % 1_000_000 == 0 {
        format!("{}MB", bytes / 1_000_000)
    } else {
        format!("{:.1}MB", bytes as f64 / 1_000_000.0)
    }
}

/// Lowercased extension of a filename, without the dot
pub fn file_extension(filename: &str) -> Option<String> {
    Path::new(filename)
        .extension()
        .and_then(|e| e.to_str())
        .filter(|e| !e.is_empty())
        .map(|e| e.to_lowercase())
}

/// Strip MIME parameters and fold known aliases (e.g. "image/jpg; q=1" -> "image/jpeg")
pub fn normalize_content_type(content_type: &str) -> String {
    let base = content_type
        .split(';')
        .next()
        .map(|s| s.trim())
        .unwrap_or(content_type)
        .to_lowercase();

    match base.as_str() {
        "image/jpg" | "image/pjpeg" => "image/jpeg".to_string(),
        _ => base,
    }
}

/// Content types a given extension is expected to be declared with
fn expected_content_types(extension: &str) -> Option<&'static [&'static str]> {
    match extension {
        "pdf" => Some(&["application/pdf"]),
        "png" => Some(&["image/png"]),
        "jpg" | "jpeg" => Some(&["image/jpeg"]),
        _ => None,
    }
}

/// Tender document validator
#[derive(Debug, Clone)]
pub struct UploadValidator {
    max_file_size: u64,
    allowed_extensions: Vec<String>,
    allowed_content_types: Vec<String>,
}

impl Default for UploadValidator {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_UPLOAD_SIZE_BYTES)
    }
}

impl UploadValidator {
    pub fn new(max_file_size: u64) -> Self {
        Self {
            max_file_size,
            allowed_extensions: ALLOWED_EXTENSIONS.iter().map(|s| s.to_string()).collect(),
            allowed_content_types: ALLOWED_CONTENT_TYPES.iter().map(|s| s.to_string()).collect(),
        }
    }

    pub fn max_file_size(&self) -> u64 {
        self.max_file_size
    }

    /// Validate file size; the ceiling itself is accepted
    pub fn validate_file_size(&self, size: u64) -> Result<(), UploadViolation> {
        if size == 0 {
            return Err(UploadViolation::EmptyFile);
        }

        if size > self.max_file_size {
            return Err(UploadViolation::FileTooLarge {
                size,
                max: self.max_file_size,
            });
        }

        Ok(())
    }

    /// Validate file extension, returning it lowercased
    pub fn validate_extension(&self, filename: &str) -> Result<String, UploadViolation> {
        let extension = file_extension(filename)
            .ok_or_else(|| UploadViolation::MissingExtension(filename.to_string()))?;

        if !self.allowed_extensions.contains(&extension) {
            return Err(UploadViolation::InvalidExtension(extension));
        }

        Ok(extension)
    }

    /// Validate the declared content type
    pub fn validate_content_type(&self, content_type: &str) -> Result<(), UploadViolation> {
        let normalized = normalize_content_type(content_type);

        if !self.allowed_content_types.iter().any(|ct| ct == &normalized) {
            return Err(UploadViolation::InvalidContentType(content_type.to_string()));
        }

        Ok(())
    }

    /// Validate that the declared content type is the one the extension implies.
    /// Unknown extensions are skipped here; they already fail `validate_extension`.
    pub fn validate_extension_content_type_match(
        &self,
        filename: &str,
        content_type: &str,
    ) -> Result<(), UploadViolation> {
        let Some(extension) = file_extension(filename) else {
            return Ok(());
        };
        let Some(expected) = expected_content_types(&extension) else {
            return Ok(());
        };

        let normalized = normalize_content_type(content_type);
        if !expected.iter().any(|ct| *ct == normalized) {
            return Err(UploadViolation::ExtensionContentTypeMismatch {
                extension,
                content_type: normalized,
            });
        }

        Ok(())
    }

    /// Every violated rule, in a stable order
    pub fn violations(&self, filename: &str, content_type: &str, size: u64) -> Vec<UploadViolation> {
        let extension_result = self.validate_extension(filename);
        let content_type_result = self.validate_content_type(content_type);

        let mut violations = Vec::new();
        if let Err(v) = self.validate_file_size(size) {
            violations.push(v);
        }
        // The mismatch rule only carries information once both sides are individually allowed
        let both_allowed = extension_result.is_ok() && content_type_result.is_ok();
        if let Err(v) = extension_result {
            violations.push(v);
        }
        if let Err(v) = content_type_result {
            violations.push(v);
        }
        if both_allowed {
            if let Err(v) = self.validate_extension_content_type_match(filename, content_type) {
                violations.push(v);
            }
        }
        violations
    }

    /// Validate all aspects of a file and report each distinct message on the file field
    pub fn validate_all(
        &self,
        filename: &str,
        content_type: &str,
        size: u64,
    ) -> Result<(), FieldErrors> {
        let mut errors = FieldErrors::new();
        for violation in self.violations(filename, content_type, size) {
            let message = violation.user_message();
            if !errors.for_field(field::FILE).any(|m| m == message) {
                errors.push(field::FILE, message);
            }
        }
        errors.into_result()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn validator() -> UploadValidator {
        UploadValidator::default()
    }

    #[test]
    fn test_accepts_each_allowed_type() {
        let v = validator();
        assert!(v.validate_all("tender.pdf", "application/pdf", 1024).is_ok());
        assert!(v.validate_all("plan.png", "image/png", 1024).is_ok());
        assert!(v.validate_all("site.jpg", "image/jpeg", 1024).is_ok());
        assert!(v.validate_all("site.JPEG", "image/jpeg", 1024).is_ok());
        assert!(v.validate_all("scan.jpg", "image/jpg", 1024).is_ok());
    }

    #[test]
    fn test_size_ceiling_is_inclusive() {
        let v = validator();
        assert!(v
            .validate_all("tender.pdf", "application/pdf", 10_000_000)
            .is_ok());

        let errors = v
            .validate_all("tender.pdf", "application/pdf", 10_000_001)
            .unwrap_err();
        assert_eq!(
            errors.for_field(field::FILE).collect::<Vec<_>>(),
            vec!["File size must be less than 10MB"]
        );
    }

    #[test]
    fn test_pdf_renamed_to_png_is_rejected() {
        let errors = validator()
            .validate_all("tender.png", "application/pdf", 2048)
            .unwrap_err();
        assert_eq!(
            errors.for_field(field::FILE).collect::<Vec<_>>(),
            vec!["The file extension does not match its content type"]
        );
    }

    #[test]
    fn test_disallowed_extension_and_type() {
        let errors = validator()
            .validate_all("contract.docx", "application/msword", 2048)
            .unwrap_err();
        // Same message for both rules, reported once
        assert_eq!(
            errors.for_field(field::FILE).collect::<Vec<_>>(),
            vec!["Only PNG, JPG, JPEG, and PDF files are allowed"]
        );
    }

    #[test]
    fn test_reports_every_distinct_violation() {
        let errors = validator()
            .validate_all("movie.mp4", "video/mp4", 50_000_000)
            .unwrap_err();
        let messages: Vec<_> = errors.for_field(field::FILE).collect();
        assert_eq!(messages.len(), 2);
        assert!(messages.contains(&"File size must be less than 10MB"));
        assert!(messages.contains(&"Only PNG, JPG, JPEG, and PDF files are allowed"));
    }

    #[test]
    fn test_allowed_mime_with_wrong_extension_is_rejected() {
        let errors = validator()
            .validate_all("tender.exe", "application/pdf", 10)
            .unwrap_err();
        assert!(errors.has_field(field::FILE));
    }

    #[test]
    fn test_empty_and_extensionless_files() {
        let v = validator();
        assert_eq!(v.validate_file_size(0), Err(UploadViolation::EmptyFile));
        assert!(matches!(
            v.validate_extension("README"),
            Err(UploadViolation::MissingExtension(_))
        ));
    }

    #[test]
    fn test_content_type_parameters_are_ignored() {
        let v = validator();
        assert!(v.validate_content_type("application/pdf; name=a.pdf").is_ok());
        assert!(v.validate_content_type("IMAGE/PNG").is_ok());
        assert!(v.validate_content_type("image/gif").is_err());
    }

    #[test]
    fn test_configurable_ceiling_message() {
        let v = UploadValidator::new(2_500_000);
        let errors = v.validate_all("a.pdf", "application/pdf", 3_000_000).unwrap_err();
        assert_eq!(
            errors.for_field(field::FILE).next(),
            Some("File size must be less than 2.5MB")
        );
    }
}
