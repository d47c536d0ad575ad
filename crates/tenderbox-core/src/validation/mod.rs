//! Validation modules

pub mod fields;
pub mod tender;
pub mod upload;

pub use fields::{describe, field, FieldError, FieldErrors};
pub use tender::{
    check_deadline, check_future, check_status, parse_deadline, DraftMode, RuleContext,
    TenderDraft, TenderFields, TitleRule,
};
pub use upload::{
    file_extension, format_megabytes, normalize_content_type, UploadValidator, UploadViolation,
    ALLOWED_CONTENT_TYPES, ALLOWED_EXTENSIONS, DEFAULT_MAX_UPLOAD_SIZE_BYTES,
};
