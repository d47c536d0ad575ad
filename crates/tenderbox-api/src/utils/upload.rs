//! Multipart parsing for tender forms

use axum::extract::Multipart;
use bytes::BytesMut;
use tenderbox_core::validation::{field, TenderDraft};
use tenderbox_core::{AppError, FieldErrors};

use crate::services::UploadedDocument;

const MAX_FILENAME_LENGTH: usize = 255;

/// Everything a tender form can carry
#[derive(Debug, Default)]
pub struct TenderForm {
    pub draft: TenderDraft,
    pub document: Option<UploadedDocument>,
    pub version: Option<i64>,
}

/// Read a `multipart/form-data` tender form.
///
/// The document part is buffered only up to `max_file_size + 1` bytes; the remainder is drained
/// and counted so an oversized upload reaches validation with its true size. A file part with
/// no filename and no bytes (a form submitted without choosing a file) counts as absent.
pub async fn read_tender_form(
    mut multipart: Multipart,
    max_file_size: u64,
) -> Result<TenderForm, AppError> {
    let mut form = TenderForm::default();
    let mut raw_version: Option<String> = None;

    while let Some(mut part) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::InvalidInput(format!("Failed to read multipart: {}", e)))?
    {
        let name = part.name().map(|s| s.to_string()).unwrap_or_default();

        match name.as_str() {
            field::FILE => {
                if form.document.is_some() {
                    return Err(AppError::InvalidInput(format!(
                        "Multiple file fields are not allowed; send exactly one field named '{}'",
                        field::FILE
                    )));
                }
                let file_name = part.file_name().map(sanitize_filename).unwrap_or_default();
                let content_type = part
                    .content_type()
                    .unwrap_or("application/octet-stream")
                    .to_string();

                let mut buffer = BytesMut::new();
                let mut size_bytes: u64 = 0;
                while let Some(chunk) = part.chunk().await.map_err(|e| {
                    AppError::InvalidInput(format!("Failed to read file data: {}", e))
                })? {
                    size_bytes += chunk.len() as u64;
                    if size_bytes <= max_file_size {
                        buffer.extend_from_slice(&chunk);
                    } else if !buffer.is_empty() {
                        buffer = BytesMut::new();
                    }
                }

                if file_name.is_empty() && size_bytes == 0 {
                    continue;
                }
                form.document = Some(UploadedDocument {
                    file_name,
                    content_type,
                    size_bytes,
                    data: buffer.freeze(),
                });
            }
            field::TITLE | field::DEADLINE | field::STATUS | field::VERSION => {
                let value = part.text().await.map_err(|e| {
                    AppError::InvalidInput(format!("Failed to read field '{}': {}", name, e))
                })?;
                match name.as_str() {
                    field::TITLE => form.draft.title = Some(value),
                    field::DEADLINE => form.draft.deadline = Some(value),
                    field::STATUS => form.draft.status = Some(value),
                    _ => raw_version = Some(value),
                }
            }
            other => {
                tracing::debug!(field = %other, "Ignoring unknown multipart field");
            }
        }
    }

    match parse_version(raw_version.as_deref()) {
        Ok(version) => form.version = version,
        Err(errors) => form.draft.rejected.extend(errors),
    }
    Ok(form)
}

/// An empty value means "no precondition"
pub fn parse_version(raw: Option<&str>) -> Result<Option<i64>, FieldErrors> {
    match raw.map(str::trim).filter(|v| !v.is_empty()) {
        None => Ok(None),
        Some(value) => match value.parse::<i64>() {
            Ok(version) if version >= 1 => Ok(Some(version)),
            _ => Err(FieldErrors::single(
                field::VERSION,
                "Version must be a positive whole number.",
            )),
        },
    }
}

/// Keep only the final path component and drop characters that cannot appear in a header.
/// Overlong names lose characters from the stem, never from the extension.
pub fn sanitize_filename(filename: &str) -> String {
    let base = filename
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or(filename);

    let cleaned = base
        .chars()
        .filter(|c| !c.is_control())
        .collect::<String>()
        .trim()
        .to_string();
    if cleaned.chars().count() <= MAX_FILENAME_LENGTH {
        return cleaned;
    }

    let (stem, extension) = match cleaned.rfind('.') {
        Some(dot) if dot > 0 && cleaned[dot..].chars().count() < MAX_FILENAME_LENGTH => {
            cleaned.split_at(dot)
        }
        _ => (cleaned.as_str(), ""),
    };
    let keep = MAX_FILENAME_LENGTH - extension.chars().count();
    let stem = stem.chars().take(keep).collect::<String>();
    format!("{}{}", stem.trim_end(), extension)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_strips_directories() {
        assert_eq!(sanitize_filename("C:\\Users\\admin\\scope.pdf"), "scope.pdf");
        assert_eq!(sanitize_filename("../../etc/passwd.pdf"), "passwd.pdf");
        assert_eq!(sanitize_filename(" bid\n.pdf "), "bid.pdf");
    }

    #[test]
    fn test_sanitize_keeps_unicode() {
        assert_eq!(sanitize_filename("निविदा.pdf"), "निविदा.pdf");
    }

    #[test]
    fn test_sanitize_caps_length() {
        let long = format!("{}.pdf", "a".repeat(400));
        let sanitized = sanitize_filename(&long);
        assert_eq!(sanitized.chars().count(), MAX_FILENAME_LENGTH);
        assert!(sanitized.ends_with(".pdf"));
    }

    #[test]
    fn test_sanitize_truncates_stem_by_characters() {
        let long = format!("{}.docx", "निविदा".repeat(60));
        let sanitized = sanitize_filename(&long);
        assert_eq!(sanitized.chars().count(), MAX_FILENAME_LENGTH);
        assert!(sanitized.ends_with(".docx"));

        let no_extension = "a".repeat(300);
        assert_eq!(sanitize_filename(&no_extension).chars().count(), MAX_FILENAME_LENGTH);
    }

    #[test]
    fn test_parse_version() {
        assert_eq!(parse_version(None), Ok(None));
        assert_eq!(parse_version(Some("  ")), Ok(None));
        assert_eq!(parse_version(Some("3")), Ok(Some(3)));
        assert!(parse_version(Some("0")).is_err());
        assert!(parse_version(Some("two")).is_err());
    }
}
