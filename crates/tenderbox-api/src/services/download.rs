//! Resolving a tender id to a streamable document

use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use std::sync::Arc;
use tenderbox_core::validation::file_extension;
use tenderbox_core::{AppError, NotFoundReason};
use tenderbox_db::TenderStore;
use tenderbox_storage::{ByteStream, Storage, StorageError};
use uuid::Uuid;

/// RFC 5987 `attr-char` minus the characters that are always safe
const FILENAME_ENCODE_SET: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'!')
    .remove(b'#')
    .remove(b'$')
    .remove(b'&')
    .remove(b'+')
    .remove(b'-')
    .remove(b'.')
    .remove(b'^')
    .remove(b'_')
    .remove(b'`')
    .remove(b'|')
    .remove(b'~');

/// How the browser should treat the document
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispositionMode {
    /// Save to disk
    Attachment,
    /// Render in the browser tab
    Inline,
}

impl DispositionMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            DispositionMode::Attachment => "attachment",
            DispositionMode::Inline => "inline",
        }
    }
}

/// A document ready to be written to a response
pub struct OpenedDocument {
    pub tender_id: Uuid,
    pub file_name: String,
    pub content_type: &'static str,
    pub content_length: u64,
    pub body: ByteStream,
}

/// MIME type from the original filename's extension
pub fn mime_type_for(file_name: &str) -> &'static str {
    match file_extension(file_name).as_deref() {
        Some("pdf") => "application/pdf",
        Some("doc") => "application/msword",
        Some("docx") => "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
        Some("xls") => "application/vnd.ms-excel",
        Some("xlsx") => "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
        Some("txt") => "text/plain",
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("png") => "image/png",
        _ => "application/octet-stream",
    }
}

/// `Content-Disposition` value carrying both an ASCII fallback and the UTF-8 name
pub fn content_disposition(mode: DispositionMode, file_name: &str) -> String {
    let fallback: String = file_name
        .chars()
        .map(|c| match c {
            '"' | '\\' => '_',
            c if c.is_ascii() && !c.is_ascii_control() => c,
            _ => '_',
        })
        .collect();
    let encoded = utf8_percent_encode(file_name, FILENAME_ENCODE_SET);

    format!(
        "{}; filename=\"{}\"; filename*=UTF-8''{}",
        mode.as_str(),
        fallback,
        encoded
    )
}

#[derive(Clone)]
pub struct DownloadService {
    store: Arc<dyn TenderStore>,
    storage: Arc<dyn Storage>,
}

impl DownloadService {
    pub fn new(store: Arc<dyn TenderStore>, storage: Arc<dyn Storage>) -> Self {
        Self { store, storage }
    }

    /// Look up the tender and open its document for streaming
    ///
    /// A malformed id is reported the same as an unknown one.
    #[tracing::instrument(skip(self), fields(operation = "open_tender_document"))]
    pub async fn open(&self, raw_id: &str) -> Result<OpenedDocument, AppError> {
        let Ok(id) = Uuid::parse_str(raw_id) else {
            return Err(not_found(raw_id, NotFoundReason::TenderMissing));
        };

        let Some(tender) = self.store.get(id).await? else {
            return Err(not_found(raw_id, NotFoundReason::TenderMissing));
        };

        let Some(storage_key) = tender.file_path() else {
            return Err(not_found(raw_id, NotFoundReason::NoFileAttached));
        };

        if !self.storage.exists(storage_key).await.map_err(storage_error)? {
            return Err(not_found(raw_id, NotFoundReason::FileMissingOnDisk));
        }

        let content_length = match self.storage.content_length(storage_key).await {
            Ok(len) => len,
            Err(StorageError::NotFound(_)) => {
                return Err(not_found(raw_id, NotFoundReason::FileMissingOnDisk))
            }
            Err(e) => return Err(storage_error(e)),
        };

        let body = match self.storage.download_stream(storage_key).await {
            Ok(body) => body,
            Err(StorageError::NotFound(_)) => {
                return Err(not_found(raw_id, NotFoundReason::FileMissingOnDisk))
            }
            Err(e) => return Err(storage_error(e)),
        };

        let file_name = tender
            .file_name()
            .filter(|name| !name.is_empty())
            .unwrap_or("tender-document")
            .to_string();

        Ok(OpenedDocument {
            tender_id: tender.id,
            content_type: mime_type_for(&file_name),
            file_name,
            content_length,
            body,
        })
    }
}

fn not_found(raw_id: &str, reason: NotFoundReason) -> AppError {
    match reason {
        NotFoundReason::FileMissingOnDisk => tracing::warn!(
            tender_id = %raw_id,
            reason = reason.as_str(),
            "Tender document referenced but absent from storage"
        ),
        _ => tracing::info!(
            tender_id = %raw_id,
            reason = reason.as_str(),
            "Tender document not available"
        ),
    }
    AppError::NotFound(reason)
}

fn storage_error(e: StorageError) -> AppError {
    AppError::Storage(e.to_string())
}
