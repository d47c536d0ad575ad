//! Tender endpoints.

use crate::{ClientError, TenderClient, TENDERS_PATH};
use bytes::Bytes;
use percent_encoding::percent_decode_str;
use reqwest::header::{CONTENT_DISPOSITION, CONTENT_TYPE};
use reqwest::multipart::{Form, Part};
use tenderbox_core::models::{TenderDeletedResponse, TenderResponse, TenderStatus};
use tenderbox_core::validation::field;
use uuid::Uuid;

/// A file picked by the user, ready to be sent as `tenderDocument`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentUpload {
    pub file_name: String,
    pub content_type: String,
    pub data: Bytes,
}

impl DocumentUpload {
    pub fn new(
        file_name: impl Into<String>,
        content_type: impl Into<String>,
        data: impl Into<Bytes>,
    ) -> Self {
        Self {
            file_name: file_name.into(),
            content_type: content_type.into(),
            data: data.into(),
        }
    }

    pub fn size(&self) -> u64 {
        self.data.len() as u64
    }
}

/// Multipart body for create (POST) and partial update (PATCH)
///
/// `None` fields are not sent; on update that leaves the stored value untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TenderSubmission {
    pub title: Option<String>,
    /// `YYYY-MM-DD` or RFC 3339
    pub deadline: Option<String>,
    pub status: Option<TenderStatus>,
    pub document: Option<DocumentUpload>,
    pub version: Option<i64>,
}

impl TenderSubmission {
    fn into_form(self) -> Result<Form, ClientError> {
        let mut form = Form::new();
        if let Some(title) = self.title {
            form = form.text(field::TITLE, title);
        }
        if let Some(deadline) = self.deadline {
            form = form.text(field::DEADLINE, deadline);
        }
        if let Some(status) = self.status {
            form = form.text(field::STATUS, status.as_str());
        }
        if let Some(version) = self.version {
            form = form.text(field::VERSION, version.to_string());
        }
        if let Some(document) = self.document {
            let part = Part::bytes(document.data.to_vec())
                .file_name(document.file_name)
                .mime_str(&document.content_type)?;
            form = form.part(field::FILE, part);
        }
        Ok(form)
    }
}

/// A fetched tender document
#[derive(Debug, Clone)]
pub struct DownloadedDocument {
    pub file_name: String,
    pub content_type: String,
    pub data: Bytes,
}

impl TenderClient {
    /// All tenders, newest first
    pub async fn list(&self) -> Result<Vec<TenderResponse>, ClientError> {
        let request = self.http().get(self.build_url(TENDERS_PATH));
        self.send_json(request).await
    }

    pub async fn get(&self, id: Uuid) -> Result<TenderResponse, ClientError> {
        let request = self
            .http()
            .get(self.build_url(&format!("{}/{}", TENDERS_PATH, id)));
        self.send_json(request).await
    }

    pub async fn create(&self, submission: TenderSubmission) -> Result<TenderResponse, ClientError> {
        tracing::debug!(
            title = submission.title.as_deref().unwrap_or_default(),
            has_document = submission.document.is_some(),
            "Creating tender"
        );
        let request = self
            .http()
            .post(self.build_url(TENDERS_PATH))
            .multipart(submission.into_form()?);
        self.send_json(request).await
    }

    pub async fn update(
        &self,
        id: Uuid,
        submission: TenderSubmission,
    ) -> Result<TenderResponse, ClientError> {
        tracing::debug!(
            tender_id = %id,
            has_document = submission.document.is_some(),
            "Updating tender"
        );
        let request = self
            .http()
            .patch(self.build_url(&format!("{}/{}", TENDERS_PATH, id)))
            .multipart(submission.into_form()?);
        self.send_json(request).await
    }

    /// Delete a tender; with `version` set the server refuses if the record changed meanwhile
    pub async fn delete(
        &self,
        id: Uuid,
        version: Option<i64>,
    ) -> Result<TenderDeletedResponse, ClientError> {
        let mut request = self
            .http()
            .delete(self.build_url(&format!("{}/{}", TENDERS_PATH, id)));
        if let Some(version) = version {
            request = request.query(&[("version", version)]);
        }
        self.send_json(request).await
    }

    /// Fetch the document through the force-download endpoint
    pub async fn download(&self, id: Uuid) -> Result<DownloadedDocument, ClientError> {
        let response = self.send(self.http().get(self.download_url(id))).await?;

        let headers = response.headers();
        let file_name = headers
            .get(CONTENT_DISPOSITION)
            .and_then(|value| value.to_str().ok())
            .and_then(filename_from_disposition)
            .unwrap_or_else(|| "tender-document".to_string());
        let content_type = headers
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .unwrap_or("application/octet-stream")
            .to_string();

        let data = response.bytes().await?;
        tracing::debug!(tender_id = %id, file_name = %file_name, size = data.len(), "Downloaded tender document");

        Ok(DownloadedDocument {
            file_name,
            content_type,
            data,
        })
    }

    /// Force-download link, for direct navigation
    pub fn download_url(&self, id: Uuid) -> String {
        self.build_url(&format!("{}/download/{}", TENDERS_PATH, id))
    }

    /// Inline-view link, for opening in a new tab
    pub fn view_url(&self, id: Uuid) -> String {
        self.build_url(&format!("{}/download/view/{}", TENDERS_PATH, id))
    }
}

/// Prefer the UTF-8 `filename*` parameter, fall back to the quoted `filename`
fn filename_from_disposition(value: &str) -> Option<String> {
    let mut plain = None;
    for param in value.split(';').map(str::trim) {
        if let Some(encoded) = param.strip_prefix("filename*=") {
            let encoded = encoded
                .strip_prefix("UTF-8''")
                .or_else(|| encoded.strip_prefix("utf-8''"))
                .unwrap_or(encoded);
            if let Ok(decoded) = percent_decode_str(encoded).decode_utf8() {
                if !decoded.is_empty() {
                    return Some(decoded.into_owned());
                }
            }
        } else if let Some(quoted) = param.strip_prefix("filename=") {
            let name = quoted.trim_matches('"');
            if !name.is_empty() {
                plain = Some(name.to_string());
            }
        }
    }
    plain
}
