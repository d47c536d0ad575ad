//! Client for the Tenderbox API.
//!
//! [`TenderClient`] wraps the HTTP surface with typed requests and a tagged [`ClientError`].
//! The remaining modules hold the presentation logic the admin and public pages share: the
//! tender form with its client-side rules, the list with derived expiry badges, download
//! strategies, and the admin controller that ties them together. Rendering is left to the
//! embedding UI.

pub mod admin;
pub mod api;
pub mod download;
pub mod form;
pub mod list;

use bytes::Bytes;
use reqwest::{Client, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::time::Duration;
use tenderbox_core::FieldErrors;
use thiserror::Error;

/// Used when `TENDERBOX_API_URL` is not set
pub const DEFAULT_API_URL: &str = "http://localhost:5000";

/// Path of the tender collection on the server
pub const TENDERS_PATH: &str = "/api/tenders";

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

/// Connection settings, resolved once at startup and handed to [`TenderClient::new`]
#[derive(Clone, Debug)]
pub struct ClientConfig {
    base_url: String,
    timeout: Duration,
}

impl ClientConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url: String = base_url.into();
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Read `TENDERBOX_API_URL` (after loading `.env` if present)
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();
        let base_url = std::env::var("TENDERBOX_API_URL")
            .ok()
            .filter(|url| !url.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_API_URL.to_string());
        Self::new(base_url)
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self::new(DEFAULT_API_URL)
    }
}

#[derive(Debug, Error)]
pub enum ClientError {
    /// The server answered with a non-success status
    #[error("{message}")]
    Api {
        status: u16,
        code: Option<String>,
        message: String,
        fields: FieldErrors,
    },

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Failed to decode response: {0}")]
    Decode(String),
}

impl ClientError {
    pub fn status(&self) -> Option<u16> {
        match self {
            ClientError::Api { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn code(&self) -> Option<&str> {
        match self {
            ClientError::Api { code, .. } => code.as_deref(),
            _ => None,
        }
    }

    /// Per-field validation failures reported by the server; empty for other errors
    pub fn field_errors(&self) -> Option<&FieldErrors> {
        match self {
            ClientError::Api { fields, .. } if !fields.is_empty() => Some(fields),
            _ => None,
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.status() == Some(404)
    }
}

/// JSON error body rendered by the API
#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: String,
    code: Option<String>,
    #[serde(default)]
    fields: Option<FieldErrors>,
}

/// HTTP client for the tender endpoints
#[derive(Clone, Debug)]
pub struct TenderClient {
    client: Client,
    base_url: String,
}

impl TenderClient {
    pub fn new(config: &ClientConfig) -> Result<Self, ClientError> {
        let client = Client::builder().timeout(config.timeout()).build()?;

        Ok(Self {
            client,
            base_url: config.base_url().to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn build_url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    pub(crate) fn http(&self) -> &Client {
        &self.client
    }

    /// Send and return the response when its status is a success
    pub(crate) async fn send(&self, request: RequestBuilder) -> Result<Response, ClientError> {
        let response = request.send().await?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.bytes().await.unwrap_or_default();
        let error = api_error(status.as_u16(), &body, status.canonical_reason());
        tracing::debug!(status = status.as_u16(), error = %error, "Tender API request failed");
        Err(error)
    }

    /// Send and decode a JSON response body
    pub(crate) async fn send_json<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
    ) -> Result<T, ClientError> {
        let response = self.send(request).await?;
        let body = response.bytes().await?;
        serde_json::from_slice(&body).map_err(|e| ClientError::Decode(e.to_string()))
    }
}

fn api_error(status: u16, body: &Bytes, reason: Option<&str>) -> ClientError {
    match serde_json::from_slice::<ErrorBody>(body) {
        Ok(parsed) => ClientError::Api {
            status,
            code: parsed.code,
            message: parsed.error,
            fields: parsed.fields.unwrap_or_default(),
        },
        Err(_) => {
            let text = String::from_utf8_lossy(body).trim().to_string();
            let message = if text.is_empty() {
                reason.unwrap_or("Request failed").to_string()
            } else {
                text
            };
            ClientError::Api {
                status,
                code: None,
                message,
                fields: FieldErrors::new(),
            }
        }
    }
}

pub use api::{DocumentUpload, DownloadedDocument, TenderSubmission};
pub use tenderbox_core::models::{TenderDeletedResponse, TenderResponse, TenderStatus};

#[cfg(test)]
mod tests {
    use super::*;
    use tenderbox_core::validation::field;

    #[test]
    fn test_config_trims_trailing_slash() {
        let config = ClientConfig::new("http://society.local:5000/");
        assert_eq!(config.base_url(), "http://society.local:5000");
    }

    #[test]
    fn test_api_error_from_json_body() {
        let body = Bytes::from_static(
            br#"{"error":"Validation failed","code":"VALIDATION_ERROR","recoverable":true,
                 "fields":[{"field":"title","message":"Please enter a title for the tender."}]}"#,
        );
        let error = api_error(400, &body, Some("Bad Request"));

        assert_eq!(error.status(), Some(400));
        assert_eq!(error.code(), Some("VALIDATION_ERROR"));
        assert_eq!(error.to_string(), "Validation failed");
        let fields = error.field_errors().expect("fields");
        assert!(fields.has_field(field::TITLE));
    }

    #[test]
    fn test_api_error_from_plain_body() {
        let error = api_error(502, &Bytes::new(), Some("Bad Gateway"));
        assert_eq!(error.to_string(), "Bad Gateway");
        assert_eq!(error.code(), None);
        assert!(error.field_errors().is_none());
    }
}
