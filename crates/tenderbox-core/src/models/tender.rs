use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter, Result as FmtResult};
use std::str::FromStr;
use utoipa::ToSchema;
use uuid::Uuid;

/// Administrative status of a tender
///
/// Independent of the deadline: an expired tender stays `Active` until an admin changes it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum TenderStatus {
    #[default]
    Active,
    Closed,
    Cancelled,
}

impl TenderStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TenderStatus::Active => "active",
            TenderStatus::Closed => "closed",
            TenderStatus::Cancelled => "cancelled",
        }
    }
}

impl FromStr for TenderStatus {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "active" => Ok(TenderStatus::Active),
            "closed" => Ok(TenderStatus::Closed),
            "cancelled" => Ok(TenderStatus::Cancelled),
            _ => Err(anyhow::anyhow!("Invalid tender status: {}", s)),
        }
    }
}

impl Display for TenderStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(self.as_str())
    }
}

/// Reference from a tender to its stored document
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileRef {
    /// Original filename as uploaded, used for Content-Disposition and MIME lookup
    pub file_name: String,
    /// Storage key relative to the upload directory
    pub file_path: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tender {
    pub id: Uuid,
    pub title: String,
    pub deadline: DateTime<Utc>,
    pub file: Option<FileRef>,
    pub status: TenderStatus,
    pub upload_date: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    /// Incremented on every update; used for optimistic concurrency
    pub version: i64,
}

impl Tender {
    /// Derived, never stored
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.deadline < now
    }

    pub fn file_name(&self) -> Option<&str> {
        self.file.as_ref().map(|f| f.file_name.as_str())
    }

    pub fn file_path(&self) -> Option<&str> {
        self.file
            .as_ref()
            .map(|f| f.file_path.as_str())
            .filter(|p| !p.is_empty())
    }
}

/// Values for a record about to be inserted
#[derive(Debug, Clone)]
pub struct NewTender {
    pub id: Uuid,
    pub title: String,
    pub deadline: DateTime<Utc>,
    pub status: TenderStatus,
    pub file: Option<FileRef>,
    pub created_at: DateTime<Utc>,
}

/// Partial update; `None` fields are left untouched
#[derive(Debug, Clone)]
pub struct TenderChanges {
    pub title: Option<String>,
    pub deadline: Option<DateTime<Utc>>,
    pub status: Option<TenderStatus>,
    /// `Some(None)` detaches the current document
    pub file: Option<Option<FileRef>>,
    /// When set, the write only applies if the stored version still matches
    pub expected_version: Option<i64>,
    pub updated_at: DateTime<Utc>,
}

impl TenderChanges {
    pub fn new(updated_at: DateTime<Utc>) -> Self {
        Self {
            title: None,
            deadline: None,
            status: None,
            file: None,
            expected_version: None,
            updated_at,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TenderResponse {
    pub id: Uuid,
    pub title: String,
    pub deadline: DateTime<Utc>,
    pub file_name: Option<String>,
    pub file_path: Option<String>,
    pub status: TenderStatus,
    pub upload_date: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub version: i64,
    /// `deadline < now` at the time the response was built
    pub is_expired: bool,
}

impl TenderResponse {
    pub fn from_tender(tender: Tender, now: DateTime<Utc>) -> Self {
        let is_expired = tender.is_expired_at(now);
        let (file_name, file_path) = match tender.file {
            Some(file) => (Some(file.file_name), Some(file.file_path)),
            None => (None, None),
        };
        TenderResponse {
            id: tender.id,
            title: tender.title,
            deadline: tender.deadline,
            file_name,
            file_path,
            status: tender.status,
            upload_date: tender.upload_date,
            created_at: tender.created_at,
            updated_at: tender.updated_at,
            version: tender.version,
            is_expired,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct TenderDeletedResponse {
    pub msg: String,
    pub id: Uuid,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ReferencedFilesResponse {
    pub paths: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn create_test_tender() -> Tender {
        let created = Utc.with_ymd_and_hms(2030, 3, 1, 9, 0, 0).unwrap();
        Tender {
            id: Uuid::new_v4(),
            title: "Annual Lift Maintenance Contract".to_string(),
            deadline: created + Duration::days(30),
            file: Some(FileRef {
                file_name: "lift-amc.pdf".to_string(),
                file_path: "tenders/tenderDocument-1-abcd1234.pdf".to_string(),
            }),
            status: TenderStatus::Active,
            upload_date: created,
            created_at: created,
            updated_at: created,
            version: 1,
        }
    }

    #[test]
    fn test_is_expired_is_strict() {
        let tender = create_test_tender();
        assert!(!tender.is_expired_at(tender.deadline));
        assert!(tender.is_expired_at(tender.deadline + Duration::seconds(1)));
    }

    #[test]
    fn test_response_uses_camel_case() {
        let tender = create_test_tender();
        let now = tender.created_at;
        let response = TenderResponse::from_tender(tender, now);
        let json = serde_json::to_value(&response).expect("serialize");

        assert_eq!(json["fileName"], "lift-amc.pdf");
        assert_eq!(json["isExpired"], false);
        assert_eq!(json["status"], "active");
        assert!(json.get("uploadDate").is_some());
        assert!(json.get("file_name").is_none());
    }

    #[test]
    fn test_response_expiry_follows_clock_not_status() {
        let tender = create_test_tender();
        let later = tender.deadline + Duration::days(1);
        let response = TenderResponse::from_tender(tender, later);
        assert!(response.is_expired);
        assert_eq!(response.status, TenderStatus::Active);
    }

    #[test]
    fn test_empty_file_path_counts_as_missing() {
        let mut tender = create_test_tender();
        tender.file = Some(FileRef {
            file_name: "x.pdf".to_string(),
            file_path: String::new(),
        });
        assert_eq!(tender.file_path(), None);
    }

    #[test]
    fn test_status_round_trip() {
        for status in [
            TenderStatus::Active,
            TenderStatus::Closed,
            TenderStatus::Cancelled,
        ] {
            assert_eq!(status.as_str().parse::<TenderStatus>().unwrap(), status);
        }
        assert!("CLOSED".parse::<TenderStatus>().is_ok());
        assert!("archived".parse::<TenderStatus>().is_err());
    }
}
