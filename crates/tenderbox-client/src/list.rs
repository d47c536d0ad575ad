//! Tender list state and expiry badges

use crate::{ClientError, TenderClient};
use chrono::{DateTime, Utc};
use tenderbox_core::models::TenderResponse;

pub const LOAD_FAILED_MESSAGE: &str =
    "Failed to load tenders. Please check your network connection.";

/// Display-only marker derived from the deadline; the stored `status` is never touched
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Badge {
    Active,
    Expired,
}

impl Badge {
    pub fn for_tender(tender: &TenderResponse, now: DateTime<Utc>) -> Self {
        if tender.deadline < now {
            Badge::Expired
        } else {
            Badge::Active
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Badge::Active => "Active",
            Badge::Expired => "Expired",
        }
    }
}

/// One rendered card
#[derive(Debug, Clone, PartialEq)]
pub struct TenderRow<'a> {
    pub tender: &'a TenderResponse,
    pub badge: Badge,
    pub posted: String,
    pub deadline: String,
    pub has_document: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ListState {
    Loading,
    Loaded(Vec<TenderResponse>),
    Failed(String),
}

#[derive(Debug, Clone)]
pub struct TenderList {
    state: ListState,
}

impl Default for TenderList {
    fn default() -> Self {
        Self::new()
    }
}

impl TenderList {
    pub fn new() -> Self {
        Self {
            state: ListState::Loading,
        }
    }

    pub fn state(&self) -> &ListState {
        &self.state
    }

    pub fn is_loading(&self) -> bool {
        matches!(self.state, ListState::Loading)
    }

    /// Message to show with a retry control, if the last load failed
    pub fn error(&self) -> Option<&str> {
        match &self.state {
            ListState::Failed(message) => Some(message),
            _ => None,
        }
    }

    pub fn tenders(&self) -> &[TenderResponse] {
        match &self.state {
            ListState::Loaded(tenders) => tenders,
            _ => &[],
        }
    }

    pub fn find(&self, id: uuid::Uuid) -> Option<&TenderResponse> {
        self.tenders().iter().find(|t| t.id == id)
    }

    /// Fetch the list from the server
    pub async fn load(&mut self, client: &TenderClient) {
        self.state = ListState::Loading;
        let result = client.list().await;
        self.apply(result);
    }

    /// Same as [`TenderList::load`]; offered after a failure
    pub async fn retry(&mut self, client: &TenderClient) {
        self.load(client).await;
    }

    pub fn apply(&mut self, result: Result<Vec<TenderResponse>, ClientError>) {
        self.state = match result {
            Ok(tenders) => ListState::Loaded(tenders),
            Err(e) => {
                tracing::warn!(error = %e, "Failed to load tenders");
                ListState::Failed(LOAD_FAILED_MESSAGE.to_string())
            }
        };
    }

    /// Cards in server order with badges computed against `now`
    pub fn rows(&self, now: DateTime<Utc>) -> Vec<TenderRow<'_>> {
        self.tenders()
            .iter()
            .map(|tender| TenderRow {
                tender,
                badge: Badge::for_tender(tender, now),
                posted: tender.upload_date.format("%Y-%m-%d").to_string(),
                deadline: tender.deadline.format("%Y-%m-%d").to_string(),
                has_document: tender.file_path.as_deref().is_some_and(|p| !p.is_empty()),
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};
    use tenderbox_core::models::TenderStatus;
    use uuid::Uuid;

    fn tender(title: &str, deadline: DateTime<Utc>) -> TenderResponse {
        let created = Utc.with_ymd_and_hms(2030, 1, 2, 8, 0, 0).unwrap();
        TenderResponse {
            id: Uuid::new_v4(),
            title: title.to_string(),
            deadline,
            file_name: Some("doc.pdf".to_string()),
            file_path: Some("tenders/tenderDocument-1-abcd1234.pdf".to_string()),
            status: TenderStatus::Active,
            upload_date: created,
            created_at: created,
            updated_at: created,
            version: 1,
            is_expired: false,
        }
    }

    #[test]
    fn test_badge_follows_client_clock() {
        let deadline = Utc.with_ymd_and_hms(2030, 1, 20, 0, 0, 0).unwrap();
        let t = tender("Lift AMC", deadline);

        assert_eq!(Badge::for_tender(&t, deadline - Duration::hours(1)), Badge::Active);
        assert_eq!(Badge::for_tender(&t, deadline), Badge::Active);
        assert_eq!(
            Badge::for_tender(&t, deadline + Duration::seconds(1)),
            Badge::Expired
        );
        assert_eq!(Badge::Expired.label(), "Expired");
    }

    #[test]
    fn test_rows_never_change_status() {
        let deadline = Utc.with_ymd_and_hms(2030, 1, 20, 0, 0, 0).unwrap();
        let mut list = TenderList::new();
        list.apply(Ok(vec![tender("Lift AMC", deadline)]));

        let rows = list.rows(deadline + Duration::days(3));
        assert_eq!(rows[0].badge, Badge::Expired);
        assert_eq!(rows[0].tender.status, TenderStatus::Active);
        assert_eq!(rows[0].deadline, "2030-01-20");
        assert_eq!(rows[0].posted, "2030-01-02");
        assert!(rows[0].has_document);
    }

    #[test]
    fn test_failure_state_carries_message() {
        let mut list = TenderList::new();
        assert!(list.is_loading());

        list.apply(Err(ClientError::Decode("truncated".to_string())));
        assert_eq!(list.error(), Some(LOAD_FAILED_MESSAGE));
        assert!(list.tenders().is_empty());
    }
}
