pub mod tender_create;
pub mod tender_delete;
pub mod tender_download;
pub mod tender_get;
pub mod tender_update;

use tenderbox_core::{AppError, NotFoundReason};
use uuid::Uuid;

/// Path ids are taken as text so a malformed id reads as "no such tender" rather than a 400
pub(crate) fn parse_tender_id(raw: &str) -> Result<Uuid, AppError> {
    Uuid::parse_str(raw).map_err(|_| {
        tracing::debug!(tender_id = %raw, "Malformed tender id");
        AppError::NotFound(NotFoundReason::TenderMissing)
    })
}
