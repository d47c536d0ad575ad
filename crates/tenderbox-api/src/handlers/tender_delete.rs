use crate::error::{ErrorResponse, HttpAppError};
use crate::handlers::parse_tender_id;
use crate::state::AppState;
use axum::{
    extract::{Path, Query, State},
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use std::sync::Arc;
use tenderbox_core::models::TenderDeletedResponse;
use utoipa::IntoParams;

#[derive(Debug, Deserialize, IntoParams)]
pub struct DeleteTenderParams {
    /// Expected current version; omitted means unconditional
    pub version: Option<i64>,
}

#[utoipa::path(
    delete,
    path = "/api/tenders/{id}",
    tag = "tenders",
    params(
        ("id" = String, Path, description = "Tender ID"),
        DeleteTenderParams
    ),
    responses(
        (status = 200, description = "Tender deleted", body = TenderDeletedResponse),
        (status = 404, description = "Tender not found", body = ErrorResponse),
        (status = 409, description = "Version conflict", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state), fields(tender_id = %id, operation = "delete_tender"))]
pub async fn delete_tender(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Query(params): Query<DeleteTenderParams>,
) -> Result<impl IntoResponse, HttpAppError> {
    let id = parse_tender_id(&id)?;
    let removed = state.tenders.delete(id, params.version).await?;

    Ok(Json(TenderDeletedResponse {
        msg: "Tender removed successfully".to_string(),
        id: removed.id,
    }))
}
