use crate::error::{ErrorResponse, HttpAppError};
use crate::handlers::parse_tender_id;
use crate::state::AppState;
use axum::{
    extract::{Path, State},
    response::IntoResponse,
    Json,
};
use std::sync::Arc;
use tenderbox_core::models::{ReferencedFilesResponse, TenderResponse};

#[utoipa::path(
    get,
    path = "/api/tenders",
    tag = "tenders",
    responses(
        (status = 200, description = "All tenders, newest upload first", body = Vec<TenderResponse>),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state), fields(operation = "list_tenders"))]
pub async fn list_tenders(
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, HttpAppError> {
    let tenders = state.tenders.list().await?;
    let now = state.clock.now();

    let responses: Vec<TenderResponse> = tenders
        .into_iter()
        .map(|tender| TenderResponse::from_tender(tender, now))
        .collect();

    Ok(Json(responses))
}

#[utoipa::path(
    get,
    path = "/api/tenders/{id}",
    tag = "tenders",
    params(
        ("id" = String, Path, description = "Tender ID")
    ),
    responses(
        (status = 200, description = "Tender", body = TenderResponse),
        (status = 404, description = "Tender not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state), fields(tender_id = %id, operation = "get_tender"))]
pub async fn get_tender(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, HttpAppError> {
    let id = parse_tender_id(&id)?;
    let tender = state.tenders.get(id).await?;

    Ok(Json(TenderResponse::from_tender(tender, state.clock.now())))
}

/// Storage keys still referenced by some tender; input for storage reconciliation
#[utoipa::path(
    get,
    path = "/api/tenders/referenced-files",
    tag = "tenders",
    responses(
        (status = 200, description = "Referenced storage keys", body = ReferencedFilesResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state), fields(operation = "referenced_files"))]
pub async fn referenced_files(
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, HttpAppError> {
    let paths = state.tenders.referenced_file_paths().await?;
    Ok(Json(ReferencedFilesResponse { paths }))
}
