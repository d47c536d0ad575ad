use crate::error::{ErrorResponse, HttpAppError, ValidatedJson};
use crate::handlers::parse_tender_id;
use crate::state::AppState;
use crate::utils::upload::read_tender_form;
use axum::{
    extract::{Multipart, Path, State},
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use std::sync::Arc;
use tenderbox_core::models::TenderResponse;
use tenderbox_core::validation::TenderDraft;
use tenderbox_core::FieldErrors;
use utoipa::ToSchema;
use validator::Validate;

/// Full replacement of a tender's title and deadline, optionally its status
#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct ReplaceTenderRequest {
    pub title: Option<String>,
    pub deadline: Option<String>,
    /// Left unchanged when omitted
    pub status: Option<String>,
    /// Expected current version; omitted means last writer wins
    #[validate(range(min = 1, message = "Version must be a positive whole number."))]
    pub version: Option<i64>,
}

#[utoipa::path(
    patch,
    path = "/api/tenders/{id}",
    tag = "tenders",
    params(
        ("id" = String, Path, description = "Tender ID")
    ),
    request_body(content = crate::handlers::tender_create::TenderUploadForm, content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "Tender updated", body = TenderResponse),
        (status = 400, description = "Validation failed", body = ErrorResponse),
        (status = 404, description = "Tender not found", body = ErrorResponse),
        (status = 409, description = "Version conflict", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state, multipart), fields(tender_id = %id, operation = "update_tender"))]
pub async fn update_tender(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    multipart: Multipart,
) -> Result<impl IntoResponse, HttpAppError> {
    let id = parse_tender_id(&id)?;
    let form = read_tender_form(multipart, state.limits.max_file_size).await?;

    let tender = state
        .tenders
        .update(id, form.draft, form.document, form.version)
        .await?;

    Ok(Json(TenderResponse::from_tender(tender, state.clock.now())))
}

#[utoipa::path(
    put,
    path = "/api/tenders/{id}",
    tag = "tenders",
    params(
        ("id" = String, Path, description = "Tender ID")
    ),
    request_body = ReplaceTenderRequest,
    responses(
        (status = 200, description = "Tender replaced", body = TenderResponse),
        (status = 400, description = "Validation failed", body = ErrorResponse),
        (status = 404, description = "Tender not found", body = ErrorResponse),
        (status = 409, description = "Version conflict", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state, request), fields(tender_id = %id, operation = "replace_tender"))]
pub async fn replace_tender(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    ValidatedJson(request): ValidatedJson<ReplaceTenderRequest>,
) -> Result<impl IntoResponse, HttpAppError> {
    let id = parse_tender_id(&id)?;
    let rejected = match request.validate() {
        Ok(()) => FieldErrors::new(),
        Err(e) => FieldErrors::from(e),
    };
    let draft = TenderDraft {
        title: request.title,
        deadline: request.deadline,
        status: request.status,
        rejected,
    };

    let tender = state.tenders.replace(id, draft, request.version).await?;

    Ok(Json(TenderResponse::from_tender(tender, state.clock.now())))
}
