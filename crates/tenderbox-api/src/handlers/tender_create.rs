use crate::error::{ErrorResponse, HttpAppError};
use crate::state::AppState;
use crate::utils::upload::read_tender_form;
use axum::{
    extract::{Multipart, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use std::sync::Arc;
use tenderbox_core::models::TenderResponse;
use utoipa::ToSchema;

/// Multipart body accepted by create and update
#[derive(Deserialize, ToSchema)]
#[allow(dead_code)]
pub struct TenderUploadForm {
    /// 3 to 200 characters after trimming
    title: Option<String>,
    /// RFC 3339, `YYYY-MM-DDTHH:MM` or `YYYY-MM-DD`; must be in the future
    deadline: Option<String>,
    /// active, closed or cancelled
    status: Option<String>,
    /// Expected current version (update only)
    version: Option<i64>,
    /// PDF, PNG, JPG or JPEG document, at most the configured size
    #[serde(rename = "tenderDocument")]
    #[schema(value_type = Option<String>, format = Binary)]
    tender_document: Option<Vec<u8>>,
}

#[utoipa::path(
    post,
    path = "/api/tenders",
    tag = "tenders",
    request_body(content = TenderUploadForm, content_type = "multipart/form-data"),
    responses(
        (status = 201, description = "Tender created", body = TenderResponse),
        (status = 400, description = "Validation failed", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state, multipart), fields(operation = "create_tender"))]
pub async fn create_tender(
    State(state): State<Arc<AppState>>,
    multipart: Multipart,
) -> Result<impl IntoResponse, HttpAppError> {
    let form = read_tender_form(multipart, state.limits.max_file_size).await?;

    let tender = state.tenders.create(form.draft, form.document).await?;
    let response = TenderResponse::from_tender(tender, state.clock.now());

    Ok((StatusCode::CREATED, Json(response)))
}
