use crate::error::{ErrorResponse, HttpAppError};
use crate::services::{content_disposition, DispositionMode, OpenedDocument};
use crate::state::AppState;
use axum::{
    body::Body,
    extract::{Path, State},
    http::{header, HeaderValue, Response, StatusCode},
    response::IntoResponse,
};
use futures::StreamExt;
use std::sync::Arc;
use tenderbox_core::AppError;

#[utoipa::path(
    get,
    path = "/api/tenders/download/{id}",
    tag = "tenders",
    params(
        ("id" = String, Path, description = "Tender ID")
    ),
    responses(
        (status = 200, description = "Tender document as an attachment", content_type = "application/octet-stream"),
        (status = 404, description = "Tender, file reference or stored file not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state), fields(tender_id = %id, operation = "download_tender"))]
pub async fn download_tender(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, HttpAppError> {
    let document = state.downloads.open(&id).await?;
    respond(document, DispositionMode::Attachment, &state)
}

#[utoipa::path(
    get,
    path = "/api/tenders/download/view/{id}",
    tag = "tenders",
    params(
        ("id" = String, Path, description = "Tender ID")
    ),
    responses(
        (status = 200, description = "Tender document for in-browser viewing", content_type = "application/octet-stream"),
        (status = 404, description = "Tender, file reference or stored file not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state), fields(tender_id = %id, operation = "view_tender"))]
pub async fn view_tender(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, HttpAppError> {
    let document = state.downloads.open(&id).await?;
    respond(document, DispositionMode::Inline, &state)
}

fn respond(
    document: OpenedDocument,
    mode: DispositionMode,
    state: &AppState,
) -> Result<Response<Body>, HttpAppError> {
    tracing::debug!(
        tender_id = %document.tender_id,
        file_name = %document.file_name,
        content_length = document.content_length,
        mode = mode.as_str(),
        "Streaming tender document"
    );

    let disposition = HeaderValue::from_str(&content_disposition(mode, &document.file_name))
        .map_err(|e| AppError::Internal(format!("Invalid Content-Disposition header: {}", e)))?;

    // Wrap storage stream for axum Body
    let body_stream = document.body.map(|result| {
        result.map_err(|e| std::io::Error::other(format!("Storage stream error: {}", e)))
    });

    let mut builder = Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, document.content_type)
        .header(header::CONTENT_LENGTH, document.content_length)
        .header(header::CONTENT_DISPOSITION, disposition);

    builder = match mode {
        DispositionMode::Attachment => builder
            .header(
                header::CACHE_CONTROL,
                "no-cache, no-store, must-revalidate",
            )
            .header(header::PRAGMA, "no-cache")
            .header(header::EXPIRES, "0")
            .header(header::X_CONTENT_TYPE_OPTIONS, "nosniff")
            .header(
                header::ACCESS_CONTROL_EXPOSE_HEADERS,
                "Content-Disposition, Content-Length, Content-Type",
            ),
        DispositionMode::Inline => builder.header(
            header::CACHE_CONTROL,
            format!("public, max-age={}", state.limits.inline_cache_max_age_secs),
        ),
    };

    let response = builder
        .body(Body::from_stream(body_stream))
        .map_err(|e| AppError::Internal(format!("Failed to build response: {}", e)))?;

    Ok(response)
}
