//! Domain route groups.

use crate::constants::TENDERS_PATH;
use crate::handlers;
use crate::state::AppState;
use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;

/// Tender CRUD and document delivery
pub(super) fn tender_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route(
            TENDERS_PATH,
            post(handlers::tender_create::create_tender).get(handlers::tender_get::list_tenders),
        )
        .route(
            &format!("{}/referenced-files", TENDERS_PATH),
            get(handlers::tender_get::referenced_files),
        )
        .route(
            &format!("{}/download/view/{{id}}", TENDERS_PATH),
            get(handlers::tender_download::view_tender),
        )
        .route(
            &format!("{}/download/{{id}}", TENDERS_PATH),
            get(handlers::tender_download::download_tender),
        )
        .route(
            &format!("{}/{{id}}", TENDERS_PATH),
            get(handlers::tender_get::get_tender)
                .patch(handlers::tender_update::update_tender)
                .put(handlers::tender_update::replace_tender)
                .delete(handlers::tender_delete::delete_tender),
        )
}
