//! OpenAPI documentation.

use utoipa::OpenApi;

use crate::error;
use crate::handlers;
use tenderbox_core::models;
use tenderbox_core::validation::FieldError;

pub fn get_openapi_spec() -> utoipa::openapi::OpenApi {
    ApiDoc::openapi()
}

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Tenderbox API",
        version = "0.1.0",
        description = "Tender notices for a residential society: publish a tender with its document, keep it current, and serve the document for download or in-browser viewing."
    ),
    paths(
        handlers::tender_create::create_tender,
        handlers::tender_get::list_tenders,
        handlers::tender_get::get_tender,
        handlers::tender_get::referenced_files,
        handlers::tender_update::update_tender,
        handlers::tender_update::replace_tender,
        handlers::tender_delete::delete_tender,
        handlers::tender_download::download_tender,
        handlers::tender_download::view_tender,
    ),
    components(
        schemas(
            models::TenderResponse,
            models::TenderStatus,
            models::TenderDeletedResponse,
            models::ReferencedFilesResponse,
            handlers::tender_create::TenderUploadForm,
            handlers::tender_update::ReplaceTenderRequest,
            error::ErrorResponse,
            FieldError,
        )
    ),
    tags(
        (name = "tenders", description = "Tender lifecycle and document delivery")
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_spec_lists_tender_routes() {
        let spec = get_openapi_spec();
        for path in [
            "/api/tenders",
            "/api/tenders/{id}",
            "/api/tenders/download/{id}",
            "/api/tenders/download/view/{id}",
            "/api/tenders/referenced-files",
        ] {
            assert!(spec.paths.paths.contains_key(path), "missing {}", path);
        }
    }
}
