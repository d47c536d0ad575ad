//! API constants

/// Tender collection path, relative to the server root
pub const TENDERS_PATH: &str = "/api/tenders";

/// Path of the served OpenAPI document
pub const OPENAPI_PATH: &str = "/api/openapi.json";
