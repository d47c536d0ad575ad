//! Request builders shared by the API tests

use axum_test::multipart::{MultipartForm, Part};
use serde_json::Value;

use super::TestApp;

pub const PDF_BYTES: &[u8] = b"%PDF-1.4\n1 0 obj << /Type /Catalog >> endobj\n%%EOF\n";

pub fn pdf_part(file_name: &str, bytes: Vec<u8>) -> Part {
    Part::bytes(bytes)
        .file_name(file_name.to_string())
        .mime_type("application/pdf")
}

pub fn tender_form(title: &str, deadline: &str) -> MultipartForm {
    MultipartForm::new()
        .add_text("title", title.to_string())
        .add_text("deadline", deadline.to_string())
}

pub fn tender_form_with_pdf(title: &str, deadline: &str, file_name: &str) -> MultipartForm {
    tender_form(title, deadline).add_part("tenderDocument", pdf_part(file_name, PDF_BYTES.to_vec()))
}

/// Create a tender through the API and return its JSON representation
pub async fn create_tender(app: &TestApp, title: &str, file_name: &str) -> Value {
    let response = app
        .server
        .post("/api/tenders")
        .multipart(tender_form_with_pdf(title, "2030-02-01", file_name))
        .await;
    response.assert_status(axum::http::StatusCode::CREATED);
    response.json::<Value>()
}

/// Messages reported for one form field in an error body
pub fn field_messages(body: &Value, field: &str) -> Vec<String> {
    body["fields"]
        .as_array()
        .map(|fields| {
            fields
                .iter()
                .filter(|f| f["field"] == field)
                .filter_map(|f| f["message"].as_str().map(str::to_string))
                .collect()
        })
        .unwrap_or_default()
}
