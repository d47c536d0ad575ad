//! Admin tender form
//!
//! Mirrors the server rules for early feedback, with two stricter choices: titles need at least
//! five characters and the earliest selectable deadline is tomorrow. Every broken rule is
//! collected so all offending fields can be highlighted together.

use crate::api::{DocumentUpload, TenderSubmission};
use chrono::{DateTime, Days, NaiveDate, Utc};
use tenderbox_core::models::{TenderResponse, TenderStatus};
use tenderbox_core::validation::{field, parse_deadline, TitleRule};
use tenderbox_core::{FieldErrors, UploadValidator};
use uuid::Uuid;

const DATE_FORMAT: &str = "%Y-%m-%d";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormMode {
    Create,
    /// Editing an existing tender; `version` is sent back for conflict detection
    Edit { id: Uuid, version: i64 },
}

#[derive(Debug, Clone)]
pub struct TenderForm {
    mode: FormMode,
    title: String,
    deadline: String,
    status: Option<TenderStatus>,
    document: Option<DocumentUpload>,
    errors: FieldErrors,
    validator: UploadValidator,
}

/// First date the deadline picker offers
pub fn min_deadline(now: DateTime<Utc>) -> NaiveDate {
    let today = now.date_naive();
    today.checked_add_days(Days::new(1)).unwrap_or(today)
}

impl TenderForm {
    /// Empty form for a new tender
    pub fn new(validator: UploadValidator) -> Self {
        Self {
            mode: FormMode::Create,
            title: String::new(),
            deadline: String::new(),
            status: None,
            document: None,
            errors: FieldErrors::new(),
            validator,
        }
    }

    /// Form pre-filled from an existing tender
    ///
    /// The file input always starts empty; leaving it empty keeps the stored document.
    pub fn edit(tender: &TenderResponse, validator: UploadValidator) -> Self {
        Self {
            mode: FormMode::Edit {
                id: tender.id,
                version: tender.version,
            },
            title: tender.title.clone(),
            deadline: tender.deadline.date_naive().format(DATE_FORMAT).to_string(),
            status: Some(tender.status),
            document: None,
            errors: FieldErrors::new(),
            validator,
        }
    }

    pub fn mode(&self) -> FormMode {
        self.mode
    }

    pub fn is_editing(&self) -> bool {
        matches!(self.mode, FormMode::Edit { .. })
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn deadline(&self) -> &str {
        &self.deadline
    }

    pub fn status(&self) -> Option<TenderStatus> {
        self.status
    }

    pub fn document(&self) -> Option<&DocumentUpload> {
        self.document.as_ref()
    }

    pub fn set_title(&mut self, title: impl Into<String>) {
        self.title = title.into();
    }

    pub fn set_deadline(&mut self, deadline: impl Into<String>) {
        self.deadline = deadline.into();
    }

    pub fn set_status(&mut self, status: Option<TenderStatus>) {
        self.status = status;
    }

    pub fn select_document(&mut self, document: DocumentUpload) {
        self.document = Some(document);
    }

    pub fn clear_document(&mut self) {
        self.document = None;
    }

    /// Errors from the last validation or server response
    pub fn errors(&self) -> &FieldErrors {
        &self.errors
    }

    pub fn errors_for<'a>(&'a self, name: &'a str) -> Vec<&'a str> {
        self.errors.for_field(name).collect()
    }

    /// Every client-side rule the current input breaks
    pub fn check(&self, now: DateTime<Utc>) -> FieldErrors {
        let mut errors = FieldErrors::new();

        if let Err(message) = TitleRule::CLIENT.check(Some(&self.title)) {
            errors.push(field::TITLE, message);
        }

        if let Err(message) = check_client_deadline(&self.deadline, now) {
            errors.push(field::DEADLINE, message);
        }

        match &self.document {
            Some(document) => {
                if let Err(file_errors) = self.validator.validate_all(
                    &document.file_name,
                    &document.content_type,
                    document.size(),
                ) {
                    errors.extend(file_errors);
                }
            }
            None if self.mode == FormMode::Create => {
                errors.push(field::FILE, "Please upload a tender document.");
            }
            None => {}
        }

        errors
    }

    /// Re-run validation and keep the result for display
    pub fn validate(&mut self, now: DateTime<Utc>) -> bool {
        self.errors = self.check(now);
        self.errors.is_empty()
    }

    /// Submit stays disabled while any field is invalid
    pub fn can_submit(&self, now: DateTime<Utc>) -> bool {
        self.check(now).is_empty()
    }

    /// Validated request body, or the errors that block submission
    pub fn submission(&mut self, now: DateTime<Utc>) -> Result<TenderSubmission, FieldErrors> {
        if !self.validate(now) {
            return Err(self.errors.clone());
        }

        let version = match self.mode {
            FormMode::Create => None,
            FormMode::Edit { version, .. } => Some(version),
        };

        Ok(TenderSubmission {
            title: Some(self.title.trim().to_string()),
            deadline: Some(self.deadline.trim().to_string()),
            status: self.status,
            document: self.document.clone(),
            version,
        })
    }

    /// Show server-side field errors next to the inputs; input values are kept
    pub fn apply_server_errors(&mut self, server: &FieldErrors) {
        for error in server.iter() {
            let already_shown = self
                .errors
                .for_field(&error.field)
                .any(|message| message == error.message);
            if !already_shown {
                self.errors.push(error.field.clone(), error.message.clone());
            }
        }
    }

    /// Back to an empty create form
    pub fn reset(&mut self) {
        let validator = self.validator.clone();
        *self = Self::new(validator);
    }
}

fn check_client_deadline(raw: &str, now: DateTime<Utc>) -> Result<NaiveDate, String> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Err("Please select a deadline date.".to_string());
    }
    let date = parse_deadline(raw)
        .map(|deadline| deadline.date_naive())
        .ok_or_else(|| "The deadline is not a valid date.".to_string())?;
    if date < min_deadline(now) {
        return Err("The deadline must be tomorrow or later.".to_string());
    }
    Ok(date)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2030, 1, 10, 18, 30, 0).unwrap()
    }

    fn pdf() -> DocumentUpload {
        DocumentUpload::new("scope.pdf", "application/pdf", b"%PDF-1.4 scope".to_vec())
    }

    fn filled_form() -> TenderForm {
        let mut form = TenderForm::new(UploadValidator::default());
        form.set_title("Annual Lift Maintenance Contract");
        form.set_deadline("2030-01-11");
        form.select_document(pdf());
        form
    }

    fn existing_tender() -> TenderResponse {
        let created = Utc.with_ymd_and_hms(2030, 1, 2, 8, 0, 0).unwrap();
        TenderResponse {
            id: Uuid::new_v4(),
            title: "Painting of Building Exteriors".to_string(),
            deadline: Utc.with_ymd_and_hms(2030, 2, 15, 17, 0, 0).unwrap(),
            file_name: Some("painting.pdf".to_string()),
            file_path: Some("tenders/tenderDocument-1-abcd1234.pdf".to_string()),
            status: TenderStatus::Active,
            upload_date: created,
            created_at: created,
            updated_at: created,
            version: 3,
            is_expired: false,
        }
    }

    #[test]
    fn test_min_deadline_is_tomorrow() {
        assert_eq!(
            min_deadline(now()),
            NaiveDate::from_ymd_opt(2030, 1, 11).unwrap()
        );
    }

    #[test]
    fn test_complete_form_can_submit() {
        let form = filled_form();
        assert!(form.can_submit(now()));
    }

    #[test]
    fn test_today_is_rejected_tomorrow_accepted() {
        let mut form = filled_form();
        form.set_deadline("2030-01-10");
        assert_eq!(
            form.check(now()).for_field(field::DEADLINE).collect::<Vec<_>>(),
            vec!["The deadline must be tomorrow or later."]
        );

        form.set_deadline("2030-01-11");
        assert!(!form.check(now()).has_field(field::DEADLINE));
    }

    #[test]
    fn test_client_title_rule_is_stricter_than_server() {
        let mut form = filled_form();
        form.set_title("Lift");
        assert!(!form.can_submit(now()));
        form.set_title("  Lifts  ");
        assert!(form.can_submit(now()));
    }

    #[test]
    fn test_every_violation_is_reported() {
        let mut form = TenderForm::new(UploadValidator::new(1_500_000));
        form.set_title("ab");
        form.set_deadline("not a date");
        form.select_document(DocumentUpload::new(
            "setup.exe",
            "application/octet-stream",
            vec![0u8; 2_000_000],
        ));

        assert!(!form.validate(now()));
        let errors = form.errors();
        assert!(errors.has_field(field::TITLE));
        assert_eq!(
            form.errors_for(field::DEADLINE),
            vec!["The deadline is not a valid date."]
        );
        let file_errors = form.errors_for(field::FILE);
        assert!(file_errors.contains(&"File size must be less than 1.5MB"));
        assert!(file_errors.contains(&"Only PNG, JPG, JPEG, and PDF files are allowed"));
    }

    #[test]
    fn test_file_required_only_when_creating() {
        let mut form = filled_form();
        form.clear_document();
        assert_eq!(
            form.check(now()).for_field(field::FILE).collect::<Vec<_>>(),
            vec!["Please upload a tender document."]
        );

        let edit = TenderForm::edit(&existing_tender(), UploadValidator::default());
        assert!(edit.can_submit(now()));
    }

    #[test]
    fn test_edit_prefills_everything_but_the_file() {
        let tender = existing_tender();
        let form = TenderForm::edit(&tender, UploadValidator::default());

        assert_eq!(form.title(), tender.title);
        assert_eq!(form.deadline(), "2030-02-15");
        assert_eq!(form.status(), Some(TenderStatus::Active));
        assert!(form.document().is_none());
        assert_eq!(
            form.mode(),
            FormMode::Edit {
                id: tender.id,
                version: 3
            }
        );
    }

    #[test]
    fn test_edit_submission_keeps_file_unless_replaced() {
        let mut form = TenderForm::edit(&existing_tender(), UploadValidator::default());
        let submission = form.submission(now()).expect("valid");
        assert!(submission.document.is_none());
        assert_eq!(submission.version, Some(3));

        form.select_document(pdf());
        let submission = form.submission(now()).expect("valid");
        assert_eq!(submission.document, Some(pdf()));
    }

    #[test]
    fn test_submission_is_blocked_by_errors() {
        let mut form = filled_form();
        form.set_title("");
        let errors = form.submission(now()).unwrap_err();
        assert_eq!(
            errors.for_field(field::TITLE).collect::<Vec<_>>(),
            vec!["Please enter a title for the tender."]
        );
    }

    #[test]
    fn test_server_errors_merge_without_clearing_input() {
        let mut form = filled_form();
        assert!(form.validate(now()));

        let server = FieldErrors::single(field::DEADLINE, "The deadline must be a future date.");
        form.apply_server_errors(&server);
        form.apply_server_errors(&server);

        assert_eq!(
            form.errors_for(field::DEADLINE),
            vec!["The deadline must be a future date."]
        );
        assert_eq!(form.title(), "Annual Lift Maintenance Contract");
        assert!(form.document().is_some());
    }

    #[test]
    fn test_reset_returns_to_empty_create_form() {
        let mut form = TenderForm::edit(&existing_tender(), UploadValidator::default());
        form.validate(now() + Duration::days(60));
        form.reset();

        assert_eq!(form.mode(), FormMode::Create);
        assert!(form.title().is_empty());
        assert!(form.deadline().is_empty());
        assert!(form.errors().is_empty());
    }
}
