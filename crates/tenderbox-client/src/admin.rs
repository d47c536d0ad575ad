//! Admin tender management screen
//!
//! [`TenderAdmin`] owns the form, the list and the delete confirmation, and turns API outcomes
//! into notices. It holds no rendering state beyond what the view needs to draw.

use crate::form::{FormMode, TenderForm};
use crate::list::TenderList;
use crate::{ClientError, TenderClient};
use std::sync::Arc;
use tenderbox_core::{Clock, UploadValidator};
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    Success(String),
    Error(String),
}

impl Notice {
    pub fn message(&self) -> &str {
        match self {
            Notice::Success(message) | Notice::Error(message) => message,
        }
    }
}

/// Two-step delete: a request only arms the dialog, nothing is sent until confirmed
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeleteConfirmation {
    pending: Option<Uuid>,
}

impl DeleteConfirmation {
    pub fn request(&mut self, id: Uuid) {
        self.pending = Some(id);
    }

    pub fn pending(&self) -> Option<Uuid> {
        self.pending
    }

    pub fn cancel(&mut self) {
        self.pending = None;
    }

    /// Disarm and return the tender to delete
    pub fn confirm(&mut self) -> Option<Uuid> {
        self.pending.take()
    }
}

pub struct TenderAdmin {
    client: TenderClient,
    clock: Arc<dyn Clock>,
    validator: UploadValidator,
    form: TenderForm,
    list: TenderList,
    confirmation: DeleteConfirmation,
    notice: Option<Notice>,
    submitting: bool,
}

impl TenderAdmin {
    pub fn new(client: TenderClient, clock: Arc<dyn Clock>, validator: UploadValidator) -> Self {
        Self {
            client,
            clock,
            form: TenderForm::new(validator.clone()),
            validator,
            list: TenderList::new(),
            confirmation: DeleteConfirmation::default(),
            notice: None,
            submitting: false,
        }
    }

    pub fn form(&self) -> &TenderForm {
        &self.form
    }

    pub fn form_mut(&mut self) -> &mut TenderForm {
        &mut self.form
    }

    pub fn list(&self) -> &TenderList {
        &self.list
    }

    pub fn confirmation(&self) -> &DeleteConfirmation {
        &self.confirmation
    }

    pub fn notice(&self) -> Option<&Notice> {
        self.notice.as_ref()
    }

    pub fn dismiss_notice(&mut self) {
        self.notice = None;
    }

    pub fn is_submitting(&self) -> bool {
        self.submitting
    }

    /// Submit button state
    pub fn can_submit(&self) -> bool {
        !self.submitting && self.form.can_submit(self.clock.now())
    }

    pub async fn load(&mut self) {
        self.list.load(&self.client).await;
    }

    /// Switch the form to editing a listed tender; returns false if it is not in the list
    pub fn start_edit(&mut self, id: Uuid) -> bool {
        let Some(tender) = self.list.find(id) else {
            return false;
        };
        self.form = TenderForm::edit(tender, self.validator.clone());
        self.notice = None;
        true
    }

    pub fn cancel_edit(&mut self) {
        self.form.reset();
    }

    /// Validate and send the form; returns true when the server accepted it
    pub async fn submit(&mut self) -> bool {
        if self.submitting {
            return false;
        }
        let Ok(submission) = self.form.submission(self.clock.now()) else {
            return false;
        };

        self.submitting = true;
        let mode = self.form.mode();
        let result = match mode {
            FormMode::Create => self.client.create(submission).await,
            FormMode::Edit { id, .. } => self.client.update(id, submission).await,
        };
        self.submitting = false;

        let action = match mode {
            FormMode::Create => "create",
            FormMode::Edit { .. } => "update",
        };

        match result {
            Ok(tender) => {
                tracing::info!(tender_id = %tender.id, action, "Tender saved");
                let message = match mode {
                    FormMode::Create => "Tender created successfully!",
                    FormMode::Edit { .. } => "Tender updated successfully!",
                };
                self.notice = Some(Notice::Success(message.to_string()));
                self.form.reset();
                self.load().await;
                true
            }
            Err(e) => {
                tracing::warn!(error = %e, action, "Failed to save tender");
                self.report_save_error(&e, action);
                false
            }
        }
    }

    fn report_save_error(&mut self, error: &ClientError, action: &str) {
        if let Some(fields) = error.field_errors() {
            self.form.apply_server_errors(fields);
        }
        let message = match error {
            ClientError::Api { status: 409, .. } => {
                "This tender was changed by someone else. Reload and try again.".to_string()
            }
            _ => format!("Failed to {} tender. Please try again.", action),
        };
        self.notice = Some(Notice::Error(message));
    }

    pub fn request_delete(&mut self, id: Uuid) {
        self.confirmation.request(id);
    }

    pub fn cancel_delete(&mut self) {
        self.confirmation.cancel();
    }

    /// Send the armed delete; does nothing without a prior [`TenderAdmin::request_delete`]
    pub async fn confirm_delete(&mut self) -> bool {
        let Some(id) = self.confirmation.confirm() else {
            return false;
        };
        let version = self.list.find(id).map(|t| t.version);

        match self.client.delete(id, version).await {
            Ok(_) => {
                tracing::info!(tender_id = %id, "Tender deleted");
                self.notice = Some(Notice::Success("Tender deleted successfully!".to_string()));
                if let FormMode::Edit { id: editing, .. } = self.form.mode() {
                    if editing == id {
                        self.form.reset();
                    }
                }
                self.load().await;
                true
            }
            Err(e) => {
                tracing::warn!(tender_id = %id, error = %e, "Failed to delete tender");
                self.notice = Some(Notice::Error(
                    "Failed to delete tender. Please try again.".to_string(),
                ));
                false
            }
        }
    }
}
