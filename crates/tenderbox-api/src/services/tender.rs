//! Tender lifecycle: create, read, update, replace, delete.
//!
//! Writes that carry a document go through storage in two phases. The bytes are staged first,
//! the record is written with the final key, and only then is the staged file promoted. If the
//! record write fails the staged bytes are discarded; if promotion fails the record write is
//! compensated. Either way no record is left pointing at a key that was never filled.

use bytes::Bytes;
use std::sync::Arc;
use tenderbox_core::models::{FileRef, NewTender, Tender, TenderChanges};
use tenderbox_core::validation::{field, DraftMode, TenderDraft, TenderFields};
use tenderbox_core::{AppError, Clock, FieldErrors, NotFoundReason, UploadValidator};
use tenderbox_db::TenderStore;
use tenderbox_storage::{StagedFile, Storage};
use uuid::Uuid;

/// A document received with a create or update request
///
/// `size_bytes` is the full size as received. When it exceeds the upload ceiling `data` holds
/// nothing useful; validation rejects the document before the bytes are looked at.
#[derive(Debug, Clone)]
pub struct UploadedDocument {
    pub file_name: String,
    pub content_type: String,
    pub size_bytes: u64,
    pub data: Bytes,
}

#[derive(Clone)]
pub struct TenderService {
    store: Arc<dyn TenderStore>,
    storage: Arc<dyn Storage>,
    clock: Arc<dyn Clock>,
    validator: UploadValidator,
    remove_orphaned_files: bool,
}

impl TenderService {
    pub fn new(
        store: Arc<dyn TenderStore>,
        storage: Arc<dyn Storage>,
        clock: Arc<dyn Clock>,
        validator: UploadValidator,
        remove_orphaned_files: bool,
    ) -> Self {
        Self {
            store,
            storage,
            clock,
            validator,
            remove_orphaned_files,
        }
    }

    fn check_document(&self, document: &UploadedDocument, errors: &mut FieldErrors) {
        if let Err(violations) = self.validator.validate_all(
            &document.file_name,
            &document.content_type,
            document.size_bytes,
        ) {
            errors.extend(violations);
        }
    }

    /// Create a tender. A document is required.
    #[tracing::instrument(skip(self, draft, document), fields(operation = "create_tender"))]
    pub async fn create(
        &self,
        draft: TenderDraft,
        document: Option<UploadedDocument>,
    ) -> Result<Tender, AppError> {
        let now = self.clock.now();
        let mut errors = FieldErrors::new();
        let fields = draft.validate(DraftMode::Complete, now, &mut errors);

        match &document {
            Some(document) => self.check_document(document, &mut errors),
            None => errors.push(field::FILE, "Please upload a tender document."),
        }
        errors.into_result()?;

        let TenderFields {
            title: Some(title),
            deadline: Some(deadline),
            status,
        } = fields
        else {
            return Err(AppError::Internal(
                "Validated tender is missing title or deadline".to_string(),
            ));
        };
        let Some(document) = document else {
            return Err(AppError::Internal(
                "Validated tender is missing its document".to_string(),
            ));
        };

        let staged = self.stage(&document).await?;
        let new = NewTender {
            id: Uuid::new_v4(),
            title,
            deadline,
            status: status.unwrap_or_default(),
            file: Some(FileRef {
                file_name: document.file_name,
                file_path: staged.key.clone(),
            }),
            created_at: now,
        };

        let tender = match self.store.insert(new).await {
            Ok(tender) => tender,
            Err(e) => {
                self.discard(&staged).await;
                return Err(e);
            }
        };

        if let Err(e) = self.storage.promote(&staged).await {
            tracing::error!(
                error = %e,
                tender_id = %tender.id,
                storage_key = %staged.key,
                "Failed to promote staged document; removing tender"
            );
            if let Err(delete_err) = self.store.delete(tender.id, None).await {
                tracing::error!(
                    error = %delete_err,
                    tender_id = %tender.id,
                    "Failed to remove tender after promote failure"
                );
            }
            self.discard(&staged).await;
            return Err(AppError::Storage(format!(
                "Failed to store tender document: {}",
                e
            )));
        }

        tracing::info!(
            tender_id = %tender.id,
            storage_key = %staged.key,
            size_bytes = staged.size_bytes,
            "Tender created"
        );
        Ok(tender)
    }

    pub async fn list(&self) -> Result<Vec<Tender>, AppError> {
        self.store.list().await
    }

    pub async fn get(&self, id: Uuid) -> Result<Tender, AppError> {
        self.store
            .get(id)
            .await?
            .ok_or(AppError::NotFound(NotFoundReason::TenderMissing))
    }

    /// Partial update from a multipart form: absent fields stay as they are, a new document
    /// replaces the old one.
    #[tracing::instrument(skip(self, draft, document), fields(tender_id = %id, operation = "update_tender"))]
    pub async fn update(
        &self,
        id: Uuid,
        draft: TenderDraft,
        document: Option<UploadedDocument>,
        expected_version: Option<i64>,
    ) -> Result<Tender, AppError> {
        let now = self.clock.now();
        let mut errors = FieldErrors::new();
        let fields = draft.validate(DraftMode::Partial, now, &mut errors);
        if let Some(document) = &document {
            self.check_document(document, &mut errors);
        }
        errors.into_result()?;

        let existing = self.get(id).await?;
        check_version(&existing, expected_version)?;

        let staged = match &document {
            Some(document) => Some((self.stage(document).await?, document.file_name.clone())),
            None => None,
        };

        let mut changes = TenderChanges::new(now);
        changes.title = fields.title;
        changes.deadline = fields.deadline;
        changes.status = fields.status;
        changes.expected_version = expected_version;
        changes.file = staged.as_ref().map(|(staged, file_name)| {
            Some(FileRef {
                file_name: file_name.clone(),
                file_path: staged.key.clone(),
            })
        });

        let updated = match self.store.update(id, changes).await {
            Ok(Some(updated)) => updated,
            Ok(None) => {
                if let Some((staged, _)) = &staged {
                    self.discard(staged).await;
                }
                return Err(AppError::NotFound(NotFoundReason::TenderMissing));
            }
            Err(e) => {
                if let Some((staged, _)) = &staged {
                    self.discard(staged).await;
                }
                return Err(e);
            }
        };

        let Some((staged, _)) = staged else {
            tracing::info!(tender_id = %id, version = updated.version, "Tender updated");
            return Ok(updated);
        };

        if let Err(e) = self.storage.promote(&staged).await {
            tracing::error!(
                error = %e,
                tender_id = %id,
                storage_key = %staged.key,
                "Failed to promote replacement document; restoring previous reference"
            );
            let mut restore = TenderChanges::new(now);
            restore.file = Some(existing.file.clone());
            restore.expected_version = Some(updated.version);
            if let Err(restore_err) = self.store.update(id, restore).await {
                tracing::error!(
                    error = %restore_err,
                    tender_id = %id,
                    "Failed to restore previous document reference"
                );
            }
            self.discard(&staged).await;
            return Err(AppError::Storage(format!(
                "Failed to store tender document: {}",
                e
            )));
        }

        if let Some(previous) = existing.file_path().filter(|p| *p != staged.key) {
            self.remove_orphan(id, previous).await;
        }

        tracing::info!(
            tender_id = %id,
            version = updated.version,
            storage_key = %staged.key,
            "Tender updated with new document"
        );
        Ok(updated)
    }

    /// Full replacement of title and deadline. The document is untouched, and so is the status
    /// when the body leaves it out.
    #[tracing::instrument(skip(self, draft), fields(tender_id = %id, operation = "replace_tender"))]
    pub async fn replace(
        &self,
        id: Uuid,
        draft: TenderDraft,
        expected_version: Option<i64>,
    ) -> Result<Tender, AppError> {
        let now = self.clock.now();
        let mut errors = FieldErrors::new();
        let fields = draft.validate(DraftMode::Complete, now, &mut errors);
        errors.into_result()?;

        let mut changes = TenderChanges::new(now);
        changes.title = fields.title;
        changes.deadline = fields.deadline;
        changes.status = fields.status;
        changes.expected_version = expected_version;

        let updated = self
            .store
            .update(id, changes)
            .await?
            .ok_or(AppError::NotFound(NotFoundReason::TenderMissing))?;

        tracing::info!(tender_id = %id, version = updated.version, "Tender replaced");
        Ok(updated)
    }

    #[tracing::instrument(skip(self), fields(tender_id = %id, operation = "delete_tender"))]
    pub async fn delete(&self, id: Uuid, expected_version: Option<i64>) -> Result<Tender, AppError> {
        let removed = self
            .store
            .delete(id, expected_version)
            .await?
            .ok_or(AppError::NotFound(NotFoundReason::TenderMissing))?;

        if let Some(path) = removed.file_path() {
            self.remove_orphan(id, path).await;
        }

        tracing::info!(tender_id = %id, "Tender deleted");
        Ok(removed)
    }

    /// Storage keys still referenced by some tender
    pub async fn referenced_file_paths(&self) -> Result<Vec<String>, AppError> {
        self.store.referenced_file_paths().await
    }

    async fn stage(&self, document: &UploadedDocument) -> Result<StagedFile, AppError> {
        self.storage
            .stage(&document.file_name, document.data.clone())
            .await
            .map_err(|e| AppError::Storage(format!("Failed to stage tender document: {}", e)))
    }

    async fn discard(&self, staged: &StagedFile) {
        if let Err(e) = self.storage.discard(staged).await {
            tracing::warn!(
                error = %e,
                staging_key = %staged.staging_key,
                "Failed to discard staged document"
            );
        }
    }

    /// Best-effort removal of a file no record points at any more
    async fn remove_orphan(&self, tender_id: Uuid, storage_key: &str) {
        if !self.remove_orphaned_files {
            tracing::debug!(
                tender_id = %tender_id,
                storage_key = %storage_key,
                "Keeping unreferenced document"
            );
            return;
        }

        match self.storage.delete(storage_key).await {
            Ok(()) => tracing::info!(
                tender_id = %tender_id,
                storage_key = %storage_key,
                "Removed unreferenced document"
            ),
            Err(e) => tracing::warn!(
                error = %e,
                tender_id = %tender_id,
                storage_key = %storage_key,
                "Failed to remove unreferenced document"
            ),
        }
    }
}

fn check_version(tender: &Tender, expected: Option<i64>) -> Result<(), AppError> {
    match expected {
        Some(expected) if expected != tender.version => Err(AppError::Conflict {
            expected,
            actual: tender.version,
        }),
        _ => Ok(()),
    }
}
