//! In-memory `TenderStore` for tests and local tooling
//!
//! Mirrors the Postgres repository's ordering, versioning and conflict behavior.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tenderbox_core::models::{NewTender, Tender, TenderChanges};
use tenderbox_core::AppError;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::tender::TenderStore;

#[derive(Clone, Default)]
pub struct InMemoryTenderStore {
    tenders: Arc<RwLock<HashMap<Uuid, Tender>>>,
    fail_writes: Arc<AtomicBool>,
}

impl InMemoryTenderStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent insert/update/delete fail with a database error
    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    pub async fn len(&self) -> usize {
        self.tenders.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.tenders.read().await.is_empty()
    }

    fn check_writable(&self) -> Result<(), AppError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(AppError::Database(sqlx::Error::PoolTimedOut));
        }
        Ok(())
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
}

#[async_trait]
impl TenderStore for InMemoryTenderStore {
    async fn insert(&self, new: NewTender) -> Result<Tender, AppError> {
        self.check_writable()?;

        let tender = Tender {
            id: new.id,
            title: new.title,
            deadline: new.deadline,
            file: new.file,
            status: new.status,
            upload_date: new.created_at,
            created_at: new.created_at,
            updated_at: new.created_at,
            version: 1,
        };

        let mut tenders = self.tenders.write().await;
        if tenders.contains_key(&tender.id) {
            return Err(AppError::Internal(format!(
                "Duplicate tender id {}",
                tender.id
            )));
        }
        tenders.insert(tender.id, tender.clone());
        Ok(tender)
    }

    async fn get(&self, id: Uuid) -> Result<Option<Tender>, AppError> {
        Ok(self.tenders.read().await.get(&id).cloned())
    }

    async fn list(&self) -> Result<Vec<Tender>, AppError> {
        let mut tenders: Vec<Tender> = self.tenders.read().await.values().cloned().collect();
        tenders.sort_by(|a, b| {
            b.upload_date
                .cmp(&a.upload_date)
                .then_with(|| b.created_at.cmp(&a.created_at))
        });
        Ok(tenders)
    }

    async fn update(&self, id: Uuid, changes: TenderChanges) -> Result<Option<Tender>, AppError> {
        self.check_writable()?;

        let mut tenders = self.tenders.write().await;
        let Some(tender) = tenders.get_mut(&id) else {
            return Ok(None);
        };
        Self::check_version(tender, changes.expected_version)?;

        if let Some(title) = changes.title {
            tender.title = title;
        }
        if let Some(deadline) = changes.deadline {
            tender.deadline = deadline;
        }
        if let Some(status) = changes.status {
            tender.status = status;
        }
        if let Some(file) = changes.file {
            tender.file = file;
        }
        tender.updated_at = changes.updated_at;
        tender.version += 1;

        Ok(Some(tender.clone()))
    }

    async fn delete(
        &self,
        id: Uuid,
        expected_version: Option<i64>,
    ) -> Result<Option<Tender>, AppError> {
        self.check_writable()?;

        let mut tenders = self.tenders.write().await;
        match tenders.get(&id) {
            Some(tender) => Self::check_version(tender, expected_version)?,
            None => return Ok(None),
        }
        Ok(tenders.remove(&id))
    }

    async fn referenced_file_paths(&self) -> Result<Vec<String>, AppError> {
        let mut paths: Vec<String> = self
            .tenders
            .read()
            .await
            .values()
            .filter_map(|t| t.file_path().map(str::to_string))
            .collect();
        paths.sort();
        paths.dedup();
        Ok(paths)
    }

    async fn health_check(&self) -> Result<(), AppError> {
        Ok(())
    }
}
