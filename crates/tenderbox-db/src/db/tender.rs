use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{PgPool, Postgres};
use tenderbox_core::models::{FileRef, NewTender, Tender, TenderChanges, TenderStatus};
use tenderbox_core::AppError;
use uuid::Uuid;

/// Persistence operations the tender service needs
///
/// Implementations must apply `expected_version` atomically with the write: a stale version
/// yields `AppError::Conflict` and leaves the record untouched.
#[async_trait]
pub trait TenderStore: Send + Sync {
    async fn insert(&self, tender: NewTender) -> Result<Tender, AppError>;

    async fn get(&self, id: Uuid) -> Result<Option<Tender>, AppError>;

    /// Newest `upload_date` first, ties broken by `created_at`
    async fn list(&self) -> Result<Vec<Tender>, AppError>;

    /// Apply a partial update, bumping `version`. `Ok(None)` when the record does not exist.
    async fn update(&self, id: Uuid, changes: TenderChanges) -> Result<Option<Tender>, AppError>;

    /// Remove the record and return it. `Ok(None)` when the record does not exist.
    async fn delete(&self, id: Uuid, expected_version: Option<i64>)
        -> Result<Option<Tender>, AppError>;

    /// Distinct, non-empty storage keys referenced by any record
    async fn referenced_file_paths(&self) -> Result<Vec<String>, AppError>;

    async fn health_check(&self) -> Result<(), AppError>;
}

const TENDER_COLUMNS: &str = "id, title, deadline, file_name, file_path, status, upload_date, \
                              created_at, updated_at, version";

#[derive(sqlx::FromRow)]
struct TenderRow {
    id: Uuid,
    title: String,
    deadline: DateTime<Utc>,
    file_name: Option<String>,
    file_path: Option<String>,
    status: String,
    upload_date: DateTime<Utc>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    version: i64,
}

impl TryFrom<TenderRow> for Tender {
    type Error = AppError;

    fn try_from(row: TenderRow) -> Result<Self, Self::Error> {
        let status: TenderStatus = row.status.parse().map_err(|e: anyhow::Error| {
            AppError::Internal(format!("Tender {} has {}", row.id, e))
        })?;

        let file = match (row.file_name, row.file_path) {
            (None, None) => None,
            (file_name, file_path) => Some(FileRef {
                file_name: file_name.unwrap_or_default(),
                file_path: file_path.unwrap_or_default(),
            }),
        };

        Ok(Tender {
            id: row.id,
            title: row.title,
            deadline: row.deadline,
            file,
            status,
            upload_date: row.upload_date,
            created_at: row.created_at,
            updated_at: row.updated_at,
            version: row.version,
        })
    }
}

/// Repository for tender records in Postgres
#[derive(Clone)]
pub struct TenderRepository {
    pool: PgPool,
}

impl TenderRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    #[tracing::instrument(skip(self, tender), fields(db.table = "tenders", db.operation = "insert", db.record_id = %tender.id))]
    pub async fn insert_tender(&self, tender: NewTender) -> Result<Tender, AppError> {
        let (file_name, file_path) = match tender.file {
            Some(file) => (Some(file.file_name), Some(file.file_path)),
            None => (None, None),
        };

        let row = sqlx::query_as::<Postgres, TenderRow>(&format!(
            r#"
            INSERT INTO tenders (id, title, deadline, file_name, file_path, status,
                                 upload_date, created_at, updated_at, version)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $7, $7, 1)
            RETURNING {}
            "#,
            TENDER_COLUMNS
        ))
        .bind(tender.id)
        .bind(&tender.title)
        .bind(tender.deadline)
        .bind(file_name)
        .bind(file_path)
        .bind(tender.status.as_str())
        .bind(tender.created_at)
        .fetch_one(&self.pool)
        .await?;

        row.try_into()
    }

    #[tracing::instrument(skip(self), fields(db.table = "tenders", db.operation = "select", db.record_id = %id))]
    pub async fn get_tender(&self, id: Uuid) -> Result<Option<Tender>, AppError> {
        let row = sqlx::query_as::<Postgres, TenderRow>(&format!(
            "SELECT {} FROM tenders WHERE id = $1",
            TENDER_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(Tender::try_from).transpose()
    }

    #[tracing::instrument(skip(self), fields(db.table = "tenders", db.operation = "select"))]
    pub async fn list_tenders(&self) -> Result<Vec<Tender>, AppError> {
        let rows = sqlx::query_as::<Postgres, TenderRow>(&format!(
            "SELECT {} FROM tenders ORDER BY upload_date DESC, created_at DESC",
            TENDER_COLUMNS
        ))
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(Tender::try_from).collect()
    }

    #[tracing::instrument(skip(self, changes), fields(db.table = "tenders", db.operation = "update", db.record_id = %id, expected_version = ?changes.expected_version))]
    pub async fn update_tender(
        &self,
        id: Uuid,
        changes: TenderChanges,
    ) -> Result<Option<Tender>, AppError> {
        let replace_file = changes.file.is_some();
        let (file_name, file_path) = match changes.file.flatten() {
            Some(file) => (Some(file.file_name), Some(file.file_path)),
            None => (None, None),
        };

        let row = sqlx::query_as::<Postgres, TenderRow>(&format!(
            r#"
            UPDATE tenders
            SET title = COALESCE($2, title),
                deadline = COALESCE($3, deadline),
                status = COALESCE($4, status),
                file_name = CASE WHEN $5 THEN $6 ELSE file_name END,
                file_path = CASE WHEN $5 THEN $7 ELSE file_path END,
                updated_at = $8,
                version = version + 1
            WHERE id = $1 AND ($9::BIGINT IS NULL OR version = $9)
            RETURNING {}
            "#,
            TENDER_COLUMNS
        ))
        .bind(id)
        .bind(changes.title)
        .bind(changes.deadline)
        .bind(changes.status.map(|s| s.as_str()))
        .bind(replace_file)
        .bind(file_name)
        .bind(file_path)
        .bind(changes.updated_at)
        .bind(changes.expected_version)
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some(row) => Ok(Some(row.try_into()?)),
            None => self.missing_or_conflict(id, changes.expected_version).await,
        }
    }

    #[tracing::instrument(skip(self), fields(db.table = "tenders", db.operation = "delete", db.record_id = %id))]
    pub async fn delete_tender(
        &self,
        id: Uuid,
        expected_version: Option<i64>,
    ) -> Result<Option<Tender>, AppError> {
        let row = sqlx::query_as::<Postgres, TenderRow>(&format!(
            r#"
            DELETE FROM tenders
            WHERE id = $1 AND ($2::BIGINT IS NULL OR version = $2)
            RETURNING {}
            "#,
            TENDER_COLUMNS
        ))
        .bind(id)
        .bind(expected_version)
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some(row) => Ok(Some(row.try_into()?)),
            None => self.missing_or_conflict(id, expected_version).await,
        }
    }

    /// A guarded write matched nothing: either the record is gone or its version moved on
    async fn missing_or_conflict(
        &self,
        id: Uuid,
        expected_version: Option<i64>,
    ) -> Result<Option<Tender>, AppError> {
        let actual = sqlx::query_scalar::<Postgres, i64>("SELECT version FROM tenders WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        match (actual, expected_version) {
            (Some(actual), Some(expected)) if actual != expected => {
                tracing::debug!(tender_id = %id, expected, actual, "Stale tender version");
                Err(AppError::Conflict { expected, actual })
            }
            _ => Ok(None),
        }
    }

    #[tracing::instrument(skip(self), fields(db.table = "tenders", db.operation = "select"))]
    pub async fn referenced_file_paths(&self) -> Result<Vec<String>, AppError> {
        let paths = sqlx::query_scalar::<Postgres, String>(
            r#"
            SELECT DISTINCT file_path FROM tenders
            WHERE file_path IS NOT NULL AND file_path <> ''
            ORDER BY file_path
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(paths)
    }

    pub async fn health_check(&self) -> Result<(), AppError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}

#[async_trait]
impl TenderStore for TenderRepository {
    async fn insert(&self, tender: NewTender) -> Result<Tender, AppError> {
        self.insert_tender(tender).await
    }

    async fn get(&self, id: Uuid) -> Result<Option<Tender>, AppError> {
        self.get_tender(id).await
    }

    async fn list(&self) -> Result<Vec<Tender>, AppError> {
        self.list_tenders().await
    }

    async fn update(&self, id: Uuid, changes: TenderChanges) -> Result<Option<Tender>, AppError> {
        self.update_tender(id, changes).await
    }

    async fn delete(
        &self,
        id: Uuid,
        expected_version: Option<i64>,
    ) -> Result<Option<Tender>, AppError> {
        self.delete_tender(id, expected_version).await
    }

    async fn referenced_file_paths(&self) -> Result<Vec<String>, AppError> {
        TenderRepository::referenced_file_paths(self).await
    }

    async fn health_check(&self) -> Result<(), AppError> {
        TenderRepository::health_check(self).await
    }
}
