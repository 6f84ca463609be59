//! Metadata index for upload provenance, backed by SQLite.
//!
//! One row per stored blob, keyed by the blob's identifier. Rows are written
//! exactly once at upload time and never mutated.

use crate::models::upload_record::UploadRecord;
use sqlx::SqlitePool;
use std::sync::Arc;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum IndexError {
    #[error("no upload record for `{0}`")]
    RecordNotFound(String),
    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
}

pub type IndexResult<T> = Result<T, IndexError>;

/// Record store for upload provenance.
#[derive(Clone, Debug)]
pub struct MetadataIndex {
    /// Shared SQLite connection pool.
    pub db: Arc<SqlitePool>,
}

impl MetadataIndex {
    pub fn new(db: Arc<SqlitePool>) -> Self {
        Self { db }
    }

    /// Insert a provenance record. Called exactly once per upload.
    pub async fn insert(&self, record: &UploadRecord) -> IndexResult<()> {
        sqlx::query(
            "INSERT INTO uploads (id, uploaded_by, uploaded_at, compressed)
             VALUES (?, ?, ?, ?)",
        )
        .bind(&record.id)
        .bind(&record.uploaded_by)
        .bind(record.uploaded_at)
        .bind(record.compressed)
        .execute(&*self.db)
        .await?;
        Ok(())
    }

    /// Fetch the provenance record for an identifier.
    ///
    /// Returns `RecordNotFound` if no row exists.
    pub async fn fetch(&self, id: &str) -> IndexResult<UploadRecord> {
        sqlx::query_as::<_, UploadRecord>(
            "SELECT id, uploaded_by, uploaded_at, compressed
             FROM uploads WHERE id = ?",
        )
        .bind(id)
        .fetch_one(&*self.db)
        .await
        .map_err(|err| match err {
            sqlx::Error::RowNotFound => IndexError::RecordNotFound(id.to_string()),
            other => IndexError::Sqlx(other),
        })
    }
}
