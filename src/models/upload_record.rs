//! Represents the provenance record written alongside every stored blob.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Metadata record associated one-to-one with a stored blob.
///
/// Written exactly once at upload time, never mutated or deleted. The `id`
/// is the same opaque identifier the blob is stored under.
#[derive(Serialize, Deserialize, Clone, FromRow, Debug)]
pub struct UploadRecord {
    /// Opaque identifier shared with the stored blob.
    pub id: String,

    /// Authenticated username of the uploader.
    pub uploaded_by: String,

    /// When the upload happened (UTC).
    pub uploaded_at: DateTime<Utc>,

    /// Whether the content went through the compression pipeline.
    /// The pipeline is out of scope, so this is always false; the field
    /// persists for record-shape compatibility.
    pub compressed: bool,
}

impl UploadRecord {
    /// Build a fresh record for an upload happening now.
    pub fn new(id: impl Into<String>, uploaded_by: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            uploaded_by: uploaded_by.into(),
            uploaded_at: Utc::now(),
            compressed: false,
        }
    }
}

/// Body returned by `POST /upload` on success.
#[derive(Serialize, Deserialize, Debug)]
pub struct UploadResponse {
    pub detail: String,
    /// Identifier the blob can be retrieved under.
    pub file: String,
    pub uploaded_by: String,
}

/// Body returned by `GET /`.
#[derive(Serialize, Deserialize, Debug)]
pub struct StatusResponse {
    pub detail: String,
}
