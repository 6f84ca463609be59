//! Core data models for the CDN service.
//!
//! These entities describe upload provenance records and the explicit
//! response shapes returned by the HTTP surface. They map to the metadata
//! table via `sqlx::FromRow` and serialize as JSON via `serde`.

pub mod upload_record;
