//! image-cdn — authenticated upload / public retrieval service.
//!
//! Clients authenticate against a remote credential authority, upload a
//! binary blob, and get back a durable opaque identifier; anyone can later
//! retrieve the blob (or its provenance record) by that identifier. Blobs
//! live on disk, provenance in SQLite, credentials with the remote authority.

pub mod config;
pub mod errors;
pub mod handlers;
pub mod limit;
pub mod models;
pub mod routes;
pub mod services;
pub mod state;
