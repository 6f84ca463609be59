//! Defines routes for the upload/retrieval surface.
//!
//! ## Structure
//! - **Read endpoints** (1000/min per client)
//!   - `GET /`            — JSON status payload
//!   - `GET /image/{id}`  — stream blob (or metadata with `?show_meta=true`)
//!   - `GET /file/{id}`   — alias of `/image/{id}`
//!
//! - **Form endpoint** (100/min per client)
//!   - `GET /form`        — static HTML upload form
//!
//! - **Upload endpoints** (30/min per client, authenticated)
//!   - `POST /upload`      — multipart + Basic auth, JSON response
//!   - `POST /form/upload` — multipart + form credentials, 303 redirect
//!
//! `image` and `file` are explicit aliases of one handler, not separate
//! codepaths. Rate limits are applied per route class via middleware.

use crate::{
    handlers::{
        health_handlers::{healthz, readyz},
        retrieve_handlers::{favicon, form, retrieve, root},
        upload_handlers::{form_upload, upload},
    },
    limit::{FixedWindowLimiter, Quota, rate_limit},
    state::AppState,
};
use axum::{
    Router,
    middleware::from_fn_with_state,
    routing::{get, post},
};
use std::sync::Arc;

/// Per-client request quotas by route class.
const READ_QUOTA: Quota = Quota::per_minute(1000);
const FORM_QUOTA: Quota = Quota::per_minute(100);
const UPLOAD_QUOTA: Quota = Quota::per_minute(30);

/// Build and return the router for the full HTTP surface.
///
/// The router carries shared state (`AppState`) to all handlers. Each route
/// class gets its own limiter instance so quotas do not interfere.
pub fn routes() -> Router<AppState> {
    let read_limiter = Arc::new(FixedWindowLimiter::new(READ_QUOTA));
    let form_limiter = Arc::new(FixedWindowLimiter::new(FORM_QUOTA));
    let upload_limiter = Arc::new(FixedWindowLimiter::new(UPLOAD_QUOTA));

    let reads = Router::new()
        .route("/", get(root))
        .route("/image/{id}", get(retrieve))
        .route("/file/{id}", get(retrieve))
        .route_layer(from_fn_with_state(read_limiter, rate_limit));

    let form_view = Router::new()
        .route("/form", get(form))
        .route_layer(from_fn_with_state(form_limiter, rate_limit));

    let uploads = Router::new()
        .route("/upload", post(upload))
        .route("/form/upload", post(form_upload))
        .route_layer(from_fn_with_state(upload_limiter, rate_limit));

    Router::new()
        .merge(reads)
        .merge(form_view)
        .merge(uploads)
        .route("/favicon.ico", get(favicon))
        // health endpoints (unlimited)
        .route("/healthz", get(healthz))
        .route("/readyz", get(readyz))
}
