//! HTTP handlers for uploads.
//!
//! Both entry points authenticate against the credential authority before
//! any store or index write, then run the same orchestration: generate an
//! identifier, write the blob, write the provenance record, answer with the
//! identifier. The blob write always precedes the record write.

use crate::{
    errors::AppError,
    models::upload_record::{UploadRecord, UploadResponse},
    services::{auth::basic_credentials, ids},
    state::AppState,
};
use axum::{
    Json,
    extract::{Multipart, State},
    http::HeaderMap,
    response::Redirect,
};
use bytes::Bytes;
use futures::StreamExt;
use std::io;
use tracing::{error, info};

/// `POST /upload` — multipart `file` field, HTTP Basic credentials.
///
/// Credentials come from the header, so authentication completes before the
/// body is consumed and the file field streams directly into the store
/// without buffering.
pub async fn upload(
    State(state): State<AppState>,
    headers: HeaderMap,
    mut multipart: Multipart,
) -> Result<Json<UploadResponse>, AppError> {
    let (username, password) = basic_credentials(&headers).ok_or_else(AppError::unauthorized)?;
    let identity = state.auth.authenticate(&username, &password).await?;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|err| AppError::bad_request(format!("malformed multipart body: {}", err)))?
    {
        if field.name() != Some("file") {
            continue;
        }

        let id = ids::generate();
        let stream = field.map(|chunk| chunk.map_err(io::Error::other));
        let size = state.store.put_stream(&id, stream).await?;
        write_record(&state, &id, &identity).await?;
        info!(id = %id, uploaded_by = %identity, size, "upload stored");

        return Ok(Json(UploadResponse {
            detail: "upload successful".into(),
            file: id,
            uploaded_by: identity,
        }));
    }

    Err(AppError::bad_request("missing `file` field"))
}

/// `POST /form/upload` — multipart `username`/`password`/`file` fields.
///
/// Multipart fields may arrive in any order, so the payload is buffered
/// until the credential fields have been read; authentication still strictly
/// precedes any store or index write. Redirects (303) to the retrieval URL.
pub async fn form_upload(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Redirect, AppError> {
    let mut username: Option<String> = None;
    let mut password: Option<String> = None;
    let mut payload: Option<Bytes> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|err| AppError::bad_request(format!("malformed multipart body: {}", err)))?
    {
        let name = field.name().map(str::to_string);
        match name.as_deref() {
            Some("username") => {
                username = Some(field.text().await.map_err(|err| {
                    AppError::bad_request(format!("unreadable `username` field: {}", err))
                })?);
            }
            Some("password") => {
                password = Some(field.text().await.map_err(|err| {
                    AppError::bad_request(format!("unreadable `password` field: {}", err))
                })?);
            }
            Some("file") => {
                payload = Some(field.bytes().await.map_err(|err| {
                    AppError::bad_request(format!("unreadable `file` field: {}", err))
                })?);
            }
            _ => {}
        }
    }

    let (username, password) = username.zip(password).ok_or_else(AppError::unauthorized)?;
    let identity = state.auth.authenticate(&username, &password).await?;
    let payload = payload.ok_or_else(|| AppError::bad_request("missing `file` field"))?;

    let id = ids::generate();
    let size = state.store.put(&id, payload).await?;
    write_record(&state, &id, &identity).await?;
    info!(id = %id, uploaded_by = %identity, size, "form upload stored");

    Ok(Redirect::to(&format!("/file/{}", id)))
}

/// Write the provenance record after a successful blob write.
///
/// If this fails the blob already exists without a record. There is no
/// compensating rollback; the orphan is logged distinctly so operators can
/// reconcile it.
async fn write_record(state: &AppState, id: &str, identity: &str) -> Result<(), AppError> {
    let record = UploadRecord::new(id, identity);
    state.index.insert(&record).await.map_err(|err| {
        error!(
            blob = %id,
            uploaded_by = %identity,
            "orphaned blob: metadata write failed after store write: {}",
            err
        );
        AppError::from(err)
    })
}
