//! HTTP handlers for retrieval and the static surface.
//!
//! Blob bodies stream out in 1024-byte chunks. The declared content type is
//! a fixed `image/png` regardless of what was uploaded — the service never
//! sniffs stored bytes. This is a documented constraint of the contract.

use crate::{
    errors::AppError,
    models::upload_record::StatusResponse,
    state::AppState,
};
use axum::{
    Json,
    body::Body,
    extract::{Path, Query, State},
    http::{HeaderValue, StatusCode, header},
    response::{Html, IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use tokio_util::io::ReaderStream;

/// Declared content type for every blob response. Never derived from the
/// stored bytes.
const BLOB_CONTENT_TYPE: &str = "image/png";

/// Chunk size for streamed blob bodies.
const CHUNK_SIZE: usize = 1024;

const FAVICON_URL: &str = "/static/favicon.ico";

const UPLOAD_FORM: &str = r#"
    <h1>Upload an image</h1>
    <p>Authenticate with your account credentials.</p>
    <form action="/form/upload" enctype="multipart/form-data" method="post">
        <input name="username" type="text" placeholder="username">
        <input name="password" type="password" placeholder="password">
        <input name="file" type="file">
        <input type="submit">
    </form>
"#;

/// Query params accepted by the retrieval routes.
#[derive(Debug, Deserialize)]
pub struct RetrieveQuery {
    #[serde(default)]
    pub show_meta: bool,
}

/// `GET /{image|file}/{id}` — stream the blob, or return its metadata
/// record when `show_meta=true`. 404 for identifiers never issued.
pub async fn retrieve(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(query): Query<RetrieveQuery>,
) -> Result<Response, AppError> {
    if query.show_meta {
        let record = state.index.fetch(&id).await?;
        return Ok(Json(record).into_response());
    }

    let file = state.store.reader(&id).await?;
    let stream = ReaderStream::with_capacity(file, CHUNK_SIZE);

    let mut response = Response::new(Body::from_stream(stream));
    *response.status_mut() = StatusCode::OK;
    response.headers_mut().insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static(BLOB_CONTENT_TYPE),
    );
    Ok(response)
}

/// `GET /` — JSON status payload.
pub async fn root() -> Json<StatusResponse> {
    Json(StatusResponse {
        detail: "image-cdn up".into(),
    })
}

/// `GET /form` — static HTML upload form.
pub async fn form() -> Html<&'static str> {
    Html(UPLOAD_FORM)
}

/// `GET /favicon.ico` — redirect (303) to the static asset.
pub async fn favicon() -> Redirect {
    Redirect::to(FAVICON_URL)
}
