//! Handlers for `/documents/{key}`.
//!
//! Documents are write-once: uploading to an existing key is a conflict.

use axum::{
  body::Body,
  extract::{Path, State},
  http::{HeaderMap, StatusCode, header},
  response::{IntoResponse, Response},
};
use bytes::Bytes;
use plotbook_core::store::BookingStore;

use crate::{ApiState, error::ApiError};

const FALLBACK_CONTENT_TYPE: &str = "application/octet-stream";

/// `PUT /documents/{key}` — raw body; the request `Content-Type` is kept.
pub async fn upload<S>(
  State(state): State<ApiState<S>>,
  Path(key): Path<String>,
  headers: HeaderMap,
  body: Bytes,
) -> Result<impl IntoResponse, ApiError>
where
  S: BookingStore,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  if key.trim().is_empty() || key.contains('/') {
    return Err(ApiError::BadRequest(format!("invalid document key {key:?}")));
  }
  if body.is_empty() {
    return Err(ApiError::BadRequest("document body is empty".into()));
  }

  let content_type = headers
    .get(header::CONTENT_TYPE)
    .and_then(|v| v.to_str().ok())
    .map(str::to_owned);
  let size = body.len();

  let stored = state
    .store
    .put_document(key.clone(), content_type, body.to_vec())
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?;
  if !stored {
    return Err(ApiError::Conflict(format!("document {key} already exists")));
  }

  tracing::info!(%key, size, "document stored");
  Ok(StatusCode::CREATED)
}

/// `GET /documents/{key}`
pub async fn download<S>(
  State(state): State<ApiState<S>>,
  Path(key): Path<String>,
) -> Result<Response, ApiError>
where
  S: BookingStore,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let doc = state
    .store
    .get_document(key.clone())
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?
    .ok_or_else(|| ApiError::NotFound(format!("document {key} not found")))?;

  let content_type = doc
    .content_type
    .unwrap_or_else(|| FALLBACK_CONTENT_TYPE.to_owned());
  let modified = doc
    .uploaded_at
    .format("%a, %d %b %Y %H:%M:%S GMT")
    .to_string();

  Ok(
    (
      StatusCode::OK,
      [
        (header::CONTENT_TYPE, content_type),
        (header::LAST_MODIFIED, modified),
      ],
      Body::from(doc.bytes),
    )
      .into_response(),
  )
}
