//! API error type and [`axum::response::IntoResponse`] implementation.

use axum::{
  Json,
  http::StatusCode,
  response::{IntoResponse, Response},
};
use scorebook_core::StoreError;
use serde_json::json;
use thiserror::Error;

/// An error returned by an API handler.
#[derive(Debug, Error)]
pub enum ApiError {
  #[error("not found: {0}")]
  NotFound(String),

  #[error("bad request: {0}")]
  BadRequest(String),

  #[error("conflict: {0}")]
  Conflict(String),

  /// A round submission that wrote `written` rows before failing.
  #[error("{source}")]
  PartialRound {
    written: usize,
    #[source]
    source:  Box<ApiError>,
  },

  #[error("store error: {0}")]
  Store(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl ApiError {
  /// Classify a backend error: rejections become 4xx, everything else is a
  /// storage failure.
  pub fn from_store<E: StoreError>(e: E) -> Self {
    match e.rejection() {
      Some(r) => Self::from(r),
      None => {
        tracing::error!(error = %e, "storage failure");
        Self::Store(Box::new(e))
      }
    }
  }

  fn status(&self) -> StatusCode {
    match self {
      ApiError::NotFound(_) => StatusCode::NOT_FOUND,
      ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
      ApiError::Conflict(_) => StatusCode::CONFLICT,
      ApiError::PartialRound { source, .. } => source.status(),
      ApiError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
  }
}

impl From<&scorebook_core::Error> for ApiError {
  fn from(e: &scorebook_core::Error) -> Self {
    if e.is_conflict() {
      Self::Conflict(e.to_string())
    } else if e.is_not_found() {
      Self::NotFound(e.to_string())
    } else {
      Self::BadRequest(e.to_string())
    }
  }
}

impl From<scorebook_core::Error> for ApiError {
  fn from(e: scorebook_core::Error) -> Self { Self::from(&e) }
}

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    let status = self.status();
    let body = match &self {
      ApiError::NotFound(m) | ApiError::BadRequest(m) | ApiError::Conflict(m) => {
        json!({ "error": m })
      }
      ApiError::PartialRound { written, source } => {
        json!({ "error": source.to_string(), "written": written })
      }
      ApiError::Store(e) => json!({ "error": e.to_string() }),
    };
    (status, Json(body)).into_response()
  }
}
