//! Handlers for `/leagues` endpoints.
//!
//! | Method   | Path | Notes |
//! |----------|------|-------|
//! | `GET`    | `/leagues` | Ordered by name |
//! | `POST`   | `/leagues` | Body: `{"name":"...","season":"..."}`; 201 |
//! | `DELETE` | `/leagues/:id` | Removes the league and all its points |

use std::sync::Arc;

use axum::{
  Json,
  extract::{Path, State},
  http::StatusCode,
  response::IntoResponse,
};
use scorebook_core::{
  league::{League, LeagueId},
  store::ScoreStore,
};
use serde::{Deserialize, Serialize};

use crate::error::ApiError;

/// `GET /leagues`
pub async fn list<S: ScoreStore>(
  State(store): State<Arc<S>>,
) -> Result<Json<Vec<League>>, ApiError> {
  let leagues = store.list_leagues().await.map_err(ApiError::from_store)?;
  Ok(Json(leagues))
}

#[derive(Debug, Deserialize)]
pub struct CreateBody {
  pub name:   String,
  pub season: Option<String>,
}

/// `POST /leagues`
pub async fn create<S: ScoreStore>(
  State(store): State<Arc<S>>,
  Json(body): Json<CreateBody>,
) -> Result<impl IntoResponse, ApiError> {
  let league = store
    .create_league(body.name, body.season)
    .await
    .map_err(ApiError::from_store)?;
  Ok((StatusCode::CREATED, Json(league)))
}

#[derive(Debug, Serialize)]
pub struct Deleted {
  pub removed_points: usize,
}

/// `DELETE /leagues/:id`
pub async fn delete<S: ScoreStore>(
  State(store): State<Arc<S>>,
  Path(id): Path<LeagueId>,
) -> Result<Json<Deleted>, ApiError> {
  let removed_points = store.delete_league(id).await.map_err(ApiError::from_store)?;
  Ok(Json(Deleted { removed_points }))
}
