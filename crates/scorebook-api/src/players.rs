//! Handlers for a league's roster.
//!
//! | Method   | Path | Notes |
//! |----------|------|-------|
//! | `GET`    | `/leagues/:id/players` | Alphabetical |
//! | `POST`   | `/leagues/:id/players` | Body: `{"name":"..."}`; writes a zero score for round 1 |
//! | `DELETE` | `/leagues/:id/players/:name` | Removes every row of the player |
//! | `POST`   | `/leagues/:id/players/:name/rename` | Body: `{"new_name":"..."}` |

use std::sync::Arc;

use axum::{
  Json,
  extract::{Path, State},
  http::StatusCode,
  response::IntoResponse,
};
use scorebook_core::{league::LeagueId, store::ScoreStore};
use serde::{Deserialize, Serialize};

use crate::error::ApiError;

/// `GET /leagues/:id/players`
pub async fn list<S: ScoreStore>(
  State(store): State<Arc<S>>,
  Path(league): Path<LeagueId>,
) -> Result<Json<Vec<String>>, ApiError> {
  let roster = store.list_roster(league).await.map_err(ApiError::from_store)?;
  Ok(Json(roster))
}

#[derive(Debug, Deserialize, Serialize)]
pub struct CreateBody {
  pub name: String,
}

/// `POST /leagues/:id/players`
pub async fn create<S: ScoreStore>(
  State(store): State<Arc<S>>,
  Path(league): Path<LeagueId>,
  Json(body): Json<CreateBody>,
) -> Result<impl IntoResponse, ApiError> {
  store
    .create_player(league, body.name.clone())
    .await
    .map_err(ApiError::from_store)?;
  Ok((StatusCode::CREATED, Json(body)))
}

#[derive(Debug, Serialize)]
pub struct Deleted {
  pub removed_points: usize,
}

/// `DELETE /leagues/:id/players/:name`
pub async fn delete<S: ScoreStore>(
  State(store): State<Arc<S>>,
  Path((league, name)): Path<(LeagueId, String)>,
) -> Result<Json<Deleted>, ApiError> {
  let removed_points = store
    .delete_player(league, name)
    .await
    .map_err(ApiError::from_store)?;
  Ok(Json(Deleted { removed_points }))
}

#[derive(Debug, Deserialize)]
pub struct RenameBody {
  pub new_name: String,
}

#[derive(Debug, Serialize)]
pub struct Renamed {
  pub name:         String,
  pub renamed_rows: usize,
}

/// `POST /leagues/:id/players/:name/rename`
pub async fn rename<S: ScoreStore>(
  State(store): State<Arc<S>>,
  Path((league, name)): Path<(LeagueId, String)>,
  Json(body): Json<RenameBody>,
) -> Result<Json<Renamed>, ApiError> {
  let renamed_rows = store
    .rename_player(league, name, body.new_name.clone())
    .await
    .map_err(ApiError::from_store)?;
  Ok(Json(Renamed { name: body.new_name, renamed_rows }))
}
