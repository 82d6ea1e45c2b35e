//! Handlers for entering and reviewing points round by round.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/leagues/:id/rounds` | Latest recorded round and the default next one |
//! | `GET`  | `/leagues/:id/rounds/averages` | League mean per round |
//! | `GET`  | `/leagues/:id/rounds/:round` | Round sheet; players without a row show 0 |
//! | `PUT`  | `/leagues/:id/rounds/:round` | Body: `{"scores":[{"player":"...","points":0}]}` |
//! | `PUT`  | `/leagues/:id/points` | Body: `{"player":"...","round":1,"points":0}` |

use std::sync::Arc;

use axum::{
  Json,
  extract::{Path, State},
};
use scorebook_core::{
  league::{LeagueId, require_name},
  point::{PointRow, Round, require_points, require_round},
  rounds::{SheetLine, next_round, round_sheet, submit_round},
  standings::RoundAverage,
  store::ScoreStore,
};
use serde::{Deserialize, Serialize};

use crate::error::ApiError;

#[derive(Debug, Serialize)]
pub struct RoundSummary {
  /// 0 when the league has no points yet.
  pub max_round:  Round,
  pub next_round: Round,
}

/// `GET /leagues/:id/rounds`
pub async fn summary<S: ScoreStore>(
  State(store): State<Arc<S>>,
  Path(league): Path<LeagueId>,
) -> Result<Json<RoundSummary>, ApiError> {
  let max_round = store.max_round(league).await.map_err(ApiError::from_store)?;
  let next_round = next_round(store.as_ref(), league)
    .await
    .map_err(ApiError::from_store)?;
  Ok(Json(RoundSummary { max_round, next_round }))
}

/// `GET /leagues/:id/rounds/averages`
pub async fn averages<S: ScoreStore>(
  State(store): State<Arc<S>>,
  Path(league): Path<LeagueId>,
) -> Result<Json<Vec<RoundAverage>>, ApiError> {
  let averages = store.round_averages(league).await.map_err(ApiError::from_store)?;
  Ok(Json(averages))
}

/// `GET /leagues/:id/rounds/:round`
pub async fn sheet<S: ScoreStore>(
  State(store): State<Arc<S>>,
  Path((league, round)): Path<(LeagueId, Round)>,
) -> Result<Json<Vec<SheetLine>>, ApiError> {
  let round = require_round(round)?;
  let sheet = round_sheet(store.as_ref(), league, round)
    .await
    .map_err(ApiError::from_store)?;
  Ok(Json(sheet))
}

#[derive(Debug, Deserialize)]
pub struct ScoreBody {
  pub player: String,
  pub points: i64,
}

#[derive(Debug, Deserialize)]
pub struct SubmitBody {
  pub scores: Vec<ScoreBody>,
}

#[derive(Debug, Serialize)]
pub struct Submitted {
  pub round:   Round,
  pub written: usize,
}

/// `PUT /leagues/:id/rounds/:round`
///
/// Writes each score independently and in order, stopping at the first
/// failure. Rows written before the failure are kept.
pub async fn submit<S: ScoreStore>(
  State(store): State<Arc<S>>,
  Path((league, round)): Path<(LeagueId, Round)>,
  Json(body): Json<SubmitBody>,
) -> Result<Json<Submitted>, ApiError> {
  let scores: Vec<(String, i64)> =
    body.scores.into_iter().map(|s| (s.player, s.points)).collect();

  let written = submit_round(store.as_ref(), league, round, scores)
    .await
    .map_err(|e| ApiError::PartialRound {
      written: e.written,
      source:  Box::new(ApiError::from_store(e.source)),
    })?;
  Ok(Json(Submitted { round, written }))
}

/// `PUT /leagues/:id/points`: insert or overwrite a single cell.
pub async fn upsert<S: ScoreStore>(
  State(store): State<Arc<S>>,
  Path(league): Path<LeagueId>,
  Json(body): Json<PointRow>,
) -> Result<Json<PointRow>, ApiError> {
  require_name("player", &body.player)?;
  require_round(body.round)?;
  require_points(body.points)?;

  store
    .upsert_point(league, body.player.clone(), body.round, body.points)
    .await
    .map_err(ApiError::from_store)?;
  Ok(Json(body))
}
