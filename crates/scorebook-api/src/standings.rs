//! Read-only standings endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/leagues/:id/leaderboard` | Optional `?start=&end=` (both or neither) |
//! | `GET`  | `/leagues/:id/records` | Optional `?limit=` (default 5) |
//! | `GET`  | `/leagues/:id/records/best` | Single best score, or `null` |
//! | `GET`  | `/leagues/:id/search` | `?player=&op=&threshold=`; `op` is `>`, `<`, `=` (or `gt`, `lt`, `eq`) |
//! | `GET`  | `/leagues/:id/pivot` | Player × round table with totals |

use std::sync::Arc;

use axum::{
  Json,
  extract::{Path, Query, State},
};
use scorebook_core::{
  Error,
  league::LeagueId,
  point::{Comparison, CriterionQuery, PointRow, Round, RoundPoints},
  rounds::golden_round,
  standings::{LeaderboardEntry, PivotTable, RoundRange},
  store::{DEFAULT_RECORD_LIMIT, ScoreStore},
};
use serde::{Deserialize, Serialize};

use crate::error::ApiError;

// ─── Leaderboard ─────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize, Default)]
pub struct LeaderboardParams {
  pub start: Option<Round>,
  pub end:   Option<Round>,
}

/// `GET /leagues/:id/leaderboard[?start=..&end=..]`
pub async fn leaderboard<S: ScoreStore>(
  State(store): State<Arc<S>>,
  Path(league): Path<LeagueId>,
  Query(params): Query<LeaderboardParams>,
) -> Result<Json<Vec<LeaderboardEntry>>, ApiError> {
  let board = match (params.start, params.end) {
    (None, None) => store.leaderboard_total(league).await,
    (Some(start), Some(end)) => {
      let range = RoundRange::new(start, end)?;
      store.leaderboard_range(league, range).await
    }
    _ => {
      return Err(ApiError::BadRequest(
        "start and end must be given together".to_owned(),
      ));
    }
  }
  .map_err(ApiError::from_store)?;
  Ok(Json(board))
}

// ─── Records ─────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize, Default)]
pub struct RecordParams {
  pub limit: Option<usize>,
}

/// `GET /leagues/:id/records[?limit=..]`
pub async fn records<S: ScoreStore>(
  State(store): State<Arc<S>>,
  Path(league): Path<LeagueId>,
  Query(params): Query<RecordParams>,
) -> Result<Json<Vec<PointRow>>, ApiError> {
  let limit = params.limit.unwrap_or(DEFAULT_RECORD_LIMIT);
  if limit == 0 {
    return Err(Error::InvalidLimit.into());
  }
  let records = store.top_records(league, limit).await.map_err(ApiError::from_store)?;
  Ok(Json(records))
}

/// `GET /leagues/:id/records/best`
pub async fn best<S: ScoreStore>(
  State(store): State<Arc<S>>,
  Path(league): Path<LeagueId>,
) -> Result<Json<Option<PointRow>>, ApiError> {
  let best = golden_round(store.as_ref(), league)
    .await
    .map_err(ApiError::from_store)?;
  Ok(Json(best))
}

// ─── Criterion search ────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct SearchParams {
  pub player:    String,
  pub op:        String,
  pub threshold: i64,
}

#[derive(Debug, Serialize)]
pub struct SearchResult {
  pub player:     String,
  pub comparison: Comparison,
  pub threshold:  i64,
  /// Number of matching rounds; equal to `rounds.len()`.
  pub count:      usize,
  pub rounds:     Vec<RoundPoints>,
}

/// `GET /leagues/:id/search?player=..&op=..&threshold=..`
pub async fn search<S: ScoreStore>(
  State(store): State<Arc<S>>,
  Path(league): Path<LeagueId>,
  Query(params): Query<SearchParams>,
) -> Result<Json<SearchResult>, ApiError> {
  let query = CriterionQuery {
    league,
    player: params.player,
    comparison: params.op.parse()?,
    threshold: params.threshold,
  };

  let rounds = store
    .criterion_search(&query)
    .await
    .map_err(ApiError::from_store)?;
  Ok(Json(SearchResult {
    count: rounds.len(),
    player: query.player,
    comparison: query.comparison,
    threshold: query.threshold,
    rounds,
  }))
}

// ─── Pivot ───────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub struct PivotResponse {
  /// Display headers: `J1 … Jn, TOTAL`.
  pub headers: Vec<String>,
  #[serde(flatten)]
  pub table:   PivotTable,
}

/// `GET /leagues/:id/pivot`
pub async fn pivot<S: ScoreStore>(
  State(store): State<Arc<S>>,
  Path(league): Path<LeagueId>,
) -> Result<Json<PivotResponse>, ApiError> {
  let table = store.pivot_table(league).await.map_err(ApiError::from_store)?;
  Ok(Json(PivotResponse { headers: table.headers(), table }))
}
