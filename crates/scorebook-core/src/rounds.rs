//! Round-entry workflow built on top of [`ScoreStore`]: the pre-filled sheet
//! for a round, the default next round, and whole-round submission.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{
  league::{LeagueId, require_name},
  point::{PointRow, Round, require_points, require_round},
  store::ScoreStore,
};

/// One roster line on a round sheet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SheetLine {
  pub player: String,
  /// Stored points for the round, or 0 if the player has no row yet.
  pub points: i64,
  pub stored: bool,
}

/// Every roster player with their current points for `round`, in roster
/// order. Players without a row for the round default to 0.
pub async fn round_sheet<S: ScoreStore>(
  store: &S,
  league: LeagueId,
  round: Round,
) -> Result<Vec<SheetLine>, S::Error> {
  let roster = store.list_roster(league).await?;
  let current = store.points_for_round(league, round).await?;

  Ok(
    roster
      .into_iter()
      .map(|player| {
        let stored = current.get(&player).copied();
        SheetLine {
          points: stored.unwrap_or(0),
          stored: stored.is_some(),
          player,
        }
      })
      .collect(),
  )
}

/// The round an entry form should default to: one past the latest recorded
/// round, or 1 for a league with no points.
pub async fn next_round<S: ScoreStore>(
  store: &S,
  league: LeagueId,
) -> Result<Round, S::Error> {
  Ok(store.max_round(league).await?.saturating_add(1))
}

/// The league's single best individual score, if any score exists.
pub async fn golden_round<S: ScoreStore>(
  store: &S,
  league: LeagueId,
) -> Result<Option<PointRow>, S::Error> {
  Ok(store.top_records(league, 1).await?.into_iter().next())
}

/// A round submission that stopped part-way. Rows written before the failure
/// stay written.
#[derive(Debug, Error)]
#[error("round submission stopped after {written} row(s): {source}")]
pub struct RoundSubmitError<E: std::error::Error + 'static> {
  pub written: usize,
  /// The player whose row failed, or `None` if the round itself was invalid.
  pub player:  Option<String>,
  #[source]
  pub source:  E,
}

/// Write every `(player, points)` pair for `round`, one upsert at a time and
/// in order. A blank name or negative points fails that row like a storage
/// error would. The first failure ends the submission. Returns the number of
/// rows written.
pub async fn submit_round<S, I>(
  store: &S,
  league: LeagueId,
  round: Round,
  scores: I,
) -> Result<usize, RoundSubmitError<S::Error>>
where
  S: ScoreStore,
  I: IntoIterator<Item = (String, i64)>,
{
  require_round(round).map_err(|e| RoundSubmitError {
    written: 0,
    player:  None,
    source:  e.into(),
  })?;

  let mut written = 0;
  for (player, points) in scores {
    let checked = require_name("player", &player).and_then(|_| require_points(points));
    let result = match checked {
      Ok(points) => store.upsert_point(league, player.clone(), round, points).await,
      Err(e) => Err(e.into()),
    };
    if let Err(source) = result {
      tracing::warn!(%league, round, written, %player, "round submission stopped");
      return Err(RoundSubmitError { written, player: Some(player), source });
    }
    written += 1;
  }

  tracing::info!(%league, round, written, "round submitted");
  Ok(written)
}
