//! The `ScoreStore` trait.
//!
//! Implemented by storage backends (e.g. `scorebook-store-sqlite`) and by
//! [`CachedStore`](crate::cache::CachedStore), which decorates any backend
//! with a read cache. Higher layers (`scorebook-api`, the server binary)
//! depend on this abstraction, not on any concrete backend.

use std::{collections::BTreeMap, future::Future};

use crate::{
  Error,
  error::StoreError,
  league::{League, LeagueId},
  point::{CriterionQuery, PointRow, Round, RoundPoints},
  standings::{LeaderboardEntry, PivotTable, RoundAverage, RoundRange},
};

/// Number of rows [`ScoreStore::top_records`] returns when the caller does
/// not ask for a specific limit.
pub const DEFAULT_RECORD_LIMIT: usize = 5;

/// Counts reported by [`ScoreStore::replace_league_points`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ReplaceSummary {
  pub removed:  usize,
  pub inserted: usize,
}

/// Abstraction over a scorebook backend.
///
/// Every call is its own transaction. Writes to the same
/// `(league, player, round)` key overwrite each other; there is no other
/// conflict detection.
///
/// All methods return `Send` futures so the trait can be used from axum
/// handlers on a multi-threaded runtime.
pub trait ScoreStore: Send + Sync {
  type Error: StoreError + From<Error>;

  // ── Leagues ───────────────────────────────────────────────────────────

  /// All leagues, ordered by name.
  fn list_leagues(
    &self,
  ) -> impl Future<Output = Result<Vec<League>, Self::Error>> + Send + '_;

  /// Register a league. Fails with [`Error::EmptyName`] or
  /// [`Error::LeagueExists`] (exact, case-sensitive match).
  fn create_league(
    &self,
    name: String,
    season: Option<String>,
  ) -> impl Future<Output = Result<League, Self::Error>> + Send + '_;

  /// Return the league called `name`, creating it with `season` if missing.
  fn find_or_create_league(
    &self,
    name: String,
    season: Option<String>,
  ) -> impl Future<Output = Result<League, Self::Error>> + Send + '_;

  /// Delete every point row of the league, then the league itself. Returns
  /// the number of point rows removed. Irreversible.
  fn delete_league(
    &self,
    id: LeagueId,
  ) -> impl Future<Output = Result<usize, Self::Error>> + Send + '_;

  // ── Players ───────────────────────────────────────────────────────────

  /// Distinct player names with at least one row in the league, sorted.
  fn list_roster(
    &self,
    league: LeagueId,
  ) -> impl Future<Output = Result<Vec<String>, Self::Error>> + Send + '_;

  /// Make `name` visible on the roster by writing a zero-point row for
  /// round 1. Fails if the name is empty or already on the roster.
  fn create_player(
    &self,
    league: LeagueId,
    name: String,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  /// Delete all of the player's rows; returns how many were removed.
  fn delete_player(
    &self,
    league: LeagueId,
    name: String,
  ) -> impl Future<Output = Result<usize, Self::Error>> + Send + '_;

  /// Rewrite every row of `old` to carry `new`. Fails if either name is
  /// empty, if `new` is already on the roster, or if `old` has no rows.
  /// Returns the number of rows rewritten.
  fn rename_player(
    &self,
    league: LeagueId,
    old: String,
    new: String,
  ) -> impl Future<Output = Result<usize, Self::Error>> + Send + '_;

  // ── Points ────────────────────────────────────────────────────────────

  /// Insert the `(league, player, round)` cell, or overwrite its value.
  fn upsert_point(
    &self,
    league: LeagueId,
    player: String,
    round: Round,
    points: i64,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  /// Bulk import: remove every row of the league, then insert `rows` as-is.
  /// Replaces, never merges.
  fn replace_league_points(
    &self,
    league: LeagueId,
    rows: Vec<PointRow>,
  ) -> impl Future<Output = Result<ReplaceSummary, Self::Error>> + Send + '_;

  // ── Reads ─────────────────────────────────────────────────────────────

  /// Highest round with a stored row, or 0 for an empty league.
  fn max_round(
    &self,
    league: LeagueId,
  ) -> impl Future<Output = Result<Round, Self::Error>> + Send + '_;

  /// `player → points` for every row stored at `round`.
  fn points_for_round(
    &self,
    league: LeagueId,
    round: Round,
  ) -> impl Future<Output = Result<BTreeMap<String, i64>, Self::Error>> + Send + '_;

  /// Rounds where the player's points satisfy the query's comparison,
  /// ordered by round. The match count is the length of the result.
  fn criterion_search<'a>(
    &'a self,
    query: &'a CriterionQuery,
  ) -> impl Future<Output = Result<Vec<RoundPoints>, Self::Error>> + Send + 'a;

  /// The `limit` highest individual scores, ties broken by insertion order.
  fn top_records(
    &self,
    league: LeagueId,
    limit: usize,
  ) -> impl Future<Output = Result<Vec<PointRow>, Self::Error>> + Send + '_;

  /// Totals over every round, ordered by total descending.
  fn leaderboard_total(
    &self,
    league: LeagueId,
  ) -> impl Future<Output = Result<Vec<LeaderboardEntry>, Self::Error>> + Send + '_;

  /// Totals over the rounds in `range` only.
  fn leaderboard_range(
    &self,
    league: LeagueId,
    range: RoundRange,
  ) -> impl Future<Output = Result<Vec<LeaderboardEntry>, Self::Error>> + Send + '_;

  /// League-wide mean per round, ascending by round.
  fn round_averages(
    &self,
    league: LeagueId,
  ) -> impl Future<Output = Result<Vec<RoundAverage>, Self::Error>> + Send + '_;

  /// Player × round table with a total column.
  fn pivot_table(
    &self,
    league: LeagueId,
  ) -> impl Future<Output = Result<PivotTable, Self::Error>> + Send + '_;
}
