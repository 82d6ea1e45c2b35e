//! Error types for `scorebook-core`.

use thiserror::Error;

use crate::league::LeagueId;

/// A request rejected before (or instead of) touching storage.
#[derive(Debug, Error)]
pub enum Error {
  #[error("{0} name cannot be empty")]
  EmptyName(&'static str),

  #[error("league {0:?} already exists")]
  LeagueExists(String),

  #[error("league not found: {0}")]
  LeagueNotFound(LeagueId),

  #[error("player {name:?} already exists in league {league}")]
  PlayerExists { league: LeagueId, name: String },

  #[error("player {name:?} not found in league {league}")]
  PlayerNotFound { league: LeagueId, name: String },

  #[error("start round {start} is after end round {end}")]
  InvalidRoundRange { start: u32, end: u32 },

  #[error("round must be a positive integer, got {0}")]
  InvalidRound(u32),

  #[error("points must be non-negative, got {0}")]
  InvalidPoints(i64),

  #[error("record limit must be at least 1")]
  InvalidLimit,

  #[error("unknown comparison operator: {0:?}")]
  UnknownComparison(String),
}

impl Error {
  /// Whether the rejection is a uniqueness conflict.
  pub fn is_conflict(&self) -> bool {
    matches!(self, Self::LeagueExists(_) | Self::PlayerExists { .. })
  }

  /// Whether the rejection names something that does not exist.
  pub fn is_not_found(&self) -> bool {
    matches!(self, Self::LeagueNotFound(_) | Self::PlayerNotFound { .. })
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Implemented by backend error types so callers can tell validation
/// rejections apart from storage failures without knowing the backend.
pub trait StoreError: std::error::Error + Send + Sync + 'static {
  /// The rejection behind this error, or `None` for a storage failure.
  fn rejection(&self) -> Option<&Error>;
}

impl StoreError for Error {
  fn rejection(&self) -> Option<&Error> { Some(self) }
}
