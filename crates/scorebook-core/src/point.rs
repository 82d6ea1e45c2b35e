//! Point rows. Each is one player's score in one round of one league.
//!
//! There is no stored player entity. A player exists in a league exactly when
//! at least one point row carries their name, which is why creating a player
//! writes a zero-point row for round 1.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::{Error, Result, league::LeagueId};

/// A matchday number. Rounds start at 1.
pub type Round = u32;

/// Round written for a freshly created player so they appear on the roster.
pub const SENTINEL_ROUND: Round = 1;

/// Reject round 0.
pub fn require_round(round: Round) -> Result<Round> {
  if round == 0 {
    return Err(Error::InvalidRound(round));
  }
  Ok(round)
}

/// Reject negative point values. Storage accepts any integer; this check
/// belongs to the input layer.
pub fn require_points(points: i64) -> Result<i64> {
  if points < 0 {
    return Err(Error::InvalidPoints(points));
  }
  Ok(points)
}

/// One stored `(player, round) → points` fact, as returned by record and
/// export queries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PointRow {
  pub player: String,
  pub round:  Round,
  pub points: i64,
}

/// A `(round, points)` pair for a single, already-known player.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoundPoints {
  pub round:  Round,
  pub points: i64,
}

// ─── Criterion search ────────────────────────────────────────────────────────

/// Comparison applied to a player's points in [`CriterionQuery`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Comparison {
  #[serde(rename = ">")]
  Greater,
  #[serde(rename = "<")]
  Less,
  #[serde(rename = "=")]
  Equal,
}

impl Comparison {
  pub fn symbol(self) -> &'static str {
    match self {
      Self::Greater => ">",
      Self::Less => "<",
      Self::Equal => "=",
    }
  }
}

impl fmt::Display for Comparison {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.symbol())
  }
}

impl FromStr for Comparison {
  type Err = Error;

  fn from_str(s: &str) -> Result<Self> {
    match s.trim() {
      ">" | "gt" => Ok(Self::Greater),
      "<" | "lt" => Ok(Self::Less),
      "=" | "==" | "eq" => Ok(Self::Equal),
      other => Err(Error::UnknownComparison(other.to_owned())),
    }
  }
}

/// Parameters for [`ScoreStore::criterion_search`](crate::store::ScoreStore::criterion_search):
/// "in which rounds did `player` score `<comparison> threshold`?"
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CriterionQuery {
  pub league:     LeagueId,
  pub player:     String,
  pub comparison: Comparison,
  pub threshold:  i64,
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn comparison_parses_symbols_and_words() {
    assert_eq!(">".parse::<Comparison>().unwrap(), Comparison::Greater);
    assert_eq!("lt".parse::<Comparison>().unwrap(), Comparison::Less);
    assert_eq!(" = ".parse::<Comparison>().unwrap(), Comparison::Equal);
    assert!(matches!(
      ">=".parse::<Comparison>(),
      Err(Error::UnknownComparison(op)) if op == ">="
    ));
  }

  #[test]
  fn comparison_displays_as_symbol() {
    assert_eq!(Comparison::Greater.to_string(), ">");
    assert_eq!(serde_json::to_value(Comparison::Less).unwrap(), "<");
  }

  #[test]
  fn input_bounds() {
    assert!(require_round(0).is_err());
    assert_eq!(require_round(12).unwrap(), 12);
    assert!(require_points(-1).is_err());
    assert_eq!(require_points(0).unwrap(), 0);
  }
}
