//! Leagues: the isolated scoring contexts that own every point row.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Surrogate identifier assigned by the store when a league is created.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct LeagueId(pub i64);

impl fmt::Display for LeagueId {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { self.0.fmt(f) }
}

/// A registered league.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct League {
  pub id:     LeagueId,
  /// Unique across all leagues; compared case-sensitively.
  pub name:   String,
  /// Free-text season label, e.g. "2025/2026".
  pub season: Option<String>,
}

/// Reject empty or whitespace-only names. `what` names the kind of entity for
/// the error message ("league", "player").
pub fn require_name<'a>(what: &'static str, name: &'a str) -> Result<&'a str> {
  if name.trim().is_empty() {
    return Err(Error::EmptyName(what));
  }
  Ok(name)
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn blank_names_are_rejected() {
    assert!(matches!(require_name("league", ""), Err(Error::EmptyName("league"))));
    assert!(matches!(require_name("player", "   "), Err(Error::EmptyName("player"))));
    assert_eq!(require_name("player", "Batistuta9").unwrap(), "Batistuta9");
  }

  #[test]
  fn league_id_serialises_as_plain_integer() {
    let league = League { id: LeagueId(7), name: "Test".into(), season: None };
    let json = serde_json::to_value(&league).unwrap();
    assert_eq!(json["id"], 7);
  }
}
