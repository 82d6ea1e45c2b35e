//! Derived standings: leaderboards, per-round averages and the pivoted
//! player × round table.
//!
//! None of these are stored. Empty inputs produce empty outputs, which callers
//! render as "no data yet" rather than as an error.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::{
  Error, Result,
  point::{PointRow, Round},
};

/// One player's line in a leaderboard.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LeaderboardEntry {
  pub player:        String,
  pub total:         i64,
  /// Number of distinct rounds with a stored row for this player.
  pub rounds_played: u32,
  /// `total / rounds_played`, rounded to two decimals.
  pub average:       f64,
}

/// An inclusive `[start, end]` round window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RoundRange {
  pub start: Round,
  pub end:   Round,
}

impl RoundRange {
  /// Build a range, rejecting `start > end`.
  pub fn new(start: Round, end: Round) -> Result<Self> {
    if start > end {
      return Err(Error::InvalidRoundRange { start, end });
    }
    Ok(Self { start, end })
  }
}

/// League-wide mean score for one round.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoundAverage {
  pub round:   Round,
  pub average: f64,
}

/// Round to two decimal places, half away from zero.
pub fn round2(value: f64) -> f64 { (value * 100.0).round() / 100.0 }

// ─── Pivot ───────────────────────────────────────────────────────────────────

/// A player's row in a [`PivotTable`]. `cells[i]` is the score for
/// `PivotTable::rounds[i]`; rounds the player has no row for hold 0.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PivotRow {
  pub player: String,
  pub cells:  Vec<i64>,
  pub total:  i64,
}

/// Wide view of a league: one row per player, one column per observed round,
/// plus a total column. Rows are ordered by total descending, then by name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PivotTable {
  pub rounds: Vec<Round>,
  pub rows:   Vec<PivotRow>,
}

impl PivotTable {
  /// Pivot long-format rows. If the same `(player, round)` appears twice the
  /// later value wins, matching upsert semantics.
  pub fn from_rows<'a>(rows: impl IntoIterator<Item = &'a PointRow>) -> Self {
    let mut rounds = BTreeSet::new();
    let mut by_player: BTreeMap<&str, BTreeMap<Round, i64>> = BTreeMap::new();

    for row in rows {
      rounds.insert(row.round);
      by_player
        .entry(row.player.as_str())
        .or_default()
        .insert(row.round, row.points);
    }

    let rounds: Vec<Round> = rounds.into_iter().collect();
    let mut table_rows: Vec<PivotRow> = by_player
      .into_iter()
      .map(|(player, scores)| {
        let cells: Vec<i64> = rounds
          .iter()
          .map(|r| scores.get(r).copied().unwrap_or(0))
          .collect();
        PivotRow {
          player: player.to_owned(),
          total: cells.iter().sum(),
          cells,
        }
      })
      .collect();

    // Stable sort keeps the alphabetical order from the BTreeMap among ties.
    table_rows.sort_by(|a, b| b.total.cmp(&a.total));

    Self { rounds, rows: table_rows }
  }

  pub fn is_empty(&self) -> bool { self.rows.is_empty() }

  /// The row for `player`, if present.
  pub fn row(&self, player: &str) -> Option<&PivotRow> {
    self.rows.iter().find(|r| r.player == player)
  }

  /// Column headers as shown to users: `J1, J2, …, TOTAL`.
  pub fn headers(&self) -> Vec<String> {
    self
      .rounds
      .iter()
      .map(|r| format!("J{r}"))
      .chain(std::iter::once("TOTAL".to_owned()))
      .collect()
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn row(player: &str, round: Round, points: i64) -> PointRow {
    PointRow { player: player.into(), round, points }
  }

  #[test]
  fn pivot_fills_missing_cells_with_zero() {
    let rows = vec![row("A", 1, 10), row("A", 3, 5), row("B", 2, 40)];
    let table = PivotTable::from_rows(&rows);

    assert_eq!(table.rounds, vec![1, 2, 3]);
    assert_eq!(table.rows[0].player, "B");
    assert_eq!(table.rows[0].cells, vec![0, 40, 0]);
    assert_eq!(table.rows[0].total, 40);
    assert_eq!(table.row("A").unwrap().cells, vec![10, 0, 5]);
    assert_eq!(table.row("A").unwrap().total, 15);
  }

  #[test]
  fn pivot_ties_fall_back_to_name_order() {
    let rows = vec![row("Zed", 1, 20), row("Amy", 1, 20), row("Max", 1, 30)];
    let table = PivotTable::from_rows(&rows);
    let order: Vec<_> = table.rows.iter().map(|r| r.player.as_str()).collect();
    assert_eq!(order, ["Max", "Amy", "Zed"]);
  }

  #[test]
  fn pivot_of_nothing_is_empty() {
    let table = PivotTable::from_rows(&[]);
    assert!(table.is_empty());
    assert!(table.rounds.is_empty());
    assert_eq!(table.headers(), ["TOTAL"]);
  }

  #[test]
  fn headers_prefix_rounds() {
    let rows = vec![row("A", 2, 1), row("A", 10, 1)];
    assert_eq!(PivotTable::from_rows(&rows).headers(), ["J2", "J10", "TOTAL"]);
  }

  #[test]
  fn range_rejects_inverted_bounds() {
    assert!(matches!(
      RoundRange::new(5, 2),
      Err(Error::InvalidRoundRange { start: 5, end: 2 })
    ));
    let range = RoundRange::new(2, 2).unwrap();
    assert_eq!((range.start, range.end), (2, 2));
  }

  #[test]
  fn round2_rounds_to_cents() {
    assert_eq!(round2(15.0), 15.0);
    assert_eq!(round2(2.0 / 3.0), 0.67);
    assert_eq!(round2(10.125), 10.13);
  }
}
