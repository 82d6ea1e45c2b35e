//! Bulk import of a season spreadsheet.
//!
//! The input is a wide CSV: the first column holds player names and every
//! other header names a round (`"Jornada 3"` or just `"3"`). The table is
//! melted into long `(player, round, points)` rows and written with
//! [`ScoreStore::replace_league_points`](scorebook_core::store::ScoreStore::replace_league_points),
//! which replaces the league's existing rows wholesale.

use std::{io, path::Path};

use scorebook_core::point::{PointRow, Round};

use crate::Result;

/// Header prefix used by the spreadsheets this importer was written for.
const ROUND_PREFIX: &str = "Jornada";

/// One player's line from a wide table. `scores[i]` belongs to
/// `WideTable::rounds[i]`; `None` marks a cell that was not a number.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WidePlayer {
  pub name:   String,
  pub scores: Vec<Option<i64>>,
}

/// A parsed wide CSV, restricted to columns whose header is a round.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WideTable {
  pub rounds:  Vec<Round>,
  pub players: Vec<WidePlayer>,
}

/// `"Jornada 12"` → 12, `"7"` → 7. Round 0 and anything else → `None`.
fn parse_round_header(header: &str) -> Option<Round> {
  let trimmed = header.trim();
  let number = trimmed.strip_prefix(ROUND_PREFIX).unwrap_or(trimmed).trim();
  number.parse::<Round>().ok().filter(|r| *r > 0)
}

/// Empty cells count as 0. Whole-valued decimals (`"75.0"`) are accepted.
fn parse_cell(cell: &str) -> Option<i64> {
  let cell = cell.trim();
  if cell.is_empty() {
    return Some(0);
  }
  if let Ok(v) = cell.parse::<i64>() {
    return Some(v);
  }
  cell
    .parse::<f64>()
    .ok()
    .filter(|f| f.is_finite() && f.fract() == 0.0)
    .map(|f| f as i64)
}

impl WideTable {
  /// Parse a wide CSV from any reader. Rows with a blank name are skipped;
  /// short rows are padded with empty (zero) cells.
  pub fn from_csv<R: io::Read>(reader: R) -> Result<Self> {
    let mut csv = csv::ReaderBuilder::new()
      .has_headers(true)
      .flexible(true)
      .trim(csv::Trim::All)
      .from_reader(reader);

    // (column index, round) for every header that names a round.
    let columns: Vec<(usize, Round)> = csv
      .headers()?
      .iter()
      .enumerate()
      .skip(1)
      .filter_map(|(idx, h)| parse_round_header(h).map(|r| (idx, r)))
      .collect();

    let mut players = Vec::new();
    for record in csv.records() {
      let record = record?;
      let name = record.get(0).unwrap_or_default().trim();
      if name.is_empty() {
        continue;
      }
      let scores = columns
        .iter()
        .map(|(idx, _)| parse_cell(record.get(*idx).unwrap_or_default()))
        .collect();
      players.push(WidePlayer { name: name.to_owned(), scores });
    }

    Ok(Self {
      rounds: columns.into_iter().map(|(_, r)| r).collect(),
      players,
    })
  }

  pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
    let file = std::fs::File::open(path).map_err(csv::Error::from)?;
    Self::from_csv(file)
  }

  /// Melt into long rows, round by round. Unparseable cells are dropped.
  pub fn into_rows(self) -> Vec<PointRow> {
    let mut rows = Vec::with_capacity(self.rounds.len() * self.players.len());
    for (col, round) in self.rounds.iter().enumerate() {
      for player in &self.players {
        if let Some(Some(points)) = player.scores.get(col) {
          rows.push(PointRow {
            player: player.name.clone(),
            round:  *round,
            points: *points,
          });
        }
      }
    }
    rows
  }
}
