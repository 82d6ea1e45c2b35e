//! Row mappers between SQLite result rows and scorebook domain types.
//!
//! Round numbers and counts are read straight into `u32`; rusqlite rejects
//! stored values that do not fit.

use rusqlite::Row;
use scorebook_core::{
  league::{League, LeagueId},
  point::{PointRow, RoundPoints},
  standings::{LeaderboardEntry, RoundAverage, round2},
};

/// `SELECT id, nombre, temporada FROM Leagues …`
pub fn league(row: &Row<'_>) -> rusqlite::Result<League> {
  Ok(League {
    id:     LeagueId(row.get(0)?),
    name:   row.get(1)?,
    season: row.get(2)?,
  })
}

/// `SELECT jugador, jornada, puntos …`
pub fn point_row(row: &Row<'_>) -> rusqlite::Result<PointRow> {
  Ok(PointRow {
    player: row.get(0)?,
    round:  row.get(1)?,
    points: row.get(2)?,
  })
}

/// `SELECT jornada, puntos …`
pub fn round_points(row: &Row<'_>) -> rusqlite::Result<RoundPoints> {
  Ok(RoundPoints {
    round:  row.get(0)?,
    points: row.get(1)?,
  })
}

/// `SELECT jugador, SUM(puntos), COUNT(DISTINCT jornada) … GROUP BY jugador`
pub fn leaderboard_entry(row: &Row<'_>) -> rusqlite::Result<LeaderboardEntry> {
  let total: i64 = row.get(1)?;
  let rounds_played: u32 = row.get(2)?;
  // GROUP BY never yields an empty group, so rounds_played >= 1.
  Ok(LeaderboardEntry {
    player: row.get(0)?,
    total,
    rounds_played,
    average: round2(total as f64 / f64::from(rounds_played)),
  })
}

/// `SELECT jornada, AVG(puntos) … GROUP BY jornada`
pub fn round_average(row: &Row<'_>) -> rusqlite::Result<RoundAverage> {
  let mean: f64 = row.get(1)?;
  Ok(RoundAverage {
    round:   row.get(0)?,
    average: round2(mean),
  })
}
