//! [`SqliteStore`], the SQLite implementation of [`ScoreStore`].

use std::{collections::BTreeMap, path::Path};

use rusqlite::{OptionalExtension as _, Transaction};
use scorebook_core::{
  Error as CoreError,
  league::{League, LeagueId, require_name},
  point::{Comparison, CriterionQuery, PointRow, Round, RoundPoints, SENTINEL_ROUND},
  standings::{LeaderboardEntry, PivotTable, RoundAverage, RoundRange},
  store::{ReplaceSummary, ScoreStore},
};

use crate::{encode, schema::SCHEMA, Error, Result};

// ─── SQL ─────────────────────────────────────────────────────────────────────

const UPSERT_POINT: &str = "
  INSERT INTO Points (liga_id, jugador, jornada, puntos)
  VALUES (?1, ?2, ?3, ?4)
  ON CONFLICT (liga_id, jugador, jornada) DO UPDATE SET puntos = excluded.puntos";

const INSERT_POINT: &str =
  "INSERT INTO Points (liga_id, jugador, jornada, puntos) VALUES (?1, ?2, ?3, ?4)";

const PLAYER_EXISTS: &str =
  "SELECT 1 FROM Points WHERE liga_id = ?1 AND jugador = ?2 LIMIT 1";

const LEADERBOARD_TOTAL: &str = "
  SELECT jugador, SUM(puntos) AS total, COUNT(DISTINCT jornada)
  FROM Points
  WHERE liga_id = ?1
  GROUP BY jugador
  ORDER BY total DESC, jugador ASC";

const LEADERBOARD_RANGE: &str = "
  SELECT jugador, SUM(puntos) AS total, COUNT(DISTINCT jornada)
  FROM Points
  WHERE liga_id = ?1 AND jornada BETWEEN ?2 AND ?3
  GROUP BY jugador
  ORDER BY total DESC, jugador ASC";

/// The operator is picked from a fixed set; every value is still bound.
fn criterion_sql(comparison: Comparison) -> &'static str {
  match comparison {
    Comparison::Greater => {
      "SELECT jornada, puntos FROM Points
       WHERE liga_id = ?1 AND jugador = ?2 AND puntos > ?3
       ORDER BY jornada ASC"
    }
    Comparison::Less => {
      "SELECT jornada, puntos FROM Points
       WHERE liga_id = ?1 AND jugador = ?2 AND puntos < ?3
       ORDER BY jornada ASC"
    }
    Comparison::Equal => {
      "SELECT jornada, puntos FROM Points
       WHERE liga_id = ?1 AND jugador = ?2 AND puntos = ?3
       ORDER BY jornada ASC"
    }
  }
}

fn player_exists(
  tx: &Transaction<'_>,
  league: i64,
  name: &str,
) -> rusqlite::Result<bool> {
  Ok(
    tx.query_row(PLAYER_EXISTS, rusqlite::params![league, name], |_| Ok(()))
      .optional()?
      .is_some(),
  )
}

/// What a check-then-write closure decided inside its transaction.
enum Outcome<T> {
  Done(T),
  Rejected(CoreError),
}

/// `Points.liga_id` references `Leagues.id`, so a write into an unknown league
/// fails on the foreign key. Report that as a rejection.
fn league_checked<T>(
  league: LeagueId,
  result: rusqlite::Result<T>,
) -> tokio_rusqlite::Result<Outcome<T>> {
  match result {
    Ok(v) => Ok(Outcome::Done(v)),
    Err(rusqlite::Error::SqliteFailure(e, _))
      if e.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_FOREIGNKEY =>
    {
      Ok(Outcome::Rejected(CoreError::LeagueNotFound(league)))
    }
    Err(e) => Err(e.into()),
  }
}

impl<T> Outcome<T> {
  fn into_result(self) -> Result<T> {
    match self {
      Outcome::Done(v) => Ok(v),
      Outcome::Rejected(e) => Err(Error::Core(e)),
    }
  }
}

// ─── Store ───────────────────────────────────────────────────────────────────

/// A scorebook backed by a single SQLite file.
///
/// Cloning is cheap; the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store for testing.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  /// Total number of point rows in `league`. Used by the importer to report
  /// what a replace is about to remove.
  pub async fn count_points(&self, league: LeagueId) -> Result<usize> {
    let id = league.0;
    let count: i64 = self
      .conn
      .call(move |conn| {
        Ok(conn.query_row(
          "SELECT COUNT(id) FROM Points WHERE liga_id = ?1",
          [id],
          |r| r.get(0),
        )?)
      })
      .await?;
    Ok(usize::try_from(count).unwrap_or_default())
  }

  async fn leaderboard(
    &self,
    sql: &'static str,
    league: LeagueId,
    range: Option<RoundRange>,
  ) -> Result<Vec<LeaderboardEntry>> {
    let id = league.0;
    let rows = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(sql)?;
        let rows = match range {
          Some(r) => stmt
            .query_map(rusqlite::params![id, r.start, r.end], encode::leaderboard_entry)?
            .collect::<rusqlite::Result<Vec<_>>>()?,
          None => stmt
            .query_map([id], encode::leaderboard_entry)?
            .collect::<rusqlite::Result<Vec<_>>>()?,
        };
        Ok(rows)
      })
      .await?;
    Ok(rows)
  }
}

// ─── ScoreStore impl ─────────────────────────────────────────────────────────

impl ScoreStore for SqliteStore {
  type Error = Error;

  // ── Leagues ───────────────────────────────────────────────────────────────

  async fn list_leagues(&self) -> Result<Vec<League>> {
    let leagues = self
      .conn
      .call(|conn| {
        let mut stmt =
          conn.prepare("SELECT id, nombre, temporada FROM Leagues ORDER BY nombre")?;
        let rows = stmt
          .query_map([], encode::league)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;
    Ok(leagues)
  }

  async fn create_league(&self, name: String, season: Option<String>) -> Result<League> {
    require_name("league", &name)?;

    let (name_c, season_c) = (name.clone(), season.clone());
    let outcome = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        let taken = tx
          .query_row("SELECT 1 FROM Leagues WHERE nombre = ?1", [&name_c], |_| Ok(()))
          .optional()?
          .is_some();
        if taken {
          return Ok(Outcome::Rejected(CoreError::LeagueExists(name_c)));
        }
        tx.execute(
          "INSERT INTO Leagues (nombre, temporada) VALUES (?1, ?2)",
          rusqlite::params![name_c, season_c],
        )?;
        let id = tx.last_insert_rowid();
        tx.commit()?;
        Ok(Outcome::Done(id))
      })
      .await?;

    let id = LeagueId(outcome.into_result()?);
    tracing::info!(%id, %name, "league created");
    Ok(League { id, name, season })
  }

  async fn find_or_create_league(
    &self,
    name: String,
    season: Option<String>,
  ) -> Result<League> {
    require_name("league", &name)?;

    let (league, created) = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        let existing = tx
          .query_row(
            "SELECT id, nombre, temporada FROM Leagues WHERE nombre = ?1",
            [&name],
            encode::league,
          )
          .optional()?;
        if let Some(league) = existing {
          return Ok((league, false));
        }
        tx.execute(
          "INSERT INTO Leagues (nombre, temporada) VALUES (?1, ?2)",
          rusqlite::params![name, season],
        )?;
        let id = LeagueId(tx.last_insert_rowid());
        tx.commit()?;
        Ok((League { id, name, season }, true))
      })
      .await?;

    if created {
      tracing::info!(id = %league.id, name = %league.name, "league created");
    }
    Ok(league)
  }

  async fn delete_league(&self, id: LeagueId) -> Result<usize> {
    let raw = id.0;
    let outcome = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        // Children first: Points.liga_id references Leagues.id.
        let removed = tx.execute("DELETE FROM Points WHERE liga_id = ?1", [raw])?;
        let leagues = tx.execute("DELETE FROM Leagues WHERE id = ?1", [raw])?;
        if leagues == 0 {
          return Ok(Outcome::Rejected(CoreError::LeagueNotFound(id)));
        }
        tx.commit()?;
        Ok(Outcome::Done(removed))
      })
      .await?;

    let removed = outcome.into_result()?;
    tracing::info!(%id, removed, "league deleted");
    Ok(removed)
  }

  // ── Players ───────────────────────────────────────────────────────────────

  async fn list_roster(&self, league: LeagueId) -> Result<Vec<String>> {
    let id = league.0;
    let names = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(
          "SELECT DISTINCT jugador FROM Points WHERE liga_id = ?1 ORDER BY jugador",
        )?;
        let rows = stmt
          .query_map([id], |r| r.get(0))?
          .collect::<rusqlite::Result<Vec<String>>>()?;
        Ok(rows)
      })
      .await?;
    Ok(names)
  }

  async fn create_player(&self, league: LeagueId, name: String) -> Result<()> {
    require_name("player", &name)?;

    let id = league.0;
    let name_c = name.clone();
    let outcome = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        if player_exists(&tx, id, &name_c)? {
          return Ok(Outcome::Rejected(CoreError::PlayerExists { league, name: name_c }));
        }
        let written = tx.execute(
          UPSERT_POINT,
          rusqlite::params![id, name_c, SENTINEL_ROUND, 0_i64],
        );
        if let Outcome::Rejected(e) = league_checked(league, written)? {
          return Ok(Outcome::Rejected(e));
        }
        tx.commit()?;
        Ok(Outcome::Done(()))
      })
      .await?;

    outcome.into_result()?;
    tracing::info!(%league, %name, "player created");
    Ok(())
  }

  async fn delete_player(&self, league: LeagueId, name: String) -> Result<usize> {
    let id = league.0;
    let name_c = name.clone();
    let removed = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "DELETE FROM Points WHERE liga_id = ?1 AND jugador = ?2",
          rusqlite::params![id, name_c],
        )?)
      })
      .await?;

    tracing::info!(%league, %name, removed, "player deleted");
    Ok(removed)
  }

  async fn rename_player(&self, league: LeagueId, old: String, new: String) -> Result<usize> {
    require_name("player", &old)?;
    require_name("player", &new)?;

    let id = league.0;
    let (old_c, new_c) = (old.clone(), new.clone());
    let outcome = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        if player_exists(&tx, id, &new_c)? {
          return Ok(Outcome::Rejected(CoreError::PlayerExists { league, name: new_c }));
        }
        let renamed = tx.execute(
          "UPDATE Points SET jugador = ?1 WHERE liga_id = ?2 AND jugador = ?3",
          rusqlite::params![new_c, id, old_c],
        )?;
        if renamed == 0 {
          return Ok(Outcome::Rejected(CoreError::PlayerNotFound { league, name: old_c }));
        }
        tx.commit()?;
        Ok(Outcome::Done(renamed))
      })
      .await?;

    let renamed = outcome.into_result()?;
    tracing::info!(%league, %old, %new, renamed, "player renamed");
    Ok(renamed)
  }

  // ── Points ────────────────────────────────────────────────────────────────

  async fn upsert_point(
    &self,
    league: LeagueId,
    player: String,
    round: Round,
    points: i64,
  ) -> Result<()> {
    let id = league.0;
    self
      .conn
      .call(move |conn| {
        league_checked(
          league,
          conn.execute(UPSERT_POINT, rusqlite::params![id, player, round, points]),
        )
      })
      .await?
      .into_result()?;
    tracing::debug!(%league, round, points, "point stored");
    Ok(())
  }

  async fn replace_league_points(
    &self,
    league: LeagueId,
    rows: Vec<PointRow>,
  ) -> Result<ReplaceSummary> {
    let id = league.0;
    let summary = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        let removed = tx.execute("DELETE FROM Points WHERE liga_id = ?1", [id])?;
        let mut inserted = 0;
        {
          let mut stmt = tx.prepare(INSERT_POINT)?;
          for row in &rows {
            let result =
              stmt.execute(rusqlite::params![id, row.player, row.round, row.points]);
            match league_checked(league, result)? {
              Outcome::Done(n) => inserted += n,
              Outcome::Rejected(e) => return Ok(Outcome::Rejected(e)),
            }
          }
        }
        tx.commit()?;
        Ok(Outcome::Done(ReplaceSummary { removed, inserted }))
      })
      .await?
      .into_result()?;

    tracing::info!(
      %league,
      removed = summary.removed,
      inserted = summary.inserted,
      "league points replaced"
    );
    Ok(summary)
  }

  // ── Reads ─────────────────────────────────────────────────────────────────

  async fn max_round(&self, league: LeagueId) -> Result<Round> {
    let id = league.0;
    let max = self
      .conn
      .call(move |conn| {
        Ok(conn.query_row(
          "SELECT COALESCE(MAX(jornada), 0) FROM Points WHERE liga_id = ?1",
          [id],
          |r| r.get::<_, Round>(0),
        )?)
      })
      .await?;
    Ok(max)
  }

  async fn points_for_round(
    &self,
    league: LeagueId,
    round: Round,
  ) -> Result<BTreeMap<String, i64>> {
    let id = league.0;
    let points = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(
          "SELECT jugador, puntos FROM Points WHERE liga_id = ?1 AND jornada = ?2",
        )?;
        let rows = stmt
          .query_map(rusqlite::params![id, round], |r| Ok((r.get(0)?, r.get(1)?)))?
          .collect::<rusqlite::Result<BTreeMap<String, i64>>>()?;
        Ok(rows)
      })
      .await?;
    Ok(points)
  }

  async fn criterion_search(&self, query: &CriterionQuery) -> Result<Vec<RoundPoints>> {
    let sql = criterion_sql(query.comparison);
    let id = query.league.0;
    let player = query.player.clone();
    let threshold = query.threshold;

    let rows = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(sql)?;
        let rows = stmt
          .query_map(rusqlite::params![id, player, threshold], encode::round_points)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;
    Ok(rows)
  }

  async fn top_records(&self, league: LeagueId, limit: usize) -> Result<Vec<PointRow>> {
    let id = league.0;
    let limit = i64::try_from(limit).unwrap_or(i64::MAX);
    let rows = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(
          "SELECT jugador, jornada, puntos FROM Points
           WHERE liga_id = ?1
           ORDER BY puntos DESC, id ASC
           LIMIT ?2",
        )?;
        let rows = stmt
          .query_map(rusqlite::params![id, limit], encode::point_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;
    Ok(rows)
  }

  async fn leaderboard_total(&self, league: LeagueId) -> Result<Vec<LeaderboardEntry>> {
    self.leaderboard(LEADERBOARD_TOTAL, league, None).await
  }

  async fn leaderboard_range(
    &self,
    league: LeagueId,
    range: RoundRange,
  ) -> Result<Vec<LeaderboardEntry>> {
    self.leaderboard(LEADERBOARD_RANGE, league, Some(range)).await
  }

  async fn round_averages(&self, league: LeagueId) -> Result<Vec<RoundAverage>> {
    let id = league.0;
    let rows = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(
          "SELECT jornada, AVG(puntos) FROM Points
           WHERE liga_id = ?1
           GROUP BY jornada
           ORDER BY jornada ASC",
        )?;
        let rows = stmt
          .query_map([id], encode::round_average)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;
    Ok(rows)
  }

  async fn pivot_table(&self, league: LeagueId) -> Result<PivotTable> {
    let id = league.0;
    let rows = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(
          "SELECT jugador, jornada, puntos FROM Points
           WHERE liga_id = ?1
           ORDER BY jornada ASC",
        )?;
        let rows = stmt
          .query_map([id], encode::point_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;
    Ok(PivotTable::from_rows(&rows))
  }
}
