//! SQL schema for the scorebook SQLite store.
//!
//! Executed once at connection startup. The version is recorded in
//! `PRAGMA user_version` so future migrations can be gated on it.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

CREATE TABLE IF NOT EXISTS Leagues (
    id        INTEGER PRIMARY KEY AUTOINCREMENT,
    nombre    TEXT NOT NULL UNIQUE,
    temporada TEXT
);

-- One row per (league, player, round). Players have no table of their own:
-- the roster is DISTINCT jugador over a league's rows.
-- Rows are removed by the application before their league; there is no
-- ON DELETE CASCADE.
CREATE TABLE IF NOT EXISTS Points (
    id      INTEGER PRIMARY KEY AUTOINCREMENT,
    liga_id INTEGER NOT NULL REFERENCES Leagues(id),
    jugador TEXT    NOT NULL,
    jornada INTEGER NOT NULL,
    puntos  INTEGER NOT NULL,
    UNIQUE (liga_id, jugador, jornada)
);

CREATE INDEX IF NOT EXISTS points_league_round_idx ON Points(liga_id, jornada);

PRAGMA user_version = 1;
";
