//! Wiring for the `scorebook` binary: configuration, the HTTP application,
//! and the bulk CSV import.

use std::{
  path::{Path, PathBuf},
  sync::Arc,
  time::Duration,
};

use anyhow::Context as _;
use axum::Router;
use scorebook_core::{
  cache::QueryCache,
  league::League,
  store::{ReplaceSummary, ScoreStore},
};
use scorebook_store_sqlite::{SqliteStore, WideTable};
use serde::Deserialize;
use tower_http::trace::TraceLayer;

// ─── Configuration ────────────────────────────────────────────────────────────

/// Runtime server configuration, deserialised from `scorebook.toml` and
/// `SCOREBOOK_*` environment variables. Every field has a default.
#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct ServerConfig {
  pub host:           String,
  pub port:           u16,
  pub store_path:     PathBuf,
  /// Lifetime of cached query results. 0 disables caching.
  pub cache_ttl_secs: u64,
}

impl Default for ServerConfig {
  fn default() -> Self {
    Self {
      host:           "127.0.0.1".to_owned(),
      port:           8080,
      store_path:     PathBuf::from("scorebook.db"),
      cache_ttl_secs: QueryCache::DEFAULT_TTL.as_secs(),
    }
  }
}

impl ServerConfig {
  /// Read `path` if it exists, then apply environment overrides.
  pub fn load(path: &Path) -> Result<Self, config::ConfigError> {
    Self::from_source(config::File::from(path).required(false))
  }

  fn from_source<T>(file: T) -> Result<Self, config::ConfigError>
  where
    T: config::Source + Send + Sync + 'static,
  {
    config::Config::builder()
      .add_source(file)
      .add_source(config::Environment::with_prefix("SCOREBOOK"))
      .build()?
      .try_deserialize()
  }

  pub fn address(&self) -> String { format!("{}:{}", self.host, self.port) }

  pub fn cache_ttl(&self) -> Duration { Duration::from_secs(self.cache_ttl_secs) }

  /// The store path with a leading `~` expanded.
  pub fn store_path(&self) -> PathBuf { expand_tilde(&self.store_path) }
}

/// Expand a leading `~` to the user's home directory.
pub fn expand_tilde(path: &Path) -> PathBuf {
  let s = path.to_string_lossy();
  if let Some(rest) = s.strip_prefix("~/")
    && let Ok(home) = std::env::var("HOME")
  {
    return PathBuf::from(home).join(rest);
  }
  path.to_path_buf()
}

// ─── HTTP application ────────────────────────────────────────────────────────

/// The API router with request tracing.
pub fn app<S>(store: Arc<S>) -> Router
where
  S: ScoreStore + 'static,
{
  scorebook_api::api_router(store).layer(TraceLayer::new_for_http())
}

// ─── Bulk import ─────────────────────────────────────────────────────────────

/// Replace every point of league `name` with the contents of the wide CSV
/// at `file`, creating the league if needed.
pub async fn import_csv(
  store: &SqliteStore,
  name: &str,
  season: Option<String>,
  file: &Path,
) -> anyhow::Result<(League, ReplaceSummary)> {
  let table = WideTable::from_path(file)
    .with_context(|| format!("failed to read {}", file.display()))?;
  tracing::info!(
    players = table.players.len(),
    rounds = table.rounds.len(),
    "parsed {}",
    file.display()
  );

  let league = store
    .find_or_create_league(name.to_owned(), season)
    .await
    .with_context(|| format!("failed to open league {name:?}"))?;

  let existing = store.count_points(league.id).await?;
  if existing > 0 {
    tracing::warn!(league = %league.id, existing, "replacing existing points");
  }

  let summary = store
    .replace_league_points(league.id, table.into_rows())
    .await
    .context("import failed; the league was left unchanged")?;
  Ok((league, summary))
}
