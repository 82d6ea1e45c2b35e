//! scorebook server binary.
//!
//! Reads `scorebook.toml` (or the path given with `--config`) plus
//! `SCOREBOOK_*` environment overrides, opens the SQLite store, and either
//! serves the JSON API or runs a bulk import.
//!
//! ```text
//! scorebook serve
//! scorebook import --league "Oficina" --season 2025/2026 --file puntos.csv
//! ```

use std::{path::PathBuf, sync::Arc};

use anyhow::Context as _;
use clap::{Parser, Subcommand};
use scorebook_core::cache::CachedStore;
use scorebook_server::{ServerConfig, app, import_csv};
use scorebook_store_sqlite::SqliteStore;
use tokio::net::TcpListener;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about = "Fantasy league scorebook")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, default_value = "scorebook.toml")]
  config: PathBuf,

  #[command(subcommand)]
  command: Command,
}

#[derive(Subcommand)]
enum Command {
  /// Serve the JSON API over HTTP.
  Serve,
  /// Replace a league's points with a wide CSV (one column per round).
  Import {
    /// League name; created if it does not exist.
    #[arg(long)]
    league: String,
    /// Season label used when the league is created.
    #[arg(long)]
    season: Option<String>,
    #[arg(long)]
    file:   PathBuf,
  },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy(),
    )
    .init();

  let cli = Cli::parse();

  let server_cfg = ServerConfig::load(&cli.config).context("failed to read configuration")?;
  let store_path = server_cfg.store_path();
  let store = SqliteStore::open(&store_path)
    .await
    .with_context(|| format!("failed to open store at {store_path:?}"))?;

  match cli.command {
    Command::Serve => {
      let store = CachedStore::new(store, server_cfg.cache_ttl());
      let app = app(Arc::new(store));
      let address = server_cfg.address();

      tracing::info!("Listening on http://{address}");
      let listener = TcpListener::bind(&address)
        .await
        .with_context(|| format!("failed to bind {address}"))?;

      axum::serve(listener, app).await.context("server error")?;
    }
    Command::Import { league, season, file } => {
      let (league, summary) = import_csv(&store, &league, season, &file).await?;
      tracing::info!(
        league = %league.id,
        name = %league.name,
        removed = summary.removed,
        inserted = summary.inserted,
        "import complete"
      );
    }
  }

  Ok(())
}
