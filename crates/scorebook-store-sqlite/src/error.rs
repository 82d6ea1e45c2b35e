//! Error type for `scorebook-store-sqlite`.

use scorebook_core::StoreError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  /// Rejected before reaching storage (empty name, duplicate, …).
  #[error(transparent)]
  Core(#[from] scorebook_core::Error),

  #[error("database error: {0}")]
  Database(#[from] tokio_rusqlite::Error),

  #[error("csv error: {0}")]
  Csv(#[from] csv::Error),
}

impl StoreError for Error {
  fn rejection(&self) -> Option<&scorebook_core::Error> {
    match self {
      Self::Core(e) => Some(e),
      _ => None,
    }
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
