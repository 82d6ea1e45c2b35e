//! JSON REST API for Scorebook.
//!
//! Exposes an axum [`Router`] backed by any
//! [`scorebook_core::store::ScoreStore`]. Transport concerns are the
//! caller's responsibility.
//!
//! # Mounting
//!
//! ```rust,ignore
//! .nest("/api", scorebook_api::api_router(store.clone()))
//! ```

pub mod error;
pub mod leagues;
pub mod players;
pub mod rounds;
pub mod standings;

#[cfg(test)]
mod tests;

use std::sync::Arc;

use axum::{
  Router,
  routing::{delete, get, post, put},
};
use scorebook_core::store::ScoreStore;

pub use error::ApiError;

/// Build a fully-materialised API router for `store`.
///
/// The returned `Router<()>` can be nested into any parent router regardless
/// of its own state type.
pub fn api_router<S>(store: Arc<S>) -> Router<()>
where
  S: ScoreStore + 'static,
{
  Router::new()
    // Leagues
    .route("/leagues", get(leagues::list::<S>).post(leagues::create::<S>))
    .route("/leagues/{id}", delete(leagues::delete::<S>))
    // Roster
    .route(
      "/leagues/{id}/players",
      get(players::list::<S>).post(players::create::<S>),
    )
    .route("/leagues/{id}/players/{name}", delete(players::delete::<S>))
    .route("/leagues/{id}/players/{name}/rename", post(players::rename::<S>))
    // Rounds and points
    .route("/leagues/{id}/rounds", get(rounds::summary::<S>))
    .route("/leagues/{id}/rounds/averages", get(rounds::averages::<S>))
    .route(
      "/leagues/{id}/rounds/{round}",
      get(rounds::sheet::<S>).put(rounds::submit::<S>),
    )
    .route("/leagues/{id}/points", put(rounds::upsert::<S>))
    // Standings
    .route("/leagues/{id}/leaderboard", get(standings::leaderboard::<S>))
    .route("/leagues/{id}/records", get(standings::records::<S>))
    .route("/leagues/{id}/records/best", get(standings::best::<S>))
    .route("/leagues/{id}/search", get(standings::search::<S>))
    .route("/leagues/{id}/pivot", get(standings::pivot::<S>))
    .with_state(store)
}
