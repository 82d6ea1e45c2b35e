//! Time-boxed read cache and the [`CachedStore`] decorator.
//!
//! Reads are keyed by query and arguments and served from memory for up to
//! the configured TTL. Every successful write clears the whole cache before
//! returning, so a writer always reads its own writes. Each clear also bumps
//! a generation counter, and a read that was loading across a clear does not
//! store its result. Other processes may observe stale results until their
//! own entries expire. Clearing everything also evicts unrelated leagues'
//! entries; that is accepted.

use std::{
  any::Any,
  collections::{BTreeMap, HashMap},
  future::Future,
  sync::{
    Arc, Mutex, MutexGuard, PoisonError,
    atomic::{AtomicU64, Ordering},
  },
  time::{Duration, Instant},
};

use crate::{
  league::{League, LeagueId},
  point::{CriterionQuery, PointRow, Round, RoundPoints},
  standings::{LeaderboardEntry, PivotTable, RoundAverage, RoundRange},
  store::{ReplaceSummary, ScoreStore},
};

/// Identifies one cached read: the query plus its arguments.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum CacheKey {
  Leagues,
  Roster(LeagueId),
  MaxRound(LeagueId),
  RoundPoints(LeagueId, Round),
  Criterion(CriterionQuery),
  TopRecords(LeagueId, usize),
  Leaderboard(LeagueId),
  LeaderboardRange(LeagueId, RoundRange),
  RoundAverages(LeagueId),
  Pivot(LeagueId),
}

struct Entry {
  stored_at: Instant,
  value:     Arc<dyn Any + Send + Sync>,
}

/// A process-wide `key → (value, timestamp)` map with a fixed TTL.
pub struct QueryCache {
  ttl:        Duration,
  entries:    Mutex<HashMap<CacheKey, Entry>>,
  /// Bumped by every [`QueryCache::clear`], always under the entries lock.
  generation: AtomicU64,
}

impl QueryCache {
  pub const DEFAULT_TTL: Duration = Duration::from_secs(600);

  pub fn new(ttl: Duration) -> Self {
    Self {
      ttl,
      entries: Mutex::new(HashMap::new()),
      generation: AtomicU64::new(0),
    }
  }

  pub fn ttl(&self) -> Duration { self.ttl }

  fn lock(&self) -> MutexGuard<'_, HashMap<CacheKey, Entry>> {
    // A panic while holding the lock cannot leave the map half-written.
    self.entries.lock().unwrap_or_else(PoisonError::into_inner)
  }

  /// A fresh value for `key`, if one is cached with type `T`. Expired
  /// entries are dropped on the way.
  pub fn get<T: Clone + 'static>(&self, key: &CacheKey) -> Option<T> {
    let mut entries = self.lock();
    let fresh = entries.get(key).map(|e| e.stored_at.elapsed() < self.ttl)?;
    if !fresh {
      entries.remove(key);
      return None;
    }
    entries.get(key)?.value.downcast_ref::<T>().cloned()
  }

  pub fn insert<T: Send + Sync + 'static>(&self, key: CacheKey, value: T) {
    let mut entries = self.lock();
    self.store(&mut entries, key, value);
  }

  /// The current generation. Pass it to [`QueryCache::insert_at`] once the
  /// value has been loaded.
  pub fn generation(&self) -> u64 { self.generation.load(Ordering::Acquire) }

  /// Insert only if no [`QueryCache::clear`] happened since `generation` was
  /// read. Returns whether the value was stored.
  pub fn insert_at<T: Send + Sync + 'static>(
    &self,
    generation: u64,
    key: CacheKey,
    value: T,
  ) -> bool {
    let mut entries = self.lock();
    if self.generation() != generation {
      return false;
    }
    self.store(&mut entries, key, value);
    true
  }

  /// Drop every entry; returns how many were dropped.
  pub fn clear(&self) -> usize {
    let mut entries = self.lock();
    self.generation.fetch_add(1, Ordering::AcqRel);
    let dropped = entries.len();
    entries.clear();
    dropped
  }

  fn store<T: Send + Sync + 'static>(
    &self,
    entries: &mut HashMap<CacheKey, Entry>,
    key: CacheKey,
    value: T,
  ) {
    // Keys that are never read again would otherwise live until the next
    // write.
    entries.retain(|_, e| e.stored_at.elapsed() < self.ttl);
    entries.insert(key, Entry {
      stored_at: Instant::now(),
      value:     Arc::new(value),
    });
  }

  pub fn len(&self) -> usize { self.lock().len() }

  pub fn is_empty(&self) -> bool { self.len() == 0 }
}

impl Default for QueryCache {
  fn default() -> Self { Self::new(Self::DEFAULT_TTL) }
}

// ─── Decorator ───────────────────────────────────────────────────────────────

/// Wraps a [`ScoreStore`] with a [`QueryCache`].
///
/// Cloning is cheap and clones share one cache.
#[derive(Clone)]
pub struct CachedStore<S> {
  inner: S,
  cache: Arc<QueryCache>,
}

impl<S: ScoreStore> CachedStore<S> {
  pub fn new(inner: S, ttl: Duration) -> Self {
    Self { inner, cache: Arc::new(QueryCache::new(ttl)) }
  }

  pub fn inner(&self) -> &S { &self.inner }

  pub fn cache(&self) -> &QueryCache { &self.cache }

  async fn cached<T>(
    &self,
    key: CacheKey,
    load: impl Future<Output = Result<T, S::Error>>,
  ) -> Result<T, S::Error>
  where
    T: Clone + Send + Sync + 'static,
  {
    let generation = self.cache.generation();
    if let Some(hit) = self.cache.get::<T>(&key) {
      return Ok(hit);
    }
    let value = load.await?;
    if !self.cache.insert_at(generation, key, value.clone()) {
      tracing::debug!("read overlapped a write; result not cached");
    }
    Ok(value)
  }

  async fn invalidating<T>(
    &self,
    write: impl Future<Output = Result<T, S::Error>>,
  ) -> Result<T, S::Error> {
    let out = write.await?;
    let dropped = self.cache.clear();
    tracing::debug!(dropped, "read cache cleared after write");
    Ok(out)
  }
}

impl<S: ScoreStore> ScoreStore for CachedStore<S> {
  type Error = S::Error;

  async fn list_leagues(&self) -> Result<Vec<League>, S::Error> {
    self.cached(CacheKey::Leagues, self.inner.list_leagues()).await
  }

  async fn create_league(
    &self,
    name: String,
    season: Option<String>,
  ) -> Result<League, S::Error> {
    self.invalidating(self.inner.create_league(name, season)).await
  }

  async fn find_or_create_league(
    &self,
    name: String,
    season: Option<String>,
  ) -> Result<League, S::Error> {
    self.invalidating(self.inner.find_or_create_league(name, season)).await
  }

  async fn delete_league(&self, id: LeagueId) -> Result<usize, S::Error> {
    self.invalidating(self.inner.delete_league(id)).await
  }

  async fn list_roster(&self, league: LeagueId) -> Result<Vec<String>, S::Error> {
    self.cached(CacheKey::Roster(league), self.inner.list_roster(league)).await
  }

  async fn create_player(&self, league: LeagueId, name: String) -> Result<(), S::Error> {
    self.invalidating(self.inner.create_player(league, name)).await
  }

  async fn delete_player(&self, league: LeagueId, name: String) -> Result<usize, S::Error> {
    self.invalidating(self.inner.delete_player(league, name)).await
  }

  async fn rename_player(
    &self,
    league: LeagueId,
    old: String,
    new: String,
  ) -> Result<usize, S::Error> {
    self.invalidating(self.inner.rename_player(league, old, new)).await
  }

  async fn upsert_point(
    &self,
    league: LeagueId,
    player: String,
    round: Round,
    points: i64,
  ) -> Result<(), S::Error> {
    self
      .invalidating(self.inner.upsert_point(league, player, round, points))
      .await
  }

  async fn replace_league_points(
    &self,
    league: LeagueId,
    rows: Vec<PointRow>,
  ) -> Result<ReplaceSummary, S::Error> {
    self.invalidating(self.inner.replace_league_points(league, rows)).await
  }

  async fn max_round(&self, league: LeagueId) -> Result<Round, S::Error> {
    self.cached(CacheKey::MaxRound(league), self.inner.max_round(league)).await
  }

  async fn points_for_round(
    &self,
    league: LeagueId,
    round: Round,
  ) -> Result<BTreeMap<String, i64>, S::Error> {
    self
      .cached(
        CacheKey::RoundPoints(league, round),
        self.inner.points_for_round(league, round),
      )
      .await
  }

  async fn criterion_search(
    &self,
    query: &CriterionQuery,
  ) -> Result<Vec<RoundPoints>, S::Error> {
    self
      .cached(
        CacheKey::Criterion(query.clone()),
        self.inner.criterion_search(query),
      )
      .await
  }

  async fn top_records(
    &self,
    league: LeagueId,
    limit: usize,
  ) -> Result<Vec<PointRow>, S::Error> {
    self
      .cached(
        CacheKey::TopRecords(league, limit),
        self.inner.top_records(league, limit),
      )
      .await
  }

  async fn leaderboard_total(
    &self,
    league: LeagueId,
  ) -> Result<Vec<LeaderboardEntry>, S::Error> {
    self
      .cached(CacheKey::Leaderboard(league), self.inner.leaderboard_total(league))
      .await
  }

  async fn leaderboard_range(
    &self,
    league: LeagueId,
    range: RoundRange,
  ) -> Result<Vec<LeaderboardEntry>, S::Error> {
    self
      .cached(
        CacheKey::LeaderboardRange(league, range),
        self.inner.leaderboard_range(league, range),
      )
      .await
  }

  async fn round_averages(
    &self,
    league: LeagueId,
  ) -> Result<Vec<RoundAverage>, S::Error> {
    self
      .cached(CacheKey::RoundAverages(league), self.inner.round_averages(league))
      .await
  }

  async fn pivot_table(&self, league: LeagueId) -> Result<PivotTable, S::Error> {
    self.cached(CacheKey::Pivot(league), self.inner.pivot_table(league)).await
  }
}
