use async_trait::async_trait;

use crate::Result;
use crate::cache::SeasonKey;
use crate::canonical::models::{Fixture, PlayerStats, TeamLineup, TeamStatistics};
use crate::config::IngestSettings;

/// A provider response together with the call budget it reported.
#[derive(Debug, Clone, PartialEq)]
pub struct Budgeted<T> {
    pub data: T,
    pub remaining: u32,
}

impl<T> Budgeted<T> {
    pub fn new(data: T, remaining: u32) -> Self {
        Self { data, remaining }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Budgeted<U> {
        Budgeted {
            data: f(self.data),
            remaining: self.remaining,
        }
    }

    pub fn is_exhausted(&self, threshold: u32) -> bool {
        self.remaining < threshold
    }
}

#[async_trait]
pub trait MatchDataSource: Send + Sync {
    async fn fetch_season_matches(&self, league_id: i32, season: &str) -> Result<Budgeted<Vec<Fixture>>>;

    async fn fetch_statistics(&self, match_id: i64) -> Result<Budgeted<Vec<TeamStatistics>>>;

    async fn fetch_lineups(&self, match_id: i64) -> Result<Budgeted<Vec<TeamLineup>>>;

    async fn fetch_players(&self, match_id: i64) -> Result<Budgeted<Vec<PlayerStats>>>;
}

/// Restart-safe buffer of fixture lists plus the per-season set of processed match ids.
#[async_trait]
pub trait SeasonCache: Send + Sync {
    /// Seasons that still have a buffered fixture list, sorted.
    async fn cached_seasons(&self) -> Result<Vec<SeasonKey>>;

    async fn store_season(&self, key: &SeasonKey, fixtures: &[Fixture]) -> Result<()>;

    async fn season_fixtures(&self, key: &SeasonKey) -> Result<Option<Vec<Fixture>>>;

    async fn is_processed(&self, key: &SeasonKey, match_id: i64) -> Result<bool>;

    async fn mark_processed(&self, key: &SeasonKey, match_id: i64) -> Result<()>;

    async fn processed_count(&self, key: &SeasonKey) -> Result<usize>;

    /// Drops both the fixture list and the processed set.
    async fn clear_season(&self, key: &SeasonKey) -> Result<()>;
}

/// Collaborators for one ingestion run, built once at start-up.
pub struct IngestContext<S, C, D> {
    pub store: S,
    pub cache: C,
    pub source: D,
    pub settings: IngestSettings,
}
