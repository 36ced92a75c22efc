//! In-process doubles for the provider and the season cache.

use std::collections::{BTreeMap, HashMap, HashSet, VecDeque};
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{TimeZone, Utc};

use crate::cache::SeasonKey;
use crate::canonical::models::{Fixture, PlayerStats, TeamLineup, TeamRef, TeamStatistics};
use crate::traits::{Budgeted, MatchDataSource, SeasonCache};
use crate::{ImporterError, Result};

const DEFAULT_REMAINING: u32 = 100;

pub fn fixture(id: i64, day: u32, home: i64, away: i64, score: Option<(i32, i32)>) -> Fixture {
    Fixture {
        id,
        date: Utc.with_ymd_and_hms(2023, 8, day, 15, 0, 0).unwrap(),
        round: Some("Regular Season - 1".to_string()),
        home: TeamRef {
            id: home,
            name: format!("Team {}", home),
        },
        away: TeamRef {
            id: away,
            name: format!("Team {}", away),
        },
        home_score: score.map(|(h, _)| h),
        away_score: score.map(|(_, a)| a),
    }
}

/// Scripted provider. Every call pops the next remaining-budget value and is
/// recorded as `"<endpoint>:<id>"`.
#[derive(Default)]
pub struct FakeSource {
    seasons: Mutex<HashMap<SeasonKey, Vec<Fixture>>>,
    budgets: Mutex<VecDeque<u32>>,
    calls: Mutex<Vec<String>>,
    failing: Mutex<HashSet<String>>,
}

impl FakeSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_season(self, key: SeasonKey, fixtures: Vec<Fixture>) -> Self {
        self.seasons.lock().unwrap().insert(key, fixtures);
        self
    }

    pub fn with_budgets(self, budgets: &[u32]) -> Self {
        self.budgets.lock().unwrap().extend(budgets.iter().copied());
        self
    }

    /// Fails the given call, e.g. `"statistics:1001"` or `"fixtures:39/2023"`.
    pub fn failing(self, call: &str) -> Self {
        self.failing.lock().unwrap().insert(call.to_string());
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    fn respond<T>(&self, call: String, data: T) -> Result<Budgeted<T>> {
        self.calls.lock().unwrap().push(call.clone());
        if self.failing.lock().unwrap().contains(&call) {
            return Err(ImporterError::ApiError {
                status: 500,
                body: format!("{} failed", call),
            });
        }
        let remaining = self
            .budgets
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(DEFAULT_REMAINING);
        Ok(Budgeted::new(data, remaining))
    }
}

#[async_trait]
impl MatchDataSource for FakeSource {
    async fn fetch_season_matches(&self, league_id: i32, season: &str) -> Result<Budgeted<Vec<Fixture>>> {
        let key = SeasonKey::new(league_id, season);
        let fixtures = self
            .seasons
            .lock()
            .unwrap()
            .get(&key)
            .cloned()
            .unwrap_or_default();
        self.respond(format!("fixtures:{}/{}", league_id, season), fixtures)
    }

    async fn fetch_statistics(&self, match_id: i64) -> Result<Budgeted<Vec<TeamStatistics>>> {
        self.respond(format!("statistics:{}", match_id), Vec::new())
    }

    async fn fetch_lineups(&self, match_id: i64) -> Result<Budgeted<Vec<TeamLineup>>> {
        self.respond(format!("lineups:{}", match_id), Vec::new())
    }

    async fn fetch_players(&self, match_id: i64) -> Result<Budgeted<Vec<PlayerStats>>> {
        self.respond(format!("players:{}", match_id), Vec::new())
    }
}

#[derive(Default)]
struct CacheState {
    fixtures: BTreeMap<SeasonKey, Vec<Fixture>>,
    processed: HashMap<SeasonKey, HashSet<i64>>,
}

/// Season cache without expiry.
#[derive(Default)]
pub struct MemorySeasonCache(Mutex<CacheState>);

impl MemorySeasonCache {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SeasonCache for MemorySeasonCache {
    async fn cached_seasons(&self) -> Result<Vec<SeasonKey>> {
        Ok(self.0.lock().unwrap().fixtures.keys().cloned().collect())
    }

    async fn store_season(&self, key: &SeasonKey, fixtures: &[Fixture]) -> Result<()> {
        self.0
            .lock()
            .unwrap()
            .fixtures
            .insert(key.clone(), fixtures.to_vec());
        Ok(())
    }

    async fn season_fixtures(&self, key: &SeasonKey) -> Result<Option<Vec<Fixture>>> {
        Ok(self.0.lock().unwrap().fixtures.get(key).cloned())
    }

    async fn is_processed(&self, key: &SeasonKey, match_id: i64) -> Result<bool> {
        Ok(self
            .0
            .lock()
            .unwrap()
            .processed
            .get(key)
            .is_some_and(|ids| ids.contains(&match_id)))
    }

    async fn mark_processed(&self, key: &SeasonKey, match_id: i64) -> Result<()> {
        self.0
            .lock()
            .unwrap()
            .processed
            .entry(key.clone())
            .or_default()
            .insert(match_id);
        Ok(())
    }

    async fn processed_count(&self, key: &SeasonKey) -> Result<usize> {
        Ok(self
            .0
            .lock()
            .unwrap()
            .processed
            .get(key)
            .map_or(0, HashSet::len))
    }

    async fn clear_season(&self, key: &SeasonKey) -> Result<()> {
        let mut state = self.0.lock().unwrap();
        state.fixtures.remove(key);
        state.processed.remove(key);
        Ok(())
    }
}
