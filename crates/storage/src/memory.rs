use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use parking_lot::RwLock;

use crate::dto::ingest::{MatchDetails, SaveOutcome};
use crate::dto::rating::RatingUpdate;
use crate::error::{Result, StorageError};
use crate::models::{
    Coach, Lineup, Match, MatchStatistics, Player, SeasonOrder, SeasonRecord, Team,
};
use crate::store::{MatchStore, RatingStore};

#[derive(Debug, Default)]
struct State {
    teams: HashMap<i64, Team>,
    coaches: HashMap<i64, Coach>,
    players: HashMap<i64, Player>,
    matches: HashMap<i64, Match>,
    statistics: HashMap<i64, MatchStatistics>,
    lineups: HashMap<(i64, i64, i64), Lineup>,
    seasons: Vec<SeasonRecord>,
    failing_saves: HashSet<i64>,
    failing_upserts: HashSet<i64>,
}

impl State {
    fn reject_upsert(&self, id: i64) -> Result<()> {
        if self.failing_upserts.contains(&id) {
            return Err(StorageError::ConstraintViolation(format!(
                "Upsert rejected for ID={}",
                id
            )));
        }
        Ok(())
    }

    fn latest_before(&self, before: DateTime<Utc>, filter: impl Fn(&Match) -> bool) -> Option<&Match> {
        self.matches
            .values()
            .filter(|m| m.date < before && filter(m))
            .max_by_key(|m| (m.date, m.id))
    }
}

/// Store kept entirely in memory, mirroring the Postgres semantics closely
/// enough to drive the rating engine and ingestion in tests.
#[derive(Debug, Clone, Default)]
pub struct InMemoryStore(Arc<RwLock<State>>);

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_season(&self, league_id: i32, season: &str) {
        self.0.write().seasons.push(SeasonRecord {
            league_id,
            season: season.to_owned(),
            is_processed: false,
        });
    }

    /// Inserts a match row as-is, registering both teams.
    pub fn insert_match(&self, record: Match) {
        let mut state = self.0.write();
        for team_id in [record.home_team_id, record.away_team_id] {
            state.teams.entry(team_id).or_insert_with(|| Team {
                id: team_id,
                fullname: format!("Team {}", team_id),
            });
        }
        state.matches.insert(record.id, record);
    }

    /// Makes every subsequent save of this match fail.
    pub fn fail_saves_for(&self, match_id: i64) {
        self.0.write().failing_saves.insert(match_id);
    }

    /// Makes every subsequent team, coach or player upsert with this id fail.
    pub fn fail_upserts_for(&self, id: i64) {
        self.0.write().failing_upserts.insert(id);
    }

    pub fn get_match(&self, match_id: i64) -> Option<Match> {
        self.0.read().matches.get(&match_id).cloned()
    }

    /// All matches ordered by date.
    pub fn matches(&self) -> Vec<Match> {
        let mut matches: Vec<Match> = self.0.read().matches.values().cloned().collect();
        matches.sort_by_key(|m| (m.date, m.id));
        matches
    }

    pub fn statistics(&self, match_id: i64) -> Option<MatchStatistics> {
        self.0.read().statistics.get(&match_id).cloned()
    }

    pub fn lineups(&self, match_id: i64) -> Vec<Lineup> {
        let mut lineups: Vec<Lineup> = self
            .0
            .read()
            .lineups
            .values()
            .filter(|l| l.match_id == match_id)
            .cloned()
            .collect();
        lineups.sort_by_key(|l| (l.team_id, l.player_id));
        lineups
    }

    pub fn seasons(&self) -> Vec<SeasonRecord> {
        self.0.read().seasons.clone()
    }

    pub fn team(&self, team_id: i64) -> Option<Team> {
        self.0.read().teams.get(&team_id).cloned()
    }

    pub fn coach(&self, coach_id: i64) -> Option<Coach> {
        self.0.read().coaches.get(&coach_id).cloned()
    }

    pub fn player_count(&self) -> usize {
        self.0.read().players.len()
    }
}

#[async_trait]
impl RatingStore for InMemoryStore {
    async fn next_unrated_match(&self) -> Result<Option<Match>> {
        Ok(self
            .0
            .read()
            .matches
            .values()
            .filter(|m| !m.is_rated())
            .min_by_key(|m| (m.date, m.id))
            .cloned())
    }

    async fn previous_rating(&self, team_id: i64, before: DateTime<Utc>) -> Result<Option<i32>> {
        let state = self.0.read();
        let rating = state
            .latest_before(before, |m| m.involves(team_id))
            .and_then(|m| {
                if m.home_team_id == team_id {
                    m.home_team_elo
                } else {
                    m.away_team_elo
                }
            });
        Ok(rating)
    }

    async fn previous_form(
        &self,
        team_id: i64,
        league_id: i32,
        season: &str,
        before: DateTime<Utc>,
    ) -> Result<Option<f64>> {
        let state = self.0.read();
        let form = state
            .latest_before(before, |m| {
                m.involves(team_id) && m.league_id == league_id && m.season == season
            })
            .and_then(|m| {
                if m.home_team_id == team_id {
                    m.home_team_form
                } else {
                    m.away_team_form
                }
            });
        Ok(form)
    }

    async fn apply_rating_update(&self, update: &RatingUpdate) -> Result<()> {
        let mut state = self.0.write();
        let record = state
            .matches
            .get_mut(&update.match_id)
            .filter(|m| !m.is_rated())
            .ok_or_else(|| {
                StorageError::ConstraintViolation(format!(
                    "Match ID={} is missing or already rated",
                    update.match_id
                ))
            })?;

        record.home_team_elo = Some(update.home_elo);
        record.away_team_elo = Some(update.away_elo);
        if let Some(form) = update.form {
            record.home_team_form = Some(form.home);
            record.away_team_form = Some(form.away);
        }
        Ok(())
    }
}

#[async_trait]
impl MatchStore for InMemoryStore {
    async fn upsert_team(&self, team: &Team) -> Result<()> {
        let mut state = self.0.write();
        state.reject_upsert(team.id)?;
        state.teams.entry(team.id).or_insert_with(|| team.clone());
        Ok(())
    }

    async fn upsert_coach(&self, coach: &Coach) -> Result<()> {
        let mut state = self.0.write();
        state.reject_upsert(coach.id)?;
        state.coaches.entry(coach.id).or_insert_with(|| coach.clone());
        Ok(())
    }

    async fn upsert_player(&self, player: &Player) -> Result<()> {
        let mut state = self.0.write();
        state.reject_upsert(player.id)?;
        state.players.entry(player.id).or_insert_with(|| player.clone());
        Ok(())
    }

    async fn save_match_details(&self, details: &MatchDetails) -> Result<SaveOutcome> {
        let mut state = self.0.write();
        let record = &details.match_record;

        if state.failing_saves.contains(&record.id) {
            return Err(StorageError::ConstraintViolation(format!(
                "Save rejected for match ID={}",
                record.id
            )));
        }
        for team_id in [record.home_team_id, record.away_team_id] {
            if !state.teams.contains_key(&team_id) {
                return Err(StorageError::ConstraintViolation(format!(
                    "Unknown team ID={}",
                    team_id
                )));
            }
        }

        let outcome = if state.matches.contains_key(&record.id) {
            SaveOutcome::AlreadyPresent
        } else {
            state.matches.insert(record.id, record.clone().into_unrated());
            SaveOutcome::Inserted
        };

        if let Some(statistics) = details.statistics.as_ref().filter(|s| !s.is_empty()) {
            state
                .statistics
                .entry(statistics.match_id)
                .or_insert_with(|| statistics.clone());
        }
        for lineup in &details.lineups {
            state
                .lineups
                .entry((lineup.match_id, lineup.team_id, lineup.player_id))
                .or_insert_with(|| lineup.clone());
        }

        Ok(outcome)
    }

    async fn match_exists(&self, match_id: i64) -> Result<bool> {
        Ok(self.0.read().matches.contains_key(&match_id))
    }

    async fn next_unprocessed_season(&self, order: SeasonOrder) -> Result<Option<SeasonRecord>> {
        let state = self.0.read();
        let pending = state.seasons.iter().filter(|s| !s.is_processed);
        let next = match order {
            SeasonOrder::Earliest => {
                pending.min_by(|a, b| (&a.season, a.league_id).cmp(&(&b.season, b.league_id)))
            }
            SeasonOrder::Latest => pending.min_by(|a, b| {
                b.season.cmp(&a.season).then(a.league_id.cmp(&b.league_id))
            }),
        };
        Ok(next.cloned())
    }

    async fn mark_season_processed(&self, league_id: i32, season: &str) -> Result<()> {
        let mut state = self.0.write();
        let record = state
            .seasons
            .iter_mut()
            .find(|s| s.league_id == league_id && s.season == season)
            .ok_or(StorageError::NotFound)?;
        record.is_processed = true;
        Ok(())
    }

    async fn processed_seasons(&self) -> Result<Vec<SeasonRecord>> {
        Ok(self
            .0
            .read()
            .seasons
            .iter()
            .filter(|s| s.is_processed)
            .cloned()
            .collect())
    }
}
