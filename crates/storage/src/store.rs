use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use crate::dto::ingest::{MatchDetails, SaveOutcome};
use crate::dto::rating::RatingUpdate;
use crate::error::Result;
use crate::models::{Coach, Match, Player, SeasonOrder, SeasonRecord, Team};
use crate::repository::{MatchRepository, PeopleRepository, SeasonRepository};

/// Read/write surface the rating engine needs.
///
/// Lookups return `None` when the team has no earlier match; the caller owns
/// the fallback value.
#[async_trait]
pub trait RatingStore: Send + Sync {
    async fn next_unrated_match(&self) -> Result<Option<Match>>;

    async fn previous_rating(&self, team_id: i64, before: DateTime<Utc>) -> Result<Option<i32>>;

    async fn previous_form(
        &self,
        team_id: i64,
        league_id: i32,
        season: &str,
        before: DateTime<Utc>,
    ) -> Result<Option<f64>>;

    /// Writes both ratings (and the form pair when present) atomically.
    async fn apply_rating_update(&self, update: &RatingUpdate) -> Result<()>;
}

/// Write surface used by ingestion.
#[async_trait]
pub trait MatchStore: Send + Sync {
    async fn upsert_team(&self, team: &Team) -> Result<()>;

    async fn upsert_coach(&self, coach: &Coach) -> Result<()>;

    async fn upsert_player(&self, player: &Player) -> Result<()>;

    async fn save_match_details(&self, details: &MatchDetails) -> Result<SaveOutcome>;

    async fn match_exists(&self, match_id: i64) -> Result<bool>;

    async fn next_unprocessed_season(&self, order: SeasonOrder) -> Result<Option<SeasonRecord>>;

    async fn mark_season_processed(&self, league_id: i32, season: &str) -> Result<()>;

    async fn processed_seasons(&self) -> Result<Vec<SeasonRecord>>;
}

/// Postgres-backed store; delegates to the per-table repositories.
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl RatingStore for PgStore {
    async fn next_unrated_match(&self) -> Result<Option<Match>> {
        MatchRepository::new(&self.pool).next_unrated().await
    }

    async fn previous_rating(&self, team_id: i64, before: DateTime<Utc>) -> Result<Option<i32>> {
        MatchRepository::new(&self.pool)
            .previous_rating(team_id, before)
            .await
    }

    async fn previous_form(
        &self,
        team_id: i64,
        league_id: i32,
        season: &str,
        before: DateTime<Utc>,
    ) -> Result<Option<f64>> {
        MatchRepository::new(&self.pool)
            .previous_form(team_id, league_id, season, before)
            .await
    }

    async fn apply_rating_update(&self, update: &RatingUpdate) -> Result<()> {
        MatchRepository::new(&self.pool)
            .apply_rating_update(update)
            .await
    }
}

#[async_trait]
impl MatchStore for PgStore {
    async fn upsert_team(&self, team: &Team) -> Result<()> {
        PeopleRepository::new(&self.pool).upsert_team(team).await
    }

    async fn upsert_coach(&self, coach: &Coach) -> Result<()> {
        PeopleRepository::new(&self.pool).upsert_coach(coach).await
    }

    async fn upsert_player(&self, player: &Player) -> Result<()> {
        PeopleRepository::new(&self.pool).upsert_player(player).await
    }

    async fn save_match_details(&self, details: &MatchDetails) -> Result<SaveOutcome> {
        MatchRepository::new(&self.pool).save_details(details).await
    }

    async fn match_exists(&self, match_id: i64) -> Result<bool> {
        MatchRepository::new(&self.pool).exists(match_id).await
    }

    async fn next_unprocessed_season(&self, order: SeasonOrder) -> Result<Option<SeasonRecord>> {
        SeasonRepository::new(&self.pool)
            .next_unprocessed(order)
            .await
    }

    async fn mark_season_processed(&self, league_id: i32, season: &str) -> Result<()> {
        SeasonRepository::new(&self.pool)
            .mark_processed(league_id, season)
            .await
    }

    async fn processed_seasons(&self) -> Result<Vec<SeasonRecord>> {
        SeasonRepository::new(&self.pool).list_processed().await
    }
}
