use chrono::{DateTime, Utc};
use sqlx::{PgPool, Postgres, Transaction};

use crate::dto::ingest::{MatchDetails, SaveOutcome};
use crate::dto::rating::RatingUpdate;
use crate::error::{Result, StorageError};
use crate::models::{Lineup, Match, MatchStatistics, NewMatch};

const MATCH_COLUMNS: &str = r#"
    id, date, league_id, season, round, home_team_id, away_team_id,
    home_score, away_score, home_coach_id, away_coach_id,
    home_formation, away_formation,
    home_team_elo, away_team_elo, home_team_form, away_team_form
"#;

/// Repository for the `matches` table and the rows hanging off it
pub struct MatchRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> MatchRepository<'a> {
    pub fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    pub async fn exists(&self, match_id: i64) -> Result<bool> {
        let exists = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS (SELECT 1 FROM matches WHERE id = $1)",
        )
        .bind(match_id)
        .fetch_one(self.pool)
        .await?;

        Ok(exists)
    }

    /// Earliest match that still has a NULL rating column.
    pub async fn next_unrated(&self) -> Result<Option<Match>> {
        let query = format!(
            r#"
            SELECT {MATCH_COLUMNS}
            FROM matches
            WHERE home_team_elo IS NULL OR away_team_elo IS NULL
            ORDER BY date ASC, id ASC
            LIMIT 1
            "#
        );

        let next = sqlx::query_as::<_, Match>(&query)
            .fetch_optional(self.pool)
            .await?;

        Ok(next)
    }

    /// Rating the team carried out of its latest match strictly before `before`.
    pub async fn previous_rating(&self, team_id: i64, before: DateTime<Utc>) -> Result<Option<i32>> {
        let rating = sqlx::query_scalar::<_, Option<i32>>(
            r#"
            SELECT CASE
                WHEN home_team_id = $1 THEN home_team_elo
                ELSE away_team_elo
            END
            FROM matches
            WHERE (home_team_id = $1 OR away_team_id = $1)
              AND date < $2
            ORDER BY date DESC
            LIMIT 1
            "#,
        )
        .bind(team_id)
        .bind(before)
        .fetch_optional(self.pool)
        .await?;

        Ok(rating.flatten())
    }

    /// Form the team carried out of its latest match in the same league and
    /// season strictly before `before`.
    pub async fn previous_form(
        &self,
        team_id: i64,
        league_id: i32,
        season: &str,
        before: DateTime<Utc>,
    ) -> Result<Option<f64>> {
        let form = sqlx::query_scalar::<_, Option<f64>>(
            r#"
            SELECT CASE
                WHEN home_team_id = $1 THEN home_team_form
                ELSE away_team_form
            END
            FROM matches
            WHERE (home_team_id = $1 OR away_team_id = $1)
              AND league_id = $2
              AND season = $3
              AND date < $4
            ORDER BY date DESC
            LIMIT 1
            "#,
        )
        .bind(team_id)
        .bind(league_id)
        .bind(season)
        .bind(before)
        .fetch_optional(self.pool)
        .await?;

        Ok(form.flatten())
    }

    pub async fn apply_rating_update(&self, update: &RatingUpdate) -> Result<()> {
        let mut tx = self.pool.begin().await?;

        let result = sqlx::query(
            r#"
            UPDATE matches
            SET home_team_elo = $1, away_team_elo = $2
            WHERE id = $3
              AND (home_team_elo IS NULL OR away_team_elo IS NULL)
            "#,
        )
        .bind(update.home_elo)
        .bind(update.away_elo)
        .bind(update.match_id)
        .execute(&mut *tx)
        .await?;

        if result.rows_affected() == 0 {
            return Err(StorageError::ConstraintViolation(format!(
                "Match ID={} is missing or already rated",
                update.match_id
            )));
        }

        if let Some(form) = update.form {
            sqlx::query(
                r#"
                UPDATE matches
                SET home_team_form = $1, away_team_form = $2
                WHERE id = $3
                "#,
            )
            .bind(form.home)
            .bind(form.away)
            .bind(update.match_id)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(())
    }

    /// Stores a match with its statistics and lineups in one transaction.
    /// Rows that already exist are left untouched.
    pub async fn save_details(&self, details: &MatchDetails) -> Result<SaveOutcome> {
        let mut tx = self.pool.begin().await?;

        let outcome = self.insert_match(&details.match_record, &mut tx).await?;

        if let Some(statistics) = details.statistics.as_ref().filter(|s| !s.is_empty()) {
            self.insert_statistics(statistics, &mut tx).await?;
        }

        for lineup in &details.lineups {
            self.insert_lineup(lineup, &mut tx).await?;
        }

        tx.commit().await?;
        Ok(outcome)
    }

    async fn insert_match(
        &self,
        record: &NewMatch,
        tx: &mut Transaction<'_, Postgres>,
    ) -> Result<SaveOutcome> {
        let result = sqlx::query(
            r#"
            INSERT INTO matches (
                id, date, league_id, season, round, home_team_id, away_team_id,
                home_score, away_score, home_coach_id, away_coach_id,
                home_formation, away_formation
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
            ON CONFLICT (id) DO NOTHING
            "#,
        )
        .bind(record.id)
        .bind(record.date)
        .bind(record.league_id)
        .bind(&record.season)
        .bind(&record.round)
        .bind(record.home_team_id)
        .bind(record.away_team_id)
        .bind(record.home_score)
        .bind(record.away_score)
        .bind(record.home_coach_id)
        .bind(record.away_coach_id)
        .bind(&record.home_formation)
        .bind(&record.away_formation)
        .execute(&mut **tx)
        .await?;

        if result.rows_affected() == 0 {
            Ok(SaveOutcome::AlreadyPresent)
        } else {
            Ok(SaveOutcome::Inserted)
        }
    }

    async fn insert_statistics(
        &self,
        stats: &MatchStatistics,
        tx: &mut Transaction<'_, Postgres>,
    ) -> Result<()> {
        let (home, away) = (&stats.home, &stats.away);

        sqlx::query(
            r#"
            INSERT INTO match_statistics (
                match_id, home_ball_possession, away_ball_possession,
                home_shots_on_goal, away_shots_on_goal,
                home_shots_off_goal, away_shots_off_goal,
                home_total_shots, away_total_shots,
                home_blocked_shots, away_blocked_shots,
                home_shots_insidebox, away_shots_insidebox,
                home_shots_outsidebox, away_shots_outsidebox,
                home_fouls, away_fouls,
                home_corner_kicks, away_corner_kicks,
                home_offsides, away_offsides,
                home_yellow_cards, away_yellow_cards,
                home_red_cards, away_red_cards,
                home_goalkeeper_saves, away_goalkeeper_saves,
                home_total_passes, away_total_passes,
                home_passes_accurate, away_passes_accurate,
                home_passes_percentage, away_passes_percentage
            ) VALUES (
                $1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17,
                $18, $19, $20, $21, $22, $23, $24, $25, $26, $27, $28, $29, $30, $31, $32, $33
            )
            ON CONFLICT (match_id) DO NOTHING
            "#,
        )
        .bind(stats.match_id)
        .bind(home.ball_possession)
        .bind(away.ball_possession)
        .bind(home.shots_on_goal)
        .bind(away.shots_on_goal)
        .bind(home.shots_off_goal)
        .bind(away.shots_off_goal)
        .bind(home.total_shots)
        .bind(away.total_shots)
        .bind(home.blocked_shots)
        .bind(away.blocked_shots)
        .bind(home.shots_insidebox)
        .bind(away.shots_insidebox)
        .bind(home.shots_outsidebox)
        .bind(away.shots_outsidebox)
        .bind(home.fouls)
        .bind(away.fouls)
        .bind(home.corner_kicks)
        .bind(away.corner_kicks)
        .bind(home.offsides)
        .bind(away.offsides)
        .bind(home.yellow_cards)
        .bind(away.yellow_cards)
        .bind(home.red_cards)
        .bind(away.red_cards)
        .bind(home.goalkeeper_saves)
        .bind(away.goalkeeper_saves)
        .bind(home.total_passes)
        .bind(away.total_passes)
        .bind(home.passes_accurate)
        .bind(away.passes_accurate)
        .bind(home.passes_percentage)
        .bind(away.passes_percentage)
        .execute(&mut **tx)
        .await?;

        Ok(())
    }

    async fn insert_lineup(&self, lineup: &Lineup, tx: &mut Transaction<'_, Postgres>) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO lineups (
                match_id, team_id, player_id, position, is_substitute,
                yellow_cards, red_cards, goals, assists,
                fouls_committed, fouls_drawn, dribbles_attempts,
                dribbles_success, duels_won, passes_total,
                passes_accuracy, tackles_total, tackles_blocks, tackles_interceptions,
                shots_total, shots_on, goals_conceded, goals_saved,
                minutes, captain, rating
            ) VALUES (
                $1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13,
                $14, $15, $16, $17, $18, $19, $20, $21, $22, $23, $24, $25, $26
            )
            ON CONFLICT (match_id, team_id, player_id) DO NOTHING
            "#,
        )
        .bind(lineup.match_id)
        .bind(lineup.team_id)
        .bind(lineup.player_id)
        .bind(&lineup.position)
        .bind(lineup.is_substitute)
        .bind(lineup.yellow_cards)
        .bind(lineup.red_cards)
        .bind(lineup.goals)
        .bind(lineup.assists)
        .bind(lineup.fouls_committed)
        .bind(lineup.fouls_drawn)
        .bind(lineup.dribbles_attempts)
        .bind(lineup.dribbles_success)
        .bind(lineup.duels_won)
        .bind(lineup.passes_total)
        .bind(lineup.passes_accuracy)
        .bind(lineup.tackles_total)
        .bind(lineup.tackles_blocks)
        .bind(lineup.tackles_interceptions)
        .bind(lineup.shots_total)
        .bind(lineup.shots_on)
        .bind(lineup.goals_conceded)
        .bind(lineup.goals_saved)
        .bind(lineup.minutes)
        .bind(lineup.captain)
        .bind(lineup.rating)
        .execute(&mut **tx)
        .await?;

        Ok(())
    }
}
