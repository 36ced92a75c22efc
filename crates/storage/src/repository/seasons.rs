use sqlx::{PgPool, Postgres, QueryBuilder};

use crate::error::{Result, StorageError};
use crate::models::{SeasonOrder, SeasonRecord};

pub struct SeasonRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> SeasonRepository<'a> {
    pub fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    pub async fn next_unprocessed(&self, order: SeasonOrder) -> Result<Option<SeasonRecord>> {
        let mut query = QueryBuilder::<Postgres>::new(
            r#"
            SELECT league_id, season, is_processed
            FROM league_seasons
            WHERE is_processed = FALSE
            ORDER BY season "#,
        );
        query.push(order.sql_direction());
        query.push(", league_id ASC LIMIT 1");

        let season = query
            .build_query_as::<SeasonRecord>()
            .fetch_optional(self.pool)
            .await?;

        Ok(season)
    }

    pub async fn mark_processed(&self, league_id: i32, season: &str) -> Result<()> {
        let result = sqlx::query(
            "UPDATE league_seasons SET is_processed = TRUE WHERE league_id = $1 AND season = $2",
        )
        .bind(league_id)
        .bind(season)
        .execute(self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(StorageError::NotFound);
        }

        Ok(())
    }

    pub async fn list_processed(&self) -> Result<Vec<SeasonRecord>> {
        let seasons = sqlx::query_as::<_, SeasonRecord>(
            r#"
            SELECT league_id, season, is_processed
            FROM league_seasons
            WHERE is_processed = TRUE
            ORDER BY season, league_id
            "#,
        )
        .fetch_all(self.pool)
        .await?;

        Ok(seasons)
    }
}
