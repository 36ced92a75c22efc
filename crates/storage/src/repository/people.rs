use sqlx::PgPool;

use crate::error::Result;
use crate::models::{Coach, Player, Team};

/// Teams, coaches and players are append-only: the first name seen for an id wins.
pub struct PeopleRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> PeopleRepository<'a> {
    pub fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    pub async fn upsert_team(&self, team: &Team) -> Result<()> {
        sqlx::query("INSERT INTO teams (id, fullname) VALUES ($1, $2) ON CONFLICT (id) DO NOTHING")
            .bind(team.id)
            .bind(&team.fullname)
            .execute(self.pool)
            .await?;

        Ok(())
    }

    pub async fn upsert_coach(&self, coach: &Coach) -> Result<()> {
        sqlx::query("INSERT INTO coaches (id, fullname) VALUES ($1, $2) ON CONFLICT (id) DO NOTHING")
            .bind(coach.id)
            .bind(&coach.fullname)
            .execute(self.pool)
            .await?;

        Ok(())
    }

    pub async fn upsert_player(&self, player: &Player) -> Result<()> {
        sqlx::query("INSERT INTO players (id, fullname) VALUES ($1, $2) ON CONFLICT (id) DO NOTHING")
            .bind(player.id)
            .bind(&player.fullname)
            .execute(self.pool)
            .await?;

        Ok(())
    }
}
