use async_trait::async_trait;
use redis::AsyncCommands;
use redis::aio::ConnectionManager;

use super::{SEASON_TTL_SECS, SeasonKey};
use crate::Result;
use crate::canonical::models::Fixture;
use crate::traits::SeasonCache;

/// Season cache on Redis: the fixture list is a JSON string, the processed set a Redis set.
#[derive(Clone)]
pub struct RedisSeasonCache {
    conn: ConnectionManager,
}

impl RedisSeasonCache {
    pub async fn connect(redis_url: &str) -> Result<Self> {
        let client = redis::Client::open(redis_url)?;
        let conn = ConnectionManager::new(client).await?;
        tracing::info!("Connected to Redis");
        Ok(Self { conn })
    }
}

#[async_trait]
impl SeasonCache for RedisSeasonCache {
    async fn cached_seasons(&self) -> Result<Vec<SeasonKey>> {
        let mut conn = self.conn.clone();
        let keys: Vec<String> = conn.keys(SeasonKey::cache_pattern()).await?;

        let mut seasons: Vec<SeasonKey> = keys
            .iter()
            .filter_map(|key| {
                let parsed = SeasonKey::parse(key);
                if parsed.is_none() {
                    tracing::warn!("Ignoring unrecognised cache key {}", key);
                }
                parsed
            })
            .collect();
        seasons.sort();
        Ok(seasons)
    }

    async fn store_season(&self, key: &SeasonKey, fixtures: &[Fixture]) -> Result<()> {
        let payload = serde_json::to_string(fixtures)?;
        let mut conn = self.conn.clone();
        let _: () = conn.set_ex(key.cache_key(), payload, SEASON_TTL_SECS).await?;
        Ok(())
    }

    async fn season_fixtures(&self, key: &SeasonKey) -> Result<Option<Vec<Fixture>>> {
        let mut conn = self.conn.clone();
        let payload: Option<String> = conn.get(key.cache_key()).await?;
        match payload {
            Some(payload) => Ok(Some(serde_json::from_str(&payload)?)),
            None => Ok(None),
        }
    }

    async fn is_processed(&self, key: &SeasonKey, match_id: i64) -> Result<bool> {
        let mut conn = self.conn.clone();
        let member: bool = conn.sismember(key.processed_key(), match_id).await?;
        Ok(member)
    }

    async fn mark_processed(&self, key: &SeasonKey, match_id: i64) -> Result<()> {
        let processed_key = key.processed_key();
        let mut conn = self.conn.clone();
        let _: () = conn.sadd(&processed_key, match_id).await?;
        let _: () = conn.expire(&processed_key, SEASON_TTL_SECS as i64).await?;
        Ok(())
    }

    async fn processed_count(&self, key: &SeasonKey) -> Result<usize> {
        let mut conn = self.conn.clone();
        let count: usize = conn.scard(key.processed_key()).await?;
        Ok(count)
    }

    async fn clear_season(&self, key: &SeasonKey) -> Result<()> {
        let mut conn = self.conn.clone();
        let _: () = conn.del(vec![key.cache_key(), key.processed_key()]).await?;
        Ok(())
    }
}
