mod redis_cache;

pub use redis_cache::RedisSeasonCache;

use std::fmt;

use storage::models::SeasonRecord;

/// Buffered fixture lists and processed sets expire after a week.
pub const SEASON_TTL_SECS: u64 = 7 * 24 * 60 * 60;

const SEASON_PREFIX: &str = "season";
const PROCESSED_PREFIX: &str = "processed";

/// Identifies one competition-season in the cache.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SeasonKey {
    pub league_id: i32,
    pub season: String,
}

impl SeasonKey {
    pub fn new(league_id: i32, season: impl Into<String>) -> Self {
        Self {
            league_id,
            season: season.into(),
        }
    }

    pub fn cache_key(&self) -> String {
        format!("{}:{}:{}", SEASON_PREFIX, self.league_id, self.season)
    }

    pub fn processed_key(&self) -> String {
        format!("{}:{}:{}", PROCESSED_PREFIX, self.league_id, self.season)
    }

    pub fn cache_pattern() -> String {
        format!("{}:*", SEASON_PREFIX)
    }

    /// Parses a `season:<league>:<season>` key. Anything else is `None`.
    pub fn parse(key: &str) -> Option<Self> {
        let mut parts = key.splitn(3, ':');
        if parts.next()? != SEASON_PREFIX {
            return None;
        }
        let league_id = parts.next()?.parse().ok()?;
        let season = parts.next().filter(|s| !s.is_empty())?;
        Some(Self::new(league_id, season))
    }
}

impl From<&SeasonRecord> for SeasonKey {
    fn from(record: &SeasonRecord) -> Self {
        Self::new(record.league_id, record.season.clone())
    }
}

impl fmt::Display for SeasonKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "league {} season {}", self.league_id, self.season)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_layout() {
        let key = SeasonKey::new(39, "2023");
        assert_eq!(key.cache_key(), "season:39:2023");
        assert_eq!(key.processed_key(), "processed:39:2023");
    }

    #[test]
    fn test_parse_cache_key() {
        assert_eq!(SeasonKey::parse("season:140:2021"), Some(SeasonKey::new(140, "2021")));
        assert_eq!(
            SeasonKey::parse("season:2:2020-2021"),
            Some(SeasonKey::new(2, "2020-2021"))
        );
    }

    #[test]
    fn test_parse_rejects_foreign_keys() {
        assert_eq!(SeasonKey::parse("processed:39:2023"), None);
        assert_eq!(SeasonKey::parse("season:abc:2023"), None);
        assert_eq!(SeasonKey::parse("season:39"), None);
        assert_eq!(SeasonKey::parse("season:39:"), None);
    }

    #[test]
    fn test_keys_sort_by_league_then_season() {
        let mut keys = vec![
            SeasonKey::new(140, "2021"),
            SeasonKey::new(39, "2023"),
            SeasonKey::new(39, "2022"),
        ];
        keys.sort();
        assert_eq!(keys[0], SeasonKey::new(39, "2022"));
        assert_eq!(keys[2], SeasonKey::new(140, "2021"));
    }
}
