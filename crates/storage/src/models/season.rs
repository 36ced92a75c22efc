use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::error::StorageError;

/// A competition-season seeded out of band; `is_processed` flips to true once
/// ingestion of every fixture has finished.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct SeasonRecord {
    pub league_id: i32,
    pub season: String,
    pub is_processed: bool,
}

/// Which unprocessed season ingestion picks first, by season label.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SeasonOrder {
    #[default]
    Earliest,
    Latest,
}

impl SeasonOrder {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Earliest => "earliest",
            Self::Latest => "latest",
        }
    }

    pub(crate) fn sql_direction(&self) -> &'static str {
        match self {
            Self::Earliest => "ASC",
            Self::Latest => "DESC",
        }
    }
}

impl std::str::FromStr for SeasonOrder {
    type Err = StorageError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "earliest" | "asc" | "oldest" => Ok(Self::Earliest),
            "latest" | "desc" | "newest" => Ok(Self::Latest),
            _ => Err(StorageError::InvalidData(format!(
                "Unknown season order: '{}'. Available: earliest, latest",
                s
            ))),
        }
    }
}

impl std::fmt::Display for SeasonOrder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_season_order_parsing() {
        assert_eq!("earliest".parse::<SeasonOrder>().unwrap(), SeasonOrder::Earliest);
        assert_eq!("LATEST".parse::<SeasonOrder>().unwrap(), SeasonOrder::Latest);
        assert_eq!("desc".parse::<SeasonOrder>().unwrap(), SeasonOrder::Latest);
        assert!("sideways".parse::<SeasonOrder>().is_err());
    }
}
