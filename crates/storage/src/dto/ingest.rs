use serde::{Deserialize, Serialize};

use crate::models::{Lineup, MatchStatistics, NewMatch};

/// Everything persisted for one fixture, written in a single transaction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchDetails {
    pub match_record: NewMatch,
    pub statistics: Option<MatchStatistics>,
    pub lineups: Vec<Lineup>,
}

/// Result of an idempotent match insert.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveOutcome {
    Inserted,
    AlreadyPresent,
}
