use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// One player's appearance in a match, keyed by (match, team, player).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Lineup {
    pub match_id: i64,
    pub team_id: i64,
    pub player_id: i64,
    pub position: Option<String>,
    pub is_substitute: bool,
    pub yellow_cards: i32,
    pub red_cards: i32,
    pub goals: i32,
    pub assists: i32,
    pub fouls_committed: i32,
    pub fouls_drawn: i32,
    pub dribbles_attempts: i32,
    pub dribbles_success: i32,
    pub duels_won: i32,
    pub passes_total: i32,
    pub passes_accuracy: i32,
    pub tackles_total: i32,
    pub tackles_blocks: i32,
    pub tackles_interceptions: i32,
    pub shots_total: i32,
    pub shots_on: i32,
    pub goals_conceded: i32,
    pub goals_saved: i32,
    pub minutes: i32,
    pub captain: bool,
    pub rating: Option<f64>,
}
