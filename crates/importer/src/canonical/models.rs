use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use storage::models::TeamMatchStatistics;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeamRef {
    pub id: i64,
    pub name: String,
}

/// One entry of a season's fixture list. This is also the shape buffered in
/// the season cache, so changing it invalidates cached seasons.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Fixture {
    pub id: i64,
    pub date: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub round: Option<String>,
    pub home: TeamRef,
    pub away: TeamRef,
    pub home_score: Option<i32>,
    pub away_score: Option<i32>,
}

impl Fixture {
    pub fn final_score(&self) -> Option<(i32, i32)> {
        self.home_score.zip(self.away_score)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TeamStatistics {
    pub team_id: i64,
    pub statistics: TeamMatchStatistics,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersonRef {
    pub id: i64,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineupPlayer {
    pub id: i64,
    pub name: String,
    pub position: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeamLineup {
    pub team_id: i64,
    pub coach: Option<PersonRef>,
    pub formation: Option<String>,
    pub start_xi: Vec<LineupPlayer>,
    pub substitutes: Vec<LineupPlayer>,
}

/// A player's statistic block for one match; zeroed when the provider has none.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PlayerMatchStats {
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

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerStats {
    pub team_id: i64,
    pub player_id: i64,
    pub stats: PlayerMatchStats,
}

/// Everything fetched for one fixture beyond its fixture-list entry.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MatchPayload {
    pub statistics: Vec<TeamStatistics>,
    pub lineups: Vec<TeamLineup>,
    pub players: Vec<PlayerStats>,
}
