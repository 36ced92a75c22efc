use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A persisted match row.
///
/// The rating columns (`*_elo`, `*_form`) stay `NULL` until the rating engine
/// processes the match and are written exactly once. Form is only ever set for
/// regular-league matches.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Match {
    pub id: i64,
    pub date: DateTime<Utc>,
    pub league_id: i32,
    pub season: String,
    pub round: Option<String>,
    pub home_team_id: i64,
    pub away_team_id: i64,
    pub home_score: i32,
    pub away_score: i32,
    pub home_coach_id: Option<i64>,
    pub away_coach_id: Option<i64>,
    pub home_formation: Option<String>,
    pub away_formation: Option<String>,
    pub home_team_elo: Option<i32>,
    pub away_team_elo: Option<i32>,
    pub home_team_form: Option<f64>,
    pub away_team_form: Option<f64>,
}

impl Match {
    pub fn is_rated(&self) -> bool {
        self.home_team_elo.is_some() && self.away_team_elo.is_some()
    }

    pub fn involves(&self, team_id: i64) -> bool {
        self.home_team_id == team_id || self.away_team_id == team_id
    }
}

/// Insert payload for a match coming out of ingestion; ratings are never part of it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewMatch {
    pub id: i64,
    pub date: DateTime<Utc>,
    pub league_id: i32,
    pub season: String,
    pub round: Option<String>,
    pub home_team_id: i64,
    pub away_team_id: i64,
    pub home_score: i32,
    pub away_score: i32,
    pub home_coach_id: Option<i64>,
    pub away_coach_id: Option<i64>,
    pub home_formation: Option<String>,
    pub away_formation: Option<String>,
}

impl NewMatch {
    pub fn into_unrated(self) -> Match {
        Match {
            id: self.id,
            date: self.date,
            league_id: self.league_id,
            season: self.season,
            round: self.round,
            home_team_id: self.home_team_id,
            away_team_id: self.away_team_id,
            home_score: self.home_score,
            away_score: self.away_score,
            home_coach_id: self.home_coach_id,
            away_coach_id: self.away_coach_id,
            home_formation: self.home_formation,
            away_formation: self.away_formation,
            home_team_elo: None,
            away_team_elo: None,
            home_team_form: None,
            away_team_form: None,
        }
    }
}
