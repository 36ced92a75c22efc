use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FormUpdate {
    pub home: f64,
    pub away: f64,
}

/// New rating values for one match. Applied atomically: both ratings and, when
/// present, both form values land together or not at all.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RatingUpdate {
    pub match_id: i64,
    pub home_elo: i32,
    pub away_elo: i32,
    pub form: Option<FormUpdate>,
}
