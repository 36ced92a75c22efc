use serde::{Deserialize, Serialize};

/// Per-side team statistics for one match. Percentages are stored as whole numbers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeamMatchStatistics {
    pub ball_possession: i32,
    pub shots_on_goal: i32,
    pub shots_off_goal: i32,
    pub total_shots: i32,
    pub blocked_shots: i32,
    pub shots_insidebox: i32,
    pub shots_outsidebox: i32,
    pub fouls: i32,
    pub corner_kicks: i32,
    pub offsides: i32,
    pub yellow_cards: i32,
    pub red_cards: i32,
    pub goalkeeper_saves: i32,
    pub total_passes: i32,
    pub passes_accurate: i32,
    pub passes_percentage: i32,
}

impl TeamMatchStatistics {
    /// Records a statistic by its provider label. Returns `false` for labels
    /// that have no column.
    pub fn record(&mut self, label: &str, value: i32) -> bool {
        let slot = match label {
            "Ball Possession" => &mut self.ball_possession,
            "Shots on Goal" => &mut self.shots_on_goal,
            "Shots off Goal" => &mut self.shots_off_goal,
            "Total Shots" => &mut self.total_shots,
            "Blocked Shots" => &mut self.blocked_shots,
            "Shots insidebox" => &mut self.shots_insidebox,
            "Shots outsidebox" => &mut self.shots_outsidebox,
            "Fouls" => &mut self.fouls,
            "Corner Kicks" => &mut self.corner_kicks,
            "Offsides" => &mut self.offsides,
            "Yellow Cards" => &mut self.yellow_cards,
            "Red Cards" => &mut self.red_cards,
            "Goalkeeper Saves" => &mut self.goalkeeper_saves,
            "Total passes" => &mut self.total_passes,
            "Passes accurate" => &mut self.passes_accurate,
            "Passes %" => &mut self.passes_percentage,
            _ => return false,
        };
        *slot = value;
        true
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchStatistics {
    pub match_id: i64,
    pub home: TeamMatchStatistics,
    pub away: TeamMatchStatistics,
}

impl MatchStatistics {
    pub fn new(match_id: i64) -> Self {
        Self {
            match_id,
            home: TeamMatchStatistics::default(),
            away: TeamMatchStatistics::default(),
        }
    }

    /// A provider that has no statistics for a fixture returns an empty list,
    /// which leaves both sides zeroed.
    pub fn is_empty(&self) -> bool {
        self.home.is_empty() && self.away.is_empty()
    }
}
