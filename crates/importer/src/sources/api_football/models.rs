use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::Value;

/// Every API-Football response wraps its payload in `response`. Failures such
/// as a bad key still answer 200 with a non-empty `errors` object or array.
#[derive(Debug, Deserialize)]
pub struct ApiEnvelope<T> {
    #[serde(default)]
    pub errors: Value,
    pub response: Vec<T>,
}

impl<T> ApiEnvelope<T> {
    pub fn error_message(&self) -> Option<String> {
        match &self.errors {
            Value::Object(map) if !map.is_empty() => Some(
                map.iter()
                    .map(|(field, message)| format!("{}: {}", field, message))
                    .collect::<Vec<_>>()
                    .join("; "),
            ),
            Value::Array(items) if !items.is_empty() => Some(
                items
                    .iter()
                    .map(|item| item.to_string())
                    .collect::<Vec<_>>()
                    .join("; "),
            ),
            _ => None,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct TeamId {
    pub id: i64,
}

// fixtures?league=&season=

#[derive(Debug, Deserialize)]
pub struct FixtureItem {
    pub fixture: FixtureInfo,
    pub league: LeagueInfo,
    pub teams: FixtureTeams,
    pub goals: Goals,
}

#[derive(Debug, Deserialize)]
pub struct FixtureInfo {
    pub id: i64,
    pub date: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
pub struct LeagueInfo {
    pub round: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct FixtureTeams {
    pub home: TeamInfo,
    pub away: TeamInfo,
}

#[derive(Debug, Deserialize)]
pub struct TeamInfo {
    pub id: i64,
    pub name: String,
}

#[derive(Debug, Deserialize)]
pub struct Goals {
    pub home: Option<i32>,
    pub away: Option<i32>,
}

// fixtures/statistics?fixture=

#[derive(Debug, Deserialize)]
pub struct StatisticsItem {
    pub team: TeamId,
    #[serde(default)]
    pub statistics: Vec<StatisticEntry>,
}

#[derive(Debug, Deserialize)]
pub struct StatisticEntry {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub value: Value,
}

// fixtures/lineups?fixture=

#[derive(Debug, Deserialize)]
pub struct LineupItem {
    pub team: TeamId,
    pub coach: Option<CoachInfo>,
    pub formation: Option<String>,
    #[serde(rename = "startXI", default)]
    pub start_xi: Vec<PlayerSlot>,
    #[serde(default)]
    pub substitutes: Vec<PlayerSlot>,
}

#[derive(Debug, Deserialize)]
pub struct CoachInfo {
    pub id: Option<i64>,
    pub name: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct PlayerSlot {
    pub player: SlotPlayer,
}

#[derive(Debug, Deserialize)]
pub struct SlotPlayer {
    pub id: Option<i64>,
    pub name: Option<String>,
    pub pos: Option<String>,
}

// fixtures/players?fixture=

#[derive(Debug, Deserialize)]
pub struct PlayersItem {
    pub team: TeamId,
    #[serde(default)]
    pub players: Vec<PlayerEntry>,
}

#[derive(Debug, Deserialize)]
pub struct PlayerEntry {
    pub player: PlayerIdent,
    #[serde(default)]
    pub statistics: Vec<PlayerStatistics>,
}

#[derive(Debug, Deserialize)]
pub struct PlayerIdent {
    pub id: i64,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct PlayerStatistics {
    pub games: Games,
    pub shots: Shots,
    pub goals: PlayerGoals,
    pub passes: Passes,
    pub tackles: Tackles,
    pub duels: Duels,
    pub dribbles: Dribbles,
    pub fouls: Fouls,
    pub cards: Cards,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Games {
    pub minutes: Option<i32>,
    pub rating: Option<String>,
    pub captain: Option<bool>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Shots {
    pub total: Option<i32>,
    pub on: Option<i32>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct PlayerGoals {
    pub total: Option<i32>,
    pub conceded: Option<i32>,
    pub assists: Option<i32>,
    pub saves: Option<i32>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Passes {
    pub total: Option<i32>,
    pub accuracy: Value,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Tackles {
    pub total: Option<i32>,
    pub blocks: Option<i32>,
    pub interceptions: Option<i32>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Duels {
    pub won: Option<i32>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Dribbles {
    pub attempts: Option<i32>,
    pub success: Option<i32>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Fouls {
    pub drawn: Option<i32>,
    pub committed: Option<i32>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Cards {
    pub yellow: Option<i32>,
    pub red: Option<i32>,
}
