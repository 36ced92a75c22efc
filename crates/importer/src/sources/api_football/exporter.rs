use serde_json::Value;
use storage::models::TeamMatchStatistics;
use tracing::{debug, warn};

use super::models as api;
use crate::canonical::models as canonical;

/// Converts raw API-Football payloads into the canonical, provider-neutral shapes.
pub struct ApiFootballExporter;

impl ApiFootballExporter {
    pub fn fixtures(items: Vec<api::FixtureItem>) -> Vec<canonical::Fixture> {
        items
            .into_iter()
            .map(|item| canonical::Fixture {
                id: item.fixture.id,
                date: item.fixture.date,
                round: item.league.round,
                home: canonical::TeamRef {
                    id: item.teams.home.id,
                    name: item.teams.home.name,
                },
                away: canonical::TeamRef {
                    id: item.teams.away.id,
                    name: item.teams.away.name,
                },
                home_score: item.goals.home,
                away_score: item.goals.away,
            })
            .collect()
    }

    pub fn statistics(items: Vec<api::StatisticsItem>) -> Vec<canonical::TeamStatistics> {
        items
            .into_iter()
            .map(|item| {
                let mut statistics = TeamMatchStatistics::default();
                for entry in &item.statistics {
                    if !statistics.record(&entry.kind, safe_int(&entry.value)) {
                        debug!("Ignoring statistic '{}'", entry.kind);
                    }
                }
                canonical::TeamStatistics {
                    team_id: item.team.id,
                    statistics,
                }
            })
            .collect()
    }

    pub fn lineups(items: Vec<api::LineupItem>) -> Vec<canonical::TeamLineup> {
        items
            .into_iter()
            .map(|item| canonical::TeamLineup {
                team_id: item.team.id,
                coach: item.coach.and_then(|coach| {
                    Some(canonical::PersonRef {
                        id: coach.id?,
                        name: coach.name.unwrap_or_default(),
                    })
                }),
                formation: item.formation.filter(|f| !f.is_empty()),
                start_xi: lineup_players(item.team.id, item.start_xi),
                substitutes: lineup_players(item.team.id, item.substitutes),
            })
            .collect()
    }

    /// One entry per (team, player), built from the player's first statistic block.
    pub fn players(items: Vec<api::PlayersItem>) -> Vec<canonical::PlayerStats> {
        let mut result = Vec::new();
        for item in items {
            for entry in item.players {
                let stats = entry
                    .statistics
                    .into_iter()
                    .next()
                    .map(player_match_stats)
                    .unwrap_or_default();
                result.push(canonical::PlayerStats {
                    team_id: item.team.id,
                    player_id: entry.player.id,
                    stats,
                });
            }
        }
        result
    }
}

fn lineup_players(team_id: i64, slots: Vec<api::PlayerSlot>) -> Vec<canonical::LineupPlayer> {
    slots
        .into_iter()
        .filter_map(|slot| {
            let Some(id) = slot.player.id else {
                warn!("Skipping lineup entry without player id for team {}", team_id);
                return None;
            };
            Some(canonical::LineupPlayer {
                id,
                name: slot.player.name.unwrap_or_default(),
                position: slot.player.pos.filter(|p| !p.is_empty()),
            })
        })
        .collect()
}

fn player_match_stats(raw: api::PlayerStatistics) -> canonical::PlayerMatchStats {
    canonical::PlayerMatchStats {
        yellow_cards: raw.cards.yellow.unwrap_or(0),
        red_cards: raw.cards.red.unwrap_or(0),
        goals: raw.goals.total.unwrap_or(0),
        assists: raw.goals.assists.unwrap_or(0),
        fouls_committed: raw.fouls.committed.unwrap_or(0),
        fouls_drawn: raw.fouls.drawn.unwrap_or(0),
        dribbles_attempts: raw.dribbles.attempts.unwrap_or(0),
        dribbles_success: raw.dribbles.success.unwrap_or(0),
        duels_won: raw.duels.won.unwrap_or(0),
        passes_total: raw.passes.total.unwrap_or(0),
        passes_accuracy: safe_int(&raw.passes.accuracy),
        tackles_total: raw.tackles.total.unwrap_or(0),
        tackles_blocks: raw.tackles.blocks.unwrap_or(0),
        tackles_interceptions: raw.tackles.interceptions.unwrap_or(0),
        shots_total: raw.shots.total.unwrap_or(0),
        shots_on: raw.shots.on.unwrap_or(0),
        goals_conceded: raw.goals.conceded.unwrap_or(0),
        goals_saved: raw.goals.saves.unwrap_or(0),
        minutes: raw.games.minutes.unwrap_or(0),
        captain: raw.games.captain.unwrap_or(false),
        rating: raw.games.rating.as_deref().and_then(parse_rating),
    }
}

/// Integer view of a statistic value: null is 0, `"61%"` is 61, junk is 0.
pub fn safe_int(value: &Value) -> i32 {
    match value {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().map(|f| f as i64))
            .and_then(|n| i32::try_from(n).ok())
            .unwrap_or(0),
        Value::String(s) => s.trim().trim_end_matches('%').trim().parse().unwrap_or(0),
        _ => 0,
    }
}

pub fn parse_rating(rating: &str) -> Option<f64> {
    rating.trim().parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_safe_int() {
        assert_eq!(safe_int(&json!(null)), 0);
        assert_eq!(safe_int(&json!(7)), 7);
        assert_eq!(safe_int(&json!(7.9)), 7);
        assert_eq!(safe_int(&json!("61%")), 61);
        assert_eq!(safe_int(&json!(" 12 ")), 12);
        assert_eq!(safe_int(&json!("n/a")), 0);
        assert_eq!(safe_int(&json!(true)), 0);
    }

    #[test]
    fn test_parse_rating() {
        assert_eq!(parse_rating("7.3"), Some(7.3));
        assert_eq!(parse_rating(""), None);
        assert_eq!(parse_rating("-"), None);
    }

    #[test]
    fn test_fixtures_from_payload() {
        let body = json!({
            "errors": [],
            "response": [{
                "fixture": { "id": 1035037, "date": "2023-08-11T19:00:00+00:00" },
                "league": { "id": 39, "season": 2023, "round": "Regular Season - 1" },
                "teams": {
                    "home": { "id": 44, "name": "Burnley", "winner": false },
                    "away": { "id": 50, "name": "Manchester City", "winner": true }
                },
                "goals": { "home": 0, "away": 3 }
            }, {
                "fixture": { "id": 1035038, "date": "2023-08-12T12:00:00+00:00" },
                "league": { "round": "Regular Season - 1" },
                "teams": {
                    "home": { "id": 42, "name": "Arsenal" },
                    "away": { "id": 65, "name": "Nottingham Forest" }
                },
                "goals": { "home": null, "away": null }
            }]
        });
        let envelope: api::ApiEnvelope<api::FixtureItem> = serde_json::from_value(body).unwrap();
        assert!(envelope.error_message().is_none());

        let fixtures = ApiFootballExporter::fixtures(envelope.response);
        assert_eq!(fixtures.len(), 2);
        assert_eq!(fixtures[0].id, 1035037);
        assert_eq!(fixtures[0].away.name, "Manchester City");
        assert_eq!(fixtures[0].final_score(), Some((0, 3)));
        assert_eq!(fixtures[0].round.as_deref(), Some("Regular Season - 1"));
        assert_eq!(fixtures[1].final_score(), None);
    }

    #[test]
    fn test_statistics_from_payload() {
        let body = json!([{
            "team": { "id": 50, "name": "Manchester City" },
            "statistics": [
                { "type": "Shots on Goal", "value": 8 },
                { "type": "Ball Possession", "value": "65%" },
                { "type": "Goalkeeper Saves", "value": null },
                { "type": "expected_goals", "value": "2.61" }
            ]
        }]);
        let items: Vec<api::StatisticsItem> = serde_json::from_value(body).unwrap();
        let stats = ApiFootballExporter::statistics(items);

        assert_eq!(stats[0].team_id, 50);
        assert_eq!(stats[0].statistics.shots_on_goal, 8);
        assert_eq!(stats[0].statistics.ball_possession, 65);
        assert_eq!(stats[0].statistics.goalkeeper_saves, 0);
    }

    #[test]
    fn test_lineups_from_payload() {
        let body = json!([{
            "team": { "id": 50 },
            "coach": { "id": 4, "name": "Pep Guardiola" },
            "formation": "4-1-4-1",
            "startXI": [{ "player": { "id": 617, "name": "Ederson", "number": 31, "pos": "G" } }],
            "substitutes": [
                { "player": { "id": 18861, "name": "Nathan Aké", "pos": "D" } },
                { "player": { "id": null, "name": "Unknown", "pos": null } }
            ]
        }, {
            "team": { "id": 44 },
            "coach": { "id": null, "name": null },
            "formation": null,
            "startXI": [],
            "substitutes": []
        }]);
        let items: Vec<api::LineupItem> = serde_json::from_value(body).unwrap();
        let lineups = ApiFootballExporter::lineups(items);

        assert_eq!(lineups[0].coach.as_ref().unwrap().name, "Pep Guardiola");
        assert_eq!(lineups[0].formation.as_deref(), Some("4-1-4-1"));
        assert_eq!(lineups[0].start_xi[0].position.as_deref(), Some("G"));
        assert_eq!(lineups[0].substitutes.len(), 1);
        assert!(lineups[1].coach.is_none());
        assert!(lineups[1].formation.is_none());
    }

    #[test]
    fn test_players_take_first_statistic_block() {
        let body = json!([{
            "team": { "id": 50 },
            "players": [{
                "player": { "id": 617, "name": "Ederson" },
                "statistics": [{
                    "games": { "minutes": 90, "rating": "7.1", "captain": false, "substitute": false },
                    "goals": { "total": null, "conceded": 0, "assists": null, "saves": 1 },
                    "passes": { "total": 29, "key": null, "accuracy": "24" },
                    "tackles": { "total": null, "blocks": null, "interceptions": null },
                    "cards": { "yellow": 0, "red": 0 }
                }, {
                    "games": { "minutes": 1 }
                }]
            }, {
                "player": { "id": 1422, "name": "Jeremy Doku" },
                "statistics": []
            }]
        }]);
        let items: Vec<api::PlayersItem> = serde_json::from_value(body).unwrap();
        let players = ApiFootballExporter::players(items);

        assert_eq!(players.len(), 2);
        let keeper = &players[0].stats;
        assert_eq!(keeper.minutes, 90);
        assert_eq!(keeper.goals_saved, 1);
        assert_eq!(keeper.passes_accuracy, 24);
        assert_eq!(keeper.rating, Some(7.1));
        assert_eq!(players[1].stats, canonical::PlayerMatchStats::default());
    }

    #[test]
    fn test_envelope_errors() {
        let body = json!({
            "errors": { "token": "Error/Missing application key." },
            "response": []
        });
        let envelope: api::ApiEnvelope<api::FixtureItem> = serde_json::from_value(body).unwrap();
        assert_eq!(
            envelope.error_message().as_deref(),
            Some("token: \"Error/Missing application key.\"")
        );
    }
}
