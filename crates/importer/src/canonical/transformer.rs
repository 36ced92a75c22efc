use storage::MatchStore;
use storage::dto::ingest::MatchDetails;
use storage::models::{Coach, Lineup, MatchStatistics, NewMatch, Player};
use tracing::warn;

use super::models::*;
use crate::cache::SeasonKey;
use crate::{ImporterError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Side {
    Home,
    Away,
}

impl Side {
    fn of(fixture: &Fixture, team_id: i64) -> Option<Self> {
        if team_id == fixture.home.id {
            Some(Self::Home)
        } else if team_id == fixture.away.id {
            Some(Self::Away)
        } else {
            None
        }
    }
}

/// Turns a fixture and its fetched payload into storage rows. Coaches and
/// players are upserted on the way; a failed upsert only drops that reference.
pub struct MatchTransformer<'a, S: MatchStore> {
    store: &'a S,
}

impl<'a, S: MatchStore> MatchTransformer<'a, S> {
    pub fn new(store: &'a S) -> Self {
        Self { store }
    }

    pub async fn build(
        &self,
        key: &SeasonKey,
        fixture: &Fixture,
        payload: MatchPayload,
    ) -> Result<MatchDetails> {
        let (home_score, away_score) = fixture.final_score().ok_or_else(|| {
            ImporterError::TransformationError(format!("Fixture ID={} has no final score", fixture.id))
        })?;

        let mut record = NewMatch {
            id: fixture.id,
            date: fixture.date,
            league_id: key.league_id,
            season: key.season.clone(),
            round: fixture.round.clone(),
            home_team_id: fixture.home.id,
            away_team_id: fixture.away.id,
            home_score,
            away_score,
            home_coach_id: None,
            away_coach_id: None,
            home_formation: None,
            away_formation: None,
        };

        let statistics = merge_statistics(fixture, &payload.statistics);

        let mut lineups = Vec::new();
        for team in &payload.lineups {
            let Some(side) = Side::of(fixture, team.team_id) else {
                warn!(
                    "Lineup for team {} does not belong to fixture ID={}",
                    team.team_id, fixture.id
                );
                continue;
            };

            let coach_id = match &team.coach {
                Some(coach) => self.save_coach(coach).await,
                None => None,
            };
            match side {
                Side::Home => {
                    record.home_coach_id = coach_id;
                    record.home_formation = team.formation.clone();
                }
                Side::Away => {
                    record.away_coach_id = coach_id;
                    record.away_formation = team.formation.clone();
                }
            }

            for (players, is_substitute) in [(&team.start_xi, false), (&team.substitutes, true)] {
                for player in players {
                    if !self.save_player(player).await {
                        continue;
                    }
                    let stats = find_player_stats(&payload.players, team.team_id, player.id);
                    lineups.push(build_lineup(fixture.id, team.team_id, player, is_substitute, stats));
                }
            }
        }

        Ok(MatchDetails {
            match_record: record,
            statistics,
            lineups,
        })
    }

    async fn save_coach(&self, coach: &PersonRef) -> Option<i64> {
        let row = Coach {
            id: coach.id,
            fullname: coach.name.clone(),
        };
        match self.store.upsert_coach(&row).await {
            Ok(()) => Some(coach.id),
            Err(e) => {
                warn!("Failed to save coach {}: {}", coach.id, e);
                None
            }
        }
    }

    async fn save_player(&self, player: &LineupPlayer) -> bool {
        let row = Player {
            id: player.id,
            fullname: player.name.clone(),
        };
        match self.store.upsert_player(&row).await {
            Ok(()) => true,
            Err(e) => {
                warn!("Failed to save player {}: {}", player.id, e);
                false
            }
        }
    }
}

/// Assigns each team's statistics to its side; `None` when nothing was reported.
fn merge_statistics(fixture: &Fixture, teams: &[TeamStatistics]) -> Option<MatchStatistics> {
    let mut merged = MatchStatistics::new(fixture.id);
    for team in teams {
        match Side::of(fixture, team.team_id) {
            Some(Side::Home) => merged.home = team.statistics,
            Some(Side::Away) => merged.away = team.statistics,
            None => warn!(
                "Statistics for team {} do not belong to fixture ID={}",
                team.team_id, fixture.id
            ),
        }
    }
    (!merged.is_empty()).then_some(merged)
}

fn find_player_stats(players: &[PlayerStats], team_id: i64, player_id: i64) -> PlayerMatchStats {
    players
        .iter()
        .find(|p| p.team_id == team_id && p.player_id == player_id)
        .map(|p| p.stats.clone())
        .unwrap_or_default()
}

fn build_lineup(
    match_id: i64,
    team_id: i64,
    player: &LineupPlayer,
    is_substitute: bool,
    stats: PlayerMatchStats,
) -> Lineup {
    Lineup {
        match_id,
        team_id,
        player_id: player.id,
        position: player.position.clone(),
        is_substitute,
        yellow_cards: stats.yellow_cards,
        red_cards: stats.red_cards,
        goals: stats.goals,
        assists: stats.assists,
        fouls_committed: stats.fouls_committed,
        fouls_drawn: stats.fouls_drawn,
        dribbles_attempts: stats.dribbles_attempts,
        dribbles_success: stats.dribbles_success,
        duels_won: stats.duels_won,
        passes_total: stats.passes_total,
        passes_accuracy: stats.passes_accuracy,
        tackles_total: stats.tackles_total,
        tackles_blocks: stats.tackles_blocks,
        tackles_interceptions: stats.tackles_interceptions,
        shots_total: stats.shots_total,
        shots_on: stats.shots_on,
        goals_conceded: stats.goals_conceded,
        goals_saved: stats.goals_saved,
        minutes: stats.minutes,
        captain: stats.captain,
        rating: stats.rating,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use storage::memory::InMemoryStore;
    use storage::models::TeamMatchStatistics;

    fn fixture() -> Fixture {
        Fixture {
            id: 1001,
            date: Utc.with_ymd_and_hms(2023, 8, 12, 14, 0, 0).unwrap(),
            round: Some("Regular Season - 1".to_string()),
            home: TeamRef { id: 50, name: "Manchester City".to_string() },
            away: TeamRef { id: 47, name: "Tottenham".to_string() },
            home_score: Some(2),
            away_score: Some(1),
        }
    }

    fn player(id: i64, position: &str) -> LineupPlayer {
        LineupPlayer {
            id,
            name: format!("Player {}", id),
            position: Some(position.to_string()),
        }
    }

    fn payload() -> MatchPayload {
        let mut home_stats = TeamMatchStatistics::default();
        home_stats.record("Ball Possession", 64);
        let mut away_stats = TeamMatchStatistics::default();
        away_stats.record("Fouls", 11);

        MatchPayload {
            statistics: vec![
                TeamStatistics { team_id: 47, statistics: away_stats },
                TeamStatistics { team_id: 50, statistics: home_stats },
            ],
            lineups: vec![
                TeamLineup {
                    team_id: 50,
                    coach: Some(PersonRef { id: 4, name: "Coach Home".to_string() }),
                    formation: Some("4-3-3".to_string()),
                    start_xi: vec![player(617, "G")],
                    substitutes: vec![player(618, "F")],
                },
                TeamLineup {
                    team_id: 47,
                    coach: Some(PersonRef { id: 5, name: "Coach Away".to_string() }),
                    formation: Some("4-2-3-1".to_string()),
                    start_xi: vec![player(700, "D")],
                    substitutes: vec![],
                },
            ],
            players: vec![PlayerStats {
                team_id: 50,
                player_id: 617,
                stats: PlayerMatchStats {
                    minutes: 90,
                    goals_saved: 3,
                    captain: true,
                    rating: Some(7.4),
                    ..Default::default()
                },
            }],
        }
    }

    #[tokio::test]
    async fn test_build_assigns_sides() {
        let store = InMemoryStore::new();
        let key = SeasonKey::new(39, "2023");
        let details = MatchTransformer::new(&store)
            .build(&key, &fixture(), payload())
            .await
            .unwrap();

        let record = &details.match_record;
        assert_eq!(record.league_id, 39);
        assert_eq!(record.season, "2023");
        assert_eq!((record.home_score, record.away_score), (2, 1));
        assert_eq!(record.home_coach_id, Some(4));
        assert_eq!(record.away_coach_id, Some(5));
        assert_eq!(record.home_formation.as_deref(), Some("4-3-3"));

        let statistics = details.statistics.unwrap();
        assert_eq!(statistics.home.ball_possession, 64);
        assert_eq!(statistics.away.fouls, 11);
        assert_eq!(store.coach(4).unwrap().fullname, "Coach Home");
    }

    #[tokio::test]
    async fn test_lineup_rows_merge_player_stats() {
        let store = InMemoryStore::new();
        let key = SeasonKey::new(39, "2023");
        let details = MatchTransformer::new(&store)
            .build(&key, &fixture(), payload())
            .await
            .unwrap();

        assert_eq!(details.lineups.len(), 3);
        let keeper = details.lineups.iter().find(|l| l.player_id == 617).unwrap();
        assert!(!keeper.is_substitute);
        assert!(keeper.captain);
        assert_eq!(keeper.minutes, 90);
        assert_eq!(keeper.goals_saved, 3);
        assert_eq!(keeper.rating, Some(7.4));

        // no statistic block in the players response
        let sub = details.lineups.iter().find(|l| l.player_id == 618).unwrap();
        assert!(sub.is_substitute);
        assert_eq!(sub.minutes, 0);
        assert_eq!(sub.rating, None);
        assert_eq!(store.player_count(), 3);
    }

    #[tokio::test]
    async fn test_failed_upserts_drop_only_that_reference() {
        let store = InMemoryStore::new();
        store.fail_upserts_for(4);
        store.fail_upserts_for(700);
        let key = SeasonKey::new(39, "2023");

        let details = MatchTransformer::new(&store)
            .build(&key, &fixture(), payload())
            .await
            .unwrap();

        assert_eq!(details.match_record.home_coach_id, None);
        assert_eq!(details.match_record.home_formation.as_deref(), Some("4-3-3"));
        assert_eq!(details.match_record.away_coach_id, Some(5));
        assert!(details.lineups.iter().all(|l| l.player_id != 700));
        assert_eq!(details.lineups.len(), 2);
    }

    #[tokio::test]
    async fn test_empty_statistics_are_dropped() {
        let store = InMemoryStore::new();
        let key = SeasonKey::new(39, "2023");
        let details = MatchTransformer::new(&store)
            .build(&key, &fixture(), MatchPayload::default())
            .await
            .unwrap();

        assert!(details.statistics.is_none());
        assert!(details.lineups.is_empty());
    }

    #[tokio::test]
    async fn test_fixture_without_score_cannot_be_built() {
        let store = InMemoryStore::new();
        let mut unfinished = fixture();
        unfinished.home_score = None;

        let result = MatchTransformer::new(&store)
            .build(&SeasonKey::new(39, "2023"), &unfinished, MatchPayload::default())
            .await;
        assert!(matches!(result, Err(ImporterError::TransformationError(_))));
    }
}
