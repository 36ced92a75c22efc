mod client;
mod exporter;
mod models;

pub use client::{ApiFootballClient, REMAINING_HEADER};
pub use exporter::{ApiFootballExporter, parse_rating, safe_int};

use async_trait::async_trait;

use crate::Result;
use crate::canonical::models::{Fixture, PlayerStats, TeamLineup, TeamStatistics};
use crate::config::ApiSettings;
use crate::traits::{Budgeted, MatchDataSource};

/// API-Football v3 as a match data source.
pub struct ApiFootballSource {
    client: ApiFootballClient,
}

impl ApiFootballSource {
    pub fn new(settings: ApiSettings) -> Result<Self> {
        Ok(Self {
            client: ApiFootballClient::new(settings)?,
        })
    }
}

#[async_trait]
impl MatchDataSource for ApiFootballSource {
    async fn fetch_season_matches(&self, league_id: i32, season: &str) -> Result<Budgeted<Vec<Fixture>>> {
        let fixtures = self.client.fetch_fixtures(league_id, season).await?;
        Ok(fixtures.map(ApiFootballExporter::fixtures))
    }

    async fn fetch_statistics(&self, match_id: i64) -> Result<Budgeted<Vec<TeamStatistics>>> {
        let statistics = self.client.fetch_statistics(match_id).await?;
        Ok(statistics.map(ApiFootballExporter::statistics))
    }

    async fn fetch_lineups(&self, match_id: i64) -> Result<Budgeted<Vec<TeamLineup>>> {
        let lineups = self.client.fetch_lineups(match_id).await?;
        Ok(lineups.map(ApiFootballExporter::lineups))
    }

    async fn fetch_players(&self, match_id: i64) -> Result<Budgeted<Vec<PlayerStats>>> {
        let players = self.client.fetch_players(match_id).await?;
        Ok(players.map(ApiFootballExporter::players))
    }
}
