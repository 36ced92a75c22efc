use reqwest::header::HeaderMap;
use serde::de::DeserializeOwned;
use tracing::debug;

use super::models::{ApiEnvelope, FixtureItem, LineupItem, PlayersItem, StatisticsItem};
use crate::config::ApiSettings;
use crate::traits::Budgeted;
use crate::{ImporterError, Result};

pub const REMAINING_HEADER: &str = "x-ratelimit-requests-remaining";

pub struct ApiFootballClient {
    settings: ApiSettings,
    client: reqwest::Client,
}

impl ApiFootballClient {
    pub fn new(settings: ApiSettings) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("matchday/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self { settings, client })
    }

    pub async fn fetch_fixtures(&self, league_id: i32, season: &str) -> Result<Budgeted<Vec<FixtureItem>>> {
        self.get(
            "fixtures",
            &[("league", league_id.to_string()), ("season", season.to_string())],
        )
        .await
    }

    pub async fn fetch_statistics(&self, fixture_id: i64) -> Result<Budgeted<Vec<StatisticsItem>>> {
        self.get("fixtures/statistics", &[("fixture", fixture_id.to_string())])
            .await
    }

    pub async fn fetch_lineups(&self, fixture_id: i64) -> Result<Budgeted<Vec<LineupItem>>> {
        self.get("fixtures/lineups", &[("fixture", fixture_id.to_string())])
            .await
    }

    pub async fn fetch_players(&self, fixture_id: i64) -> Result<Budgeted<Vec<PlayersItem>>> {
        self.get("fixtures/players", &[("fixture", fixture_id.to_string())])
            .await
    }

    /// Every call waits the configured delay first, so the provider sees at
    /// most one request per delay period.
    async fn get<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<Budgeted<Vec<T>>> {
        tokio::time::sleep(self.settings.request_delay).await;

        let url = format!("{}/{}", self.settings.base_url, path);
        debug!("GET {} {:?}", url, query);

        let response = self
            .client
            .get(&url)
            .query(query)
            .header("X-RapidAPI-Key", &self.settings.api_key)
            .header("X-RapidAPI-Host", &self.settings.api_host)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ImporterError::ApiError {
                status: status.as_u16(),
                body,
            });
        }

        let remaining = remaining_budget(response.headers())?;
        let body = response.text().await?;
        let envelope: ApiEnvelope<T> = serde_json::from_str(&body)?;

        if let Some(message) = envelope.error_message() {
            return Err(ImporterError::ApiError {
                status: status.as_u16(),
                body: message,
            });
        }

        debug!("{} item(s), {} call(s) left", envelope.response.len(), remaining);
        Ok(Budgeted::new(envelope.response, remaining))
    }
}

pub fn remaining_budget(headers: &HeaderMap) -> Result<u32> {
    let value = headers
        .get(REMAINING_HEADER)
        .ok_or_else(|| ImporterError::RateLimitHeader(format!("{} is missing", REMAINING_HEADER)))?;

    value
        .to_str()
        .ok()
        .and_then(|v| v.trim().parse::<u32>().ok())
        .ok_or_else(|| ImporterError::RateLimitHeader(format!("{} = {:?}", REMAINING_HEADER, value)))
}
