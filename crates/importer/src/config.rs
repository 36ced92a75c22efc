use std::time::Duration;

use chrono::{DateTime, NaiveDate, Utc};
use storage::models::SeasonOrder;
use validator::Validate;

use crate::{ImporterError, Result};

pub const DEFAULT_API_HOST: &str = "v3.football.api-sports.io";
pub const DEFAULT_REQUEST_DELAY_MS: u64 = 300;

/// Ingestion stops once the provider reports fewer calls left than this.
pub const BUDGET_THRESHOLD: u32 = 4;

/// Connection settings for the football data API.
#[derive(Debug, Clone, Validate)]
pub struct ApiSettings {
    #[validate(url(message = "API base URL must be a valid URL"))]
    pub base_url: String,

    #[validate(length(min = 1, message = "API key is required"))]
    pub api_key: String,

    #[validate(length(min = 1, message = "API host is required"))]
    pub api_host: String,

    pub request_delay: Duration,
}

impl ApiSettings {
    pub fn new(base_url: String, api_key: String, api_host: String, request_delay_ms: u64) -> Result<Self> {
        let settings = Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
            api_host,
            request_delay: Duration::from_millis(request_delay_ms),
        };
        settings
            .validate()
            .map_err(|e| ImporterError::ValidationError(e.to_string()))?;
        Ok(settings)
    }
}

/// Inclusive date range a fixture must fall in to be ingested. Open ends are unbounded.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EligibleWindow {
    from: Option<NaiveDate>,
    until: Option<NaiveDate>,
}

impl EligibleWindow {
    pub fn new(from: Option<NaiveDate>, until: Option<NaiveDate>) -> Result<Self> {
        if let (Some(from), Some(until)) = (from, until) {
            if from > until {
                return Err(ImporterError::ConfigError(format!(
                    "Eligible window starts after it ends: {} > {}",
                    from, until
                )));
            }
        }
        Ok(Self { from, until })
    }

    pub fn contains(&self, date: DateTime<Utc>) -> bool {
        let day = date.date_naive();
        self.from.is_none_or(|from| day >= from) && self.until.is_none_or(|until| day <= until)
    }
}

#[derive(Debug, Clone)]
pub struct IngestSettings {
    pub season_order: SeasonOrder,
    pub window: EligibleWindow,
    pub budget_threshold: u32,
}

impl Default for IngestSettings {
    fn default() -> Self {
        Self {
            season_order: SeasonOrder::default(),
            window: EligibleWindow::default(),
            budget_threshold: BUDGET_THRESHOLD,
        }
    }
}
