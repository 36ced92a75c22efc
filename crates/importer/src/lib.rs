pub mod cache;
pub mod canonical;
pub mod config;
pub mod coordinator;
pub mod error;
pub mod sources;
#[cfg(test)]
mod testing;
pub mod traits;

pub use cache::{RedisSeasonCache, SeasonKey};
pub use config::{ApiSettings, EligibleWindow, IngestSettings};
pub use coordinator::{IngestionCoordinator, RecheckSummary, RunOutcome};
pub use error::{ImporterError, Result};
pub use sources::api_football::ApiFootballSource;
pub use traits::{Budgeted, IngestContext, MatchDataSource, SeasonCache};
