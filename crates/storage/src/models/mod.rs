mod lineup;
mod match_record;
mod match_statistics;
mod person;
mod rating_config;
mod season;

pub use lineup::Lineup;
pub use match_record::{Match, NewMatch};
pub use match_statistics::{MatchStatistics, TeamMatchStatistics};
pub use person::{Coach, Player, Team};
pub use rating_config::{
    DEFAULT_TOURNAMENT_K, LeagueRef, OTHER_CATEGORY, RatingConfig, RatingConfigFile,
};
pub use season::{SeasonOrder, SeasonRecord};
