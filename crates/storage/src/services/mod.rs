pub mod elo;
pub mod match_stage;
pub mod rating_engine;

pub use match_stage::MatchStage;
pub use rating_engine::{RatingEngine, RatingSummary};
