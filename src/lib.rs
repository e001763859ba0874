pub mod config;
pub mod dataset;
pub mod error;
pub mod export;
pub mod feature_encoder;
pub mod head_to_head;
pub mod match_record;
pub mod normalize;
pub mod pairwise_stats;
pub mod toss_impact;
pub mod venue_stats;
pub mod winner_model;

pub use error::{Result, StatsError};
pub use match_record::{MatchRecord, MatchResult, MatchTable, SeasonFilter, TossDecision};
