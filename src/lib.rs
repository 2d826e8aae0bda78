//! Leaderboard Engine - rating and ranking for multi-party contests
//!
//! This crate maintains per-leaderboard skill beliefs for entrants, applies
//! finished contests exactly once with a Weng-Lin (OpenSkill) update, and
//! classifies entries into placement and ranked lists.

pub mod config;
pub mod error;
pub mod ledger;
pub mod metrics;
pub mod rating;
pub mod service;
pub mod types;
pub mod utils;

// Re-export commonly used types and traits
pub use error::{LeaderboardError, Result};
pub use types::*;

// Re-export key components
pub use ledger::{EntryStateTracker, LeaderboardStore, RankingClassifier};
pub use rating::{PlacementResolver, SkillModel, WengLinSkillModel};
pub use service::AppState;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
