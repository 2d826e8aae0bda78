//! Service layer for the leaderboard engine
//!
//! This module contains the main application state that wires the engine
//! together, and the eligibility policy consulted on opt-in.

pub mod app;
pub mod eligibility;
pub mod replay;

pub use app::{AppState, ServiceError};
pub use eligibility::{AllowAllEntrants, DenyListEligibility, EligibilityPolicy};
pub use replay::{RejectedContest, ReplayContest, ReplayFile, ReplaySummary};
