//! Skill model and placement resolution
//!
//! This module holds the pure numeric core of the engine: the Weng-Lin
//! (OpenSkill) belief update from the skillratings crate, and the resolver
//! that turns one contest's placements into per-entry rating updates.

pub mod calculator;
pub mod resolver;
pub mod weng_lin;

// Re-export commonly used types
pub use calculator::{ensure_valid_update, SkillModel, SkillUpdate};
pub use resolver::{validate_roster, PlacementResolver, ResolvedUpdate, RosterSlot};
pub use weng_lin::WengLinSkillModel;
