//! Placement-to-update resolution
//!
//! Turns a finished contest's roster, with each participant's current entry,
//! into the full batch of per-entry updates in one deterministic pass. No
//! persistence happens here.

use crate::error::{LeaderboardError, Result};
use crate::rating::calculator::{ensure_valid_update, SkillModel};
use crate::types::{Belief, ContestPlacement, EntrantId, EntryId, LeaderboardEntry};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::sync::Arc;

/// One participant's entry snapshot and finishing position
#[derive(Debug, Clone)]
pub struct RosterSlot {
    pub entry: LeaderboardEntry,
    pub placement: u32,
}

/// Computed rating update for a single entry in a contest
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolvedUpdate {
    pub leaderboard_entry_id: EntryId,
    pub entrant_id: EntrantId,
    pub placement: u32,
    pub prior: Belief,
    pub posterior: Belief,
    pub new_display_score: f64,
    pub display_score_change: f64,
    pub is_first_place: bool,
    /// Always 1: each applied contest counts once toward `games_played`
    pub games_played_increment: u32,
}

/// Validate a contest roster before anything is read or written
///
/// Placements are 1-indexed, at most the roster size, and at least one
/// participant finished first. Ties are allowed.
pub fn validate_roster(roster: &[ContestPlacement]) -> Result<()> {
    if roster.len() < 2 {
        return Err(LeaderboardError::InvalidRoster {
            reason: format!(
                "a contest needs at least 2 participants, got {}",
                roster.len()
            ),
        }
        .into());
    }

    let mut seen = HashSet::with_capacity(roster.len());
    for slot in roster {
        if !seen.insert(slot.entrant_id) {
            return Err(LeaderboardError::InvalidRoster {
                reason: format!("entrant {} appears more than once", slot.entrant_id),
            }
            .into());
        }
        if slot.placement == 0 || slot.placement as usize > roster.len() {
            return Err(LeaderboardError::InvalidRoster {
                reason: format!(
                    "entrant {} has placement {} outside 1..={}",
                    slot.entrant_id,
                    slot.placement,
                    roster.len()
                ),
            }
            .into());
        }
    }

    if !roster.iter().any(|slot| slot.placement == 1) {
        return Err(LeaderboardError::InvalidRoster {
            reason: "no participant finished first".to_string(),
        }
        .into());
    }

    Ok(())
}

/// Resolves contest placements into per-entry updates
#[derive(Clone)]
pub struct PlacementResolver {
    model: Arc<dyn SkillModel>,
}

impl PlacementResolver {
    pub fn new(model: Arc<dyn SkillModel>) -> Self {
        Self { model }
    }

    pub fn model(&self) -> &Arc<dyn SkillModel> {
        &self.model
    }

    /// Compute every participant's posterior in one model invocation
    ///
    /// Output is ordered by placement, then entry id, independent of the
    /// order of `slots`.
    pub fn resolve(&self, slots: &[RosterSlot]) -> Result<Vec<ResolvedUpdate>> {
        let mut ordered: Vec<&RosterSlot> = slots.iter().collect();
        ordered.sort_by(|a, b| {
            a.placement
                .cmp(&b.placement)
                .then(a.entry.leaderboard_entry_id.cmp(&b.entry.leaderboard_entry_id))
        });

        let priors: Vec<Belief> = ordered.iter().map(|slot| slot.entry.belief).collect();
        let placements: Vec<u32> = ordered.iter().map(|slot| slot.placement).collect();

        let update = self.model.update(&priors, &placements)?;
        ensure_valid_update(&priors, &update)?;

        let updates = ordered
            .iter()
            .zip(update.posteriors.iter().zip(&update.score_deltas))
            .map(|(slot, (posterior, delta))| ResolvedUpdate {
                leaderboard_entry_id: slot.entry.leaderboard_entry_id,
                entrant_id: slot.entry.entrant_id,
                placement: slot.placement,
                prior: slot.entry.belief,
                posterior: *posterior,
                new_display_score: self.model.display_score(posterior),
                display_score_change: *delta,
                is_first_place: slot.placement == 1,
                games_played_increment: 1,
            })
            .collect();

        Ok(updates)
    }
}
