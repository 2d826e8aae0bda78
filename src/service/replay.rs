//! Batch replay of recorded contests
//!
//! Feeds a file of finished contests through the engine in order, the way a
//! contest runner would deliver them, and reports the resulting rankings.

use crate::error::{classify, Result};
use crate::service::app::AppState;
use crate::types::{ContestId, ContestPlacement, EntrantId, Rankings};
use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;
use tracing::{info, warn};

/// A leaderboard's worth of contests to replay
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReplayFile {
    /// Leaderboard name; created fresh for the replay
    pub leaderboard: String,
    pub contests: Vec<ReplayContest>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReplayContest {
    pub contest_id: ContestId,
    pub placements: Vec<ContestPlacement>,
}

/// What happened during a replay
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReplaySummary {
    pub leaderboard: String,
    pub applied: usize,
    pub replayed: usize,
    pub rejected: Vec<RejectedContest>,
    pub rankings: Rankings,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RejectedContest {
    pub contest_id: ContestId,
    pub reason: String,
    pub message: String,
}

impl ReplayFile {
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read replay file {}", path.display()))?;
        serde_json::from_str(&raw)
            .with_context(|| format!("Failed to parse replay file {}", path.display()))
    }

    /// Distinct entrants in first-appearance order
    pub fn entrants(&self) -> Vec<EntrantId> {
        let mut seen = HashSet::new();
        self.contests
            .iter()
            .flat_map(|contest| contest.placements.iter())
            .map(|placement| placement.entrant_id)
            .filter(|entrant_id| seen.insert(*entrant_id))
            .collect()
    }
}

impl AppState {
    /// Create the file's leaderboard, opt every entrant in, then apply each
    /// contest in file order. Rejected contests are reported, not fatal.
    pub async fn replay(&self, file: &ReplayFile) -> Result<ReplaySummary> {
        let leaderboard = self.create_leaderboard(&file.leaderboard)?;
        let leaderboard_id = leaderboard.leaderboard_id;

        for entrant_id in file.entrants() {
            self.opt_in(leaderboard_id, entrant_id).await?;
        }

        let mut applied = 0;
        let mut replayed = 0;
        let mut rejected = Vec::new();

        for contest in &file.contests {
            match self
                .apply_contest_result(leaderboard_id, contest.contest_id, &contest.placements)
                .await
            {
                Ok(outcome) if outcome.replayed => replayed += 1,
                Ok(_) => applied += 1,
                Err(e) => {
                    warn!(contest_id = %contest.contest_id, "Skipping contest: {}", e);
                    rejected.push(RejectedContest {
                        contest_id: contest.contest_id,
                        reason: classify(&e).map(|e| e.kind()).unwrap_or("internal").to_string(),
                        message: e.to_string(),
                    });
                }
            }
        }

        info!(
            leaderboard = %file.leaderboard,
            applied,
            replayed,
            rejected = rejected.len(),
            "Replay completed"
        );

        Ok(ReplaySummary {
            leaderboard: leaderboard.name,
            applied,
            replayed,
            rejected,
            rankings: self.get_rankings(leaderboard_id)?,
        })
    }
}
