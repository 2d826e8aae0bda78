//! Ranking classifier and read-side queries
//!
//! Every query works from one store snapshot, so a concurrent contest is
//! either fully visible or not visible at all.

use crate::error::{LeaderboardError, Result};
use crate::ledger::storage::LeaderboardStore;
use crate::rating::calculator::SkillModel;
use crate::types::{
    ActivityFeedEntry, Belief, EntrantId, EntrantLeaderboardSummary, GameHistoryEntry,
    LeaderboardEntry, LeaderboardId, LeaderboardStatus, RatingPoint, Rankings,
};
use std::cmp::Ordering;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;

/// Minimum games before an entry moves from placement into the ranked list
pub const MIN_GAMES_FOR_RANKING: u32 = 10;

/// Order of the ranked list: score, then experience, then seniority
pub fn ranked_order(a: &LeaderboardEntry, b: &LeaderboardEntry) -> Ordering {
    b.display_score
        .total_cmp(&a.display_score)
        .then(b.games_played.cmp(&a.games_played))
        .then(a.creation_seq.cmp(&b.creation_seq))
}

/// Order of the placement list: closest to ranking first
pub fn placement_order(a: &LeaderboardEntry, b: &LeaderboardEntry) -> Ordering {
    b.games_played
        .cmp(&a.games_played)
        .then(a.creation_seq.cmp(&b.creation_seq))
}

/// Read-only view over committed leaderboard state
#[derive(Clone)]
pub struct RankingClassifier {
    store: Arc<dyn LeaderboardStore>,
    model: Arc<dyn SkillModel>,
    min_games_for_ranking: u32,
    history_cap: usize,
}

impl RankingClassifier {
    pub fn new(
        store: Arc<dyn LeaderboardStore>,
        model: Arc<dyn SkillModel>,
        min_games_for_ranking: u32,
        history_cap: usize,
    ) -> Self {
        Self {
            store,
            model,
            min_games_for_ranking,
            history_cap,
        }
    }

    pub fn min_games_for_ranking(&self) -> u32 {
        self.min_games_for_ranking
    }

    fn require_leaderboard(&self, leaderboard_id: LeaderboardId) -> Result<()> {
        match self.store.get_leaderboard(leaderboard_id)? {
            Some(_) => Ok(()),
            None => Err(LeaderboardError::LeaderboardNotFound {
                leaderboard_id: leaderboard_id.to_string(),
            }
            .into()),
        }
    }

    fn active_entries(&self, leaderboard_id: LeaderboardId) -> Result<Vec<LeaderboardEntry>> {
        self.require_leaderboard(leaderboard_id)?;
        Ok(self
            .store
            .entries_for_leaderboard(leaderboard_id)?
            .into_iter()
            .filter(|entry| entry.is_active())
            .collect())
    }

    fn entry_for(
        &self,
        leaderboard_id: LeaderboardId,
        entrant_id: EntrantId,
    ) -> Result<LeaderboardEntry> {
        self.require_leaderboard(leaderboard_id)?;
        self.store
            .get_entry(leaderboard_id, entrant_id)?
            .ok_or_else(|| {
                LeaderboardError::EntryNotFound {
                    leaderboard_id: leaderboard_id.to_string(),
                    entrant_id: entrant_id.to_string(),
                }
                .into()
            })
    }

    /// Partition active entries into placement and ranked lists
    pub fn rankings(&self, leaderboard_id: LeaderboardId) -> Result<Rankings> {
        let (mut ranked, mut placement): (Vec<_>, Vec<_>) = self
            .active_entries(leaderboard_id)?
            .into_iter()
            .partition(|entry| entry.games_played >= self.min_games_for_ranking);

        ranked.sort_by(ranked_order);
        placement.sort_by(placement_order);

        debug!(
            leaderboard_id = %leaderboard_id,
            ranked = ranked.len(),
            placement = placement.len(),
            "Classified leaderboard entries"
        );

        Ok(Rankings {
            placement: placement.iter().map(LeaderboardEntry::view).collect(),
            ranked: ranked.iter().map(LeaderboardEntry::view).collect(),
        })
    }

    /// 1-based competition rank of an entrant, or `None` while still in
    /// placement or opted out
    pub fn rank_for_entry(
        &self,
        leaderboard_id: LeaderboardId,
        entrant_id: EntrantId,
    ) -> Result<Option<usize>> {
        let entries = self.active_entries(leaderboard_id)?;
        let Some(entry) = entries.iter().find(|entry| entry.entrant_id == entrant_id) else {
            return Ok(None);
        };
        if entry.games_played < self.min_games_for_ranking {
            return Ok(None);
        }

        let ahead = entries
            .iter()
            .filter(|other| other.games_played >= self.min_games_for_ranking)
            .filter(|other| other.display_score > entry.display_score)
            .count();

        Ok(Some(ahead + 1))
    }

    /// Contests an entrant played on a leaderboard, newest first
    ///
    /// `page` is 1-based; a page past the end is empty.
    pub fn game_history(
        &self,
        leaderboard_id: LeaderboardId,
        entrant_id: EntrantId,
        page: usize,
        per_page: usize,
    ) -> Result<Vec<GameHistoryEntry>> {
        let entry = self.entry_for(leaderboard_id, entrant_id)?;
        let offset = page.saturating_sub(1).saturating_mul(per_page);

        Ok(self
            .store
            .results_for_entry(entry.leaderboard_entry_id)?
            .into_iter()
            .rev()
            .skip(offset)
            .take(per_page)
            .map(|(game, result)| GameHistoryEntry {
                leaderboard_game_id: game.leaderboard_game_id,
                contest_id: game.contest_id,
                placement: result.placement,
                display_score_change: result.display_score_change,
                mu_before: result.mu_before,
                mu_after: result.mu_after,
                sigma_before: result.sigma_before,
                sigma_after: result.sigma_after,
                game_created_at: game.created_at,
            })
            .collect())
    }

    /// Display score after each contest, oldest first, limited to the most
    /// recent `history_cap` points
    pub fn rating_history(
        &self,
        leaderboard_id: LeaderboardId,
        entrant_id: EntrantId,
    ) -> Result<Vec<RatingPoint>> {
        let entry = self.entry_for(leaderboard_id, entrant_id)?;
        let results = self.store.results_for_entry(entry.leaderboard_entry_id)?;
        let skip = results.len().saturating_sub(self.history_cap);

        Ok(results
            .into_iter()
            .skip(skip)
            .map(|(game, result)| RatingPoint {
                display_score_after: self
                    .model
                    .display_score(&Belief::new(result.mu_after, result.sigma_after)),
                game_created_at: game.created_at,
            })
            .collect())
    }

    /// Every leaderboard an entrant has joined, best score first
    pub fn entries_for_entrant(&self, entrant_id: EntrantId) -> Result<Vec<EntrantLeaderboardSummary>> {
        let names: HashMap<LeaderboardId, String> = self
            .store
            .list_leaderboards()?
            .into_iter()
            .map(|leaderboard| (leaderboard.leaderboard_id, leaderboard.name))
            .collect();

        let mut summaries: Vec<EntrantLeaderboardSummary> = self
            .store
            .entries_for_entrant(entrant_id)?
            .into_iter()
            .map(|entry| EntrantLeaderboardSummary {
                leaderboard_entry_id: entry.leaderboard_entry_id,
                leaderboard_id: entry.leaderboard_id,
                leaderboard_name: names
                    .get(&entry.leaderboard_id)
                    .cloned()
                    .unwrap_or_default(),
                display_score: entry.display_score,
                games_played: entry.games_played,
                first_place_finishes: entry.first_place_finishes,
                non_first_finishes: entry.non_first_finishes,
                active: entry.is_active(),
            })
            .collect();

        summaries.sort_by(|a, b| b.display_score.total_cmp(&a.display_score));
        Ok(summaries)
    }

    pub fn leaderboard_status(&self, leaderboard_id: LeaderboardId) -> Result<LeaderboardStatus> {
        self.require_leaderboard(leaderboard_id)?;
        self.store.leaderboard_status(leaderboard_id)
    }

    /// Most recent rating changes across a leaderboard, newest first
    pub fn activity_feed(
        &self,
        leaderboard_id: LeaderboardId,
        limit: usize,
    ) -> Result<Vec<ActivityFeedEntry>> {
        self.require_leaderboard(leaderboard_id)?;

        Ok(self
            .store
            .games_for_leaderboard(leaderboard_id)?
            .into_iter()
            .rev()
            .flat_map(|recorded| {
                let contest_id = recorded.game.contest_id;
                recorded
                    .results
                    .into_iter()
                    .map(move |result| ActivityFeedEntry {
                        leaderboard_entry_id: result.leaderboard_entry_id,
                        entrant_id: result.entrant_id,
                        contest_id,
                        placement: result.placement,
                        display_score_change: result.display_score_change,
                        created_at: result.created_at,
                    })
            })
            .take(limit)
            .collect())
    }
}
