//! Entry state tracker
//!
//! The only writer of leaderboard entries. Handles opt-in/opt-out and the
//! contest write path: validate, lock the roster's entries, resolve, then
//! commit the game link, entry updates and audit rows in one store call.

use crate::error::{classify, LeaderboardError, Result};
use crate::ledger::locks::EntryLockTable;
use crate::ledger::storage::{CommitOutcome, ContestCommit, LeaderboardStore, RecordedGame};
use crate::metrics::MetricsCollector;
use crate::rating::resolver::{validate_roster, PlacementResolver, RosterSlot};
use crate::types::{
    ContestId, ContestOutcome, ContestPlacement, EntrantId, Leaderboard, LeaderboardEntry,
    LeaderboardGame, LeaderboardGameResult, LeaderboardId, ResultAuditView,
};
use crate::utils::{current_timestamp, generate_id};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Owns all mutation of leaderboard entries
#[derive(Clone)]
pub struct EntryStateTracker {
    store: Arc<dyn LeaderboardStore>,
    resolver: PlacementResolver,
    locks: Arc<EntryLockTable>,
    metrics_collector: Arc<MetricsCollector>,
}

impl EntryStateTracker {
    pub fn new(
        store: Arc<dyn LeaderboardStore>,
        resolver: PlacementResolver,
        lock_timeout: Duration,
        metrics_collector: Arc<MetricsCollector>,
    ) -> Self {
        Self {
            store,
            resolver,
            locks: Arc::new(EntryLockTable::new(lock_timeout)),
            metrics_collector,
        }
    }

    pub fn store(&self) -> &Arc<dyn LeaderboardStore> {
        &self.store
    }

    fn require_leaderboard(&self, leaderboard_id: LeaderboardId) -> Result<Leaderboard> {
        self.store.get_leaderboard(leaderboard_id)?.ok_or_else(|| {
            LeaderboardError::LeaderboardNotFound {
                leaderboard_id: leaderboard_id.to_string(),
            }
            .into()
        })
    }

    fn require_active_leaderboard(&self, leaderboard_id: LeaderboardId) -> Result<()> {
        if self.require_leaderboard(leaderboard_id)?.is_active() {
            Ok(())
        } else {
            Err(LeaderboardError::LeaderboardDisabled {
                leaderboard_id: leaderboard_id.to_string(),
            }
            .into())
        }
    }

    /// Join a leaderboard, reactivating a previously disabled entry in place
    pub async fn opt_in(
        &self,
        leaderboard_id: LeaderboardId,
        entrant_id: EntrantId,
    ) -> Result<LeaderboardEntry> {
        self.require_active_leaderboard(leaderboard_id)?;

        let _guard = self.locks.lock_one(leaderboard_id, entrant_id).await?;

        // The leaderboard may have been disabled while this call waited
        self.require_active_leaderboard(leaderboard_id)?;

        let entry = match self.store.get_entry(leaderboard_id, entrant_id)? {
            Some(entry) if entry.is_active() => {
                return Err(LeaderboardError::AlreadyActive {
                    leaderboard_id: leaderboard_id.to_string(),
                    entrant_id: entrant_id.to_string(),
                }
                .into());
            }
            Some(entry) => {
                let entry = self
                    .store
                    .set_entry_disabled(entry.leaderboard_entry_id, None)?;
                info!(
                    leaderboard_id = %leaderboard_id,
                    entrant_id = %entrant_id,
                    games_played = entry.games_played,
                    "Reactivated leaderboard entry"
                );
                entry
            }
            None => {
                let model = self.resolver.model();
                let belief = model.initial_belief();
                let now = current_timestamp();
                let entry = self.store.insert_entry(LeaderboardEntry {
                    leaderboard_entry_id: generate_id(),
                    leaderboard_id,
                    entrant_id,
                    belief,
                    display_score: model.display_score(&belief),
                    games_played: 0,
                    first_place_finishes: 0,
                    non_first_finishes: 0,
                    disabled_at: None,
                    created_at: now,
                    updated_at: now,
                    creation_seq: 0,
                })?;
                info!(
                    leaderboard_id = %leaderboard_id,
                    entrant_id = %entrant_id,
                    entry_id = %entry.leaderboard_entry_id,
                    "Created leaderboard entry"
                );
                entry
            }
        };

        self.metrics_collector.record_opt_in();
        Ok(entry)
    }

    /// Leave a leaderboard; the entry is disabled, never deleted
    pub async fn opt_out(&self, leaderboard_id: LeaderboardId, entrant_id: EntrantId) -> Result<()> {
        let _guard = self.locks.lock_one(leaderboard_id, entrant_id).await?;

        let entry = self
            .store
            .get_entry(leaderboard_id, entrant_id)?
            .filter(|entry| entry.is_active())
            .ok_or_else(|| LeaderboardError::EntryNotFound {
                leaderboard_id: leaderboard_id.to_string(),
                entrant_id: entrant_id.to_string(),
            })?;

        self.store
            .set_entry_disabled(entry.leaderboard_entry_id, Some(current_timestamp()))?;

        info!(
            leaderboard_id = %leaderboard_id,
            entrant_id = %entrant_id,
            entry_id = %entry.leaderboard_entry_id,
            "Disabled leaderboard entry"
        );
        self.metrics_collector.record_opt_out();
        Ok(())
    }

    /// Apply a finished contest's placements exactly once
    ///
    /// Re-submitting an already applied contest returns the recorded outcome
    /// with `replayed = true` and changes nothing.
    pub async fn apply_contest_result(
        &self,
        leaderboard_id: LeaderboardId,
        contest_id: ContestId,
        roster: &[ContestPlacement],
    ) -> Result<ContestOutcome> {
        let timer = self.metrics_collector.start_timer();

        match self
            .apply_contest_result_inner(leaderboard_id, contest_id, roster)
            .await
        {
            Ok(outcome) => {
                self.metrics_collector
                    .record_contest_applied(outcome.replayed, timer.stop());
                Ok(outcome)
            }
            Err(e) => {
                let kind = classify(&e).map(|e| e.kind()).unwrap_or("internal");
                warn!(
                    leaderboard_id = %leaderboard_id,
                    contest_id = %contest_id,
                    reason = kind,
                    "Contest result rejected: {}",
                    e
                );
                self.metrics_collector.record_contest_rejected(kind);
                Err(e)
            }
        }
    }

    async fn apply_contest_result_inner(
        &self,
        leaderboard_id: LeaderboardId,
        contest_id: ContestId,
        roster: &[ContestPlacement],
    ) -> Result<ContestOutcome> {
        validate_roster(roster)?;
        self.require_leaderboard(leaderboard_id)?;

        // Fast path for redelivered results
        if let Some(recorded) = self.store.find_game(leaderboard_id, contest_id)? {
            info!(
                leaderboard_id = %leaderboard_id,
                contest_id = %contest_id,
                "Contest already applied, returning recorded outcome"
            );
            return Ok(outcome_of(recorded, true));
        }

        let entrant_ids: Vec<EntrantId> = roster.iter().map(|slot| slot.entrant_id).collect();
        let _guard = self.locks.lock_all(leaderboard_id, &entrant_ids).await?;

        // Authoritative check now that no other write can touch these entries
        if let Some(recorded) = self.store.find_game(leaderboard_id, contest_id)? {
            info!(
                leaderboard_id = %leaderboard_id,
                contest_id = %contest_id,
                "Contest applied concurrently, returning recorded outcome"
            );
            return Ok(outcome_of(recorded, true));
        }

        let mut slots = Vec::with_capacity(roster.len());
        for placement in roster {
            let entry = self
                .store
                .get_entry(leaderboard_id, placement.entrant_id)?
                .filter(|entry| entry.is_active())
                .ok_or_else(|| LeaderboardError::UnknownEntrant {
                    entrant_id: placement.entrant_id.to_string(),
                })?;
            slots.push(RosterSlot {
                entry,
                placement: placement.placement,
            });
        }

        let updates = self.resolver.resolve(&slots)?;

        let now = current_timestamp();
        let game = LeaderboardGame {
            leaderboard_game_id: generate_id(),
            leaderboard_id,
            contest_id,
            created_at: now,
        };

        let mut entries = Vec::with_capacity(updates.len());
        let mut results = Vec::with_capacity(updates.len());
        for update in &updates {
            let mut entry = slots
                .iter()
                .find(|slot| slot.entry.leaderboard_entry_id == update.leaderboard_entry_id)
                .map(|slot| slot.entry.clone())
                .ok_or_else(|| LeaderboardError::InternalError {
                    message: format!(
                        "resolver returned unknown entry {}",
                        update.leaderboard_entry_id
                    ),
                })?;

            entry.belief = update.posterior;
            entry.display_score = update.new_display_score;
            entry.games_played += update.games_played_increment;
            if update.is_first_place {
                entry.first_place_finishes += 1;
            } else {
                entry.non_first_finishes += 1;
            }
            entry.updated_at = now;

            results.push(LeaderboardGameResult {
                leaderboard_game_result_id: generate_id(),
                leaderboard_game_id: game.leaderboard_game_id,
                leaderboard_entry_id: update.leaderboard_entry_id,
                entrant_id: update.entrant_id,
                placement: update.placement,
                mu_before: update.prior.mu,
                mu_after: update.posterior.mu,
                sigma_before: update.prior.sigma,
                sigma_after: update.posterior.sigma,
                display_score_change: update.display_score_change,
                created_at: now,
            });
            entries.push(entry);

            debug!(
                entry_id = %update.leaderboard_entry_id,
                entrant_id = %update.entrant_id,
                placement = update.placement,
                mu = %format!("{:.2} -> {:.2}", update.prior.mu, update.posterior.mu),
                sigma = %format!("{:.2} -> {:.2}", update.prior.sigma, update.posterior.sigma),
                score_change = %format!("{:+.2}", update.display_score_change),
                "Resolved rating update"
            );
        }

        let outcome = match self.store.commit_contest(ContestCommit {
            game,
            entries,
            results,
        })? {
            CommitOutcome::Committed(recorded) => {
                info!(
                    leaderboard_id = %leaderboard_id,
                    contest_id = %contest_id,
                    leaderboard_game_id = %recorded.game.leaderboard_game_id,
                    entries_updated = recorded.results.len(),
                    "Ratings updated for contest"
                );
                outcome_of(recorded, false)
            }
            CommitOutcome::AlreadyRecorded(recorded) => {
                info!(
                    leaderboard_id = %leaderboard_id,
                    contest_id = %contest_id,
                    "Contest recorded by another writer, discarding computed update"
                );
                outcome_of(recorded, true)
            }
        };

        Ok(outcome)
    }
}

fn outcome_of(recorded: RecordedGame, replayed: bool) -> ContestOutcome {
    ContestOutcome {
        leaderboard_game_id: recorded.game.leaderboard_game_id,
        contest_id: recorded.game.contest_id,
        results: recorded.results.iter().map(ResultAuditView::from).collect(),
        replayed,
    }
}
