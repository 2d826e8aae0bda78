//! Committed leaderboard state
//!
//! This module defines the interface for persisting leaderboards, entries,
//! ingested contests and their audit rows, with an in-memory implementation.
//! A contest is committed through a single call so that the game link, every
//! entry update and every audit row land together or not at all.

use crate::error::{LeaderboardError, Result};
use crate::types::{
    ContestId, EntrantId, EntryId, Leaderboard, LeaderboardEntry, LeaderboardGame,
    LeaderboardGameId, LeaderboardGameResult, LeaderboardId, LeaderboardStatus,
};
use crate::utils::{current_timestamp, generate_id};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

/// An ingested contest together with its audit rows
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecordedGame {
    pub game: LeaderboardGame,
    /// Ordered by placement, then entry id
    pub results: Vec<LeaderboardGameResult>,
}

/// Everything one contest application writes
#[derive(Debug, Clone)]
pub struct ContestCommit {
    pub game: LeaderboardGame,
    /// Entries with their new belief, counters and display score
    pub entries: Vec<LeaderboardEntry>,
    pub results: Vec<LeaderboardGameResult>,
}

/// What `commit_contest` did
#[derive(Debug, Clone, PartialEq)]
pub enum CommitOutcome {
    Committed(RecordedGame),
    /// The contest was already recorded for this leaderboard; nothing changed
    AlreadyRecorded(RecordedGame),
}

/// Trait for leaderboard state storage operations
#[cfg_attr(test, mockall::automock)]
pub trait LeaderboardStore: Send + Sync {
    /// Register a new, active leaderboard
    fn create_leaderboard(&self, name: &str) -> Result<Leaderboard>;

    /// Disable or re-enable a leaderboard
    fn set_leaderboard_disabled(
        &self,
        leaderboard_id: LeaderboardId,
        disabled: bool,
    ) -> Result<Leaderboard>;

    fn get_leaderboard(&self, leaderboard_id: LeaderboardId) -> Result<Option<Leaderboard>>;

    /// All leaderboards in creation order
    fn list_leaderboards(&self) -> Result<Vec<Leaderboard>>;

    /// The entry for (leaderboard, entrant), active or disabled
    fn get_entry(
        &self,
        leaderboard_id: LeaderboardId,
        entrant_id: EntrantId,
    ) -> Result<Option<LeaderboardEntry>>;

    /// Insert a new entry; fails if the (leaderboard, entrant) pair exists
    /// or the leaderboard is missing or disabled.
    /// The store assigns `creation_seq`.
    fn insert_entry(&self, entry: LeaderboardEntry) -> Result<LeaderboardEntry>;

    /// Set or clear an entry's `disabled_at`, keeping everything else.
    /// Clearing it requires the entry's leaderboard to be active.
    fn set_entry_disabled(
        &self,
        entry_id: EntryId,
        disabled_at: Option<DateTime<Utc>>,
    ) -> Result<LeaderboardEntry>;

    /// Consistent snapshot of every entry on a leaderboard
    fn entries_for_leaderboard(&self, leaderboard_id: LeaderboardId)
        -> Result<Vec<LeaderboardEntry>>;

    /// Every entry an entrant holds, across leaderboards
    fn entries_for_entrant(&self, entrant_id: EntrantId) -> Result<Vec<LeaderboardEntry>>;

    fn find_game(
        &self,
        leaderboard_id: LeaderboardId,
        contest_id: ContestId,
    ) -> Result<Option<RecordedGame>>;

    /// Atomically record a contest, or report the prior record if the
    /// contest was already ingested for this leaderboard
    fn commit_contest(&self, commit: ContestCommit) -> Result<CommitOutcome>;

    /// Audit rows for an entry with their games, oldest first
    fn results_for_entry(
        &self,
        entry_id: EntryId,
    ) -> Result<Vec<(LeaderboardGame, LeaderboardGameResult)>>;

    /// Ingested contests of a leaderboard, oldest first
    fn games_for_leaderboard(&self, leaderboard_id: LeaderboardId) -> Result<Vec<RecordedGame>>;

    /// Game count, latest game time and active entry count from one snapshot
    fn leaderboard_status(&self, leaderboard_id: LeaderboardId) -> Result<LeaderboardStatus>;
}

#[derive(Debug, Default)]
struct StoreState {
    leaderboards: HashMap<LeaderboardId, Leaderboard>,
    leaderboard_order: Vec<LeaderboardId>,
    entries: HashMap<EntryId, LeaderboardEntry>,
    entry_index: HashMap<(LeaderboardId, EntrantId), EntryId>,
    games: HashMap<LeaderboardGameId, LeaderboardGame>,
    game_order: Vec<LeaderboardGameId>,
    game_index: HashMap<(LeaderboardId, ContestId), LeaderboardGameId>,
    /// Append-only audit rows
    results: Vec<LeaderboardGameResult>,
    result_keys: HashSet<(LeaderboardGameId, EntryId)>,
    next_seq: u64,
}

impl StoreState {
    fn require_open_leaderboard(&self, leaderboard_id: LeaderboardId) -> Result<()> {
        match self.leaderboards.get(&leaderboard_id) {
            Some(leaderboard) if leaderboard.is_active() => Ok(()),
            Some(_) => Err(LeaderboardError::LeaderboardDisabled {
                leaderboard_id: leaderboard_id.to_string(),
            }
            .into()),
            None => Err(LeaderboardError::LeaderboardNotFound {
                leaderboard_id: leaderboard_id.to_string(),
            }
            .into()),
        }
    }

    fn recorded_game(&self, game_id: LeaderboardGameId) -> Option<RecordedGame> {
        let game = self.games.get(&game_id)?.clone();
        let mut results: Vec<LeaderboardGameResult> = self
            .results
            .iter()
            .filter(|r| r.leaderboard_game_id == game_id)
            .cloned()
            .collect();
        results.sort_by(|a, b| {
            a.placement
                .cmp(&b.placement)
                .then(a.leaderboard_entry_id.cmp(&b.leaderboard_entry_id))
        });
        Some(RecordedGame { game, results })
    }

    /// Check a commit against current state without mutating anything
    fn check_commit(&self, commit: &ContestCommit) -> Result<()> {
        let game_id = commit.game.leaderboard_game_id;
        if commit.entries.len() != commit.results.len() {
            return Err(LeaderboardError::InternalError {
                message: format!(
                    "commit for game {} has {} entries but {} results",
                    game_id,
                    commit.entries.len(),
                    commit.results.len()
                ),
            }
            .into());
        }

        let mut keys = HashSet::with_capacity(commit.results.len());
        for (entry, result) in commit.entries.iter().zip(&commit.results) {
            let stored = self
                .entries
                .get(&entry.leaderboard_entry_id)
                .ok_or_else(|| LeaderboardError::InternalError {
                    message: format!("entry {} does not exist", entry.leaderboard_entry_id),
                })?;

            if result.leaderboard_entry_id != entry.leaderboard_entry_id
                || result.leaderboard_game_id != game_id
                || stored.leaderboard_id != commit.game.leaderboard_id
            {
                return Err(LeaderboardError::InternalError {
                    message: format!(
                        "result for entry {} does not match its game or entry",
                        entry.leaderboard_entry_id
                    ),
                }
                .into());
            }

            // The update must have been computed from the committed prior
            if stored.games_played + 1 != entry.games_played
                || stored.belief.mu != result.mu_before
                || stored.belief.sigma != result.sigma_before
            {
                return Err(LeaderboardError::InternalError {
                    message: format!(
                        "entry {} changed since its prior was read",
                        entry.leaderboard_entry_id
                    ),
                }
                .into());
            }

            let key = (game_id, entry.leaderboard_entry_id);
            if !keys.insert(key) || self.result_keys.contains(&key) {
                return Err(LeaderboardError::InternalError {
                    message: format!(
                        "duplicate audit row for entry {} in game {}",
                        entry.leaderboard_entry_id, game_id
                    ),
                }
                .into());
            }
        }

        Ok(())
    }
}

/// In-memory leaderboard store
#[derive(Debug, Default)]
pub struct InMemoryLeaderboardStore {
    state: RwLock<StoreState>,
}

impl InMemoryLeaderboardStore {
    /// Create a new, empty in-memory store
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, StoreState>> {
        self.state.read().map_err(|_| {
            LeaderboardError::InternalError {
                message: "Failed to acquire store read lock".to_string(),
            }
            .into()
        })
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, StoreState>> {
        self.state.write().map_err(|_| {
            LeaderboardError::InternalError {
                message: "Failed to acquire store write lock".to_string(),
            }
            .into()
        })
    }
}

impl LeaderboardStore for InMemoryLeaderboardStore {
    fn create_leaderboard(&self, name: &str) -> Result<Leaderboard> {
        let leaderboard = Leaderboard {
            leaderboard_id: generate_id(),
            name: name.to_string(),
            disabled_at: None,
            created_at: current_timestamp(),
        };

        let mut state = self.write()?;
        state
            .leaderboards
            .insert(leaderboard.leaderboard_id, leaderboard.clone());
        state.leaderboard_order.push(leaderboard.leaderboard_id);

        Ok(leaderboard)
    }

    fn set_leaderboard_disabled(
        &self,
        leaderboard_id: LeaderboardId,
        disabled: bool,
    ) -> Result<Leaderboard> {
        let mut state = self.write()?;
        let leaderboard = state.leaderboards.get_mut(&leaderboard_id).ok_or_else(|| {
            LeaderboardError::LeaderboardNotFound {
                leaderboard_id: leaderboard_id.to_string(),
            }
        })?;

        leaderboard.disabled_at = match (disabled, leaderboard.disabled_at) {
            (true, Some(at)) => Some(at),
            (true, None) => Some(current_timestamp()),
            (false, _) => None,
        };

        Ok(leaderboard.clone())
    }

    fn get_leaderboard(&self, leaderboard_id: LeaderboardId) -> Result<Option<Leaderboard>> {
        let state = self.read()?;
        Ok(state.leaderboards.get(&leaderboard_id).cloned())
    }

    fn list_leaderboards(&self) -> Result<Vec<Leaderboard>> {
        let state = self.read()?;
        Ok(state
            .leaderboard_order
            .iter()
            .filter_map(|id| state.leaderboards.get(id).cloned())
            .collect())
    }

    fn get_entry(
        &self,
        leaderboard_id: LeaderboardId,
        entrant_id: EntrantId,
    ) -> Result<Option<LeaderboardEntry>> {
        let state = self.read()?;
        Ok(state
            .entry_index
            .get(&(leaderboard_id, entrant_id))
            .and_then(|id| state.entries.get(id))
            .cloned())
    }

    fn insert_entry(&self, mut entry: LeaderboardEntry) -> Result<LeaderboardEntry> {
        let mut state = self.write()?;
        state.require_open_leaderboard(entry.leaderboard_id)?;
        let key = (entry.leaderboard_id, entry.entrant_id);

        if state.entry_index.contains_key(&key) {
            return Err(LeaderboardError::InternalError {
                message: format!(
                    "entry for entrant {} on leaderboard {} already exists",
                    entry.entrant_id, entry.leaderboard_id
                ),
            }
            .into());
        }

        entry.creation_seq = state.next_seq;
        state.next_seq += 1;
        state.entry_index.insert(key, entry.leaderboard_entry_id);
        state
            .entries
            .insert(entry.leaderboard_entry_id, entry.clone());

        Ok(entry)
    }

    fn set_entry_disabled(
        &self,
        entry_id: EntryId,
        disabled_at: Option<DateTime<Utc>>,
    ) -> Result<LeaderboardEntry> {
        let mut state = self.write()?;
        let leaderboard_id = state
            .entries
            .get(&entry_id)
            .map(|entry| entry.leaderboard_id)
            .ok_or_else(|| LeaderboardError::InternalError {
                message: format!("entry {} does not exist", entry_id),
            })?;
        if disabled_at.is_none() {
            state.require_open_leaderboard(leaderboard_id)?;
        }

        let entry = state
            .entries
            .get_mut(&entry_id)
            .ok_or_else(|| LeaderboardError::InternalError {
                message: format!("entry {} does not exist", entry_id),
            })?;
        entry.disabled_at = disabled_at;
        entry.updated_at = current_timestamp();

        Ok(entry.clone())
    }

    fn entries_for_leaderboard(
        &self,
        leaderboard_id: LeaderboardId,
    ) -> Result<Vec<LeaderboardEntry>> {
        let state = self.read()?;
        let mut entries: Vec<LeaderboardEntry> = state
            .entries
            .values()
            .filter(|entry| entry.leaderboard_id == leaderboard_id)
            .cloned()
            .collect();
        entries.sort_by_key(|entry| entry.creation_seq);

        Ok(entries)
    }

    fn entries_for_entrant(&self, entrant_id: EntrantId) -> Result<Vec<LeaderboardEntry>> {
        let state = self.read()?;
        let mut entries: Vec<LeaderboardEntry> = state
            .entries
            .values()
            .filter(|entry| entry.entrant_id == entrant_id)
            .cloned()
            .collect();
        entries.sort_by_key(|entry| entry.creation_seq);

        Ok(entries)
    }

    fn find_game(
        &self,
        leaderboard_id: LeaderboardId,
        contest_id: ContestId,
    ) -> Result<Option<RecordedGame>> {
        let state = self.read()?;
        Ok(state
            .game_index
            .get(&(leaderboard_id, contest_id))
            .and_then(|id| state.recorded_game(*id)))
    }

    fn commit_contest(&self, commit: ContestCommit) -> Result<CommitOutcome> {
        let mut state = self.write()?;
        let key = (commit.game.leaderboard_id, commit.game.contest_id);

        if let Some(existing) = state.game_index.get(&key).copied() {
            let recorded = state.recorded_game(existing).ok_or_else(|| {
                LeaderboardError::InternalError {
                    message: format!("game {} is indexed but missing", existing),
                }
            })?;
            return Ok(CommitOutcome::AlreadyRecorded(recorded));
        }

        // Validate everything before the first write
        state.check_commit(&commit)?;

        let game_id = commit.game.leaderboard_game_id;
        state.game_index.insert(key, game_id);
        state.game_order.push(game_id);
        state.games.insert(game_id, commit.game);

        for entry in commit.entries {
            state.entries.insert(entry.leaderboard_entry_id, entry);
        }
        for result in commit.results {
            state
                .result_keys
                .insert((result.leaderboard_game_id, result.leaderboard_entry_id));
            state.results.push(result);
        }

        let recorded = state.recorded_game(game_id).ok_or_else(|| {
            LeaderboardError::InternalError {
                message: format!("game {} vanished during commit", game_id),
            }
        })?;
        Ok(CommitOutcome::Committed(recorded))
    }

    fn results_for_entry(
        &self,
        entry_id: EntryId,
    ) -> Result<Vec<(LeaderboardGame, LeaderboardGameResult)>> {
        let state = self.read()?;
        Ok(state
            .results
            .iter()
            .filter(|result| result.leaderboard_entry_id == entry_id)
            .filter_map(|result| {
                state
                    .games
                    .get(&result.leaderboard_game_id)
                    .map(|game| (game.clone(), result.clone()))
            })
            .collect())
    }

    fn games_for_leaderboard(&self, leaderboard_id: LeaderboardId) -> Result<Vec<RecordedGame>> {
        let state = self.read()?;
        Ok(state
            .game_order
            .iter()
            .filter(|id| {
                state
                    .games
                    .get(id)
                    .map(|game| game.leaderboard_id == leaderboard_id)
                    .unwrap_or(false)
            })
            .filter_map(|id| state.recorded_game(*id))
            .collect())
    }

    fn leaderboard_status(&self, leaderboard_id: LeaderboardId) -> Result<LeaderboardStatus> {
        let state = self.read()?;
        if !state.leaderboards.contains_key(&leaderboard_id) {
            return Err(LeaderboardError::LeaderboardNotFound {
                leaderboard_id: leaderboard_id.to_string(),
            }
            .into());
        }

        let mut total_games = 0;
        let mut last_game_created_at = None;
        for game in state
            .game_order
            .iter()
            .filter_map(|id| state.games.get(id))
            .filter(|game| game.leaderboard_id == leaderboard_id)
        {
            total_games += 1;
            last_game_created_at = Some(game.created_at);
        }

        let active_entries = state
            .entries
            .values()
            .filter(|entry| entry.leaderboard_id == leaderboard_id && entry.is_active())
            .count();

        Ok(LeaderboardStatus {
            total_games,
            last_game_created_at,
            active_entries,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Belief;

    fn create_test_entry(leaderboard_id: LeaderboardId) -> LeaderboardEntry {
        let now = current_timestamp();
        LeaderboardEntry {
            leaderboard_entry_id: generate_id(),
            leaderboard_id,
            entrant_id: generate_id(),
            belief: Belief::default(),
            display_score: 0.001,
            games_played: 0,
            first_place_finishes: 0,
            non_first_finishes: 0,
            disabled_at: None,
            created_at: now,
            updated_at: now,
            creation_seq: 0,
        }
    }

    fn commit_for(
        leaderboard_id: LeaderboardId,
        contest_id: ContestId,
        entries: &[LeaderboardEntry],
    ) -> ContestCommit {
        let game = LeaderboardGame {
            leaderboard_game_id: generate_id(),
            leaderboard_id,
            contest_id,
            created_at: current_timestamp(),
        };

        let mut updated = Vec::new();
        let mut results = Vec::new();
        for (i, entry) in entries.iter().enumerate() {
            let mut next = entry.clone();
            next.games_played += 1;
            next.belief = Belief::new(entry.belief.mu + 1.0, entry.belief.sigma - 0.5);
            results.push(LeaderboardGameResult {
                leaderboard_game_result_id: generate_id(),
                leaderboard_game_id: game.leaderboard_game_id,
                leaderboard_entry_id: entry.leaderboard_entry_id,
                entrant_id: entry.entrant_id,
                placement: i as u32 + 1,
                mu_before: entry.belief.mu,
                mu_after: next.belief.mu,
                sigma_before: entry.belief.sigma,
                sigma_after: next.belief.sigma,
                display_score_change: 2.5,
                created_at: game.created_at,
            });
            updated.push(next);
        }

        ContestCommit {
            game,
            entries: updated,
            results,
        }
    }

    #[test]
    fn test_leaderboard_lifecycle() {
        let store = InMemoryLeaderboardStore::new();
        let leaderboard = store.create_leaderboard("standard").unwrap();
        assert!(leaderboard.is_active());

        let disabled = store
            .set_leaderboard_disabled(leaderboard.leaderboard_id, true)
            .unwrap();
        assert!(!disabled.is_active());

        let enabled = store
            .set_leaderboard_disabled(leaderboard.leaderboard_id, false)
            .unwrap();
        assert!(enabled.is_active());

        assert_eq!(store.list_leaderboards().unwrap().len(), 1);
        assert!(store.get_leaderboard(generate_id()).unwrap().is_none());
    }

    #[test]
    fn test_entry_uniqueness_and_sequence() {
        let store = InMemoryLeaderboardStore::new();
        let leaderboard = store.create_leaderboard("standard").unwrap();

        let first = store
            .insert_entry(create_test_entry(leaderboard.leaderboard_id))
            .unwrap();
        let second = store
            .insert_entry(create_test_entry(leaderboard.leaderboard_id))
            .unwrap();
        assert!(first.creation_seq < second.creation_seq);

        let mut duplicate = create_test_entry(leaderboard.leaderboard_id);
        duplicate.entrant_id = first.entrant_id;
        assert!(store.insert_entry(duplicate).is_err());

        let found = store
            .get_entry(leaderboard.leaderboard_id, first.entrant_id)
            .unwrap()
            .unwrap();
        assert_eq!(found, first);
    }

    #[test]
    fn test_commit_is_conditional_on_contest() {
        let store = InMemoryLeaderboardStore::new();
        let leaderboard = store.create_leaderboard("standard").unwrap();
        let entries: Vec<LeaderboardEntry> = (0..2)
            .map(|_| {
                store
                    .insert_entry(create_test_entry(leaderboard.leaderboard_id))
                    .unwrap()
            })
            .collect();
        let contest_id = generate_id();

        let first = store
            .commit_contest(commit_for(leaderboard.leaderboard_id, contest_id, &entries))
            .unwrap();
        let recorded = match first {
            CommitOutcome::Committed(recorded) => recorded,
            other => panic!("expected commit, got {:?}", other),
        };
        assert_eq!(recorded.results.len(), 2);

        // Second attempt at the same contest leaves state untouched
        let second = store
            .commit_contest(commit_for(leaderboard.leaderboard_id, contest_id, &entries))
            .unwrap();
        assert_eq!(second, CommitOutcome::AlreadyRecorded(recorded));

        let stored = store
            .get_entry(leaderboard.leaderboard_id, entries[0].entrant_id)
            .unwrap()
            .unwrap();
        assert_eq!(stored.games_played, 1);
        assert_eq!(store.results_for_entry(stored.leaderboard_entry_id).unwrap().len(), 1);
    }

    #[test]
    fn test_stale_commit_is_rejected_without_partial_writes() {
        let store = InMemoryLeaderboardStore::new();
        let leaderboard = store.create_leaderboard("standard").unwrap();
        let entries: Vec<LeaderboardEntry> = (0..2)
            .map(|_| {
                store
                    .insert_entry(create_test_entry(leaderboard.leaderboard_id))
                    .unwrap()
            })
            .collect();

        store
            .commit_contest(commit_for(leaderboard.leaderboard_id, generate_id(), &entries))
            .unwrap();

        // Built from the pre-contest snapshot, so its priors are stale
        let stale = commit_for(leaderboard.leaderboard_id, generate_id(), &entries);
        assert!(store.commit_contest(stale).is_err());

        assert_eq!(
            store
                .games_for_leaderboard(leaderboard.leaderboard_id)
                .unwrap()
                .len(),
            1
        );
        for entry in &entries {
            let stored = store
                .get_entry(leaderboard.leaderboard_id, entry.entrant_id)
                .unwrap()
                .unwrap();
            assert_eq!(stored.games_played, 1);
        }
    }

    #[test]
    fn test_disable_preserves_history() {
        let store = InMemoryLeaderboardStore::new();
        let leaderboard = store.create_leaderboard("standard").unwrap();
        let entry = store
            .insert_entry(create_test_entry(leaderboard.leaderboard_id))
            .unwrap();

        let disabled = store
            .set_entry_disabled(entry.leaderboard_entry_id, Some(current_timestamp()))
            .unwrap();
        assert!(!disabled.is_active());
        assert_eq!(disabled.belief, entry.belief);
        assert_eq!(disabled.creation_seq, entry.creation_seq);

        let snapshot = store
            .entries_for_leaderboard(leaderboard.leaderboard_id)
            .unwrap();
        assert_eq!(snapshot.len(), 1);
        assert_eq!(store.entries_for_entrant(entry.entrant_id).unwrap().len(), 1);
    }

    #[test]
    fn test_disabled_leaderboard_refuses_new_and_reactivated_entries() {
        let store = InMemoryLeaderboardStore::new();
        let leaderboard = store.create_leaderboard("standard").unwrap();
        let entry = store
            .insert_entry(create_test_entry(leaderboard.leaderboard_id))
            .unwrap();
        store
            .set_entry_disabled(entry.leaderboard_entry_id, Some(current_timestamp()))
            .unwrap();
        store
            .set_leaderboard_disabled(leaderboard.leaderboard_id, true)
            .unwrap();

        let err = store
            .insert_entry(create_test_entry(leaderboard.leaderboard_id))
            .unwrap_err();
        assert!(matches!(
            err.downcast_ref::<LeaderboardError>(),
            Some(LeaderboardError::LeaderboardDisabled { .. })
        ));

        let err = store
            .set_entry_disabled(entry.leaderboard_entry_id, None)
            .unwrap_err();
        assert!(matches!(
            err.downcast_ref::<LeaderboardError>(),
            Some(LeaderboardError::LeaderboardDisabled { .. })
        ));
        let stored = store
            .get_entry(leaderboard.leaderboard_id, entry.entrant_id)
            .unwrap()
            .unwrap();
        assert!(!stored.is_active());

        let err = store.insert_entry(create_test_entry(generate_id())).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<LeaderboardError>(),
            Some(LeaderboardError::LeaderboardNotFound { .. })
        ));

        // Disabling an entry stays possible on a disabled leaderboard
        store
            .set_leaderboard_disabled(leaderboard.leaderboard_id, false)
            .unwrap();
        let active = store
            .set_entry_disabled(entry.leaderboard_entry_id, None)
            .unwrap();
        store
            .set_leaderboard_disabled(leaderboard.leaderboard_id, true)
            .unwrap();
        assert!(store
            .set_entry_disabled(active.leaderboard_entry_id, Some(current_timestamp()))
            .is_ok());
    }

    #[test]
    fn test_leaderboard_status_counts_one_leaderboard() {
        let store = InMemoryLeaderboardStore::new();
        let leaderboard = store.create_leaderboard("standard").unwrap();
        let other = store.create_leaderboard("blitz").unwrap();

        let empty = store.leaderboard_status(leaderboard.leaderboard_id).unwrap();
        assert_eq!(empty, LeaderboardStatus::default());

        let entries: Vec<LeaderboardEntry> = (0..3)
            .map(|_| {
                store
                    .insert_entry(create_test_entry(leaderboard.leaderboard_id))
                    .unwrap()
            })
            .collect();
        let elsewhere = store
            .insert_entry(create_test_entry(other.leaderboard_id))
            .unwrap();
        store
            .set_entry_disabled(entries[2].leaderboard_entry_id, Some(current_timestamp()))
            .unwrap();

        store
            .commit_contest(commit_for(leaderboard.leaderboard_id, generate_id(), &entries[..2]))
            .unwrap();
        let latest = commit_for(
            other.leaderboard_id,
            generate_id(),
            std::slice::from_ref(&elsewhere),
        );
        store.commit_contest(latest).unwrap();

        let status = store.leaderboard_status(leaderboard.leaderboard_id).unwrap();
        assert_eq!(status.total_games, 1);
        assert_eq!(status.active_entries, 2);
        let games = store.games_for_leaderboard(leaderboard.leaderboard_id).unwrap();
        assert_eq!(status.last_game_created_at, Some(games[0].game.created_at));

        assert!(store.leaderboard_status(generate_id()).is_err());
    }
}
