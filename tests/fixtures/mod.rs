//! Test fixtures and store wrappers for integration testing

#![allow(dead_code)]

use chrono::{DateTime, Utc};
use leaderboard_engine::config::AppConfig;
use leaderboard_engine::error::{classify, Result};
use leaderboard_engine::ledger::{
    CommitOutcome, ContestCommit, InMemoryLeaderboardStore, LeaderboardStore, RecordedGame,
};
use leaderboard_engine::service::AllowAllEntrants;
use leaderboard_engine::types::{
    ContestId, ContestPlacement, EntrantId, EntryId, Leaderboard, LeaderboardEntry,
    LeaderboardGame, LeaderboardGameResult, LeaderboardId, LeaderboardStatus,
};
use leaderboard_engine::utils::generate_id;
use leaderboard_engine::AppState;
use std::sync::Arc;
use std::time::Duration;

/// Engine plus one fresh leaderboard
pub struct TestEngine {
    pub app: Arc<AppState>,
    pub leaderboard_id: LeaderboardId,
}

impl TestEngine {
    pub fn new() -> Self {
        Self::with_config(test_config())
    }

    pub fn with_config(config: AppConfig) -> Self {
        let app = Arc::new(AppState::new(config).unwrap());
        let leaderboard_id = app.create_leaderboard("integration").unwrap().leaderboard_id;
        Self {
            app,
            leaderboard_id,
        }
    }

    pub fn with_store(config: AppConfig, store: Arc<dyn LeaderboardStore>) -> Self {
        let app = Arc::new(
            AppState::with_components(config, store, Arc::new(AllowAllEntrants)).unwrap(),
        );
        let leaderboard_id = app.create_leaderboard("integration").unwrap().leaderboard_id;
        Self {
            app,
            leaderboard_id,
        }
    }

    /// Opt in `count` new entrants, returned in opt-in order
    pub async fn entrants(&self, count: usize) -> Vec<EntrantId> {
        let mut entrants = Vec::with_capacity(count);
        for _ in 0..count {
            let entrant_id = generate_id();
            self.app
                .opt_in(self.leaderboard_id, entrant_id)
                .await
                .unwrap();
            entrants.push(entrant_id);
        }
        entrants
    }

    /// Apply a contest under a fresh contest id, finishing in list order
    pub async fn play(&self, entrants: &[EntrantId]) -> ContestId {
        let contest_id = generate_id();
        self.app
            .apply_contest_result(self.leaderboard_id, contest_id, &ordered_roster(entrants))
            .await
            .unwrap();
        contest_id
    }

    pub fn entry(&self, entrant_id: EntrantId) -> leaderboard_engine::types::EntryView {
        self.app.get_entry(self.leaderboard_id, entrant_id).unwrap()
    }
}

pub fn test_config() -> AppConfig {
    let mut config = AppConfig::default();
    config.ledger.lock_timeout_ms = 1000;
    config
}

/// Roster where entrants finish in the given order, no ties
pub fn ordered_roster(entrants: &[EntrantId]) -> Vec<ContestPlacement> {
    entrants
        .iter()
        .enumerate()
        .map(|(i, entrant_id)| ContestPlacement {
            entrant_id: *entrant_id,
            placement: i as u32 + 1,
        })
        .collect()
}

pub fn roster(placements: &[(EntrantId, u32)]) -> Vec<ContestPlacement> {
    placements
        .iter()
        .map(|(entrant_id, placement)| ContestPlacement {
            entrant_id: *entrant_id,
            placement: *placement,
        })
        .collect()
}

/// Error kind label of a typed engine error
pub fn kind_of(err: &anyhow::Error) -> Option<&'static str> {
    classify(err).map(|e| e.kind())
}

/// Store wrapper that holds every contest commit for a fixed delay, so a
/// write keeps its entry locks long enough for others to contend
pub struct SlowCommitStore {
    inner: InMemoryLeaderboardStore,
    delay: Duration,
}

impl SlowCommitStore {
    pub fn new(delay: Duration) -> Self {
        Self {
            inner: InMemoryLeaderboardStore::new(),
            delay,
        }
    }
}

impl LeaderboardStore for SlowCommitStore {
    fn create_leaderboard(&self, name: &str) -> Result<Leaderboard> {
        self.inner.create_leaderboard(name)
    }

    fn set_leaderboard_disabled(
        &self,
        leaderboard_id: LeaderboardId,
        disabled: bool,
    ) -> Result<Leaderboard> {
        self.inner.set_leaderboard_disabled(leaderboard_id, disabled)
    }

    fn get_leaderboard(&self, leaderboard_id: LeaderboardId) -> Result<Option<Leaderboard>> {
        self.inner.get_leaderboard(leaderboard_id)
    }

    fn list_leaderboards(&self) -> Result<Vec<Leaderboard>> {
        self.inner.list_leaderboards()
    }

    fn get_entry(
        &self,
        leaderboard_id: LeaderboardId,
        entrant_id: EntrantId,
    ) -> Result<Option<LeaderboardEntry>> {
        self.inner.get_entry(leaderboard_id, entrant_id)
    }

    fn insert_entry(&self, entry: LeaderboardEntry) -> Result<LeaderboardEntry> {
        self.inner.insert_entry(entry)
    }

    fn set_entry_disabled(
        &self,
        entry_id: EntryId,
        disabled_at: Option<DateTime<Utc>>,
    ) -> Result<LeaderboardEntry> {
        self.inner.set_entry_disabled(entry_id, disabled_at)
    }

    fn entries_for_leaderboard(
        &self,
        leaderboard_id: LeaderboardId,
    ) -> Result<Vec<LeaderboardEntry>> {
        self.inner.entries_for_leaderboard(leaderboard_id)
    }

    fn entries_for_entrant(&self, entrant_id: EntrantId) -> Result<Vec<LeaderboardEntry>> {
        self.inner.entries_for_entrant(entrant_id)
    }

    fn find_game(
        &self,
        leaderboard_id: LeaderboardId,
        contest_id: ContestId,
    ) -> Result<Option<RecordedGame>> {
        self.inner.find_game(leaderboard_id, contest_id)
    }

    fn commit_contest(&self, commit: ContestCommit) -> Result<CommitOutcome> {
        std::thread::sleep(self.delay);
        self.inner.commit_contest(commit)
    }

    fn results_for_entry(
        &self,
        entry_id: EntryId,
    ) -> Result<Vec<(LeaderboardGame, LeaderboardGameResult)>> {
        self.inner.results_for_entry(entry_id)
    }

    fn games_for_leaderboard(&self, leaderboard_id: LeaderboardId) -> Result<Vec<RecordedGame>> {
        self.inner.games_for_leaderboard(leaderboard_id)
    }

    fn leaderboard_status(&self, leaderboard_id: LeaderboardId) -> Result<LeaderboardStatus> {
        self.inner.leaderboard_status(leaderboard_id)
    }
}
