//! Leaderboard entry state: storage, locking, the single writer and the
//! read-side ranking queries

pub mod locks;
pub mod rankings;
pub mod storage;
pub mod tracker;

pub use locks::{EntryLockGuard, EntryLockTable};
pub use rankings::{RankingClassifier, MIN_GAMES_FOR_RANKING};
pub use storage::{
    CommitOutcome, ContestCommit, InMemoryLeaderboardStore, LeaderboardStore, RecordedGame,
};
pub use tracker::EntryStateTracker;
