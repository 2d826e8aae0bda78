//! Common types used throughout the leaderboard engine

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use skillratings::weng_lin::WengLinRating;
use uuid::Uuid;

/// Unique identifier for leaderboards
pub type LeaderboardId = Uuid;

/// Unique identifier for competing entrants (registered automated players)
pub type EntrantId = Uuid;

/// Unique identifier for a leaderboard entry
pub type EntryId = Uuid;

/// Externally sourced identifier of a finished contest
pub type ContestId = Uuid;

/// Unique identifier for the link between a contest and a leaderboard
pub type LeaderboardGameId = Uuid;

/// Unique identifier for a single audit row
pub type GameResultId = Uuid;

/// Gaussian skill estimate for one entrant on one leaderboard
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Belief {
    pub mu: f64,
    pub sigma: f64,
}

impl Belief {
    pub const INITIAL_MU: f64 = 25.0;
    pub const INITIAL_SIGMA: f64 = 8.333;

    pub fn new(mu: f64, sigma: f64) -> Self {
        Self { mu, sigma }
    }

    /// Finite mean and a strictly positive, finite deviation
    pub fn is_valid(&self) -> bool {
        self.mu.is_finite() && self.sigma.is_finite() && self.sigma > 0.0
    }
}

impl Default for Belief {
    fn default() -> Self {
        Self {
            mu: Self::INITIAL_MU,
            sigma: Self::INITIAL_SIGMA,
        }
    }
}

impl From<WengLinRating> for Belief {
    fn from(rating: WengLinRating) -> Self {
        Self {
            mu: rating.rating,
            sigma: rating.uncertainty,
        }
    }
}

impl From<Belief> for WengLinRating {
    fn from(belief: Belief) -> Self {
        Self {
            rating: belief.mu,
            uncertainty: belief.sigma,
        }
    }
}

/// A named ranking space
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Leaderboard {
    pub leaderboard_id: LeaderboardId,
    pub name: String,
    pub disabled_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl Leaderboard {
    pub fn is_active(&self) -> bool {
        self.disabled_at.is_none()
    }
}

/// One entrant's standing on one leaderboard
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LeaderboardEntry {
    pub leaderboard_entry_id: EntryId,
    pub leaderboard_id: LeaderboardId,
    pub entrant_id: EntrantId,
    pub belief: Belief,
    pub display_score: f64,
    pub games_played: u32,
    pub first_place_finishes: u32,
    pub non_first_finishes: u32,
    pub disabled_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    /// Store-assigned insertion sequence; the stable tie-breaker for rankings
    pub creation_seq: u64,
}

impl LeaderboardEntry {
    pub fn is_active(&self) -> bool {
        self.disabled_at.is_none()
    }

    pub fn view(&self) -> EntryView {
        EntryView::from(self)
    }
}

/// Links one external finished contest to a leaderboard; its existence marks
/// the contest as ingested
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LeaderboardGame {
    pub leaderboard_game_id: LeaderboardGameId,
    pub leaderboard_id: LeaderboardId,
    pub contest_id: ContestId,
    pub created_at: DateTime<Utc>,
}

/// Immutable audit row: one per (game, entry)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LeaderboardGameResult {
    pub leaderboard_game_result_id: GameResultId,
    pub leaderboard_game_id: LeaderboardGameId,
    pub leaderboard_entry_id: EntryId,
    pub entrant_id: EntrantId,
    pub placement: u32,
    pub mu_before: f64,
    pub mu_after: f64,
    pub sigma_before: f64,
    pub sigma_after: f64,
    pub display_score_change: f64,
    pub created_at: DateTime<Utc>,
}

/// One participant's final position in a contest, as reported by the
/// contest runner
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContestPlacement {
    pub entrant_id: EntrantId,
    /// 1-indexed; equal values are ties
    pub placement: u32,
}

/// Entry as exposed to the presentation layer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntryView {
    pub leaderboard_entry_id: EntryId,
    pub entrant_id: EntrantId,
    pub mu: f64,
    pub sigma: f64,
    pub display_score: f64,
    pub games_played: u32,
    pub first_place_finishes: u32,
    pub non_first_finishes: u32,
    pub win_rate: f64,
    pub active: bool,
}

impl From<&LeaderboardEntry> for EntryView {
    fn from(entry: &LeaderboardEntry) -> Self {
        let win_rate = if entry.games_played > 0 {
            entry.first_place_finishes as f64 / entry.games_played as f64
        } else {
            0.0
        };

        Self {
            leaderboard_entry_id: entry.leaderboard_entry_id,
            entrant_id: entry.entrant_id,
            mu: entry.belief.mu,
            sigma: entry.belief.sigma,
            display_score: entry.display_score,
            games_played: entry.games_played,
            first_place_finishes: entry.first_place_finishes,
            non_first_finishes: entry.non_first_finishes,
            win_rate,
            active: entry.is_active(),
        }
    }
}

/// Audit row as exposed to the presentation layer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultAuditView {
    pub entrant_id: EntrantId,
    pub placement: u32,
    pub mu_before: f64,
    pub mu_after: f64,
    pub sigma_before: f64,
    pub sigma_after: f64,
    pub display_score_change: f64,
}

impl From<&LeaderboardGameResult> for ResultAuditView {
    fn from(result: &LeaderboardGameResult) -> Self {
        Self {
            entrant_id: result.entrant_id,
            placement: result.placement,
            mu_before: result.mu_before,
            mu_after: result.mu_after,
            sigma_before: result.sigma_before,
            sigma_after: result.sigma_after,
            display_score_change: result.display_score_change,
        }
    }
}

/// Outcome of applying a contest to a leaderboard
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContestOutcome {
    pub leaderboard_game_id: LeaderboardGameId,
    pub contest_id: ContestId,
    /// Audit rows, ordered by placement then entrant id
    pub results: Vec<ResultAuditView>,
    /// True when the contest had already been applied and nothing changed
    pub replayed: bool,
}

/// Placement/ranked partition of a leaderboard's active entries
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Rankings {
    pub placement: Vec<EntryView>,
    pub ranked: Vec<EntryView>,
}

/// A single contest in an entry's history
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameHistoryEntry {
    pub leaderboard_game_id: LeaderboardGameId,
    pub contest_id: ContestId,
    pub placement: u32,
    pub display_score_change: f64,
    pub mu_before: f64,
    pub mu_after: f64,
    pub sigma_before: f64,
    pub sigma_after: f64,
    pub game_created_at: DateTime<Utc>,
}

/// Point on an entry's rating chart
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RatingPoint {
    pub display_score_after: f64,
    pub game_created_at: DateTime<Utc>,
}

/// An entrant's participation in one leaderboard
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntrantLeaderboardSummary {
    pub leaderboard_entry_id: EntryId,
    pub leaderboard_id: LeaderboardId,
    pub leaderboard_name: String,
    pub display_score: f64,
    pub games_played: u32,
    pub first_place_finishes: u32,
    pub non_first_finishes: u32,
    pub active: bool,
}

/// Ingestion status of a leaderboard
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LeaderboardStatus {
    pub total_games: usize,
    pub last_game_created_at: Option<DateTime<Utc>>,
    pub active_entries: usize,
}

/// Recent rating change shown in a leaderboard's activity feed
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActivityFeedEntry {
    pub leaderboard_entry_id: EntryId,
    pub entrant_id: EntrantId,
    pub contest_id: ContestId,
    pub placement: u32,
    pub display_score_change: f64,
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_initial_belief() {
        let belief = Belief::default();
        assert_eq!(belief.mu, 25.0);
        assert_eq!(belief.sigma, 8.333);
        assert!(belief.is_valid());
    }

    #[test]
    fn test_belief_validity() {
        assert!(!Belief::new(25.0, 0.0).is_valid());
        assert!(!Belief::new(25.0, -1.0).is_valid());
        assert!(!Belief::new(f64::NAN, 1.0).is_valid());
        assert!(!Belief::new(25.0, f64::INFINITY).is_valid());
    }

    #[test]
    fn test_belief_weng_lin_conversion() {
        let belief = Belief::new(30.0, 4.0);
        let rating: WengLinRating = belief.into();
        assert_eq!(rating.rating, 30.0);
        assert_eq!(rating.uncertainty, 4.0);
        assert_eq!(Belief::from(rating), belief);
    }

    #[test]
    fn test_entry_view_win_rate() {
        let now = Utc::now();
        let mut entry = LeaderboardEntry {
            leaderboard_entry_id: Uuid::new_v4(),
            leaderboard_id: Uuid::new_v4(),
            entrant_id: Uuid::new_v4(),
            belief: Belief::default(),
            display_score: 0.0,
            games_played: 0,
            first_place_finishes: 0,
            non_first_finishes: 0,
            disabled_at: None,
            created_at: now,
            updated_at: now,
            creation_seq: 0,
        };

        assert_eq!(entry.view().win_rate, 0.0);

        entry.games_played = 4;
        entry.first_place_finishes = 1;
        entry.non_first_finishes = 3;
        let view = entry.view();
        assert_eq!(view.win_rate, 0.25);
        assert!(view.active);
    }
}
