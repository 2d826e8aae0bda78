//! Error types for the leaderboard engine
//!
//! Operations return `anyhow` results; the typed `LeaderboardError` carried
//! inside lets callers tell validation, state conflicts, transient lock
//! failures and invariant violations apart.

/// Result type alias for convenience
pub type Result<T> = anyhow::Result<T>;

/// Custom error types for specific leaderboard scenarios
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum LeaderboardError {
    #[error("Leaderboard not found: {leaderboard_id}")]
    LeaderboardNotFound { leaderboard_id: String },

    #[error("Leaderboard is disabled: {leaderboard_id}")]
    LeaderboardDisabled { leaderboard_id: String },

    #[error("Entrant {entrant_id} already has an active entry on leaderboard {leaderboard_id}")]
    AlreadyActive {
        leaderboard_id: String,
        entrant_id: String,
    },

    #[error("Entrant is not eligible to join leaderboards: {entrant_id}")]
    EntrantNotEligible { entrant_id: String },

    #[error("No active entry for entrant {entrant_id} on leaderboard {leaderboard_id}")]
    EntryNotFound {
        leaderboard_id: String,
        entrant_id: String,
    },

    #[error("Invalid roster: {reason}")]
    InvalidRoster { reason: String },

    #[error("Entrant has no active entry on this leaderboard: {entrant_id}")]
    UnknownEntrant { entrant_id: String },

    #[error("Timed out acquiring entry locks after {waited_ms}ms")]
    LockTimeout { waited_ms: u64 },

    #[error("Rating invariant violated: {reason}")]
    InvariantViolation { reason: String },

    #[error("Configuration error: {message}")]
    ConfigurationError { message: String },

    #[error("Internal service error: {message}")]
    InternalError { message: String },
}

impl LeaderboardError {
    /// Whether the caller may retry the whole operation unchanged
    pub fn is_retryable(&self) -> bool {
        matches!(self, LeaderboardError::LockTimeout { .. })
    }

    /// Short label used for metrics and log fields
    pub fn kind(&self) -> &'static str {
        match self {
            LeaderboardError::LeaderboardNotFound { .. } => "leaderboard_not_found",
            LeaderboardError::LeaderboardDisabled { .. } => "leaderboard_disabled",
            LeaderboardError::AlreadyActive { .. } => "already_active",
            LeaderboardError::EntrantNotEligible { .. } => "entrant_not_eligible",
            LeaderboardError::EntryNotFound { .. } => "entry_not_found",
            LeaderboardError::InvalidRoster { .. } => "invalid_roster",
            LeaderboardError::UnknownEntrant { .. } => "unknown_entrant",
            LeaderboardError::LockTimeout { .. } => "lock_timeout",
            LeaderboardError::InvariantViolation { .. } => "invariant_violation",
            LeaderboardError::ConfigurationError { .. } => "configuration",
            LeaderboardError::InternalError { .. } => "internal",
        }
    }
}

/// Find the typed leaderboard error inside an `anyhow` chain, if any
pub fn classify(error: &anyhow::Error) -> Option<&LeaderboardError> {
    error.downcast_ref::<LeaderboardError>()
}
