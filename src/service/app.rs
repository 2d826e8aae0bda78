//! Main application state and service coordination
//!
//! `AppState` wires the skill model, store, entry tracker, ranking
//! classifier, eligibility policy and metrics together and exposes the
//! engine's external operations.

use crate::config::{validate_config, AppConfig};
use crate::error::{LeaderboardError, Result};
use crate::ledger::{
    EntryStateTracker, InMemoryLeaderboardStore, LeaderboardStore, RankingClassifier,
};
use crate::metrics::MetricsCollector;
use crate::rating::{PlacementResolver, SkillModel, WengLinSkillModel};
use crate::service::eligibility::{AllowAllEntrants, EligibilityPolicy};
use crate::types::{
    ActivityFeedEntry, ContestId, ContestOutcome, ContestPlacement, EntrantId,
    EntrantLeaderboardSummary, EntryView, GameHistoryEntry, Leaderboard, LeaderboardId,
    LeaderboardStatus, RatingPoint, Rankings,
};
use std::sync::Arc;
use thiserror::Error;
use tracing::{info, warn};

/// Service-level errors
#[derive(Error, Debug)]
pub enum ServiceError {
    #[error("Configuration error: {message}")]
    Configuration { message: String },

    #[error("Service initialization error: {message}")]
    Initialization { message: String },
}

/// Main application state containing all engine components
pub struct AppState {
    /// Application configuration
    config: AppConfig,

    /// Committed leaderboard state
    store: Arc<dyn LeaderboardStore>,

    /// Single writer of entry state
    tracker: EntryStateTracker,

    /// Read-side queries
    classifier: RankingClassifier,

    /// Consulted on opt-in
    eligibility: Arc<dyn EligibilityPolicy>,

    metrics: Arc<MetricsCollector>,
}

impl AppState {
    /// Initialize the engine with an in-memory store and no eligibility rules
    pub fn new(config: AppConfig) -> std::result::Result<Self, ServiceError> {
        Self::with_components(
            config,
            Arc::new(InMemoryLeaderboardStore::new()),
            Arc::new(AllowAllEntrants),
        )
    }

    /// Initialize the engine over a caller-provided store and policy
    pub fn with_components(
        config: AppConfig,
        store: Arc<dyn LeaderboardStore>,
        eligibility: Arc<dyn EligibilityPolicy>,
    ) -> std::result::Result<Self, ServiceError> {
        info!("Initializing leaderboard engine");

        validate_config(&config).map_err(|e| ServiceError::Configuration {
            message: e.to_string(),
        })?;

        let model: Arc<dyn SkillModel> = Arc::new(
            WengLinSkillModel::new(config.rating.clone()).map_err(|e| {
                ServiceError::Initialization {
                    message: format!("Failed to initialize skill model: {}", e),
                }
            })?,
        );
        info!("Skill model configuration: {}", model.config());

        let metrics = Arc::new(MetricsCollector::new().map_err(|e| {
            ServiceError::Initialization {
                message: format!("Failed to create metrics collector: {}", e),
            }
        })?);

        let tracker = EntryStateTracker::new(
            store.clone(),
            PlacementResolver::new(model.clone()),
            config.lock_timeout(),
            metrics.clone(),
        );
        let classifier = RankingClassifier::new(
            store.clone(),
            model,
            config.ledger.min_games_for_ranking,
            config.ledger.history_cap,
        );

        info!(
            "Configuration: service={}, min_games_for_ranking={}, lock_timeout_ms={}",
            config.service.name, config.ledger.min_games_for_ranking, config.ledger.lock_timeout_ms
        );

        Ok(Self {
            config,
            store,
            tracker,
            classifier,
            eligibility,
            metrics,
        })
    }

    /// Get service configuration
    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn metrics(&self) -> Arc<MetricsCollector> {
        self.metrics.clone()
    }

    pub fn classifier(&self) -> &RankingClassifier {
        &self.classifier
    }

    // Leaderboard administration

    pub fn create_leaderboard(&self, name: &str) -> Result<Leaderboard> {
        if name.trim().is_empty() {
            return Err(LeaderboardError::ConfigurationError {
                message: "Leaderboard name cannot be empty".to_string(),
            }
            .into());
        }

        let leaderboard = self.store.create_leaderboard(name)?;
        info!(
            leaderboard_id = %leaderboard.leaderboard_id,
            name = %leaderboard.name,
            "Created leaderboard"
        );
        Ok(leaderboard)
    }

    /// Disable a leaderboard; new opt-ins are refused, history is kept
    pub fn disable_leaderboard(&self, leaderboard_id: LeaderboardId) -> Result<Leaderboard> {
        self.set_leaderboard_disabled(leaderboard_id, true)
    }

    pub fn enable_leaderboard(&self, leaderboard_id: LeaderboardId) -> Result<Leaderboard> {
        self.set_leaderboard_disabled(leaderboard_id, false)
    }

    fn set_leaderboard_disabled(
        &self,
        leaderboard_id: LeaderboardId,
        disabled: bool,
    ) -> Result<Leaderboard> {
        if self.store.get_leaderboard(leaderboard_id)?.is_none() {
            return Err(LeaderboardError::LeaderboardNotFound {
                leaderboard_id: leaderboard_id.to_string(),
            }
            .into());
        }

        let leaderboard = self.store.set_leaderboard_disabled(leaderboard_id, disabled)?;
        info!(
            leaderboard_id = %leaderboard_id,
            disabled,
            "Updated leaderboard status"
        );
        Ok(leaderboard)
    }

    pub fn list_leaderboards(&self) -> Result<Vec<Leaderboard>> {
        self.store.list_leaderboards()
    }

    // Entry lifecycle

    /// Join a leaderboard, or reactivate a previously disabled entry
    pub async fn opt_in(
        &self,
        leaderboard_id: LeaderboardId,
        entrant_id: EntrantId,
    ) -> Result<EntryView> {
        if !self.eligibility.is_eligible(entrant_id).await? {
            warn!(entrant_id = %entrant_id, "Rejected opt-in from ineligible entrant");
            return Err(LeaderboardError::EntrantNotEligible {
                entrant_id: entrant_id.to_string(),
            }
            .into());
        }

        let entry = self.tracker.opt_in(leaderboard_id, entrant_id).await?;
        Ok(entry.view())
    }

    /// Leave a leaderboard; history and belief are kept for reactivation
    pub async fn opt_out(&self, leaderboard_id: LeaderboardId, entrant_id: EntrantId) -> Result<()> {
        self.tracker.opt_out(leaderboard_id, entrant_id).await
    }

    /// Current entry for an entrant, active or not
    pub fn get_entry(
        &self,
        leaderboard_id: LeaderboardId,
        entrant_id: EntrantId,
    ) -> Result<EntryView> {
        self.store
            .get_entry(leaderboard_id, entrant_id)?
            .map(|entry| entry.view())
            .ok_or_else(|| {
                LeaderboardError::EntryNotFound {
                    leaderboard_id: leaderboard_id.to_string(),
                    entrant_id: entrant_id.to_string(),
                }
                .into()
            })
    }

    // Contest ingestion

    /// Apply a finished contest's placements; safe to redeliver
    pub async fn apply_contest_result(
        &self,
        leaderboard_id: LeaderboardId,
        contest_id: ContestId,
        placements: &[ContestPlacement],
    ) -> Result<ContestOutcome> {
        self.tracker
            .apply_contest_result(leaderboard_id, contest_id, placements)
            .await
    }

    // Read side

    pub fn get_rankings(&self, leaderboard_id: LeaderboardId) -> Result<Rankings> {
        self.classifier.rankings(leaderboard_id)
    }

    pub fn rank_for_entry(
        &self,
        leaderboard_id: LeaderboardId,
        entrant_id: EntrantId,
    ) -> Result<Option<usize>> {
        self.classifier.rank_for_entry(leaderboard_id, entrant_id)
    }

    pub fn game_history(
        &self,
        leaderboard_id: LeaderboardId,
        entrant_id: EntrantId,
        page: usize,
        per_page: usize,
    ) -> Result<Vec<GameHistoryEntry>> {
        self.classifier
            .game_history(leaderboard_id, entrant_id, page, per_page)
    }

    pub fn rating_history(
        &self,
        leaderboard_id: LeaderboardId,
        entrant_id: EntrantId,
    ) -> Result<Vec<RatingPoint>> {
        self.classifier.rating_history(leaderboard_id, entrant_id)
    }

    pub fn entries_for_entrant(
        &self,
        entrant_id: EntrantId,
    ) -> Result<Vec<EntrantLeaderboardSummary>> {
        self.classifier.entries_for_entrant(entrant_id)
    }

    pub fn leaderboard_status(&self, leaderboard_id: LeaderboardId) -> Result<LeaderboardStatus> {
        self.classifier.leaderboard_status(leaderboard_id)
    }

    pub fn activity_feed(
        &self,
        leaderboard_id: LeaderboardId,
        limit: usize,
    ) -> Result<Vec<ActivityFeedEntry>> {
        self.classifier.activity_feed(leaderboard_id, limit)
    }
}
