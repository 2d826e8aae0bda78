//! Entrant eligibility
//!
//! Decides whether an entrant may join leaderboards at all. Contest
//! ingestion never consults this; only opt-in does.

use crate::error::{LeaderboardError, Result};
use crate::types::EntrantId;
use async_trait::async_trait;
use std::collections::HashSet;
use std::sync::RwLock;
use tracing::debug;

/// Policy consulted before an entrant opts in
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait EligibilityPolicy: Send + Sync {
    async fn is_eligible(&self, entrant_id: EntrantId) -> Result<bool>;
}

/// Every entrant may join
#[derive(Debug, Default, Clone, Copy)]
pub struct AllowAllEntrants;

#[async_trait]
impl EligibilityPolicy for AllowAllEntrants {
    async fn is_eligible(&self, _entrant_id: EntrantId) -> Result<bool> {
        Ok(true)
    }
}

/// Rejects entrants on an explicit deny list
#[derive(Debug, Default)]
pub struct DenyListEligibility {
    denied: RwLock<HashSet<EntrantId>>,
}

impl DenyListEligibility {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn deny(&self, entrant_id: EntrantId) -> Result<()> {
        self.denied
            .write()
            .map_err(|_| LeaderboardError::InternalError {
                message: "Failed to acquire deny list".to_string(),
            })?
            .insert(entrant_id);
        Ok(())
    }

    pub fn allow(&self, entrant_id: EntrantId) -> Result<()> {
        self.denied
            .write()
            .map_err(|_| LeaderboardError::InternalError {
                message: "Failed to acquire deny list".to_string(),
            })?
            .remove(&entrant_id);
        Ok(())
    }
}

#[async_trait]
impl EligibilityPolicy for DenyListEligibility {
    async fn is_eligible(&self, entrant_id: EntrantId) -> Result<bool> {
        let denied = self
            .denied
            .read()
            .map_err(|_| LeaderboardError::InternalError {
                message: "Failed to acquire deny list".to_string(),
            })?
            .contains(&entrant_id);

        if denied {
            debug!(entrant_id = %entrant_id, "Entrant is on the deny list");
        }
        Ok(!denied)
    }
}
