//! Skill model trait
//!
//! A skill model owns the belief representation: the initial belief, the
//! conservative display score, and the multi-party update.

use crate::error::{LeaderboardError, Result};
use crate::types::Belief;
use serde::{Deserialize, Serialize};

/// Posterior beliefs for one contest, index-aligned with the priors
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkillUpdate {
    pub posteriors: Vec<Belief>,
    /// Signed display score change for each participant
    pub score_deltas: Vec<f64>,
}

/// Trait for updating skill beliefs after a contest
pub trait SkillModel: Send + Sync {
    /// Belief assigned to a freshly created entry
    fn initial_belief(&self) -> Belief;

    /// Conservative single-number estimate used for sorting only
    fn display_score(&self, belief: &Belief) -> f64;

    /// Revise every participant's belief from one contest's final ranking
    ///
    /// # Arguments
    /// * `priors` - Current beliefs of the N participants
    /// * `placements` - 1-indexed finishing positions, index-aligned with
    ///   `priors`; equal values are ties
    ///
    /// # Returns
    /// Posterior beliefs and display score deltas in the same order
    fn update(&self, priors: &[Belief], placements: &[u32]) -> Result<SkillUpdate>;

    /// Get current configuration as JSON
    fn config(&self) -> serde_json::Value;
}

/// Reject a model output that would break the belief invariants
///
/// Non-finite or non-positive values are programming errors; they abort the
/// surrounding operation rather than being clamped.
pub fn ensure_valid_update(priors: &[Belief], update: &SkillUpdate) -> Result<()> {
    if update.posteriors.len() != priors.len() || update.score_deltas.len() != priors.len() {
        return Err(LeaderboardError::InvariantViolation {
            reason: format!(
                "model returned {} posteriors and {} deltas for {} participants",
                update.posteriors.len(),
                update.score_deltas.len(),
                priors.len()
            ),
        }
        .into());
    }

    for (i, (prior, posterior)) in priors.iter().zip(&update.posteriors).enumerate() {
        if !posterior.is_valid() {
            return Err(LeaderboardError::InvariantViolation {
                reason: format!(
                    "participant {} posterior is invalid (mu={}, sigma={})",
                    i, posterior.mu, posterior.sigma
                ),
            }
            .into());
        }
        if posterior.sigma > prior.sigma {
            return Err(LeaderboardError::InvariantViolation {
                reason: format!(
                    "participant {} sigma grew from {} to {}",
                    i, prior.sigma, posterior.sigma
                ),
            }
            .into());
        }
        if !update.score_deltas[i].is_finite() {
            return Err(LeaderboardError::InvariantViolation {
                reason: format!("participant {} display score delta is not finite", i),
            }
            .into());
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::classify;

    fn update_of(posteriors: Vec<Belief>) -> SkillUpdate {
        let score_deltas = vec![0.0; posteriors.len()];
        SkillUpdate {
            posteriors,
            score_deltas,
        }
    }

    #[test]
    fn test_valid_update_passes() {
        let priors = vec![Belief::default(), Belief::default()];
        let update = update_of(vec![Belief::new(27.0, 8.0), Belief::new(23.0, 8.0)]);
        assert!(ensure_valid_update(&priors, &update).is_ok());
    }

    #[test]
    fn test_non_finite_sigma_is_invariant_violation() {
        let priors = vec![Belief::default(), Belief::default()];
        let update = update_of(vec![Belief::new(27.0, f64::NAN), Belief::new(23.0, 8.0)]);

        let err = ensure_valid_update(&priors, &update).unwrap_err();
        assert_eq!(classify(&err).map(|e| e.kind()), Some("invariant_violation"));
    }

    #[test]
    fn test_zero_sigma_is_invariant_violation() {
        let priors = vec![Belief::default(), Belief::default()];
        let update = update_of(vec![Belief::new(27.0, 0.0), Belief::new(23.0, 8.0)]);
        assert!(ensure_valid_update(&priors, &update).is_err());
    }

    #[test]
    fn test_growing_sigma_is_invariant_violation() {
        let priors = vec![Belief::new(25.0, 4.0), Belief::default()];
        let update = update_of(vec![Belief::new(25.0, 5.0), Belief::new(23.0, 8.0)]);
        assert!(ensure_valid_update(&priors, &update).is_err());
    }

    #[test]
    fn test_length_mismatch_is_invariant_violation() {
        let priors = vec![Belief::default(), Belief::default()];
        let update = update_of(vec![Belief::default()]);
        assert!(ensure_valid_update(&priors, &update).is_err());
    }
}
