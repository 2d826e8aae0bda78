//! Skill model configuration

use crate::error::{LeaderboardError, Result};
use serde::{Deserialize, Serialize};

/// Tunable coefficients of the skill model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RatingConfig {
    /// Mean of the belief assigned to a new entry
    pub initial_mu: f64,
    /// Deviation of the belief assigned to a new entry
    pub initial_sigma: f64,
    /// Performance variability of a single contest (Weng-Lin beta)
    pub beta: f64,
    /// Lower bound on the per-contest variance shrink factor
    pub uncertainty_tolerance: f64,
    /// `k` in `display_score = mu - k * sigma`
    pub display_sigma_multiplier: f64,
    /// Sigma never drops below this
    pub sigma_floor: f64,
    /// Largest mu movement in one contest, in multiples of the prior sigma
    pub max_mu_swing_sigmas: f64,
}

impl Default for RatingConfig {
    fn default() -> Self {
        Self {
            initial_mu: 25.0,
            initial_sigma: 8.333,
            beta: 25.0 / 6.0,
            uncertainty_tolerance: 0.000_001,
            display_sigma_multiplier: 3.0,
            sigma_floor: 0.01,
            max_mu_swing_sigmas: 2.0,
        }
    }
}

impl RatingConfig {
    /// Validate configuration parameters
    pub fn validate(&self) -> Result<()> {
        let finite = [
            ("initial_mu", self.initial_mu),
            ("initial_sigma", self.initial_sigma),
            ("beta", self.beta),
            ("uncertainty_tolerance", self.uncertainty_tolerance),
            ("display_sigma_multiplier", self.display_sigma_multiplier),
            ("sigma_floor", self.sigma_floor),
            ("max_mu_swing_sigmas", self.max_mu_swing_sigmas),
        ];
        for (name, value) in finite {
            if !value.is_finite() {
                return Err(invalid(format!("{} must be finite", name)));
            }
        }

        if self.initial_sigma <= 0.0 {
            return Err(invalid("Initial sigma must be positive"));
        }
        if self.beta <= 0.0 {
            return Err(invalid("Beta must be positive"));
        }
        if self.uncertainty_tolerance < 0.0 {
            return Err(invalid("Uncertainty tolerance must be non-negative"));
        }
        if self.display_sigma_multiplier < 0.0 {
            return Err(invalid("Display sigma multiplier must be non-negative"));
        }
        if self.sigma_floor <= 0.0 {
            return Err(invalid("Sigma floor must be positive"));
        }
        if self.sigma_floor >= self.initial_sigma {
            return Err(invalid("Sigma floor must be below the initial sigma"));
        }
        if self.max_mu_swing_sigmas <= 0.0 {
            return Err(invalid("Max mu swing must be positive"));
        }

        Ok(())
    }
}

fn invalid(message: impl Into<String>) -> anyhow::Error {
    LeaderboardError::ConfigurationError {
        message: message.into(),
    }
    .into()
}
