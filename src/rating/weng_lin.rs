//! Weng-Lin (OpenSkill) skill model
//!
//! This module provides the default skill model, built on the Plackett-Luce
//! variant of the Weng-Lin algorithm from the skillratings crate, with the
//! engine's own bounds layered on top: a sigma floor, a per-contest cap on
//! mu movement, and a non-increasing sigma.

use crate::config::RatingConfig;
use crate::error::{LeaderboardError, Result};
use crate::rating::calculator::{ensure_valid_update, SkillModel, SkillUpdate};
use crate::types::Belief;
use skillratings::weng_lin::{weng_lin_multi_team, WengLinConfig, WengLinRating};
use skillratings::MultiTeamOutcome;
use tracing::debug;

/// Weng-Lin skill model
#[derive(Debug, Clone)]
pub struct WengLinSkillModel {
    config: RatingConfig,
}

impl WengLinSkillModel {
    /// Create a new Weng-Lin skill model
    pub fn new(config: RatingConfig) -> Result<Self> {
        config.validate()?;

        Ok(Self { config })
    }

    fn weng_lin_config(&self) -> WengLinConfig {
        WengLinConfig {
            beta: self.config.beta,
            uncertainty_tolerance: self.config.uncertainty_tolerance,
        }
    }

    /// Apply the engine bounds to one raw Weng-Lin posterior
    fn bound(&self, prior: &Belief, raw: WengLinRating) -> Result<Belief> {
        if !raw.rating.is_finite() || !raw.uncertainty.is_finite() || raw.uncertainty <= 0.0 {
            return Err(LeaderboardError::InvariantViolation {
                reason: format!(
                    "Weng-Lin produced mu={} sigma={} from mu={} sigma={}",
                    raw.rating, raw.uncertainty, prior.mu, prior.sigma
                ),
            }
            .into());
        }

        let max_swing = self.config.max_mu_swing_sigmas * prior.sigma;
        let mu = prior.mu + (raw.rating - prior.mu).clamp(-max_swing, max_swing);
        let sigma = raw
            .uncertainty
            .max(self.config.sigma_floor)
            .min(prior.sigma);

        Ok(Belief { mu, sigma })
    }
}

impl SkillModel for WengLinSkillModel {
    fn initial_belief(&self) -> Belief {
        Belief {
            mu: self.config.initial_mu,
            sigma: self.config.initial_sigma,
        }
    }

    fn display_score(&self, belief: &Belief) -> f64 {
        belief.mu - self.config.display_sigma_multiplier * belief.sigma
    }

    fn update(&self, priors: &[Belief], placements: &[u32]) -> Result<SkillUpdate> {
        if priors.len() != placements.len() {
            return Err(LeaderboardError::InvalidRoster {
                reason: format!(
                    "{} priors but {} placements",
                    priors.len(),
                    placements.len()
                ),
            }
            .into());
        }
        if priors.len() < 2 {
            return Err(LeaderboardError::InvalidRoster {
                reason: format!("a contest needs at least 2 participants, got {}", priors.len()),
            }
            .into());
        }
        if let Some(placement) = placements.iter().find(|p| **p == 0) {
            return Err(LeaderboardError::InvalidRoster {
                reason: format!("placements are 1-indexed, got {}", placement),
            }
            .into());
        }
        if let Some(prior) = priors.iter().find(|b| !b.is_valid()) {
            return Err(LeaderboardError::InvariantViolation {
                reason: format!("prior belief mu={} sigma={} is invalid", prior.mu, prior.sigma),
            }
            .into());
        }

        // One single-member team per participant
        let teams: Vec<Vec<WengLinRating>> = priors.iter().map(|b| vec![(*b).into()]).collect();

        // Weng-Lin accumulates in input order, so each participant is evaluated
        // first against the rest in a value-based order. Equal (belief,
        // placement) pairs then see bit-identical inputs regardless of roster
        // order.
        let mut canonical: Vec<usize> = (0..priors.len()).collect();
        canonical.sort_by(|&a, &b| {
            placements[a]
                .cmp(&placements[b])
                .then(priors[a].mu.total_cmp(&priors[b].mu))
                .then(priors[a].sigma.total_cmp(&priors[b].sigma))
        });

        let config = self.weng_lin_config();
        let mut posteriors = Vec::with_capacity(priors.len());
        let mut score_deltas = Vec::with_capacity(priors.len());
        for (i, prior) in priors.iter().enumerate() {
            let teams_and_ranks: Vec<(&[WengLinRating], MultiTeamOutcome)> =
                std::iter::once(i)
                    .chain(canonical.iter().copied().filter(|&j| j != i))
                    .map(|j| {
                        (
                            teams[j].as_slice(),
                            MultiTeamOutcome::new(placements[j] as usize),
                        )
                    })
                    .collect();

            let raw = weng_lin_multi_team(&teams_and_ranks, &config);
            let rating = raw
                .first()
                .and_then(|team| team.first())
                .copied()
                .ok_or_else(|| LeaderboardError::InvariantViolation {
                    reason: format!("Weng-Lin returned no rating for participant {}", i),
                })?;

            let posterior = self.bound(prior, rating)?;
            score_deltas.push(self.display_score(&posterior) - self.display_score(prior));
            posteriors.push(posterior);
        }

        let update = SkillUpdate {
            posteriors,
            score_deltas,
        };
        ensure_valid_update(priors, &update)?;

        debug!(participants = priors.len(), "Computed Weng-Lin update");
        Ok(update)
    }

    fn config(&self) -> serde_json::Value {
        serde_json::to_value(&self.config).unwrap_or(serde_json::Value::Null)
    }
}
