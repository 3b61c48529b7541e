//! Configuration for the selection pipeline

use serde::{Deserialize, Serialize};
use std::env;
use std::str::FromStr;
use thiserror::Error;

/// Configuration error types
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid configuration value: {0}")]
    Invalid(String),
}

/// How a job's total reward is derived from its tasks
///
/// `QuantityWeighted` (the default) has each task contribute
/// `reward * quantity`. `PerTask` counts each task's item reward once,
/// ignoring quantity, which is what the historical selector did.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RewardPolicy {
    PerTask,
    QuantityWeighted,
}

impl FromStr for RewardPolicy {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "per-task" | "per_task" => Ok(RewardPolicy::PerTask),
            "quantity-weighted" | "quantity_weighted" => Ok(RewardPolicy::QuantityWeighted),
            other => Err(ConfigError::Invalid(format!(
                "unknown reward policy '{other}'"
            ))),
        }
    }
}

/// Selection pipeline configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SelectionConfig {
    /// Prior probability of the cancelled class
    pub cancelled_prior: f64,

    /// Prior probability of the completed class
    pub completed_prior: f64,

    /// Substitute for per-item likelihoods whose raw estimate is zero
    pub smoothing_floor: f64,

    /// Reward derivation policy
    pub reward_policy: RewardPolicy,
}

impl Default for SelectionConfig {
    fn default() -> Self {
        Self {
            // Two-outcome symmetric prior, 1/n with n = 2
            cancelled_prior: 0.5,
            completed_prior: 0.5,
            smoothing_floor: 1e-4,
            reward_policy: RewardPolicy::QuantityWeighted,
        }
    }
}

impl SelectionConfig {
    /// Load configuration from environment variables
    ///
    /// Unset variables keep their defaults.
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut config = SelectionConfig::default();

        if let Ok(prior) = env::var("ORDER_SELECT_CANCELLED_PRIOR") {
            config.cancelled_prior = prior
                .parse()
                .map_err(|_| ConfigError::Invalid("ORDER_SELECT_CANCELLED_PRIOR".to_string()))?;
        }

        if let Ok(prior) = env::var("ORDER_SELECT_COMPLETED_PRIOR") {
            config.completed_prior = prior
                .parse()
                .map_err(|_| ConfigError::Invalid("ORDER_SELECT_COMPLETED_PRIOR".to_string()))?;
        }

        if let Ok(floor) = env::var("ORDER_SELECT_SMOOTHING_FLOOR") {
            config.smoothing_floor = floor
                .parse()
                .map_err(|_| ConfigError::Invalid("ORDER_SELECT_SMOOTHING_FLOOR".to_string()))?;
        }

        if let Ok(policy) = env::var("ORDER_SELECT_REWARD_POLICY") {
            config.reward_policy = policy.parse()?;
        }

        config.validate()?;
        Ok(config)
    }

    /// Check value ranges
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (name, prior) in [
            ("cancelled prior", self.cancelled_prior),
            ("completed prior", self.completed_prior),
        ] {
            if !(prior > 0.0 && prior <= 1.0) {
                return Err(ConfigError::Invalid(format!(
                    "{name} must be in (0, 1], got {prior}"
                )));
            }
        }

        if !(self.smoothing_floor > 0.0) {
            return Err(ConfigError::Invalid(format!(
                "smoothing floor must be positive, got {}",
                self.smoothing_floor
            )));
        }

        Ok(())
    }
}
