//! Construction-time options for [`crate::BottleWidget`].

use crate::constants::DEFAULT_MAX_QUANTITY;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    #[error("max quantity must be finite, got {0}")]
    NonFiniteMax(f32),
    #[error("max quantity must be greater than zero, got {0}")]
    NonPositiveMax(f32),
}

#[derive(Clone, Debug, PartialEq)]
pub struct BottleConfig {
    /// Upper bound of the quantity; the lower bound is always 0.
    pub max_quantity: f32,
    /// Seed for sparkle placement. `None` draws one from the thread RNG.
    pub seed: Option<u64>,
}

impl Default for BottleConfig {
    fn default() -> Self {
        Self {
            max_quantity: DEFAULT_MAX_QUANTITY,
            seed: None,
        }
    }
}

impl BottleConfig {
    pub fn with_max_quantity(mut self, max_quantity: f32) -> Self {
        self.max_quantity = max_quantity;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.max_quantity.is_finite() {
            return Err(ConfigError::NonFiniteMax(self.max_quantity));
        }
        if self.max_quantity <= 0.0 {
            return Err(ConfigError::NonPositiveMax(self.max_quantity));
        }
        Ok(())
    }

    pub(crate) fn resolved_seed(&self) -> u64 {
        self.seed.unwrap_or_else(rand::random)
    }
}
