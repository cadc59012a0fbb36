//! Engine configuration
//!
//! The caller owns the configuration and passes it into every computation.
//! Nothing derived from it is kept between calls, so changing any field and
//! calling the engine again always recomputes from the records.

use crate::error::ComputeError;
use serde::{Deserialize, Serialize};

/// Default number of days to project forward
pub const DEFAULT_PREDICTION_DAYS: usize = 7;

/// Upper bound on `prediction_days` (ten years)
pub const MAX_PREDICTION_DAYS: usize = 3650;

/// View and analysis settings supplied by the caller
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Number of most recent records in the visible window (0 = all)
    pub max_entries: usize,
    /// Number of future days to predict
    pub prediction_days: usize,
    /// Trailing window of main-sleep days used for drift (None = every day in the data)
    pub averaging_days: Option<usize>,
    /// Whether predictions are produced at all
    pub show_predictions: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_entries: 0,
            prediction_days: DEFAULT_PREDICTION_DAYS,
            averaging_days: None,
            show_predictions: true,
        }
    }
}

impl EngineConfig {
    /// Number of predicted records this configuration asks for
    pub fn effective_prediction_days(&self) -> usize {
        if self.show_predictions {
            self.prediction_days
        } else {
            0
        }
    }

    /// Check field ranges
    pub fn validate(&self) -> Result<(), ComputeError> {
        if self.averaging_days == Some(0) {
            return Err(ComputeError::InvalidConfig(
                "averaging_days must be at least 1 (omit it to use every day)".to_string(),
            ));
        }
        if self.prediction_days > MAX_PREDICTION_DAYS {
            return Err(ComputeError::InvalidConfig(format!(
                "prediction_days must be at most {}, got {}",
                MAX_PREDICTION_DAYS, self.prediction_days
            )));
        }
        Ok(())
    }

    /// Load and validate a configuration from JSON; missing fields take defaults
    pub fn from_json(json: &str) -> Result<Self, ComputeError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Serialize configuration to JSON
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}
