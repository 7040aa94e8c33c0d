//! Training options

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{RegressionError, Result};
use crate::optim::LearningRateBounds;

/// Immutable training configuration.
///
/// Keys serialize in camelCase (`learningRate`, `batchSize`, ...). Missing keys fall back
/// to [`Options::default`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Options {
    /// Starting learning rate. The model adapts its own copy between passes.
    pub learning_rate: f64,
    /// Number of full passes over the training set
    pub iterations: usize,
    /// Rows per gradient step. `None` trains on the full batch.
    pub batch_size: Option<usize>,
    /// Probability above which a binary prediction counts as the positive class
    pub decision_boundary: f64,
    /// Clamp for the adaptive learning rate. `None` leaves it unbounded.
    pub learning_rate_bounds: Option<LearningRateBounds>,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            learning_rate: 0.1,
            iterations: 1000,
            batch_size: None,
            decision_boundary: 0.5,
            learning_rate_bounds: None,
        }
    }
}

impl Options {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_learning_rate(mut self, learning_rate: f64) -> Self {
        self.learning_rate = learning_rate;
        self
    }

    pub fn with_iterations(mut self, iterations: usize) -> Self {
        self.iterations = iterations;
        self
    }

    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = Some(batch_size);
        self
    }

    pub fn with_decision_boundary(mut self, decision_boundary: f64) -> Self {
        self.decision_boundary = decision_boundary;
        self
    }

    pub fn with_learning_rate_bounds(mut self, min: f64, max: f64) -> Self {
        self.learning_rate_bounds = Some(LearningRateBounds::new(min, max));
        self
    }

    pub fn from_json(json: &str) -> Result<Self> {
        let options: Options = serde_json::from_str(json)?;
        options.validate()?;
        Ok(options)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Checks the values that do not depend on the data.
    pub fn validate(&self) -> Result<()> {
        if !(self.learning_rate.is_finite() && self.learning_rate > 0.0) {
            return Err(RegressionError::ConfigError(format!(
                "learningRate must be a positive finite number, got {}",
                self.learning_rate
            )));
        }
        if self.batch_size == Some(0) {
            return Err(RegressionError::ConfigError(
                "batchSize must be at least 1".to_string(),
            ));
        }
        if !(0.0..=1.0).contains(&self.decision_boundary) {
            return Err(RegressionError::ConfigError(format!(
                "decisionBoundary must lie in [0, 1], got {}",
                self.decision_boundary
            )));
        }
        if let Some(bounds) = self.learning_rate_bounds {
            if !bounds.is_valid() {
                return Err(RegressionError::ConfigError(format!(
                    "learningRateBounds must satisfy 0 < min <= max, got {bounds:?}"
                )));
            }
        }
        Ok(())
    }

    /// The batch size to use on `rows` training rows.
    pub fn batch_size_for(&self, rows: usize) -> Result<usize> {
        match self.batch_size {
            None => Ok(rows),
            Some(size) if size > rows => Err(RegressionError::InvalidInput(format!(
                "batchSize {size} is larger than the {rows} training rows"
            ))),
            Some(size) => Ok(size),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let options = Options::default();
        assert_eq!(options.learning_rate, 0.1);
        assert_eq!(options.iterations, 1000);
        assert_eq!(options.batch_size, None);
        assert_eq!(options.decision_boundary, 0.5);
        assert!(options.validate().is_ok());
    }

    #[test]
    fn test_from_json_fills_missing_keys() {
        let options =
            Options::from_json(r#"{"learningRate": 0.5, "iterations": 100, "batchSize": 10}"#)
                .unwrap();
        assert_eq!(
            options,
            Options::new()
                .with_learning_rate(0.5)
                .with_iterations(100)
                .with_batch_size(10)
        );
    }

    #[test]
    fn test_json_round_trip_keeps_bounds() {
        let options = Options::new().with_learning_rate_bounds(1e-4, 10.0);
        let json = options.to_json().unwrap();
        assert!(json.contains("learningRateBounds"));
        assert_eq!(Options::from_json(&json).unwrap(), options);
    }

    #[test]
    fn test_invalid_values_are_rejected() {
        assert!(Options::new().with_learning_rate(0.0).validate().is_err());
        assert!(Options::new().with_learning_rate(f64::NAN).validate().is_err());
        assert!(Options::new().with_batch_size(0).validate().is_err());
        assert!(Options::new().with_decision_boundary(1.5).validate().is_err());
        assert!(Options::new()
            .with_learning_rate_bounds(1.0, 0.1)
            .validate()
            .is_err());
        assert!(matches!(
            Options::from_json(r#"{"learningRate": -1}"#),
            Err(RegressionError::ConfigError(_))
        ));
        assert!(matches!(
            Options::from_json("not json"),
            Err(RegressionError::SerializationError(_))
        ));
    }

    #[test]
    fn test_batch_size_for() {
        assert_eq!(Options::new().batch_size_for(42).unwrap(), 42);
        assert_eq!(Options::new().with_batch_size(10).batch_size_for(42).unwrap(), 10);
        assert!(Options::new().with_batch_size(50).batch_size_for(42).is_err());
    }
}
