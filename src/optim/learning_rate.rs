use serde::{Deserialize, Serialize};
use tracing::warn;

/// Factor applied when the cost went up between the last two passes.
pub const DECREASE_FACTOR: f64 = 0.5;
/// Factor applied when the cost went down or stayed flat.
pub const INCREASE_FACTOR: f64 = 1.05;

/// Next learning rate given the cost history.
///
/// Fewer than two entries leaves the rate untouched. Otherwise the last two entries are
/// compared: a rising cost halves the rate, anything else grows it by 5%. The result is
/// not bounded.
///
/// ```
/// # use light_regression::optim::adjust_learning_rate;
/// assert_eq!(adjust_learning_rate(&[10.0, 12.0], 0.2), 0.1);
/// assert_eq!(adjust_learning_rate(&[12.0], 0.2), 0.2);
/// ```
pub fn adjust_learning_rate(cost_history: &[f64], learning_rate: f64) -> f64 {
    match cost_history {
        [.., second_last, last] if last > second_last => learning_rate * DECREASE_FACTOR,
        [.., _, _] => learning_rate * INCREASE_FACTOR,
        _ => learning_rate,
    }
}

/// Optional floor and ceiling for the adaptive learning rate.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LearningRateBounds {
    pub min: f64,
    pub max: f64,
}

impl LearningRateBounds {
    pub fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    pub fn is_valid(&self) -> bool {
        self.min.is_finite() && self.max.is_finite() && 0.0 < self.min && self.min <= self.max
    }

    pub fn clamp(&self, learning_rate: f64) -> f64 {
        learning_rate.clamp(self.min, self.max)
    }
}

/// Owns the mutable learning rate of one training run.
#[derive(Debug, Clone, PartialEq)]
pub struct LearningRateController {
    learning_rate: f64,
    bounds: Option<LearningRateBounds>,
}

impl LearningRateController {
    pub fn new(learning_rate: f64, bounds: Option<LearningRateBounds>) -> Self {
        Self {
            learning_rate,
            bounds,
        }
    }

    pub fn learning_rate(&self) -> f64 {
        self.learning_rate
    }

    /// Runs once per full pass, after the pass's cost has been appended to `cost_history`.
    pub fn update(&mut self, cost_history: &[f64]) -> f64 {
        let adjusted = adjust_learning_rate(cost_history, self.learning_rate);
        self.learning_rate = match self.bounds {
            Some(bounds) => {
                let clamped = bounds.clamp(adjusted);
                if clamped != adjusted {
                    warn!(adjusted, clamped, "learning rate clamped to configured bounds");
                }
                clamped
            }
            None => adjusted,
        };
        self.learning_rate
    }
}
