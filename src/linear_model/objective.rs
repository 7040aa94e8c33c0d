use serde::{Deserialize, Serialize};

use crate::error::{RegressionError, Result};
use crate::tensor::{functional, Matrix, TensorLike};

/// Added inside every logarithm of the cross-entropy costs so `ln(0)` never happens.
pub const LOG_EPSILON: f64 = 1e-7;

/// What separates the three regression variants: how raw scores `X . W` become
/// predictions, which cost is tracked, and how a test set is scored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Objective {
    /// Identity transform, mean squared error, R² score.
    Linear,
    /// Sigmoid transform, binary cross entropy, thresholded accuracy.
    Logistic,
    /// Row-wise softmax, categorical cross entropy, argmax accuracy.
    Multinomial,
}

impl Objective {
    /// Human readable name of the tracked cost, used for chart titles.
    pub fn cost_name(&self) -> &'static str {
        match self {
            Objective::Linear => "Mean Squared Error",
            Objective::Logistic | Objective::Multinomial => "Cross Entropy",
        }
    }

    pub fn score_name(&self) -> &'static str {
        match self {
            Objective::Linear => "Coefficient of Determination",
            Objective::Logistic | Objective::Multinomial => "Accuracy",
        }
    }

    /// Label widths this objective accepts. Multinomial labels must also be one-hot rows.
    pub fn validate_labels(&self, labels: &Matrix) -> Result<()> {
        if labels.ndim() != 2 {
            return Err(RegressionError::InvalidInput(format!(
                "labels must be a matrix, got shape {:?}",
                labels.shape()
            )));
        }
        let width = labels.cols();
        match self {
            Objective::Linear | Objective::Logistic if width != 1 => {
                Err(RegressionError::InvalidInput(format!(
                    "{:?} regression expects a single label column, got {}",
                    self, width
                )))
            }
            Objective::Multinomial if width < 2 => Err(RegressionError::InvalidInput(format!(
                "multinomial regression expects one-hot labels with at least 2 classes, \
                 got {width} column(s)"
            ))),
            Objective::Multinomial => {
                for row in 0..labels.rows() {
                    let values = labels.row(row)?;
                    let binary = values.iter().all(|&y| y == 0.0 || y == 1.0);
                    let hot = values.iter().filter(|&&y| y == 1.0).count();
                    if !binary || hot != 1 {
                        return Err(RegressionError::InvalidInput(format!(
                            "multinomial labels must be one-hot, row {row} is {values:?}"
                        )));
                    }
                }
                Ok(())
            }
            _ => Ok(()),
        }
    }

    /// Maps raw scores `X . W` onto predictions.
    pub fn transform(&self, scores: Matrix) -> Result<Matrix> {
        match self {
            Objective::Linear => Ok(scores),
            Objective::Logistic => Ok(functional::sigmoid(&scores)),
            Objective::Multinomial => functional::softmax_rows(&scores),
        }
    }

    /// Cost of `predictions` (already transformed) against `labels`, averaged over rows.
    pub fn cost(&self, predictions: &Matrix, labels: &Matrix) -> Result<f64> {
        if !predictions.same_shape(labels) || predictions.rows() == 0 {
            return Err(RegressionError::shape_mismatch(
                "cost",
                predictions.shape(),
                labels.shape(),
            ));
        }
        let n = predictions.rows() as f64;
        let cost = match self {
            Objective::Linear => {
                let differences = functional::sub(predictions, labels)?;
                functional::sum(&functional::powi(&differences, 2)) / n
            }
            Objective::Logistic => {
                // -(y^T . ln(p + e) + (1 - y)^T . ln(1 - p + e)) / n
                let positive = functional::ln(&functional::add_scalar(predictions, LOG_EPSILON));
                let negative = functional::ln(&predictions.map(|p| 1.0 - p + LOG_EPSILON));
                let term_one = functional::dot(labels, &positive)?;
                let term_two = functional::dot(&labels.map(|y| 1.0 - y), &negative)?;
                -(term_one + term_two) / n
            }
            Objective::Multinomial => {
                let log_probabilities =
                    functional::ln(&functional::add_scalar(predictions, LOG_EPSILON));
                -functional::dot(labels, &log_probabilities)? / n
            }
        };
        Ok(cost)
    }

    /// Hard predictions: thresholded probabilities for `Logistic`, class indices for
    /// `Multinomial`. `Linear` passes its predictions through.
    pub fn classify(&self, predictions: &Matrix, decision_boundary: f64) -> Result<Matrix> {
        match self {
            Objective::Linear => Ok(predictions.clone()),
            Objective::Logistic => {
                Ok(predictions.map(|p| if p > decision_boundary { 1.0 } else { 0.0 }))
            }
            Objective::Multinomial => {
                let classes = functional::argmax_rows(predictions)?;
                Ok(Matrix::column(classes.into_iter().map(|c| c as f64).collect()))
            }
        }
    }

    /// R² for `Linear`, fraction of exact matches for the classifiers.
    pub fn score(
        &self,
        predictions: &Matrix,
        labels: &Matrix,
        decision_boundary: f64,
    ) -> Result<f64> {
        if !predictions.same_shape(labels) || predictions.rows() == 0 {
            return Err(RegressionError::shape_mismatch(
                "score",
                predictions.shape(),
                labels.shape(),
            ));
        }
        match self {
            Objective::Linear => coefficient_of_determination(predictions, labels),
            Objective::Logistic => {
                let classes = self.classify(predictions, decision_boundary)?;
                Ok(matching_fraction(classes.as_slice(), labels.as_slice()))
            }
            Objective::Multinomial => {
                let predicted = functional::argmax_rows(predictions)?;
                let expected = functional::argmax_rows(labels)?;
                Ok(matching_fraction(&predicted, &expected))
            }
        }
    }
}

/// `1 - SS_res / SS_tot`. Negative when the predictions do worse than the label mean.
fn coefficient_of_determination(predictions: &Matrix, labels: &Matrix) -> Result<f64> {
    let ss_res = functional::sum(&functional::powi(&functional::sub(labels, predictions)?, 2));
    let label_mean = functional::mean(labels)?;
    let ss_tot = functional::sum(&functional::powi(
        &functional::add_scalar(labels, -label_mean),
        2,
    ));
    if ss_tot == 0.0 {
        tracing::warn!(ss_res, "labels have zero variance, R² is undefined");
    }
    Ok(1.0 - ss_res / ss_tot)
}

fn matching_fraction<T: PartialEq>(predicted: &[T], expected: &[T]) -> f64 {
    let correct = predicted
        .iter()
        .zip(expected.iter())
        .filter(|(p, e)| p == e)
        .count();
    correct as f64 / predicted.len() as f64
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_mse() {
        let predictions = Matrix::from([[1.0], [2.0], [5.0]]);
        let labels = Matrix::from([[1.0], [4.0], [3.0]]);
        assert_abs_diff_eq!(Objective::Linear.cost(&predictions, &labels).unwrap(), 8.0 / 3.0);
    }

    #[test]
    fn test_binary_cross_entropy_stays_finite_on_certain_predictions() {
        let predictions = Matrix::from([[1.0], [0.0]]);
        let wrong = Matrix::from([[0.0], [1.0]]);
        let right = Matrix::from([[1.0], [0.0]]);
        let wrong_cost = Objective::Logistic.cost(&predictions, &wrong).unwrap();
        let right_cost = Objective::Logistic.cost(&predictions, &right).unwrap();

        assert!(wrong_cost.is_finite());
        assert_abs_diff_eq!(wrong_cost, -(LOG_EPSILON.ln()), epsilon = 1e-6);
        assert!(right_cost.abs() < 1e-6);
    }

    #[test]
    fn test_categorical_cross_entropy() {
        let predictions = Matrix::from([[0.5, 0.25, 0.25], [0.1, 0.8, 0.1]]);
        let labels = Matrix::from([[1.0, 0.0, 0.0], [0.0, 1.0, 0.0]]);
        let expected = -((0.5f64 + LOG_EPSILON).ln() + (0.8f64 + LOG_EPSILON).ln()) / 2.0;
        assert_abs_diff_eq!(
            Objective::Multinomial.cost(&predictions, &labels).unwrap(),
            expected,
            epsilon = 1e-12
        );
    }

    #[test]
    fn test_r_squared() {
        let labels = Matrix::from([[1.0], [2.0], [3.0]]);
        assert_abs_diff_eq!(
            Objective::Linear.score(&labels, &labels, 0.5).unwrap(),
            1.0
        );
        let mean_guess = Matrix::from([[2.0], [2.0], [2.0]]);
        assert_abs_diff_eq!(
            Objective::Linear.score(&mean_guess, &labels, 0.5).unwrap(),
            0.0
        );
        let bad_guess = Matrix::from([[3.0], [2.0], [1.0]]);
        assert!(Objective::Linear.score(&bad_guess, &labels, 0.5).unwrap() < 0.0);
    }

    #[test]
    fn test_logistic_accuracy_uses_decision_boundary() {
        let probabilities = Matrix::from([[0.9], [0.6], [0.2], [0.4]]);
        let labels = Matrix::from([[1.0], [0.0], [0.0], [1.0]]);
        assert_abs_diff_eq!(
            Objective::Logistic.score(&probabilities, &labels, 0.5).unwrap(),
            0.5
        );
        assert_abs_diff_eq!(
            Objective::Logistic.score(&probabilities, &labels, 0.3).unwrap(),
            0.75
        );
        assert_abs_diff_eq!(
            Objective::Logistic.score(&probabilities, &labels, 0.7).unwrap(),
            0.75
        );
    }

    #[test]
    fn test_multinomial_accuracy_compares_argmax() {
        let probabilities = Matrix::from([[0.7, 0.2, 0.1], [0.3, 0.3, 0.4], [0.1, 0.5, 0.4]]);
        let labels = Matrix::from([[1.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]]);
        assert_abs_diff_eq!(
            Objective::Multinomial.score(&probabilities, &labels, 0.5).unwrap(),
            2.0 / 3.0
        );
        assert_eq!(
            Objective::Multinomial.classify(&probabilities, 0.5).unwrap(),
            Matrix::from([[0.0], [2.0], [1.0]])
        );
    }

    #[test]
    fn test_label_width_validation() {
        let column = Matrix::from([[1.0], [0.0]]);
        let one_hot = Matrix::from([[1.0, 0.0], [0.0, 1.0]]);
        assert!(Objective::Linear.validate_labels(&column).is_ok());
        assert!(Objective::Logistic.validate_labels(&one_hot).is_err());
        assert!(Objective::Multinomial.validate_labels(&column).is_err());
        assert!(Objective::Multinomial.validate_labels(&one_hot).is_ok());
    }

    #[test]
    fn test_multinomial_labels_must_be_one_hot() {
        let two_hot = Matrix::from([[1.0, 0.0, 0.0], [1.0, 1.0, 0.0]]);
        let fractional = Matrix::from([[0.5, 0.5], [0.0, 1.0]]);
        let cold = Matrix::from([[0.0, 0.0], [0.0, 1.0]]);
        for labels in [two_hot, fractional, cold] {
            assert!(matches!(
                Objective::Multinomial.validate_labels(&labels),
                Err(RegressionError::InvalidInput(_))
            ));
        }
    }
}
