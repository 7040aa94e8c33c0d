use std::ops::Range;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use super::Objective;
use crate::config::Options;
use crate::error::{RegressionError, Result};
use crate::history::{ChartSeries, History};
use crate::optim::{batch_ranges, gradient, sgd_step, LearningRateController};
use crate::preprocessing::{StandardizationParams, Standardizer};
use crate::tensor::{functional, Matrix, TensorLike};

/// Summary of one call to [`Regression::train`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainingReport {
    pub passes: usize,
    pub batch_size: usize,
    pub batches_per_pass: usize,
    /// Rows that took part in a gradient step on every pass
    pub rows_per_pass: usize,
    /// Trailing rows that never fill a whole batch and are skipped
    pub dropped_rows: usize,
    pub final_cost: Option<f64>,
    pub final_learning_rate: f64,
}

/// Batch gradient descent regression, specialised by its [`Objective`].
///
/// Construction validates the data, standardizes the training features (fixing the
/// standardization parameters for the lifetime of the model), prepends the bias column
/// and zeroes the weights. [`Regression::train`] then runs `iterations` passes of
/// mini-batch gradient descent, recording the cost after every pass and adapting the
/// learning rate from that record.
#[derive(Debug, Clone)]
pub struct Regression {
    objective: Objective,
    options: Options,
    standardizer: Standardizer,
    /// standardized and bias-augmented training features
    features: Matrix,
    labels: Matrix,
    /// `(features + 1) x label width`
    weights: Matrix,
    batch_size: usize,
    learning_rate: f64,
    history: History,
}

impl Regression {
    pub fn new(
        objective: Objective,
        features: &Matrix,
        labels: &Matrix,
        options: Options,
    ) -> Result<Self> {
        options.validate()?;
        validate_data(features, labels)?;
        objective.validate_labels(labels)?;
        let batch_size = options.batch_size_for(features.rows())?;

        let mut standardizer = Standardizer::new();
        let processed = standardizer.process(features)?;
        let weights = Matrix::zeros(vec![processed.cols(), labels.cols()]);
        info!(
            objective = ?objective,
            rows = features.rows(),
            features = features.cols(),
            outputs = labels.cols(),
            batch_size,
            "created regression model"
        );

        Ok(Self {
            objective,
            learning_rate: options.learning_rate,
            options,
            standardizer,
            features: processed,
            labels: labels.clone(),
            weights,
            batch_size,
            history: History::new(),
        })
    }

    pub fn linear(features: &Matrix, labels: &Matrix, options: Options) -> Result<Self> {
        Self::new(Objective::Linear, features, labels, options)
    }

    pub fn logistic(features: &Matrix, labels: &Matrix, options: Options) -> Result<Self> {
        Self::new(Objective::Logistic, features, labels, options)
    }

    pub fn multinomial(features: &Matrix, labels: &Matrix, options: Options) -> Result<Self> {
        Self::new(Objective::Multinomial, features, labels, options)
    }

    /// Runs `options.iterations` full passes over the training set.
    ///
    /// Calling it again continues from the current weights and learning rate and keeps
    /// appending to the history.
    pub fn train(&mut self) -> Result<TrainingReport> {
        let rows = self.features.rows();
        let batches_per_pass = rows / self.batch_size;
        let rows_per_pass = batches_per_pass * self.batch_size;
        let dropped_rows = rows - rows_per_pass;
        if dropped_rows > 0 {
            warn!(
                dropped_rows,
                batch_size = self.batch_size,
                "trailing rows do not fill a batch and are skipped every pass"
            );
        }
        info!(
            objective = ?self.objective,
            iterations = self.options.iterations,
            batches_per_pass,
            learning_rate = self.learning_rate,
            "training started"
        );

        let mut controller =
            LearningRateController::new(self.learning_rate, self.options.learning_rate_bounds);
        for iteration in 0..self.options.iterations {
            let learning_rate = controller.learning_rate();
            for batch in batch_ranges(rows, self.batch_size) {
                self.gradient_descent(batch, learning_rate)?;
            }

            let cost = self.cost()?;
            if !cost.is_finite() {
                warn!(iteration, cost, "training cost is not finite");
            }
            self.history.record(cost, self.bias(), learning_rate);
            let next_learning_rate = controller.update(self.history.cost());
            debug!(iteration, cost, learning_rate, next_learning_rate, "finished pass");
        }
        self.learning_rate = controller.learning_rate();

        let report = TrainingReport {
            passes: self.options.iterations,
            batch_size: self.batch_size,
            batches_per_pass,
            rows_per_pass,
            dropped_rows,
            final_cost: self.history.cost().last().copied(),
            final_learning_rate: self.learning_rate,
        };
        info!(
            final_cost = ?report.final_cost,
            final_learning_rate = report.final_learning_rate,
            "training finished"
        );
        Ok(report)
    }

    /// One gradient step on the contiguous rows `batch`.
    fn gradient_descent(&mut self, batch: Range<usize>, learning_rate: f64) -> Result<()> {
        let features = self.features.row_view(batch.start, batch.end)?.to_tensor();
        let labels = self.labels.row_view(batch.start, batch.end)?.to_tensor();

        let guesses = self
            .objective
            .transform(functional::matmul(&features, &self.weights)?)?;
        let differences = functional::sub(&guesses, &labels)?;
        let slopes = gradient(&features, &differences)?;
        sgd_step(&mut self.weights, &slopes, learning_rate)
    }

    /// Cost of the current weights over the whole training set.
    pub fn cost(&self) -> Result<f64> {
        let predictions = self
            .objective
            .transform(functional::matmul(&self.features, &self.weights)?)?;
        self.objective.cost(&predictions, &self.labels)
    }

    /// Standardizes `observations` with the training statistics and prepends the bias column.
    fn process(&self, observations: &Matrix) -> Result<Matrix> {
        let standardized = self.standardizer.transform(observations)?;
        Standardizer::augment(&standardized)
    }

    /// Transformed model output: raw values for `Linear`, probabilities for the classifiers.
    pub fn predict_proba(&self, observations: &Matrix) -> Result<Matrix> {
        if !self.is_trained() {
            debug!("predicting with untrained (zero) weights");
        }
        let scores = functional::matmul(&self.process(observations)?, &self.weights)?;
        self.objective.transform(scores)
    }

    /// `Linear`: `X . W`. `Logistic`: sigmoid probabilities. `Multinomial`: the most likely
    /// class index of each row, as a single column.
    pub fn predict(&self, observations: &Matrix) -> Result<Matrix> {
        let predictions = self.predict_proba(observations)?;
        match self.objective {
            Objective::Multinomial => self
                .objective
                .classify(&predictions, self.options.decision_boundary),
            Objective::Linear | Objective::Logistic => Ok(predictions),
        }
    }

    /// Hard labels: decision-boundary thresholding for `Logistic`, argmax for `Multinomial`.
    pub fn classify(&self, observations: &Matrix) -> Result<Matrix> {
        let predictions = self.predict_proba(observations)?;
        self.objective
            .classify(&predictions, self.options.decision_boundary)
    }

    /// R² for `Linear`, accuracy in `[0, 1]` for the classifiers.
    pub fn test(&self, test_features: &Matrix, test_labels: &Matrix) -> Result<f64> {
        validate_data(test_features, test_labels)?;
        self.objective.validate_labels(test_labels)?;
        if test_labels.cols() != self.labels.cols() {
            return Err(RegressionError::InvalidInput(format!(
                "test labels have {} columns, the model was trained on {}",
                test_labels.cols(),
                self.labels.cols()
            )));
        }
        let predictions = self.predict_proba(test_features)?;
        let score = self
            .objective
            .score(&predictions, test_labels, self.options.decision_boundary)?;
        info!(
            objective = ?self.objective,
            rows = test_features.rows(),
            score,
            "{}", self.objective.score_name()
        );
        Ok(score)
    }

    pub fn objective(&self) -> Objective {
        self.objective
    }

    pub fn options(&self) -> &Options {
        &self.options
    }

    pub fn weights(&self) -> &Matrix {
        &self.weights
    }

    /// The bias weight `W[0][0]`.
    pub fn bias(&self) -> f64 {
        self.weights[[0, 0]]
    }

    /// Learning rate the next pass will start with.
    pub fn learning_rate(&self) -> f64 {
        self.learning_rate
    }

    pub fn batch_size(&self) -> usize {
        self.batch_size
    }

    pub fn standardization_params(&self) -> Option<&StandardizationParams> {
        self.standardizer.params()
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    /// MSE (`Linear`) or cross entropy (classifiers) after each pass.
    pub fn cost_history(&self) -> &[f64] {
        self.history.cost()
    }

    /// Bias weight after each pass.
    pub fn weight_history(&self) -> &[f64] {
        self.history.bias()
    }

    pub fn cost_series(&self) -> ChartSeries {
        self.history.cost_series(self.objective.cost_name())
    }

    pub fn is_trained(&self) -> bool {
        !self.history.is_empty()
    }
}

fn validate_data(features: &Matrix, labels: &Matrix) -> Result<()> {
    if features.ndim() != 2 || labels.ndim() != 2 {
        return Err(RegressionError::InvalidInput(format!(
            "features and labels must be matrices, got shapes {:?} and {:?}",
            features.shape(),
            labels.shape()
        )));
    }
    if features.rows() == 0 {
        return Err(RegressionError::InvalidInput(
            "no observations to work with".to_string(),
        ));
    }
    if features.rows() != labels.rows() {
        return Err(RegressionError::InvalidInput(format!(
            "{} feature rows but {} label rows",
            features.rows(),
            labels.rows()
        )));
    }
    if features.iter().chain(labels.iter()).any(|x| !x.is_finite()) {
        return Err(RegressionError::InvalidInput(
            "features and labels must be finite numbers".to_string(),
        ));
    }
    Ok(())
}
