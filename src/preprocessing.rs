//! Feature standardization (z-score) and bias augmentation

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{RegressionError, Result};
use crate::tensor::{functional, Matrix, TensorLike};

/// Per-column statistics captured from the training features.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StandardizationParams {
    /// `1 x cols` column means
    pub mean: Vec<f64>,
    /// `1 x cols` population variances, with exact zeros replaced by 1
    pub variance: Vec<f64>,
}

/// Z-score standardizer.
///
/// The first call to [`Standardizer::standardize`] fits the parameters; every later call
/// (test or prediction data) reuses them unchanged.
#[derive(Debug, Clone, Default)]
pub struct Standardizer {
    params: Option<StandardizationParams>,
}

impl Standardizer {
    pub fn new() -> Self {
        Self { params: None }
    }

    pub fn is_fitted(&self) -> bool {
        self.params.is_some()
    }

    pub fn params(&self) -> Option<&StandardizationParams> {
        self.params.as_ref()
    }

    /// Computes and stores column mean and variance. Replaces any previous fit.
    pub fn fit(&mut self, features: &Matrix) -> Result<&StandardizationParams> {
        let (mean, variance) = functional::moments(features)?;
        // a constant column would divide by zero
        let variance = variance.map(|v| if v == 0.0 { 1.0 } else { v });
        debug!(columns = features.cols(), rows = features.rows(), "fitted standardizer");
        Ok(&*self.params.insert(StandardizationParams {
            mean: mean.into_vec(),
            variance: variance.into_vec(),
        }))
    }

    /// Standardizes with the stored parameters, or fits them first if there are none.
    pub fn standardize(&mut self, features: &Matrix) -> Result<Matrix> {
        if !self.is_fitted() {
            self.fit(features)?;
        }
        self.transform(features)
    }

    /// `(x - mean) / sqrt(variance)` column-wise, using the stored parameters only.
    pub fn transform(&self, features: &Matrix) -> Result<Matrix> {
        let params = self.params.as_ref().ok_or_else(|| {
            RegressionError::InvalidInput("standardizer has not been fitted".to_string())
        })?;
        if features.ndim() != 2 || features.cols() != params.mean.len() {
            return Err(RegressionError::InvalidInput(format!(
                "expected {} feature columns, got shape {:?}",
                params.mean.len(),
                features.shape()
            )));
        }
        let cols = params.mean.len();
        let mean = Matrix::new(params.mean.clone(), vec![1, cols]);
        let std_dev = functional::sqrt(&Matrix::new(params.variance.clone(), vec![1, cols]));
        functional::div(&functional::sub(features, &mean)?, &std_dev)
    }

    /// Prepends a column of ones so a bias can be learned through a plain matrix product.
    /// Must run after standardization, otherwise the ones column would be standardized away.
    pub fn augment(features: &Matrix) -> Result<Matrix> {
        functional::prepend_column(features, 1.0)
    }

    /// `augment(standardize(features))`
    pub fn process(&mut self, features: &Matrix) -> Result<Matrix> {
        let standardized = self.standardize(features)?;
        Self::augment(&standardized)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_zero_variance_column_becomes_zeros() {
        let features = Matrix::from([[5.0, 1.0], [5.0, 2.0], [5.0, 3.0]]);
        let mut standardizer = Standardizer::new();
        let standardized = standardizer.standardize(&features).unwrap();

        assert!(standardized.iter().all(|x| x.is_finite()));
        for i in 0..3 {
            assert_eq!(standardized[[i, 0]], 0.0);
        }
        assert_eq!(standardizer.params().unwrap().variance[0], 1.0);
    }

    #[test]
    fn test_standardized_columns_have_zero_mean_unit_variance() {
        let features = Matrix::from([[1.0, 100.0], [2.0, 300.0], [3.0, 200.0], [6.0, 400.0]]);
        let standardized = Standardizer::new().standardize(&features).unwrap();
        let (mean, variance) = functional::moments(&standardized).unwrap();
        for j in 0..2 {
            assert_abs_diff_eq!(mean[[0, j]], 0.0, epsilon = 1e-12);
            assert_abs_diff_eq!(variance[[0, j]], 1.0, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_second_call_reuses_parameters() {
        let features = Matrix::from([[1.0], [2.0], [3.0]]);
        let mut standardizer = Standardizer::new();
        let first = standardizer.standardize(&features).unwrap();
        let params = standardizer.params().cloned();
        let second = standardizer.standardize(&features).unwrap();

        assert_eq!(first, second);
        assert_eq!(standardizer.params().cloned(), params);
    }

    #[test]
    fn test_test_data_uses_training_statistics() {
        let train = Matrix::from([[0.0], [2.0], [4.0]]);
        let test = Matrix::from([[100.0], [102.0]]);
        let mut standardizer = Standardizer::new();
        standardizer.standardize(&train).unwrap();
        let stored = standardizer.params().cloned().unwrap();

        let standardized = standardizer.standardize(&test).unwrap();

        assert_eq!(standardizer.params().unwrap(), &stored);
        assert_abs_diff_eq!(stored.mean[0], 2.0);
        let std_dev = (8.0f64 / 3.0).sqrt();
        assert_abs_diff_eq!(standardized[[0, 0]], 98.0 / std_dev, epsilon = 1e-12);
        assert_abs_diff_eq!(standardized[[1, 0]], 100.0 / std_dev, epsilon = 1e-12);
    }

    #[test]
    fn test_augment_prepends_ones() {
        let processed = Standardizer::new()
            .process(&Matrix::from([[1.0], [3.0]]))
            .unwrap();
        assert_eq!(processed, Matrix::from([[1.0, -1.0], [1.0, 1.0]]));
    }

    #[test]
    fn test_transform_rejects_wrong_width() {
        let mut standardizer = Standardizer::new();
        standardizer.fit(&Matrix::from([[1.0, 2.0], [3.0, 4.0]])).unwrap();
        assert!(standardizer.transform(&Matrix::from([[1.0], [2.0]])).is_err());
        assert!(Standardizer::new().transform(&Matrix::from([[1.0]])).is_err());
    }
}
