use std::ops::Range;

use crate::error::{RegressionError, Result};
use crate::tensor::{from_count, functional, Float, Numeric, Tensor, TensorLike};

/// Contiguous row ranges of one pass: `rows / batch_size` full batches.
///
/// Trailing rows that do not fill a whole batch are left out of the pass.
///
/// ```
/// # use light_regression::optim::batch_ranges;
/// let batches: Vec<_> = batch_ranges(105, 10).collect();
/// assert_eq!(batches.len(), 10);
/// assert_eq!(batches.last(), Some(&(90..100)));
/// ```
pub fn batch_ranges(rows: usize, batch_size: usize) -> impl Iterator<Item = Range<usize>> {
    let batches = if batch_size == 0 { 0 } else { rows / batch_size };
    (0..batches).map(move |j| j * batch_size..(j + 1) * batch_size)
}

/// `features^T . residuals / rows`, the mean gradient of a batch.
pub fn gradient<T: Numeric + Float>(
    features: &Tensor<T>,
    residuals: &Tensor<T>,
) -> Result<Tensor<T>> {
    if features.rows() != residuals.rows() {
        return Err(RegressionError::shape_mismatch(
            "gradient",
            features.shape(),
            residuals.shape(),
        ));
    }
    let rows: T = from_count(features.rows());
    let slopes = functional::matmul(&functional::transpose(features)?, residuals)?;
    Ok(slopes.map(|x| x / rows))
}

/// `weights <- weights - learning_rate * gradient`, in place.
pub fn sgd_step<T: Numeric>(
    weights: &mut Tensor<T>,
    gradient: &Tensor<T>,
    learning_rate: T,
) -> Result<()> {
    weights.sub_assign_scaled(gradient, learning_rate)
}

#[test]
fn test_batch_ranges_drop_remainder() {
    let ranges: Vec<_> = batch_ranges(105, 10).collect();
    assert_eq!(ranges.len(), 10);
    assert_eq!(ranges.iter().map(|r| r.len()).sum::<usize>(), 100);
    assert_eq!(ranges[0], 0..10);
    assert_eq!(batch_ranges(9, 10).count(), 0);
    assert_eq!(batch_ranges(10, 10).collect::<Vec<_>>(), vec![0..10]);
}

#[test]
fn test_gradient_of_perfect_fit_is_zero() {
    let features = Tensor::from([[1.0, 2.0], [1.0, 3.0]]);
    let residuals = Tensor::from([[0.0], [0.0]]);
    assert_eq!(gradient(&features, &residuals).unwrap(), Tensor::from([[0.0], [0.0]]));
}

#[test]
fn test_sgd_step() {
    let features = Tensor::from([[1.0, 1.0], [1.0, -1.0]]);
    let residuals = Tensor::from([[2.0], [4.0]]);
    let slope = gradient(&features, &residuals).unwrap();
    assert_eq!(slope, Tensor::from([[3.0], [-1.0]]));

    let mut weights = Tensor::from([[0.0], [0.0]]);
    sgd_step(&mut weights, &slope, 0.5).unwrap();
    assert_eq!(weights, Tensor::from([[-1.5], [0.5]]));
}
