//! Small helpers for getting raw observations into trainable shape

use rand::seq::SliceRandom;
use rand::Rng;

use crate::error::{RegressionError, Result};
use crate::tensor::{Matrix, TensorLike};

/// One-hot encodes class indices into an `n x num_classes` matrix.
pub fn one_hot(classes: &[usize], num_classes: usize) -> Result<Matrix> {
    if num_classes == 0 {
        return Err(RegressionError::InvalidInput(
            "one-hot encoding needs at least one class".to_string(),
        ));
    }
    let mut array = vec![0.0; classes.len() * num_classes];
    for (row, &class) in classes.iter().enumerate() {
        if class >= num_classes {
            return Err(RegressionError::InvalidInput(format!(
                "class {class} in row {row} is outside 0..{num_classes}"
            )));
        }
        array[row * num_classes + class] = 1.0;
    }
    Ok(Matrix::new(array, vec![classes.len(), num_classes]))
}

/// Features with their labels, kept row-aligned.
#[derive(Debug, Clone, PartialEq)]
pub struct Dataset {
    pub features: Matrix,
    pub labels: Matrix,
}

/// Leading rows held out for testing, the rest for training.
#[derive(Debug, Clone, PartialEq)]
pub struct Split {
    pub features: Matrix,
    pub labels: Matrix,
    pub test_features: Matrix,
    pub test_labels: Matrix,
}

impl Dataset {
    pub fn new(features: Matrix, labels: Matrix) -> Result<Self> {
        if features.ndim() != 2 || labels.ndim() != 2 || features.rows() != labels.rows() {
            return Err(RegressionError::shape_mismatch(
                "dataset",
                features.shape(),
                labels.shape(),
            ));
        }
        Ok(Self { features, labels })
    }

    pub fn rows(&self) -> usize {
        self.features.rows()
    }

    /// Applies the same random row permutation to features and labels.
    pub fn shuffle<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        let mut order: Vec<usize> = (0..self.rows()).collect();
        order.shuffle(rng);
        self.features = permute_rows(&self.features, &order);
        self.labels = permute_rows(&self.labels, &order);
    }

    /// The first `test_rows` rows become the test set.
    pub fn split_test(&self, test_rows: usize) -> Result<Split> {
        let rows = self.rows();
        if test_rows == 0 || test_rows >= rows {
            return Err(RegressionError::InvalidInput(format!(
                "cannot hold out {test_rows} of {rows} rows for testing"
            )));
        }
        Ok(Split {
            test_features: self.features.row_view(0, test_rows)?.to_tensor(),
            test_labels: self.labels.row_view(0, test_rows)?.to_tensor(),
            features: self.features.row_view(test_rows, rows)?.to_tensor(),
            labels: self.labels.row_view(test_rows, rows)?.to_tensor(),
        })
    }
}

fn permute_rows(matrix: &Matrix, order: &[usize]) -> Matrix {
    let cols = matrix.cols();
    let source = matrix.as_slice();
    let array = order
        .iter()
        .flat_map(|&row| source[row * cols..(row + 1) * cols].iter().copied())
        .collect();
    Matrix::new(array, matrix.shape().to_vec())
}
