use crate::error::{RegressionError, Result};
use crate::tensor::numeric::*;
use crate::tensor::{Tensor, TensorLike};

pub fn sum<T: Numeric>(tensor: &Tensor<T>) -> T {
    tensor.array.iter().fold(T::zero(), |acc, &x| acc + x)
}

/// Mean over every element.
pub fn mean<T: Numeric + Float>(tensor: &Tensor<T>) -> Result<T> {
    if tensor.array.is_empty() {
        return Err(RegressionError::InvalidInput(
            "cannot take the mean of an empty tensor".to_string(),
        ));
    }
    Ok(sum(tensor) / from_count(tensor.count()))
}

/// Per-column mean and population variance of a matrix, each returned as a `1 x cols` row.
pub fn moments<T: Numeric + Float>(tensor: &Tensor<T>) -> Result<(Tensor<T>, Tensor<T>)> {
    if tensor.ndim() != 2 || tensor.rows() == 0 {
        return Err(RegressionError::InvalidInput(format!(
            "moments need a non-empty matrix, got shape {:?}",
            tensor.shape()
        )));
    }
    let (rows, cols) = (tensor.rows(), tensor.cols());
    let n: T = from_count(rows);
    let mut mean = vec![T::zero(); cols];
    for row in tensor.array.chunks(cols.max(1)) {
        for (m, &x) in mean.iter_mut().zip(row.iter()) {
            *m += x;
        }
    }
    for m in mean.iter_mut() {
        *m = *m / n;
    }
    let mut variance = vec![T::zero(); cols];
    for row in tensor.array.chunks(cols.max(1)) {
        for ((v, &m), &x) in variance.iter_mut().zip(mean.iter()).zip(row.iter()) {
            let d = x - m;
            *v += d * d;
        }
    }
    for v in variance.iter_mut() {
        *v = *v / n;
    }
    Ok((
        Tensor::new(mean, vec![1, cols]),
        Tensor::new(variance, vec![1, cols]),
    ))
}

/// Column index of the largest value in each row. Ties go to the first column.
pub fn argmax_rows<T: Numeric>(tensor: &Tensor<T>) -> Result<Vec<usize>> {
    if tensor.ndim() != 2 || tensor.cols() == 0 {
        return Err(RegressionError::InvalidInput(format!(
            "argmax_rows expects a matrix with at least one column, got shape {:?}",
            tensor.shape()
        )));
    }
    let result = tensor
        .array
        .chunks(tensor.cols())
        .map(|row| {
            let mut best = 0;
            for (j, value) in row.iter().enumerate().skip(1) {
                if *value > row[best] {
                    best = j;
                }
            }
            best
        })
        .collect();
    Ok(result)
}

#[test]
fn test_moments() {
    let matrix = Tensor::from([[1.0, 10.0], [3.0, 10.0], [5.0, 10.0]]);
    let (mean, variance) = moments(&matrix).unwrap();
    assert_eq!(mean, Tensor::from([[3.0, 10.0]]));
    // population variance, not the sample estimate
    assert_eq!(variance.as_slice()[1], 0.0);
    assert!((variance.as_slice()[0] - 8.0 / 3.0).abs() < 1e-12);
}

#[test]
fn test_argmax_rows() {
    let matrix = Tensor::from([[0.1, 0.7, 0.2], [0.5, 0.5, 0.0], [0.0, 0.0, 1.0]]);
    assert_eq!(argmax_rows(&matrix).unwrap(), vec![1, 0, 2]);
}

#[test]
fn test_mean_of_empty_is_error() {
    let empty: Tensor<f64> = Tensor::zeros(vec![0, 2]);
    assert!(mean(&empty).is_err());
    assert!(moments(&empty).is_err());
}
