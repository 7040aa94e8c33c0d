use rayon::prelude::*;

use crate::error::{RegressionError, Result};
use crate::tensor::numeric::*;
use crate::tensor::{Tensor, TensorLike};

/// Matrix product of two rank-2 tensors.
///
/// Output rows are filled in parallel; each cell is accumulated in the same order
/// regardless of scheduling, so results are reproducible.
///
/// ```
/// # use light_regression::tensor::*;
/// let matrix = Tensor::new(vec![0, 1, 2, 3], vec![2, 2]);
/// let e1 = Tensor::new(vec![0, 1], vec![2, 1]);
/// let diag = Tensor::new(vec![1, 1], vec![2, 1]);
///
/// assert_eq!(functional::matmul(&matrix, &diag).unwrap(), Tensor::new(vec![1, 5], vec![2, 1]));
/// assert_eq!(functional::matmul(&matrix, &e1).unwrap(), Tensor::new(vec![1, 3], vec![2, 1]));
/// ```
pub fn matmul<T: Numeric>(left: &Tensor<T>, right: &Tensor<T>) -> Result<Tensor<T>> {
    if left.ndim() != 2 || right.ndim() != 2 || left.shape[1] != right.shape[0] {
        return Err(RegressionError::shape_mismatch("matmul", left.shape(), right.shape()));
    }
    let (n, k, m) = (left.shape[0], left.shape[1], right.shape[1]);
    let mut array = vec![T::zero(); n * m];
    if m > 0 {
        array
            .par_chunks_mut(m)
            .enumerate()
            .for_each(|(i, out_row)| {
                let left_row = &left.array[i * k..(i + 1) * k];
                for (p, &l) in left_row.iter().enumerate() {
                    let right_row = &right.array[p * m..(p + 1) * m];
                    for (out, &r) in out_row.iter_mut().zip(right_row.iter()) {
                        *out += l * r;
                    }
                }
            });
    }
    Ok(Tensor::new(array, vec![n, m]))
}

pub fn transpose<T: Numeric>(tensor: &Tensor<T>) -> Result<Tensor<T>> {
    if tensor.ndim() != 2 {
        return Err(RegressionError::InvalidInput(format!(
            "transpose expects a matrix, got shape {:?}",
            tensor.shape()
        )));
    }
    let (rows, cols) = (tensor.shape[0], tensor.shape[1]);
    let mut array = Vec::with_capacity(rows * cols);
    for j in 0..cols {
        for i in 0..rows {
            array.push(tensor.array[i * cols + j]);
        }
    }
    Ok(Tensor::new(array, vec![cols, rows]))
}

/// generalised dot product: the accumulated sum of the element-wise product.
pub fn dot<T: Numeric>(left: &Tensor<T>, right: &Tensor<T>) -> Result<T> {
    if !left.same_shape(right) {
        return Err(RegressionError::shape_mismatch("dot", left.shape(), right.shape()));
    }
    let mut result = T::zero();
    for (&x, &y) in left.array.iter().zip(right.array.iter()) {
        result += x * y;
    }
    Ok(result)
}

/// Inserts a constant column in front of the first column of a matrix.
pub fn prepend_column<T: Numeric>(tensor: &Tensor<T>, value: T) -> Result<Tensor<T>> {
    if tensor.ndim() != 2 {
        return Err(RegressionError::InvalidInput(format!(
            "prepend_column expects a matrix, got shape {:?}",
            tensor.shape()
        )));
    }
    let (rows, cols) = (tensor.shape[0], tensor.shape[1]);
    let mut array = Vec::with_capacity(rows * (cols + 1));
    for i in 0..rows {
        array.push(value);
        array.extend_from_slice(&tensor.array[i * cols..(i + 1) * cols]);
    }
    Ok(Tensor::new(array, vec![rows, cols + 1]))
}

#[test]
fn test_matmul_2x3_3x2() {
    let left = Tensor::from([[1, 2, 3], [4, 5, 6]]);
    let right = Tensor::from([[7, 8], [9, 10], [11, 12]]);
    assert_eq!(
        matmul(&left, &right).unwrap(),
        Tensor::from([[58, 64], [139, 154]])
    );
    assert!(matmul(&left, &left).is_err());
}

#[test]
fn test_transpose() {
    let matrix = Tensor::from([[1, 2, 3], [4, 5, 6]]);
    let transposed = transpose(&matrix).unwrap();
    assert_eq!(transposed, Tensor::from([[1, 4], [2, 5], [3, 6]]));
    assert_eq!(transpose(&transposed).unwrap(), matrix);
}

#[test]
fn test_dot() {
    let v = Tensor::new(vec![0, 1, 2], vec![3]);
    assert_eq!(dot(&v, &v).unwrap(), 5);
}

#[test]
fn test_prepend_column() {
    let matrix = Tensor::from([[2.0, 3.0], [4.0, 5.0]]);
    assert_eq!(
        prepend_column(&matrix, 1.0).unwrap(),
        Tensor::from([[1.0, 2.0, 3.0], [1.0, 4.0, 5.0]])
    );
}
