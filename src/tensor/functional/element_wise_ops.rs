use crate::error::{RegressionError, Result};
use crate::tensor::numeric::*;
use crate::tensor::utils::{broadcast_shape, IndexIterator};
use crate::tensor::{Tensor, TensorLike};

pub fn map<T, F>(tensor: &Tensor<T>, f: F) -> Tensor<T>
where
    T: Numeric,
    F: Fn(T) -> T,
{
    let array = tensor.array.iter().map(|&x| f(x)).collect();
    Tensor::new(array, tensor.shape.clone())
}

/// Applies `f` pairwise, broadcasting `left` and `right` against each other.
pub fn zip_with<T, F>(
    op: &'static str,
    left: &Tensor<T>,
    right: &Tensor<T>,
    f: F,
) -> Result<Tensor<T>>
where
    T: Numeric,
    F: Fn(T, T) -> T,
{
    if left.shape == right.shape {
        let array = left
            .array
            .iter()
            .zip(right.array.iter())
            .map(|(&x, &y)| f(x, y))
            .collect();
        return Ok(Tensor::new(array, left.shape.clone()));
    }
    let max_shape = broadcast_shape(op, left.shape(), right.shape())?;
    let mut array = Vec::with_capacity(max_shape.iter().product());
    for idx in IndexIterator::new(max_shape.clone()) {
        array.push(f(*left.get_broadcast(&idx)?, *right.get_broadcast(&idx)?));
    }
    Ok(Tensor::new(array, max_shape))
}

/// ```
/// # use light_regression::tensor::*;
/// let tensor1 = Tensor::new_with_filler(vec![4, 4], 1);
/// let tensor2 = Tensor::new((0..32).collect(), vec![2, 4, 4]);
/// let tensor3 = Tensor::new((1..33).collect(), vec![2, 4, 4]);
/// assert_eq!(functional::add(&tensor2, &tensor1).unwrap(), tensor3);
/// assert_eq!(&tensor1 + &tensor2, tensor3);
/// ```
pub fn add<T: Numeric>(left: &Tensor<T>, right: &Tensor<T>) -> Result<Tensor<T>> {
    zip_with("add", left, right, |x, y| x + y)
}

pub fn sub<T: Numeric>(left: &Tensor<T>, right: &Tensor<T>) -> Result<Tensor<T>> {
    zip_with("sub", left, right, |x, y| x - y)
}

/// Element-wise (Hadamard) product. See [`super::matmul`] for the matrix product.
pub fn mul<T: Numeric>(left: &Tensor<T>, right: &Tensor<T>) -> Result<Tensor<T>> {
    zip_with("mul", left, right, |x, y| x * y)
}

pub fn div<T: Numeric>(left: &Tensor<T>, right: &Tensor<T>) -> Result<Tensor<T>> {
    zip_with("div", left, right, |x, y| x / y)
}

pub fn add_scalar<T: Numeric>(tensor: &Tensor<T>, value: T) -> Tensor<T> {
    map(tensor, |x| x + value)
}

pub fn powi<T: Numeric + Float>(tensor: &Tensor<T>, n: i32) -> Tensor<T> {
    map(tensor, |x| x.powi(n))
}

pub fn sqrt<T: Numeric + Float>(tensor: &Tensor<T>) -> Tensor<T> {
    map(tensor, |x| x.sqrt())
}

pub fn ln<T: Numeric + Float>(tensor: &Tensor<T>) -> Tensor<T> {
    map(tensor, |x| x.ln())
}

pub fn exp<T: Numeric + Float>(tensor: &Tensor<T>) -> Tensor<T> {
    map(tensor, |x| x.exp())
}

pub fn sigmoid<T: Numeric + Float>(tensor: &Tensor<T>) -> Tensor<T> {
    map(tensor, |x| T::one() / (T::one() + (-x).exp()))
}

/// Softmax over each row of a matrix. Every output row sums to one.
///
/// The row maximum is subtracted before exponentiating so large logits do not overflow.
pub fn softmax_rows<T: Numeric + Float>(tensor: &Tensor<T>) -> Result<Tensor<T>> {
    if tensor.ndim() != 2 {
        return Err(RegressionError::InvalidInput(format!(
            "softmax_rows expects a matrix, got shape {:?}",
            tensor.shape()
        )));
    }
    let cols = tensor.cols();
    if cols == 0 {
        return Ok(tensor.clone());
    }
    let mut shifted = Vec::with_capacity(tensor.count());
    for row in tensor.array.chunks(cols) {
        let row_max = row.iter().copied().fold(T::neg_infinity(), T::max);
        shifted.extend(row.iter().map(|&x| x - row_max));
    }
    let mut exponentials = exp(&Tensor::new(shifted, tensor.shape.clone()));
    for row in exponentials.array.chunks_mut(cols) {
        let total = row.iter().fold(T::zero(), |acc, &e| acc + e);
        for e in row.iter_mut() {
            *e = *e / total;
        }
    }
    Ok(exponentials)
}

#[test]
fn test_add_broadcasts_leading_axis() {
    let tensor1 = Tensor::new_with_filler(vec![4, 4], 1);
    let tensor2 = Tensor::new((0..32).collect(), vec![2, 4, 4]);
    let tensor3 = Tensor::new((1..33).collect(), vec![2, 4, 4]);
    assert_eq!(&tensor2 + &tensor1, tensor3);
    assert_eq!(&tensor1 + &tensor2, tensor3);
}

#[test]
fn test_incompatible_shapes_are_an_error() {
    let left = Tensor::new_with_filler(vec![2, 3], 1.0);
    let right = Tensor::new_with_filler(vec![3, 2], 1.0);
    assert!(matches!(
        sub(&left, &right),
        Err(RegressionError::ShapeMismatch { op: "sub", .. })
    ));
}

#[test]
fn test_sigmoid() {
    let out = sigmoid(&Tensor::from([0.0, 1000.0, -1000.0]));
    assert_eq!(out.as_slice(), &[0.5, 1.0, 0.0]);
}

#[test]
fn test_softmax_rows_sum_to_one() {
    let logits = Tensor::from([[1.0, 2.0, 3.0], [1000.0, 1000.0, 1000.0], [-5.0, 0.0, 5.0]]);
    let probabilities = softmax_rows(&logits).unwrap();
    for i in 0..3 {
        let total: f64 = probabilities.row(i).unwrap().iter().sum();
        assert!((total - 1.0).abs() < 1e-12, "row {i} sums to {total}");
    }
    assert!((probabilities[[1, 0]] - 1.0 / 3.0).abs() < 1e-12);
    assert!(probabilities[[0, 2]] > probabilities[[0, 1]]);
}

#[test]
fn test_softmax_rows_is_normalised_exp() {
    let logits = Tensor::from([[0.0, 1.0_f64.ln(), 3.0_f64.ln()]]);
    for (e, expected) in exp(&logits).iter().zip([1.0, 1.0, 3.0]) {
        assert!((e - expected).abs() < 1e-12);
    }
    let probabilities = softmax_rows(&logits).unwrap();
    for (p, expected) in probabilities.iter().zip([0.2, 0.2, 0.6]) {
        assert!((p - expected).abs() < 1e-12);
    }
    let empty = Tensor::<f64>::zeros(vec![2, 0]);
    assert_eq!(softmax_rows(&empty).unwrap().shape(), &[2, 0]);
}
