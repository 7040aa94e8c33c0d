use std::ops::{Add, Div, Index, Mul, Sub};

use super::functional;
use super::numeric::*;
use super::tensor_like::*;
use super::tensor_view::*;
use super::utils::global_index;
use crate::error::{RegressionError, Result};

/// The core `struct` in this library: an owned, row-major block of numbers.
///
/// Every operation hands back a new tensor. The only in-place mutation is
/// [`Tensor::sub_assign_scaled`], which the optimiser uses for the weight update.
#[derive(Debug, Clone, PartialEq)]
pub struct Tensor<T>
where
    T: Numeric,
{
    pub(in crate::tensor) array: Vec<T>,
    pub(in crate::tensor) shape: Vec<usize>,
}

impl<T> Tensor<T>
where
    T: Numeric,
{
    pub fn new(array: Vec<T>, shape: Vec<usize>) -> Tensor<T> {
        let len: usize = shape.iter().product();
        assert_eq!(
            len,
            array.len(),
            "shape {shape:?} needs {len} elements, got {}",
            array.len()
        );
        Tensor { array, shape }
    }

    /// Note! An empty shape constructs a scalar.
    pub fn new_with_filler(shape: Vec<usize>, filler: T) -> Tensor<T> {
        let total = shape.iter().product();
        Tensor {
            array: vec![filler; total],
            shape,
        }
    }

    pub fn zeros(shape: Vec<usize>) -> Tensor<T> {
        Tensor::new_with_filler(shape, T::zero())
    }

    pub fn scalar(scalar: T) -> Tensor<T> {
        Tensor {
            array: vec![scalar],
            shape: vec![],
        }
    }

    /// Builds a `rows x cols` matrix from a sequence of rows.
    ///
    /// ```
    /// # use light_regression::tensor::*;
    /// let matrix = Tensor::from_rows(&[vec![1.0, 2.0], vec![3.0, 4.0], vec![5.0, 6.0]]).unwrap();
    /// assert_eq!(matrix.shape(), &[3, 2]);
    /// assert_eq!(matrix[[2, 1]], 6.0);
    /// assert!(Tensor::from_rows(&[vec![1.0, 2.0], vec![3.0]]).is_err());
    /// ```
    pub fn from_rows<R>(rows: &[R]) -> Result<Tensor<T>>
    where
        R: AsRef<[T]>,
    {
        let cols = rows.first().map(|row| row.as_ref().len()).unwrap_or(0);
        let mut array = Vec::with_capacity(rows.len() * cols);
        for (i, row) in rows.iter().enumerate() {
            let row = row.as_ref();
            if row.len() != cols {
                return Err(RegressionError::InvalidInput(format!(
                    "row {i} has {} columns, expected {cols}",
                    row.len()
                )));
            }
            array.extend_from_slice(row);
        }
        Ok(Tensor {
            array,
            shape: vec![rows.len(), cols],
        })
    }

    /// A `len x 1` column matrix.
    pub fn column(values: Vec<T>) -> Tensor<T> {
        let rows = values.len();
        Tensor::new(values, vec![rows, 1])
    }

    pub fn rows(&self) -> usize {
        self.shape.first().copied().unwrap_or(1)
    }

    pub fn cols(&self) -> usize {
        self.shape.get(1).copied().unwrap_or(1)
    }

    pub fn as_slice(&self) -> &[T] {
        &self.array
    }

    pub fn into_vec(self) -> Vec<T> {
        self.array
    }

    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.array.iter()
    }

    /// Row `i` of a matrix as a contiguous slice.
    pub fn row(&self, i: usize) -> Result<&[T]> {
        if self.shape.len() != 2 || i >= self.rows() {
            return Err(RegressionError::IndexOutOfBounds {
                index: vec![i],
                shape: self.shape.clone(),
            });
        }
        let cols = self.cols();
        Ok(&self.array[i * cols..(i + 1) * cols])
    }

    pub fn to_rows(&self) -> Vec<Vec<T>> {
        let cols = self.cols().max(1);
        self.array.chunks(cols).map(|row| row.to_vec()).collect()
    }

    /// The single value of a one-element tensor (scalar, `[1]`, `[1, 1]`, ...).
    pub fn elem(&self) -> Result<T> {
        match self.array.as_slice() {
            [value] => Ok(*value),
            _ => Err(RegressionError::InvalidInput(format!(
                "expected a single element, tensor has shape {:?}",
                self.shape
            ))),
        }
    }

    pub fn map<F>(&self, f: F) -> Tensor<T>
    where
        F: Fn(T) -> T,
    {
        functional::map(self, f)
    }

    /// A view over rows `start..end`, all columns.
    pub fn row_view(&self, start: usize, end: usize) -> Result<TensorView<'_, T>> {
        let mut offset = vec![SliceRange::new(start, end)];
        offset.extend(self.shape.iter().skip(1).map(|&dim| SliceRange::new(0, dim)));
        self.slice(offset)
    }

    pub fn slice(&self, offset: Vec<SliceRange>) -> Result<TensorView<'_, T>> {
        TensorView::new(self, offset)
    }

    /// `self -= factor * other`, in place. Shapes must match exactly.
    pub fn sub_assign_scaled(&mut self, other: &Tensor<T>, factor: T) -> Result<()> {
        if self.shape != other.shape {
            return Err(RegressionError::shape_mismatch(
                "sub_assign_scaled",
                &self.shape,
                &other.shape,
            ));
        }
        for (w, &g) in self.array.iter_mut().zip(other.array.iter()) {
            *w -= factor * g;
        }
        Ok(())
    }

    pub(in crate::tensor) fn get_broadcast(&self, index: &[usize]) -> Result<&T> {
        let global_idx = global_index(&self.shape, index)?;
        Ok(&self.array[global_idx])
    }

    fn check_index(&self, index: &[usize]) -> Result<()> {
        let in_bounds = index.len() == self.shape.len()
            && index.iter().zip(self.shape.iter()).all(|(i, dim)| i < dim);
        if in_bounds {
            Ok(())
        } else {
            Err(RegressionError::IndexOutOfBounds {
                index: index.to_vec(),
                shape: self.shape.clone(),
            })
        }
    }
}

impl<T> TensorLike for Tensor<T>
where
    T: Numeric,
{
    type Elem = T;

    fn shape(&self) -> &[usize] {
        &self.shape
    }

    /// ```
    /// # use light_regression::tensor::*;
    /// let matrix = Tensor::new((0..6).collect(), vec![2, 3]);
    /// assert_eq!(matrix.get(&[1, 0]).unwrap(), &3);
    /// assert!(matrix.get(&[2, 0]).is_err());
    /// assert!(matrix.get(&[0]).is_err());
    /// ```
    fn get(&self, index: &[usize]) -> Result<&T> {
        self.check_index(index)?;
        self.get_broadcast(index)
    }

    fn to_tensor(&self) -> Tensor<T> {
        self.clone()
    }
}

impl<T> Index<[usize; 2]> for Tensor<T>
where
    T: Numeric,
{
    type Output = T;

    fn index(&self, [i, j]: [usize; 2]) -> &Self::Output {
        assert_eq!(self.shape.len(), 2, "matrix indexing on shape {:?}", self.shape);
        assert!(
            i < self.shape[0] && j < self.shape[1],
            "index [{i}, {j}] out of bounds for shape {:?}",
            self.shape
        );
        &self.array[i * self.shape[1] + j]
    }
}

impl<T, const R: usize, const C: usize> From<[[T; C]; R]> for Tensor<T>
where
    T: Numeric,
{
    fn from(value: [[T; C]; R]) -> Self {
        let array = value.iter().flat_map(|row| row.iter().copied()).collect();
        Tensor {
            array,
            shape: vec![R, C],
        }
    }
}

impl<T, const N: usize> From<[T; N]> for Tensor<T>
where
    T: Numeric,
{
    fn from(value: [T; N]) -> Self {
        Tensor {
            array: value.to_vec(),
            shape: vec![N],
        }
    }
}

// Element-wise operators. They broadcast like the `functional` versions and
// panic with the shape error when the operands are incompatible.
macro_rules! element_wise_operator {
    ($trait: ident, $method: ident, $func: path) => {
        impl<T> $trait<&Tensor<T>> for &Tensor<T>
        where
            T: Numeric,
        {
            type Output = Tensor<T>;

            fn $method(self, right: &Tensor<T>) -> Tensor<T> {
                match $func(self, right) {
                    Ok(result) => result,
                    Err(e) => panic!("{}", e),
                }
            }
        }
    };
}

element_wise_operator!(Add, add, functional::add);
element_wise_operator!(Sub, sub, functional::sub);
element_wise_operator!(Mul, mul, functional::mul);
element_wise_operator!(Div, div, functional::div);

impl<T> Neg for &Tensor<T>
where
    T: Numeric + Neg<Output = T>,
{
    type Output = Tensor<T>;
    fn neg(self) -> Self::Output {
        self.map(|v| -v)
    }
}

#[test]
fn test_new_with_filler() {
    let vec = Tensor::new_with_filler(vec![4], 4);
    assert_eq!(vec.shape(), &[4]);
    assert_eq!(vec.get(&[2]).unwrap(), &4);
}

#[test]
fn test_get_2x2x2() {
    let matrix = Tensor::new(vec![0, 1, 2, 3, 4, 5, 6, 7], vec![2, 2, 2]);
    assert_eq!(*matrix.get(&[0, 0, 0]).unwrap(), 0);
    assert_eq!(*matrix.get(&[0, 1, 0]).unwrap(), 2);
    assert_eq!(*matrix.get(&[1, 1, 1]).unwrap(), 7);
}

#[test]
fn test_elem_requires_single_value() {
    assert_eq!(Tensor::scalar(3.5).elem().unwrap(), 3.5);
    assert_eq!(Tensor::from([[2.0]]).elem().unwrap(), 2.0);
    assert!(Tensor::from([1.0, 2.0]).elem().is_err());
}

#[test]
fn test_sub_assign_scaled() {
    let mut weights = Tensor::from([[1.0], [2.0]]);
    weights
        .sub_assign_scaled(&Tensor::from([[0.5], [-1.0]]), 2.0)
        .unwrap();
    assert_eq!(weights, Tensor::from([[0.0], [4.0]]));
    assert!(weights
        .sub_assign_scaled(&Tensor::from([[0.5, 1.0]]), 1.0)
        .is_err());
}

#[test]
fn test_operators_broadcast_rows() {
    let matrix = Tensor::from([[1, 2, 3], [4, 5, 6]]);
    let row = Tensor::from([[1, 1, 1]]);
    assert_eq!(&matrix - &row, Tensor::from([[0, 1, 2], [3, 4, 5]]));
    assert_eq!(&matrix * &matrix, Tensor::from([[1, 4, 9], [16, 25, 36]]));
}
