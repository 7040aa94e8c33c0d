use super::numeric::*;
use super::utils::ElementIterator;
use super::{Tensor, TensorLike};
use crate::error::{RegressionError, Result};

#[derive(Debug, PartialEq, Clone, Copy)]
pub struct SliceRange {
    /// inclusive
    pub(in crate::tensor) start: usize,
    /// exclusive
    pub(in crate::tensor) end: usize,
}

impl SliceRange {
    pub fn new(start: usize, end: usize) -> SliceRange {
        assert!(start <= end, "slice start {start} is past its end {end}");
        SliceRange { start, end }
    }

    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }
}

/// A borrowed window into a `Tensor`.
#[derive(Debug, Clone)]
pub struct TensorView<'a, T>
where
    T: Numeric,
{
    tensor: &'a Tensor<T>,
    shape: Vec<usize>,
    offset: Vec<SliceRange>,
}

impl<'a, T> TensorView<'a, T>
where
    T: Numeric,
{
    pub fn new(tensor: &'a Tensor<T>, offset: Vec<SliceRange>) -> Result<TensorView<'a, T>> {
        if offset.len() != tensor.shape().len() {
            return Err(RegressionError::InvalidInput(format!(
                "a view over shape {:?} needs {} slice ranges, got {}",
                tensor.shape(),
                tensor.shape().len(),
                offset.len()
            )));
        }
        let mut shape = Vec::with_capacity(offset.len());
        for (slice_range, &tensor_dim) in offset.iter().zip(tensor.shape().iter()) {
            // NOTE: all intervals are half open
            if slice_range.end > tensor_dim {
                return Err(RegressionError::IndexOutOfBounds {
                    index: vec![slice_range.end],
                    shape: tensor.shape().to_vec(),
                });
            }
            shape.push(slice_range.len());
        }
        Ok(TensorView {
            tensor,
            shape,
            offset,
        })
    }

    /// Whether the view is a run of whole rows, i.e. one contiguous block of the parent.
    fn is_contiguous(&self) -> bool {
        self.offset
            .iter()
            .zip(self.tensor.shape().iter())
            .skip(1)
            .all(|(range, &dim)| range.start == 0 && range.end == dim)
    }
}

impl<'a, T> TensorLike for TensorView<'a, T>
where
    T: Numeric,
{
    type Elem = T;

    fn shape(&self) -> &[usize] {
        &self.shape
    }

    fn get(&self, index: &[usize]) -> Result<&T> {
        if index.len() != self.shape.len() || index.iter().zip(&self.shape).any(|(i, d)| i >= d) {
            return Err(RegressionError::IndexOutOfBounds {
                index: index.to_vec(),
                shape: self.shape.clone(),
            });
        }
        let shifted: Vec<usize> = index
            .iter()
            .zip(self.offset.iter())
            .map(|(idx, range)| range.start + idx)
            .collect();
        self.tensor.get(&shifted)
    }

    fn to_tensor(&self) -> Tensor<T> {
        if self.is_contiguous() && !self.offset.is_empty() {
            let stride: usize = self.tensor.shape().iter().skip(1).product();
            let start = self.offset[0].start * stride;
            let end = self.offset[0].end * stride;
            return Tensor::new(self.tensor.array[start..end].to_vec(), self.shape.clone());
        }
        let array = ElementIterator::new(self).collect();
        Tensor::new(array, self.shape.clone())
    }
}

impl<'a, T, V> PartialEq<V> for TensorView<'a, T>
where
    T: Numeric,
    V: TensorLike<Elem = T>,
{
    fn eq(&self, other: &V) -> bool {
        if other.shape() != self.shape.as_slice() {
            return false;
        }
        self.iter_indices()
            .all(|idx| self.get(&idx).ok() == other.get(&idx).ok())
    }
}

#[test]
fn test_view_of_middle_block() {
    let tensor = Tensor::new((0..12).collect(), vec![3, 4]);
    let view = tensor
        .slice(vec![SliceRange::new(1, 3), SliceRange::new(2, 4)])
        .unwrap();
    assert_eq!(view.shape(), &[2, 2]);
    assert_eq!(view.get(&[1, 1]).unwrap(), &11);
    assert_eq!(view.to_tensor(), Tensor::from([[6, 7], [10, 11]]));
    assert_eq!(view.elements().sum::<i32>(), 6 + 7 + 10 + 11);
}

#[test]
fn test_row_view_is_contiguous_copy() {
    let tensor = Tensor::new((0..12).collect(), vec![4, 3]);
    let view = tensor.row_view(1, 3).unwrap();
    assert!(view.is_contiguous());
    assert_eq!(view.to_tensor(), Tensor::from([[3, 4, 5], [6, 7, 8]]));
    assert!(view == Tensor::from([[3, 4, 5], [6, 7, 8]]));
}

#[test]
fn test_view_rejects_out_of_range_slices() {
    let tensor = Tensor::new((0..12).collect::<Vec<i32>>(), vec![4, 3]);
    assert!(tensor.row_view(2, 5).is_err());
    assert!(tensor.slice(vec![SliceRange::new(0, 1)]).is_err());
}
