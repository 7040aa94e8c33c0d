use super::numeric::*;
use super::utils::{ElementIterator, IndexIterator};
use super::Tensor;
use crate::error::Result;

/// Shared read-only interface of owned tensors and borrowed views.
pub trait TensorLike: std::fmt::Debug {
    type Elem: Numeric;

    fn shape(&self) -> &[usize];

    /// Checked element access. `index` must have one entry per axis.
    fn get(&self, index: &[usize]) -> Result<&Self::Elem>;

    /// Convert self into a new owned `Tensor` -- if self is already a `Tensor` this is a clone.
    /// For a `TensorView` the new tensor has the shape of the view.
    fn to_tensor(&self) -> Tensor<Self::Elem>;

    fn ndim(&self) -> usize {
        self.shape().len()
    }

    fn count(&self) -> usize {
        self.shape().iter().product()
    }

    fn same_shape<U>(&self, other: &U) -> bool
    where
        U: TensorLike<Elem = Self::Elem>,
    {
        self.shape() == other.shape()
    }

    fn iter_indices(&self) -> IndexIterator {
        IndexIterator::new(self.shape().to_vec())
    }

    fn elements(&self) -> ElementIterator<'_, Self>
    where
        Self: Sized,
    {
        ElementIterator::new(self)
    }
}
