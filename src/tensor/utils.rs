use itertools::EitherOrBoth::{Both, Left, Right};
use itertools::Itertools;
use std::cmp::max;

use crate::error::{RegressionError, Result};
use crate::tensor::TensorLike;

/// Walks every element of a `TensorLike` in row-major order.
pub struct ElementIterator<'b, U>
where
    U: TensorLike,
{
    indices: IndexIterator,
    tensor_like: &'b U,
}

impl<'b, U> ElementIterator<'b, U>
where
    U: TensorLike,
{
    pub fn new(tensor_like: &'b U) -> ElementIterator<'b, U> {
        ElementIterator {
            indices: tensor_like.iter_indices(),
            tensor_like,
        }
    }
}

impl<'b, U> Iterator for ElementIterator<'b, U>
where
    U: TensorLike,
{
    type Item = U::Elem;
    fn next(&mut self) -> Option<Self::Item> {
        let index = self.indices.next()?;
        self.tensor_like.get(&index).ok().copied()
    }
}

pub struct IndexIterator {
    index: Vec<usize>,
    dimensions: Vec<usize>,
    first: bool,
}

impl IndexIterator {
    pub fn new(dimensions: Vec<usize>) -> IndexIterator {
        IndexIterator {
            index: vec![0; dimensions.len()],
            // an empty axis means there is nothing to visit
            first: dimensions.iter().all(|&dim| dim > 0),
            dimensions,
        }
    }
}

impl Iterator for IndexIterator {
    type Item = Vec<usize>;
    fn next(&mut self) -> Option<Self::Item> {
        if self.first {
            self.first = false;
            return Some(self.index.clone());
        }
        if self.dimensions.iter().any(|&dim| dim == 0) {
            return None;
        }
        if increment_index(&mut self.index, &self.dimensions) {
            return Some(self.index.clone());
        }
        None
    }
}

/// Advances `index` to the next position in row-major order.
/// Returns `false` once the last position has been passed.
pub fn increment_index(index: &mut [usize], shape: &[usize]) -> bool {
    for i in (0..index.len()).rev() {
        if index[i] + 1 < shape[i] {
            index[i] += 1;
            reset_trailing_indices(index, i);
            return true;
        }
    }
    false
}

fn reset_trailing_indices(index: &mut [usize], position: usize) {
    for idx in index.iter_mut().skip(position + 1) {
        *idx = 0;
    }
}

/// Maps a (possibly longer, broadcast) index onto the flat position inside `shape`.
///
/// Indices are aligned from the right. Axes of length 1 always resolve to position 0,
/// which is what makes broadcasting work.
pub(crate) fn global_index(shape: &[usize], index: &[usize]) -> Result<usize> {
    if index.len() < shape.len() {
        return Err(RegressionError::IndexOutOfBounds {
            index: index.to_vec(),
            shape: shape.to_vec(),
        });
    }
    let mut global_idx = 0;
    let mut multiplier = 1;
    for (&dim, &idx_dim) in shape.iter().rev().zip(index.iter().rev()) {
        if dim == 1 {
            continue;
        }
        if idx_dim >= dim {
            return Err(RegressionError::IndexOutOfBounds {
                index: index.to_vec(),
                shape: shape.to_vec(),
            });
        }
        global_idx += idx_dim * multiplier;
        multiplier *= dim;
    }
    Ok(global_idx)
}

/// Numpy-style broadcast of two shapes.
pub(crate) fn broadcast_shape(
    op: &'static str,
    left: &[usize],
    right: &[usize],
) -> Result<Vec<usize>> {
    let mut max_shape = Vec::with_capacity(max(left.len(), right.len()));
    for pair in left.iter().rev().zip_longest(right.iter().rev()) {
        let dim = match pair {
            Both(&l, &r) if l == r || r == 1 => l,
            Both(&l, &r) if l == 1 => r,
            Both(_, _) => return Err(RegressionError::shape_mismatch(op, left, right)),
            Left(&l) => l,
            Right(&r) => r,
        };
        max_shape.push(dim);
    }
    max_shape.reverse();
    Ok(max_shape)
}

#[test]
fn test_increment_index() {
    let mut index = vec![0, 0, 0];
    let dimensions = vec![2, 3, 2];
    let indices = vec![
        [0, 0, 1].to_vec(),
        [0, 1, 0].to_vec(),
        [0, 1, 1].to_vec(),
        [0, 2, 0].to_vec(),
        [0, 2, 1].to_vec(),
        [1, 0, 0].to_vec(),
        [1, 0, 1].to_vec(),
        [1, 1, 0].to_vec(),
        [1, 1, 1].to_vec(),
        [1, 2, 0].to_vec(),
        [1, 2, 1].to_vec(),
    ];
    for expected_idx in indices.into_iter() {
        let valid = increment_index(&mut index, &dimensions);
        assert!(valid);
        assert_eq!(index, expected_idx);
    }
    assert!(!increment_index(&mut index, &dimensions));
}

#[test]
fn test_index_iterator() {
    let index_iter = IndexIterator::new(vec![2, 2, 2]);
    assert_eq!(
        index_iter.collect::<Vec<_>>(),
        vec![
            [0, 0, 0].to_vec(),
            [0, 0, 1].to_vec(),
            [0, 1, 0].to_vec(),
            [0, 1, 1].to_vec(),
            [1, 0, 0].to_vec(),
            [1, 0, 1].to_vec(),
            [1, 1, 0].to_vec(),
            [1, 1, 1].to_vec(),
        ]
    );
}

#[test]
fn test_index_iterator_empty_axis() {
    assert_eq!(IndexIterator::new(vec![0, 3]).count(), 0);
    // a scalar has exactly one (empty) index
    assert_eq!(IndexIterator::new(vec![]).count(), 1);
}

#[test]
fn test_broadcast_shape() {
    assert_eq!(broadcast_shape("add", &[4, 3], &[1, 3]).unwrap(), vec![4, 3]);
    assert_eq!(broadcast_shape("add", &[4, 3], &[3]).unwrap(), vec![4, 3]);
    assert_eq!(broadcast_shape("add", &[4, 1], &[1, 3]).unwrap(), vec![4, 3]);
    assert!(broadcast_shape("add", &[4, 3], &[2, 3]).is_err());
}

#[test]
fn test_global_index_broadcasts_unit_axes() {
    assert_eq!(global_index(&[1, 3], &[5, 2]).unwrap(), 2);
    assert_eq!(global_index(&[2, 3], &[1, 1]).unwrap(), 4);
    assert!(global_index(&[2, 3], &[2, 0]).is_err());
}
