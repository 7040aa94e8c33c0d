mod dense;
pub mod functional;
mod numeric;
mod tensor_like;
mod tensor_view;
mod utils;

pub use dense::*;
pub use numeric::*;
pub(crate) use numeric::from_count;
pub use tensor_like::*;
pub use tensor_view::*;
pub use utils::{increment_index, ElementIterator, IndexIterator};

/// The float matrix every model in this crate works on.
pub type Matrix = Tensor<f64>;
