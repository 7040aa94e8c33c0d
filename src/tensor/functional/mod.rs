//! Free-standing tensor kernels. The `&Tensor` operators delegate here.
mod element_wise_ops;
mod linalg;
mod reductions;

pub use element_wise_ops::*;
pub use linalg::*;
pub use reductions::*;
