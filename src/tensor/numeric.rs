pub use num::{Float, One, Zero};
use std::cmp::PartialEq;

pub use std::ops::{Add, AddAssign, Div, Mul, Neg, Sub, SubAssign};

/// Element types a `Tensor` can hold.
///
/// `Send + Sync` lets row-wise kernels run on the rayon pool.
pub trait Numeric:
    Add<Output = Self>
    + AddAssign
    + Copy
    + Clone
    + One
    + Mul<Output = Self>
    + Sub<Output = Self>
    + SubAssign
    + Div<Output = Self>
    + PartialEq
    + PartialOrd
    + Zero
    + Send
    + Sync
    + std::fmt::Debug
{
}
// https://stackoverflow.com/questions/42381185/specifying-generic-parameter-to-belong-to-a-small-set-of-types
macro_rules! numeric_impl {
    ($($t: ty),+) => {
        $(
            impl Numeric for $t {}
        )+
    }
}

numeric_impl!(usize, u8, u32, u64, u128, i8, i32, i64, i128, f32, f64);

/// Lossless-enough conversion of a count into a float element type.
pub(crate) fn from_count<T: Float>(count: usize) -> T {
    <T as num::NumCast>::from(count).unwrap_or_else(T::nan)
}
