mod learning_rate;
mod sgd;

pub use learning_rate::*;
pub use sgd::*;
