//! Linear, logistic and multinomial logistic regression trained by batch gradient descent

mod objective;
mod regression;

pub use objective::*;
pub use regression::*;
