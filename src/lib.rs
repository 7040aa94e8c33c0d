//! Linear, logistic and multinomial logistic regression on a small dense tensor layer.
//!
//! ```
//! use light_regression::{Matrix, Options, Regression};
//!
//! let features = Matrix::column((0..20).map(|x| x as f64).collect());
//! let labels = features.map(|x| 2.0 * x + 3.0);
//! let options = Options::new().with_iterations(200);
//! let mut model = Regression::linear(&features, &labels, options).unwrap();
//! model.train().unwrap();
//! assert!(model.test(&features, &labels).unwrap() > 0.99);
//! ```

pub mod config;
pub mod dataset;
pub mod error;
pub mod history;
pub mod linear_model;
pub mod optim;
pub mod preprocessing;
pub mod tensor;

pub use config::Options;
pub use dataset::{one_hot, Dataset, Split};
pub use error::{RegressionError, Result};
pub use history::{ChartSeries, History};
pub use linear_model::{Objective, Regression, TrainingReport};
pub use preprocessing::{StandardizationParams, Standardizer};
pub use tensor::{Matrix, Tensor, TensorLike};

#[cfg(test)]
mod tests;
