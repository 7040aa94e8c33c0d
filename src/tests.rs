use super::*;
use crate::optim::{batch_ranges, gradient, sgd_step};
use crate::tensor::{from_count, functional};
use approx::assert_abs_diff_eq;

#[test]
fn test_from_count() {
    assert_eq!(from_count::<f64>(12), 12.0);
    assert_eq!(from_count::<f32>(3), 3.0);
}

#[test]
fn test_one_manual_step_matches_the_model() {
    let features = Matrix::from([[1.0], [2.0], [3.0], [4.0]]);
    let labels = Matrix::from([[3.0], [5.0], [7.0], [9.0]]);
    let options = Options::new().with_iterations(1).with_learning_rate(0.3);

    let mut standardizer = Standardizer::new();
    let processed = standardizer.process(&features).unwrap();
    let mut weights = Matrix::zeros(vec![2, 1]);
    for batch in batch_ranges(4, 4) {
        let x = processed.row_view(batch.start, batch.end).unwrap().to_tensor();
        let guesses = functional::matmul(&x, &weights).unwrap();
        let residuals = functional::sub(&guesses, &labels).unwrap();
        sgd_step(&mut weights, &gradient(&x, &residuals).unwrap(), 0.3).unwrap();
    }

    let mut model = Regression::linear(&features, &labels, options).unwrap();
    model.train().unwrap();
    assert_eq!(model.weights(), &weights);
    // the bias moves towards the label mean
    assert_abs_diff_eq!(model.bias(), 0.3 * 6.0, epsilon = 1e-12);
}

#[test]
fn test_history_feeds_chart_series() {
    let features = Matrix::column((0..10).map(|x| x as f64).collect());
    let labels = features.map(|x| x * 0.5 - 1.0);
    let options = Options::new().with_iterations(5);
    let mut model = Regression::linear(&features, &labels, options).unwrap();
    model.train().unwrap();

    let series = model.cost_series();
    assert_eq!(series.name, "Mean Squared Error");
    assert_eq!(series.y, model.cost_history());
    let weight_series = model.history().weight_cost_series("bias vs cost");
    assert_eq!(weight_series.x, model.weight_history());
}
