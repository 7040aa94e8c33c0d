use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context};
use clap::{Parser, ValueEnum};
use light_regression::{
    one_hot, ChartSeries, Dataset, Matrix, Objective, Options, Regression, TrainingReport,
};
use rand::prelude::*;
use rand_distr::Normal;
use tracing::info;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Variant {
    Linear,
    Logistic,
    Multinomial,
    All,
}

impl Variant {
    fn objectives(self) -> Vec<Objective> {
        match self {
            Variant::Linear => vec![Objective::Linear],
            Variant::Logistic => vec![Objective::Logistic],
            Variant::Multinomial => vec![Objective::Multinomial],
            Variant::All => vec![Objective::Linear, Objective::Logistic, Objective::Multinomial],
        }
    }
}

/// Trains the regression variants on a synthetic car dataset and writes their cost charts.
#[derive(Debug, Parser)]
#[command(name = "light-regression", version, about)]
struct Cli {
    #[arg(long, value_enum, default_value_t = Variant::All)]
    variant: Variant,

    /// Number of generated cars
    #[arg(long, default_value_t = 400)]
    rows: usize,

    /// Leading rows held out for testing
    #[arg(long, default_value_t = 50)]
    test_rows: usize,

    /// JSON options file (camelCase keys). Flags below override it.
    #[arg(long)]
    config: Option<PathBuf>,

    #[arg(long)]
    iterations: Option<usize>,

    #[arg(long)]
    batch_size: Option<usize>,

    #[arg(long)]
    learning_rate: Option<f64>,

    #[arg(long, default_value_t = 42)]
    seed: u64,

    /// Where the chart series JSON files go
    #[arg(long, default_value = "plots")]
    out_dir: PathBuf,
}

impl Cli {
    fn options(&self) -> anyhow::Result<Options> {
        let mut options = match &self.config {
            Some(path) => Options::load(path)
                .with_context(|| format!("failed to load options from {}", path.display()))?,
            None => Options::new()
                .with_learning_rate(0.5)
                .with_iterations(100)
                .with_batch_size(10),
        };
        if let Some(iterations) = self.iterations {
            options.iterations = iterations;
        }
        if let Some(batch_size) = self.batch_size {
            options.batch_size = Some(batch_size);
        }
        if let Some(learning_rate) = self.learning_rate {
            options.learning_rate = learning_rate;
        }
        options.validate()?;
        Ok(options)
    }
}

/// Generated cars: horsepower, weight and displacement with their mpg and emissions result.
struct Cars {
    features: Matrix,
    mpg: Vec<f64>,
    passed_emissions: Vec<f64>,
}

impl Cars {
    fn generate(rows: usize, rng: &mut StdRng) -> anyhow::Result<Self> {
        let horsepower = Normal::<f64>::new(105.0, 38.0)?;
        let noise = Normal::<f64>::new(0.0, 1.0)?;
        let mut features = Vec::with_capacity(rows * 3);
        let mut mpg = Vec::with_capacity(rows);
        let mut passed_emissions = Vec::with_capacity(rows);
        for _ in 0..rows {
            let hp: f64 = horsepower.sample(rng).clamp(46.0, 230.0);
            let weight = 1000.0 + 14.0 * hp + 300.0 * noise.sample(rng);
            let displacement = 1.9 * hp + 30.0 * noise.sample(rng);
            features.extend([hp, weight, displacement]);
            mpg.push((46.0 - 0.05 * hp - 0.005 * weight + 2.5 * noise.sample(rng)).max(8.0));
            let emissions = weight + 150.0 * noise.sample(rng);
            passed_emissions.push(if emissions < 2800.0 { 1.0 } else { 0.0 });
        }
        Ok(Self {
            features: Matrix::new(features, vec![rows, 3]),
            mpg,
            passed_emissions,
        })
    }

    fn labels(&self, objective: Objective) -> light_regression::Result<Matrix> {
        match objective {
            Objective::Linear => Ok(Matrix::column(self.mpg.clone())),
            Objective::Logistic => Ok(Matrix::column(self.passed_emissions.clone())),
            Objective::Multinomial => {
                let buckets: Vec<usize> = self
                    .mpg
                    .iter()
                    .map(|&mpg| if mpg < 15.0 { 0 } else if mpg < 30.0 { 1 } else { 2 })
                    .collect();
                one_hot(&buckets, 3)
            }
        }
    }
}

struct Outcome {
    objective: Objective,
    report: TrainingReport,
    score: f64,
}

fn run(
    objective: Objective,
    cars: &Cars,
    test_rows: usize,
    seed: u64,
    options: &Options,
    out_dir: &Path,
) -> anyhow::Result<Outcome> {
    let mut dataset = Dataset::new(cars.features.clone(), cars.labels(objective)?)?;
    // same seed, so every variant sees the same row order
    dataset.shuffle(&mut StdRng::seed_from_u64(seed));
    let split = dataset.split_test(test_rows)?;

    let mut model = Regression::new(objective, &split.features, &split.labels, options.clone())?;
    let report = model.train()?;
    let score = model.test(&split.test_features, &split.test_labels)?;

    let name = format!("{objective:?}").to_lowercase();
    write_series(&model.cost_series(), &out_dir.join(format!("{name}_cost.json")))?;
    write_series(
        &model.history().weight_cost_series(format!("{} vs bias", objective.cost_name())),
        &out_dir.join(format!("{name}_bias_cost.json")),
    )?;

    Ok(Outcome {
        objective,
        report,
        score,
    })
}

fn write_series(series: &ChartSeries, path: &Path) -> anyhow::Result<()> {
    series
        .write_json(path)
        .with_context(|| format!("failed to write {}", path.display()))?;
    info!(path = %path.display(), points = series.x.len(), "wrote chart series");
    Ok(())
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "light_regression=info".into()),
        )
        .init();

    let cli = Cli::parse();
    let options = cli.options()?;
    let mut rng = StdRng::seed_from_u64(cli.seed);
    let cars = Cars::generate(cli.rows, &mut rng)?;
    fs::create_dir_all(&cli.out_dir)
        .with_context(|| format!("failed to create {}", cli.out_dir.display()))?;

    let objectives = cli.variant.objectives();
    let outcomes = crossbeam::scope(|scope| {
        let handles: Vec<_> = objectives
            .iter()
            .map(|&objective| {
                let (cars, options, out_dir) = (&cars, &options, cli.out_dir.as_path());
                scope.spawn(move |_| {
                    run(objective, cars, cli.test_rows, cli.seed, options, out_dir)
                })
            })
            .collect();
        handles
            .into_iter()
            .map(|handle| {
                handle
                    .join()
                    .map_err(|_| anyhow!("training thread panicked"))?
            })
            .collect::<anyhow::Result<Vec<_>>>()
    })
    .map_err(|_| anyhow!("training scope panicked"))??;

    for outcome in outcomes {
        println!(
            "{:<12} {} = {:.4}  (final {} = {:.4}, learning rate {:.4}, {} dropped rows)",
            format!("{:?}", outcome.objective),
            outcome.objective.score_name(),
            outcome.score,
            outcome.objective.cost_name(),
            outcome.report.final_cost.unwrap_or(f64::NAN),
            outcome.report.final_learning_rate,
            outcome.report.dropped_rows,
        );
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use light_regression::TensorLike;

    #[test]
    fn test_generated_cars_train_every_variant() {
        let cars = Cars::generate(60, &mut StdRng::seed_from_u64(7)).unwrap();
        assert_eq!(cars.features.shape(), &[60, 3]);
        assert!(cars.mpg.iter().all(|&mpg| mpg >= 8.0));

        let dir = tempfile::tempdir().unwrap();
        let options = Options::new().with_iterations(5).with_batch_size(10);
        for objective in Variant::All.objectives() {
            let outcome = run(objective, &cars, 10, 7, &options, dir.path()).unwrap();
            assert_eq!(outcome.objective, objective);
            assert_eq!(outcome.report.passes, 5);
            assert_eq!(outcome.report.rows_per_pass, 50);
            assert!(outcome.score.is_finite());

            let name = format!("{objective:?}").to_lowercase();
            let cost_path = dir.path().join(format!("{name}_cost.json"));
            let series = ChartSeries::read_json(cost_path).unwrap();
            assert_eq!(series.y.len(), 5);
            assert!(dir.path().join(format!("{name}_bias_cost.json")).exists());
        }
    }

    #[test]
    fn test_flags_override_the_default_options() {
        let cli =
            Cli::parse_from(["light-regression", "--variant", "logistic", "--iterations", "3"]);
        assert_eq!(cli.variant.objectives(), vec![Objective::Logistic]);
        let options = cli.options().unwrap();
        assert_eq!(options.iterations, 3);
        assert_eq!(options.batch_size, Some(10));
        assert_eq!(options.learning_rate, 0.5);
    }
}
