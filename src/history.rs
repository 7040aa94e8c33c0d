//! Per-pass training diagnostics and their hand-off to a chart renderer

use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{RegressionError, Result};

/// Append-only record with one entry per training pass.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct History {
    cost: Vec<f64>,
    bias: Vec<f64>,
    learning_rate: Vec<f64>,
}

impl History {
    pub fn new() -> Self {
        Self::default()
    }

    /// `learning_rate` is the rate the pass ran with.
    pub fn record(&mut self, cost: f64, bias: f64, learning_rate: f64) {
        self.cost.push(cost);
        self.bias.push(bias);
        self.learning_rate.push(learning_rate);
    }

    /// Cost (MSE or cross entropy) over the whole training set after each pass.
    pub fn cost(&self) -> &[f64] {
        &self.cost
    }

    /// Snapshot of the bias weight `W[0][0]` after each pass.
    pub fn bias(&self) -> &[f64] {
        &self.bias
    }

    pub fn learning_rates(&self) -> &[f64] {
        &self.learning_rate
    }

    pub fn len(&self) -> usize {
        self.cost.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cost.is_empty()
    }

    /// Pass number against cost.
    pub fn cost_series(&self, name: impl Into<String>) -> ChartSeries {
        ChartSeries {
            name: name.into(),
            x: (0..self.cost.len()).map(|i| i as f64).collect(),
            y: self.cost.clone(),
        }
    }

    /// Bias history against cost, to see how the bias guesses move the cost.
    pub fn weight_cost_series(&self, name: impl Into<String>) -> ChartSeries {
        ChartSeries {
            name: name.into(),
            x: self.bias.clone(),
            y: self.cost.clone(),
        }
    }
}

/// Two equal-length sequences plus a chart name, the input of an external line-chart renderer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartSeries {
    pub name: String,
    pub x: Vec<f64>,
    pub y: Vec<f64>,
}

impl ChartSeries {
    pub fn new(name: impl Into<String>, x: Vec<f64>, y: Vec<f64>) -> Result<Self> {
        if x.len() != y.len() {
            return Err(RegressionError::InvalidInput(format!(
                "chart series needs equal lengths, got {} x values and {} y values",
                x.len(),
                y.len()
            )));
        }
        Ok(Self {
            name: name.into(),
            x,
            y,
        })
    }

    pub fn write_json(&self, path: impl AsRef<Path>) -> Result<()> {
        let mut writer = BufWriter::new(File::create(path)?);
        serde_json::to_writer_pretty(&mut writer, self)?;
        writer.flush()?;
        Ok(())
    }

    pub fn read_json(path: impl AsRef<Path>) -> Result<Self> {
        let reader = BufReader::new(File::open(path)?);
        Ok(serde_json::from_reader(reader)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_appends_in_order() {
        let mut history = History::new();
        assert!(history.is_empty());
        history.record(3.0, 0.1, 0.5);
        history.record(2.0, 0.2, 0.525);
        assert_eq!(history.len(), 2);
        assert_eq!(history.cost(), &[3.0, 2.0]);
        assert_eq!(history.bias(), &[0.1, 0.2]);
        assert_eq!(history.learning_rates(), &[0.5, 0.525]);
    }

    #[test]
    fn test_series() {
        let mut history = History::new();
        history.record(3.0, 0.1, 0.5);
        history.record(2.0, 0.2, 0.5);

        let series = history.cost_series("Mean Squared Error");
        assert_eq!(series.x, vec![0.0, 1.0]);
        assert_eq!(series.y, vec![3.0, 2.0]);
        let series = history.weight_cost_series("MSE");
        assert_eq!(series.x, vec![0.1, 0.2]);
        assert!(ChartSeries::new("bad", vec![1.0], vec![]).is_err());
    }

    #[test]
    fn test_write_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("mse.json");
        let series = ChartSeries::new("MSE", vec![0.0, 1.0], vec![4.0, 2.5]).unwrap();
        series.write_json(&path).unwrap();
        assert_eq!(ChartSeries::read_json(&path).unwrap(), series);
    }
}
