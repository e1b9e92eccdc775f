// Summary statistics over per-item scores.
//
// No NaN filtering happens here. A NaN score (e.g. a topic whose comments
// carry every topic, so separation is undefined) carries through to every
// statistic.

use anyhow::Result;
use serde::Serialize;

/// Mean, population standard deviation, min and max of a list of scores.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct AnalysisResults {
    pub mean: f64,
    pub stdev: f64,
    pub min: f64,
    pub max: f64,
}

impl AnalysisResults {
    /// Summarize `values`. Fails on an empty list instead of inventing a
    /// NaN summary.
    pub fn new(values: &[f64]) -> Result<Self> {
        let mean = mean(values)?;
        let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / values.len() as f64;

        Ok(Self {
            mean,
            stdev: variance.sqrt(),
            min: nan_or(values, f64::min),
            max: nan_or(values, f64::max),
        })
    }

    /// Whether any input value was NaN.
    pub fn has_nan(&self) -> bool {
        self.mean.is_nan()
    }
}

/// A named evaluation row, as written to the results CSV.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NamedResult {
    pub name: String,
    pub results: AnalysisResults,
}

impl NamedResult {
    pub fn new(name: impl Into<String>, results: AnalysisResults) -> Self {
        Self {
            name: name.into(),
            results,
        }
    }
}

/// Arithmetic mean. NaN inputs propagate; an empty list is an error.
pub fn mean(values: &[f64]) -> Result<f64> {
    if values.is_empty() {
        anyhow::bail!("Insufficient data: cannot summarize an empty list of scores");
    }
    Ok(values.iter().sum::<f64>() / values.len() as f64)
}

/// Reduce with `op`, except that any NaN makes the result NaN
/// (`f64::min`/`f64::max` alone would skip it).
fn nan_or(values: &[f64], op: fn(f64, f64) -> f64) -> f64 {
    if values.iter().any(|v| v.is_nan()) {
        return f64::NAN;
    }
    values.iter().copied().reduce(op).unwrap_or(f64::NAN)
}
