use crate::signal::{mean, SeriesDataset};
use serde::{Deserialize, Serialize};

/// Samples further than this many standard deviations from the mean are anomalies.
pub const ANOMALY_SIGMA: f64 = 2.0;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatsSummary {
    pub mean: f64,
    pub min: f64,
    pub max: f64,
    pub range: f64,
    /// Population standard deviation.
    pub std_dev: f64,
    /// Root mean square of successive differences.
    pub rmssd: f64,
    pub anomaly_count: usize,
    /// Strictly ascending sample indices.
    pub anomaly_indices: Vec<usize>,
}

pub fn summarize(ds: &SeriesDataset) -> StatsSummary {
    let values = ds.values();
    let n = values.len();
    let mean = mean(&values);
    let min = values.iter().copied().fold(f64::INFINITY, f64::min);
    let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let std_dev = if n > 0 {
        (values.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / n as f64).sqrt()
    } else {
        0.0
    };
    let rmssd = rmssd(&values);
    let anomaly_indices: Vec<usize> = ds
        .samples()
        .iter()
        .filter(|s| (s.value - mean).abs() > ANOMALY_SIGMA * std_dev)
        .map(|s| s.index)
        .collect();

    StatsSummary {
        mean,
        min,
        max,
        range: max - min,
        std_dev,
        rmssd,
        anomaly_count: anomaly_indices.len(),
        anomaly_indices,
    }
}

fn rmssd(values: &[f64]) -> f64 {
    let n = values.len();
    if n < 2 {
        return 0.0;
    }
    let diffs = values.windows(2).map(|w| (w[1] - w[0]).powi(2));
    (diffs.sum::<f64>() / (n as f64 - 1.0)).sqrt()
}
