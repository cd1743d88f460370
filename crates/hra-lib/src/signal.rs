use chrono::{DateTime, NaiveDateTime, NaiveTime, Timelike};
use serde::{Deserialize, Serialize};

/// One accepted heart-rate reading.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sample {
    /// Position among accepted rows (skipped rows leave no gap).
    pub index: usize,
    pub label: String,
    /// Heart rate in bpm, always finite.
    pub value: f64,
}

/// Ordered, non-empty heart-rate series as produced by the parser.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SeriesDataset {
    samples: Vec<Sample>,
}

impl SeriesDataset {
    /// Wrap parsed samples. Returns `None` for an empty sample list.
    pub fn new(samples: Vec<Sample>) -> Option<Self> {
        if samples.is_empty() {
            None
        } else {
            Some(Self { samples })
        }
    }

    /// Build a dataset from bare values, labelling each by its index.
    pub fn from_values(values: &[f64]) -> Option<Self> {
        let samples = values
            .iter()
            .enumerate()
            .map(|(index, &value)| Sample {
                index,
                label: index.to_string(),
                value,
            })
            .collect();
        Self::new(samples)
    }

    pub fn samples(&self) -> &[Sample] {
        &self.samples
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    /// Always false; paired with `len` for clippy's `len_without_is_empty`.
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn values(&self) -> Vec<f64> {
        self.samples.iter().map(|s| s.value).collect()
    }

    /// Average sampling rate implied by the labels when every label is a
    /// timestamp (seconds or a date-time) and time strictly increases.
    pub fn timestamp_sampling_rate(&self) -> Option<f64> {
        if self.samples.len() < 2 {
            return None;
        }
        let times: Vec<f64> = self
            .samples
            .iter()
            .map(|s| label_seconds(&s.label))
            .collect::<Option<_>>()?;
        if !times.windows(2).all(|w| w[1] > w[0]) {
            return None;
        }
        let span = times[times.len() - 1] - times[0];
        let fs = (times.len() - 1) as f64 / span;
        fs.is_finite().then_some(fs)
    }
}

const DATETIME_FORMATS: [&str; 3] = [
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%H:%M:%S%.f",
];

/// Seconds represented by a label: a plain number, an RFC 3339 timestamp,
/// or a naive date-time / time of day.
fn label_seconds(label: &str) -> Option<f64> {
    if let Ok(secs) = label.parse::<f64>() {
        return secs.is_finite().then_some(secs);
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(label) {
        return Some(dt.timestamp_millis() as f64 / 1000.0);
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(label, DATETIME_FORMATS[0])
        .or_else(|_| NaiveDateTime::parse_from_str(label, DATETIME_FORMATS[1]))
    {
        return Some(dt.and_utc().timestamp_millis() as f64 / 1000.0);
    }
    NaiveTime::parse_from_str(label, DATETIME_FORMATS[2])
        .ok()
        .map(|t| t.num_seconds_from_midnight() as f64 + t.nanosecond() as f64 / 1e9)
}

/// Moving-average output aligned index-for-index with its dataset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SmoothedSeries {
    pub data: Vec<f64>,
}

impl SmoothedSeries {
    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn mean(&self) -> f64 {
        mean(&self.data)
    }
}

/// Arithmetic mean, 0 for an empty slice.
pub(crate) fn mean(data: &[f64]) -> f64 {
    if data.is_empty() {
        return 0.0;
    }
    data.iter().sum::<f64>() / data.len() as f64
}
