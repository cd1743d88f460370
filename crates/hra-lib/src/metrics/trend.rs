use crate::signal::{mean, SmoothedSeries};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Half-to-half change (bpm) needed before a trend is reported.
pub const TREND_THRESHOLD_BPM: f64 = 5.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Trend {
    Increasing,
    Decreasing,
    Stable,
}

impl fmt::Display for Trend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Trend::Increasing => "increasing",
            Trend::Decreasing => "decreasing",
            Trend::Stable => "stable",
        };
        f.write_str(name)
    }
}

/// Compare the mean of the second half of the smoothed series against the first.
///
/// A series too short to have two non-empty halves is `Stable`.
pub fn classify(smoothed: &SmoothedSeries) -> Trend {
    let (first, second) = smoothed.data.split_at(smoothed.len() / 2);
    if first.is_empty() || second.is_empty() {
        return Trend::Stable;
    }
    let diff = mean(second) - mean(first);
    if diff > TREND_THRESHOLD_BPM {
        Trend::Increasing
    } else if diff < -TREND_THRESHOLD_BPM {
        Trend::Decreasing
    } else {
        Trend::Stable
    }
}
