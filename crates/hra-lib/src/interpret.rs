//! Rule-based findings over the computed metrics.
//!
//! Every rule is evaluated on its own and the output order is fixed: mean
//! range, variability, spread, trend, anomalies, frequency estimate.

use crate::metrics::{frequency::FrequencyEstimate, stats::StatsSummary, trend::Trend};

const NORMAL_RESTING_BPM: (f64, f64) = (60.0, 100.0);
const LOW_RMSSD: f64 = 20.0;
const HIGH_RMSSD: f64 = 50.0;
const LARGE_RANGE_BPM: f64 = 50.0;

pub fn interpret(summary: &StatsSummary, trend: Trend, freq: &FrequencyEstimate) -> Vec<String> {
    let mut findings = Vec::with_capacity(6);

    let (low, high) = NORMAL_RESTING_BPM;
    findings.push(if summary.mean >= low && summary.mean <= high {
        "Average heart rate is within normal resting range (60-100 bpm)".to_string()
    } else if summary.mean < low {
        "Average heart rate suggests bradycardia (below 60 bpm) - possibly athletic or needs medical attention".to_string()
    } else {
        "Average heart rate is elevated (above 100 bpm) - could indicate tachycardia, exercise, or stress".to_string()
    });

    findings.push(if summary.rmssd < LOW_RMSSD {
        "Low heart rate variability detected - may indicate stress or fatigue".to_string()
    } else if summary.rmssd > HIGH_RMSSD {
        "High heart rate variability - generally indicates good cardiovascular health".to_string()
    } else {
        "Moderate heart rate variability - within normal range".to_string()
    });

    if summary.range > LARGE_RANGE_BPM {
        findings.push(format!(
            "Large variation in heart rate ({:.0} bpm range) - suggests periods of activity and rest",
            summary.range
        ));
    }

    match trend {
        Trend::Increasing => {
            findings.push("Heart rate shows an increasing trend over time".to_string())
        }
        Trend::Decreasing => {
            findings.push("Heart rate shows a decreasing trend over time".to_string())
        }
        Trend::Stable => {}
    }

    if summary.anomaly_count > 0 {
        findings.push(format!(
            "{} anomalous readings detected that deviate significantly from the average",
            summary.anomaly_count
        ));
    }

    findings.push(if freq.valid {
        format!(
            "Frequency analysis estimates a dominant heart rhythm of {:.1} bpm",
            freq.bpm
        )
    } else {
        "Data length is insufficient to estimate heart rate from the frequency spectrum".to_string()
    });

    findings
}

#[cfg(test)]
mod tests {
    use super::*;

    fn summary(mean: f64, rmssd: f64, range: f64, anomaly_count: usize) -> StatsSummary {
        StatsSummary {
            mean,
            min: mean - range / 2.0,
            max: mean + range / 2.0,
            range,
            std_dev: 1.0,
            rmssd,
            anomaly_count,
            anomaly_indices: (0..anomaly_count).collect(),
        }
    }

    #[test]
    fn quiet_recording_yields_three_findings() {
        let out = interpret(
            &summary(72.0, 30.0, 10.0, 0),
            Trend::Stable,
            &FrequencyEstimate::invalid(),
        );
        assert_eq!(out.len(), 3);
        assert!(out[0].contains("normal resting range"));
        assert!(out[1].starts_with("Moderate"));
        assert!(out[2].starts_with("Data length is insufficient"));
    }

    #[test]
    fn every_rule_fires_in_order() {
        let freq = FrequencyEstimate {
            bpm: 76.04,
            valid: true,
        };
        let out = interpret(&summary(110.0, 55.0, 62.4, 2), Trend::Increasing, &freq);
        assert_eq!(out.len(), 6);
        assert!(out[0].contains("elevated"));
        assert!(out[1].starts_with("High heart rate variability"));
        assert!(out[2].contains("(62 bpm range)"));
        assert!(out[3].contains("increasing trend"));
        assert!(out[4].starts_with("2 anomalous readings"));
        assert!(out[5].ends_with("76.0 bpm"));
    }

    #[test]
    fn boundaries() {
        let freq = FrequencyEstimate::invalid();
        let at_60 = interpret(&summary(60.0, 20.0, 50.0, 0), Trend::Decreasing, &freq);
        assert!(at_60[0].contains("normal"));
        assert!(at_60[1].starts_with("Moderate"));
        assert!(at_60[2].contains("decreasing"));
        assert_eq!(at_60.len(), 4);

        let at_100 = interpret(&summary(100.0, 50.0, 0.0, 0), Trend::Stable, &freq);
        assert!(at_100[0].contains("normal"));
        assert!(at_100[1].starts_with("Moderate"));

        let slow = interpret(&summary(48.0, 19.9, 0.0, 0), Trend::Stable, &freq);
        assert!(slow[0].contains("bradycardia"));
        assert!(slow[1].starts_with("Low"));
    }
}
