use crate::{
    error::ParseError,
    interpret::interpret,
    io::csv::parse_series,
    metrics::{
        frequency::{estimate_bpm, FrequencyEstimate},
        stats::{summarize, StatsSummary},
        trend::{classify, Trend},
    },
    signal::{SeriesDataset, SmoothedSeries},
    smoothing::smooth,
};
use log::{debug, info};
use serde::{Deserialize, Serialize};

/// Sampling rate assumed for row-indexed data without usable timestamps.
pub const DEFAULT_SAMPLING_RATE_HZ: f64 = 1.0;

/// Tunable inputs of one analysis run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// Sampling rate used by the frequency estimate (Hz). When unset it is
    /// derived from timestamp labels, falling back to 1 Hz.
    pub sampling_rate_hz: Option<f64>,
}

/// A raw sample paired with its moving-average value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SmoothedPoint {
    pub index: usize,
    pub label: String,
    pub value: f64,
    pub smoothed: f64,
}

/// Report figures rounded the way they are shown to a reader.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportDisplay {
    pub mean: String,
    pub min: String,
    pub max: String,
    pub range: String,
    pub std_dev: String,
    pub rmssd: String,
    pub fft_bpm: Option<String>,
}

impl ReportDisplay {
    pub fn new(summary: &StatsSummary, freq: &FrequencyEstimate) -> Self {
        Self {
            mean: format!("{:.1}", summary.mean),
            min: format!("{:.0}", summary.min),
            max: format!("{:.0}", summary.max),
            range: format!("{:.0}", summary.range),
            std_dev: format!("{:.1}", summary.std_dev),
            rmssd: format!("{:.1}", summary.rmssd),
            fft_bpm: freq.valid.then(|| format!("{:.1}", freq.bpm)),
        }
    }
}

/// Everything produced by one run of the pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisReport {
    pub sample_count: usize,
    pub sampling_rate_hz: f64,
    pub summary: StatsSummary,
    pub series: Vec<SmoothedPoint>,
    pub trend: Trend,
    pub frequency: FrequencyEstimate,
    pub interpretation: Vec<String>,
    pub display: ReportDisplay,
}

impl AnalysisReport {
    pub fn smoothed(&self) -> SmoothedSeries {
        SmoothedSeries {
            data: self.series.iter().map(|p| p.smoothed).collect(),
        }
    }
}

/// Parse CSV text and analyze it with the default configuration.
pub fn analyze(text: &str) -> Result<AnalysisReport, ParseError> {
    analyze_with_config(text, &AnalysisConfig::default())
}

pub fn analyze_with_config(
    text: &str,
    cfg: &AnalysisConfig,
) -> Result<AnalysisReport, ParseError> {
    let ds = parse_series(text)?;
    Ok(analyze_dataset(&ds, cfg))
}

/// Run statistics, smoothing, trend, frequency estimate and interpretation
/// over an already parsed series. Never fails.
pub fn analyze_dataset(ds: &SeriesDataset, cfg: &AnalysisConfig) -> AnalysisReport {
    let sampling_rate_hz = cfg
        .sampling_rate_hz
        .or_else(|| ds.timestamp_sampling_rate())
        .unwrap_or(DEFAULT_SAMPLING_RATE_HZ);

    let summary = summarize(ds);
    let smoothed = smooth(ds);
    debug!(
        "mean {:.2}, sd {:.2}, rmssd {:.2}, {} anomalies",
        summary.mean, summary.std_dev, summary.rmssd, summary.anomaly_count
    );

    let trend = classify(&smoothed);
    let frequency = estimate_bpm(&smoothed, sampling_rate_hz);
    let interpretation = interpret(&summary, trend, &frequency);
    let display = ReportDisplay::new(&summary, &frequency);
    info!(
        "analyzed {} samples at {} Hz: trend {}, fft {}",
        ds.len(),
        sampling_rate_hz,
        trend,
        display.fft_bpm.as_deref().unwrap_or("n/a")
    );

    let series = ds
        .samples()
        .iter()
        .zip(smoothed.data.iter())
        .map(|(sample, &smoothed)| SmoothedPoint {
            index: sample.index,
            label: sample.label.clone(),
            value: sample.value,
            smoothed,
        })
        .collect();

    AnalysisReport {
        sample_count: ds.len(),
        sampling_rate_hz,
        summary,
        series,
        trend,
        frequency,
        interpretation,
        display,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::PI;

    const SAMPLE_CSV: &str = "time,heart_rate\n0,72\n1,75\n2,73\n";

    #[test]
    fn small_file_end_to_end() {
        let report = analyze(SAMPLE_CSV).unwrap();
        assert_eq!(report.sample_count, 3);
        assert_eq!(report.series.len(), 3);
        assert_eq!(report.sampling_rate_hz, 1.0);
        assert_eq!(report.trend, Trend::Stable);
        assert!(!report.frequency.valid);
        assert_eq!(report.display.mean, "73.3");
        assert_eq!(report.display.min, "72");
        assert_eq!(report.display.max, "75");
        assert_eq!(report.display.range, "3");
        assert_eq!(report.display.fft_bpm, None);
        assert_eq!(report.interpretation.len(), 3);
        assert!(report.interpretation[0].contains("normal resting range"));
    }

    #[test]
    fn parse_errors_abort_the_run() {
        assert!(matches!(analyze(""), Err(ParseError::EmptyInput)));
        assert!(matches!(
            analyze("foo,bar\n1,2\n"),
            Err(ParseError::MissingHeartRateColumn)
        ));
        assert!(matches!(analyze("hr\nx\n"), Err(ParseError::NoValidRows)));
    }

    #[test]
    fn repeated_runs_are_identical() {
        let text = wave_csv(96, 4.0, 85.0);
        let a = analyze(&text).unwrap();
        let b = analyze(&text).unwrap();
        assert_eq!(a, b);
        assert_eq!(
            serde_json::to_string(&a).unwrap(),
            serde_json::to_string(&b).unwrap()
        );
    }

    #[test]
    fn sampling_rate_comes_from_timestamps_unless_configured() {
        let text = wave_csv(96, 4.0, 85.0);
        let inferred = analyze(&text).unwrap();
        assert_eq!(inferred.sampling_rate_hz, 4.0);
        assert!(inferred.frequency.valid);
        assert!((inferred.frequency.bpm - 85.0).abs() <= 2.5);
        assert!(inferred.display.fft_bpm.is_some());

        let cfg = AnalysisConfig {
            sampling_rate_hz: Some(1.0),
        };
        let forced = analyze_with_config(&text, &cfg).unwrap();
        assert_eq!(forced.sampling_rate_hz, 1.0);
        assert!(!forced.frequency.valid);
    }

    #[test]
    fn series_pairs_raw_and_smoothed() {
        let report = analyze("hr\n60\n70\n80\n90\n").unwrap();
        let smoothed: Vec<f64> = report.series.iter().map(|p| p.smoothed).collect();
        assert_eq!(smoothed, vec![65.0, 70.0, 80.0, 85.0]);
        assert_eq!(report.series[2].value, 80.0);
        assert_eq!(report.smoothed().data, smoothed);
    }

    #[test]
    fn config_deserializes_with_defaults() {
        let cfg: AnalysisConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(cfg, AnalysisConfig::default());
        let cfg: AnalysisConfig = serde_json::from_str(r#"{"sampling_rate_hz": 2.5}"#).unwrap();
        assert_eq!(cfg.sampling_rate_hz, Some(2.5));
    }

    fn wave_csv(n: usize, fs: f64, bpm: f64) -> String {
        let mut text = String::from("time,bpm\n");
        for i in 0..n {
            let t = i as f64 / fs;
            let v = 75.0 + 8.0 * (2.0 * PI * bpm / 60.0 * t).sin();
            text.push_str(&format!("{},{:.4}\n", t, v));
        }
        text
    }
}
