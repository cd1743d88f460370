use crate::signal::SmoothedSeries;
use log::{debug, warn};
use realfft::RealFftPlanner;
use serde::{Deserialize, Serialize};

/// Fewer samples than this give no frequency estimate.
pub const MIN_SAMPLES: usize = 8;
/// Physiological heart-rate band searched for the dominant bin (bpm, inclusive).
pub const BAND_BPM: (f64, f64) = (40.0, 180.0);

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FrequencyEstimate {
    pub bpm: f64,
    pub valid: bool,
}

impl FrequencyEstimate {
    pub fn invalid() -> Self {
        Self {
            bpm: 0.0,
            valid: false,
        }
    }
}

/// Estimate heart rate from the dominant spectral peak of the smoothed series.
///
/// The series is mean-centered and transformed with a real-input FFT of its
/// exact length. Bins `1..n/2` whose frequency falls inside [`BAND_BPM`] are
/// candidates; the first bin with the largest magnitude wins.
pub fn estimate_bpm(smoothed: &SmoothedSeries, sampling_rate_hz: f64) -> FrequencyEstimate {
    let n = smoothed.len();
    if n < MIN_SAMPLES {
        return FrequencyEstimate::invalid();
    }
    let spectrum = match magnitude_spectrum(smoothed) {
        Some(spectrum) => spectrum,
        None => return FrequencyEstimate::invalid(),
    };
    let resolution = sampling_rate_hz / n as f64;

    let mut best: Option<(usize, f64)> = None;
    for (k, &magnitude) in spectrum.iter().enumerate().take(n / 2).skip(1) {
        let bpm = k as f64 * resolution * 60.0;
        if !(BAND_BPM.0..=BAND_BPM.1).contains(&bpm) {
            continue;
        }
        let current = best.map(|(_, m)| m).unwrap_or(0.0);
        if magnitude > current {
            best = Some((k, magnitude));
        }
    }

    match best {
        Some((k, magnitude)) => {
            let bpm = k as f64 * resolution * 60.0;
            debug!("dominant bin {} (|X| = {:.3}) → {:.2} bpm", k, magnitude, bpm);
            FrequencyEstimate { bpm, valid: true }
        }
        None => {
            debug!(
                "no spectral peak in {}-{} bpm at {} Hz over {} samples",
                BAND_BPM.0, BAND_BPM.1, sampling_rate_hz, n
            );
            FrequencyEstimate::invalid()
        }
    }
}

fn magnitude_spectrum(smoothed: &SmoothedSeries) -> Option<Vec<f64>> {
    let mean = smoothed.mean();
    let mut buffer: Vec<f64> = smoothed.data.iter().map(|x| x - mean).collect();
    let mut planner = RealFftPlanner::<f64>::new();
    let r2c = planner.plan_fft_forward(buffer.len());
    let mut spectrum = r2c.make_output_vec();
    if let Err(err) = r2c.process(&mut buffer, &mut spectrum) {
        warn!("FFT failed: {}", err);
        return None;
    }
    Some(spectrum.iter().map(|c| c.norm()).collect())
}
