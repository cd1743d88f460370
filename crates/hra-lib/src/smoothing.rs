use crate::signal::{mean, SeriesDataset, SmoothedSeries};

const MIN_WINDOW: usize = 3;
const MAX_WINDOW: usize = 10;

/// Moving-average window for a series of `n` samples: `n / 5` clamped to `3..=10`.
pub fn window_size(n: usize) -> usize {
    (n / 5).clamp(MIN_WINDOW, MAX_WINDOW)
}

/// Centered moving average of the heart-rate values.
///
/// Position `i` averages `[i - w/2, i + ceil(w/2))`, clipped to the series,
/// so windows shrink at the edges instead of padding.
pub fn smooth(ds: &SeriesDataset) -> SmoothedSeries {
    SmoothedSeries {
        data: centered_moving_average(&ds.values()),
    }
}

fn centered_moving_average(data: &[f64]) -> Vec<f64> {
    let n = data.len();
    let win = window_size(n);
    let back = win / 2;
    let forward = win - back;
    (0..n)
        .map(|i| {
            let start = i.saturating_sub(back);
            let end = (i + forward).min(n);
            mean(&data[start..end])
        })
        .collect()
}
