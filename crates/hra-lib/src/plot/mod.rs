use crate::pipeline::AnalysisReport;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Axis {
    pub label: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Style {
    pub width: f32,
    pub dash: Option<[f32; 2]>,
    pub color: Color,
}

/// 0xRRGGBB
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Color(pub u32);

impl Color {
    pub fn rgb(self) -> (u8, u8, u8) {
        (
            ((self.0 >> 16) & 0xFF) as u8,
            ((self.0 >> 8) & 0xFF) as u8,
            (self.0 & 0xFF) as u8,
        )
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LineSeries {
    pub name: String,
    pub points: Vec<[f64; 2]>,
    pub style: Style,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Series {
    Line(LineSeries),
}

impl Series {
    pub fn points(&self) -> &[[f64; 2]] {
        match self {
            Series::Line(line) => &line.points,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Figure {
    pub title: Option<String>,
    pub x: Axis,
    pub y: Axis,
    pub series: Vec<Series>,
}

impl Figure {
    pub fn new(title: impl Into<Option<String>>) -> Self {
        Self {
            title: title.into(),
            x: Axis { label: None },
            y: Axis { label: None },
            series: Vec::new(),
        }
    }

    pub fn add_series(&mut self, series: Series) {
        self.series.push(series);
    }

    /// `(x_min, x_max, y_min, y_max)` over all series, `None` when there are no points.
    pub fn bounds(&self) -> Option<(f64, f64, f64, f64)> {
        let mut points = self.series.iter().flat_map(|s| s.points().iter());
        let first = points.next()?;
        let init = (first[0], first[0], first[1], first[1]);
        Some(points.fold(init, |(x0, x1, y0, y1), p| {
            (x0.min(p[0]), x1.max(p[0]), y0.min(p[1]), y1.max(p[1]))
        }))
    }
}

pub fn decimate_points(points: &[[f64; 2]], max_points: usize) -> Vec<[f64; 2]> {
    if points.len() <= max_points {
        return points.to_vec();
    }
    let bucket_size = points.len() as f64 / max_points as f64;
    let mut result = Vec::with_capacity(max_points);
    for i in 0..max_points {
        let start = (i as f64 * bucket_size).floor() as usize;
        if start >= points.len() {
            break;
        }
        result.push(points[start]);
    }
    result
}

/// Raw and smoothed heart rate against sample index.
pub fn figure_from_report(report: &AnalysisReport, max_points: usize) -> Figure {
    let raw: Vec<[f64; 2]> = report
        .series
        .iter()
        .map(|p| [p.index as f64, p.value])
        .collect();
    let smoothed: Vec<[f64; 2]> = report
        .series
        .iter()
        .map(|p| [p.index as f64, p.smoothed])
        .collect();

    let mut fig = Figure::new(Some("Heart Rate Over Time".into()));
    fig.x.label = Some("Time Point".into());
    fig.y.label = Some("Heart Rate (bpm)".into());
    fig.add_series(Series::Line(LineSeries {
        name: "Raw HR".into(),
        points: decimate_points(&raw, max_points),
        style: Style {
            width: 1.4,
            dash: None,
            color: Color(0xEF4444),
        },
    }));
    fig.add_series(Series::Line(LineSeries {
        name: "Smoothed (Moving Avg)".into(),
        points: decimate_points(&smoothed, max_points),
        style: Style {
            width: 2.0,
            dash: None,
            color: Color(0xDC2626),
        },
    }));
    fig
}
