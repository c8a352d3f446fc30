//! PNG line charts.
//!
//! Each chart plots one metric of a [`Series`] with a line, circle markers,
//! grid, axis descriptions and a legend.

use std::ops::Range;
use std::path::{Path, PathBuf};

use chrono::{Duration, NaiveDateTime};
use plotters::prelude::*;

use crate::model::{Metric, Series, TimeLabel};

/// Output size in pixels.
pub const CHART_SIZE: (u32, u32) = (1000, 400);

/// matplotlib `tab:red`.
pub const CPU_COLOR: RGBColor = RGBColor(214, 39, 40);
/// matplotlib `tab:blue`.
pub const MEMORY_COLOR: RGBColor = RGBColor(31, 119, 180);

const MARKER_SIZE: u32 = 3;

/// Error type for chart rendering failures.
#[derive(Debug, Clone)]
pub struct RenderError {
    pub path: PathBuf,
    pub message: String,
}

impl std::fmt::Display for RenderError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Failed to render {}: {}", self.path.display(), self.message)
    }
}

impl std::error::Error for RenderError {}

/// What to draw and where.
#[derive(Debug, Clone)]
pub struct ChartSpec {
    pub file_name: &'static str,
    pub metric: Metric,
    pub title: String,
    pub x_desc: String,
    pub y_desc: String,
    pub legend: String,
    pub color: RGBColor,
}

/// Horizontal placement of samples.
#[derive(Debug, Clone, PartialEq)]
pub enum XAxis {
    /// Every label is a datetime: x is seconds since `start`.
    Elapsed { start: NaiveDateTime, offsets: Vec<f64> },
    /// Anything else: x is the sample position, ticks show the labels.
    Ordinal { labels: Vec<String> },
}

impl XAxis {
    pub fn for_labels(times: &[TimeLabel]) -> Self {
        let stamps: Option<Vec<NaiveDateTime>> = times
            .iter()
            .map(|t| match t {
                TimeLabel::At(dt) => Some(*dt),
                _ => None,
            })
            .collect();

        if let Some(start) = stamps.as_ref().and_then(|s| s.iter().copied().min()) {
            let offsets = stamps
                .iter()
                .flatten()
                .map(|dt| (*dt - start).num_milliseconds() as f64 / 1000.0)
                .collect();
            return XAxis::Elapsed { start, offsets };
        }

        XAxis::Ordinal {
            labels: times.iter().map(ToString::to_string).collect(),
        }
    }

    pub fn positions(&self) -> Vec<f64> {
        match self {
            XAxis::Elapsed { offsets, .. } => offsets.clone(),
            XAxis::Ordinal { labels } => (0..labels.len()).map(|i| i as f64).collect(),
        }
    }

    /// Axis range covering all positions, never zero-width.
    pub fn range(&self) -> Range<f64> {
        let positions = self.positions();
        let lo = positions.iter().copied().fold(f64::INFINITY, f64::min);
        let hi = positions.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        if !lo.is_finite() || !hi.is_finite() {
            return 0.0..1.0;
        }
        let pad = ((hi - lo) * 0.02).max(0.5);
        (lo - pad)..(hi + pad)
    }

    /// Tick text for position `x`.
    pub fn tick_label(&self, x: f64) -> String {
        match self {
            XAxis::Elapsed { start, .. } => start
                .checked_add_signed(Duration::milliseconds((x * 1000.0).round() as i64))
                .map(|t| t.format("%H:%M:%S").to_string())
                .unwrap_or_default(),
            XAxis::Ordinal { labels } => {
                let i = x.round();
                if i < 0.0 || (x - i).abs() > 1e-6 {
                    return String::new();
                }
                labels.get(i as usize).cloned().unwrap_or_default()
            }
        }
    }
}

/// Value range that always includes zero and keeps flat lines visible.
pub fn value_range(values: &[f64]) -> Range<f64> {
    let lo = values.iter().copied().fold(0.0, f64::min);
    let mut hi = values.iter().copied().fold(0.0, f64::max);
    if hi - lo < f64::EPSILON {
        hi = lo + 1.0;
    }
    let pad = (hi - lo) * 0.05;
    let lo = if lo < 0.0 { lo - pad } else { lo };
    lo..(hi + pad)
}

fn msg<E: std::fmt::Display>(e: E) -> String {
    e.to_string()
}

fn draw(path: &Path, spec: &ChartSpec, axis: &XAxis, values: &[f64]) -> Result<(), String> {
    let root = BitMapBackend::new(path, CHART_SIZE).into_drawing_area();
    root.fill(&WHITE).map_err(msg)?;

    let mut chart = ChartBuilder::on(&root)
        .caption(spec.title.as_str(), ("sans-serif", 22))
        .margin(12)
        .x_label_area_size(50)
        .y_label_area_size(60)
        .build_cartesian_2d(axis.range(), value_range(values))
        .map_err(msg)?;

    chart
        .configure_mesh()
        .x_labels(10)
        .x_label_formatter(&|x| axis.tick_label(*x))
        .x_desc(spec.x_desc.as_str())
        .y_desc(spec.y_desc.as_str())
        .draw()
        .map_err(msg)?;

    let points: Vec<(f64, f64)> = axis
        .positions()
        .into_iter()
        .zip(values.iter().copied())
        .collect();
    let color = spec.color;

    chart
        .draw_series(LineSeries::new(points.iter().copied(), color.stroke_width(2)))
        .map_err(msg)?
        .label(spec.legend.as_str())
        .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], color.stroke_width(2)));

    chart
        .draw_series(
            points
                .iter()
                .map(|&point| Circle::new(point, MARKER_SIZE, color.filled())),
        )
        .map_err(msg)?;

    chart
        .configure_series_labels()
        .background_style(&WHITE.mix(0.8))
        .border_style(&BLACK)
        .draw()
        .map_err(msg)?;

    root.present().map_err(msg)?;
    Ok(())
}

/// Draws one metric of `series` into `path` as PNG, replacing any existing file.
pub fn render_chart(path: &Path, spec: &ChartSpec, series: &Series) -> Result<(), RenderError> {
    let axis = XAxis::for_labels(series.times());
    draw(path, spec, &axis, series.values(spec.metric)).map_err(|message| RenderError {
        path: path.to_path_buf(),
        message,
    })
}
