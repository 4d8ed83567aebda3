//! SVG charts of one exercise across its weeks.

use std::ops::Range;

use anyhow::anyhow;
use plotters::prelude::*;
use serde::{Deserialize, Serialize};
use trainlog_core::SummaryRecord;

pub const WIDTH: u32 = 640;
pub const HEIGHT: u32 = 400;

const FONT: (&str, u32) = ("sans-serif", 18);

const COLOR_DEFAULT: RGBColor = RGBColor(31, 119, 180);
const COLOR_VOLUME: RGBColor = RGBColor(0, 128, 0);
const COLOR_REPS: RGBColor = RGBColor(135, 206, 235);
const COLOR_INTENSITY: RGBColor = RGBColor(255, 165, 0);
const COLOR_DELTA: RGBColor = RGBColor(128, 0, 128);
const COLOR_REFERENCE: RGBColor = RGBColor(128, 128, 128);

/// A summary column that can be charted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ChartMetric {
    MeanWeight,
    TotalVolume,
    TotalReps,
    Intensity,
    VolumeDelta,
}

enum PlotStyle {
    Line(RGBColor),
    Bars(RGBColor),
}

impl ChartMetric {
    pub const ALL: [ChartMetric; 5] = [
        ChartMetric::MeanWeight,
        ChartMetric::TotalVolume,
        ChartMetric::TotalReps,
        ChartMetric::Intensity,
        ChartMetric::VolumeDelta,
    ];

    pub fn slug(self) -> &'static str {
        match self {
            ChartMetric::MeanWeight => "mean-weight",
            ChartMetric::TotalVolume => "total-volume",
            ChartMetric::TotalReps => "total-reps",
            ChartMetric::Intensity => "intensity",
            ChartMetric::VolumeDelta => "volume-delta",
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            ChartMetric::MeanWeight => "Mean weight per week",
            ChartMetric::TotalVolume => "Total volume per week",
            ChartMetric::TotalReps => "Total reps per week",
            ChartMetric::Intensity => "Estimated intensity per week",
            ChartMetric::VolumeDelta => "Volume change per week",
        }
    }

    fn y_label(self) -> &'static str {
        match self {
            ChartMetric::MeanWeight => "Weight (kg)",
            ChartMetric::TotalVolume => "Volume",
            ChartMetric::TotalReps => "Reps",
            ChartMetric::Intensity => "% of estimated 1RM",
            ChartMetric::VolumeDelta => "Δ Volume",
        }
    }

    fn style(self) -> PlotStyle {
        match self {
            ChartMetric::MeanWeight => PlotStyle::Line(COLOR_DEFAULT),
            ChartMetric::TotalVolume => PlotStyle::Line(COLOR_VOLUME),
            ChartMetric::TotalReps => PlotStyle::Bars(COLOR_REPS),
            ChartMetric::Intensity => PlotStyle::Line(COLOR_INTENSITY),
            ChartMetric::VolumeDelta => PlotStyle::Line(COLOR_DELTA),
        }
    }

    /// Whether the y axis must include zero.
    fn anchored_at_zero(self) -> bool {
        matches!(self, ChartMetric::TotalReps | ChartMetric::VolumeDelta)
    }

    /// Value plotted for `row`; undefined values are skipped.
    pub fn value(self, row: &SummaryRecord) -> Option<f64> {
        let value = match self {
            ChartMetric::MeanWeight => row.mean_weight,
            ChartMetric::TotalVolume => row.total_volume,
            ChartMetric::TotalReps => row.total_reps as f64,
            ChartMetric::Intensity => row.intensity_pct,
            ChartMetric::VolumeDelta => row.volume_delta?,
        };
        value.is_finite().then_some(value)
    }
}

/// Render `metric` over `rows` (one exercise, in week order) as an SVG
/// document. Returns `None` when no row has a value for the metric.
pub fn render(metric: ChartMetric, rows: &[&SummaryRecord]) -> anyhow::Result<Option<String>> {
    let points: Vec<(f64, f64)> = rows
        .iter()
        .enumerate()
        .filter_map(|(i, row)| metric.value(row).map(|v| (i as f64, v)))
        .collect();
    if points.is_empty() {
        return Ok(None);
    }
    let weeks: Vec<&str> = rows.iter().map(|r| r.week.as_str()).collect();

    let mut svg = String::new();
    draw(&mut svg, metric, &weeks, &points)
        .map_err(|e| anyhow!("failed to draw {} chart: {e}", metric.slug()))?;
    Ok(Some(svg))
}

fn y_bounds(metric: ChartMetric, points: &[(f64, f64)]) -> Range<f64> {
    let mut min = points.iter().map(|p| p.1).fold(f64::INFINITY, f64::min);
    let mut max = points.iter().map(|p| p.1).fold(f64::NEG_INFINITY, f64::max);
    if metric.anchored_at_zero() {
        min = min.min(0.0);
        max = max.max(0.0);
    }
    let margin = if (max - min).abs() > f64::EPSILON {
        (max - min) * 0.1
    } else {
        1.0
    };
    (min - margin)..(max + margin)
}

fn draw(
    svg: &mut String,
    metric: ChartMetric,
    weeks: &[&str],
    points: &[(f64, f64)],
) -> Result<(), Box<dyn std::error::Error>> {
    let root = SVGBackend::with_string(svg, (WIDTH, HEIGHT)).into_drawing_area();
    root.fill(&WHITE)?;

    let x_range = -0.5..(weeks.len() as f64 - 0.5);
    let mut chart = ChartBuilder::on(&root)
        .caption(metric.title(), FONT.into_font())
        .margin(10)
        .x_label_area_size(40)
        .y_label_area_size(60)
        .build_cartesian_2d(x_range.clone(), y_bounds(metric, points))?;

    // Weeks sit on integer x positions; other key points stay unlabeled.
    let week_label = |x: &f64| {
        let i = x.round();
        if (x - i).abs() > 1e-6 || i < 0.0 {
            return String::new();
        }
        weeks.get(i as usize).map(|w| w.to_string()).unwrap_or_default()
    };

    chart
        .configure_mesh()
        .x_labels(weeks.len())
        .x_label_formatter(&week_label)
        .x_desc("Week")
        .y_desc(metric.y_label())
        .draw()?;

    if metric == ChartMetric::VolumeDelta {
        chart.draw_series(LineSeries::new(
            [(x_range.start, 0.0), (x_range.end, 0.0)],
            COLOR_REFERENCE.stroke_width(1),
        ))?;
    }

    match metric.style() {
        PlotStyle::Line(color) => {
            chart.draw_series(LineSeries::new(points.iter().copied(), color.stroke_width(2)))?;
            chart.draw_series(points.iter().map(|&p| Circle::new(p, 4, color.filled())))?;
        }
        PlotStyle::Bars(color) => {
            chart.draw_series(
                points
                    .iter()
                    .map(|&(x, y)| Rectangle::new([(x - 0.35, 0.0), (x + 0.35, y)], color.filled())),
            )?;
        }
    }

    root.present()?;
    Ok(())
}
