//! Figure rendering.
//!
//! Figures follow the layout of the published validation plots: serif
//! text, 7×4 inch canvas, Disimpy in green and Camino in blue.

use std::fs;
use std::ops::Range;
use std::path::Path;

use anyhow::{Context, Result};
use plotters::prelude::*;
use tracing::{info, warn};
use walkbench_analysis::{RuntimeAnalysis, SignalAnalysis};

const DISIMPY: RGBColor = RGBColor(44, 160, 44);
const CAMINO: RGBColor = RGBColor(31, 119, 180);
const FONT: &str = "serif";

/// Canvas size and resolution.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FigureStyle {
    pub width_in: f64,
    pub height_in: f64,
    pub dpi: u32,
}

impl Default for FigureStyle {
    fn default() -> Self {
        Self {
            width_in: 7.0,
            height_in: 4.0,
            dpi: 600,
        }
    }
}

impl FigureStyle {
    /// Canvas size in pixels.
    #[must_use]
    pub fn pixels(&self) -> (u32, u32) {
        (self.to_px(self.width_in * 72.0), self.to_px(self.height_in * 72.0))
    }

    /// Convert typographic points to pixels at this resolution.
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    #[must_use]
    pub fn to_px(&self, points: f64) -> u32 {
        (points * f64::from(self.dpi) / 72.0).round().max(1.0) as u32
    }

    #[allow(clippy::cast_possible_wrap)]
    fn marker(&self) -> i32 {
        self.to_px(3.0) as i32
    }
}

/// Logarithmic axis bounds covering all positive values with some margin.
#[must_use]
pub fn log_bounds(values: impl IntoIterator<Item = f64>) -> Option<Range<f64>> {
    let (lo, hi) = values
        .into_iter()
        .filter(|v| v.is_finite() && *v > 0.0)
        .fold(None, |acc: Option<(f64, f64)>, v| match acc {
            None => Some((v, v)),
            Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
        })?;
    Some(lo / 2.0..hi * 2.0)
}

/// Linear axis bounds with a 5 % margin on both sides.
#[must_use]
pub fn linear_bounds(values: impl IntoIterator<Item = f64>) -> Option<Range<f64>> {
    let (lo, hi) = values
        .into_iter()
        .filter(|v| v.is_finite())
        .fold(None, |acc: Option<(f64, f64)>, v| match acc {
            None => Some((v, v)),
            Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
        })?;
    let pad = if hi > lo { (hi - lo) * 0.05 } else { 0.5 };
    Some(lo - pad..hi + pad)
}

fn create_parent(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }
    Ok(())
}

/// Render runtime against walker count on log–log axes.
pub fn render_runtime(analysis: &RuntimeAnalysis, path: &Path, style: &FigureStyle) -> Result<()> {
    let extrapolated: Vec<(f64, f64)> = analysis
        .camino_extrapolated
        .iter()
        .filter(|e| e.seconds > 0.0)
        .map(|e| (e.walkers as f64, e.seconds))
        .collect();
    if extrapolated.len() < analysis.camino_extrapolated.len() {
        warn!("skipping non-positive extrapolated runtimes on the log axis");
    }

    let x_range = log_bounds(analysis.walkers.iter().map(|&n| n as f64))
        .context("no walker counts to plot")?;
    let y_range = log_bounds(
        analysis
            .disimpy
            .iter()
            .chain(&analysis.camino_measured)
            .copied()
            .chain(extrapolated.iter().map(|p| p.1)),
    )
    .context("no positive runtimes to plot")?;

    create_parent(path)?;
    let root = BitMapBackend::new(path, style.pixels()).into_drawing_area();
    root.fill(&WHITE)?;

    let text = (FONT, f64::from(style.to_px(10.0)));
    let mut chart = ChartBuilder::on(&root)
        .margin(style.to_px(8.0))
        .x_label_area_size(style.to_px(30.0))
        .y_label_area_size(style.to_px(45.0))
        .build_cartesian_2d(x_range.log_scale(), y_range.log_scale())?;

    chart
        .configure_mesh()
        .x_desc("Number of random walkers")
        .y_desc("Runtime (s)")
        .label_style(text)
        .axis_desc_style(text)
        .draw()?;

    let m = style.marker();
    chart
        .draw_series(
            analysis
                .walkers
                .iter()
                .zip(&analysis.disimpy)
                .map(|(&n, &t)| Circle::new((n as f64, t), m, DISIMPY.filled())),
        )?
        .label("Disimpy")
        .legend(move |(x, y)| Circle::new((x, y), m, DISIMPY.filled()));
    chart
        .draw_series(
            analysis
                .walkers
                .iter()
                .zip(&analysis.camino_measured)
                .map(|(&n, &t)| Circle::new((n as f64, t), m, CAMINO.filled())),
        )?
        .label("Camino")
        .legend(move |(x, y)| Circle::new((x, y), m, CAMINO.filled()));
    chart
        .draw_series(extrapolated.iter().map(|&point| {
            EmptyElement::at(point) + Rectangle::new([(-m, -m), (m, m)], CAMINO.filled())
        }))?
        .label("Camino (extrapolated)")
        .legend(move |(x, y)| Rectangle::new([(x - m, y - m), (x + m, y + m)], CAMINO.filled()));

    chart
        .configure_series_labels()
        .position(SeriesLabelPosition::UpperLeft)
        .label_font(text)
        .background_style(WHITE.mix(0.8))
        .border_style(BLACK.mix(0.4))
        .draw()?;

    root.present()
        .with_context(|| format!("failed to write {}", path.display()))?;
    info!(path = %path.display(), "rendered runtime figure");
    Ok(())
}

/// Render normalised signal against b-value.
pub fn render_signals(analysis: &SignalAnalysis, path: &Path, style: &FigureStyle) -> Result<()> {
    let x_range = linear_bounds(analysis.b_values.iter().copied()).context("no b-values to plot")?;
    let y_range = linear_bounds(analysis.disimpy.iter().chain(&analysis.camino).copied())
        .context("no finite signals to plot")?;

    create_parent(path)?;
    let root = BitMapBackend::new(path, style.pixels()).into_drawing_area();
    root.fill(&WHITE)?;

    let text = (FONT, f64::from(style.to_px(10.0)));
    let mut chart = ChartBuilder::on(&root)
        .margin(style.to_px(8.0))
        .x_label_area_size(style.to_px(30.0))
        .y_label_area_size(style.to_px(45.0))
        .build_cartesian_2d(x_range, y_range)?;

    chart
        .configure_mesh()
        .x_desc("b (ms/μm²)")
        .y_desc("S/S₀")
        .x_labels(analysis.b_values.len())
        .x_label_formatter(&|b| format!("{b:.1}"))
        .label_style(text)
        .axis_desc_style(text)
        .draw()?;

    let m = style.marker();
    let cross = style.to_px(5.0);
    let stroke = style.to_px(1.0);
    chart
        .draw_series(
            analysis
                .b_values
                .iter()
                .zip(&analysis.disimpy)
                .map(|(&b, &s)| Circle::new((b, s), m, DISIMPY.filled())),
        )?
        .label("Disimpy")
        .legend(move |(x, y)| Circle::new((x, y), m, DISIMPY.filled()));
    chart
        .draw_series(
            analysis
                .b_values
                .iter()
                .zip(&analysis.camino)
                .map(|(&b, &s)| Cross::new((b, s), cross, CAMINO.stroke_width(stroke))),
        )?
        .label("Camino")
        .legend(move |(x, y)| Cross::new((x, y), cross, CAMINO.stroke_width(stroke)));

    chart
        .configure_series_labels()
        .label_font(text)
        .background_style(WHITE.mix(0.8))
        .border_style(BLACK.mix(0.4))
        .draw()?;

    root.present()
        .with_context(|| format!("failed to write {}", path.display()))?;
    info!(path = %path.display(), "rendered signal figure");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_canvas_matches_published_figures() {
        assert_eq!(FigureStyle::default().pixels(), (4200, 2400));
        let draft = FigureStyle {
            dpi: 72,
            ..FigureStyle::default()
        };
        assert_eq!(draft.pixels(), (504, 288));
        assert_eq!(draft.to_px(10.0), 10);
    }

    #[test]
    fn log_bounds_ignore_non_positive_values() {
        let range = log_bounds([0.0, 1.0, 100.0, -5.0, f64::NAN]).unwrap();
        assert!((range.start - 0.5).abs() < 1e-12);
        assert!((range.end - 200.0).abs() < 1e-12);
        assert!(log_bounds([0.0, -1.0]).is_none());
    }

    #[test]
    fn linear_bounds_pad_both_sides() {
        let range = linear_bounds([0.0, 1.0, 0.5]).unwrap();
        assert!((range.start + 0.05).abs() < 1e-12);
        assert!((range.end - 1.05).abs() < 1e-12);

        let flat = linear_bounds([2.0, 2.0]).unwrap();
        assert!((flat.start - 1.5).abs() < 1e-12);
        assert!((flat.end - 2.5).abs() < 1e-12);
        assert!(linear_bounds(std::iter::empty()).is_none());
    }
}
