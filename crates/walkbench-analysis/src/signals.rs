//! Signal comparison between Disimpy and Camino.

use serde::Serialize;
use tracing::info;

use crate::error::{AnalysisError, AnalysisResult};
use crate::load::{Endianness, ResultPaths, read_raw_f32, read_series};

/// Which signals to load and how the b-values were sampled.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SignalConfig {
    pub walkers: u64,
    pub steps: u64,
    /// Smallest b-value in s/m².
    pub b_min: f64,
    /// Largest b-value in s/m².
    pub b_max: f64,
    pub b_count: usize,
    pub endianness: Endianness,
}

impl Default for SignalConfig {
    fn default() -> Self {
        Self {
            walkers: 10_000,
            steps: crate::DEFAULT_STEPS,
            b_min: 1.0,
            b_max: 5e9,
            b_count: 11,
            endianness: Endianness::Big,
        }
    }
}

impl SignalConfig {
    /// Sampled b-values in ms/µm².
    #[must_use]
    pub fn b_values(&self) -> Vec<f64> {
        linspace(self.b_min, self.b_max, self.b_count)
            .into_iter()
            .map(|b| b / 1e9)
            .collect()
    }
}

/// `count` evenly spaced values from `start` to `end` inclusive.
#[must_use]
pub fn linspace(start: f64, end: f64, count: usize) -> Vec<f64> {
    match count {
        0 => Vec::new(),
        1 => vec![start],
        _ => {
            let step = (end - start) / (count - 1) as f64;
            (0..count)
                .map(|i| if i + 1 == count { end } else { start + step * i as f64 })
                .collect()
        }
    }
}

/// Raw signal sums of both simulators.
#[derive(Debug, Clone)]
pub struct SignalComparison {
    b_values: Vec<f64>,
    walkers: u64,
    disimpy: Vec<f64>,
    camino: Vec<f64>,
}

/// Outcome of [`SignalComparison::analyze`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SignalAnalysis {
    /// b-values in ms/µm².
    pub b_values: Vec<f64>,
    /// Disimpy signal normalised by the walker count.
    pub disimpy: Vec<f64>,
    /// Camino signal normalised by the walker count.
    pub camino: Vec<f64>,
    pub max_abs_difference: f64,
    /// b-value at which the largest difference occurs.
    pub max_difference_b: f64,
}

impl SignalComparison {
    pub fn new(
        b_values: Vec<f64>,
        walkers: u64,
        disimpy: Vec<f64>,
        camino: Vec<f64>,
    ) -> AnalysisResult<Self> {
        if walkers == 0 {
            return Err(AnalysisError::Config("walker count must be positive".into()));
        }
        if b_values.is_empty() {
            return Err(AnalysisError::Config("no b-values sampled".into()));
        }
        for (what, series) in [("disimpy signals", &disimpy), ("camino signals", &camino)] {
            if series.len() != b_values.len() {
                return Err(AnalysisError::LengthMismatch {
                    what,
                    expected: b_values.len(),
                    found: series.len(),
                });
            }
        }
        Ok(Self {
            b_values,
            walkers,
            disimpy,
            camino,
        })
    }

    /// Load signals from a results directory.
    pub fn load(paths: &ResultPaths, config: &SignalConfig) -> AnalysisResult<Self> {
        let disimpy = read_series(&paths.disimpy_signals(config.walkers, config.steps))?;
        let camino = read_raw_f32(
            &paths.camino_signals(config.walkers, config.steps),
            config.endianness,
        )?;
        info!(
            dir = %paths.dir().display(),
            walkers = config.walkers,
            measurements = disimpy.len(),
            "loaded signals"
        );
        Self::new(config.b_values(), config.walkers, disimpy, camino)
    }

    /// Normalise both signals and locate their largest discrepancy.
    #[must_use]
    pub fn analyze(&self) -> SignalAnalysis {
        let n = self.walkers as f64;
        let disimpy: Vec<f64> = self.disimpy.iter().map(|s| s / n).collect();
        let camino: Vec<f64> = self.camino.iter().map(|s| s / n).collect();

        let (max_abs_difference, max_difference_b) = disimpy
            .iter()
            .zip(&camino)
            .zip(&self.b_values)
            .map(|((d, c), &b)| ((d - c).abs(), b))
            .max_by(|a, b| a.0.total_cmp(&b.0))
            .unwrap_or((0.0, self.b_values[0]));

        SignalAnalysis {
            b_values: self.b_values.clone(),
            disimpy,
            camino,
            max_abs_difference,
            max_difference_b,
        }
    }
}
