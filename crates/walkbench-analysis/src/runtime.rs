//! Runtime comparison between Disimpy and Camino.
//!
//! Camino's runtime grows linearly with the number of walkers, so the
//! largest configurations are not run at all. Their runtimes are
//! extrapolated from a linear fit over the measured ones.

use serde::Serialize;
use tracing::{debug, info};

use crate::error::{AnalysisError, AnalysisResult};
use crate::fit::Polynomial;
use crate::load::{ResultPaths, Simulator, read_scalar};

/// Which runtimes to load.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RuntimeConfig {
    /// Walker counts are `10^0 .. 10^(decades - 1)`.
    pub decades: u32,
    /// Number of leading walker counts Camino was measured at.
    pub measured: usize,
    /// Number of simulated time steps.
    pub steps: u64,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            decades: 7,
            measured: 5,
            steps: crate::DEFAULT_STEPS,
        }
    }
}

/// Largest number of decades whose walker counts fit in a `u64`.
pub const MAX_DECADES: u32 = 20;

impl RuntimeConfig {
    /// Walker counts, one per decade.
    pub fn walker_counts(&self) -> AnalysisResult<Vec<u64>> {
        (0..self.decades)
            .map(|i| {
                10u64.checked_pow(i).ok_or_else(|| {
                    AnalysisError::Config(format!(
                        "{} decades of walkers overflow; at most {MAX_DECADES} are supported",
                        self.decades
                    ))
                })
            })
            .collect()
    }
}

/// Measured runtimes of both simulators.
#[derive(Debug, Clone)]
pub struct RuntimeComparison {
    walkers: Vec<u64>,
    disimpy: Vec<f64>,
    camino: Vec<f64>,
}

/// Camino runtime predicted by the linear fit.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ExtrapolatedRuntime {
    pub walkers: u64,
    pub seconds: f64,
    /// Extrapolated Camino runtime divided by the measured Disimpy runtime.
    pub speedup: f64,
}

/// Outcome of [`RuntimeComparison::analyze`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RuntimeAnalysis {
    pub walkers: Vec<u64>,
    pub disimpy: Vec<f64>,
    pub camino_measured: Vec<f64>,
    pub camino_extrapolated: Vec<ExtrapolatedRuntime>,
    /// Seconds per walker.
    pub slope: f64,
    /// Seconds.
    pub intercept: f64,
}

impl RuntimeAnalysis {
    /// Largest extrapolated speed-up, if any walker count was extrapolated.
    #[must_use]
    pub fn max_speedup(&self) -> Option<ExtrapolatedRuntime> {
        self.camino_extrapolated
            .iter()
            .copied()
            .max_by(|a, b| a.speedup.total_cmp(&b.speedup))
    }
}

impl RuntimeComparison {
    /// Build a comparison from runtimes in seconds.
    ///
    /// `disimpy` holds one runtime per walker count; `camino` holds the
    /// runtimes of the leading walker counts it was measured at.
    pub fn new(walkers: Vec<u64>, disimpy: Vec<f64>, camino: Vec<f64>) -> AnalysisResult<Self> {
        if disimpy.len() != walkers.len() {
            return Err(AnalysisError::LengthMismatch {
                what: "disimpy runtimes",
                expected: walkers.len(),
                found: disimpy.len(),
            });
        }
        if camino.len() < 2 || camino.len() > walkers.len() {
            return Err(AnalysisError::Config(format!(
                "camino must be measured at 2 to {} walker counts, got {}",
                walkers.len(),
                camino.len()
            )));
        }

        for (simulator, runtimes) in [(Simulator::Disimpy, &disimpy), (Simulator::Camino, &camino)]
        {
            if let Some((&count, &value)) = walkers
                .iter()
                .zip(runtimes.iter())
                .find(|&(_, &value)| value.is_nan() || value <= 0.0)
            {
                return Err(AnalysisError::NonPositiveRuntime {
                    simulator: simulator.name(),
                    walkers: count,
                    value,
                });
            }
        }

        Ok(Self {
            walkers,
            disimpy,
            camino,
        })
    }

    /// Load runtimes from a results directory.
    pub fn load(paths: &ResultPaths, config: &RuntimeConfig) -> AnalysisResult<Self> {
        let walkers = config.walker_counts()?;
        if config.measured > walkers.len() {
            return Err(AnalysisError::Config(format!(
                "{} measured walker counts but only {} decades",
                config.measured, config.decades
            )));
        }

        let disimpy = walkers
            .iter()
            .map(|&n| read_scalar(&paths.runtime(Simulator::Disimpy, n, config.steps)))
            .collect::<AnalysisResult<Vec<_>>>()?;
        let camino = walkers[..config.measured]
            .iter()
            .map(|&n| read_scalar(&paths.runtime(Simulator::Camino, n, config.steps)))
            .collect::<AnalysisResult<Vec<_>>>()?;

        info!(
            dir = %paths.dir().display(),
            disimpy = disimpy.len(),
            camino = camino.len(),
            "loaded runtimes"
        );
        Self::new(walkers, disimpy, camino)
    }

    /// Fit Camino's runtimes and extrapolate them to the unmeasured counts.
    pub fn analyze(&self) -> AnalysisResult<RuntimeAnalysis> {
        let measured = self.camino.len();
        let xs: Vec<f64> = self.walkers[..measured].iter().map(|&n| n as f64).collect();
        let fit = Polynomial::fit(&xs, &self.camino, 1)?;
        let coefficients = fit.coefficients();
        debug!(slope = coefficients[0], intercept = coefficients[1], "fitted camino runtimes");

        let camino_extrapolated = self.walkers[measured..]
            .iter()
            .zip(&self.disimpy[measured..])
            .map(|(&walkers, &disimpy)| {
                let seconds = fit.eval(walkers as f64);
                ExtrapolatedRuntime {
                    walkers,
                    seconds,
                    speedup: seconds / disimpy,
                }
            })
            .collect();

        Ok(RuntimeAnalysis {
            walkers: self.walkers.clone(),
            disimpy: self.disimpy.clone(),
            camino_measured: self.camino.clone(),
            camino_extrapolated,
            slope: coefficients[0],
            intercept: coefficients[1],
        })
    }
}
