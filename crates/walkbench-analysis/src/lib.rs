//! Load random-walk simulator results and compare them against Camino.
//!
//! The benchmark runs Disimpy and the Camino reference simulator over the
//! same substrate and writes one result file per configuration. This crate
//! reads those files back and performs the small numeric transforms the
//! validation figures need. Rendering is left to the caller.
//!
//! # Key types
//!
//! - [`ResultPaths`]: File naming convention of the results directory
//! - [`Polynomial`]: Least-squares polynomial fit
//! - [`RuntimeComparison`]: Runtime scaling with walker count, including
//!   extrapolation of reference runtimes that were too slow to measure
//! - [`SignalComparison`]: Normalised signal attenuation against b-value

mod error;

pub mod fit;
pub mod load;
pub mod runtime;
pub mod signals;

pub use error::{AnalysisError, AnalysisResult};
pub use fit::Polynomial;
pub use load::{Endianness, ResultPaths, Simulator, read_raw_f32, read_scalar, read_series};
pub use runtime::{
    ExtrapolatedRuntime, MAX_DECADES, RuntimeAnalysis, RuntimeComparison, RuntimeConfig,
};
pub use signals::{SignalAnalysis, SignalComparison, SignalConfig, linspace};

/// Number of simulated time steps used by every benchmark run.
pub const DEFAULT_STEPS: u64 = 10_000;
