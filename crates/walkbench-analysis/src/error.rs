//! Error types for result analysis.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur while loading or analysing results.
#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("{}:{line}: invalid number `{value}`", path.display())]
    Parse {
        path: PathBuf,
        line: usize,
        value: String,
    },

    #[error("{}: expected a single value, found {found}", path.display())]
    ExpectedScalar { path: PathBuf, found: usize },

    #[error("{}: {len} bytes is not a whole number of float32 values", path.display())]
    TruncatedFloats { path: PathBuf, len: usize },

    #[error("{what}: expected {expected} values, found {found}")]
    LengthMismatch {
        what: &'static str,
        expected: usize,
        found: usize,
    },

    #[error("{simulator} runtime for {walkers} walkers must be positive, got {value}")]
    NonPositiveRuntime {
        simulator: &'static str,
        walkers: u64,
        value: f64,
    },

    #[error("cannot fit a degree {degree} polynomial to {points} points")]
    Underdetermined { degree: usize, points: usize },

    #[error("least-squares system is singular")]
    Singular,

    #[error("invalid configuration: {0}")]
    Config(String),
}

impl AnalysisError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

/// Result type for analysis operations.
pub type AnalysisResult<T> = Result<T, AnalysisError>;
