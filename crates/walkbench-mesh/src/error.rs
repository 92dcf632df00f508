//! Error types for mesh normalization.

use std::fmt;
use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Coordinate axis of a vertex position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    X,
    Y,
    Z,
}

impl Axis {
    pub const ALL: [Axis; 3] = [Axis::X, Axis::Y, Axis::Z];
}

impl fmt::Display for Axis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Axis::X => "x",
            Axis::Y => "y",
            Axis::Z => "z",
        })
    }
}

/// Errors that can occur while normalizing a mesh.
///
/// Line numbers are 1-based, matching what an editor shows.
#[derive(Debug, Error)]
pub enum MeshError {
    /// The header is malformed or lacks a required declaration.
    #[error("malformed header at line {line}: {reason}")]
    Header { line: usize, reason: String },

    /// The header declares a format that cannot be rewritten as text.
    #[error("unsupported PLY format `{0}`: only ascii meshes can be rewritten")]
    Unsupported(String),

    /// Fewer vertex lines follow the header than it declares.
    #[error("header declares {declared} vertices but only {found} vertex lines follow it")]
    VertexCountMismatch { declared: usize, found: usize },

    /// The body does not hold exactly the declared number of element records.
    #[error("header declares {declared} element records but the body holds {found} lines")]
    BodyLineCountMismatch { declared: usize, found: usize },

    /// A vertex line does not match the vertex element's property list.
    #[error("vertex line {line} has {found} fields, expected {expected}")]
    FieldCountMismatch {
        line: usize,
        expected: usize,
        found: usize,
    },

    /// A coordinate field is not a finite number.
    #[error("line {line}: invalid {axis} coordinate `{value}`")]
    Coordinate {
        line: usize,
        axis: Axis,
        value: String,
    },

    /// The PLY reader rejected the document.
    #[error("PLY reader rejected the mesh: {0}")]
    Reader(String),

    /// A coordinate field reads back differently than in the vertex table.
    #[error("line {line}: {axis} coordinate `{value}` disagrees with the parsed vertex table")]
    TableMismatch {
        line: usize,
        axis: Axis,
        value: String,
    },

    /// The vertex element is declared with zero records.
    #[error("mesh has no vertices")]
    NoVertices,

    /// The scale factor is zero or not finite.
    #[error("invalid scale factor {0}")]
    InvalidScale(f64),

    /// The output path resolves to the input mesh.
    #[error("output path {} is the input mesh", .0.display())]
    SameFile(PathBuf),

    /// Reading or writing a mesh file failed.
    #[error("failed to {action} {}: {source}", path.display())]
    Io {
        action: &'static str,
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl MeshError {
    pub(crate) fn header(line: usize, reason: impl Into<String>) -> Self {
        Self::Header {
            line,
            reason: reason.into(),
        }
    }

    pub(crate) fn io(action: &'static str, path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Io {
            action,
            path: path.into(),
            source,
        }
    }
}

/// Result type for mesh operations.
pub type MeshResult<T> = Result<T, MeshError>;
