//! Shift and rescale vertex coordinates of ASCII PLY meshes.
//!
//! Simulation substrates are usually exported from modelling tools in
//! micrometres with an arbitrary origin. This crate translates a mesh so
//! that its per-axis minimum sits at the origin and converts the
//! coordinates with a fixed scale factor, rewriting the file as text so
//! that everything except the leading `x y z` fields of each vertex line
//! stays byte-identical.
//!
//! # Design principles
//!
//! - **Synchronous**: one read-only pass through a PLY reader, one
//!   textual rewrite pass checked against it
//! - **All or nothing**: the output is only written once the whole input
//!   has been validated
//! - **Textual**: the header, face records and trailing vertex
//!   properties are never re-serialised
//!
//! # Key functions
//!
//! - [`parse_header`]: Validate the header and locate the vertex element
//! - [`locate_vertex_block`]: Line range holding the vertex records
//! - [`read_vertex_table`]: Vertex positions through a PLY reader
//! - [`compute_shift`]: Per-axis minimum over all vertices
//! - [`normalize_text`]: Full pipeline over an in-memory document
//! - [`normalize_file`]: Full pipeline from an input path to an output path

mod error;

pub mod block;
pub mod format;
pub mod header;
pub mod normalize;
pub mod shift;
pub mod table;

pub use block::{VertexLine, locate_vertex_block, parse_vertex_line};
pub use error::{Axis, MeshError, MeshResult};
pub use format::format_coordinate;
pub use header::{Element, PlyFormat, PlyHeader, Property, TERMINATOR, parse_header};
pub use normalize::{
    NormalizeOptions, NormalizeReport, NormalizedMesh, normalize_file, normalize_text,
};
pub use shift::compute_shift;
pub use table::{Component, VertexRecord, read_vertex_table};

/// Default scale factor: micrometres to metres.
pub const DEFAULT_SCALE: f64 = 1e-6;

/// Split a document into lines, keeping each line's terminator.
///
/// Joining the returned slices reproduces the input exactly, which is what
/// keeps the rewrite from touching anything it does not mean to.
#[must_use]
pub fn split_lines(text: &str) -> Vec<&str> {
    text.split_inclusive('\n').collect()
}

/// Strip the line terminator (`\n` or `\r\n`) from a line.
#[must_use]
pub(crate) fn strip_terminator(line: &str) -> &str {
    line.trim_end_matches(['\n', '\r'])
}
