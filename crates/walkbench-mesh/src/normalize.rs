//! Shift-and-scale rewrite of a whole mesh document.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use glam::DVec3;
use tempfile::NamedTempFile;
use tracing::{debug, info};

use crate::block::{VertexLine, locate_vertex_block, parse_vertex_line};
use crate::error::{Axis, MeshError, MeshResult};
use crate::format::format_coordinate;
use crate::header::parse_header;
use crate::shift::compute_shift;
use crate::table::{VertexRecord, position, read_vertex_table};
use crate::{DEFAULT_SCALE, split_lines};

/// Options for [`normalize_text`] and [`normalize_file`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NormalizeOptions {
    /// Factor applied after the shift, converting input length units to
    /// output length units.
    pub scale: f64,
}

impl Default for NormalizeOptions {
    fn default() -> Self {
        Self {
            scale: DEFAULT_SCALE,
        }
    }
}

/// Result of rewriting an in-memory document.
#[derive(Debug, Clone)]
pub struct NormalizedMesh {
    /// The rewritten document.
    pub text: String,
    /// Per-axis minimum subtracted from every vertex, in input units.
    pub shift: DVec3,
    pub vertex_count: usize,
    pub line_count: usize,
}

/// Summary of a file rewrite.
#[derive(Debug, Clone)]
pub struct NormalizeReport {
    pub input: PathBuf,
    pub output: PathBuf,
    pub shift: DVec3,
    pub scale: f64,
    pub vertex_count: usize,
    pub line_count: usize,
}

/// Rewrite every vertex as `(position - shift) * scale`.
///
/// The first pass reads the vertex table through a PLY reader and derives
/// the shift from it; the second pass locates the vertex lines textually,
/// checks every position field against the table and replaces the three
/// fields in place. Separators, line terminators, later vertex fields, the
/// header and all other element records are copied through unchanged.
///
/// The shift carries the precision the header declares: for `float`
/// positions it is the single-precision minimum, so the minimum vertex maps
/// to zero only within single-precision rounding of its text.
pub fn normalize_text(text: &str, options: &NormalizeOptions) -> MeshResult<NormalizedMesh> {
    if !options.scale.is_finite() || options.scale == 0.0 {
        return Err(MeshError::InvalidScale(options.scale));
    }

    let lines = split_lines(text);
    let header = parse_header(&lines)?;
    let block = locate_vertex_block(&header, &lines)?;
    let expected_fields = header.vertex_element().fixed_field_count();

    let vertices = lines[block.clone()]
        .iter()
        .enumerate()
        .map(|(i, line)| parse_vertex_line(line, block.start + i + 1, expected_fields))
        .collect::<MeshResult<Vec<VertexLine>>>()?;
    if vertices.is_empty() {
        return Err(MeshError::NoVertices);
    }

    let table = read_vertex_table(&header, &lines)?;
    cross_check(&lines[block.clone()], block.start, &vertices, &table)?;

    let positions: Vec<DVec3> = table.iter().map(position).collect();
    let shift = compute_shift(&positions).ok_or(MeshError::NoVertices)?;
    debug!(?shift, vertices = vertices.len(), "computed shift vector");

    let mut output = String::with_capacity(text.len());
    for line in &lines[..block.start] {
        output.push_str(line);
    }
    for (line, vertex) in lines[block.clone()].iter().zip(&vertices) {
        rewrite_line(&mut output, line, vertex, shift, options.scale);
    }
    for line in &lines[block.end..] {
        output.push_str(line);
    }

    Ok(NormalizedMesh {
        text: output,
        shift,
        vertex_count: vertices.len(),
        line_count: lines.len(),
    })
}

/// Every textual position field must read back as the table's component,
/// and the component must be finite at its declared precision.
fn cross_check(
    lines: &[&str],
    first_line: usize,
    vertices: &[VertexLine],
    table: &[VertexRecord],
) -> MeshResult<()> {
    if table.len() != vertices.len() {
        return Err(MeshError::VertexCountMismatch {
            declared: vertices.len(),
            found: table.len(),
        });
    }
    for (i, ((line, vertex), record)) in lines.iter().zip(vertices).zip(table).enumerate() {
        let line_no = first_line + i + 1;
        for ((axis, span), component) in Axis::ALL.into_iter().zip(&vertex.spans).zip(record) {
            let value = &line[span.clone()];
            if !component.value().is_finite() {
                return Err(MeshError::Coordinate {
                    line: line_no,
                    axis,
                    value: value.to_owned(),
                });
            }
            if !component.agrees_with(value) {
                return Err(MeshError::TableMismatch {
                    line: line_no,
                    axis,
                    value: value.to_owned(),
                });
            }
        }
    }
    Ok(())
}

fn rewrite_line(output: &mut String, line: &str, vertex: &VertexLine, shift: DVec3, scale: f64) {
    let moved = (vertex.position - shift) * scale;
    let mut cursor = 0;
    for (span, value) in vertex.spans.iter().zip(moved.to_array()) {
        output.push_str(&line[cursor..span.start]);
        output.push_str(&format_coordinate(value));
        cursor = span.end;
    }
    output.push_str(&line[cursor..]);
}

/// Read `input`, normalize it and write the result to `output`.
///
/// The input is never modified. The output is written to a uniquely named
/// temporary file next to it and persisted into place, so nothing appears
/// at `output` unless the whole document was valid and fully written. The
/// temporary file is removed on every failure path.
pub fn normalize_file(
    input: &Path,
    output: &Path,
    options: &NormalizeOptions,
) -> MeshResult<NormalizeReport> {
    if same_file(input, output) {
        return Err(MeshError::SameFile(output.to_path_buf()));
    }

    let text = fs::read_to_string(input).map_err(|e| MeshError::io("read", input, e))?;
    debug!(path = %input.display(), bytes = text.len(), "read mesh");

    let normalized = normalize_text(&text, options)?;

    let dir = output
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or(Path::new("."));
    let mut tmp = NamedTempFile::new_in(dir)
        .map_err(|e| MeshError::io("create a temporary file in", dir, e))?;
    tmp.write_all(normalized.text.as_bytes())
        .map_err(|e| MeshError::io("write", tmp.path(), e))?;
    tmp.persist(output)
        .map_err(|e| MeshError::io("rename into", output, e.error))?;

    info!(
        input = %input.display(),
        output = %output.display(),
        vertices = normalized.vertex_count,
        shift = ?normalized.shift,
        scale = options.scale,
        "normalized mesh"
    );

    Ok(NormalizeReport {
        input: input.to_path_buf(),
        output: output.to_path_buf(),
        shift: normalized.shift,
        scale: options.scale,
        vertex_count: normalized.vertex_count,
        line_count: normalized.line_count,
    })
}

fn same_file(a: &Path, b: &Path) -> bool {
    match (fs::canonicalize(a), fs::canonicalize(b)) {
        (Ok(a), Ok(b)) => a == b,
        _ => a == b,
    }
}
