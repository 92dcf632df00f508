//! Vertex block location and vertex line parsing.

use std::ops::Range;

use glam::DVec3;

use crate::error::{Axis, MeshError, MeshResult};
use crate::header::PlyHeader;
use crate::strip_terminator;

/// Locate the lines holding the vertex records.
///
/// Records are laid out one per line, element by element in header order,
/// so the vertex block starts after the records of any element declared
/// before `vertex`. Trailing blank lines are tolerated; otherwise the body
/// must hold exactly the declared number of records.
pub fn locate_vertex_block<S: AsRef<str>>(
    header: &PlyHeader,
    lines: &[S],
) -> MeshResult<Range<usize>> {
    let body_start = header.body_start().min(lines.len());
    let body_end = lines[body_start..]
        .iter()
        .rposition(|l| !l.as_ref().trim().is_empty())
        .map_or(body_start, |last| body_start + last + 1);

    // `parse_header` guarantees the declared records fit after the header.
    let start = body_start + header.vertex_offset();
    let declared = header.vertex_count();
    let end = start + declared;
    if end > body_end {
        return Err(MeshError::VertexCountMismatch {
            declared,
            found: body_end.saturating_sub(start),
        });
    }

    let records = body_end - body_start;
    if records != header.declared_records() {
        return Err(MeshError::BodyLineCountMismatch {
            declared: header.declared_records(),
            found: records,
        });
    }

    Ok(start..end)
}

/// A parsed vertex line.
#[derive(Debug, Clone, PartialEq)]
pub struct VertexLine {
    pub position: DVec3,
    /// Byte ranges of the `x`, `y` and `z` fields within the line.
    pub spans: [Range<usize>; 3],
    /// Total number of whitespace-separated fields.
    pub fields: usize,
}

/// Parse the position fields of a vertex line.
///
/// `line_no` is the 1-based line number used in errors. When
/// `expected_fields` is given the line must have exactly that many fields.
pub fn parse_vertex_line(
    line: &str,
    line_no: usize,
    expected_fields: Option<usize>,
) -> MeshResult<VertexLine> {
    let content = strip_terminator(line);
    let spans: Vec<Range<usize>> = field_spans(content).collect();

    let too_few = spans.len() < 3;
    if too_few || expected_fields.is_some_and(|n| n != spans.len()) {
        return Err(MeshError::FieldCountMismatch {
            line: line_no,
            expected: expected_fields.unwrap_or(3),
            found: spans.len(),
        });
    }

    let mut position = [0.0; 3];
    for (axis, (value, span)) in Axis::ALL.into_iter().zip(position.iter_mut().zip(&spans)) {
        let text = &content[span.clone()];
        *value = text
            .parse::<f64>()
            .ok()
            .filter(|v| v.is_finite())
            .ok_or_else(|| MeshError::Coordinate {
                line: line_no,
                axis,
                value: text.to_owned(),
            })?;
    }

    Ok(VertexLine {
        position: DVec3::from_array(position),
        spans: [spans[0].clone(), spans[1].clone(), spans[2].clone()],
        fields: spans.len(),
    })
}

/// Byte ranges of the whitespace-separated fields of a line.
fn field_spans(line: &str) -> impl Iterator<Item = Range<usize>> + '_ {
    let mut start = None;
    line.char_indices()
        .map(Some)
        .chain(std::iter::once(None))
        .filter_map(move |item| match item {
            Some((i, c)) if c.is_whitespace() => start.take().map(|s| s..i),
            Some((i, _)) => {
                start.get_or_insert(i);
                None
            }
            None => start.take().map(|s| s..line.len()),
        })
}
