//! PLY header parsing.

use tracing::debug;

use crate::error::{MeshError, MeshResult};
use crate::strip_terminator;

/// Line that ends the header.
pub const TERMINATOR: &str = "end_header";

/// Encoding of the element records following the header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlyFormat {
    Ascii,
    BinaryLittleEndian,
    BinaryBigEndian,
}

impl PlyFormat {
    fn parse(keyword: &str) -> Option<Self> {
        match keyword {
            "ascii" => Some(Self::Ascii),
            "binary_little_endian" => Some(Self::BinaryLittleEndian),
            "binary_big_endian" => Some(Self::BinaryBigEndian),
            _ => None,
        }
    }

    /// Keyword used on the `format` line.
    #[must_use]
    pub fn keyword(self) -> &'static str {
        match self {
            Self::Ascii => "ascii",
            Self::BinaryLittleEndian => "binary_little_endian",
            Self::BinaryBigEndian => "binary_big_endian",
        }
    }
}

/// A `property` declaration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Property {
    pub name: String,
    /// `property list ...` declarations hold a variable number of fields.
    pub list: bool,
}

/// An `element` declaration together with its properties.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    pub name: String,
    pub count: usize,
    pub properties: Vec<Property>,
}

impl Element {
    /// Number of fields every record of this element has, if it is fixed.
    #[must_use]
    pub fn fixed_field_count(&self) -> Option<usize> {
        if self.properties.iter().any(|p| p.list) {
            None
        } else {
            Some(self.properties.len())
        }
    }
}

/// Parsed header of an ASCII PLY document.
///
/// The body line range implied by the element counts always fits in a
/// `usize`; [`parse_header`] rejects headers where it does not.
#[derive(Debug, Clone)]
pub struct PlyHeader {
    pub format: PlyFormat,
    /// Zero-based index of the `end_header` line.
    pub terminator_line: usize,
    elements: Vec<Element>,
    vertex_index: usize,
}

impl PlyHeader {
    /// Elements in declaration order.
    #[must_use]
    pub fn elements(&self) -> &[Element] {
        &self.elements
    }

    /// The `vertex` element.
    #[must_use]
    pub fn vertex_element(&self) -> &Element {
        &self.elements[self.vertex_index]
    }

    /// Number of vertices the header declares.
    #[must_use]
    pub fn vertex_count(&self) -> usize {
        self.vertex_element().count
    }

    /// Zero-based index of the first line after the header.
    #[must_use]
    pub fn body_start(&self) -> usize {
        self.terminator_line + 1
    }

    /// Number of body lines that precede the vertex records.
    #[must_use]
    pub fn vertex_offset(&self) -> usize {
        self.elements[..self.vertex_index]
            .iter()
            .map(|e| e.count)
            .sum()
    }

    /// Total number of records declared by all elements.
    #[must_use]
    pub fn declared_records(&self) -> usize {
        self.elements.iter().map(|e| e.count).sum()
    }
}

/// Parse the header from the document's lines.
///
/// The vertex element must be declared exactly once, before the
/// terminator, and carry at least the three position properties. Only
/// ASCII documents are accepted because the rewrite operates on text.
pub fn parse_header<S: AsRef<str>>(lines: &[S]) -> MeshResult<PlyHeader> {
    let magic = lines
        .first()
        .map(|l| strip_terminator(l.as_ref()).trim())
        .ok_or_else(|| MeshError::header(1, "empty file"))?;
    if magic != "ply" {
        return Err(MeshError::header(1, "missing `ply` magic"));
    }

    let mut format = None;
    let mut elements: Vec<Element> = Vec::new();
    let mut vertex_index = None;
    let mut terminator_line = None;

    for (idx, raw) in lines.iter().enumerate().skip(1) {
        let line_no = idx + 1;
        let line = strip_terminator(raw.as_ref()).trim();
        if line == TERMINATOR {
            terminator_line = Some(idx);
            break;
        }

        let mut tokens = line.split_whitespace();
        match tokens.next() {
            None | Some("comment" | "obj_info") => {}
            Some("format") => {
                let keyword = tokens
                    .next()
                    .ok_or_else(|| MeshError::header(line_no, "format line without a format"))?;
                let parsed = PlyFormat::parse(keyword).ok_or_else(|| {
                    MeshError::header(line_no, format!("unknown format `{keyword}`"))
                })?;
                if format.replace(parsed).is_some() {
                    return Err(MeshError::header(line_no, "format declared more than once"));
                }
            }
            Some("element") => {
                let (Some(name), Some(count), None) = (tokens.next(), tokens.next(), tokens.next())
                else {
                    return Err(MeshError::header(
                        line_no,
                        "expected `element <name> <count>`",
                    ));
                };
                let count = count.parse::<usize>().map_err(|_| {
                    MeshError::header(line_no, format!("invalid {name} count `{count}`"))
                })?;
                if name == "vertex" && vertex_index.replace(elements.len()).is_some() {
                    return Err(MeshError::header(
                        line_no,
                        "vertex count declared more than once",
                    ));
                }
                elements.push(Element {
                    name: name.to_owned(),
                    count,
                    properties: Vec::new(),
                });
            }
            Some("property") => {
                let element = elements.last_mut().ok_or_else(|| {
                    MeshError::header(line_no, "property declared before any element")
                })?;
                let rest: Vec<&str> = tokens.collect();
                let Some(name) = rest.last() else {
                    return Err(MeshError::header(line_no, "property without a name"));
                };
                element.properties.push(Property {
                    name: (*name).to_owned(),
                    list: rest.first() == Some(&"list"),
                });
            }
            Some(other) => {
                return Err(MeshError::header(
                    line_no,
                    format!("unrecognised header keyword `{other}`"),
                ));
            }
        }
    }

    let terminator_line = terminator_line.ok_or_else(|| {
        MeshError::header(lines.len(), format!("missing `{TERMINATOR}` terminator"))
    })?;
    let terminator_no = terminator_line + 1;

    let format = format.ok_or_else(|| MeshError::header(terminator_no, "missing format line"))?;
    if format != PlyFormat::Ascii {
        return Err(MeshError::Unsupported(format.keyword().to_owned()));
    }

    let vertex_index = vertex_index.ok_or_else(|| {
        MeshError::header(terminator_no, "missing `element vertex` declaration")
    })?;
    let vertex = &elements[vertex_index];
    if vertex.properties.len() < 3 {
        return Err(MeshError::header(
            terminator_no,
            format!(
                "vertex element declares {} properties, need at least x, y and z",
                vertex.properties.len()
            ),
        ));
    }

    if elements
        .iter()
        .try_fold(terminator_line + 1, |end, e| end.checked_add(e.count))
        .is_none()
    {
        return Err(MeshError::header(
            terminator_no,
            "declared element counts exceed the addressable line range",
        ));
    }

    debug!(
        elements = elements.len(),
        vertices = vertex.count,
        terminator = terminator_no,
        "parsed PLY header"
    );

    Ok(PlyHeader {
        format,
        elements,
        terminator_line,
        vertex_index,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::split_lines;

    const CUBE_HEADER: &str = "ply\n\
        format ascii 1.0\n\
        comment exported in micrometres\n\
        element vertex 8\n\
        property float x\n\
        property float y\n\
        property float z\n\
        property float nx\n\
        element face 12\n\
        property list uchar int vertex_indices\n\
        end_header\n";

    fn parse(text: &str) -> MeshResult<PlyHeader> {
        parse_header(&split_lines(text))
    }

    #[test]
    fn parses_elements_in_order() {
        let header = parse(CUBE_HEADER).unwrap();
        assert_eq!(header.format, PlyFormat::Ascii);
        assert_eq!(header.terminator_line, 10);
        assert_eq!(header.body_start(), 11);
        assert_eq!(header.vertex_count(), 8);
        assert_eq!(header.vertex_offset(), 0);
        assert_eq!(header.declared_records(), 20);
        assert_eq!(header.vertex_element().fixed_field_count(), Some(4));
        assert_eq!(header.elements()[1].fixed_field_count(), None);
    }

    #[test]
    fn vertex_offset_counts_preceding_elements() {
        let text = "ply\nformat ascii 1.0\nelement camera 1\nproperty float view_px\n\
                    element vertex 2\nproperty float x\nproperty float y\nproperty float z\n\
                    end_header\n";
        let header = parse(text).unwrap();
        assert_eq!(header.vertex_offset(), 1);
        assert_eq!(header.vertex_count(), 2);
    }

    #[test]
    fn accepts_crlf_line_endings() {
        let text = CUBE_HEADER.replace('\n', "\r\n");
        assert_eq!(parse(&text).unwrap().vertex_count(), 8);
    }

    #[test]
    fn rejects_missing_vertex_count() {
        let text = "ply\nformat ascii 1.0\nelement face 1\nproperty list uchar int vertex_indices\nend_header\n";
        let err = parse(text).unwrap_err();
        assert!(matches!(err, MeshError::Header { line: 5, .. }), "{err}");
    }

    #[test]
    fn rejects_missing_terminator() {
        let text = "ply\nformat ascii 1.0\nelement vertex 1\nproperty float x\n";
        let err = parse(text).unwrap_err();
        assert!(err.to_string().contains("end_header"), "{err}");
    }

    #[test]
    fn rejects_duplicate_vertex_declaration() {
        let text = "ply\nformat ascii 1.0\nelement vertex 1\nproperty float x\n\
                    element vertex 2\nend_header\n";
        let err = parse(text).unwrap_err();
        assert!(matches!(err, MeshError::Header { line: 5, .. }), "{err}");
    }

    #[test]
    fn rejects_vertex_count_after_terminator() {
        let text = "ply\nformat ascii 1.0\nend_header\nelement vertex 1\n";
        let err = parse(text).unwrap_err();
        assert!(err.to_string().contains("element vertex"), "{err}");
    }

    #[test]
    fn rejects_binary_format() {
        let text = CUBE_HEADER.replace("ascii", "binary_little_endian");
        let err = parse(&text).unwrap_err();
        assert!(matches!(err, MeshError::Unsupported(ref f) if f == "binary_little_endian"));
    }

    #[test]
    fn rejects_bad_magic_and_counts() {
        assert!(matches!(
            parse("PLY\nend_header\n"),
            Err(MeshError::Header { line: 1, .. })
        ));
        assert!(matches!(parse(""), Err(MeshError::Header { line: 1, .. })));

        let text = "ply\nformat ascii 1.0\nelement vertex many\nend_header\n";
        assert!(matches!(parse(text), Err(MeshError::Header { line: 3, .. })));
    }

    #[test]
    fn rejects_counts_that_overflow_the_body() {
        let max = usize::MAX;
        let text = format!(
            "ply\nformat ascii 1.0\nelement vertex {max}\nproperty float x\nproperty float y\n\
             property float z\nelement face 1\nproperty list uchar int vertex_indices\n\
             end_header\n0 0 0\n"
        );
        let err = parse(&text).unwrap_err();
        assert!(matches!(err, MeshError::Header { line: 9, .. }), "{err}");

        let alone = text.replace("element face 1\nproperty list uchar int vertex_indices\n", "");
        let err = parse(&alone).unwrap_err();
        assert!(matches!(err, MeshError::Header { line: 7, .. }), "{err}");
    }

    #[test]
    fn rejects_vertex_without_positions() {
        let text = "ply\nformat ascii 1.0\nelement vertex 1\nproperty float x\nend_header\n0\n";
        let err = parse(text).unwrap_err();
        assert!(err.to_string().contains("x, y and z"), "{err}");
    }
}
