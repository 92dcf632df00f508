//! Numeric vertex table read through a PLY reader.
//!
//! The shift is derived from this table rather than from the textual
//! rewrite pass, so the two independent parses cross-check each other.

use glam::DVec3;
use ply_rs_bw::parser::Parser;
use ply_rs_bw::ply::{DefaultElement, Property};
use tracing::debug;

use crate::error::{MeshError, MeshResult};
use crate::header::PlyHeader;
use crate::strip_terminator;

/// One position component at the precision the header declares for it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Component {
    Single(f32),
    Double(f64),
    Integer(i64),
}

impl Component {
    fn from_property(property: &Property) -> Option<Self> {
        Some(match *property {
            Property::Char(v) => Self::Integer(i64::from(v)),
            Property::UChar(v) => Self::Integer(i64::from(v)),
            Property::Short(v) => Self::Integer(i64::from(v)),
            Property::UShort(v) => Self::Integer(i64::from(v)),
            Property::Int(v) => Self::Integer(i64::from(v)),
            Property::UInt(v) => Self::Integer(i64::from(v)),
            Property::Float(v) => Self::Single(v),
            Property::Double(v) => Self::Double(v),
            _ => return None,
        })
    }

    #[must_use]
    pub fn value(self) -> f64 {
        match self {
            Self::Single(v) => f64::from(v),
            Self::Double(v) => v,
            Self::Integer(v) => v as f64,
        }
    }

    /// Whether `text` reads back as exactly this component.
    #[must_use]
    pub fn agrees_with(self, text: &str) -> bool {
        match self {
            Self::Single(v) => text.parse::<f32>().is_ok_and(|p| p.to_bits() == v.to_bits()),
            Self::Double(v) => text.parse::<f64>().is_ok_and(|p| p.to_bits() == v.to_bits()),
            Self::Integer(v) => text.parse::<i64>().is_ok_and(|p| p == v),
        }
    }
}

/// Position components of one vertex, in `x y z` order.
pub type VertexRecord = [Component; 3];

/// Position of a vertex record.
#[must_use]
pub fn position(record: &VertexRecord) -> DVec3 {
    DVec3::new(record[0].value(), record[1].value(), record[2].value())
}

/// Read the position components of every vertex.
///
/// The first three properties of the vertex element are the position, as
/// in the textual pass. Line terminators are normalised before the
/// document is handed to the reader.
pub fn read_vertex_table<S: AsRef<str>>(
    header: &PlyHeader,
    lines: &[S],
) -> MeshResult<Vec<VertexRecord>> {
    let mut document = String::new();
    for line in lines {
        document.push_str(strip_terminator(line.as_ref()));
        document.push('\n');
    }

    let ply = Parser::<DefaultElement>::new()
        .read_ply(&mut document.as_bytes())
        .map_err(|e| MeshError::Reader(e.to_string()))?;

    let element = header.vertex_element();
    let names = [
        element.properties[0].name.as_str(),
        element.properties[1].name.as_str(),
        element.properties[2].name.as_str(),
    ];
    let records = ply
        .payload
        .get(&element.name)
        .ok_or_else(|| MeshError::Reader(format!("no `{}` element in payload", element.name)))?;

    let table = records
        .iter()
        .enumerate()
        .map(|(index, record)| -> MeshResult<VertexRecord> {
            let component = |name: &str| {
                record
                    .get(name)
                    .and_then(Component::from_property)
                    .ok_or_else(|| {
                        MeshError::Reader(format!("vertex {index}: `{name}` is not a scalar"))
                    })
            };
            Ok([
                component(names[0])?,
                component(names[1])?,
                component(names[2])?,
            ])
        })
        .collect::<MeshResult<Vec<_>>>()?;

    debug!(vertices = table.len(), "read vertex table");
    Ok(table)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{parse_header, split_lines};

    fn table(text: &str) -> MeshResult<Vec<VertexRecord>> {
        let lines = split_lines(text);
        let header = parse_header(&lines)?;
        read_vertex_table(&header, &lines)
    }

    #[test]
    fn reads_components_at_declared_precision() {
        let text = "ply\r\nformat ascii 1.0\r\nelement vertex 2\r\nproperty float x\r\n\
                    property double y\r\nproperty int z\r\nproperty uchar red\r\n\
                    end_header\r\n0.1 0.1 -7 255\r\n2 3.5 4 0";
        let records = table(text).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(
            records[0],
            [
                Component::Single(0.1),
                Component::Double(0.1),
                Component::Integer(-7)
            ]
        );
        assert_eq!(position(&records[1]), DVec3::new(2.0, 3.5, 4.0));
    }

    #[test]
    fn agreement_is_exact_at_declared_precision() {
        assert!(Component::Single(0.1).agrees_with("0.1"));
        assert!(Component::Single(0.1).agrees_with("0.100000001"));
        assert!(!Component::Double(0.1).agrees_with("0.100000001"));
        assert!(Component::Integer(4).agrees_with("4"));
        assert!(!Component::Integer(4).agrees_with("4.5"));
        assert!(!Component::Double(1.0).agrees_with("one"));
    }

    #[test]
    fn out_of_range_value_is_a_reader_error() {
        let text = "ply\nformat ascii 1.0\nelement vertex 1\nproperty uchar x\n\
                    property uchar y\nproperty uchar z\nend_header\n1 2 300\n";
        let err = table(text).unwrap_err();
        assert!(matches!(err, MeshError::Reader(_)), "{err}");
    }

    #[test]
    fn list_position_property_is_rejected() {
        let text = "ply\nformat ascii 1.0\nelement vertex 1\n\
                    property list uchar float x\nproperty float y\nproperty float z\n\
                    end_header\n1 0.5 2 3\n";
        let err = table(text).unwrap_err();
        assert!(err.to_string().contains("`x` is not a scalar"), "{err}");
    }
}
