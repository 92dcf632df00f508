//! Textual formatting of rewritten coordinates.

/// Format a coordinate with the shortest digits that round-trip.
///
/// Values whose magnitude lies in `[1e-4, 1e16)`, and zero, are written in
/// positional notation with at least one fractional digit. Everything else
/// uses exponent notation, so micrometre-to-metre conversions produce
/// `4e-6` rather than a long run of zeros.
#[must_use]
pub fn format_coordinate(value: f64) -> String {
    let magnitude = value.abs();
    if magnitude == 0.0 || (1e-4..1e16).contains(&magnitude) {
        let mut text = value.to_string();
        if !text.contains(['.', 'e', 'i', 'N']) {
            text.push_str(".0");
        }
        text
    } else {
        format!("{value:e}")
    }
}
