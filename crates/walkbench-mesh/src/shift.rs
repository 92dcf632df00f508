//! Shift vector computation.

use glam::DVec3;

/// Per-axis minimum over all vertex positions.
///
/// Returns `None` for an empty slice.
#[must_use]
pub fn compute_shift(positions: &[DVec3]) -> Option<DVec3> {
    positions.iter().copied().reduce(DVec3::min)
}
