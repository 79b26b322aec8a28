//! Math type re-exports from `glam` used for tuple and matrix values.

pub use glam::{
    // Single precision vectors
    Vec2, Vec3, Vec4,
    // Double precision vectors
    DVec2, DVec3, DVec4,
    // Double precision matrices
    DMat4,
};

/// Relative closeness test for floats (Python `math.isclose` defaults).
#[inline]
pub fn is_close(a: f64, b: f64) -> bool {
    if a == b {
        return true;
    }
    if !a.is_finite() || !b.is_finite() {
        return false;
    }
    (a - b).abs() <= 1e-9 * a.abs().max(b.abs())
}
