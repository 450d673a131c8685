/// 3D point type.
pub type Point3 = nalgebra::Point3<f64>;

/// 3D vector type.
pub type Vector3 = nalgebra::Vector3<f64>;

/// Global geometric tolerance for floating-point comparisons.
pub const TOLERANCE: f64 = 1e-10;

/// Returns `v` normalized, logging a warning when it is near zero.
///
/// A near-zero vector is still divided by its norm, so the caller receives
/// non-finite components rather than an error. Construction proceeds.
#[must_use]
pub fn unit_or_warn(v: &Vector3, what: &str) -> Vector3 {
    let len = v.norm();
    if len < TOLERANCE {
        tracing::warn!(vector = ?v, "degenerate {what}: cannot normalize");
    }
    v / len
}

/// Returns `v` rescaled to length `magnitude`.
#[must_use]
pub fn with_magnitude(v: &Vector3, magnitude: f64) -> Vector3 {
    v * (magnitude / v.norm())
}
