use crate::math::{Point3, Vector3};

use super::{Curve, CurveDomain};

/// A cubic Hermite segment on `xi` in `[0, 1]`, defined by end positions and
/// end derivatives.
#[derive(Debug, Clone, PartialEq)]
pub struct HermiteSegment {
    /// Position at `xi = 0`.
    pub x1: Point3,
    /// Derivative at `xi = 0`.
    pub d1: Vector3,
    /// Position at `xi = 1`.
    pub x2: Point3,
    /// Derivative at `xi = 1`.
    pub d2: Vector3,
}

impl HermiteSegment {
    /// Creates a new segment.
    #[must_use]
    pub fn new(x1: Point3, d1: Vector3, x2: Point3, d2: Vector3) -> Self {
        Self { x1, d1, x2, d2 }
    }

    /// Second derivative with respect to `xi`.
    #[must_use]
    pub fn second_derivative(&self, xi: f64) -> Vector3 {
        let [f1, f2, f3, f4] = second_derivative_weights(xi);
        self.x1.coords * f1 + self.d1 * f2 + self.x2.coords * f3 + self.d2 * f4
    }

    /// Curvature at `xi` measured along `radial`, a unit vector normal to the
    /// curve. Positive when the curve bends towards `radial`.
    #[must_use]
    pub fn curvature(&self, xi: f64, radial: &Vector3) -> f64 {
        let tangent = self.derivative(xi);
        self.second_derivative(xi).dot(radial) / tangent.norm_squared()
    }
}

impl Curve for HermiteSegment {
    fn evaluate(&self, xi: f64) -> Point3 {
        let [f1, f2, f3, f4] = value_weights(xi);
        Point3::from(self.x1.coords * f1 + self.d1 * f2 + self.x2.coords * f3 + self.d2 * f4)
    }

    fn derivative(&self, xi: f64) -> Vector3 {
        let [f1, f2, f3, f4] = derivative_weights(xi);
        self.x1.coords * f1 + self.d1 * f2 + self.x2.coords * f3 + self.d2 * f4
    }

    fn domain(&self) -> CurveDomain {
        CurveDomain::new(0.0, 1.0)
    }

    fn is_closed(&self) -> bool {
        false
    }
}

/// Cubic Hermite basis `[h00, h10, h01, h11]` at `xi`.
#[must_use]
pub(crate) fn value_weights(xi: f64) -> [f64; 4] {
    let xi2 = xi * xi;
    let xi3 = xi2 * xi;
    [
        1.0 - 3.0 * xi2 + 2.0 * xi3,
        xi - 2.0 * xi2 + xi3,
        3.0 * xi2 - 2.0 * xi3,
        xi3 - xi2,
    ]
}

/// First derivatives of the basis at `xi`.
#[must_use]
pub(crate) fn derivative_weights(xi: f64) -> [f64; 4] {
    let xi2 = xi * xi;
    [
        6.0 * xi2 - 6.0 * xi,
        1.0 - 4.0 * xi + 3.0 * xi2,
        6.0 * xi - 6.0 * xi2,
        3.0 * xi2 - 2.0 * xi,
    ]
}

fn second_derivative_weights(xi: f64) -> [f64; 4] {
    [
        12.0 * xi - 6.0,
        6.0 * xi - 4.0,
        6.0 - 12.0 * xi,
        6.0 * xi - 2.0,
    ]
}
