use std::f64::consts::TAU;

use crate::math::{Point3, Vector3};

use super::{Curve, CurveDomain};

/// Simpson intervals used per full turn when integrating arc length.
const INTERVALS_PER_TURN: f64 = 1024.0;

/// Iteration cap for [`Ellipse::advance_by_arc_length`].
const ADVANCE_MAX_ITERATIONS: usize = 50;

/// Iteration cap for [`solve_projected_angle`].
pub const NEWTON_MAX_ITERATIONS: usize = 100;

/// A full ellipse in 3D space.
///
/// `P(t) = center + cos(t) * major + sin(t) * minor`
///
/// The two axis vectors are expected to be perpendicular; their lengths are
/// the semi-axis magnitudes. Nothing here requires `|major| >= |minor|`.
#[derive(Debug, Clone)]
pub struct Ellipse {
    center: Point3,
    major: Vector3,
    minor: Vector3,
}

impl Ellipse {
    /// Creates an ellipse from its center and two perpendicular axis vectors.
    #[must_use]
    pub fn new(center: Point3, major: Vector3, minor: Vector3) -> Self {
        Self {
            center,
            major,
            minor,
        }
    }

    /// Creates an ellipse parallel to the xy plane with its major axis
    /// rotated by `angle` from +x.
    #[must_use]
    pub fn horizontal(center: Point3, major_mag: f64, minor_mag: f64, angle: f64) -> Self {
        let (sin, cos) = angle.sin_cos();
        Self::new(
            center,
            Vector3::new(major_mag * cos, major_mag * sin, 0.0),
            Vector3::new(-minor_mag * sin, minor_mag * cos, 0.0),
        )
    }

    /// Returns the center of the ellipse.
    #[must_use]
    pub fn center(&self) -> &Point3 {
        &self.center
    }

    /// Returns the major axis vector.
    #[must_use]
    pub fn major(&self) -> &Vector3 {
        &self.major
    }

    /// Returns the minor axis vector.
    #[must_use]
    pub fn minor(&self) -> &Vector3 {
        &self.minor
    }

    /// Rate of change of arc length with angle at `t`.
    #[must_use]
    pub fn speed(&self, t: f64) -> f64 {
        let a = self.major.norm();
        let b = self.minor.norm();
        (a * t.sin()).hypot(b * t.cos())
    }

    /// Arc length between two angles, regardless of their order.
    #[must_use]
    pub fn arc_length(&self, t1: f64, t2: f64) -> f64 {
        self.signed_arc_length(t1, t2).abs()
    }

    /// Arc length over a full turn.
    #[must_use]
    pub fn perimeter(&self) -> f64 {
        self.signed_arc_length(0.0, TAU)
    }

    /// Returns the angle reached by moving `arc_length` forward from `t0`
    /// along the ellipse.
    ///
    /// Newton iteration on the integrated arc length; converges to a length
    /// error below `1e-12 * (a + b)`.
    #[must_use]
    pub fn advance_by_arc_length(&self, t0: f64, arc_length: f64) -> f64 {
        let tolerance = 1e-12 * (self.major.norm() + self.minor.norm());
        let mut t = t0 + arc_length / self.speed(t0);
        for _ in 0..ADVANCE_MAX_ITERATIONS {
            let error = self.signed_arc_length(t0, t) - arc_length;
            if error.abs() < tolerance {
                break;
            }
            t -= error / self.speed(t);
        }
        t
    }

    /// Composite Simpson integral of the speed from `t1` to `t2`.
    fn signed_arc_length(&self, t1: f64, t2: f64) -> f64 {
        let span = t2 - t1;
        if span == 0.0 {
            return 0.0;
        }
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let half = ((span.abs() / TAU) * INTERVALS_PER_TURN * 0.5).ceil() as usize;
        let n = 2 * half.max(4);
        #[allow(clippy::cast_precision_loss)]
        let h = span / n as f64;
        let mut sum = self.speed(t1) + self.speed(t2);
        for i in 1..n {
            let weight = if i % 2 == 1 { 4.0 } else { 2.0 };
            #[allow(clippy::cast_precision_loss)]
            let t = t1 + i as f64 * h;
            sum += weight * self.speed(t);
        }
        sum * h / 3.0
    }
}

impl Curve for Ellipse {
    fn evaluate(&self, t: f64) -> Point3 {
        self.center + self.major * t.cos() + self.minor * t.sin()
    }

    fn derivative(&self, t: f64) -> Vector3 {
        self.minor * t.cos() - self.major * t.sin()
    }

    fn domain(&self) -> CurveDomain {
        CurveDomain::new(0.0, TAU)
    }

    fn is_closed(&self) -> bool {
        true
    }
}

/// Result of [`solve_projected_angle`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AngleSolution {
    /// Best angle found.
    pub angle: f64,
    /// Newton steps taken.
    pub iterations: usize,
    /// Whether the residual dropped below the tolerance.
    pub converged: bool,
}

/// Solves `a cos(t) + b sin(t) = d` for `t` by Newton iteration from `start`.
///
/// Stops when `|f(t)| < tolerance`, after [`NEWTON_MAX_ITERATIONS`] steps, or
/// on a vanishing derivative. Non-convergence is logged and the last iterate
/// returned.
#[must_use]
pub fn solve_projected_angle(a: f64, b: f64, d: f64, start: f64, tolerance: f64) -> AngleSolution {
    let mut angle = start;
    let mut iterations = 0;
    loop {
        let (sin, cos) = angle.sin_cos();
        let f = a * cos + b * sin - d;
        if f.abs() < tolerance {
            return AngleSolution {
                angle,
                iterations,
                converged: true,
            };
        }
        if iterations == NEWTON_MAX_ITERATIONS {
            tracing::warn!(angle, residual = f, "no convergence solving ellipse angle");
            return AngleSolution {
                angle,
                iterations,
                converged: false,
            };
        }
        let df = -a * sin + b * cos;
        if df.abs() <= f64::EPSILON * a.hypot(b) {
            tracing::warn!(angle, residual = f, "flat derivative solving ellipse angle");
            return AngleSolution {
                angle,
                iterations,
                converged: false,
            };
        }
        angle -= f / df;
        iterations += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::f64::consts::{FRAC_PI_2, PI};

    fn xy_ellipse(a: f64, b: f64) -> Ellipse {
        Ellipse::horizontal(Point3::origin(), a, b, 0.0)
    }

    #[test]
    fn evaluate_at_quarter_turn() {
        let e = xy_ellipse(3.0, 2.0);
        let p = e.evaluate(FRAC_PI_2);
        assert!((p - Point3::new(0.0, 2.0, 0.0)).norm() < 1e-12);
    }

    #[test]
    fn derivative_at_zero_points_along_minor() {
        let e = xy_ellipse(3.0, 2.0);
        assert!((e.derivative(0.0) - Vector3::new(0.0, 2.0, 0.0)).norm() < 1e-12);
    }

    #[test]
    fn rotated_axes_stay_perpendicular() {
        let e = Ellipse::horizontal(Point3::new(1.0, 2.0, 0.5), 3.0, 2.0, 0.7);
        assert!(e.major().dot(e.minor()).abs() < 1e-12);
        assert_relative_eq!(e.evaluate(0.0).z, 0.5);
    }

    #[test]
    fn circle_perimeter() {
        let e = xy_ellipse(2.0, 2.0);
        assert_relative_eq!(e.perimeter(), 2.0 * PI * 2.0, max_relative = 1e-12);
    }

    #[test]
    fn ellipse_perimeter_matches_ramanujan() {
        let (a, b): (f64, f64) = (0.314, 0.26);
        let h = ((a - b) / (a + b)).powi(2);
        let ramanujan = PI * (a + b) * (1.0 + 3.0 * h / (10.0 + (4.0 - 3.0 * h).sqrt()));
        assert_relative_eq!(xy_ellipse(a, b).perimeter(), ramanujan, max_relative = 1e-9);
    }

    #[test]
    fn arc_length_is_order_independent() {
        let e = xy_ellipse(3.0, 2.0);
        assert_relative_eq!(
            e.arc_length(0.2, 1.3),
            e.arc_length(1.3, 0.2),
            max_relative = 1e-12
        );
    }

    #[test]
    fn quarter_arcs_sum_to_perimeter() {
        let e = xy_ellipse(3.0, 1.0);
        let total: f64 = (0..4)
            .map(|i| {
                let t = f64::from(i) * FRAC_PI_2;
                e.arc_length(t, t + FRAC_PI_2)
            })
            .sum();
        assert_relative_eq!(total, e.perimeter(), max_relative = 1e-10);
    }

    #[test]
    fn advance_inverts_arc_length() {
        let e = xy_ellipse(0.314, 0.26);
        let t0 = 0.59;
        let t1 = e.advance_by_arc_length(t0, 0.17);
        assert_relative_eq!(e.arc_length(t0, t1), 0.17, max_relative = 1e-10);
        assert!(t1 > t0);
    }

    #[test]
    fn newton_finds_root_in_range() {
        let (a, b, d) = (0.24, 0.167, 0.13);
        let tol = 0.314 * 1e-10;
        let s = solve_projected_angle(a, b, d, FRAC_PI_2, tol);
        assert!(s.converged);
        assert!(s.iterations <= NEWTON_MAX_ITERATIONS);
        assert!(s.angle > 0.0 && s.angle < PI);
        assert!((a * s.angle.cos() + b * s.angle.sin() - d).abs() < tol);
    }

    #[test]
    fn newton_reseeded_converges_immediately() {
        let (a, b, d) = (0.24, 0.167, 0.13);
        let tol = 0.314 * 1e-10;
        let first = solve_projected_angle(a, b, d, FRAC_PI_2, tol);
        let again = solve_projected_angle(a, b, d, first.angle, tol);
        assert!(again.converged);
        assert!(again.iterations <= 1);
        assert_relative_eq!(again.angle, first.angle, epsilon = 1e-9);
    }

    #[test]
    fn newton_without_root_reports_failure() {
        let s = solve_projected_angle(1.0, 0.0, 5.0, FRAC_PI_2, 1e-10);
        assert!(!s.converged);
        assert!(s.iterations <= NEWTON_MAX_ITERATIONS);
        assert!(s.angle.is_finite());
    }

    #[test]
    fn newton_stops_on_flat_derivative() {
        let s = solve_projected_angle(1.0, 0.0, 0.5, 0.0, 1e-10);
        assert!(!s.converged);
        assert_eq!(s.iterations, 0);
        assert_relative_eq!(s.angle, 0.0);
    }
}
