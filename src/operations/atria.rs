use std::f64::consts::{FRAC_PI_2, PI, TAU};

use crate::error::{GeometryError, Result};
use crate::geometry::{solve_projected_angle, AngleSolution, Curve, Ellipse};
use crate::math::{with_magnitude, Point3, Vector3};
use crate::mesh::{MeshStore, NodeData, NodeId};
use crate::options::{ShapeParameters, MIN_ELEMENTS_AROUND_ATRIA};

use super::outlets::OutletRings;
use super::RingPair;

/// Elements across the atrial septum.
const ATRIAL_SEPTUM_ELEMENTS: usize = 2;

/// Inclination of the atrial inlet slope from the base plane.
const INLET_SLOPE_ANGLE: f64 = PI / 6.0;

/// Inner major axis as a fraction of the free space inside the LV wall.
const INNER_MAJOR_FRACTION: f64 = 0.8;

/// Newton tolerance relative to the outer major semi-axis.
const NEWTON_RELATIVE_TOLERANCE: f64 = 1e-10;

/// Vertical scale of the crest node's d2 on the inner and outer surfaces.
const CREST_D2_Z_SCALE: [f64; 2] = [0.5, 0.25];

/// Crest node d2 magnitude relative to the base depth.
const CREST_D2_SCALE: f64 = 1.5;

/// Positions of the three crux nodes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CruxPositions {
    /// Crux centre.
    pub centre: Point3,
    /// Crux node towards the left atrium.
    pub left: Point3,
    /// Crux node towards the right atrium.
    pub right: Point3,
}

/// Target edge lengths on the outer atrial ellipse.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EdgeLengths {
    /// Edges along the atrial septum and the crux.
    pub septal: f64,
    /// Edges around the free wall.
    pub free_wall: f64,
    /// Edges between a septal and a free wall run.
    pub transition: f64,
}

/// Sample angles and derivative magnitudes around one atrium.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct AtrialSamples {
    /// Ellipse angle of each node.
    pub angles: Vec<f64>,
    /// d1 magnitude of each inner node.
    pub inner_lengths: Vec<f64>,
    /// d1 magnitude of each outer node.
    pub outer_lengths: Vec<f64>,
}

impl AtrialSamples {
    /// Mirrors left atrial samples onto the right atrium.
    ///
    /// Node `n` takes the data of left node `-n` (mod the count) with the
    /// angle reflected through a full turn. Node 0 is reset to
    /// `septum_angle` so it is not a turn out.
    fn mirrored(&self, septum_angle: f64) -> Self {
        let count = self.angles.len();
        let source = |n: usize| (count - n) % count;
        let mut angles: Vec<f64> = (0..count).map(|n| TAU - self.angles[source(n)]).collect();
        if let Some(first) = angles.first_mut() {
            *first = septum_angle;
        }
        Self {
            angles,
            inner_lengths: (0..count).map(|n| self.inner_lengths[source(n)]).collect(),
            outer_lengths: (0..count).map(|n| self.outer_lengths[source(n)]).collect(),
        }
    }
}

/// Geometry of the two atrial rings, computed from the crux positions.
///
/// The left atrium is placed so its outer ellipse passes through the crux
/// left node; the right atrium mirrors it across the septal line.
#[derive(Debug, Clone)]
pub struct AtrialLayout {
    /// Left atrium inner ellipse, at the inner height.
    pub la_inner: Ellipse,
    /// Left atrium outer ellipse, at the crux height.
    pub la_outer: Ellipse,
    /// Right atrium inner ellipse.
    pub ra_inner: Ellipse,
    /// Right atrium outer ellipse.
    pub ra_outer: Ellipse,
    /// Angle of the septum centre on the left atrial ellipses.
    pub septum_angle: f64,
    /// Angle of the crux left node on the left outer ellipse.
    pub crux_left: AngleSolution,
    /// Target outer edge lengths.
    pub edges: EdgeLengths,
    /// Left atrium samples.
    pub la: AtrialSamples,
    /// Right atrium samples.
    pub ra: AtrialSamples,
}

impl AtrialLayout {
    /// Computes the atrial layout.
    ///
    /// # Errors
    ///
    /// Returns [`GeometryError::Degenerate`] if fewer than
    /// [`MIN_ELEMENTS_AROUND_ATRIA`] elements go around the atria.
    pub fn compute(
        params: &ShapeParameters,
        base_rotation: f64,
        crux: &CruxPositions,
    ) -> std::result::Result<Self, GeometryError> {
        let count = params.elements_around_atria;
        if count < MIN_ELEMENTS_AROUND_ATRIA {
            return Err(GeometryError::Degenerate(format!(
                "{count} elements around atria, need at least {MIN_ELEMENTS_AROUND_ATRIA}"
            )));
        }
        let rotation = params.atria_major_axis_rotation;
        let slope_length = params.rv_free_wall_thickness;
        let slope_height = slope_length * INLET_SLOPE_ANGLE.tan();
        let lv_inner_radius = params.lv_outer_radius - params.lv_free_wall_thickness;
        let inner_major =
            INNER_MAJOR_FRACTION * (lv_inner_radius - 0.5 * params.septum_base_radial_displacement);
        let inner_minor = lv_inner_radius - params.lv_outlet_outer_radius;
        let outer_major = inner_major + slope_length;
        let outer_minor = inner_minor + slope_length;

        // work in the frame with +x along the septal line towards the LA
        let frame_rotation = base_rotation + FRAC_PI_2;
        let (sin_frame, cos_frame) = frame_rotation.sin_cos();
        let offset = crux.left - crux.centre;
        let left_x = offset.x * cos_frame + offset.y * sin_frame;
        let left_y = offset.y * cos_frame - offset.x * sin_frame;
        let from_frame = |x: f64, y: f64| {
            Vector3::new(x * cos_frame - y * sin_frame, x * sin_frame + y * cos_frame, 0.0)
        };

        let (sin_rot, cos_rot) = rotation.sin_cos();
        let inner_ax = inner_major * cos_rot;
        let inner_bx = inner_minor * sin_rot;
        let septum_angle = inner_bx.atan2(inner_ax);
        let centre_x = -0.5 * params.atrial_septum_thickness
            - inner_ax * septum_angle.cos()
            - inner_bx * septum_angle.sin();

        let outer_ax = outer_major * cos_rot;
        let outer_ay = -outer_major * sin_rot;
        let outer_bx = outer_minor * sin_rot;
        let outer_by = outer_minor * cos_rot;
        let crux_left = solve_projected_angle(
            outer_ax,
            outer_bx,
            left_x - centre_x,
            FRAC_PI_2,
            outer_major * NEWTON_RELATIVE_TOLERANCE,
        );
        let (sin_left, cos_left) = crux_left.angle.sin_cos();
        let centre_y = left_y - outer_ay * cos_left - outer_by * sin_left;

        let inner_z = crux.right.z - slope_height;
        let outer_z = crux.right.z;
        let la_centre = crux.centre + from_frame(centre_x, centre_y);
        let ra_centre = crux.centre + from_frame(-centre_x, centre_y);
        let at = |c: Point3, z: f64| Point3::new(c.x, c.y, z);
        let la_angle = base_rotation + FRAC_PI_2 - rotation;
        let ra_angle = base_rotation - FRAC_PI_2 + rotation;
        let la_inner = Ellipse::horizontal(at(la_centre, inner_z), inner_major, inner_minor, la_angle);
        let la_outer = Ellipse::horizontal(at(la_centre, outer_z), outer_major, outer_minor, la_angle);
        let ra_inner = Ellipse::horizontal(at(ra_centre, inner_z), inner_major, inner_minor, ra_angle);
        let ra_outer = Ellipse::horizontal(at(ra_centre, outer_z), outer_major, outer_minor, ra_angle);

        #[allow(clippy::cast_precision_loss)]
        let septal = la_outer.arc_length(septum_angle, crux_left.angle)
            / (1.0 + 0.5 * ATRIAL_SEPTUM_ELEMENTS as f64);
        #[allow(clippy::cast_precision_loss)]
        let free_wall = (la_outer.perimeter() - septal * (ATRIAL_SEPTUM_ELEMENTS + 2) as f64)
            / (count - ATRIAL_SEPTUM_ELEMENTS - 2) as f64;
        let edges = EdgeLengths {
            septal,
            free_wall,
            transition: 0.5 * (septal + free_wall),
        };
        let la = sample_left_atrium(&la_inner, &la_outer, septum_angle, &edges, count);
        let ra = la.mirrored(-septum_angle);

        tracing::debug!(
            crux_left = crux_left.angle,
            iterations = crux_left.iterations,
            septal,
            free_wall,
            "computed atrial layout"
        );
        Ok(Self {
            la_inner,
            la_outer,
            ra_inner,
            ra_outer,
            septum_angle,
            crux_left,
            edges,
            la,
            ra,
        })
    }

    /// Elements around each atrium.
    #[must_use]
    pub fn count(&self) -> usize {
        self.la.angles.len()
    }

    /// Height of the inner atrial rings.
    #[must_use]
    pub fn inner_z(&self) -> f64 {
        self.la_inner.center().z
    }
}

/// Steps around the left outer ellipse from the septum centre, collecting
/// angles and derivative magnitudes.
fn sample_left_atrium(
    inner: &Ellipse,
    outer: &Ellipse,
    septum_angle: f64,
    edges: &EdgeLengths,
    count: usize,
) -> AtrialSamples {
    let crux_limit = ATRIAL_SEPTUM_ELEMENTS / 2 + 1;
    let septum_limit = count - (ATRIAL_SEPTUM_ELEMENTS + 1) / 2 - 1;
    let mut angles = Vec::with_capacity(count);
    let mut outer_lengths = Vec::with_capacity(count);
    let mut septal_class = Vec::with_capacity(count);
    let mut angle = septum_angle;
    let mut derivative = (edges.septal, true);
    for n in 0..count {
        angles.push(angle);
        outer_lengths.push(derivative.0);
        septal_class.push(derivative.1);
        let (step, next) = if n < crux_limit || n > septum_limit {
            (edges.septal, (edges.septal, true))
        } else if n == crux_limit {
            (edges.transition, (edges.free_wall, false))
        } else if n == septum_limit {
            (edges.transition, (edges.septal, true))
        } else {
            (edges.free_wall, (edges.free_wall, false))
        };
        derivative = next;
        angle = outer.advance_by_arc_length(angle, step);
    }

    let mut inner_lengths = Vec::with_capacity(count);
    let wrap = inner.arc_length(angles[count - 1] - TAU, angles[0]);
    let mut previous = wrap;
    for n in 0..count {
        let next = if n + 1 == count {
            wrap
        } else {
            inner.arc_length(angles[n], angles[n + 1])
        };
        inner_lengths.push(if septal_class[n] {
            previous.min(next)
        } else {
            previous.max(next)
        });
        previous = next;
    }
    AtrialSamples {
        angles,
        inner_lengths,
        outer_lengths,
    }
}

/// How d2 is set on an atrial node.
#[derive(Debug, Clone, Copy)]
enum InletDirection {
    /// Straight up, with the inner ring height as its length.
    Vertical,
    /// Normal to the ring across the inlet slope.
    Slope,
    /// Flattened for the supraventricular crest.
    Crest,
}

/// One atrium's ellipses and samples.
struct Atrium<'l> {
    inner: &'l Ellipse,
    outer: &'l Ellipse,
    samples: &'l AtrialSamples,
}

impl Atrium<'_> {
    fn node(&self, n: usize, outer: bool, direction: InletDirection, base_depth: f64) -> NodeData {
        let angle = self.samples.angles[n];
        let inner_x = self.inner.evaluate(angle);
        let outer_x = self.outer.evaluate(angle);
        let (ellipse, length) = if outer {
            (self.outer, self.samples.outer_lengths[n])
        } else {
            (self.inner, self.samples.inner_lengths[n])
        };
        let d1 = with_magnitude(&ellipse.derivative(angle), length);
        let d3 = outer_x - inner_x;
        let d2 = match direction {
            InletDirection::Vertical => Vector3::new(0.0, 0.0, inner_x.z),
            InletDirection::Slope => with_magnitude(&d3.cross(&d1), inner_x.z),
            InletDirection::Crest => {
                let mut d2 = d3.cross(&d1);
                d2.z *= CREST_D2_Z_SCALE[usize::from(outer)];
                with_magnitude(&d2, CREST_D2_SCALE * base_depth)
            }
        };
        NodeData::new(if outer { outer_x } else { inner_x }, d1, d2, d3)
    }
}

/// Nodes created by [`BuildAtria`].
#[derive(Debug, Clone)]
pub struct AtrialRings {
    /// Left atrium rings, with shared nodes aliased in.
    pub la: RingPair,
    /// Right atrium rings, with shared nodes aliased in.
    pub ra: RingPair,
    /// Geometry the rings were sampled from.
    pub layout: AtrialLayout,
}

/// Builds the inner and outer node rings around both atria.
///
/// Outer ring positions next to the septum and the crux are not created but
/// alias existing nodes: LA outer 0, 1 and 2 are RA inner 0, the crux centre
/// and crux left; RA outer 0, `n - 2` and `n - 1` are LA inner 0, crux right
/// and the crux centre. A second pass then sets every transverse derivative
/// from the node positions across the wall.
pub struct BuildAtria<'a> {
    params: &'a ShapeParameters,
}

impl<'a> BuildAtria<'a> {
    /// Creates a new `BuildAtria` operation.
    #[must_use]
    pub fn new(params: &'a ShapeParameters) -> Self {
        Self { params }
    }

    /// Executes the operation.
    ///
    /// Nodes are added as LA inner ring, LA outer nodes `3..n`, RA inner
    /// ring, then RA outer nodes `1..n - 2`.
    ///
    /// # Errors
    ///
    /// Returns an error if the crux nodes are missing from the store or the
    /// atrial element count is below the minimum.
    pub fn execute(&self, store: &mut MeshStore, outlets: &OutletRings) -> Result<AtrialRings> {
        let crux = outlets.crux;
        let positions = CruxPositions {
            centre: store.node(crux.centre)?.x,
            left: store.node(crux.left)?.x,
            right: store.node(crux.right)?.x,
        };
        let layout = AtrialLayout::compute(self.params, outlets.base_rotation, &positions)?;
        let count = layout.count();
        let base_depth = self.params.base_depth();
        let septal_half = ATRIAL_SEPTUM_ELEMENTS / 2;

        let left = Atrium {
            inner: &layout.la_inner,
            outer: &layout.la_outer,
            samples: &layout.la,
        };
        let la_crux_limit = septal_half + 1;
        let la_septum_limit = count - (ATRIAL_SEPTUM_ELEMENTS + 1) / 2 - 1;
        let la_direction = |n: usize| {
            if n < la_crux_limit || n > la_septum_limit {
                InletDirection::Vertical
            } else {
                InletDirection::Slope
            }
        };
        let la_inner: Vec<NodeId> = (0..count)
            .map(|n| store.add_node(left.node(n, false, la_direction(n), base_depth)))
            .collect();
        let la_outer_created: Vec<NodeId> = ((la_crux_limit + 1)..count)
            .map(|n| store.add_node(left.node(n, true, la_direction(n), base_depth)))
            .collect();

        let right = Atrium {
            inner: &layout.ra_inner,
            outer: &layout.ra_outer,
            samples: &layout.ra,
        };
        let ra_crux_limit = count - septal_half - 1;
        let ra_direction = |n: usize| {
            if n <= septal_half || n > ra_crux_limit {
                InletDirection::Vertical
            } else if n + 1 == ra_crux_limit {
                InletDirection::Crest
            } else {
                InletDirection::Slope
            }
        };
        let ra_inner: Vec<NodeId> = (0..count)
            .map(|n| store.add_node(right.node(n, false, ra_direction(n), base_depth)))
            .collect();
        let ra_outer_created: Vec<NodeId> = (septal_half..ra_crux_limit)
            .map(|n| store.add_node(right.node(n, true, ra_direction(n), base_depth)))
            .collect();

        let mut la_outer = vec![ra_inner[0], crux.centre, crux.left];
        la_outer.extend(la_outer_created);
        let mut ra_outer = vec![la_inner[0]];
        ra_outer.extend(ra_outer_created);
        ra_outer.extend([crux.right, crux.centre]);

        let la = RingPair {
            inner: la_inner,
            outer: la_outer,
        };
        let ra = RingPair {
            inner: ra_inner,
            outer: ra_outer,
        };
        set_transverse_derivatives(store, &la, &ra, outlets)?;
        tracing::debug!(
            la_first = %la.inner[0],
            ra_first = %ra.inner[0],
            count,
            "built atrial rings"
        );
        Ok(AtrialRings { la, ra, layout })
    }
}

/// Sets d3 across the wall on both rings of both atria, then blends the
/// crux centre between the two atria.
fn set_transverse_derivatives(
    store: &mut MeshStore,
    la: &RingPair,
    ra: &RingPair,
    outlets: &OutletRings,
) -> Result<()> {
    let crux = outlets.crux;
    for (ring, right_side) in [(la, false), (ra, true)] {
        for (n, (&inner, &outer)) in ring.inner.iter().zip(&ring.outer).enumerate() {
            let across = store.node(outer)?.x - store.node(inner)?.x;
            store.node_mut(inner)?.d3 = Some(across);
            if right_side && (n == 0 || outer == crux.centre) {
                continue;
            }
            let sign = if outer == crux.left || outer == crux.right {
                -1.0
            } else {
                1.0
            };
            store.node_mut(outer)?.d3 = Some(across * sign);
        }
    }

    let centre = store.node(crux.centre)?.x;
    let towards_la = store.node(la.inner[1])?.x - centre;
    let towards_ra = store.node(ra.inner[ra.inner.len() - 1])?.x - centre;
    let mut blended = towards_la + towards_ra;
    blended.z = 0.0;
    store.node_mut(crux.centre)?.d3 = Some(with_magnitude(&blended, towards_la.norm()));
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::landmarks::SyntheticVentricles;
    use crate::operations::BuildOutlets;
    use crate::options::MeshOptions;
    use approx::assert_relative_eq;

    fn build() -> (MeshStore, OutletRings, AtrialRings) {
        let params = MeshOptions::default().resolve();
        let mut store = MeshStore::new();
        let ventricles = SyntheticVentricles::build(&mut store, &params);
        let outlets = BuildOutlets::new(&params)
            .execute(&mut store, &ventricles)
            .unwrap();
        let atria = BuildAtria::new(&params).execute(&mut store, &outlets).unwrap();
        (store, outlets, atria)
    }

    #[test]
    fn ellipse_magnitudes_follow_wall_dimensions() {
        let (_, _, atria) = build();
        let layout = &atria.layout;
        assert_relative_eq!(layout.la_inner.major().norm(), 0.264, epsilon = 1e-12);
        assert_relative_eq!(layout.la_inner.minor().norm(), 0.21, epsilon = 1e-12);
        assert_relative_eq!(layout.ra_outer.major().norm(), 0.314, epsilon = 1e-12);
        assert_relative_eq!(layout.ra_outer.minor().norm(), 0.26, epsilon = 1e-12);
        let drop = layout.la_outer.center().z - layout.inner_z();
        assert_relative_eq!(drop, 0.05 * (PI / 6.0).tan(), epsilon = 1e-12);
    }

    #[test]
    fn crux_left_lies_on_left_outer_ellipse() {
        let (store, outlets, atria) = build();
        let layout = &atria.layout;
        assert!(layout.crux_left.converged);
        assert!(layout.crux_left.iterations <= 100);
        let on_ellipse = layout.la_outer.evaluate(layout.crux_left.angle);
        let left = store.node(outlets.crux.left).unwrap().x;
        assert_relative_eq!(on_ellipse.x, left.x, epsilon = 1e-9);
        assert_relative_eq!(on_ellipse.y, left.y, epsilon = 1e-9);
    }

    #[test]
    fn newton_reseeded_at_root_converges_at_once() {
        let params = MeshOptions::default().resolve();
        let (_, _, atria) = build();
        let layout = &atria.layout;
        let rotation = params.atria_major_axis_rotation;
        let a = layout.la_outer.major().norm() * rotation.cos();
        let b = layout.la_outer.minor().norm() * rotation.sin();
        let (sin, cos) = layout.crux_left.angle.sin_cos();
        let d = a * cos + b * sin;
        let again = solve_projected_angle(a, b, d, layout.crux_left.angle, 1e-10);
        assert!(again.iterations <= 1);
        assert!(again.converged);
    }

    #[test]
    fn third_sample_is_crux_left() {
        let (_, _, atria) = build();
        let layout = &atria.layout;
        assert_relative_eq!(layout.la.angles[2], layout.crux_left.angle, epsilon = 1e-9);
        assert_relative_eq!(layout.ra.angles[0], -layout.septum_angle, epsilon = 1e-15);
    }

    #[test]
    fn outer_samples_close_the_perimeter() {
        let (_, _, atria) = build();
        let layout = &atria.layout;
        let count = layout.count();
        let angles = &layout.la.angles;
        let mut total = 0.0;
        for n in 0..count {
            let next = if n + 1 == count { angles[0] + TAU } else { angles[n + 1] };
            total += layout.la_outer.arc_length(angles[n], next);
        }
        let perimeter = layout.la_outer.perimeter();
        assert_relative_eq!(total, perimeter, max_relative = 1e-6);
        let edges = layout.edges;
        #[allow(clippy::cast_precision_loss)]
        let stepped = 4.0 * edges.septal + (count - 4) as f64 * edges.free_wall;
        assert_relative_eq!(stepped, perimeter, max_relative = 1e-6);
        let closing = layout.la_outer.arc_length(angles[count - 1], angles[0] + TAU);
        assert_relative_eq!(closing, edges.septal, max_relative = 1e-6);
    }

    fn closed_ring_length(ellipse: &Ellipse, angles: &[f64]) -> f64 {
        let count = angles.len();
        (0..count)
            .map(|n| {
                let next = if n + 1 == count { angles[0] + TAU } else { angles[n + 1] };
                ellipse.arc_length(angles[n], next)
            })
            .sum()
    }

    #[test]
    fn every_ring_closes_its_perimeter() {
        let (_, _, atria) = build();
        let layout = &atria.layout;
        for (ellipse, angles) in [
            (&layout.la_inner, &layout.la.angles),
            (&layout.la_outer, &layout.la.angles),
            (&layout.ra_inner, &layout.ra.angles),
            (&layout.ra_outer, &layout.ra.angles),
        ] {
            assert!(angles.windows(2).all(|w| w[0] < w[1]));
            assert!(angles[angles.len() - 1] < angles[0] + TAU);
            assert_relative_eq!(
                closed_ring_length(ellipse, angles),
                ellipse.perimeter(),
                max_relative = 1e-6
            );
        }
    }

    #[test]
    fn inner_lengths_pick_adjacent_arcs() {
        let (_, _, atria) = build();
        let layout = &atria.layout;
        let angles = &layout.la.angles;
        let arc = |a: f64, b: f64| layout.la_inner.arc_length(a, b);
        let before = arc(angles[2], angles[3]);
        let after = arc(angles[3], angles[4]);
        assert_relative_eq!(layout.la.inner_lengths[3], before.max(after));
        let before = arc(angles[0], angles[1]);
        let after = arc(angles[1], angles[2]);
        assert_relative_eq!(layout.la.inner_lengths[1], before.min(after));
        let n = layout.count();
        assert_relative_eq!(layout.ra.inner_lengths[1], layout.la.inner_lengths[n - 1]);
        assert_relative_eq!(layout.ra.outer_lengths[0], layout.la.outer_lengths[0]);
    }

    #[test]
    fn rings_alias_shared_nodes() {
        let (store, outlets, atria) = build();
        let (la, ra) = (&atria.la, &atria.ra);
        assert_eq!(la.outer[0], ra.inner[0]);
        assert_eq!(la.outer[1], outlets.crux.centre);
        assert_eq!(la.outer[2], outlets.crux.left);
        assert_eq!(ra.outer[0], la.inner[0]);
        assert_eq!(ra.outer[5], outlets.crux.right);
        assert_eq!(ra.outer[6], outlets.crux.centre);
        assert_eq!(la.inner.len(), 7);
        assert_eq!(ra.outer.len(), 7);
        assert_eq!(store.node_count(), 60 + 7 + 4 + 7 + 4);
    }

    #[test]
    fn nodes_created_in_ring_order() {
        let (_, _, atria) = build();
        let ids = |v: &[NodeId]| v.iter().map(|id| id.get()).collect::<Vec<_>>();
        assert_eq!(ids(&atria.la.inner), (61..68).collect::<Vec<_>>());
        assert_eq!(ids(&atria.la.outer[3..]), (68..72).collect::<Vec<_>>());
        assert_eq!(ids(&atria.ra.inner), (72..79).collect::<Vec<_>>());
        assert_eq!(ids(&atria.ra.outer[1..5]), (79..83).collect::<Vec<_>>());
    }

    #[test]
    fn transverse_derivatives_cross_the_wall() {
        let (store, outlets, atria) = build();
        let x = |id: NodeId| store.node(id).unwrap().x;
        let d3 = |id: NodeId| store.node(id).unwrap().d3.unwrap();
        let la = &atria.la;
        for n in 3..7 {
            let across = x(la.outer[n]) - x(la.inner[n]);
            assert_relative_eq!((d3(la.inner[n]) - across).norm(), 0.0, epsilon = 1e-14);
            assert_relative_eq!((d3(la.outer[n]) - across).norm(), 0.0, epsilon = 1e-14);
        }
        let left = outlets.crux.left;
        assert_relative_eq!((d3(left) + (x(left) - x(la.inner[2]))).norm(), 0.0, epsilon = 1e-14);
        let ra = &atria.ra;
        let right = outlets.crux.right;
        assert_relative_eq!((d3(right) + (x(right) - x(ra.inner[5]))).norm(), 0.0, epsilon = 1e-14);
        // RA septum node keeps the direction towards the LA septum node
        let across = x(la.inner[0]) - x(ra.inner[0]);
        assert_relative_eq!((d3(ra.inner[0]) - across).norm(), 0.0, epsilon = 1e-14);
        assert_relative_eq!((d3(la.inner[0]) + across).norm(), 0.0, epsilon = 1e-14);
    }

    #[test]
    fn crux_centre_derivative_is_level_blend() {
        let (store, outlets, atria) = build();
        let x = |id: NodeId| store.node(id).unwrap().x;
        let d3 = store.node(outlets.crux.centre).unwrap().d3.unwrap();
        let towards_la = x(atria.la.inner[1]) - x(outlets.crux.centre);
        assert_relative_eq!(d3.z, 0.0);
        assert_relative_eq!(d3.norm(), towards_la.norm(), epsilon = 1e-14);
    }

    #[test]
    fn crest_node_d2_has_crest_length() {
        let params = MeshOptions::default().resolve();
        let (store, _, atria) = build();
        let crest = atria.ra.inner[4];
        let d2 = store.node(crest).unwrap().d2;
        assert_relative_eq!(d2.norm(), 1.5 * params.base_depth(), epsilon = 1e-12);
        let vertical = store.node(atria.ra.inner[1]).unwrap().d2;
        assert_relative_eq!(vertical.x, 0.0);
        assert_relative_eq!(vertical.z, atria.layout.inner_z());
    }

    #[test]
    fn too_few_atrial_elements_is_degenerate() {
        let mut params = MeshOptions::default().resolve();
        params.elements_around_atria = 4;
        let crux = CruxPositions {
            centre: Point3::origin(),
            left: Point3::new(0.1, 0.0, 0.0),
            right: Point3::new(-0.1, 0.0, 0.0),
        };
        assert!(matches!(
            AtrialLayout::compute(&params, 0.0, &crux),
            Err(GeometryError::Degenerate(_))
        ));
    }
}
