use std::f64::consts::{FRAC_PI_4, TAU};

use crate::error::Result;
use crate::landmarks::{Landmark, LandmarkLocator};
use crate::math::{unit_or_warn, with_magnitude, Point3, Vector3};
use crate::mesh::{MeshStore, NodeData, NodeId};
use crate::options::ShapeParameters;

use super::{landmark_position, RingPair};

/// Nodes around each outlet ring.
pub const ELEMENTS_AROUND_OUTLET: usize = 6;

/// Transverse derivative scale of outer outlet nodes away from the gap.
const DEFAULT_TRANSVERSE_SCALE: f64 = 0.5;

/// Angle splitting the outlet spacing into horizontal and vertical parts.
const SPACING_ANGLE: f64 = FRAC_PI_4;

/// Junction nodes where the septa and the outlets meet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Crux {
    /// Shared by both atria and the LV outlet.
    pub centre: NodeId,
    /// Towards the right atrium.
    pub right: NodeId,
    /// Towards the left atrium.
    pub left: NodeId,
}

/// Nodes created by [`BuildOutlets`].
#[derive(Debug, Clone, PartialEq)]
pub struct OutletRings {
    /// LV outlet rings. The inner ring has no transverse derivatives.
    pub lv: RingPair,
    /// RV outlet rings. The inner ring has no transverse derivatives.
    pub rv: RingPair,
    /// Junction nodes on the LV outlet outer ring.
    pub crux: Crux,
    /// Unit in-plane reference axis, pointing from the septum to the crux.
    pub axis: Vector3,
    /// Angle of the reference axis about +z.
    pub base_rotation: f64,
}

/// Builds the inner and outer node rings of the LV and RV outlets.
///
/// Both outlets sit on a reference axis derived from the septal landmarks.
/// The LV outlet touches the crux; the RV outlet lies behind it along the
/// axis, raised by the vertical part of the outlet spacing.
pub struct BuildOutlets<'a> {
    params: &'a ShapeParameters,
}

/// Placement of one outlet.
struct OutletFrame {
    centre: Point3,
    inner_radius: f64,
    outer_radius: f64,
    /// Sign of the incline's z component on the second axis.
    incline_sign: f64,
    /// Ring index facing the other outlet.
    facing: usize,
    /// Ring indexes whose transverse derivative tilts the other way.
    flipped: [usize; 2],
}

impl<'a> BuildOutlets<'a> {
    /// Creates a new `BuildOutlets` operation.
    #[must_use]
    pub fn new(params: &'a ShapeParameters) -> Self {
        Self { params }
    }

    /// Executes the operation, adding 24 nodes to the store: LV inner, LV
    /// outer, RV inner and RV outer rings in that order.
    ///
    /// A degenerate reference axis is logged and construction proceeds.
    ///
    /// # Errors
    ///
    /// Returns an error if a landmark cannot be located.
    pub fn execute(
        &self,
        store: &mut MeshStore,
        locator: &impl LandmarkLocator,
    ) -> Result<OutletRings> {
        let p = self.params;
        let septal_lv = landmark_position(store, locator, Landmark::SeptalOutletLv)?;
        let septal_rv = landmark_position(store, locator, Landmark::SeptalOutletRv)?;
        let junction_lv = landmark_position(store, locator, Landmark::JunctionLv)?;
        let junction_rv = landmark_position(store, locator, Landmark::JunctionRv)?;

        let mid = Point3::from((septal_lv.coords + septal_rv.coords) * 0.5);
        let lateral = Point3::new(
            0.5 * (junction_lv.x + junction_rv.x),
            0.5 * (junction_lv.y + junction_rv.y),
            junction_lv.z,
        );
        let axis = unit_or_warn(&(lateral - mid), "outlet reference axis");
        let base_rotation = axis.y.atan2(axis.x);

        let spacing_h = p.outlet_spacing * SPACING_ANGLE.cos();
        let spacing_v = p.outlet_spacing * SPACING_ANGLE.sin();
        let (sin_incline, cos_incline) = p.outlet_incline.sin_cos();
        let crux_offset = p.rv_outlet_outer_radius + spacing_h + 2.0 * p.lv_outlet_outer_radius;
        let crux = mid + axis * crux_offset;

        let lv_centre = Point3::new(
            crux.x - axis.x * p.lv_outlet_outer_radius,
            crux.y - axis.y * p.lv_outlet_outer_radius,
            p.base_depth() + sin_incline * p.lv_outlet_outer_radius,
        );
        let lv = self.add_rings(
            store,
            &axis,
            &OutletFrame {
                centre: lv_centre,
                inner_radius: p.lv_outlet_inner_radius,
                outer_radius: p.lv_outlet_outer_radius,
                incline_sign: -1.0,
                facing: 3,
                flipped: [2, 4],
            },
        );

        let mut rv_centre =
            lv_centre - axis * (p.lv_outlet_outer_radius + spacing_h + p.rv_outlet_outer_radius);
        let across = unit_or_warn(&Vector3::new(-axis.y, axis.x, 0.0), "outlet cross axis");
        rv_centre.x -= spacing_v * sin_incline * across.x;
        rv_centre.y -= spacing_v * sin_incline * across.y;
        rv_centre.z += spacing_v * cos_incline;
        let rv = self.add_rings(
            store,
            &axis,
            &OutletFrame {
                centre: rv_centre,
                inner_radius: p.rv_outlet_inner_radius,
                outer_radius: p.rv_outlet_outer_radius,
                incline_sign: 1.0,
                facing: 0,
                flipped: [1, 5],
            },
        );

        // wall across the gap between the outlets
        let (lv_gap, rv_gap) = (lv.outer[3], rv.outer[0]);
        let gap = store.node(rv_gap)?.x - store.node(lv_gap)?.x;
        store.node_mut(lv_gap)?.d3 = Some(gap);
        store.node_mut(rv_gap)?.d3 = Some(-gap);

        let crux = Crux {
            centre: lv.outer[0],
            right: lv.outer[1],
            left: lv.outer[ELEMENTS_AROUND_OUTLET - 1],
        };
        tracing::debug!(?lv_centre, ?rv_centre, base_rotation, "built outlet rings");
        Ok(OutletRings {
            lv,
            rv,
            crux,
            axis,
            base_rotation,
        })
    }

    fn add_rings(&self, store: &mut MeshStore, axis: &Vector3, frame: &OutletFrame) -> RingPair {
        let p = self.params;
        #[allow(clippy::cast_precision_loss)]
        let step = TAU / ELEMENTS_AROUND_OUTLET as f64;
        let (sin_incline, cos_incline) = p.outlet_incline.sin_cos();
        let mut rings = RingPair::default();
        for (radius, outer) in [(frame.inner_radius, false), (frame.outer_radius, true)] {
            let a1 = axis * radius;
            let a2 = Vector3::new(
                -a1.y * cos_incline,
                a1.x * cos_incline,
                frame.incline_sign * radius * sin_incline,
            );
            let d2 = with_magnitude(&a1.cross(&a2), p.outlet_element_length);
            for n in 0..ELEMENTS_AROUND_OUTLET {
                #[allow(clippy::cast_precision_loss)]
                let (sin, cos) = (n as f64 * step).sin_cos();
                let radial = a1 * cos + a2 * sin;
                let x = frame.centre + radial;
                let d1 = (a2 * cos - a1 * sin) * step;
                if !outer {
                    rings.inner.push(store.add_node(NodeData::linear_through_wall(x, d1, d2)));
                    continue;
                }
                let scale = if n == frame.facing {
                    p.outlet_spacing / radius
                } else {
                    DEFAULT_TRANSVERSE_SCALE
                };
                let mut d3 = radial * scale;
                if frame.flipped.contains(&n) {
                    d3.z = -d3.z;
                    d3 = with_magnitude(&d3, step * p.rv_outlet_outer_radius);
                }
                rings.outer.push(store.add_node(NodeData::new(x, d1, d2, d3)));
            }
        }
        rings
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::landmarks::SyntheticVentricles;
    use crate::options::MeshOptions;
    use approx::assert_relative_eq;

    fn build() -> (MeshStore, ShapeParameters, OutletRings) {
        let params = MeshOptions::default().resolve();
        let mut store = MeshStore::new();
        let ventricles = SyntheticVentricles::build(&mut store, &params);
        let rings = BuildOutlets::new(&params)
            .execute(&mut store, &ventricles)
            .unwrap();
        (store, params, rings)
    }

    #[test]
    fn creates_four_contiguous_rings() {
        let (store, _, rings) = build();
        let ids: Vec<u32> = [&rings.lv.inner, &rings.lv.outer, &rings.rv.inner, &rings.rv.outer]
            .into_iter()
            .flatten()
            .map(|id| id.get())
            .collect();
        assert_eq!(ids, (37..61).collect::<Vec<_>>());
        assert_eq!(store.node_count(), 60);
    }

    #[test]
    fn inner_rings_are_linear_through_wall() {
        let (store, _, rings) = build();
        for &id in rings.lv.inner.iter().chain(&rings.rv.inner) {
            assert!(store.node(id).unwrap().d3.is_none());
        }
        for &id in rings.lv.outer.iter().chain(&rings.rv.outer) {
            assert!(store.node(id).unwrap().d3.is_some());
        }
    }

    #[test]
    fn rings_are_circles_of_their_radius() {
        let (store, params, rings) = build();
        let centre = |ids: &[NodeId]| {
            let a = store.node(ids[0]).unwrap().x;
            let b = store.node(ids[3]).unwrap().x;
            Point3::from((a.coords + b.coords) * 0.5)
        };
        let c = centre(&rings.lv.outer);
        for &id in &rings.lv.outer {
            let r = (store.node(id).unwrap().x - c).norm();
            assert_relative_eq!(r, params.lv_outlet_outer_radius, epsilon = 1e-12);
        }
        let c = centre(&rings.rv.inner);
        for &id in &rings.rv.inner {
            let r = (store.node(id).unwrap().x - c).norm();
            assert_relative_eq!(r, params.rv_outlet_inner_radius, epsilon = 1e-12);
        }
    }

    #[test]
    fn crux_nodes_on_lv_outer_ring() {
        let (store, params, rings) = build();
        assert_eq!(rings.crux.centre, rings.lv.outer[0]);
        assert_eq!(rings.crux.right, rings.lv.outer[1]);
        assert_eq!(rings.crux.left, rings.lv.outer[5]);
        let centre = store.node(rings.crux.centre).unwrap();
        let lift = params.base_depth() + params.outlet_incline.sin() * params.lv_outlet_outer_radius;
        assert_relative_eq!(centre.x.z, lift, epsilon = 1e-12);
        assert_relative_eq!(rings.axis.norm(), 1.0, epsilon = 1e-12);
    }

    #[test]
    fn gap_derivatives_join_outlets() {
        let (store, _, rings) = build();
        let lv = store.node(rings.lv.outer[3]).unwrap();
        let rv = store.node(rings.rv.outer[0]).unwrap();
        let gap = rv.x - lv.x;
        assert_relative_eq!((lv.d3.unwrap() - gap).norm(), 0.0, epsilon = 1e-14);
        assert_relative_eq!((rv.d3.unwrap() + gap).norm(), 0.0, epsilon = 1e-14);
    }

    #[test]
    fn flipped_transverse_derivatives_are_rescaled() {
        let (store, params, rings) = build();
        let step = TAU / 6.0;
        for id in [rings.lv.outer[2], rings.lv.outer[4], rings.rv.outer[1], rings.rv.outer[5]] {
            let d3 = store.node(id).unwrap().d3.unwrap();
            assert_relative_eq!(d3.norm(), step * params.rv_outlet_outer_radius, epsilon = 1e-12);
        }
    }

    #[test]
    fn deterministic() {
        let (a, _, ra) = build();
        let (b, _, rb) = build();
        assert_eq!(ra, rb);
        for ((ia, na), (ib, nb)) in a.nodes().zip(b.nodes()) {
            assert_eq!(ia, ib);
            assert_eq!(na, nb);
        }
    }
}
