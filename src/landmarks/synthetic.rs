use std::f64::consts::{PI, TAU};

use crate::error::TopologyError;
use crate::math::{Point3, Vector3};
use crate::mesh::{MeshStore, NodeData, NodeId};
use crate::options::ShapeParameters;

use super::{BaseRows, Landmark, LandmarkLocator};

/// Angular steps between the septal junction and the -x axis.
const JUNCTION_OFFSET: f64 = 3.0;

/// Vertical derivative of every top row node.
const ROW_D2_HEIGHT: f64 = 0.3;

/// Analytic top rows of a pair of ventricles.
///
/// Stands in for the upstream ventricle generator. The LV rows are circles
/// about the z axis in the `z = 0` plane, the RV rows arcs about a centre
/// shifted along -x by half the septal base displacement, hugging the LV
/// on its -x side. Nodes are stepped evenly by the LV angular spacing,
/// starting three steps before the -x axis.
#[derive(Debug, Clone)]
pub struct SyntheticVentricles {
    rows: BaseRows,
}

impl SyntheticVentricles {
    /// Adds the four top rows to `store`: LV inner, LV outer, RV inner then
    /// RV outer.
    pub fn build(store: &mut MeshStore, params: &ShapeParameters) -> Self {
        let around_lv = params.elements_around_lv();
        let around_rv = params.elements_around_septum + 1;
        #[allow(clippy::cast_precision_loss)]
        let step = TAU / around_lv as f64;

        let lv_outer = params.lv_outer_radius;
        let lv_inner = lv_outer - params.lv_free_wall_thickness;
        let rv_inner = lv_outer + params.lv_free_wall_thickness;
        let rv_outer = rv_inner + params.rv_free_wall_thickness;
        let lv_centre = Point3::origin();
        let rv_centre = Point3::new(-0.5 * params.septum_base_radial_displacement, 0.0, 0.0);

        let mut row = |centre: Point3, radius: f64, wall: f64, count: usize| -> Vec<NodeId> {
            (0..count)
                .map(|k| {
                    #[allow(clippy::cast_precision_loss)]
                    let angle = PI + (k as f64 - JUNCTION_OFFSET) * step;
                    let (sin, cos) = angle.sin_cos();
                    let radial = Vector3::new(cos, sin, 0.0);
                    let tangent = Vector3::new(-sin, cos, 0.0);
                    store.add_node(NodeData::new(
                        centre + radial * radius,
                        tangent * (step * radius),
                        Vector3::new(0.0, 0.0, ROW_D2_HEIGHT),
                        radial * wall,
                    ))
                })
                .collect()
        };
        let rows = BaseRows {
            lv_inner: row(lv_centre, lv_inner, params.lv_free_wall_thickness, around_lv),
            lv_outer: row(lv_centre, lv_outer, params.lv_free_wall_thickness, around_lv),
            rv_inner: row(rv_centre, rv_inner, params.rv_free_wall_thickness, around_rv),
            rv_outer: row(rv_centre, rv_outer, params.rv_free_wall_thickness, around_rv),
            elements_around_septum: params.elements_around_septum,
        };
        Self { rows }
    }

    /// Returns the top rows.
    #[must_use]
    pub fn rows(&self) -> &BaseRows {
        &self.rows
    }
}

impl LandmarkLocator for SyntheticVentricles {
    fn locate(&self, landmark: Landmark) -> Result<NodeId, TopologyError> {
        self.rows.locate(landmark)
    }

    fn elements_around_lv(&self) -> usize {
        self.rows.elements_around_lv()
    }
}
