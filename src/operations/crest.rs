use crate::error::Result;
use crate::geometry::{Curve, HermiteSegment};
use crate::landmarks::{Landmark, LandmarkLocator};
use crate::math::{unit_or_warn, with_magnitude};
use crate::mesh::{MeshStore, NodeData, NodeId};
use crate::options::ShapeParameters;

use super::outlets::OutletRings;

/// Root d2 length relative to the base depth.
const ROOT_D2_SCALE: f64 = 4.0;

/// Scale of the outlet's transverse derivative used as the crest's end slope.
const OUTLET_D2_SCALE: f64 = -2.0;

/// Nodes on the supraventricular crest.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CrestNodes {
    /// Node on the inner surface.
    pub inner: NodeId,
    /// Node on the outer surface.
    pub outer: NodeId,
}

/// Builds the pair of nodes on the supraventricular crest.
///
/// The outer node lies halfway along a cubic Hermite curve rising from the
/// crest root on the RV outer row to the third LV outlet outer node. The
/// inner node sits one base thickness below it along the surface normal,
/// with d2 shrunk by the curve's curvature.
pub struct BuildCrest<'a> {
    params: &'a ShapeParameters,
}

impl<'a> BuildCrest<'a> {
    /// Creates a new `BuildCrest` operation.
    #[must_use]
    pub fn new(params: &'a ShapeParameters) -> Self {
        Self { params }
    }

    /// Executes the operation, adding the inner node then the outer node.
    ///
    /// A degenerate surface normal is logged and construction proceeds.
    ///
    /// # Errors
    ///
    /// Returns an error if the crest root cannot be located or the outlet
    /// node lacks a transverse derivative.
    pub fn execute(
        &self,
        store: &mut MeshStore,
        locator: &impl LandmarkLocator,
        outlets: &OutletRings,
    ) -> Result<CrestNodes> {
        let thickness = self.params.base_thickness;
        let root = store.node(locator.locate(Landmark::CrestRoot)?)?;
        let (xa, d1a) = (root.x, root.d1);
        let d2a = with_magnitude(&root.d2, ROOT_D2_SCALE * self.params.base_depth());
        let outlet_id = outlets.lv.outer[2];
        let outlet = store.node(outlet_id)?;
        let (xb, d1b) = (outlet.x, outlet.d1);
        let d2b = outlet.transverse(outlet_id)? * OUTLET_D2_SCALE;

        let rise = HermiteSegment::new(xa, d2a, xb, d2b);
        let x = rise.evaluate(0.5);
        let d1 = (d1a + d1b) * 0.5;
        let d2 = rise.derivative(0.5) * 0.5;
        let radial = unit_or_warn(&d1.cross(&d2), "crest normal");
        let d3 = radial * thickness;
        let curvature = HermiteSegment::new(xa, d2a, x, d2).curvature(1.0, &radial);
        let inner_d2 = d2 * (1.0 - thickness * curvature);

        let inner = store.add_node(NodeData::new(x - d3, d1, inner_d2, d3));
        let outer = store.add_node(NodeData::new(x, d1, d2, d3));
        tracing::debug!(%inner, %outer, curvature, "built crest nodes");
        Ok(CrestNodes { inner, outer })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::landmarks::SyntheticVentricles;
    use crate::operations::{BuildAtria, BuildOutlets};
    use crate::options::MeshOptions;
    use approx::assert_relative_eq;

    fn build() -> (MeshStore, ShapeParameters, OutletRings, CrestNodes) {
        let params = MeshOptions::default().resolve();
        let mut store = MeshStore::new();
        let ventricles = SyntheticVentricles::build(&mut store, &params);
        let outlets = BuildOutlets::new(&params)
            .execute(&mut store, &ventricles)
            .unwrap();
        BuildAtria::new(&params).execute(&mut store, &outlets).unwrap();
        let crest = BuildCrest::new(&params)
            .execute(&mut store, &ventricles, &outlets)
            .unwrap();
        (store, params, outlets, crest)
    }

    #[test]
    fn creates_inner_then_outer() {
        let (store, _, _, crest) = build();
        assert_eq!(crest.inner.get(), 83);
        assert_eq!(crest.outer, crest.inner.next());
        assert_eq!(store.node_count(), 84);
    }

    #[test]
    fn inner_node_is_one_thickness_below() {
        let (store, params, _, crest) = build();
        let inner = store.node(crest.inner).unwrap();
        let outer = store.node(crest.outer).unwrap();
        let d3 = outer.d3.unwrap();
        assert_relative_eq!(d3.norm(), params.base_thickness, epsilon = 1e-12);
        assert_relative_eq!((outer.x - inner.x - d3).norm(), 0.0, epsilon = 1e-14);
        assert_relative_eq!(d3.dot(&outer.d1), 0.0, epsilon = 1e-12);
        assert_relative_eq!(d3.dot(&outer.d2), 0.0, epsilon = 1e-12);
    }

    #[test]
    fn inner_d2_is_outer_d2_scaled() {
        let (store, _, _, crest) = build();
        let inner = store.node(crest.inner).unwrap().d2;
        let outer = store.node(crest.outer).unwrap().d2;
        let scale = inner.norm() / outer.norm();
        assert!(scale > 0.0);
        assert_relative_eq!((inner - outer * scale).norm(), 0.0, epsilon = 1e-12);
    }

    #[test]
    fn outer_node_is_midpoint_of_rise() {
        let (store, params, outlets, crest) = build();
        let root = store.node(NodeId::new(34)).unwrap();
        let outlet = store.node(outlets.lv.outer[2]).unwrap();
        let rise = HermiteSegment::new(
            root.x,
            with_magnitude(&root.d2, 4.0 * params.base_depth()),
            outlet.x,
            outlet.d3.unwrap() * -2.0,
        );
        let outer = store.node(crest.outer).unwrap();
        assert_relative_eq!((outer.x - rise.evaluate(0.5)).norm(), 0.0, epsilon = 1e-14);
    }
}
