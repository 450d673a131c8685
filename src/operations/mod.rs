//! Construction steps of the heart base, in dependency order.

mod assemble;
mod atria;
mod crest;
mod generate;
mod outlets;
mod refine;

pub use assemble::{AssembleBase, AssembledBase, ELEMENTS_AROUND_ATRIA};
pub use atria::{AtrialLayout, AtrialRings, AtrialSamples, BuildAtria, CruxPositions, EdgeLengths};
pub use crest::{BuildCrest, CrestNodes};
pub use generate::{BaseMesh, GenerateBase};
pub use outlets::{BuildOutlets, Crux, OutletRings, ELEMENTS_AROUND_OUTLET};
pub use refine::{CubeRefiner, RefineBase, RefinementLayout, RefinementPlan};

use crate::error::Result;
use crate::landmarks::{Landmark, LandmarkLocator};
use crate::math::Point3;
use crate::mesh::{MeshStore, NodeId};

/// Inner and outer node rings through a wall.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RingPair {
    /// Nodes on the inner surface.
    pub inner: Vec<NodeId>,
    /// Nodes on the outer surface, index-matched to `inner`.
    pub outer: Vec<NodeId>,
}

/// Position of the node playing `landmark`.
fn landmark_position(
    store: &MeshStore,
    locator: &impl LandmarkLocator,
    landmark: Landmark,
) -> Result<Point3> {
    Ok(store.node(locator.locate(landmark)?)?.x)
}
