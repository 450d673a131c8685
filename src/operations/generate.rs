use crate::error::Result;
use crate::landmarks::LandmarkLocator;
use crate::mesh::{MeshStore, NodeId};
use crate::options::ShapeParameters;

use super::assemble::{AssembleBase, AssembledBase};
use super::atria::{AtrialRings, BuildAtria};
use super::crest::{BuildCrest, CrestNodes};
use super::outlets::{BuildOutlets, OutletRings};
use super::refine::{RefineBase, RefinementLayout, RefinementPlan};

/// Everything [`GenerateBase`] added to the store.
#[derive(Debug, Clone)]
pub struct BaseMesh {
    /// First node identifier used.
    pub first_node: NodeId,
    /// Outlet rings and crux nodes.
    pub outlets: OutletRings,
    /// Atrial rings and their layout.
    pub atria: AtrialRings,
    /// Supraventricular crest nodes.
    pub crest: CrestNodes,
    /// Base elements.
    pub elements: AssembledBase,
    /// Refinement requested for the base elements, when enabled.
    pub refinement: Option<RefinementPlan>,
}

/// Builds the complete heart base onto existing ventricle rows.
///
/// Runs the outlet, atrium and crest builders, assembles the elements and,
/// when the parameters ask for it, plans their refinement.
pub struct GenerateBase<'a> {
    params: &'a ShapeParameters,
}

impl<'a> GenerateBase<'a> {
    /// Creates a new `GenerateBase` operation.
    #[must_use]
    pub fn new(params: &'a ShapeParameters) -> Self {
        Self { params }
    }

    /// Executes the operation.
    ///
    /// A failure leaves the store partially built.
    ///
    /// # Errors
    ///
    /// Returns an error if any construction step fails.
    pub fn execute(
        &self,
        store: &mut MeshStore,
        locator: &impl LandmarkLocator,
    ) -> Result<BaseMesh> {
        let first_node = store.next_node_id();
        let outlets = BuildOutlets::new(self.params).execute(store, locator)?;
        let atria = BuildAtria::new(self.params).execute(store, &outlets)?;
        let crest = BuildCrest::new(self.params).execute(store, locator, &outlets)?;
        let elements = AssembleBase::new(&outlets, &atria, crest).execute(store, locator)?;

        let refinement = match RefinementLayout::for_base(&elements) {
            Some(layout) if self.params.refine => {
                let mut plan = RefinementPlan::new();
                let mut ids = store
                    .elements()
                    .map(|(id, _)| id)
                    .skip_while(|&id| Some(id) != elements.first());
                RefineBase::new(self.params, layout).execute(&mut ids, &mut plan)?;
                Some(plan)
            }
            _ => None,
        };

        tracing::info!(
            first_node = %first_node,
            nodes = store.next_node_id().get() - first_node.get(),
            elements = elements.len(),
            crux_left_iterations = atria.layout.crux_left.iterations,
            refined = refinement.as_ref().map(RefinementPlan::refined_element_count),
            "generated heart base"
        );
        Ok(BaseMesh {
            first_node,
            outlets,
            atria,
            crest,
            elements,
            refinement,
        })
    }
}
