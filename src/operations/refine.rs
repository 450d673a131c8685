use std::ops::Range;

use crate::error::Result;
use crate::mesh::ElementId;
use crate::options::ShapeParameters;

use super::assemble::AssembledBase;

/// Offset of the first hanging-side element from the start of the RV side.
const HANGING_OFFSET: u32 = 4;

/// Number of RV elements next to the hanging edges.
const HANGING_ELEMENTS: u32 = 4;

/// Subdivides single cube elements into a regular grid.
///
/// Implemented by the mesh refinement engine, which owns the refined mesh.
pub trait CubeRefiner {
    /// Refines `element` into `counts[0] x counts[1] x counts[2]` elements
    /// along xi1, xi2 and xi3.
    ///
    /// # Errors
    ///
    /// Returns an error if the element cannot be refined.
    fn refine_cube(&mut self, element: ElementId, counts: [usize; 3]) -> Result<()>;
}

/// Records refinement requests without performing them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RefinementPlan {
    cubes: Vec<(ElementId, [usize; 3])>,
}

impl RefinementPlan {
    /// Creates an empty plan.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Requested elements and counts, in request order.
    #[must_use]
    pub fn cubes(&self) -> &[(ElementId, [usize; 3])] {
        &self.cubes
    }

    /// Total number of elements the plan produces.
    #[must_use]
    pub fn refined_element_count(&self) -> usize {
        self.cubes.iter().map(|(_, c)| c.iter().product::<usize>()).sum()
    }
}

impl CubeRefiner for RefinementPlan {
    fn refine_cube(&mut self, element: ElementId, counts: [usize; 3]) -> Result<()> {
        self.cubes.push((element, counts));
        Ok(())
    }
}

/// Element identifier ranges of each refinement region.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RefinementLayout {
    lv: Range<ElementId>,
    rv: Range<ElementId>,
    outlet: Range<ElementId>,
    hanging: Range<ElementId>,
}

impl RefinementLayout {
    /// Lays out consecutive LV and RV regions from `first`, with an empty
    /// outlet region after them.
    #[must_use]
    pub fn new(first: ElementId, lv_elements: u32, rv_elements: u32) -> Self {
        let rv_start = first.offset(lv_elements);
        let rv_end = rv_start.offset(rv_elements);
        let hanging_start = rv_start.offset(HANGING_OFFSET);
        Self {
            lv: first..rv_start,
            rv: rv_start..rv_end,
            outlet: rv_end..rv_end,
            hanging: hanging_start..hanging_start.offset(HANGING_ELEMENTS),
        }
    }

    /// Derives the layout of an assembled base, or `None` if it is empty.
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub fn for_base(base: &AssembledBase) -> Option<Self> {
        base.first()
            .map(|first| Self::new(first, base.lv.len() as u32, base.rv.len() as u32))
    }

    /// Extends the layout with `count` outlet elements following the RV side.
    #[must_use]
    pub fn with_outlet_elements(mut self, count: u32) -> Self {
        self.outlet = self.rv.end..self.rv.end.offset(count);
        self
    }

    /// Last element of the final non-empty region.
    #[must_use]
    pub fn last(&self) -> Option<ElementId> {
        [&self.outlet, &self.rv, &self.lv]
            .into_iter()
            .find(|range| !range.is_empty())
            .map(|range| ElementId::new(range.end.get() - 1))
    }

    /// Refinement counts for `element`, or `None` outside every region.
    #[must_use]
    pub fn counts(&self, element: ElementId, params: &ShapeParameters) -> Option<[usize; 3]> {
        let surface = params.refine_elements_surface;
        if self.lv.contains(&element) {
            Some([surface, surface, params.refine_elements_through_lv_wall])
        } else if self.rv.contains(&element) {
            let around = if self.hanging.contains(&element) {
                surface / 2
            } else {
                surface
            };
            Some([around, surface, params.refine_elements_through_rv_wall])
        } else if self.outlet.contains(&element) {
            Some([surface, surface, 1])
        } else {
            None
        }
    }
}

/// Refines the base elements with region-specific counts.
///
/// Elements are taken from a caller-supplied iterator so that refinement of
/// other mesh parts can carry on from where this one stops.
pub struct RefineBase<'a> {
    params: &'a ShapeParameters,
    layout: RefinementLayout,
}

impl<'a> RefineBase<'a> {
    /// Creates a new `RefineBase` operation.
    #[must_use]
    pub fn new(params: &'a ShapeParameters, layout: RefinementLayout) -> Self {
        Self { params, layout }
    }

    /// Executes the operation, returning the number of elements refined.
    ///
    /// Consumes `elements` up to and including the last element of the
    /// final non-empty region, leaving the rest for the caller. Elements
    /// outside every region are skipped.
    ///
    /// # Errors
    ///
    /// Returns an error if the refiner fails.
    pub fn execute(
        &self,
        elements: &mut impl Iterator<Item = ElementId>,
        refiner: &mut impl CubeRefiner,
    ) -> Result<usize> {
        let Some(last) = self.layout.last() else {
            return Ok(0);
        };
        let mut refined = 0;
        for element in elements.by_ref() {
            if let Some(counts) = self.layout.counts(element, self.params) {
                refiner.refine_cube(element, counts)?;
                refined += 1;
            } else {
                tracing::warn!(%element, "element outside base regions, not refined");
            }
            if element == last {
                break;
            }
        }
        Ok(refined)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::options::MeshOptions;

    fn ids(range: Range<u32>) -> Vec<ElementId> {
        range.map(ElementId::new).collect()
    }

    #[test]
    fn counts_follow_regions() {
        let params = MeshOptions {
            refine_elements_surface: 4,
            refine_elements_through_lv_wall: 2,
            refine_elements_through_rv_wall: 3,
            ..MeshOptions::default()
        }
        .resolve();
        let layout = RefinementLayout::new(ElementId::new(10), 10, 12).with_outlet_elements(6);
        let counts = |id| layout.counts(ElementId::new(id), &params);
        assert_eq!(counts(9), None);
        assert_eq!(counts(10), Some([4, 4, 2]));
        assert_eq!(counts(19), Some([4, 4, 2]));
        assert_eq!(counts(20), Some([4, 4, 3]));
        assert_eq!(counts(24), Some([2, 4, 3]));
        assert_eq!(counts(27), Some([2, 4, 3]));
        assert_eq!(counts(28), Some([4, 4, 3]));
        assert_eq!(counts(32), Some([4, 4, 1]));
        assert_eq!(counts(37), Some([4, 4, 1]));
        assert_eq!(counts(38), None);
    }

    #[test]
    fn stops_after_last_rv_element_without_outlets() {
        let params = MeshOptions::default().resolve();
        let layout = RefinementLayout::new(ElementId::new(1), 10, 12);
        let mut elements = ids(1..40).into_iter();
        let mut plan = RefinementPlan::new();
        let refined = RefineBase::new(&params, layout)
            .execute(&mut elements, &mut plan)
            .unwrap();
        assert_eq!(refined, 22);
        assert_eq!(plan.cubes().last().unwrap().0, ElementId::new(22));
        assert_eq!(elements.next(), Some(ElementId::new(23)));
    }

    #[test]
    fn continues_through_outlet_region() {
        let params = MeshOptions::default().resolve();
        let layout = RefinementLayout::new(ElementId::new(1), 10, 12).with_outlet_elements(2);
        let mut elements = ids(1..40).into_iter();
        let mut plan = RefinementPlan::new();
        let refined = RefineBase::new(&params, layout)
            .execute(&mut elements, &mut plan)
            .unwrap();
        assert_eq!(refined, 24);
        assert_eq!(plan.cubes()[23], (ElementId::new(24), [4, 4, 1]));
        assert_eq!(elements.next(), Some(ElementId::new(25)));
    }

    #[test]
    fn hanging_window_halves_first_direction() {
        let params = MeshOptions::default().resolve();
        let layout = RefinementLayout::new(ElementId::new(1), 10, 12);
        let mut plan = RefinementPlan::new();
        RefineBase::new(&params, layout)
            .execute(&mut ids(1..23).into_iter(), &mut plan)
            .unwrap();
        let halved: Vec<u32> = plan
            .cubes()
            .iter()
            .filter(|(_, c)| c[0] == 2)
            .map(|(id, _)| id.get())
            .collect();
        assert_eq!(halved, vec![15, 16, 17, 18]);
        assert_eq!(plan.refined_element_count(), 18 * 16 + 4 * 8);
    }

    #[test]
    fn empty_layout_refines_nothing() {
        let params = MeshOptions::default().resolve();
        let layout = RefinementLayout::new(ElementId::new(1), 0, 0);
        let mut elements = ids(1..5).into_iter();
        let mut plan = RefinementPlan::new();
        let refined = RefineBase::new(&params, layout)
            .execute(&mut elements, &mut plan)
            .unwrap();
        assert_eq!(refined, 0);
        assert_eq!(elements.next(), Some(ElementId::new(1)));
    }
}
