use crate::error::{AssemblyError, GeometryError, Result};
use crate::landmarks::{Landmark, LandmarkLocator, Surface};
use crate::mesh::{ElementData, ElementId, MeshStore, NodeId};
use crate::template::{BaseTemplates, TemplateId};

use super::atria::AtrialRings;
use super::crest::CrestNodes;
use super::outlets::OutletRings;

/// Fewest LV base nodes the element layout can address.
const MIN_ELEMENTS_AROUND_LV: usize = 6;

/// Atrial ring size the element layout joins without gaps: three LA free
/// wall edges against the LV free wall and four RA edges up to the crest.
pub const ELEMENTS_AROUND_ATRIA: usize = 7;

/// Elements created by [`AssembleBase`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssembledBase {
    /// Templates the elements were created with.
    pub templates: BaseTemplates,
    /// LV-side elements in creation order.
    pub lv: Vec<ElementId>,
    /// RV-side elements in creation order, following the LV side.
    pub rv: Vec<ElementId>,
}

impl AssembledBase {
    /// First element created.
    #[must_use]
    pub fn first(&self) -> Option<ElementId> {
        self.lv.first().or(self.rv.first()).copied()
    }

    /// Total number of elements created.
    #[must_use]
    pub fn len(&self) -> usize {
        self.lv.len() + self.rv.len()
    }

    /// Returns `true` if no elements were created.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Joins the ventricle rows, outlet rings, atrial rings and crest nodes
/// with the base elements.
///
/// Ten elements are made on the LV side, from the septal crux round the
/// outlet to the LV free wall, then twelve on the RV side, from the septum
/// round the right atrium to the RV outlet and the crest.
pub struct AssembleBase<'a> {
    outlets: &'a OutletRings,
    atria: &'a AtrialRings,
    crest: CrestNodes,
}

impl<'a> AssembleBase<'a> {
    /// Creates a new `AssembleBase` operation.
    #[must_use]
    pub fn new(outlets: &'a OutletRings, atria: &'a AtrialRings, crest: CrestNodes) -> Self {
        Self {
            outlets,
            atria,
            crest,
        }
    }

    /// Executes the operation, registering the base templates and creating
    /// every element under consecutive identifiers.
    ///
    /// # Errors
    ///
    /// Returns an error if the rings do not fit the element layout, a
    /// template declaration is invalid, a landmark is missing, or an
    /// element's node list does not fit its template. Nothing is added to
    /// the store when the ring sizes are rejected.
    pub fn execute(
        &self,
        store: &mut MeshStore,
        locator: &impl LandmarkLocator,
    ) -> Result<AssembledBase> {
        let around_lv = locator.elements_around_lv();
        if around_lv < MIN_ELEMENTS_AROUND_LV {
            return Err(GeometryError::Degenerate(format!(
                "{around_lv} elements around LV, need at least {MIN_ELEMENTS_AROUND_LV}"
            ))
            .into());
        }
        let around_atria = self.atria.la.inner.len();
        if around_atria != ELEMENTS_AROUND_ATRIA {
            return Err(AssemblyError::UnsupportedAtrialCount {
                count: around_atria,
                required: ELEMENTS_AROUND_ATRIA,
            }
            .into());
        }
        let templates = BaseTemplates::register(store.templates_mut())?;
        let lv_nodes = self.lv_node_lists(locator)?;
        let rv_nodes = self.rv_node_lists(locator)?;

        let lv = templates
            .lv
            .iter()
            .zip(lv_nodes)
            .map(|(&template, nodes)| add_element(store, template, nodes))
            .collect::<Result<Vec<_>>>()?;
        let rv = templates
            .rv
            .iter()
            .zip(rv_nodes)
            .map(|(&template, nodes)| add_element(store, template, nodes))
            .collect::<Result<Vec<_>>>()?;
        Ok(AssembledBase { templates, lv, rv })
    }

    fn lv_node_lists(&self, locator: &impl LandmarkLocator) -> Result<Vec<Vec<NodeId>>> {
        use Surface::{Inner, Outer};

        let l = locator.elements_around_lv();
        let lv = |s, k| locator.locate(Landmark::LvBase(s, k));
        let rv = |s, k| locator.locate(Landmark::RvBase(s, k));
        let (la, ra) = (&self.atria.la, &self.atria.ra);
        let n = la.inner.len();
        let lo = &self.outlets.lv;

        let mut lists = vec![
            vec![
                lv(Inner, 0)?,
                lv(Inner, 1)?,
                la.inner[n - 1],
                la.inner[0],
                rv(Inner, 0)?,
                lv(Outer, 1)?,
                ra.inner[1],
                la.outer[0],
            ],
            vec![
                lv(Inner, 1)?,
                lv(Inner, 2)?,
                la.inner[0],
                la.inner[1],
                lv(Outer, 1)?,
                lv(Outer, 2)?,
                la.outer[0],
                ra.inner[n - 1],
            ],
            vec![
                lv(Inner, 2)?,
                lo.inner[0],
                la.inner[1],
                lo.outer[0],
                lv(Outer, 2)?,
                ra.inner[n - 1],
            ],
            vec![
                lo.outer[0],
                lo.outer[1],
                lv(Outer, 2)?,
                lv(Outer, 3)?,
                ra.inner[n - 1],
                ra.inner[n - 2],
            ],
        ];
        for k in 0..3 {
            lists.push(vec![
                lv(Inner, k + 2)?,
                lv(Inner, k + 3)?,
                lo.inner[k],
                lo.inner[k + 1],
                lv(Outer, k + 2)?,
                lv(Outer, k + 3)?,
                lo.outer[k],
                lo.outer[k + 1],
            ]);
        }
        // free wall round to the septal junction
        for k in 0..3 {
            let (lv0, lv1) = (l - 3 + k, (l - 2 + k) % l);
            let (a0, a1) = (n - 4 + k, n - 3 + k);
            lists.push(vec![
                lv(Inner, lv0)?,
                lv(Inner, lv1)?,
                la.inner[a0],
                la.inner[a1],
                lv(Outer, lv0)?,
                lv(Outer, lv1)?,
                la.outer[a0],
                la.outer[a1],
            ]);
        }
        Ok(lists)
    }

    fn rv_node_lists(&self, locator: &impl LandmarkLocator) -> Result<Vec<Vec<NodeId>>> {
        use Surface::{Inner, Outer};

        let lv = |s, k| locator.locate(Landmark::LvBase(s, k));
        let rv = |s, k| locator.locate(Landmark::RvBase(s, k));
        let (la, ra) = (&self.atria.la, &self.atria.ra);
        let n = la.inner.len();
        let (lo, ro) = (&self.outlets.lv, &self.outlets.rv);
        let (c1, c2) = (self.crest.inner, self.crest.outer);

        let mut lists = vec![vec![
            lv(Inner, 0)?,
            rv(Inner, 0)?,
            la.inner[n - 1],
            ra.inner[1],
            lv(Outer, 0)?,
            rv(Outer, 0)?,
            la.outer[n - 1],
            ra.outer[1],
        ]];
        for k in 0..3 {
            lists.push(vec![
                rv(Inner, k)?,
                rv(Inner, k + 1)?,
                ra.inner[k + 1],
                ra.inner[k + 2],
                rv(Outer, k)?,
                rv(Outer, k + 1)?,
                ra.outer[k + 1],
                ra.outer[k + 2],
            ]);
        }
        lists.extend([
            vec![
                rv(Inner, 3)?,
                rv(Inner, 4)?,
                ra.inner[4],
                c1,
                rv(Outer, 3)?,
                rv(Outer, 4)?,
                ra.outer[4],
                c2,
            ],
            vec![
                rv(Inner, 4)?,
                rv(Inner, 5)?,
                c1,
                ro.inner[2],
                rv(Outer, 4)?,
                rv(Outer, 5)?,
                c2,
                ro.outer[2],
            ],
            vec![
                rv(Inner, 4)?,
                rv(Inner, 5)?,
                ro.inner[2],
                ro.inner[3],
                rv(Outer, 4)?,
                rv(Outer, 5)?,
                ro.outer[2],
                ro.outer[3],
            ],
            vec![
                rv(Inner, 5)?,
                rv(Inner, 6)?,
                ro.inner[3],
                ro.inner[4],
                rv(Outer, 5)?,
                rv(Outer, 6)?,
                ro.outer[3],
                ro.outer[4],
            ],
            vec![
                ra.inner[n - 3],
                lv(Outer, 4)?,
                ra.inner[n - 2],
                lv(Outer, 3)?,
                ra.outer[n - 3],
                lo.outer[2],
                lo.outer[1],
            ],
            vec![
                ra.inner[n - 3],
                c1,
                lv(Outer, 4)?,
                ra.outer[n - 3],
                c2,
                lo.outer[2],
            ],
            vec![
                c1,
                ro.inner[2],
                lv(Outer, 4)?,
                ro.inner[1],
                c2,
                ro.outer[2],
                lo.outer[2],
                ro.outer[1],
            ],
            vec![
                lv(Outer, 4)?,
                ro.inner[1],
                lv(Outer, 5)?,
                ro.inner[0],
                lo.outer[2],
                ro.outer[1],
                lo.outer[3],
                ro.outer[0],
            ],
        ]);
        Ok(lists)
    }
}

fn add_element(store: &mut MeshStore, template: TemplateId, nodes: Vec<NodeId>) -> Result<ElementId> {
    let (name, scale_factors) = {
        let t = store.templates().get(template)?;
        (t.name(), t.default_scale_factors())
    };
    tracing::debug!(
        element = %store.next_element_id(),
        template = name,
        nodes = ?nodes,
        "creating base element"
    );
    store.add_element(ElementData::new(template, nodes, scale_factors))
}
