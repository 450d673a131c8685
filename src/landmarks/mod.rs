//! Semantic access to the ventricle nodes the base is built on.
//!
//! The base attaches to the top node rows of the LV and RV walls created by
//! an upstream ventricle generator. Builders ask for those nodes by role
//! through a [`LandmarkLocator`] instead of computing node offsets.

mod synthetic;

pub use synthetic::SyntheticVentricles;

use crate::error::TopologyError;
use crate::mesh::NodeId;

/// Wall surface of a ventricle node row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Surface {
    /// Endocardial surface.
    Inner,
    /// Epicardial surface.
    Outer,
}

/// Semantic role of an upstream ventricle node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Landmark {
    /// Node `index` around the top LV row on `surface`, counted from the
    /// septal junction.
    LvBase(Surface, usize),
    /// Node `index` around the top RV row on `surface`, counted from the
    /// septal junction.
    RvBase(Surface, usize),
    /// Outer LV node where the septum meets the outlets.
    SeptalOutletLv,
    /// Inner RV node opposite [`Landmark::SeptalOutletLv`].
    SeptalOutletRv,
    /// First inner LV node, at the posterior septal junction.
    JunctionLv,
    /// First inner RV node, at the posterior septal junction.
    JunctionRv,
    /// Outer RV free wall node the supraventricular crest rises from.
    CrestRoot,
}

impl Landmark {
    /// RV base row index of the crest root.
    pub const CREST_ROOT_INDEX: usize = 4;

    /// Reduces a named role to its base row position.
    ///
    /// Outlet landmarks sit at the last septal index, one short of the
    /// septal element count.
    #[must_use]
    pub fn to_row(self, elements_around_septum: usize) -> Self {
        let septal = elements_around_septum.saturating_sub(1);
        match self {
            Self::SeptalOutletLv => Self::LvBase(Surface::Outer, septal),
            Self::SeptalOutletRv => Self::RvBase(Surface::Inner, septal),
            Self::JunctionLv => Self::LvBase(Surface::Inner, 0),
            Self::JunctionRv => Self::RvBase(Surface::Inner, 0),
            Self::CrestRoot => Self::RvBase(Surface::Outer, Self::CREST_ROOT_INDEX),
            row => row,
        }
    }
}

/// Resolves landmark roles to node identifiers in the mesh store.
pub trait LandmarkLocator {
    /// Returns the node playing `landmark`.
    ///
    /// # Errors
    ///
    /// Returns an error if no node plays the role.
    fn locate(&self, landmark: Landmark) -> Result<NodeId, TopologyError>;

    /// Number of elements around the LV top row.
    fn elements_around_lv(&self) -> usize;
}

/// Top node rows of the two ventricles.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BaseRows {
    /// LV inner row, one node per element around the LV.
    pub lv_inner: Vec<NodeId>,
    /// LV outer row.
    pub lv_outer: Vec<NodeId>,
    /// RV inner row, from the posterior to the anterior septal junction.
    pub rv_inner: Vec<NodeId>,
    /// RV outer row.
    pub rv_outer: Vec<NodeId>,
    /// Elements around the septum, locating the outlet landmarks.
    pub elements_around_septum: usize,
}

impl LandmarkLocator for BaseRows {
    fn locate(&self, landmark: Landmark) -> Result<NodeId, TopologyError> {
        let (row, index) = match landmark.to_row(self.elements_around_septum) {
            Landmark::LvBase(Surface::Inner, i) => (&self.lv_inner, i),
            Landmark::LvBase(Surface::Outer, i) => (&self.lv_outer, i),
            Landmark::RvBase(Surface::Inner, i) => (&self.rv_inner, i),
            Landmark::RvBase(Surface::Outer, i) => (&self.rv_outer, i),
            _ => return Err(TopologyError::LandmarkNotFound(landmark)),
        };
        row.get(index)
            .copied()
            .ok_or(TopologyError::LandmarkNotFound(landmark))
    }

    fn elements_around_lv(&self) -> usize {
        self.lv_inner.len()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn rows() -> BaseRows {
        let ids = |start: u32, count: u32| (start..start + count).map(NodeId::new).collect();
        BaseRows {
            lv_inner: ids(1, 11),
            lv_outer: ids(12, 11),
            rv_inner: ids(23, 7),
            rv_outer: ids(30, 7),
            elements_around_septum: 6,
        }
    }

    #[test]
    fn named_roles_map_to_rows() {
        let rows = rows();
        assert_eq!(rows.locate(Landmark::JunctionLv).unwrap().get(), 1);
        assert_eq!(rows.locate(Landmark::JunctionRv).unwrap().get(), 23);
        assert_eq!(rows.locate(Landmark::SeptalOutletLv).unwrap().get(), 17);
        assert_eq!(rows.locate(Landmark::SeptalOutletRv).unwrap().get(), 28);
        assert_eq!(rows.locate(Landmark::CrestRoot).unwrap().get(), 34);
        assert_eq!(rows.elements_around_lv(), 11);
    }

    #[test]
    fn index_past_row_end_is_not_found() {
        let rows = rows();
        let missing = Landmark::RvBase(Surface::Outer, 7);
        assert!(matches!(
            rows.locate(missing),
            Err(TopologyError::LandmarkNotFound(l)) if l == missing
        ));
    }
}
