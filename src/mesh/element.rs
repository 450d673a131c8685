use std::fmt;

use crate::template::TemplateId;

use super::NodeId;

/// Identifier of an element in the mesh store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ElementId(u32);

impl ElementId {
    /// Wraps a raw identifier.
    #[must_use]
    pub const fn new(raw: u32) -> Self {
        Self(raw)
    }

    /// Returns the raw identifier.
    #[must_use]
    pub const fn get(self) -> u32 {
        self.0
    }

    /// Returns the identifier `offset` places after this one.
    #[must_use]
    pub const fn offset(self, offset: u32) -> Self {
        Self(self.0 + offset)
    }
}

impl fmt::Display for ElementId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Data associated with a mesh element.
///
/// `nodes` lists one identifier per local node of the template, after any
/// corner collapsing. `scale_factors` has one entry per scale factor the
/// template declares.
#[derive(Debug, Clone, PartialEq)]
pub struct ElementData {
    /// Interpolation template of the element.
    pub template: TemplateId,
    /// Node identifiers, one per local node.
    pub nodes: Vec<NodeId>,
    /// Values of the template's scale factors.
    pub scale_factors: Vec<f64>,
}

impl ElementData {
    /// Creates element data.
    #[must_use]
    pub fn new(template: TemplateId, nodes: Vec<NodeId>, scale_factors: Vec<f64>) -> Self {
        Self {
            template,
            nodes,
            scale_factors,
        }
    }
}
