use std::fmt;

use crate::error::TopologyError;
use crate::math::{Point3, Vector3};

/// Identifier of a node in the mesh store.
///
/// Assigned monotonically and never reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId(u32);

impl NodeId {
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

    /// Returns the identifier that follows this one.
    #[must_use]
    pub const fn next(self) -> Self {
        Self(self.0 + 1)
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Position and directional derivatives stored at a mesh node.
#[derive(Debug, Clone, PartialEq)]
pub struct NodeData {
    /// Coordinates of the node.
    pub x: Point3,
    /// Derivative along the first (circumferential) direction.
    pub d1: Vector3,
    /// Derivative along the second in-plane direction.
    pub d2: Vector3,
    /// Transverse (through-wall) derivative. `None` on nodes that only bound
    /// elements which are linear through the wall.
    pub d3: Option<Vector3>,
}

impl NodeData {
    /// Creates a node with all three derivatives.
    #[must_use]
    pub fn new(x: Point3, d1: Vector3, d2: Vector3, d3: Vector3) -> Self {
        Self {
            x,
            d1,
            d2,
            d3: Some(d3),
        }
    }

    /// Creates a node without a transverse derivative.
    #[must_use]
    pub fn linear_through_wall(x: Point3, d1: Vector3, d2: Vector3) -> Self {
        Self { x, d1, d2, d3: None }
    }

    /// Returns the transverse derivative.
    ///
    /// # Errors
    ///
    /// Returns an error if the node was created without one.
    pub fn transverse(&self, id: NodeId) -> Result<Vector3, TopologyError> {
        self.d3.ok_or(TopologyError::MissingDerivative(id))
    }
}
