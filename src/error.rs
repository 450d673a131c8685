use thiserror::Error;

use crate::landmarks::Landmark;
use crate::mesh::{ElementId, NodeId};

/// Top-level error type for heart base mesh construction.
#[derive(Debug, Error)]
pub enum HeartBaseError {
    #[error(transparent)]
    Geometry(#[from] GeometryError),

    #[error(transparent)]
    Topology(#[from] TopologyError),

    #[error(transparent)]
    Assembly(#[from] AssemblyError),
}

/// Errors related to geometric computations.
#[derive(Debug, Error)]
pub enum GeometryError {
    #[error("degenerate geometry: {0}")]
    Degenerate(String),
}

/// Errors raised while looking up entities in the mesh store.
#[derive(Debug, Error)]
pub enum TopologyError {
    #[error("node {0} not found")]
    NodeNotFound(NodeId),

    #[error("element {0} not found")]
    ElementNotFound(ElementId),

    #[error("no node for landmark {0:?}")]
    LandmarkNotFound(Landmark),

    #[error("element template not found")]
    TemplateNotFound,

    #[error("node {0} has no transverse derivative")]
    MissingDerivative(NodeId),
}

/// Errors raised while assembling elements from templates.
///
/// These are fatal: every consumer of the mesh assumes its topology is valid.
#[derive(Debug, Error)]
pub enum AssemblyError {
    #[error("element {element} ({template}) expects {expected} nodes, got {nodes:?}")]
    NodeCountMismatch {
        element: ElementId,
        template: &'static str,
        expected: usize,
        nodes: Vec<NodeId>,
    },

    #[error("element {element} ({template}) expects {expected} scale factors, got {actual}")]
    ScaleFactorCountMismatch {
        element: ElementId,
        template: &'static str,
        expected: usize,
        actual: usize,
    },

    #[error("{count} elements around the atria, the base element layout needs {required}")]
    UnsupportedAtrialCount { count: usize, required: usize },

    #[error("invalid element template {template}: {reason}")]
    InvalidTemplate {
        template: &'static str,
        reason: String,
    },
}

/// Convenience type alias for results using [`HeartBaseError`].
pub type Result<T> = std::result::Result<T, HeartBaseError>;
