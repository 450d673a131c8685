//! Element interpolation templates.
//!
//! A template describes how the 8 logical corners of a tricubic Hermite
//! element obtain their value and first-derivative parameters. Each corner
//! slot is a linear combination of [`Term`]s, each term naming a local node,
//! a parameter label on that node and the scale factors multiplying it.
//! Corners may alias one physical node (collapsed elements), and slots may
//! interpolate a coarser neighbour's edge (hanging nodes).
//!
//! Templates are declared once with a [`TemplateBuilder`], stored in a
//! [`TemplateRegistry`] and referenced by [`TemplateId`].

mod base;
mod builder;
mod registry;

pub use base::BaseTemplates;
pub use builder::{minus, plus, Contribution, TemplateBuilder};
pub use registry::{TemplateId, TemplateRegistry};

use crate::error::{AssemblyError, Result};
use crate::geometry::hermite_weights;
use crate::math::{Point3, Vector3};
use crate::mesh::{NodeData, NodeId};

/// Number of logical corners of a hexahedral element.
pub const CORNERS: usize = 8;

/// Index of the `-1` scale factor in every template that declares one.
pub const NEG_ONE: usize = 0;

/// Index of the `0.5` scale factor in hanging-node templates.
pub const HALF: usize = 1;

/// Index of the `0.25` scale factor in hanging-node templates.
pub const QUARTER: usize = 2;

/// Index of the `0.125` scale factor in hanging-node templates.
pub const EIGHTH: usize = 3;

/// Index of the `0.75` scale factor in hanging-node templates.
pub const THREE_QUARTERS: usize = 4;

/// Scale factor values of hanging-node templates, in index order.
pub const HANGING_SCALE_FACTORS: [f64; 5] = [-1.0, 0.5, 0.25, 0.125, 0.75];

/// Scale factor values of templates that only reverse directions.
pub const REVERSE_SCALE_FACTORS: [f64; 1] = [-1.0];

/// Node parameter labels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueLabel {
    /// Node coordinates.
    Value,
    /// First derivative (circumferential).
    D1,
    /// Second derivative (in-plane).
    D2,
    /// Third derivative (transverse).
    D3,
    /// Cross derivative label. Never interpolated; only used as a scratch
    /// label while swapping two derivatives during template declaration.
    D12,
}

impl ValueLabel {
    /// Slot index of this label within a corner, if it owns one.
    #[must_use]
    pub fn slot(self) -> Option<usize> {
        match self {
            Self::Value => Some(0),
            Self::D1 => Some(1),
            Self::D2 => Some(2),
            Self::D3 => Some(3),
            Self::D12 => None,
        }
    }

    /// Labels that own a corner slot, in slot order.
    pub const SLOTS: [ValueLabel; 4] = [Self::Value, Self::D1, Self::D2, Self::D3];
}

/// One term of a corner slot expression.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Term {
    /// Local node the parameter is read from.
    pub node: usize,
    /// Parameter read from the node.
    pub label: ValueLabel,
    /// Indexes of the element scale factors multiplying the parameter.
    pub scale_factors: Vec<usize>,
}

impl Term {
    /// Creates an unscaled term.
    #[must_use]
    pub fn new(node: usize, label: ValueLabel) -> Self {
        Self {
            node,
            label,
            scale_factors: Vec::new(),
        }
    }

    /// Creates a term scaled by the given factors.
    #[must_use]
    pub fn scaled(node: usize, label: ValueLabel, scale_factors: &[usize]) -> Self {
        Self {
            node,
            label,
            scale_factors: scale_factors.to_vec(),
        }
    }
}

/// Topology class of a template.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TopologyClass {
    /// 8 independent corners.
    Regular,
    /// Corners merged onto 6 physical nodes.
    Collapsed6,
    /// Corners merged onto 7 physical nodes.
    Collapsed7,
    /// One coarse edge split at its midpoint, with 5 scale factors.
    Hanging5,
}

/// Slot expressions of all corners, indexed `[corner][slot]`.
pub(crate) type Slots = [[Vec<Term>; 4]; CORNERS];

/// A finished interpolation template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ElementTemplate {
    name: &'static str,
    slots: Slots,
    corner_nodes: [usize; CORNERS],
    node_count: usize,
    scale_factor_count: usize,
}

impl ElementTemplate {
    /// Descriptive name used in logs and errors.
    #[must_use]
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Number of physical nodes an element of this template takes.
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.node_count
    }

    /// Number of scale factors an element of this template takes.
    #[must_use]
    pub fn scale_factor_count(&self) -> usize {
        self.scale_factor_count
    }

    /// Local node each logical corner sits on.
    #[must_use]
    pub fn corner_nodes(&self) -> &[usize; CORNERS] {
        &self.corner_nodes
    }

    /// Expression of one corner slot.
    ///
    /// Returns an empty slice for [`ValueLabel::D12`], which owns no slot.
    #[must_use]
    pub fn slot(&self, corner: usize, label: ValueLabel) -> &[Term] {
        label
            .slot()
            .map_or(&[], |slot| self.slots[corner][slot].as_slice())
    }

    /// Topology class derived from node and scale factor counts.
    #[must_use]
    pub fn class(&self) -> TopologyClass {
        if self.scale_factor_count == HANGING_SCALE_FACTORS.len() {
            return TopologyClass::Hanging5;
        }
        match self.node_count {
            6 => TopologyClass::Collapsed6,
            7 => TopologyClass::Collapsed7,
            _ => TopologyClass::Regular,
        }
    }

    /// Scale factor values elements of this template carry.
    #[must_use]
    pub fn default_scale_factors(&self) -> Vec<f64> {
        match self.scale_factor_count {
            0 => Vec::new(),
            1 => REVERSE_SCALE_FACTORS.to_vec(),
            _ => HANGING_SCALE_FACTORS.to_vec(),
        }
    }

    /// Resolves the parameters of every logical corner from node data.
    ///
    /// # Errors
    ///
    /// Returns an error if the node or scale factor counts do not match the
    /// template, or a referenced node lacks a transverse derivative.
    pub fn expand(
        &self,
        nodes: &[(NodeId, &NodeData)],
        scale_factors: &[f64],
    ) -> Result<[CornerParameters; CORNERS]> {
        if nodes.len() != self.node_count || scale_factors.len() != self.scale_factor_count {
            return Err(AssemblyError::InvalidTemplate {
                template: self.name,
                reason: format!(
                    "expected {} nodes and {} scale factors, got {} and {}",
                    self.node_count,
                    self.scale_factor_count,
                    nodes.len(),
                    scale_factors.len()
                ),
            }
            .into());
        }
        let mut corners = [CornerParameters::default(); CORNERS];
        for (corner, params) in corners.iter_mut().enumerate() {
            for (slot, value) in params.slots_mut().into_iter().enumerate() {
                for term in &self.slots[corner][slot] {
                    let (id, data) = nodes[term.node];
                    let scale: f64 = term.scale_factors.iter().map(|&i| scale_factors[i]).product();
                    let parameter = match term.label {
                        ValueLabel::Value => data.x.coords,
                        ValueLabel::D1 => data.d1,
                        ValueLabel::D2 => data.d2,
                        ValueLabel::D3 => data.transverse(id)?,
                        ValueLabel::D12 => Vector3::zeros(),
                    };
                    *value += parameter * scale;
                }
            }
        }
        Ok(corners)
    }
}

/// Resolved parameters at one logical corner.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct CornerParameters {
    /// Coordinates.
    pub x: Vector3,
    /// Derivative along xi1.
    pub d1: Vector3,
    /// Derivative along xi2.
    pub d2: Vector3,
    /// Derivative along xi3.
    pub d3: Vector3,
}

impl CornerParameters {
    fn slots_mut(&mut self) -> [&mut Vector3; 4] {
        [&mut self.x, &mut self.d1, &mut self.d2, &mut self.d3]
    }
}

/// Interpolates a tricubic Hermite element without cross derivatives.
///
/// Corner `c` sits at `xi = (c & 1, (c >> 1) & 1, (c >> 2) & 1)`.
#[must_use]
pub fn interpolate(corners: &[CornerParameters; CORNERS], xi: [f64; 3]) -> Point3 {
    let w = xi.map(hermite_weights);
    let mut x = Vector3::zeros();
    for (c, p) in corners.iter().enumerate() {
        let [i, j, k] = [c & 1, (c >> 1) & 1, (c >> 2) & 1];
        // value weight sits at 2 * end, derivative weight right after it
        let (v1, g1) = (w[0][2 * i], w[0][2 * i + 1]);
        let (v2, g2) = (w[1][2 * j], w[1][2 * j + 1]);
        let (v3, g3) = (w[2][2 * k], w[2][2 * k + 1]);
        x += p.x * (v1 * v2 * v3) + p.d1 * (g1 * v2 * v3) + p.d2 * (v1 * g2 * v3) + p.d3 * (v1 * v2 * g3);
    }
    Point3::from(x)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn unit_cube_corners() -> [CornerParameters; CORNERS] {
        let mut corners = [CornerParameters::default(); CORNERS];
        for (c, p) in corners.iter_mut().enumerate() {
            #[allow(clippy::cast_precision_loss)]
            let at = |bit: usize| ((c >> bit) & 1) as f64;
            p.x = Vector3::new(at(0), at(1), at(2));
            p.d1 = Vector3::x();
            p.d2 = Vector3::y();
            p.d3 = Vector3::z();
        }
        corners
    }

    #[test]
    fn unit_cube_interpolates_identity() {
        let corners = unit_cube_corners();
        let p = interpolate(&corners, [0.3, 0.6, 0.9]);
        assert_relative_eq!(p.x, 0.3, epsilon = 1e-14);
        assert_relative_eq!(p.y, 0.6, epsilon = 1e-14);
        assert_relative_eq!(p.z, 0.9, epsilon = 1e-14);
    }

    #[test]
    fn regular_template_expands_node_parameters() {
        let template = TemplateBuilder::tricubic("regular").build().unwrap();
        let data: Vec<NodeData> = (0..8)
            .map(|i| {
                let x = Point3::new(f64::from(i), 0.0, 0.0);
                NodeData::new(x, Vector3::x(), Vector3::y(), Vector3::z())
            })
            .collect();
        let nodes: Vec<(NodeId, &NodeData)> = data
            .iter()
            .zip(1..)
            .map(|(d, i)| (NodeId::new(i), d))
            .collect();
        let corners = template.expand(&nodes, &[]).unwrap();
        assert_relative_eq!(corners[5].x.x, 5.0);
        assert_eq!(corners[2].d3, Vector3::z());
        assert_eq!(template.class(), TopologyClass::Regular);
    }

    #[test]
    fn expand_rejects_wrong_node_count() {
        let template = TemplateBuilder::tricubic("regular").build().unwrap();
        let data = NodeData::new(Point3::origin(), Vector3::x(), Vector3::y(), Vector3::z());
        let nodes = vec![(NodeId::new(1), &data); 7];
        assert!(template.expand(&nodes, &[]).is_err());
    }

    #[test]
    fn expand_reports_missing_transverse_derivative() {
        let template = TemplateBuilder::tricubic("regular").build().unwrap();
        let data = NodeData::linear_through_wall(Point3::origin(), Vector3::x(), Vector3::y());
        let nodes = vec![(NodeId::new(1), &data); 8];
        assert!(template.expand(&nodes, &[]).is_err());
    }
}
