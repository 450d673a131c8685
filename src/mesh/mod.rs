mod element;
mod node;

pub use element::{ElementData, ElementId};
pub use node::{NodeData, NodeId};

use std::collections::BTreeMap;

use crate::error::{AssemblyError, Result, TopologyError};
use crate::math::Point3;
use crate::template::{interpolate, CornerParameters, ElementTemplate, TemplateRegistry, CORNERS};

/// Central arena that owns all nodes, elements and element templates.
///
/// Nodes and elements are keyed by monotonically assigned integer
/// identifiers. New entities always take the identifier after the current
/// maximum, so identifiers are never reused and blocks appended by one
/// builder are contiguous.
#[derive(Debug, Default)]
pub struct MeshStore {
    nodes: BTreeMap<NodeId, NodeData>,
    elements: BTreeMap<ElementId, ElementData>,
    templates: TemplateRegistry,
}

impl MeshStore {
    /// Creates a new, empty mesh store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    // --- Node operations ---

    /// Identifier the next added node will receive.
    #[must_use]
    pub fn next_node_id(&self) -> NodeId {
        self.nodes
            .last_key_value()
            .map_or(NodeId::new(1), |(id, _)| id.next())
    }

    /// Inserts a node and returns its ID.
    pub fn add_node(&mut self, data: NodeData) -> NodeId {
        let id = self.next_node_id();
        self.nodes.insert(id, data);
        id
    }

    /// Returns a reference to the node data, or an error if not found.
    ///
    /// # Errors
    ///
    /// Returns an error if the node is not in the store.
    pub fn node(&self, id: NodeId) -> std::result::Result<&NodeData, TopologyError> {
        self.nodes.get(&id).ok_or(TopologyError::NodeNotFound(id))
    }

    /// Returns a mutable reference to the node data, or an error if not found.
    ///
    /// # Errors
    ///
    /// Returns an error if the node is not in the store.
    pub fn node_mut(&mut self, id: NodeId) -> std::result::Result<&mut NodeData, TopologyError> {
        self.nodes
            .get_mut(&id)
            .ok_or(TopologyError::NodeNotFound(id))
    }

    /// Number of nodes in the store.
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Iterates over nodes in identifier order.
    pub fn nodes(&self) -> impl Iterator<Item = (NodeId, &NodeData)> {
        self.nodes.iter().map(|(&id, data)| (id, data))
    }

    // --- Element operations ---

    /// Identifier the next added element will receive.
    #[must_use]
    pub fn next_element_id(&self) -> ElementId {
        self.elements
            .last_key_value()
            .map_or(ElementId::new(1), |(id, _)| id.offset(1))
    }

    /// Inserts an element and returns its ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the template is unknown, if the node list length
    /// differs from the template's node count, if the scale factor count
    /// differs, or if a listed node is not in the store.
    pub fn add_element(&mut self, data: ElementData) -> Result<ElementId> {
        let id = self.next_element_id();
        let template = self.templates.get(data.template)?;
        if data.nodes.len() != template.node_count() {
            return Err(AssemblyError::NodeCountMismatch {
                element: id,
                template: template.name(),
                expected: template.node_count(),
                nodes: data.nodes,
            }
            .into());
        }
        if data.scale_factors.len() != template.scale_factor_count() {
            return Err(AssemblyError::ScaleFactorCountMismatch {
                element: id,
                template: template.name(),
                expected: template.scale_factor_count(),
                actual: data.scale_factors.len(),
            }
            .into());
        }
        for &node in &data.nodes {
            self.node(node)?;
        }
        self.elements.insert(id, data);
        Ok(id)
    }

    /// Returns a reference to the element data, or an error if not found.
    ///
    /// # Errors
    ///
    /// Returns an error if the element is not in the store.
    pub fn element(&self, id: ElementId) -> std::result::Result<&ElementData, TopologyError> {
        self.elements
            .get(&id)
            .ok_or(TopologyError::ElementNotFound(id))
    }

    /// Returns the template of an element.
    ///
    /// # Errors
    ///
    /// Returns an error if the element or its template is not in the store.
    pub fn element_template(
        &self,
        id: ElementId,
    ) -> std::result::Result<&ElementTemplate, TopologyError> {
        self.templates.get(self.element(id)?.template)
    }

    /// Number of elements in the store.
    #[must_use]
    pub fn element_count(&self) -> usize {
        self.elements.len()
    }

    /// Iterates over elements in identifier order.
    pub fn elements(&self) -> impl Iterator<Item = (ElementId, &ElementData)> {
        self.elements.iter().map(|(&id, data)| (id, data))
    }

    /// Resolves the corner parameters of an element from its nodes.
    ///
    /// # Errors
    ///
    /// Returns an error if the element, its template or one of its nodes is
    /// missing, or a referenced node lacks a transverse derivative.
    pub fn corner_parameters(&self, id: ElementId) -> Result<[CornerParameters; CORNERS]> {
        let element = self.element(id)?;
        let template = self.templates.get(element.template)?;
        let nodes = element
            .nodes
            .iter()
            .map(|&n| self.node(n).map(|data| (n, data)))
            .collect::<std::result::Result<Vec<_>, _>>()?;
        template.expand(&nodes, &element.scale_factors)
    }

    /// Evaluates the coordinate field of an element at `xi`.
    ///
    /// # Errors
    ///
    /// Returns an error if the element cannot be expanded.
    pub fn evaluate(&self, id: ElementId, xi: [f64; 3]) -> Result<Point3> {
        Ok(interpolate(&self.corner_parameters(id)?, xi))
    }

    // --- Template operations ---

    /// Returns the template registry.
    #[must_use]
    pub fn templates(&self) -> &TemplateRegistry {
        &self.templates
    }

    /// Returns the template registry for registration.
    pub fn templates_mut(&mut self) -> &mut TemplateRegistry {
        &mut self.templates
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::error::HeartBaseError;
    use crate::math::Vector3;
    use crate::template::TemplateBuilder;

    fn node_at(x: f64) -> NodeData {
        NodeData::new(Point3::new(x, 0.0, 0.0), Vector3::x(), Vector3::y(), Vector3::z())
    }

    #[test]
    fn node_ids_start_at_one_and_increase() {
        let mut store = MeshStore::new();
        let a = store.add_node(node_at(0.0));
        let b = store.add_node(node_at(1.0));
        assert_eq!(a.get(), 1);
        assert_eq!(b, a.next());
        assert_eq!(store.next_node_id().get(), 3);
    }

    #[test]
    fn missing_node_is_reported() {
        let store = MeshStore::new();
        assert!(matches!(
            store.node(NodeId::new(4)),
            Err(TopologyError::NodeNotFound(id)) if id.get() == 4
        ));
    }

    #[test]
    fn node_mut_updates_in_place() {
        let mut store = MeshStore::new();
        let id = store.add_node(node_at(0.0));
        store.node_mut(id).unwrap().d3 = Some(Vector3::new(0.0, 0.0, 2.0));
        assert_eq!(store.node(id).unwrap().d3, Some(Vector3::new(0.0, 0.0, 2.0)));
    }

    #[test]
    fn element_with_wrong_node_count_is_rejected() {
        let mut store = MeshStore::new();
        let template = store
            .templates_mut()
            .add(TemplateBuilder::tricubic("regular").build().unwrap());
        let nodes: Vec<NodeId> = (0..7).map(|i| store.add_node(node_at(f64::from(i)))).collect();
        let err = store
            .add_element(ElementData::new(template, nodes.clone(), Vec::new()))
            .unwrap_err();
        match err {
            HeartBaseError::Assembly(AssemblyError::NodeCountMismatch {
                element,
                expected,
                nodes: reported,
                ..
            }) => {
                assert_eq!(element.get(), 1);
                assert_eq!(expected, 8);
                assert_eq!(reported, nodes);
            }
            other => panic!("unexpected error: {other}"),
        }
        assert_eq!(store.element_count(), 0);
    }

    #[test]
    fn element_with_wrong_scale_factor_count_is_rejected() {
        let mut store = MeshStore::new();
        let template = store
            .templates_mut()
            .add(TemplateBuilder::tricubic("regular").build().unwrap());
        let nodes: Vec<NodeId> = (0..8).map(|i| store.add_node(node_at(f64::from(i)))).collect();
        let result = store.add_element(ElementData::new(template, nodes, vec![-1.0]));
        assert!(matches!(
            result,
            Err(HeartBaseError::Assembly(AssemblyError::ScaleFactorCountMismatch { .. }))
        ));
    }

    #[test]
    fn elements_take_consecutive_ids_and_evaluate() {
        let mut store = MeshStore::new();
        let template = store
            .templates_mut()
            .add(TemplateBuilder::tricubic("regular").build().unwrap());
        let mut ids = Vec::new();
        for _ in 0..2 {
            let nodes: Vec<NodeId> = (0..8)
                .map(|c| {
                    let x = Point3::new(f64::from(c & 1), f64::from((c >> 1) & 1), f64::from(c >> 2));
                    store.add_node(NodeData::new(x, Vector3::x(), Vector3::y(), Vector3::z()))
                })
                .collect();
            ids.push(store.add_element(ElementData::new(template, nodes, Vec::new())).unwrap());
        }
        assert_eq!(ids[1], ids[0].offset(1));
        let p = store.evaluate(ids[1], [0.5, 0.25, 1.0]).unwrap();
        assert!((p - Point3::new(0.5, 0.25, 1.0)).norm() < 1e-14);
    }
}
