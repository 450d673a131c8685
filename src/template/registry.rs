use slotmap::SlotMap;

use crate::error::TopologyError;

use super::ElementTemplate;

slotmap::new_key_type! {
    /// Unique identifier for a template in the registry.
    pub struct TemplateId;
}

/// Arena of element templates shared by the elements that use them.
#[derive(Debug, Default)]
pub struct TemplateRegistry {
    templates: SlotMap<TemplateId, ElementTemplate>,
}

impl TemplateRegistry {
    /// Creates a new, empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a template and returns its ID.
    pub fn add(&mut self, template: ElementTemplate) -> TemplateId {
        self.templates.insert(template)
    }

    /// Returns the ID of an identical registered template, inserting
    /// `template` if there is none.
    pub fn intern(&mut self, template: ElementTemplate) -> TemplateId {
        let existing = self
            .templates
            .iter()
            .find(|(_, existing)| **existing == template)
            .map(|(id, _)| id);
        existing.unwrap_or_else(|| self.templates.insert(template))
    }

    /// Returns a reference to the template, or an error if not found.
    ///
    /// # Errors
    ///
    /// Returns an error if the template is not in the registry.
    pub fn get(&self, id: TemplateId) -> Result<&ElementTemplate, TopologyError> {
        self.templates.get(id).ok_or(TopologyError::TemplateNotFound)
    }

    /// Number of registered templates.
    #[must_use]
    pub fn len(&self) -> usize {
        self.templates.len()
    }

    /// Returns whether no template is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }
}
