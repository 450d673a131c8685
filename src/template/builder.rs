use crate::error::AssemblyError;

use super::{
    ElementTemplate, Slots, Term, ValueLabel, CORNERS, EIGHTH, HALF, NEG_ONE, QUARTER,
    THREE_QUARTERS,
};

/// One replacement term of a [`TemplateBuilder::remap`] expression.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Contribution {
    /// Label read from the remapped node.
    pub label: ValueLabel,
    /// Whether the term is multiplied by the `-1` scale factor.
    pub reversed: bool,
}

/// Contribution of `label` with its own direction.
#[must_use]
pub const fn plus(label: ValueLabel) -> Contribution {
    Contribution {
        label,
        reversed: false,
    }
}

/// Contribution of `label` with its direction reversed.
#[must_use]
pub const fn minus(label: ValueLabel) -> Contribution {
    Contribution {
        label,
        reversed: true,
    }
}

/// Declarative builder for [`ElementTemplate`]s.
///
/// Starts from the regular tricubic Hermite template, where every corner
/// slot reads its own node's parameter, and applies remapping operations in
/// order. Node indexes refer to local nodes, which coincide with logical
/// corners until [`collapse`](Self::collapse) merges them. Collapsing
/// consumes the builder, so every remap happens before it.
///
/// ```
/// use heartbase::template::{minus, plus, TemplateBuilder, ValueLabel::*};
///
/// let template = TemplateBuilder::tricubic("wedge")
///     .with_scale_factors(1)
///     .remap(&[0, 4], D1, &[plus(D1), minus(D2)])
///     .collapse([0, 1, 2, 3, 4, 5, 6, 6])
///     .unwrap();
/// assert_eq!(template.node_count(), 7);
/// ```
#[derive(Debug, Clone)]
pub struct TemplateBuilder {
    name: &'static str,
    slots: Slots,
    scale_factor_count: usize,
    invalid: Option<String>,
}

impl TemplateBuilder {
    /// Creates a builder for the regular tricubic Hermite template.
    #[must_use]
    pub fn tricubic(name: &'static str) -> Self {
        let slots = std::array::from_fn(|corner| {
            ValueLabel::SLOTS.map(|label| vec![Term::new(corner, label)])
        });
        Self {
            name,
            slots,
            scale_factor_count: 0,
            invalid: None,
        }
    }

    /// Declares the number of scale factors elements of the template carry.
    #[must_use]
    pub fn with_scale_factors(mut self, count: usize) -> Self {
        self.scale_factor_count = count;
        self
    }

    /// Replaces every slot expression that is a single unscaled `label` term
    /// of one of `nodes` by `terms` on the same node.
    ///
    /// Reversed contributions take the `-1` scale factor. An empty `terms`
    /// zeroes the matching slots.
    #[must_use]
    pub fn remap(mut self, nodes: &[usize], label: ValueLabel, terms: &[Contribution]) -> Self {
        for expression in self.slots.iter_mut().flatten() {
            let Some(node) = single_unscaled(expression, nodes, label) else {
                continue;
            };
            *expression = terms
                .iter()
                .map(|c| {
                    let factors: &[usize] = if c.reversed { &[NEG_ONE] } else { &[] };
                    Term::scaled(node, c.label, factors)
                })
                .collect();
        }
        self
    }

    /// Appends `factors` to every term reading one of `labels` from one of
    /// `nodes`.
    #[must_use]
    pub fn scale(mut self, nodes: &[usize], labels: &[ValueLabel], factors: &[usize]) -> Self {
        for term in self.slots.iter_mut().flatten().flatten() {
            if nodes.contains(&term.node) && labels.contains(&term.label) {
                term.scale_factors.extend_from_slice(factors);
            }
        }
        self
    }

    /// Reverses every term reading one of `labels` from one of `nodes`.
    #[must_use]
    pub fn reverse(self, nodes: &[usize], labels: &[ValueLabel]) -> Self {
        self.scale(nodes, labels, &[NEG_ONE])
    }

    /// Sets the `label` slot of each corner in `corners` to the linear
    /// difference `x(to) - x(from)`.
    #[must_use]
    pub fn linear_derivative(
        mut self,
        corners: &[usize],
        label: ValueLabel,
        from: usize,
        to: usize,
    ) -> Self {
        let Some(slot) = label.slot() else {
            self.reject(format!("{label:?} has no slot for a linear derivative"));
            return self;
        };
        if from >= CORNERS || to >= CORNERS {
            self.reject(format!("linear derivative between {from} and {to} out of range"));
            return self;
        }
        for &corner in corners {
            if let Some(expression) = self.corner_slot(corner, slot) {
                *expression = vec![
                    Term::new(to, ValueLabel::Value),
                    Term::scaled(from, ValueLabel::Value, &[NEG_ONE]),
                ];
            }
        }
        self
    }

    /// Makes `hanging` a node at the middle of the coarse xi1 edge between
    /// `node1` and `node2`, and halves the xi1 derivative of `other`, the
    /// fine element's opposite corner on that edge.
    ///
    /// Uses the hanging scale factors, so the template must declare 5.
    #[must_use]
    pub fn midside_xi1_hanging(
        mut self,
        hanging: usize,
        other: usize,
        node1: usize,
        node2: usize,
    ) -> Self {
        use ValueLabel::{Value, D1, D2, D3};

        if node1 >= CORNERS || node2 >= CORNERS {
            self.reject(format!("hanging edge {node1}-{node2} out of range"));
            return self;
        }
        if let Some(expression) = self.corner_slot(other, 1) {
            for term in expression {
                term.scale_factors.push(HALF);
            }
        }
        let hanging_slots = [
            vec![
                Term::scaled(node1, Value, &[HALF]),
                Term::scaled(node1, D1, &[EIGHTH]),
                Term::scaled(node2, Value, &[HALF]),
                Term::scaled(node2, D1, &[NEG_ONE, EIGHTH]),
            ],
            vec![
                Term::scaled(node1, Value, &[NEG_ONE, THREE_QUARTERS]),
                Term::scaled(node1, D1, &[NEG_ONE, HALF, QUARTER]),
                Term::scaled(node2, Value, &[THREE_QUARTERS]),
                Term::scaled(node2, D1, &[NEG_ONE, HALF, QUARTER]),
            ],
            vec![
                Term::scaled(node1, D2, &[HALF]),
                Term::scaled(node2, D2, &[HALF]),
            ],
            vec![
                Term::scaled(node1, D3, &[HALF]),
                Term::scaled(node2, D3, &[HALF]),
            ],
        ];
        for (slot, terms) in hanging_slots.into_iter().enumerate() {
            if let Some(expression) = self.corner_slot(hanging, slot) {
                *expression = terms;
            }
        }
        self
    }

    /// Finishes a template with one local node per corner.
    ///
    /// # Errors
    ///
    /// Returns an error if an operation was invalid, a scratch label
    /// survived, or a term uses an undeclared scale factor.
    pub fn build(self) -> Result<ElementTemplate, AssemblyError> {
        self.collapse(std::array::from_fn(|corner| corner))
    }

    /// Finishes a template whose corners merge onto shared local nodes.
    ///
    /// `map[corner]` is the local node of each corner. Local nodes are
    /// numbered from 0 and every one must be used.
    ///
    /// # Errors
    ///
    /// Returns an error if the map skips a local node, or for any reason
    /// [`build`](Self::build) fails.
    pub fn collapse(self, map: [usize; CORNERS]) -> Result<ElementTemplate, AssemblyError> {
        let invalid = |reason: String| AssemblyError::InvalidTemplate {
            template: self.name,
            reason,
        };
        if let Some(reason) = &self.invalid {
            return Err(invalid(reason.clone()));
        }
        let node_count = map.iter().max().map_or(0, |m| m + 1);
        if let Some(unused) = (0..node_count).find(|n| !map.contains(n)) {
            return Err(invalid(format!("local node {unused} has no corner")));
        }
        let mut slots = self.slots.clone();
        for term in slots.iter_mut().flatten().flatten() {
            if term.label == ValueLabel::D12 {
                return Err(invalid(format!("scratch label left on node {}", term.node)));
            }
            if let Some(&sf) = term
                .scale_factors
                .iter()
                .find(|&&sf| sf >= self.scale_factor_count)
            {
                return Err(invalid(format!(
                    "scale factor {sf} used but {} declared",
                    self.scale_factor_count
                )));
            }
            term.node = map[term.node];
        }
        Ok(ElementTemplate {
            name: self.name,
            slots,
            corner_nodes: map,
            node_count,
            scale_factor_count: self.scale_factor_count,
        })
    }

    fn corner_slot(&mut self, corner: usize, slot: usize) -> Option<&mut Vec<Term>> {
        if corner >= CORNERS {
            self.reject(format!("corner {corner} out of range"));
            return None;
        }
        Some(&mut self.slots[corner][slot])
    }

    fn reject(&mut self, reason: String) {
        self.invalid.get_or_insert(reason);
    }
}

/// Node of `expression` if it is a single unscaled `label` term on one of
/// `nodes`.
fn single_unscaled(expression: &[Term], nodes: &[usize], label: ValueLabel) -> Option<usize> {
    match expression {
        [term] if term.label == label && term.scale_factors.is_empty() && nodes.contains(&term.node) => {
            Some(term.node)
        }
        _ => None,
    }
}
