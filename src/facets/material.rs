//! Material facet

use super::candidate::CandidateElement;
use super::{constraint_messages, describe};
use crate::values::{Value, ValueConstraint};
use serde::{Deserialize, Serialize};

/// Matches elements by material name
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MaterialFacet {
    /// Accepted material names; `None` means any material
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<ValueConstraint>,
    /// Reference to an external definition
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uri: Option<String>,
    /// Authoring instructions
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub instructions: Option<String>,
}

impl MaterialFacet {
    /// Facet accepting any material
    pub fn any() -> Self {
        Self::default()
    }

    /// Facet for one material name
    pub fn named(value: impl Into<ValueConstraint>) -> Self {
        Self {
            value: Some(value.into()),
            ..Default::default()
        }
    }

    /// Whether the element has a material satisfying the constraint
    pub fn matches(&self, candidate: &dyn CandidateElement) -> bool {
        let materials = candidate.materials();
        match &self.value {
            None => !materials.is_empty(),
            Some(constraint) => materials
                .into_iter()
                .any(|m| constraint.is_satisfied_by(&Value::String(m))),
        }
    }

    /// Problems found in the facet
    pub fn validation_messages(&self) -> Vec<String> {
        self.value
            .as_ref()
            .map(|v| constraint_messages("Material", v))
            .unwrap_or_default()
    }

    /// Short description
    pub fn short(&self) -> String {
        match &self.value {
            Some(value) => format!("of material {}", describe(value)),
            None => "with a material".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::facets::ElementDescriptor;

    #[test]
    fn test_material() {
        let concrete = ElementDescriptor::new("IfcWall").with_material("Concrete");
        assert!(MaterialFacet::any().matches(&concrete));
        assert!(MaterialFacet::named("Concrete").matches(&concrete));
        assert!(!MaterialFacet::named("Steel").matches(&concrete));
        assert!(!MaterialFacet::any().matches(&ElementDescriptor::new("IfcWall")));
    }
}
