//! Entity facet: the class of an element and optionally its predefined type

use super::candidate::CandidateElement;
use super::{constraint_messages, describe, is_blank};
use crate::schema::SchemaInfo;
use crate::values::{Value, ValueConstraint};
use serde::{Deserialize, Serialize};

/// Matches elements by class name
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EntityFacet {
    /// Accepted class names, compared case-insensitively
    pub name: ValueConstraint,
    /// Accepted predefined types
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub predefined_type: Option<ValueConstraint>,
    /// Also accept subclasses of the named classes
    #[serde(default)]
    pub include_subtypes: bool,
    /// Reference to an external definition
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uri: Option<String>,
    /// Authoring instructions
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub instructions: Option<String>,
}

impl EntityFacet {
    /// Facet for a single class name
    pub fn new(name: &str) -> Self {
        Self {
            name: ValueConstraint::single_undefined_exact(name.to_uppercase()),
            ..Default::default()
        }
    }

    /// Facet from an arbitrary name constraint
    pub fn with_name_constraint(name: ValueConstraint) -> Self {
        Self {
            name,
            ..Default::default()
        }
    }

    /// Require a predefined type
    pub fn with_predefined_type(mut self, predefined_type: impl Into<ValueConstraint>) -> Self {
        self.predefined_type = Some(predefined_type.into());
        self
    }

    /// Accept subclasses
    pub fn with_subtypes(mut self, include_subtypes: bool) -> Self {
        self.include_subtypes = include_subtypes;
        self
    }

    fn name_matches(&self, class_name: &str) -> bool {
        self.name
            .is_satisfied_ignoring_case_by(&Value::String(class_name.to_string()))
    }

    /// Whether the element's class (or an ancestor, with subtypes) is named
    pub fn matches(&self, candidate: &dyn CandidateElement, schema: &SchemaInfo) -> bool {
        let Some(entity_type) = candidate.entity_type() else {
            return false;
        };
        let class_ok = self.name_matches(entity_type)
            || (self.include_subtypes
                && schema
                    .ancestors(entity_type)
                    .iter()
                    .any(|c| self.name_matches(&c.name)));
        if !class_ok {
            return false;
        }
        match &self.predefined_type {
            Some(constraint) => match candidate.predefined_type() {
                Some(pdt) => constraint.is_satisfied_by(&Value::String(pdt)),
                None => false,
            },
            None => true,
        }
    }

    /// Problems found against the schema
    pub fn validation_messages(&self, schema: &SchemaInfo) -> Vec<String> {
        let mut messages = Vec::new();
        if is_blank(&self.name) {
            messages.push("Entity name is required".to_string());
        } else if let Some(literal) = self.name.single_exact() {
            if !schema.contains(literal) {
                messages.push(format!("Entity '{}' is not a known class", literal));
            }
        }
        messages.extend(constraint_messages("Entity name", &self.name));
        if let Some(pdt) = &self.predefined_type {
            messages.extend(constraint_messages("Predefined type", pdt));
        }
        messages
    }

    /// Short description
    pub fn short(&self) -> String {
        let mut out = format!("of entity {}", describe(&self.name));
        if self.include_subtypes {
            out.push_str(" or subtype");
        }
        if let Some(pdt) = &self.predefined_type {
            out.push_str(&format!(" with predefined type {}", describe(pdt)));
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::facets::ElementDescriptor;
    use crate::schema::IfcSchemaVersion;

    fn schema() -> &'static SchemaInfo {
        SchemaInfo::for_version(IfcSchemaVersion::Ifc4)
    }

    #[test]
    fn test_name_is_case_insensitive() {
        let facet = EntityFacet::new("IfcWall");
        assert!(facet.matches(&ElementDescriptor::new("IfcWall"), schema()));
        assert!(facet.matches(&ElementDescriptor::new("IFCWALL"), schema()));
        assert!(!facet.matches(&ElementDescriptor::new("IfcSlab"), schema()));
        assert!(!facet.matches(&ElementDescriptor::default(), schema()));
    }

    #[test]
    fn test_subtypes() {
        let facet = EntityFacet::new("IfcWall");
        let standard = ElementDescriptor::new("IfcWallStandardCase");
        assert!(!facet.matches(&standard, schema()));
        assert!(facet.with_subtypes(true).matches(&standard, schema()));
    }

    #[test]
    fn test_predefined_type() {
        let facet = EntityFacet::new("IfcWall").with_predefined_type("SOLIDWALL");
        let solid = ElementDescriptor::new("IfcWall").with_predefined_type("SOLIDWALL");
        let shear = ElementDescriptor::new("IfcWall").with_predefined_type("SHEAR");
        assert!(facet.matches(&solid, schema()));
        assert!(!facet.matches(&shear, schema()));
        assert!(!facet.matches(&ElementDescriptor::new("IfcWall"), schema()));
    }

    #[test]
    fn test_validity() {
        assert!(EntityFacet::new("IfcWall").validation_messages(schema()).is_empty());
        let unknown = EntityFacet::new("IfcWhatever").validation_messages(schema());
        assert_eq!(unknown.len(), 1);
        assert!(unknown[0].contains("not a known class"));
        assert!(!EntityFacet::default().validation_messages(schema()).is_empty());
        let pattern = EntityFacet::with_name_constraint(ValueConstraint::pattern("IFCWALL.*"));
        assert!(pattern.validation_messages(schema()).is_empty());
    }

    #[test]
    fn test_short() {
        let facet = EntityFacet::new("IfcWall")
            .with_subtypes(true)
            .with_predefined_type("SOLIDWALL");
        assert_eq!(facet.short(), "of entity IFCWALL or subtype with predefined type SOLIDWALL");
    }
}
