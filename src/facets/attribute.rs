//! Attribute facet

use super::candidate::CandidateElement;
use super::{constraint_messages, describe, is_blank};
use crate::schema::{ClassRelationInfo, SchemaInfo};
use crate::values::{Value, ValueConstraint};
use serde::{Deserialize, Serialize};

/// Matches elements carrying an attribute, optionally with a given value
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AttributeFacet {
    /// Accepted attribute names
    pub name: ValueConstraint,
    /// Accepted values; `None` only requires a value to be present
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<ValueConstraint>,
    /// Reference to an external definition
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uri: Option<String>,
    /// Authoring instructions
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub instructions: Option<String>,
}

impl AttributeFacet {
    /// Facet for a single attribute name
    pub fn new(name: &str) -> Self {
        Self {
            name: ValueConstraint::single_undefined_exact(name),
            ..Default::default()
        }
    }

    /// Require a value
    pub fn with_value(mut self, value: impl Into<ValueConstraint>) -> Self {
        self.value = Some(value.into());
        self
    }

    /// Some attribute with a non-empty value satisfies name and value
    pub fn matches(&self, candidate: &dyn CandidateElement) -> bool {
        candidate.attributes().into_iter().any(|(name, value)| {
            let Some(value) = value.filter(|v| !is_empty_value(v)) else {
                return false;
            };
            self.name.is_satisfied_by(&Value::String(name))
                && self
                    .value
                    .as_ref()
                    .map_or(true, |constraint| constraint.is_satisfied_by(&value))
        })
    }

    /// Minimal classes carrying the attribute and how each reaches it
    pub fn relations(&self, schema: &SchemaInfo) -> Vec<ClassRelationInfo> {
        match self.name.single_exact() {
            Some(name) => schema.attribute_relations(name),
            None => Vec::new(),
        }
    }

    /// Problems found against the schema
    pub fn validation_messages(&self, schema: &SchemaInfo) -> Vec<String> {
        let mut messages = Vec::new();
        if is_blank(&self.name) {
            messages.push("Attribute name is required".to_string());
        } else if let Some(name) = self.name.single_exact() {
            if schema.attribute_classes(name, true).is_empty() {
                messages.push(format!("Attribute '{}' is not declared by any class", name));
            }
        }
        messages.extend(constraint_messages("Attribute name", &self.name));
        if let Some(value) = &self.value {
            messages.extend(constraint_messages("Attribute value", value));
        }
        messages
    }

    /// Short description
    pub fn short(&self) -> String {
        match &self.value {
            Some(value) => format!("attribute {} = {}", describe(&self.name), describe(value)),
            None => format!("attribute {} is provided", describe(&self.name)),
        }
    }
}

/// Empty text counts as an unset value
fn is_empty_value(value: &Value) -> bool {
    matches!(value, Value::String(s) if s.is_empty())
}
