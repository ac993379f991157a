//! Property facet

use super::candidate::{CandidateElement, PropertyValue};
use super::{constraint_messages, describe, is_blank};
use crate::schema::measures;
use crate::text;
use crate::values::{Value, ValueConstraint};
use serde::{Deserialize, Serialize};

/// Matches elements with a property value in a property set
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PropertyFacet {
    /// Accepted property set names
    pub property_set: ValueConstraint,
    /// Accepted property names
    pub name: ValueConstraint,
    /// Accepted values; `None` only requires a value to be present
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<ValueConstraint>,
    /// Expected measure type (e.g. `IfcLabel`)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_type: Option<String>,
    /// Reference to an external definition
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uri: Option<String>,
    /// Authoring instructions
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub instructions: Option<String>,
}

impl PropertyFacet {
    /// Facet for a single property in a single property set
    pub fn new(property_set: &str, name: &str) -> Self {
        Self {
            property_set: ValueConstraint::single_undefined_exact(property_set),
            name: ValueConstraint::single_undefined_exact(name),
            ..Default::default()
        }
    }

    /// Require a value
    pub fn with_value(mut self, value: impl Into<ValueConstraint>) -> Self {
        self.value = Some(value.into());
        self
    }

    /// Require a measure type
    pub fn with_data_type(mut self, data_type: impl Into<String>) -> Self {
        self.data_type = Some(data_type.into());
        self
    }

    fn accepts(&self, property: PropertyValue) -> bool {
        let Some(value) = property.value else {
            return false;
        };
        if let (Some(expected), Some(actual)) = (&self.data_type, &property.data_type) {
            if !text::eq_ignore_case(expected, actual) {
                return false;
            }
        }
        self.property_set
            .is_satisfied_by(&Value::String(property.property_set))
            && self.name.is_satisfied_by(&Value::String(property.name))
            && self
                .value
                .as_ref()
                .map_or(true, |constraint| constraint.is_satisfied_by(&value))
    }

    /// Some property with a value satisfies set, name, value and data type
    pub fn matches(&self, candidate: &dyn CandidateElement) -> bool {
        candidate.properties().into_iter().any(|p| self.accepts(p))
    }

    /// Problems found in the facet
    pub fn validation_messages(&self) -> Vec<String> {
        let mut messages = Vec::new();
        if is_blank(&self.property_set) {
            messages.push("Property set name is required".to_string());
        }
        if is_blank(&self.name) {
            messages.push("Property name is required".to_string());
        }
        match self.data_type.as_deref() {
            Some(d) if d.trim().is_empty() => {
                messages.push("Property data type must not be empty".to_string());
            }
            Some(d) if measures::measure(d).is_none() => {
                messages.push(format!("Property data type '{}' is not a known IFC measure", d));
            }
            _ => {}
        }
        messages.extend(constraint_messages("Property set", &self.property_set));
        messages.extend(constraint_messages("Property name", &self.name));
        if let Some(value) = &self.value {
            messages.extend(constraint_messages("Property value", value));
        }
        messages
    }

    /// Short description
    pub fn short(&self) -> String {
        let mut out = format!(
            "property {}.{}",
            describe(&self.property_set),
            describe(&self.name)
        );
        match &self.value {
            Some(value) => out.push_str(&format!(" = {}", describe(value))),
            None => out.push_str(" is provided"),
        }
        if let Some(data_type) = &self.data_type {
            out.push_str(&format!(" ({})", data_type));
        }
        out
    }
}
