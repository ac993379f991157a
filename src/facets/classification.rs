//! Classification facet

use super::candidate::CandidateElement;
use super::{constraint_messages, describe};
use crate::values::{Value, ValueConstraint};
use serde::{Deserialize, Serialize};

/// Matches elements by classification reference
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ClassificationFacet {
    /// Accepted reference codes
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<ValueConstraint>,
    /// Accepted classification systems
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub system: Option<ValueConstraint>,
    /// Reference to an external definition
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uri: Option<String>,
    /// Authoring instructions
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub instructions: Option<String>,
}

impl ClassificationFacet {
    /// Facet accepting any classification
    pub fn any() -> Self {
        Self::default()
    }

    /// Facet for a classification system
    pub fn in_system(system: &str) -> Self {
        Self {
            system: Some(ValueConstraint::single_undefined_exact(system)),
            ..Default::default()
        }
    }

    /// Require a reference code
    pub fn with_value(mut self, value: impl Into<ValueConstraint>) -> Self {
        self.value = Some(value.into());
        self
    }

    /// Some reference satisfies system and code; absent parts accept anything
    pub fn matches(&self, candidate: &dyn CandidateElement) -> bool {
        candidate.classifications().into_iter().any(|reference| {
            self.system.as_ref().map_or(true, |s| {
                s.is_satisfied_ignoring_case_by(&Value::String(reference.system))
            }) && self
                .value
                .as_ref()
                .map_or(true, |v| v.is_satisfied_by(&Value::String(reference.identification)))
        })
    }

    /// Problems found in the facet
    pub fn validation_messages(&self) -> Vec<String> {
        let mut messages = Vec::new();
        if let Some(system) = &self.system {
            messages.extend(constraint_messages("Classification system", system));
        }
        if let Some(value) = &self.value {
            messages.extend(constraint_messages("Classification value", value));
        }
        messages
    }

    /// Short description
    pub fn short(&self) -> String {
        match (&self.system, &self.value) {
            (None, None) => "classified".to_string(),
            (Some(system), None) => format!("classified in {}", describe(system)),
            (None, Some(value)) => format!("classified as {}", describe(value)),
            (Some(system), Some(value)) => {
                format!("classified as {} in {}", describe(value), describe(system))
            }
        }
    }
}
