//! Value constraints
//!
//! A [`ValueConstraint`] is a typed, unordered collection of accepted
//! variants. A candidate satisfies it when it passes the type gate and at
//! least one variant accepts it. An empty constraint (no type, no variants)
//! accepts everything.
//!
//! Constraints read from XML remember their [`SourceForm`] so they can be
//! written back in the same shape. The form takes no part in matching or
//! equality.

use super::constraints::{
    ConstraintVariant, ExactConstraint, MatchContext, PatternConstraint, RangeConstraint,
};
use super::types::SemanticType;
use super::value::Value;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Typed set of accepted values
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ValueConstraint {
    /// Declared type
    #[serde(default)]
    pub base_type: SemanticType,
    /// Accepted variants; order is not significant, duplicates are
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub accepted_values: Option<Vec<ConstraintVariant>>,
    /// XML shape the constraint was read from, `None` when built in code
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_form: Option<SourceForm>,
}

/// XML shape of a constraint as read from a document
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "form")]
pub enum SourceForm {
    /// `<simpleValue>`
    SimpleValue,
    /// `xs:restriction`
    Restriction {
        /// Local name of the `base` type as written
        #[serde(default, skip_serializing_if = "Option::is_none")]
        base: Option<String>,
        /// Local names of the facet elements in document order
        #[serde(default)]
        facets: Vec<String>,
    },
}

impl ValueConstraint {
    /// A constraint with a type and no accepted values (type gate only)
    pub fn of_type(base_type: SemanticType) -> Self {
        Self {
            base_type,
            accepted_values: None,
            source_form: None,
        }
    }

    /// A single exact literal of the given type
    pub fn exact(base_type: SemanticType, value: impl Into<String>) -> Self {
        Self {
            base_type,
            accepted_values: Some(vec![ExactConstraint::new(value).into()]),
            source_form: None,
        }
    }

    /// A single pattern of string type
    pub fn pattern(pattern: impl Into<String>) -> Self {
        Self {
            base_type: SemanticType::String,
            accepted_values: Some(vec![PatternConstraint::new(pattern).into()]),
            source_form: None,
        }
    }

    /// A single range of the given type
    pub fn range(base_type: SemanticType, range: RangeConstraint) -> Self {
        Self {
            base_type,
            accepted_values: Some(vec![range.into()]),
            source_form: None,
        }
    }

    /// The canonical untyped single literal produced when importing plain text
    pub fn single_undefined_exact(value: impl Into<String>) -> Self {
        Self::exact(SemanticType::Undefined, value)
    }

    /// Record the XML shape the constraint was read from
    pub fn with_source_form(mut self, form: SourceForm) -> Self {
        self.source_form = Some(form);
        self
    }

    /// Same XML shape as `other`
    pub fn same_form(&self, other: &Self) -> bool {
        self.source_form == other.source_form
    }

    /// Append an accepted variant
    pub fn add_accepted(&mut self, variant: impl Into<ConstraintVariant>) {
        self.accepted_values
            .get_or_insert_with(Vec::new)
            .push(variant.into());
    }

    /// Accepted variants (empty slice when absent)
    pub fn accepted(&self) -> &[ConstraintVariant] {
        self.accepted_values.as_deref().unwrap_or(&[])
    }

    /// No type and no accepted values
    pub fn is_empty(&self) -> bool {
        self.base_type == SemanticType::Undefined && self.accepted().is_empty()
    }

    /// The literal if this holds exactly one exact variant
    pub fn single_exact(&self) -> Option<&str> {
        match self.accepted() {
            [ConstraintVariant::Exact(e)] => Some(&e.value),
            _ => None,
        }
    }

    /// Whether this holds exactly one exact variant
    pub fn is_single_exact(&self) -> bool {
        self.single_exact().is_some()
    }

    /// The literal if this is an untyped single exact value
    pub fn single_undefined_exact_value(&self) -> Option<&str> {
        if self.base_type == SemanticType::Undefined {
            self.single_exact()
        } else {
            None
        }
    }

    /// Whether this is an untyped single exact value
    pub fn is_single_undefined_exact(&self) -> bool {
        self.single_undefined_exact_value().is_some()
    }

    /// All patterns compile and all range bounds parse in the declared type
    pub fn is_valid(&self) -> bool {
        self.accepted().iter().all(|v| match v {
            ConstraintVariant::Exact(_) => true,
            ConstraintVariant::Pattern(p) => p.is_valid_pattern(),
            ConstraintVariant::Range(r) => {
                self.base_type == SemanticType::Undefined || r.bounds_parse(self.base_type)
            }
        })
    }

    /// Case-sensitive satisfaction
    pub fn is_satisfied_by(&self, candidate: &Value) -> bool {
        self.evaluate(candidate, false)
    }

    /// Accent and case insensitive satisfaction (text comparisons only)
    pub fn is_satisfied_ignoring_case_by(&self, candidate: &Value) -> bool {
        self.evaluate(candidate, true)
    }

    /// Satisfaction with the case mode chosen by the caller
    pub fn is_satisfied_by_with_case(&self, candidate: &Value, ignore_case: bool) -> bool {
        self.evaluate(candidate, ignore_case)
    }

    /// Satisfaction of an optional candidate; absence only satisfies an empty constraint
    pub fn is_satisfied_by_option(&self, candidate: Option<&Value>) -> bool {
        match candidate {
            Some(v) => self.is_satisfied_by(v),
            None => self.is_empty(),
        }
    }

    fn evaluate(&self, candidate: &Value, ignore_case: bool) -> bool {
        let coerced = match candidate.coerce(self.base_type) {
            Some(v) => v,
            None => return false,
        };
        let accepted = self.accepted();
        if accepted.is_empty() {
            return true;
        }
        // text coerced to decimal compares by value only
        let ctx = MatchContext {
            base: self.base_type,
            ignore_case,
            strict_scale: candidate.semantic_type() == SemanticType::Decimal,
        };
        accepted.iter().any(|v| v.is_satisfied_by(&coerced, &ctx))
    }
}

impl PartialEq for ValueConstraint {
    /// Type equality plus multiset equality of accepted variants
    fn eq(&self, other: &Self) -> bool {
        if self.base_type != other.base_type {
            return false;
        }
        match (&self.accepted_values, &other.accepted_values) {
            (None, None) => true,
            (Some(a), Some(b)) => multiset_eq(a, b),
            _ => false,
        }
    }
}

impl Eq for ValueConstraint {}

fn multiset_eq<T: PartialEq>(a: &[T], b: &[T]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    let mut used = vec![false; b.len()];
    a.iter().all(|item| {
        match b
            .iter()
            .enumerate()
            .position(|(i, other)| !used[i] && other == item)
        {
            Some(i) => {
                used[i] = true;
                true
            }
            None => false,
        }
    })
}

impl fmt::Display for ValueConstraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let accepted = self.accepted();
        if accepted.is_empty() {
            return write!(f, "{}", self.base_type);
        }
        let joined: Vec<String> = accepted.iter().map(|v| v.to_string()).collect();
        write!(f, "{}:{}", self.base_type, joined.join(","))
    }
}

impl From<&str> for ValueConstraint {
    fn from(value: &str) -> Self {
        Self::exact(SemanticType::String, value)
    }
}

impl From<String> for ValueConstraint {
    fn from(value: String) -> Self {
        Self::exact(SemanticType::String, value)
    }
}

impl From<i64> for ValueConstraint {
    fn from(value: i64) -> Self {
        Self::exact(SemanticType::Integer, value.to_string())
    }
}

impl From<f64> for ValueConstraint {
    fn from(value: f64) -> Self {
        Self::exact(SemanticType::Double, value.to_string())
    }
}

impl From<Decimal> for ValueConstraint {
    fn from(value: Decimal) -> Self {
        Self::exact(SemanticType::Decimal, value.to_string())
    }
}
