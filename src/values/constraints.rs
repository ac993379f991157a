//! Constraint variants
//!
//! Each accepted value of a [`ValueConstraint`](super::ValueConstraint) is one
//! of three strategies: an exact literal, a pattern, or a range. Literals are
//! kept as authored text and interpreted in the constraint's type at match
//! time, so a constraint can be re-typed without re-authoring its values.

use super::types::SemanticType;
use super::value::{approx_eq, Value};
use crate::text;
use log::debug;
use once_cell::sync::OnceCell;
use regex::{Regex, RegexBuilder};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;

/// Evaluation settings shared by all variants of one constraint
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MatchContext {
    /// Declared type of the owning constraint
    pub base: SemanticType,
    /// Fold accents and case for text comparisons
    pub ignore_case: bool,
    /// Compare decimal scale as well as value
    pub strict_scale: bool,
}

impl MatchContext {
    /// Type the literal is interpreted in for this candidate
    fn literal_type(&self, candidate: &Value) -> SemanticType {
        match self.base {
            SemanticType::Undefined => candidate.semantic_type(),
            base => base,
        }
    }
}

/// A single accepted literal
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ExactConstraint {
    /// Literal as authored
    pub value: String,
}

impl ExactConstraint {
    /// Create a new exact constraint
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
        }
    }

    /// Check a coerced candidate against the literal
    pub fn is_satisfied_by(&self, candidate: &Value, ctx: &MatchContext) -> bool {
        let ty = ctx.literal_type(candidate);
        match Value::parse(&self.value, ty) {
            Some(Value::String(expected)) => {
                text_equal(&candidate.to_string(), &expected, ctx.ignore_case)
            }
            Some(expected) => values_equal(candidate, &expected, ctx.strict_scale),
            None if ctx.base == SemanticType::Undefined => {
                // literal is not of the candidate's type: numeric widening, then text
                match (candidate.as_f64(), Value::parse(&self.value, SemanticType::Double)) {
                    (Some(c), Some(Value::Double(e))) => approx_eq(c, e),
                    _ => text_equal(&candidate.to_string(), &self.value, ctx.ignore_case),
                }
            }
            None => false,
        }
    }
}

impl fmt::Display for ExactConstraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.value)
    }
}

/// A regular expression with XSD semantics (anchored to the whole value)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PatternConstraint {
    pattern: String,
    #[serde(skip)]
    compiled: OnceCell<Result<Regex, String>>,
    #[serde(skip)]
    compiled_folded: OnceCell<Option<Regex>>,
}

impl PatternConstraint {
    /// Create a new pattern constraint; compilation is deferred to first use
    pub fn new(pattern: impl Into<String>) -> Self {
        Self {
            pattern: pattern.into(),
            ..Default::default()
        }
    }

    /// Source pattern
    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    /// Replace the source pattern, discarding compiled state
    pub fn set_pattern(&mut self, pattern: impl Into<String>) {
        self.pattern = pattern.into();
        self.compiled.take();
        self.compiled_folded.take();
    }

    fn anchored(&self) -> String {
        format!("^(?:{})$", self.pattern)
    }

    fn regex(&self) -> Option<&Regex> {
        self.compiled
            .get_or_init(|| {
                Regex::new(&self.anchored()).map_err(|e| {
                    debug!(pattern = self.pattern.as_str(); "pattern does not compile");
                    e.to_string()
                })
            })
            .as_ref()
            .ok()
    }

    /// Case-insensitive regex of the pattern with accents removed
    fn regex_folded(&self) -> Option<&Regex> {
        self.compiled_folded
            .get_or_init(|| {
                let folded = format!("^(?:{})$", text::strip_accents(&self.pattern));
                RegexBuilder::new(&folded).case_insensitive(true).build().ok()
            })
            .as_ref()
    }

    /// Whether the pattern compiles
    pub fn is_valid_pattern(&self) -> bool {
        self.regex().is_some()
    }

    /// Compile error message, if any
    pub fn pattern_error(&self) -> Option<&str> {
        self.regex();
        self.compiled.get().and_then(|r| r.as_ref().err()).map(String::as_str)
    }

    /// Match the text form of a coerced candidate; broken patterns never match
    pub fn is_satisfied_by(&self, candidate: &Value, ctx: &MatchContext) -> bool {
        let text = candidate.to_string();
        if ctx.ignore_case {
            // both sides folded; broken patterns stay broken
            self.is_valid_pattern()
                && self
                    .regex_folded()
                    .map_or(false, |re| re.is_match(&text::fold(&text)))
        } else {
            self.regex().map_or(false, |re| re.is_match(&text))
        }
    }
}

impl PartialEq for PatternConstraint {
    fn eq(&self, other: &Self) -> bool {
        self.pattern == other.pattern
    }
}

impl Eq for PatternConstraint {}

impl fmt::Display for PatternConstraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Pattern:{}", self.pattern)
    }
}

/// A bounded interval; an absent bound is unbounded on that side
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RangeConstraint {
    /// Lower bound literal
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_value: Option<String>,
    /// Whether the lower bound is included
    #[serde(default)]
    pub min_inclusive: bool,
    /// Upper bound literal
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_value: Option<String>,
    /// Whether the upper bound is included
    #[serde(default)]
    pub max_inclusive: bool,
}

impl RangeConstraint {
    /// Create a range with both bounds
    pub fn new(
        min_value: impl Into<String>,
        min_inclusive: bool,
        max_value: impl Into<String>,
        max_inclusive: bool,
    ) -> Self {
        Self {
            min_value: Some(min_value.into()),
            min_inclusive,
            max_value: Some(max_value.into()),
            max_inclusive,
        }
    }

    /// Lower bound only
    pub fn at_least(min_value: impl Into<String>, inclusive: bool) -> Self {
        Self {
            min_value: Some(min_value.into()),
            min_inclusive: inclusive,
            ..Default::default()
        }
    }

    /// Upper bound only
    pub fn at_most(max_value: impl Into<String>, inclusive: bool) -> Self {
        Self {
            max_value: Some(max_value.into()),
            max_inclusive: inclusive,
            ..Default::default()
        }
    }

    /// Neither bound is present
    pub fn is_unbounded(&self) -> bool {
        self.min_value.is_none() && self.max_value.is_none()
    }

    /// Whether both present bounds parse in `ty`
    pub fn bounds_parse(&self, ty: SemanticType) -> bool {
        let parses = |b: &Option<String>| b.as_ref().map_or(true, |s| Value::parse(s, ty).is_some());
        parses(&self.min_value) && parses(&self.max_value)
    }

    /// Check a coerced candidate against both bounds
    pub fn is_satisfied_by(&self, candidate: &Value, ctx: &MatchContext) -> bool {
        // untyped numeric ranges are compared as doubles
        let widened;
        let (cand, ty) = match (ctx.base, candidate.as_f64()) {
            (SemanticType::Undefined, Some(f)) => {
                widened = Value::Double(f);
                (&widened, SemanticType::Double)
            }
            _ => (candidate, ctx.literal_type(candidate)),
        };

        let within = |bound: &Option<String>, inclusive: bool, wanted: Ordering| match bound {
            None => true,
            Some(literal) => match Value::parse(literal, ty).and_then(|b| cand.compare(&b)) {
                Some(Ordering::Equal) => inclusive,
                Some(o) => o == wanted,
                None => false,
            },
        };

        within(&self.min_value, self.min_inclusive, Ordering::Greater)
            && within(&self.max_value, self.max_inclusive, Ordering::Less)
    }
}

impl fmt::Display for RangeConstraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let open = if self.min_inclusive { '[' } else { '(' };
        let close = if self.max_inclusive { ']' } else { ')' };
        write!(
            f,
            "Range:{}{},{}{}",
            open,
            self.min_value.as_deref().unwrap_or("-inf"),
            self.max_value.as_deref().unwrap_or("inf"),
            close
        )
    }
}

/// One accepted value strategy
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ConstraintVariant {
    /// Exact literal
    Exact(ExactConstraint),
    /// Regular expression
    Pattern(PatternConstraint),
    /// Interval
    Range(RangeConstraint),
}

impl ConstraintVariant {
    /// Check a coerced candidate against this variant
    pub fn is_satisfied_by(&self, candidate: &Value, ctx: &MatchContext) -> bool {
        match self {
            ConstraintVariant::Exact(c) => c.is_satisfied_by(candidate, ctx),
            ConstraintVariant::Pattern(c) => c.is_satisfied_by(candidate, ctx),
            ConstraintVariant::Range(c) => c.is_satisfied_by(candidate, ctx),
        }
    }
}

impl fmt::Display for ConstraintVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConstraintVariant::Exact(c) => c.fmt(f),
            ConstraintVariant::Pattern(c) => c.fmt(f),
            ConstraintVariant::Range(c) => c.fmt(f),
        }
    }
}

impl From<ExactConstraint> for ConstraintVariant {
    fn from(c: ExactConstraint) -> Self {
        ConstraintVariant::Exact(c)
    }
}

impl From<PatternConstraint> for ConstraintVariant {
    fn from(c: PatternConstraint) -> Self {
        ConstraintVariant::Pattern(c)
    }
}

impl From<RangeConstraint> for ConstraintVariant {
    fn from(c: RangeConstraint) -> Self {
        ConstraintVariant::Range(c)
    }
}

fn text_equal(candidate: &str, expected: &str, ignore_case: bool) -> bool {
    if ignore_case {
        text::eq_folded(candidate, expected)
    } else {
        candidate == expected
    }
}

fn values_equal(candidate: &Value, expected: &Value, strict_scale: bool) -> bool {
    match (candidate, expected) {
        (Value::Floating(a), Value::Floating(b)) => approx_eq(*a as f64, *b as f64),
        (Value::Double(a), Value::Double(b)) => approx_eq(*a, *b),
        (Value::Decimal(a), Value::Decimal(b)) => {
            a == b && (!strict_scale || a.scale() == b.scale())
        }
        (a, b) => a == b,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ctx(base: SemanticType) -> MatchContext {
        MatchContext {
            base,
            ignore_case: false,
            strict_scale: false,
        }
    }

    #[test]
    fn test_exact_typed() {
        let c = ExactConstraint::new("30");
        assert!(c.is_satisfied_by(&Value::Integer(30), &ctx(SemanticType::Integer)));
        assert!(!c.is_satisfied_by(&Value::Integer(31), &ctx(SemanticType::Integer)));
    }

    #[test]
    fn test_exact_undefined_widens_numeric() {
        let c = ExactConstraint::new("42.0");
        assert!(c.is_satisfied_by(&Value::Integer(42), &ctx(SemanticType::Undefined)));
        assert!(c.is_satisfied_by(&Value::Double(42.0), &ctx(SemanticType::Undefined)));
    }

    #[test]
    fn test_pattern_is_anchored() {
        let p = PatternConstraint::new(r"\d{3}");
        assert!(p.is_satisfied_by(&Value::from("123"), &ctx(SemanticType::String)));
        assert!(!p.is_satisfied_by(&Value::from("1234"), &ctx(SemanticType::String)));
    }

    #[test]
    fn test_pattern_ignoring_case_folds_both_sides() {
        let p = PatternConstraint::new("RÉNOV.*");
        let folding = MatchContext {
            ignore_case: true,
            ..ctx(SemanticType::String)
        };
        assert!(p.is_satisfied_by(&Value::from("renover"), &folding));
        assert!(!p.is_satisfied_by(&Value::from("à rénover"), &folding));
        assert!(p.is_satisfied_by(&Value::from("Rénovation"), &folding));
        assert!(!p.is_satisfied_by(&Value::from("renover"), &ctx(SemanticType::String)));

        let digits = PatternConstraint::new(r"\D+");
        assert!(digits.is_satisfied_by(&Value::from("ÉTÉ"), &folding));
        assert!(!digits.is_satisfied_by(&Value::from("123"), &folding));
    }

    #[test]
    fn test_invalid_pattern_never_matches() {
        let p = PatternConstraint::new("([a-z");
        assert!(!p.is_valid_pattern());
        assert!(p.pattern_error().is_some());
        assert!(!p.is_satisfied_by(&Value::from("([a-z"), &ctx(SemanticType::String)));
    }

    #[test]
    fn test_set_pattern_recompiles() {
        let mut p = PatternConstraint::new("([a-z");
        assert!(!p.is_valid_pattern());
        p.set_pattern("[a-z]+");
        assert!(p.is_valid_pattern());
        assert!(p.is_satisfied_by(&Value::from("abc"), &ctx(SemanticType::String)));
    }

    #[test]
    fn test_range_open_sides() {
        let r = RangeConstraint::at_least("10", false);
        assert!(r.is_satisfied_by(&Value::Double(10.5), &ctx(SemanticType::Double)));
        assert!(!r.is_satisfied_by(&Value::Double(10.0), &ctx(SemanticType::Double)));

        let r = RangeConstraint::at_most("2024-01-01", true);
        let d = Value::parse("2023-12-31", SemanticType::Date).unwrap();
        assert!(r.is_satisfied_by(&d, &ctx(SemanticType::Date)));
    }

    #[test]
    fn test_range_unparseable_bound() {
        let r = RangeConstraint::new("low", true, "10", true);
        assert!(!r.bounds_parse(SemanticType::Double));
        assert!(!r.is_satisfied_by(&Value::Double(5.0), &ctx(SemanticType::Double)));
    }

    #[test]
    fn test_variant_equality() {
        let a: ConstraintVariant = PatternConstraint::new("a+").into();
        let b: ConstraintVariant = PatternConstraint::new("a+").into();
        let c: ConstraintVariant = ExactConstraint::new("a+").into();
        assert_eq!(a, b);
        assert_ne!(a, c);
    }
}
