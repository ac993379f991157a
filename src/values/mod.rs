//! Typed value matching
//!
//! Semantic types, candidate values with their coercion rules, the three
//! constraint variants and the [`ValueConstraint`] container combining them.

pub mod constraint;
pub mod constraints;
pub mod types;
pub mod value;

pub use constraint::{SourceForm, ValueConstraint};
pub use constraints::{
    ConstraintVariant, ExactConstraint, MatchContext, PatternConstraint, RangeConstraint,
};
pub use types::SemanticType;
pub use value::{approx_eq, Value, XsDuration, FLOAT_TOLERANCE};
