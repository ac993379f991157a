//! Semantic type tags
//!
//! The tag drives both the coercion target of a candidate value and the
//! comparison rule used against accepted literals.

use serde::{Deserialize, Serialize};
use std::fmt;

/// XSD namespace prefix used when writing restriction bases
pub const XS_PREFIX: &str = "xs";

/// Semantic type of a value constraint
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum SemanticType {
    /// No declared type; comparison falls back to the candidate's own type
    #[default]
    Undefined,
    /// Text
    String,
    /// Whole number
    Integer,
    /// Single precision floating point
    Floating,
    /// Double precision floating point
    Double,
    /// Exact decimal, trailing zeros significant
    Decimal,
    /// true/false
    Boolean,
    /// Calendar date
    Date,
    /// Date and time of day
    DateTime,
    /// Time of day
    Time,
    /// ISO 8601 duration
    Duration,
    /// URI reference
    Uri,
}

impl SemanticType {
    /// Resolve a restriction base such as `xs:double` (prefix optional).
    /// Unknown names resolve to `Undefined`.
    pub fn from_xsd_name(name: &str) -> Self {
        let local = name.rsplit_once(':').map(|(_, l)| l).unwrap_or(name);
        match local {
            "string" | "normalizedString" | "token" => SemanticType::String,
            "integer" | "int" | "long" | "short" | "byte" | "nonNegativeInteger"
            | "positiveInteger" | "negativeInteger" | "nonPositiveInteger" => {
                SemanticType::Integer
            }
            "float" => SemanticType::Floating,
            "double" => SemanticType::Double,
            "decimal" => SemanticType::Decimal,
            "boolean" => SemanticType::Boolean,
            "date" => SemanticType::Date,
            "dateTime" => SemanticType::DateTime,
            "time" => SemanticType::Time,
            "duration" => SemanticType::Duration,
            "anyURI" => SemanticType::Uri,
            _ => SemanticType::Undefined,
        }
    }

    /// Local XSD type name, `None` for `Undefined`
    pub fn xsd_local_name(&self) -> Option<&'static str> {
        match self {
            SemanticType::Undefined => None,
            SemanticType::String => Some("string"),
            SemanticType::Integer => Some("integer"),
            SemanticType::Floating => Some("float"),
            SemanticType::Double => Some("double"),
            SemanticType::Decimal => Some("decimal"),
            SemanticType::Boolean => Some("boolean"),
            SemanticType::Date => Some("date"),
            SemanticType::DateTime => Some("dateTime"),
            SemanticType::Time => Some("time"),
            SemanticType::Duration => Some("duration"),
            SemanticType::Uri => Some("anyURI"),
        }
    }

    /// Prefixed XSD name (`xs:double`), `None` for `Undefined`
    pub fn xsd_name(&self) -> Option<String> {
        self.xsd_local_name()
            .map(|local| format!("{}:{}", XS_PREFIX, local))
    }
}

impl fmt::Display for SemanticType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SemanticType::Undefined => "Undefined",
            SemanticType::String => "String",
            SemanticType::Integer => "Integer",
            SemanticType::Floating => "Floating",
            SemanticType::Double => "Double",
            SemanticType::Decimal => "Decimal",
            SemanticType::Boolean => "Boolean",
            SemanticType::Date => "Date",
            SemanticType::DateTime => "DateTime",
            SemanticType::Time => "Time",
            SemanticType::Duration => "Duration",
            SemanticType::Uri => "Uri",
        };
        write!(f, "{}", name)
    }
}
