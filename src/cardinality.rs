//! Specification cardinality
//!
//! How many applicable elements a specification expects: either one of the
//! three named forms or explicit occurrence bounds. `None` as maximum means
//! unbounded.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Named cardinalities
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SimpleCardinality {
    /// Zero or more (0, unbounded)
    Optional,
    /// One or more (1, unbounded)
    Required,
    /// None at all (0, 0)
    Prohibited,
}

/// Explicit occurrence bounds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MinMaxCardinality {
    /// Minimum number of occurrences
    pub min_occurs: u32,
    /// Maximum number of occurrences (None = unbounded)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_occurs: Option<u32>,
}

impl MinMaxCardinality {
    /// Create new occurrence bounds
    pub fn new(min_occurs: u32, max_occurs: Option<u32>) -> Self {
        Self {
            min_occurs,
            max_occurs,
        }
    }
}

impl Default for MinMaxCardinality {
    fn default() -> Self {
        Self::new(0, None)
    }
}

/// Cardinality of a specification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Cardinality {
    /// A named form
    Simple {
        /// The named cardinality
        value: SimpleCardinality,
    },
    /// Explicit bounds
    MinMax(MinMaxCardinality),
}

impl Default for Cardinality {
    fn default() -> Self {
        Cardinality::required()
    }
}

impl Cardinality {
    /// (1, unbounded)
    pub fn required() -> Self {
        Cardinality::Simple {
            value: SimpleCardinality::Required,
        }
    }

    /// (0, unbounded)
    pub fn optional() -> Self {
        Cardinality::Simple {
            value: SimpleCardinality::Optional,
        }
    }

    /// (0, 0)
    pub fn prohibited() -> Self {
        Cardinality::Simple {
            value: SimpleCardinality::Prohibited,
        }
    }

    /// Explicit bounds
    pub fn min_max(min_occurs: u32, max_occurs: Option<u32>) -> Self {
        Cardinality::MinMax(MinMaxCardinality::new(min_occurs, max_occurs))
    }

    /// Minimum number of occurrences
    pub fn min_occurs(&self) -> u32 {
        match self {
            Cardinality::Simple {
                value: SimpleCardinality::Required,
            } => 1,
            Cardinality::Simple { .. } => 0,
            Cardinality::MinMax(m) => m.min_occurs,
        }
    }

    /// Maximum number of occurrences, `None` when unbounded
    pub fn max_occurs(&self) -> Option<u32> {
        match self {
            Cardinality::Simple {
                value: SimpleCardinality::Prohibited,
            } => Some(0),
            Cardinality::Simple { .. } => None,
            Cardinality::MinMax(m) => m.max_occurs,
        }
    }

    /// Bounds are consistent (max >= min)
    pub fn is_valid(&self) -> bool {
        self.max_occurs().map_or(true, |max| max >= self.min_occurs())
    }

    /// Whether `count` occurrences are allowed
    pub fn allows(&self, count: u32) -> bool {
        count >= self.min_occurs() && self.max_occurs().map_or(true, |max| count <= max)
    }

    /// Reduce explicit bounds to a named form where one exists
    pub fn simplify(&self) -> Cardinality {
        match self {
            Cardinality::MinMax(m) => match (m.min_occurs, m.max_occurs) {
                (0, None) => Cardinality::optional(),
                (1, None) => Cardinality::required(),
                (0, Some(0)) => Cardinality::prohibited(),
                _ => *self,
            },
            simple => *simple,
        }
    }

    /// Same occurrence bounds, whatever the representation
    pub fn equivalent(&self, other: &Cardinality) -> bool {
        self.min_occurs() == other.min_occurs() && self.max_occurs() == other.max_occurs()
    }

    /// Always the explicit form
    pub fn to_min_max(&self) -> MinMaxCardinality {
        MinMaxCardinality::new(self.min_occurs(), self.max_occurs())
    }
}

impl fmt::Display for Cardinality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cardinality::Simple { value } => write!(f, "{:?}", value),
            Cardinality::MinMax(m) => match m.max_occurs {
                Some(max) => write!(f, "{}..{}", m.min_occurs, max),
                None => write!(f, "{}..unbounded", m.min_occurs),
            },
        }
    }
}
