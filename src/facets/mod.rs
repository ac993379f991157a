//! Facets
//!
//! A facet is one matchable condition on a model element: its class, an
//! attribute, a property, a classification, a material or the container it
//! belongs to. Facets are grouped into [`FacetGroup`]s whose members are
//! combined with logical AND; an empty group matches every element.
//!
//! Groups are shared between specifications through [`SharedFacetGroup`]
//! handles, so authoring one applicability block and reusing it in several
//! specifications keeps a single instance.

pub mod attribute;
pub mod candidate;
pub mod classification;
pub mod entity;
pub mod material;
pub mod part_of;
pub mod property;

pub use attribute::AttributeFacet;
pub use candidate::{CandidateElement, ClassificationReference, ElementDescriptor, PropertyValue};
pub use classification::ClassificationFacet;
pub use entity::EntityFacet;
pub use material::MaterialFacet;
pub use part_of::{PartOfEntity, PartOfFacet};
pub use property::PropertyFacet;

use crate::schema::SchemaInfo;
use crate::values::ValueConstraint;
use serde::{Deserialize, Serialize};
use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

/// Any facet
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Facet {
    /// Class (and predefined type) of the element
    Entity(EntityFacet),
    /// Attribute value
    Attribute(AttributeFacet),
    /// Property value in a property set
    Property(PropertyFacet),
    /// Classification reference
    Classification(ClassificationFacet),
    /// Material
    Material(MaterialFacet),
    /// Membership in an aggregate, group or system
    PartOf(PartOfFacet),
}

impl Facet {
    /// Local name of the XML element encoding this facet
    pub fn element_name(&self) -> &'static str {
        match self {
            Facet::Entity(_) => "entity",
            Facet::Attribute(_) => "attribute",
            Facet::Property(_) => "property",
            Facet::Classification(_) => "classification",
            Facet::Material(_) => "material",
            Facet::PartOf(_) => "partOf",
        }
    }

    /// Whether the element satisfies this facet
    pub fn matches(&self, candidate: &dyn CandidateElement, schema: &SchemaInfo) -> bool {
        match self {
            Facet::Entity(f) => f.matches(candidate, schema),
            Facet::Attribute(f) => f.matches(candidate),
            Facet::Property(f) => f.matches(candidate),
            Facet::Classification(f) => f.matches(candidate),
            Facet::Material(f) => f.matches(candidate),
            Facet::PartOf(f) => f.matches(candidate, schema),
        }
    }

    /// Problems found when checking the facet against a schema
    pub fn validation_messages(&self, schema: &SchemaInfo) -> Vec<String> {
        match self {
            Facet::Entity(f) => f.validation_messages(schema),
            Facet::Attribute(f) => f.validation_messages(schema),
            Facet::Property(f) => f.validation_messages(),
            Facet::Classification(f) => f.validation_messages(),
            Facet::Material(f) => f.validation_messages(),
            Facet::PartOf(f) => f.validation_messages(schema),
        }
    }

    /// Whether the facet is well formed for the schema
    pub fn is_valid(&self, schema: &SchemaInfo) -> bool {
        self.validation_messages(schema).is_empty()
    }

    /// Value constraints held by the facet, in element order
    pub fn value_constraints(&self) -> Vec<&ValueConstraint> {
        match self {
            Facet::Entity(f) => std::iter::once(&f.name).chain(&f.predefined_type).collect(),
            Facet::Attribute(f) => std::iter::once(&f.name).chain(&f.value).collect(),
            Facet::Property(f) => [&f.property_set, &f.name]
                .into_iter()
                .chain(&f.value)
                .collect(),
            Facet::Classification(f) => f.value.iter().chain(&f.system).collect(),
            Facet::Material(f) => f.value.iter().collect(),
            Facet::PartOf(_) => Vec::new(),
        }
    }

    /// Short human-readable description
    pub fn short(&self) -> String {
        match self {
            Facet::Entity(f) => f.short(),
            Facet::Attribute(f) => f.short(),
            Facet::Property(f) => f.short(),
            Facet::Classification(f) => f.short(),
            Facet::Material(f) => f.short(),
            Facet::PartOf(f) => f.short(),
        }
    }
}

impl fmt::Display for Facet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.short())
    }
}

macro_rules! facet_from {
    ($($variant:ident($ty:ty)),* $(,)?) => {
        $(
            impl From<$ty> for Facet {
                fn from(facet: $ty) -> Self {
                    Facet::$variant(facet)
                }
            }
        )*
    };
}

facet_from!(
    Entity(EntityFacet),
    Attribute(AttributeFacet),
    Property(PropertyFacet),
    Classification(ClassificationFacet),
    Material(MaterialFacet),
    PartOf(PartOfFacet),
);

/// Ordered facets combined with logical AND
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FacetGroup {
    /// Member facets
    pub facets: Vec<Facet>,
}

/// Facet group shared between specifications
pub type SharedFacetGroup = Rc<RefCell<FacetGroup>>;

impl FacetGroup {
    /// Create an empty group
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a group from facets
    pub fn from_facets(facets: impl IntoIterator<Item = Facet>) -> Self {
        Self {
            facets: facets.into_iter().collect(),
        }
    }

    /// Wrap the group in a shared handle
    pub fn into_shared(self) -> SharedFacetGroup {
        Rc::new(RefCell::new(self))
    }

    /// Append a facet
    pub fn push(&mut self, facet: impl Into<Facet>) {
        self.facets.push(facet.into());
    }

    /// Remove and return the facet at `index`
    pub fn remove(&mut self, index: usize) -> Option<Facet> {
        if index < self.facets.len() {
            Some(self.facets.remove(index))
        } else {
            None
        }
    }

    /// Number of facets
    pub fn len(&self) -> usize {
        self.facets.len()
    }

    /// Whether the group has no facet
    pub fn is_empty(&self) -> bool {
        self.facets.is_empty()
    }

    /// Iterate over the facets
    pub fn iter(&self) -> std::slice::Iter<'_, Facet> {
        self.facets.iter()
    }

    /// Every facet matches; an empty group matches everything
    pub fn matches(&self, candidate: &dyn CandidateElement, schema: &SchemaInfo) -> bool {
        self.facets.iter().all(|f| f.matches(candidate, schema))
    }

    /// Every facet is valid
    pub fn is_valid(&self, schema: &SchemaInfo) -> bool {
        self.facets.iter().all(|f| f.is_valid(schema))
    }

    /// Equal, with every value constraint in the same XML shape
    pub fn is_identical(&self, other: &FacetGroup) -> bool {
        self == other
            && self.facets.iter().zip(&other.facets).all(|(a, b)| {
                let (a, b) = (a.value_constraints(), b.value_constraints());
                a.len() == b.len() && a.iter().zip(&b).all(|(x, y)| x.same_form(y))
            })
    }
}

impl<'a> IntoIterator for &'a FacetGroup {
    type Item = &'a Facet;
    type IntoIter = std::slice::Iter<'a, Facet>;

    fn into_iter(self) -> Self::IntoIter {
        self.facets.iter()
    }
}

/// Human form of a constraint used in facet descriptions
pub(crate) fn describe(constraint: &ValueConstraint) -> String {
    if let Some(literal) = constraint.single_exact() {
        return literal.to_string();
    }
    if constraint.is_empty() {
        return "any".to_string();
    }
    constraint.to_string()
}

/// Validity messages of an owned constraint
pub(crate) fn constraint_messages(label: &str, constraint: &ValueConstraint) -> Vec<String> {
    let mut messages = Vec::new();
    for variant in constraint.accepted() {
        if let crate::values::ConstraintVariant::Pattern(p) = variant {
            if let Some(err) = p.pattern_error() {
                messages.push(format!("{} pattern '{}' is invalid: {}", label, p.pattern(), err));
            }
        }
    }
    if messages.is_empty() && !constraint.is_valid() {
        messages.push(format!("{} has bounds not valid for {}", label, constraint.base_type));
    }
    messages
}

/// Whether a required name constraint has any content
pub(crate) fn is_blank(constraint: &ValueConstraint) -> bool {
    constraint.accepted().is_empty()
        || constraint
            .single_exact()
            .map_or(false, |literal| literal.trim().is_empty())
}
