//! # idspec
//!
//! Authoring, evaluation and exchange of information delivery
//! specifications (IDS) for building models.
//!
//! A specification selects model elements through applicability facets and
//! states the facets those elements must also satisfy, together with how
//! many of them are expected. Specifications are grouped into documents and
//! documents into an [`Ids`] container.
//!
//! ## Features
//!
//! - Typed value constraints with numeric tolerance and accent-insensitive
//!   string comparison
//! - Entity, attribute, property, classification, material and part-of facets
//! - Built-in IFC2X3 and IFC4 class hierarchies for schema-aware validation
//! - Import and export of buildingSMART IDS 0.9 XML, zip packages for
//!   several documents
//! - JSON persistence keeping shared facet groups shared
//!
//! ## Example
//!
//! ```rust,ignore
//! use idspec::{ElementDescriptor, ImportConfig};
//!
//! let ids = idspec::io::import_file("walls.ids", &ImportConfig::default())?;
//! let elements = vec![ElementDescriptor::new("IfcWall").with_attribute("Name", "W-01")];
//! for outcome in ids.evaluate(&elements) {
//!     println!("{}: {:?}", outcome.name, outcome.status);
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

// Foundation
pub mod error;
pub mod limits;
pub mod config;
pub mod text;

// Values and cardinality
pub mod values;
pub mod cardinality;

// Schema graph
pub mod schema;

// Facets and specifications
pub mod facets;
pub mod specification;

// External formats
pub mod io;

// Re-exports for convenience
pub use cardinality::{Cardinality, MinMaxCardinality, SimpleCardinality};
pub use config::{ExportConfig, ImportConfig};
pub use error::{Error, Result, SchemaViolation};
pub use facets::{
    AttributeFacet, CandidateElement, ClassificationFacet, ElementDescriptor, EntityFacet, Facet,
    FacetGroup, MaterialFacet, PartOfEntity, PartOfFacet, PropertyFacet, SharedFacetGroup,
};
pub use io::{ExportedFormat, XmlElementSummary};
pub use limits::Limits;
pub use schema::{IfcSchemaVersion, MeasureInfo, SchemaInfo};
pub use specification::{
    GroupInfo, Ids, SchemaLocation, Severity, Specification, SpecificationOutcome, SpecificationStatus,
    SpecificationsGroup, ValidationIssue,
};
pub use values::{SemanticType, Value, ValueConstraint};

/// Version of the idspec library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
