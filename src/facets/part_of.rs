//! PartOf facet: membership in an aggregate, group or system
//!
//! By convention this facet belongs on the requirement side of a
//! specification. Nothing rejects it in applicability; see
//! `Specification::policy_warnings`.

use super::candidate::CandidateElement;
use crate::schema::SchemaInfo;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Container kinds an element can be part of
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PartOfEntity {
    /// Aggregation into an assembly
    IfcElementAssembly,
    /// Grouping
    IfcGroup,
    /// Assignment to a system
    IfcSystem,
}

impl PartOfEntity {
    /// All container kinds
    pub const ALL: [PartOfEntity; 3] = [
        PartOfEntity::IfcElementAssembly,
        PartOfEntity::IfcGroup,
        PartOfEntity::IfcSystem,
    ];

    /// Class name of the container kind
    pub fn as_str(&self) -> &'static str {
        match self {
            PartOfEntity::IfcElementAssembly => "IfcElementAssembly",
            PartOfEntity::IfcGroup => "IfcGroup",
            PartOfEntity::IfcSystem => "IfcSystem",
        }
    }

    /// Parse a container kind, ignoring case
    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|k| k.as_str().eq_ignore_ascii_case(s.trim()))
    }
}

impl fmt::Display for PartOfEntity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Matches elements contained in a kind of container
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PartOfFacet {
    /// Container kind as authored
    pub entity: String,
}

impl PartOfFacet {
    /// Facet for a container kind
    pub fn new(entity: PartOfEntity) -> Self {
        Self {
            entity: entity.as_str().to_string(),
        }
    }

    /// Parsed container kind
    pub fn kind(&self) -> Option<PartOfEntity> {
        PartOfEntity::parse(&self.entity)
    }

    /// Whether one of the element's containers is of this kind
    pub fn matches(&self, candidate: &dyn CandidateElement, schema: &SchemaInfo) -> bool {
        let Some(kind) = self.kind() else {
            return false;
        };
        candidate
            .containers()
            .iter()
            .any(|container| schema.is_a(container, kind.as_str()))
    }

    /// Problems found against the schema
    pub fn validation_messages(&self, schema: &SchemaInfo) -> Vec<String> {
        match self.kind() {
            None => vec![format!(
                "'{}' is not a container kind (expected one of IfcElementAssembly, IfcGroup, IfcSystem)",
                self.entity
            )],
            Some(kind) if !schema.contains(kind.as_str()) => {
                vec![format!("'{}' is not known to the schema", kind)]
            }
            Some(_) => Vec::new(),
        }
    }

    /// Short description
    pub fn short(&self) -> String {
        format!("part of {}", self.entity)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::facets::ElementDescriptor;
    use crate::schema::IfcSchemaVersion;

    fn schema() -> &'static SchemaInfo {
        SchemaInfo::for_version(IfcSchemaVersion::Ifc4)
    }

    #[test]
    fn test_parse_is_case_insensitive() {
        assert_eq!(PartOfEntity::parse("ifcgroup"), Some(PartOfEntity::IfcGroup));
        assert_eq!(PartOfEntity::parse("IFCSYSTEM"), Some(PartOfEntity::IfcSystem));
        assert_eq!(PartOfEntity::parse("IfcBuilding"), None);
    }

    #[test]
    fn test_subtype_containers_match() {
        let facet = PartOfFacet::new(PartOfEntity::IfcGroup);
        let in_system = ElementDescriptor::new("IfcDuctSegment").with_container("IfcDistributionSystem");
        assert!(facet.matches(&in_system, schema()));
        assert!(PartOfFacet::new(PartOfEntity::IfcSystem).matches(&in_system, schema()));
        assert!(!PartOfFacet::new(PartOfEntity::IfcElementAssembly).matches(&in_system, schema()));
        assert!(!facet.matches(&ElementDescriptor::new("IfcWall"), schema()));
    }

    #[test]
    fn test_validity() {
        assert!(PartOfFacet::new(PartOfEntity::IfcSystem)
            .validation_messages(schema())
            .is_empty());
        let bad = PartOfFacet {
            entity: "IfcBuilding".into(),
        };
        assert_eq!(bad.validation_messages(schema()).len(), 1);
        assert!(!bad.matches(&ElementDescriptor::new("IfcWall").with_container("IfcBuilding"), schema()));
    }
}
