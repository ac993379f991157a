//! Reading IDS documents into the container
//!
//! Applicability and requirement blocks are compared structurally across
//! everything read in one session: identical blocks become one shared
//! facet group, so reuse in the source survives as sharing in memory.
//! Blocks only count as identical when their values are also written in
//! the same XML shape.

use super::conformance::{self, parse_occurrences, parse_xs_date};
use super::document::{self, XmlElement};
use super::values_xml::read_value;
use super::XSI_NAMESPACE;
use crate::cardinality::Cardinality;
use crate::config::ImportConfig;
use crate::error::{Result, SchemaViolation};
use crate::facets::{
    AttributeFacet, ClassificationFacet, EntityFacet, Facet, FacetGroup, MaterialFacet,
    PartOfFacet, PropertyFacet, SharedFacetGroup,
};
use crate::schema::IfcSchemaVersion;
use crate::specification::{GroupInfo, Ids, SchemaLocation, Specification, SpecificationsGroup};
use crate::values::ValueConstraint;
use log::{debug, info};

/// Read a single IDS document into a new container
pub fn import_xml(xml: &[u8], config: &ImportConfig) -> Result<Ids> {
    let mut ids = Ids::with_default_schema(config.default_schema);
    ImportSession::new(config).read_document(xml, &mut ids, None)?;
    Ok(ids)
}

/// Shared state of reading one or more documents into a container
#[derive(Debug)]
pub struct ImportSession<'c> {
    config: &'c ImportConfig,
    applicability: Vec<SharedFacetGroup>,
    requirements: Vec<SharedFacetGroup>,
}

impl<'c> ImportSession<'c> {
    /// Start a session
    pub fn new(config: &'c ImportConfig) -> Self {
        Self {
            config,
            applicability: Vec::new(),
            requirements: Vec::new(),
        }
    }

    /// Read one document as a new group of `ids`; returns the group index
    pub fn read_document(
        &mut self,
        xml: &[u8],
        ids: &mut Ids,
        source_file: Option<String>,
    ) -> Result<usize> {
        let root = document::parse(xml, &self.config.limits)?;
        conformance::check(&root, self.config)?;

        let mut group = SpecificationsGroup::new("");
        group.source_file = source_file;
        group.schema_location = match root.attribute_ns(XSI_NAMESPACE, "schemaLocation") {
            Some(location) => SchemaLocation::Declared(location.to_string()),
            None => SchemaLocation::Absent,
        };
        if let Some(info_el) = root.child("info") {
            read_info(info_el, &mut group);
        }
        if let Some(specs) = root.child("specifications") {
            for el in specs.children_named("specification") {
                let spec = self.read_specification(el)?;
                group.specifications.push(spec);
            }
        }
        info!(
            title = group.name.as_str(),
            specifications = group.specifications.len();
            "IDS document read"
        );
        Ok(ids.add_group(group))
    }

    /// Number of distinct applicability blocks seen
    pub fn distinct_applicability(&self) -> usize {
        self.applicability.len()
    }

    /// Number of distinct requirement blocks seen
    pub fn distinct_requirements(&self) -> usize {
        self.requirements.len()
    }

    fn read_specification(&mut self, el: &XmlElement) -> Result<Specification> {
        let mut spec = Specification::new(el.attribute("name").unwrap_or_default());
        spec.identifier = el.attribute("identifier").map(str::to_string);
        spec.description = el.attribute("description").map(str::to_string);
        spec.instructions = el.attribute("instructions").map(str::to_string);
        for token in el.attribute("ifcVersion").unwrap_or_default().split_whitespace() {
            if let Some(version) = IfcSchemaVersion::from_token(token) {
                if !spec.ifc_versions.contains(&version) {
                    spec.ifc_versions.push(version);
                }
            }
        }
        let (min, max) = parse_occurrences(el).map_err(|reason| {
            SchemaViolation::new("invalid occurrence").with_reason(reason)
        })?;
        spec.cardinality = Cardinality::min_max(min, max).simplify();

        if let Some(block) = el.child("applicability") {
            let group = read_block(block);
            spec.applicability = share(&mut self.applicability, group);
        }
        if let Some(block) = el.child("requirements") {
            let group = read_block(block);
            spec.requirements = share(&mut self.requirements, group);
        }
        Ok(spec)
    }
}

fn share(repository: &mut Vec<SharedFacetGroup>, group: FacetGroup) -> SharedFacetGroup {
    if let Some(existing) = repository.iter().find(|g| g.borrow().is_identical(&group)) {
        debug!(facets = group.len(); "reusing identical facet block");
        return existing.clone();
    }
    let shared = group.into_shared();
    repository.push(shared.clone());
    shared
}

fn read_info(el: &XmlElement, group: &mut SpecificationsGroup) {
    let text = |name: &str| el.child(name).map(|c| c.text().to_string());
    group.name = text("title").unwrap_or_default();
    group.info = GroupInfo {
        copyright: text("copyright"),
        version: text("version"),
        description: text("description"),
        author: text("author"),
        date: el.child("date").and_then(|d| parse_xs_date(d.text())),
        purpose: text("purpose"),
        milestone: text("milestone"),
    };
}

fn read_block(el: &XmlElement) -> FacetGroup {
    FacetGroup::from_facets(el.children.iter().filter_map(read_facet))
}

fn value_of(el: &XmlElement, name: &str) -> Option<ValueConstraint> {
    el.child(name).map(read_value)
}

fn text_attribute(el: &XmlElement, name: &str) -> Option<String> {
    el.attribute(name).map(str::to_string)
}

fn read_facet(el: &XmlElement) -> Option<Facet> {
    let uri = text_attribute(el, "uri");
    let instructions = text_attribute(el, "instructions");
    let facet = match el.name.as_str() {
        "entity" => Facet::Entity(EntityFacet {
            name: value_of(el, "name").unwrap_or_default(),
            predefined_type: value_of(el, "predefinedType"),
            include_subtypes: false,
            uri,
            instructions,
        }),
        "attribute" => Facet::Attribute(AttributeFacet {
            name: value_of(el, "name").unwrap_or_default(),
            value: value_of(el, "value"),
            uri,
            instructions,
        }),
        "property" => Facet::Property(PropertyFacet {
            property_set: value_of(el, "propertySet").unwrap_or_default(),
            name: value_of(el, "name").unwrap_or_default(),
            value: value_of(el, "value"),
            data_type: text_attribute(el, "dataType"),
            uri,
            instructions,
        }),
        "classification" => Facet::Classification(ClassificationFacet {
            value: value_of(el, "value"),
            system: value_of(el, "system"),
            uri,
            instructions,
        }),
        "material" => Facet::Material(MaterialFacet {
            value: value_of(el, "value"),
            uri,
            instructions,
        }),
        "partOf" => Facet::PartOf(PartOfFacet {
            entity: el.attribute("entity").unwrap_or_default().to_string(),
        }),
        _ => return None,
    };
    Some(facet)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use std::rc::Rc;

    const DOC: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<ids xmlns="http://standards.buildingsmart.org/IDS" xmlns:xs="http://www.w3.org/2001/XMLSchema">
  <info><title>Walls</title><author>bim@example.com</author><date>2024-02-01</date></info>
  <specifications>
    <specification name="named walls" ifcVersion="IFC2X3 IFC4" minOccurs="0" maxOccurs="unbounded" identifier="W1">
      <applicability><entity><name><simpleValue>IFCWALL</simpleValue></name></entity></applicability>
      <requirements><attribute><name><simpleValue>Name</simpleValue></name></attribute></requirements>
    </specification>
    <specification name="tagged walls" ifcVersion="IFC4" minOccurs="1" maxOccurs="unbounded">
      <applicability><entity><name><simpleValue>IFCWALL</simpleValue></name></entity></applicability>
      <requirements><attribute instructions="tag it"><name><simpleValue>Tag</simpleValue></name></attribute></requirements>
    </specification>
  </specifications>
</ids>"#;

    #[test]
    fn test_read_document() {
        let ids = import_xml(DOC.as_bytes(), &ImportConfig::default()).unwrap();
        assert_eq!(ids.groups.len(), 1);
        let group = &ids.groups[0];
        assert_eq!(group.name, "Walls");
        assert_eq!(group.info.author.as_deref(), Some("bim@example.com"));
        assert!(group.info.date.is_some());

        let first = &group.specifications[0];
        assert_eq!(first.identifier.as_deref(), Some("W1"));
        assert_eq!(first.ifc_versions, vec![IfcSchemaVersion::Ifc2x3, IfcSchemaVersion::Ifc4]);
        assert_eq!(first.cardinality, Cardinality::optional());
        assert_eq!(group.specifications[1].cardinality, Cardinality::required());
    }

    #[test]
    fn test_identical_blocks_are_shared() {
        let ids = import_xml(DOC.as_bytes(), &ImportConfig::default()).unwrap();
        let specs = &ids.groups[0].specifications;
        assert!(Rc::ptr_eq(&specs[0].applicability, &specs[1].applicability));
        assert!(!Rc::ptr_eq(&specs[0].requirements, &specs[1].requirements));
        assert_eq!(ids.applicability_sets().len(), 1);
        assert_eq!(ids.requirement_sets().len(), 2);
    }

    #[test]
    fn test_blocks_differing_in_shape_are_not_shared() {
        let restriction = r#"<xs:restriction><xs:enumeration value="IFCWALL"/></xs:restriction>"#;
        let doc = DOC.replacen("<simpleValue>IFCWALL</simpleValue>", restriction, 1);
        let ids = import_xml(doc.as_bytes(), &ImportConfig::default()).unwrap();
        let specs = &ids.groups[0].specifications;
        assert_eq!(*specs[0].applicability.borrow(), *specs[1].applicability.borrow());
        assert!(!Rc::ptr_eq(&specs[0].applicability, &specs[1].applicability));
    }

    #[test]
    fn test_schema_location_is_recorded() {
        let ids = import_xml(DOC.as_bytes(), &ImportConfig::default()).unwrap();
        assert_eq!(ids.groups[0].schema_location, SchemaLocation::Absent);

        let declared = DOC.replace(
            r#"xmlns:xs="http://www.w3.org/2001/XMLSchema">"#,
            r#"xmlns:xs="http://www.w3.org/2001/XMLSchema" xmlns:xsi="http://www.w3.org/2001/XMLSchema-instance" xsi:schemaLocation="http://standards.buildingsmart.org/IDS ids_09.xsd">"#,
        );
        let ids = import_xml(declared.as_bytes(), &ImportConfig::default()).unwrap();
        assert_eq!(
            ids.groups[0].schema_location,
            SchemaLocation::Declared("http://standards.buildingsmart.org/IDS ids_09.xsd".into())
        );
    }

    #[test]
    fn test_specifications_are_linked() {
        let ids = import_xml(DOC.as_bytes(), &ImportConfig::default()).unwrap();
        assert!(ids.all_specifications().all(Specification::is_linked));
    }

    #[test]
    fn test_specification_limit() {
        let config = ImportConfig::default().with_limits(crate::limits::Limits {
            max_specifications: 1,
            ..Default::default()
        });
        assert!(matches!(
            import_xml(DOC.as_bytes(), &config),
            Err(Error::LimitExceeded(_))
        ));
    }
}
