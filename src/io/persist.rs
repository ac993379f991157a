//! JSON persistence of a whole container
//!
//! Facet groups are stored once in id-keyed tables and specifications refer
//! to them by id, so groups shared by several specifications are shared
//! again after loading. The back-references of the loaded specifications
//! are restored with [`Ids::relink`].

use crate::cardinality::Cardinality;
use crate::error::{Error, Result};
use crate::facets::{FacetGroup, SharedFacetGroup};
use crate::schema::IfcSchemaVersion;
use crate::specification::{GroupInfo, Ids, SchemaLocation, Specification, SpecificationsGroup};
use indexmap::IndexMap;
use log::{debug, info};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::Path;
use std::rc::Rc;

/// Version of the persistence document written by [`save_json`]
pub const FORMAT_VERSION: u32 = 1;

#[derive(Debug, Serialize, Deserialize)]
struct PersistedIds {
    format_version: u32,
    default_schema: IfcSchemaVersion,
    #[serde(default)]
    applicability: IndexMap<String, FacetGroup>,
    #[serde(default)]
    requirements: IndexMap<String, FacetGroup>,
    #[serde(default)]
    groups: Vec<PersistedGroup>,
}

#[derive(Debug, Serialize, Deserialize)]
struct PersistedGroup {
    name: String,
    #[serde(default)]
    info: GroupInfo,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    source_file: Option<String>,
    #[serde(default, skip_serializing_if = "SchemaLocation::is_configured")]
    schema_location: SchemaLocation,
    #[serde(default)]
    specifications: Vec<PersistedSpecification>,
}

#[derive(Debug, Serialize, Deserialize)]
struct PersistedSpecification {
    name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    identifier: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    instructions: Option<String>,
    #[serde(default)]
    ifc_versions: Vec<IfcSchemaVersion>,
    cardinality: Cardinality,
    applicability: String,
    requirements: String,
}

/// Distinct groups with their table ids
struct Table {
    prefix: char,
    groups: Vec<SharedFacetGroup>,
}

impl Table {
    fn new(prefix: char, groups: Vec<SharedFacetGroup>) -> Self {
        Self { prefix, groups }
    }

    fn id_at(&self, index: usize) -> String {
        format!("{}{}", self.prefix, index + 1)
    }

    /// Id of a group; every group of a specification is in its table
    fn id_of(&self, group: &SharedFacetGroup) -> Result<String> {
        self.groups
            .iter()
            .position(|g| Rc::ptr_eq(g, group))
            .map(|index| self.id_at(index))
            .ok_or_else(|| {
                Error::Value(format!(
                    "facet group missing from the {} table",
                    self.prefix
                ))
            })
    }

    fn entries(&self) -> IndexMap<String, FacetGroup> {
        self.groups
            .iter()
            .enumerate()
            .map(|(index, g)| (self.id_at(index), g.borrow().clone()))
            .collect()
    }
}

/// Serialize a container as a JSON document
pub fn save_json(ids: &Ids) -> Result<String> {
    let applicability = Table::new('A', ids.applicability_sets());
    let requirements = Table::new('R', ids.requirement_sets());

    let mut groups = Vec::with_capacity(ids.groups.len());
    for group in &ids.groups {
        let specifications = group
            .specifications
            .iter()
            .map(|spec| -> Result<PersistedSpecification> {
                Ok(PersistedSpecification {
                    name: spec.name.clone(),
                    identifier: spec.identifier.clone(),
                    description: spec.description.clone(),
                    instructions: spec.instructions.clone(),
                    ifc_versions: spec.ifc_versions.clone(),
                    cardinality: spec.cardinality,
                    applicability: applicability.id_of(&spec.applicability)?,
                    requirements: requirements.id_of(&spec.requirements)?,
                })
            })
            .collect::<Result<Vec<_>>>()?;
        groups.push(PersistedGroup {
            name: group.name.clone(),
            info: group.info.clone(),
            source_file: group.source_file.clone(),
            schema_location: group.schema_location.clone(),
            specifications,
        });
    }

    let document = PersistedIds {
        format_version: FORMAT_VERSION,
        default_schema: ids.default_schema(),
        applicability: applicability.entries(),
        requirements: requirements.entries(),
        groups,
    };
    info!(
        groups = ids.groups.len(),
        applicability_sets = document.applicability.len(),
        requirement_sets = document.requirements.len();
        "container saved"
    );
    Ok(serde_json::to_string_pretty(&document)?)
}

/// Rebuild a container from a JSON document written by [`save_json`]
pub fn load_json(json: &str) -> Result<Ids> {
    let document: PersistedIds = serde_json::from_str(json)?;
    if document.format_version > FORMAT_VERSION {
        return Err(Error::Value(format!(
            "persistence format {} is newer than {}",
            document.format_version, FORMAT_VERSION
        )));
    }

    let applicability = shared_table(document.applicability);
    let requirements = shared_table(document.requirements);

    let mut ids = Ids::with_default_schema(document.default_schema);
    for persisted in document.groups {
        let mut group = SpecificationsGroup::new(persisted.name);
        group.info = persisted.info;
        group.source_file = persisted.source_file;
        group.schema_location = persisted.schema_location;
        for spec in persisted.specifications {
            let mut restored = Specification::new(spec.name)
                .with_versions(&spec.ifc_versions)
                .with_cardinality(spec.cardinality)
                .with_applicability(lookup(&applicability, &spec.applicability)?)
                .with_requirements(lookup(&requirements, &spec.requirements)?);
            restored.identifier = spec.identifier;
            restored.description = spec.description;
            restored.instructions = spec.instructions;
            group.specifications.push(restored);
        }
        ids.groups.push(group);
    }
    ids.relink();

    info!(
        groups = ids.groups.len(),
        specifications = ids.specification_count();
        "container loaded"
    );
    Ok(ids)
}

fn shared_table(table: IndexMap<String, FacetGroup>) -> HashMap<String, SharedFacetGroup> {
    table
        .into_iter()
        .map(|(id, group)| (id, group.into_shared()))
        .collect()
}

fn lookup(table: &HashMap<String, SharedFacetGroup>, id: &str) -> Result<SharedFacetGroup> {
    debug!(id = id; "resolving facet group");
    table
        .get(id)
        .map(Rc::clone)
        .ok_or_else(|| Error::Value(format!("unknown facet group id '{}'", id)))
}

/// Save a container to a JSON file
pub fn save_json_file(ids: &Ids, path: impl AsRef<Path>) -> Result<()> {
    fs::write(path, save_json(ids)?)?;
    Ok(())
}

/// Load a container from a JSON file
pub fn load_json_file(path: impl AsRef<Path>) -> Result<Ids> {
    load_json(&fs::read_to_string(path)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::facets::{AttributeFacet, EntityFacet, PropertyFacet};
    use crate::values::{RangeConstraint, SemanticType, ValueConstraint};

    fn container() -> Ids {
        let mut ids = Ids::with_default_schema(IfcSchemaVersion::Ifc2x3);
        let g = ids.add_group(SpecificationsGroup::new("Walls"));
        let walls = FacetGroup::from_facets([EntityFacet::new("IfcWall").into()]).into_shared();

        let named = Specification::new("named").with_applicability(Rc::clone(&walls));
        named.add_requirement(AttributeFacet::new("Name"));
        ids.add_specification(g, named).unwrap();

        let mut height = ValueConstraint::of_type(SemanticType::Double);
        height.add_accepted(RangeConstraint::at_least("2.5", true));
        let tall = Specification::new("tall")
            .with_applicability(walls)
            .with_cardinality(Cardinality::optional());
        tall.add_requirement(PropertyFacet::new("Pset_WallCommon", "Height").with_value(height));
        ids.add_specification(g, tall).unwrap();
        ids
    }

    #[test]
    fn test_shared_group_survives_reload() {
        let json = save_json(&container()).unwrap();
        let ids = load_json(&json).unwrap();

        let specs = &ids.groups[0].specifications;
        assert!(Rc::ptr_eq(&specs[0].applicability, &specs[1].applicability));
        assert_eq!(ids.applicability_sets().len(), 1);
        assert_eq!(ids.requirement_sets().len(), 2);

        specs[0].add_applicability(AttributeFacet::new("Tag"));
        assert_eq!(specs[1].applicability.borrow().len(), 2);
    }

    #[test]
    fn test_reload_keeps_content_and_links() {
        let original = container();
        let ids = load_json(&save_json(&original).unwrap()).unwrap();
        assert_eq!(ids.default_schema(), IfcSchemaVersion::Ifc2x3);
        assert!(ids.all_specifications().all(Specification::is_linked));

        let before: Vec<_> = original.all_specifications().collect();
        let after: Vec<_> = ids.all_specifications().collect();
        assert_eq!(before.len(), after.len());
        for (a, b) in before.iter().zip(&after) {
            assert_eq!(a.name, b.name);
            assert_eq!(a.cardinality, b.cardinality);
            assert_eq!(*a.applicability.borrow(), *b.applicability.borrow());
            assert_eq!(*a.requirements.borrow(), *b.requirements.borrow());
        }
    }

    #[test]
    fn test_table_miss_is_an_error() {
        let known = FacetGroup::new().into_shared();
        let table = Table::new('A', vec![Rc::clone(&known)]);
        assert_eq!(table.id_of(&known).unwrap(), "A1");

        let stranger = FacetGroup::new().into_shared();
        assert!(matches!(table.id_of(&stranger), Err(Error::Value(_))));
    }

    #[test]
    fn test_schema_location_is_kept() {
        let mut ids = container();
        ids.groups[0].schema_location = SchemaLocation::Absent;
        let json = save_json(&ids).unwrap();
        assert!(json.contains(r#""schema_location": "Absent""#));
        assert_eq!(load_json(&json).unwrap().groups[0].schema_location, SchemaLocation::Absent);

        let built = save_json(&container()).unwrap();
        assert!(!built.contains("schema_location"));
    }

    #[test]
    fn test_unknown_group_id() {
        let json = r#"{
            "format_version": 1,
            "default_schema": "IFC4",
            "groups": [{"name": "g", "specifications": [{
                "name": "s",
                "cardinality": {"type": "Simple", "value": "Required"},
                "applicability": "A9",
                "requirements": "R1"
            }]}]
        }"#;
        assert!(matches!(load_json(json), Err(Error::Value(_))));
    }

    #[test]
    fn test_newer_format_is_rejected() {
        let json = r#"{"format_version": 99, "default_schema": "IFC4"}"#;
        assert!(matches!(load_json(json), Err(Error::Value(_))));
    }
}
