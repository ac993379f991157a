//! Integration tests for reading and writing IDS documents
//!
//! The fixtures under `tests/fixtures` are read, written back and compared
//! node by node through their structural summaries.

use idspec::io::{self, XmlElementSummary};
use idspec::{
    Cardinality, ElementDescriptor, Error, ExportConfig, ExportedFormat, Facet, IfcSchemaVersion,
    ImportConfig, Ids, SchemaLocation, Value,
};
use pretty_assertions::assert_eq;
use std::fs;
use std::rc::Rc;

const WALLS: &str = "tests/fixtures/walls.ids";
const SLABS: &str = "tests/fixtures/slabs.ids";
const SHAPES: &str = "tests/fixtures/shapes.ids";

fn read(path: &str) -> Ids {
    io::import_file(path, &ImportConfig::default())
        .unwrap_or_else(|e| panic!("{} should import: {}", path, e))
}

fn summary_of_file(path: &str) -> XmlElementSummary {
    XmlElementSummary::from_xml(&fs::read_to_string(path).unwrap()).unwrap()
}

#[test]
fn test_import_reads_every_part() {
    let ids = read(WALLS);
    assert_eq!(ids.groups.len(), 1);
    let group = &ids.groups[0];
    assert_eq!(group.name, "Wall requirements");
    assert_eq!(group.source_file.as_deref(), Some("walls.ids"));
    assert_eq!(group.info.version.as_deref(), Some("1.2"));
    assert_eq!(group.info.milestone.as_deref(), Some("Tender"));
    assert_eq!(
        group.info.date.map(|d| d.to_string()),
        Some("2024-03-15".to_string())
    );

    let specs = &group.specifications;
    assert_eq!(specs.len(), 4);
    assert_eq!(specs[0].identifier.as_deref(), Some("W-01"));
    assert_eq!(specs[1].ifc_versions, vec![IfcSchemaVersion::Ifc2x3, IfcSchemaVersion::Ifc4]);
    assert_eq!(specs[0].cardinality, Cardinality::required());
    assert_eq!(specs[1].cardinality, Cardinality::optional());
    assert_eq!(specs[2].cardinality, Cardinality::min_max(2, Some(5)));
    assert_eq!(specs[3].cardinality, Cardinality::prohibited());
    assert_eq!(specs[2].requirements.borrow().len(), 3);
    assert!(specs[3].requirements.borrow().is_empty());
}

#[test]
fn test_repeated_applicability_is_shared() {
    let ids = read(WALLS);
    let specs = &ids.groups[0].specifications;
    assert!(Rc::ptr_eq(&specs[0].applicability, &specs[1].applicability));
    assert_eq!(ids.applicability_sets().len(), 3);
    assert_eq!(ids.requirement_sets().len(), 4);
}

#[test]
fn test_export_is_structurally_equivalent() {
    for path in [WALLS, SLABS, SHAPES] {
        let ids = read(path);
        let (bytes, format) = io::export(&ids, &ExportConfig::default()).unwrap();
        assert_eq!(format, ExportedFormat::SingleXml);

        let written = XmlElementSummary::from_bytes(&bytes).unwrap();
        let original = summary_of_file(path);
        assert_eq!(original.first_difference(&written), None, "{}", path);
        assert_eq!(original, written);
    }
}

#[test]
fn test_value_shapes_survive_export() {
    let ids = read(SHAPES);
    assert_eq!(ids.groups[0].schema_location, SchemaLocation::Absent);
    let (bytes, _) = io::export(&ids, &ExportConfig::new().with_indent(0)).unwrap();
    let xml = String::from_utf8(bytes).unwrap();

    assert!(!xml.contains("schemaLocation"));
    assert!(xml.contains(
        r#"<name><xs:restriction><xs:enumeration value="IFCCOLUMN"/></xs:restriction></name>"#
    ));
    assert!(xml.contains(
        r#"<xs:restriction base="xs:gYear"><xs:enumeration value="2020"/></xs:restriction>"#
    ));
    assert!(xml.contains(
        r#"<xs:minInclusive value="100"/><xs:enumeration value="42"/><xs:maxExclusive value="200"/>"#
    ));
    assert!(xml.contains("<simpleValue> Oak </simpleValue>"));

    let back = io::import(xml.as_bytes(), &ImportConfig::default()).unwrap();
    let spec = back.all_specifications().next().unwrap();
    let requirements = spec.requirements.borrow();
    match &requirements.facets[2] {
        Facet::Material(material) => {
            let value = material.value.as_ref().unwrap();
            assert_eq!(value.single_exact(), Some(" Oak "));
        }
        other => panic!("expected a material facet, got {:?}", other),
    }
    match &requirements.facets[1] {
        Facet::Attribute(attribute) => {
            let value = attribute.value.as_ref().unwrap();
            assert!(value.is_satisfied_by(&Value::Integer(42)));
            assert!(value.is_satisfied_by(&Value::Integer(150)));
            assert!(!value.is_satisfied_by(&Value::Integer(200)));
        }
        other => panic!("expected an attribute facet, got {:?}", other),
    }
}

#[test]
fn test_second_round_trip_keeps_facets() {
    let first = read(WALLS);
    let (bytes, _) = io::export(&first, &ExportConfig::new().with_indent(0)).unwrap();
    let second = io::import(&bytes, &ImportConfig::default()).unwrap();

    let before: Vec<_> = first.all_specifications().collect();
    let after: Vec<_> = second.all_specifications().collect();
    assert_eq!(before.len(), after.len());
    for (a, b) in before.iter().zip(&after) {
        assert_eq!(a.name, b.name);
        assert_eq!(a.cardinality, b.cardinality);
        assert_eq!(*a.applicability.borrow(), *b.applicability.borrow());
        assert_eq!(*a.requirements.borrow(), *b.requirements.borrow());
    }
    assert_eq!(second.applicability_sets().len(), 3);
}

#[test]
fn test_two_groups_export_as_zip() {
    let mut ids = read(WALLS);
    let mut slabs = read(SLABS);
    ids.add_group(slabs.groups.remove(0));
    assert!(ids.all_specifications().all(|s| s.is_linked()));

    let (bytes, format) = io::export(&ids, &ExportConfig::default()).unwrap();
    assert_eq!(format, ExportedFormat::Zip);

    let back = io::import(&bytes, &ImportConfig::default()).unwrap();
    assert_eq!(back.groups.len(), 2);
    assert_eq!(back.specification_count(), 5);
    assert_eq!(back.groups[0].source_file.as_deref(), Some("Wall_requirements.ids"));
    assert_eq!(back.groups[1].name, "Slab requirements");
}

#[test]
fn test_file_round_trip_reports_format() {
    let dir = tempfile::tempdir().unwrap();

    let single = dir.path().join("walls.ids");
    let ids = read(WALLS);
    let format = io::export_file(&ids, &single, &ExportConfig::default()).unwrap();
    assert_eq!(format, ExportedFormat::SingleXml);
    assert_eq!(format.extension(), "ids");
    let back = io::import_file(&single, &ImportConfig::default()).unwrap();
    assert_eq!(back.specification_count(), 4);

    // the content decides the format, not the file name
    let mut both = read(WALLS);
    both.add_group(read(SLABS).groups.remove(0));
    let package = dir.path().join("package.ids");
    let format = io::export_file(&both, &package, &ExportConfig::default()).unwrap();
    assert_eq!(format, ExportedFormat::Zip);
    let back = io::import_file(&package, &ImportConfig::default()).unwrap();
    assert_eq!(back.groups.len(), 2);
}

#[test]
fn test_out_of_order_blocks_are_rejected() {
    let err = io::import_file("tests/fixtures/out_of_order.ids", &ImportConfig::default())
        .unwrap_err();
    match err {
        Error::SchemaViolation(violation) => {
            let path = violation.path.unwrap_or_default();
            assert!(path.contains("specification[2]"), "{}", path);
        }
        other => panic!("expected a schema violation, got {:?}", other),
    }
}

#[test]
fn test_other_schema_version() {
    let path = "tests/fixtures/other_version.ids";
    assert!(matches!(
        io::import_file(path, &ImportConfig::default()),
        Err(Error::SchemaViolation(_))
    ));

    let lenient = ImportConfig::default().with_lenient_version(true);
    let ids = io::import_file(path, &lenient).unwrap();
    assert_eq!(ids.specification_count(), 1);
}

#[test]
fn test_malformed_xml() {
    assert!(matches!(
        io::import(b"<ids><info>", &ImportConfig::default()),
        Err(Error::Xml(_))
    ));
}

#[test]
fn test_imported_specifications_evaluate() {
    let ids = read(WALLS);
    let specs = &ids.groups[0].specifications;

    let elements = vec![
        ElementDescriptor::new("IfcWall").with_attribute("Name", "W-01"),
        ElementDescriptor::new("IfcWall").with_attribute("Name", "Wall 2"),
        ElementDescriptor::new("IfcSlab").with_attribute("Name", "S-01"),
    ];
    let outcome = specs[0].evaluate(&elements);
    assert_eq!(outcome.applicable, vec![0, 1]);
    assert_eq!(outcome.failing, vec![1]);
    assert!(!outcome.passed());

    let door = ElementDescriptor::new("IfcDoor")
        .with_predefined_type("DOOR")
        .with_classification("uniclass", "31.20")
        .with_material("Timber")
        .with_container("IfcElementAssembly");
    let doors = vec![door.clone(), door.clone()];
    assert!(specs[2].evaluate(&doors).passed());
    assert!(!specs[2].evaluate(&doors[..1]).passed());

    let no_proxies = vec![ElementDescriptor::new("IfcWall")];
    assert!(specs[3].evaluate(&no_proxies).passed());
}

#[test]
fn test_imported_container_validates_cleanly() {
    let ids = read(WALLS);
    let errors: Vec<_> = ids
        .validation_report()
        .into_iter()
        .filter(|issue| issue.severity == idspec::Severity::Error)
        .collect();
    assert!(errors.is_empty(), "{:?}", errors);
}
