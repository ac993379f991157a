//! Built-in IFC schema graphs
//!
//! Curated subsets of the IFC2X3 and IFC4 class hierarchies covering the
//! rooted object tree, the building element branches, spatial structure,
//! groups and systems, and the type object branch, together with the
//! attributes commonly constrained in information delivery specifications.

use super::{ClassInfo, IfcSchemaVersion, SchemaInfo, TYPE_OBJECT_ROOT};
use lazy_static::lazy_static;

/// (class, parent, abstract)
type ClassRow = (&'static str, Option<&'static str>, bool);
/// (attribute, declaring classes)
type AttributeRow = (&'static str, &'static [&'static str]);

const COMMON_CLASSES: &[ClassRow] = &[
    ("IfcRoot", None, true),
    ("IfcObjectDefinition", Some("IfcRoot"), true),
    ("IfcPropertyDefinition", Some("IfcRoot"), true),
    ("IfcRelationship", Some("IfcRoot"), true),
    ("IfcObject", Some("IfcObjectDefinition"), true),
    ("IfcTypeObject", Some("IfcObjectDefinition"), false),
    ("IfcTypeProduct", Some("IfcTypeObject"), false),
    ("IfcElementType", Some("IfcTypeProduct"), true),
    ("IfcBuildingElementType", Some("IfcElementType"), true),
    ("IfcWallType", Some("IfcBuildingElementType"), false),
    ("IfcSlabType", Some("IfcBuildingElementType"), false),
    ("IfcBeamType", Some("IfcBuildingElementType"), false),
    ("IfcColumnType", Some("IfcBuildingElementType"), false),
    ("IfcCoveringType", Some("IfcBuildingElementType"), false),
    ("IfcRailingType", Some("IfcBuildingElementType"), false),
    ("IfcDistributionElementType", Some("IfcElementType"), false),
    ("IfcProduct", Some("IfcObject"), true),
    ("IfcGroup", Some("IfcObject"), false),
    ("IfcSystem", Some("IfcGroup"), false),
    ("IfcZone", Some("IfcGroup"), false),
    ("IfcElement", Some("IfcProduct"), true),
    ("IfcBuildingElement", Some("IfcElement"), true),
    ("IfcWall", Some("IfcBuildingElement"), false),
    ("IfcWallStandardCase", Some("IfcWall"), false),
    ("IfcSlab", Some("IfcBuildingElement"), false),
    ("IfcBeam", Some("IfcBuildingElement"), false),
    ("IfcColumn", Some("IfcBuildingElement"), false),
    ("IfcDoor", Some("IfcBuildingElement"), false),
    ("IfcWindow", Some("IfcBuildingElement"), false),
    ("IfcCovering", Some("IfcBuildingElement"), false),
    ("IfcRailing", Some("IfcBuildingElement"), false),
    ("IfcRoof", Some("IfcBuildingElement"), false),
    ("IfcStair", Some("IfcBuildingElement"), false),
    ("IfcBuildingElementProxy", Some("IfcBuildingElement"), false),
    ("IfcDistributionElement", Some("IfcElement"), false),
    ("IfcElementAssembly", Some("IfcElement"), false),
    ("IfcFurnishingElement", Some("IfcElement"), false),
    ("IfcOpeningElement", Some("IfcElement"), false),
    ("IfcSpatialStructureElement", None, true),
    ("IfcSite", Some("IfcSpatialStructureElement"), false),
    ("IfcBuilding", Some("IfcSpatialStructureElement"), false),
    ("IfcBuildingStorey", Some("IfcSpatialStructureElement"), false),
    ("IfcSpace", Some("IfcSpatialStructureElement"), false),
    ("IfcProject", None, false),
    ("IfcMaterial", None, false),
    ("IfcClassification", None, false),
    ("IfcClassificationReference", None, false),
];

const IFC2X3_CLASSES: &[ClassRow] = &[
    ("IfcSpatialStructureElement", Some("IfcProduct"), true),
    ("IfcProject", Some("IfcObject"), false),
    ("IfcElectricalCircuit", Some("IfcSystem"), false),
    ("IfcStructuralAnalysisModel", Some("IfcSystem"), false),
    ("IfcDoorStyle", Some("IfcTypeProduct"), false),
    ("IfcWindowStyle", Some("IfcTypeProduct"), false),
    ("IfcFurnishingElementType", Some("IfcElementType"), false),
];

const IFC4_CLASSES: &[ClassRow] = &[
    ("IfcContext", Some("IfcObjectDefinition"), true),
    ("IfcProject", Some("IfcContext"), false),
    ("IfcSpatialElement", Some("IfcProduct"), true),
    ("IfcSpatialStructureElement", Some("IfcSpatialElement"), true),
    ("IfcBuildingSystem", Some("IfcSystem"), false),
    ("IfcDistributionSystem", Some("IfcSystem"), false),
    ("IfcDistributionCircuit", Some("IfcDistributionSystem"), false),
    ("IfcStructuralAnalysisModel", Some("IfcSystem"), false),
    ("IfcDoorType", Some("IfcBuildingElementType"), false),
    ("IfcWindowType", Some("IfcBuildingElementType"), false),
    ("IfcElementAssemblyType", Some("IfcElementType"), false),
    ("IfcFurnishingElementType", Some("IfcElementType"), false),
    ("IfcFurniture", Some("IfcFurnishingElement"), false),
    ("IfcFurnitureType", Some("IfcFurnishingElementType"), false),
    ("IfcWallElementedCase", Some("IfcWall"), false),
    ("IfcSlabStandardCase", Some("IfcSlab"), false),
];

const COMMON_ATTRIBUTES: &[AttributeRow] = &[
    ("GlobalId", &["IfcRoot"]),
    ("OwnerHistory", &["IfcRoot"]),
    ("Name", &["IfcRoot", "IfcMaterial", "IfcClassification"]),
    ("Description", &["IfcRoot"]),
    ("ObjectType", &["IfcObject"]),
    ("ObjectPlacement", &["IfcProduct"]),
    ("Representation", &["IfcProduct"]),
    ("Tag", &["IfcElement", "IfcTypeProduct"]),
    ("ApplicableOccurrence", &["IfcTypeObject"]),
    ("HasPropertySets", &["IfcTypeObject"]),
    ("RepresentationMaps", &["IfcTypeProduct"]),
    ("ElementType", &["IfcElementType"]),
    ("LongName", &["IfcSpatialStructureElement", "IfcProject"]),
    ("CompositionType", &["IfcSpatialStructureElement"]),
    ("Phase", &["IfcProject"]),
    ("OverallHeight", &["IfcDoor", "IfcWindow"]),
    ("OverallWidth", &["IfcDoor", "IfcWindow"]),
    ("AssemblyPlace", &["IfcElementAssembly"]),
    ("Identification", &["IfcClassificationReference"]),
    ("Source", &["IfcClassification"]),
    ("Edition", &["IfcClassification"]),
];

const IFC2X3_ATTRIBUTES: &[AttributeRow] = &[
    (
        "PredefinedType",
        &[
            "IfcSlab",
            "IfcCovering",
            "IfcRailing",
            "IfcElementAssembly",
            "IfcWallType",
            "IfcSlabType",
            "IfcBeamType",
            "IfcColumnType",
            "IfcCoveringType",
            "IfcRailingType",
        ],
    ),
    ("ShapeType", &["IfcRoof", "IfcStair"]),
    ("ItemReference", &["IfcClassificationReference"]),
    ("OperationType", &["IfcDoorStyle"]),
    ("ConstructionType", &["IfcDoorStyle", "IfcWindowStyle"]),
];

const IFC4_ATTRIBUTES: &[AttributeRow] = &[
    (
        "PredefinedType",
        &[
            "IfcWall",
            "IfcSlab",
            "IfcBeam",
            "IfcColumn",
            "IfcDoor",
            "IfcWindow",
            "IfcCovering",
            "IfcRailing",
            "IfcRoof",
            "IfcStair",
            "IfcElementAssembly",
            "IfcFurniture",
            "IfcBuildingSystem",
            "IfcDistributionSystem",
            "IfcWallType",
            "IfcSlabType",
            "IfcBeamType",
            "IfcColumnType",
            "IfcCoveringType",
            "IfcRailingType",
            "IfcDoorType",
            "IfcWindowType",
            "IfcElementAssemblyType",
            "IfcFurnitureType",
        ],
    ),
    ("OperationType", &["IfcDoor", "IfcDoorType"]),
    ("PartitioningType", &["IfcWindow", "IfcWindowType"]),
    ("UserDefinedPartitioningType", &["IfcWindow", "IfcWindowType"]),
    ("LongName", &["IfcContext", "IfcSpatialElement", "IfcSystem"]),
];

fn assemble(
    version: IfcSchemaVersion,
    classes: &[&[ClassRow]],
    attributes: &[&[AttributeRow]],
) -> SchemaInfo {
    let mut builder = SchemaInfo::builder().version(version);
    for table in classes {
        for (name, parent, is_abstract) in table.iter() {
            builder = builder.class(ClassInfo::new(*name, *parent).with_abstract(*is_abstract));
        }
    }
    for table in attributes {
        for (attribute, declaring) in table.iter() {
            builder = builder.attribute(attribute, declaring);
        }
    }
    builder.type_object_root(TYPE_OBJECT_ROOT).build()
}

lazy_static! {
    /// IFC2X3 class graph
    pub static ref SCHEMA_IFC2X3: SchemaInfo = assemble(
        IfcSchemaVersion::Ifc2x3,
        &[COMMON_CLASSES, IFC2X3_CLASSES],
        &[COMMON_ATTRIBUTES, IFC2X3_ATTRIBUTES],
    );

    /// IFC4 class graph
    pub static ref SCHEMA_IFC4: SchemaInfo = assemble(
        IfcSchemaVersion::Ifc4,
        &[COMMON_CLASSES, IFC4_CLASSES],
        &[COMMON_ATTRIBUTES, IFC4_ATTRIBUTES],
    );
}
