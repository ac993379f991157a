//! Writing groups as IDS documents
//!
//! Every specification writes its blocks in full, shared or not. Both
//! occurrence attributes are always present; an unbounded maximum is
//! written as `unbounded`.

use super::values_xml::{write_text_element, write_value};
use super::{IDS_NAMESPACE, IDS_XSD_FILE, XSI_NAMESPACE, XS_NAMESPACE};
use crate::config::ExportConfig;
use crate::error::{Error, Result};
use crate::facets::{Facet, FacetGroup};
use crate::specification::{SchemaLocation, Specification, SpecificationsGroup};
use crate::values::ValueConstraint;
use log::debug;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, Event};
use quick_xml::Writer;
use std::io::Write;

/// Serialize one group as an IDS document
pub fn write_group(group: &SpecificationsGroup, config: &ExportConfig) -> Result<Vec<u8>> {
    if group.specifications.is_empty() {
        return Err(Error::UnsupportedExportShape(format!(
            "group '{}' holds no specification",
            group.name
        )));
    }
    let mut writer = if config.indent > 0 {
        Writer::new_with_indent(Vec::new(), b' ', config.indent)
    } else {
        Writer::new(Vec::new())
    };

    writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;
    let mut root = BytesStart::new("ids");
    root.push_attribute(("xmlns", IDS_NAMESPACE));
    root.push_attribute(("xmlns:xs", XS_NAMESPACE));
    if let Some(location) = schema_location(group, config) {
        root.push_attribute(("xmlns:xsi", XSI_NAMESPACE));
        root.push_attribute(("xsi:schemaLocation", location));
    }
    writer.write_event(Event::Start(root))?;

    write_info(&mut writer, group)?;
    writer.write_event(Event::Start(BytesStart::new("specifications")))?;
    for spec in &group.specifications {
        write_specification(&mut writer, spec)?;
    }
    writer.write_event(Event::End(BytesEnd::new("specifications")))?;
    writer.write_event(Event::End(BytesEnd::new("ids")))?;

    debug!(
        title = group.name.as_str(),
        specifications = group.specifications.len();
        "IDS document written"
    );
    Ok(writer.into_inner())
}

/// Location to write: the one read for imported groups, else the configured one
fn schema_location<'a>(group: &'a SpecificationsGroup, config: &'a ExportConfig) -> Option<&'a str> {
    match &group.schema_location {
        SchemaLocation::Absent => None,
        SchemaLocation::Declared(location) if declares_current_version(location) => {
            Some(location.as_str())
        }
        _ => Some(config.xsd_location.as_str()),
    }
}

fn declares_current_version(location: &str) -> bool {
    location
        .split_whitespace()
        .any(|token| token.rsplit('/').next() == Some(IDS_XSD_FILE))
}

fn write_info<W: Write>(writer: &mut Writer<W>, group: &SpecificationsGroup) -> Result<()> {
    writer.write_event(Event::Start(BytesStart::new("info")))?;
    write_text_element(writer, "title", &group.name)?;
    let info = &group.info;
    let date = info.date.map(|d| d.format("%Y-%m-%d").to_string());
    let optional = [
        ("copyright", info.copyright.as_deref()),
        ("version", info.version.as_deref()),
        ("description", info.description.as_deref()),
        ("author", info.author.as_deref()),
        ("date", date.as_deref()),
        ("purpose", info.purpose.as_deref()),
        ("milestone", info.milestone.as_deref()),
    ];
    for (tag, text) in optional {
        if let Some(text) = text {
            write_text_element(writer, tag, text)?;
        }
    }
    writer.write_event(Event::End(BytesEnd::new("info")))?;
    Ok(())
}

fn write_specification<W: Write>(writer: &mut Writer<W>, spec: &Specification) -> Result<()> {
    let versions: Vec<&str> = spec.schema_versions().iter().map(|v| v.token()).collect();
    let versions = versions.join(" ");
    let occurs = spec.cardinality.to_min_max();
    let min = occurs.min_occurs.to_string();
    let max = occurs
        .max_occurs
        .map(|m| m.to_string())
        .unwrap_or_else(|| "unbounded".to_string());

    let mut start = BytesStart::new("specification");
    start.push_attribute(("name", spec.name.as_str()));
    start.push_attribute(("ifcVersion", versions.as_str()));
    for (key, value) in [
        ("identifier", &spec.identifier),
        ("description", &spec.description),
        ("instructions", &spec.instructions),
    ] {
        if let Some(value) = value {
            start.push_attribute((key, value.as_str()));
        }
    }
    start.push_attribute(("minOccurs", min.as_str()));
    start.push_attribute(("maxOccurs", max.as_str()));
    writer.write_event(Event::Start(start))?;

    write_block(writer, "applicability", &spec.applicability.borrow())?;
    write_block(writer, "requirements", &spec.requirements.borrow())?;

    writer.write_event(Event::End(BytesEnd::new("specification")))?;
    Ok(())
}

fn write_block<W: Write>(writer: &mut Writer<W>, tag: &str, group: &FacetGroup) -> Result<()> {
    if group.is_empty() {
        writer.write_event(Event::Empty(BytesStart::new(tag)))?;
        return Ok(());
    }
    writer.write_event(Event::Start(BytesStart::new(tag)))?;
    for facet in group {
        write_facet(writer, facet)?;
    }
    writer.write_event(Event::End(BytesEnd::new(tag)))?;
    Ok(())
}

fn write_facet<W: Write>(writer: &mut Writer<W>, facet: &Facet) -> Result<()> {
    let tag = facet.element_name();
    let mut start = BytesStart::new(tag);
    let mut values: Vec<(&str, &ValueConstraint)> = Vec::new();

    let (uri, instructions) = match facet {
        Facet::Entity(f) => {
            values.push(("name", &f.name));
            values.extend(f.predefined_type.iter().map(|v| ("predefinedType", v)));
            (&f.uri, &f.instructions)
        }
        Facet::Attribute(f) => {
            values.push(("name", &f.name));
            values.extend(f.value.iter().map(|v| ("value", v)));
            (&f.uri, &f.instructions)
        }
        Facet::Property(f) => {
            if let Some(data_type) = &f.data_type {
                start.push_attribute(("dataType", data_type.as_str()));
            }
            values.push(("propertySet", &f.property_set));
            values.push(("name", &f.name));
            values.extend(f.value.iter().map(|v| ("value", v)));
            (&f.uri, &f.instructions)
        }
        Facet::Classification(f) => {
            values.extend(f.value.iter().map(|v| ("value", v)));
            values.extend(f.system.iter().map(|v| ("system", v)));
            (&f.uri, &f.instructions)
        }
        Facet::Material(f) => {
            values.extend(f.value.iter().map(|v| ("value", v)));
            (&f.uri, &f.instructions)
        }
        Facet::PartOf(f) => {
            start.push_attribute(("entity", f.entity.as_str()));
            writer.write_event(Event::Empty(start))?;
            return Ok(());
        }
    };
    if let Some(uri) = uri {
        start.push_attribute(("uri", uri.as_str()));
    }
    if let Some(instructions) = instructions {
        start.push_attribute(("instructions", instructions.as_str()));
    }

    if values.is_empty() {
        writer.write_event(Event::Empty(start))?;
        return Ok(());
    }
    writer.write_event(Event::Start(start))?;
    for (name, value) in values {
        write_value(writer, name, value)?;
    }
    writer.write_event(Event::End(BytesEnd::new(tag)))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cardinality::Cardinality;
    use crate::facets::{EntityFacet, PartOfEntity, PartOfFacet, PropertyFacet};
    use crate::schema::IfcSchemaVersion;

    fn group() -> SpecificationsGroup {
        let spec = Specification::new("s & t")
            .with_versions(&[IfcSchemaVersion::Ifc4])
            .with_cardinality(Cardinality::optional());
        spec.add_applicability(EntityFacet::new("IfcWall"));
        spec.add_requirement(PropertyFacet::new("Pset_WallCommon", "IsExternal").with_data_type("IfcBoolean"));
        spec.add_requirement(PartOfFacet::new(PartOfEntity::IfcSystem));
        let mut group = SpecificationsGroup::new("Walls");
        group.specifications.push(spec);
        group
    }

    #[test]
    fn test_document_shape() {
        let xml = String::from_utf8(write_group(&group(), &ExportConfig::new().with_indent(0)).unwrap()).unwrap();
        assert!(xml.starts_with(r#"<?xml version="1.0" encoding="UTF-8"?>"#));
        assert!(xml.contains(r#"xsi:schemaLocation="http://standards.buildingsmart.org/IDS http://standards.buildingsmart.org/IDS/ids_09.xsd""#));
        assert!(xml.contains("<info><title>Walls</title></info>"));
        assert!(xml.contains(r#"name="s &amp; t" ifcVersion="IFC4" minOccurs="0" maxOccurs="unbounded""#));
        assert!(xml.contains(r#"<property dataType="IfcBoolean"><propertySet><simpleValue>Pset_WallCommon</simpleValue></propertySet>"#));
        assert!(xml.contains(r#"<partOf entity="IfcSystem"/>"#));
    }

    #[test]
    fn test_unlinked_specification_writes_default_version() {
        let mut g = group();
        g.specifications[0].ifc_versions.clear();
        let xml = String::from_utf8(write_group(&g, &ExportConfig::new()).unwrap()).unwrap();
        assert!(xml.contains(r#"ifcVersion="IFC4""#));
    }

    #[test]
    fn test_schema_location_follows_source() {
        let config = ExportConfig::new().with_indent(0);
        let mut g = group();
        g.schema_location = SchemaLocation::Absent;
        let xml = String::from_utf8(write_group(&g, &config).unwrap()).unwrap();
        assert!(!xml.contains("schemaLocation"));
        assert!(!xml.contains("xmlns:xsi"));

        g.schema_location = SchemaLocation::Declared("http://standards.buildingsmart.org/IDS ids_09.xsd".into());
        let xml = String::from_utf8(write_group(&g, &config).unwrap()).unwrap();
        assert!(xml.contains(r#"xsi:schemaLocation="http://standards.buildingsmart.org/IDS ids_09.xsd""#));

        // documents of other versions are written as the current version
        g.schema_location = SchemaLocation::Declared("http://standards.buildingsmart.org/IDS ids_08.xsd".into());
        let xml = String::from_utf8(write_group(&g, &config).unwrap()).unwrap();
        assert!(xml.contains(&config.xsd_location));
    }

    #[test]
    fn test_empty_group_is_rejected() {
        let empty = SpecificationsGroup::new("nothing");
        assert!(matches!(
            write_group(&empty, &ExportConfig::new()),
            Err(Error::UnsupportedExportShape(_))
        ));
    }
}
