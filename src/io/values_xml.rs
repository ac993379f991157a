//! XML form of value constraints
//!
//! An IDS value is either `<simpleValue>` holding one untyped literal or an
//! `xs:restriction` with an optional `base` type and enumeration, pattern
//! and bound facets. All bounds of one restriction form a single range.
//!
//! The shape read from a document is kept as the constraint's
//! [`SourceForm`]: a single literal read from a restriction is written back
//! as a restriction, and facets are written in the order they were read as
//! long as the constraint still holds the same facets.

use super::document::XmlElement;
use crate::error::{Error, Result};
use crate::values::types::XS_PREFIX;
use crate::values::{
    ConstraintVariant, ExactConstraint, PatternConstraint, RangeConstraint, SemanticType,
    SourceForm, ValueConstraint,
};
use quick_xml::events::{BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;
use std::io::Write;

/// Read the value held by an IDS value element (`name`, `value`, ...)
pub fn read_value(el: &XmlElement) -> ValueConstraint {
    match el.children.first() {
        Some(child) if child.name == "simpleValue" => {
            ValueConstraint::single_undefined_exact(child.text())
                .with_source_form(SourceForm::SimpleValue)
        }
        Some(child) => read_restriction(child),
        None => ValueConstraint::default(),
    }
}

fn local_name(qualified: &str) -> &str {
    qualified.rsplit_once(':').map_or(qualified, |(_, local)| local)
}

fn read_restriction(el: &XmlElement) -> ValueConstraint {
    let base = el.attribute("base").map(local_name);
    let mut variants: Vec<ConstraintVariant> = Vec::new();
    let mut range: Option<(usize, RangeConstraint)> = None;
    let mut facets = Vec::new();

    for child in &el.children {
        let value = child.attribute("value").unwrap_or("").to_string();
        let name = child.name.as_str();
        match name {
            "enumeration" => variants.push(ExactConstraint::new(value).into()),
            "pattern" => variants.push(PatternConstraint::new(value).into()),
            "minInclusive" | "minExclusive" | "maxInclusive" | "maxExclusive" => {
                let position = variants.len();
                let (_, r) = range.get_or_insert_with(|| (position, RangeConstraint::default()));
                let inclusive = name.ends_with("Inclusive");
                if name.starts_with("min") {
                    r.min_value = Some(value);
                    r.min_inclusive = inclusive;
                } else {
                    r.max_value = Some(value);
                    r.max_inclusive = inclusive;
                }
            }
            _ => continue,
        }
        facets.push(name.to_string());
    }
    if let Some((position, r)) = range {
        variants.insert(position, r.into());
    }

    let base_type = base.map(SemanticType::from_xsd_name).unwrap_or_default();
    let mut constraint = ValueConstraint::of_type(base_type);
    for variant in variants {
        constraint.add_accepted(variant);
    }
    constraint.with_source_form(SourceForm::Restriction {
        base: base.map(str::to_string),
        facets,
    })
}

/// Write `<tag>` holding the XML form of a constraint
pub fn write_value<W: Write>(writer: &mut Writer<W>, tag: &str, value: &ValueConstraint) -> Result<()> {
    writer.write_event(Event::Start(BytesStart::new(tag)))?;
    match (&value.source_form, value.single_undefined_exact_value()) {
        (Some(SourceForm::Restriction { .. }), _) | (_, None) => write_restriction(writer, value)?,
        (_, Some(literal)) => write_text_element(writer, "simpleValue", literal)?,
    }
    writer.write_event(Event::End(BytesEnd::new(tag)))?;
    Ok(())
}

/// Facet element name and value pairs of a restriction
type FacetList<'a> = Vec<(&'static str, &'a str)>;

fn min_facet(r: &RangeConstraint) -> Option<(&'static str, &str)> {
    let tag = if r.min_inclusive { "xs:minInclusive" } else { "xs:minExclusive" };
    r.min_value.as_deref().map(|v| (tag, v))
}

fn max_facet(r: &RangeConstraint) -> Option<(&'static str, &str)> {
    let tag = if r.max_inclusive { "xs:maxInclusive" } else { "xs:maxExclusive" };
    r.max_value.as_deref().map(|v| (tag, v))
}

/// Facets in variant order, range bounds minimum first
fn facets_in_variant_order(value: &ValueConstraint) -> FacetList<'_> {
    let mut facets = Vec::new();
    for variant in value.accepted() {
        match variant {
            ConstraintVariant::Exact(e) => facets.push(("xs:enumeration", e.value.as_str())),
            ConstraintVariant::Pattern(p) => facets.push(("xs:pattern", p.pattern())),
            ConstraintVariant::Range(r) => {
                facets.extend(min_facet(r));
                facets.extend(max_facet(r));
            }
        }
    }
    facets
}

/// Facets in the order they were read; `None` once the content changed
fn facets_in_read_order<'a>(value: &'a ValueConstraint, order: &[String]) -> Option<FacetList<'a>> {
    let mut exacts = value.accepted().iter().filter_map(|v| match v {
        ConstraintVariant::Exact(e) => Some(("xs:enumeration", e.value.as_str())),
        _ => None,
    });
    let mut patterns = value.accepted().iter().filter_map(|v| match v {
        ConstraintVariant::Pattern(p) => Some(("xs:pattern", p.pattern())),
        _ => None,
    });
    let range = value.accepted().iter().find_map(|v| match v {
        ConstraintVariant::Range(r) if !r.is_unbounded() => Some(r),
        _ => None,
    });
    let mut min = range.and_then(min_facet);
    let mut max = range.and_then(max_facet);

    let mut facets = Vec::with_capacity(order.len());
    for name in order {
        let facet = match name.as_str() {
            "enumeration" => exacts.next(),
            "pattern" => patterns.next(),
            n if n.starts_with("min") => min.take(),
            n if n.starts_with("max") => max.take(),
            _ => None,
        }?;
        facets.push(facet);
    }
    let leftover = exacts.next().is_some() || patterns.next().is_some();
    if leftover || min.is_some() || max.is_some() {
        return None;
    }
    Some(facets)
}

fn write_restriction<W: Write>(writer: &mut Writer<W>, value: &ValueConstraint) -> Result<()> {
    // a range without bounds accepts what the type gate accepts and has no facet
    let ranges = value
        .accepted()
        .iter()
        .filter(|v| matches!(v, ConstraintVariant::Range(r) if !r.is_unbounded()))
        .count();
    if ranges > 1 {
        return Err(Error::UnsupportedExportShape(format!(
            "value '{}' holds {} ranges, a restriction carries one",
            value, ranges
        )));
    }

    let (read_base, read_order) = match &value.source_form {
        Some(SourceForm::Restriction { base, facets }) => (base.as_deref(), Some(facets)),
        _ => (None, None),
    };
    // the base as read, unless the constraint was re-typed since
    let base = match read_base {
        Some(local) if SemanticType::from_xsd_name(local) == value.base_type => {
            Some(format!("{}:{}", XS_PREFIX, local))
        }
        _ => value.base_type.xsd_name(),
    };
    let facets = read_order
        .and_then(|order| facets_in_read_order(value, order))
        .unwrap_or_else(|| facets_in_variant_order(value));

    let mut start = BytesStart::new("xs:restriction");
    if let Some(base) = &base {
        start.push_attribute(("base", base.as_str()));
    }
    if facets.is_empty() {
        writer.write_event(Event::Empty(start))?;
        return Ok(());
    }

    writer.write_event(Event::Start(start))?;
    for (tag, value) in facets {
        write_facet(writer, tag, value)?;
    }
    writer.write_event(Event::End(BytesEnd::new("xs:restriction")))?;
    Ok(())
}

fn write_facet<W: Write>(writer: &mut Writer<W>, tag: &str, value: &str) -> Result<()> {
    let mut el = BytesStart::new(tag);
    el.push_attribute(("value", value));
    writer.write_event(Event::Empty(el))?;
    Ok(())
}

/// Write `<tag>text</tag>`
pub fn write_text_element<W: Write>(writer: &mut Writer<W>, tag: &str, text: &str) -> Result<()> {
    writer.write_event(Event::Start(BytesStart::new(tag)))?;
    writer.write_event(Event::Text(BytesText::new(text)))?;
    writer.write_event(Event::End(BytesEnd::new(tag)))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::document;
    use crate::limits::Limits;
    use crate::values::Value;

    fn write(value: &ValueConstraint) -> String {
        let mut writer = Writer::new(Vec::new());
        write_value(&mut writer, "value", value).unwrap();
        String::from_utf8(writer.into_inner()).unwrap()
    }

    fn read(xml: &str) -> ValueConstraint {
        let wrapped = format!(
            r#"<value xmlns="http://standards.buildingsmart.org/IDS" xmlns:xs="http://www.w3.org/2001/XMLSchema">{}</value>"#,
            xml
        );
        read_value(&document::parse(wrapped.as_bytes(), &Limits::default()).unwrap())
    }

    #[test]
    fn test_simple_value() {
        let vc = read("<simpleValue>IFCWALL</simpleValue>");
        assert!(vc.is_single_undefined_exact());
        assert_eq!(write(&vc), "<value><simpleValue>IFCWALL</simpleValue></value>");
    }

    #[test]
    fn test_restriction_keeps_variant_positions() {
        let vc = read(
            r#"<xs:restriction base="xs:double"><xs:enumeration value="1"/><xs:minInclusive value="2"/><xs:maxExclusive value="3"/><xs:pattern value="9.*"/></xs:restriction>"#,
        );
        assert_eq!(vc.base_type, SemanticType::Double);
        assert_eq!(vc.accepted().len(), 3);
        assert!(matches!(vc.accepted()[1], ConstraintVariant::Range(_)));
        assert!(vc.is_satisfied_by(&Value::Double(2.5)));
        assert!(!vc.is_satisfied_by(&Value::Double(3.0)));
        assert_eq!(
            write(&vc),
            r#"<value><xs:restriction base="xs:double"><xs:enumeration value="1"/><xs:minInclusive value="2"/><xs:maxExclusive value="3"/><xs:pattern value="9.*"/></xs:restriction></value>"#
        );
    }

    #[test]
    fn test_typed_single_literal_uses_restriction() {
        let xml = write(&ValueConstraint::from("Concrete"));
        assert!(xml.contains(r#"<xs:restriction base="xs:string"><xs:enumeration value="Concrete"/>"#));
    }

    #[test]
    fn test_untyped_restriction_omits_base() {
        let mut vc = ValueConstraint::default();
        vc.add_accepted(PatternConstraint::new("A.*"));
        assert!(write(&vc).contains("<xs:restriction><xs:pattern"));
        assert_eq!(read(r#"<xs:restriction><xs:pattern value="A.*"/></xs:restriction>"#), vc);
    }

    #[test]
    fn test_single_literal_restriction_stays_a_restriction() {
        let xml = r#"<xs:restriction base="xs:gYear"><xs:enumeration value="2020"/></xs:restriction>"#;
        let vc = read(xml);
        assert!(vc.is_single_undefined_exact());
        assert_eq!(write(&vc), format!("<value>{}</value>", xml));

        let xml = r#"<xs:restriction><xs:enumeration value="2020"/></xs:restriction>"#;
        assert_eq!(write(&read(xml)), format!("<value>{}</value>", xml));
    }

    #[test]
    fn test_interleaved_facets_keep_their_order() {
        let xml = r#"<xs:restriction base="xs:integer"><xs:minInclusive value="1"/><xs:enumeration value="50"/><xs:maxInclusive value="9"/></xs:restriction>"#;
        let vc = read(xml);
        assert!(vc.is_satisfied_by(&Value::Integer(50)));
        assert!(vc.is_satisfied_by(&Value::Integer(5)));
        assert_eq!(write(&vc), format!("<value>{}</value>", xml));

        // edited content falls back to variant order
        let mut edited = vc.clone();
        edited.add_accepted(PatternConstraint::new("7+"));
        assert!(write(&edited).contains(
            r#"<xs:minInclusive value="1"/><xs:maxInclusive value="9"/><xs:enumeration value="50"/><xs:pattern value="7+"/>"#
        ));
    }

    #[test]
    fn test_retyped_constraint_writes_its_type() {
        let mut vc = read(r#"<xs:restriction base="xs:gYear"><xs:enumeration value="2020"/></xs:restriction>"#);
        vc.base_type = SemanticType::Integer;
        assert!(write(&vc).contains(r#"<xs:restriction base="xs:integer">"#));
    }

    #[test]
    fn test_unbounded_range_writes_no_facet() {
        let vc = ValueConstraint::range(SemanticType::Double, RangeConstraint::default());
        assert_eq!(write(&vc), r#"<value><xs:restriction base="xs:double"/></value>"#);

        let mut mixed = ValueConstraint::of_type(SemanticType::Double);
        mixed.add_accepted(RangeConstraint::default());
        mixed.add_accepted(RangeConstraint::at_least("1", true));
        assert!(write(&mixed).contains(r#"<xs:minInclusive value="1"/></xs:restriction>"#));
    }

    #[test]
    fn test_simple_value_whitespace_is_kept() {
        let vc = read("<simpleValue> A </simpleValue>");
        assert_eq!(vc.single_exact(), Some(" A "));
        assert_eq!(write(&vc), "<value><simpleValue> A </simpleValue></value>");
    }

    #[test]
    fn test_two_ranges_cannot_be_written() {
        let mut vc = ValueConstraint::of_type(SemanticType::Integer);
        vc.add_accepted(RangeConstraint::at_least("1", true));
        vc.add_accepted(RangeConstraint::at_most("9", true));
        let mut writer = Writer::new(Vec::new());
        assert!(matches!(
            write_value(&mut writer, "value", &vc),
            Err(Error::UnsupportedExportShape(_))
        ));
    }
}
