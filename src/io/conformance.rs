//! Conformance of IDS documents
//!
//! A hand-written content model of the IDS 0.9 schema, checked against a
//! parsed element tree before any mapping happens. The first problem found
//! is reported as a [`SchemaViolation`] carrying the path of the offending
//! node.

use super::document::XmlElement;
use super::{IDS_NAMESPACE, IDS_XSD_FILE, XSI_NAMESPACE, XS_NAMESPACE};
use crate::config::ImportConfig;
use crate::error::{Result, SchemaViolation};
use crate::schema::IfcSchemaVersion;
use chrono::NaiveDate;
use log::warn;

/// (child name, min occurs, max occurs)
type Particle = (&'static str, u32, Option<u32>);

const FACETS: &[&str] = &[
    "entity",
    "attribute",
    "property",
    "classification",
    "material",
    "partOf",
];

const RESTRICTION_FACETS: &[&str] = &[
    "enumeration",
    "pattern",
    "minInclusive",
    "minExclusive",
    "maxInclusive",
    "maxExclusive",
];

const FACET_ATTRIBUTES: &[(&str, bool)] = &[("uri", false), ("instructions", false)];

fn violation(message: impl Into<String>, path: &str) -> SchemaViolation {
    SchemaViolation::new(message).with_path(path)
}

/// Schema file named in `xsi:schemaLocation`, if any
pub fn declared_schema(root: &XmlElement) -> Option<&str> {
    root.attribute_ns(XSI_NAMESPACE, "schemaLocation")?
        .split_whitespace()
        .filter(|token| token.ends_with(".xsd"))
        .last()
        .map(|token| token.rsplit('/').next().unwrap_or(token))
}

/// Check a whole document
pub fn check(root: &XmlElement, config: &ImportConfig) -> Result<()> {
    let path = format!("/{}", root.name);
    if !root.is(IDS_NAMESPACE, "ids") {
        return Err(violation("root element must be 'ids'", &path)
            .with_reason(format!("expected namespace {}", IDS_NAMESPACE))
            .into());
    }
    check_version(root, config, &path)?;
    attributes(root, &path, &[], true)?;
    sequence(root, &path, &[("info", 1, Some(1)), ("specifications", 1, Some(1))])?;
    for (child, child_path) in children(root, &path) {
        match child.name.as_str() {
            "info" => info(child, &child_path)?,
            _ => specifications(child, &child_path, config)?,
        }
    }
    Ok(())
}

fn check_version(root: &XmlElement, config: &ImportConfig, path: &str) -> Result<()> {
    match declared_schema(root) {
        None => Ok(()),
        Some(file) if file == IDS_XSD_FILE => Ok(()),
        Some(file) if config.lenient_version => {
            warn!(declared = file, expected = IDS_XSD_FILE; "reading document of another IDS version");
            Ok(())
        }
        Some(file) => Err(violation("unsupported IDS schema version", path)
            .with_reason(format!("document declares {}, expected {}", file, IDS_XSD_FILE))
            .into()),
    }
}

/// Children paired with their paths; repeated names get a 1-based index
fn children<'a>(el: &'a XmlElement, path: &str) -> Vec<(&'a XmlElement, String)> {
    let mut seen: Vec<(&str, usize)> = Vec::new();
    el.children
        .iter()
        .map(|child| {
            let total = el.children.iter().filter(|c| c.name == child.name).count();
            let ordinal = match seen.iter_mut().find(|(n, _)| *n == child.name) {
                Some((_, n)) => {
                    *n += 1;
                    *n
                }
                None => {
                    seen.push((&child.name, 1));
                    1
                }
            };
            let child_path = if total > 1 {
                format!("{}/{}[{}]", path, child.name, ordinal)
            } else {
                format!("{}/{}", path, child.name)
            };
            (child, child_path)
        })
        .collect()
}

fn attributes(el: &XmlElement, path: &str, allowed: &[(&str, bool)], xsi_allowed: bool) -> Result<()> {
    for attr in &el.attributes {
        let ok = match attr.namespace.as_deref() {
            None => allowed.iter().any(|(name, _)| *name == attr.name),
            Some(XSI_NAMESPACE) => xsi_allowed,
            Some(_) => false,
        };
        if !ok {
            return Err(violation(format!("unexpected attribute '{}'", attr.name), path).into());
        }
    }
    for (name, required) in allowed {
        if *required && el.attribute(name).is_none() {
            return Err(violation(format!("missing required attribute '{}'", name), path).into());
        }
    }
    Ok(())
}

fn sequence(el: &XmlElement, path: &str, model: &[Particle]) -> Result<()> {
    let mut counts = vec![0u32; model.len()];
    let mut position = 0;
    for (child, child_path) in children(el, path) {
        if child.namespace.as_deref() != Some(IDS_NAMESPACE) {
            return Err(violation(format!("unexpected element '{}'", child.name), &child_path)
                .with_reason("element is not in the IDS namespace")
                .into());
        }
        match model[position..].iter().position(|(name, _, _)| *name == child.name) {
            Some(offset) => {
                position += offset;
                counts[position] += 1;
                if model[position].2.map_or(false, |max| counts[position] > max) {
                    return Err(violation(format!("too many '{}' elements", child.name), &child_path).into());
                }
            }
            None => {
                let reason = if model.iter().any(|(name, _, _)| *name == child.name) {
                    "element is out of order"
                } else {
                    "element is not allowed here"
                };
                return Err(violation(format!("unexpected element '{}'", child.name), &child_path)
                    .with_reason(reason)
                    .into());
            }
        }
    }
    for ((name, min, _), count) in model.iter().zip(counts) {
        if count < *min {
            return Err(violation(format!("missing required element '{}'", name), path).into());
        }
    }
    Ok(())
}

fn text_only(el: &XmlElement, path: &str) -> Result<()> {
    attributes(el, path, &[], false)?;
    match el.children.first() {
        Some(child) => Err(violation(format!("unexpected element '{}'", child.name), path)
            .with_reason("text content expected")
            .into()),
        None => Ok(()),
    }
}

fn info(el: &XmlElement, path: &str) -> Result<()> {
    attributes(el, path, &[], false)?;
    sequence(
        el,
        path,
        &[
            ("title", 1, Some(1)),
            ("copyright", 0, Some(1)),
            ("version", 0, Some(1)),
            ("description", 0, Some(1)),
            ("author", 0, Some(1)),
            ("date", 0, Some(1)),
            ("purpose", 0, Some(1)),
            ("milestone", 0, Some(1)),
        ],
    )?;
    for (child, child_path) in children(el, path) {
        text_only(child, &child_path)?;
        if child.name == "date" && parse_xs_date(child.text()).is_none() {
            return Err(violation("invalid date", &child_path)
                .with_reason(format!("'{}' is not an xs:date", child.text()))
                .into());
        }
    }
    Ok(())
}

/// Parse an `xs:date`, ignoring a trailing timezone
pub fn parse_xs_date(text: &str) -> Option<NaiveDate> {
    let text = text.trim();
    let date = text.get(..10).unwrap_or(text);
    let rest = text.get(10..).unwrap_or("");
    let zone_ok = rest.is_empty()
        || rest == "Z"
        || (rest.len() == 6 && (rest.starts_with('+') || rest.starts_with('-')));
    if !zone_ok {
        return None;
    }
    NaiveDate::parse_from_str(date, "%Y-%m-%d").ok()
}

fn specifications(el: &XmlElement, path: &str, config: &ImportConfig) -> Result<()> {
    attributes(el, path, &[], false)?;
    sequence(el, path, &[("specification", 1, None)])?;
    config.limits.check_specifications(el.children.len())?;
    for (child, child_path) in children(el, path) {
        specification(child, &child_path)?;
    }
    Ok(())
}

fn specification(el: &XmlElement, path: &str) -> Result<()> {
    attributes(
        el,
        path,
        &[
            ("name", true),
            ("ifcVersion", true),
            ("minOccurs", true),
            ("maxOccurs", true),
            ("identifier", false),
            ("description", false),
            ("instructions", false),
        ],
        false,
    )?;
    let versions = el.attribute("ifcVersion").unwrap_or("");
    if versions.split_whitespace().next().is_none() {
        return Err(violation("ifcVersion must name at least one version", path).into());
    }
    for token in versions.split_whitespace() {
        if IfcSchemaVersion::from_token(token).is_none() {
            return Err(violation(format!("unknown ifcVersion '{}'", token), path).into());
        }
    }
    occurrences(el, path)?;
    sequence(el, path, &[("applicability", 1, Some(1)), ("requirements", 1, Some(1))])?;
    for (child, child_path) in children(el, path) {
        facet_block(child, &child_path)?;
    }
    Ok(())
}

/// Parse `minOccurs`/`maxOccurs`; a missing or `unbounded` max is `None`
pub fn parse_occurrences(el: &XmlElement) -> std::result::Result<(u32, Option<u32>), String> {
    let min = match el.attribute("minOccurs") {
        Some(text) => text
            .trim()
            .parse::<u32>()
            .map_err(|_| format!("minOccurs '{}' is not a non-negative integer", text))?,
        None => 1,
    };
    let max = match el.attribute("maxOccurs").map(str::trim) {
        None | Some("unbounded") => None,
        Some(text) => Some(
            text.parse::<u32>()
                .map_err(|_| format!("maxOccurs '{}' is not a non-negative integer or 'unbounded'", text))?,
        ),
    };
    Ok((min, max))
}

fn occurrences(el: &XmlElement, path: &str) -> Result<()> {
    let (min, max) = parse_occurrences(el).map_err(|reason| violation("invalid occurrence", path).with_reason(reason))?;
    if let Some(max) = max {
        if max < min {
            return Err(violation("invalid occurrence", path)
                .with_reason(format!("maxOccurs {} is below minOccurs {}", max, min))
                .into());
        }
    }
    Ok(())
}

fn facet_block(el: &XmlElement, path: &str) -> Result<()> {
    attributes(el, path, &[], false)?;
    for (child, child_path) in children(el, path) {
        if child.namespace.as_deref() != Some(IDS_NAMESPACE) || !FACETS.contains(&child.name.as_str()) {
            return Err(violation(format!("unexpected element '{}'", child.name), &child_path)
                .with_reason("expected a facet")
                .into());
        }
        facet(child, &child_path)?;
    }
    Ok(())
}

fn facet(el: &XmlElement, path: &str) -> Result<()> {
    let model: &[Particle] = match el.name.as_str() {
        "entity" => &[("name", 1, Some(1)), ("predefinedType", 0, Some(1))],
        "attribute" => &[("name", 1, Some(1)), ("value", 0, Some(1))],
        "property" => &[("propertySet", 1, Some(1)), ("name", 1, Some(1)), ("value", 0, Some(1))],
        "classification" => &[("value", 0, Some(1)), ("system", 0, Some(1))],
        "material" => &[("value", 0, Some(1))],
        _ => {
            attributes(el, path, &[("entity", true)], false)?;
            return match el.children.first() {
                Some(child) => Err(violation(format!("unexpected element '{}'", child.name), path).into()),
                None => Ok(()),
            };
        }
    };
    if el.name == "property" {
        attributes(el, path, &[("uri", false), ("instructions", false), ("dataType", false)], false)?;
    } else {
        attributes(el, path, FACET_ATTRIBUTES, false)?;
    }
    sequence(el, path, model)?;
    for (child, child_path) in children(el, path) {
        ids_value(child, &child_path)?;
    }
    Ok(())
}

fn ids_value(el: &XmlElement, path: &str) -> Result<()> {
    attributes(el, path, &[], false)?;
    if !el.text().trim().is_empty() {
        return Err(violation("unexpected text", path)
            .with_reason("expected simpleValue or xs:restriction")
            .into());
    }
    let [child] = el.children.as_slice() else {
        return Err(violation("expected exactly one of simpleValue or xs:restriction", path).into());
    };
    if child.is(IDS_NAMESPACE, "simpleValue") {
        text_only(child, &format!("{}/simpleValue", path))
    } else if child.is(XS_NAMESPACE, "restriction") {
        restriction(child, &format!("{}/restriction", path))
    } else {
        Err(violation(format!("unexpected element '{}'", child.name), path)
            .with_reason("expected simpleValue or xs:restriction")
            .into())
    }
}

fn restriction(el: &XmlElement, path: &str) -> Result<()> {
    attributes(el, path, &[("base", false)], false)?;
    let mut lower = 0;
    let mut upper = 0;
    for (child, child_path) in children(el, path) {
        if child.namespace.as_deref() != Some(XS_NAMESPACE) || !RESTRICTION_FACETS.contains(&child.name.as_str()) {
            return Err(violation(format!("unexpected element '{}'", child.name), &child_path)
                .with_reason("unsupported restriction facet")
                .into());
        }
        attributes(child, &child_path, &[("value", true)], false)?;
        if let Some(grandchild) = child.children.first() {
            return Err(violation(format!("unexpected element '{}'", grandchild.name), &child_path).into());
        }
        if child.name.starts_with("min") {
            lower += 1;
        } else if child.name.starts_with("max") {
            upper += 1;
        }
        if lower > 1 || upper > 1 {
            return Err(violation("more than one bound on the same side", &child_path).into());
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::io::document;
    use crate::limits::Limits;

    fn doc(specs: &str) -> String {
        format!(
            r#"<ids xmlns="http://standards.buildingsmart.org/IDS" xmlns:xs="http://www.w3.org/2001/XMLSchema"
                   xmlns:xsi="http://www.w3.org/2001/XMLSchema-instance"
                   xsi:schemaLocation="http://standards.buildingsmart.org/IDS http://standards.buildingsmart.org/IDS/ids_09.xsd">
                <info><title>t</title><date>2023-05-01</date></info>
                <specifications>{}</specifications>
            </ids>"#,
            specs
        )
    }

    fn run(xml: &str, config: &ImportConfig) -> Result<()> {
        let root = document::parse(xml.as_bytes(), &Limits::default())?;
        check(&root, config)
    }

    fn violation_of(xml: &str) -> SchemaViolation {
        match run(xml, &ImportConfig::default()) {
            Err(Error::SchemaViolation(v)) => v,
            other => panic!("expected a schema violation, got {:?}", other),
        }
    }

    const GOOD: &str = r#"<specification name="s" ifcVersion="IFC4" minOccurs="1" maxOccurs="unbounded">
        <applicability><entity><name><simpleValue>IFCWALL</simpleValue></name></entity></applicability>
        <requirements>
            <property dataType="IfcLabel"><propertySet><simpleValue>P</simpleValue></propertySet><name><simpleValue>N</simpleValue></name>
                <value><xs:restriction base="xs:double"><xs:minInclusive value="1"/><xs:maxExclusive value="2"/></xs:restriction></value>
            </property>
            <partOf entity="IfcSystem"/>
        </requirements>
    </specification>"#;

    #[test]
    fn test_conformant_document() {
        run(&doc(GOOD), &ImportConfig::default()).unwrap();
    }

    #[test]
    fn test_wrong_root() {
        let v = violation_of(r#"<ids xmlns="urn:other"/>"#);
        assert_eq!(v.path.as_deref(), Some("/ids"));
    }

    #[test]
    fn test_missing_required_attribute() {
        let v = violation_of(&doc(&GOOD.replace(r#" minOccurs="1""#, "")));
        assert!(v.message.contains("minOccurs"));
        assert_eq!(v.path.as_deref(), Some("/ids/specifications/specification"));
    }

    #[test]
    fn test_max_below_min() {
        let v = violation_of(&doc(&GOOD.replace(r#"maxOccurs="unbounded""#, r#"maxOccurs="0""#)));
        assert!(v.reason.unwrap().contains("below"));
    }

    #[test]
    fn test_unknown_version_token() {
        let v = violation_of(&doc(&GOOD.replace("IFC4", "IFC9")));
        assert!(v.message.contains("IFC9"));
    }

    #[test]
    fn test_unknown_element_and_order() {
        let v = violation_of(&doc(&GOOD.replace("<partOf", "<colour/><partOf")));
        assert!(v.message.contains("colour"));

        let swapped = GOOD
            .replace("<propertySet><simpleValue>P</simpleValue></propertySet><name><simpleValue>N</simpleValue></name>",
                     "<name><simpleValue>N</simpleValue></name><propertySet><simpleValue>P</simpleValue></propertySet>");
        let v = violation_of(&doc(&swapped));
        assert_eq!(v.reason.as_deref(), Some("element is out of order"));
    }

    #[test]
    fn test_double_bound() {
        let v = violation_of(&doc(&GOOD.replace(
            r#"<xs:maxExclusive value="2"/>"#,
            r#"<xs:minExclusive value="0"/>"#,
        )));
        assert!(v.message.contains("same side"));
    }

    #[test]
    fn test_bad_date() {
        let v = violation_of(&doc(GOOD).replace("2023-05-01", "May 1st"));
        assert_eq!(v.path.as_deref(), Some("/ids/info/date"));
    }

    #[test]
    fn test_other_version_rejected_unless_lenient() {
        let xml = doc(GOOD).replace("ids_09.xsd", "ids_05.xsd");
        assert!(run(&xml, &ImportConfig::default()).is_err());
        run(&xml, &ImportConfig::default().with_lenient_version(true)).unwrap();
    }

    #[test]
    fn test_parse_xs_date() {
        assert!(parse_xs_date("2023-05-01").is_some());
        assert!(parse_xs_date("2023-05-01Z").is_some());
        assert!(parse_xs_date("2023-05-01+02:00").is_some());
        assert!(parse_xs_date("2023-5-1x").is_none());
    }
}
