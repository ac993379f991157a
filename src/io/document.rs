//! Namespace-resolved XML element tree
//!
//! Input documents are read with the quick-xml namespace reader into a
//! small owned tree. Namespace declarations are resolved and dropped from
//! the attribute lists; every element and attribute carries its namespace
//! URI. Depth and size limits are enforced while reading.
//!
//! Text is kept as written. Whitespace between child elements is dropped
//! once an element turns out to have element content.

use crate::error::{Error, Result};
use crate::limits::Limits;
use quick_xml::events::{BytesStart, Event};
use quick_xml::name::ResolveResult;
use quick_xml::NsReader;

/// One attribute of an element
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct XmlAttribute {
    /// Namespace URI, `None` for unqualified attributes
    pub namespace: Option<String>,
    /// Local name
    pub name: String,
    /// Unescaped value
    pub value: String,
}

/// XML element with resolved names
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct XmlElement {
    /// Namespace URI
    pub namespace: Option<String>,
    /// Local name
    pub name: String,
    /// Attributes, namespace declarations excluded
    pub attributes: Vec<XmlAttribute>,
    /// Concatenated text content, `None` when there is none
    pub text: Option<String>,
    /// Child elements in document order
    pub children: Vec<XmlElement>,
}

impl XmlElement {
    /// Whether the element has this namespace and local name
    pub fn is(&self, namespace: &str, name: &str) -> bool {
        self.name == name && self.namespace.as_deref() == Some(namespace)
    }

    /// Unqualified attribute value
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|a| a.namespace.is_none() && a.name == name)
            .map(|a| a.value.as_str())
    }

    /// Namespaced attribute value
    pub fn attribute_ns(&self, namespace: &str, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|a| a.namespace.as_deref() == Some(namespace) && a.name == name)
            .map(|a| a.value.as_str())
    }

    /// First child with the given local name
    pub fn child(&self, name: &str) -> Option<&XmlElement> {
        self.children.iter().find(|c| c.name == name)
    }

    /// Children with the given local name
    pub fn children_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a XmlElement> {
        self.children.iter().filter(move |c| c.name == name)
    }

    /// Text content, empty when absent
    pub fn text(&self) -> &str {
        self.text.as_deref().unwrap_or("")
    }
}

/// Parse a document into its root element
pub fn parse(xml: &[u8], limits: &Limits) -> Result<XmlElement> {
    limits.check_xml_size(xml.len())?;

    let mut reader = NsReader::from_reader(xml);

    let mut stack: Vec<XmlElement> = Vec::new();
    let mut root: Option<XmlElement> = None;
    let mut buf = Vec::new();

    loop {
        let position = reader.buffer_position();
        let event = reader
            .read_event_into(&mut buf)
            .map_err(|e| Error::Xml(format!("error at position {}: {}", position, e)))?;
        match event {
            Event::Start(e) => {
                limits.check_xml_depth(stack.len() + 1)?;
                stack.push(element(&reader, &e)?);
            }
            Event::Empty(e) => {
                limits.check_xml_depth(stack.len() + 1)?;
                let el = element(&reader, &e)?;
                attach(&mut stack, &mut root, el)?;
            }
            Event::End(_) => {
                if let Some(mut el) = stack.pop() {
                    drop_layout_whitespace(&mut el);
                    attach(&mut stack, &mut root, el)?;
                }
            }
            Event::Text(e) => {
                let text = e
                    .unescape()
                    .map_err(|e| Error::Xml(format!("failed to unescape text: {}", e)))?;
                push_text(&mut stack, &text);
            }
            Event::CData(e) => {
                let bytes = e.into_inner();
                let text = std::str::from_utf8(&bytes)
                    .map_err(|e| Error::Xml(format!("invalid CDATA: {}", e)))?;
                push_text(&mut stack, text);
            }
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    if !stack.is_empty() {
        return Err(Error::Xml("unexpected end of document".to_string()));
    }
    root.ok_or_else(|| Error::Xml("document has no root element".to_string()))
}

fn namespace_uri(ns: ResolveResult<'_>) -> Result<Option<String>> {
    match ns {
        ResolveResult::Bound(ns) => Ok(Some(String::from_utf8_lossy(ns.as_ref()).into_owned())),
        ResolveResult::Unbound => Ok(None),
        ResolveResult::Unknown(prefix) => Err(Error::Xml(format!(
            "undeclared namespace prefix '{}'",
            String::from_utf8_lossy(&prefix)
        ))),
    }
}

fn element(reader: &NsReader<&[u8]>, start: &BytesStart) -> Result<XmlElement> {
    let (ns, local) = reader.resolve_element(start.name());
    let namespace = namespace_uri(ns)?;
    let name = std::str::from_utf8(local.as_ref())
        .map_err(|e| Error::Xml(format!("invalid element name: {}", e)))?
        .to_string();

    let mut attributes = Vec::new();
    for attr in start.attributes() {
        let attr = attr.map_err(|e| Error::Xml(format!("failed to parse attribute: {}", e)))?;
        let key = attr.key;
        if key.as_namespace_binding().is_some() {
            continue;
        }
        let (ns, local) = reader.resolve_attribute(key);
        let namespace = namespace_uri(ns)?;
        let name = std::str::from_utf8(local.as_ref())
            .map_err(|e| Error::Xml(format!("invalid attribute name: {}", e)))?
            .to_string();
        let value = attr
            .unescape_value()
            .map_err(|e| Error::Xml(format!("failed to unescape attribute value: {}", e)))?
            .into_owned();
        attributes.push(XmlAttribute {
            namespace,
            name,
            value,
        });
    }

    Ok(XmlElement {
        namespace,
        name,
        attributes,
        text: None,
        children: Vec::new(),
    })
}

fn attach(stack: &mut [XmlElement], root: &mut Option<XmlElement>, el: XmlElement) -> Result<()> {
    match stack.last_mut() {
        Some(parent) => parent.children.push(el),
        None if root.is_none() => *root = Some(el),
        None => return Err(Error::Xml("more than one root element".to_string())),
    }
    Ok(())
}

/// Indentation around child elements is not content
fn drop_layout_whitespace(el: &mut XmlElement) {
    let layout = el.text.as_deref().map_or(false, |t| t.trim().is_empty());
    if layout && !el.children.is_empty() {
        el.text = None;
    }
}

fn push_text(stack: &mut [XmlElement], text: &str) {
    if let Some(current) = stack.last_mut() {
        current.text.get_or_insert_with(String::new).push_str(text);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_namespaces_are_resolved() {
        let xml = br#"<a:root xmlns:a="urn:a" xmlns="urn:d" xmlns:x="urn:x" x:attr="1" plain="2">
            <child>text &amp; more</child>
        </a:root>"#;
        let root = parse(xml, &Limits::default()).unwrap();
        assert!(root.is("urn:a", "root"));
        assert_eq!(root.attributes.len(), 2);
        assert_eq!(root.attribute_ns("urn:x", "attr"), Some("1"));
        assert_eq!(root.attribute("plain"), Some("2"));
        let child = root.child("child").unwrap();
        assert!(child.is("urn:d", "child"));
        assert_eq!(child.text(), "text & more");
    }

    #[test]
    fn test_leaf_text_is_kept_as_written() {
        let xml = b"<root>\n  <value> A </value>\n  <blank>   </blank>\n</root>";
        let root = parse(xml, &Limits::default()).unwrap();
        assert_eq!(root.text, None);
        assert_eq!(root.children.len(), 2);
        assert_eq!(root.children[0].text(), " A ");
        assert_eq!(root.children[1].text(), "   ");
    }

    #[test]
    fn test_depth_limit() {
        let limits = Limits {
            max_xml_depth: 2,
            ..Limits::default()
        };
        assert!(parse(b"<a><b/></a>", &limits).is_ok());
        assert!(matches!(
            parse(b"<a><b><c/></b></a>", &limits),
            Err(Error::LimitExceeded(_))
        ));
    }

    #[test]
    fn test_malformed() {
        assert!(matches!(parse(b"<a><b></a>", &Limits::default()), Err(Error::Xml(_))));
        assert!(matches!(parse(b"", &Limits::default()), Err(Error::Xml(_))));
        assert!(matches!(parse(b"<p:a/>", &Limits::default()), Err(Error::Xml(_))));
    }
}
