//! Structural summary of XML documents
//!
//! Two documents are structurally equivalent when every node has the same
//! local name, the same number of attributes and the same children in the
//! same order. Text, attribute values and namespace declarations are not
//! part of the summary.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};

/// Shape of one element and its subtree
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct XmlElementSummary {
    /// Local name
    pub name: String,

    /// Number of attributes, namespace declarations excluded
    pub attribute_count: usize,

    /// Child elements in document order
    pub children: Vec<XmlElementSummary>,
}

impl XmlElementSummary {
    /// Summarize the root element of a document
    pub fn from_xml(xml: &str) -> Result<Self> {
        let document = roxmltree::Document::parse(xml).map_err(|e| Error::Xml(e.to_string()))?;
        Ok(Self::from_node(document.root_element()))
    }

    /// Summarize a document given as bytes
    pub fn from_bytes(xml: &[u8]) -> Result<Self> {
        let text = std::str::from_utf8(xml).map_err(|e| Error::Xml(e.to_string()))?;
        Self::from_xml(text)
    }

    fn from_node(node: roxmltree::Node<'_, '_>) -> Self {
        Self {
            name: node.tag_name().name().to_string(),
            attribute_count: node.attributes().count(),
            children: node
                .children()
                .filter(|c| c.is_element())
                .map(Self::from_node)
                .collect(),
        }
    }

    /// Total number of elements in the subtree
    pub fn element_count(&self) -> usize {
        1 + self.children.iter().map(Self::element_count).sum::<usize>()
    }

    /// Path of the first node where the two summaries differ, if any
    pub fn first_difference(&self, other: &Self) -> Option<String> {
        self.difference_at(other, format!("/{}", self.name))
    }

    fn difference_at(&self, other: &Self, path: String) -> Option<String> {
        if self.name != other.name {
            return Some(format!("{}: element {} != {}", path, self.name, other.name));
        }
        if self.attribute_count != other.attribute_count {
            return Some(format!(
                "{}: {} attributes != {}",
                path, self.attribute_count, other.attribute_count
            ));
        }
        if self.children.len() != other.children.len() {
            return Some(format!(
                "{}: {} children != {}",
                path,
                self.children.len(),
                other.children.len()
            ));
        }
        self.children
            .iter()
            .zip(&other.children)
            .enumerate()
            .find_map(|(index, (a, b))| {
                a.difference_at(b, format!("{}/{}[{}]", path, a.name, index + 1))
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_namespace_declarations_are_not_counted() {
        let summary = XmlElementSummary::from_xml(
            r#"<ids xmlns="urn:a" xmlns:xs="urn:b" a="1"><info><title>t</title></info></ids>"#,
        )
        .unwrap();
        assert_eq!(summary.name, "ids");
        assert_eq!(summary.attribute_count, 1);
        assert_eq!(summary.element_count(), 3);
    }

    #[test]
    fn test_text_is_ignored() {
        let a = XmlElementSummary::from_xml("<a x='1'><b>one</b></a>").unwrap();
        let b = XmlElementSummary::from_xml("<a x='2'>\n  <b>two</b>\n</a>").unwrap();
        assert_eq!(a.first_difference(&b), None);
    }

    #[test]
    fn test_first_difference_path() {
        let a = XmlElementSummary::from_xml("<a><b/><b><c/></b></a>").unwrap();
        let b = XmlElementSummary::from_xml("<a><b/><b><c y='1'/></b></a>").unwrap();
        let diff = a.first_difference(&b).unwrap();
        assert!(diff.starts_with("/a/b[2]/c[1]:"), "{}", diff);
    }

    #[test]
    fn test_malformed_input() {
        assert!(matches!(XmlElementSummary::from_xml("<a>"), Err(Error::Xml(_))));
    }
}
