//! Candidate element boundary
//!
//! Facets never query a model store. They are evaluated against a
//! [`CandidateElement`], an accessor returning already-extracted values for
//! one element. [`ElementDescriptor`] is a plain in-memory implementation.

use crate::values::Value;

/// One property value of an element
#[derive(Debug, Clone, PartialEq)]
pub struct PropertyValue {
    /// Name of the property set holding the property
    pub property_set: String,
    /// Property name
    pub name: String,
    /// Nominal value, `None` when unset
    pub value: Option<Value>,
    /// Declared measure type (e.g. `IfcLengthMeasure`)
    pub data_type: Option<String>,
}

/// A classification reference attached to an element
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassificationReference {
    /// Classification system name
    pub system: String,
    /// Reference code within the system
    pub identification: String,
}

/// Read access to the data of one model element
pub trait CandidateElement {
    /// Class name of the element (e.g. `IfcWall`)
    fn entity_type(&self) -> Option<&str>;

    /// Predefined type, resolved from the element or its type object
    fn predefined_type(&self) -> Option<String>;

    /// Attribute names and values; `None` for unset attributes
    fn attributes(&self) -> Vec<(String, Option<Value>)>;

    /// Property values across all property sets
    fn properties(&self) -> Vec<PropertyValue>;

    /// Classification references
    fn classifications(&self) -> Vec<ClassificationReference>;

    /// Material names
    fn materials(&self) -> Vec<String>;

    /// Class names of the aggregates, groups and systems the element belongs to
    fn containers(&self) -> Vec<String>;
}

/// In-memory element description
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ElementDescriptor {
    /// Class name
    pub entity_type: String,
    /// Predefined type
    pub predefined_type: Option<String>,
    /// Attributes
    pub attributes: Vec<(String, Option<Value>)>,
    /// Properties
    pub properties: Vec<PropertyValue>,
    /// Classifications
    pub classifications: Vec<ClassificationReference>,
    /// Materials
    pub materials: Vec<String>,
    /// Container class names
    pub containers: Vec<String>,
}

impl ElementDescriptor {
    /// Describe an element of the given class
    pub fn new(entity_type: impl Into<String>) -> Self {
        Self {
            entity_type: entity_type.into(),
            ..Default::default()
        }
    }

    /// Set the predefined type
    pub fn with_predefined_type(mut self, predefined_type: impl Into<String>) -> Self {
        self.predefined_type = Some(predefined_type.into());
        self
    }

    /// Add an attribute value
    pub fn with_attribute(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.attributes.push((name.into(), Some(value.into())));
        self
    }

    /// Add an unset attribute
    pub fn with_null_attribute(mut self, name: impl Into<String>) -> Self {
        self.attributes.push((name.into(), None));
        self
    }

    /// Add a property value without declared data type
    pub fn with_property(
        self,
        property_set: impl Into<String>,
        name: impl Into<String>,
        value: impl Into<Value>,
    ) -> Self {
        self.with_property_value(PropertyValue {
            property_set: property_set.into(),
            name: name.into(),
            value: Some(value.into()),
            data_type: None,
        })
    }

    /// Add a fully described property value
    pub fn with_property_value(mut self, property: PropertyValue) -> Self {
        self.properties.push(property);
        self
    }

    /// Add a classification reference
    pub fn with_classification(
        mut self,
        system: impl Into<String>,
        identification: impl Into<String>,
    ) -> Self {
        self.classifications.push(ClassificationReference {
            system: system.into(),
            identification: identification.into(),
        });
        self
    }

    /// Add a material
    pub fn with_material(mut self, material: impl Into<String>) -> Self {
        self.materials.push(material.into());
        self
    }

    /// Add a container class
    pub fn with_container(mut self, container: impl Into<String>) -> Self {
        self.containers.push(container.into());
        self
    }
}

impl CandidateElement for ElementDescriptor {
    fn entity_type(&self) -> Option<&str> {
        if self.entity_type.is_empty() {
            None
        } else {
            Some(&self.entity_type)
        }
    }

    fn predefined_type(&self) -> Option<String> {
        self.predefined_type.clone()
    }

    fn attributes(&self) -> Vec<(String, Option<Value>)> {
        self.attributes.clone()
    }

    fn properties(&self) -> Vec<PropertyValue> {
        self.properties.clone()
    }

    fn classifications(&self) -> Vec<ClassificationReference> {
        self.classifications.clone()
    }

    fn materials(&self) -> Vec<String> {
        self.materials.clone()
    }

    fn containers(&self) -> Vec<String> {
        self.containers.clone()
    }
}

impl<T: CandidateElement + ?Sized> CandidateElement for &T {
    fn entity_type(&self) -> Option<&str> {
        (**self).entity_type()
    }

    fn predefined_type(&self) -> Option<String> {
        (**self).predefined_type()
    }

    fn attributes(&self) -> Vec<(String, Option<Value>)> {
        (**self).attributes()
    }

    fn properties(&self) -> Vec<PropertyValue> {
        (**self).properties()
    }

    fn classifications(&self) -> Vec<ClassificationReference> {
        (**self).classifications()
    }

    fn materials(&self) -> Vec<String> {
        (**self).materials()
    }

    fn containers(&self) -> Vec<String> {
        (**self).containers()
    }
}
