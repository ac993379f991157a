//! IFC schema graph
//!
//! A read-only oracle of the class hierarchy and attribute declarations of a
//! target IFC schema version. The built-in tables live in [`builtins`];
//! further graphs can be assembled with [`SchemaInfo::builder`]. Measure
//! and unit lookups for property data types are in [`measures`].
//!
//! Derived indices are computed on first use and memoized: the child lists of
//! the hierarchy, and per attribute the full and minimal sets of classes
//! carrying it. Unknown class or attribute names yield empty results.

pub mod builtins;
pub mod measures;

pub use measures::MeasureInfo;

use indexmap::{IndexMap, IndexSet};
use once_cell::sync::OnceCell;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::sync::{Mutex, MutexGuard};

/// Class at the top of the type object branch
pub const TYPE_OBJECT_ROOT: &str = "IfcTypeObject";

/// Supported IFC schema versions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum IfcSchemaVersion {
    /// IFC 2x3 TC1
    #[serde(rename = "IFC2X3")]
    Ifc2x3,
    /// IFC 4 ADD2 TC1
    #[serde(rename = "IFC4")]
    Ifc4,
}

impl IfcSchemaVersion {
    /// All supported versions
    pub const ALL: [IfcSchemaVersion; 2] = [IfcSchemaVersion::Ifc2x3, IfcSchemaVersion::Ifc4];

    /// Token used in the `ifcVersion` attribute
    pub fn token(&self) -> &'static str {
        match self {
            IfcSchemaVersion::Ifc2x3 => "IFC2X3",
            IfcSchemaVersion::Ifc4 => "IFC4",
        }
    }

    /// Parse an `ifcVersion` token (case-insensitive)
    pub fn from_token(token: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|v| v.token().eq_ignore_ascii_case(token.trim()))
    }

    /// The built-in schema graph for this version
    pub fn schema(&self) -> &'static SchemaInfo {
        SchemaInfo::for_version(*self)
    }
}

impl fmt::Display for IfcSchemaVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.token())
    }
}

/// Role a class plays in the model
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum FunctionalType {
    /// An ordinary class
    #[default]
    Plain,
    /// A type object related to elements (IfcTypeObject branch)
    TypeOfElement,
}

/// How an attribute is reached from an element
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ClassAttributeMode {
    /// The attribute is defined directly on the element class
    ViaElement,
    /// The attribute is defined on the type related to the element
    ViaRelationType,
}

/// A class carrying an attribute and the way it is reached
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ClassRelationInfo {
    /// Class name
    pub class_name: String,
    /// Relation mode
    pub connection: ClassAttributeMode,
}

/// One class of the schema
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassInfo {
    /// Class name as written in the schema (e.g. `IfcWall`)
    pub name: String,
    /// Name of the direct supertype
    pub parent_name: Option<String>,
    /// Whether the class is abstract
    pub is_abstract: bool,
    /// Role in the model
    pub functional_type: FunctionalType,
}

impl ClassInfo {
    /// Create a new concrete class
    pub fn new(name: impl Into<String>, parent_name: Option<&str>) -> Self {
        Self {
            name: name.into(),
            parent_name: parent_name.map(str::to_string),
            is_abstract: false,
            functional_type: FunctionalType::Plain,
        }
    }

    /// Mark the class abstract
    pub fn with_abstract(mut self, is_abstract: bool) -> Self {
        self.is_abstract = is_abstract;
        self
    }
}

#[derive(Debug, Default)]
struct Hierarchy {
    subclasses: HashMap<String, Vec<String>>,
}

/// Class hierarchy and attribute declarations of one schema
#[derive(Debug)]
pub struct SchemaInfo {
    version: Option<IfcSchemaVersion>,
    classes: IndexMap<String, ClassInfo>,
    by_lowercase: HashMap<String, String>,
    declared_attributes: IndexMap<String, Vec<String>>,
    hierarchy: OnceCell<Hierarchy>,
    all_classes: Mutex<HashMap<String, Vec<String>>>,
    top_classes: Mutex<HashMap<String, Vec<String>>>,
    relations: Mutex<HashMap<String, Vec<ClassRelationInfo>>>,
}

impl SchemaInfo {
    /// Start assembling a schema graph
    pub fn builder() -> SchemaBuilder {
        SchemaBuilder::default()
    }

    /// The built-in graph for a schema version
    pub fn for_version(version: IfcSchemaVersion) -> &'static SchemaInfo {
        match version {
            IfcSchemaVersion::Ifc2x3 => &builtins::SCHEMA_IFC2X3,
            IfcSchemaVersion::Ifc4 => &builtins::SCHEMA_IFC4,
        }
    }

    /// Measure or simple value type named by a property data type
    pub fn measure(ifc_measure: &str) -> Option<&'static MeasureInfo> {
        measures::measure(ifc_measure)
    }

    /// Measure whose unit has this symbol
    pub fn unit(symbol: &str) -> Option<&'static MeasureInfo> {
        measures::unit(symbol)
    }

    /// Version this graph describes, if it is a built-in one
    pub fn version(&self) -> Option<IfcSchemaVersion> {
        self.version
    }

    /// Number of classes
    pub fn len(&self) -> usize {
        self.classes.len()
    }

    /// Whether the graph has no classes
    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }

    /// Iterate over all classes in declaration order
    pub fn classes(&self) -> impl Iterator<Item = &ClassInfo> {
        self.classes.values()
    }

    /// Look a class up by name, falling back to a case-insensitive match
    pub fn class(&self, name: &str) -> Option<&ClassInfo> {
        self.classes.get(name).or_else(|| {
            self.by_lowercase
                .get(&name.to_lowercase())
                .and_then(|canonical| self.classes.get(canonical))
        })
    }

    /// Whether the class is known
    pub fn contains(&self, name: &str) -> bool {
        self.class(name).is_some()
    }

    /// Resolved direct supertype
    pub fn parent(&self, name: &str) -> Option<&ClassInfo> {
        self.class(name)
            .and_then(|c| c.parent_name.as_deref())
            .and_then(|p| self.classes.get(p))
    }

    fn hierarchy(&self) -> &Hierarchy {
        self.hierarchy.get_or_init(|| {
            let mut h = Hierarchy::default();
            for class in self.classes.values() {
                if let Some(parent) = class.parent_name.as_deref() {
                    if self.classes.contains_key(parent) {
                        h.subclasses
                            .entry(parent.to_string())
                            .or_default()
                            .push(class.name.clone());
                    }
                }
            }
            h
        })
    }

    /// Direct subtypes
    pub fn subclasses(&self, name: &str) -> Vec<&ClassInfo> {
        let Some(class) = self.class(name) else {
            return Vec::new();
        };
        self.hierarchy()
            .subclasses
            .get(&class.name)
            .map(|subs| subs.iter().filter_map(|s| self.classes.get(s)).collect())
            .unwrap_or_default()
    }

    /// All supertypes, nearest first
    pub fn ancestors(&self, name: &str) -> Vec<&ClassInfo> {
        let mut out: Vec<&ClassInfo> = Vec::new();
        let mut current = self.parent(name);
        while let Some(class) = current {
            if out.iter().any(|c| c.name == class.name) {
                break;
            }
            out.push(class);
            current = self.parent(&class.name);
        }
        out
    }

    /// All subtypes, breadth first, excluding the class itself
    pub fn descendants(&self, name: &str) -> Vec<&ClassInfo> {
        let mut out: Vec<&ClassInfo> = Vec::new();
        let mut queue = self.subclasses(name);
        while !queue.is_empty() {
            let mut next = Vec::new();
            for class in queue {
                if out.iter().any(|c| c.name == class.name) {
                    continue;
                }
                next.extend(self.subclasses(&class.name));
                out.push(class);
            }
            queue = next;
        }
        out
    }

    /// Whether `name` is `ancestor` or one of its subtypes
    pub fn is_a(&self, name: &str, ancestor: &str) -> bool {
        let (Some(class), Some(target)) = (self.class(name), self.class(ancestor)) else {
            return false;
        };
        class.name == target.name || self.ancestors(&class.name).iter().any(|c| c.name == target.name)
    }

    /// Names of all attributes with declarations
    pub fn attribute_names(&self) -> impl Iterator<Item = &str> {
        self.declared_attributes.keys().map(String::as_str)
    }

    /// Classes carrying an attribute; with `top_only` the minimal set of
    /// classes none of whose supertypes also carry it.
    pub fn attribute_classes(&self, attribute: &str, top_only: bool) -> Vec<String> {
        if top_only {
            let mut cache = lock(&self.top_classes);
            if let Some(hit) = cache.get(attribute) {
                return hit.clone();
            }
            let all = self.attribute_classes(attribute, false);
            let top: Vec<String> = all
                .iter()
                .filter(|c| !self.ancestors(c).iter().any(|a| all.contains(&a.name)))
                .cloned()
                .collect();
            cache.insert(attribute.to_string(), top.clone());
            top
        } else {
            let mut cache = lock(&self.all_classes);
            if let Some(hit) = cache.get(attribute) {
                return hit.clone();
            }
            let mut all: IndexSet<String> = IndexSet::new();
            for declaring in self.declared_attributes.get(attribute).into_iter().flatten() {
                if let Some(class) = self.class(declaring) {
                    all.insert(class.name.clone());
                    all.extend(self.descendants(&class.name).into_iter().map(|c| c.name.clone()));
                }
            }
            let all: Vec<String> = all.into_iter().collect();
            cache.insert(attribute.to_string(), all.clone());
            all
        }
    }

    /// Minimal classes carrying an attribute and whether each is reached
    /// directly on the element or through its type object
    pub fn attribute_relations(&self, attribute: &str) -> Vec<ClassRelationInfo> {
        if let Some(hit) = lock(&self.relations).get(attribute) {
            return hit.clone();
        }
        let relations: Vec<ClassRelationInfo> = self
            .attribute_classes(attribute, true)
            .into_iter()
            .filter_map(|name| {
                let class = self.class(&name)?;
                let connection = match class.functional_type {
                    FunctionalType::TypeOfElement => ClassAttributeMode::ViaRelationType,
                    FunctionalType::Plain => ClassAttributeMode::ViaElement,
                };
                Some(ClassRelationInfo {
                    class_name: name,
                    connection,
                })
            })
            .collect();
        lock(&self.relations).insert(attribute.to_string(), relations.clone());
        relations
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    // caches are recomputable, a poisoned one is still usable
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Assembles a [`SchemaInfo`]
#[derive(Debug, Default)]
pub struct SchemaBuilder {
    version: Option<IfcSchemaVersion>,
    classes: IndexMap<String, ClassInfo>,
    declared_attributes: IndexMap<String, Vec<String>>,
    type_roots: Vec<String>,
}

impl SchemaBuilder {
    /// Tag the graph with a schema version
    pub fn version(mut self, version: IfcSchemaVersion) -> Self {
        self.version = Some(version);
        self
    }

    /// Add a class; a later class with the same name replaces the earlier one
    pub fn class(mut self, class: ClassInfo) -> Self {
        self.classes.insert(class.name.clone(), class);
        self
    }

    /// Add a concrete class by name and parent
    pub fn add(self, name: &str, parent: Option<&str>) -> Self {
        self.class(ClassInfo::new(name, parent))
    }

    /// Declare an attribute on one or more classes
    pub fn attribute(mut self, attribute: &str, declaring: &[&str]) -> Self {
        let entry = self
            .declared_attributes
            .entry(attribute.to_string())
            .or_default();
        for class in declaring {
            if !entry.iter().any(|c| c == class) {
                entry.push(class.to_string());
            }
        }
        self
    }

    /// Mark a class and all its subtypes as type objects
    pub fn type_object_root(mut self, root: &str) -> Self {
        self.type_roots.push(root.to_string());
        self
    }

    /// Finish the graph
    pub fn build(mut self) -> SchemaInfo {
        let roots = std::mem::take(&mut self.type_roots);
        let typed: Vec<String> = self
            .classes
            .keys()
            .filter(|name| roots.iter().any(|root| self.reaches(name, root)))
            .cloned()
            .collect();
        for name in typed {
            if let Some(class) = self.classes.get_mut(&name) {
                class.functional_type = FunctionalType::TypeOfElement;
            }
        }

        let by_lowercase = self
            .classes
            .keys()
            .map(|k| (k.to_lowercase(), k.clone()))
            .collect();

        SchemaInfo {
            version: self.version,
            classes: self.classes,
            by_lowercase,
            declared_attributes: self.declared_attributes,
            hierarchy: OnceCell::new(),
            all_classes: Mutex::new(HashMap::new()),
            top_classes: Mutex::new(HashMap::new()),
            relations: Mutex::new(HashMap::new()),
        }
    }

    fn reaches(&self, name: &str, root: &str) -> bool {
        let mut current = Some(name);
        let mut steps = 0;
        while let Some(n) = current {
            if n == root {
                return true;
            }
            steps += 1;
            if steps > self.classes.len() {
                return false;
            }
            current = self.classes.get(n).and_then(|c| c.parent_name.as_deref());
        }
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chain() -> SchemaInfo {
        SchemaInfo::builder()
            .add("A", None)
            .add("B", Some("A"))
            .add("C", Some("B"))
            .add("D", None)
            .attribute("X", &["A"])
            .attribute("Y", &["B", "C", "D"])
            .build()
    }

    #[test]
    fn test_minimal_declaring_set() {
        let schema = chain();
        assert_eq!(schema.attribute_classes("X", true), vec!["A".to_string()]);
        assert_eq!(schema.attribute_classes("X", false), vec!["A", "B", "C"]);
        assert_eq!(schema.attribute_classes("Y", true), vec!["B", "D"]);
    }

    #[test]
    fn test_minimal_set_is_cached() {
        let schema = chain();
        let first = schema.attribute_classes("X", true);
        let second = schema.attribute_classes("X", true);
        assert_eq!(first, second);
        assert!(lock(&schema.top_classes).contains_key("X"));
    }

    #[test]
    fn test_unknown_names_are_empty() {
        let schema = chain();
        assert!(schema.attribute_classes("Nope", true).is_empty());
        assert!(schema.attribute_classes("Nope", false).is_empty());
        assert!(schema.ancestors("Nope").is_empty());
        assert!(schema.descendants("Nope").is_empty());
        assert!(!schema.is_a("Nope", "A"));
    }

    #[test]
    fn test_hierarchy_queries() {
        let schema = chain();
        let names = |v: Vec<&ClassInfo>| v.into_iter().map(|c| c.name.clone()).collect::<Vec<_>>();
        assert_eq!(names(schema.ancestors("C")), vec!["B", "A"]);
        assert_eq!(names(schema.descendants("A")), vec!["B", "C"]);
        assert_eq!(names(schema.subclasses("a")), vec!["B"]);
        assert!(schema.is_a("C", "A"));
        assert!(schema.is_a("c", "a"));
        assert!(!schema.is_a("A", "C"));
    }

    #[test]
    fn test_relation_modes() {
        let schema = SchemaInfo::builder()
            .add("Obj", None)
            .add(TYPE_OBJECT_ROOT, Some("Obj"))
            .add("WallType", Some(TYPE_OBJECT_ROOT))
            .add("Wall", Some("Obj"))
            .attribute("PredefinedType", &["Wall", "WallType"])
            .type_object_root(TYPE_OBJECT_ROOT)
            .build();
        let rel = schema.attribute_relations("PredefinedType");
        assert_eq!(rel.len(), 2);
        let wall = rel.iter().find(|r| r.class_name == "Wall").unwrap();
        assert_eq!(wall.connection, ClassAttributeMode::ViaElement);
        let wall_type = rel.iter().find(|r| r.class_name == "WallType").unwrap();
        assert_eq!(wall_type.connection, ClassAttributeMode::ViaRelationType);
    }

    #[test]
    fn test_version_tokens() {
        assert_eq!(IfcSchemaVersion::from_token("ifc4"), Some(IfcSchemaVersion::Ifc4));
        assert_eq!(IfcSchemaVersion::from_token("IFC2X3"), Some(IfcSchemaVersion::Ifc2x3));
        assert_eq!(IfcSchemaVersion::from_token("IFC5"), None);
        assert_eq!(IfcSchemaVersion::Ifc4.to_string(), "IFC4");
    }
}
