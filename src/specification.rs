//! Specifications and their containers
//!
//! A [`Specification`] says: elements matching the applicability facets
//! must also match the requirement facets, and the number of applicable
//! elements must fit the cardinality. Specifications are collected into
//! named [`SpecificationsGroup`]s, one per IDS document, and the groups into
//! the root container [`Ids`].
//!
//! Facet groups are shared handles. Two specifications may hold the same
//! applicability group; [`Ids::applicability_sets`] and
//! [`Ids::requirement_sets`] list the distinct instances by identity.
//!
//! Each specification keeps a weak back-reference to the container settings
//! to resolve its schema version when it names none. The reference is not
//! serialized; [`Ids::relink`] re-establishes it after loading.

use crate::cardinality::Cardinality;
use crate::error::{Error, Result};
use crate::facets::{CandidateElement, Facet, FacetGroup, SharedFacetGroup};
use crate::schema::{IfcSchemaVersion, SchemaInfo};
use chrono::NaiveDate;
use log::debug;
use serde::{Deserialize, Serialize};
use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};

/// Container-wide settings visible to every specification
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdsSettings {
    /// Schema version of specifications that name none
    pub default_schema: IfcSchemaVersion,
}

impl Default for IdsSettings {
    fn default() -> Self {
        Self {
            default_schema: IfcSchemaVersion::Ifc4,
        }
    }
}

/// Result of evaluating one specification
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpecificationStatus {
    /// Cardinality and requirements are met
    Pass,
    /// Something is not met
    Fail,
}

/// Outcome of evaluating a specification against a set of elements
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpecificationOutcome {
    /// Name of the evaluated specification
    pub name: String,
    /// Indices of applicable elements
    pub applicable: Vec<usize>,
    /// Applicable elements meeting the requirements
    pub passing: Vec<usize>,
    /// Applicable elements failing the requirements
    pub failing: Vec<usize>,
    /// Overall status
    pub status: SpecificationStatus,
}

impl SpecificationOutcome {
    /// Whether the specification passed
    pub fn passed(&self) -> bool {
        self.status == SpecificationStatus::Pass
    }
}

/// One information requirement
#[derive(Debug, Clone)]
pub struct Specification {
    /// Name
    pub name: String,
    /// Optional identifier
    pub identifier: Option<String>,
    /// Description
    pub description: Option<String>,
    /// Authoring instructions
    pub instructions: Option<String>,
    /// Schema versions; empty inherits the container default
    pub ifc_versions: Vec<IfcSchemaVersion>,
    /// Facets selecting the elements the specification applies to
    pub applicability: SharedFacetGroup,
    /// Facets applicable elements must satisfy
    pub requirements: SharedFacetGroup,
    /// How many applicable elements are expected
    pub cardinality: Cardinality,
    owner: Weak<RefCell<IdsSettings>>,
}

impl Specification {
    /// Create an unlinked specification with empty facet groups
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            identifier: None,
            description: None,
            instructions: None,
            ifc_versions: Vec::new(),
            applicability: FacetGroup::new().into_shared(),
            requirements: FacetGroup::new().into_shared(),
            cardinality: Cardinality::default(),
            owner: Weak::new(),
        }
    }

    /// Set the schema versions
    pub fn with_versions(mut self, versions: &[IfcSchemaVersion]) -> Self {
        self.ifc_versions = versions.to_vec();
        self
    }

    /// Set the cardinality
    pub fn with_cardinality(mut self, cardinality: Cardinality) -> Self {
        self.cardinality = cardinality;
        self
    }

    /// Use a (possibly shared) applicability group
    pub fn with_applicability(mut self, group: SharedFacetGroup) -> Self {
        self.applicability = group;
        self
    }

    /// Use a (possibly shared) requirement group
    pub fn with_requirements(mut self, group: SharedFacetGroup) -> Self {
        self.requirements = group;
        self
    }

    /// Add a facet to the applicability group
    pub fn add_applicability(&self, facet: impl Into<Facet>) {
        self.applicability.borrow_mut().push(facet);
    }

    /// Add a facet to the requirement group
    pub fn add_requirement(&self, facet: impl Into<Facet>) {
        self.requirements.borrow_mut().push(facet);
    }

    pub(crate) fn link(&mut self, settings: &Rc<RefCell<IdsSettings>>) {
        self.owner = Rc::downgrade(settings);
    }

    /// Whether the back-reference to a live container is set
    pub fn is_linked(&self) -> bool {
        self.owner.upgrade().is_some()
    }

    /// Effective schema versions
    pub fn schema_versions(&self) -> Vec<IfcSchemaVersion> {
        if !self.ifc_versions.is_empty() {
            return self.ifc_versions.clone();
        }
        let default = self
            .owner
            .upgrade()
            .map(|settings| settings.borrow().default_schema)
            .unwrap_or(IfcSchemaVersion::Ifc4);
        vec![default]
    }

    /// Schema graph used for evaluation (the first effective version)
    pub fn schema(&self) -> &'static SchemaInfo {
        let version = self
            .schema_versions()
            .first()
            .copied()
            .unwrap_or(IfcSchemaVersion::Ifc4);
        SchemaInfo::for_version(version)
    }

    /// Whether the element is selected by the applicability facets
    pub fn applies_to(&self, candidate: &dyn CandidateElement) -> bool {
        self.applicability.borrow().matches(candidate, self.schema())
    }

    /// Whether the element satisfies the requirement facets
    pub fn requirements_met(&self, candidate: &dyn CandidateElement) -> bool {
        self.requirements.borrow().matches(candidate, self.schema())
    }

    /// Evaluate against a set of elements
    pub fn evaluate<C: CandidateElement>(&self, candidates: &[C]) -> SpecificationOutcome {
        let mut applicable = Vec::new();
        let mut passing = Vec::new();
        let mut failing = Vec::new();
        for (index, candidate) in candidates.iter().enumerate() {
            if !self.applies_to(candidate) {
                continue;
            }
            applicable.push(index);
            if self.requirements_met(candidate) {
                passing.push(index);
            } else {
                failing.push(index);
            }
        }

        let count = u32::try_from(applicable.len()).unwrap_or(u32::MAX);
        let status = if self.cardinality.allows(count) && failing.is_empty() {
            SpecificationStatus::Pass
        } else {
            SpecificationStatus::Fail
        };
        debug!(
            specification = self.name.as_str(),
            applicable = applicable.len(),
            failing = failing.len();
            "specification evaluated"
        );
        SpecificationOutcome {
            name: self.name.clone(),
            applicable,
            passing,
            failing,
            status,
        }
    }

    /// Authoring conventions that are not enforced
    pub fn policy_warnings(&self) -> Vec<String> {
        let applicability = self.applicability.borrow();
        if applicability.iter().any(|f| matches!(f, Facet::PartOf(_))) {
            vec![format!(
                "'{}': partOf facets are expected on the requirement side only",
                self.name
            )]
        } else {
            Vec::new()
        }
    }

    /// Structural problems of the specification for each of its schema versions
    pub fn validation_messages(&self) -> Vec<String> {
        let mut messages = Vec::new();
        if self.name.trim().is_empty() {
            messages.push("Specification name is required".to_string());
        }
        if !self.cardinality.is_valid() {
            messages.push(format!("Cardinality {} has max below min", self.cardinality));
        }
        if self.applicability.borrow().is_empty() {
            messages.push("Applicability needs at least one facet".to_string());
        }
        for version in self.schema_versions() {
            let schema = SchemaInfo::for_version(version);
            for group in [&self.applicability, &self.requirements] {
                for facet in group.borrow().iter() {
                    for message in facet.validation_messages(schema) {
                        let message = format!("{} ({})", message, version);
                        if !messages.contains(&message) {
                            messages.push(message);
                        }
                    }
                }
            }
        }
        messages
    }
}

/// Descriptive metadata of an IDS document
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GroupInfo {
    /// Copyright holder
    #[serde(skip_serializing_if = "Option::is_none")]
    pub copyright: Option<String>,
    /// Document version
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    /// Description
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Author e-mail
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    /// Issue date
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<NaiveDate>,
    /// Purpose
    #[serde(skip_serializing_if = "Option::is_none")]
    pub purpose: Option<String>,
    /// Project milestone
    #[serde(skip_serializing_if = "Option::is_none")]
    pub milestone: Option<String>,
}

/// Named, ordered collection of specifications (one IDS document)
#[derive(Debug, Clone, Default)]
pub struct SpecificationsGroup {
    /// Title
    pub name: String,
    /// Metadata
    pub info: GroupInfo,
    /// Specifications in document order
    pub specifications: Vec<Specification>,
    /// File (or package entry) the group was read from
    pub source_file: Option<String>,
    /// `xsi:schemaLocation` of the source document
    pub schema_location: SchemaLocation,
}

/// How a group's document names its schema
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum SchemaLocation {
    /// Not read from a document; export writes the configured location
    #[default]
    Configured,
    /// The source document had no `xsi:schemaLocation`
    Absent,
    /// Value read from the source document
    Declared(String),
}

impl SchemaLocation {
    /// Whether this is the default, configured location
    pub fn is_configured(&self) -> bool {
        matches!(self, SchemaLocation::Configured)
    }
}

impl SpecificationsGroup {
    /// Create an empty group
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }
}

/// Severity of a validation issue
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// The specification cannot be evaluated as authored
    Error,
    /// A convention is not followed
    Warning,
}

/// One finding of [`Ids::validation_report`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationIssue {
    /// Group title
    pub group: String,
    /// Specification name
    pub specification: String,
    /// Severity
    pub severity: Severity,
    /// Message
    pub message: String,
}

impl fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let level = match self.severity {
            Severity::Error => "error",
            Severity::Warning => "warning",
        };
        write!(f, "[{}] {} / {}: {}", level, self.group, self.specification, self.message)
    }
}

/// Root container
#[derive(Debug, Default)]
pub struct Ids {
    /// Groups in order
    pub groups: Vec<SpecificationsGroup>,
    settings: Rc<RefCell<IdsSettings>>,
}

impl Ids {
    /// Create an empty container
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty container with a default schema version
    pub fn with_default_schema(default_schema: IfcSchemaVersion) -> Self {
        let ids = Self::new();
        ids.settings.borrow_mut().default_schema = default_schema;
        ids
    }

    /// Default schema version
    pub fn default_schema(&self) -> IfcSchemaVersion {
        self.settings.borrow().default_schema
    }

    /// Change the default schema version; linked specifications observe it
    pub fn set_default_schema(&self, default_schema: IfcSchemaVersion) {
        self.settings.borrow_mut().default_schema = default_schema;
    }

    /// Append a group and return its index
    pub fn add_group(&mut self, group: SpecificationsGroup) -> usize {
        self.groups.push(group);
        let index = self.groups.len() - 1;
        let settings = Rc::clone(&self.settings);
        for spec in &mut self.groups[index].specifications {
            spec.link(&settings);
        }
        index
    }

    /// Append a specification to a group, linking it to this container
    pub fn add_specification(
        &mut self,
        group_index: usize,
        mut specification: Specification,
    ) -> Result<&mut Specification> {
        let settings = Rc::clone(&self.settings);
        let group = self.groups.get_mut(group_index).ok_or_else(|| {
            Error::Value(format!("group index {} out of range", group_index))
        })?;
        specification.link(&settings);
        group.specifications.push(specification);
        let last = group.specifications.len() - 1;
        Ok(&mut group.specifications[last])
    }

    /// Create a new linked specification with a default name in a group
    pub fn prepare_specification(
        &mut self,
        group_index: usize,
        versions: &[IfcSchemaVersion],
    ) -> Result<&mut Specification> {
        let count = self.specification_count();
        let spec = Specification::new(format!("Specification {}", count + 1)).with_versions(versions);
        self.add_specification(group_index, spec)
    }

    /// Every specification, group by group
    pub fn all_specifications(&self) -> impl Iterator<Item = &Specification> {
        self.groups.iter().flat_map(|g| g.specifications.iter())
    }

    /// Total number of specifications
    pub fn specification_count(&self) -> usize {
        self.groups.iter().map(|g| g.specifications.len()).sum()
    }

    /// Distinct applicability groups by identity, in first-use order
    pub fn applicability_sets(&self) -> Vec<SharedFacetGroup> {
        distinct(self.all_specifications().map(|s| &s.applicability))
    }

    /// Distinct requirement groups by identity, in first-use order
    pub fn requirement_sets(&self) -> Vec<SharedFacetGroup> {
        distinct(self.all_specifications().map(|s| &s.requirements))
    }

    /// Re-establish every specification's back-reference to this container
    pub fn relink(&mut self) {
        let settings = Rc::clone(&self.settings);
        for group in &mut self.groups {
            for spec in &mut group.specifications {
                spec.link(&settings);
            }
        }
        debug!(specifications = self.specification_count(); "container relinked");
    }

    /// Evaluate every specification against the same set of elements
    pub fn evaluate<C: CandidateElement>(&self, candidates: &[C]) -> Vec<SpecificationOutcome> {
        self.all_specifications()
            .map(|spec| spec.evaluate(candidates))
            .collect()
    }

    /// Validation errors and policy warnings of every specification
    pub fn validation_report(&self) -> Vec<ValidationIssue> {
        let mut issues = Vec::new();
        for group in &self.groups {
            for spec in &group.specifications {
                let issue = |severity, message| ValidationIssue {
                    group: group.name.clone(),
                    specification: spec.name.clone(),
                    severity,
                    message,
                };
                issues.extend(
                    spec.validation_messages()
                        .into_iter()
                        .map(|m| issue(Severity::Error, m)),
                );
                issues.extend(
                    spec.policy_warnings()
                        .into_iter()
                        .map(|m| issue(Severity::Warning, m)),
                );
            }
        }
        issues
    }
}

fn distinct<'a>(groups: impl Iterator<Item = &'a SharedFacetGroup>) -> Vec<SharedFacetGroup> {
    let mut out: Vec<SharedFacetGroup> = Vec::new();
    for group in groups {
        if !out.iter().any(|seen| Rc::ptr_eq(seen, group)) {
            out.push(Rc::clone(group));
        }
    }
    out
}
