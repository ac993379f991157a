//! Import and export configuration

use crate::limits::Limits;
use crate::schema::IfcSchemaVersion;

/// Schema location written by default
pub const DEFAULT_XSD_LOCATION: &str =
    "http://standards.buildingsmart.org/IDS http://standards.buildingsmart.org/IDS/ids_09.xsd";

/// Configuration for reading IDS documents and packages
#[derive(Debug, Clone)]
pub struct ImportConfig {
    /// Resource guards
    pub limits: Limits,
    /// Accept documents declaring another IDS schema version
    pub lenient_version: bool,
    /// IFC version assumed by specifications that name none
    pub default_schema: IfcSchemaVersion,
}

impl Default for ImportConfig {
    fn default() -> Self {
        Self {
            limits: Limits::default(),
            lenient_version: false,
            default_schema: IfcSchemaVersion::Ifc4,
        }
    }
}

impl ImportConfig {
    /// Create a new import configuration
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the resource limits
    pub fn with_limits(mut self, limits: Limits) -> Self {
        self.limits = limits;
        self
    }

    /// Set whether other declared schema versions are accepted
    pub fn with_lenient_version(mut self, lenient: bool) -> Self {
        self.lenient_version = lenient;
        self
    }

    /// Set the default IFC version
    pub fn with_default_schema(mut self, schema: IfcSchemaVersion) -> Self {
        self.default_schema = schema;
        self
    }
}

/// Configuration for writing IDS documents and packages
#[derive(Debug, Clone)]
pub struct ExportConfig {
    /// Indentation in spaces, 0 for compact output
    pub indent: usize,
    /// Value of `xsi:schemaLocation`
    pub xsd_location: String,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            indent: 2,
            xsd_location: DEFAULT_XSD_LOCATION.to_string(),
        }
    }
}

impl ExportConfig {
    /// Create a new export configuration
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the indentation width
    pub fn with_indent(mut self, indent: usize) -> Self {
        self.indent = indent;
        self
    }

    /// Set the schema location
    pub fn with_xsd_location(mut self, location: impl Into<String>) -> Self {
        self.xsd_location = location.into();
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_import_defaults() {
        let config = ImportConfig::new();
        assert!(!config.lenient_version);
        assert_eq!(config.default_schema, IfcSchemaVersion::Ifc4);
        assert_eq!(config.limits.max_xml_depth, Limits::default().max_xml_depth);
    }

    #[test]
    fn test_builders() {
        let import = ImportConfig::new()
            .with_lenient_version(true)
            .with_default_schema(IfcSchemaVersion::Ifc2x3)
            .with_limits(Limits::strict());
        assert!(import.lenient_version);
        assert_eq!(import.default_schema, IfcSchemaVersion::Ifc2x3);

        let export = ExportConfig::new().with_indent(0).with_xsd_location("x ids_09.xsd");
        assert_eq!(export.indent, 0);
        assert!(export.xsd_location.ends_with("ids_09.xsd"));
    }
}
