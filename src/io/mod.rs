//! Import and export
//!
//! The external format is the buildingSMART IDS XML schema. Reading goes
//! through a namespace-resolved element tree, a conformance check against
//! the built-in content model, then the mapping into an [`Ids`]
//! container. Writing maps each group back to one document; several groups
//! are packaged as a zip archive.
//!
//! The JSON persistence format in [`persist`] is separate and keeps shared
//! facet groups as shared instances.
//!
//! [`Ids`]: crate::specification::Ids

pub mod conformance;
pub mod document;
pub mod package;
pub mod persist;
pub mod summary;
pub mod values_xml;
pub mod xml_export;
pub mod xml_import;

pub use package::{export, export_file, import, import_file, ExportedFormat};
pub use persist::{load_json, load_json_file, save_json, save_json_file};
pub use summary::XmlElementSummary;
pub use xml_export::write_group;
pub use xml_import::import_xml;

/// Namespace of IDS documents
pub const IDS_NAMESPACE: &str = "http://standards.buildingsmart.org/IDS";

/// Namespace of XML Schema restriction elements
pub const XS_NAMESPACE: &str = "http://www.w3.org/2001/XMLSchema";

/// Namespace of `xsi:schemaLocation`
pub const XSI_NAMESPACE: &str = "http://www.w3.org/2001/XMLSchema-instance";

/// IDS schema version written and accepted
pub const IDS_XSD_VERSION: &str = "0.9";

/// File name of the IDS schema version written and accepted
pub const IDS_XSD_FILE: &str = "ids_09.xsd";
