//! Resource limits for importing documents and packages
//!
//! Guards against oversized or pathologically nested input before any
//! conformance checking happens.

use crate::error::{Error, Result};

/// Import limits configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Limits {
    /// Maximum element nesting depth of an XML document
    pub max_xml_depth: usize,

    /// Maximum XML (or package) size in bytes
    pub max_xml_size: usize,

    /// Maximum number of specifications in one document
    pub max_specifications: usize,

    /// Maximum number of entries in a zip package
    pub max_package_entries: usize,
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            max_xml_depth: 64,
            max_xml_size: 50 * 1024 * 1024, // 50 MB
            max_specifications: 10_000,
            max_package_entries: 256,
        }
    }
}

impl Limits {
    /// Create a new Limits with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Create strict limits (more restrictive)
    pub fn strict() -> Self {
        Self {
            max_xml_depth: 32,
            max_xml_size: 5 * 1024 * 1024, // 5 MB
            max_specifications: 1_000,
            max_package_entries: 32,
        }
    }

    /// Create permissive limits (less restrictive, use with caution)
    pub fn permissive() -> Self {
        Self {
            max_xml_depth: 1024,
            max_xml_size: 1024 * 1024 * 1024, // 1 GB
            max_specifications: 1_000_000,
            max_package_entries: 65_535,
        }
    }

    /// Check if XML depth is within limits
    pub fn check_xml_depth(&self, depth: usize) -> Result<()> {
        if depth > self.max_xml_depth {
            Err(Error::LimitExceeded(format!(
                "XML depth {} exceeds maximum {}",
                depth, self.max_xml_depth
            )))
        } else {
            Ok(())
        }
    }

    /// Check if input size is within limits
    pub fn check_xml_size(&self, size: usize) -> Result<()> {
        if size > self.max_xml_size {
            Err(Error::LimitExceeded(format!(
                "input size {} bytes exceeds maximum {} bytes",
                size, self.max_xml_size
            )))
        } else {
            Ok(())
        }
    }

    /// Check if the specification count is within limits
    pub fn check_specifications(&self, count: usize) -> Result<()> {
        if count > self.max_specifications {
            Err(Error::LimitExceeded(format!(
                "{} specifications exceed maximum {}",
                count, self.max_specifications
            )))
        } else {
            Ok(())
        }
    }

    /// Check if the package entry count is within limits
    pub fn check_package_entries(&self, count: usize) -> Result<()> {
        if count > self.max_package_entries {
            Err(Error::LimitExceeded(format!(
                "package holds {} entries, maximum is {}",
                count, self.max_package_entries
            )))
        } else {
            Ok(())
        }
    }
}
