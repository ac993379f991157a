//! Single documents and zip packages
//!
//! A container with one group is written as a single IDS document, with
//! several groups as a zip archive holding one document per group. Reading
//! detects the format from the leading bytes, whatever the file is called.

use super::xml_export::write_group;
use super::xml_import::ImportSession;
use crate::config::{ExportConfig, ImportConfig};
use crate::error::{Error, Result};
use crate::specification::Ids;
use log::{debug, info};
use std::collections::HashSet;
use std::fs;
use std::io::{Cursor, Read, Write};
use std::path::Path;
use zip::write::FileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

/// Local file header signature opening every zip archive
const ZIP_MAGIC: &[u8] = b"PK\x03\x04";

/// Format produced by an export
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportedFormat {
    /// One IDS document
    SingleXml,
    /// Zip archive of IDS documents
    Zip,
}

impl ExportedFormat {
    /// Conventional file extension
    pub fn extension(&self) -> &'static str {
        match self {
            ExportedFormat::SingleXml => "ids",
            ExportedFormat::Zip => "zip",
        }
    }
}

/// Whether the bytes start like a zip archive
pub fn is_zip(bytes: &[u8]) -> bool {
    bytes.starts_with(ZIP_MAGIC)
}

/// Read a document or a package into a new container
pub fn import(bytes: &[u8], config: &ImportConfig) -> Result<Ids> {
    let mut ids = Ids::with_default_schema(config.default_schema);
    let mut session = ImportSession::new(config);
    if is_zip(bytes) {
        config.limits.check_xml_size(bytes.len())?;
        let mut archive = ZipArchive::new(Cursor::new(bytes))?;
        config.limits.check_package_entries(archive.len())?;
        for index in 0..archive.len() {
            let mut entry = archive.by_index(index)?;
            if entry.is_dir() {
                continue;
            }
            let name = entry.name().to_string();
            let limit = config.limits.max_xml_size;
            config.limits.check_xml_size(usize::try_from(entry.size()).unwrap_or(usize::MAX))?;
            let mut xml = Vec::new();
            (&mut entry).take(limit as u64 + 1).read_to_end(&mut xml)?;
            session.read_document(&xml, &mut ids, Some(name))?;
        }
    } else {
        session.read_document(bytes, &mut ids, None)?;
    }
    info!(
        groups = ids.groups.len(),
        specifications = ids.specification_count(),
        shared_applicability = session.distinct_applicability();
        "IDS import finished"
    );
    Ok(ids)
}

/// Write a container; one group gives a document, more give a zip archive
pub fn export(ids: &Ids, config: &ExportConfig) -> Result<(Vec<u8>, ExportedFormat)> {
    match ids.groups.as_slice() {
        [] => Err(Error::UnsupportedExportShape(
            "the container holds no specification group".to_string(),
        )),
        [group] => Ok((write_group(group, config)?, ExportedFormat::SingleXml)),
        groups => {
            let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
            let options = FileOptions::default().compression_method(CompressionMethod::Deflated);
            let mut used = HashSet::new();
            for (index, group) in groups.iter().enumerate() {
                let name = entry_name(&group.name, index, &mut used);
                debug!(entry = name.as_str(); "adding package entry");
                zip.start_file(name, options)?;
                zip.write_all(&write_group(group, config)?)?;
            }
            let cursor = zip.finish()?;
            Ok((cursor.into_inner(), ExportedFormat::Zip))
        }
    }
}

/// Zip entry name for a group: sanitised title, de-duplicated, `.ids` suffix
fn entry_name(title: &str, index: usize, used: &mut HashSet<String>) -> String {
    let mut stem: String = title
        .trim()
        .chars()
        .map(|c| if c.is_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
        .collect();
    if stem.trim_matches('_').is_empty() {
        stem = format!("group_{}", index + 1);
    }
    let mut candidate = format!("{}.ids", stem);
    let mut n = 2;
    while !used.insert(candidate.to_lowercase()) {
        candidate = format!("{}_{}.ids", stem, n);
        n += 1;
    }
    candidate
}

/// Read a document or package from a file
pub fn import_file(path: impl AsRef<Path>, config: &ImportConfig) -> Result<Ids> {
    let path = path.as_ref();
    let bytes = fs::read(path)?;
    let mut ids = import(&bytes, config)?;
    if !is_zip(&bytes) {
        let file_name = path.file_name().map(|n| n.to_string_lossy().into_owned());
        for group in &mut ids.groups {
            group.source_file = file_name.clone();
        }
    }
    Ok(ids)
}

/// Write a container to a file and report the format used
pub fn export_file(ids: &Ids, path: impl AsRef<Path>, config: &ExportConfig) -> Result<ExportedFormat> {
    let (bytes, format) = export(ids, config)?;
    fs::write(path, bytes)?;
    Ok(format)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::facets::EntityFacet;
    use crate::specification::{Specification, SpecificationsGroup};

    fn group(name: &str) -> SpecificationsGroup {
        let spec = Specification::new(format!("{} spec", name));
        spec.add_applicability(EntityFacet::new("IfcWall"));
        let mut group = SpecificationsGroup::new(name);
        group.specifications.push(spec);
        group
    }

    #[test]
    fn test_entry_names() {
        let mut used = HashSet::new();
        assert_eq!(entry_name("Walls / Slabs", 0, &mut used), "Walls___Slabs.ids");
        assert_eq!(entry_name("Walls / Slabs", 1, &mut used), "Walls___Slabs_2.ids");
        assert_eq!(entry_name("  ", 2, &mut used), "group_3.ids");
    }

    #[test]
    fn test_empty_container_cannot_be_exported() {
        let ids = Ids::new();
        assert!(matches!(
            export(&ids, &ExportConfig::default()),
            Err(Error::UnsupportedExportShape(_))
        ));
    }

    #[test]
    fn test_format_follows_group_count() {
        let mut ids = Ids::new();
        ids.add_group(group("one"));
        let (bytes, format) = export(&ids, &ExportConfig::default()).unwrap();
        assert_eq!(format, ExportedFormat::SingleXml);
        assert!(!is_zip(&bytes));

        ids.add_group(group("two"));
        let (bytes, format) = export(&ids, &ExportConfig::default()).unwrap();
        assert_eq!(format, ExportedFormat::Zip);
        assert!(is_zip(&bytes));

        let back = import(&bytes, &ImportConfig::default()).unwrap();
        assert_eq!(back.groups.len(), 2);
        assert_eq!(back.groups[1].source_file.as_deref(), Some("two.ids"));
        assert_eq!(back.specification_count(), 2);
    }
}
