//! Serialization of documented capture trees and file output.
//!
//! Besides AsciiDoc, a documented tree can be dumped as JSON or YAML. Each payload then carries
//! its synthesized `example` and `fields`, which makes the output suitable for feeding other
//! documentation tools.

use crate::capture::ApiTree;
use anyhow::{Context, Result};
use log::debug;
use std::fs;
use std::path::Path;

/// Serializes a documented tree to YAML.
///
/// # Errors
///
/// Returns an error if serialization fails.
pub fn serialize_yaml(tree: &ApiTree) -> Result<String> {
    debug!("Serializing documented tree to YAML");
    serde_yaml::to_string(tree).context("Failed to serialize documented tree to YAML")
}

/// Serializes a documented tree to pretty-printed JSON.
///
/// Object keys keep their declaration order, both in captured bodies and in synthesized
/// examples.
///
/// # Errors
///
/// Returns an error if serialization fails.
pub fn serialize_json(tree: &ApiTree) -> Result<String> {
    debug!("Serializing documented tree to JSON");
    serde_json::to_string_pretty(tree).context("Failed to serialize documented tree to JSON")
}

/// Writes `content` to `path`, creating parent directories as needed and overwriting any
/// existing file.
///
/// # Errors
///
/// Returns an error if a directory cannot be created or the file cannot be written.
pub fn write_to_file(content: &str, path: &Path) -> Result<()> {
    debug!("Writing content to file: {}", path.display());

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
    }

    fs::write(path, content)
        .with_context(|| format!("Failed to write to file: {}", path.display()))?;

    debug!("Successfully wrote {} bytes to {}", content.len(), path.display());
    Ok(())
}
