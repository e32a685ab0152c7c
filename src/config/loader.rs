// src/config/loader.rs

use std::fs;
use std::path::Path;

use tracing::debug;

use crate::config::model::{RawWorkflowsFile, WorkflowsFile};
use crate::errors::ConfigError;

/// Serialization format of a workflows file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileFormat {
    Toml,
    Json,
}

impl FileFormat {
    /// JSON for a `.json` extension, TOML otherwise.
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("json") => FileFormat::Json,
            _ => FileFormat::Toml,
        }
    }
}

/// Load a workflows file and return the raw `RawWorkflowsFile`.
///
/// This only performs deserialization; it does **not** check the DAGs. Use
/// [`load_and_validate`] for that.
pub fn load_from_path(path: impl AsRef<Path>) -> Result<RawWorkflowsFile, ConfigError> {
    let path = path.as_ref();
    let contents = fs::read_to_string(path)?;
    let format = FileFormat::from_path(path);
    debug!(path = %path.display(), ?format, "loading workflows file");

    load_from_str(&contents, format)
}

/// Deserialize a workflows file from an in-memory string.
pub fn load_from_str(contents: &str, format: FileFormat) -> Result<RawWorkflowsFile, ConfigError> {
    let raw = match format {
        FileFormat::Toml => toml::from_str(contents)?,
        FileFormat::Json => serde_json::from_str(contents)?,
    };
    Ok(raw)
}

/// Load a workflows file from path and validate it.
///
/// - Reads TOML (or JSON for `.json` files).
/// - Applies defaults (handled by `serde`).
/// - Checks for:
///   - an empty workflow list,
///   - duplicate `(name, version)` pairs,
///   - duplicate task ids, unknown dependencies and cycles in each DAG.
pub fn load_and_validate(path: impl AsRef<Path>) -> Result<WorkflowsFile, ConfigError> {
    let raw = load_from_path(&path)?;
    WorkflowsFile::try_from(raw)
}
