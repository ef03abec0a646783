//! Format-agnostic configuration loading

use crate::{Error, NormalizedPath, Result};
use serde::de::DeserializeOwned;
use std::fs;

/// Format-agnostic configuration store.
///
/// Detects the document format from the file extension and hands back an
/// already-typed value; schema validation is left to the caller.
#[derive(Debug, Default)]
pub struct ConfigStore;

impl ConfigStore {
    /// Create a new ConfigStore.
    pub fn new() -> Self {
        Self
    }

    /// Load configuration from a file.
    ///
    /// Format is detected from file extension:
    /// - `.json` -> JSON
    /// - `.yaml`, `.yml` -> YAML
    /// - `.toml` -> TOML
    pub fn load<T: DeserializeOwned>(&self, path: &NormalizedPath) -> Result<T> {
        let extension = path
            .file_name()
            .and_then(|name| name.rsplit_once('.'))
            .map(|(_, ext)| ext.to_lowercase())
            .unwrap_or_default();

        let format = match extension.as_str() {
            "json" => "JSON",
            "yaml" | "yml" => "YAML",
            "toml" => "TOML",
            _ => return Err(Error::UnsupportedFormat { extension }),
        };

        let native_path = path.to_native();
        let content = fs::read_to_string(&native_path).map_err(|e| Error::io(&native_path, e))?;
        tracing::debug!(path = %path, format, "Loading configuration");

        let parsed: std::result::Result<T, String> = match format {
            "JSON" => serde_json::from_str(&content).map_err(|e| e.to_string()),
            "YAML" => serde_yaml::from_str(&content).map_err(|e| e.to_string()),
            _ => toml::from_str(&content).map_err(|e| e.to_string()),
        };

        parsed.map_err(|message| Error::ConfigParse {
            path: native_path,
            format: format.into(),
            message,
        })
    }
}
