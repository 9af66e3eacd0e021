//! Pack manifest (`metadata.json`) model.

use crate::core::{PackError, StickerResult};
use serde::{Deserialize, Serialize};

/// Where a sticker file comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileSource {
    #[default]
    Local,
    Remote,
    Builtin,
}

/// A single sticker file inside a pack.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StickerInfo {
    pub name: String,
    /// Path relative to the pack directory, e.g. `stickers/happy.png`.
    #[serde(rename = "path")]
    pub relative_path: String,
    #[serde(rename = "file_source", default)]
    pub source: FileSource,
    #[serde(default)]
    pub created_at: Option<String>,
}

impl StickerInfo {
    pub fn local(name: impl Into<String>, relative_path: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            relative_path: relative_path.into(),
            source: FileSource::Local,
            created_at: None,
        }
    }
}

/// Declared metadata of a pack: what the pack *is*.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackManifest {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub display_name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default = "default_version")]
    pub version: String,
    #[serde(default = "default_author")]
    pub author: String,
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub checksum: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
    #[serde(default)]
    pub stickers: Vec<StickerInfo>,
}

fn default_version() -> String {
    "1.0.0".to_string()
}

fn default_author() -> String {
    "Unknown".to_string()
}

fn default_true() -> bool {
    true
}

impl PackManifest {
    /// Create a manifest with the required fields and defaults for the rest.
    pub fn new(name: impl Into<String>, display_name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            display_name: display_name.into(),
            description: String::new(),
            version: default_version(),
            author: default_author(),
            enabled: true,
            url: None,
            checksum: None,
            created_at: None,
            updated_at: None,
            stickers: Vec::new(),
        }
    }

    /// Parse a manifest from JSON and check the required fields.
    pub fn from_json(content: &str) -> StickerResult<Self> {
        let manifest: PackManifest = serde_json::from_str(content)
            .map_err(|e| PackError::invalid_manifest(format!("Invalid manifest JSON: {}", e)))?;
        manifest.check_required()?;
        Ok(manifest)
    }

    /// Serialize as pretty-printed JSON (the on-disk form).
    pub fn to_json_pretty(&self) -> StickerResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// `name` and `display_name` must be non-empty.
    pub fn check_required(&self) -> Result<(), PackError> {
        if self.name.trim().is_empty() {
            return Err(PackError::invalid_manifest("Pack name is required"));
        }
        if self.display_name.trim().is_empty() {
            return Err(PackError::invalid_manifest("Pack display_name is required"));
        }
        Ok(())
    }

    pub fn sticker_names(&self) -> Vec<&str> {
        self.stickers.iter().map(|s| s.name.as_str()).collect()
    }
}
