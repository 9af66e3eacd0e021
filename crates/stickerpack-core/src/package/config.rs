//! Per-pack user configuration (`<base>/config.json`).
//!
//! The manifest describes what a pack is; this describes how the user wants
//! it to behave. All packs share one file keyed by pack name.

use crate::core::atomic::write_atomic;
use crate::core::{StickerError, StickerResult};
use crate::package::manifest::PackManifest;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

/// Grid preview layout for a pack.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GridSettings {
    #[serde(default = "default_grid_dim")]
    pub columns: u32,
    #[serde(default = "default_grid_dim")]
    pub rows: u32,
    #[serde(default = "default_cell_size")]
    pub cell_width: u32,
    #[serde(default = "default_cell_size")]
    pub cell_height: u32,
    #[serde(default = "default_background")]
    pub background_color: String,
    #[serde(default = "default_border")]
    pub border_color: String,
    #[serde(default = "default_border_width")]
    pub border_width: u32,
}

fn default_grid_dim() -> u32 {
    3
}

fn default_cell_size() -> u32 {
    200
}

fn default_background() -> String {
    "#FFFFFF".to_string()
}

fn default_border() -> String {
    "#000000".to_string()
}

fn default_border_width() -> u32 {
    1
}

impl Default for GridSettings {
    fn default() -> Self {
        Self {
            columns: default_grid_dim(),
            rows: default_grid_dim(),
            cell_width: default_cell_size(),
            cell_height: default_cell_size(),
            background_color: default_background(),
            border_color: default_border(),
            border_width: default_border_width(),
        }
    }
}

/// A user-declared shortcut. Only `keyword` is interpreted here; the
/// command layer owns the rest, so unknown keys are kept as-is.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Shortcut {
    pub keyword: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sticker: Option<String>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PackConfig {
    pub name: String,
    #[serde(default)]
    pub display_name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default)]
    pub shortcuts: Vec<Shortcut>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub grid_settings: Option<GridSettings>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub checksum: Option<String>,
}

fn default_true() -> bool {
    true
}

impl PackConfig {
    /// Default user configuration for a freshly installed pack.
    pub fn from_manifest(manifest: &PackManifest) -> Self {
        Self {
            name: manifest.name.clone(),
            display_name: manifest.display_name.clone(),
            description: manifest.description.clone(),
            enabled: true,
            shortcuts: Vec::new(),
            grid_settings: None,
            url: manifest.url.clone(),
            version: Some(manifest.version.clone()),
            author: Some(manifest.author.clone()),
            checksum: manifest.checksum.clone(),
        }
    }

    /// Grid settings, falling back to the defaults.
    pub fn grid(&self) -> GridSettings {
        self.grid_settings.clone().unwrap_or_default()
    }
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct PackConfigFile {
    #[serde(default)]
    packs: BTreeMap<String, PackConfig>,
}

/// The shared pack config file.
#[derive(Debug, Clone)]
pub struct PackConfigStore {
    path: PathBuf,
    packs: BTreeMap<String, PackConfig>,
}

impl PackConfigStore {
    /// Empty store bound to `path`; nothing is read or written.
    pub fn empty(path: PathBuf) -> Self {
        Self {
            path,
            packs: BTreeMap::new(),
        }
    }

    /// Load the store, treating a missing file as empty.
    pub fn load(path: &Path) -> StickerResult<Self> {
        if !path.exists() {
            return Ok(Self::empty(path.to_path_buf()));
        }

        let content = fs::read_to_string(path)?;
        let file: PackConfigFile = serde_json::from_str(&content).map_err(|e| {
            StickerError::Config(format!(
                "Failed to parse pack config {}: {}",
                path.display(),
                e
            ))
        })?;

        Ok(Self {
            path: path.to_path_buf(),
            packs: file.packs,
        })
    }

    /// Persist with an atomic temp-file + rename write.
    pub fn save(&self) -> StickerResult<()> {
        let file = PackConfigFile {
            packs: self.packs.clone(),
        };
        let content = serde_json::to_string_pretty(&file)?;
        write_atomic(&self.path, content.as_bytes())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn get(&self, name: &str) -> Option<&PackConfig> {
        self.packs.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.packs.contains_key(name)
    }

    /// Insert or replace a pack's config.
    pub fn insert(&mut self, config: PackConfig) {
        self.packs.insert(config.name.clone(), config);
    }

    pub fn remove(&mut self, name: &str) -> Option<PackConfig> {
        self.packs.remove(name)
    }

    /// Enabled flag for a pack; packs without an entry count as enabled.
    pub fn is_enabled(&self, name: &str) -> bool {
        self.packs.get(name).map(|c| c.enabled).unwrap_or(true)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.packs.keys().map(String::as_str)
    }
}
