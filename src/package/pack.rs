//! A single pack directory on disk.

use crate::core::path::{MANIFEST_FILE, STICKERS_DIR};
use crate::core::{write_atomic, PackError, PackErrorKind, StickerResult};
use crate::package::manifest::{PackManifest, StickerInfo};
use chrono::{DateTime, Utc};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Image extensions recognised as stickers (compared lowercase).
pub const SUPPORTED_FORMATS: &[&str] = &["png", "jpg", "jpeg", "gif", "webp"];

/// Handle to one pack directory. Holds no cached state; every call reads disk.
#[derive(Debug, Clone)]
pub struct Pack {
    dir: PathBuf,
    name: String,
}

impl Pack {
    /// A pack whose expected name is its directory name.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        let dir = dir.into();
        let name = dir
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or_default()
            .to_string();
        Self { dir, name }
    }

    /// A pack expected to carry `name`, regardless of where it lives.
    /// Used for staged copies whose directory name is temporary.
    pub fn with_name(dir: impl Into<PathBuf>, name: impl Into<String>) -> Self {
        Self {
            dir: dir.into(),
            name: name.into(),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn manifest_path(&self) -> PathBuf {
        self.dir.join(MANIFEST_FILE)
    }

    pub fn stickers_dir(&self) -> PathBuf {
        self.dir.join(STICKERS_DIR)
    }

    /// Read and parse `metadata.json`.
    pub fn load_manifest(&self) -> StickerResult<PackManifest> {
        let manifest_file = self.manifest_path();

        let content = match fs::read_to_string(&manifest_file) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(PackError::invalid_manifest(format!(
                    "Manifest not found: {}",
                    manifest_file.display()
                ))
                .into());
            }
            Err(e) => {
                return Err(PackError::invalid_manifest(format!(
                    "Failed to read manifest {}: {}",
                    manifest_file.display(),
                    e
                ))
                .into());
            }
        };

        PackManifest::from_json(&content)
    }

    /// List sticker files. Entries that cannot be read are skipped, so one
    /// bad file never invalidates the pack.
    pub fn discover_stickers(&self) -> Vec<StickerInfo> {
        let stickers_dir = self.stickers_dir();
        let entries = match fs::read_dir(&stickers_dir) {
            Ok(entries) => entries,
            Err(e) => {
                if e.kind() != std::io::ErrorKind::NotFound {
                    warn!(pack = %self.name, error = %e, "Cannot read stickers directory");
                }
                return Vec::new();
            }
        };

        let mut stickers = Vec::new();
        for entry in entries {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    warn!(pack = %self.name, error = %e, "Skipping unreadable sticker entry");
                    continue;
                }
            };
            let path = entry.path();

            let (Some(stem), Some(file_name)) = (
                path.file_stem().and_then(|s| s.to_str()),
                path.file_name().and_then(|s| s.to_str()),
            ) else {
                warn!(pack = %self.name, path = %path.display(), "Skipping non UTF-8 file name");
                continue;
            };

            if !is_supported_image(&path) {
                continue;
            }

            let metadata = match fs::metadata(&path) {
                Ok(m) if m.is_file() => m,
                Ok(_) => continue,
                Err(e) => {
                    warn!(pack = %self.name, file = file_name, error = %e, "Skipping unreadable sticker");
                    continue;
                }
            };
            if let Err(e) = fs::File::open(&path) {
                warn!(pack = %self.name, file = file_name, error = %e, "Skipping unreadable sticker");
                continue;
            }

            let created_at = metadata
                .created()
                .or_else(|_| metadata.modified())
                .ok()
                .map(|t| DateTime::<Utc>::from(t).to_rfc3339());

            stickers.push(StickerInfo {
                created_at,
                ..StickerInfo::local(stem, format!("{}/{}", STICKERS_DIR, file_name))
            });
        }

        stickers.sort_by(|a, b| a.relative_path.cmp(&b.relative_path));
        debug!(pack = %self.name, count = stickers.len(), "Discovered stickers");
        stickers
    }

    /// Structural validation: directory exists, manifest loads, and the
    /// manifest name equals the expected pack name. Returns the manifest.
    pub fn check(&self) -> StickerResult<PackManifest> {
        if !self.dir.is_dir() {
            return Err(PackError::invalid_manifest(format!(
                "Pack directory not found: {}",
                self.dir.display()
            ))
            .into());
        }

        let manifest = self.load_manifest()?;
        if manifest.name != self.name {
            return Err(PackError::new(
                PackErrorKind::NameMismatch,
                format!(
                    "Manifest name '{}' does not match pack '{}'",
                    manifest.name, self.name
                ),
            )
            .into());
        }

        Ok(manifest)
    }

    /// `true` when [`Pack::check`] passes. An empty pack is valid.
    pub fn validate(&self) -> bool {
        self.check().is_ok()
    }

    /// Validated manifest with the sticker list refreshed from disk.
    pub fn load(&self) -> StickerResult<PackManifest> {
        let mut manifest = self.check()?;
        manifest.stickers = self.discover_stickers();
        Ok(manifest)
    }

    /// Write the manifest back with a temp-file + rename, so a crash never
    /// leaves a half-written `metadata.json`.
    pub fn save_manifest(&self, manifest: &PackManifest) -> StickerResult<()> {
        let content = manifest.to_json_pretty()?;
        write_atomic(&self.manifest_path(), content.as_bytes()).map_err(|e| {
            PackError::new(
                PackErrorKind::SaveFailed,
                format!("Failed to save manifest for '{}': {}", self.name, e),
            )
            .into()
        })
    }

    /// Full path to a sticker by name (file stem).
    pub fn sticker_path(&self, sticker_name: &str) -> Option<PathBuf> {
        fs::read_dir(self.stickers_dir())
            .ok()?
            .filter_map(|e| e.ok())
            .map(|e| e.path())
            .find(|p| {
                is_supported_image(p)
                    && p.file_stem().and_then(|s| s.to_str()) == Some(sticker_name)
            })
    }

    /// Read a sticker's bytes; `None` when no such sticker exists.
    pub fn read_sticker(&self, sticker_name: &str) -> StickerResult<Option<Vec<u8>>> {
        match self.sticker_path(sticker_name) {
            Some(path) => Ok(Some(fs::read(path)?)),
            None => Ok(None),
        }
    }

    /// Sorted sticker names.
    pub fn list_sticker_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self
            .discover_stickers()
            .into_iter()
            .map(|s| s.name)
            .collect();
        names.sort();
        names
    }
}

fn is_supported_image(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| SUPPORTED_FORMATS.contains(&e.to_ascii_lowercase().as_str()))
        .unwrap_or(false)
}
