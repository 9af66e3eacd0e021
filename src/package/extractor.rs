use crate::core::{StickerError, StickerResult, UpdateError, UpdateErrorKind};
use std::fs::{self, File};
use std::io;
use std::path::{Component, Path, PathBuf};
use tracing::debug;
use zip::ZipArchive;

/// Entries macOS Finder adds to zips; never part of a pack.
const MACOS_METADATA_DIR: &str = "__MACOSX";

const S_IFMT: u32 = 0o170000;
const S_IFLNK: u32 = 0o120000;

/// Extracts pack archives (zip) into an isolated staging directory
pub struct PackageExtractor {
    staging_dir: PathBuf,
}

struct PlannedEntry {
    index: usize,
    relative: PathBuf,
    is_dir: bool,
}

impl PackageExtractor {
    /// Create a new PackageExtractor writing into `staging_dir`
    pub fn new(staging_dir: PathBuf) -> Self {
        Self { staging_dir }
    }

    pub fn staging_dir(&self) -> &Path {
        &self.staging_dir
    }

    /// Extract an archive file.
    ///
    /// Every entry is checked before anything is written; a single entry
    /// that would escape the staging directory rejects the whole archive.
    /// Returns the root directory of the extracted pack.
    pub fn extract(&self, archive_path: &Path) -> StickerResult<PathBuf> {
        let file = File::open(archive_path)?;
        let mut archive = ZipArchive::new(file).map_err(|e| {
            UpdateError::new(
                UpdateErrorKind::InvalidArchive,
                format!("Invalid zip {}: {}", archive_path.display(), e),
            )
        })?;

        let plan = plan_entries(&mut archive)?;

        // Start from a clean staging directory
        if self.staging_dir.exists() {
            fs::remove_dir_all(&self.staging_dir)?;
        }
        fs::create_dir_all(&self.staging_dir)?;

        let result = self.write_entries(&mut archive, &plan);
        if let Err(e) = result {
            let _ = fs::remove_dir_all(&self.staging_dir); // Ignore cleanup errors
            return Err(e);
        }

        debug!(
            archive = %archive_path.display(),
            entries = plan.len(),
            "Extracted archive"
        );

        self.find_root()
    }

    fn write_entries(
        &self,
        archive: &mut ZipArchive<File>,
        plan: &[PlannedEntry],
    ) -> StickerResult<()> {
        for entry in plan {
            let target = self.staging_dir.join(&entry.relative);
            if !target.starts_with(&self.staging_dir) {
                return Err(unsafe_entry(&entry.relative.to_string_lossy()));
            }

            if entry.is_dir {
                fs::create_dir_all(&target)?;
                continue;
            }

            if let Some(parent) = target.parent() {
                fs::create_dir_all(parent)?;
            }
            let mut zipped = archive.by_index(entry.index).map_err(|e| {
                UpdateError::new(
                    UpdateErrorKind::InvalidArchive,
                    format!("Failed to read entry {}: {}", entry.relative.display(), e),
                )
            })?;
            let mut out = File::create(&target)?;
            io::copy(&mut zipped, &mut out).map_err(|e| {
                UpdateError::new(
                    UpdateErrorKind::InvalidArchive,
                    format!("Failed to extract {}: {}", entry.relative.display(), e),
                )
            })?;
        }
        Ok(())
    }

    /// The pack root: the single top-level directory when the archive wraps
    /// everything in one, otherwise the staging directory itself.
    fn find_root(&self) -> StickerResult<PathBuf> {
        let entries: Vec<_> = fs::read_dir(&self.staging_dir)?
            .collect::<Result<Vec<_>, _>>()
            .map_err(StickerError::Io)?;

        if let [only] = entries.as_slice() {
            if only.file_type()?.is_dir() {
                return Ok(only.path());
            }
        }
        Ok(self.staging_dir.clone())
    }
}

/// Validate every entry name up front and build the extraction plan.
fn plan_entries(archive: &mut ZipArchive<File>) -> StickerResult<Vec<PlannedEntry>> {
    let mut plan = Vec::with_capacity(archive.len());

    for index in 0..archive.len() {
        let entry = archive.by_index_raw(index).map_err(|e| {
            UpdateError::new(
                UpdateErrorKind::InvalidArchive,
                format!("Failed to read entry #{}: {}", index, e),
            )
        })?;
        let name = entry.name().to_string();

        if entry
            .unix_mode()
            .is_some_and(|mode| mode & S_IFMT == S_IFLNK)
        {
            return Err(unsafe_entry(&name));
        }
        if entry.enclosed_name().is_none() {
            return Err(unsafe_entry(&name));
        }
        let relative = safe_relative_path(&name).ok_or_else(|| unsafe_entry(&name))?;

        if relative.as_os_str().is_empty()
            || relative.starts_with(MACOS_METADATA_DIR)
        {
            continue;
        }

        plan.push(PlannedEntry {
            index,
            relative,
            is_dir: entry.is_dir(),
        });
    }

    Ok(plan)
}

/// Normalise an archive entry name into a path relative to the staging
/// directory, or `None` when it is absolute, has a drive/root prefix, or
/// climbs with `..`.
pub fn safe_relative_path(name: &str) -> Option<PathBuf> {
    let normalized = name.replace('\\', "/");
    if normalized.starts_with('/') {
        return None;
    }

    let mut relative = PathBuf::new();
    for part in normalized.split('/') {
        match part {
            "" | "." => continue,
            ".." => return None,
            _ if part.contains(':') => return None,
            _ => {}
        }
        // Re-check through std's parser in case of platform quirks
        match Path::new(part).components().next() {
            Some(Component::Normal(_)) => relative.push(part),
            _ => return None,
        }
    }
    Some(relative)
}

fn unsafe_entry(name: &str) -> StickerError {
    UpdateError::new(
        UpdateErrorKind::UnsafeArchive,
        format!("Archive entry escapes staging directory: {}", name),
    )
    .into()
}
