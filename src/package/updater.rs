//! Archive verification, extraction and the atomic directory swap.
//!
//! Everything here is synchronous filesystem work; the manager runs it on
//! the blocking pool.

use crate::core::{StickerError, StickerResult, UpdateError, UpdateErrorKind};
use crate::package::checksum::{self, ChecksumAlgorithm};
use crate::package::extractor::PackageExtractor;
use crate::package::hub::HubPackInfo;
use crate::package::manifest::PackManifest;
use crate::package::pack::Pack;
use crate::package::rollback::{hidden_sibling, with_rollback};
use chrono::Utc;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Turns downloaded archives into installed pack directories.
#[derive(Debug, Clone, Copy, Default)]
pub struct PackUpdater {
    algorithm: ChecksumAlgorithm,
}

impl PackUpdater {
    pub fn new(algorithm: ChecksumAlgorithm) -> Self {
        Self { algorithm }
    }

    /// Algorithm used when the hub publishes no checksum.
    pub fn algorithm(&self) -> ChecksumAlgorithm {
        self.algorithm
    }

    /// Verify an archive against the expected checksum before it is opened.
    pub fn verify_checksum(&self, archive: &Path, expected: &str) -> StickerResult<()> {
        checksum::verify_file(archive, expected)?;
        debug!(archive = %archive.display(), "Checksum verified");
        Ok(())
    }

    /// Prefixed digest of an archive with the configured algorithm.
    pub fn checksum(&self, archive: &Path) -> StickerResult<String> {
        checksum::checksum_file(archive, self.algorithm)
    }

    /// Extract into `staging_dir`; returns the staged pack root.
    pub fn extract_pack(&self, archive: &Path, staging_dir: &Path) -> StickerResult<PathBuf> {
        PackageExtractor::new(staging_dir.to_path_buf()).extract(archive)
    }

    /// Validate the staged copy and stamp it with what was installed:
    /// discovered stickers, the catalog version, source url, checksum and
    /// timestamps. `previous` is the manifest being replaced, if any.
    pub fn stage_manifest(
        &self,
        staged: &Path,
        hub_info: &HubPackInfo,
        checksum: Option<&str>,
        previous: Option<&PackManifest>,
    ) -> StickerResult<PackManifest> {
        let pack = Pack::with_name(staged, &hub_info.name);
        let mut manifest = pack.check().map_err(invalid_pack)?;

        if manifest.version != hub_info.version {
            warn!(
                pack = %hub_info.name,
                archive_version = %manifest.version,
                hub_version = %hub_info.version,
                "Archive version differs from catalog, recording catalog version"
            );
            manifest.version = hub_info.version.clone();
        }

        let now = Utc::now().to_rfc3339();
        manifest.stickers = pack.discover_stickers();
        manifest.url = Some(hub_info.url.clone());
        manifest.checksum = checksum.map(str::to_string);
        let archived = manifest.created_at.take();
        manifest.created_at = previous
            .and_then(|p| p.created_at.clone())
            .or(archived)
            .or_else(|| Some(now.clone()));
        manifest.updated_at = Some(now);

        pack.save_manifest(&manifest)?;
        Ok(manifest)
    }

    /// Swap a staged pack into `install_dir`.
    ///
    /// The live copy is moved to a hidden backup, `before_commit` runs, then
    /// the staged directory is renamed into place and the backup deleted.
    /// Any failure before the final rename puts the live copy back.
    pub fn install_pack<F>(
        &self,
        staged: &Path,
        install_dir: &Path,
        before_commit: F,
    ) -> StickerResult<()>
    where
        F: FnOnce() -> StickerResult<()>,
    {
        let name = dir_name(install_dir)?;
        Pack::with_name(staged, name.as_str())
            .check()
            .map_err(invalid_pack)?;

        if let Some(parent) = install_dir.parent() {
            fs::create_dir_all(parent).map_err(|e| install_failed(&name, e))?;
        }

        let replaced = install_dir.exists();
        with_rollback(install_dir, || {
            before_commit()?;
            fs::rename(staged, install_dir).map_err(|e| install_failed(&name, e))
        })
        .map_err(|e| match e {
            StickerError::Io(e) => install_failed(&name, e),
            other => other,
        })?;

        info!(pack = %name, replaced, "Installed pack");
        Ok(())
    }

    /// Remove an installed pack: rename it to a hidden tombstone so it
    /// disappears at once, then delete the tombstone.
    ///
    /// A failed recursive delete leaves only the hidden tombstone behind
    /// and is still reported as `RemoveFailed`.
    pub fn remove_pack(&self, install_dir: &Path) -> StickerResult<()> {
        if !install_dir.exists() {
            debug!(path = %install_dir.display(), "Nothing to remove");
            return Ok(());
        }
        let name = dir_name(install_dir)?;

        let tombstone = hidden_sibling(install_dir, "deleting");
        fs::rename(install_dir, &tombstone).map_err(|e| remove_failed(&name, e))?;

        fs::remove_dir_all(&tombstone).map_err(|e| {
            warn!(pack = %name, path = %tombstone.display(), error = %e, "Tombstone not fully removed");
            remove_failed(&name, e)
        })?;

        info!(pack = %name, "Removed pack");
        Ok(())
    }
}

fn dir_name(path: &Path) -> StickerResult<String> {
    path.file_name()
        .and_then(|n| n.to_str())
        .map(str::to_string)
        .ok_or_else(|| StickerError::Path(format!("No pack name in {}", path.display())))
}

fn invalid_pack(e: StickerError) -> StickerError {
    match e {
        StickerError::Pack(e) => {
            UpdateError::new(UpdateErrorKind::InvalidPack, e.to_string()).into()
        }
        other => other,
    }
}

fn install_failed(name: &str, e: impl std::fmt::Display) -> StickerError {
    UpdateError::new(
        UpdateErrorKind::InstallFailed,
        format!("Failed to install '{}': {}", name, e),
    )
    .into()
}

fn remove_failed(name: &str, e: impl std::fmt::Display) -> StickerError {
    UpdateError::new(
        UpdateErrorKind::RemoveFailed,
        format!("Failed to remove '{}': {}", name, e),
    )
    .into()
}
