use crate::core::StickerResult;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::{debug, error, warn};

static SIBLING_COUNTER: AtomicU64 = AtomicU64::new(0);

/// A unique hidden path next to `path`: `.<name>.<tag>-<pid>-<n>`.
///
/// Hidden names are skipped by `reload`, so a backup or tombstone left
/// behind by a crash never shows up as a pack.
pub fn hidden_sibling(path: &Path, tag: &str) -> PathBuf {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let n = SIBLING_COUNTER.fetch_add(1, Ordering::Relaxed);
    let hidden = format!(".{}.{}-{}-{}", name, tag, std::process::id(), n);
    match path.parent() {
        Some(parent) => parent.join(hidden),
        None => PathBuf::from(hidden),
    }
}

/// Holds a live directory moved aside so a failed swap can put it back.
///
/// Dropping without [`DirBackup::commit`] or [`DirBackup::restore`]
/// restores the backup.
pub struct DirBackup {
    original: PathBuf,
    backup: Option<PathBuf>,
}

impl DirBackup {
    /// Move `original` to a hidden sibling if it exists.
    pub fn take(original: &Path) -> StickerResult<Self> {
        let backup = if original.exists() {
            let backup = hidden_sibling(original, "backup");
            fs::rename(original, &backup)?;
            debug!(from = %original.display(), to = %backup.display(), "Moved live directory aside");
            Some(backup)
        } else {
            None
        };

        Ok(Self {
            original: original.to_path_buf(),
            backup,
        })
    }

    /// Check if there is anything to restore
    pub fn has_backup(&self) -> bool {
        self.backup.is_some()
    }

    /// Put the backup back in place, discarding whatever now sits at the
    /// original path.
    pub fn restore(mut self) -> StickerResult<()> {
        self.restore_inner()
    }

    /// Drop the backup. Failing to delete it is logged, not returned: the
    /// swap already happened.
    pub fn commit(mut self) {
        if let Some(backup) = self.backup.take() {
            if let Err(e) = fs::remove_dir_all(&backup) {
                warn!(path = %backup.display(), error = %e, "Failed to remove backup");
            }
        }
    }

    fn restore_inner(&mut self) -> StickerResult<()> {
        let Some(backup) = self.backup.take() else {
            return Ok(());
        };
        if self.original.exists() {
            fs::remove_dir_all(&self.original)?;
        }
        fs::rename(&backup, &self.original)?;
        debug!(path = %self.original.display(), "Restored backup");
        Ok(())
    }
}

impl Drop for DirBackup {
    fn drop(&mut self) {
        if self.backup.is_some() {
            if let Err(e) = self.restore_inner() {
                error!(path = %self.original.display(), error = %e, "Failed to restore backup");
            }
        }
    }
}

/// Clean up after a crash in the middle of a swap or removal.
///
/// A `.<name>.backup-*` whose live `<name>` is missing is moved back;
/// any other backup and every `.<name>.deleting-*` tombstone is deleted.
/// Must not run while swaps are in progress. Returns the restored names.
pub fn recover_orphans(dir: &Path) -> StickerResult<Vec<String>> {
    let mut restored = Vec::new();
    if !dir.is_dir() {
        return Ok(restored);
    }

    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        let file_name = entry.file_name().to_string_lossy().into_owned();
        let Some((name, tag)) = parse_hidden_sibling(&file_name) else {
            continue;
        };
        let path = entry.path();
        let live = dir.join(name);

        if tag == "backup" && !live.exists() {
            fs::rename(&path, &live)?;
            warn!(pack = name, "Restored backup left by an interrupted install");
            restored.push(name.to_string());
        } else if let Err(e) = fs::remove_dir_all(&path) {
            warn!(path = %path.display(), error = %e, "Failed to remove leftover directory");
        }
    }

    Ok(restored)
}

/// Split `.<name>.<tag>-<pid>-<n>` into `(name, tag)`.
fn parse_hidden_sibling(file_name: &str) -> Option<(&str, &str)> {
    let rest = file_name.strip_prefix('.')?;
    let (name, suffix) = rest.rsplit_once('.')?;
    let (tag, _) = suffix.split_once('-')?;
    match tag {
        "backup" | "deleting" if !name.is_empty() => Some((name, tag)),
        _ => None,
    }
}

/// Run `f` with `dir` moved aside; restore it if `f` fails.
pub fn with_rollback<F, T>(dir: &Path, f: F) -> StickerResult<T>
where
    F: FnOnce() -> StickerResult<T>,
{
    let backup = DirBackup::take(dir)?;

    match f() {
        Ok(result) => {
            backup.commit();
            Ok(result)
        }
        Err(e) => {
            if backup.has_backup() {
                warn!(path = %dir.display(), error = %e, "Operation failed, rolling back");
            }
            if let Err(rollback_err) = backup.restore() {
                error!(path = %dir.display(), error = %rollback_err, "Rollback failed");
            }
            Err(e)
        }
    }
}
