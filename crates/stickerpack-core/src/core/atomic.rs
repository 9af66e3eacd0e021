use crate::core::error::{StickerError, StickerResult};
use std::io::Write;
use std::path::Path;
use tempfile::NamedTempFile;

/// Write `data` to `path` so that readers see either the old or the new
/// content, never a partial file.
///
/// The data goes to a temporary file in the same directory, is flushed and
/// synced, then renamed over the target. The rename is the commit point.
pub fn write_atomic(path: &Path, data: &[u8]) -> StickerResult<()> {
    let dir = path
        .parent()
        .ok_or_else(|| StickerError::Path(format!("No parent directory: {}", path.display())))?;
    std::fs::create_dir_all(dir)?;

    let mut tmp = NamedTempFile::new_in(dir)?;
    tmp.write_all(data)?;
    tmp.as_file().sync_all()?;
    tmp.persist(path).map_err(|e| StickerError::Io(e.error))?;
    Ok(())
}
