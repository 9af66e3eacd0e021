use crate::core::error::{StickerError, StickerResult};
use std::path::{Path, PathBuf};

/// Name of the shared per-pack user configuration file inside the base directory.
pub const PACK_CONFIG_FILE: &str = "config.json";

/// Name of the manifest file inside each pack directory.
pub const MANIFEST_FILE: &str = "metadata.json";

/// Name of the sticker subdirectory inside each pack directory.
pub const STICKERS_DIR: &str = "stickers";

/// Get the stickerpack home directory (application settings live here)
///
/// Platform-specific locations:
/// - Windows: %APPDATA%\stickerpack
/// - Linux: ~/.config/stickerpack
/// - macOS: ~/Library/Application Support/stickerpack
pub fn stickerpack_home() -> StickerResult<PathBuf> {
    let config_dir = dirs::config_dir()
        .ok_or_else(|| StickerError::Path("Could not determine config directory".to_string()))?;
    Ok(config_dir.join("stickerpack"))
}

/// Get the application config file path (`<home>/config.yaml`)
pub fn config_file() -> StickerResult<PathBuf> {
    Ok(stickerpack_home()?.join("config.yaml"))
}

/// Default base directory holding packs and the pack config store
///
/// Platform-specific locations:
/// - Windows: %APPDATA%\stickerpack\data
/// - Linux: ~/.local/share/stickerpack
/// - macOS: ~/Library/Application Support/stickerpack/data
pub fn default_base_dir() -> StickerResult<PathBuf> {
    let data_dir = dirs::data_dir()
        .ok_or_else(|| StickerError::Path("Could not determine data directory".to_string()))?;
    if cfg!(target_os = "linux") {
        Ok(data_dir.join("stickerpack"))
    } else {
        Ok(data_dir.join("stickerpack").join("data"))
    }
}

/// `<base>/packs`
pub fn packs_dir(base: &Path) -> PathBuf {
    base.join("packs")
}

/// `<base>/packs/<name>`
pub fn pack_dir(base: &Path, name: &str) -> PathBuf {
    packs_dir(base).join(name)
}

/// `<base>/config.json`
pub fn pack_config_file(base: &Path) -> PathBuf {
    base.join(PACK_CONFIG_FILE)
}

/// `<base>/.tmp`, the download and staging area. It sits under the base
/// directory so that renames into `packs/` never cross filesystems.
pub fn temp_dir(base: &Path) -> PathBuf {
    base.join(".tmp")
}

/// Ensure a directory exists, creating it (and parents) if needed
pub fn ensure_dir(path: &Path) -> StickerResult<()> {
    if !path.exists() {
        std::fs::create_dir_all(path)?;
    }
    Ok(())
}

/// Whether `name` can be used as a pack directory name.
///
/// Accepts ASCII letters, digits, `-`, `_` and `.`; rejects empty names,
/// names starting with `.` (reserved for staging/backup entries) and
/// anything containing a path separator.
pub fn is_valid_pack_name(name: &str) -> bool {
    !name.is_empty()
        && name.len() <= 128
        && !name.starts_with('.')
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_' || c == '.')
}

/// Whether a directory entry name is hidden (staging, backups, tombstones).
pub fn is_hidden(name: &str) -> bool {
    name.starts_with('.')
}
