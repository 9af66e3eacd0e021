//! Trait definitions for dependency injection

use crate::core::StickerResult;
use crate::package::hub::{HubPackInfo, HubPackReference};
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Trait for configuration access
///
/// Provides read-only access to application configuration.
/// Implementations should be thread-safe (Send + Sync).
pub trait ConfigProvider: Send + Sync {
    /// Base URL of the sticker hub
    fn hub_url(&self) -> &str;

    /// URL of the GitHub-backed hub index (`<hub_url>/manifest.json` unless set)
    fn hub_index_url(&self) -> String;

    /// HTTP(S) proxy for every hub request
    fn proxy(&self) -> Option<&str>;

    fn github_raw_template(&self) -> &str;

    fn github_release_template(&self) -> &str;

    /// Directory holding packs, the pack config store and staging area
    fn base_dir(&self) -> StickerResult<PathBuf>;

    fn request_timeout(&self) -> Duration;

    /// Lifetime of a cached hub catalog
    fn cache_ttl(&self) -> Duration;

    /// Whether the background update loop should run
    fn auto_update(&self) -> bool;

    fn force_update(&self) -> bool;

    fn update_interval(&self) -> Duration;

    /// Get the checksum algorithm (e.g., "sha256", "blake3")
    fn checksum_algorithm(&self) -> &str;
}

/// Trait for hub catalog access
///
/// The manager talks to the hub only through this trait, so tests can
/// substitute an in-memory catalog.
#[async_trait]
pub trait HubProvider: Send + Sync {
    /// Fetch the catalog, reusing a cached copy unless `force_refresh`
    async fn fetch_packs(&self, force_refresh: bool) -> StickerResult<Vec<HubPackInfo>>;

    /// Look up one pack in the catalog
    async fn fetch_pack_info(&self, name: &str, force_refresh: bool)
        -> StickerResult<HubPackInfo>;

    /// Download an archive to `destination`; returns bytes written
    async fn download_pack(&self, url: &str, destination: &Path) -> StickerResult<u64>;

    /// Fetch the GitHub-backed hub index
    async fn fetch_hub_index(&self) -> StickerResult<Vec<HubPackReference>>;

    /// Read a referenced pack's metadata and turn it into a catalog entry
    async fn resolve_reference(&self, reference: &HubPackReference)
        -> StickerResult<HubPackInfo>;
}
