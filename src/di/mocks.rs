//! Mock implementations of service traits for testing

use super::traits::{ConfigProvider, HubProvider};
use crate::core::{HubError, HubErrorKind, StickerResult};
use crate::package::hub::{
    HubPackInfo, HubPackReference, DEFAULT_GITHUB_RAW_TEMPLATE, DEFAULT_GITHUB_RELEASE_TEMPLATE,
};
use async_trait::async_trait;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Mock configuration provider for testing
///
/// # Example
///
/// ```
/// use stickerpack::di::mocks::MockConfigProvider;
/// use stickerpack::di::ConfigProvider;
/// use std::path::PathBuf;
///
/// let mut config = MockConfigProvider::default();
/// config.base_dir = PathBuf::from("/tmp/stickerpack-test");
/// config.auto_update = true;
///
/// assert!(config.auto_update());
/// ```
#[derive(Clone)]
pub struct MockConfigProvider {
    pub hub_url: String,
    pub hub_index_url: String,
    pub proxy: Option<String>,
    pub github_raw_template: String,
    pub github_release_template: String,
    pub base_dir: PathBuf,
    pub request_timeout: Duration,
    pub cache_ttl: Duration,
    pub auto_update: bool,
    pub force_update: bool,
    pub update_interval: Duration,
    pub checksum_algorithm: String,
}

impl Default for MockConfigProvider {
    fn default() -> Self {
        Self {
            hub_url: "http://localhost:8888".to_string(),
            hub_index_url: "http://localhost:8888/manifest.json".to_string(),
            proxy: None,
            github_raw_template: DEFAULT_GITHUB_RAW_TEMPLATE.to_string(),
            github_release_template: DEFAULT_GITHUB_RELEASE_TEMPLATE.to_string(),
            base_dir: PathBuf::from("/tmp/stickerpack-test"),
            request_timeout: Duration::from_secs(5),
            cache_ttl: Duration::from_secs(3600),
            auto_update: false,
            force_update: false,
            update_interval: Duration::from_secs(3600),
            checksum_algorithm: "sha256".to_string(),
        }
    }
}

impl MockConfigProvider {
    /// Default settings rooted at `base_dir`
    pub fn with_base_dir(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
            ..Self::default()
        }
    }
}

impl ConfigProvider for MockConfigProvider {
    fn hub_url(&self) -> &str {
        &self.hub_url
    }

    fn hub_index_url(&self) -> String {
        self.hub_index_url.clone()
    }

    fn proxy(&self) -> Option<&str> {
        self.proxy.as_deref()
    }

    fn github_raw_template(&self) -> &str {
        &self.github_raw_template
    }

    fn github_release_template(&self) -> &str {
        &self.github_release_template
    }

    fn base_dir(&self) -> StickerResult<PathBuf> {
        Ok(self.base_dir.clone())
    }

    fn request_timeout(&self) -> Duration {
        self.request_timeout
    }

    fn cache_ttl(&self) -> Duration {
        self.cache_ttl
    }

    fn auto_update(&self) -> bool {
        self.auto_update
    }

    fn force_update(&self) -> bool {
        self.force_update
    }

    fn update_interval(&self) -> Duration {
        self.update_interval
    }

    fn checksum_algorithm(&self) -> &str {
        &self.checksum_algorithm
    }
}

/// Mock hub provider for testing
///
/// Serves an in-memory catalog and archive bytes keyed by URL, and counts
/// calls so tests can assert on traffic.
///
/// # Example
///
/// ```
/// use stickerpack::di::mocks::MockHubProvider;
/// use stickerpack::package::hub::HubPackInfo;
///
/// let hub = MockHubProvider::new();
/// hub.add_pack(HubPackInfo::new("cats", "1.0.0", "mock://cats.zip"));
/// hub.add_archive("mock://cats.zip", vec![0u8; 4]);
///
/// assert_eq!(hub.fetch_calls(), 0);
/// ```
#[derive(Clone, Default)]
pub struct MockHubProvider {
    packs: Arc<Mutex<Vec<HubPackInfo>>>,
    index: Arc<Mutex<Vec<(HubPackReference, HubPackInfo)>>>,
    archives: Arc<Mutex<HashMap<String, Vec<u8>>>>,
    fetch_error: Arc<Mutex<Option<String>>>,
    download_delay: Arc<Mutex<Option<Duration>>>,
    fetch_calls: Arc<AtomicUsize>,
    download_calls: Arc<AtomicUsize>,
}

impl MockHubProvider {
    /// Create a new mock hub with an empty catalog
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace a catalog entry
    pub fn add_pack(&self, info: HubPackInfo) {
        let mut packs = lock(&self.packs);
        packs.retain(|p| p.name != info.name);
        packs.push(info);
    }

    /// List `reference` in the hub index; resolving it yields `info`
    pub fn add_reference(&self, reference: HubPackReference, info: HubPackInfo) {
        let mut index = lock(&self.index);
        index.retain(|(r, _)| r.slug != reference.slug);
        index.push((reference, info));
    }

    /// Serve `bytes` for downloads of `url`
    pub fn add_archive(&self, url: impl Into<String>, bytes: Vec<u8>) {
        lock(&self.archives).insert(url.into(), bytes);
    }

    /// Make catalog fetches fail with `FetchFailed` (or succeed again with `None`)
    pub fn set_fetch_error(&self, error: Option<&str>) {
        *lock(&self.fetch_error) = error.map(str::to_string);
    }

    /// Sleep before serving each download
    pub fn set_download_delay(&self, delay: Duration) {
        *lock(&self.download_delay) = Some(delay);
    }

    pub fn fetch_calls(&self) -> usize {
        self.fetch_calls.load(Ordering::SeqCst)
    }

    pub fn download_calls(&self) -> usize {
        self.download_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl HubProvider for MockHubProvider {
    async fn fetch_packs(&self, _force_refresh: bool) -> StickerResult<Vec<HubPackInfo>> {
        self.fetch_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(error) = lock(&self.fetch_error).clone() {
            return Err(HubError::fetch_failed(error).into());
        }
        Ok(lock(&self.packs).clone())
    }

    async fn fetch_pack_info(
        &self,
        name: &str,
        force_refresh: bool,
    ) -> StickerResult<HubPackInfo> {
        self.fetch_packs(force_refresh)
            .await?
            .into_iter()
            .find(|p| p.name == name)
            .ok_or_else(|| {
                HubError::new(
                    HubErrorKind::NotFound,
                    format!("Pack '{}' not found on hub", name),
                )
                .into()
            })
    }

    async fn download_pack(&self, url: &str, destination: &Path) -> StickerResult<u64> {
        self.download_calls.fetch_add(1, Ordering::SeqCst);

        let delay = *lock(&self.download_delay);
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        let bytes = lock(&self.archives)
            .get(url)
            .cloned()
            .ok_or_else(|| HubError::download_failed(format!("{}: HTTP 404", url)))?;

        if let Some(parent) = destination.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(destination, &bytes)?;
        Ok(bytes.len() as u64)
    }

    async fn fetch_hub_index(&self) -> StickerResult<Vec<HubPackReference>> {
        self.fetch_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(error) = lock(&self.fetch_error).clone() {
            return Err(HubError::fetch_failed(error).into());
        }
        Ok(lock(&self.index).iter().map(|(r, _)| r.clone()).collect())
    }

    async fn resolve_reference(
        &self,
        reference: &HubPackReference,
    ) -> StickerResult<HubPackInfo> {
        lock(&self.index)
            .iter()
            .find(|(r, _)| r.slug == reference.slug)
            .map(|(_, info)| info.clone())
            .ok_or_else(|| {
                HubError::fetch_failed(format!("{}: HTTP 404", reference.slug)).into()
            })
    }
}
