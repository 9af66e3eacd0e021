use crate::cache::{TtlCache, DEFAULT_CACHE_TTL};
use crate::core::{HubError, HubErrorKind, StickerResult};
use crate::di::{ConfigProvider, HubProvider};
use crate::package::hub::{
    GitHubSource, HubCatalog, HubIndex, HubPackInfo, HubPackReference, RemotePackMetadata,
    DEFAULT_GITHUB_RAW_TEMPLATE, DEFAULT_GITHUB_RELEASE_TEMPLATE, METADATA_FILE,
};
use async_trait::async_trait;
use futures_util::StreamExt;
use reqwest::{Client, Proxy};
use serde::de::DeserializeOwned;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;
use tokio::time::timeout;
use tracing::{debug, info};

/// Timeout for catalog requests, and for each read of a download.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Client for the sticker hub: catalog listing, the GitHub-backed index
/// and archive downloads
pub struct HubClient {
    client: Client,
    hub_url: String,
    index_url: String,
    github_raw_template: String,
    github_release_template: String,
    request_timeout: Duration,
    cache: Mutex<TtlCache<Vec<HubPackInfo>>>,
}

impl HubClient {
    /// Create a client for `hub_url` with default timeout and cache TTL
    pub fn new(hub_url: &str) -> StickerResult<Self> {
        Self::with_timeout(hub_url, DEFAULT_REQUEST_TIMEOUT)
    }

    pub fn with_timeout(hub_url: &str, request_timeout: Duration) -> StickerResult<Self> {
        Self::build(hub_url, request_timeout, None)
    }

    /// Build from application config (hub URL, proxy, timeout, cache TTL,
    /// index URL and GitHub templates)
    pub fn from_config(config: &dyn ConfigProvider) -> StickerResult<Self> {
        let client = Self::build(config.hub_url(), config.request_timeout(), config.proxy())?
            .with_cache_ttl(config.cache_ttl())
            .with_index_url(config.hub_index_url())
            .with_github_templates(config.github_raw_template(), config.github_release_template());
        Ok(client)
    }

    fn build(hub_url: &str, request_timeout: Duration, proxy: Option<&str>) -> StickerResult<Self> {
        let mut builder = Client::builder()
            .connect_timeout(request_timeout)
            .user_agent(concat!("stickerpack/", env!("CARGO_PKG_VERSION")));
        if let Some(proxy) = proxy {
            let proxy = Proxy::all(proxy)
                .map_err(|e| HubError::fetch_failed(format!("Invalid proxy '{}': {}", proxy, e)))?;
            builder = builder.proxy(proxy);
        }
        let client = builder
            .build()
            .map_err(|e| HubError::fetch_failed(format!("Failed to build HTTP client: {}", e)))?;

        let hub_url = hub_url.trim_end_matches('/').to_string();
        Ok(Self {
            client,
            index_url: format!("{}/manifest.json", hub_url),
            hub_url,
            github_raw_template: DEFAULT_GITHUB_RAW_TEMPLATE.to_string(),
            github_release_template: DEFAULT_GITHUB_RELEASE_TEMPLATE.to_string(),
            request_timeout,
            cache: Mutex::new(TtlCache::new(DEFAULT_CACHE_TTL)),
        })
    }

    /// Read the hub index from `url` instead of `<hub_url>/manifest.json`
    pub fn with_index_url(mut self, url: impl Into<String>) -> Self {
        self.index_url = url.into();
        self
    }

    pub fn with_github_templates(mut self, raw: &str, release: &str) -> Self {
        self.github_raw_template = raw.to_string();
        self.github_release_template = release.to_string();
        self
    }

    /// Replace the catalog cache with an empty one using `ttl`
    pub fn with_cache_ttl(mut self, ttl: Duration) -> Self {
        self.cache = Mutex::new(TtlCache::new(ttl));
        self
    }

    pub fn hub_url(&self) -> &str {
        &self.hub_url
    }

    /// Fetch the catalog.
    ///
    /// The cache lock is held across the request, so concurrent callers
    /// within the TTL share one request. A failed request never falls back
    /// to an expired catalog.
    pub async fn fetch_packs(&self, force_refresh: bool) -> StickerResult<Vec<HubPackInfo>> {
        let mut cache = self.cache.lock().await;

        if !force_refresh {
            if let Some(packs) = cache.get() {
                debug!(count = packs.len(), "Using cached hub catalog");
                return Ok(packs);
            }
        }

        let packs = self.request_catalog().await?;
        info!(hub = %self.hub_url, count = packs.len(), "Fetched hub catalog");
        cache.put(packs.clone());
        Ok(packs)
    }

    /// Look up one pack in the (possibly cached) catalog
    pub async fn fetch_pack_info(
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

    /// Forget the cached catalog
    pub async fn clear_cache(&self) {
        self.cache.lock().await.clear();
    }

    async fn request_catalog(&self) -> StickerResult<Vec<HubPackInfo>> {
        let url = format!("{}/packs", self.hub_url);
        let catalog: HubCatalog = self.get_json(&url).await?;

        if !catalog.is_success() {
            return Err(HubError::fetch_failed(format!(
                "Hub returned status '{}': {}",
                catalog.status,
                catalog.error.as_deref().unwrap_or("no error message")
            ))
            .into());
        }

        Ok(catalog.packs)
    }

    /// Fetch the GitHub-backed hub index. Not cached.
    pub async fn fetch_hub_index(&self) -> StickerResult<Vec<HubPackReference>> {
        let index: HubIndex = self.get_json(&self.index_url).await?;
        let packs = index.into_packs();
        info!(index = %self.index_url, count = packs.len(), "Fetched hub index");
        Ok(packs)
    }

    /// Fetch `metadata.json` from a pack's GitHub source directory
    pub async fn fetch_pack_metadata(
        &self,
        source: &GitHubSource,
    ) -> StickerResult<RemotePackMetadata> {
        let url = source.raw_url(&self.github_raw_template, METADATA_FILE);
        Ok(self.get_json(&url).await?)
    }

    /// Catalog entry for an index reference, built from its metadata
    pub async fn resolve_reference(
        &self,
        reference: &HubPackReference,
    ) -> StickerResult<HubPackInfo> {
        let metadata = self.fetch_pack_metadata(&reference.source).await?;
        Ok(metadata.into_pack_info(reference, &self.github_release_template))
    }

    async fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T, HubError> {
        debug!(url = %url, "Requesting");

        let response = self
            .client
            .get(url)
            .timeout(self.request_timeout)
            .send()
            .await
            .map_err(|e| HubError::fetch_failed(format!("{}: {}", url, e)))?;

        if !response.status().is_success() {
            return Err(HubError::fetch_failed(format!(
                "{}: HTTP {}",
                url,
                response.status()
            )));
        }

        response
            .json()
            .await
            .map_err(|e| HubError::fetch_failed(format!("Invalid JSON from {}: {}", url, e)))
    }

    /// Stream an archive to `destination`.
    ///
    /// Bytes go to a sibling `*.part` file that is renamed into place once
    /// complete; on any failure the partial file is removed.
    pub async fn download_pack(&self, url: &str, destination: &Path) -> StickerResult<u64> {
        let part = part_path(destination);
        if let Some(parent) = destination.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| download_error(url, e))?;
        }

        let result = match self.stream_to(url, &part).await {
            Ok(written) => tokio::fs::rename(&part, destination)
                .await
                .map(|_| written)
                .map_err(|e| download_error(url, e)),
            Err(e) => Err(e),
        };

        match result {
            Ok(written) => {
                debug!(url = %url, bytes = written, path = %destination.display(), "Downloaded pack");
                Ok(written)
            }
            Err(e) => {
                let _ = tokio::fs::remove_file(&part).await; // Ignore cleanup errors
                Err(e.into())
            }
        }
    }

    /// No overall deadline: a large archive may take long, but the response
    /// headers and every chunk must each arrive within `request_timeout`.
    async fn stream_to(&self, url: &str, part: &Path) -> Result<u64, HubError> {
        let response = timeout(self.request_timeout, self.client.get(url).send())
            .await
            .map_err(|_| self.stalled(url))?
            .map_err(|e| download_error(url, e))?;

        if !response.status().is_success() {
            return Err(download_error(url, format!("HTTP {}", response.status())));
        }

        let mut file = tokio::fs::File::create(part)
            .await
            .map_err(|e| download_error(url, e))?;
        let mut stream = response.bytes_stream();
        let mut written: u64 = 0;

        while let Some(chunk) = timeout(self.request_timeout, stream.next())
            .await
            .map_err(|_| self.stalled(url))?
        {
            let chunk = chunk.map_err(|e| download_error(url, e))?;
            file.write_all(&chunk)
                .await
                .map_err(|e| download_error(url, e))?;
            written += chunk.len() as u64;
        }

        file.flush().await.map_err(|e| download_error(url, e))?;
        file.sync_all().await.map_err(|e| download_error(url, e))?;
        Ok(written)
    }

    fn stalled(&self, url: &str) -> HubError {
        download_error(
            url,
            format!("no data for {}s", self.request_timeout.as_secs_f32()),
        )
    }
}

#[async_trait]
impl HubProvider for HubClient {
    async fn fetch_packs(&self, force_refresh: bool) -> StickerResult<Vec<HubPackInfo>> {
        HubClient::fetch_packs(self, force_refresh).await
    }

    async fn fetch_pack_info(
        &self,
        name: &str,
        force_refresh: bool,
    ) -> StickerResult<HubPackInfo> {
        HubClient::fetch_pack_info(self, name, force_refresh).await
    }

    async fn download_pack(&self, url: &str, destination: &Path) -> StickerResult<u64> {
        HubClient::download_pack(self, url, destination).await
    }

    async fn fetch_hub_index(&self) -> StickerResult<Vec<HubPackReference>> {
        HubClient::fetch_hub_index(self).await
    }

    async fn resolve_reference(
        &self,
        reference: &HubPackReference,
    ) -> StickerResult<HubPackInfo> {
        HubClient::resolve_reference(self, reference).await
    }
}

fn part_path(destination: &Path) -> PathBuf {
    let mut name = destination
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_default();
    name.push(".part");
    destination.with_file_name(name)
}

fn download_error(url: &str, e: impl std::fmt::Display) -> HubError {
    HubError::download_failed(format!("{}: {}", url, e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn catalog_body() -> serde_json::Value {
        json!({
            "status": "success",
            "total": 2,
            "packs": [
                {
                    "name": "cats",
                    "display_name": "Cats",
                    "description": "Cat stickers",
                    "url": "http://example.invalid/cats.zip",
                    "version": "1.0.0",
                    "author": "alice",
                    "checksum": "abc123"
                },
                {
                    "name": "dogs",
                    "display_name": "Dogs",
                    "description": "",
                    "url": "http://example.invalid/dogs.zip"
                }
            ]
        })
    }

    async fn mount_catalog(server: &MockServer, expected_calls: u64) {
        Mock::given(method("GET"))
            .and(path("/packs"))
            .respond_with(ResponseTemplate::new(200).set_body_json(catalog_body()))
            .expect(expected_calls)
            .mount(server)
            .await;
    }

    #[tokio::test]
    async fn test_fetch_packs_parses_catalog() {
        let server = MockServer::start().await;
        mount_catalog(&server, 1).await;

        let client = HubClient::new(&format!("{}/", server.uri())).unwrap();
        let packs = client.fetch_packs(false).await.unwrap();

        assert_eq!(packs.len(), 2);
        assert_eq!(packs[0].name, "cats");
        assert_eq!(packs[0].checksum.as_deref(), Some("abc123"));
        assert_eq!(packs[1].version, "1.0.0");
        assert_eq!(packs[1].author, "Unknown");
    }

    #[tokio::test]
    async fn test_fetch_packs_cached_within_ttl() {
        let server = MockServer::start().await;
        mount_catalog(&server, 1).await;

        let client = HubClient::new(&server.uri()).unwrap();
        client.fetch_packs(false).await.unwrap();
        client.fetch_packs(false).await.unwrap();
        client.fetch_pack_info("dogs", false).await.unwrap();
    }

    #[tokio::test]
    async fn test_concurrent_fetches_share_one_request() {
        let server = MockServer::start().await;
        mount_catalog(&server, 1).await;

        let client = HubClient::new(&server.uri()).unwrap();
        let (a, b) = tokio::join!(client.fetch_packs(false), client.fetch_packs(false));
        assert_eq!(a.unwrap().len(), 2);
        assert_eq!(b.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_force_refresh_and_clear_cache_refetch() {
        let server = MockServer::start().await;
        mount_catalog(&server, 3).await;

        let client = HubClient::new(&server.uri()).unwrap();
        client.fetch_packs(false).await.unwrap();
        client.fetch_packs(true).await.unwrap();
        client.clear_cache().await;
        client.fetch_packs(false).await.unwrap();
    }

    #[tokio::test]
    async fn test_expired_cache_refetches() {
        let server = MockServer::start().await;
        mount_catalog(&server, 2).await;

        let client = HubClient::new(&server.uri())
            .unwrap()
            .with_cache_ttl(Duration::ZERO);
        client.fetch_packs(false).await.unwrap();
        client.fetch_packs(false).await.unwrap();
    }

    #[tokio::test]
    async fn test_fetch_packs_error_status_in_envelope() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/packs"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "status": "error",
                "packs": [],
                "error": "database offline"
            })))
            .mount(&server)
            .await;

        let client = HubClient::new(&server.uri()).unwrap();
        let err = client.fetch_packs(false).await.unwrap_err();
        assert_eq!(err.hub_kind(), Some(HubErrorKind::FetchFailed));
        assert!(err.to_string().contains("database offline"));
    }

    #[tokio::test]
    async fn test_fetch_packs_http_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/packs"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let client = HubClient::new(&server.uri()).unwrap();
        let err = client.fetch_packs(false).await.unwrap_err();
        assert_eq!(err.hub_kind(), Some(HubErrorKind::FetchFailed));
    }

    #[tokio::test]
    async fn test_fetch_packs_malformed_body() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/packs"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>"))
            .mount(&server)
            .await;

        let client = HubClient::new(&server.uri()).unwrap();
        let err = client.fetch_packs(false).await.unwrap_err();
        assert_eq!(err.hub_kind(), Some(HubErrorKind::FetchFailed));
    }

    #[tokio::test]
    async fn test_fetch_pack_info_not_found() {
        let server = MockServer::start().await;
        mount_catalog(&server, 1).await;

        let client = HubClient::new(&server.uri()).unwrap();
        let err = client.fetch_pack_info("birds", false).await.unwrap_err();
        assert_eq!(err.hub_kind(), Some(HubErrorKind::NotFound));
    }

    #[tokio::test]
    async fn test_download_pack_writes_file() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/files/cats.zip"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(vec![7u8; 4096]))
            .mount(&server)
            .await;

        let temp = TempDir::new().unwrap();
        let dest = temp.path().join("downloads").join("cats.zip");
        let client = HubClient::new(&server.uri()).unwrap();

        let written = client
            .download_pack(&format!("{}/files/cats.zip", server.uri()), &dest)
            .await
            .unwrap();

        assert_eq!(written, 4096);
        assert_eq!(std::fs::read(&dest).unwrap(), vec![7u8; 4096]);
        assert!(!part_path(&dest).exists());
    }

    #[tokio::test]
    async fn test_download_pack_http_error_leaves_nothing() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/files/missing.zip"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let temp = TempDir::new().unwrap();
        let dest = temp.path().join("missing.zip");
        let client = HubClient::new(&server.uri()).unwrap();

        let err = client
            .download_pack(&format!("{}/files/missing.zip", server.uri()), &dest)
            .await
            .unwrap_err();

        assert_eq!(err.hub_kind(), Some(HubErrorKind::DownloadFailed));
        assert!(!dest.exists());
        assert!(!part_path(&dest).exists());
    }

    #[tokio::test]
    async fn test_download_stalled_body_times_out() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/files/slow.zip"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_bytes(vec![1u8; 16])
                    .set_delay(Duration::from_secs(30)),
            )
            .mount(&server)
            .await;

        let temp = TempDir::new().unwrap();
        let dest = temp.path().join("slow.zip");
        let client = HubClient::with_timeout(&server.uri(), Duration::from_millis(200)).unwrap();

        let started = std::time::Instant::now();
        let err = client
            .download_pack(&format!("{}/files/slow.zip", server.uri()), &dest)
            .await
            .unwrap_err();

        assert_eq!(err.hub_kind(), Some(HubErrorKind::DownloadFailed));
        assert!(started.elapsed() < Duration::from_secs(10));
        assert!(!dest.exists());
        assert!(!part_path(&dest).exists());
    }

    #[tokio::test]
    async fn test_fetch_hub_index_and_resolve_reference() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/manifest.json"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "packs": [
                    {"slug": "cats", "source": {"type": "github", "owner": "octo", "repo": "stickers", "path": "packs/cats"}},
                    {"slug": "dogs", "source": {"owner": "octo", "repo": "stickers", "branch": "dev"}}
                ]
            })))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/raw/octo/stickers/main/packs/cats/metadata.json"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "display_name": "Cats",
                "version": "1.4.0",
                "author": "alice"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = HubClient::new(&server.uri()).unwrap().with_github_templates(
            &format!("{}/raw/{{owner}}/{{repo}}/{{ref}}/{{path}}", server.uri()),
            &format!("{}/releases/{{owner}}/{{repo}}/{{tag}}/{{filename}}", server.uri()),
        );

        let index = client.fetch_hub_index().await.unwrap();
        assert_eq!(index.len(), 2);
        assert_eq!(index[1].source.branch, "dev");

        let info = client.resolve_reference(&index[0]).await.unwrap();
        assert_eq!(info.name, "cats");
        assert_eq!(info.display_name, "Cats");
        assert_eq!(info.version, "1.4.0");
        assert_eq!(
            info.url,
            format!("{}/releases/octo/stickers/1.4.0/cats.zip", server.uri())
        );
    }

    #[tokio::test]
    async fn test_resolve_reference_missing_metadata() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let client = HubClient::new(&server.uri())
            .unwrap()
            .with_index_url(format!("{}/index.json", server.uri()))
            .with_github_templates(
                &format!("{}/{{owner}}/{{repo}}/{{ref}}/{{path}}", server.uri()),
                DEFAULT_GITHUB_RELEASE_TEMPLATE,
            );

        let err = client.fetch_hub_index().await.unwrap_err();
        assert_eq!(err.hub_kind(), Some(HubErrorKind::FetchFailed));

        let reference = HubPackReference {
            slug: "cats".to_string(),
            source: GitHubSource::default(),
        };
        let err = client.resolve_reference(&reference).await.unwrap_err();
        assert_eq!(err.hub_kind(), Some(HubErrorKind::FetchFailed));
    }

    #[tokio::test]
    async fn test_from_config_routes_through_proxy() {
        // The proxy receives absolute-form requests for the real hub host
        let proxy = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/packs"))
            .respond_with(ResponseTemplate::new(200).set_body_json(catalog_body()))
            .expect(1)
            .mount(&proxy)
            .await;

        let mut config = crate::di::mocks::MockConfigProvider::default();
        config.hub_url = "http://hub.invalid".to_string();
        config.proxy = Some(proxy.uri());

        let client = HubClient::from_config(&config).unwrap();
        let packs = client.fetch_packs(false).await.unwrap();
        assert_eq!(packs.len(), 2);
    }

    #[test]
    fn test_part_path() {
        assert_eq!(
            part_path(Path::new("/tmp/x/cats.zip")),
            PathBuf::from("/tmp/x/cats.zip.part")
        );
    }
}
