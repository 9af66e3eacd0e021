use crate::core::path::{config_file, default_base_dir, ensure_dir};
use crate::core::{StickerError, StickerResult};
use crate::di::ConfigProvider;
use crate::package::hub::{DEFAULT_GITHUB_RAW_TEMPLATE, DEFAULT_GITHUB_RELEASE_TEMPLATE};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Config {
    /// Base URL of the sticker hub (the catalog lives at `<hub_url>/packs`)
    #[serde(default = "default_hub_url")]
    pub hub_url: String,

    /// URL of the GitHub-backed hub index; `<hub_url>/manifest.json` when unset
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hub_index_url: Option<String>,

    /// HTTP(S) proxy used for every hub request
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub proxy: Option<String>,

    /// Raw file URL template with `{owner}`, `{repo}`, `{ref}` and `{path}`
    #[serde(default = "default_github_raw_template")]
    pub github_raw_template: String,

    /// Release asset URL template with `{owner}`, `{repo}`, `{tag}` and `{filename}`
    #[serde(default = "default_github_release_template")]
    pub github_release_template: String,

    /// Directory holding `packs/`, `config.json` and the `.tmp` staging area
    ///
    /// Default locations:
    /// - Linux: ~/.local/share/stickerpack
    /// - macOS: ~/Library/Application Support/stickerpack/data
    /// - Windows: %APPDATA%\stickerpack\data
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_dir: Option<String>,

    /// Timeout for a single hub request, in seconds
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    /// How long a fetched catalog is reused, in seconds
    #[serde(default = "default_cache_ttl_secs")]
    pub cache_ttl_secs: u64,

    /// Run the background update loop
    #[serde(default)]
    pub auto_update: bool,

    /// Reinstall packs on every background pass even when up to date
    #[serde(default)]
    pub force_update: bool,

    /// Seconds between background update passes
    #[serde(default = "default_update_interval_secs")]
    pub update_interval_secs: u64,

    /// Checksum algorithm recorded when the hub publishes none
    /// - "sha256": SHA-256 (default, what the hub publishes)
    /// - "blake3": BLAKE3
    #[serde(default = "default_checksum_algorithm")]
    pub checksum_algorithm: String,
}

fn default_hub_url() -> String {
    "http://localhost:8888".to_string()
}

fn default_github_raw_template() -> String {
    DEFAULT_GITHUB_RAW_TEMPLATE.to_string()
}

fn default_github_release_template() -> String {
    DEFAULT_GITHUB_RELEASE_TEMPLATE.to_string()
}

fn default_request_timeout_secs() -> u64 {
    30
}

fn default_cache_ttl_secs() -> u64 {
    3600
}

fn default_update_interval_secs() -> u64 {
    3600
}

fn default_checksum_algorithm() -> String {
    "sha256".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            hub_url: default_hub_url(),
            hub_index_url: None,
            proxy: None,
            github_raw_template: default_github_raw_template(),
            github_release_template: default_github_release_template(),
            base_dir: None,
            request_timeout_secs: default_request_timeout_secs(),
            cache_ttl_secs: default_cache_ttl_secs(),
            auto_update: false,
            force_update: false,
            update_interval_secs: default_update_interval_secs(),
            checksum_algorithm: default_checksum_algorithm(),
        }
    }
}

impl Config {
    /// Load config from the platform config directory, creating the default
    /// if it doesn't exist
    ///
    /// Config locations:
    /// - Windows: %APPDATA%\stickerpack\config.yaml
    /// - Linux: ~/.config/stickerpack/config.yaml
    /// - macOS: ~/Library/Application Support/stickerpack/config.yaml
    pub fn load() -> StickerResult<Self> {
        Self::load_from(&config_file()?)
    }

    /// Save config to the platform config directory
    pub fn save(&self) -> StickerResult<()> {
        self.save_to(&config_file()?)
    }

    /// Load from an explicit path, writing defaults there when missing.
    pub fn load_from(path: &Path) -> StickerResult<Self> {
        if !path.exists() {
            let config = Self::default();
            config.save_to(path)?;
            return Ok(config);
        }

        let content = fs::read_to_string(path)?;
        let config: Config = serde_yaml::from_str(&content)
            .map_err(|e| StickerError::Config(format!("Failed to parse config: {}", e)))?;
        config.validate()?;

        Ok(config)
    }

    pub fn save_to(&self, path: &Path) -> StickerResult<()> {
        let config_dir = path
            .parent()
            .ok_or_else(|| StickerError::Path("Invalid config path".to_string()))?;
        ensure_dir(config_dir)?;

        let content = serde_yaml::to_string(self)
            .map_err(|e| StickerError::Config(format!("Failed to serialize config: {}", e)))?;

        fs::write(path, content)?;
        Ok(())
    }

    fn validate(&self) -> StickerResult<()> {
        if crate::package::checksum::ChecksumAlgorithm::from_name(&self.checksum_algorithm)
            .is_none()
        {
            return Err(StickerError::Config(format!(
                "Unknown checksum algorithm '{}' (expected sha256 or blake3)",
                self.checksum_algorithm
            )));
        }
        if let Some(proxy) = &self.proxy {
            if reqwest::Proxy::all(proxy.as_str()).is_err() {
                return Err(StickerError::Config(format!("Invalid proxy URL '{}'", proxy)));
            }
        }
        if self.update_interval_secs == 0 {
            return Err(StickerError::Config(
                "update_interval_secs must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }

    /// Get the base directory path
    pub fn get_base_dir(&self) -> StickerResult<PathBuf> {
        match self.base_dir {
            Some(ref dir) => Ok(PathBuf::from(dir)),
            None => default_base_dir(),
        }
    }
}

impl ConfigProvider for Config {
    fn hub_url(&self) -> &str {
        &self.hub_url
    }

    fn hub_index_url(&self) -> String {
        match &self.hub_index_url {
            Some(url) => url.clone(),
            None => format!("{}/manifest.json", self.hub_url.trim_end_matches('/')),
        }
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
        self.get_base_dir()
    }

    fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_secs)
    }

    fn auto_update(&self) -> bool {
        self.auto_update
    }

    fn force_update(&self) -> bool {
        self.force_update
    }

    fn update_interval(&self) -> Duration {
        Duration::from_secs(self.update_interval_secs)
    }

    fn checksum_algorithm(&self) -> &str {
        &self.checksum_algorithm
    }
}
