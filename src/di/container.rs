//! Service container for dependency injection

use super::traits::{ConfigProvider, HubProvider};
use crate::config::Config;
use crate::core::{StickerError, StickerResult};
use crate::hub::HubClient;
use crate::manager::PackLifecycleManager;
use crate::package::checksum::ChecksumAlgorithm;
use crate::package::updater::PackUpdater;
use std::sync::Arc;

/// Service container for dependency injection
///
/// Holds the configuration and hub client behind trait objects so tests
/// can swap in mocks, and builds the lifecycle manager from them.
#[derive(Clone)]
pub struct ServiceContainer {
    pub config: Arc<dyn ConfigProvider>,
    pub hub: Arc<dyn HubProvider>,
}

impl ServiceContainer {
    /// Create a new service container with production implementations
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Config file cannot be loaded or created
    /// - The HTTP client cannot be built
    pub fn new() -> StickerResult<Self> {
        let config = Config::load()?;
        Self::from_config(config)
    }

    /// Production services for an already loaded config
    pub fn from_config(config: Config) -> StickerResult<Self> {
        let hub = HubClient::from_config(&config)?;
        Ok(Self {
            config: Arc::new(config),
            hub: Arc::new(hub),
        })
    }

    /// Create a service container with custom provider implementations
    pub fn with_providers(config: Arc<dyn ConfigProvider>, hub: Arc<dyn HubProvider>) -> Self {
        Self { config, hub }
    }

    /// Get the configuration provider
    pub fn config(&self) -> &dyn ConfigProvider {
        self.config.as_ref()
    }

    /// Get the hub provider
    pub fn hub(&self) -> &dyn HubProvider {
        self.hub.as_ref()
    }

    /// Updater using the configured checksum algorithm
    pub fn updater(&self) -> StickerResult<PackUpdater> {
        let name = self.config.checksum_algorithm();
        let algorithm = ChecksumAlgorithm::from_name(name).ok_or_else(|| {
            StickerError::Config(format!("Unknown checksum algorithm '{}'", name))
        })?;
        Ok(PackUpdater::new(algorithm))
    }

    /// Lifecycle manager over the configured base directory
    pub fn manager(&self) -> StickerResult<PackLifecycleManager> {
        PackLifecycleManager::new(self.config.base_dir()?, self.hub.clone(), self.updater()?)
    }
}
