//! Dependency injection infrastructure for stickerpack
//!
//! This module provides trait-based dependency injection so the lifecycle
//! manager can run against an in-memory hub in tests.
//!
//! # Example (Production)
//! ```no_run
//! use stickerpack::di::ServiceContainer;
//!
//! # fn example() -> stickerpack::core::StickerResult<()> {
//! let container = ServiceContainer::new()?;
//! let manager = container.manager()?;
//! # Ok(())
//! # }
//! ```
//!
//! # Example (Testing)
//! ```
//! use stickerpack::di::{ServiceContainer, mocks::*};
//! use std::sync::Arc;
//!
//! # fn example() {
//! let config = Arc::new(MockConfigProvider::default());
//! let hub = Arc::new(MockHubProvider::new());
//!
//! let container = ServiceContainer::with_providers(config, hub);
//! # }
//! ```

pub mod container;
pub mod mocks;
pub mod traits;

// Re-export key types
pub use container::ServiceContainer;
pub use traits::{ConfigProvider, HubProvider};
