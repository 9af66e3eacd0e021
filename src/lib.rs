//! stickerpack: sticker pack lifecycle manager
//!
//! Discovers packs on disk, lists the hub catalog, and installs, updates
//! and removes packs with checksum-verified atomic swaps while readers
//! keep seeing a consistent view. Value types and errors come from
//! `stickerpack-core`.

pub use stickerpack_core::package::manifest::PackManifest;
pub use stickerpack_core::{StickerError, StickerResult};

/// Core module re-exported from stickerpack-core.
pub mod core {
    pub use stickerpack_core::core::*;
    pub use stickerpack_core::*;

    /// Path module re-exported from stickerpack-core.
    pub mod path {
        pub use stickerpack_core::core::path::*;
    }
}

/// Configuration management.
pub mod config;

/// Hub catalog caching.
pub mod cache;

/// Pack directories, archives and the install/remove swap.
pub mod package;

/// Hub HTTP client.
pub mod hub;

/// Pack lifecycle orchestration.
pub mod manager;

/// Dependency injection infrastructure.
pub mod di;
