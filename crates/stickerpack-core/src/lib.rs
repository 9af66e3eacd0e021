//! Core types for stickerpack: pack manifest, user config and hub catalog
//! models, on-disk layout helpers, and the error taxonomy shared by the
//! lifecycle manager.

pub mod core;
pub mod package;

pub use crate::core::{
    HubError, HubErrorKind, ManagerError, ManagerErrorKind, PackError, PackErrorKind,
    StickerError, StickerResult, UpdateError, UpdateErrorKind,
};
