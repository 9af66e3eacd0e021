pub mod config;
pub mod hub;
pub mod manifest;

pub use config::{GridSettings, PackConfig, PackConfigStore, Shortcut};
pub use hub::{
    GitHubSource, HubCatalog, HubIndex, HubPackInfo, HubPackReference, RemotePackMetadata,
};
pub use manifest::{FileSource, PackManifest, StickerInfo};
