pub mod checksum;
pub mod extractor;
pub mod pack;
pub mod rollback;
pub mod updater;

// Value types live in stickerpack-core, re-exported here
pub mod config {
    pub use stickerpack_core::package::config::*;
}
pub mod hub {
    pub use stickerpack_core::package::hub::*;
}
pub mod manifest {
    pub use stickerpack_core::package::manifest::*;
}

#[cfg(test)]
pub(crate) mod test_support;

pub use checksum::ChecksumAlgorithm;
pub use config::{GridSettings, PackConfig, PackConfigStore, Shortcut};
pub use extractor::PackageExtractor;
pub use hub::{
    GitHubSource, HubCatalog, HubIndex, HubPackInfo, HubPackReference, RemotePackMetadata,
};
pub use manifest::{FileSource, PackManifest, StickerInfo};
pub use pack::Pack;
pub use rollback::{with_rollback, DirBackup};
pub use updater::PackUpdater;
