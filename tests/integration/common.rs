//! Common utilities for integration tests

use std::fs;
use std::io::{Cursor, Write};
use std::path::{Path, PathBuf};
use std::process::Command;
use std::sync::Arc;
use stickerpack::core::path::{packs_dir, MANIFEST_FILE, STICKERS_DIR};
use stickerpack::di::mocks::MockHubProvider;
use stickerpack::manager::PackLifecycleManager;
use stickerpack::package::{HubPackInfo, PackManifest, PackUpdater};
use tempfile::TempDir;
use zip::write::FileOptions;
use zip::ZipWriter;

pub fn stickerpack_command() -> Command {
    Command::new(env!("CARGO_BIN_EXE_stickerpack"))
}

/// Builds zip archives in memory.
#[derive(Default)]
pub struct ArchiveBuilder {
    files: Vec<(String, Vec<u8>)>,
}

impl ArchiveBuilder {
    /// `<name>/metadata.json` plus one png per sticker.
    pub fn pack(name: &str, version: &str, stickers: &[&str]) -> Self {
        let mut builder = Self::default().file(
            &format!("{}/{}", name, MANIFEST_FILE),
            &manifest_json(name, version),
        );
        for sticker in stickers {
            builder = builder.file(
                &format!("{}/{}/{}.png", name, STICKERS_DIR, sticker),
                sticker.as_bytes(),
            );
        }
        builder
    }

    pub fn file(mut self, name: &str, data: &[u8]) -> Self {
        self.files.push((name.to_string(), data.to_vec()));
        self
    }

    pub fn bytes(&self) -> Vec<u8> {
        let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
        for (name, data) in &self.files {
            zip.start_file(name.as_str(), FileOptions::default())
                .unwrap();
            zip.write_all(data).unwrap();
        }
        zip.finish().unwrap().into_inner()
    }

    pub fn write(&self, path: &Path) {
        fs::write(path, self.bytes()).unwrap();
    }
}

fn manifest_json(name: &str, version: &str) -> Vec<u8> {
    let mut manifest = PackManifest::new(name, format!("{} pack", name));
    manifest.version = version.to_string();
    manifest.to_json_pretty().unwrap().into_bytes()
}

/// An installed pack directory at `<packs>/<name>`.
pub fn write_pack_dir(packs: &Path, name: &str, version: &str) -> PathBuf {
    let dir = packs.join(name);
    fs::create_dir_all(dir.join(STICKERS_DIR)).unwrap();
    fs::write(dir.join(MANIFEST_FILE), manifest_json(name, version)).unwrap();
    dir
}

/// A manager rooted in a temp dir, talking to an in-memory hub.
pub struct TestEnv {
    pub temp: TempDir,
    pub hub: MockHubProvider,
    pub manager: Arc<PackLifecycleManager>,
}

impl TestEnv {
    pub fn new() -> Self {
        let temp = TempDir::new().unwrap();
        let hub = MockHubProvider::new();
        let manager = PackLifecycleManager::new(
            temp.path().join("base"),
            Arc::new(hub.clone()),
            PackUpdater::default(),
        )
        .unwrap();
        Self {
            temp,
            hub,
            manager: Arc::new(manager),
        }
    }

    pub fn packs(&self) -> PathBuf {
        packs_dir(self.manager.base_dir())
    }

    /// Serve `archive` as `name@version` on the mock hub.
    pub fn publish_archive(
        &self,
        name: &str,
        version: &str,
        archive: &ArchiveBuilder,
    ) -> HubPackInfo {
        let url = format!("mock://{}-{}.zip", name, version);
        self.hub.add_archive(url.clone(), archive.bytes());
        let info = HubPackInfo::new(name, version, url);
        self.hub.add_pack(info.clone());
        info
    }

    pub fn publish(&self, name: &str, version: &str, stickers: &[&str]) -> HubPackInfo {
        self.publish_archive(name, version, &ArchiveBuilder::pack(name, version, stickers))
    }
}
