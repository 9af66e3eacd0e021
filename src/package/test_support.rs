//! Fixtures shared by the package and manager unit tests.

use crate::core::path::{MANIFEST_FILE, STICKERS_DIR};
use crate::package::manifest::PackManifest;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};
use zip::write::FileOptions;
use zip::ZipWriter;

pub struct ZipEntry {
    pub name: String,
    pub data: Option<Vec<u8>>,
}

impl ZipEntry {
    pub fn file(name: &str, data: &[u8]) -> Self {
        Self {
            name: name.to_string(),
            data: Some(data.to_vec()),
        }
    }

    pub fn dir(name: &str) -> Self {
        Self {
            name: name.to_string(),
            data: None,
        }
    }
}

pub fn write_zip(path: &Path, entries: &[ZipEntry]) {
    let mut zip = ZipWriter::new(File::create(path).unwrap());
    let options = FileOptions::default();
    for entry in entries {
        match &entry.data {
            Some(data) => {
                zip.start_file(entry.name.as_str(), options).unwrap();
                zip.write_all(data).unwrap();
            }
            None => zip.add_directory(entry.name.as_str(), options).unwrap(),
        }
    }
    zip.finish().unwrap();
}

/// A zip holding `<name>/metadata.json` plus one png per sticker name.
pub fn pack_zip(path: &Path, name: &str, version: &str, stickers: &[&str]) {
    let mut manifest = PackManifest::new(name, format!("{} pack", name));
    manifest.version = version.to_string();

    let mut entries = vec![ZipEntry::file(
        &format!("{}/{}", name, MANIFEST_FILE),
        manifest.to_json_pretty().unwrap().as_bytes(),
    )];
    for sticker in stickers {
        entries.push(ZipEntry::file(
            &format!("{}/{}/{}.png", name, STICKERS_DIR, sticker),
            sticker.as_bytes(),
        ));
    }
    write_zip(path, &entries);
}

/// An installed pack directory at `<packs>/<name>`.
pub fn write_pack_dir(packs: &Path, name: &str, version: &str) -> PathBuf {
    let dir = packs.join(name);
    fs::create_dir_all(dir.join(STICKERS_DIR)).unwrap();
    let mut manifest = PackManifest::new(name, format!("{} pack", name));
    manifest.version = version.to_string();
    fs::write(dir.join(MANIFEST_FILE), manifest.to_json_pretty().unwrap()).unwrap();
    dir
}
