//! Archive handling and the install swap, driven directly.

use super::common::{write_pack_dir, ArchiveBuilder};
use std::fs;
use stickerpack::core::{ManagerError, UpdateErrorKind};
use stickerpack::package::{HubPackInfo, Pack, PackUpdater};
use tempfile::TempDir;

fn names(dir: &std::path::Path) -> Vec<String> {
    let mut names: Vec<_> = fs::read_dir(dir)
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    names
}

#[test]
fn test_failure_before_commit_keeps_previous_pack() {
    let temp = TempDir::new().unwrap();
    let packs = temp.path().join("packs");
    let live = write_pack_dir(&packs, "cats", "1.0.0");

    let archive = temp.path().join("cats.zip");
    ArchiveBuilder::pack("cats", "2.0.0", &["grin"]).write(&archive);
    let updater = PackUpdater::default();
    let staged = updater
        .extract_pack(&archive, &temp.path().join("staging"))
        .unwrap();
    let info = HubPackInfo::new("cats", "2.0.0", "mock://cats.zip");
    updater.stage_manifest(&staged, &info, None, None).unwrap();

    let err = updater
        .install_pack(&staged, &live, || Err(ManagerError::cancelled("cats").into()))
        .unwrap_err();

    assert!(err.manager_kind().is_some());
    let manifest = Pack::new(&live).load().unwrap();
    assert_eq!(manifest.version, "1.0.0");
    assert_eq!(names(&packs), vec!["cats"]);
    assert!(staged.exists());
}

#[test]
fn test_successful_swap_replaces_pack() {
    let temp = TempDir::new().unwrap();
    let packs = temp.path().join("packs");
    let live = write_pack_dir(&packs, "cats", "1.0.0");

    let archive = temp.path().join("cats.zip");
    ArchiveBuilder::pack("cats", "2.0.0", &["grin", "wink"]).write(&archive);
    let updater = PackUpdater::default();
    let checksum = updater.checksum(&archive).unwrap();
    updater.verify_checksum(&archive, &checksum).unwrap();
    let staged = updater
        .extract_pack(&archive, &temp.path().join("staging"))
        .unwrap();
    let info = HubPackInfo::new("cats", "2.0.0", "mock://cats.zip");
    updater
        .stage_manifest(&staged, &info, Some(&checksum), None)
        .unwrap();

    updater.install_pack(&staged, &live, || Ok(())).unwrap();

    let manifest = Pack::new(&live).load().unwrap();
    assert_eq!(manifest.version, "2.0.0");
    assert_eq!(manifest.checksum.as_deref(), Some(checksum.as_str()));
    assert_eq!(manifest.stickers.len(), 2);
    assert_eq!(names(&packs), vec!["cats"]);
}

#[test]
fn test_path_traversal_rejects_whole_archive() {
    let temp = TempDir::new().unwrap();
    let archive = temp.path().join("evil.zip");
    ArchiveBuilder::pack("cats", "1.0.0", &["grin"])
        .file("cats/../../outside.txt", b"gotcha")
        .write(&archive);
    let staging = temp.path().join("staging");

    let err = PackUpdater::default()
        .extract_pack(&archive, &staging)
        .unwrap_err();

    assert_eq!(err.update_kind(), Some(UpdateErrorKind::UnsafeArchive));
    assert!(!temp.path().join("outside.txt").exists());
    assert!(!staging.join("cats").exists());
}

#[test]
fn test_corrupted_archive_fails_checksum() {
    let temp = TempDir::new().unwrap();
    let archive = temp.path().join("cats.zip");
    ArchiveBuilder::pack("cats", "1.0.0", &["grin"]).write(&archive);
    let updater = PackUpdater::default();
    let checksum = updater.checksum(&archive).unwrap();

    let mut bytes = fs::read(&archive).unwrap();
    bytes[0] ^= 0xff;
    fs::write(&archive, bytes).unwrap();

    let err = updater.verify_checksum(&archive, &checksum).unwrap_err();
    assert_eq!(err.update_kind(), Some(UpdateErrorKind::ChecksumMismatch));
}
