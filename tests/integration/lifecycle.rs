//! Manager behaviour over the public API with an in-memory hub.

use super::common::{write_pack_dir, ArchiveBuilder, TestEnv};
use std::fs;
use std::time::Duration;
use stickerpack::core::path::MANIFEST_FILE;
use stickerpack::core::{ManagerErrorKind, UpdateErrorKind};
use stickerpack::manager::{PackState, UpdateOutcome};

#[tokio::test]
async fn test_checksum_mismatch_leaves_no_pack_dir() {
    let env = TestEnv::new();
    let info = env
        .publish("cats", "1.0.0", &["grin"])
        .with_checksum(format!("sha256:{}", "0".repeat(64)));
    env.hub.add_pack(info.clone());

    let err = env.manager.install_pack(&info).await.unwrap_err();

    assert_eq!(err.update_kind(), Some(UpdateErrorKind::ChecksumMismatch));
    assert!(!env.packs().join("cats").exists());
    assert_eq!(env.manager.pack_state("cats"), Some(PackState::Error));
    assert!(env.manager.get_manifest("cats").is_none());
}

#[tokio::test]
async fn test_concurrent_updates_one_wins() {
    let env = TestEnv::new();
    write_pack_dir(&env.packs(), "cats", "1.0.0");
    env.manager.reload().await.unwrap();
    env.publish("cats", "2.0.0", &["grin"]);
    env.hub.set_download_delay(Duration::from_millis(200));

    let (first, second) = tokio::join!(
        env.manager.update_pack("cats", false),
        env.manager.update_pack("cats", false)
    );

    let (ok, rejected) = match (first, second) {
        (Ok(outcome), Err(e)) | (Err(e), Ok(outcome)) => (outcome, e),
        other => panic!("expected exactly one success, got {:?}", other),
    };
    assert_eq!(
        ok,
        UpdateOutcome::Updated {
            from: "1.0.0".to_string(),
            to: "2.0.0".to_string()
        }
    );
    assert_eq!(
        rejected.manager_kind(),
        Some(ManagerErrorKind::OperationInProgress)
    );
    assert_eq!(env.hub.download_calls(), 1);
    assert!(!env.manager.is_busy("cats"));
}

#[tokio::test]
async fn test_reload_with_one_malformed_pack() {
    let env = TestEnv::new();
    write_pack_dir(&env.packs(), "cats", "1.0.0");
    let broken = env.packs().join("dogs");
    fs::create_dir_all(&broken).unwrap();
    fs::write(broken.join(MANIFEST_FILE), r#"{"name": "dogs""#).unwrap();

    let report = env.manager.reload().await.unwrap();

    assert_eq!(report.loaded, vec!["cats"]);
    assert_eq!(report.failed.len(), 1);
    assert_eq!(env.manager.pack_state("cats"), Some(PackState::Loaded));
    assert_eq!(env.manager.pack_state("dogs"), Some(PackState::Error));
}

#[tokio::test]
async fn test_install_next_to_existing_pack() {
    let env = TestEnv::new();
    write_pack_dir(&env.packs(), "a", "1.0");
    env.publish("a", "1.0", &[]);
    env.publish("b", "2.0", &["wave", "nod"]);

    env.manager.reload().await.unwrap();
    let catalog = env.manager.fetch_hub_packs(false).await.unwrap();
    let b = catalog.iter().find(|p| p.name == "b").unwrap();
    let installed = env.manager.install_pack(b).await.unwrap();

    assert_eq!(installed.version, "2.0");
    assert_eq!(installed.stickers.len(), 2);
    assert_eq!(env.manager.list_packs(), vec!["a", "b"]);

    let outcome = env.manager.update_pack("a", false).await.unwrap();
    assert_eq!(
        outcome,
        UpdateOutcome::UpToDate {
            version: "1.0".to_string()
        }
    );
    assert_eq!(env.manager.pack_state("a"), Some(PackState::Updated));
    assert_eq!(env.hub.download_calls(), 1);
}

#[tokio::test]
async fn test_unsafe_archive_is_never_installed() {
    let env = TestEnv::new();
    let archive = ArchiveBuilder::pack("cats", "1.0.0", &["grin"]).file("../escape.txt", b"x");
    let info = env.publish_archive("cats", "1.0.0", &archive);

    let err = env.manager.install_pack(&info).await.unwrap_err();

    assert_eq!(err.update_kind(), Some(UpdateErrorKind::UnsafeArchive));
    assert!(!env.packs().join("cats").exists());
    assert!(!env.packs().join("escape.txt").exists());
}

#[tokio::test]
async fn test_delete_then_reinstall() {
    let env = TestEnv::new();
    let info = env.publish("cats", "1.0.0", &["grin"]);
    env.manager.install_pack(&info).await.unwrap();
    env.manager.set_pack_enabled("cats", false).unwrap();

    env.manager.delete_pack("cats").await.unwrap();
    assert!(!env.packs().join("cats").exists());
    assert!(env.manager.list_packs().is_empty());
    assert!(env.manager.get_config("cats").is_none());

    env.manager.install_pack(&info).await.unwrap();
    assert!(env.manager.is_enabled("cats"));
    assert_eq!(env.manager.pack_state("cats"), Some(PackState::Installed));
}
