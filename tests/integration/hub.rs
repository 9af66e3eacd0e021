//! HubClient against a real HTTP server.

use super::common::ArchiveBuilder;
use serde_json::json;
use std::sync::Arc;
use std::time::{Duration, Instant};
use stickerpack::core::path::pack_dir;
use stickerpack::core::ManagerErrorKind;
use stickerpack::hub::HubClient;
use stickerpack::manager::PackLifecycleManager;
use stickerpack::package::checksum::{checksum_file, ChecksumAlgorithm};
use stickerpack::package::{HubPackInfo, PackUpdater};
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[tokio::test]
async fn test_catalog_fetches_coalesce_within_ttl() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/packs"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({ "status": "success", "packs": [{ "name": "cats" }] }))
                .set_delay(Duration::from_millis(50)),
        )
        .expect(2)
        .mount(&server)
        .await;

    let client = HubClient::new(&server.uri())
        .unwrap()
        .with_cache_ttl(Duration::from_secs(60));

    let (a, b) = tokio::join!(client.fetch_packs(false), client.fetch_packs(false));
    assert_eq!(a.unwrap(), b.unwrap());
    client.fetch_packs(false).await.unwrap();

    // Bypasses the cache
    let packs = client.fetch_packs(true).await.unwrap();
    assert_eq!(packs[0].name, "cats");
}

#[tokio::test]
async fn test_install_over_http() {
    let temp = TempDir::new().unwrap();
    let archive = temp.path().join("cats.zip");
    ArchiveBuilder::pack("cats", "1.2.0", &["grin", "wink"]).write(&archive);
    let checksum = checksum_file(&archive, ChecksumAlgorithm::Sha256).unwrap();

    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/packs"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": "success",
            "total": 1,
            "packs": [{
                "name": "cats",
                "display_name": "Cats",
                "version": "1.2.0",
                "url": format!("{}/files/cats.zip", server.uri()),
                "checksum": checksum,
            }]
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/files/cats.zip"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(std::fs::read(&archive).unwrap()))
        .expect(1)
        .mount(&server)
        .await;

    let base = temp.path().join("base");
    let hub = Arc::new(HubClient::new(&server.uri()).unwrap());
    let manager = PackLifecycleManager::new(&base, hub, PackUpdater::default()).unwrap();

    let info = manager
        .fetch_hub_packs(false)
        .await
        .unwrap()
        .into_iter()
        .next()
        .unwrap();
    let manifest = manager.install_pack(&info).await.unwrap();

    assert_eq!(manifest.version, "1.2.0");
    assert_eq!(manifest.checksum.as_deref(), Some(checksum.as_str()));
    assert_eq!(manifest.stickers.len(), 2);
    assert!(pack_dir(&base, "cats").join("stickers/grin.png").is_file());
}

#[tokio::test]
async fn test_shutdown_ends_install_stuck_on_slow_hub() {
    let temp = TempDir::new().unwrap();
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/files/cats.zip"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_bytes(vec![0u8; 64])
                .set_delay(Duration::from_secs(20)),
        )
        .mount(&server)
        .await;

    let hub = Arc::new(HubClient::new(&server.uri()).unwrap());
    let manager = Arc::new(
        PackLifecycleManager::new(temp.path().join("base"), hub, PackUpdater::default()).unwrap(),
    );
    let info = HubPackInfo::new("cats", "1.0.0", format!("{}/files/cats.zip", server.uri()));

    let installing = Arc::clone(&manager);
    let install = tokio::spawn(async move { installing.install_pack(&info).await });
    tokio::time::sleep(Duration::from_millis(200)).await;

    let started = Instant::now();
    manager.shutdown().await;
    let err = tokio::time::timeout(Duration::from_secs(5), install)
        .await
        .expect("install outlived shutdown")
        .unwrap()
        .unwrap_err();

    assert_eq!(err.manager_kind(), Some(ManagerErrorKind::Cancelled));
    assert!(started.elapsed() < Duration::from_secs(5));
    assert!(!pack_dir(manager.base_dir(), "cats").exists());
}

#[tokio::test]
async fn test_install_from_github_index() {
    let temp = TempDir::new().unwrap();
    let archive = temp.path().join("cats.zip");
    ArchiveBuilder::pack("cats", "0.3.0", &["grin"]).write(&archive);

    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/manifest.json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "slug": "cats", "source": { "owner": "octo", "repo": "stickers", "path": "cats" } }
        ])))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/raw/octo/stickers/main/cats/metadata.json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "display_name": "Cats",
            "version": "0.3.0"
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/releases/octo/stickers/0.3.0/cats.zip"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(std::fs::read(&archive).unwrap()))
        .expect(1)
        .mount(&server)
        .await;

    let hub = HubClient::new(&server.uri()).unwrap().with_github_templates(
        &format!("{}/raw/{{owner}}/{{repo}}/{{ref}}/{{path}}", server.uri()),
        &format!("{}/releases/{{owner}}/{{repo}}/{{tag}}/{{filename}}", server.uri()),
    );
    let base = temp.path().join("base");
    let manager = PackLifecycleManager::new(&base, Arc::new(hub), PackUpdater::default()).unwrap();

    let manifest = manager.install_from_hub("cats").await.unwrap();

    assert_eq!(manifest.version, "0.3.0");
    assert!(pack_dir(&base, "cats").join("stickers/grin.png").is_file());
}
