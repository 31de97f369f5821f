//! Rescanning a routes directory while serving.

use std::fs;
use std::time::Duration;

use http::StatusCode;
use tempfile::TempDir;
use waypost::discovery::{Reloader, RouterHandle};
use waypost::middleware::{GENERATION_HEADER, GenerationHeaderMiddleware};
use waypost::prelude::*;
use waypost::testing::TestClient;

fn manifest() -> Manifest {
    Manifest::new()
        .with("index.rs", || Router::new().get("/", |_, _, _| async { "home" }))
        .with("health.rs", || Router::new().get("/", |_, _, _| async { "ok" }))
}

#[tokio::test]
async fn test_rescan_publishes_new_routes() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("index.rs"), "").unwrap();

    let app = Waypost::new()
        .middleware(GenerationHeaderMiddleware::new())
        .discover(Discovery::new(dir.path()), manifest())
        .unwrap();
    let client = TestClient::new(app).await;

    assert_eq!(
        client.get("/health").send().await.status(),
        StatusCode::NOT_FOUND
    );

    fs::write(dir.path().join("health.rs"), "").unwrap();
    let generation = client.reloader().unwrap().rescan().unwrap();
    assert_eq!(generation, 1);

    let response = client.get("/health").send().await;
    assert_eq!(response.text(), "ok");
    assert_eq!(response.header(GENERATION_HEADER), Some("1"));
}

#[tokio::test]
async fn test_failed_rescan_keeps_serving_previous_generation() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("index.rs"), "").unwrap();

    let app = Waypost::new()
        .discover(Discovery::new(dir.path()), manifest())
        .unwrap();
    let client = TestClient::new(app).await;

    fs::write(dir.path().join("unregistered.rs"), "").unwrap();

    let err = client.reloader().unwrap().rescan().unwrap_err();
    assert!(matches!(err, DiscoveryError::Load(_)));
    assert_eq!(client.handle().load().id(), 0);
    assert_eq!(client.get("/").send().await.text(), "home");
}

#[tokio::test]
async fn test_hand_registered_routes_survive_rescan() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("index.rs"), "").unwrap();

    let app = Waypost::new()
        .router(Router::new().get("/version", |_, _, _| async { "1.0" }))
        .discover(Discovery::new(dir.path()), manifest())
        .unwrap();
    let client = TestClient::new(app).await;

    client.reloader().unwrap().rescan().unwrap();

    assert_eq!(client.get("/version").send().await.text(), "1.0");
    assert_eq!(client.get("/").send().await.text(), "home");
}

#[tokio::test]
async fn test_watcher_rescans_on_change() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("index.rs"), "").unwrap();

    let base = Router::new();
    let handle = RouterHandle::new(base.clone());
    let reloader = Reloader::new(
        Discovery::new(dir.path()),
        std::sync::Arc::new(manifest()),
        base,
        handle.clone(),
    );
    let _watcher = reloader.watch(Duration::from_millis(50)).unwrap();

    fs::write(dir.path().join("health.rs"), "").unwrap();

    let mut published = false;
    for _ in 0..100 {
        tokio::time::sleep(Duration::from_millis(50)).await;
        if handle.load().id() > 0 {
            published = true;
            break;
        }
    }

    assert!(published, "no generation was published after the change");
    let patterns: Vec<String> = handle
        .load()
        .router()
        .routes()
        .into_iter()
        .map(|(_, pattern)| pattern)
        .collect();
    assert!(patterns.contains(&"/health".to_string()));
}
