//! End-to-end tests driving the HTTP API against a live server.

use std::sync::Arc;

use thingd::api::{ErrorResponse, ThingResponse, ThingsResponse};
use thingd::storage::{MemoryBackend, StorageBackend};

/// Spawn the server on an ephemeral port and return its base URL.
async fn spawn_server() -> String {
    spawn_server_with(Arc::new(MemoryBackend::new())).await
}

async fn spawn_server_with(store: Arc<dyn StorageBackend>) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        thingd::api::serve(listener, store, std::future::pending())
            .await
            .unwrap();
    });

    format!("http://{addr}")
}

#[tokio::test]
async fn test_thing_lifecycle() {
    let base = spawn_server().await;
    let client = reqwest::Client::new();

    // Create
    let resp = client
        .post(format!("{base}/thing/new"))
        .json(&serde_json::json!({"name": "name", "value": "value"}))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    let created: ThingResponse = resp.json().await.unwrap();
    assert_eq!(created.name, "name");
    assert_eq!(created.value, "value");
    assert_eq!(created.created, created.updated);

    // Get
    let resp = client
        .get(format!("{base}/thing/{}", created.uuid))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    let fetched: ThingResponse = resp.json().await.unwrap();
    assert_eq!(fetched.uuid, created.uuid);
    assert_eq!(fetched.name, "name");
    assert_eq!(fetched.value, "value");

    // List
    let resp = client
        .get(format!("{base}/thing?page=1&limit=10"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    let listed: ThingsResponse = resp.json().await.unwrap();
    assert_eq!(listed.total, 1);
    assert_eq!(listed.page, 1);
    assert_eq!(listed.limit, 10);
    assert_eq!(listed.things.len(), 1);

    // Update
    let resp = client
        .put(format!("{base}/thing/{}", created.uuid))
        .json(&serde_json::json!({"value": "updated"}))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    let updated: ThingResponse = resp.json().await.unwrap();
    assert_eq!(updated.value, "updated");
    assert_eq!(updated.name, "name");
    assert!(updated.updated >= updated.created);

    // Delete, then the thing is gone
    let resp = client
        .delete(format!("{base}/thing/{}", created.uuid))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);

    let resp = client
        .get(format!("{base}/thing/{}", created.uuid))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 404);
    let err: ErrorResponse = resp.json().await.unwrap();
    assert!(err.error.contains("not found"));
}

#[tokio::test]
async fn test_update_missing_thing_is_404_without_side_effects() {
    let base = spawn_server().await;
    let client = reqwest::Client::new();

    let resp = client
        .put(format!("{base}/thing/does-not-exist"))
        .json(&serde_json::json!({"value": "x"}))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 404);

    let listed: ThingsResponse = client
        .get(format!("{base}/thing"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(listed.total, 0);
}

#[tokio::test]
async fn test_delete_is_idempotent_over_http() {
    let base = spawn_server().await;
    let client = reqwest::Client::new();

    let created: ThingResponse = client
        .post(format!("{base}/thing/new"))
        .json(&serde_json::json!({"name": "n", "value": "v"}))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    for _ in 0..2 {
        let resp = client
            .delete(format!("{base}/thing/{}", created.uuid))
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status(), 200);
    }
}

#[tokio::test]
async fn test_create_validation() {
    let base = spawn_server().await;
    let client = reqwest::Client::new();

    // Empty name
    let resp = client
        .post(format!("{base}/thing/new"))
        .json(&serde_json::json!({"name": "", "value": "v"}))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 400);
    let err: ErrorResponse = resp.json().await.unwrap();
    assert!(err.error.contains("name"));

    // Empty value
    let resp = client
        .post(format!("{base}/thing/new"))
        .json(&serde_json::json!({"name": "n", "value": ""}))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 400);

    // Missing field is rejected before the handler runs
    let resp = client
        .post(format!("{base}/thing/new"))
        .json(&serde_json::json!({"name": "n"}))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 422);
}

#[tokio::test]
async fn test_handler_panic_becomes_500() {
    use async_trait::async_trait;
    use thingd::storage::{StorageResult, Thing};

    /// A backend whose reads panic, standing in for a bug below the contract.
    struct PanickingBackend;

    #[async_trait]
    impl StorageBackend for PanickingBackend {
        async fn get_thing(&self, _id: &str) -> StorageResult<Thing> {
            panic!("backend bug");
        }
        async fn create_thing(&self, _name: &str, _value: &str) -> StorageResult<Thing> {
            panic!("backend bug");
        }
        async fn update_thing(&self, _id: &str, _value: &str) -> StorageResult<Thing> {
            panic!("backend bug");
        }
        async fn delete_thing(&self, _id: &str) -> StorageResult<()> {
            panic!("backend bug");
        }
        async fn list_things(
            &self,
            _offset: usize,
            _limit: usize,
        ) -> StorageResult<(Vec<Thing>, usize)> {
            panic!("backend bug");
        }
    }

    let base = spawn_server_with(Arc::new(PanickingBackend)).await;
    let client = reqwest::Client::new();

    // The connection survives and the client sees a 500, not a reset.
    let resp = client
        .get(format!("{base}/thing/some-id"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 500);

    // The server is still serving after the panic.
    let resp = client
        .get(format!("{base}/thing/another-id"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 500);
}

#[tokio::test]
async fn test_huge_page_param_is_served() {
    let base = spawn_server().await;
    let client = reqwest::Client::new();

    client
        .post(format!("{base}/thing/new"))
        .json(&serde_json::json!({"name": "n", "value": "v"}))
        .send()
        .await
        .unwrap();

    // u64::MAX as page: far past the end, but never a panic or a wrap.
    let resp = client
        .get(format!(
            "{base}/thing?page=18446744073709551615&limit=100"
        ))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    let listed: ThingsResponse = resp.json().await.unwrap();
    assert_eq!(listed.total, 1);
    assert!(listed.things.is_empty());
}

#[tokio::test]
async fn test_list_pagination_over_http() {
    let base = spawn_server().await;
    let client = reqwest::Client::new();

    for i in 0..5 {
        client
            .post(format!("{base}/thing/new"))
            .json(&serde_json::json!({"name": format!("thing-{i}"), "value": "v"}))
            .send()
            .await
            .unwrap();
    }

    let page2: ThingsResponse = client
        .get(format!("{base}/thing?page=2&limit=2"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(page2.total, 5);
    assert_eq!(page2.page, 2);
    assert_eq!(page2.limit, 2);
    assert_eq!(page2.things.len(), 2);

    // Garbage pagination params fall back to defaults
    let listed: ThingsResponse = client
        .get(format!("{base}/thing?page=abc&limit=9999"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(listed.page, 1);
    assert_eq!(listed.limit, 10);
    assert_eq!(listed.things.len(), 5);
}
