//! Route-level behaviour: creation options, status body, headers, fallbacks.

use chrono::Duration;
use serde_json::Value;

use crate::support::{start_server, Created};

#[tokio::test]
async fn health_check() {
    let server = start_server().await;

    let resp = server.client.get(server.url("/health")).send().await.unwrap();
    assert_eq!(resp.status(), 200);

    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["ok"], true);
}

#[tokio::test]
async fn usage_page_mentions_this_server() {
    let server = start_server().await;

    let resp = server.client.get(server.url("/")).send().await.unwrap();
    assert_eq!(resp.status(), 200);
    assert!(resp.headers()["content-type"]
        .to_str()
        .unwrap()
        .starts_with("text/plain"));

    let text = resp.text().await.unwrap();
    assert!(text.contains(&format!("curl -X POST {}/locks", server.base)));
}

#[tokio::test]
async fn create_locked_with_ttl_and_custom_key() {
    let server = start_server().await;

    let resp = server.create("?locked=true&e=60&k=release-train").await;
    assert_eq!(resp.status(), 200);
    let created: Created = resp.json().await.unwrap();
    assert_eq!(created.lock_key, "release-train");
    assert!(created.is_locked);
    assert_eq!(server.query(&created.lock_id).await, 423);

    server.clock.advance(Duration::seconds(61));
    assert_eq!(server.query(&created.lock_id).await, 204);

    assert_eq!(
        server
            .patch(&created.lock_id, "lock", "?k=release-train&e=-1")
            .await,
        204
    );
    assert_eq!(server.query(&created.lock_id).await, 423);
}

#[tokio::test]
async fn create_rejects_bad_custom_key() {
    let server = start_server().await;

    let resp = server.create("?k=").await;
    assert_eq!(resp.status(), 400);
    let body: Value = resp.json().await.unwrap();
    assert!(body["error"].as_str().unwrap().contains("invalid lock key"));

    let long = "a".repeat(256);
    let resp = server.create(&format!("?k={}", long)).await;
    assert_eq!(resp.status(), 400);

    let ok = "a".repeat(255);
    let resp = server.create(&format!("?k={}", ok)).await;
    assert_eq!(resp.status(), 200);
}

#[tokio::test]
async fn status_reports_expiry_without_key() {
    let server = start_server().await;
    let created: Created = server.create("?locked=true&e=10").await.json().await.unwrap();

    let resp = server
        .client
        .get(server.url(&format!("/locks/{}/status", created.lock_id)))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);

    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["lockId"], created.lock_id.as_str());
    assert_eq!(body["isLocked"], true);
    assert_eq!(body["expiresAt"], 1_700_000_010_000i64);
    assert!(body.get("lockKey").is_none());
    assert!(!body.to_string().contains(&created.lock_key));
}

#[tokio::test]
async fn errors_are_json() {
    let server = start_server().await;
    let lock = server.create_lock().await;

    let resp = server
        .client
        .patch(server.url(&format!("/locks/{}/lock?k=nope", lock.lock_id)))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 401);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["error"], "key is not valid");
}

#[tokio::test]
async fn every_response_is_timed() {
    let server = start_server().await;

    for path in ["/health", "/locks/unknown", "/nowhere"] {
        let resp = server.client.get(server.url(path)).send().await.unwrap();
        let timing = resp.headers()["x-response-time"].to_str().unwrap().to_string();
        assert!(timing.ends_with("ms"), "{path}: {timing}");
    }
}

#[tokio::test]
async fn unknown_route_is_404() {
    let server = start_server().await;

    let resp = server.client.get(server.url("/nowhere")).send().await.unwrap();
    assert_eq!(resp.status(), 404);
    assert_eq!(resp.text().await.unwrap(), "not found");
}

#[tokio::test]
async fn non_numeric_ttl_is_rejected() {
    let server = start_server().await;
    let lock = server.create_lock().await;

    let status = server
        .patch(&lock.lock_id, "lock", &format!("?k={}&e=soon", lock.lock_key))
        .await;
    assert_eq!(status, 400);
    assert_eq!(server.query(&lock.lock_id).await, 204);
}

#[tokio::test]
async fn empty_ttl_locks_without_expiry() {
    let server = start_server().await;
    let lock = server.create_lock().await;

    let status = server
        .patch(&lock.lock_id, "lock", &format!("?k={}&e=", lock.lock_key))
        .await;
    assert_eq!(status, 204);

    server.clock.advance(Duration::days(30));
    assert_eq!(server.query(&lock.lock_id).await, 423);

    let resp = server.create("?locked=true&e=").await;
    assert_eq!(resp.status(), 200);
    let created: Created = resp.json().await.unwrap();
    assert!(created.is_locked);
    server.clock.advance(Duration::days(30));
    assert_eq!(server.query(&created.lock_id).await, 423);
}
