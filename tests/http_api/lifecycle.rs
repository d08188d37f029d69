//! Create, query, lock, expire, unlock, toggle through the HTTP surface.

use chrono::Duration;

use crate::support::start_server;

#[tokio::test]
async fn create_then_query_is_unlocked() {
    let server = start_server().await;
    let created = server.create_lock().await;

    assert_eq!(created.lock_id.len(), 26);
    assert!(!created.lock_key.is_empty());
    assert!(!created.is_locked);
    assert_eq!(server.query(&created.lock_id).await, 204);
}

#[tokio::test]
async fn lock_with_ttl_expires_without_unlock() {
    let server = start_server().await;
    let lock = server.create_lock().await;
    let key = format!("?k={}&e=0", lock.lock_key);

    assert_eq!(server.patch(&lock.lock_id, "lock", &key).await, 204);
    assert_eq!(server.query(&lock.lock_id).await, 423);

    server.clock.advance(Duration::milliseconds(1));
    assert_eq!(server.query(&lock.lock_id).await, 204);
}

#[tokio::test]
async fn lock_without_ttl_holds() {
    let server = start_server().await;
    let lock = server.create_lock().await;

    let status = server
        .patch(&lock.lock_id, "lock", &format!("?k={}", lock.lock_key))
        .await;
    assert_eq!(status, 204);

    server.clock.advance(Duration::days(30));
    assert_eq!(server.query(&lock.lock_id).await, 423);
}

#[tokio::test]
async fn unlock_and_toggle() {
    let server = start_server().await;
    let lock = server.create_lock().await;
    let key = format!("?k={}", lock.lock_key);

    assert_eq!(server.patch(&lock.lock_id, "toggle", &key).await, 204);
    assert_eq!(server.query(&lock.lock_id).await, 423);

    assert_eq!(server.patch(&lock.lock_id, "unlock", &key).await, 204);
    assert_eq!(server.query(&lock.lock_id).await, 204);

    assert_eq!(server.patch(&lock.lock_id, "toggle", &key).await, 204);
    assert_eq!(server.patch(&lock.lock_id, "toggle", &key).await, 204);
    assert_eq!(server.query(&lock.lock_id).await, 204);
}

#[tokio::test]
async fn wrong_key_is_unauthorized_and_changes_nothing() {
    let server = start_server().await;
    let lock = server.create_lock().await;

    assert_eq!(server.patch(&lock.lock_id, "lock", "?k=guess").await, 401);
    assert_eq!(server.patch(&lock.lock_id, "toggle", "").await, 401);
    assert_eq!(
        server
            .patch(&lock.lock_id, "unlock", &format!("?k={}", lock.lock_id))
            .await,
        401
    );
    assert_eq!(server.query(&lock.lock_id).await, 204);
}

#[tokio::test]
async fn unknown_lock_is_not_found() {
    let server = start_server().await;
    let ghost = "01hvkab4t422rap18rwjs2prnm";

    assert_eq!(server.query(ghost).await, 404);
    assert_eq!(server.patch(ghost, "lock", "?k=anything").await, 404);
    assert_eq!(server.patch(ghost, "unlock", "").await, 404);
    assert_eq!(server.patch(ghost, "toggle", "?k=x").await, 404);
}

#[tokio::test]
async fn ids_are_case_insensitive() {
    let server = start_server().await;
    let lock = server.create_lock().await;
    let upper = lock.lock_id.to_uppercase();

    let status = server
        .patch(&upper, "lock", &format!("?k={}", lock.lock_key))
        .await;
    assert_eq!(status, 204);
    assert_eq!(server.query(&lock.lock_id).await, 423);
    assert_eq!(server.query(&upper).await, 423);
}
