//! Route handlers.
//!
//! Store access is synchronous, so every service call runs on the blocking
//! pool.

use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::Json;
use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::json;

use super::error::ApiError;
use super::AppState;
use crate::clock::Clock;
use crate::lock::{ttl_from_seconds, NO_EXPIRY};
use crate::service::{LockService, LockStatus, NewLock, ServiceError};
use crate::store::LockStore;

type SharedState<S, C> = State<Arc<AppState<S, C>>>;

/// Query for `POST /locks`.
#[derive(Debug, Default, Deserialize)]
pub struct CreateParams {
    #[serde(default)]
    pub locked: bool,
    /// TTL in seconds, `-1` or empty for none.
    #[serde(default, deserialize_with = "empty_as_none")]
    pub e: Option<i64>,
    /// Custom key.
    pub k: Option<String>,
}

/// Query for the mutating routes.
#[derive(Debug, Default, Deserialize)]
pub struct MutateParams {
    /// Lock key. Missing is treated as empty, which never matches.
    #[serde(default)]
    pub k: String,
    /// TTL in seconds for `lock`, `-1` or empty for none.
    #[serde(default, deserialize_with = "empty_as_none")]
    pub e: Option<i64>,
}

/// Body returned by `POST /locks`. The only response that carries the key.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatedLock {
    pub lock_id: String,
    pub lock_key: String,
    pub is_locked: bool,
}

// `e=` reads as absent; anything else must be an integer.
fn empty_as_none<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Deserialize::deserialize(deserializer)?;
    match raw.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(s) => s.parse().map(Some).map_err(D::Error::custom),
    }
}

async fn run<S, C, T, F>(state: Arc<AppState<S, C>>, call: F) -> Result<T, ApiError>
where
    S: LockStore + 'static,
    C: Clock + 'static,
    T: Send + 'static,
    F: FnOnce(&LockService<S, C>) -> Result<T, ServiceError> + Send + 'static,
{
    let result = tokio::task::spawn_blocking(move || call(&state.service)).await?;
    Ok(result?)
}

/// `GET /` - usage page.
pub async fn usage<S, C>(State(state): SharedState<S, C>) -> impl IntoResponse
where
    S: LockStore + 'static,
    C: Clock + 'static,
{
    (
        [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
        usage_text(&state.public_url),
    )
}

/// `GET /health`
pub async fn health() -> impl IntoResponse {
    Json(json!({ "ok": true }))
}

/// `POST /locks`
pub async fn create<S, C>(
    State(state): SharedState<S, C>,
    Query(params): Query<CreateParams>,
) -> Result<Json<CreatedLock>, ApiError>
where
    S: LockStore + 'static,
    C: Clock + 'static,
{
    let new = NewLock {
        locked: params.locked,
        ttl_seconds: ttl_from_seconds(params.e.unwrap_or(NO_EXPIRY)),
        key: params.k,
    };

    let created = run(state, move |service| {
        let lock = service.create_new(new)?;
        let is_locked = lock.is_locked_at(service.clock().now());
        Ok(CreatedLock {
            lock_id: lock.id().to_string(),
            lock_key: lock.key().to_string(),
            is_locked,
        })
    })
    .await?;

    Ok(Json(created))
}

/// `GET /locks/:lock_id` - 423 when held, 204 when free.
pub async fn query<S, C>(
    State(state): SharedState<S, C>,
    Path(lock_id): Path<String>,
) -> Result<StatusCode, ApiError>
where
    S: LockStore + 'static,
    C: Clock + 'static,
{
    let locked = run(state, move |service| service.is_locked(&lock_id)).await?;
    Ok(held_status(locked))
}

/// `GET /locks/:lock_id/status`
pub async fn status<S, C>(
    State(state): SharedState<S, C>,
    Path(lock_id): Path<String>,
) -> Result<Json<LockStatus>, ApiError>
where
    S: LockStore + 'static,
    C: Clock + 'static,
{
    let status = run(state, move |service| service.status(&lock_id)).await?;
    Ok(Json(status))
}

/// `PATCH /locks/:lock_id/lock`
pub async fn lock<S, C>(
    State(state): SharedState<S, C>,
    Path(lock_id): Path<String>,
    Query(params): Query<MutateParams>,
) -> Result<StatusCode, ApiError>
where
    S: LockStore + 'static,
    C: Clock + 'static,
{
    let ttl = ttl_from_seconds(params.e.unwrap_or(NO_EXPIRY));
    run(state, move |service| {
        service.lock_by_id_and_key(&lock_id, &params.k, ttl)
    })
    .await?;
    Ok(StatusCode::NO_CONTENT)
}

/// `PATCH /locks/:lock_id/unlock`
pub async fn unlock<S, C>(
    State(state): SharedState<S, C>,
    Path(lock_id): Path<String>,
    Query(params): Query<MutateParams>,
) -> Result<StatusCode, ApiError>
where
    S: LockStore + 'static,
    C: Clock + 'static,
{
    run(state, move |service| service.unlock(&lock_id, &params.k)).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// `PATCH /locks/:lock_id/toggle`
pub async fn toggle<S, C>(
    State(state): SharedState<S, C>,
    Path(lock_id): Path<String>,
    Query(params): Query<MutateParams>,
) -> Result<StatusCode, ApiError>
where
    S: LockStore + 'static,
    C: Clock + 'static,
{
    run(state, move |service| service.toggle(&lock_id, &params.k)).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn not_found() -> impl IntoResponse {
    (StatusCode::NOT_FOUND, "not found")
}

fn held_status(locked: bool) -> StatusCode {
    if locked {
        StatusCode::LOCKED
    } else {
        StatusCode::NO_CONTENT
    }
}

fn usage_text(base: &str) -> String {
    let base = base.trim_end_matches('/');
    format!(
        r#"lock-states: named locks for pipelines that cannot talk to each other

# Create a lock (optional: locked=true, e=<ttl seconds>, k=<your own key>)
curl -X POST {base}/locks
{{"lockId":"01hvkab4t422rap18rwjs2prnm","lockKey":"5f0c3c55-8d4e-4b7e-9a59-2f7e0d5a1c1b","isLocked":false}}

# Free locks answer 204
curl -I {base}/locks/01hvkab4t422rap18rwjs2prnm
HTTP/1.1 204 No Content

# Lock with the key; e=600 releases it on its own after ten minutes
curl -X PATCH "{base}/locks/01hvkab4t422rap18rwjs2prnm/lock?k=5f0c3c55-8d4e-4b7e-9a59-2f7e0d5a1c1b&e=600"

# Held locks answer 423
curl -I {base}/locks/01hvkab4t422rap18rwjs2prnm
HTTP/1.1 423 Locked

# Release or flip it
curl -X PATCH "{base}/locks/01hvkab4t422rap18rwjs2prnm/unlock?k=5f0c3c55-8d4e-4b7e-9a59-2f7e0d5a1c1b"
curl -X PATCH "{base}/locks/01hvkab4t422rap18rwjs2prnm/toggle?k=5f0c3c55-8d4e-4b7e-9a59-2f7e0d5a1c1b"

# Stop a CI job while the lock is held
curl -fsS {base}/locks/01hvkab4t422rap18rwjs2prnm && echo "not locked, carrying on"
"#
    )
}
