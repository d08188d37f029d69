//! HTTP transport - maps lock routes onto a [`LockService`].
//!
//! Requires the `http` feature. Uses axum for routing.
//!
//! ## Routes
//!
//! - `GET /` - plain-text usage page.
//! - `GET /health` - `{ "ok": true }`.
//! - `POST /locks?locked=&e=&k=` - create a lock, returns `{ lockId, lockKey, isLocked }`.
//! - `GET /locks/:lockId` - `423 Locked` if held, `204 No Content` if not.
//! - `GET /locks/:lockId/status` - `{ lockId, isLocked, expiresAt }`.
//! - `PATCH /locks/:lockId/lock?k=&e=` - lock, optionally for `e` seconds.
//! - `PATCH /locks/:lockId/unlock?k=` - unlock.
//! - `PATCH /locks/:lockId/toggle?k=` - toggle.
//!
//! ## Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use lock_states::{http, InMemoryLockStore, LockService};
//!
//! let service = LockService::new(InMemoryLockStore::new());
//! let state = Arc::new(http::AppState::new(service, "http://localhost:8000"));
//!
//! // Get the router to compose with other axum routes
//! let app = http::router(state.clone());
//!
//! // Or serve directly
//! http::serve(state, "0.0.0.0:8000").await?;
//! ```

mod error;
mod handlers;
mod middleware;

use std::sync::Arc;

use axum::routing::{get, patch, post};
use axum::Router;
use tracing::info;

use crate::clock::{Clock, SystemClock};
use crate::service::LockService;
use crate::store::LockStore;

pub use error::ApiError;

/// Shared state behind every route.
pub struct AppState<S, C = SystemClock> {
    pub service: LockService<S, C>,
    /// Base URL shown in the usage page.
    pub public_url: String,
}

impl<S, C> AppState<S, C> {
    pub fn new(service: LockService<S, C>, public_url: impl Into<String>) -> Self {
        Self {
            service,
            public_url: public_url.into(),
        }
    }
}

/// Build an axum `Router` serving the lock routes.
pub fn router<S, C>(state: Arc<AppState<S, C>>) -> Router
where
    S: LockStore + 'static,
    C: Clock + 'static,
{
    Router::new()
        .route("/", get(handlers::usage::<S, C>))
        .route("/health", get(handlers::health))
        .route("/locks", post(handlers::create::<S, C>))
        .route("/locks/:lock_id", get(handlers::query::<S, C>))
        .route("/locks/:lock_id/status", get(handlers::status::<S, C>))
        .route("/locks/:lock_id/lock", patch(handlers::lock::<S, C>))
        .route("/locks/:lock_id/unlock", patch(handlers::unlock::<S, C>))
        .route("/locks/:lock_id/toggle", patch(handlers::toggle::<S, C>))
        .fallback(handlers::not_found)
        .layer(axum::middleware::from_fn(middleware::track_requests))
        .with_state(state)
}

/// Serve the lock routes at `addr` (e.g. `"0.0.0.0:8000"`) until Ctrl-C.
pub async fn serve<S, C>(state: Arc<AppState<S, C>>, addr: &str) -> Result<(), std::io::Error>
where
    S: LockStore + 'static,
    C: Clock + 'static,
{
    let app = router(state);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(addr = %listener.local_addr()?, "listening");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_ok() {
        info!("shutting down");
    }
}
