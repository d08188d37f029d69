//! Request timing and access logging.

use std::time::Instant;

use axum::extract::Request;
use axum::http::HeaderValue;
use axum::middleware::Next;
use axum::response::Response;
use tracing::info;

pub const RESPONSE_TIME_HEADER: &str = "x-response-time";

/// Stamp `X-Response-Time` on every response and log the request.
///
/// Only the path is logged; query strings carry lock keys.
pub async fn track_requests(request: Request, next: Next) -> Response {
    let method = request.method().clone();
    let path = request.uri().path().to_string();
    let started = Instant::now();

    let mut response = next.run(request).await;

    let elapsed_ms = started.elapsed().as_millis();
    if let Ok(value) = HeaderValue::from_str(&format!("{}ms", elapsed_ms)) {
        response.headers_mut().insert(RESPONSE_TIME_HEADER, value);
    }
    info!(
        %method,
        path = %path,
        status = response.status().as_u16(),
        elapsed_ms = elapsed_ms as u64,
        "request"
    );
    response
}
