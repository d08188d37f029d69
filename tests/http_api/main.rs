//! HTTP transport integration tests.
//!
//! Starts an axum server on a random port and exercises it with reqwest.
#![cfg(feature = "http")]

mod lifecycle;
mod routes;
mod support;
