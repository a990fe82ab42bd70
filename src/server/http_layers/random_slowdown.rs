//! Random slowdown middleware, to reproduce overlapping scrape requests locally.
#![cfg(feature = "slowdown")]

use axum::body::Body;
use axum::extract::Request;
use axum::middleware::Next;
use axum::response::IntoResponse;
use rand_distr::{Distribution, Normal};
use std::time::Duration;

/// Delays the request by a gaussian amount of time, mean 1 second, clamped at zero.
pub async fn slowdown_request(request: Request<Body>, next: Next) -> impl IntoResponse {
    let delay_ms = Normal::new(1000.0, 2000.0)
        .map(|normal| normal.sample(&mut rand::rng()))
        .unwrap_or(0.0)
        .max(0.0);

    tokio::time::sleep(Duration::from_millis(delay_ms as u64)).await;
    next.run(request).await
}
