//! Request-level middleware

use axum::{extract::Request, middleware::Next, response::Response};
use newshub_common::metrics::RequestMetrics;

/// Record a counter and latency histogram per request
pub async fn track_metrics(request: Request, next: Next) -> Response {
    let method = request.method().to_string();
    let endpoint = request.uri().path().to_string();

    let metrics = RequestMetrics::start(&method, &endpoint);
    let response = next.run(request).await;
    metrics.finish(response.status().as_u16());

    response
}
