//! Metrics and observability utilities
//!
//! Prometheus metrics with standardized naming. The exporter itself is
//! installed by the web binary; this module registers descriptions and
//! provides the recording helpers handlers use.

use metrics::{counter, describe_counter, describe_histogram, histogram, Unit};
use std::time::Instant;

/// Metrics prefix for all NewsHub metrics
pub const METRICS_PREFIX: &str = "newshub";

/// Histogram buckets for request latency (in seconds)
pub const LATENCY_BUCKETS: &[f64] = &[
    0.001, 0.005, 0.010, 0.025, 0.050, 0.100, 0.250, 0.500, 1.000, 2.500, 5.000,
];

/// Register all metric descriptions
pub fn register_metrics() {
    describe_counter!(
        format!("{}_requests_total", METRICS_PREFIX),
        Unit::Count,
        "Total number of HTTP requests"
    );

    describe_histogram!(
        format!("{}_request_duration_seconds", METRICS_PREFIX),
        Unit::Seconds,
        "HTTP request latency in seconds"
    );

    describe_counter!(
        format!("{}_article_views_total", METRICS_PREFIX),
        Unit::Count,
        "Article pages served"
    );

    describe_counter!(
        format!("{}_comments_posted_total", METRICS_PREFIX),
        Unit::Count,
        "Comments accepted and stored"
    );

    describe_counter!(
        format!("{}_comments_rejected_total", METRICS_PREFIX),
        Unit::Count,
        "Comment submissions rejected, by reason"
    );

    describe_counter!(
        format!("{}_searches_total", METRICS_PREFIX),
        Unit::Count,
        "Search queries served"
    );

    tracing::info!("Metrics registered");
}

/// Helper to record request metrics
pub struct RequestMetrics {
    start: Instant,
    endpoint: String,
    method: String,
}

impl RequestMetrics {
    /// Start tracking a request
    pub fn start(method: &str, endpoint: &str) -> Self {
        Self {
            start: Instant::now(),
            endpoint: endpoint.to_string(),
            method: method.to_string(),
        }
    }

    /// Record request completion
    pub fn finish(self, status: u16) {
        let duration = self.start.elapsed().as_secs_f64();

        counter!(
            format!("{}_requests_total", METRICS_PREFIX),
            "method" => self.method.clone(),
            "endpoint" => self.endpoint.clone(),
            "status" => status.to_string()
        )
        .increment(1);

        histogram!(
            format!("{}_request_duration_seconds", METRICS_PREFIX),
            "method" => self.method,
            "endpoint" => self.endpoint
        )
        .record(duration);
    }
}

/// Record an article page view
pub fn record_article_view() {
    counter!(format!("{}_article_views_total", METRICS_PREFIX)).increment(1);
}

/// Record the outcome of a comment submission
pub fn record_comment_outcome(accepted: bool, reason: &'static str) {
    if accepted {
        counter!(format!("{}_comments_posted_total", METRICS_PREFIX)).increment(1);
    } else {
        counter!(
            format!("{}_comments_rejected_total", METRICS_PREFIX),
            "reason" => reason
        )
        .increment(1);
    }
}

/// Record a search query
pub fn record_search(result_count: usize) {
    counter!(
        format!("{}_searches_total", METRICS_PREFIX),
        "outcome" => if result_count == 0 { "empty" } else { "hit" }
    )
    .increment(1);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_latency_buckets_sorted() {
        let mut prev = 0.0;
        for &bucket in LATENCY_BUCKETS {
            assert!(bucket > prev);
            prev = bucket;
        }
    }

    #[test]
    fn test_request_metrics() {
        let metrics = RequestMetrics::start("GET", "/article");
        metrics.finish(200);
        // Just verify it runs without panic
    }
}
