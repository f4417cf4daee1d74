//! Prometheus metrics and the `/metrics` endpoint.

use std::sync::OnceLock;

use prometheus::{
    Encoder, HistogramOpts, HistogramVec, IntCounterVec, IntGauge, Opts, Registry, TextEncoder,
    core::Collector,
};
use salvo::{
    Request, Response, handler,
    http::{
        StatusCode,
        header::{CONTENT_TYPE, HeaderValue},
    },
};
use tracing::error;

const NAMESPACE: &str = "coupons_json";

const DURATION_BUCKETS: [f64; 13] = [
    0.001, 0.0025, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0,
];

#[derive(Debug)]
struct ServiceMetrics {
    registry: Registry,
    requests_total: IntCounterVec,
    request_duration_seconds: HistogramVec,
    requests_in_flight: IntGauge,
    coupon_evaluations_total: IntCounterVec,
    coupon_redemptions_total: IntCounterVec,
}

impl ServiceMetrics {
    fn new() -> Result<Self, prometheus::Error> {
        let registry = Registry::new_custom(Some(NAMESPACE.to_string()), None)?;

        Ok(Self {
            requests_total: register(
                &registry,
                IntCounterVec::new(
                    Opts::new(
                        "http_requests_total",
                        "HTTP requests by method, route, status class and status code.",
                    ),
                    &["method", "route", "status_class", "status_code"],
                )?,
            )?,
            request_duration_seconds: register(
                &registry,
                HistogramVec::new(
                    HistogramOpts::new(
                        "http_request_duration_seconds",
                        "HTTP request latency by method and route.",
                    )
                    .buckets(DURATION_BUCKETS.to_vec()),
                    &["method", "route"],
                )?,
            )?,
            requests_in_flight: register(
                &registry,
                IntGauge::new("http_requests_in_flight", "HTTP requests being served.")?,
            )?,
            coupon_evaluations_total: register(
                &registry,
                IntCounterVec::new(
                    Opts::new("coupon_evaluations_total", "Coupon validations by outcome."),
                    &["outcome"],
                )?,
            )?,
            coupon_redemptions_total: register(
                &registry,
                IntCounterVec::new(
                    Opts::new("coupon_redemptions_total", "Coupon redemptions by outcome."),
                    &["outcome"],
                )?,
            )?,
            registry,
        })
    }
}

fn register<M>(registry: &Registry, metric: M) -> Result<M, prometheus::Error>
where
    M: Collector + Clone + 'static,
{
    registry.register(Box::new(metric.clone()))?;

    Ok(metric)
}

static SERVICE_METRICS: OnceLock<Option<ServiceMetrics>> = OnceLock::new();

/// Metrics are best effort: if the registry cannot be built the service keeps
/// running and every observation becomes a no-op.
fn metrics() -> Option<&'static ServiceMetrics> {
    SERVICE_METRICS
        .get_or_init(|| {
            ServiceMetrics::new()
                .inspect_err(|source| error!("failed to build metrics registry: {source}"))
                .ok()
        })
        .as_ref()
}

/// Keeps the in-flight gauge raised for as long as it is alive.
#[derive(Debug)]
pub(super) struct InFlightRequestGuard {
    gauge: Option<&'static IntGauge>,
}

impl InFlightRequestGuard {
    pub(super) fn track() -> Self {
        let gauge = metrics().map(|metrics| &metrics.requests_in_flight);

        if let Some(gauge) = gauge {
            gauge.inc();
        }

        Self { gauge }
    }
}

impl Drop for InFlightRequestGuard {
    fn drop(&mut self) {
        if let Some(gauge) = self.gauge {
            gauge.dec();
        }
    }
}

pub(super) fn observe_request(method: &str, route: &str, status_code: u16, duration_seconds: f64) {
    let Some(metrics) = metrics() else {
        return;
    };

    let status = status_code.to_string();

    metrics
        .requests_total
        .with_label_values(&[method, route, status_class(status_code), status.as_str()])
        .inc();

    metrics
        .request_duration_seconds
        .with_label_values(&[method, route])
        .observe(duration_seconds);
}

/// Count one coupon validation by outcome: `valid`, `not_found`, or the
/// rejection reason.
pub(crate) fn observe_evaluation(outcome: &str) {
    if let Some(metrics) = metrics() {
        metrics
            .coupon_evaluations_total
            .with_label_values(&[outcome])
            .inc();
    }
}

/// Count one redemption attempt by outcome: `redeemed`, `not_found`,
/// `outside_window` or `usage_limit_reached`.
pub(crate) fn observe_redemption(outcome: &str) {
    if let Some(metrics) = metrics() {
        metrics
            .coupon_redemptions_total
            .with_label_values(&[outcome])
            .inc();
    }
}

#[handler]
pub(crate) async fn metrics_handler(_req: &mut Request, res: &mut Response) {
    let Some(metrics) = metrics() else {
        res.status_code(StatusCode::INTERNAL_SERVER_ERROR);
        return;
    };

    let encoder = TextEncoder::new();
    let mut encoded = Vec::new();

    if let Err(source) = encoder.encode(&metrics.registry.gather(), &mut encoded) {
        error!("failed to encode metrics: {source}");
        res.status_code(StatusCode::INTERNAL_SERVER_ERROR);

        return;
    }

    match HeaderValue::from_str(encoder.format_type()) {
        Ok(content_type) => {
            res.headers_mut().insert(CONTENT_TYPE, content_type);
            res.render(String::from_utf8_lossy(&encoded).into_owned());
        }
        Err(source) => {
            error!("invalid metrics content type: {source}");
            res.status_code(StatusCode::INTERNAL_SERVER_ERROR);
        }
    }
}

fn status_class(status_code: u16) -> &'static str {
    match status_code {
        100..=199 => "1xx",
        200..=299 => "2xx",
        300..=399 => "3xx",
        400..=499 => "4xx",
        500..=599 => "5xx",
        _ => "other",
    }
}

#[cfg(test)]
mod tests {
    use salvo::{
        Router, Service,
        test::{ResponseExt, TestClient},
    };

    use super::*;

    #[test]
    fn status_codes_are_grouped_by_class() {
        assert_eq!(status_class(201), "2xx");
        assert_eq!(status_class(409), "4xx");
        assert_eq!(status_class(503), "5xx");
        assert_eq!(status_class(99), "other");
    }

    #[tokio::test]
    async fn metrics_endpoint_exposes_service_metrics() {
        observe_request("GET", "/coupons", 200, 0.042);
        observe_request("POST", "/coupons/validate/{code}", 400, 0.123);
        observe_evaluation("minimum_not_met");
        observe_redemption("usage_limit_reached");

        let service =
            Service::new(Router::new().push(Router::with_path("metrics").get(metrics_handler)));

        let response = TestClient::get("http://example.com/metrics")
            .send(&service)
            .await
            .take_string()
            .await
            .unwrap_or_default();

        for expected in [
            "coupons_json_http_requests_total",
            "coupons_json_http_request_duration_seconds",
            "coupons_json_http_requests_in_flight",
            "coupons_json_coupon_evaluations_total{outcome=\"minimum_not_met\"}",
            "coupons_json_coupon_redemptions_total{outcome=\"usage_limit_reached\"}",
        ] {
            assert!(response.contains(expected), "expected {expected} in response");
        }
    }
}
