use axum::{body::Body, http::Request, response::Response};
use lazy_static::lazy_static;
use prometheus::{self, Encoder, HistogramOpts, HistogramVec, IntCounterVec, Opts, Registry};
use tracing::Span;

lazy_static! {
    // Registry for holding metric state
    pub static ref REGISTRY: Registry = Registry::new();
    // Simple request counter
    pub static ref INCOMING_REQUESTS: IntCounterVec = IntCounterVec::new(
        Opts::new("incoming_requests", "The number of HTTP requests received"),
        &["http_method"]
    ).unwrap();
    // Request counter by status code
    pub static ref RESPONSE_CODE_COLLECTOR: IntCounterVec = IntCounterVec::new(
        Opts::new("outgoing_response", "The number of responses sent."),
        &["status_code"]
    ).unwrap();
    // Request histogram by response time
    pub static ref RESPONSE_TIME_COLLECTOR: HistogramVec = HistogramVec::new(
        HistogramOpts{
            common_opts: Opts::new("response_time", "The time taken to respond to each request"),
            buckets: prometheus::DEFAULT_BUCKETS.to_vec(),
        },
        &[],
    ).unwrap();
    // Store queries by resource prefix and endpoint (search or get_by_key)
    pub static ref RESOURCE_QUERIES: IntCounterVec = IntCounterVec::new(
        Opts::new("resource_queries", "The number of store queries made by each resource"),
        &["resource", "endpoint"]
    ).unwrap();
    // Documents returned by resource prefix
    pub static ref DOCUMENTS_RETURNED: IntCounterVec = IntCounterVec::new(
        Opts::new("documents_returned", "The number of documents returned by each resource"),
        &["resource"]
    ).unwrap();
}

/// Register all collectors. Collectors that are already registered are skipped.
pub fn register_metrics() {
    let collectors: [Box<dyn prometheus::core::Collector>; 5] = [
        Box::new(INCOMING_REQUESTS.clone()),
        Box::new(RESPONSE_CODE_COLLECTOR.clone()),
        Box::new(RESPONSE_TIME_COLLECTOR.clone()),
        Box::new(RESOURCE_QUERIES.clone()),
        Box::new(DOCUMENTS_RETURNED.clone()),
    ];
    for collector in collectors {
        match REGISTRY.register(collector) {
            Ok(()) | Err(prometheus::Error::AlreadyReg) => {}
            Err(err) => tracing::warn!("failed to register metric: {}", err),
        }
    }
}

pub async fn metrics_handler() -> String {
    let encoder = prometheus::TextEncoder::new();
    let mut buffer = Vec::new();

    if let Err(err) = encoder.encode(&REGISTRY.gather(), &mut buffer) {
        tracing::error!("failed to encode metrics: {}", err);
    }

    String::from_utf8_lossy(&buffer).into_owned()
}

/// Increments the prometheus counter on all incoming requests, labelled by http method
pub fn request_counter(request: &Request<Body>, _span: &Span) {
    INCOMING_REQUESTS
        .with_label_values(&[&request.method().to_string().to_ascii_uppercase()])
        .inc();
}

/// Increment the prometheus counter on all outgoing responses, labelled by status code
pub fn record_response_metrics<B>(
    response: &Response<B>,
    latency: std::time::Duration,
    _span: &Span,
) {
    RESPONSE_CODE_COLLECTOR
        .with_label_values(&[response.status().as_str()])
        .inc();

    RESPONSE_TIME_COLLECTOR
        .with_label_values(&[])
        .observe(latency.as_secs_f64());
}

/// Record a store query made by a resource and the number of documents it returned.
pub fn record_resource_query(resource: &str, endpoint: &str, documents: usize) {
    RESOURCE_QUERIES
        .with_label_values(&[resource, endpoint])
        .inc();
    DOCUMENTS_RETURNED
        .with_label_values(&[resource])
        .inc_by(documents as u64);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn resource_metrics_exposed() {
        register_metrics();
        register_metrics();
        record_resource_query("metrics_test", "search", 3);
        let output = metrics_handler().await;
        assert!(output.contains(
            "resource_queries{endpoint=\"search\",resource=\"metrics_test\"} 1"
        ));
        assert!(output.contains("documents_returned{resource=\"metrics_test\"} 3"));
    }
}
