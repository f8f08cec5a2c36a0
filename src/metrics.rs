use lazy_static::lazy_static;
use prometheus::{
    Counter, CounterVec, Encoder, Histogram, HistogramOpts, HistogramVec, Opts, Registry,
    TextEncoder,
};
use std::time::Duration;

/// Metric name prefix for all scenes engine metrics
const PREFIX: &str = "scenes";

lazy_static! {
    pub static ref REGISTRY: Registry = Registry::new();

    pub static ref RELATIONSHIP_EDGES_UPSERTED_TOTAL: CounterVec = CounterVec::new(
        Opts::new(format!("{PREFIX}_relationship_edges_upserted_total"), "Relationship edges written by rebuilds"),
        &["relation_type"]
    ).expect("Failed to create relationship_edges_upserted_total metric");

    pub static ref RELATIONSHIP_REBUILD_DURATION_SECONDS: Histogram = Histogram::with_opts(
        HistogramOpts::new(
            format!("{PREFIX}_relationship_rebuild_duration_seconds"),
            "Duration of a full relationship rebuild in seconds"
        )
        .buckets(vec![0.1, 0.5, 1.0, 5.0, 15.0, 60.0, 300.0, 900.0])
    ).expect("Failed to create relationship_rebuild_duration_seconds metric");

    pub static ref RELATIONSHIP_PAIRS_FAILED_TOTAL: Counter = Counter::new(
        format!("{PREFIX}_relationship_pairs_failed_total"),
        "Scene pairs whose analysis failed during a rebuild"
    ).expect("Failed to create relationship_pairs_failed_total metric");

    pub static ref ADAPTER_FAILURES_TOTAL: CounterVec = CounterVec::new(
        Opts::new(format!("{PREFIX}_adapter_failures_total"), "Failed or timed out external calls"),
        &["adapter", "kind"]
    ).expect("Failed to create adapter_failures_total metric");

    pub static ref RECOMMENDATION_CACHE_TOTAL: CounterVec = CounterVec::new(
        Opts::new(format!("{PREFIX}_recommendation_cache_total"), "Recommendation cache lookups"),
        &["result"]
    ).expect("Failed to create recommendation_cache_total metric");

    pub static ref BACKGROUND_JOB_EXECUTIONS_TOTAL: CounterVec = CounterVec::new(
        Opts::new(format!("{PREFIX}_background_job_executions_total"), "Background job executions"),
        &["job_id", "status"]
    ).expect("Failed to create background_job_executions_total metric");

    pub static ref BACKGROUND_JOB_DURATION_SECONDS: HistogramVec = HistogramVec::new(
        HistogramOpts::new(
            format!("{PREFIX}_background_job_duration_seconds"),
            "Background job execution time in seconds"
        )
        .buckets(vec![0.1, 1.0, 10.0, 60.0, 300.0, 900.0, 3600.0]),
        &["job_id"]
    ).expect("Failed to create background_job_duration_seconds metric");
}

/// Register all metrics. Safe to call more than once.
pub fn init_metrics() {
    let _ = REGISTRY.register(Box::new(RELATIONSHIP_EDGES_UPSERTED_TOTAL.clone()));
    let _ = REGISTRY.register(Box::new(RELATIONSHIP_REBUILD_DURATION_SECONDS.clone()));
    let _ = REGISTRY.register(Box::new(RELATIONSHIP_PAIRS_FAILED_TOTAL.clone()));
    let _ = REGISTRY.register(Box::new(ADAPTER_FAILURES_TOTAL.clone()));
    let _ = REGISTRY.register(Box::new(RECOMMENDATION_CACHE_TOTAL.clone()));
    let _ = REGISTRY.register(Box::new(BACKGROUND_JOB_EXECUTIONS_TOTAL.clone()));
    let _ = REGISTRY.register(Box::new(BACKGROUND_JOB_DURATION_SECONDS.clone()));

    tracing::info!("Metrics system initialized successfully");
}

pub fn record_adapter_failure(adapter: &str, kind: &str) {
    ADAPTER_FAILURES_TOTAL
        .with_label_values(&[adapter, kind])
        .inc();
}

pub fn record_edge_upserted(relation_type: &str) {
    RELATIONSHIP_EDGES_UPSERTED_TOTAL
        .with_label_values(&[relation_type])
        .inc();
}

pub fn record_rebuild(duration: Duration, failed_pairs: usize) {
    RELATIONSHIP_REBUILD_DURATION_SECONDS.observe(duration.as_secs_f64());
    RELATIONSHIP_PAIRS_FAILED_TOTAL.inc_by(failed_pairs as f64);
}

pub fn record_cache_lookup(hit: bool) {
    RECOMMENDATION_CACHE_TOTAL
        .with_label_values(&[if hit { "hit" } else { "miss" }])
        .inc();
}

pub fn record_background_job_execution(job_id: &str, status: &str, duration: Duration) {
    BACKGROUND_JOB_EXECUTIONS_TOTAL
        .with_label_values(&[job_id, status])
        .inc();
    BACKGROUND_JOB_DURATION_SECONDS
        .with_label_values(&[job_id])
        .observe(duration.as_secs_f64());
}

/// Render the registry in the Prometheus text exposition format.
pub fn render_metrics() -> String {
    let encoder = TextEncoder::new();
    let metric_families = REGISTRY.gather();
    let mut buffer = Vec::new();
    if let Err(e) = encoder.encode(&metric_families, &mut buffer) {
        tracing::error!("Failed to encode metrics: {}", e);
        return String::new();
    }
    String::from_utf8(buffer).unwrap_or_default()
}
