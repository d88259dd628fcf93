use prometheus::{core::Collector, Counter, Gauge, Histogram, HistogramOpts, Opts, Registry, TextEncoder};
use tracing::error;

lazy_static::lazy_static! {
    // Send path
    pub static ref MESSAGES_SENT: Counter = Counter::with_opts(
        Opts::new("tripchat_messages_sent_total", "Total number of chat messages appended by sends")
    ).expect("valid metric");

    pub static ref SENDS_REJECTED: Counter = Counter::with_opts(
        Opts::new("tripchat_sends_rejected_total", "Total number of empty or whitespace-only sends")
    ).expect("valid metric");

    // Summary lifecycle
    pub static ref SUMMARIES_REQUESTED: Counter = Counter::with_opts(
        Opts::new("tripchat_summaries_requested_total", "Total number of placeholders inserted")
    ).expect("valid metric");

    pub static ref SUMMARIES_RESOLVED: Counter = Counter::with_opts(
        Opts::new("tripchat_summaries_resolved_total", "Total number of placeholders resolved with a summary")
    ).expect("valid metric");

    pub static ref SUMMARIES_FAILED: Counter = Counter::with_opts(
        Opts::new("tripchat_summaries_failed_total", "Total number of placeholders removed after a failed extraction")
    ).expect("valid metric");

    pub static ref PENDING_SUMMARIES: Gauge = Gauge::with_opts(
        Opts::new("tripchat_pending_summaries", "Number of summary requests in flight")
    ).expect("valid metric");

    // Latency
    pub static ref SUMMARY_ROUNDTRIP_DURATION: Histogram = Histogram::with_opts(
        HistogramOpts::new("tripchat_summary_roundtrip_duration_seconds", "Time from placeholder insertion to resolution or removal")
    ).expect("valid metric");

    pub static ref SUMMARY_EXTRACTION_DURATION: Histogram = Histogram::with_opts(
        HistogramOpts::new("tripchat_summary_extraction_duration_seconds", "Time spent inside the rule-based summarizer")
    ).expect("valid metric");
}

pub struct MetricsRegistry {
    registry: Registry,
}

impl MetricsRegistry {
    pub fn new() -> Self {
        let registry = Registry::new();

        let collectors: Vec<Box<dyn Collector>> = vec![
            Box::new(MESSAGES_SENT.clone()),
            Box::new(SENDS_REJECTED.clone()),
            Box::new(SUMMARIES_REQUESTED.clone()),
            Box::new(SUMMARIES_RESOLVED.clone()),
            Box::new(SUMMARIES_FAILED.clone()),
            Box::new(PENDING_SUMMARIES.clone()),
            Box::new(SUMMARY_ROUNDTRIP_DURATION.clone()),
            Box::new(SUMMARY_EXTRACTION_DURATION.clone()),
        ];
        for collector in collectors {
            if let Err(e) = registry.register(collector) {
                error!("Failed to register metric: {}", e);
            }
        }

        Self { registry }
    }

    pub fn gather_metrics(&self) -> String {
        let metric_families = self.registry.gather();
        let encoder = TextEncoder::new();
        encoder.encode_to_string(&metric_families).unwrap_or_else(|e| {
            error!("Failed to encode metrics: {}", e);
            String::new()
        })
    }
}

impl Default for MetricsRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exposes_every_collector() {
        let registry = MetricsRegistry::new();
        let text = registry.gather_metrics();
        for name in [
            "tripchat_messages_sent_total",
            "tripchat_sends_rejected_total",
            "tripchat_summaries_requested_total",
            "tripchat_summaries_resolved_total",
            "tripchat_summaries_failed_total",
            "tripchat_pending_summaries",
            "tripchat_summary_roundtrip_duration_seconds",
            "tripchat_summary_extraction_duration_seconds",
        ] {
            assert!(text.contains(name), "missing {name}");
        }
    }

    #[test]
    fn registries_are_independent() {
        let first = MetricsRegistry::new();
        let second = MetricsRegistry::new();
        assert!(!first.gather_metrics().is_empty());
        assert!(!second.gather_metrics().is_empty());
    }
}
