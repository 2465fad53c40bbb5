use prometheus::{Encoder, IntCounter, Opts, Registry, TextEncoder};
use std::sync::Arc;

#[derive(Clone)]
pub struct Metrics {
    pub requests_issued: IntCounter,
    pub responses_applied: IntCounter,
    pub responses_discarded: IntCounter,
    pub request_failures: IntCounter,
    registry: Arc<Registry>,
}

fn counter(registry: &Registry, name: &str, help: &str) -> prometheus::Result<IntCounter> {
    let counter = IntCounter::with_opts(Opts::new(name, help))?;
    registry.register(Box::new(counter.clone()))?;
    Ok(counter)
}

impl Metrics {
    pub fn new() -> prometheus::Result<Self> {
        let registry = Registry::new();
        let requests_issued = counter(
            &registry,
            "requests_issued",
            "Number of search requests issued",
        )?;
        let responses_applied = counter(
            &registry,
            "responses_applied",
            "Number of responses applied to the view",
        )?;
        let responses_discarded = counter(
            &registry,
            "responses_discarded",
            "Number of responses dropped because a newer request was issued",
        )?;
        let request_failures = counter(
            &registry,
            "request_failures",
            "Number of failed requests surfaced to the user",
        )?;

        Ok(Metrics {
            requests_issued,
            responses_applied,
            responses_discarded,
            request_failures,
            registry: Arc::new(registry),
        })
    }

    pub fn gather(&self) -> String {
        let metric_families = self.registry.gather();
        let mut buffer = Vec::new();
        let encoder = TextEncoder::new();
        if encoder.encode(&metric_families, &mut buffer).is_err() {
            return String::new();
        }
        String::from_utf8(buffer).unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gather_reports_counters() {
        let metrics = Metrics::new().unwrap();
        metrics.requests_issued.inc_by(3);
        metrics.responses_discarded.inc();

        let text = metrics.gather();
        assert!(text.contains("requests_issued 3"));
        assert!(text.contains("responses_discarded 1"));
        assert!(text.contains("responses_applied 0"));
    }
}
