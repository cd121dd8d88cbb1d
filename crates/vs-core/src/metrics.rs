//! In-process counters for the `/metrics` Prometheus surface.
//!
//! The teacher never exposes its own Prometheus metrics (`healer::prometheus`
//! only *queries* an external Prometheus), so there is no hand-formatting
//! template to copy for the export side; the exposition text here follows
//! the standard Prometheus text format directly.

use std::sync::atomic::{AtomicU64, Ordering};

const ENGINES: &[&str] = &[
    "scanner",
    "collector",
    "classifier",
    "analyzer",
    "impact",
    "reachability",
    "notification",
];

/// One counter pair (ticks, items processed) per engine.
pub struct EngineMetrics {
    ticks: Vec<AtomicU64>,
    processed: Vec<AtomicU64>,
    errors: Vec<AtomicU64>,
}

impl Default for EngineMetrics {
    fn default() -> Self {
        Self::new()
    }
}

impl EngineMetrics {
    #[must_use]
    pub fn new() -> Self {
        Self {
            ticks: ENGINES.iter().map(|_| AtomicU64::new(0)).collect(),
            processed: ENGINES.iter().map(|_| AtomicU64::new(0)).collect(),
            errors: ENGINES.iter().map(|_| AtomicU64::new(0)).collect(),
        }
    }

    fn index_of(name: &str) -> Option<usize> {
        ENGINES.iter().position(|candidate| *candidate == name)
    }

    /// Record a successful tick that processed `count` items.
    pub fn record_tick(&self, engine: &str, count: usize) {
        let Some(i) = Self::index_of(engine) else {
            return;
        };
        self.ticks[i].fetch_add(1, Ordering::Relaxed);
        self.processed[i].fetch_add(count as u64, Ordering::Relaxed);
    }

    /// Record a failed tick.
    pub fn record_error(&self, engine: &str) {
        let Some(i) = Self::index_of(engine) else {
            return;
        };
        self.errors[i].fetch_add(1, Ordering::Relaxed);
    }

    /// Render all counters as Prometheus text exposition format.
    #[must_use]
    pub fn render(&self) -> String {
        let mut out = String::new();
        out.push_str("# HELP vulnsentinel_engine_ticks_total Scheduler ticks run per engine.\n");
        out.push_str("# TYPE vulnsentinel_engine_ticks_total counter\n");
        for (name, counter) in ENGINES.iter().zip(&self.ticks) {
            out.push_str(&format!(
                "vulnsentinel_engine_ticks_total{{engine=\"{name}\"}} {}\n",
                counter.load(Ordering::Relaxed)
            ));
        }
        out.push_str("# HELP vulnsentinel_engine_processed_total Items processed per engine.\n");
        out.push_str("# TYPE vulnsentinel_engine_processed_total counter\n");
        for (name, counter) in ENGINES.iter().zip(&self.processed) {
            out.push_str(&format!(
                "vulnsentinel_engine_processed_total{{engine=\"{name}\"}} {}\n",
                counter.load(Ordering::Relaxed)
            ));
        }
        out.push_str("# HELP vulnsentinel_engine_errors_total Failed ticks per engine.\n");
        out.push_str("# TYPE vulnsentinel_engine_errors_total counter\n");
        for (name, counter) in ENGINES.iter().zip(&self.errors) {
            out.push_str(&format!(
                "vulnsentinel_engine_errors_total{{engine=\"{name}\"}} {}\n",
                counter.load(Ordering::Relaxed)
            ));
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn records_ticks_and_renders_prometheus_text() {
        let metrics = EngineMetrics::new();
        metrics.record_tick("scanner", 3);
        metrics.record_tick("scanner", 2);
        metrics.record_error("collector");

        let rendered = metrics.render();
        assert!(rendered.contains("vulnsentinel_engine_ticks_total{engine=\"scanner\"} 2"));
        assert!(rendered.contains("vulnsentinel_engine_processed_total{engine=\"scanner\"} 5"));
        assert!(rendered.contains("vulnsentinel_engine_errors_total{engine=\"collector\"} 1"));
    }

    #[test]
    fn ignores_unknown_engine_names() {
        let metrics = EngineMetrics::new();
        metrics.record_tick("not-a-real-engine", 1);
        assert!(!metrics.render().contains("not-a-real-engine"));
    }
}
