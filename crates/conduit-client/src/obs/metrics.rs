//! Metrics registry for the client harness.
//!
//! Counter/gauge/histogram types with dynamic labels backed by `DashMap`.
//! Labels are flattened into sorted key vectors to keep deterministic ordering.
//! Histogram buckets are fixed in milliseconds; remote calls in this harness
//! routinely take seconds.

use dashmap::DashMap;
use std::fmt::Write;
use std::sync::atomic::{AtomicBool, AtomicI64, AtomicU64, Ordering};
use std::time::Duration;

type LabelKey = Vec<(String, String)>;

fn label_key(labels: &[(&str, &str)]) -> LabelKey {
    let mut key: LabelKey = labels
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    key.sort();
    key
}

/// Helper to escape label values.
fn escape_label(v: &str) -> String {
    v.replace('\\', "\\\\").replace('"', "\\\"").replace('\n', "\\n")
}

fn render_labels(key: &LabelKey) -> String {
    key.iter()
        .map(|(k, v)| format!("{}=\"{}\"", k, escape_label(v)))
        .collect::<Vec<_>>()
        .join(",")
}

fn write_sample(out: &mut String, name: &str, labels: &str, val: impl std::fmt::Display) {
    if labels.is_empty() {
        let _ = writeln!(out, "{} {}", name, val);
    } else {
        let _ = writeln!(out, "{}{{{}}} {}", name, labels, val);
    }
}

#[derive(Default)]
pub struct CounterVec {
    map: DashMap<LabelKey, AtomicU64>,
}

impl CounterVec {
    /// Increment by 1.
    pub fn inc(&self, labels: &[(&str, &str)]) {
        self.add(labels, 1);
    }

    pub fn add(&self, labels: &[(&str, &str)], v: u64) {
        let counter = self
            .map
            .entry(label_key(labels))
            .or_insert_with(|| AtomicU64::new(0));
        counter.fetch_add(v, Ordering::Relaxed);
    }

    /// Current value for an exact label set (0 if never touched).
    pub fn get(&self, labels: &[(&str, &str)]) -> u64 {
        self.map
            .get(&label_key(labels))
            .map(|c| c.load(Ordering::Relaxed))
            .unwrap_or(0)
    }

    /// Sum across every label set.
    pub fn total(&self) -> u64 {
        self.map.iter().map(|r| r.value().load(Ordering::Relaxed)).sum()
    }

    fn render(&self, name: &str, out: &mut String) {
        let _ = writeln!(out, "# TYPE {} counter", name);
        for r in self.map.iter() {
            write_sample(out, name, &render_labels(r.key()), r.value().load(Ordering::Relaxed));
        }
    }
}

#[derive(Default)]
pub struct GaugeVec {
    map: DashMap<LabelKey, AtomicI64>,
}

impl GaugeVec {
    /// Overwrite with the latest observation.
    pub fn set(&self, labels: &[(&str, &str)], v: i64) {
        let gauge = self
            .map
            .entry(label_key(labels))
            .or_insert_with(|| AtomicI64::new(0));
        gauge.store(v, Ordering::Relaxed);
    }

    pub fn get(&self, labels: &[(&str, &str)]) -> i64 {
        self.map
            .get(&label_key(labels))
            .map(|g| g.load(Ordering::Relaxed))
            .unwrap_or(0)
    }

    fn render(&self, name: &str, out: &mut String) {
        let _ = writeln!(out, "# TYPE {} gauge", name);
        for r in self.map.iter() {
            write_sample(out, name, &render_labels(r.key()), r.value().load(Ordering::Relaxed));
        }
    }
}

// 5ms .. 30s
const BUCKETS_MILLIS: [u64; 12] = [5, 10, 25, 50, 100, 250, 500, 1_000, 2_500, 5_000, 10_000, 30_000];

#[derive(Default)]
struct AtomicHistogram {
    count: AtomicU64,
    sum: AtomicU64,
    buckets: [AtomicU64; 12],
}

#[derive(Default)]
pub struct HistogramVec {
    map: DashMap<LabelKey, AtomicHistogram>,
}

impl HistogramVec {
    /// Observe a duration and increment cumulative buckets (millisecond scale).
    pub fn observe(&self, labels: &[(&str, &str)], duration: Duration) {
        let hist = self
            .map
            .entry(label_key(labels))
            .or_insert_with(AtomicHistogram::default);
        let millis = u64::try_from(duration.as_millis()).unwrap_or(u64::MAX);

        hist.count.fetch_add(1, Ordering::Relaxed);
        hist.sum.fetch_add(millis, Ordering::Relaxed);

        for (i, &b) in BUCKETS_MILLIS.iter().enumerate() {
            if millis <= b {
                hist.buckets[i].fetch_add(1, Ordering::Relaxed);
            }
        }
    }

    /// Number of observations for an exact label set.
    pub fn count(&self, labels: &[(&str, &str)]) -> u64 {
        self.map
            .get(&label_key(labels))
            .map(|h| h.count.load(Ordering::Relaxed))
            .unwrap_or(0)
    }

    fn render(&self, name: &str, out: &mut String) {
        let _ = writeln!(out, "# TYPE {} histogram", name);
        for r in self.map.iter() {
            let hist = r.value();
            let label_str = render_labels(r.key());
            let prefix = if label_str.is_empty() { String::new() } else { format!("{},", label_str) };

            for (i, &le) in BUCKETS_MILLIS.iter().enumerate() {
                let count = hist.buckets[i].load(Ordering::Relaxed);
                let _ = writeln!(out, "{}_bucket{{{}le=\"{}\"}} {}", name, prefix, le, count);
            }
            let count = hist.count.load(Ordering::Relaxed);
            let _ = writeln!(out, "{}_bucket{{{}le=\"+Inf\"}} {}", name, prefix, count);

            let sum = hist.sum.load(Ordering::Relaxed);
            write_sample(out, &format!("{name}_sum"), &label_str, sum);
            write_sample(out, &format!("{name}_count"), &label_str, count);
        }
    }
}

#[derive(Default)]
pub struct ClientMetrics {
    /// Outbound request attempts, labelled by `outcome`.
    pub requests: CounterVec,
    pub request_duration: HistogramVec, // In Milliseconds
    /// Requests not scheduled because the pending-task cap was reached.
    pub requests_skipped: CounterVec,
    /// Last-read desired concurrency.
    pub concurrency: GaugeVec,
    pub annotations: CounterVec,
    pub annotation_failures: CounterVec,
    pub annotations_dropped: CounterVec,
    pub settings_read_errors: CounterVec,
    draining: AtomicBool,
}

impl ClientMetrics {
    pub fn set_draining(&self) { self.draining.store(true, Ordering::Relaxed); }
    pub fn is_draining(&self) -> bool { self.draining.load(Ordering::Relaxed) }

    /// Render all registered metrics plus any extra lines provided by callers.
    pub fn render(&self, extra: &[(&str, i64)]) -> String {
        let mut out = String::new();
        self.requests.render("conduit_client_requests_total", &mut out);
        self.request_duration.render("conduit_client_request_duration_millis", &mut out);
        self.requests_skipped.render("conduit_client_requests_skipped_total", &mut out);
        self.concurrency.render("conduit_client_requests_concurrency", &mut out);
        self.annotations.render("conduit_annotations_total", &mut out);
        self.annotation_failures.render("conduit_annotation_failures_total", &mut out);
        self.annotations_dropped.render("conduit_annotations_dropped_total", &mut out);
        self.settings_read_errors.render("conduit_settings_read_errors_total", &mut out);

        let _ = writeln!(out, "# TYPE conduit_draining gauge\nconduit_draining {}", if self.is_draining() { 1 } else { 0 });
        for (k, v) in extra { let _ = writeln!(out, "{} {}", k, v); }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn labels_are_order_independent() {
        let c = CounterVec::default();
        c.inc(&[("a", "1"), ("b", "2")]);
        c.inc(&[("b", "2"), ("a", "1")]);
        assert_eq!(c.get(&[("a", "1"), ("b", "2")]), 2);
        assert_eq!(c.total(), 2);
    }

    #[test]
    fn histogram_buckets_are_cumulative() {
        let h = HistogramVec::default();
        h.observe(&[("outcome", "success")], Duration::from_millis(40));
        let mut out = String::new();
        h.render("d", &mut out);
        assert!(out.contains("d_bucket{outcome=\"success\",le=\"25\"} 0"));
        assert!(out.contains("d_bucket{outcome=\"success\",le=\"50\"} 1"));
        assert!(out.contains("d_bucket{outcome=\"success\",le=\"+Inf\"} 1"));
        assert!(out.contains("d_sum{outcome=\"success\"} 40"));
    }

    #[test]
    fn render_includes_gauge_and_extra() {
        let m = ClientMetrics::default();
        m.concurrency.set(&[], 5);
        let out = m.render(&[("conduit_client_requests_in_flight", 2)]);
        assert!(out.contains("conduit_client_requests_concurrency 5"));
        assert!(out.contains("conduit_client_requests_in_flight 2"));
        assert!(out.contains("conduit_draining 0"));
    }
}
