use std::sync::{Arc, OnceLock};

use prometheus::{CounterVec, Encoder, HistogramOpts, HistogramVec, Opts, Registry, TextEncoder};

#[derive(Clone, Debug)]
pub struct MetricsRegistry {
    inner: Arc<MetricsInner>,
}

#[derive(Debug)]
struct MetricsInner {
    registry: Registry,
    jobs_submitted: CounterVec,
    tasks_dispatched: CounterVec,
    dispatch_failures: CounterVec,
    dispatch_send_seconds: HistogramVec,
}

impl MetricsRegistry {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(MetricsInner::new()),
        }
    }

    /// `kind` is the request kind, `query` or `metadata`.
    pub fn inc_jobs_submitted(&self, kind: &str) {
        self.inner.jobs_submitted.with_label_values(&[kind]).inc();
    }

    pub fn record_task_dispatch(&self, task_type: &str, secs: f64) {
        self.inner
            .tasks_dispatched
            .with_label_values(&[task_type])
            .inc();
        self.inner
            .dispatch_send_seconds
            .with_label_values(&[task_type])
            .observe(secs.max(0.0));
    }

    pub fn inc_dispatch_failures(&self, task_type: &str) {
        self.inner
            .dispatch_failures
            .with_label_values(&[task_type])
            .inc();
    }

    pub fn render_prometheus(&self) -> String {
        let metric_families = self.inner.registry.gather();
        let mut out = Vec::new();
        let enc = TextEncoder::new();
        if enc.encode(&metric_families, &mut out).is_err() {
            return String::new();
        }
        String::from_utf8_lossy(&out).to_string()
    }
}

impl Default for MetricsRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl MetricsInner {
    fn new() -> Self {
        let registry = Registry::new();

        let jobs_submitted = counter_vec(
            &registry,
            "shardq_jobs_submitted_total",
            "Jobs registered by the job manager",
            &["kind"],
        );
        let tasks_dispatched = counter_vec(
            &registry,
            "shardq_tasks_dispatched_total",
            "Task requests handed to the transport",
            &["task_type"],
        );
        let dispatch_failures = counter_vec(
            &registry,
            "shardq_dispatch_failures_total",
            "Task requests the transport rejected",
            &["task_type"],
        );
        let dispatch_send_seconds = histogram_vec(
            &registry,
            "shardq_dispatch_send_seconds",
            "Time spent in task request sends",
            &["task_type"],
        );

        Self {
            registry,
            jobs_submitted,
            tasks_dispatched,
            dispatch_failures,
            dispatch_send_seconds,
        }
    }
}

fn counter_vec(registry: &Registry, name: &str, help: &str, labels: &[&str]) -> CounterVec {
    let c = CounterVec::new(Opts::new(name, help), labels).expect("counter vec");
    registry
        .register(Box::new(c.clone()))
        .expect("register counter");
    c
}

fn histogram_vec(registry: &Registry, name: &str, help: &str, labels: &[&str]) -> HistogramVec {
    let h = HistogramVec::new(HistogramOpts::new(name, help), labels).expect("histogram vec");
    registry
        .register(Box::new(h.clone()))
        .expect("register histogram");
    h
}

static GLOBAL_METRICS: OnceLock<MetricsRegistry> = OnceLock::new();

pub fn global_metrics() -> &'static MetricsRegistry {
    GLOBAL_METRICS.get_or_init(MetricsRegistry::new)
}
