use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use serde::Serialize;

/// Shared counters for one factory. Cloning hands out another handle to the
/// same counters, so station workers can record into it concurrently.
#[derive(Clone, Default)]
pub struct MetricsRegistry {
    inner: Arc<MetricsInner>,
}

#[derive(Default)]
struct MetricsInner {
    items_enqueued: AtomicU64,
    items_processed: AtomicU64,
    items_completed: AtomicU64,
    rounds: AtomicU64,
    simulated_ms: AtomicU64,
}

impl MetricsRegistry {
    pub fn inc_items_enqueued(&self, delta: u64) {
        self.inner.items_enqueued.fetch_add(delta, Ordering::Relaxed);
    }

    pub fn inc_items_processed(&self, delta: u64) {
        self.inner.items_processed.fetch_add(delta, Ordering::Relaxed);
    }

    pub fn inc_items_completed(&self, delta: u64) {
        self.inner.items_completed.fetch_add(delta, Ordering::Relaxed);
    }

    pub fn inc_rounds(&self, delta: u64) {
        self.inner.rounds.fetch_add(delta, Ordering::Relaxed);
    }

    /// Adds simulated processing time, truncated to whole milliseconds.
    pub fn add_simulated_secs(&self, secs: f64) {
        if secs.is_finite() && secs > 0.0 {
            let ms = (secs * 1_000.0) as u64;
            self.inner.simulated_ms.fetch_add(ms, Ordering::Relaxed);
        }
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            items_enqueued: self.inner.items_enqueued.load(Ordering::Relaxed),
            items_processed: self.inner.items_processed.load(Ordering::Relaxed),
            items_completed: self.inner.items_completed.load(Ordering::Relaxed),
            rounds: self.inner.rounds.load(Ordering::Relaxed),
            simulated_ms: self.inner.simulated_ms.load(Ordering::Relaxed),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
pub struct MetricsSnapshot {
    pub items_enqueued: u64,
    pub items_processed: u64,
    pub items_completed: u64,
    /// Sequential rounds only; concurrent runs have no rounds and leave it at 0.
    pub rounds: u64,
    pub simulated_ms: u64,
}

impl MetricsSnapshot {
    pub fn to_json_line(&self, label: &str, elapsed: Option<Duration>) -> String {
        #[derive(Serialize)]
        struct Snapshot<'a> {
            label: &'a str,
            items_enqueued: u64,
            items_processed: u64,
            items_completed: u64,
            rounds: u64,
            simulated_ms: u64,
            elapsed_ms: Option<u128>,
        }

        let payload = Snapshot {
            label,
            items_enqueued: self.items_enqueued,
            items_processed: self.items_processed,
            items_completed: self.items_completed,
            rounds: self.rounds,
            simulated_ms: self.simulated_ms,
            elapsed_ms: elapsed.map(|d| d.as_millis()),
        };
        serde_json::to_string(&payload).unwrap_or_else(|_| String::from("{}"))
    }
}

/// Wall-clock timer for a whole pipeline run.
pub struct RunTimer {
    start: Instant,
}

impl RunTimer {
    pub fn start() -> Self {
        Self { start: Instant::now() }
    }

    pub fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }
}
