//! Lightweight runtime metrics for generate and download actions
//!
//! Recording is a no-op until [`enable`] is called. Once enabled, a summary
//! of each window is logged through `tracing` every `interval_secs`.

use serde::Serialize;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, OnceLock};
use std::time::{Duration, Instant};
use tokio::time::{self, MissedTickBehavior};
use tracing::info;

static METRICS: OnceLock<Arc<MetricsInner>> = OnceLock::new();

/// User-triggered action being measured
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Operation {
    /// Render request against the remote service
    Generate,
    /// Fetch-and-save of a rendered image
    Download,
}

/// Enable periodic metrics emission with the provided interval in seconds.
///
/// Must be called from within a Tokio runtime.
pub fn enable(interval_secs: u64) {
    let interval = interval_secs.max(5);
    let inner = Arc::clone(METRICS.get_or_init(|| Arc::new(MetricsInner::new(interval))));
    inner.update_interval(interval);
    inner.ensure_task();
}

/// Whether [`enable`] has been called
pub fn is_enabled() -> bool {
    METRICS.get().is_some()
}

/// Record the outcome of one action.
pub fn record(operation: Operation, duration: Duration, success: bool) {
    if let Some(inner) = METRICS.get() {
        inner.record(operation, duration, success);
    }
}

/// Counters accumulated since the last window rolled over, if enabled.
pub fn snapshot() -> Option<MetricsSnapshot> {
    METRICS.get().map(|inner| inner.snapshot_current())
}

struct MetricsInner {
    state: Mutex<MetricsState>,
    interval_secs: AtomicU64,
    task_spawned: AtomicBool,
}

impl MetricsInner {
    fn new(interval_secs: u64) -> Self {
        Self {
            state: Mutex::new(MetricsState::new()),
            interval_secs: AtomicU64::new(interval_secs.max(5)),
            task_spawned: AtomicBool::new(false),
        }
    }

    fn update_interval(&self, interval_secs: u64) {
        self.interval_secs
            .store(interval_secs.max(5), Ordering::Relaxed);
    }

    fn ensure_task(self: &Arc<Self>) {
        if self
            .task_spawned
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_ok()
        {
            let runner = Arc::clone(self);
            tokio::spawn(async move {
                runner.run().await;
            });
        }
    }

    fn record(&self, operation: Operation, duration: Duration, success: bool) {
        let mut state = self.state.lock().expect("metrics mutex poisoned");
        let counters = match operation {
            Operation::Generate => &mut state.generate,
            Operation::Download => &mut state.download,
        };
        if success {
            counters.successes += 1;
            counters.success_duration += duration;
        } else {
            counters.failures += 1;
        }
    }

    fn snapshot_current(&self) -> MetricsSnapshot {
        let state = self.state.lock().expect("metrics mutex poisoned");
        state.snapshot()
    }

    fn snapshot_and_reset(&self) -> MetricsSnapshot {
        let mut state = self.state.lock().expect("metrics mutex poisoned");
        let snapshot = state.snapshot();
        *state = MetricsState::new();
        snapshot
    }

    async fn run(self: Arc<Self>) {
        let mut current_secs = self.interval_secs.load(Ordering::Relaxed).max(5);
        loop {
            let mut ticker = time::interval(Duration::from_secs(current_secs));
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            // First tick fires immediately; skip it so a window is a full interval.
            ticker.tick().await;

            loop {
                ticker.tick().await;
                let snapshot = self.snapshot_and_reset();
                if snapshot.generate.attempts() + snapshot.download.attempts() > 0 {
                    log_snapshot(&snapshot);
                }

                let next_secs = self.interval_secs.load(Ordering::Relaxed).max(5);
                if next_secs != current_secs {
                    current_secs = next_secs;
                    break;
                }
            }
        }
    }
}

struct MetricsState {
    generate: Counters,
    download: Counters,
    window_start: Instant,
}

impl MetricsState {
    fn new() -> Self {
        Self {
            generate: Counters::default(),
            download: Counters::default(),
            window_start: Instant::now(),
        }
    }

    fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            window_secs: self.window_start.elapsed().as_secs(),
            generate: self.generate.snapshot(),
            download: self.download.snapshot(),
        }
    }
}

#[derive(Default)]
struct Counters {
    successes: u64,
    failures: u64,
    success_duration: Duration,
}

impl Counters {
    fn snapshot(&self) -> OperationSnapshot {
        let avg_latency_ms = if self.successes == 0 {
            0.0
        } else {
            self.success_duration.as_secs_f64() * 1_000.0 / self.successes as f64
        };
        OperationSnapshot {
            successes: self.successes,
            failures: self.failures,
            avg_latency_ms,
        }
    }
}

/// Aggregated counters for one metrics window
#[derive(Debug, Clone, Serialize)]
pub struct MetricsSnapshot {
    /// Seconds since the window opened
    pub window_secs: u64,
    /// Generate action counters
    pub generate: OperationSnapshot,
    /// Download action counters
    pub download: OperationSnapshot,
}

/// Counters for a single operation kind
#[derive(Debug, Clone, Serialize)]
pub struct OperationSnapshot {
    /// Completed successfully
    pub successes: u64,
    /// Ended in an error
    pub failures: u64,
    /// Mean latency of successful attempts
    pub avg_latency_ms: f64,
}

impl OperationSnapshot {
    /// Successes plus failures
    pub fn attempts(&self) -> u64 {
        self.successes + self.failures
    }
}

fn log_snapshot(snapshot: &MetricsSnapshot) {
    for (operation, counters) in [
        (Operation::Generate, &snapshot.generate),
        (Operation::Download, &snapshot.download),
    ] {
        if counters.attempts() == 0 {
            continue;
        }
        let success_rate = counters.successes as f64 / counters.attempts() as f64 * 100.0;
        info!(
            target: "qrgen::metrics",
            ?operation,
            interval_secs = snapshot.window_secs,
            success_count = counters.successes,
            failure_count = counters.failures,
            avg_latency_ms = counters.avg_latency_ms,
            success_rate = format_args!("{success_rate:.1}%"),
            "Metrics window"
        );
    }
}
