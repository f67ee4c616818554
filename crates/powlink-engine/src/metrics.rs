use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

/// Counters recorded around every engine invocation.
///
/// Timing is surfaced here as a metric rather than a log line; readers take
/// a [`MetricsSnapshot`] whenever they need a consistent-enough view.
#[derive(Debug, Default)]
pub struct EngineMetrics {
    calls: AtomicU64,
    errors: AtomicU64,
    in_flight: AtomicU64,
    busy_micros: AtomicU64,
    last_micros: AtomicU64,
}

impl EngineMetrics {
    pub(crate) fn enter(&self) {
        self.in_flight.fetch_add(1, Ordering::SeqCst);
    }

    pub(crate) fn exit(&self, elapsed: Duration, failed: bool) {
        let micros = elapsed.as_micros().min(u128::from(u64::MAX)) as u64;
        self.busy_micros.fetch_add(micros, Ordering::Relaxed);
        self.last_micros.store(micros, Ordering::Relaxed);
        self.calls.fetch_add(1, Ordering::Relaxed);
        if failed {
            self.errors.fetch_add(1, Ordering::Relaxed);
        }
        self.in_flight.fetch_sub(1, Ordering::SeqCst);
    }

    /// Number of engine calls currently executing (0 or 1 by construction).
    pub fn in_flight(&self) -> u64 {
        self.in_flight.load(Ordering::SeqCst)
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            calls: self.calls.load(Ordering::Relaxed),
            errors: self.errors.load(Ordering::Relaxed),
            in_flight: self.in_flight.load(Ordering::SeqCst),
            busy: Duration::from_micros(self.busy_micros.load(Ordering::Relaxed)),
            last: Duration::from_micros(self.last_micros.load(Ordering::Relaxed)),
        }
    }
}

/// Point-in-time view of [`EngineMetrics`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MetricsSnapshot {
    /// Completed engine calls.
    pub calls: u64,
    /// Completed calls that returned an error.
    pub errors: u64,
    /// Calls currently inside the engine.
    pub in_flight: u64,
    /// Total wall time spent inside the engine.
    pub busy: Duration,
    /// Wall time of the most recent call.
    pub last: Duration,
}
