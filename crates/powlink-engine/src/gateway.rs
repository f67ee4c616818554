use std::sync::Mutex;
use std::time::Instant;

use tracing::debug;

use crate::error::{EngineError, Result};
use crate::metrics::EngineMetrics;
use crate::trytes::Trytes;

/// The proof-of-work capability all engine variants share.
///
/// Hardware drivers, the software fallback, and remote bridges all present
/// this one signature; the implementation is picked once at startup.
pub trait PowEngine: Send {
    /// Engine family identifier, e.g. `"Curl"` or `"PiDiver"`.
    fn engine_type(&self) -> &str;

    /// Engine version string; arbitrary UTF-8 chosen by the implementation.
    fn engine_version(&self) -> &str;

    /// Find a nonce for `input` at the requested difficulty.
    fn pow(&self, input: &Trytes, difficulty: u8) -> Result<Trytes>;
}

impl std::fmt::Debug for dyn PowEngine + '_ {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PowEngine")
            .field("engine_type", &self.engine_type())
            .field("engine_version", &self.engine_version())
            .finish()
    }
}

/// Cached engine identity, captured once at gateway construction so
/// metadata reads never touch the engine mutex.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineDescriptor {
    pub engine_type: String,
    pub engine_version: String,
}

/// Serialized access to the process-wide engine slot.
///
/// The engine can execute exactly one job at a time; every call funnels
/// through one mutex, released on every exit path. The slot is set at
/// construction and never replaced.
pub struct EngineGateway {
    slot: Mutex<Option<Box<dyn PowEngine>>>,
    descriptor: EngineDescriptor,
    metrics: EngineMetrics,
}

impl EngineGateway {
    /// Build a gateway around a configured engine.
    pub fn new(engine: Box<dyn PowEngine>) -> Self {
        let descriptor = EngineDescriptor {
            engine_type: engine.engine_type().to_string(),
            engine_version: engine.engine_version().to_string(),
        };
        Self {
            slot: Mutex::new(Some(engine)),
            descriptor,
            metrics: EngineMetrics::default(),
        }
    }

    /// Build a gateway with an empty slot; every `execute` fails with
    /// [`EngineError::Unavailable`].
    pub fn unconfigured() -> Self {
        Self {
            slot: Mutex::new(None),
            descriptor: EngineDescriptor {
                engine_type: "unconfigured".to_string(),
                engine_version: String::new(),
            },
            metrics: EngineMetrics::default(),
        }
    }

    /// The cached engine identity.
    pub fn descriptor(&self) -> &EngineDescriptor {
        &self.descriptor
    }

    /// Call counters and timing.
    pub fn metrics(&self) -> &EngineMetrics {
        &self.metrics
    }

    /// Run one job through the engine, holding the global mutex for the
    /// duration of the call.
    pub fn execute(&self, input: &Trytes, difficulty: u8) -> Result<Trytes> {
        let slot = self.slot.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        let engine = slot.as_ref().ok_or(EngineError::Unavailable)?;

        debug!(difficulty, "starting pow");
        self.metrics.enter();
        let started = Instant::now();
        let result = engine.pow(input, difficulty);
        let elapsed = started.elapsed();
        self.metrics.exit(elapsed, result.is_err());
        debug!(elapsed_ms = elapsed.as_millis() as u64, "finished pow");

        result
    }
}

impl std::fmt::Debug for EngineGateway {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EngineGateway")
            .field("descriptor", &self.descriptor)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicU64, Ordering};
    use std::sync::Arc;
    use std::time::Duration;

    use super::*;

    struct ProbeEngine {
        active: Arc<AtomicU64>,
        max_seen: Arc<AtomicU64>,
        calls: Arc<AtomicU64>,
        fail: bool,
    }

    impl PowEngine for ProbeEngine {
        fn engine_type(&self) -> &str {
            "Probe"
        }

        fn engine_version(&self) -> &str {
            "1.0"
        }

        fn pow(&self, input: &Trytes, _difficulty: u8) -> Result<Trytes> {
            let now = self.active.fetch_add(1, Ordering::SeqCst) + 1;
            self.max_seen.fetch_max(now, Ordering::SeqCst);
            std::thread::sleep(Duration::from_millis(2));
            self.active.fetch_sub(1, Ordering::SeqCst);
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                Err(EngineError::Failure("probe failure".to_string()))
            } else {
                Ok(input.clone())
            }
        }
    }

    fn probe_gateway(fail: bool) -> (Arc<EngineGateway>, Arc<AtomicU64>, Arc<AtomicU64>) {
        let max_seen = Arc::new(AtomicU64::new(0));
        let calls = Arc::new(AtomicU64::new(0));
        let engine = ProbeEngine {
            active: Arc::new(AtomicU64::new(0)),
            max_seen: Arc::clone(&max_seen),
            calls: Arc::clone(&calls),
            fail,
        };
        (Arc::new(EngineGateway::new(Box::new(engine))), max_seen, calls)
    }

    #[test]
    fn descriptor_is_cached_at_construction() {
        let (gateway, _, _) = probe_gateway(false);
        assert_eq!(gateway.descriptor().engine_type, "Probe");
        assert_eq!(gateway.descriptor().engine_version, "1.0");
    }

    #[test]
    fn unconfigured_slot_is_unavailable() {
        let gateway = EngineGateway::unconfigured();
        let input = Trytes::try_from("ABC").unwrap();
        let err = gateway.execute(&input, 1).unwrap_err();
        assert!(matches!(err, EngineError::Unavailable));
    }

    #[test]
    fn at_most_one_invocation_in_flight() {
        let (gateway, max_seen, calls) = probe_gateway(false);
        let input = Trytes::try_from("MUTEX").unwrap();

        let mut handles = Vec::new();
        for _ in 0..8 {
            let gateway = Arc::clone(&gateway);
            let input = input.clone();
            handles.push(std::thread::spawn(move || {
                gateway.execute(&input, 1).unwrap();
            }));
        }
        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(max_seen.load(Ordering::SeqCst), 1);
        assert_eq!(calls.load(Ordering::SeqCst), 8);
        assert_eq!(gateway.metrics().snapshot().calls, 8);
    }

    #[test]
    fn engine_error_is_propagated_and_the_mutex_released() {
        let (gateway, _, _) = probe_gateway(true);
        let input = Trytes::try_from("FAIL").unwrap();

        let err = gateway.execute(&input, 1).unwrap_err();
        assert!(matches!(err, EngineError::Failure(_)));

        // A second call still reaches the engine: the lock was released.
        let err = gateway.execute(&input, 1).unwrap_err();
        assert!(matches!(err, EngineError::Failure(_)));
        assert_eq!(gateway.metrics().snapshot().errors, 2);
    }

    #[test]
    fn timing_is_recorded() {
        let (gateway, _, _) = probe_gateway(false);
        let input = Trytes::try_from("TIME").unwrap();
        gateway.execute(&input, 1).unwrap();

        let snapshot = gateway.metrics().snapshot();
        assert_eq!(snapshot.calls, 1);
        assert!(snapshot.last >= Duration::from_millis(2));
    }
}
