//! Monotonic frame clock
//!
//! Fade progress is computed from this clock, never from wall-clock time,
//! so system clock changes cannot skew a ramp. The manual variant is the
//! test driver: tests move time explicitly and observe each frame.

use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

#[derive(Clone)]
pub struct FrameClock {
    inner: Arc<ClockInner>,
}

enum ClockInner {
    Monotonic { epoch: Instant },
    Manual { now: Mutex<Duration> },
}

impl FrameClock {
    /// Clock backed by `Instant`; time advances on its own
    pub fn monotonic() -> Self {
        Self {
            inner: Arc::new(ClockInner::Monotonic {
                epoch: Instant::now(),
            }),
        }
    }

    /// Clock that only moves when [`advance`](Self::advance) is called
    pub fn manual() -> Self {
        Self {
            inner: Arc::new(ClockInner::Manual {
                now: Mutex::new(Duration::ZERO),
            }),
        }
    }

    pub fn now(&self) -> Duration {
        match &*self.inner {
            ClockInner::Monotonic { epoch } => epoch.elapsed(),
            ClockInner::Manual { now } => *now.lock().unwrap_or_else(|p| p.into_inner()),
        }
    }

    /// Move a manual clock forward; ignored (with a warning) on a monotonic
    /// clock, which advances by itself
    pub fn advance(&self, delta: Duration) {
        match &*self.inner {
            ClockInner::Monotonic { .. } => {
                log::warn!("advance() called on a monotonic clock; ignored");
            }
            ClockInner::Manual { now } => {
                let mut now = now.lock().unwrap_or_else(|p| p.into_inner());
                *now += delta;
            }
        }
    }

    pub fn is_manual(&self) -> bool {
        matches!(&*self.inner, ClockInner::Manual { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn manual_clock_moves_only_on_advance() {
        let clock = FrameClock::manual();
        assert_eq!(clock.now(), Duration::ZERO);

        clock.advance(Duration::from_millis(150));
        assert_eq!(clock.now(), Duration::from_millis(150));

        clock.advance(Duration::from_millis(150));
        assert_eq!(clock.now(), Duration::from_millis(300));
    }

    #[test]
    fn monotonic_clock_never_runs_backwards() {
        let clock = FrameClock::monotonic();
        let first = clock.now();
        let second = clock.now();
        assert!(second >= first);
    }
}
