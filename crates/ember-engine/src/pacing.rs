//! Cycle pacing.
//!
//! The driver pauses once after every executed cycle. The pause blocks
//! the calling thread; there is nothing else to do until the next cycle.

use std::time::Duration;

/// Blocks between cycles.
pub trait Pacer {
    /// Pause for `interval`.
    fn pause(&mut self, interval: Duration);
}

impl<P: Pacer + ?Sized> Pacer for &mut P {
    fn pause(&mut self, interval: Duration) {
        (**self).pause(interval);
    }
}

/// Sleeps the current thread for the full interval.
#[derive(Clone, Copy, Debug, Default)]
pub struct BlockingPacer;

impl Pacer for BlockingPacer {
    fn pause(&mut self, interval: Duration) {
        if !interval.is_zero() {
            std::thread::sleep(interval);
        }
    }
}

/// Returns immediately. For benchmarks and tests.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoPacing;

impl Pacer for NoPacing {
    fn pause(&mut self, _interval: Duration) {}
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Instant;

    #[test]
    fn blocking_pacer_waits_at_least_interval() {
        let start = Instant::now();
        BlockingPacer.pause(Duration::from_millis(5));
        assert!(start.elapsed() >= Duration::from_millis(5));
    }

    #[test]
    fn no_pacing_returns_immediately() {
        let start = Instant::now();
        NoPacing.pause(Duration::from_secs(60));
        assert!(start.elapsed() < Duration::from_secs(1));
    }
}
