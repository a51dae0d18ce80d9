//! Per-driver counters.
//!
//! [`DriverMetrics`] accumulates over the driver's lifetime and is read
//! through [`InferenceDriver::metrics`](crate::InferenceDriver::metrics).

/// Counters and the latest timing sample for a driver.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DriverMetrics {
    /// Cycles executed, including those whose invoke failed.
    pub cycles_attempted: u64,
    /// Cycles that reported a result line.
    pub cycles_reported: u64,
    /// Cycles whose forward pass failed.
    pub invoke_failures: u64,
    /// Duration of the most recent successful invoke, in microseconds.
    pub last_invoke_us: u64,
    /// Arena bytes taken by the most recent successful setup.
    pub arena_used_bytes: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_metrics_are_zero() {
        let m = DriverMetrics::default();
        assert_eq!(m.cycles_attempted, 0);
        assert_eq!(m.cycles_reported, 0);
        assert_eq!(m.invoke_failures, 0);
        assert_eq!(m.last_invoke_us, 0);
        assert_eq!(m.arena_used_bytes, 0);
    }
}
