//! Runtime statistics for the sampling loop.
//!
//! Counters are bumped by the loop as it goes and reported through the
//! event sink periodically and once more when the loop ends.

use core::fmt;

/// Cumulative counters since the loop started.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunStats {
    /// Completed or attempted loop iterations.
    pub iterations: u64,
    /// Setpoints successfully written to hardware.
    pub writes: u64,
    /// Bindings skipped because the store failed.
    pub store_failures: u64,
    /// Bindings skipped because the key was missing or malformed.
    pub parse_failures: u64,
    /// Bindings skipped because the value was out of range.
    pub validation_faults: u64,
    /// Writes that failed with a transient hardware error.
    pub hardware_retries: u64,
    /// Milliseconds the loop has been running.
    pub uptime_ms: u64,
}

impl RunStats {
    /// Bindings processed without a write, for any reason.
    pub fn skipped(&self) -> u64 {
        self.store_failures + self.parse_failures + self.validation_faults + self.hardware_retries
    }

    /// Loop iterations per second over the whole run.
    pub fn iteration_rate_hz(&self) -> f64 {
        if self.uptime_ms == 0 {
            return 0.0;
        }
        self.iterations as f64 * 1000.0 / self.uptime_ms as f64
    }
}

impl fmt::Display for RunStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "iters={} ({:.1} Hz) | writes={} | store_fail={} parse_fail={} range_fault={} hw_retry={}",
            self.iterations,
            self.iteration_rate_hz(),
            self.writes,
            self.store_failures,
            self.parse_failures,
            self.validation_faults,
            self.hardware_retries,
        )
    }
}
