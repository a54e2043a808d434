//! Outbound loop events.
//!
//! The [`SamplingLoop`](super::service::SamplingLoop) emits these through
//! the [`EventSink`](super::ports::EventSink) port.  Adapters on the other
//! side decide what to do with them: log to the console, count them in a
//! test, etc.
//!
//! Events borrow the binding name from the loop, so emitting one never
//! allocates.

use crate::diagnostics::RunStats;
use crate::error::{HardwareError, SampleError, StoreError};

/// Structured events emitted by the sampling loop.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum BridgeEvent<'a> {
    /// The loop entered `Running`.
    Started { bindings: usize, poll_interval_ms: u64 },

    /// A setpoint reached the hardware.
    SampleWritten { name: &'a str, channel: u8, value: u16 },

    /// A fetched value was not forwarded.
    SampleRejected {
        name: &'a str,
        channel: u8,
        reason: SampleError,
    },

    /// The store could not answer for this binding.
    StoreFailed { name: &'a str, error: StoreError },

    /// The board refused a write.  Transient errors let the loop go on;
    /// anything else ends it.
    WriteFailed {
        name: &'a str,
        channel: u8,
        error: HardwareError,
    },

    /// First out-of-range sample after a clean one.
    FaultRaised { name: &'a str, channel: u8 },

    /// First clean sample after an out-of-range streak.
    FaultCleared { name: &'a str, channel: u8 },

    /// Periodic statistics snapshot.
    Stats(RunStats),

    /// The loop stopped on request.
    Stopped(RunStats),

    /// The loop ended on a fatal hardware error.
    Aborted { error: HardwareError, stats: RunStats },
}
