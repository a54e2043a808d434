//! Log-based event sink adapter.
//!
//! Implements [`EventSink`] by writing loop events to the `log` facade.
//! Severity follows the error taxonomy: per-sample chatter at `debug`,
//! recoverable trouble at `warn`, the one fatal diagnostic at `error`,
//! lifecycle and statistics at `info`.
//!
//! A store error reply (e.g. `WRONGTYPE`) repeats on every poll, so it is
//! reported at `warn` once per binding and at `debug` until that binding
//! produces any other outcome.

use std::collections::HashSet;

use log::{debug, error, info, warn};

use crate::app::events::BridgeEvent;
use crate::app::ports::EventSink;
use crate::error::StoreError;

/// Adapter that logs every [`BridgeEvent`].
#[derive(Debug, Default)]
pub struct LogEventSink {
    /// Bindings whose last store reply was an error reply.
    rejected: HashSet<String>,
}

impl LogEventSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Forget a pending store rejection for `name`.
    fn store_recovered(&mut self, name: &str) {
        if self.rejected.remove(name) {
            info!("STORE | GET {}: answering again", name);
        }
    }
}

impl EventSink for LogEventSink {
    fn emit(&mut self, event: &BridgeEvent<'_>) {
        match *event {
            BridgeEvent::Started {
                bindings,
                poll_interval_ms,
            } => {
                info!(
                    "START | bindings={} | poll={}ms",
                    bindings, poll_interval_ms
                );
            }
            BridgeEvent::SampleWritten {
                name,
                channel,
                value,
            } => {
                self.store_recovered(name);
                debug!("WRITE | {} -> DAC{} = {}", name, channel, value);
            }
            BridgeEvent::SampleRejected {
                name,
                channel,
                reason,
            } => {
                self.store_recovered(name);
                debug!("SKIP  | {} -> DAC{}: {}", name, channel, reason);
            }
            // Fast-fail while backing off would flood the console.
            BridgeEvent::StoreFailed {
                name,
                error: StoreError::Unavailable,
            } => {
                debug!("STORE | GET {}: {}", name, StoreError::Unavailable);
            }
            BridgeEvent::StoreFailed {
                name,
                error: StoreError::Rejected,
            } => {
                if self.rejected.insert(name.to_string()) {
                    warn!("STORE | GET {}: {}", name, StoreError::Rejected);
                } else {
                    debug!("STORE | GET {}: {}", name, StoreError::Rejected);
                }
            }
            BridgeEvent::StoreFailed { name, error: e } => {
                self.store_recovered(name);
                warn!("STORE | GET {}: {}", name, e);
            }
            BridgeEvent::WriteFailed {
                name,
                channel,
                error: e,
            } => {
                if e.is_transient() {
                    warn!("HW    | {} -> DAC{}: {} (continuing)", name, channel, e);
                } else {
                    error!("HW    | {} -> DAC{}: {} (fatal)", name, channel, e);
                }
            }
            BridgeEvent::FaultRaised { name, channel } => {
                warn!("FAULT | {} -> DAC{}: value out of range", name, channel);
            }
            BridgeEvent::FaultCleared { name, channel } => {
                info!("FAULT | {} -> DAC{}: cleared", name, channel);
            }
            BridgeEvent::Stats(stats) => {
                info!("STATS | {}", stats);
            }
            BridgeEvent::Stopped(stats) => {
                info!("STOP  | {}", stats);
            }
            BridgeEvent::Aborted { error: e, stats } => {
                info!("ABORT | code={} | {}", e.code(), stats);
            }
        }
    }
}
