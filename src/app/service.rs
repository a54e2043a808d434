//! Sampling-actuation loop, the hexagonal core.
//!
//! [`SamplingLoop`] owns the binding table, lifecycle FSM, fault recorder
//! and run statistics.  All I/O flows through port traits passed into
//! [`run`](SamplingLoop::run), making the whole loop testable with fakes.
//!
//! ```text
//!  KeyValueStore ──▶ ┌─────────────────────────┐ ──▶ EventSink
//!                    │      SamplingLoop        │
//!   OutputWriter ◀── │  FSM · Faults · Stats    │ ◀── Shutdown
//!                    └─────────────────────────┘
//! ```
//!
//! ## Failure containment
//!
//! | Failure                         | Effect                             |
//! |---------------------------------|------------------------------------|
//! | store error                     | binding skipped, loop continues    |
//! | missing / malformed value       | binding skipped, loop continues    |
//! | out-of-range value              | binding skipped, fault recorded    |
//! | transient hardware error        | logged, loop continues             |
//! | fatal hardware error            | loop ends in `Failed`              |

use std::time::{Duration, Instant};

use log::{info, warn};

use crate::config::{BridgeConfig, MAX_BINDINGS};
use crate::diagnostics::RunStats;
use crate::drivers::dac::DacSpan;
use crate::error::{HardwareError, driver_exit_code};
use crate::faults::{FaultChange, FaultRecorder};
use crate::fsm::{Fsm, LoopState};
use crate::shutdown::Shutdown;

use super::binding::ChannelBinding;
use super::events::BridgeEvent;
use super::ports::{EventSink, KeyValueStore, OutputWriter};

// ───────────────────────────────────────────────────────────────
// Exit status
// ───────────────────────────────────────────────────────────────

/// Terminal outcome of [`SamplingLoop::run`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitStatus {
    /// Cancelled through the shutdown signal.
    Stopped(RunStats),
    /// Ended by a fatal hardware error.
    Failed { error: HardwareError, stats: RunStats },
}

impl ExitStatus {
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Stopped(_))
    }

    pub fn stats(&self) -> RunStats {
        match self {
            Self::Stopped(stats) | Self::Failed { stats, .. } => *stats,
        }
    }

    pub fn error(&self) -> Option<HardwareError> {
        match self {
            Self::Stopped(_) => None,
            Self::Failed { error, .. } => Some(*error),
        }
    }

    /// Process exit status: 0 after a requested stop, otherwise the
    /// magnitude of the driver code.
    pub fn exit_code(&self) -> u8 {
        match self {
            Self::Stopped(_) => 0,
            Self::Failed { error, .. } => driver_exit_code(error.code()),
        }
    }
}

// ───────────────────────────────────────────────────────────────
// SamplingLoop
// ───────────────────────────────────────────────────────────────

/// Polls the store for every binding and forwards valid samples to the board.
pub struct SamplingLoop {
    bindings: heapless::Vec<ChannelBinding, MAX_BINDINGS>,
    poll_interval: Duration,
    stats_interval: Option<Duration>,
    fsm: Fsm,
    faults: FaultRecorder,
    stats: RunStats,
    failure: Option<HardwareError>,
}

impl SamplingLoop {
    /// Build the loop from a validated configuration.
    ///
    /// Does **not** start it; call [`run`](Self::run) next.
    pub fn new(config: &BridgeConfig) -> Self {
        Self {
            bindings: config.bindings.clone(),
            // A zero wait would turn the loop into a hot spin.
            poll_interval: config.poll_interval().max(Duration::from_millis(1)),
            stats_interval: config.stats_interval(),
            fsm: Fsm::new(),
            faults: FaultRecorder::new(),
            stats: RunStats::default(),
            failure: None,
        }
    }

    // ── Setup ─────────────────────────────────────────────────

    /// Program the output span of every bound channel.  Any error here is
    /// returned as-is; the caller decides whether to carry on.
    pub fn configure_outputs(
        &self,
        out: &mut impl OutputWriter,
        span: DacSpan,
    ) -> Result<(), HardwareError> {
        for b in &self.bindings {
            out.configure_channel(b.channel, span)?;
            info!("DAC{} ({}): span {:?}", b.channel, b.name, span);
        }
        Ok(())
    }

    // ── Main loop ─────────────────────────────────────────────

    /// Run until `shutdown` fires or the board reports a fatal error.
    ///
    /// Cancellation is checked at every iteration boundary and the wait
    /// between iterations is bounded by the poll interval, so a trigger is
    /// honoured within one iteration.  Calling `run` again after the loop
    /// has finished returns the same terminal status without touching any
    /// port.
    pub fn run(
        &mut self,
        store: &mut impl KeyValueStore,
        out: &mut impl OutputWriter,
        sink: &mut impl EventSink,
        shutdown: &Shutdown,
    ) -> ExitStatus {
        if self.fsm.current_state().is_terminal() {
            warn!("Sampling loop already finished; not restarting");
            return self.exit_status();
        }

        self.fsm.transition(LoopState::Running);
        sink.emit(&BridgeEvent::Started {
            bindings: self.bindings.len(),
            poll_interval_ms: self.poll_interval.as_millis() as u64,
        });

        let started = Instant::now();
        let mut last_report = started;

        loop {
            if shutdown.is_triggered() {
                break;
            }

            if let Err(error) = self.iterate(store, out, sink) {
                self.stats.uptime_ms = started.elapsed().as_millis() as u64;
                self.failure = Some(error);
                self.fsm.transition(LoopState::Failed);
                sink.emit(&BridgeEvent::Aborted {
                    error,
                    stats: self.stats,
                });
                return self.exit_status();
            }

            if let Some(every) = self.stats_interval {
                if last_report.elapsed() >= every {
                    last_report = Instant::now();
                    self.stats.uptime_ms = started.elapsed().as_millis() as u64;
                    sink.emit(&BridgeEvent::Stats(self.stats));
                }
            }

            if shutdown.wait_timeout(self.poll_interval) {
                break;
            }
        }

        self.stats.uptime_ms = started.elapsed().as_millis() as u64;
        self.fsm.transition(LoopState::Stopped);
        sink.emit(&BridgeEvent::Stopped(self.stats));
        self.exit_status()
    }

    /// One pass over every binding, in configured order.
    ///
    /// Only a fatal hardware error escapes; it is returned immediately and
    /// no later binding is written.
    fn iterate(
        &mut self,
        store: &mut impl KeyValueStore,
        out: &mut impl OutputWriter,
        sink: &mut impl EventSink,
    ) -> Result<(), HardwareError> {
        self.stats.iterations += 1;

        for (idx, b) in self.bindings.iter().enumerate() {
            let reply = match store.get(&b.name) {
                Ok(reply) => reply,
                Err(error) => {
                    self.stats.store_failures += 1;
                    sink.emit(&BridgeEvent::StoreFailed {
                        name: &b.name,
                        error,
                    });
                    continue;
                }
            };

            let value = match b.sample(reply.as_deref()) {
                Ok(value) => value,
                Err(reason) => {
                    if reason.is_validation_fault() {
                        self.stats.validation_faults += 1;
                        if self.faults.evaluate(idx, true) == Some(FaultChange::Raised) {
                            sink.emit(&BridgeEvent::FaultRaised {
                                name: &b.name,
                                channel: b.channel,
                            });
                        }
                    } else {
                        self.stats.parse_failures += 1;
                    }
                    sink.emit(&BridgeEvent::SampleRejected {
                        name: &b.name,
                        channel: b.channel,
                        reason,
                    });
                    continue;
                }
            };

            if self.faults.evaluate(idx, false) == Some(FaultChange::Cleared) {
                sink.emit(&BridgeEvent::FaultCleared {
                    name: &b.name,
                    channel: b.channel,
                });
            }

            match out.write_channel(b.channel, value) {
                Ok(()) => {
                    self.stats.writes += 1;
                    sink.emit(&BridgeEvent::SampleWritten {
                        name: &b.name,
                        channel: b.channel,
                        value,
                    });
                }
                Err(error) => {
                    sink.emit(&BridgeEvent::WriteFailed {
                        name: &b.name,
                        channel: b.channel,
                        error,
                    });
                    if !error.is_transient() {
                        return Err(error);
                    }
                    self.stats.hardware_retries += 1;
                }
            }
        }
        Ok(())
    }

    // ── Queries ───────────────────────────────────────────────

    /// Current lifecycle state.
    pub fn state(&self) -> LoopState {
        self.fsm.current_state()
    }

    /// Counters accumulated so far.
    pub fn stats(&self) -> RunStats {
        self.stats
    }

    /// Validation fault state per binding.
    pub fn faults(&self) -> &FaultRecorder {
        &self.faults
    }

    pub fn bindings(&self) -> &[ChannelBinding] {
        &self.bindings
    }

    fn exit_status(&self) -> ExitStatus {
        match self.failure {
            Some(error) => ExitStatus::Failed {
                error,
                stats: self.stats,
            },
            None => ExitStatus::Stopped(self.stats),
        }
    }
}
