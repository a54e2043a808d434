//! Loop lifecycle state machine.
//!
//! ```text
//!            start            shutdown signal
//!   Idle ───────────▶ Running ───────────────▶ Stopped
//!                        │
//!                        │ fatal hardware error
//!                        ▼
//!                      Failed
//! ```
//!
//! `Running` is the only state with side effects.  `Stopped` and `Failed`
//! are terminal: once entered, every further transition is refused.

use log::{debug, warn};

/// Lifecycle state of the sampling loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum LoopState {
    Idle = 0,
    Running = 1,
    Stopped = 2,
    Failed = 3,
}

impl LoopState {
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Stopped | Self::Failed)
    }

    /// Whether `self -> next` is an edge of the diagram above.
    pub const fn can_transition_to(self, next: Self) -> bool {
        matches!(
            (self, next),
            (Self::Idle, Self::Running) | (Self::Running, Self::Stopped | Self::Failed)
        )
    }
}

/// Holds the current [`LoopState`] and enforces legal transitions.
#[derive(Debug)]
pub struct Fsm {
    current: LoopState,
}

impl Default for Fsm {
    fn default() -> Self {
        Self::new()
    }
}

impl Fsm {
    pub const fn new() -> Self {
        Self {
            current: LoopState::Idle,
        }
    }

    pub const fn current_state(&self) -> LoopState {
        self.current
    }

    /// Move to `next`.  Returns `false` (and stays put) for an illegal edge.
    pub fn transition(&mut self, next: LoopState) -> bool {
        if !self.current.can_transition_to(next) {
            warn!("FSM: refused {:?} -> {:?}", self.current, next);
            return false;
        }
        debug!("FSM: {:?} -> {:?}", self.current, next);
        self.current = next;
        true
    }
}
