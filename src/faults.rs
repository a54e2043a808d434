//! Validation fault recorder.
//!
//! Tracks, per binding, whether the most recent sample was rejected for
//! being out of range, plus a running count of such rejections.
//!
//! ## Fault lifecycle
//!
//! 1. A sample for binding *n* falls outside its span.
//! 2. The recorder sets bit *n* and bumps the binding's counter.  The
//!    first rejection of a streak reports [`FaultChange::Raised`].
//! 3. Further rejections only bump the counter.
//! 4. The next accepted sample for binding *n* clears the bit and reports
//!    [`FaultChange::Cleared`].
//!
//! Bindings are indexed by their position in the config, so the bitmask
//! never needs more than [`MAX_BINDINGS`] bits.

use crate::config::MAX_BINDINGS;

/// Edge reported by [`FaultRecorder::evaluate`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FaultChange {
    Raised,
    Cleared,
}

/// Latched validation faults, one bit per binding.
#[derive(Debug, Default, Clone)]
pub struct FaultRecorder {
    /// Latched fault bitmask.
    faults: u8,
    /// Lifetime out-of-range count per binding.
    counts: [u32; MAX_BINDINGS],
}

impl FaultRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the outcome of one sample for `binding`.  Returns the edge,
    /// if the latched state changed.
    pub fn evaluate(&mut self, binding: usize, out_of_range: bool) -> Option<FaultChange> {
        if binding >= MAX_BINDINGS {
            return None;
        }
        let mask = 1u8 << binding;
        if out_of_range {
            self.counts[binding] = self.counts[binding].saturating_add(1);
            let was_set = self.faults & mask != 0;
            self.faults |= mask;
            (!was_set).then_some(FaultChange::Raised)
        } else if self.faults & mask != 0 {
            self.faults &= !mask;
            Some(FaultChange::Cleared)
        } else {
            None
        }
    }

    /// Current fault bitmask.
    pub fn faults(&self) -> u8 {
        self.faults
    }

    /// True if **any** binding is faulted.
    pub fn has_faults(&self) -> bool {
        self.faults != 0
    }

    pub fn is_faulted(&self, binding: usize) -> bool {
        binding < MAX_BINDINGS && self.faults & (1 << binding) != 0
    }

    /// Out-of-range samples seen for `binding` since startup.
    pub fn count(&self, binding: usize) -> u32 {
        self.counts.get(binding).copied().unwrap_or(0)
    }
}
