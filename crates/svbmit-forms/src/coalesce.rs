//! Mutation-notification coalescing.
//!
//! A burst of DOM mutations must cost one reconciliation, not one per
//! mutation. [`Coalescer`] tracks whether a reconciliation is already
//! scheduled:
//!
//! - [`signal`](Coalescer::signal) marks one pending and reports
//!   whether the caller should request a frame (only for the first signal).
//! - [`take`](Coalescer::take) is called from the frame callback and
//!   reports whether reconciliation should run, clearing the pending flag.
//!
//! # Usage
//!
//! ```
//! use svbmit_forms::coalesce::Coalescer;
//!
//! let mut coalescer = Coalescer::new();
//! assert!(coalescer.signal());
//! assert!(!coalescer.signal());
//! assert!(!coalescer.signal());
//! assert_eq!(coalescer.coalesced(), 3);
//!
//! assert!(coalescer.take());
//! assert!(!coalescer.take());
//! ```

/// Collapses mutation signals into at most one pending reconciliation.
#[derive(Debug, Clone, Copy, Default)]
pub struct Coalescer {
    pending: bool,
    /// Signals received since the pending flag was last taken.
    signals: usize,
}

impl Coalescer {
    pub const fn new() -> Self {
        Self {
            pending: false,
            signals: 0,
        }
    }

    /// Records a mutation. Returns `true` when this is the first signal since
    /// the last [`take`](Self::take), i.e. a frame must be requested.
    pub fn signal(&mut self) -> bool {
        self.signals += 1;
        if self.pending {
            return false;
        }
        self.pending = true;
        true
    }

    /// Consumes the pending flag. Returns `true` if a reconciliation was due.
    pub fn take(&mut self) -> bool {
        let due = self.pending;
        self.pending = false;
        self.signals = 0;
        due
    }

    pub const fn is_pending(&self) -> bool {
        self.pending
    }

    /// How many signals the pending reconciliation covers.
    pub const fn coalesced(&self) -> usize {
        self.signals
    }
}
