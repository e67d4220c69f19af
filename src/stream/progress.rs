//! Fraction-complete reporting, computed from source bytes consumed.
//!
//! The reporter only observes counters; it never touches the data path, and a
//! failing callback (a closed stderr, say) does not affect the session.

use std::io;

/// Point-in-time view of a session's progress.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProgressSnapshot {
    /// Source bytes taken so far.
    pub consumed: u64,
    /// Source size known up front.
    pub total: u64,
}

impl ProgressSnapshot {
    /// `consumed / total` clamped to [0, 1]; 1.0 for an empty source.
    pub fn fraction(&self) -> f64 {
        if self.total == 0 {
            return 1.0;
        }
        (self.consumed as f64 / self.total as f64).clamp(0.0, 1.0)
    }

    /// Whole percent, rounded down.
    pub fn percent(&self) -> u32 {
        (self.fraction() * 100.0).floor() as u32
    }
}

/// Feeds monotonic snapshots to a callback.
pub struct Progress<F>
where
    F: FnMut(&ProgressSnapshot) -> io::Result<()>,
{
    total: u64,
    consumed: u64,
    failures: u64,
    callback: F,
}

impl<F> Progress<F>
where
    F: FnMut(&ProgressSnapshot) -> io::Result<()>,
{
    pub fn new(total: u64, callback: F) -> Self {
        Self {
            total,
            consumed: 0,
            failures: 0,
            callback,
        }
    }

    /// Records `consumed` (never moving backwards) and reports it.
    pub fn update(&mut self, consumed: u64) -> ProgressSnapshot {
        self.consumed = self.consumed.max(consumed);
        let snapshot = self.snapshot();
        if (self.callback)(&snapshot).is_err() {
            self.failures += 1;
        }
        snapshot
    }

    pub fn snapshot(&self) -> ProgressSnapshot {
        ProgressSnapshot {
            consumed: self.consumed,
            total: self.total,
        }
    }

    /// Number of callback invocations that returned an error.
    pub fn failures(&self) -> u64 {
        self.failures
    }
}
