//! Identifier and observer types for the reactive system.
//!
//! A subscriber is any computation that depends on reactive sources. This
//! includes effects and memos. A source is anything such a computation can
//! read reactively: a signal, or a memo acting as a derived source.

use std::sync::atomic::{AtomicU64, Ordering};

/// Unique identifier for a reactive source (a signal or a memo).
///
/// Signals and memos draw from the same counter, so a source id is unique
/// across both kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SourceId(u64);

impl SourceId {
    /// Generate a new unique source ID.
    pub fn new() -> Self {
        static COUNTER: AtomicU64 = AtomicU64::new(0);
        Self(COUNTER.fetch_add(1, Ordering::Relaxed))
    }

    /// Get the raw ID value.
    pub fn raw(&self) -> u64 {
        self.0
    }
}

impl Default for SourceId {
    fn default() -> Self {
        Self::new()
    }
}

/// Unique identifier for a subscriber.
///
/// Each subscriber (effect or memo) gets a unique ID when created. The ID is
/// what the runtime stores in per-source subscriber sets, so re-subscribing
/// an already-subscribed computation is a no-op.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriberId(u64);

impl SubscriberId {
    /// Generate a new unique subscriber ID.
    pub fn new() -> Self {
        static COUNTER: AtomicU64 = AtomicU64::new(0);
        Self(COUNTER.fetch_add(1, Ordering::Relaxed))
    }
}

impl Default for SubscriberId {
    fn default() -> Self {
        Self::new()
    }
}

/// A computation that subscribes to reactive sources.
///
/// Implemented by the effect and memo internals. The runtime holds observers
/// behind `Weak` references only; an observer whose last strong handle was
/// dropped is swept the next time one of its dependencies notifies.
pub(crate) trait Observer {
    fn subscriber_id(&self) -> SubscriberId;

    /// Invalidate cached state. Memos flip to stale; effects cache nothing
    /// and ignore this.
    fn mark_stale(&self);

    /// Run the computation now. Called by the scheduler when a queued re-run
    /// comes due.
    fn run(&self);

    /// Eager observers (effects) are queued on the scheduler when a
    /// dependency changes. Lazy observers (memos) recompute on next read.
    fn is_eager(&self) -> bool;

    /// The source id this observer publishes through, if it is readable by
    /// other computations (memos). Used to propagate staleness downstream.
    fn source_id(&self) -> Option<SourceId>;
}
