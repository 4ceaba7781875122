//! Memo Implementation
//!
//! A Memo is a cached derived value that recomputes only when one of its
//! dependencies has changed since the last read.
//!
//! # How Memos Work
//!
//! 1. On first read, the memo runs its computation under a tracking scope
//!    and caches the result.
//!
//! 2. Reads while clean return the cached value without recomputing.
//!
//! 3. When a dependency is written, the memo is marked stale and the
//!    staleness is pushed on to the memo's own subscribers, so effects
//!    behind a memo are queued by the same write. The memo's value itself
//!    recomputes lazily, on the next read.
//!
//! # Differences from Effect
//!
//! - Memos return a value; effects do not.
//! - Memos are lazy (recompute on read); effects are eager (queued when a
//!   dependency changes).
//! - A memo is itself a source: other memos and effects can subscribe to it.
//!
//! Staleness propagates unconditionally, mirroring signal writes: no
//! equality check is performed on the recomputed value.

use std::cell::{Cell, RefCell};
use std::fmt::Debug;
use std::rc::Rc;

use indexmap::IndexSet;
use tracing::trace;

use super::context::TrackingScope;
use super::runtime::Runtime;
use super::subscriber::{Observer, SourceId, SubscriberId};

/// Cache state of a memo.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MemoState {
    /// The cached value reflects the current dependency values.
    Clean,

    /// A dependency changed; the next read recomputes.
    Stale,
}

/// A cached derived value.
///
/// Cloning shares the underlying computation and cache. Like an effect, a
/// memo stays alive only as long as a handle to it does.
///
/// # Example
///
/// ```rust,ignore
/// let count = Signal::new(2);
/// let doubled = Memo::new({
///     let count = count.clone();
///     move || count.get() * 2
/// });
/// assert_eq!(doubled.get(), 4);
/// ```
pub struct Memo<T: Clone + 'static> {
    inner: Rc<MemoInner<T>>,
}

struct MemoInner<T> {
    /// Identity this memo publishes through; its subscribers' edges are
    /// kept under it.
    source_id: SourceId,

    /// Identity used when this memo subscribes to its own dependencies.
    subscriber_id: SubscriberId,

    /// The computation.
    compute: Box<dyn Fn() -> T>,

    /// Cached value (`None` until first read).
    value: RefCell<Option<T>>,

    /// Current cache state.
    state: Cell<MemoState>,

    /// Sources read during the most recent recomputation.
    dependencies: RefCell<IndexSet<SourceId>>,
}

impl<T: Clone + 'static> Memo<T> {
    /// Create a new memo.
    ///
    /// The computation does not run until the first read.
    pub fn new<F>(compute: F) -> Self
    where
        F: Fn() -> T + 'static,
    {
        let inner = Rc::new(MemoInner {
            source_id: SourceId::new(),
            subscriber_id: SubscriberId::new(),
            compute: Box::new(compute),
            value: RefCell::new(None),
            state: Cell::new(MemoState::Stale),
            dependencies: RefCell::new(IndexSet::new()),
        });

        let observer: Rc<dyn Observer> = inner.clone();
        Runtime::register(&observer);

        Self { inner }
    }

    /// Get the memo's source ID.
    pub fn id(&self) -> SourceId {
        self.inner.source_id
    }

    /// Get the current value, recomputing if a dependency changed.
    ///
    /// Inside a tracking scope this also subscribes the running computation
    /// to the memo.
    pub fn get(&self) -> T {
        Runtime::track_read(self.inner.source_id);

        match self.inner.state.get() {
            MemoState::Clean => self
                .inner
                .value
                .borrow()
                .clone()
                .expect("clean memo holds a value"),
            MemoState::Stale => self.inner.recompute(),
        }
    }

    /// Get the cached value without recomputing or subscribing.
    ///
    /// Returns `None` when the memo has never computed.
    pub fn peek(&self) -> Option<T> {
        self.inner.value.borrow().clone()
    }

    /// Current cache state.
    pub fn state(&self) -> MemoState {
        self.inner.state.get()
    }

    /// Check whether the memo has computed at least once.
    pub fn has_value(&self) -> bool {
        self.inner.value.borrow().is_some()
    }

    /// Number of computations currently subscribed to this memo.
    pub fn subscriber_count(&self) -> usize {
        Runtime::subscriber_count(self.inner.source_id)
    }
}

impl<T: Clone + 'static> MemoInner<T> {
    /// Recompute under a tracking scope and refresh the dependency set.
    fn recompute(&self) -> T {
        let previous = std::mem::take(&mut *self.dependencies.borrow_mut());
        Runtime::prune_edges(self.subscriber_id, &previous);

        let scope = TrackingScope::enter(self.subscriber_id);
        let new_value = (self.compute)();
        let reads = TrackingScope::current_reads();
        drop(scope);

        *self.dependencies.borrow_mut() = reads.into_iter().collect();
        *self.value.borrow_mut() = Some(new_value.clone());
        self.state.set(MemoState::Clean);

        trace!(source = self.source_id.raw(), "memo recompute");
        new_value
    }
}

impl<T: Clone + 'static> Observer for MemoInner<T> {
    fn subscriber_id(&self) -> SubscriberId {
        self.subscriber_id
    }

    fn mark_stale(&self) {
        self.state.set(MemoState::Stale);
    }

    fn run(&self) {
        // Memos are lazy; they are never queued on the scheduler
    }

    fn is_eager(&self) -> bool {
        false
    }

    fn source_id(&self) -> Option<SourceId> {
        Some(self.source_id)
    }
}

impl<T: Clone + 'static> Clone for Memo<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<T: Clone + Debug + 'static> Debug for Memo<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Memo")
            .field("id", &self.inner.source_id)
            .field("state", &self.state())
            .field("value", &self.peek())
            .finish()
    }
}

/// Create a memo over `compute`.
pub fn create_memo<T, F>(compute: F) -> Memo<T>
where
    T: Clone + 'static,
    F: Fn() -> T + 'static,
{
    Memo::new(compute)
}
