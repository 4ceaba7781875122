//! Effect Implementation
//!
//! An Effect is a side-effecting computation that re-runs whenever one of
//! its dependencies changes.
//!
//! # How Effects Work
//!
//! 1. When created, the effect runs its body synchronously once to establish
//!    the initial dependency set, so the caller sees initial state applied
//!    before `create_effect` returns.
//!
//! 2. When any dependency is written, the effect is queued on the scheduler
//!    and re-runs on the next tick, never inline in the write.
//!
//! 3. Before each run, the effect detaches from everything it read last
//!    time; the run re-subscribes to exactly what it reads now. An effect
//!    that stops reading a signal inside a conditional branch stops being
//!    notified by it.
//!
//! # Re-run coalescing
//!
//! Queued re-runs are de-duplicated per tick: writing several dependencies
//! of one effect in the same synchronous block runs its body once.
//!
//! # Teardown
//!
//! Two cooperating paths:
//!
//! - [`Effect::dispose`] marks the effect dead and detaches it immediately.
//! - Dropping every handle quiesces it: the runtime and the scheduler hold
//!   only weak references, so the next queued run is a no-op and the
//!   registration is swept on the next notification that reaches it.
//!
//! A body that captures `std::rc::Weak` to the object it mutates and
//! early-returns when the upgrade fails quiesces the same way: the aborted
//! run records no reads, so the effect unsubscribes from everything.
//!
//! A body that panics is a programming error, not a recoverable condition;
//! the tracking scope unwinds cleanly but no re-subscription state is
//! restored.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use indexmap::IndexSet;
use tracing::trace;

use super::context::TrackingScope;
use super::runtime::Runtime;
use super::subscriber::{Observer, SourceId, SubscriberId};

/// Handle to a side-effecting computation that re-runs when its
/// dependencies change.
///
/// Cloning shares the underlying effect. The effect stays alive as long as
/// any handle does; the signals it reads never keep it alive.
///
/// # Example
///
/// ```rust,ignore
/// let count = Signal::new(0);
///
/// let effect = Effect::new({
///     let count = count.clone();
///     move || println!("count is {}", count.get())
/// }); // prints "count is 0"
///
/// count.set(5);
/// scheduler::tick(); // prints "count is 5"
/// ```
pub struct Effect {
    inner: Rc<EffectInner>,
}

struct EffectInner {
    /// Identity used for subscriber bookkeeping and per-tick coalescing.
    subscriber_id: SubscriberId,

    /// The effect body.
    body: Box<dyn Fn()>,

    /// Sources read during the most recent run.
    dependencies: RefCell<IndexSet<SourceId>>,

    /// Once set, the effect never runs again.
    disposed: Cell<bool>,

    /// Number of completed runs.
    run_count: Cell<usize>,
}

impl Effect {
    /// Create a new effect and run its body synchronously once.
    pub fn new<F>(body: F) -> Self
    where
        F: Fn() + 'static,
    {
        let inner = Rc::new(EffectInner {
            subscriber_id: SubscriberId::new(),
            body: Box::new(body),
            dependencies: RefCell::new(IndexSet::new()),
            disposed: Cell::new(false),
            run_count: Cell::new(0),
        });

        let observer: Rc<dyn Observer> = inner.clone();
        Runtime::register(&observer);

        // First run happens before the constructor returns
        inner.execute();

        Self { inner }
    }

    /// Get the subscriber ID for this effect.
    pub fn subscriber_id(&self) -> SubscriberId {
        self.inner.subscriber_id
    }

    /// Dispose of the effect.
    ///
    /// Detaches it from every dependency; queued and future re-runs become
    /// no-ops.
    pub fn dispose(&self) {
        if !self.inner.disposed.replace(true) {
            self.inner.dependencies.borrow_mut().clear();
            Runtime::unregister(self.inner.subscriber_id);
        }
    }

    /// Check if the effect has been disposed.
    pub fn is_disposed(&self) -> bool {
        self.inner.disposed.get()
    }

    /// Number of completed runs.
    pub fn run_count(&self) -> usize {
        self.inner.run_count.get()
    }

    /// Number of sources the most recent run subscribed to.
    pub fn dependency_count(&self) -> usize {
        self.inner.dependencies.borrow().len()
    }
}

impl Clone for Effect {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl std::fmt::Debug for Effect {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Effect")
            .field("subscriber_id", &self.inner.subscriber_id)
            .field("run_count", &self.run_count())
            .field("dependency_count", &self.dependency_count())
            .field("disposed", &self.is_disposed())
            .finish()
    }
}

impl EffectInner {
    /// Run the body under a tracking scope and swap in the fresh
    /// dependency set.
    fn execute(&self) {
        if self.disposed.get() {
            return;
        }

        // Stale-dependency pruning: the run starts detached and
        // re-subscribes to exactly what it reads.
        let previous = std::mem::take(&mut *self.dependencies.borrow_mut());
        Runtime::prune_edges(self.subscriber_id, &previous);

        let scope = TrackingScope::enter(self.subscriber_id);
        (self.body)();
        let reads = TrackingScope::current_reads();
        drop(scope);

        let dependencies: IndexSet<SourceId> = reads.into_iter().collect();
        let dependency_count = dependencies.len();
        *self.dependencies.borrow_mut() = dependencies;
        self.run_count.set(self.run_count.get() + 1);

        trace!(
            subscriber = ?self.subscriber_id,
            dependencies = dependency_count,
            "effect run"
        );
    }
}

impl Observer for EffectInner {
    fn subscriber_id(&self) -> SubscriberId {
        self.subscriber_id
    }

    fn mark_stale(&self) {
        // Effects cache nothing
    }

    fn run(&self) {
        self.execute();
    }

    fn is_eager(&self) -> bool {
        true
    }

    fn source_id(&self) -> Option<SourceId> {
        None
    }
}

/// Create an effect that runs `body` now and re-runs it on the tick after
/// any of its reactive reads change.
pub fn create_effect<F>(body: F) -> Effect
where
    F: Fn() + 'static,
{
    Effect::new(body)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reactive::Signal;
    use crate::scheduler;
    use std::cell::Cell;
    use std::rc::{Rc, Weak};

    #[test]
    fn effect_runs_once_on_creation() {
        let runs = Rc::new(Cell::new(0));

        let _effect = Effect::new({
            let runs = runs.clone();
            move || runs.set(runs.get() + 1)
        });

        assert_eq!(runs.get(), 1);
    }

    #[test]
    fn rerun_is_deferred_to_the_tick() {
        let signal = Signal::new(0);
        let observed = Rc::new(Cell::new(-1));

        let effect = Effect::new({
            let signal = signal.clone();
            let observed = observed.clone();
            move || observed.set(signal.get())
        });
        assert_eq!(observed.get(), 0);

        signal.set(42);
        // Not yet: the write only queues the re-run
        assert_eq!(observed.get(), 0);
        assert_eq!(effect.run_count(), 1);

        scheduler::tick();
        assert_eq!(observed.get(), 42);
        assert_eq!(effect.run_count(), 2);
    }

    #[test]
    fn equal_value_write_still_reruns() {
        let signal = Signal::new(7);
        let effect = Effect::new({
            let signal = signal.clone();
            move || {
                signal.get();
            }
        });
        assert_eq!(effect.run_count(), 1);

        signal.set(7);
        scheduler::tick();
        assert_eq!(effect.run_count(), 2);
    }

    #[test]
    fn writes_coalesce_onto_one_run_per_tick() {
        let a = Signal::new(1);
        let b = Signal::new(2);
        let effect = Effect::new({
            let a = a.clone();
            let b = b.clone();
            move || {
                a.get();
                b.get();
            }
        });
        assert_eq!(effect.run_count(), 1);

        // Two dependencies written in the same synchronous block
        a.set(10);
        b.set(20);
        scheduler::tick();
        assert_eq!(effect.run_count(), 2);

        // Separate blocks, separate ticks, separate runs
        a.set(11);
        scheduler::tick();
        b.set(21);
        scheduler::tick();
        assert_eq!(effect.run_count(), 4);
    }

    #[test]
    fn conditional_dependency_is_pruned() {
        let flag = Signal::new(true);
        let a = Signal::new(1);
        let b = Signal::new(2);
        let observed = Rc::new(Cell::new(0));

        let effect = Effect::new({
            let flag = flag.clone();
            let a = a.clone();
            let b = b.clone();
            let observed = observed.clone();
            move || {
                let value = if flag.get() { a.get() } else { b.get() };
                observed.set(value);
            }
        });
        assert_eq!(observed.get(), 1);
        assert_eq!(effect.dependency_count(), 2); // flag + a

        // The untaken branch must not trigger
        b.set(99);
        scheduler::tick();
        assert_eq!(effect.run_count(), 1);

        flag.set(false);
        scheduler::tick();
        assert_eq!(observed.get(), 2);
        assert_eq!(b.subscriber_count(), 1);
        assert_eq!(a.subscriber_count(), 0);

        // And now the roles swap
        a.set(50);
        scheduler::tick();
        assert_eq!(effect.run_count(), 2);

        b.set(3);
        scheduler::tick();
        assert_eq!(observed.get(), 3);
        assert_eq!(effect.run_count(), 3);
    }

    #[test]
    fn dispose_stops_reruns() {
        let signal = Signal::new(0);
        let effect = Effect::new({
            let signal = signal.clone();
            move || {
                signal.get();
            }
        });
        assert_eq!(effect.run_count(), 1);

        effect.dispose();
        assert!(effect.is_disposed());
        assert_eq!(signal.subscriber_count(), 0);

        signal.set(1);
        scheduler::tick();
        assert_eq!(effect.run_count(), 1);
    }

    #[test]
    fn dropping_every_handle_quiesces_the_effect() {
        let signal = Signal::new(0);
        let runs = Rc::new(Cell::new(0));

        let effect = Effect::new({
            let signal = signal.clone();
            let runs = runs.clone();
            move || {
                signal.get();
                runs.set(runs.get() + 1);
            }
        });
        assert_eq!(runs.get(), 1);

        // Queue a re-run, then drop the handle before the tick
        signal.set(1);
        drop(effect);
        scheduler::tick();
        assert_eq!(runs.get(), 1);

        // The registration is swept by the next notification
        signal.set(2);
        assert_eq!(signal.subscriber_count(), 0);
        assert!(scheduler::is_idle());
    }

    #[test]
    fn dead_weak_target_run_unsubscribes() {
        let signal = Signal::new(1);
        let target = Rc::new(Cell::new(0));
        let weak_target: Weak<Cell<i32>> = Rc::downgrade(&target);

        let effect = Effect::new({
            let signal = signal.clone();
            move || {
                let Some(target) = weak_target.upgrade() else {
                    return;
                };
                target.set(signal.get());
            }
        });
        assert_eq!(target.get(), 1);
        assert_eq!(effect.dependency_count(), 1);

        drop(target);
        signal.set(2);
        scheduler::tick();

        // The run was a no-op and recorded no reads
        assert_eq!(effect.run_count(), 2);
        assert_eq!(effect.dependency_count(), 0);
        assert_eq!(signal.subscriber_count(), 0);

        // Subsequent writes schedule nothing
        signal.set(3);
        assert!(scheduler::is_idle());
    }

    #[test]
    fn untracked_read_is_not_a_dependency() {
        use crate::reactive::TrackingScope;

        let tracked = Signal::new(1);
        let peeked = Signal::new(2);

        let effect = Effect::new({
            let tracked = tracked.clone();
            let peeked = peeked.clone();
            move || {
                tracked.get();
                TrackingScope::untracked(|| peeked.get());
                peeked.get_untracked();
            }
        });
        assert_eq!(effect.dependency_count(), 1);

        peeked.set(9);
        scheduler::tick();
        assert_eq!(effect.run_count(), 1);
    }

    #[test]
    fn effect_clone_shares_state() {
        let effect1 = Effect::new(|| {});
        let effect2 = effect1.clone();

        assert_eq!(effect1.subscriber_id(), effect2.subscriber_id());
        assert_eq!(effect1.run_count(), 1);

        effect1.dispose();
        assert!(effect2.is_disposed());
    }
}
