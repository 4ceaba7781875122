//! Reactive Runtime
//!
//! The runtime is the central coordinator that connects signals, memos, and
//! effects. It owns the source-to-subscriber edges of the dependency graph
//! and turns signal writes into scheduled work.
//!
//! # How It Works
//!
//! 1. When an effect or memo runs, it enters a [`TrackingScope`]. Every
//!    source read inside the scope calls [`Runtime::track_read`], which adds
//!    an edge from the source to the running subscriber.
//!
//! 2. When a signal's value changes, [`Runtime::notify`]:
//!    a. looks up the source's subscribers in insertion order,
//!    b. marks each one stale,
//!    c. queues eager subscribers (effects) on the scheduler for the next
//!       tick,
//!    d. recurses through lazy subscribers (memos) so staleness reaches the
//!       effects behind them. Memos themselves recompute only on next read.
//!
//! 3. Before a subscriber re-runs, it prunes its previous edges, so the edge
//!    set always reflects exactly the reads of the most recent run.
//!
//! # Ownership
//!
//! The registry holds observers behind `Weak` references. Nothing in the
//! runtime keeps an effect or memo alive; once the last external handle is
//! dropped, queued re-runs become no-ops and the registry entry is swept on
//! the next notification that reaches it.
//!
//! # Threading
//!
//! All runtime state is thread-local. Reads, writes, tracking, and effect
//! execution are confined to the one thread driving the cooperative
//! scheduler; there are no locks anywhere on this path.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::{Rc, Weak};

use indexmap::IndexSet;
use tracing::trace;

use crate::scheduler;

use super::context::TrackingScope;
use super::subscriber::{Observer, SourceId, SubscriberId};

thread_local! {
    static STATE: RefCell<RuntimeState> = RefCell::new(RuntimeState::default());
}

#[derive(Default)]
struct RuntimeState {
    /// Live observers, held weakly so the runtime never owns a computation.
    registry: HashMap<SubscriberId, Weak<dyn Observer>>,

    /// Source -> subscribers. Insertion order is preserved so fan-out from a
    /// single write queues re-runs deterministically.
    edges: HashMap<SourceId, IndexSet<SubscriberId>>,
}

/// The thread-confined reactive runtime.
pub struct Runtime;

impl Runtime {
    /// Register an observer so notifications can reach it.
    pub(crate) fn register(observer: &Rc<dyn Observer>) {
        let id = observer.subscriber_id();
        STATE.with(|state| {
            state
                .borrow_mut()
                .registry
                .insert(id, Rc::downgrade(observer));
        });
    }

    /// Remove an observer and every edge pointing at it.
    pub(crate) fn unregister(id: SubscriberId) {
        STATE.with(|state| {
            let mut state = state.borrow_mut();
            state.registry.remove(&id);

            for subscribers in state.edges.values_mut() {
                subscribers.shift_remove(&id);
            }
        });
    }

    /// Record a read of `source` by the currently tracking subscriber.
    ///
    /// Outside a tracking scope this is a plain read and registers nothing.
    /// Re-subscribing an already-subscribed computation is a no-op.
    pub(crate) fn track_read(source: SourceId) {
        if let Some(subscriber) = TrackingScope::current_subscriber() {
            TrackingScope::record_read(source);
            STATE.with(|state| {
                state
                    .borrow_mut()
                    .edges
                    .entry(source)
                    .or_default()
                    .insert(subscriber);
            });
        }
    }

    /// Drop the edges from each source in `sources` to `subscriber`.
    ///
    /// Called before a subscriber re-runs. A computation that stopped
    /// reading a source (a conditional branch not taken this run) must stop
    /// being notified by it.
    pub(crate) fn prune_edges(subscriber: SubscriberId, sources: &IndexSet<SourceId>) {
        STATE.with(|state| {
            let mut state = state.borrow_mut();
            for source in sources {
                if let Some(subscribers) = state.edges.get_mut(source) {
                    subscribers.shift_remove(&subscriber);
                }
            }
        });
    }

    /// Notify every subscriber of `source` that it changed.
    ///
    /// Eager subscribers are queued for the next tick; they are never run
    /// inline. Lazy subscribers are marked stale and their own subscribers
    /// notified in turn.
    pub(crate) fn notify(source: SourceId) {
        // Snapshot and upgrade under the borrow, then call out with the
        // borrow released: marking a memo stale re-enters this function.
        let mut dead: Vec<SubscriberId> = Vec::new();
        let observers: Vec<Rc<dyn Observer>> = STATE.with(|state| {
            let state = state.borrow();
            let Some(subscribers) = state.edges.get(&source) else {
                return Vec::new();
            };
            subscribers
                .iter()
                .filter_map(|id| {
                    match state.registry.get(id).and_then(Weak::upgrade) {
                        Some(observer) => Some(observer),
                        None => {
                            dead.push(*id);
                            None
                        }
                    }
                })
                .collect()
        });

        // Sweep observers whose last handle was dropped.
        for id in dead {
            Self::unregister(id);
        }

        if observers.is_empty() {
            return;
        }
        trace!(source = source.raw(), fan_out = observers.len(), "notify");

        for observer in observers {
            observer.mark_stale();
            if observer.is_eager() {
                scheduler::schedule_observer(observer.subscriber_id(), Rc::downgrade(&observer));
            } else if let Some(derived) = observer.source_id() {
                Self::notify(derived);
            }
        }
    }

    /// Number of subscribers currently attached to `source`.
    pub fn subscriber_count(source: SourceId) -> usize {
        STATE.with(|state| {
            state
                .borrow()
                .edges
                .get(&source)
                .map(IndexSet::len)
                .unwrap_or(0)
        })
    }

    /// The subscriber currently being tracked, if any.
    pub fn current_subscriber() -> Option<SubscriberId> {
        TrackingScope::current_subscriber()
    }

    /// Check whether a tracking scope is active.
    pub fn is_tracking() -> bool {
        TrackingScope::is_active()
    }
}
