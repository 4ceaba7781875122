//! Signal Implementation
//!
//! A Signal is the fundamental reactive primitive. It holds a value; the
//! runtime tracks which computations depend on it.
//!
//! # How Signals Work
//!
//! 1. When a signal is read inside a tracking scope (an effect or memo run),
//!    the reading computation is registered as a subscriber.
//!
//! 2. When a signal's value is written, every subscriber is notified exactly
//!    once and affected effects are queued for the next scheduler tick.
//!
//! 3. There is no equality gate: a write of a value that compares equal to
//!    the current one still notifies. These are observable-property-write
//!    semantics, not diffing.
//!
//! # Threading
//!
//! Signals are thread-confined. The value lives behind `Rc<RefCell<T>>` and
//! subscriber bookkeeping is thread-local runtime state; there are no locks.

use std::cell::RefCell;
use std::fmt::Debug;
use std::rc::Rc;

use tracing::trace;

use super::binding::Binding;
use super::runtime::Runtime;
use super::subscriber::SourceId;

/// A reactive cell holding a value of type `T`.
///
/// Cloning a `Signal` is cheap and shares the same cell.
///
/// # Example
///
/// ```rust,ignore
/// let count = Signal::new(0);
///
/// // Read the value (subscribes the current effect, if any)
/// let value = count.get();
///
/// // Update the value (queues dependent effects for the next tick)
/// count.set(5);
/// ```
pub struct Signal<T> {
    /// Unique identifier; subscriber edges are kept in the runtime under it.
    id: SourceId,

    /// The current value.
    value: Rc<RefCell<T>>,
}

impl<T: Clone + 'static> Signal<T> {
    /// Create a new signal with the given initial value.
    pub fn new(value: T) -> Self {
        Self {
            id: SourceId::new(),
            value: Rc::new(RefCell::new(value)),
        }
    }

    /// Get the signal's unique ID.
    pub fn id(&self) -> SourceId {
        self.id
    }

    /// Get the current value.
    ///
    /// If called inside a tracking scope, registers the running computation
    /// as a subscriber of this signal. Re-subscribing is a no-op.
    pub fn get(&self) -> T {
        Runtime::track_read(self.id);
        self.value.borrow().clone()
    }

    /// Get the current value without registering a dependency.
    pub fn get_untracked(&self) -> T {
        self.value.borrow().clone()
    }

    /// Store a new value and notify subscribers.
    ///
    /// Every write notifies, even if `value` compares equal to the current
    /// one. Affected effects run on the next scheduler tick, never inside
    /// this call.
    pub fn set(&self, value: T) {
        {
            *self.value.borrow_mut() = value;
        }

        trace!(signal = self.id.raw(), "write");
        Runtime::notify(self.id);
    }

    /// Update the value using a function of the current one.
    pub fn update<F>(&self, f: F)
    where
        F: FnOnce(&T) -> T,
    {
        let new_value = {
            let guard = self.value.borrow();
            f(&guard)
        };
        self.set(new_value);
    }

    /// Project this signal as a [`Binding`].
    ///
    /// Reads through the binding still track, writes through it still
    /// notify; the binding simply hides the cell's identity.
    pub fn binding(&self) -> Binding<T> {
        let read = self.clone();
        let write = self.clone();
        Binding::new(move || read.get(), move |value| write.set(value))
    }

    /// Number of computations currently subscribed to this signal.
    pub fn subscriber_count(&self) -> usize {
        Runtime::subscriber_count(self.id)
    }
}

impl<T> Clone for Signal<T> {
    fn clone(&self) -> Self {
        Self {
            id: self.id,
            value: Rc::clone(&self.value),
        }
    }
}

impl<T: Clone + Debug + 'static> Debug for Signal<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Signal")
            .field("id", &self.id)
            .field("value", &self.get_untracked())
            .field("subscriber_count", &self.subscriber_count())
            .finish()
    }
}

/// Create a signal and return its read/write accessor pair.
///
/// Both closures are cheap to clone and share one cell. Reading through the
/// getter participates in dependency tracking; writing through the setter
/// runs the full notify-and-schedule path.
///
/// ```rust,ignore
/// let (count, set_count) = create_signal(0);
/// create_effect(move || println!("count = {}", count()));
/// set_count(5);
/// ```
pub fn create_signal<T: Clone + 'static>(
    initial: T,
) -> (impl Fn() -> T + Clone, impl Fn(T) + Clone) {
    let signal = Signal::new(initial);
    let read = {
        let signal = signal.clone();
        move || signal.get()
    };
    let write = move |value| signal.set(value);
    (read, write)
}
