//! Reactive Primitives
//!
//! This module implements the core reactive system: signals, memos, effects,
//! and bindings. These primitives keep built widget trees in sync with
//! mutable state without a diff pass.
//!
//! # Concepts
//!
//! ## Signals
//!
//! A Signal is a container for mutable state. When a signal is read inside a
//! tracking scope (an effect or memo run), the signal automatically
//! registers that computation as a dependent. When the signal is written,
//! all dependents are notified.
//!
//! ## Effects
//!
//! An Effect is a side-effecting computation that re-runs whenever one of
//! its dependencies changes. Effects synchronize reactive state with the
//! outside world, typically by mutating a built widget. Re-runs are queued
//! on the [scheduler](crate::scheduler) and happen on the next tick, never
//! inline in the write that triggered them.
//!
//! ## Memos
//!
//! A Memo is a derived value that caches its result and recomputes only
//! when a dependency has changed. Memos are read like signals and can be
//! depended on by effects and other memos.
//!
//! ## Bindings
//!
//! A Binding is a read/write accessor pair projected from a signal (or any
//! get/set closures), used to pass mutable access across component
//! boundaries without exposing the cell.
//!
//! # Implementation Notes
//!
//! Dependency detection is automatic: a thread-local scope stack records the
//! computation currently running, and every reactive read registers against
//! it. This approach (sometimes called "automatic dependency tracking" or
//! "transparent reactivity") is used by SolidJS, Vue 3, and Leptos.

mod binding;
mod context;
mod effect;
mod memo;
mod runtime;
mod signal;
mod subscriber;

pub use binding::Binding;
pub use context::TrackingScope;
pub use effect::{create_effect, Effect};
pub use memo::{create_memo, Memo, MemoState};
pub use runtime::Runtime;
pub use signal::{create_signal, Signal};
pub use subscriber::{SourceId, SubscriberId};

pub(crate) use subscriber::Observer;
