//! Filament Core
//!
//! This crate provides the reactive runtime for the Filament declarative UI
//! framework. It implements:
//!
//! - Reactive primitives (signals, memos, effects, bindings)
//! - Automatic dependency tracking
//! - A cooperative single-threaded scheduler
//! - Animated-transaction context for batching mutations
//!
//! The widget layer sits on top: builders create effects whose bodies read
//! signals and push the values into native widgets, and event handlers write
//! signals back. This crate is that layer's engine and knows nothing about
//! widgets.
//!
//! # Architecture
//!
//! - `reactive`: signals, memos, effects, bindings, and dependency tracking
//! - `scheduler`: the FIFO tick queue that defers effect re-runs
//! - `animation`: animation descriptors and the `with_animation` window
//!
//! # Example
//!
//! ```rust,ignore
//! use filament_core::{create_effect, create_signal, scheduler};
//!
//! let (count, set_count) = create_signal(0);
//!
//! let _effect = create_effect(move || {
//!     println!("count = {}", count());
//! }); // prints "count = 0"
//!
//! set_count(5);
//! scheduler::tick(); // prints "count = 5"
//! ```
//!
//! # Threading
//!
//! The whole runtime is confined to the thread that drives the scheduler:
//! one logical UI thread creates signals and effects, performs every read
//! and write, and calls `scheduler::tick()` once per run loop iteration.

pub mod animation;
pub mod reactive;
pub mod scheduler;

pub use animation::{
    set_animation_backend, with_animation, Animation, AnimationBackend, AnimationContext, Easing,
    Spring,
};
pub use reactive::{
    create_effect, create_memo, create_signal, Binding, Effect, Memo, MemoState, Signal, SourceId,
    SubscriberId, TrackingScope,
};
