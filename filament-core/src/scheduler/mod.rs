//! Cooperative Scheduler
//!
//! Signal writes never run effects inline. Instead, each affected effect is
//! queued here and runs when the embedding run loop drains the queue with
//! [`tick`]. This gives every mutation "runs after the current call stack,
//! before the next external event" semantics without an async runtime:
//!
//! - a single mutation observed by many effects cannot recurse,
//! - several mutations in one synchronous block coalesce onto one tick,
//! - ordering is deterministic (FIFO in submission order).
//!
//! The queue is thread-local. The thread that creates signals and effects is
//! the thread that must call [`tick`]; a UI embedding calls it once per run
//! loop iteration.

mod queue;

pub use queue::{is_idle, pending, run_until_idle, schedule_job, tick};

pub(crate) use queue::schedule_observer;
