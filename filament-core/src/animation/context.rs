//! Animation context.
//!
//! A single thread-confined slot holding the animation that effect re-runs
//! should apply their mutations under. [`with_animation`] fills the slot for
//! exactly the window in which the re-runs caused by its body can observe
//! it:
//!
//! 1. the slot is set and `body` runs synchronously;
//! 2. writes inside `body` queue effect re-runs on the scheduler;
//! 3. a cleanup job is queued *behind* those re-runs;
//! 4. on the next tick the re-runs execute, read the slot, and then the
//!    cleanup clears it.
//!
//! Re-runs queued by later, unrelated writes therefore see an empty slot.
//!
//! Nesting `with_animation` is last-write-wins: the slot is not a stack and
//! the previous descriptor is not restored when an inner call returns.

use std::cell::RefCell;

use tracing::trace;

use crate::scheduler;

use super::Animation;

thread_local! {
    static CURRENT: RefCell<Option<Animation>> = RefCell::new(None);
}

/// The thread-confined animation slot.
pub struct AnimationContext;

impl AnimationContext {
    /// The descriptor governing effect re-runs on the current tick, if any.
    ///
    /// Effect bodies that mutate animatable widget properties check this and
    /// route the mutation through [`Animation::perform`] when it is set.
    pub fn current() -> Option<Animation> {
        CURRENT.with(|slot| slot.borrow().clone())
    }

    fn set(animation: Option<Animation>) {
        CURRENT.with(|slot| *slot.borrow_mut() = animation);
    }
}

/// Run `body` with `animation` as the current descriptor.
///
/// Every effect re-run triggered by state mutations inside `body` observes
/// the descriptor; the slot is cleared by a job queued behind those re-runs.
///
/// ```rust,ignore
/// button("Toggle", move || {
///     with_animation(Animation::ease_in_out(0.3), || {
///         expanded.update(|e| !e);
///     });
/// });
/// ```
pub fn with_animation<F: FnOnce()>(animation: Animation, body: F) {
    trace!(duration = animation.duration, "with_animation");
    AnimationContext::set(Some(animation));
    body();

    // Queued after the re-runs the body's writes scheduled, so those runs
    // still see the descriptor and later ticks do not.
    scheduler::schedule_job(|| AnimationContext::set(None));
}
