//! Tracking Scope
//!
//! The tracking scope records which computation is currently running. This
//! enables automatic dependency collection: when a signal is read, the
//! runtime can register the current computation as a dependent without the
//! caller naming its dependencies.
//!
//! # Implementation
//!
//! A thread-local stack holds one frame per computation currently executing.
//! Entering a scope (running an effect or memo) pushes a frame; the frame is
//! popped when the returned guard drops. The stack supports nesting, e.g. an
//! effect body that constructs another effect, or an effect that reads a
//! memo which has to recompute.
//!
//! Reads are recorded against the innermost frame only. An `untracked` frame
//! can be pushed to suppress collection for a region of code.

use std::cell::RefCell;

use smallvec::SmallVec;

use super::subscriber::{SourceId, SubscriberId};

thread_local! {
    static SCOPE_STACK: RefCell<Vec<Frame>> = RefCell::new(Vec::new());
}

/// Reads per run are typically a handful, so the frame buffer lives inline.
type ReadList = SmallVec<[SourceId; 8]>;

enum Frame {
    /// A computation is running; signal reads are recorded here.
    Tracking {
        subscriber_id: SubscriberId,
        reads: ReadList,
    },
    /// Collection is suppressed until this frame pops.
    Untracked,
}

/// Guard representing an active tracking scope.
///
/// Popping happens on drop, so the stack stays balanced even if the tracked
/// computation panics.
pub struct TrackingScope {
    subscriber_id: SubscriberId,
}

impl TrackingScope {
    /// Enter a new tracking scope for the given subscriber.
    ///
    /// While the scope is active, every reactive read registers the
    /// subscriber as a dependent of the source that was read.
    pub fn enter(subscriber_id: SubscriberId) -> Self {
        SCOPE_STACK.with(|stack| {
            stack.borrow_mut().push(Frame::Tracking {
                subscriber_id,
                reads: ReadList::new(),
            });
        });

        Self { subscriber_id }
    }

    /// Check whether reads are currently being collected.
    pub fn is_active() -> bool {
        SCOPE_STACK.with(|stack| {
            matches!(stack.borrow().last(), Some(Frame::Tracking { .. }))
        })
    }

    /// The subscriber whose reads are currently being collected, if any.
    pub fn current_subscriber() -> Option<SubscriberId> {
        SCOPE_STACK.with(|stack| match stack.borrow().last() {
            Some(Frame::Tracking { subscriber_id, .. }) => Some(*subscriber_id),
            _ => None,
        })
    }

    /// Record a read of `source` against the innermost tracking frame.
    ///
    /// Called by the runtime when a signal or memo is read.
    pub fn record_read(source: SourceId) {
        SCOPE_STACK.with(|stack| {
            if let Some(Frame::Tracking { reads, .. }) = stack.borrow_mut().last_mut() {
                reads.push(source);
            }
        });
    }

    /// The reads recorded so far in the innermost tracking frame.
    ///
    /// May contain duplicates when the same source was read more than once.
    pub fn current_reads() -> Vec<SourceId> {
        SCOPE_STACK.with(|stack| match stack.borrow().last() {
            Some(Frame::Tracking { reads, .. }) => reads.to_vec(),
            _ => Vec::new(),
        })
    }

    /// Run `body` with dependency collection suppressed.
    ///
    /// Reads inside `body` do not subscribe the current computation to
    /// anything.
    pub fn untracked<R>(body: impl FnOnce() -> R) -> R {
        SCOPE_STACK.with(|stack| stack.borrow_mut().push(Frame::Untracked));
        let guard = UntrackedGuard;
        let result = body();
        drop(guard);
        result
    }
}

impl Drop for TrackingScope {
    fn drop(&mut self) {
        SCOPE_STACK.with(|stack| {
            let popped = stack.borrow_mut().pop();

            // Catch mismatched enter/exit pairs early.
            if let Some(Frame::Tracking { subscriber_id, .. }) = popped {
                debug_assert_eq!(
                    subscriber_id, self.subscriber_id,
                    "TrackingScope mismatch: expected {:?}, got {:?}",
                    self.subscriber_id, subscriber_id
                );
            } else {
                debug_assert!(false, "TrackingScope dropped over a non-tracking frame");
            }
        });
    }
}

struct UntrackedGuard;

impl Drop for UntrackedGuard {
    fn drop(&mut self) {
        SCOPE_STACK.with(|stack| {
            let popped = stack.borrow_mut().pop();
            debug_assert!(
                matches!(popped, Some(Frame::Untracked)),
                "untracked frame popped out of order"
            );
        });
    }
}
