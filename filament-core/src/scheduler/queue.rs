//! The tick queue.
//!
//! A single FIFO of deferred work, drained one tick at a time. Two kinds of
//! task go in: observer re-runs (queued by the runtime when a signal write
//! notifies an effect) and one-shot jobs (the animation context uses one to
//! clear itself after the re-runs it influenced).

use std::cell::RefCell;
use std::collections::{HashSet, VecDeque};
use std::rc::Weak;

use tracing::trace;

use crate::reactive::Observer;
use crate::reactive::SubscriberId;

thread_local! {
    static QUEUE: RefCell<TickQueue> = RefCell::new(TickQueue::default());
}

enum Task {
    /// A deferred observer re-run. Held weakly: if the observer died between
    /// scheduling and the tick, the task is a no-op.
    Run(Weak<dyn Observer>),

    /// A one-shot job.
    Job(Box<dyn FnOnce()>),
}

#[derive(Default)]
struct TickQueue {
    tasks: VecDeque<Task>,

    /// Subscribers already queued for the pending tick. Re-scheduling one of
    /// them is a no-op, so an effect whose dependencies are written several
    /// times in one synchronous block still runs once per tick.
    queued: HashSet<SubscriberId>,
}

/// Queue an observer re-run for the next tick.
///
/// De-duplicated per tick by subscriber id.
pub(crate) fn schedule_observer(id: SubscriberId, observer: Weak<dyn Observer>) {
    QUEUE.with(|queue| {
        let mut queue = queue.borrow_mut();
        if queue.queued.insert(id) {
            queue.tasks.push_back(Task::Run(observer));
        }
    });
}

/// Queue a one-shot job behind everything queued before it.
pub fn schedule_job(job: impl FnOnce() + 'static) {
    QUEUE.with(|queue| {
        queue.borrow_mut().tasks.push_back(Task::Job(Box::new(job)));
    });
}

/// Drain the tasks queued so far, in submission order.
///
/// Tasks enqueued while draining (an effect body writing a signal) land on
/// the next tick. Returns the number of tasks executed.
pub fn tick() -> usize {
    let drained: Vec<Task> = QUEUE.with(|queue| {
        let mut queue = queue.borrow_mut();
        queue.queued.clear();
        queue.tasks.drain(..).collect()
    });

    let count = drained.len();
    for task in drained {
        match task {
            Task::Run(observer) => {
                if let Some(observer) = observer.upgrade() {
                    observer.run();
                }
            }
            Task::Job(job) => job(),
        }
    }

    if count > 0 {
        trace!(tasks = count, "tick");
    }
    count
}

/// Check whether the queue is empty.
pub fn is_idle() -> bool {
    QUEUE.with(|queue| queue.borrow().tasks.is_empty())
}

/// Number of tasks waiting for the next tick.
pub fn pending() -> usize {
    QUEUE.with(|queue| queue.borrow().tasks.len())
}

/// Tick until the queue is empty.
///
/// An effect that re-queues itself on every run (writing a signal it also
/// reads) makes this loop forever; that is a caller contract violation, the
/// same one that loops any reactive runtime.
pub fn run_until_idle() -> usize {
    let mut total = 0;
    while !is_idle() {
        total += tick();
    }
    total
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[test]
    fn jobs_run_in_submission_order() {
        let log: Rc<RefCell<Vec<u32>>> = Rc::new(RefCell::new(Vec::new()));

        for n in 0..4 {
            let log = log.clone();
            schedule_job(move || log.borrow_mut().push(n));
        }

        assert_eq!(pending(), 4);
        assert_eq!(tick(), 4);
        assert_eq!(*log.borrow(), vec![0, 1, 2, 3]);
        assert!(is_idle());
    }

    #[test]
    fn jobs_enqueued_during_tick_run_next_tick() {
        let log: Rc<RefCell<Vec<&'static str>>> = Rc::new(RefCell::new(Vec::new()));

        let inner_log = log.clone();
        schedule_job(move || {
            inner_log.borrow_mut().push("first");
            let late_log = inner_log.clone();
            schedule_job(move || late_log.borrow_mut().push("second"));
        });

        assert_eq!(tick(), 1);
        assert_eq!(*log.borrow(), vec!["first"]);
        assert_eq!(pending(), 1);

        assert_eq!(tick(), 1);
        assert_eq!(*log.borrow(), vec!["first", "second"]);
    }

    #[test]
    fn run_until_idle_drains_chained_ticks() {
        let log: Rc<RefCell<Vec<u32>>> = Rc::new(RefCell::new(Vec::new()));

        let outer = log.clone();
        schedule_job(move || {
            outer.borrow_mut().push(1);
            let inner = outer.clone();
            schedule_job(move || inner.borrow_mut().push(2));
        });

        assert_eq!(run_until_idle(), 2);
        assert_eq!(*log.borrow(), vec![1, 2]);
    }

    #[test]
    fn tick_on_empty_queue_is_a_no_op() {
        assert!(is_idle());
        assert_eq!(tick(), 0);
    }
}
