use crate::action::Action;
use crate::error::{ActionError, SchedulerError};
use crate::scheduler::LocalScheduler;
use crate::Scheduler;
use smallvec::SmallVec;
use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};
use std::time::Duration;

type Reaction<T> = Box<dyn FnOnce(&T)>;

enum State<T> {
    Pending(SmallVec<[Reaction<T>; 2]>),
    Resolved(Rc<T>),
}

/// Single-assignment value whose reactions run as microtasks.
///
/// Reactions registered before `resolve` are queued in registration order
/// when it happens; reactions registered afterwards are queued right away.
/// Either way a reaction never runs synchronously inside `then` or
/// `resolve`.
pub struct Deferred<T> {
    state: Rc<RefCell<State<T>>>,
    scheduler: Weak<LocalScheduler>,
}

impl<T> Clone for Deferred<T> {
    fn clone(&self) -> Self {
        Self {
            state: self.state.clone(),
            scheduler: self.scheduler.clone(),
        }
    }
}

impl<T: 'static> Deferred<T> {
    pub fn new(scheduler: &Rc<LocalScheduler>) -> Self {
        Self {
            state: Rc::new(RefCell::new(State::Pending(SmallVec::new()))),
            scheduler: Rc::downgrade(scheduler),
        }
    }

    /// An already-settled value.
    pub fn resolved(scheduler: &Rc<LocalScheduler>, value: T) -> Self {
        Self {
            state: Rc::new(RefCell::new(State::Resolved(Rc::new(value)))),
            scheduler: Rc::downgrade(scheduler),
        }
    }

    pub fn is_resolved(&self) -> bool {
        matches!(*self.state.borrow(), State::Resolved(_))
    }

    pub fn then(&self, reaction: impl FnOnce(&T) + 'static) {
        let value = match &mut *self.state.borrow_mut() {
            State::Pending(reactions) => {
                reactions.push(Box::new(reaction));
                return;
            }
            State::Resolved(value) => value.clone(),
        };
        self.enqueue(value, Box::new(reaction));
    }

    pub fn resolve(&self, value: T) -> Result<(), SchedulerError> {
        let value = Rc::new(value);
        let previous = std::mem::replace(
            &mut *self.state.borrow_mut(),
            State::Resolved(value.clone()),
        );
        let reactions = match previous {
            State::Pending(reactions) => reactions,
            State::Resolved(original) => {
                *self.state.borrow_mut() = State::Resolved(original);
                return Err(SchedulerError::AlreadyResolved);
            }
        };
        tracing::trace!(reactions = reactions.len(), "deferred resolved");
        for reaction in reactions {
            self.enqueue(value.clone(), reaction);
        }
        Ok(())
    }

    fn enqueue(&self, value: Rc<T>, reaction: Reaction<T>) {
        match self.scheduler.upgrade() {
            Some(scheduler) => scheduler.schedule_microtask(
                Action::new(move || reaction(&value)).with_label("deferred reaction"),
            ),
            None => tracing::warn!("deferred reaction dropped, scheduler is gone"),
        }
    }
}

impl<T> fmt::Debug for Deferred<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = match &*self.state.borrow() {
            State::Pending(reactions) => format!("pending({} reactions)", reactions.len()),
            State::Resolved(_) => "resolved".to_string(),
        };
        f.debug_struct("Deferred").field("state", &state).finish()
    }
}

impl LocalScheduler {
    pub fn deferred<T: 'static>(self: &Rc<Self>) -> Deferred<T> {
        Deferred::new(self)
    }

    /// Resolve a new deferred from a macrotask tagged with `delay`, the way a
    /// timer callback settles a value it was waiting on.
    pub fn defer_after<T: 'static>(
        self: &Rc<Self>,
        delay: Duration,
        produce: impl FnOnce() -> T + 'static,
    ) -> Deferred<T> {
        let deferred = Deferred::new(self);
        let target = deferred.clone();
        self.schedule_macrotask(
            Action::fallible(move || target.resolve(produce()).map_err(ActionError::failed))
                .with_label("deferred timer"),
            delay,
        );
        deferred
    }
}
