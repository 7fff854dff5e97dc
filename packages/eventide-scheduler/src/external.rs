use crate::action::Action;
use crate::scheduler::LocalScheduler;
use crate::Scheduler;
use std::fmt;
use std::rc::Weak;
use std::time::Duration;

/// Token for work that has been handed to something outside the scheduler
/// (a timer, a socket, another thread's reply). Completing it is an explicit
/// macrotask insertion; nothing runs until then.
///
/// Holds only a weak reference, so a token outliving its scheduler is inert.
pub struct Completion {
    scheduler: Weak<LocalScheduler>,
    action: Option<Action>,
}

impl Completion {
    pub(crate) fn new(scheduler: Weak<LocalScheduler>, action: Action) -> Self {
        Self {
            scheduler,
            action: Some(action),
        }
    }

    /// Push the continuation onto the macrotask queue.
    /// Returns `false` if the scheduler is already gone.
    pub fn complete(mut self) -> bool {
        let Some(action) = self.action.take() else {
            return false;
        };
        match self.scheduler.upgrade() {
            Some(scheduler) => {
                scheduler.release_completion();
                scheduler.schedule_macrotask(action, Duration::ZERO);
                true
            }
            None => {
                tracing::warn!(label = ?action.label(), "completion fired after its scheduler was dropped");
                false
            }
        }
    }
}

impl Drop for Completion {
    fn drop(&mut self) {
        let Some(action) = self.action.take() else {
            return;
        };
        tracing::warn!(label = ?action.label(), "external completion dropped without completing");
        if let Some(scheduler) = self.scheduler.upgrade() {
            scheduler.release_completion();
        }
    }
}

impl fmt::Debug for Completion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Completion")
            .field("action", &self.action)
            .field("attached", &(self.scheduler.strong_count() > 0))
            .finish()
    }
}
