use crate::action::Action;
use std::cell::RefCell;
use std::collections::VecDeque;

/// A simple FIFO queue for tasks.
/// Since LocalScheduler is single-threaded, we use RefCell<VecDeque>.
///
/// The borrow is released before a popped task runs, so a running task may
/// push back onto the queue it came from.
pub struct TaskQueue<T = Action> {
    queue: RefCell<VecDeque<T>>,
}

impl<T> Default for TaskQueue<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> TaskQueue<T> {
    pub fn new() -> Self {
        Self {
            queue: RefCell::new(VecDeque::new()),
        }
    }

    pub fn push(&self, task: T) {
        self.queue.borrow_mut().push_back(task);
    }

    pub fn pop(&self) -> Option<T> {
        self.queue.borrow_mut().pop_front()
    }

    pub fn len(&self) -> usize {
        self.queue.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.borrow().is_empty()
    }

    /// Drop everything still queued, returning how many tasks were discarded.
    /// Tasks are dropped after the borrow is released, so a task whose
    /// captures push onto this queue while being dropped does not panic.
    pub fn clear(&self) -> usize {
        let drained = std::mem::take(&mut *self.queue.borrow_mut());
        drained.len()
    }
}
