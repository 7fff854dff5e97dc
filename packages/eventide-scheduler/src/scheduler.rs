use crate::action::Action;
use crate::config::SchedulerConfig;
use crate::error::{ErrorSink, SchedulerError};
use crate::external::Completion;
use crate::queue::TaskQueue;
use crate::stats::{Pending, RunStats, TaskClass};
use crate::Scheduler;
use std::cell::{Cell, RefCell};
use std::rc::Rc;
use std::time::Duration;

/// A macrotask plus the bookkeeping it was registered with.
/// `delay` is only a hint: macrotasks always leave the queue in FIFO order.
pub(crate) struct Macrotask {
    pub(crate) action: Action,
    pub(crate) delay: Duration,
    pub(crate) seq: u64,
}

/// Single-threaded scheduler with immediate, next-tick, microtask and
/// macrotask classes.
///
/// Actions that want to schedule more work capture an `Rc<LocalScheduler>`.
/// No queue borrow is held while an action runs, so re-entrant scheduling
/// from inside an action is always fine.
pub struct LocalScheduler {
    config: SchedulerConfig,
    next_ticks: TaskQueue,
    microtasks: TaskQueue,
    macrotasks: TaskQueue<Macrotask>,
    next_macrotask_seq: Cell<u64>,
    outstanding_completions: Cell<usize>,
    stats: RefCell<RunStats>,
}

impl Default for LocalScheduler {
    fn default() -> Self {
        Self::new()
    }
}

impl LocalScheduler {
    pub fn new() -> Self {
        Self::with_config(SchedulerConfig::default())
    }

    pub fn with_config(config: SchedulerConfig) -> Self {
        Self {
            config,
            next_ticks: TaskQueue::new(),
            microtasks: TaskQueue::new(),
            macrotasks: TaskQueue::new(),
            next_macrotask_seq: Cell::new(0),
            outstanding_completions: Cell::new(0),
            stats: RefCell::new(RunStats::default()),
        }
    }

    pub fn config(&self) -> &SchedulerConfig {
        &self.config
    }

    pub fn is_idle(&self) -> bool {
        self.next_ticks.is_empty() && self.microtasks.is_empty() && self.macrotasks.is_empty()
    }

    pub fn pending(&self) -> Pending {
        Pending {
            next_tick: self.next_ticks.len(),
            microtask: self.microtasks.len(),
            macrotask: self.macrotasks.len(),
        }
    }

    pub fn stats(&self) -> RunStats {
        *self.stats.borrow()
    }

    /// External completions handed out and not yet completed or dropped.
    pub fn outstanding_completions(&self) -> usize {
        self.outstanding_completions.get()
    }

    /// Hand `action` to an external system. The returned token pushes it
    /// onto the macrotask queue when completed.
    pub fn external(self: &Rc<Self>, action: Action) -> Completion {
        self.outstanding_completions
            .set(self.outstanding_completions.get() + 1);
        Completion::new(Rc::downgrade(self), action)
    }

    pub(crate) fn release_completion(&self) {
        let outstanding = self.outstanding_completions.get();
        self.outstanding_completions
            .set(outstanding.saturating_sub(1));
    }

    /// Run one microtask checkpoint: next-tick actions first, then the
    /// microtask queue, repeating until both are empty. Work enqueued during
    /// the checkpoint is part of the same checkpoint.
    pub fn drain_microtasks(&self) -> Result<(), SchedulerError> {
        let mut spent = 0usize;
        loop {
            while let Some(action) = self.next_ticks.pop() {
                self.charge(&mut spent)?;
                self.execute(TaskClass::NextTick, action);
            }
            if self.microtasks.is_empty() {
                break;
            }
            while let Some(action) = self.microtasks.pop() {
                self.charge(&mut spent)?;
                self.execute(TaskClass::Microtask, action);
            }
        }
        if spent > 0 {
            tracing::trace!(actions = spent, "microtask checkpoint finished");
        }
        Ok(())
    }

    /// One event-loop turn: checkpoint, at most one macrotask, checkpoint.
    /// Returns whether any work is still queued afterwards.
    pub fn tick(&self) -> Result<bool, SchedulerError> {
        self.drain_microtasks()?;
        if let Some(task) = self.macrotasks.pop() {
            self.run_macrotask(task)?;
        }
        Ok(!self.is_idle())
    }

    /// Drive every queue until all of them are empty. This loop is the only
    /// place where class ordering is decided.
    pub fn run_to_completion(&self) -> Result<(), SchedulerError> {
        self.drain_microtasks()?;
        while let Some(task) = self.macrotasks.pop() {
            self.run_macrotask(task)?;
        }
        debug_assert!(self.is_idle());
        Ok(())
    }

    fn run_macrotask(&self, task: Macrotask) -> Result<(), SchedulerError> {
        tracing::debug!(
            seq = task.seq,
            delay = ?task.delay,
            label = ?task.action.label(),
            "running macrotask"
        );
        self.execute(TaskClass::Macrotask, task.action);
        self.drain_microtasks()
    }

    fn charge(&self, spent: &mut usize) -> Result<(), SchedulerError> {
        *spent += 1;
        match self.config.microtask_budget {
            Some(limit) if *spent > limit => {
                let discarded = self.discard_all();
                tracing::warn!(limit, discarded, "microtask budget exceeded, aborting run");
                Err(SchedulerError::MicrotaskBudgetExceeded { limit })
            }
            _ => Ok(()),
        }
    }

    pub(crate) fn discard_all(&self) -> usize {
        self.next_ticks.clear() + self.microtasks.clear() + self.macrotasks.clear()
    }

    fn execute(&self, class: TaskClass, action: Action) {
        tracing::trace!(%class, label = ?action.label(), "executing action");
        let outcome = action.invoke(self.config.catch_panics);
        self.stats.borrow_mut().record(class, outcome.is_ok());
        if let Err(error) = outcome {
            self.config.error_sink.report(&error);
        }
    }
}

/// Clears every queue when dropped, including while unwinding out of an
/// action run with `catch_panics(false)`. Queued actions that hold an
/// `Rc<LocalScheduler>` are released with them.
pub(crate) struct DiscardOnDrop<'a>(pub(crate) &'a LocalScheduler);

impl Drop for DiscardOnDrop<'_> {
    fn drop(&mut self) {
        let discarded = self.0.discard_all();
        if discarded > 0 {
            tracing::debug!(discarded, "discarded queued actions at end of run");
        }
    }
}

impl Scheduler for LocalScheduler {
    fn schedule_immediate(&self, action: Action) {
        self.execute(TaskClass::Immediate, action);
    }

    fn schedule_next_tick(&self, action: Action) {
        self.next_ticks.push(action);
    }

    fn schedule_microtask(&self, action: Action) {
        self.microtasks.push(action);
    }

    fn schedule_macrotask(&self, action: Action, delay: Duration) {
        let seq = self.next_macrotask_seq.get();
        self.next_macrotask_seq.set(seq + 1);
        self.macrotasks.push(Macrotask { action, delay, seq });
    }
}
