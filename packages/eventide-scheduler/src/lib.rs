//! Deterministic callback ordering for a single-threaded event loop.
//!
//! Work is registered under one of four classes and always runs in class
//! order: immediate actions inline, then a microtask checkpoint (next-tick
//! queue, then microtask queue, each drained to exhaustion), then one
//! macrotask at a time with a full checkpoint after each.
//!
//! ```
//! use eventide_scheduler::{Action, Scheduler};
//! use std::cell::RefCell;
//! use std::rc::Rc;
//! use std::time::Duration;
//!
//! let log = Rc::new(RefCell::new(Vec::new()));
//! let push = |entry: &'static str| {
//!     let log = log.clone();
//!     Action::new(move || log.borrow_mut().push(entry))
//! };
//!
//! eventide_scheduler::run(|s| {
//!     s.schedule_immediate(push("A"));
//!     s.schedule_macrotask(push("B"), Duration::ZERO);
//!     s.schedule_microtask(push("C"));
//!     s.schedule_immediate(push("D"));
//! })
//! .unwrap();
//!
//! assert_eq!(*log.borrow(), vec!["A", "D", "C", "B"]);
//! ```

pub mod action;
pub mod config;
pub mod deferred;
pub mod error;
pub mod external;
pub mod queue;
pub mod scheduler;
pub mod stats;

use std::rc::Rc;
use std::time::Duration;

/// Registration API shared by scheduler implementations.
pub trait Scheduler {
    /// Run `action` right now, before returning to the caller.
    fn schedule_immediate(&self, action: Action);

    /// Queue ahead of every pending microtask at the next checkpoint.
    fn schedule_next_tick(&self, action: Action);

    /// Queue for the next microtask checkpoint.
    fn schedule_microtask(&self, action: Action);

    /// Queue as a macrotask. `delay` is recorded for diagnostics only;
    /// macrotasks run in FIFO order whatever their delay.
    fn schedule_macrotask(&self, action: Action, delay: Duration);
}

pub use action::{Action, ActionResult};
pub use config::{SchedulerConfig, SchedulerConfigBuilder};
pub use deferred::Deferred;
pub use error::{ActionError, ErrorSink, SchedulerError, TracingSink};
pub use external::Completion;
pub use scheduler::LocalScheduler;
pub use stats::{ClassStats, Pending, RunReport, RunStats, TaskClass};

/// Run `program` on a fresh scheduler with the default configuration and
/// drive it to completion. The queues are discarded when this returns,
/// whether it returns normally, with an error, or by unwinding.
pub fn run<F>(program: F) -> Result<RunReport, SchedulerError>
where
    F: FnOnce(&Rc<LocalScheduler>),
{
    run_with(SchedulerConfig::default(), program)
}

pub fn run_with<F>(config: SchedulerConfig, program: F) -> Result<RunReport, SchedulerError>
where
    F: FnOnce(&Rc<LocalScheduler>),
{
    let scheduler = Rc::new(LocalScheduler::with_config(config));
    let _span = tracing::debug_span!("run").entered();
    let _discard = crate::scheduler::DiscardOnDrop(&scheduler);

    program(&scheduler);
    scheduler.run_to_completion()?;

    let report = RunReport {
        stats: scheduler.stats(),
        outstanding_completions: scheduler.outstanding_completions(),
    };
    if report.outstanding_completions > 0 {
        tracing::warn!(
            outstanding = report.outstanding_completions,
            "run finished with external completions still pending"
        );
    }
    tracing::debug!(
        executed = report.stats.executed(),
        failed = report.stats.failed(),
        "run complete"
    );
    Ok(report)
}
