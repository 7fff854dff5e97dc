use eventide_scheduler::{Action, Deferred, RunReport, Scheduler, SchedulerError};
use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;

/// Lines emitted by a scenario, in the order the scheduler ran them.
pub struct Transcript {
    pub lines: Vec<String>,
    pub report: RunReport,
}

type Lines = Rc<RefCell<Vec<String>>>;

fn log(lines: &Lines, text: impl Into<String>) -> Action {
    let lines = lines.clone();
    let text = text.into();
    Action::new(move || lines.borrow_mut().push(text))
}

fn record<F>(program: F) -> Result<Transcript, SchedulerError>
where
    F: FnOnce(&Rc<eventide_scheduler::LocalScheduler>, &Lines),
{
    let lines: Lines = Rc::default();
    let report = eventide_scheduler::run(|scheduler| program(scheduler, &lines))?;
    let lines = lines.take();
    Ok(Transcript { lines, report })
}

/// Synchronous logs, a zero-delay timer and a resolved promise.
pub fn basic() -> Result<Transcript, SchedulerError> {
    record(|s, lines| {
        s.schedule_immediate(log(lines, "Start"));
        s.schedule_macrotask(log(lines, "Timeout"), Duration::ZERO);
        let l = lines.clone();
        Deferred::resolved(s, ()).then(move |_| l.borrow_mut().push("Promise resolved".into()));
        s.schedule_immediate(log(lines, "End"));
    })
}

/// Next-tick callbacks jump ahead of promise reactions.
pub fn next_tick() -> Result<Transcript, SchedulerError> {
    record(|s, lines| {
        s.schedule_immediate(log(lines, "1. Sync"));
        s.schedule_macrotask(log(lines, "2. setTimeout"), Duration::ZERO);
        s.schedule_next_tick(log(lines, "4. nextTick"));
        let l = lines.clone();
        Deferred::resolved(s, ()).then(move |_| l.borrow_mut().push("3. Promise".into()));
        s.schedule_immediate(log(lines, "5. Sync"));
    })
}

/// A value produced by a timer, observed through a reaction once it lands.
pub fn fetch(delay: Duration) -> Result<Transcript, SchedulerError> {
    record(|s, lines| {
        s.schedule_immediate(log(lines, "1. Sync"));
        let user = s.defer_after(delay, || "User data from API");
        let l = lines.clone();
        user.then(move |data| l.borrow_mut().push(format!("3. API Result: {data}")));
        s.schedule_immediate(log(lines, "2. Sync"));
    })
}
