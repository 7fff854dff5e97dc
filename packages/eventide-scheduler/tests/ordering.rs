use eventide_scheduler::{Action, LocalScheduler, Scheduler};
use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;

type Log = Rc<RefCell<Vec<&'static str>>>;

fn push(log: &Log, entry: &'static str) -> Action {
    let log = log.clone();
    Action::new(move || log.borrow_mut().push(entry))
}

#[test]
fn test_execution_order() {
    let log: Log = Rc::default();

    eventide_scheduler::run(|scheduler| {
        // Schedule tasks in mixed order
        scheduler.schedule_macrotask(push(&log, "macrotask"), Duration::ZERO);
        scheduler.schedule_microtask(push(&log, "microtask"));
        scheduler.schedule_next_tick(push(&log, "next-tick"));
        scheduler.schedule_immediate(push(&log, "immediate"));
    })
    .unwrap();

    // Immediate -> NextTick -> Microtask -> Macrotask
    let expected = vec!["immediate", "next-tick", "microtask", "macrotask"];
    assert_eq!(*log.borrow(), expected);
}

#[test]
fn test_sync_then_micro_then_macro() {
    let log: Log = Rc::default();

    eventide_scheduler::run(|scheduler| {
        scheduler.schedule_immediate(push(&log, "A"));
        scheduler.schedule_macrotask(push(&log, "B"), Duration::ZERO);
        scheduler.schedule_microtask(push(&log, "C"));
        scheduler.schedule_immediate(push(&log, "D"));
    })
    .unwrap();

    assert_eq!(*log.borrow(), vec!["A", "D", "C", "B"]);
}

#[test]
fn test_microtask_chaining() {
    // Microtasks scheduled by microtasks run in the same checkpoint
    let log: Log = Rc::default();

    eventide_scheduler::run(|scheduler| {
        let sch = scheduler.clone();
        let log2 = log.clone();
        scheduler.schedule_microtask(Action::new(move || {
            log2.borrow_mut().push("X");
            sch.schedule_microtask(push(&log2, "Y"));
        }));
        scheduler.schedule_macrotask(push(&log, "Z"), Duration::ZERO);
    })
    .unwrap();

    assert_eq!(*log.borrow(), vec!["X", "Y", "Z"]);
}

#[test]
fn test_microtasks_before_first_macrotask() {
    let log: Log = Rc::default();

    eventide_scheduler::run(|scheduler| {
        for entry in ["m1", "m2", "m3", "m4"] {
            scheduler.schedule_microtask(push(&log, entry));
        }
        scheduler.schedule_macrotask(push(&log, "t"), Duration::ZERO);
    })
    .unwrap();

    assert_eq!(*log.borrow(), vec!["m1", "m2", "m3", "m4", "t"]);
}

#[test]
fn test_macrotask_drains_its_microtasks_before_next_macrotask() {
    let log: Log = Rc::default();

    eventide_scheduler::run(|scheduler| {
        for (task, micro) in [("t1", "t1.m"), ("t2", "t2.m")] {
            let sch = scheduler.clone();
            let log2 = log.clone();
            scheduler.schedule_macrotask(
                Action::new(move || {
                    log2.borrow_mut().push(task);
                    sch.schedule_microtask(push(&log2, micro));
                }),
                Duration::ZERO,
            );
        }
    })
    .unwrap();

    assert_eq!(*log.borrow(), vec!["t1", "t1.m", "t2", "t2.m"]);
}

#[test]
fn test_delay_does_not_reorder_macrotasks() {
    let log: Log = Rc::default();

    eventide_scheduler::run(|scheduler| {
        scheduler.schedule_macrotask(push(&log, "slow"), Duration::from_millis(500));
        scheduler.schedule_macrotask(push(&log, "fast"), Duration::ZERO);
        scheduler.schedule_macrotask(push(&log, "tie"), Duration::ZERO);
    })
    .unwrap();

    assert_eq!(*log.borrow(), vec!["slow", "fast", "tie"]);
}

#[test]
fn test_immediate_inside_microtask_runs_inline() {
    let scheduler = Rc::new(LocalScheduler::new());
    let log: Log = Rc::default();

    {
        let sch = scheduler.clone();
        let log2 = log.clone();
        scheduler.schedule_microtask(Action::new(move || {
            log2.borrow_mut().push("outer:start");
            sch.schedule_immediate(push(&log2, "inner"));
            log2.borrow_mut().push("outer:end");
        }));
    }

    scheduler.run_to_completion().unwrap();
    assert_eq!(*log.borrow(), vec!["outer:start", "inner", "outer:end"]);
}
