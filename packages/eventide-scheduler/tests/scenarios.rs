use eventide_scheduler::{Action, Deferred, Scheduler};
use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;

type Log = Rc<RefCell<Vec<String>>>;

fn say(log: &Log, line: &str) -> Action {
    let log = log.clone();
    let line = line.to_string();
    Action::new(move || log.borrow_mut().push(line))
}

#[test]
fn test_timeout_vs_resolved_promise() {
    let log: Log = Rc::default();

    eventide_scheduler::run(|s| {
        s.schedule_immediate(say(&log, "Start"));
        s.schedule_macrotask(say(&log, "Timeout"), Duration::ZERO);
        let l = log.clone();
        Deferred::resolved(s, ()).then(move |_| l.borrow_mut().push("Promise resolved".into()));
        s.schedule_immediate(say(&log, "End"));
    })
    .unwrap();

    assert_eq!(
        *log.borrow(),
        vec!["Start", "End", "Promise resolved", "Timeout"]
    );
}

#[test]
fn test_next_tick_runs_before_promise_reactions() {
    let log: Log = Rc::default();

    eventide_scheduler::run(|s| {
        s.schedule_immediate(say(&log, "1. Sync"));
        s.schedule_macrotask(say(&log, "2. setTimeout"), Duration::ZERO);
        s.schedule_next_tick(say(&log, "4. nextTick"));
        let l = log.clone();
        Deferred::resolved(s, ()).then(move |_| l.borrow_mut().push("Promise resolved".into()));
        s.schedule_immediate(say(&log, "5. Sync"));
    })
    .unwrap();

    assert_eq!(
        *log.borrow(),
        vec![
            "1. Sync",
            "5. Sync",
            "4. nextTick",
            "Promise resolved",
            "2. setTimeout"
        ]
    );
}

#[test]
fn test_timer_backed_value_reaches_its_reaction() {
    let log: Log = Rc::default();

    eventide_scheduler::run(|s| {
        let user = s.defer_after(Duration::from_millis(1000), || "User data from API");
        let l = log.clone();
        user.then(move |data| l.borrow_mut().push(format!("API Result: {data}")));
        s.schedule_immediate(say(&log, "waiting"));
        s.schedule_macrotask(say(&log, "later timer"), Duration::ZERO);
    })
    .unwrap();

    // The deferred timer was registered first, so it resolves first and its
    // reaction drains before the second macrotask.
    assert_eq!(
        *log.borrow(),
        vec!["waiting", "API Result: User data from API", "later timer"]
    );
}
