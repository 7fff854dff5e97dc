use crate::error::ActionError;
use std::any::Any;
use std::borrow::Cow;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};

pub type ActionResult = Result<(), ActionError>;

/// A zero-argument unit of work handed to the scheduler.
///
/// Actions are `'static` and not `Send`: anything they need from the
/// surrounding program has to be moved in, usually behind an `Rc`.
pub struct Action {
    label: Option<Cow<'static, str>>,
    body: Box<dyn FnOnce() -> ActionResult>,
}

impl Action {
    /// Wrap an infallible closure.
    pub fn new(f: impl FnOnce() + 'static) -> Self {
        Self::fallible(move || {
            f();
            Ok(())
        })
    }

    /// Wrap a closure that reports failure through its return value.
    pub fn fallible(f: impl FnOnce() -> ActionResult + 'static) -> Self {
        Self {
            label: None,
            body: Box::new(f),
        }
    }

    /// Name the action in traces and error reports.
    pub fn with_label(mut self, label: impl Into<Cow<'static, str>>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn label(&self) -> Option<&str> {
        self.label.as_deref()
    }

    /// Run the action to completion. A caught panic is turned into
    /// [`ActionError::Panicked`]; without `catch_panics` it unwinds through
    /// the scheduler.
    pub(crate) fn invoke(self, catch_panics: bool) -> ActionResult {
        let Action { label, body } = self;
        let outcome = if catch_panics {
            match panic::catch_unwind(AssertUnwindSafe(body)) {
                Ok(outcome) => outcome,
                Err(payload) => Err(ActionError::Panicked {
                    label: None,
                    message: panic_message(&*payload),
                }),
            }
        } else {
            body()
        };
        outcome.map_err(|err| err.with_label(label.as_deref()))
    }
}

impl fmt::Debug for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Action")
            .field("label", &self.label)
            .finish_non_exhaustive()
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "non-string panic payload".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::rc::Rc;

    #[test]
    fn test_infallible_action_runs_once() {
        let hits = Rc::new(Cell::new(0));
        let action = {
            let hits = hits.clone();
            Action::new(move || hits.set(hits.get() + 1))
        };
        assert!(action.invoke(true).is_ok());
        assert_eq!(hits.get(), 1);
    }

    #[test]
    fn test_failure_carries_label() {
        let action = Action::fallible(|| Err(ActionError::failed("nope"))).with_label("load");
        let err = action.invoke(true).unwrap_err();
        assert_eq!(err.label(), Some("load"));
        assert_eq!(err.message(), "nope");
        assert!(!err.is_panic());
    }

    #[test]
    fn test_panic_is_caught() {
        let action = Action::new(|| panic!("kaboom")).with_label("bad");
        let err = action.invoke(true).unwrap_err();
        assert!(err.is_panic());
        assert_eq!(err.message(), "kaboom");
        assert_eq!(err.label(), Some("bad"));
    }

    #[test]
    fn test_uncaught_panic_unwinds() {
        let action = Action::new(|| panic!("escapes"));
        let payload = panic::catch_unwind(AssertUnwindSafe(|| action.invoke(false))).unwrap_err();
        assert_eq!(payload.downcast_ref::<&str>(), Some(&"escapes"));
    }

    #[test]
    fn test_formatted_panic_message() {
        let n = 7;
        let err = Action::new(move || panic!("bad value {n}"))
            .invoke(true)
            .unwrap_err();
        assert_eq!(err.message(), "bad value 7");
    }
}
