use thiserror::Error;

/// Failure of a single action. Never fatal to a run: the scheduler hands it
/// to the configured [`ErrorSink`] and moves on to the next queued action.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ActionError {
    /// The action returned `Err`.
    #[error("action {} failed: {message}", display_label(.label))]
    Failed {
        label: Option<String>,
        message: String,
    },

    /// The action panicked and the panic was caught by the scheduler.
    #[error("action {} panicked: {message}", display_label(.label))]
    Panicked {
        label: Option<String>,
        message: String,
    },
}

impl ActionError {
    /// Build a `Failed` error from any displayable message.
    /// The label is filled in by the scheduler when the action carries one.
    pub fn failed(message: impl std::fmt::Display) -> Self {
        Self::Failed {
            label: None,
            message: message.to_string(),
        }
    }

    pub fn label(&self) -> Option<&str> {
        match self {
            Self::Failed { label, .. } | Self::Panicked { label, .. } => label.as_deref(),
        }
    }

    pub fn message(&self) -> &str {
        match self {
            Self::Failed { message, .. } | Self::Panicked { message, .. } => message,
        }
    }

    pub fn is_panic(&self) -> bool {
        matches!(self, Self::Panicked { .. })
    }

    /// Attach `label` unless the error already names its action.
    pub(crate) fn with_label(mut self, new_label: Option<&str>) -> Self {
        let (Self::Failed { label, .. } | Self::Panicked { label, .. }) = &mut self;
        if label.is_none() {
            *label = new_label.map(str::to_owned);
        }
        self
    }
}

fn display_label(label: &Option<String>) -> String {
    match label {
        Some(label) => format!("`{label}`"),
        None => "<anonymous>".to_string(),
    }
}

/// Scheduler-level faults. Only `MicrotaskBudgetExceeded` aborts a run;
/// `AlreadyResolved` is returned by [`Deferred::resolve`](crate::Deferred::resolve)
/// and never surfaces from `run` or `run_to_completion`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchedulerError {
    #[error("microtask checkpoint exceeded its budget of {limit} actions")]
    MicrotaskBudgetExceeded { limit: usize },

    #[error("deferred value was already resolved")]
    AlreadyResolved,
}

/// Receives every [`ActionError`] raised during a run.
pub trait ErrorSink {
    fn report(&self, error: &ActionError);
}

impl<F> ErrorSink for F
where
    F: Fn(&ActionError),
{
    fn report(&self, error: &ActionError) {
        self(error)
    }
}

/// Default sink: emits the error on the diagnostic channel through `tracing`.
///
/// Events go wherever the installed `tracing` subscriber sends them. With no
/// subscriber installed they are discarded, so install one (for example
/// `tracing_subscriber::fmt::init()`) or configure another sink with
/// [`SchedulerConfigBuilder::error_sink`](crate::SchedulerConfigBuilder::error_sink).
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl ErrorSink for TracingSink {
    fn report(&self, error: &ActionError) {
        tracing::error!(label = ?error.label(), panicked = error.is_panic(), "{}", error);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_names_the_action() {
        let err = ActionError::failed("boom").with_label(Some("fetch"));
        assert_eq!(err.to_string(), "action `fetch` failed: boom");

        let anon = ActionError::Panicked {
            label: None,
            message: "oops".into(),
        };
        assert_eq!(anon.to_string(), "action <anonymous> panicked: oops");
    }

    #[test]
    fn test_existing_label_is_kept() {
        let err = ActionError::Failed {
            label: Some("inner".into()),
            message: "x".into(),
        }
        .with_label(Some("outer"));
        assert_eq!(err.label(), Some("inner"));
    }

    #[test]
    fn test_closure_is_a_sink() {
        let seen = std::cell::RefCell::new(Vec::new());
        let sink = |e: &ActionError| seen.borrow_mut().push(e.message().to_string());
        sink.report(&ActionError::failed("first"));
        assert_eq!(*seen.borrow(), vec!["first"]);
    }
}
