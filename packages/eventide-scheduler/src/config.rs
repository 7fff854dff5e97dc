use crate::error::{ErrorSink, TracingSink};
use std::fmt;
use std::rc::Rc;

/// Knobs for a [`LocalScheduler`](crate::LocalScheduler).
///
/// The defaults give the plain ordering contract: microtask checkpoints
/// drain to exhaustion, panics inside actions are caught, and failures are
/// reported through `tracing`. The default sink is silent unless a `tracing`
/// subscriber is installed; see [`TracingSink`].
#[derive(Clone)]
pub struct SchedulerConfig {
    pub(crate) microtask_budget: Option<usize>,
    pub(crate) catch_panics: bool,
    pub(crate) error_sink: Rc<dyn ErrorSink>,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            microtask_budget: None,
            catch_panics: true,
            error_sink: Rc::new(TracingSink),
        }
    }
}

impl SchedulerConfig {
    pub fn builder() -> SchedulerConfigBuilder {
        SchedulerConfigBuilder::new()
    }

    pub fn microtask_budget(&self) -> Option<usize> {
        self.microtask_budget
    }

    pub fn catch_panics(&self) -> bool {
        self.catch_panics
    }
}

impl fmt::Debug for SchedulerConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SchedulerConfig")
            .field("microtask_budget", &self.microtask_budget)
            .field("catch_panics", &self.catch_panics)
            .finish_non_exhaustive()
    }
}

pub struct SchedulerConfigBuilder {
    config: SchedulerConfig,
}

impl Default for SchedulerConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl SchedulerConfigBuilder {
    pub fn new() -> Self {
        Self {
            config: SchedulerConfig::default(),
        }
    }

    /// Cap the number of actions a single microtask checkpoint may run.
    /// Exceeding it aborts the run with
    /// [`SchedulerError::MicrotaskBudgetExceeded`](crate::SchedulerError::MicrotaskBudgetExceeded).
    pub fn microtask_budget(mut self, limit: usize) -> Self {
        self.config.microtask_budget = Some(limit);
        self
    }

    /// When disabled, a panicking action unwinds out of the scheduler.
    /// [`run_with`](crate::run_with) still discards the remaining queues on
    /// the way out.
    pub fn catch_panics(mut self, enabled: bool) -> Self {
        self.config.catch_panics = enabled;
        self
    }

    pub fn error_sink(mut self, sink: impl ErrorSink + 'static) -> Self {
        self.config.error_sink = Rc::new(sink);
        self
    }

    pub fn build(self) -> SchedulerConfig {
        self.config
    }
}
