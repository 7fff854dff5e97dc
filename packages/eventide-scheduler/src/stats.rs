use std::fmt;

/// Priority class an action was executed under, highest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum TaskClass {
    Immediate,
    NextTick,
    Microtask,
    Macrotask,
}

impl fmt::Display for TaskClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TaskClass::Immediate => "immediate",
            TaskClass::NextTick => "next-tick",
            TaskClass::Microtask => "microtask",
            TaskClass::Macrotask => "macrotask",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ClassStats {
    pub executed: u64,
    pub failed: u64,
}

/// Counters accumulated over one run.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct RunStats {
    pub immediate: ClassStats,
    pub next_tick: ClassStats,
    pub microtask: ClassStats,
    pub macrotask: ClassStats,
}

impl RunStats {
    pub(crate) fn record(&mut self, class: TaskClass, succeeded: bool) {
        let entry = self.class_mut(class);
        entry.executed += 1;
        if !succeeded {
            entry.failed += 1;
        }
    }

    pub fn class(&self, class: TaskClass) -> ClassStats {
        match class {
            TaskClass::Immediate => self.immediate,
            TaskClass::NextTick => self.next_tick,
            TaskClass::Microtask => self.microtask,
            TaskClass::Macrotask => self.macrotask,
        }
    }

    fn class_mut(&mut self, class: TaskClass) -> &mut ClassStats {
        match class {
            TaskClass::Immediate => &mut self.immediate,
            TaskClass::NextTick => &mut self.next_tick,
            TaskClass::Microtask => &mut self.microtask,
            TaskClass::Macrotask => &mut self.macrotask,
        }
    }

    pub fn executed(&self) -> u64 {
        self.immediate.executed
            + self.next_tick.executed
            + self.microtask.executed
            + self.macrotask.executed
    }

    pub fn failed(&self) -> u64 {
        self.immediate.failed + self.next_tick.failed + self.microtask.failed + self.macrotask.failed
    }
}

/// Snapshot of queue depths.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Pending {
    pub next_tick: usize,
    pub microtask: usize,
    pub macrotask: usize,
}

impl Pending {
    pub fn total(&self) -> usize {
        self.next_tick + self.microtask + self.macrotask
    }
}

/// Result of a finished run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunReport {
    pub stats: RunStats,
    /// External completions handed out during the run that were never
    /// completed nor dropped before the queues ran dry.
    pub outstanding_completions: usize,
}
