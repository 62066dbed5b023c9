//! `SchedulerTask` and its taxonomy (§4.7).

use op_core::{AgentId, TaskId, TimeMs};

/// Which phase of the run loop a task belongs to.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum TaskKind {
    /// One-shot, run before the loop starts (pre-run spawning).
    Bootstrap,
    /// Runtime spawn-point triggers.
    Spawning,
    /// Global-data publish, event detectors, manipulators.
    PreAgent,
    /// Per-agent init-component triggers/updates; consumed once.
    NonRecurringAgent,
    /// Per-agent non-init-component triggers/updates; fires every cycle.
    RecurringAgent,
    /// Observation update, world sync.
    Synchronize,
    /// One-shot, run after the loop ends.
    Finalize,
}

impl TaskKind {
    /// `Spawning`/`PreAgent`/`Synchronize` are the "common" recurring tasks
    /// `GetCommonTasks` returns; `RecurringAgent` is queried separately by
    /// the run loop's dedicated `recurring(currentTime)` step (§4.7).
    pub fn is_common(self) -> bool {
        matches!(self, TaskKind::Spawning | TaskKind::PreAgent | TaskKind::Synchronize)
    }

    pub fn is_recurring(self) -> bool {
        matches!(self, TaskKind::RecurringAgent) || self.is_common()
    }
}

/// A single scheduled unit of work.
///
/// `action` runs the task's effect and returns `false` on failure, mapping
/// to `AbortInvocation`/`AbortSimulation` depending on which phase it ran
/// in (§4.7's `ExecuteTasks` contract).
pub struct SchedulerTask {
    pub id: TaskId,
    pub kind: TaskKind,
    /// `None` for tasks not scoped to a specific agent (Spawning/PreAgent/
    /// Synchronize/Bootstrap/Finalize never carry one).
    pub agent: Option<AgentId>,
    pub next_fire_time: TimeMs,
    /// `0` for non-recurring tasks.
    pub cycle_time_ms: u64,
    pub priority: i32,
    pub insertion_seq: u64,
    pub(crate) action: Box<dyn FnMut(TimeMs) -> bool + Send>,
}

impl SchedulerTask {
    pub fn run(&mut self, time: TimeMs) -> bool {
        (self.action)(time)
    }
}

/// Build the `(priority desc, insertion_seq asc)` tie-break comparator
/// `ExecuteTasks` iterates its task list by (§4.7 "Tie-breaking").
pub fn tie_break(a: &SchedulerTask, b: &SchedulerTask) -> std::cmp::Ordering {
    b.priority.cmp(&a.priority).then(a.insertion_seq.cmp(&b.insertion_seq))
}

pub struct TaskSpec {
    pub kind: TaskKind,
    pub agent: Option<AgentId>,
    pub priority: i32,
    pub action: Box<dyn FnMut(TimeMs) -> bool + Send>,
}

/// New task registrations produced by `UpdateAgents` for agents that spawned
/// or finished their init phase this tick. `run_invocation` applies these
/// itself once `update_agents` returns, since the closure can't hold its own
/// `&mut TaskQueue` borrow while the queue is mid-call.
#[derive(Default)]
pub struct NewTaskBatch {
    /// `(spec, spawn_tick, offset_from_ms)`.
    pub non_recurring: Vec<(TaskSpec, TimeMs, u64)>,
    /// `(spec, spawn_tick, offset_from_ms, cycle_time_ms)`.
    pub recurring: Vec<(TaskSpec, TimeMs, u64, u64)>,
    /// Agents invalidated or removed during this tick's synchronize phase;
    /// `run_invocation` applies `DeleteAgentTasks` for these once
    /// `update_agents` returns, for the same reason new tasks are applied
    /// out-of-band.
    pub remove_agents: Vec<AgentId>,
}
