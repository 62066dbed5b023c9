//! `TaskQueue` — the `(nextFireTime, priority, insertionSeq)` priority queue
//! and the run-loop contract built on top of it.
//!
//! Time-keyed tasks are bucketed by wake tick (`BTreeMap<TimeMs,
//! Vec<TaskId>>`); task metadata lives in a side table keyed by `TaskId`
//! so lookups, rescheduling, and per-agent deletion don't require scanning
//! every bucket.

use std::collections::{BTreeMap, HashMap};

use op_core::{AgentId, TaskId, TimeMs};

use crate::error::{ScheduleError, ScheduleResult};
use crate::task::{tie_break, NewTaskBatch, SchedulerTask, TaskKind, TaskSpec};

#[derive(Default)]
pub struct TaskQueue {
    tasks: HashMap<TaskId, SchedulerTask>,
    by_time: BTreeMap<TimeMs, Vec<TaskId>>,
    by_agent: HashMap<AgentId, Vec<TaskId>>,
    bootstrap: Vec<SchedulerTask>,
    finalize: Vec<SchedulerTask>,
    next_task_id: u64,
    next_insertion_seq: u64,
    framework_cycle_time_ms: u64,
}

impl TaskQueue {
    pub fn new(framework_cycle_time_ms: u64) -> Self {
        Self {
            framework_cycle_time_ms,
            ..Default::default()
        }
    }

    fn alloc_id(&mut self) -> TaskId {
        let id = TaskId(self.next_task_id);
        self.next_task_id += 1;
        id
    }

    fn alloc_seq(&mut self) -> u64 {
        let seq = self.next_insertion_seq;
        self.next_insertion_seq += 1;
        seq
    }

    fn build(&mut self, spec: TaskSpec, next_fire_time: TimeMs, cycle_time_ms: u64) -> SchedulerTask {
        SchedulerTask {
            id: self.alloc_id(),
            kind: spec.kind,
            agent: spec.agent,
            next_fire_time,
            cycle_time_ms,
            priority: spec.priority,
            insertion_seq: self.alloc_seq(),
            action: spec.action,
        }
    }

    fn index(&mut self, task: SchedulerTask) -> TaskId {
        let id = task.id;
        self.by_time.entry(task.next_fire_time).or_default().push(id);
        if let Some(agent) = task.agent {
            self.by_agent.entry(agent).or_default().push(id);
        }
        self.tasks.insert(id, task);
        id
    }

    /// Add a one-shot task run once via `ExecuteTasks(bootstrap)` before the
    /// loop starts.
    pub fn add_bootstrap(&mut self, spec: TaskSpec) -> TaskId {
        let task = self.build(spec, TimeMs::ZERO, 0);
        let id = task.id;
        self.bootstrap.push(task);
        id
    }

    /// Add a one-shot task run once via `ExecuteTasks(finalize)` after the
    /// loop ends.
    pub fn add_finalize(&mut self, spec: TaskSpec) -> TaskId {
        let task = self.build(spec, TimeMs::ZERO, 0);
        let id = task.id;
        self.finalize.push(task);
        id
    }

    /// `ScheduleNewRecurringTasks`: first fire is `offset_from_ms` relative
    /// to the agent's spawn tick, then every `cycle_time_ms` after.
    pub fn schedule_new_recurring_tasks(
        &mut self,
        spec: TaskSpec,
        spawn_tick: TimeMs,
        offset_from_ms: u64,
        cycle_time_ms: u64,
    ) -> TaskId {
        let task = self.build(spec, spawn_tick.offset(offset_from_ms), cycle_time_ms);
        self.index(task)
    }

    /// `ScheduleNewNonRecurringTasks`: fires exactly once at
    /// `spawn_tick + offset_from_ms`.
    pub fn schedule_new_non_recurring_tasks(
        &mut self,
        spec: TaskSpec,
        spawn_tick: TimeMs,
        offset_from_ms: u64,
    ) -> TaskId {
        let task = self.build(spec, spawn_tick.offset(offset_from_ms), 0);
        self.index(task)
    }

    fn remove_from_time_bucket(&mut self, task_id: TaskId, time: TimeMs) {
        if let Some(bucket) = self.by_time.get_mut(&time) {
            bucket.retain(|&id| id != task_id);
            if bucket.is_empty() {
                self.by_time.remove(&time);
            }
        }
    }

    /// `GetCommonTasks(now)`: all `Spawning`/`PreAgent`/`Synchronize` tasks
    /// whose `nextFireTime == now`; their `nextFireTime` advances by
    /// `cycleTime` as a side effect. Returned in `(priority desc,
    /// insertionSeq asc)` order.
    pub fn get_common_tasks(&mut self, now: TimeMs) -> Vec<TaskId> {
        self.take_recurring_due_exactly(now, TaskKind::is_common)
    }

    /// The run loop's dedicated `recurring(currentTime)` step: per-agent
    /// `RecurringAgent` tasks due exactly at `now`.
    pub fn get_recurring_agent_tasks(&mut self, now: TimeMs) -> Vec<TaskId> {
        self.take_recurring_due_exactly(now, |k| k == TaskKind::RecurringAgent)
    }

    fn take_recurring_due_exactly(
        &mut self,
        now: TimeMs,
        matches_kind: impl Fn(TaskKind) -> bool,
    ) -> Vec<TaskId> {
        let Some(bucket) = self.by_time.get(&now).cloned() else {
            return Vec::new();
        };
        let mut due = Vec::new();
        for id in bucket {
            let Some(task) = self.tasks.get(&id) else { continue };
            if matches_kind(task.kind) {
                due.push(id);
            }
        }
        due.sort_by(|a, b| tie_break(&self.tasks[a], &self.tasks[b]));

        for &id in &due {
            self.remove_from_time_bucket(id, now);
            let cycle = self.tasks[&id].cycle_time_ms;
            let next_time = now.offset(cycle);
            if let Some(task) = self.tasks.get_mut(&id) {
                task.next_fire_time = next_time;
            }
            self.by_time.entry(next_time).or_default().push(id);
        }
        due
    }

    /// `ConsumeNonRecurringTasks(now)`: removes and returns every
    /// `NonRecurringAgent` task due at or before `now`. Not rescheduled.
    pub fn consume_non_recurring_tasks(&mut self, now: TimeMs) -> Vec<TaskId> {
        let due_times: Vec<TimeMs> = self
            .by_time
            .range(..=now)
            .map(|(&t, _)| t)
            .collect();

        let mut due = Vec::new();
        for time in due_times {
            let Some(bucket) = self.by_time.get(&time) else { continue };
            let ids: Vec<TaskId> = bucket
                .iter()
                .copied()
                .filter(|id| self.tasks.get(id).is_some_and(|t| t.kind == TaskKind::NonRecurringAgent))
                .collect();
            for id in ids {
                self.remove_from_time_bucket(id, time);
                if let Some(task) = self.tasks.remove(&id) {
                    if let Some(agent) = task.agent {
                        if let Some(list) = self.by_agent.get_mut(&agent) {
                            list.retain(|&x| x != id);
                        }
                    }
                    due.push(task);
                }
            }
        }
        due.sort_by(tie_break);
        due.into_iter().map(|t| t.id).collect()
    }

    /// `GetNextTimestamp(now)`: the minimum `nextFireTime` strictly greater
    /// than `now` across all remaining tasks, or the framework-rate
    /// successor of `now` if none remain.
    pub fn get_next_timestamp(&self, now: TimeMs) -> TimeMs {
        self.by_time
            .range((std::ops::Bound::Excluded(now), std::ops::Bound::Unbounded))
            .next()
            .map(|(&t, _)| t)
            .unwrap_or_else(|| now.offset(self.framework_cycle_time_ms))
    }

    /// `DeleteAgentTasks`: removes every pending task owned by any id in
    /// `agents`, from whichever bucket it lives in.
    pub fn delete_agent_tasks(&mut self, agents: &[AgentId]) {
        for agent in agents {
            let Some(ids) = self.by_agent.remove(agent) else { continue };
            for id in ids {
                if let Some(task) = self.tasks.remove(&id) {
                    self.remove_from_time_bucket(id, task.next_fire_time);
                }
            }
        }
    }

    pub fn task_kind(&self, id: TaskId) -> Option<TaskKind> {
        self.tasks.get(&id).map(|t| t.kind)
    }

    pub fn task_agent(&self, id: TaskId) -> Option<AgentId> {
        self.tasks.get(&id).and_then(|t| t.agent)
    }

    pub fn pending_count(&self) -> usize {
        self.tasks.len()
    }

    fn run_id(&mut self, id: TaskId, time: TimeMs) -> bool {
        self.tasks.get_mut(&id).map(|t| t.run(time)).unwrap_or(true)
    }

    fn execute_ids(&mut self, ids: Vec<TaskId>, time: TimeMs) -> ScheduleResult<()> {
        for id in ids {
            if !self.run_id(id, time) {
                tracing::warn!(task = ?id, ?time, "task aborted its phase");
                return Err(ScheduleError::TaskFailed(id));
            }
        }
        Ok(())
    }

    fn execute_owned(tasks: &mut [SchedulerTask], time: TimeMs) -> ScheduleResult<()> {
        let mut order: Vec<usize> = (0..tasks.len()).collect();
        order.sort_by(|&a, &b| tie_break(&tasks[a], &tasks[b]));
        for i in order {
            if !tasks[i].run(time) {
                tracing::warn!(task = ?tasks[i].id, ?time, "task aborted its phase");
                return Err(ScheduleError::TaskFailed(tasks[i].id));
            }
        }
        Ok(())
    }

    /// The single-invocation run loop contract (§4.7), parameterized over
    /// the caller's world-sync, end-condition, and event-clearing hooks so
    /// this crate stays independent of `op-agent`/`op-eventnet`.
    pub fn run_invocation<UA, EC, CE>(
        &mut self,
        start: TimeMs,
        end: TimeMs,
        mut update_agents: UA,
        mut is_end_condition: EC,
        mut clear_active_events: CE,
    ) -> ScheduleResult<()>
    where
        UA: FnMut(TimeMs) -> NewTaskBatch,
        EC: FnMut(TimeMs) -> bool,
        CE: FnMut(),
    {
        let mut bootstrap = std::mem::take(&mut self.bootstrap);
        let result = Self::execute_owned(&mut bootstrap, start);
        self.bootstrap = bootstrap;
        result?;

        let mut current_time = start;
        while current_time <= end {
            let common = self.get_common_tasks(current_time);
            self.execute_ids(common, current_time)?;

            let new_tasks = update_agents(current_time);
            for (spec, spawn_tick, offset_from_ms) in new_tasks.non_recurring {
                self.schedule_new_non_recurring_tasks(spec, spawn_tick, offset_from_ms);
            }
            for (spec, spawn_tick, offset_from_ms, cycle_time_ms) in new_tasks.recurring {
                self.schedule_new_recurring_tasks(spec, spawn_tick, offset_from_ms, cycle_time_ms);
            }
            self.delete_agent_tasks(&new_tasks.remove_agents);

            let non_recurring = self.consume_non_recurring_tasks(current_time);
            self.execute_ids(non_recurring, current_time)?;

            let recurring = self.get_recurring_agent_tasks(current_time);
            self.execute_ids(recurring, current_time)?;

            current_time = self.get_next_timestamp(current_time);

            if is_end_condition(current_time) {
                break;
            }
            clear_active_events();
        }

        let mut finalize = std::mem::take(&mut self.finalize);
        let result = Self::execute_owned(&mut finalize, end);
        self.finalize = finalize;
        result
    }
}
