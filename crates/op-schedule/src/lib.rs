//! Scheduler task taxonomy, tie-breaking task queue, and the per-invocation
//! run loop (§4.7).
//!
//! # Crate layout
//!
//! | Module    | Contents                                                |
//! |-----------|----------------------------------------------------------|
//! | [`task`]  | `TaskKind`, `SchedulerTask`, `TaskSpec`, `tie_break`       |
//! | [`queue`] | `TaskQueue` — bucketed queue and `run_invocation`          |
//! | [`error`] | `ScheduleError`, `ScheduleResult<T>`                       |
//!
//! # Run loop (summary)
//!
//! ```text
//! ExecuteTasks(bootstrap)
//! currentTime = startTime
//! while currentTime <= endTime:
//!     ExecuteTasks(GetCommonTasks(currentTime))
//!     UpdateAgents(currentTime)
//!     ExecuteTasks(ConsumeNonRecurringTasks(currentTime))
//!     ExecuteTasks(GetRecurringAgentTasks(currentTime))
//!     currentTime = GetNextTimestamp(currentTime)
//!     if EndCondition(currentTime): break
//!     ClearActiveEvents()
//! ExecuteTasks(finalize)
//! ```
//!
//! Any task returning `false` aborts the containing phase: bootstrap/
//! finalize failures abort the invocation, common/agent-task failures abort
//! the whole simulation (no rollback).

pub mod error;
pub mod queue;
pub mod task;

#[cfg(test)]
mod tests;

pub use error::{ScheduleError, ScheduleResult};
pub use queue::TaskQueue;
pub use task::{tie_break, NewTaskBatch, SchedulerTask, TaskKind, TaskSpec};
