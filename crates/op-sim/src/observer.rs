//! Run observer trait for progress reporting and data collection.

use op_core::TimeMs;

use crate::environment::WorldParameters;

/// Callbacks invoked by [`RunOrchestrator::run_all`][crate::RunOrchestrator::run_all]
/// at key points in the invocation lifecycle.
///
/// All methods have default no-op implementations so implementors only need
/// to override what they care about.
pub trait RunObserver {
    /// Called once before invocation `index` begins, with its sampled world
    /// parameters.
    fn on_invocation_start(&mut self, _index: u32, _world: &WorldParameters) {}

    /// Called at the end of every tick within an invocation.
    fn on_tick(&mut self, _index: u32, _time: TimeMs) {}

    /// Called when invocation `index` ends. `succeeded` is `false` when the
    /// scheduler aborted the simulation (§7 "Task errors").
    fn on_invocation_end(&mut self, _index: u32, _succeeded: bool) {}

    /// Called exactly once after every invocation has run, with the overall
    /// success flag (§4.8: "conjunction of the per-invocation scheduler
    /// outcome and the finalize-all outcome").
    fn on_run_end(&mut self, _succeeded: bool) {}
}

/// A [`RunObserver`] that does nothing.
pub struct NoopObserver;

impl RunObserver for NoopObserver {}
