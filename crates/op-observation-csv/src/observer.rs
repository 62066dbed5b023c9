//! `CsvObservation<W>` — the kernel's bundled default Observation plug-in
//! (§4.5 C5), driving any [`OutputWriter`] backend from the shared
//! [`DataStore`].

use std::path::Path;

use op_core::TimeMs;
use op_datastore::{DataStore, Value};
use op_networks::ObservationPlugin;

use crate::csv::CsvWriter;
use crate::row::{AgentSnapshotRow, TickSummaryRow};
use crate::writer::OutputWriter;
use crate::OutputError;

fn as_f64(value: &Value) -> f64 {
    match value {
        Value::Float(v) => *v,
        _ => 0.0,
    }
}

/// An [`ObservationPlugin`] that reads the `"Agent.*"` cyclic keys out of
/// the data store every tick and writes one snapshot row per agent plus
/// one tick-summary row, via any [`OutputWriter`] backend (CSV by default).
///
/// Errors from the writer have no hook-level return channel beyond
/// success/failure, so they are stored internally and surfaced after the
/// run with [`take_error`][Self::take_error].
pub struct CsvObservation<W: OutputWriter> {
    writer: W,
    invocation: u32,
    last_error: Option<OutputError>,
}

impl CsvObservation<CsvWriter> {
    /// Build the bundled default: a [`CsvWriter`] writing into `dir`.
    pub fn new(dir: &Path) -> Result<Self, OutputError> {
        Ok(Self::with_writer(CsvWriter::new(dir)?))
    }
}

impl<W: OutputWriter> CsvObservation<W> {
    pub fn with_writer(writer: W) -> Self {
        Self {
            writer,
            invocation: 0,
            last_error: None,
        }
    }

    /// Take the stored write error (if any) after `run_all()` returns.
    ///
    /// Returns `None` if every write succeeded.
    pub fn take_error(&mut self) -> Option<OutputError> {
        self.last_error.take()
    }

    /// Unwrap the inner writer (e.g. to inspect files after the run).
    pub fn into_writer(self) -> W {
        self.writer
    }

    fn store_err(&mut self, result: Result<(), OutputError>) -> bool {
        match result {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!(error = %e, "observation write failed");
                if self.last_error.is_none() {
                    self.last_error = Some(e);
                }
                false
            }
        }
    }

    fn snapshots_at(&self, time: TimeMs, store: &DataStore) -> Vec<AgentSnapshotRow> {
        store
            .get_cyclic(Some(time), None, "Agent.Velocity")
            .map(|record| {
                let agent = record.agent;
                let read = |key: &str| -> f64 {
                    store
                        .get_cyclic(Some(time), Some(agent), key)
                        .next()
                        .map(|r| as_f64(&r.value))
                        .unwrap_or(0.0)
                };
                let position_x = store.get_cyclic(Some(time), Some(agent), "Agent.PositionX").next();
                let position_y = store.get_cyclic(Some(time), Some(agent), "Agent.PositionY").next();
                AgentSnapshotRow {
                    invocation: self.invocation,
                    time_ms: time.0,
                    agent_id: agent.0,
                    velocity: as_f64(&record.value),
                    acceleration: read("Agent.Acceleration"),
                    yaw: read("Agent.Yaw"),
                    yaw_rate: read("Agent.YawRate"),
                    s: read("Agent.S"),
                    t: read("Agent.T"),
                    position_x: position_x.map(|r| as_f64(&r.value)),
                    position_y: position_y.map(|r| as_f64(&r.value)),
                }
            })
            .collect()
    }
}

impl<W: OutputWriter + Send> ObservationPlugin for CsvObservation<W> {
    fn slave_pre_hook(&mut self) -> bool {
        true
    }

    fn slave_pre_run_hook(&mut self) -> bool {
        true
    }

    fn slave_update_hook(&mut self, time: TimeMs, store: &DataStore) -> bool {
        let rows = self.snapshots_at(time, store);
        let summary = TickSummaryRow {
            invocation: self.invocation,
            time_ms: time.0,
            agent_count: rows.len() as u64,
        };

        let result = self
            .writer
            .write_snapshots(&rows)
            .and_then(|()| self.writer.write_tick_summary(&summary));
        self.store_err(result)
    }

    fn slave_post_run_hook(&mut self, _store: &DataStore) -> bool {
        self.invocation += 1;
        true
    }

    fn slave_post_hook(&mut self) -> bool {
        let result = self.writer.finish();
        self.store_err(result)
    }
}
