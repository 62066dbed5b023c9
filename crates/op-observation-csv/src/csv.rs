//! CSV output backend.
//!
//! Creates two files in the configured output directory, held open for the
//! whole run (across every invocation):
//! - `agent_snapshots.csv`
//! - `tick_summaries.csv`

use std::fs::File;
use std::path::Path;

use csv::Writer;

use crate::writer::OutputWriter;
use crate::{AgentSnapshotRow, OutputResult, TickSummaryRow};

/// Writes simulation output to two CSV files.
pub struct CsvWriter {
    snapshots: Writer<File>,
    summaries: Writer<File>,
    finished: bool,
}

impl CsvWriter {
    /// Open (or create) the two CSV files in `dir` and write the header rows.
    pub fn new(dir: &Path) -> OutputResult<Self> {
        let mut snapshots = Writer::from_path(dir.join("agent_snapshots.csv"))?;
        snapshots.write_record([
            "invocation",
            "time_ms",
            "agent_id",
            "velocity",
            "acceleration",
            "yaw",
            "yaw_rate",
            "s",
            "t",
            "position_x",
            "position_y",
        ])?;

        let mut summaries = Writer::from_path(dir.join("tick_summaries.csv"))?;
        summaries.write_record(["invocation", "time_ms", "agent_count"])?;

        Ok(Self {
            snapshots,
            summaries,
            finished: false,
        })
    }
}

impl OutputWriter for CsvWriter {
    fn write_snapshots(&mut self, rows: &[AgentSnapshotRow]) -> OutputResult<()> {
        for row in rows {
            self.snapshots.write_record(&[
                row.invocation.to_string(),
                row.time_ms.to_string(),
                row.agent_id.to_string(),
                row.velocity.to_string(),
                row.acceleration.to_string(),
                row.yaw.to_string(),
                row.yaw_rate.to_string(),
                row.s.to_string(),
                row.t.to_string(),
                row.position_x.map(|v| v.to_string()).unwrap_or_default(),
                row.position_y.map(|v| v.to_string()).unwrap_or_default(),
            ])?;
        }
        Ok(())
    }

    fn write_tick_summary(&mut self, row: &TickSummaryRow) -> OutputResult<()> {
        self.summaries.write_record(&[
            row.invocation.to_string(),
            row.time_ms.to_string(),
            row.agent_count.to_string(),
        ])?;
        Ok(())
    }

    fn finish(&mut self) -> OutputResult<()> {
        if self.finished {
            return Ok(());
        }
        self.finished = true;
        self.snapshots.flush()?;
        self.summaries.flush()?;
        Ok(())
    }
}
