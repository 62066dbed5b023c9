//! `op-observation-csv` — the kernel's bundled default Observation plug-in
//! (§4.5 C5): writes every agent's `"Agent.*"` data-store snapshot and a
//! per-tick summary to two CSV files.
//!
//! # Usage
//!
//! ```rust,ignore
//! use op_observation_csv::CsvObservation;
//! use op_sim::RunOrchestratorBuilder;
//!
//! let mut csv = CsvObservation::new(Path::new("./output"))?;
//! let mut run = RunOrchestratorBuilder::new(world, callbacks)
//!     .observation("csv", Box::new(csv))
//!     .build();
//! run.run_all()?;
//! ```

pub mod csv;
pub mod error;
pub mod observer;
pub mod row;
pub mod writer;


pub use csv::CsvWriter;
pub use error::{OutputError, OutputResult};
pub use observer::CsvObservation;
pub use row::{AgentSnapshotRow, TickSummaryRow};
pub use writer::OutputWriter;
