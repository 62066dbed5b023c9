//! `op-model` — the `Model` trait and built-in component implementations
//! (§4.3 "Model (component implementation)").
//!
//! # Crate layout
//!
//! | Module      | Contents                                                |
//! |-------------|-----------------------------------------------------------|
//! | [`model`]   | `Model` trait — `trigger`/`update_input`/`update_output`   |
//! | [`dynamics`]| `TrajectoryFollower` — scripted/acceleration-driven motion |
//! | [`noop`]    | `NoopModel` — placeholder that never publishes             |
//! | [`error`]   | `ModelError`, `ModelResult<T>`                              |
//!
//! # Per-tick ordering
//!
//! `op-agent`'s scheduler calls every component's `update_input` for each
//! connected link, then `trigger` once, then `update_output` for each output
//! link — never any other order, and never more than once per phase per
//! tick (§4.3).

pub mod dynamics;
pub mod error;
pub mod model;
pub mod noop;


pub use dynamics::{TrajectoryFollower, Waypoint, ACCEL_IN, DYNAMICS_OUT};
pub use error::{ModelError, ModelResult};
pub use model::Model;
pub use noop::NoopModel;
