//! `op-world` — road/lane graph, spatial indexing, and localization (C2).
//!
//! # Crate layout
//!
//! | Module          | Contents                                                |
//! |-----------------|-----------------------------------------------------------|
//! | [`graph`]       | `RoadGraph`, `RoadGraphBuilder` (three-pass construction)  |
//! | [`geometry`]    | `GeometryJoint`, `GeometryElement`, `ObjectPolygon`         |
//! | [`spatial`]     | `SpatialIndex` (R-tree over geometry elements)              |
//! | [`localization`]| `locate`, `ObjectPosition`, `GlobalRoadPosition`            |
//! | [`query`]       | `World` and its per-query operations                         |
//! | [`error`]       | `WorldError`, `WorldResult<T>`                               |
//!
//! # Feature flags
//!
//! | Flag    | Effect                                             |
//! |---------|------------------------------------------------------|
//! | `serde` | Derives `Serialize`/`Deserialize` on public types.    |

pub mod error;
pub mod geometry;
pub mod graph;
pub mod localization;
pub mod query;
pub mod spatial;

#[cfg(test)]
mod tests;

pub use error::{WorldError, WorldResult};
pub use geometry::{GeometryElement, GeometryJoint, ObjectPolygon};
pub use graph::{
    Junction, JunctionConnection, JunctionConnectionSpec, Lane, LaneSpec, Road, RoadContact,
    RoadGraph, RoadGraphBuilder, RoadLink, RoadSpec, Section, SectionSpec,
};
pub use localization::{locate, GlobalRoadPosition, ObjectPosition, TouchedRoad};
pub use query::{TrafficSign, World};
pub use spatial::SpatialIndex;
