//! `op-navigation` — stochastic route construction and the lane/road stream
//! cache built on top of [`op_world`]'s road graph (§4.2 "Navigation").
//!
//! # Crate layout
//!
//! | Module     | Contents                                               |
//! |------------|---------------------------------------------------------|
//! | [`state`]  | `Route`, `RouteEntry`                                    |
//! | [`engine`] | `NavigationEngine::build_route` — stochastic exit draw   |
//! | [`store`]  | `StreamCache`, `LaneStream`, `RoadStream`                |
//! | [`error`]  | `NavigationError`, `NavigationResult<T>`                 |
//!
//! # Cache discipline
//!
//! Streams are addressed by `(route.hash, roadId, laneId)` plus the `s`
//! interval they cover. A query whose `s` falls inside an already-cached
//! interval for the same route gets back the identical `Rc`, never a copy.
//! The cache only grows within an invocation; [`StreamCache::reset`] is the
//! sole way entries are dropped, called once per `Reset` (§4.2).

pub mod engine;
pub mod error;
pub mod state;
pub mod store;


pub use engine::NavigationEngine;
pub use error::{NavigationError, NavigationResult};
pub use state::{Route, RouteEntry};
pub use store::{LaneStream, RoadStream, StreamCache};
