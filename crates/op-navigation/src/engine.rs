//! Route construction: "picks successors stochastically at junctions with
//! multiple outgoing connections (uniform among viable exits)" (§4.2
//! "Navigation").

use op_core::AgentRng;
use op_world::{RoadGraph, RoadLink};

use crate::error::{NavigationError, NavigationResult};
use crate::state::{Route, RouteEntry};

/// Builds routes and hands out cached lane/road streams for them.
///
/// Holds no state of its own beyond the [`crate::StreamCache`] the caller
/// passes in separately — route construction is a pure function of the
/// road graph and the agent's own RNG draw.
pub struct NavigationEngine;

impl NavigationEngine {
    /// Build a route starting at `start`, extending it up to `max_roads`
    /// times. At each junction with more than one viable connecting road,
    /// draws uniformly among them via `rng`.
    pub fn build_route(
        graph: &RoadGraph,
        rng: &mut AgentRng,
        start: RouteEntry,
        max_roads: usize,
    ) -> NavigationResult<Route> {
        let mut entries = vec![start];
        let mut junctions = Vec::new();
        let mut current = start;

        for _ in 1..max_roads {
            let road = graph.road(current.road);
            let contact = if current.in_stream_direction {
                road.successor
            } else {
                road.predecessor
            };
            let Some(contact) = contact else {
                break;
            };

            match contact.link {
                RoadLink::Road(next_road) => {
                    let next_dir = if contact.same_direction {
                        current.in_stream_direction
                    } else {
                        !current.in_stream_direction
                    };
                    current = RouteEntry {
                        road: next_road,
                        in_stream_direction: next_dir,
                    };
                    entries.push(current);
                }
                RoadLink::Junction(junction_id) => {
                    let junction = graph.junction(junction_id);
                    let viable: Vec<op_core::RoadId> = {
                        let mut seen = Vec::new();
                        for conn in &junction.connections {
                            if conn.incoming_road == current.road && !seen.contains(&conn.connecting_road) {
                                seen.push(conn.connecting_road);
                            }
                        }
                        seen
                    };
                    let Some(&chosen) = rng.choose(&viable) else {
                        return Err(NavigationError::NoViableExit(junction_id));
                    };
                    junctions.push(junction_id);
                    current = RouteEntry {
                        road: chosen,
                        in_stream_direction: true,
                    };
                    entries.push(current);
                }
            }
        }

        if entries.len() == 1 && graph.road(start.road).successor.is_none() {
            tracing::debug!(road = ?start.road, "route has no onward contact, single-road route");
        }

        Ok(Route::new(entries, junctions))
    }
}
