//! A constructed [`Route`] — the sequence of roads (and junctions) an agent
//! intends to traverse.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use op_core::{JunctionId, RoadId};

/// One road traversed by a route, plus the direction of travel along it.
///
/// `in_stream_direction = true` means the route advances along the road's
/// successor contact; `false` means it advances along the predecessor
/// contact (the road is being driven against its construction direction).
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct RouteEntry {
    pub road: RoadId,
    pub in_stream_direction: bool,
}

/// An ordered sequence of roads plus the junctions traversed between them.
///
/// Invariant: successive `entries` are linked either directly by
/// road↔road adjacency or via one of `junctions` (§4.2 "Route").
#[derive(Clone, Debug)]
pub struct Route {
    pub entries: Vec<RouteEntry>,
    pub junctions: Vec<JunctionId>,
    /// Cache key for lane/road stream lookups — two routes with identical
    /// `entries`/`junctions` hash identically and share cached streams.
    pub hash: u64,
}

impl Route {
    pub fn new(entries: Vec<RouteEntry>, junctions: Vec<JunctionId>) -> Self {
        let mut hasher = DefaultHasher::new();
        entries.hash(&mut hasher);
        junctions.iter().map(|j| j.0).collect::<Vec<_>>().hash(&mut hasher);
        let hash = hasher.finish();
        Self { entries, junctions, hash }
    }

    pub fn start(&self) -> Option<RouteEntry> {
        self.entries.first().copied()
    }

    pub fn contains_road(&self, road: RoadId) -> bool {
        self.entries.iter().any(|e| e.road == road)
    }
}
