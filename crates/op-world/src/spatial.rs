//! R-tree spatial index over every lane's geometry elements (§4.2
//! "Spatial indexing"): "After construction, every geometry element is
//! inserted into a single R-tree with its coarse bounding box as the key."

use op_core::{GeometryElementId, LaneId};
use rstar::{PointDistance, RTree, RTreeObject, AABB};

use crate::geometry::GeometryElement;
use crate::graph::RoadGraph;

#[derive(Clone)]
struct IndexedElement {
    id: GeometryElementId,
    lane: LaneId,
    min: [f64; 2],
    max: [f64; 2],
    centroid: [f64; 2],
}

impl RTreeObject for IndexedElement {
    type Envelope = AABB<[f64; 2]>;
    fn envelope(&self) -> Self::Envelope {
        AABB::from_corners(self.min, self.max)
    }
}

impl PointDistance for IndexedElement {
    fn distance_2(&self, point: &[f64; 2]) -> f64 {
        let dx = self.centroid[0] - point[0];
        let dy = self.centroid[1] - point[1];
        dx * dx + dy * dy
    }
}

/// Every geometry element across the whole road graph, addressable by
/// [`GeometryElementId`] and queryable by coarse bounding box.
pub struct SpatialIndex {
    elements: Vec<GeometryElement>,
    lanes: Vec<LaneId>,
    tree: RTree<IndexedElement>,
}

impl SpatialIndex {
    pub fn build(graph: &RoadGraph) -> Self {
        let mut elements = Vec::new();
        let mut lanes = Vec::new();
        let mut entries = Vec::new();

        for (lane, element) in graph.geometry_elements() {
            let id = GeometryElementId(elements.len() as u32);
            let (min, max) = element.bbox();
            let centroid = element.centroid();
            entries.push(IndexedElement {
                id,
                lane,
                min,
                max,
                centroid: [centroid.x, centroid.y],
            });
            elements.push(element);
            lanes.push(lane);
        }

        Self {
            elements,
            lanes,
            tree: RTree::bulk_load(entries),
        }
    }

    pub fn element(&self, id: GeometryElementId) -> &GeometryElement {
        &self.elements[id.index()]
    }

    pub fn lane_of(&self, id: GeometryElementId) -> LaneId {
        self.lanes[id.index()]
    }

    /// Every element whose coarse bounding box overlaps `(min, max)`.
    pub fn query_bbox(&self, min: [f64; 2], max: [f64; 2]) -> Vec<GeometryElementId> {
        self.tree
            .locate_in_envelope_intersecting(&AABB::from_corners(min, max))
            .map(|e| e.id)
            .collect()
    }

    pub fn nearest(&self, point: [f64; 2]) -> Option<GeometryElementId> {
        self.tree.nearest_neighbor(&point).map(|e| e.id)
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }
}
