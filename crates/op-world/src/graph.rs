//! Road/Section/Lane graph construction (§4.2 "Road graph construction").
//!
//! Converting a parsed scenery into the runtime graph runs in three ordered
//! passes: direction marking, section/lane linking, junction wiring. Once
//! built the graph is immutable and addressed purely by integer id —
//! [`op_core::RoadId`]/[`op_core::SectionId`]/[`op_core::LaneId`]/
//! [`op_core::JunctionId`] — so queries traverse it without lifetime
//! concerns (§9 "Cyclic references").

use std::collections::VecDeque;

use op_core::{JunctionId, LaneId, RoadId, SectionId};

use crate::error::{WorldError, WorldResult};
use crate::geometry::GeometryJoint;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum RoadLink {
    Road(RoadId),
    Junction(JunctionId),
}

/// A link to a neighboring road plus whether the contact point preserves
/// direction. An End↔Start contact propagates the same `in_direction` value
/// (S4); an End↔End (or Start↔Start) contact flips it.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct RoadContact {
    pub link: RoadLink,
    pub same_direction: bool,
}

/// Raw input describing one road's topology before direction marking runs.
#[derive(Clone, Debug)]
pub struct RoadSpec {
    pub name: String,
    pub predecessor: Option<RoadContact>,
    pub successor: Option<RoadContact>,
    pub is_junction_road: bool,
    pub sections: Vec<SectionSpec>,
}

#[derive(Clone, Debug)]
pub struct SectionSpec {
    pub s_start: f64,
    pub s_end: f64,
    pub lanes: Vec<LaneSpec>,
}

#[derive(Clone, Debug)]
pub struct LaneSpec {
    /// OpenDRIVE-style signed index: negative = right of centerline,
    /// positive = left, 0 never used for a drivable lane.
    pub index: i32,
    pub width: f64,
    pub joints: Vec<GeometryJoint>,
}

#[derive(Clone, Debug)]
pub struct JunctionConnectionSpec {
    pub incoming_road: RoadId,
    pub connecting_road: RoadId,
    pub outgoing_road: RoadId,
    /// `(incoming lane index, connecting lane index)` pairs, per spec.md's
    /// "explicit lane-id mappings".
    pub lane_links: Vec<(i32, i32)>,
    pub priority: i32,
}

pub struct Lane {
    pub id: LaneId,
    pub section: SectionId,
    pub index: i32,
    pub width: f64,
    pub joints: Vec<GeometryJoint>,
    pub left: Option<LaneId>,
    pub right: Option<LaneId>,
    pub predecessor: Option<LaneId>,
    pub successor: Option<LaneId>,
}

pub struct Section {
    pub id: SectionId,
    pub road: RoadId,
    pub s_start: f64,
    pub s_end: f64,
    pub lanes: Vec<LaneId>,
    pub predecessor: Option<SectionId>,
    pub successor: Option<SectionId>,
}

pub struct Road {
    pub id: RoadId,
    pub name: String,
    pub in_direction: bool,
    pub is_junction_road: bool,
    pub sections: Vec<SectionId>,
    pub predecessor: Option<RoadContact>,
    pub successor: Option<RoadContact>,
}

pub struct JunctionConnection {
    pub incoming_road: RoadId,
    pub connecting_road: RoadId,
    pub outgoing_road: RoadId,
    pub lane_links: Vec<(LaneId, LaneId)>,
    pub priority: i32,
}

pub struct Junction {
    pub id: JunctionId,
    pub connections: Vec<JunctionConnection>,
}

/// The immutable runtime road graph. Construct via [`RoadGraphBuilder::build`].
pub struct RoadGraph {
    pub roads: Vec<Road>,
    pub sections: Vec<Section>,
    pub lanes: Vec<Lane>,
    pub junctions: Vec<Junction>,
}

impl RoadGraph {
    pub fn road(&self, id: RoadId) -> &Road {
        &self.roads[id.index()]
    }

    pub fn section(&self, id: SectionId) -> &Section {
        &self.sections[id.index()]
    }

    pub fn lane(&self, id: LaneId) -> &Lane {
        &self.lanes[id.index()]
    }

    pub fn junction(&self, id: JunctionId) -> &Junction {
        &self.junctions[id.index()]
    }

    /// All geometry elements across all lanes, tagged with their owning lane.
    pub fn geometry_elements(&self) -> impl Iterator<Item = (LaneId, crate::geometry::GeometryElement)> + '_ {
        self.lanes.iter().flat_map(|lane| {
            lane.joints
                .windows(2)
                .map(move |w| (lane.id, crate::geometry::GeometryElement::from_joints(&w[0], &w[1])))
        })
    }
}

pub struct RoadGraphBuilder {
    road_specs: Vec<RoadSpec>,
    junction_specs: Vec<(JunctionId, Vec<JunctionConnectionSpec>)>,
}

impl RoadGraphBuilder {
    pub fn new() -> Self {
        Self {
            road_specs: Vec::new(),
            junction_specs: Vec::new(),
        }
    }

    pub fn add_road(&mut self, spec: RoadSpec) -> RoadId {
        let id = RoadId(self.road_specs.len() as u32);
        self.road_specs.push(spec);
        id
    }

    pub fn add_junction(&mut self, connections: Vec<JunctionConnectionSpec>) -> JunctionId {
        let id = JunctionId(self.junction_specs.len() as u32);
        self.junction_specs.push((id, connections));
        id
    }

    /// Runs the three ordered passes and produces an immutable [`RoadGraph`].
    pub fn build(self) -> WorldResult<RoadGraph> {
        self.validate_no_self_reference()?;

        let mut in_direction = mark_directions(&self.road_specs)?;
        for (i, spec) in self.road_specs.iter().enumerate() {
            if spec.is_junction_road {
                in_direction[i] = true;
            }
        }

        let (roads, sections, lanes) = link_sections_and_lanes(&self.road_specs, &in_direction)?;
        let junctions = wire_junctions(&self.junction_specs, &roads, &sections, &lanes)?;

        Ok(RoadGraph {
            roads,
            sections,
            lanes,
            junctions,
        })
    }

    fn validate_no_self_reference(&self) -> WorldResult<()> {
        for (i, spec) in self.road_specs.iter().enumerate() {
            let id = RoadId(i as u32);
            let refers_to_self = |c: &Option<RoadContact>| matches!(c, Some(RoadContact { link: RoadLink::Road(r), .. }) if *r == id);
            if refers_to_self(&spec.predecessor) || refers_to_self(&spec.successor) {
                return Err(WorldError::SelfReference(id));
            }
        }
        Ok(())
    }
}

impl Default for RoadGraphBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Pass 1: direction marking. Each connected cluster of roads is walked via
/// BFS over predecessor/successor links; the first road visited is declared
/// "in direction true" and propagated per End↔Start / End↔End contact-point
/// rules (S4): a `same_direction` contact keeps the neighbor's direction
/// equal to the current road's; otherwise it flips.
fn mark_directions(specs: &[RoadSpec]) -> WorldResult<Vec<bool>> {
    let n = specs.len();
    let mut in_direction = vec![None; n];
    let mut visited = vec![false; n];

    for start in 0..n {
        if visited[start] {
            continue;
        }
        in_direction[start] = Some(true);
        visited[start] = true;
        let mut queue = VecDeque::new();
        queue.push_back(start);

        while let Some(cur) = queue.pop_front() {
            let cur_dir = in_direction[cur].expect("visited roads are always marked");
            let spec = &specs[cur];

            for contact in [spec.successor, spec.predecessor].into_iter().flatten() {
                let RoadLink::Road(neighbor) = contact.link else {
                    continue;
                };
                let idx = neighbor.index();
                if idx >= n {
                    return Err(WorldError::MissingLink(RoadId(cur as u32)));
                }
                let next_dir = if contact.same_direction { cur_dir } else { !cur_dir };
                if !visited[idx] {
                    in_direction[idx] = Some(next_dir);
                    visited[idx] = true;
                    queue.push_back(idx);
                }
            }
        }
    }

    Ok(in_direction.into_iter().map(|d| d.unwrap_or(true)).collect())
}

fn link_sections_and_lanes(
    specs: &[RoadSpec],
    in_direction: &[bool],
) -> WorldResult<(Vec<Road>, Vec<Section>, Vec<Lane>)> {
    let mut roads = Vec::with_capacity(specs.len());
    let mut sections = Vec::new();
    let mut lanes = Vec::new();

    for (ri, spec) in specs.iter().enumerate() {
        let road_id = RoadId(ri as u32);
        let mut section_ids = Vec::with_capacity(spec.sections.len());
        let mut prev_section_lane_ids: Option<Vec<(i32, LaneId)>> = None;

        for sspec in &spec.sections {
            let section_id = SectionId(sections.len() as u32);
            let mut lane_ids = Vec::with_capacity(sspec.lanes.len());
            let mut by_index = Vec::with_capacity(sspec.lanes.len());

            for lspec in &sspec.lanes {
                let lane_id = LaneId(lanes.len() as u32);
                lanes.push(Lane {
                    id: lane_id,
                    section: section_id,
                    index: lspec.index,
                    width: lspec.width,
                    joints: lspec.joints.clone(),
                    left: None,
                    right: None,
                    predecessor: None,
                    successor: None,
                });
                lane_ids.push(lane_id);
                by_index.push((lspec.index, lane_id));
            }

            // Link left/right neighbors within the section by adjacent index.
            for &(idx, lane_id) in &by_index {
                let left = by_index.iter().find(|(i, _)| *i == idx + 1).map(|(_, id)| *id);
                let right = by_index.iter().find(|(i, _)| *i == idx - 1).map(|(_, id)| *id);
                let lane = &mut lanes[lane_id.index()];
                lane.left = left;
                lane.right = right;
            }

            // Link predecessor/successor lanes from the previous section in
            // this road by matching index (OpenDRIVE lane-link convention).
            if let Some(prev) = &prev_section_lane_ids {
                for &(idx, lane_id) in &by_index {
                    if let Some((_, pred_id)) = prev.iter().find(|(i, _)| *i == idx) {
                        lanes[lane_id.index()].predecessor = Some(*pred_id);
                        lanes[pred_id.index()].successor = Some(lane_id);
                    } else {
                        return Err(WorldError::MissingLaneLink(road_id, idx));
                    }
                }
            }

            sections.push(Section {
                id: section_id,
                road: road_id,
                s_start: sspec.s_start,
                s_end: sspec.s_end,
                lanes: lane_ids,
                predecessor: None,
                successor: None,
            });
            section_ids.push(section_id);
            prev_section_lane_ids = Some(by_index);
        }

        // Intra-road section-to-section links (sequential by construction).
        for w in section_ids.windows(2) {
            let (a, b) = (w[0], w[1]);
            sections[a.index()].successor = Some(b);
            sections[b.index()].predecessor = Some(a);
        }

        roads.push(Road {
            id: road_id,
            name: spec.name.clone(),
            in_direction: in_direction[ri],
            is_junction_road: spec.is_junction_road,
            sections: section_ids,
            predecessor: spec.predecessor,
            successor: spec.successor,
        });
    }

    Ok((roads, sections, lanes))
}

fn wire_junctions(
    junction_specs: &[(JunctionId, Vec<JunctionConnectionSpec>)],
    roads: &[Road],
    sections: &[Section],
    lanes: &[Lane],
) -> WorldResult<Vec<Junction>> {
    let mut junctions = Vec::with_capacity(junction_specs.len());

    for (id, conn_specs) in junction_specs {
        let mut connections = Vec::with_capacity(conn_specs.len());
        for cspec in conn_specs {
            let mut lane_links = Vec::with_capacity(cspec.lane_links.len());
            for &(incoming_idx, connecting_idx) in &cspec.lane_links {
                let incoming_lane = find_lane_by_index(roads, sections, lanes, cspec.incoming_road, incoming_idx)
                    .ok_or(WorldError::MissingLaneLink(cspec.incoming_road, incoming_idx))?;
                let connecting_lane =
                    find_lane_by_index(roads, sections, lanes, cspec.connecting_road, connecting_idx)
                        .ok_or(WorldError::MissingLaneLink(cspec.connecting_road, connecting_idx))?;
                lane_links.push((incoming_lane, connecting_lane));
            }
            connections.push(JunctionConnection {
                incoming_road: cspec.incoming_road,
                connecting_road: cspec.connecting_road,
                outgoing_road: cspec.outgoing_road,
                lane_links,
                priority: cspec.priority,
            });
        }
        junctions.push(Junction {
            id: *id,
            connections,
        });
    }

    Ok(junctions)
}

fn find_lane_by_index(
    roads: &[Road],
    sections: &[Section],
    lanes: &[Lane],
    road: RoadId,
    index: i32,
) -> Option<LaneId> {
    let road = &roads[road.index()];
    // First section of the road is the junction wiring's attachment point.
    let first_section = *road.sections.first()?;
    sections[first_section.index()]
        .lanes
        .iter()
        .find(|&&lane_id| lanes[lane_id.index()].index == index)
        .copied()
}
