//! Lane centerline geometry (§4.2 "Geometry").
//!
//! Each lane carries an ordered sequence of joints (one centerline sample
//! plus left/right edge points, heading, and curvature at an `sOffset`).
//! Two adjacent joints define a geometry element — a quadrilateral against
//! which world objects are intersected during localization.

use op_core::WorldPoint;

/// One sample along a lane's centerline.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct GeometryJoint {
    pub s_offset: f64,
    pub center: WorldPoint,
    pub left: WorldPoint,
    pub right: WorldPoint,
    pub heading: f64,
    pub curvature: f64,
}

/// The quadrilateral spanned by two adjacent joints on one lane.
#[derive(Copy, Clone, Debug)]
pub struct GeometryElement {
    pub s_start: f64,
    pub s_end: f64,
    /// Corners in winding order: left-start, left-end, right-end, right-start.
    pub corners: [WorldPoint; 4],
}

impl GeometryElement {
    pub fn from_joints(a: &GeometryJoint, b: &GeometryJoint) -> Self {
        Self {
            s_start: a.s_offset,
            s_end: b.s_offset,
            corners: [a.left, b.left, b.right, a.right],
        }
    }

    pub fn bbox(&self) -> ([f64; 2], [f64; 2]) {
        let xs = self.corners.map(|p| p.x);
        let ys = self.corners.map(|p| p.y);
        (
            [
                xs.iter().cloned().fold(f64::INFINITY, f64::min),
                ys.iter().cloned().fold(f64::INFINITY, f64::min),
            ],
            [
                xs.iter().cloned().fold(f64::NEG_INFINITY, f64::max),
                ys.iter().cloned().fold(f64::NEG_INFINITY, f64::max),
            ],
        )
    }

    pub fn centroid(&self) -> WorldPoint {
        let x = self.corners.iter().map(|p| p.x).sum::<f64>() / 4.0;
        let y = self.corners.iter().map(|p| p.y).sum::<f64>() / 4.0;
        WorldPoint::new(x, y)
    }

    /// Convex-polygon intersection test via the separating axis theorem —
    /// both shapes here are quads.
    pub fn intersects_polygon(&self, other: &[WorldPoint]) -> bool {
        separating_axis_overlap(&self.corners, other)
    }

    /// Whether `p` lies inside this quad (used to find the containing
    /// element for a reference/main-locator point, §4.2).
    pub fn contains_point(&self, p: WorldPoint) -> bool {
        point_in_convex_polygon(p, &self.corners)
    }
}

/// Linearly interpolate a joint's fields at `s` between two bounding joints.
pub fn interpolate(a: &GeometryJoint, b: &GeometryJoint, s: f64) -> GeometryJoint {
    let span = b.s_offset - a.s_offset;
    let t = if span.abs() < f64::EPSILON {
        0.0
    } else {
        ((s - a.s_offset) / span).clamp(0.0, 1.0)
    };
    GeometryJoint {
        s_offset: s,
        center: a.center.lerp(b.center, t),
        left: a.left.lerp(b.left, t),
        right: a.right.lerp(b.right, t),
        heading: a.heading + (b.heading - a.heading) * t,
        curvature: a.curvature + (b.curvature - a.curvature) * t,
    }
}

fn separating_axis_overlap(a: &[WorldPoint; 4], b: &[WorldPoint]) -> bool {
    for poly in [a.as_slice(), b] {
        for i in 0..poly.len() {
            let p1 = poly[i];
            let p2 = poly[(i + 1) % poly.len()];
            let axis = (-(p2.y - p1.y), p2.x - p1.x);
            let (mut min_a, mut max_a) = (f64::INFINITY, f64::NEG_INFINITY);
            for p in a {
                let proj = p.x * axis.0 + p.y * axis.1;
                min_a = min_a.min(proj);
                max_a = max_a.max(proj);
            }
            let (mut min_b, mut max_b) = (f64::INFINITY, f64::NEG_INFINITY);
            for p in b {
                let proj = p.x * axis.0 + p.y * axis.1;
                min_b = min_b.min(proj);
                max_b = max_b.max(proj);
            }
            if max_a < min_b || max_b < min_a {
                return false;
            }
        }
    }
    true
}

fn point_in_convex_polygon(p: WorldPoint, poly: &[WorldPoint]) -> bool {
    let mut sign = 0.0;
    for i in 0..poly.len() {
        let a = poly[i];
        let b = poly[(i + 1) % poly.len()];
        let cross = (b.x - a.x) * (p.y - a.y) - (b.y - a.y) * (p.x - a.x);
        if cross.abs() < f64::EPSILON {
            continue;
        }
        if sign == 0.0 {
            sign = cross.signum();
        } else if cross.signum() != sign {
            return false;
        }
    }
    true
}

/// A bounding polygon plus the two locator points used for localization.
#[derive(Clone, Debug)]
pub struct ObjectPolygon {
    pub corners: Vec<WorldPoint>,
    pub reference_point: WorldPoint,
    /// For moving objects, offset forward from `reference_point` by
    /// `distance_reference_to_leading_edge`; equal to `reference_point` for
    /// stationary objects.
    pub main_locator: WorldPoint,
    pub heading: f64,
}

impl ObjectPolygon {
    /// Build a rectangle centered at `reference_point` with the given
    /// width/length, oriented along `heading`; `forward_offset` is
    /// `distance_reference_to_leading_edge` for moving objects, `None` for
    /// stationary ones.
    pub fn rectangle(
        reference_point: WorldPoint,
        heading: f64,
        length: f64,
        width: f64,
        forward_offset: Option<f64>,
    ) -> Self {
        let half_l = length / 2.0;
        let half_w = width / 2.0;
        let fwd = (heading.cos(), heading.sin());
        let lat = (-heading.sin(), heading.cos());
        let corner = |dl: f64, dw: f64| {
            WorldPoint::new(
                reference_point.x + fwd.0 * dl + lat.0 * dw,
                reference_point.y + fwd.1 * dl + lat.1 * dw,
            )
        };
        let corners = vec![
            corner(half_l, half_w),
            corner(half_l, -half_w),
            corner(-half_l, -half_w),
            corner(-half_l, half_w),
        ];
        // For stationary objects (no forward offset), the main locator
        // coincides with the reference point (confirmed against the
        // original AgentAdapter's handling of non-moving objects).
        let main_locator = forward_offset.map_or(reference_point, |d| reference_point.project(heading, d));
        Self {
            corners,
            reference_point,
            main_locator,
            heading,
        }
    }

    pub fn bbox(&self) -> ([f64; 2], [f64; 2]) {
        let xs: Vec<f64> = self.corners.iter().map(|p| p.x).collect();
        let ys: Vec<f64> = self.corners.iter().map(|p| p.y).collect();
        (
            [
                xs.iter().cloned().fold(f64::INFINITY, f64::min),
                ys.iter().cloned().fold(f64::INFINITY, f64::min),
            ],
            [
                xs.iter().cloned().fold(f64::NEG_INFINITY, f64::max),
                ys.iter().cloned().fold(f64::NEG_INFINITY, f64::max),
            ],
        )
    }
}
