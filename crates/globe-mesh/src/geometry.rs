//! Spherical-triangle predicates and the midpoint subdivision rule.

use std::cmp::Ordering;

use globe_math::ModelPosition;
use globe_projection::EllipsoidProjection;

/// Slack of the strict test in units of machine epsilon. Covers the rounding
/// of the plane test for a point computed on an edge.
const STRICT_SLACK_ULPS: f64 = 16.0;

/// How strictly a point must fall inside the three edge half-spaces.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) enum Containment {
    /// Edge-inclusive: normalized signed distance `>= -16·ε` for every
    /// edge, so a point on a shared edge is inside both neighbors.
    Strict,
    /// Accept points whose normalized signed distance is `>= -epsilon`.
    Widened(f64),
}

impl Containment {
    /// Three great-circle half-space tests, one per edge `(a, b)`.
    ///
    /// Corners are counter-clockwise seen from outside, so the third vertex
    /// is always on the positive side of `edge_normal(a, b)` and the point
    /// only has to be checked against that single sign.
    pub(crate) fn test(self, corners: &[ModelPosition; 3], point: ModelPosition) -> bool {
        let [v0, v1, v2] = *corners;
        [(v0, v1), (v1, v2), (v2, v0)]
            .into_iter()
            .all(|(a, b)| self.accepts(edge_normal(a, b), point))
    }

    fn tolerance(self) -> f64 {
        match self {
            Containment::Strict => STRICT_SLACK_ULPS * f64::EPSILON,
            Containment::Widened(epsilon) => epsilon,
        }
    }

    fn accepts(self, normal: ModelPosition, point: ModelPosition) -> bool {
        let side = normal.dot(point);
        side >= 0.0 || side >= -self.tolerance() * normal.length() * point.length()
    }
}

/// Normal of the plane through the origin, `a` and `b`, pointing to the left
/// of `a → b` (i.e. `a × b`).
///
/// Evaluated in canonical vertex order, so the two triangles sharing an edge
/// get exactly negated normals: a point can never be rejected by both, and
/// one within rounding of the edge is accepted by both.
/// Using `a × (b − a)` keeps the result accurate for short edges.
pub(crate) fn edge_normal(a: ModelPosition, b: ModelPosition) -> ModelPosition {
    match a.canonical_cmp(&b) {
        Ordering::Greater => -(b.cross(a - b)),
        _ => a.cross(b - a),
    }
}

/// Signed volume-like orientation of a triangle; positive when the corners
/// wind counter-clockwise seen from outside the ellipsoid.
pub(crate) fn orientation(corners: &[ModelPosition; 3]) -> f64 {
    let [v0, v1, v2] = *corners;
    (v1 - v0).cross(v2 - v0).dot(v0)
}

/// True if no two corners coincide and the winding is counter-clockwise.
pub(crate) fn is_well_formed(corners: &[ModelPosition; 3]) -> bool {
    let [v0, v1, v2] = *corners;
    v0 != v1 && v1 != v2 && v2 != v0 && orientation(corners) > 0.0
}

/// Midpoint of an edge, pushed radially back onto the ellipsoid surface.
///
/// Depends only on the two endpoint values (the chord midpoint is
/// symmetric), so neighbors that split the same edge get bit-identical
/// vertices.
#[inline]
pub(crate) fn edge_midpoint(
    projection: &EllipsoidProjection,
    a: ModelPosition,
    b: ModelPosition,
) -> ModelPosition {
    projection.project_to_surface(a.midpoint(b))
}

/// Child corner sets of a split triangle, in the fixed child order.
///
/// Given corners `(v0, v1, v2)` and edge midpoints `m01, m12, m20`:
///
/// ```text
/// 0: (v0,  m01, m20)
/// 1: (m01, v1,  m12)
/// 2: (m20, m12, v2 )
/// 3: (m01, m12, m20)   center
/// ```
///
/// Every child keeps the parent's counter-clockwise winding.
#[inline]
pub(crate) fn split_corners<T: Copy>(corners: [T; 3], midpoints: [T; 3]) -> [[T; 3]; 4] {
    let [v0, v1, v2] = corners;
    let [m01, m12, m20] = midpoints;
    [
        [v0, m01, m20],
        [m01, v1, m12],
        [m20, m12, v2],
        [m01, m12, m20],
    ]
}

/// Subdivide a triangle given by corner positions.
pub(crate) fn subdivide(
    projection: &EllipsoidProjection,
    corners: [ModelPosition; 3],
) -> [[ModelPosition; 3]; 4] {
    let [v0, v1, v2] = corners;
    let midpoints = [
        edge_midpoint(projection, v0, v1),
        edge_midpoint(projection, v1, v2),
        edge_midpoint(projection, v2, v0),
    ];
    split_corners(corners, midpoints)
}
