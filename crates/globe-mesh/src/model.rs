//! The built mesh and its point-location queries.

use std::fmt;

use globe_math::ModelPosition;
use globe_projection::{EllipsoidProjection, GeographicPosition};
use tracing::{error, warn};

use crate::geometry::{Containment, subdivide};
use crate::triangle::{TerrainTriangle, TriangleId, TriangleNode, VertexId};
use crate::{GlobeModelError, ImmutableGlobeModelView, TriangleAddress};

/// Cost breakdown of one [`TriangleGlobeModel::locate_traced`] call.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct LocateStats {
    /// Containment tests run at each level of the successful descent,
    /// roots first.
    pub comparisons_per_level: Vec<u32>,
    /// True if the strict descent failed and the widened one answered.
    pub widened_retry: bool,
}

impl LocateStats {
    /// Levels visited by the successful descent, roots included.
    #[must_use]
    pub fn levels_visited(&self) -> usize {
        self.comparisons_per_level.len()
    }

    /// Containment tests summed over every level.
    #[must_use]
    pub fn total_comparisons(&self) -> u64 {
        self.comparisons_per_level.iter().map(|&c| u64::from(c)).sum()
    }
}

/// A closed triangulated globe with hierarchical point location.
///
/// Levels `0..=materialized_depth` live in a flat arena; deeper levels are
/// rebuilt from their parents' corners with the same midpoint rule, so they
/// partition the sphere exactly as stored levels would. Built by
/// [`GlobeModelBuilder`](crate::GlobeModelBuilder).
pub struct TriangleGlobeModel {
    pub(crate) projection: EllipsoidProjection,
    pub(crate) pole_resolution: u16,
    pub(crate) subdivision_depth: u8,
    pub(crate) materialized_depth: u8,
    pub(crate) containment_epsilon: f64,
    pub(crate) vertices: Vec<ModelPosition>,
    pub(crate) nodes: Vec<TriangleNode>,
    /// Arena offset of each materialized level, plus the end offset.
    pub(crate) level_starts: Vec<u32>,
}

impl TriangleGlobeModel {
    /// Find the leaf triangle containing the surface point below `position`.
    ///
    /// Only latitude and longitude are used. Points on a shared edge or
    /// vertex resolve to the first candidate in root order, then child order.
    ///
    /// # Errors
    ///
    /// - [`GlobeModelError::InvalidPosition`] for out-of-range or NaN coordinates.
    /// - [`GlobeModelError::NoContainingTriangle`] if even the widened
    ///   descent finds no match.
    pub fn locate(&self, position: &GeographicPosition) -> Result<TerrainTriangle<'_>, GlobeModelError> {
        self.locate_traced(position).map(|(triangle, _)| triangle)
    }

    /// [`locate`](Self::locate), also reporting how much work it took.
    pub fn locate_traced(
        &self,
        position: &GeographicPosition,
    ) -> Result<(TerrainTriangle<'_>, LocateStats), GlobeModelError> {
        if !position.is_valid_lat_lon() {
            return Err(GlobeModelError::InvalidPosition {
                lat: position.lat_deg,
                lon: position.lon_deg,
            });
        }
        let target = self.surface_target(position);

        let mut stats = LocateStats::default();
        if let Some(found) = self.descend(target, Containment::Strict, &mut stats) {
            return Ok((found, stats));
        }

        warn!(
            "Strict descent missed lat={}, lon={} at level {}; retrying with epsilon {}",
            position.lat_deg,
            position.lon_deg,
            stats.levels_visited().saturating_sub(1),
            self.containment_epsilon
        );
        let mut stats = LocateStats {
            widened_retry: true,
            ..LocateStats::default()
        };
        if let Some(found) =
            self.descend(target, Containment::Widened(self.containment_epsilon), &mut stats)
        {
            return Ok((found, stats));
        }

        error!(
            "No triangle contains lat={}, lon={}: mesh does not cover the globe",
            position.lat_deg, position.lon_deg
        );
        Err(GlobeModelError::NoContainingTriangle {
            lat: position.lat_deg,
            lon: position.lon_deg,
        })
    }

    /// Locate each position independently, in order.
    pub fn locate_many(
        &self,
        positions: &[GeographicPosition],
    ) -> Vec<Result<TerrainTriangle<'_>, GlobeModelError>> {
        positions.iter().map(|p| self.locate(p)).collect()
    }

    /// Root-to-leaf first-match descent. `None` as soon as a level has no
    /// accepting candidate.
    fn descend(
        &self,
        target: ModelPosition,
        containment: Containment,
        stats: &mut LocateStats,
    ) -> Option<TerrainTriangle<'_>> {
        let mut current = first_match(self.roots(), target, containment, stats)?;
        while current.depth() < self.subdivision_depth {
            current = first_match(self.child_triangles(&current), target, containment, stats)?;
        }
        Some(current)
    }

    /// The triangle at `address`, materialized or derived.
    ///
    /// `None` if the root index or depth is outside this model.
    #[must_use]
    pub fn triangle(&self, address: TriangleAddress) -> Option<TerrainTriangle<'_>> {
        if usize::from(address.root_index()) >= self.root_count()
            || address.depth() > self.subdivision_depth
        {
            return None;
        }
        let mut current =
            TerrainTriangle::materialized(self, TriangleId(u32::from(address.root_index())));
        for index in address.path() {
            current = self.child_triangles(&current)[index];
        }
        Some(current)
    }

    /// The four children of a non-leaf triangle, from the arena when stored.
    pub(crate) fn child_triangles<'a>(
        &'a self,
        parent: &TerrainTriangle<'a>,
    ) -> [TerrainTriangle<'a>; 4] {
        if let Some(children) = parent.node.and_then(|id| self.node(id).children) {
            return children.map(|child| TerrainTriangle::materialized(self, child));
        }
        let mut index = 0;
        subdivide(&self.projection, parent.corners).map(|corners| {
            let child = TerrainTriangle {
                model: self,
                address: parent.address.child(index),
                corners,
                node: None,
            };
            index += 1;
            child
        })
    }

    /// Root triangles: north fan west to east, then south fan.
    pub fn roots(&self) -> impl ExactSizeIterator<Item = TerrainTriangle<'_>> + '_ {
        (0..self.root_count() as u32).map(|i| TerrainTriangle::materialized(self, TriangleId(i)))
    }

    /// Every stored triangle at `depth`, in arena order. Empty below the
    /// materialized depth.
    pub fn materialized_level(&self, depth: u8) -> impl Iterator<Item = TerrainTriangle<'_>> + '_ {
        let range = if depth <= self.materialized_depth {
            self.level_starts[depth as usize]..self.level_starts[depth as usize + 1]
        } else {
            0..0
        };
        range.map(|i| TerrainTriangle::materialized(self, TriangleId(i)))
    }

    /// Position of a stored vertex.
    ///
    /// # Panics
    ///
    /// Panics if `id` does not come from this model.
    #[must_use]
    pub fn vertex(&self, id: VertexId) -> ModelPosition {
        self.vertices[id.index()]
    }

    #[must_use]
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    #[must_use]
    pub fn materialized_triangle_count(&self) -> usize {
        self.nodes.len()
    }

    /// Number of leaf triangles, stored or not.
    #[must_use]
    pub fn leaf_count(&self) -> u128 {
        self.root_count() as u128 * 4u128.pow(u32::from(self.subdivision_depth))
    }

    #[must_use]
    pub fn root_count(&self) -> usize {
        2 * usize::from(self.pole_resolution)
    }

    #[must_use]
    pub fn pole_resolution(&self) -> u16 {
        self.pole_resolution
    }

    #[must_use]
    pub fn subdivision_depth(&self) -> u8 {
        self.subdivision_depth
    }

    /// Deepest level held in the arena.
    #[must_use]
    pub fn materialized_depth(&self) -> u8 {
        self.materialized_depth
    }

    #[must_use]
    pub fn projection(&self) -> &EllipsoidProjection {
        &self.projection
    }

    #[must_use]
    pub fn containment_epsilon(&self) -> f64 {
        self.containment_epsilon
    }

    /// Publish the model for shared read-only use.
    #[must_use]
    pub fn freeze(self) -> ImmutableGlobeModelView {
        ImmutableGlobeModelView::new(self)
    }

    pub(crate) fn node(&self, id: TriangleId) -> &TriangleNode {
        &self.nodes[id.index()]
    }

    pub(crate) fn corner_positions(&self, node: &TriangleNode) -> [ModelPosition; 3] {
        node.corners.map(|v| self.vertices[v.index()])
    }

    /// Point on the ellipsoid below `position`, used for every containment test.
    pub(crate) fn surface_target(&self, position: &GeographicPosition) -> ModelPosition {
        self.projection.surface_point(position.lat_deg, position.lon_deg)
    }
}

fn first_match<'a>(
    candidates: impl IntoIterator<Item = TerrainTriangle<'a>>,
    target: ModelPosition,
    containment: Containment,
    stats: &mut LocateStats,
) -> Option<TerrainTriangle<'a>> {
    let mut comparisons = 0;
    let found = candidates.into_iter().find(|candidate| {
        comparisons += 1;
        containment.test(&candidate.corners, target)
    });
    stats.comparisons_per_level.push(comparisons);
    found
}

impl fmt::Debug for TriangleGlobeModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TriangleGlobeModel")
            .field("pole_resolution", &self.pole_resolution)
            .field("subdivision_depth", &self.subdivision_depth)
            .field("materialized_depth", &self.materialized_depth)
            .field("vertices", &self.vertices.len())
            .field("triangles", &self.nodes.len())
            .field("projection", &self.projection)
            .finish()
    }
}
