//! Mesh construction: base bipyramid plus breadth-first midpoint subdivision.

use std::time::Instant;

use globe_config::GlobeConfig;
use globe_math::ModelPosition;
use globe_projection::{Ellipsoid, EllipsoidProjection};
use rustc_hash::FxHashMap;
use tracing::{debug, info};

use crate::geometry::{edge_midpoint, is_well_formed, split_corners};
use crate::triangle::{TriangleId, TriangleNode, VertexId};
use crate::{GlobeModelError, TriangleAddress, TriangleGlobeModel};

/// Configures and builds a [`TriangleGlobeModel`].
///
/// ```
/// use globe_mesh::GlobeModelBuilder;
/// use globe_projection::GeographicPosition;
///
/// let model = GlobeModelBuilder::new(8, 4).build().unwrap();
/// let view = model.freeze();
/// let leaf = view.locate(&GeographicPosition::surface(12.0, 10.0)).unwrap();
/// assert!(leaf.is_leaf());
/// ```
#[derive(Clone, Debug)]
pub struct GlobeModelBuilder {
    pole_resolution: u16,
    subdivision_depth: u8,
    projection: EllipsoidProjection,
    max_materialized_triangles: usize,
    containment_epsilon: f64,
}

impl GlobeModelBuilder {
    /// Fewest triangles per pole that still give a non-degenerate bipyramid.
    pub const MIN_POLE_RESOLUTION: u16 = 3;

    /// Largest pole resolution whose `2n` root indices fit a `u16`.
    pub const MAX_POLE_RESOLUTION: u16 = u16::MAX / 2;

    pub const DEFAULT_MAX_MATERIALIZED_TRIANGLES: usize = 262_144;

    pub const DEFAULT_CONTAINMENT_EPSILON: f64 = 1e-12;

    /// A builder for `2 * pole_resolution` roots split `subdivision_depth`
    /// times, on WGS84.
    #[must_use]
    pub fn new(pole_resolution: u16, subdivision_depth: u8) -> Self {
        Self {
            pole_resolution,
            subdivision_depth,
            projection: EllipsoidProjection::wgs84(),
            max_materialized_triangles: Self::DEFAULT_MAX_MATERIALIZED_TRIANGLES,
            containment_epsilon: Self::DEFAULT_CONTAINMENT_EPSILON,
        }
    }

    /// A builder populated from the `mesh` and `ellipsoid` config sections.
    pub fn from_config(config: &GlobeConfig) -> Result<Self, GlobeModelError> {
        let ellipsoid = Ellipsoid::new(config.ellipsoid.semi_major_m, config.ellipsoid.semi_minor_m)?;
        Ok(Self::new(config.mesh.pole_resolution, config.mesh.subdivision_depth)
            .projection(EllipsoidProjection::new(ellipsoid))
            .max_materialized_triangles(config.mesh.max_materialized_triangles)
            .containment_epsilon(config.mesh.containment_epsilon))
    }

    #[must_use]
    pub fn projection(mut self, projection: EllipsoidProjection) -> Self {
        self.projection = projection;
        self
    }

    /// Cap on triangles stored in the arena. Levels that would exceed it are
    /// derived during descent instead. The roots are always stored.
    #[must_use]
    pub fn max_materialized_triangles(mut self, budget: usize) -> Self {
        self.max_materialized_triangles = budget;
        self
    }

    /// Relative edge tolerance for the widened containment retry.
    #[must_use]
    pub fn containment_epsilon(mut self, epsilon: f64) -> Self {
        self.containment_epsilon = epsilon;
        self
    }

    /// Build the mesh. Either the full model is returned or nothing is.
    pub fn build(self) -> Result<TriangleGlobeModel, GlobeModelError> {
        let start = Instant::now();
        self.validate()?;

        let root_count = 2 * self.pole_resolution as usize;
        let materialized_depth = plan_materialized_depth(
            root_count,
            self.subdivision_depth,
            self.max_materialized_triangles,
        );

        let mut arena = Arena::default();
        arena.push_base_polyhedron(&self.projection, self.pole_resolution)?;
        for depth in 0..materialized_depth {
            arena.subdivide_level(&self.projection, depth)?;
            debug!(
                "Subdivided level {} -> {}: {} triangles, {} vertices",
                depth,
                depth + 1,
                arena.level_len(depth + 1),
                arena.vertices.len()
            );
        }

        info!(
            "Built globe model: {} roots, depth {} ({} materialized), {} triangles, {} vertices in {:.1} ms",
            root_count,
            self.subdivision_depth,
            materialized_depth,
            arena.nodes.len(),
            arena.vertices.len(),
            start.elapsed().as_secs_f64() * 1000.0
        );

        Ok(TriangleGlobeModel {
            projection: self.projection,
            pole_resolution: self.pole_resolution,
            subdivision_depth: self.subdivision_depth,
            materialized_depth,
            containment_epsilon: self.containment_epsilon,
            vertices: arena.vertices,
            nodes: arena.nodes,
            level_starts: arena.level_starts,
        })
    }

    fn validate(&self) -> Result<(), GlobeModelError> {
        if !(Self::MIN_POLE_RESOLUTION..=Self::MAX_POLE_RESOLUTION).contains(&self.pole_resolution)
        {
            return Err(GlobeModelError::InvalidParameter(format!(
                "pole resolution {} outside {}..={}",
                self.pole_resolution,
                Self::MIN_POLE_RESOLUTION,
                Self::MAX_POLE_RESOLUTION
            )));
        }
        if self.subdivision_depth > TriangleAddress::MAX_DEPTH {
            return Err(GlobeModelError::InvalidParameter(format!(
                "subdivision depth {} exceeds {}",
                self.subdivision_depth,
                TriangleAddress::MAX_DEPTH
            )));
        }
        if self.max_materialized_triangles > u32::MAX as usize {
            return Err(GlobeModelError::InvalidParameter(format!(
                "materialized triangle budget {} exceeds {}",
                self.max_materialized_triangles,
                u32::MAX
            )));
        }
        if !self.containment_epsilon.is_finite() || self.containment_epsilon < 0.0 {
            return Err(GlobeModelError::InvalidParameter(format!(
                "containment epsilon {} must be finite and non-negative",
                self.containment_epsilon
            )));
        }
        Ok(())
    }
}

/// Deepest level whose cumulative triangle count stays within `budget`.
fn plan_materialized_depth(root_count: usize, subdivision_depth: u8, budget: usize) -> u8 {
    let mut total = root_count;
    let mut level_len = root_count;
    let mut depth = 0;
    while depth < subdivision_depth {
        let Some(next_len) = level_len.checked_mul(4) else {
            break;
        };
        match total.checked_add(next_len) {
            Some(next_total) if next_total <= budget => {
                total = next_total;
                level_len = next_len;
                depth += 1;
            }
            _ => break,
        }
    }
    depth
}

/// Storage being filled during construction. Nodes are appended level by
/// level; `level_starts[k]..level_starts[k + 1]` is level `k`.
#[derive(Default)]
struct Arena {
    vertices: Vec<ModelPosition>,
    nodes: Vec<TriangleNode>,
    level_starts: Vec<u32>,
}

impl Arena {
    fn push_vertex(&mut self, position: ModelPosition) -> VertexId {
        let id = VertexId(self.vertices.len() as u32);
        self.vertices.push(position);
        id
    }

    fn positions(&self, corners: [VertexId; 3]) -> [ModelPosition; 3] {
        corners.map(|v| self.vertices[v.index()])
    }

    fn push_node(
        &mut self,
        corners: [VertexId; 3],
        parent: Option<TriangleId>,
        address: TriangleAddress,
    ) -> Result<TriangleId, GlobeModelError> {
        if !is_well_formed(&self.positions(corners)) {
            return Err(GlobeModelError::DegenerateTriangle { address });
        }
        let id = TriangleId(self.nodes.len() as u32);
        self.nodes.push(TriangleNode {
            corners,
            parent,
            children: None,
            address,
        });
        Ok(id)
    }

    fn level_len(&self, depth: u8) -> usize {
        let depth = depth as usize;
        (self.level_starts[depth + 1] - self.level_starts[depth]) as usize
    }

    /// `n` triangles fan from each pole to `n` equator vertices spaced
    /// `360 / n` degrees apart starting at the antimeridian. North fan first,
    /// then south.
    fn push_base_polyhedron(
        &mut self,
        projection: &EllipsoidProjection,
        pole_resolution: u16,
    ) -> Result<(), GlobeModelError> {
        let n = pole_resolution;
        let north = self.push_vertex(projection.surface_point(90.0, 0.0));
        let south = self.push_vertex(projection.surface_point(-90.0, 0.0));
        let step = 360.0 / f64::from(n);
        let equator: Vec<VertexId> = (0..n)
            .map(|i| self.push_vertex(projection.surface_point(0.0, -180.0 + f64::from(i) * step)))
            .collect();

        self.level_starts.push(0);
        for i in 0..n {
            let east = equator[usize::from((i + 1) % n)];
            let west = equator[usize::from(i)];
            self.push_node([north, west, east], None, TriangleAddress::root(i))?;
        }
        for i in 0..n {
            let east = equator[usize::from((i + 1) % n)];
            let west = equator[usize::from(i)];
            self.push_node([south, east, west], None, TriangleAddress::root(n + i))?;
        }
        self.level_starts.push(self.nodes.len() as u32);
        Ok(())
    }

    /// Replace every triangle of level `depth` by its four children.
    ///
    /// Midpoints are keyed by the unordered parent edge, so both triangles
    /// on an edge receive the same `VertexId`.
    fn subdivide_level(
        &mut self,
        projection: &EllipsoidProjection,
        depth: u8,
    ) -> Result<(), GlobeModelError> {
        let start = self.level_starts[depth as usize] as usize;
        let end = self.level_starts[depth as usize + 1] as usize;
        let mut midpoints: FxHashMap<(VertexId, VertexId), VertexId> = FxHashMap::default();
        midpoints.reserve((end - start) * 3 / 2);

        for parent_index in start..end {
            let TriangleNode {
                corners, address, ..
            } = self.nodes[parent_index].clone();
            let [v0, v1, v2] = corners;
            let mids = [
                self.midpoint(projection, &mut midpoints, v0, v1),
                self.midpoint(projection, &mut midpoints, v1, v2),
                self.midpoint(projection, &mut midpoints, v2, v0),
            ];

            let parent = TriangleId(parent_index as u32);
            let mut children = [parent; 4];
            for (i, child_corners) in split_corners(corners, mids).into_iter().enumerate() {
                children[i] = self.push_node(child_corners, Some(parent), address.child(i))?;
            }
            self.nodes[parent_index].children = Some(children);
        }

        self.level_starts.push(self.nodes.len() as u32);
        Ok(())
    }

    fn midpoint(
        &mut self,
        projection: &EllipsoidProjection,
        midpoints: &mut FxHashMap<(VertexId, VertexId), VertexId>,
        a: VertexId,
        b: VertexId,
    ) -> VertexId {
        let key = (a.min(b), a.max(b));
        if let Some(&existing) = midpoints.get(&key) {
            debug_assert_eq!(
                self.vertices[existing.index()],
                edge_midpoint(projection, self.vertices[a.index()], self.vertices[b.index()]),
                "shared edge {key:?} resolved to a different midpoint"
            );
            return existing;
        }
        let position = edge_midpoint(projection, self.vertices[a.index()], self.vertices[b.index()]);
        let id = self.push_vertex(position);
        midpoints.insert(key, id);
        id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plan_respects_budget() {
        // 8 roots: cumulative 8, 40, 168, 680, ...
        assert_eq!(plan_materialized_depth(8, 10, 8), 0);
        assert_eq!(plan_materialized_depth(8, 10, 39), 0);
        assert_eq!(plan_materialized_depth(8, 10, 40), 1);
        assert_eq!(plan_materialized_depth(8, 10, 680), 3);
        assert_eq!(plan_materialized_depth(8, 2, usize::MAX), 2);
    }

    #[test]
    fn test_plan_for_reference_parameters() {
        // 26 roots: levels 0..=6 total 141,986 triangles; level 7 would add 425,984.
        assert_eq!(plan_materialized_depth(26, 25, 262_144), 6);
    }

    #[test]
    fn test_rejects_low_pole_resolution() {
        let err = GlobeModelBuilder::new(2, 1).build().unwrap_err();
        assert!(matches!(err, GlobeModelError::InvalidParameter(_)));
    }

    #[test]
    fn test_rejects_excessive_depth() {
        let err = GlobeModelBuilder::new(4, 32).build().unwrap_err();
        assert!(matches!(err, GlobeModelError::InvalidParameter(_)));
    }

    #[test]
    fn test_rejects_bad_epsilon() {
        let err = GlobeModelBuilder::new(4, 1)
            .containment_epsilon(f64::NAN)
            .build()
            .unwrap_err();
        assert!(matches!(err, GlobeModelError::InvalidParameter(_)));
    }

    #[test]
    fn test_from_config_rejects_bad_ellipsoid() {
        let mut config = GlobeConfig::default();
        config.ellipsoid.semi_minor_m = -1.0;
        let err = GlobeModelBuilder::from_config(&config).unwrap_err();
        assert!(matches!(err, GlobeModelError::Projection(_)));
    }

    #[test]
    fn test_from_config_applies_mesh_section() {
        let mut config = GlobeConfig::default();
        config.mesh.pole_resolution = 6;
        config.mesh.subdivision_depth = 3;
        config.mesh.max_materialized_triangles = 100;
        let model = GlobeModelBuilder::from_config(&config).unwrap().build().unwrap();
        assert_eq!(model.pole_resolution(), 6);
        assert_eq!(model.subdivision_depth(), 3);
        // 12 + 48 = 60 fits, + 192 does not.
        assert_eq!(model.materialized_depth(), 1);
    }

    #[test]
    fn test_base_polyhedron_counts() {
        let model = GlobeModelBuilder::new(7, 0).build().unwrap();
        assert_eq!(model.root_count(), 14);
        assert_eq!(model.vertex_count(), 9);
        assert_eq!(model.materialized_triangle_count(), 14);
        assert!(model.roots().all(|r| r.is_leaf()));
    }

    #[test]
    fn test_euler_characteristic_of_materialized_levels() {
        let model = GlobeModelBuilder::new(5, 3).build().unwrap();
        let faces = 10 * 4usize.pow(3);
        // Closed triangulated sphere: V = F / 2 + 2.
        assert_eq!(model.materialized_depth(), 3);
        assert_eq!(model.vertex_count(), faces / 2 + 2);
    }

    #[test]
    fn test_parent_links_are_consistent() {
        let model = GlobeModelBuilder::new(4, 2).build().unwrap();
        for root in model.roots() {
            assert!(root.parent().is_none());
            for child in root.children() {
                assert_eq!(child.parent().unwrap(), root);
                for grandchild in child.children() {
                    assert_eq!(grandchild.parent().unwrap(), child);
                    assert!(grandchild.children().is_empty());
                }
            }
        }
    }
}
