//! Triangle nodes stored in the model arena, and the read-only handle
//! returned to callers.

use std::fmt;

use globe_math::ModelPosition;
use globe_projection::GeographicPosition;

use crate::TriangleAddress;
use crate::geometry::Containment;
use crate::model::TriangleGlobeModel;

/// Index of a shared vertex in the model's vertex arena.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct VertexId(pub(crate) u32);

impl VertexId {
    #[must_use]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Index of a triangle in the model's triangle arena.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub(crate) struct TriangleId(pub(crate) u32);

impl TriangleId {
    pub(crate) fn index(self) -> usize {
        self.0 as usize
    }
}

/// One materialized triangle. Links are arena indices; the model owns
/// every node and the parent link is navigational only.
#[derive(Clone, Debug)]
pub(crate) struct TriangleNode {
    pub(crate) corners: [VertexId; 3],
    pub(crate) parent: Option<TriangleId>,
    pub(crate) children: Option<[TriangleId; 4]>,
    pub(crate) address: TriangleAddress,
}

/// A triangular patch of the globe mesh.
///
/// Borrowed from the model that produced it. Materialized triangles also
/// carry their arena vertex ids; triangles below the materialized depth are
/// derived on the fly and compare equal by address.
#[derive(Clone, Copy)]
pub struct TerrainTriangle<'a> {
    pub(crate) model: &'a TriangleGlobeModel,
    pub(crate) address: TriangleAddress,
    pub(crate) corners: [ModelPosition; 3],
    pub(crate) node: Option<TriangleId>,
}

impl<'a> TerrainTriangle<'a> {
    pub(crate) fn materialized(model: &'a TriangleGlobeModel, id: TriangleId) -> Self {
        let node = model.node(id);
        Self {
            model,
            address: node.address,
            corners: model.corner_positions(node),
            node: Some(id),
        }
    }

    #[must_use]
    pub fn address(&self) -> TriangleAddress {
        self.address
    }

    #[must_use]
    pub fn depth(&self) -> u8 {
        self.address.depth()
    }

    /// Corner positions, counter-clockwise seen from outside the globe.
    #[must_use]
    pub fn vertices(&self) -> [ModelPosition; 3] {
        self.corners
    }

    /// Arena ids of the corners, for triangles stored in the arena.
    #[must_use]
    pub fn vertex_ids(&self) -> Option<[VertexId; 3]> {
        self.node.map(|id| self.model.node(id).corners)
    }

    /// Corner positions as geographic coordinates on the ellipsoid.
    #[must_use]
    pub fn geographic_vertices(&self) -> [GeographicPosition; 3] {
        let projection = self.model.projection();
        self.corners.map(|v| projection.to_geodetic(v))
    }

    /// Corner average pushed back onto the ellipsoid surface.
    #[must_use]
    pub fn centroid(&self) -> ModelPosition {
        let [a, b, c] = self.corners;
        self.model.projection().project_to_surface((a + b + c) / 3.0)
    }

    /// True for the finest-resolution triangles returned by `locate`.
    #[must_use]
    pub fn is_leaf(&self) -> bool {
        self.depth() == self.model.subdivision_depth()
    }

    /// True if this triangle is stored in the model arena.
    #[must_use]
    pub fn is_materialized(&self) -> bool {
        self.node.is_some()
    }

    /// The four children in the fixed child order, or empty for a leaf.
    #[must_use]
    pub fn children(&self) -> Vec<TerrainTriangle<'a>> {
        if self.is_leaf() {
            return Vec::new();
        }
        self.model.child_triangles(self).to_vec()
    }

    /// The triangle this one was split from, or `None` for a root.
    #[must_use]
    pub fn parent(&self) -> Option<TerrainTriangle<'a>> {
        match self.node {
            Some(id) => self
                .model
                .node(id)
                .parent
                .map(|parent| TerrainTriangle::materialized(self.model, parent)),
            None => self.address.parent().and_then(|a| self.model.triangle(a)),
        }
    }

    /// Edge-inclusive containment of the surface point below `position`.
    ///
    /// Only latitude and longitude matter; the altitude is ignored.
    #[must_use]
    pub fn contains(&self, position: &GeographicPosition) -> bool {
        self.contains_model(self.model.surface_target(position))
    }

    /// Edge-inclusive containment of a model-space point, tested by the
    /// direction from the globe center.
    #[must_use]
    pub fn contains_model(&self, point: ModelPosition) -> bool {
        Containment::Strict.test(&self.corners, point)
    }

    /// Containment with each edge pushed outward by a relative `epsilon`.
    #[must_use]
    pub fn contains_within(&self, position: &GeographicPosition, epsilon: f64) -> bool {
        Containment::Widened(epsilon).test(&self.corners, self.model.surface_target(position))
    }
}

impl PartialEq for TerrainTriangle<'_> {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::eq(self.model, other.model) && self.address == other.address
    }
}

impl Eq for TerrainTriangle<'_> {}

impl fmt::Debug for TerrainTriangle<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TerrainTriangle")
            .field("address", &self.address)
            .field("corners", &self.corners)
            .field("materialized", &self.node.is_some())
            .finish()
    }
}

impl fmt::Display for TerrainTriangle<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.address)
    }
}

#[cfg(test)]
mod tests {
    use globe_projection::GeographicPosition;

    use crate::{GlobeModelBuilder, TriangleAddress};

    #[test]
    fn test_centroid_is_contained() {
        let model = GlobeModelBuilder::new(6, 3).build().unwrap();
        for tri in model.materialized_level(3) {
            assert!(tri.contains_model(tri.centroid()), "{tri}");
        }
    }

    #[test]
    fn test_vertices_lie_on_surface() {
        let model = GlobeModelBuilder::new(5, 2).build().unwrap();
        for tri in model.materialized_level(2) {
            for geo in tri.geographic_vertices() {
                assert!(geo.altitude.abs() < 1e-6, "{geo}");
                assert!(geo.is_valid_lat_lon());
            }
        }
    }

    #[test]
    fn test_derived_triangle_has_no_vertex_ids() {
        let model = GlobeModelBuilder::new(4, 3)
            .max_materialized_triangles(40)
            .build()
            .unwrap();
        let stored = model.triangle(TriangleAddress::root(0).child(2)).unwrap();
        assert!(stored.is_materialized());
        assert_eq!(stored.vertex_ids().map(|ids| ids.map(|v| model.vertex(v))), Some(stored.vertices()));

        let derived = stored.children()[3];
        assert!(!derived.is_materialized());
        assert!(derived.vertex_ids().is_none());
        assert_eq!(derived.parent().unwrap(), stored);
        assert_eq!(derived.to_string(), "r0:23");
    }

    #[test]
    fn test_children_cover_parent_samples() {
        let model = GlobeModelBuilder::new(8, 2).build().unwrap();
        let p = GeographicPosition::surface(20.3, 30.7);
        let root = model.roots().find(|r| r.contains(&p)).unwrap();
        let holders = root.children().into_iter().filter(|c| c.contains(&p)).count();
        assert_eq!(holders, 1);
    }

    #[test]
    fn test_widened_contains_accepts_neighbor_edge() {
        // Pole resolution 4: roots 1 and 2 share the lon 0 meridian.
        let model = GlobeModelBuilder::new(4, 0).build().unwrap();
        let roots: Vec<_> = model.roots().collect();
        let on_edge = GeographicPosition::surface(45.0, 0.0);
        assert!(roots[1].contains(&on_edge));
        assert!(roots[2].contains(&on_edge));

        let east = GeographicPosition::surface(45.0, 1e-9);
        assert!(!roots[1].contains(&east));
        assert!(roots[1].contains_within(&east, 1e-6));
        assert!(!roots[1].contains_within(&east, 1e-15));
    }
}
