//! Geodesic triangle mesh over an ellipsoid, with hierarchical point location.
//!
//! A [`GlobeModelBuilder`] assembles a bipyramid of root triangles, splits
//! every triangle at its edge midpoints level by level, and produces a
//! [`TriangleGlobeModel`]. Freezing the model into an
//! [`ImmutableGlobeModelView`] publishes it for lock-free concurrent queries.

mod address;
mod builder;
mod error;
mod geometry;
mod model;
mod triangle;
mod view;

pub use address::TriangleAddress;
pub use builder::GlobeModelBuilder;
pub use error::GlobeModelError;
pub use model::{LocateStats, TriangleGlobeModel};
pub use triangle::{TerrainTriangle, VertexId};
pub use view::ImmutableGlobeModelView;
