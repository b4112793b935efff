//! Globe model error types.

use globe_projection::ProjectionError;

use crate::TriangleAddress;

/// Errors from building or querying a [`TriangleGlobeModel`](crate::TriangleGlobeModel).
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum GlobeModelError {
    /// Latitude outside \[-90, 90\] or longitude outside \[-180, 180\].
    #[error("position out of range: lat={lat}, lon={lon}")]
    InvalidPosition { lat: f64, lon: f64 },

    /// Neither the strict nor the widened descent found a triangle. The
    /// mesh is closed, so this indicates a construction defect.
    #[error("no triangle contains lat={lat}, lon={lon}")]
    NoContainingTriangle { lat: f64, lon: f64 },

    /// A builder parameter is outside its supported range.
    #[error("invalid model parameter: {0}")]
    InvalidParameter(String),

    /// A triangle has coincident corners or inverted winding.
    #[error("degenerate triangle at {address}")]
    DegenerateTriangle { address: TriangleAddress },

    /// The configured ellipsoid could not be constructed.
    #[error(transparent)]
    Projection(#[from] ProjectionError),
}
