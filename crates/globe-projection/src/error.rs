//! Projection error types.

/// Errors produced by the geographic/model transforms.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ProjectionError {
    /// The requested altitude reference level is unknown or cannot be
    /// resolved by a bare ellipsoid (e.g. terrain-relative altitude).
    #[error("unsupported reference level: {0}")]
    UnsupportedReferenceLevel(String),

    /// Ellipsoid axes must be finite, positive, and `semi_minor <= semi_major`.
    #[error("invalid ellipsoid axes: semi_major={semi_major}, semi_minor={semi_minor}")]
    InvalidEllipsoid { semi_major: f64, semi_minor: f64 },
}
