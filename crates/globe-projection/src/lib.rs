//! Ellipsoid projection: geographic (lat, lon, altitude) to Cartesian model space and back.

mod ellipsoid;
mod error;
mod geographic;
mod projection;

pub use ellipsoid::Ellipsoid;
pub use error::ProjectionError;
pub use geographic::{GeographicPosition, ReferenceLevel};
pub use projection::EllipsoidProjection;
