//! Reference ellipsoid shapes.

use crate::ProjectionError;

/// An oblate ellipsoid of revolution around the Z axis.
///
/// A sphere is the special case `semi_major == semi_minor`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Ellipsoid {
    semi_major: f64,
    semi_minor: f64,
}

impl Ellipsoid {
    /// WGS84: a = 6,378,137 m, f = 1 / 298.257223563.
    pub const WGS84: Ellipsoid = Ellipsoid {
        semi_major: 6_378_137.0,
        semi_minor: 6_356_752.314_245_179,
    };

    /// Construct an ellipsoid from its equatorial and polar radii in meters.
    pub fn new(semi_major: f64, semi_minor: f64) -> Result<Self, ProjectionError> {
        let valid = semi_major.is_finite()
            && semi_minor.is_finite()
            && semi_minor > 0.0
            && semi_minor <= semi_major;
        if !valid {
            return Err(ProjectionError::InvalidEllipsoid {
                semi_major,
                semi_minor,
            });
        }
        Ok(Self {
            semi_major,
            semi_minor,
        })
    }

    /// A sphere of the given radius in meters.
    pub fn sphere(radius: f64) -> Result<Self, ProjectionError> {
        Self::new(radius, radius)
    }

    /// Equatorial radius `a` in meters.
    #[must_use]
    pub fn semi_major(&self) -> f64 {
        self.semi_major
    }

    /// Polar radius `b` in meters.
    #[must_use]
    pub fn semi_minor(&self) -> f64 {
        self.semi_minor
    }

    /// `f = (a - b) / a`
    #[must_use]
    pub fn flattening(&self) -> f64 {
        (self.semi_major - self.semi_minor) / self.semi_major
    }

    /// First eccentricity squared, `e² = 1 - b²/a²`.
    #[must_use]
    pub fn eccentricity_squared(&self) -> f64 {
        let ratio = self.semi_minor / self.semi_major;
        1.0 - ratio * ratio
    }

    /// Second eccentricity squared, `e'² = a²/b² - 1`.
    #[must_use]
    pub fn second_eccentricity_squared(&self) -> f64 {
        let ratio = self.semi_major / self.semi_minor;
        ratio * ratio - 1.0
    }

    #[must_use]
    pub fn is_sphere(&self) -> bool {
        self.semi_major == self.semi_minor
    }
}

impl Default for Ellipsoid {
    fn default() -> Self {
        Self::WGS84
    }
}
