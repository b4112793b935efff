//! Geographic positions and altitude reference levels.

use std::fmt;
use std::str::FromStr;

use crate::ProjectionError;

/// The datum an altitude is measured from.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
pub enum ReferenceLevel {
    /// Height along the ellipsoid normal above the ellipsoid surface.
    #[default]
    Ellipsoid,
    /// Height above the terrain surface.
    Terrain,
    /// Distance from the model origin (the ellipsoid center).
    Origin,
}

impl ReferenceLevel {
    /// All reference levels in canonical order.
    pub const ALL: [ReferenceLevel; 3] = [
        ReferenceLevel::Ellipsoid,
        ReferenceLevel::Terrain,
        ReferenceLevel::Origin,
    ];

    /// Lowercase name used by `Display` and `FromStr`.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            ReferenceLevel::Ellipsoid => "ellipsoid",
            ReferenceLevel::Terrain => "terrain",
            ReferenceLevel::Origin => "origin",
        }
    }
}

impl fmt::Display for ReferenceLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ReferenceLevel {
    type Err = ProjectionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ReferenceLevel::ALL
            .into_iter()
            .find(|level| level.name().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| ProjectionError::UnsupportedReferenceLevel(s.to_string()))
    }
}

/// A latitude/longitude/altitude triple with its altitude datum.
///
/// Latitude and longitude are in degrees. They are not validated here;
/// see [`GeographicPosition::is_valid_lat_lon`].
///
/// Positions tagged [`ReferenceLevel::Terrain`] cannot be projected to model
/// space without an external terrain source; the ellipsoid projection
/// rejects them.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GeographicPosition {
    /// Geodetic latitude in degrees, valid range \[-90, 90\].
    pub lat_deg: f64,
    /// Longitude in degrees, valid range \[-180, 180\].
    pub lon_deg: f64,
    /// Altitude in meters, relative to `reference_level`.
    pub altitude: f64,
    /// What `altitude` is measured from.
    pub reference_level: ReferenceLevel,
}

impl GeographicPosition {
    #[must_use]
    pub fn new(lat_deg: f64, lon_deg: f64, altitude: f64, reference_level: ReferenceLevel) -> Self {
        Self {
            lat_deg,
            lon_deg,
            altitude,
            reference_level,
        }
    }

    /// A point on the ellipsoid surface (altitude 0, [`ReferenceLevel::Ellipsoid`]).
    #[must_use]
    pub fn surface(lat_deg: f64, lon_deg: f64) -> Self {
        Self::new(lat_deg, lon_deg, 0.0, ReferenceLevel::Ellipsoid)
    }

    /// True if latitude is in \[-90, 90\] and longitude in \[-180, 180\].
    /// NaN never passes.
    #[must_use]
    pub fn is_valid_lat_lon(&self) -> bool {
        (-90.0..=90.0).contains(&self.lat_deg) && (-180.0..=180.0).contains(&self.lon_deg)
    }
}

impl fmt::Display for GeographicPosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "({:.6}°, {:.6}°, {:.3} m {})",
            self.lat_deg, self.lon_deg, self.altitude, self.reference_level
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reference_level_parse_roundtrip() {
        for level in ReferenceLevel::ALL {
            let parsed: ReferenceLevel = level.to_string().parse().unwrap();
            assert_eq!(parsed, level);
        }
    }

    #[test]
    fn test_reference_level_parse_is_case_insensitive() {
        assert_eq!(
            "ELLIPSOID".parse::<ReferenceLevel>().unwrap(),
            ReferenceLevel::Ellipsoid
        );
        assert_eq!(
            " Origin ".parse::<ReferenceLevel>().unwrap(),
            ReferenceLevel::Origin
        );
    }

    #[test]
    fn test_unknown_reference_level_is_rejected() {
        let err = "sea_floor".parse::<ReferenceLevel>().unwrap_err();
        assert_eq!(
            err,
            ProjectionError::UnsupportedReferenceLevel("sea_floor".to_string())
        );
    }

    #[test]
    fn test_lat_lon_validation() {
        assert!(GeographicPosition::surface(90.0, 180.0).is_valid_lat_lon());
        assert!(GeographicPosition::surface(-90.0, -180.0).is_valid_lat_lon());
        assert!(!GeographicPosition::surface(90.5, 0.0).is_valid_lat_lon());
        assert!(!GeographicPosition::surface(0.0, -180.1).is_valid_lat_lon());
        assert!(!GeographicPosition::surface(f64::NAN, 0.0).is_valid_lat_lon());
    }

    #[test]
    fn test_surface_defaults() {
        let p = GeographicPosition::surface(12.0, 10.0);
        assert_eq!(p.altitude, 0.0);
        assert_eq!(p.reference_level, ReferenceLevel::Ellipsoid);
    }

    #[test]
    fn test_terrain_position_needs_terrain_source() {
        let p = GeographicPosition::new(12.0, 10.0, 250.0, ReferenceLevel::Terrain);
        assert!(p.is_valid_lat_lon());
        let err = crate::EllipsoidProjection::wgs84().to_model(&p).unwrap_err();
        assert_eq!(err, ProjectionError::UnsupportedReferenceLevel("terrain".to_string()));
    }
}
