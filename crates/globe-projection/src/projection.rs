//! Geodetic ⇄ Cartesian transforms for a fixed ellipsoid.
//!
//! Forward: closed form using the prime-vertical radius of curvature `N`.
//! Inverse: Bowring fixed-point iteration on the geodetic latitude, which
//! contracts by roughly `e²` per step and converges in a handful of iterations.

use globe_math::ModelPosition;

use crate::{Ellipsoid, GeographicPosition, ProjectionError, ReferenceLevel};

const MAX_LATITUDE_ITERATIONS: usize = 16;
const LATITUDE_CONVERGENCE_RAD: f64 = 1e-15;

/// Converts between [`GeographicPosition`] and [`ModelPosition`] for one ellipsoid.
///
/// Holds only the ellipsoid parameters, so it is `Copy` and can be shared
/// across threads freely.
#[derive(Clone, Copy, Debug, PartialEq, Default)]
pub struct EllipsoidProjection {
    ellipsoid: Ellipsoid,
    e2: f64,
}

impl EllipsoidProjection {
    #[must_use]
    pub fn new(ellipsoid: Ellipsoid) -> Self {
        Self {
            ellipsoid,
            e2: ellipsoid.eccentricity_squared(),
        }
    }

    /// Projection onto the WGS84 ellipsoid.
    #[must_use]
    pub fn wgs84() -> Self {
        Self::new(Ellipsoid::WGS84)
    }

    #[must_use]
    pub fn ellipsoid(&self) -> &Ellipsoid {
        &self.ellipsoid
    }

    /// Geographic → model space.
    ///
    /// Exact poles are snapped onto the Z axis so the result does not depend
    /// on the (meaningless) longitude there.
    ///
    /// # Errors
    ///
    /// [`ProjectionError::UnsupportedReferenceLevel`] for
    /// [`ReferenceLevel::Terrain`]: an ellipsoid has no terrain surface.
    pub fn to_model(&self, position: &GeographicPosition) -> Result<ModelPosition, ProjectionError> {
        match position.reference_level {
            ReferenceLevel::Ellipsoid => Ok(self.geodetic_to_model(
                position.lat_deg,
                position.lon_deg,
                position.altitude,
            )),
            ReferenceLevel::Origin => {
                let surface = self.surface_point(position.lat_deg, position.lon_deg);
                Ok(surface * (position.altitude / surface.length()))
            }
            ReferenceLevel::Terrain => Err(unsupported(ReferenceLevel::Terrain)),
        }
    }

    /// Model space → geographic, with altitude measured against `level`.
    ///
    /// On the polar axis the longitude is reported as 0.
    ///
    /// # Errors
    ///
    /// [`ProjectionError::UnsupportedReferenceLevel`] for
    /// [`ReferenceLevel::Terrain`].
    pub fn to_position(
        &self,
        model: ModelPosition,
        level: ReferenceLevel,
    ) -> Result<GeographicPosition, ProjectionError> {
        match level {
            ReferenceLevel::Ellipsoid => Ok(self.to_geodetic(model)),
            ReferenceLevel::Origin => {
                let distance = model.length();
                if distance == 0.0 {
                    return Ok(GeographicPosition::new(0.0, 0.0, 0.0, level));
                }
                let (lat, lon, _) = self.model_to_geodetic(self.project_to_surface(model));
                Ok(GeographicPosition::new(lat, lon, distance, level))
            }
            ReferenceLevel::Terrain => Err(unsupported(ReferenceLevel::Terrain)),
        }
    }

    /// Model space → geographic with ellipsoid-relative altitude.
    ///
    /// Same as `to_position(model, ReferenceLevel::Ellipsoid)`, which cannot fail.
    #[must_use]
    pub fn to_geodetic(&self, model: ModelPosition) -> GeographicPosition {
        let (lat, lon, height) = self.model_to_geodetic(model);
        GeographicPosition::new(lat, lon, height, ReferenceLevel::Ellipsoid)
    }

    /// Point on the ellipsoid surface at the given geodetic latitude/longitude.
    #[inline]
    #[must_use]
    pub fn surface_point(&self, lat_deg: f64, lon_deg: f64) -> ModelPosition {
        self.geodetic_to_model(lat_deg, lon_deg, 0.0)
    }

    /// Scale `model` along its ray from the origin onto the ellipsoid surface.
    ///
    /// The result stays in every plane through the origin that contains
    /// `model`, which keeps edge midpoints on their parent great-ellipse arc.
    /// The origin itself is returned unchanged.
    #[must_use]
    pub fn project_to_surface(&self, model: ModelPosition) -> ModelPosition {
        let a = self.ellipsoid.semi_major();
        let b = self.ellipsoid.semi_minor();
        let q = (model.x / a).powi(2) + (model.y / a).powi(2) + (model.z / b).powi(2);
        if q == 0.0 {
            return model;
        }
        model * q.sqrt().recip()
    }

    fn geodetic_to_model(&self, lat_deg: f64, lon_deg: f64, height: f64) -> ModelPosition {
        let a = self.ellipsoid.semi_major();
        let lat = lat_deg.to_radians();
        let lon = lon_deg.to_radians();

        let (sin_lat, mut cos_lat) = lat.sin_cos();
        if lat_deg.abs() == 90.0 {
            cos_lat = 0.0;
        }
        let (sin_lon, cos_lon) = lon.sin_cos();

        let n = a / (1.0 - self.e2 * sin_lat * sin_lat).sqrt();
        ModelPosition::new(
            (n + height) * cos_lat * cos_lon,
            (n + height) * cos_lat * sin_lon,
            (n * (1.0 - self.e2) + height) * sin_lat,
        )
    }

    /// Returns `(lat_deg, lon_deg, height_m)` above the ellipsoid.
    fn model_to_geodetic(&self, model: ModelPosition) -> (f64, f64, f64) {
        let a = self.ellipsoid.semi_major();
        let p = model.x.hypot(model.y);
        let lon = if p == 0.0 { 0.0 } else { model.y.atan2(model.x) };

        let mut lat = model.z.atan2(p * (1.0 - self.e2));
        for _ in 0..MAX_LATITUDE_ITERATIONS {
            let sin_lat = lat.sin();
            let n = a / (1.0 - self.e2 * sin_lat * sin_lat).sqrt();
            let next = (model.z + self.e2 * n * sin_lat).atan2(p);
            let delta = (next - lat).abs();
            lat = next;
            if delta < LATITUDE_CONVERGENCE_RAD {
                break;
            }
        }

        // h = p·cosφ + z·sinφ − a·√(1 − e² sin²φ) holds at every latitude,
        // including the poles where p / cosφ − N breaks down.
        let (sin_lat, cos_lat) = lat.sin_cos();
        let height =
            p * cos_lat + model.z * sin_lat - a * (1.0 - self.e2 * sin_lat * sin_lat).sqrt();

        (lat.to_degrees(), lon.to_degrees(), height)
    }
}

fn unsupported(level: ReferenceLevel) -> ProjectionError {
    ProjectionError::UnsupportedReferenceLevel(level.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    const DEG_TOL: f64 = 1e-5;
    const ALT_TOL: f64 = 1e-3;

    fn lon_diff(a: f64, b: f64) -> f64 {
        let d = (a - b).abs() % 360.0;
        d.min(360.0 - d)
    }

    fn assert_roundtrip(proj: &EllipsoidProjection, p: GeographicPosition) {
        let model = proj.to_model(&p).unwrap();
        let back = proj.to_position(model, p.reference_level).unwrap();
        assert!(
            (back.lat_deg - p.lat_deg).abs() < DEG_TOL,
            "lat mismatch for {p}: got {back}"
        );
        assert!(
            lon_diff(back.lon_deg, p.lon_deg) < DEG_TOL,
            "lon mismatch for {p}: got {back}"
        );
        assert!(
            (back.altitude - p.altitude).abs() < ALT_TOL,
            "altitude mismatch for {p}: got {back}"
        );
        assert_eq!(back.reference_level, p.reference_level);
    }

    #[test]
    fn test_equator_prime_meridian_is_semi_major_on_x() {
        let proj = EllipsoidProjection::wgs84();
        let m = proj.to_model(&GeographicPosition::surface(0.0, 0.0)).unwrap();
        assert_abs_diff_eq!(m.x, 6_378_137.0, epsilon = 1e-6);
        assert_abs_diff_eq!(m.y, 0.0, epsilon = 1e-6);
        assert_abs_diff_eq!(m.z, 0.0, epsilon = 1e-6);
    }

    #[test]
    fn test_north_pole_is_semi_minor_on_z() {
        let proj = EllipsoidProjection::wgs84();
        let m = proj.to_model(&GeographicPosition::surface(90.0, 37.0)).unwrap();
        assert_eq!(m.x, 0.0);
        assert_eq!(m.y, 0.0);
        assert_abs_diff_eq!(m.z, 6_356_752.314_245_179, epsilon = 1e-6);
    }

    #[test]
    fn test_known_ecef_value() {
        // 45°N 45°E at 1000 m on WGS84.
        let proj = EllipsoidProjection::wgs84();
        let p = GeographicPosition::new(45.0, 45.0, 1000.0, ReferenceLevel::Ellipsoid);
        let m = proj.to_model(&p).unwrap();
        assert_abs_diff_eq!(m.x, 3_194_919.145_060_8, epsilon = 1e-3);
        assert_abs_diff_eq!(m.y, 3_194_919.145_060_8, epsilon = 1e-3);
        assert_abs_diff_eq!(m.z, 4_488_055.515_647_6, epsilon = 1e-3);
    }

    #[test]
    fn test_roundtrip_ellipsoid_grid() {
        let proj = EllipsoidProjection::wgs84();
        for lat_step in -89..=89 {
            let lat = lat_step as f64;
            for lon_step in (-180..=180).step_by(15) {
                let lon = lon_step as f64 + 0.25;
                for alt in [-1000.0, 0.0, 123.456, 10_000.0] {
                    assert_roundtrip(
                        &proj,
                        GeographicPosition::new(lat, lon.min(180.0), alt, ReferenceLevel::Ellipsoid),
                    );
                }
            }
        }
    }

    #[test]
    fn test_roundtrip_extended_altitude_range() {
        let proj = EllipsoidProjection::wgs84();
        for lat in [-89.9, -60.0, -0.5, 0.0, 33.3, 75.0, 89.9] {
            for alt in [-50_000.0, 50_000.0] {
                assert_roundtrip(
                    &proj,
                    GeographicPosition::new(lat, -122.4, alt, ReferenceLevel::Ellipsoid),
                );
            }
        }
    }

    #[test]
    fn test_roundtrip_origin_reference() {
        let proj = EllipsoidProjection::wgs84();
        for lat in [-80.0, -12.0, 0.0, 12.0, 80.0] {
            for lon in [-179.0, -45.0, 0.0, 10.0, 179.0] {
                assert_roundtrip(
                    &proj,
                    GeographicPosition::new(lat, lon, 6_371_000.0, ReferenceLevel::Origin),
                );
            }
        }
    }

    #[test]
    fn test_roundtrip_sphere() {
        let proj = EllipsoidProjection::new(Ellipsoid::sphere(1_737_400.0).unwrap());
        for lat in [-89.0, -45.0, 0.0, 45.0, 89.0] {
            for lon in [-170.0, -1.0, 0.0, 95.0] {
                assert_roundtrip(
                    &proj,
                    GeographicPosition::new(lat, lon, 2_500.0, ReferenceLevel::Ellipsoid),
                );
            }
        }
    }

    #[test]
    fn test_origin_altitude_is_distance_from_center() {
        let proj = EllipsoidProjection::wgs84();
        let p = GeographicPosition::new(30.0, 60.0, 7_000_000.0, ReferenceLevel::Origin);
        let m = proj.to_model(&p).unwrap();
        assert_abs_diff_eq!(m.length(), 7_000_000.0, epsilon = 1e-6);
    }

    #[test]
    fn test_altitude_against_different_levels() {
        let proj = EllipsoidProjection::wgs84();
        let p = GeographicPosition::new(0.0, 0.0, 100.0, ReferenceLevel::Ellipsoid);
        let m = proj.to_model(&p).unwrap();
        let origin = proj.to_position(m, ReferenceLevel::Origin).unwrap();
        assert_abs_diff_eq!(origin.altitude, 6_378_237.0, epsilon = 1e-6);
        assert_abs_diff_eq!(origin.lat_deg, 0.0, epsilon = 1e-9);
    }

    #[test]
    fn test_terrain_level_is_unsupported() {
        let proj = EllipsoidProjection::wgs84();
        let p = GeographicPosition::new(0.0, 0.0, 5.0, ReferenceLevel::Terrain);
        assert_eq!(
            proj.to_model(&p),
            Err(ProjectionError::UnsupportedReferenceLevel("terrain".into()))
        );
        let m = proj.surface_point(0.0, 0.0);
        assert!(matches!(
            proj.to_position(m, ReferenceLevel::Terrain),
            Err(ProjectionError::UnsupportedReferenceLevel(_))
        ));
    }

    #[test]
    fn test_pole_inverse_reports_zero_longitude() {
        let proj = EllipsoidProjection::wgs84();
        let m = proj.surface_point(-90.0, 123.0);
        let back = proj.to_position(m, ReferenceLevel::Ellipsoid).unwrap();
        assert_abs_diff_eq!(back.lat_deg, -90.0, epsilon = 1e-12);
        assert_eq!(back.lon_deg, 0.0);
        assert_abs_diff_eq!(back.altitude, 0.0, epsilon = 1e-6);
    }

    #[test]
    fn test_project_to_surface_lands_on_ellipsoid() {
        let proj = EllipsoidProjection::wgs84();
        let a = proj.surface_point(10.0, 20.0);
        let b = proj.surface_point(11.0, 21.0);
        let mid = proj.project_to_surface(a.midpoint(b));
        let geo = proj.to_position(mid, ReferenceLevel::Ellipsoid).unwrap();
        assert_abs_diff_eq!(geo.altitude, 0.0, epsilon = 1e-6);
        // Stays in the plane of the chord.
        let normal = a.cross(b);
        assert!(normal.dot(mid).abs() / (normal.length() * mid.length()) < 1e-12);
    }

    #[test]
    fn test_project_to_surface_keeps_origin() {
        let proj = EllipsoidProjection::wgs84();
        assert_eq!(
            proj.project_to_surface(ModelPosition::ORIGIN),
            ModelPosition::ORIGIN
        );
    }
}
