use std::cmp::Ordering;
use std::fmt;
use std::ops::{Add, Div, Mul, Neg, Sub};

use glam::DVec3;

/// Cartesian position in model space, in meters from the ellipsoid center.
///
/// `+Z` points at the north pole, `+X` at (lat 0, lon 0) and `+Y` at
/// (lat 0, lon 90°E).
#[derive(Clone, Copy, Debug, PartialEq, Default)]
pub struct ModelPosition {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl ModelPosition {
    /// The model origin (ellipsoid center).
    pub const ORIGIN: ModelPosition = ModelPosition::new(0.0, 0.0, 0.0);

    /// Create a new position from its components.
    #[must_use]
    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    /// View this position as a `glam` vector.
    #[inline]
    #[must_use]
    pub fn as_dvec3(self) -> DVec3 {
        DVec3::new(self.x, self.y, self.z)
    }

    #[inline]
    #[must_use]
    pub fn dot(self, rhs: ModelPosition) -> f64 {
        self.as_dvec3().dot(rhs.as_dvec3())
    }

    #[inline]
    #[must_use]
    pub fn cross(self, rhs: ModelPosition) -> ModelPosition {
        self.as_dvec3().cross(rhs.as_dvec3()).into()
    }

    #[inline]
    #[must_use]
    pub fn length(self) -> f64 {
        self.as_dvec3().length()
    }

    /// Euclidean distance between two positions.
    #[inline]
    #[must_use]
    pub fn distance(self, rhs: ModelPosition) -> f64 {
        (self - rhs).length()
    }

    /// Arithmetic midpoint of the segment `self`–`rhs`.
    ///
    /// Symmetric: `a.midpoint(b)` and `b.midpoint(a)` are bit-identical.
    #[inline]
    #[must_use]
    pub fn midpoint(self, rhs: ModelPosition) -> ModelPosition {
        (self + rhs) * 0.5
    }

    /// Total lexicographic order on `(x, y, z)`.
    ///
    /// Used to pick a canonical orientation for an edge so that both
    /// triangles sharing it evaluate the same floating point expression.
    #[must_use]
    pub fn canonical_cmp(&self, other: &ModelPosition) -> Ordering {
        self.x
            .total_cmp(&other.x)
            .then(self.y.total_cmp(&other.y))
            .then(self.z.total_cmp(&other.z))
    }
}

impl From<DVec3> for ModelPosition {
    fn from(v: DVec3) -> Self {
        Self::new(v.x, v.y, v.z)
    }
}

impl From<ModelPosition> for DVec3 {
    fn from(p: ModelPosition) -> Self {
        p.as_dvec3()
    }
}

impl fmt::Display for ModelPosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({:.3}, {:.3}, {:.3})", self.x, self.y, self.z)
    }
}

impl Add for ModelPosition {
    type Output = Self;

    fn add(self, rhs: ModelPosition) -> Self::Output {
        Self::new(self.x + rhs.x, self.y + rhs.y, self.z + rhs.z)
    }
}

impl Sub for ModelPosition {
    type Output = Self;

    fn sub(self, rhs: ModelPosition) -> Self::Output {
        Self::new(self.x - rhs.x, self.y - rhs.y, self.z - rhs.z)
    }
}

impl Neg for ModelPosition {
    type Output = Self;

    fn neg(self) -> Self::Output {
        Self::new(-self.x, -self.y, -self.z)
    }
}

impl Mul<f64> for ModelPosition {
    type Output = Self;

    fn mul(self, rhs: f64) -> Self::Output {
        Self::new(self.x * rhs, self.y * rhs, self.z * rhs)
    }
}

impl Div<f64> for ModelPosition {
    type Output = Self;

    fn div(self, rhs: f64) -> Self::Output {
        Self::new(self.x / rhs, self.y / rhs, self.z / rhs)
    }
}
