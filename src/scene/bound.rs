//! Axis-aligned bounds.

use glam::{DMat4, DVec3, Vec3};

/// Axis-aligned bounding box in double precision.
///
/// An empty bound has `min > max` on every axis, so extending it by any
/// point yields a degenerate box at that point.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bound {
    pub min: DVec3,
    pub max: DVec3,
}

impl Default for Bound {
    fn default() -> Self {
        Self::EMPTY
    }
}

impl Bound {
    pub const EMPTY: Self = Self {
        min: DVec3::splat(f64::INFINITY),
        max: DVec3::splat(f64::NEG_INFINITY),
    };

    /// The `[-1, 1]` cube hosts fall back to when nothing better is known.
    pub const UNIT: Self = Self {
        min: DVec3::splat(-1.0),
        max: DVec3::splat(1.0),
    };

    #[must_use]
    pub fn new(min: DVec3, max: DVec3) -> Self {
        Self { min, max }
    }

    /// Bound of a set of single precision points.
    pub fn from_points<'a>(points: impl IntoIterator<Item = &'a Vec3>) -> Self {
        points
            .into_iter()
            .fold(Self::EMPTY, |b, p| b.extended_by(p.as_dvec3()))
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.min.x > self.max.x || self.min.y > self.max.y || self.min.z > self.max.z
    }

    #[must_use]
    pub fn center(&self) -> DVec3 {
        (self.min + self.max) * 0.5
    }

    #[must_use]
    pub fn size(&self) -> DVec3 {
        if self.is_empty() {
            DVec3::ZERO
        } else {
            self.max - self.min
        }
    }

    #[must_use]
    pub fn extended_by(&self, point: DVec3) -> Self {
        Self {
            min: self.min.min(point),
            max: self.max.max(point),
        }
    }

    #[must_use]
    pub fn union(&self, other: &Bound) -> Bound {
        Bound {
            min: self.min.min(other.min),
            max: self.max.max(other.max),
        }
    }

    /// The eight corners, or nothing for an empty bound.
    #[must_use]
    pub fn corners(&self) -> Vec<DVec3> {
        if self.is_empty() {
            return Vec::new();
        }
        let (lo, hi) = (self.min, self.max);
        vec![
            DVec3::new(lo.x, lo.y, lo.z),
            DVec3::new(lo.x, lo.y, hi.z),
            DVec3::new(lo.x, hi.y, lo.z),
            DVec3::new(lo.x, hi.y, hi.z),
            DVec3::new(hi.x, lo.y, lo.z),
            DVec3::new(hi.x, lo.y, hi.z),
            DVec3::new(hi.x, hi.y, lo.z),
            DVec3::new(hi.x, hi.y, hi.z),
        ]
    }

    /// Transforms the bound by `matrix`, returning the axis-aligned box of
    /// the transformed corners. Empty bounds stay empty.
    #[must_use]
    pub fn transform(&self, matrix: &DMat4) -> Self {
        self.corners()
            .into_iter()
            .fold(Self::EMPTY, |b, corner| {
                b.extended_by(matrix.transform_point3(corner))
            })
    }
}
