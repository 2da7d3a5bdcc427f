use serde::Serialize;

use crate::{Interval, Vec3};

/// Axis-aligned bounding box of mesh geometry.
///
/// Unlike a box used for ray acceleration, zero-width axes are kept as-is:
/// flat X-Plane panels are common and their bounds should stay exact.
#[derive(Debug, Copy, Clone, PartialEq, Serialize)]
pub struct Aabb {
    pub x: Interval,
    pub y: Interval,
    pub z: Interval,
}

impl Aabb {
    /// Create an empty AABB (contains nothing).
    pub fn empty() -> Self {
        Self::EMPTY
    }

    /// Bounds of a point cloud. Empty input gives an empty box.
    pub fn from_positions(positions: &[Vec3]) -> Self {
        positions
            .iter()
            .fold(Self::EMPTY, |aabb, &p| aabb.include_point(p))
    }

    /// Grow the box so it contains `p`.
    pub fn include_point(&self, p: Vec3) -> Aabb {
        Self {
            x: self.x.include(p.x),
            y: self.y.include(p.y),
            z: self.z.include(p.z),
        }
    }

    /// Create an AABB that surrounds two other AABBs.
    pub fn surrounding(box0: &Aabb, box1: &Aabb) -> Self {
        Self {
            x: Interval::surrounding(&box0.x, &box1.x),
            y: Interval::surrounding(&box0.y, &box1.y),
            z: Interval::surrounding(&box0.z, &box1.z),
        }
    }

    /// Translate (move) the AABB by an offset vector.
    pub fn translate(&self, offset: Vec3) -> Aabb {
        Self {
            x: self.x.add_scalar(offset.x),
            y: self.y.add_scalar(offset.y),
            z: self.z.add_scalar(offset.z),
        }
    }

    /// True if no point has been included yet.
    pub fn is_empty(&self) -> bool {
        self.x.is_empty() || self.y.is_empty() || self.z.is_empty()
    }

    pub fn min(&self) -> Vec3 {
        Vec3::new(self.x.min, self.y.min, self.z.min)
    }

    pub fn max(&self) -> Vec3 {
        Vec3::new(self.x.max, self.y.max, self.z.max)
    }

    pub const EMPTY: Aabb = Aabb {
        x: Interval::EMPTY,
        y: Interval::EMPTY,
        z: Interval::EMPTY,
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_aabb_from_positions() {
        let aabb = Aabb::from_positions(&[
            Vec3::new(-1.0, 2.0, 0.0),
            Vec3::new(3.0, -2.0, 0.0),
        ]);

        assert_eq!(aabb.min(), Vec3::new(-1.0, -2.0, 0.0));
        assert_eq!(aabb.max(), Vec3::new(3.0, 2.0, 0.0));
        // Flat in Z, and not padded
        assert_eq!(aabb.z.size(), 0.0);
    }

    #[test]
    fn test_aabb_empty() {
        assert!(Aabb::from_positions(&[]).is_empty());
        assert!(!Aabb::from_positions(&[Vec3::ZERO, Vec3::ONE]).is_empty());
    }

    #[test]
    fn test_aabb_surrounding() {
        let box1 = Aabb::from_positions(&[Vec3::ZERO, Vec3::new(5.0, 5.0, 5.0)]);
        let box2 = Aabb::from_positions(&[Vec3::new(3.0, 3.0, 3.0), Vec3::new(10.0, 10.0, 10.0)]);
        let surrounding = Aabb::surrounding(&box1, &box2);

        assert_eq!(surrounding.x.min, 0.0);
        assert_eq!(surrounding.x.max, 10.0);
    }

    #[test]
    fn test_aabb_translate() {
        let aabb = Aabb::from_positions(&[Vec3::ZERO, Vec3::new(1.0, 1.0, 1.0)]);
        let translated = aabb.translate(Vec3::new(5.0, 0.0, 0.0));

        assert_eq!(translated.x.min, 5.0);
        assert_eq!(translated.x.max, 6.0);
        assert_eq!(translated.min(), Vec3::new(5.0, 0.0, 0.0));
    }
}
