//! X-Plane to scene axis conversion.
//!
//! X-Plane objects are Y-up with -Z pointing forward; the scene graph is
//! Z-up. Conversion happens once, when a line is parsed.

use glam::Vec3;

/// Convert a point, normal or translation: `(x, y, z) -> (x, -z, y)`.
pub fn xplane_point(x: f32, y: f32, z: f32) -> Vec3 {
    Vec3::new(x, -z, y)
}

/// Convert the axis of a single-line `ANIM_rotate`: `(x, y, z) -> (x, z, y)`.
///
/// The Y component is swapped but not negated. Keyframed rotations
/// (`ANIM_rotate_begin`) use [`xplane_point`] instead.
pub fn xplane_rotate_axis(x: f32, y: f32, z: f32) -> Vec3 {
    Vec3::new(x, z, y)
}
