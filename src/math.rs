//! Vector helpers on top of `glam::Vec2`

use glam::Vec2;

/// Squared lengths below this are treated as zero when normalizing
pub const SAFE_NORMALIZE_EPSILON_SQ: f32 = 1.0e-12;

pub trait Vec2Ext {
    /// Normalize, returning the zero vector for near-zero input.
    ///
    /// The second value is always the true length of the input, even when the
    /// returned direction is zero.
    fn safe_normalized(self) -> (Vec2, f32);

    /// Rotate counter-clockwise around the origin by `angle` radians
    fn rotate_around_origin(self, angle: f32) -> Vec2;
}

impl Vec2Ext for Vec2 {
    #[inline]
    fn safe_normalized(self) -> (Vec2, f32) {
        let length_sq = self.length_squared();
        let length = length_sq.sqrt();
        if length_sq < SAFE_NORMALIZE_EPSILON_SQ {
            (Vec2::ZERO, length)
        } else {
            (self / length, length)
        }
    }

    #[inline]
    fn rotate_around_origin(self, angle: f32) -> Vec2 {
        let (sin, cos) = angle.sin_cos();
        Vec2::new(self.x * cos - self.y * sin, self.x * sin + self.y * cos)
    }
}

/// Unit vector pointing along `facing`
#[inline]
pub fn forward_from_facing(facing: f32) -> Vec2 {
    let (sin, cos) = facing.sin_cos();
    Vec2::new(cos, sin)
}
