//! Player body: an oriented rectangle with a boost reserve

use glam::Vec2;

use super::shape::Shape;
use crate::consts::*;

#[derive(Debug, Clone, PartialEq)]
pub struct NeuronPlayer {
    pub shape: Shape,
    /// Available boost fraction. Exposed to controllers, not consumed yet.
    pub boost: f32,
}

impl Default for NeuronPlayer {
    fn default() -> Self {
        Self::new(Vec2::ZERO, 0.0)
    }
}

impl NeuronPlayer {
    pub fn new(pos: Vec2, facing: f32) -> Self {
        Self {
            shape: Shape::rectangle(PLAYER_HALF_LENGTH, PLAYER_HALF_WIDTH, PLAYER_DENSITY)
                .at(pos)
                .facing(facing),
            boost: 0.0,
        }
    }

    #[inline]
    pub fn pos(&self) -> Vec2 {
        self.shape.pos
    }

    #[inline]
    pub fn velocity(&self) -> Vec2 {
        self.shape.velocity
    }

    /// Facing in radians
    #[inline]
    pub fn facing(&self) -> f32 {
        self.shape.facing
    }

    #[inline]
    pub fn forward(&self) -> Vec2 {
        self.shape.forward()
    }

    /// Corner points in world space, counter-clockwise
    pub fn corner_points(&self) -> [Vec2; 4] {
        super::shape::rect_corners(
            self.shape.pos,
            self.forward(),
            PLAYER_HALF_LENGTH,
            PLAYER_HALF_WIDTH,
        )
    }

    /// Radius of the circle enclosing the player body
    pub fn bounding_radius() -> f32 {
        (PLAYER_HALF_WIDTH * PLAYER_HALF_WIDTH + PLAYER_HALF_LENGTH * PLAYER_HALF_LENGTH).sqrt()
    }

    /// Push the player back inside `[0, length] x [0, width]`.
    ///
    /// Each axis is corrected by the corner that is furthest out. Returns true
    /// if the player moved.
    pub fn collide_with_field(&mut self, field_length: f32, field_width: f32) -> bool {
        let mut push = Vec2::ZERO;
        for corner in self.corner_points() {
            if corner.x < 0.0 {
                push.x = push.x.max(-corner.x);
            }
            if corner.x > field_length {
                push.x = push.x.min(field_length - corner.x);
            }
            if corner.y < 0.0 {
                push.y = push.y.max(-corner.y);
            }
            if corner.y > field_width {
                push.y = push.y.min(field_width - corner.y);
            }
        }

        self.shape.pos += push;
        push != Vec2::ZERO
    }
}
