//! The ball: a circle with rolling friction

use glam::Vec2;

use super::shape::{Shape, ShapeKind};
use crate::consts::*;

/// How the ball reacts to the field boundary
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldCollisionStyle {
    /// Clamp position only
    PushOnly,
    /// Clamp position and flip the velocity component of any clamped axis
    PushAndBounce,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NeuronBall {
    pub shape: Shape,
}

impl Default for NeuronBall {
    fn default() -> Self {
        Self::new(Vec2::ZERO)
    }
}

impl NeuronBall {
    pub fn new(pos: Vec2) -> Self {
        Self {
            shape: Shape::circle(BALL_RADIUS, BALL_DENSITY).at(pos),
        }
    }

    /// Panics if `shape` has been given non-circular geometry.
    pub fn radius(&self) -> f32 {
        match self.shape.kind() {
            ShapeKind::Circle { radius } => radius,
            ShapeKind::Rectangle { .. } => unreachable!("ball shape must be a circle"),
        }
    }

    /// Fraction of velocity lost per second while rolling
    #[inline]
    pub fn rolling_friction(&self) -> f32 {
        BALL_ROLLING_FRICTION
    }

    #[inline]
    pub fn pos(&self) -> Vec2 {
        self.shape.pos
    }

    #[inline]
    pub fn velocity(&self) -> Vec2 {
        self.shape.velocity
    }

    /// Integrate position, then decay velocity by rolling friction
    pub fn integrate(&mut self, dt: f32) {
        self.shape.pos += self.shape.velocity * dt;
        self.shape.velocity *= 1.0 - self.rolling_friction() * dt;
    }

    /// Keep the ball inside `[r, length - r] x [r, width - r]`.
    ///
    /// Returns true if the position was clamped.
    pub fn collide_with_field(
        &mut self,
        field_length: f32,
        field_width: f32,
        style: FieldCollisionStyle,
    ) -> bool {
        let r = self.radius();
        let min = Vec2::splat(r);
        let max = Vec2::new(field_length - r, field_width - r);
        let old = self.shape.pos;
        self.shape.pos = old.clamp(min, max);

        if style == FieldCollisionStyle::PushAndBounce {
            if self.shape.pos.x != old.x {
                self.shape.velocity.x = -self.shape.velocity.x;
            }
            if self.shape.pos.y != old.y {
                self.shape.velocity.y = -self.shape.velocity.y;
            }
        }

        self.shape.pos != old
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_radius() {
        assert_eq!(NeuronBall::default().radius(), BALL_RADIUS);
    }

    #[test]
    #[should_panic(expected = "ball shape must be a circle")]
    fn test_rectangular_ball_panics() {
        let mut ball = NeuronBall::default();
        ball.shape.set_kind(ShapeKind::Rectangle {
            half_length: 1.0,
            half_width: 1.0,
        });
        ball.radius();
    }

    #[test]
    fn test_friction_decay() {
        let mut ball = NeuronBall::new(Vec2::new(50.0, 40.0));
        ball.shape.velocity = Vec2::new(60.0, 0.0);
        ball.integrate(SIM_DT);
        assert!((ball.pos().x - 51.0).abs() < 1e-4);
        let expected = 60.0 * (1.0 - BALL_ROLLING_FRICTION * SIM_DT);
        assert!((ball.velocity().x - expected).abs() < 1e-4);
    }

    #[test]
    fn test_bounce_flips_clamped_axis_only() {
        let mut ball = NeuronBall::new(Vec2::new(-1.0, 40.0));
        ball.shape.velocity = Vec2::new(-5.0, 3.0);
        assert!(ball.collide_with_field(
            FIELD_LENGTH,
            FIELD_WIDTH,
            FieldCollisionStyle::PushAndBounce
        ));
        assert_eq!(ball.pos(), Vec2::new(BALL_RADIUS, 40.0));
        assert_eq!(ball.velocity(), Vec2::new(5.0, 3.0));
    }

    #[test]
    fn test_push_only_keeps_velocity() {
        let mut ball = NeuronBall::new(Vec2::new(50.0, FIELD_WIDTH + 3.0));
        ball.shape.velocity = Vec2::new(1.0, 4.0);
        assert!(ball.collide_with_field(FIELD_LENGTH, FIELD_WIDTH, FieldCollisionStyle::PushOnly));
        assert_eq!(ball.pos().y, FIELD_WIDTH - BALL_RADIUS);
        assert_eq!(ball.velocity(), Vec2::new(1.0, 4.0));
    }
}
