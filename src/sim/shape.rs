//! Rigid-body shapes
//!
//! A shape is a closed set of variants (circle, oriented rectangle) sharing
//! the same kinematic state. Mass and inertia are derived from density and
//! geometry and are recomputed whenever the geometry changes.

use glam::Vec2;
use std::f32::consts::PI;

use crate::math::forward_from_facing;

/// Geometry of a shape
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ShapeKind {
    Circle {
        radius: f32,
    },
    /// A facing of 0 points down the x-axis, so length runs along local x
    /// and width along local y.
    Rectangle {
        half_length: f32,
        half_width: f32,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct Shape {
    /// m
    pub pos: Vec2,
    /// m/s
    pub velocity: Vec2,
    /// radians
    pub facing: f32,
    /// radians/s
    pub angular_velocity: f32,
    /// kg
    mass: f32,
    /// kg*m^2
    inertia: f32,
    density: f32,
    kind: ShapeKind,
}

impl Shape {
    pub fn circle(radius: f32, density: f32) -> Self {
        Self::with_kind(ShapeKind::Circle { radius }, density)
    }

    pub fn rectangle(half_length: f32, half_width: f32, density: f32) -> Self {
        Self::with_kind(
            ShapeKind::Rectangle {
                half_length,
                half_width,
            },
            density,
        )
    }

    fn with_kind(kind: ShapeKind, density: f32) -> Self {
        let mut shape = Self {
            pos: Vec2::ZERO,
            velocity: Vec2::ZERO,
            facing: 0.0,
            angular_velocity: 0.0,
            mass: 0.0,
            inertia: 0.0,
            density,
            kind,
        };
        shape.compute_mass_and_inertia(density);
        shape
    }

    /// Builder-style position setter
    pub fn at(mut self, pos: Vec2) -> Self {
        self.pos = pos;
        self
    }

    pub fn moving(mut self, velocity: Vec2) -> Self {
        self.velocity = velocity;
        self
    }

    pub fn facing(mut self, facing: f32) -> Self {
        self.facing = facing;
        self
    }

    #[inline]
    pub fn kind(&self) -> ShapeKind {
        self.kind
    }

    #[inline]
    pub fn mass(&self) -> f32 {
        self.mass
    }

    #[inline]
    pub fn inertia(&self) -> f32 {
        self.inertia
    }

    #[inline]
    pub fn density(&self) -> f32 {
        self.density
    }

    /// Replace the geometry and recompute mass and inertia
    pub fn set_kind(&mut self, kind: ShapeKind) {
        self.kind = kind;
        self.compute_mass_and_inertia(self.density);
    }

    /// Computes mass and inertia for the current geometry at `density`
    pub fn compute_mass_and_inertia(&mut self, density: f32) {
        self.density = density;
        // https://en.wikipedia.org/wiki/List_of_moments_of_inertia
        match self.kind {
            ShapeKind::Circle { radius } => {
                self.mass = density * PI * radius * radius;
                self.inertia = 0.5 * self.mass * radius * radius;
            }
            ShapeKind::Rectangle {
                half_length,
                half_width,
            } => {
                self.mass = density * half_length * half_width * 4.0;
                let length = 2.0 * half_length;
                let width = 2.0 * half_width;
                self.inertia = (1.0 / 12.0) * self.mass * (length * length + width * width);
            }
        }
    }

    #[inline]
    pub fn forward(&self) -> Vec2 {
        forward_from_facing(self.facing)
    }

    /// Linear velocity of the body at a world position: v + w x r
    pub fn velocity_at_world_pos(&self, world_pos: Vec2) -> Vec2 {
        self.velocity + (world_pos - self.pos).perp() * self.angular_velocity
    }

    /// 0.5 * m * v^2
    pub fn linear_kinetic_energy(&self) -> f32 {
        0.5 * self.mass * self.velocity.length_squared()
    }

    /// 0.5 * I * w^2
    pub fn rotational_kinetic_energy(&self) -> f32 {
        0.5 * self.inertia * self.angular_velocity * self.angular_velocity
    }

    pub fn total_kinetic_energy(&self) -> f32 {
        self.linear_kinetic_energy() + self.rotational_kinetic_energy()
    }

    /// Corner points of a rectangle in world space, counter-clockwise
    /// starting front-left. Circles have no corners.
    pub fn corner_points(&self) -> Option<[Vec2; 4]> {
        match self.kind {
            ShapeKind::Rectangle {
                half_length,
                half_width,
            } => Some(rect_corners(
                self.pos,
                self.forward(),
                half_length,
                half_width,
            )),
            ShapeKind::Circle { .. } => None,
        }
    }

    /// Radius of the smallest circle around `pos` containing the shape
    pub fn bounding_radius(&self) -> f32 {
        match self.kind {
            ShapeKind::Circle { radius } => radius,
            ShapeKind::Rectangle {
                half_length,
                half_width,
            } => (half_length * half_length + half_width * half_width).sqrt(),
        }
    }
}

/// Corners of an oriented rectangle centred on `center`
pub(crate) fn rect_corners(center: Vec2, forward: Vec2, half_length: f32, half_width: f32) -> [Vec2; 4] {
    let right = Vec2::new(forward.y, -forward.x);
    let half_length_vec = forward * half_length;
    let half_width_vec = right * half_width;
    [
        center + half_length_vec + half_width_vec,
        center + half_length_vec - half_width_vec,
        center - half_length_vec - half_width_vec,
        center - half_length_vec + half_width_vec,
    ]
}
