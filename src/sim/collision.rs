//! Collision detection and response for circles and oriented rectangles
//!
//! Narrow phase only. Every pair of shape kinds is dispatched through a single
//! `match` in [`collide`]; the resulting [`CollisionResponse`] is expressed in
//! terms of a `shape0` and a `shape1`, where resolution pushes `shape1` out of
//! `shape0` and the normal points from `shape0` toward `shape1`.

use glam::Vec2;

use super::shape::{Shape, ShapeKind};
use crate::math::{Vec2Ext, forward_from_facing};

/// Result of a collision check
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CollisionResponse {
    /// Whether a collision occurred
    pub collided: bool,
    /// Displacement that moves shape1 out of shape0
    pub penetration_vector: Vec2,
    /// World-space contact point on shape0's surface
    pub collision_point: Vec2,
    /// Unit normal pointing from shape0 toward shape1
    pub collision_normal: Vec2,
    /// True when shape0 is the second argument passed to [`collide`]
    pub swapped: bool,
}

impl CollisionResponse {
    pub fn miss() -> Self {
        Self {
            collided: false,
            penetration_vector: Vec2::ZERO,
            collision_point: Vec2::ZERO,
            collision_normal: Vec2::ZERO,
            swapped: false,
        }
    }

    fn swap_roles(mut self) -> Self {
        self.swapped = !self.swapped;
        self
    }

    /// Resolve the collision between the pair that produced this response.
    ///
    /// `a` and `b` must be passed in the same order they were given to
    /// [`collide`]. Shape1 is first displaced by the penetration vector. Then,
    /// if the bodies are approaching along the collision normal, velocities
    /// are exchanged with the two-body elastic formula along the line between
    /// centres.
    pub fn apply_response(&self, a: &mut Shape, b: &mut Shape) {
        let (s0, s1) = if self.swapped { (b, a) } else { (a, b) };

        s1.pos += self.penetration_vector;

        if self.collision_normal.dot(s1.velocity - s0.velocity) >= 0.0 {
            return;
        }

        // https://en.wikipedia.org/wiki/Elastic_collision#Two-dimensional_collision_with_two_moving_objects
        let (x0, x1) = (s0.pos, s1.pos);
        let (v0, v1) = (s0.velocity, s1.velocity);
        let (m0, m1) = (s0.mass(), s1.mass());
        let dist_sq = (x0 - x1).length_squared();
        if dist_sq < crate::math::SAFE_NORMALIZE_EPSILON_SQ || m0 + m1 <= 0.0 {
            return;
        }

        let v0_out = v0 - (x0 - x1) * ((2.0 * m1) / (m0 + m1)) * ((v0 - v1).dot(x0 - x1) / dist_sq);
        let v1_out = v1 - (x1 - x0) * ((2.0 * m0) / (m0 + m1)) * ((v1 - v0).dot(x1 - x0) / dist_sq);

        s0.velocity = v0_out;
        s1.velocity = v1_out;
    }
}

impl Shape {
    /// Test this shape against `other`. See [`collide`].
    #[inline]
    pub fn collide(&self, other: &Shape) -> CollisionResponse {
        collide(self, other)
    }
}

/// Narrow-phase test between any two shapes.
///
/// Circle/rectangle pairs always treat the circle as shape0, so calling with a
/// rectangle first yields a response with `swapped` set.
pub fn collide(a: &Shape, b: &Shape) -> CollisionResponse {
    match (a.kind(), b.kind()) {
        (ShapeKind::Circle { radius: r0 }, ShapeKind::Circle { radius: r1 }) => {
            circle_circle(a.pos, r0, b.pos, r1)
        }
        (ShapeKind::Circle { radius }, ShapeKind::Rectangle { .. }) => {
            circle_rectangle(a.pos, radius, b)
        }
        (ShapeKind::Rectangle { .. }, ShapeKind::Circle { radius }) => {
            circle_rectangle(b.pos, radius, a).swap_roles()
        }
        (ShapeKind::Rectangle { .. }, ShapeKind::Rectangle { .. }) => rectangle_rectangle(a, b),
    }
}

fn circle_circle(pos0: Vec2, radius0: f32, pos1: Vec2, radius1: f32) -> CollisionResponse {
    let (to_other, dist) = (pos1 - pos0).safe_normalized();
    let penetration = (radius0 + radius1) - dist;
    if penetration <= 0.0 {
        return CollisionResponse::miss();
    }

    CollisionResponse {
        collided: true,
        penetration_vector: to_other * penetration,
        collision_point: pos0 + to_other * radius0,
        collision_normal: to_other,
        swapped: false,
    }
}

/// Circle (shape0) against an oriented rectangle (shape1).
///
/// Works in the rectangle's frame, folded into the positive quadrant. A
/// circle whose centre lies inside the rectangle is resolved against
/// whichever face region it falls in first (length before width), which can
/// pick the longer way out.
fn circle_rectangle(circle_pos: Vec2, radius: f32, rect: &Shape) -> CollisionResponse {
    let ShapeKind::Rectangle {
        half_length,
        half_width,
    } = rect.kind()
    else {
        return CollisionResponse::miss();
    };

    let rel_pos = (circle_pos - rect.pos).rotate_around_origin(-rect.facing);
    let abs_pos = rel_pos.abs();

    let mut abs_penetration = Vec2::ZERO;
    let point;
    let normal;
    if abs_pos.x < half_length {
        // Facing the top face
        let y_penetration = half_width - (abs_pos.y - radius);
        abs_penetration.y = -y_penetration.max(0.0);
        point = abs_pos - Vec2::new(0.0, radius);
        normal = Vec2::NEG_Y;
    } else if abs_pos.y < half_width {
        // Facing the end face
        let x_penetration = half_length - (abs_pos.x - radius);
        abs_penetration.x = -x_penetration.max(0.0);
        point = abs_pos - Vec2::new(radius, 0.0);
        normal = Vec2::NEG_X;
    } else {
        let to_corner = Vec2::new(half_length, half_width) - abs_pos;
        let (corner_normal, corner_dist) = to_corner.safe_normalized();
        let depth = radius - corner_dist;
        if depth > 0.0 {
            abs_penetration = corner_normal * depth;
        }
        point = abs_pos + corner_normal * radius;
        normal = corner_normal;
    }

    if abs_penetration == Vec2::ZERO {
        return CollisionResponse::miss();
    }

    let sign = Vec2::new(rel_pos.x.signum(), rel_pos.y.signum());
    CollisionResponse {
        collided: true,
        penetration_vector: (abs_penetration * sign).rotate_around_origin(rect.facing),
        collision_point: (point * sign).rotate_around_origin(rect.facing) + rect.pos,
        collision_normal: (normal * sign).rotate_around_origin(rect.facing),
        swapped: false,
    }
}

/// Minimum-penetration candidate found in one rectangle's frame
struct AxisCandidate {
    penetration: Vec2,
    normal: Vec2,
    point: Vec2,
}

impl AxisCandidate {
    fn depth_sq(&self) -> f32 {
        self.penetration.length_squared()
    }
}

/// Project `r1`'s corners into `r0`'s frame and find the shallowest exit.
///
/// Returns `None` as soon as either axis separates.
fn rectangle_pass(r0: &Shape, r1: &Shape) -> Option<AxisCandidate> {
    let (
        ShapeKind::Rectangle {
            half_length: hl0,
            half_width: hw0,
        },
        ShapeKind::Rectangle {
            half_length: hl1,
            half_width: hw1,
        },
    ) = (r0.kind(), r1.kind())
    else {
        return None;
    };

    let rel_pos = (r1.pos - r0.pos).rotate_around_origin(-r0.facing);
    let rel_forward = forward_from_facing(r1.facing - r0.facing);
    let corners = super::shape::rect_corners(rel_pos, rel_forward, hl1, hw1);

    let mut min = corners[0];
    let mut max = corners[0];
    let (mut min_x_corner, mut max_x_corner) = (corners[0], corners[0]);
    let (mut min_y_corner, mut max_y_corner) = (corners[0], corners[0]);
    for &c in &corners[1..] {
        if c.x < min.x {
            min.x = c.x;
            min_x_corner = c;
        }
        if c.x > max.x {
            max.x = c.x;
            max_x_corner = c;
        }
        if c.y < min.y {
            min.y = c.y;
            min_y_corner = c;
        }
        if c.y > max.y {
            max.y = c.y;
            max_y_corner = c;
        }
    }

    let extents = Vec2::new(hl0, hw0);
    let contact = |corner: Vec2| corner.clamp(-extents, extents);

    let mut best = AxisCandidate {
        penetration: Vec2::splat(f32::MAX),
        normal: Vec2::ZERO,
        point: Vec2::ZERO,
    };

    if min.x >= hl0 || max.x <= -hl0 {
        return None;
    }
    let p_min_x = hl0 - min.x;
    let p_max_x = -hl0 - max.x;
    let candidate = if p_min_x.abs() <= p_max_x.abs() {
        AxisCandidate {
            penetration: Vec2::new(p_min_x, 0.0),
            normal: Vec2::X,
            point: contact(min_x_corner),
        }
    } else {
        AxisCandidate {
            penetration: Vec2::new(p_max_x, 0.0),
            normal: Vec2::NEG_X,
            point: contact(max_x_corner),
        }
    };
    if candidate.depth_sq() < best.depth_sq() {
        best = candidate;
    }

    if min.y >= hw0 || max.y <= -hw0 {
        return None;
    }
    let p_min_y = hw0 - min.y;
    let p_max_y = -hw0 - max.y;
    let candidate = if p_min_y.abs() <= p_max_y.abs() {
        AxisCandidate {
            penetration: Vec2::new(0.0, p_min_y),
            normal: Vec2::Y,
            point: contact(min_y_corner),
        }
    } else {
        AxisCandidate {
            penetration: Vec2::new(0.0, p_max_y),
            normal: Vec2::NEG_Y,
            point: contact(max_y_corner),
        }
    };
    if candidate.depth_sq() < best.depth_sq() {
        best = candidate;
    }

    Some(best)
}

/// Two-pass separating-axis test between oriented rectangles.
///
/// The contact point is approximated by the deepest corner of shape1 clamped
/// to shape0's extents. Contact-dependent effects (friction, angular impulse)
/// are not modelled for this pair.
fn rectangle_rectangle(a: &Shape, b: &Shape) -> CollisionResponse {
    let Some(first) = rectangle_pass(a, b) else {
        return CollisionResponse::miss();
    };
    let Some(second) = rectangle_pass(b, a) else {
        return CollisionResponse::miss();
    };

    let (best, shape0, swapped) = if first.depth_sq() <= second.depth_sq() {
        (first, a, false)
    } else {
        (second, b, true)
    };

    CollisionResponse {
        collided: true,
        penetration_vector: best.penetration.rotate_around_origin(shape0.facing),
        collision_point: best.point.rotate_around_origin(shape0.facing) + shape0.pos,
        collision_normal: best.normal.rotate_around_origin(shape0.facing),
        swapped,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::f32::consts::{FRAC_PI_2, FRAC_PI_4, PI};

    fn approx(a: Vec2, b: Vec2) -> bool {
        (a - b).length() < 1e-4
    }

    #[test]
    fn test_circle_circle_hit() {
        let a = Shape::circle(1.0, 1.0).at(Vec2::new(0.0, 0.0));
        let b = Shape::circle(1.0, 1.0).at(Vec2::new(1.5, 0.0));
        let response = collide(&a, &b);
        assert!(response.collided);
        assert!(!response.swapped);
        assert!(approx(response.penetration_vector, Vec2::new(0.5, 0.0)));
        assert!(approx(response.collision_point, Vec2::new(1.0, 0.0)));
        assert!(approx(response.collision_normal, Vec2::X));
    }

    #[test]
    fn test_circle_circle_miss() {
        let a = Shape::circle(1.0, 1.0);
        let b = Shape::circle(1.0, 1.0).at(Vec2::new(2.5, 0.0));
        assert!(!collide(&a, &b).collided);
        // Exactly touching is not a collision
        let c = Shape::circle(1.0, 1.0).at(Vec2::new(2.0, 0.0));
        assert!(!collide(&a, &c).collided);
    }

    #[test]
    fn test_circle_rectangle_face() {
        let circle = Shape::circle(1.0, 1.0).at(Vec2::new(0.0, 2.5));
        let rect = Shape::rectangle(3.0, 2.0, 1.0);
        let response = collide(&circle, &rect);
        assert!(response.collided);
        // Rectangle is pushed down, away from the circle
        assert!(approx(response.penetration_vector, Vec2::new(0.0, -0.5)));
        assert!(approx(response.collision_normal, Vec2::NEG_Y));
        assert!(approx(response.collision_point, Vec2::new(0.0, 1.5)));
    }

    #[test]
    fn test_circle_rectangle_end_face_negative_side() {
        let circle = Shape::circle(1.0, 1.0).at(Vec2::new(-3.5, 0.5));
        let rect = Shape::rectangle(3.0, 2.0, 1.0);
        let response = collide(&circle, &rect);
        assert!(response.collided);
        assert!(approx(response.penetration_vector, Vec2::new(0.5, 0.0)));
        assert!(approx(response.collision_normal, Vec2::X));
    }

    #[test]
    fn test_circle_rectangle_corner() {
        let offset = Vec2::splat(0.5_f32.sqrt() * 0.5);
        let circle = Shape::circle(1.0, 1.0).at(Vec2::new(3.0, 2.0) + offset);
        let rect = Shape::rectangle(3.0, 2.0, 1.0);
        let response = collide(&circle, &rect);
        assert!(response.collided);
        let expected_normal = Vec2::new(-1.0, -1.0).normalize();
        assert!(approx(response.collision_normal, expected_normal));
        assert!((response.penetration_vector.length() - 0.5).abs() < 1e-4);
    }

    #[test]
    fn test_circle_rectangle_corner_miss() {
        let circle = Shape::circle(1.0, 1.0).at(Vec2::new(4.0, 3.0));
        let rect = Shape::rectangle(3.0, 2.0, 1.0);
        assert!(!collide(&circle, &rect).collided);
    }

    #[test]
    fn test_circle_rectangle_rotated() {
        // Rectangle turned a quarter: length now runs along world y
        let rect = Shape::rectangle(3.0, 2.0, 1.0).facing(FRAC_PI_2);
        let circle = Shape::circle(1.0, 1.0).at(Vec2::new(2.5, 0.0));
        let response = collide(&circle, &rect);
        assert!(response.collided);
        assert!(approx(response.penetration_vector, Vec2::new(-0.5, 0.0)));
        assert!(approx(response.collision_normal, Vec2::NEG_X));
    }

    #[test]
    fn test_rectangle_circle_is_swapped() {
        let circle = Shape::circle(1.0, 1.0).at(Vec2::new(0.0, 2.5));
        let rect = Shape::rectangle(3.0, 2.0, 1.0);
        let forward = collide(&circle, &rect);
        let reverse = collide(&rect, &circle);
        assert!(reverse.swapped);
        assert_eq!(forward.penetration_vector, reverse.penetration_vector);
        assert_eq!(forward.collision_normal, reverse.collision_normal);
    }

    #[test]
    fn test_circle_inside_rectangle_uses_face_region() {
        // Centre inside the box, nearer the end face than the top face.
        // The length check runs first, so the top face is used.
        let circle = Shape::circle(0.5, 1.0).at(Vec2::new(2.8, 0.2));
        let rect = Shape::rectangle(3.0, 2.0, 1.0);
        let response = collide(&circle, &rect);
        assert!(response.collided);
        assert_eq!(response.penetration_vector.x, 0.0);
        assert!(response.penetration_vector.y < 0.0);
    }

    #[test]
    fn test_rectangle_rectangle_overlap() {
        let a = Shape::rectangle(2.0, 1.0, 1.0);
        let b = Shape::rectangle(2.0, 1.0, 1.0).at(Vec2::new(3.5, 0.0));
        let response = collide(&a, &b);
        assert!(response.collided);
        // Shallowest exit is along x by 0.5
        assert!((response.penetration_vector.length() - 0.5).abs() < 1e-4);
        assert!(response.penetration_vector.x.abs() > 0.4);
        assert!(response.collision_normal.length() > 0.99);
    }

    #[test]
    fn test_rectangle_rectangle_separated() {
        let a = Shape::rectangle(2.0, 1.0, 1.0);
        let b = Shape::rectangle(2.0, 1.0, 1.0).at(Vec2::new(0.0, 2.5));
        assert!(!collide(&a, &b).collided);

        let c = Shape::rectangle(2.0, 1.0, 1.0)
            .at(Vec2::new(5.0, 0.0))
            .facing(FRAC_PI_4);
        assert!(!collide(&a, &c).collided);
    }

    #[test]
    fn test_rectangle_rectangle_resolution_separates() {
        let mut a = Shape::rectangle(2.0, 1.0, 1.0);
        let mut b = Shape::rectangle(2.0, 1.0, 1.0)
            .at(Vec2::new(3.0, 1.5))
            .facing(PI);
        let response = collide(&a, &b);
        assert!(response.collided);
        response.apply_response(&mut a, &mut b);
        let after = collide(&a, &b);
        // Left touching, allowing for rounding in the rotation
        assert!(!after.collided || after.penetration_vector.length() < 1e-4);
        assert!(response.penetration_vector.length() > 0.4);
    }

    #[test]
    fn test_head_on_elastic_collision() {
        let mut a = Shape::circle(1.0, 1.0)
            .at(Vec2::new(0.0, 0.0))
            .moving(Vec2::new(2.0, 0.0));
        let mut b = Shape::circle(2.0, 1.0)
            .at(Vec2::new(2.9, 0.0))
            .moving(Vec2::new(-1.0, 0.0));
        let (m0, m1) = (a.mass(), b.mass());
        let (u0, u1) = (2.0, -1.0);

        let response = collide(&a, &b);
        assert!(response.collided);
        response.apply_response(&mut a, &mut b);

        let expected0 = ((m0 - m1) * u0 + 2.0 * m1 * u1) / (m0 + m1);
        let expected1 = ((m1 - m0) * u1 + 2.0 * m0 * u0) / (m0 + m1);
        assert!((a.velocity.x - expected0).abs() < 1e-3);
        assert!((b.velocity.x - expected1).abs() < 1e-3);
    }

    #[test]
    fn test_separating_bodies_keep_velocity() {
        let mut a = Shape::circle(1.0, 1.0).moving(Vec2::new(-1.0, 0.0));
        let mut b = Shape::circle(1.0, 1.0)
            .at(Vec2::new(1.5, 0.0))
            .moving(Vec2::new(1.0, 0.0));
        let response = collide(&a, &b);
        response.apply_response(&mut a, &mut b);
        assert_eq!(a.velocity, Vec2::new(-1.0, 0.0));
        assert_eq!(b.velocity, Vec2::new(1.0, 0.0));
        // Positional correction still happens
        assert!((b.pos.x - 2.0).abs() < 1e-5);
    }

    #[test]
    fn test_apply_response_honours_swap() {
        let mut rect = Shape::rectangle(3.0, 2.0, 1.0);
        let mut circle = Shape::circle(1.0, 1.0).at(Vec2::new(0.0, 2.5));
        let response = collide(&rect, &circle);
        response.apply_response(&mut rect, &mut circle);
        // The rectangle is shape1 and gets pushed
        assert!((rect.pos.y + 0.5).abs() < 1e-5);
        assert_eq!(circle.pos, Vec2::new(0.0, 2.5));
    }

    proptest! {
        #[test]
        fn prop_circle_overlap_resolved(
            r0 in 0.1f32..5.0,
            r1 in 0.1f32..5.0,
            angle in -PI..PI,
            frac in 0.05f32..0.99,
            vx0 in -20.0f32..20.0,
            vy0 in -20.0f32..20.0,
            vx1 in -20.0f32..20.0,
            vy1 in -20.0f32..20.0,
        ) {
            let dist = (r0 + r1) * frac;
            let mut a = Shape::circle(r0, 1.0)
                .at(Vec2::new(10.0, 10.0))
                .moving(Vec2::new(vx0, vy0));
            let mut b = Shape::circle(r1, 1.0)
                .at(Vec2::new(10.0, 10.0) + forward_from_facing(angle) * dist)
                .moving(Vec2::new(vx1, vy1));

            let response = collide(&a, &b);
            prop_assert!(response.collided);
            response.apply_response(&mut a, &mut b);
            prop_assert!(a.pos.distance(b.pos) >= r0 + r1 - 1e-3);
        }

        #[test]
        fn prop_elastic_collision_conserves_momentum_and_energy(
            r0 in 0.5f32..3.0,
            r1 in 0.5f32..3.0,
            angle in -PI..PI,
            speed0 in 0.0f32..20.0,
            speed1 in 0.0f32..20.0,
            heading0 in -PI..PI,
            heading1 in -PI..PI,
        ) {
            let offset = forward_from_facing(angle) * ((r0 + r1) * 0.9);
            let mut a = Shape::circle(r0, 1.0).moving(forward_from_facing(heading0) * speed0);
            let mut b = Shape::circle(r1, 1.0)
                .at(offset)
                .moving(forward_from_facing(heading1) * speed1);

            let momentum_before = a.velocity * a.mass() + b.velocity * b.mass();
            let energy_before = a.linear_kinetic_energy() + b.linear_kinetic_energy();

            let response = collide(&a, &b);
            response.apply_response(&mut a, &mut b);

            let momentum_after = a.velocity * a.mass() + b.velocity * b.mass();
            let energy_after = a.linear_kinetic_energy() + b.linear_kinetic_energy();
            let scale = 1.0 + momentum_before.length();
            prop_assert!((momentum_after - momentum_before).length() / scale < 1e-3);
            prop_assert!((energy_after - energy_before).abs() / (1.0 + energy_before) < 1e-3);
        }
    }
}
