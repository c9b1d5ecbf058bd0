//! Fixed timestep simulation tick
//!
//! Advances a [`NeuronGame`] by one step. Order matters and is fixed: players
//! are always sampled and moved in index order, then the ball, then
//! collisions, then goals, then the clock.

use super::ball::FieldCollisionStyle;
use super::collision::collide;
use super::player::NeuronPlayer;
use super::state::{GamePhase, NeuronGame};
use crate::consts::*;
use crate::controller::PlayerController;
use crate::math::Vec2Ext;
use crate::wrap_facing;

/// Actions for one player for a single tick
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PlayerInput {
    /// -1 (left) to 1 (right)
    pub steering: f32,
    /// -1 (full reverse) to 1 (full forward)
    pub speed: f32,
    /// At or above [`BOOST_THRESHOLD`] requests boosted speed
    pub boost: f32,
}

impl PlayerInput {
    pub fn new(steering: f32, speed: f32, boost: f32) -> Self {
        Self {
            steering,
            speed,
            boost,
        }
    }
}

impl NeuronGame {
    /// Advance one tick with the given controllers. See [`tick`].
    pub fn update(&mut self, controllers: [Option<&dyn PlayerController>; NUM_PLAYERS]) {
        tick(self, controllers, SIM_DT);
    }
}

/// Advance the game by one fixed timestep.
///
/// Only runs while the game is `InProgress`; flips to `GameOver` when the
/// score or time limit is reached. Players without a controller coast.
pub fn tick(
    game: &mut NeuronGame,
    controllers: [Option<&dyn PlayerController>; NUM_PLAYERS],
    dt: f32,
) {
    if game.phase() != GamePhase::InProgress {
        return;
    }
    if game.is_game_over() {
        game.end();
        return;
    }

    for (i, controller) in controllers.iter().enumerate() {
        if let Some(controller) = controller {
            let input = controller.input_from_game_state(game, i);
            apply_input(&mut game.players[i], &input, dt);
        }
    }

    update_ball(game, dt);
    process_collisions(game);
    check_for_goal(game);

    game.set_time_remaining((game.time_remaining() - dt).max(0.0));
    if game.is_game_over() {
        game.end();
    }
}

#[inline]
fn dead_zone(value: f32, zone: f32) -> f32 {
    if value.abs() <= zone {
        0.0
    } else {
        value.clamp(-1.0, 1.0)
    }
}

/// Drive one player from its input: accelerate toward the target velocity,
/// move, then turn.
pub fn apply_input(player: &mut NeuronPlayer, input: &PlayerInput, dt: f32) {
    let throttle = dead_zone(input.speed, THROTTLE_DEAD_ZONE);
    let target_speed = if input.boost >= BOOST_THRESHOLD {
        MAX_BOOSTED_SPEED
    } else if throttle >= 0.0 {
        throttle * MAX_FORWARD_SPEED
    } else {
        throttle * MAX_REVERSE_SPEED
    };

    let old_forward = player.forward();
    let target_velocity = old_forward * target_speed;
    let delta_velocity = target_velocity - player.velocity();
    let max_delta = MAX_ACCELERATION * dt;
    let shape = &mut player.shape;
    if delta_velocity.length_squared() <= max_delta * max_delta {
        shape.velocity = target_velocity;
    } else {
        let (direction, _) = delta_velocity.safe_normalized();
        shape.velocity += direction * max_delta;
    }

    shape.pos += shape.velocity * dt;

    let moving_forward = old_forward.dot(shape.velocity) >= 0.0;

    // Turn authority ramps up with speed
    let steering = dead_zone(input.steering, TURNING_DEAD_ZONE);
    let speed_fraction = shape.velocity.length() / MAX_FORWARD_SPEED;
    let turn_scalar = (1.0 - (1.0 - speed_fraction) * (1.0 - speed_fraction)).clamp(0.0, 1.0);
    let direction = if moving_forward { 1.0 } else { -1.0 };
    let delta_angle = steering * MAX_TURN_RADIANS_PER_SECOND * dt * turn_scalar * direction;
    shape.facing = wrap_facing(shape.facing + delta_angle);
}

/// Move the ball, apply rolling friction, and bounce it off the field edges
pub fn update_ball(game: &mut NeuronGame, dt: f32) {
    let (length, width) = (game.field_length(), game.field_width());
    let ball = game.ball_mut();
    ball.integrate(dt);
    ball.collide_with_field(length, width, FieldCollisionStyle::PushAndBounce);
}

/// Resolve contacts in a fixed order: players against the field, ball against
/// each player, ball against the field, then player against player.
pub fn process_collisions(game: &mut NeuronGame) {
    let (length, width) = (game.field_length(), game.field_width());

    for player in game.players.iter_mut() {
        player.collide_with_field(length, width);
    }

    for player in game.players.iter_mut() {
        let ball = &mut game.ball.shape;
        let response = collide(ball, &player.shape);
        if response.collided {
            response.apply_response(ball, &mut player.shape);
        }
    }

    game.ball
        .collide_with_field(length, width, FieldCollisionStyle::PushOnly);

    let [p0, p1] = &mut game.players;
    let response = collide(&p0.shape, &p1.shape);
    if response.collided {
        response.apply_response(&mut p0.shape, &mut p1.shape);
    }
}

/// Award a goal when the whole ball is inside the goal mouth and touching an
/// end line. Returns the scoring player.
pub fn check_for_goal(game: &mut NeuronGame) -> Option<usize> {
    let ball = game.ball();
    let radius = ball.radius();
    let pos = ball.pos();
    let (low, high) = game.goal_band();

    if pos.y - radius < low || pos.y + radius > high {
        return None;
    }

    let scorer = if pos.x <= radius + GOAL_EPSILON {
        1
    } else if pos.x >= game.field_length() - (radius + GOAL_EPSILON) {
        0
    } else {
        return None;
    };

    game.score_for_player(scorer);
    Some(scorer)
}
