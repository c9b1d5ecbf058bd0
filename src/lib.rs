//! Neurons - 1v1 ball game with evolved neural-network players
//!
//! Core modules:
//! - `sim`: Deterministic simulation (shapes, collisions, game state, tick)
//! - `nn`: Feed-forward networks with structural mutation and crossover
//! - `controller`: Maps game state to player actions
//! - `training`: Season scheduling and generational evolution
//! - `persistence`: Binary population save files
//! - `settings`: Trainer configuration

pub mod controller;
pub mod math;
pub mod nn;
pub mod persistence;
pub mod settings;
pub mod sim;
pub mod training;

pub use controller::{NeuralNetPlayerController, PlayerController};
pub use math::Vec2Ext;
pub use settings::TrainerConfig;

/// Game configuration constants
pub mod consts {
    /// Fixed simulation timestep (60 Hz)
    pub const SIM_DT: f32 = 1.0 / 60.0;

    /// Number of players in a game
    pub const NUM_PLAYERS: usize = 2;

    /// Field dimensions. Length runs along x, width along y.
    pub const FIELD_LENGTH: f32 = 100.0;
    pub const FIELD_WIDTH: f32 = 80.0;
    /// Goal mouth as a fraction of field width
    pub const GOAL_WIDTH_FRACTION: f32 = 0.25;

    /// Default match length (seconds)
    pub const DEFAULT_GAME_DURATION: f32 = 60.0;
    /// First player to reach this score wins
    pub const SCORE_TO_WIN: u32 = 5;

    /// Player body (oriented rectangle)
    pub const PLAYER_WIDTH: f32 = 4.0;
    pub const PLAYER_LENGTH: f32 = PLAYER_WIDTH * 1.8;
    pub const PLAYER_HALF_WIDTH: f32 = PLAYER_WIDTH * 0.5;
    pub const PLAYER_HALF_LENGTH: f32 = PLAYER_LENGTH * 0.5;
    pub const PLAYER_DENSITY: f32 = 1.0;
    /// Kickoff offset from the centre line, as a fraction of field width
    pub const PLAYER_WIDTH_OFFSET_PERCENT: f32 = 0.04;

    /// Player driving model
    pub const MAX_FORWARD_SPEED: f32 = 30.0;
    pub const MAX_BOOSTED_SPEED: f32 = MAX_FORWARD_SPEED * 1.75;
    pub const MAX_REVERSE_SPEED: f32 = MAX_FORWARD_SPEED * 0.75;
    pub const MAX_ACCELERATION: f32 = 100.0;
    pub const MAX_TURN_RADIANS_PER_SECOND: f32 = super::deg_to_rad(270.0);
    pub const THROTTLE_DEAD_ZONE: f32 = 0.1;
    pub const TURNING_DEAD_ZONE: f32 = 0.1;
    /// Boost input at or above this value requests boosted speed
    pub const BOOST_THRESHOLD: f32 = 0.5;

    /// Ball defaults
    pub const BALL_RADIUS: f32 = 2.0;
    pub const BALL_DENSITY: f32 = 0.5;
    /// Roughly what fraction of velocity is lost per second while rolling
    pub const BALL_ROLLING_FRICTION: f32 = 0.2;

    /// Slack used by goal detection
    pub const GOAL_EPSILON: f32 = 1.0e-4;
}

/// Wrap a facing angle into (-π, π] using the IEEE remainder.
#[inline]
pub fn wrap_facing(angle: f32) -> f32 {
    use std::f32::consts::{PI, TAU};
    let wrapped = angle - TAU * (angle / TAU).round_ties_even();
    // Ties round to even, which can land exactly on -π
    if wrapped <= -PI { wrapped + TAU } else { wrapped }
}

#[inline]
pub const fn deg_to_rad(deg: f32) -> f32 {
    deg * (std::f32::consts::PI / 180.0)
}
