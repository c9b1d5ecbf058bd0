//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Fixed timestep only
//! - Stable processing order (player 0 before player 1)
//! - No rendering, input, or platform dependencies

pub mod ball;
pub mod collision;
pub mod player;
pub mod shape;
pub mod state;
pub mod tick;

pub use ball::{FieldCollisionStyle, NeuronBall};
pub use collision::{CollisionResponse, collide};
pub use player::NeuronPlayer;
pub use shape::{Shape, ShapeKind};
pub use state::{GamePhase, NeuronGame};
pub use tick::{PlayerInput, apply_input, check_for_goal, process_collisions, tick, update_ball};
