//! Player controllers
//!
//! A controller turns a read-only view of the game into one player's actions
//! for the current tick. The neural-net controller samples the game into a
//! fixed 21-value vector, seen from its own side of the field, and feeds it
//! through its network.

use glam::Vec2;
use rand::Rng;

use crate::consts::NUM_PLAYERS;
use crate::nn::Network;
use crate::persistence::buffer::{BinaryReader, BinarySerialize, BinaryWriter, BufferError};
use crate::sim::{NeuronGame, PlayerInput};

pub trait PlayerController {
    fn input_from_game_state(&self, game: &NeuronGame, player_index: usize) -> PlayerInput;
}

/// Game state flattened for a network, from the point of view of one player.
///
/// Layout, per player in index order: position (2), velocity (2),
/// forward (2), boost (1). Then ball position (2) and velocity (2), both
/// scores, and time remaining. For player 1 every position is mirrored
/// through the field centre and every vector is negated, so both players see
/// themselves defending the x = 0 end.
#[derive(Debug, Clone, PartialEq)]
pub struct GameStateInputs {
    values: [f32; Self::COUNT],
}

impl GameStateInputs {
    pub const COUNT: usize = 21;

    pub fn sample(game: &NeuronGame, player_index: usize) -> Self {
        let mut writer = InputWriter {
            values: [0.0; Self::COUNT],
            next: 0,
            mirrored: player_index != 0,
            field_size: game.field_size(),
        };

        for p in 0..NUM_PLAYERS {
            let player = game.player(p);
            writer.position(player.pos());
            writer.vector(player.velocity());
            writer.vector(player.forward());
            writer.scalar(player.boost);
        }
        debug_assert_eq!(writer.next, 14);

        let ball = game.ball();
        writer.position(ball.pos());
        writer.vector(ball.velocity());

        for p in 0..NUM_PLAYERS {
            writer.scalar(game.score(p) as f32);
        }
        writer.scalar(game.time_remaining());
        debug_assert_eq!(writer.next, Self::COUNT);

        Self {
            values: writer.values,
        }
    }

    #[inline]
    pub fn as_slice(&self) -> &[f32] {
        &self.values
    }
}

struct InputWriter {
    values: [f32; GameStateInputs::COUNT],
    next: usize,
    mirrored: bool,
    field_size: Vec2,
}

impl InputWriter {
    fn scalar(&mut self, value: f32) {
        self.values[self.next] = value;
        self.next += 1;
    }

    fn pair(&mut self, v: Vec2) {
        self.scalar(v.x);
        self.scalar(v.y);
    }

    /// p' = 2c - p, where c is the field centre
    fn position(&mut self, pos: Vec2) {
        let pos = if self.mirrored { self.field_size - pos } else { pos };
        self.pair(pos);
    }

    fn vector(&mut self, v: Vec2) {
        let v = if self.mirrored { -v } else { v };
        self.pair(v);
    }
}

/// Network outputs: steering, speed, boost
pub const NUM_NETWORK_OUTPUTS: usize = 3;

/// Controller driven by a feed-forward network
#[derive(Debug, Clone, PartialEq)]
pub struct NeuralNetPlayerController {
    network: Network,
}

impl NeuralNetPlayerController {
    /// Topology of a freshly created controller network
    pub fn default_topology() -> [usize; 2] {
        [GameStateInputs::COUNT, NUM_NETWORK_OUTPUTS]
    }

    /// Random network mapping game state straight to actions
    pub fn new<R: Rng + ?Sized>(rng: &mut R) -> Self {
        let mut network = Network::new(&Self::default_topology());
        network.randomize(rng);
        Self { network }
    }

    /// Wrap an existing network.
    ///
    /// Panics if the network doesn't take the game-state inputs or doesn't
    /// produce three outputs.
    pub fn from_network(network: Network) -> Self {
        assert!(
            Self::fits(&network),
            "controller network must map {} inputs to {} outputs",
            GameStateInputs::COUNT,
            NUM_NETWORK_OUTPUTS
        );
        Self { network }
    }

    fn fits(network: &Network) -> bool {
        network.num_inputs() == GameStateInputs::COUNT
            && network.num_outputs() == NUM_NETWORK_OUTPUTS
            && network.num_levels() >= 2
    }

    #[inline]
    pub fn network(&self) -> &Network {
        &self.network
    }

    /// Child of two controllers; see [`Network::breed`]
    pub fn breed<R: Rng + ?Sized>(
        parent0: &NeuralNetPlayerController,
        parent1: &NeuralNetPlayerController,
        rng: &mut R,
    ) -> Self {
        Self {
            network: Network::breed(&parent0.network, &parent1.network, rng),
        }
    }

    pub fn randomize<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        self.network.randomize(rng);
    }
}

impl PlayerController for NeuralNetPlayerController {
    fn input_from_game_state(&self, game: &NeuronGame, player_index: usize) -> PlayerInput {
        let inputs = GameStateInputs::sample(game, player_index);
        let output = self.network.evaluate(inputs.as_slice());
        PlayerInput {
            steering: output[0],
            speed: output[1],
            boost: output[2],
        }
    }
}

impl BinarySerialize for NeuralNetPlayerController {
    fn serialize(&self, writer: &mut BinaryWriter) {
        self.network.serialize(writer);
    }

    fn deserialize(reader: &mut BinaryReader<'_>) -> Result<Self, BufferError> {
        let network = Network::deserialize(reader)?;
        if !Self::fits(&network) {
            return Err(BufferError::Malformed("controller network has the wrong input or output width"));
        }
        Ok(Self { network })
    }
}

/// Who currently owns keyboard and joystick input
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum InputFocus {
    #[default]
    Game,
    /// Captured by an overlay such as a debug menu
    Ui,
}

/// Source of raw human input (keyboard, joystick, ...)
pub trait InputProvider {
    fn steering(&self) -> f32;
    fn speed(&self) -> f32;
    fn boost(&self) -> f32;
}

/// Controller fed directly by an [`InputProvider`]
#[derive(Debug, Clone)]
pub struct HumanPlayerController<P> {
    provider: P,
    focus: InputFocus,
}

impl<P: InputProvider> HumanPlayerController<P> {
    pub fn new(provider: P) -> Self {
        Self {
            provider,
            focus: InputFocus::Game,
        }
    }

    pub fn set_focus(&mut self, focus: InputFocus) {
        self.focus = focus;
    }

    #[inline]
    pub fn focus(&self) -> InputFocus {
        self.focus
    }

    pub fn provider_mut(&mut self) -> &mut P {
        &mut self.provider
    }
}

impl<P: InputProvider> PlayerController for HumanPlayerController<P> {
    fn input_from_game_state(&self, _game: &NeuronGame, _player_index: usize) -> PlayerInput {
        match self.focus {
            InputFocus::Ui => PlayerInput::default(),
            InputFocus::Game => PlayerInput {
                steering: self.provider.steering(),
                speed: self.provider.speed(),
                boost: self.provider.boost(),
            },
        }
    }
}
