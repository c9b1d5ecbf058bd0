//! Game state and match lifecycle
//!
//! Everything the per-tick pipeline in `tick.rs` reads and writes lives here.

use glam::Vec2;

use super::ball::NeuronBall;
use super::player::NeuronPlayer;
use crate::consts::*;

/// Lifecycle of a single match
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GamePhase {
    /// Waiting for controllers to be assigned
    #[default]
    PreGame,
    /// Active gameplay
    InProgress,
    /// Score or time limit reached
    GameOver,
}

/// A simple 1v1 soccer-like match.
///
/// One corner of the field is at (0, 0), the other at (length, width).
/// Player 0 defends the x = 0 end line, player 1 the x = length end line.
#[derive(Debug, Clone, PartialEq)]
pub struct NeuronGame {
    /// Along x
    field_length: f32,
    /// Along y
    field_width: f32,
    pub(crate) players: [NeuronPlayer; NUM_PLAYERS],
    pub(crate) ball: NeuronBall,
    scores: [u32; NUM_PLAYERS],
    time_remaining: f32,
    game_duration: f32,
    phase: GamePhase,
}

impl Default for NeuronGame {
    fn default() -> Self {
        Self::new()
    }
}

impl NeuronGame {
    pub fn new() -> Self {
        Self::with_duration(DEFAULT_GAME_DURATION)
    }

    /// Create a game whose clock starts at `game_duration` seconds
    pub fn with_duration(game_duration: f32) -> Self {
        let mut game = Self {
            field_length: FIELD_LENGTH,
            field_width: FIELD_WIDTH,
            players: [NeuronPlayer::default(), NeuronPlayer::default()],
            ball: NeuronBall::default(),
            scores: [0; NUM_PLAYERS],
            time_remaining: game_duration,
            game_duration,
            phase: GamePhase::PreGame,
        };
        game.reset_field();
        game
    }

    #[inline]
    pub fn field_length(&self) -> f32 {
        self.field_length
    }

    #[inline]
    pub fn field_width(&self) -> f32 {
        self.field_width
    }

    /// Both dimensions as (length, width)
    #[inline]
    pub fn field_size(&self) -> Vec2 {
        Vec2::new(self.field_length, self.field_width)
    }

    #[inline]
    pub fn goal_width(&self) -> f32 {
        self.field_width * GOAL_WIDTH_FRACTION
    }

    /// y-range of the goal mouth on both end lines
    pub fn goal_band(&self) -> (f32, f32) {
        let half_gap = (self.field_width - self.goal_width()) * 0.5;
        (half_gap, half_gap + self.goal_width())
    }

    #[inline]
    pub const fn num_players() -> usize {
        NUM_PLAYERS
    }

    /// Panics if `index >= NUM_PLAYERS`
    #[inline]
    pub fn player(&self, index: usize) -> &NeuronPlayer {
        &self.players[index]
    }

    #[inline]
    pub fn player_mut(&mut self, index: usize) -> &mut NeuronPlayer {
        &mut self.players[index]
    }

    #[inline]
    pub fn ball(&self) -> &NeuronBall {
        &self.ball
    }

    #[inline]
    pub fn ball_mut(&mut self) -> &mut NeuronBall {
        &mut self.ball
    }

    #[inline]
    pub fn score(&self, player_index: usize) -> u32 {
        self.scores[player_index]
    }

    #[inline]
    pub fn scores(&self) -> [u32; NUM_PLAYERS] {
        self.scores
    }

    #[inline]
    pub fn time_remaining(&self) -> f32 {
        self.time_remaining
    }

    pub(crate) fn set_time_remaining(&mut self, time: f32) {
        self.time_remaining = time;
    }

    #[inline]
    pub fn game_duration(&self) -> f32 {
        self.game_duration
    }

    #[inline]
    pub fn phase(&self) -> GamePhase {
        self.phase
    }

    /// Start play. Has no effect outside `PreGame`.
    pub fn begin(&mut self) {
        if self.phase == GamePhase::PreGame {
            self.phase = GamePhase::InProgress;
        }
    }

    pub(crate) fn end(&mut self) {
        self.phase = GamePhase::GameOver;
    }

    /// True once a player has reached the winning score or the clock has run out
    pub fn is_game_over(&self) -> bool {
        self.scores.iter().any(|&s| s >= SCORE_TO_WIN) || self.time_remaining <= 0.0
    }

    /// Index of the leading player, or `None` on a tie
    pub fn winner(&self) -> Option<usize> {
        match self.scores[0].cmp(&self.scores[1]) {
            std::cmp::Ordering::Greater => Some(0),
            std::cmp::Ordering::Less => Some(1),
            std::cmp::Ordering::Equal => None,
        }
    }

    /// Put players and ball back at kickoff. Scores and clock are untouched.
    pub fn reset_field(&mut self) {
        let (length, width) = (self.field_length, self.field_width);

        self.players[0] = NeuronPlayer::new(
            Vec2::new(length * 0.1, width * (0.5 - PLAYER_WIDTH_OFFSET_PERCENT)),
            0.0,
        );
        self.players[1] = NeuronPlayer::new(
            Vec2::new(length * 0.9, width * (0.5 + PLAYER_WIDTH_OFFSET_PERCENT)),
            std::f32::consts::PI,
        );
        self.ball = NeuronBall::new(Vec2::new(length * 0.5, width * 0.5));
    }

    /// Full reset for a fresh match: field, scores, clock, and phase
    pub fn reset(&mut self) {
        self.reset_field();
        self.scores = [0; NUM_PLAYERS];
        self.time_remaining = self.game_duration;
        self.phase = GamePhase::PreGame;
    }

    /// Award a goal and reset to kickoff
    pub fn score_for_player(&mut self, player_index: usize) {
        self.scores[player_index] += 1;
        self.reset_field();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kickoff_layout() {
        let game = NeuronGame::new();
        assert!((game.player(0).pos() - Vec2::new(10.0, 36.8)).length() < 1e-4);
        assert!((game.player(1).pos() - Vec2::new(90.0, 43.2)).length() < 1e-4);
        assert_eq!(game.ball().pos(), Vec2::new(50.0, 40.0));
        assert!((game.player(1).forward() - Vec2::NEG_X).length() < 1e-5);
        assert_eq!(game.phase(), GamePhase::PreGame);
        assert_eq!(game.time_remaining(), DEFAULT_GAME_DURATION);
    }

    #[test]
    fn test_goal_band() {
        let game = NeuronGame::new();
        assert_eq!(game.goal_width(), 20.0);
        assert_eq!(game.goal_band(), (30.0, 50.0));
    }

    #[test]
    fn test_game_over_conditions() {
        let mut game = NeuronGame::new();
        assert!(!game.is_game_over());
        for _ in 0..SCORE_TO_WIN {
            game.score_for_player(1);
        }
        assert!(game.is_game_over());
        assert_eq!(game.winner(), Some(1));

        let mut game = NeuronGame::with_duration(1.0);
        game.set_time_remaining(0.0);
        assert!(game.is_game_over());
        assert_eq!(game.winner(), None);
    }

    #[test]
    fn test_reset_restores_match() {
        let mut game = NeuronGame::with_duration(30.0);
        game.begin();
        game.score_for_player(0);
        game.set_time_remaining(3.0);
        game.end();
        game.reset();
        assert_eq!(game.scores(), [0, 0]);
        assert_eq!(game.time_remaining(), 30.0);
        assert_eq!(game.phase(), GamePhase::PreGame);
    }

    #[test]
    fn test_begin_only_from_pregame() {
        let mut game = NeuronGame::new();
        game.begin();
        assert_eq!(game.phase(), GamePhase::InProgress);
        game.end();
        game.begin();
        assert_eq!(game.phase(), GamePhase::GameOver);
    }
}
