//! Trainer configuration
//!
//! Stored as JSON. Missing fields take their defaults, so a config file only
//! needs the values it changes.

use std::fs;
use std::io;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::consts::DEFAULT_GAME_DURATION;
use crate::nn::MutationSettings;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config i/o: {0}")]
    Io(#[from] io::Error),
    #[error("config parse: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Training run parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrainerConfig {
    /// Population size
    pub num_controllers: usize,
    /// Round-robin rounds played per generation
    pub num_game_seasons: usize,
    /// Match length (seconds)
    pub game_duration: f32,
    /// Fraction of the ranked population carried into the next generation
    pub percent_to_keep: f32,
    /// Save stride in generations; the final generation is always saved
    pub save_every_n_generations: u32,
    /// Total generations to run
    pub num_generations: u32,
    /// Save path template, see [`crate::persistence::expand_path_template`].
    /// Nothing is written when unset.
    pub save_file: Option<String>,
    /// RNG seed. Seeded from the system clock when unset.
    pub seed: Option<u64>,
    /// Mutation rates given to freshly created networks
    pub mutation: MutationSettings,
}

impl Default for TrainerConfig {
    fn default() -> Self {
        Self {
            num_controllers: 16,
            num_game_seasons: 1,
            game_duration: DEFAULT_GAME_DURATION,
            percent_to_keep: 0.2,
            save_every_n_generations: 100,
            num_generations: 10,
            save_file: None,
            seed: None,
            mutation: MutationSettings::default(),
        }
    }
}

impl TrainerConfig {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let json = fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&json)?;
        config.validate()?;
        log::info!("Loaded trainer config from {}", path.display());
        Ok(config)
    }

    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)?;
        log::info!("Trainer config saved to {}", path.display());
        Ok(())
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let invalid = |msg: String| Err(ConfigError::Invalid(msg));

        if self.num_controllers < 2 {
            return invalid(format!(
                "num_controllers must be at least 2, got {}",
                self.num_controllers
            ));
        }
        if self.num_game_seasons < 1 {
            return invalid("num_game_seasons must be at least 1".to_string());
        }
        if self.game_duration.is_nan() || self.game_duration <= 0.0 {
            return invalid(format!(
                "game_duration must be positive, got {}",
                self.game_duration
            ));
        }
        if !(self.percent_to_keep > 0.0 && self.percent_to_keep <= 1.0) {
            return invalid(format!(
                "percent_to_keep must be in (0, 1], got {}",
                self.percent_to_keep
            ));
        }
        if self.save_every_n_generations < 1 {
            return invalid("save_every_n_generations must be at least 1".to_string());
        }
        if self.num_generations < 1 {
            return invalid("num_generations must be at least 1".to_string());
        }
        Ok(())
    }

    /// Controllers carried over each generation, never fewer than one
    pub fn num_to_keep(&self) -> usize {
        ((self.num_controllers as f32 * self.percent_to_keep).floor() as usize)
            .clamp(1, self.num_controllers)
    }

    /// Games in one generation
    pub fn games_per_generation(&self) -> usize {
        self.num_controllers * self.num_game_seasons
    }
}
