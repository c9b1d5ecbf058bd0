//! Generational training loop
//!
//! One trainer owns the population, the season schedule, a single game and
//! the only random source used for breeding. Each [`AiPlayerTrainer::update`]
//! advances that game by one tick; finishing the last scheduled game of a
//! season ranks, saves and breeds the population.

use std::time::{SystemTime, UNIX_EPOCH};

use rand::Rng;
use rand::SeedableRng;
use rand::seq::SliceRandom;
use rand_pcg::Pcg32;

use super::record::AiControllerData;
use super::season::GameSeason;
use crate::controller::{NeuralNetPlayerController, PlayerController};
use crate::nn::Network;
use crate::persistence::{expand_path_template, find_latest_save, save_population};
use crate::settings::{ConfigError, TrainerConfig};
use crate::sim::{GamePhase, NeuronGame};

fn clock_seed() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos() as u64)
        .unwrap_or_default()
}

pub struct AiPlayerTrainer {
    config: TrainerConfig,
    seed: u64,
    rng: Pcg32,
    population: Vec<AiControllerData>,
    season: GameSeason,
    season_index: usize,
    generation: u32,
    game: NeuronGame,
}

impl AiPlayerTrainer {
    /// Build a fresh random population.
    pub fn new(config: TrainerConfig) -> Result<Self, ConfigError> {
        config.validate()?;

        let seed = config.seed.unwrap_or_else(clock_seed);
        let mut rng = Pcg32::seed_from_u64(seed);
        let population = (0..config.num_controllers)
            .map(|_| AiControllerData::new(Self::random_controller(&config, &mut rng), 0))
            .collect();
        let season = GameSeason::new(config.num_controllers, config.num_game_seasons);
        let game = NeuronGame::with_duration(config.game_duration);

        log::info!(
            "Trainer created: {} controllers, {} games per generation, {} generations, seed {seed}",
            config.num_controllers,
            season.len(),
            config.num_generations
        );

        Ok(Self {
            config,
            seed,
            rng,
            population,
            season,
            season_index: 0,
            generation: 0,
            game,
        })
    }

    fn random_controller(config: &TrainerConfig, rng: &mut Pcg32) -> NeuralNetPlayerController {
        let mut network = Network::new(&NeuralNetPlayerController::default_topology())
            .with_mutation_settings(config.mutation);
        network.randomize(rng);
        NeuralNetPlayerController::from_network(network)
    }

    /// Advance the current game by one tick. Does nothing once finished.
    pub fn update(&mut self) {
        if self.is_finished() {
            return;
        }
        let Some((i0, i1)) = self.season.pairing(self.season_index) else {
            self.advance_generation();
            return;
        };

        if self.game.phase() == GamePhase::PreGame {
            self.game.begin();
        }

        let c0: &dyn PlayerController = &self.population[i0].controller;
        let c1: &dyn PlayerController = &self.population[i1].controller;
        self.game.update([Some(c0), Some(c1)]);

        if self.game.phase() == GamePhase::GameOver {
            self.record_result(i0, i1);
            self.game.reset();
            self.season_index += 1;
            if self.season_index >= self.season.len() {
                self.advance_generation();
            }
        }
    }

    fn record_result(&mut self, i0: usize, i1: usize) {
        match self.game.winner() {
            Some(0) => {
                self.population[i0].record.wins += 1;
                self.population[i1].record.losses += 1;
            }
            Some(_) => {
                self.population[i1].record.wins += 1;
                self.population[i0].record.losses += 1;
            }
            None => {
                self.population[i0].record.ties += 1;
                self.population[i1].record.ties += 1;
            }
        }

        let [s0, s1] = self.game.scores();
        log::debug!(
            "Generation {} game {}/{}: controller {i0} vs {i1} ended {s0}-{s1}",
            self.generation,
            self.season_index + 1,
            self.season.len()
        );
    }

    /// Close out the current generation: rank, save when due, then breed
    /// the next one. Called by [`update`](Self::update) when the season's
    /// last game ends.
    ///
    /// After the final generation the population is left ranked, with its
    /// records intact, and the trainer reports finished.
    pub fn advance_generation(&mut self) {
        let is_final = self.generation + 1 >= self.config.num_generations;

        self.rank_population();
        self.log_generation_summary();

        if self.generation % self.config.save_every_n_generations == 0 || is_final {
            self.save_generation();
        }

        self.prepare_next_generation(is_final);
    }

    /// Stable sort: most points first, shallower networks first among equals
    fn rank_population(&mut self) {
        self.population.sort_by(|a, b| {
            b.points().cmp(&a.points()).then_with(|| {
                a.controller
                    .network()
                    .num_levels()
                    .cmp(&b.controller.network().num_levels())
            })
        });
    }

    fn log_generation_summary(&self) {
        let Some(best) = self.population.first() else {
            return;
        };
        let depth: usize = self
            .population
            .iter()
            .map(|d| d.controller.network().num_levels())
            .sum();
        log::info!(
            "Generation {} done: best {} points ({}W {}L {}T, bred {} times), average depth {:.2}",
            self.generation,
            best.points(),
            best.record.wins,
            best.record.losses,
            best.record.ties,
            best.generation,
            depth as f32 / self.population.len() as f32
        );
    }

    fn save_generation(&self) {
        let Some(template) = &self.config.save_file else {
            return;
        };
        let path = expand_path_template(template, self.population.len(), self.generation);
        if let Err(err) = save_population(&path, &self.population) {
            log::warn!("Failed to save generation {}: {err}", self.generation);
        }
    }

    fn prepare_next_generation(&mut self, is_final: bool) {
        if !is_final {
            self.replace_weakest();
            self.population.shuffle(&mut self.rng);
            for data in &mut self.population {
                data.record.reset();
            }
        }

        self.generation += 1;
        self.season_index = 0;
        self.game.reset();
    }

    /// Overwrite everything below the kept fraction with a mutated copy of a
    /// random survivor.
    fn replace_weakest(&mut self) {
        let keep = self.config.num_to_keep().min(self.population.len());
        for i in keep..self.population.len() {
            let parent = &self.population[self.rng.random_range(0..keep)];
            let child =
                NeuralNetPlayerController::breed(&parent.controller, &parent.controller, &mut self.rng);
            let generation = parent.generation + 1;
            self.population[i] = AiControllerData::new(child, generation);
        }
    }

    /// Continue from the newest readable save the configured run would have
    /// written. Returns the generation that was loaded.
    ///
    /// The loaded population is ranked and bred exactly as if that generation
    /// had just finished here. Leaves the trainer untouched when nothing
    /// usable is found.
    pub fn resume_from_saves(&mut self) -> Option<u32> {
        let template = self.config.save_file.as_deref()?;
        let (generation, population) = find_latest_save(
            template,
            self.config.num_controllers,
            self.config.num_generations,
            self.config.save_every_n_generations,
        )?;

        if population.len() != self.config.num_controllers {
            log::warn!(
                "Save for generation {generation} holds {} controllers, expected {}",
                population.len(),
                self.config.num_controllers
            );
            return None;
        }

        self.population = population;
        self.generation = generation;
        self.rank_population();
        self.prepare_next_generation(generation + 1 >= self.config.num_generations);

        log::info!("Resumed training after generation {generation}");
        Some(generation)
    }

    /// Restart the random source. Two trainers with the same config, reseeded
    /// alike at the same point, stay in lockstep.
    pub fn reseed(&mut self, seed: u64) {
        self.seed = seed;
        self.rng = Pcg32::seed_from_u64(seed);
    }

    #[inline]
    pub fn is_finished(&self) -> bool {
        self.generation >= self.config.num_generations
    }

    #[inline]
    pub fn generation(&self) -> u32 {
        self.generation
    }

    #[inline]
    pub fn seed(&self) -> u64 {
        self.seed
    }

    #[inline]
    pub fn config(&self) -> &TrainerConfig {
        &self.config
    }

    #[inline]
    pub fn game(&self) -> &NeuronGame {
        &self.game
    }

    pub fn population(&self) -> &[AiControllerData] {
        &self.population
    }

    /// Panics if `index` is out of range.
    pub fn controller(&self, index: usize) -> &AiControllerData {
        &self.population[index]
    }

    /// Highest scorer so far this generation; the earliest wins ties.
    pub fn best_controller(&self) -> &AiControllerData {
        self.population
            .iter()
            .reduce(|best, d| if d.points() > best.points() { d } else { best })
            .unwrap_or(&self.population[0])
    }

    /// Controllers in the game currently being played
    pub fn current_pairing(&self) -> Option<(usize, usize)> {
        self.season.pairing(self.season_index)
    }

    /// Games completed in the current generation
    #[inline]
    pub fn games_played(&self) -> usize {
        self.season_index
    }

    #[inline]
    pub fn games_per_generation(&self) -> usize {
        self.season.len()
    }
}
