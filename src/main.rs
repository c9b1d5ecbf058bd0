//! Neurons entry point
//!
//! Headless front end: trains populations, replays saved controllers against
//! each other, and inspects save files. `RUST_LOG` sets the log level.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};

use neurons::PlayerController;
use neurons::TrainerConfig;
use neurons::persistence::load_population;
use neurons::sim::{GamePhase, NeuronGame};
use neurons::training::AiPlayerTrainer;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Evolve a population until the generation budget is spent
    Train {
        /// Trainer config (JSON). Defaults are used when omitted.
        #[arg(short, long)]
        config: Option<PathBuf>,
        /// Override the config's RNG seed
        #[arg(long)]
        seed: Option<u64>,
        /// Pick up from the newest save the run has written
        #[arg(long)]
        resume: bool,
    },
    /// Play one match between two controllers from a save file
    Play {
        save: PathBuf,
        /// Controller for player 0
        #[arg(default_value_t = 0)]
        first: usize,
        /// Controller for player 1
        #[arg(default_value_t = 1)]
        second: usize,
        /// Match length in seconds
        #[arg(long, default_value_t = neurons::consts::DEFAULT_GAME_DURATION)]
        duration: f32,
    },
    /// Summarise the controllers in a save file
    Inspect { save: PathBuf },
    /// Write a config file with every default filled in
    Config {
        #[arg(default_value = "trainer.json")]
        path: PathBuf,
    },
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    match args.command {
        Command::Train {
            config,
            seed,
            resume,
        } => train(config.as_deref(), seed, resume),
        Command::Play {
            save,
            first,
            second,
            duration,
        } => play(&save, first, second, duration),
        Command::Inspect { save } => inspect(&save),
        Command::Config { path } => TrainerConfig::default()
            .save(&path)
            .with_context(|| format!("writing {}", path.display())),
    }
}

fn train(config_path: Option<&Path>, seed: Option<u64>, resume: bool) -> Result<()> {
    let mut config = match config_path {
        Some(path) => TrainerConfig::load(path)
            .with_context(|| format!("loading config from {}", path.display()))?,
        None => TrainerConfig::default(),
    };
    if seed.is_some() {
        config.seed = seed;
    }

    let mut trainer = AiPlayerTrainer::new(config).context("creating trainer")?;
    if resume && trainer.resume_from_saves().is_none() {
        log::warn!("No usable save found, starting from a fresh population");
    }

    while !trainer.is_finished() {
        trainer.update();
    }

    let best = trainer.best_controller();
    println!(
        "Finished {} generations (seed {}). Best: {} points, bred {} times, levels {:?}",
        trainer.generation(),
        trainer.seed(),
        best.points(),
        best.generation,
        best.controller.network().neurons_per_level()
    );
    Ok(())
}

fn play(save: &Path, first: usize, second: usize, duration: f32) -> Result<()> {
    if duration.is_nan() || duration <= 0.0 {
        bail!("match duration must be positive, got {duration}");
    }
    let population =
        load_population(save).with_context(|| format!("reading {}", save.display()))?;
    let pick = |index: usize| {
        population.get(index).with_context(|| {
            format!("{} holds {} controllers, no index {index}", save.display(), population.len())
        })
    };
    let c0: &dyn PlayerController = &pick(first)?.controller;
    let c1: &dyn PlayerController = &pick(second)?.controller;

    let mut game = NeuronGame::with_duration(duration);
    game.begin();
    let mut ticks = 0u64;
    while game.phase() != GamePhase::GameOver {
        game.update([Some(c0), Some(c1)]);
        ticks += 1;
    }

    let [s0, s1] = game.scores();
    let result = match game.winner() {
        Some(0) => format!("controller {first} wins"),
        Some(_) => format!("controller {second} wins"),
        None => "tie".to_string(),
    };
    println!("{first} vs {second}: {s0}-{s1} after {ticks} ticks, {result}");
    Ok(())
}

fn inspect(save: &Path) -> Result<()> {
    let population =
        load_population(save).with_context(|| format!("reading {}", save.display()))?;

    println!("{}: {} controllers", save.display(), population.len());
    for (i, data) in population.iter().enumerate() {
        let record = &data.record;
        println!(
            "{i:>4}  gen {:>5}  {:>3}W {:>3}L {:>3}T  {:>4} pts  levels {:?}",
            data.generation,
            record.wins,
            record.losses,
            record.ties,
            data.points(),
            data.controller.network().neurons_per_level()
        );
    }
    Ok(())
}
