//! Evolutionary training of neural-net controllers
//!
//! A generation is one [`GameSeason`] of round-robin matches. Results feed
//! each controller's [`WinLossRecord`]; the [`AiPlayerTrainer`] then keeps
//! the best and breeds replacements from them.

pub mod record;
pub mod season;
pub mod trainer;

pub use record::{AiControllerData, WinLossRecord};
pub use season::GameSeason;
pub use trainer::AiPlayerTrainer;
