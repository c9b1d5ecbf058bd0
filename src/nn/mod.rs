//! Feed-forward neural networks evolved by mutation and crossover

pub mod network;

pub use network::{Activation, MutationSettings, Network, NetworkLevel, Neuron};
