//! Layered feed-forward network with structural mutation
//!
//! Level 0 holds the inputs and computes nothing; its neurons have no
//! weights. Every neuron in level `i > 0` has exactly one weight per neuron in
//! level `i - 1`. All mutation and breeding operations keep that invariant.

use bytemuck::{Pod, Zeroable};
use rand::Rng;
use rand_distr::StandardNormal;
use serde::{Deserialize, Serialize};

use crate::persistence::buffer::{BinaryReader, BinarySerialize, BinaryWriter, BufferError};

/// Per-network mutation probabilities.
///
/// Kept as a plain `repr(C)` block of floats so it serializes as a fixed-size
/// raw copy.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable, Serialize, Deserialize)]
#[serde(default)]
pub struct MutationSettings {
    /// Chance per network of inserting an identity level
    pub add_level: f32,
    /// Chance per interior level of adding a neuron
    pub add_neuron: f32,
    /// Chance per interior level of deleting a neuron
    pub delete_neuron: f32,
    /// Fraction of a neuron's weights re-rolled when it doesn't roll `modify_weights`
    pub modify_weight: f32,
    /// Chance per neuron of re-rolling all of its weights
    pub modify_weights: f32,
    /// Chance per neuron of re-rolling its bias
    pub modify_bias: f32,
}

impl Default for MutationSettings {
    fn default() -> Self {
        Self {
            add_level: 0.05,
            add_neuron: 0.1,
            delete_neuron: 0.1,
            modify_weight: 0.1,
            modify_weights: 0.01,
            modify_bias: 0.05,
        }
    }
}

impl MutationSettings {
    /// No mutation at all
    pub fn none() -> Self {
        Self::zeroed()
    }

    const NUM_FIELDS: usize = std::mem::size_of::<Self>() / std::mem::size_of::<f32>();
}

impl BinarySerialize for MutationSettings {
    fn serialize(&self, writer: &mut BinaryWriter) {
        let fields: [f32; MutationSettings::NUM_FIELDS] = bytemuck::cast(*self);
        for value in fields {
            writer.write_f32(value);
        }
    }

    fn deserialize(reader: &mut BinaryReader<'_>) -> Result<Self, BufferError> {
        let mut fields = [0.0f32; MutationSettings::NUM_FIELDS];
        for value in &mut fields {
            *value = reader.read_f32()?;
        }
        Ok(bytemuck::cast(fields))
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Activation {
    #[default]
    Tanh,
    /// Pass-through, used by freshly inserted identity levels
    Identity,
}

impl Activation {
    #[inline]
    pub fn apply(self, x: f32) -> f32 {
        match self {
            Activation::Tanh => x.tanh(),
            Activation::Identity => x,
        }
    }

    fn to_i32(self) -> i32 {
        match self {
            Activation::Tanh => 0,
            Activation::Identity => 1,
        }
    }

    fn from_i32(value: i32) -> Result<Self, BufferError> {
        match value {
            0 => Ok(Activation::Tanh),
            1 => Ok(Activation::Identity),
            _ => Err(BufferError::InvalidValue {
                what: "activation",
                value,
            }),
        }
    }
}

#[inline]
fn gaussian<R: Rng + ?Sized>(rng: &mut R) -> f32 {
    rng.sample(StandardNormal)
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Neuron {
    pub weights: Vec<f32>,
    pub bias: f32,
    pub activation: Activation,
}

impl Neuron {
    pub fn new(num_weights: usize) -> Self {
        Self {
            weights: vec![0.0; num_weights],
            bias: 0.0,
            activation: Activation::Tanh,
        }
    }

    /// `activation(bias + weights . inputs)`
    #[inline]
    pub fn fire(&self, inputs: &[f32]) -> f32 {
        let sum: f32 = self
            .weights
            .iter()
            .zip(inputs)
            .fold(self.bias, |acc, (w, x)| acc + w * x);
        self.activation.apply(sum)
    }

    // Re-rolling anything turns an identity neuron back into a regular one

    pub fn randomize_weights<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        for weight in &mut self.weights {
            *weight = gaussian(rng);
        }
        self.activation = Activation::Tanh;
    }

    pub fn randomize_single_weight<R: Rng + ?Sized>(&mut self, index: usize, rng: &mut R) {
        self.weights[index] = gaussian(rng);
        self.activation = Activation::Tanh;
    }

    pub fn randomize_bias<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        self.bias = gaussian(rng);
        self.activation = Activation::Tanh;
    }

    pub fn randomize_all<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        self.randomize_weights(rng);
        self.randomize_bias(rng);
    }
}

impl BinarySerialize for Neuron {
    fn serialize(&self, writer: &mut BinaryWriter) {
        writer.write_len(self.weights.len());
        for &weight in &self.weights {
            writer.write_f32(weight);
        }
        writer.write_f32(self.bias);
        writer.write_i32(self.activation.to_i32());
    }

    fn deserialize(reader: &mut BinaryReader<'_>) -> Result<Self, BufferError> {
        let count = reader.read_len(4)?;
        let weights = (0..count)
            .map(|_| reader.read_f32())
            .collect::<Result<Vec<_>, _>>()?;
        let bias = reader.read_f32()?;
        let activation = Activation::from_i32(reader.read_i32()?)?;
        Ok(Self {
            weights,
            bias,
            activation,
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct NetworkLevel {
    pub neurons: Vec<Neuron>,
}

impl NetworkLevel {
    pub fn new(num_neurons: usize, num_weights: usize) -> Self {
        Self {
            neurons: vec![Neuron::new(num_weights); num_neurons],
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.neurons.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.neurons.is_empty()
    }

    /// Weight count shared by every neuron in the level
    pub fn num_weights(&self) -> usize {
        self.neurons.first().map_or(0, |n| n.weights.len())
    }

    /// Square identity: weight 1 on the matching input, bias 0, no squashing
    pub fn identity(width: usize) -> Self {
        let neurons = (0..width)
            .map(|n| Neuron {
                weights: (0..width).map(|w| if n == w { 1.0 } else { 0.0 }).collect(),
                bias: 0.0,
                activation: Activation::Identity,
            })
            .collect();
        Self { neurons }
    }

    /// Append one random neuron sized like the existing ones
    pub fn add_neuron<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        let mut neuron = Neuron::new(self.num_weights());
        neuron.randomize_all(rng);
        self.neurons.push(neuron);
    }

    pub fn randomize<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        for neuron in &mut self.neurons {
            neuron.randomize_all(rng);
        }
    }
}

impl BinarySerialize for NetworkLevel {
    fn serialize(&self, writer: &mut BinaryWriter) {
        writer.write_len(self.neurons.len());
        for neuron in &self.neurons {
            neuron.serialize(writer);
        }
    }

    fn deserialize(reader: &mut BinaryReader<'_>) -> Result<Self, BufferError> {
        // weight count + bias + activation
        let count = reader.read_len(12)?;
        let neurons = (0..count)
            .map(|_| Neuron::deserialize(reader))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { neurons })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Network {
    levels: Vec<NetworkLevel>,
    num_inputs: usize,
    mutation_settings: MutationSettings,
}

impl Network {
    /// Build a zeroed network. `neurons_per_level[0]` is the input count.
    ///
    /// Panics if `neurons_per_level` is empty.
    pub fn new(neurons_per_level: &[usize]) -> Self {
        assert!(!neurons_per_level.is_empty(), "network needs an input level");
        let levels = neurons_per_level
            .iter()
            .enumerate()
            .map(|(i, &count)| {
                let num_weights = if i > 0 { neurons_per_level[i - 1] } else { 0 };
                NetworkLevel::new(count, num_weights)
            })
            .collect();
        Self {
            levels,
            num_inputs: neurons_per_level[0],
            mutation_settings: MutationSettings::default(),
        }
    }

    pub fn with_mutation_settings(mut self, settings: MutationSettings) -> Self {
        self.mutation_settings = settings;
        self
    }

    #[inline]
    pub fn levels(&self) -> &[NetworkLevel] {
        &self.levels
    }

    #[inline]
    pub fn num_levels(&self) -> usize {
        self.levels.len()
    }

    #[inline]
    pub fn num_inputs(&self) -> usize {
        self.num_inputs
    }

    pub fn num_outputs(&self) -> usize {
        self.levels.last().map_or(0, NetworkLevel::len)
    }

    pub fn neurons_per_level(&self) -> Vec<usize> {
        self.levels.iter().map(NetworkLevel::len).collect()
    }

    #[inline]
    pub fn mutation_settings(&self) -> &MutationSettings {
        &self.mutation_settings
    }

    pub fn set_mutation_settings(&mut self, settings: MutationSettings) {
        self.mutation_settings = settings;
    }

    /// True if every neuron in level `i > 0` has one weight per neuron in
    /// level `i - 1` and the input level matches `num_inputs`.
    pub fn is_topology_valid(&self) -> bool {
        let Some(first) = self.levels.first() else {
            return false;
        };
        first.len() == self.num_inputs
            && first.neurons.iter().all(|n| n.weights.is_empty())
            && self.levels.windows(2).all(|pair| {
                let width = pair[0].len();
                pair[1].neurons.iter().all(|n| n.weights.len() == width)
            })
    }

    /// Forward pass.
    ///
    /// `inputs.len()` must equal [`Self::num_inputs`]; this is only checked in
    /// debug builds. A network with no computing levels returns the inputs.
    pub fn evaluate(&self, inputs: &[f32]) -> Vec<f32> {
        debug_assert_eq!(inputs.len(), self.num_inputs, "network input width");

        let widest = self.levels.iter().map(NetworkLevel::len).max().unwrap_or(0);
        let mut current = Vec::with_capacity(widest.max(inputs.len()));
        let mut next = Vec::with_capacity(widest);
        current.extend_from_slice(inputs);

        for level in self.levels.iter().skip(1) {
            next.clear();
            next.extend(level.neurons.iter().map(|neuron| neuron.fire(&current)));
            std::mem::swap(&mut current, &mut next);
        }

        current
    }

    /// Draw every weight and bias of every computing level from N(0, 1)
    pub fn randomize<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        for level in self.levels.iter_mut().skip(1) {
            level.randomize(rng);
        }
    }

    /// Insert an identity level at `index`, leaving outputs unchanged.
    ///
    /// Panics unless `1 <= index < num_levels()`.
    pub fn add_identity_level(&mut self, index: usize) {
        assert!(
            index >= 1 && index < self.levels.len(),
            "identity level index {index} out of range"
        );
        let width = self.levels[index - 1].len();
        self.levels.insert(index, NetworkLevel::identity(width));
    }

    /// Apply structural and parametric mutation in place
    pub fn mutate<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        let settings = self.mutation_settings;

        if self.levels.len() >= 2 && rng.random::<f32>() < settings.add_level {
            let index = rng.random_range(1..self.levels.len());
            self.add_identity_level(index);
        }

        // Interior levels only; the level count can change as we go
        let mut i = 1;
        while i + 1 < self.levels.len() {
            if rng.random::<f32>() < settings.add_neuron {
                self.levels[i].add_neuron(rng);
                for neuron in &mut self.levels[i + 1].neurons {
                    neuron.weights.push(gaussian(rng));
                }
            }

            if rng.random::<f32>() < settings.delete_neuron {
                let width = self.levels[i].len();
                if width <= 1 {
                    // Dropping the last neuron drops the level
                    self.levels.remove(i);
                    let new_width = self.levels[i - 1].len();
                    for neuron in &mut self.levels[i].neurons {
                        neuron.weights.resize(new_width, 0.0);
                        neuron.randomize_all(rng);
                    }
                    continue;
                }

                let index = rng.random_range(0..width);
                self.levels[i].neurons.remove(index);
                for neuron in &mut self.levels[i + 1].neurons {
                    neuron.weights.remove(index);
                }
            }

            i += 1;
        }

        for level in self.levels.iter_mut().skip(1) {
            for neuron in &mut level.neurons {
                if rng.random::<f32>() < settings.modify_weights {
                    neuron.randomize_weights(rng);
                } else {
                    let count = neuron.weights.len();
                    let to_change = (count as f32 * settings.modify_weight) as usize;
                    for _ in 0..to_change {
                        let index = rng.random_range(0..count);
                        neuron.randomize_single_weight(index, rng);
                    }
                }

                if rng.random::<f32>() < settings.modify_bias {
                    neuron.randomize_bias(rng);
                }
            }
        }
    }

    /// Crossover of two parents followed by mutation.
    ///
    /// The child starts as `parent0`. Wherever both parents have a neuron at
    /// the same level and index, the child takes `parent1`'s with even odds,
    /// resized to fit the child's previous level.
    pub fn breed<R: Rng + ?Sized>(parent0: &Network, parent1: &Network, rng: &mut R) -> Network {
        let mut child = parent0.clone();

        let shared_levels = child.levels.len().min(parent1.levels.len());
        for i in 0..shared_levels {
            let target_weights = if i > 0 { child.levels[i - 1].len() } else { 0 };
            let shared_neurons = child.levels[i].len().min(parent1.levels[i].len());
            for n in 0..shared_neurons {
                if rng.random_range(0..2) != 0 {
                    continue;
                }
                let mut neuron = parent1.levels[i].neurons[n].clone();
                let original = neuron.weights.len();
                if original != target_weights {
                    neuron.weights.resize(target_weights, 0.0);
                    for w in original..target_weights {
                        neuron.randomize_single_weight(w, rng);
                    }
                }
                child.levels[i].neurons[n] = neuron;
            }
        }

        child.mutate(rng);
        child
    }
}

impl BinarySerialize for Network {
    fn serialize(&self, writer: &mut BinaryWriter) {
        writer.write_len(self.levels.len());
        for level in &self.levels {
            level.serialize(writer);
        }
        writer.write_len(self.num_inputs);
        // MutationSettings also derives serde for the trainer config
        BinarySerialize::serialize(&self.mutation_settings, writer);
    }

    fn deserialize(reader: &mut BinaryReader<'_>) -> Result<Self, BufferError> {
        let count = reader.read_len(4)?;
        let levels = (0..count)
            .map(|_| NetworkLevel::deserialize(reader))
            .collect::<Result<Vec<_>, _>>()?;
        let raw_inputs = reader.read_i32()?;
        let num_inputs =
            usize::try_from(raw_inputs).map_err(|_| BufferError::InvalidLength(raw_inputs))?;
        let mutation_settings = <MutationSettings as BinarySerialize>::deserialize(reader)?;

        let network = Self {
            levels,
            num_inputs,
            mutation_settings,
        };
        if !network.is_topology_valid() {
            return Err(BufferError::Malformed("network weight counts do not match level widths"));
        }
        Ok(network)
    }
}
