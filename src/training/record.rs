//! Per-controller bookkeeping for a training run

use crate::controller::NeuralNetPlayerController;
use crate::persistence::buffer::{BinaryReader, BinarySerialize, BinaryWriter, BufferError};

/// Points awarded per result
pub const POINTS_PER_WIN: u32 = 3;
pub const POINTS_PER_TIE: u32 = 1;
pub const POINTS_PER_LOSS: u32 = 0;

/// Match results within one generation
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WinLossRecord {
    pub wins: u32,
    pub losses: u32,
    pub ties: u32,
}

impl WinLossRecord {
    #[inline]
    pub fn points(&self) -> u32 {
        self.wins * POINTS_PER_WIN + self.ties * POINTS_PER_TIE + self.losses * POINTS_PER_LOSS
    }

    #[inline]
    pub fn games_played(&self) -> u32 {
        self.wins + self.losses + self.ties
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

fn read_count(reader: &mut BinaryReader<'_>, what: &'static str) -> Result<u32, BufferError> {
    let value = reader.read_i32()?;
    u32::try_from(value).map_err(|_| BufferError::InvalidValue { what, value })
}

impl BinarySerialize for WinLossRecord {
    fn serialize(&self, writer: &mut BinaryWriter) {
        writer.write_i32(self.wins as i32);
        writer.write_i32(self.losses as i32);
        writer.write_i32(self.ties as i32);
    }

    fn deserialize(reader: &mut BinaryReader<'_>) -> Result<Self, BufferError> {
        Ok(Self {
            wins: read_count(reader, "wins")?,
            losses: read_count(reader, "losses")?,
            ties: read_count(reader, "ties")?,
        })
    }
}

/// A population member: its controller, how it fared this generation, and
/// how many rounds of breeding produced it.
#[derive(Debug, Clone, PartialEq)]
pub struct AiControllerData {
    pub controller: NeuralNetPlayerController,
    pub record: WinLossRecord,
    pub generation: u32,
}

impl AiControllerData {
    pub fn new(controller: NeuralNetPlayerController, generation: u32) -> Self {
        Self {
            controller,
            record: WinLossRecord::default(),
            generation,
        }
    }

    #[inline]
    pub fn points(&self) -> u32 {
        self.record.points()
    }
}

impl BinarySerialize for AiControllerData {
    fn serialize(&self, writer: &mut BinaryWriter) {
        self.controller.serialize(writer);
        self.record.serialize(writer);
        writer.write_i32(self.generation as i32);
    }

    fn deserialize(reader: &mut BinaryReader<'_>) -> Result<Self, BufferError> {
        let controller = NeuralNetPlayerController::deserialize(reader)?;
        let record = WinLossRecord::deserialize(reader)?;
        let generation = read_count(reader, "generation")?;
        Ok(Self {
            controller,
            record,
            generation,
        })
    }
}
