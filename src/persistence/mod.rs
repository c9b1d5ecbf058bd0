//! Binary persistence
//!
//! - `buffer`: little-endian reader/writer and the [`BinarySerialize`] trait
//! - `save_file`: versioned population files for training runs

pub mod buffer;
pub mod save_file;

pub use buffer::{BinaryReader, BinarySerialize, BinaryWriter, BufferError};
pub use save_file::{
    SaveFileError, decode_population, encode_population, expand_path_template, find_latest_save,
    load_population, save_population,
};
