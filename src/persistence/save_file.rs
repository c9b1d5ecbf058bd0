//! Population save files
//!
//! Layout (little-endian, 4-byte ints and floats):
//!
//! ```text
//! "pcAI"                      4 bytes, not terminated
//! major, minor, revision      i32 x 3
//! controller count            i32
//! controller[count]           network, wins/losses/ties (i32 x 3), generation (i32)
//! ```
//!
//! The header is checked before anything else is trusted. Bytes after the
//! last controller are ignored.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

use super::buffer::{BinaryReader, BinarySerialize, BinaryWriter, BufferError};
use crate::training::AiControllerData;

pub const MAGIC: &[u8; 4] = b"pcAI";
pub const MAJOR_VERSION: i32 = 0;
pub const MINOR_VERSION: i32 = 1;
pub const REVISION: i32 = 0;

/// Smallest possible encoded controller: empty level list, input count,
/// mutation settings, record, generation.
const MIN_CONTROLLER_SIZE: usize = 4 + 4 + 6 * 4 + 3 * 4 + 4;

#[derive(Debug, Error)]
pub enum SaveFileError {
    #[error("save file i/o: {0}")]
    Io(#[from] io::Error),
    #[error("not a population file (magic {0:?})")]
    BadMagic([u8; 4]),
    #[error("unsupported save version {major}.{minor}.{revision}")]
    VersionMismatch {
        major: i32,
        minor: i32,
        revision: i32,
    },
    #[error(transparent)]
    Buffer(#[from] BufferError),
}

/// Encode a population with the current header
pub fn encode_population(population: &[AiControllerData]) -> Vec<u8> {
    let mut writer = BinaryWriter::with_capacity(64 + population.len() * 4096);
    writer.write_bytes(MAGIC);
    writer.write_i32(MAJOR_VERSION);
    writer.write_i32(MINOR_VERSION);
    writer.write_i32(REVISION);
    writer.write_len(population.len());
    for data in population {
        data.serialize(&mut writer);
    }
    writer.into_bytes()
}

pub fn decode_population(bytes: &[u8]) -> Result<Vec<AiControllerData>, SaveFileError> {
    let mut reader = BinaryReader::new(bytes);

    let mut magic = [0u8; 4];
    magic.copy_from_slice(reader.read_bytes(MAGIC.len())?);
    if &magic != MAGIC {
        return Err(SaveFileError::BadMagic(magic));
    }

    let major = reader.read_i32()?;
    let minor = reader.read_i32()?;
    let revision = reader.read_i32()?;
    if (major, minor, revision) != (MAJOR_VERSION, MINOR_VERSION, REVISION) {
        return Err(SaveFileError::VersionMismatch {
            major,
            minor,
            revision,
        });
    }

    let count = reader.read_len(MIN_CONTROLLER_SIZE)?;
    let population = (0..count)
        .map(|_| AiControllerData::deserialize(&mut reader))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(population)
}

/// Write a population to `path`, creating parent directories as needed.
///
/// The file is written next to its destination first and renamed into
/// place, so an interrupted save leaves any previous file intact.
pub fn save_population(path: &Path, population: &[AiControllerData]) -> Result<(), SaveFileError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }

    let tmp = path.with_extension("tmp");
    fs::write(&tmp, encode_population(population))?;
    fs::rename(&tmp, path)?;

    log::info!(
        "Saved {} controllers to {}",
        population.len(),
        path.display()
    );
    Ok(())
}

pub fn load_population(path: &Path) -> Result<Vec<AiControllerData>, SaveFileError> {
    let bytes = fs::read(path)?;
    let population = decode_population(&bytes)?;
    log::info!(
        "Loaded {} controllers from {}",
        population.len(),
        path.display()
    );
    Ok(population)
}

/// Fill a save path template.
///
/// Recognised placeholders: `{major}`, `{minor}`, `{revision}`, `{count}`
/// (population size) and `{generation}`. Anything else is left as written.
pub fn expand_path_template(template: &str, count: usize, generation: u32) -> PathBuf {
    let expanded = template
        .replace("{major}", &MAJOR_VERSION.to_string())
        .replace("{minor}", &MINOR_VERSION.to_string())
        .replace("{revision}", &REVISION.to_string())
        .replace("{count}", &count.to_string())
        .replace("{generation}", &generation.to_string());
    PathBuf::from(expanded)
}

/// Generations a run writes to disk, newest first.
///
/// A run saves every `stride` generations starting at 0, plus the last one.
pub fn saved_generations(num_generations: u32, stride: u32) -> Vec<u32> {
    let Some(last) = num_generations.checked_sub(1) else {
        return Vec::new();
    };
    let stride = stride.max(1);

    let mut generations = vec![last];
    let mut g = last - last % stride;
    loop {
        if g != last {
            generations.push(g);
        }
        if g == 0 {
            break;
        }
        g -= stride;
    }
    generations
}

/// Walk back through the generations a run would have saved and load the
/// newest file that reads cleanly. Unreadable candidates are skipped.
pub fn find_latest_save(
    template: &str,
    count: usize,
    num_generations: u32,
    stride: u32,
) -> Option<(u32, Vec<AiControllerData>)> {
    for generation in saved_generations(num_generations, stride) {
        let path = expand_path_template(template, count, generation);
        if !path.exists() {
            continue;
        }
        match load_population(&path) {
            Ok(population) => return Some((generation, population)),
            Err(err) => log::warn!("Skipping {}: {err}", path.display()),
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::controller::NeuralNetPlayerController;
    use crate::nn::{MutationSettings, Network};
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    fn population(n: usize, seed: u64) -> Vec<AiControllerData> {
        let mut rng = Pcg32::seed_from_u64(seed);
        (0..n)
            .map(|g| AiControllerData::new(NeuralNetPlayerController::new(&mut rng), g as u32))
            .collect()
    }

    fn scratch_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("neurons-{name}-{}", std::process::id()));
        let _ = fs::remove_dir_all(&dir);
        dir
    }

    #[test]
    fn test_header_layout() {
        let bytes = encode_population(&[]);
        assert_eq!(&bytes[..4], b"pcAI");
        assert_eq!(&bytes[4..20], &[0, 0, 0, 0, 1, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0]);
        assert_eq!(bytes.len(), 20);
    }

    #[test]
    fn test_population_round_trip() {
        let pop = population(3, 5);
        let decoded = decode_population(&encode_population(&pop)).unwrap();
        assert_eq!(decoded, pop);
    }

    #[test]
    fn test_mutation_settings_round_trip() {
        let mut rng = Pcg32::seed_from_u64(8);
        let settings = MutationSettings {
            add_level: 0.3,
            modify_bias: 0.75,
            ..MutationSettings::default()
        };
        let mut network =
            Network::new(&NeuralNetPlayerController::default_topology()).with_mutation_settings(settings);
        network.randomize(&mut rng);
        let mut data = AiControllerData::new(NeuralNetPlayerController::from_network(network), 4);
        data.record.losses = 2;

        let pop = vec![data];
        let decoded = decode_population(&encode_population(&pop)).unwrap();
        assert_eq!(decoded, pop);
        assert_eq!(*decoded[0].controller.network().mutation_settings(), settings);
    }

    #[test]
    fn test_trailing_bytes_ignored() {
        let pop = population(1, 6);
        let mut bytes = encode_population(&pop);
        bytes.extend_from_slice(&[0xff; 9]);
        assert_eq!(decode_population(&bytes).unwrap(), pop);
    }

    #[test]
    fn test_bad_magic() {
        let mut bytes = encode_population(&[]);
        bytes[0] = b'x';
        assert!(matches!(
            decode_population(&bytes),
            Err(SaveFileError::BadMagic(m)) if &m == b"xcAI"
        ));
    }

    #[test]
    fn test_version_mismatch() {
        let mut bytes = encode_population(&[]);
        bytes[8] = 2;
        assert!(matches!(
            decode_population(&bytes),
            Err(SaveFileError::VersionMismatch {
                major: 0,
                minor: 2,
                revision: 0
            })
        ));
    }

    #[test]
    fn test_truncated_file() {
        let bytes = encode_population(&population(2, 7));
        for cut in [2, 10, 20, bytes.len() / 2, bytes.len() - 1] {
            assert!(decode_population(&bytes[..cut]).is_err(), "cut at {cut}");
        }
    }

    #[test]
    fn test_huge_count_rejected_without_allocating() {
        let mut bytes = encode_population(&[]);
        bytes[16..20].copy_from_slice(&i32::MAX.to_le_bytes());
        assert!(matches!(
            decode_population(&bytes),
            Err(SaveFileError::Buffer(BufferError::EndOfBuffer { .. }))
        ));
    }

    #[test]
    fn test_template_expansion() {
        let path = expand_path_template("out/ai_v{major}.{minor}.{revision}_{count}_g{generation}.bin", 16, 42);
        assert_eq!(path, PathBuf::from("out/ai_v0.1.0_16_g42.bin"));
        assert_eq!(expand_path_template("plain.bin", 1, 1), PathBuf::from("plain.bin"));
    }

    #[test]
    fn test_saved_generations() {
        assert_eq!(saved_generations(10, 100), vec![9, 0]);
        assert_eq!(saved_generations(10, 3), vec![9, 6, 3, 0]);
        assert_eq!(saved_generations(7, 3), vec![6, 3, 0]);
        assert_eq!(saved_generations(1, 5), vec![0]);
        assert!(saved_generations(0, 5).is_empty());
    }

    #[test]
    fn test_save_and_find_latest() {
        let dir = scratch_dir("latest");
        let template = dir.join("pop_{generation}.bin");
        let template = template.to_str().unwrap();

        let older = population(2, 1);
        let newer = population(2, 2);
        save_population(&expand_path_template(template, 2, 0), &older).unwrap();
        save_population(&expand_path_template(template, 2, 4), &newer).unwrap();
        // A corrupt file at the newest slot is skipped
        fs::write(expand_path_template(template, 2, 5), b"pcAI").unwrap();

        let (generation, loaded) = find_latest_save(template, 2, 6, 2).unwrap();
        assert_eq!(generation, 4);
        assert_eq!(loaded, newer);

        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let dir = scratch_dir("missing");
        assert!(matches!(
            load_population(&dir.join("nope.bin")),
            Err(SaveFileError::Io(_))
        ));
    }
}
