//! Reads and writes `V32-MEMC` memory-card files (`spec.md` §6), grounded
//! on `original_source/VirconDefinitions/FileFormats.hpp`'s
//! `MemoryCardFileFormat` and `V32Console::LoadMemoryCard`/`SaveMemoryCard`.

use std::fmt;
use std::fs;
use std::path::Path;

use v32_core::constants::MEMORY_CARD_SIZE;
use v32_core::word::Word;

const SIGNATURE: &[u8; 8] = b"V32-MEMC";

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum MemoryCardFileError {
    Io(String),
    BadSignature,
    WrongSize { expected: usize, actual: usize },
}

impl fmt::Display for MemoryCardFileError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MemoryCardFileError::Io(message) => write!(f, "{message}"),
            MemoryCardFileError::BadSignature => {
                write!(f, "incorrect V32 memory card file format (bad signature)")
            }
            MemoryCardFileError::WrongSize { expected, actual } => {
                write!(f, "memory card file has {actual} bytes, expected {expected}")
            }
        }
    }
}

impl std::error::Error for MemoryCardFileError {}

/// Reads a memory-card file into `MEMORY_CARD_SIZE` words.
pub fn read_memory_card_file(path: &Path) -> Result<Vec<Word>, MemoryCardFileError> {
    let bytes = fs::read(path)
        .map_err(|e| MemoryCardFileError::Io(format!("cannot open \"{}\": {e}", path.display())))?;

    let expected_len = 8 + MEMORY_CARD_SIZE as usize * 4;
    if bytes.len() != expected_len {
        return Err(MemoryCardFileError::WrongSize {
            expected: expected_len,
            actual: bytes.len(),
        });
    }
    if &bytes[0..8] != &SIGNATURE[..] {
        return Err(MemoryCardFileError::BadSignature);
    }

    let words = bytes[8..]
        .chunks_exact(4)
        .map(|chunk| Word::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]))
        .collect();
    Ok(words)
}

/// Writes `words` back out as a `V32-MEMC` file, matching
/// `V32Console::SaveMemoryCard`'s "rewind and rewrite the whole card".
pub fn write_memory_card_file(path: &Path, words: &[Word]) -> Result<(), MemoryCardFileError> {
    let mut bytes = Vec::with_capacity(8 + words.len() * 4);
    bytes.extend_from_slice(SIGNATURE);
    for word in words {
        bytes.extend_from_slice(&word.to_le_bytes());
    }
    fs::write(path, bytes)
        .map_err(|e| MemoryCardFileError::Io(format!("cannot write \"{}\": {e}", path.display())))
}

/// Creates a blank `MEMORY_CARD_SIZE`-word card file, all zero words.
pub fn create_memory_card_file(path: &Path) -> Result<(), MemoryCardFileError> {
    write_memory_card_file(path, &vec![Word::zero(); MEMORY_CARD_SIZE as usize])
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;

    #[test]
    fn round_trips_through_disk() {
        let mut words = vec![Word::zero(); MEMORY_CARD_SIZE as usize];
        words[0] = Word::from_integer(42);
        words[MEMORY_CARD_SIZE as usize - 1] = Word::from_integer(-7);

        let path = env::temp_dir().join("v32-test-memcard.bin");
        write_memory_card_file(&path, &words).unwrap();

        let read_back = read_memory_card_file(&path).unwrap();
        assert_eq!(read_back.len(), words.len());
        assert_eq!(read_back[0].integer(), 42);
        assert_eq!(read_back[MEMORY_CARD_SIZE as usize - 1].integer(), -7);

        fs::remove_file(&path).ok();
    }

    #[test]
    fn rejects_wrong_signature() {
        let path = env::temp_dir().join("v32-test-memcard-bad-sig.bin");
        let mut bytes = vec![0u8; 8 + MEMORY_CARD_SIZE as usize * 4];
        bytes[0..8].copy_from_slice(b"NOT-MEMC");
        fs::write(&path, &bytes).unwrap();

        let result = read_memory_card_file(&path);
        assert_eq!(result, Err(MemoryCardFileError::BadSignature));

        fs::remove_file(&path).ok();
    }

    #[test]
    fn rejects_wrong_size() {
        let path = env::temp_dir().join("v32-test-memcard-bad-size.bin");
        fs::write(&path, b"V32-MEMC\x00\x00\x00\x00").unwrap();

        let result = read_memory_card_file(&path);
        assert!(matches!(result, Err(MemoryCardFileError::WrongSize { .. })));

        fs::remove_file(&path).ok();
    }
}
