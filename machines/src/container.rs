//! Parses `V32-CART`/`V32-BIOS` ROM containers (`spec.md` §6), grounded on
//! `original_source/DesktopEmulator/ConsoleLogic/V32Console.cpp`'s
//! `LoadBios`/`LoadCartridge` and the layouts in
//! `original_source/VirconDefinitions/FileFormats.hpp`.
//!
//! The original reads straight off an open file stream; here the whole
//! file is read into memory first and sliced, which keeps every offset
//! check a plain bounds check instead of an I/O error path.

use std::fmt;
use std::fs;
use std::path::Path;

use byteorder::{ByteOrder, LittleEndian};

use v32_core::constants::{
    BIOS_PROGRAM_ROM_SIZE, CARTRIDGE_PROGRAM_ROM_SIZE, GPU_MAXIMUM_CARTRIDGE_TEXTURES,
    GPU_TEXTURE_SIZE, SPU_MAXIMUM_CARTRIDGE_SAMPLES, SPU_MAXIMUM_CARTRIDGE_SOUNDS,
};
use v32_core::console::{BiosImage, CartridgeImage, CartridgeTexture};
use v32_core::word::{Sample, Word};

const ROM_HEADER_SIZE: usize = 128;
const TITLE_OFFSET: usize = 16;
const TITLE_LEN: usize = 64;
const BINARY_HEADER_SIZE: usize = 12;
const TEXTURE_HEADER_SIZE: usize = 16;
const SOUND_HEADER_SIZE: usize = 12;

const CARTRIDGE_SIGNATURE: &[u8; 8] = b"V32-CART";
const BIOS_SIGNATURE: &[u8; 8] = b"V32-BIOS";
const BINARY_SIGNATURE: &[u8; 8] = b"V32-VBIN";
const TEXTURE_SIGNATURE: &[u8; 8] = b"V32-VTEX";
const SOUND_SIGNATURE: &[u8; 8] = b"V32-VSND";

/// A format-level failure while parsing a container. Distinct from
/// [`v32_core::console::LoadError`], which is raised by `Console` itself
/// once it already has a fully decoded image in hand.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ContainerError {
    Io(String),
    NotAMultipleOfFour,
    TooSmallForHeader,
    WrongKind { expected: &'static str },
    BadSignature { expected: &'static str, context: &'static str },
    SectionNotContiguous { section: &'static str },
    SizeMismatch { declared: u32, actual: u32 },
    ProgramRomTooLarge { limit: u32, actual: u32 },
    TooManyTextures { limit: usize, actual: u32 },
    TooManySounds { limit: usize, actual: u32 },
    BiosMustHaveExactlyOneTexture { actual: u32 },
    BiosMustHaveExactlyOneSound { actual: u32 },
    TextureDimensionsOutOfRange { width: u32, height: u32 },
    SoundTooManyTotalSamples { limit: u32, actual: u64 },
    Truncated,
}

impl fmt::Display for ContainerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ContainerError::Io(message) => write!(f, "{message}"),
            ContainerError::NotAMultipleOfFour => {
                write!(f, "incorrect V32 file format (file size must be a multiple of 4)")
            }
            ContainerError::TooSmallForHeader => {
                write!(f, "incorrect V32 file format (file is too small)")
            }
            ContainerError::WrongKind { expected } => {
                write!(f, "input V32 ROM cannot be loaded as a {expected}")
            }
            ContainerError::BadSignature { expected, context } => {
                write!(f, "{context} does not have a valid signature (expected {expected})")
            }
            ContainerError::SectionNotContiguous { section } => {
                write!(f, "incorrect V32 file format ({section} is not located after the previous section)")
            }
            ContainerError::SizeMismatch { declared, actual } => {
                write!(f, "incorrect V32 file format (declared size {declared} does not match file size {actual})")
            }
            ContainerError::ProgramRomTooLarge { limit, actual } => {
                write!(f, "program ROM does not have a correct size: {actual} words (limit {limit})")
            }
            ContainerError::TooManyTextures { limit, actual } => {
                write!(f, "video ROM contains too many textures: {actual} (limit {limit})")
            }
            ContainerError::TooManySounds { limit, actual } => {
                write!(f, "audio ROM contains too many sounds: {actual} (limit {limit})")
            }
            ContainerError::BiosMustHaveExactlyOneTexture { actual } => {
                write!(f, "a BIOS video rom should have exactly 1 texture, found {actual}")
            }
            ContainerError::BiosMustHaveExactlyOneSound { actual } => {
                write!(f, "a BIOS audio rom should have exactly 1 sound, found {actual}")
            }
            ContainerError::TextureDimensionsOutOfRange { width, height } => {
                write!(f, "texture does not have correct dimensions ({width}x{height}, must be 1x1 up to {GPU_TEXTURE_SIZE}x{GPU_TEXTURE_SIZE})")
            }
            ContainerError::SoundTooManyTotalSamples { limit, actual } => {
                write!(f, "sounds contain too many total samples: {actual} (limit {limit})")
            }
            ContainerError::Truncated => write!(f, "file ends before the declared section contents"),
        }
    }
}

impl std::error::Error for ContainerError {}

struct SectionLocation {
    start: u32,
    length: u32,
}

struct RomHeader {
    title: String,
    rom_version: u32,
    rom_revision: u32,
    number_of_textures: u32,
    number_of_sounds: u32,
    program_rom: SectionLocation,
    video_rom: SectionLocation,
    audio_rom: SectionLocation,
}

fn read_section_location(bytes: &[u8]) -> SectionLocation {
    SectionLocation {
        start: LittleEndian::read_u32(&bytes[0..4]),
        length: LittleEndian::read_u32(&bytes[4..8]),
    }
}

fn check_signature(bytes: &[u8], expected: &[u8; 8], context: &'static str) -> Result<(), ContainerError> {
    if &bytes[..8] == expected {
        Ok(())
    } else {
        Err(ContainerError::BadSignature {
            expected: std::str::from_utf8(expected).unwrap(),
            context,
        })
    }
}

/// Parses the 128-byte ROM header and validates section contiguity and
/// overall file size, matching `V32Console::LoadBios`/`LoadCartridge`
/// steps 1-2. Does not check the is-BIOS/is-cartridge signature itself;
/// callers do that since the error message names which kind was wanted.
fn parse_rom_header(bytes: &[u8]) -> Result<RomHeader, ContainerError> {
    if bytes.len() % 4 != 0 {
        return Err(ContainerError::NotAMultipleOfFour);
    }
    if bytes.len() < ROM_HEADER_SIZE {
        return Err(ContainerError::TooSmallForHeader);
    }

    let title_bytes = &bytes[TITLE_OFFSET..TITLE_OFFSET + TITLE_LEN];
    let nul_at = title_bytes.iter().position(|&b| b == 0).unwrap_or(TITLE_LEN);
    let title = String::from_utf8_lossy(&title_bytes[..nul_at]).into_owned();

    let rom_version = LittleEndian::read_u32(&bytes[80..84]);
    let rom_revision = LittleEndian::read_u32(&bytes[84..88]);
    let number_of_textures = LittleEndian::read_u32(&bytes[88..92]);
    let number_of_sounds = LittleEndian::read_u32(&bytes[92..96]);
    let program_rom = read_section_location(&bytes[96..104]);
    let video_rom = read_section_location(&bytes[104..112]);
    let audio_rom = read_section_location(&bytes[112..120]);

    if program_rom.start != ROM_HEADER_SIZE as u32 {
        return Err(ContainerError::SectionNotContiguous { section: "program ROM" });
    }
    let size_after_program = program_rom.start + program_rom.length;
    if video_rom.start != size_after_program {
        return Err(ContainerError::SectionNotContiguous { section: "video ROM" });
    }
    let size_after_video = video_rom.start + video_rom.length;
    if audio_rom.start != size_after_video {
        return Err(ContainerError::SectionNotContiguous { section: "audio ROM" });
    }
    let size_after_audio = audio_rom.start + audio_rom.length;
    if bytes.len() as u32 != size_after_audio {
        return Err(ContainerError::SizeMismatch {
            declared: size_after_audio,
            actual: bytes.len() as u32,
        });
    }

    Ok(RomHeader {
        title,
        rom_version,
        rom_revision,
        number_of_textures,
        number_of_sounds,
        program_rom,
        video_rom,
        audio_rom,
    })
}

fn slice_at<'a>(bytes: &'a [u8], start: usize, len: usize) -> Result<&'a [u8], ContainerError> {
    bytes.get(start..start + len).ok_or(ContainerError::Truncated)
}

/// Reads the embedded binary sub-file at `offset` and returns its words
/// plus the offset immediately after it.
fn read_binary_subfile(bytes: &[u8], offset: usize) -> Result<(Vec<Word>, usize), ContainerError> {
    let header = slice_at(bytes, offset, BINARY_HEADER_SIZE)?;
    check_signature(header, BINARY_SIGNATURE, "program ROM")?;
    let number_of_words = LittleEndian::read_u32(&header[8..12]) as usize;

    let data_offset = offset + BINARY_HEADER_SIZE;
    let data = slice_at(bytes, data_offset, number_of_words * 4)?;
    let words = data.chunks_exact(4).map(|chunk| Word::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]])).collect();

    Ok((words, data_offset + number_of_words * 4))
}

/// Reads one embedded texture sub-file, expanding it line-by-line into a
/// `GPU_TEXTURE_SIZE`-square zero-padded RGBA8 buffer, matching the
/// original's `LoadedTexture` staging array.
fn read_texture_subfile(bytes: &[u8], offset: usize) -> Result<(CartridgeTexture, usize), ContainerError> {
    let header = slice_at(bytes, offset, TEXTURE_HEADER_SIZE)?;
    check_signature(header, TEXTURE_SIGNATURE, "texture")?;
    let width = LittleEndian::read_u32(&header[8..12]);
    let height = LittleEndian::read_u32(&header[12..16]);

    if width == 0 || height == 0 || width > GPU_TEXTURE_SIZE || height > GPU_TEXTURE_SIZE {
        return Err(ContainerError::TextureDimensionsOutOfRange { width, height });
    }

    let side = GPU_TEXTURE_SIZE as usize;
    let mut pixels = vec![0u8; side * side * 4];
    let mut cursor = offset + TEXTURE_HEADER_SIZE;
    let row_bytes = width as usize * 4;
    for y in 0..height as usize {
        let row = slice_at(bytes, cursor, row_bytes)?;
        pixels[y * side * 4..y * side * 4 + row_bytes].copy_from_slice(row);
        cursor += row_bytes;
    }

    Ok((CartridgeTexture { width, height, pixels }, cursor))
}

/// Reads one embedded sound sub-file's interleaved stereo int16 samples.
fn read_sound_subfile(bytes: &[u8], offset: usize) -> Result<(Vec<Sample>, usize), ContainerError> {
    let header = slice_at(bytes, offset, SOUND_HEADER_SIZE)?;
    check_signature(header, SOUND_SIGNATURE, "sound")?;
    let number_of_samples = LittleEndian::read_u32(&header[8..12]) as usize;

    let data_offset = offset + SOUND_HEADER_SIZE;
    let data = slice_at(bytes, data_offset, number_of_samples * 4)?;
    let samples = data
        .chunks_exact(4)
        .map(|chunk| Sample {
            left: i16::from_le_bytes([chunk[0], chunk[1]]),
            right: i16::from_le_bytes([chunk[2], chunk[3]]),
        })
        .collect();

    Ok((samples, data_offset + number_of_samples * 4))
}

fn read_file(path: &Path) -> Result<Vec<u8>, ContainerError> {
    fs::read(path).map_err(|e| ContainerError::Io(format!("cannot open \"{}\": {e}", path.display())))
}

/// Parses a `V32-BIOS` container, matching `V32Console::LoadBios`.
/// Requires exactly 1 texture and 1 sound.
pub fn load_bios_container(path: &Path) -> Result<BiosImage, ContainerError> {
    let bytes = read_file(path)?;

    if bytes.len() >= 8 && &bytes[0..8] == &CARTRIDGE_SIGNATURE[..] {
        return Err(ContainerError::WrongKind { expected: "BIOS (is it a cartridge instead)" });
    }
    if bytes.len() < 8 || &bytes[0..8] != &BIOS_SIGNATURE[..] {
        return Err(ContainerError::BadSignature { expected: "V32-BIOS", context: "file" });
    }

    let header = parse_rom_header(&bytes)?;
    if header.number_of_textures != 1 {
        return Err(ContainerError::BiosMustHaveExactlyOneTexture { actual: header.number_of_textures });
    }
    if header.number_of_sounds != 1 {
        return Err(ContainerError::BiosMustHaveExactlyOneSound { actual: header.number_of_sounds });
    }

    let (program_rom, after_binary) = read_binary_subfile(&bytes, header.program_rom.start as usize)?;
    if program_rom.len() as u32 > BIOS_PROGRAM_ROM_SIZE {
        return Err(ContainerError::ProgramRomTooLarge {
            limit: BIOS_PROGRAM_ROM_SIZE,
            actual: program_rom.len() as u32,
        });
    }

    let (texture, after_texture) = read_texture_subfile(&bytes, after_binary)?;
    let (sound, _after_sound) = read_sound_subfile(&bytes, after_texture)?;

    Ok(BiosImage {
        program_rom,
        texture_width: texture.width,
        texture_height: texture.height,
        texture_pixels: texture.pixels,
        sound,
        title: header.title,
        version: header.rom_version,
        revision: header.rom_revision,
    })
}

/// Parses a `V32-CART` container, matching `V32Console::LoadCartridge`.
pub fn load_cartridge_container(path: &Path) -> Result<CartridgeImage, ContainerError> {
    let bytes = read_file(path)?;

    if bytes.len() >= 8 && &bytes[0..8] == &BIOS_SIGNATURE[..] {
        return Err(ContainerError::WrongKind { expected: "cartridge (is it a BIOS instead)" });
    }
    if bytes.len() < 8 || &bytes[0..8] != &CARTRIDGE_SIGNATURE[..] {
        return Err(ContainerError::BadSignature { expected: "V32-CART", context: "file" });
    }

    let header = parse_rom_header(&bytes)?;
    if header.number_of_textures as usize > GPU_MAXIMUM_CARTRIDGE_TEXTURES {
        return Err(ContainerError::TooManyTextures {
            limit: GPU_MAXIMUM_CARTRIDGE_TEXTURES,
            actual: header.number_of_textures,
        });
    }
    if header.number_of_sounds as usize > SPU_MAXIMUM_CARTRIDGE_SOUNDS {
        return Err(ContainerError::TooManySounds {
            limit: SPU_MAXIMUM_CARTRIDGE_SOUNDS,
            actual: header.number_of_sounds,
        });
    }

    let (program_rom, _after_binary) = read_binary_subfile(&bytes, header.program_rom.start as usize)?;
    if program_rom.len() as u32 > CARTRIDGE_PROGRAM_ROM_SIZE {
        return Err(ContainerError::ProgramRomTooLarge {
            limit: CARTRIDGE_PROGRAM_ROM_SIZE,
            actual: program_rom.len() as u32,
        });
    }

    let mut textures = Vec::with_capacity(header.number_of_textures as usize);
    let mut cursor = header.video_rom.start as usize;
    for _ in 0..header.number_of_textures {
        let (texture, next) = read_texture_subfile(&bytes, cursor)?;
        textures.push(texture);
        cursor = next;
    }

    let mut sounds = Vec::with_capacity(header.number_of_sounds as usize);
    let mut total_samples: u64 = 0;
    let mut cursor = header.audio_rom.start as usize;
    for _ in 0..header.number_of_sounds {
        let (samples, next) = read_sound_subfile(&bytes, cursor)?;
        total_samples += samples.len() as u64;
        if total_samples > SPU_MAXIMUM_CARTRIDGE_SAMPLES as u64 {
            return Err(ContainerError::SoundTooManyTotalSamples {
                limit: SPU_MAXIMUM_CARTRIDGE_SAMPLES,
                actual: total_samples,
            });
        }
        sounds.push(samples);
        cursor = next;
    }

    let file_name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();

    Ok(CartridgeImage {
        program_rom,
        textures,
        sounds,
        file_name,
        title: header.title,
        version: header.rom_version,
        revision: header.rom_revision,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_section_location(out: &mut Vec<u8>, start: u32, length: u32) {
        out.extend_from_slice(&start.to_le_bytes());
        out.extend_from_slice(&length.to_le_bytes());
    }

    /// Builds a minimal BIOS container: 1 word of program ROM, a 1x1
    /// texture, and a 1-sample sound.
    fn build_bios_bytes() -> Vec<u8> {
        let mut binary = Vec::new();
        binary.extend_from_slice(BINARY_SIGNATURE);
        binary.extend_from_slice(&1u32.to_le_bytes());
        binary.extend_from_slice(&0xDEAD_BEEFu32.to_le_bytes());

        let mut texture = Vec::new();
        texture.extend_from_slice(TEXTURE_SIGNATURE);
        texture.extend_from_slice(&1u32.to_le_bytes());
        texture.extend_from_slice(&1u32.to_le_bytes());
        texture.extend_from_slice(&[10, 20, 30, 255]);

        let mut sound = Vec::new();
        sound.extend_from_slice(SOUND_SIGNATURE);
        sound.extend_from_slice(&1u32.to_le_bytes());
        sound.extend_from_slice(&1i16.to_le_bytes());
        sound.extend_from_slice(&(-1i16).to_le_bytes());

        let program_rom_start = ROM_HEADER_SIZE as u32;
        let program_rom_length = binary.len() as u32;
        let video_rom_start = program_rom_start + program_rom_length;
        let video_rom_length = texture.len() as u32;
        let audio_rom_start = video_rom_start + video_rom_length;
        let audio_rom_length = sound.len() as u32;

        let mut header = Vec::new();
        header.extend_from_slice(BIOS_SIGNATURE);
        header.extend_from_slice(&0u32.to_le_bytes()); // VirconVersion
        header.extend_from_slice(&0u32.to_le_bytes()); // VirconRevision
        let mut title = vec![0u8; TITLE_LEN];
        title[..4].copy_from_slice(b"Test");
        header.extend_from_slice(&title);
        header.extend_from_slice(&1u32.to_le_bytes()); // ROMVersion
        header.extend_from_slice(&0u32.to_le_bytes()); // ROMRevision
        header.extend_from_slice(&1u32.to_le_bytes()); // NumberOfTextures
        header.extend_from_slice(&1u32.to_le_bytes()); // NumberOfSounds
        write_section_location(&mut header, program_rom_start, program_rom_length);
        write_section_location(&mut header, video_rom_start, video_rom_length);
        write_section_location(&mut header, audio_rom_start, audio_rom_length);
        header.extend_from_slice(&[0u8; 8]);
        assert_eq!(header.len(), ROM_HEADER_SIZE);

        let mut bytes = header;
        bytes.extend_from_slice(&binary);
        bytes.extend_from_slice(&texture);
        bytes.extend_from_slice(&sound);
        bytes
    }

    #[test]
    fn parses_a_well_formed_bios() {
        let bytes = build_bios_bytes();
        let dir = std::env::temp_dir();
        let path = dir.join("v32-test-bios.bin");
        fs::File::create(&path).unwrap().write_all(&bytes).unwrap();

        let bios = load_bios_container(&path).unwrap();
        assert_eq!(bios.program_rom.len(), 1);
        assert_eq!(bios.program_rom[0].unsigned(), 0xDEAD_BEEF);
        assert_eq!(bios.texture_width, 1);
        assert_eq!(bios.texture_height, 1);
        assert_eq!(&bios.texture_pixels[0..4], &[10, 20, 30, 255]);
        assert_eq!(bios.sound.len(), 1);
        assert_eq!(bios.sound[0].left, 1);
        assert_eq!(bios.sound[0].right, -1);
        assert_eq!(bios.title, "Test");

        fs::remove_file(&path).ok();
    }

    #[test]
    fn rejects_a_cartridge_signature_as_bios() {
        let mut bytes = build_bios_bytes();
        bytes[0..8].copy_from_slice(CARTRIDGE_SIGNATURE);
        let dir = std::env::temp_dir();
        let path = dir.join("v32-test-bios-wrong-kind.bin");
        fs::File::create(&path).unwrap().write_all(&bytes).unwrap();

        let result = load_bios_container(&path);
        assert!(matches!(result, Err(ContainerError::WrongKind { .. })));

        fs::remove_file(&path).ok();
    }

    #[test]
    fn rejects_non_multiple_of_four_file_size() {
        let mut bytes = build_bios_bytes();
        bytes.push(0);
        let dir = std::env::temp_dir();
        let path = dir.join("v32-test-bios-odd-size.bin");
        fs::File::create(&path).unwrap().write_all(&bytes).unwrap();

        let result = load_bios_container(&path);
        assert_eq!(result, Err(ContainerError::NotAMultipleOfFour));

        fs::remove_file(&path).ok();
    }

    #[test]
    fn rejects_discontiguous_sections() {
        let mut bytes = build_bios_bytes();
        // Corrupt the video ROM start offset (bytes 104..108) to no longer
        // follow the program ROM section.
        bytes[104..108].copy_from_slice(&9999u32.to_le_bytes());
        let dir = std::env::temp_dir();
        let path = dir.join("v32-test-bios-discontiguous.bin");
        fs::File::create(&path).unwrap().write_all(&bytes).unwrap();

        let result = load_bios_container(&path);
        assert!(matches!(result, Err(ContainerError::SectionNotContiguous { .. })));

        fs::remove_file(&path).ok();
    }
}
