//! Fixed sizes and addresses from `spec.md` §3, taken from
//! `original_source/VirconDefinitions/Constants.hpp` where the
//! distilled spec left them implicit.

/// Base address of the RAM slot in the global memory map.
pub const RAM_FIRST: u32 = 0x0000_0000;
/// RAM size in words (4 MB).
pub const RAM_SIZE: u32 = 1_000_000;

/// Base address of the BIOS program ROM slot.
pub const BIOS_PROGRAM_ROM_FIRST: u32 = 0x1000_0000;
/// Maximum BIOS program ROM size in words.
pub const BIOS_PROGRAM_ROM_SIZE: u32 = 150_000;

/// Base address of the cartridge program ROM slot.
pub const CARTRIDGE_PROGRAM_ROM_FIRST: u32 = 0x2000_0000;
/// Maximum cartridge program ROM size in words.
pub const CARTRIDGE_PROGRAM_ROM_SIZE: u32 = 15_000_000;

/// Base address of the memory card slot.
pub const MEMORY_CARD_FIRST: u32 = 0x3000_0000;
/// Memory card size in words.
pub const MEMORY_CARD_SIZE: u32 = 150_000;

/// Texels per side of every GPU texture (BIOS and cartridge).
pub const GPU_TEXTURE_SIZE: u32 = 1024;
/// Maximum number of regions defined per texture.
pub const GPU_REGIONS_PER_TEXTURE: u32 = 1000;
/// Maximum number of textures a cartridge may define.
pub const GPU_MAXIMUM_CARTRIDGE_TEXTURES: usize = 256;

/// Maximum number of sounds a cartridge may define.
pub const SPU_MAXIMUM_CARTRIDGE_SOUNDS: usize = 1024;
/// Maximum total sound samples (BIOS or summed across a cartridge's sounds).
pub const SPU_MAXIMUM_CARTRIDGE_SAMPLES: u32 = 256_000_000;
/// Number of simultaneous playback channels.
pub const SPU_SOUND_CHANNELS: usize = 16;

/// Native screen width in pixels.
pub const SCREEN_WIDTH: u32 = 640;
/// Native screen height in pixels.
pub const SCREEN_HEIGHT: u32 = 360;
/// Native screen pixel count.
pub const SCREEN_PIXELS: u32 = SCREEN_WIDTH * SCREEN_HEIGHT;
/// Pixel-drawing budget available per frame (two full screens).
pub const PIXEL_CAPACITY_PER_FRAME: i64 = 2 * SCREEN_PIXELS as i64;
/// Per-pixel cost multiplier contribution from scaling.
pub const GPU_SCALING_PENALTY: i64 = 1;
/// Per-pixel cost multiplier contribution from rotation.
pub const GPU_ROTATION_PENALTY: i64 = 1;
/// Per-pixel cost multiplier contribution from a full-screen clear.
pub const GPU_CLEAR_PENALTY: i64 = 0;

/// CPU cycles (instructions) of headroom executed per frame.
pub const CYCLES_PER_FRAME: u32 = 500_000;

/// SPU output sampling rate in Hz.
pub const SPU_SAMPLING_RATE: u32 = 44100;
/// Samples produced per video frame at 60 Hz (44100 / 60).
pub const BUFFER_SAMPLES: usize = 735;
/// Minimum number of buffers kept in the playback ring.
pub const MIN_BUFFERS: usize = 4;
/// Maximum number of buffers kept in the playback ring.
pub const MAX_BUFFERS: usize = 6;

/// Number of gamepad ports.
pub const GAMEPAD_PORTS: usize = 4;
