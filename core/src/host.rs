//! The capability object injected into [`Console`](crate::console::Console)
//! at construction, replacing the source's process-wide callback function
//! pointers (`Callbacks::*` in `original_source/`) with an explicit trait
//! object. This is also what makes test doubles for the GPU/SPU/loader
//! side effects trivial.

use crate::word::{Color, Word};

/// A wall-clock snapshot, taken once on [`Console::reset`](crate::console::Console::reset)
/// and fed to the [`Timer`](crate::device::Timer) exactly as `original_source`'s
/// `V32Console::Reset` reads the host OS clock.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct WallClock {
    pub year: i32,
    pub day_of_year: i32,
    pub hours: i32,
    pub minutes: i32,
    pub seconds: i32,
}

/// A 4-vertex textured quad, the GPU's sole drawing primitive.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Quad {
    /// Screen-space vertex positions, in emission order (top-left,
    /// top-right, bottom-right, bottom-left after the region's own
    /// winding is applied).
    pub vertices: [(f32, f32); 4],
    /// Normalized (0..1) texture coordinates for each vertex, same order.
    pub tex_coords: [(f32, f32); 4],
    /// Which loaded texture (BIOS texture is `None`) to sample.
    pub texture: Option<usize>,
}

/// Blending mode for subsequent draws, mirrors the GPU's `ActiveBlending`
/// register.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BlendingMode {
    Alpha,
    Add,
    Subtract,
}

/// Host-supplied collaborator for everything the core must not know how
/// to do itself: drawing, texture residency, and diagnostic logging. The
/// core invokes these without null checks, matching `spec.md` §6 — a
/// `HostInterface` is mandatory to construct a `Console`.
pub trait HostInterface {
    /// Clear the screen to `color`, paying the clear-screen pixel cost.
    fn clear_screen(&mut self, color: Color);

    /// Emit one textured quad.
    fn draw_quad(&mut self, quad: Quad);

    /// Set the multiply (tint) color applied to subsequent draws.
    fn set_multiply_color(&mut self, color: Color);

    /// Set the active blending mode for subsequent draws.
    fn set_blending_mode(&mut self, mode: BlendingMode);

    /// Notify the host which texture id (or `None` for BIOS) is now
    /// selected, ahead of any `load_texture` calls for it.
    fn select_texture(&mut self, texture: Option<usize>);

    /// Upload `pixels` (RGBA8, row-major, already padded to
    /// `GPU_TEXTURE_SIZE` square) as texture `id`.
    fn load_texture(&mut self, id: usize, pixels: &[u8]);

    /// Release all cartridge textures (called on cartridge unload/reset).
    fn unload_cartridge_textures(&mut self);

    /// Release the BIOS texture (called on BIOS unload).
    fn unload_bios_texture(&mut self);

    /// A diagnostic line from the core. The reference frontend forwards
    /// this to `eprintln!`, matching the teacher's own plain-text logging
    /// texture (no logging crate anywhere in the retrieval pack).
    fn log_line(&mut self, message: &str);

    /// An unrecoverable failure during a load operation. Must abort the
    /// load that triggered it; the core has already rolled back any
    /// partial state by the time this is called.
    fn throw_exception(&mut self, message: &str);

    /// The current wall-clock reading, read on every [`Console::reset`](crate::console::Console::reset)
    /// and handed to the timer. Kept behind the host boundary so the
    /// core never touches `std::time` or OS clocks itself.
    fn wall_clock(&self) -> WallClock;

    /// Flush `words` to the memory card's backing file (`file_name`,
    /// as passed to [`Console::load_memory_card`](crate::console::Console::load_memory_card)
    /// or [`Console::create_memory_card`](crate::console::Console::create_memory_card)).
    /// Called automatically at the end of every frame in which the card
    /// was written, per `spec.md` §5 "Memory-card flush happens after
    /// the cycle loop but before `run_next_frame` returns."
    fn save_memory_card(&mut self, file_name: &str, words: &[Word]);
}

/// A [`HostInterface`] that discards everything. Useful for CPU/GPU/SPU
/// unit tests that don't care about presentation side effects.
#[derive(Default)]
pub struct NullHost {
    pub logged: Vec<String>,
    pub exceptions: Vec<String>,
}

impl HostInterface for NullHost {
    fn clear_screen(&mut self, _color: Color) {}
    fn draw_quad(&mut self, _quad: Quad) {}
    fn set_multiply_color(&mut self, _color: Color) {}
    fn set_blending_mode(&mut self, _mode: BlendingMode) {}
    fn select_texture(&mut self, _texture: Option<usize>) {}
    fn load_texture(&mut self, _id: usize, _pixels: &[u8]) {}
    fn unload_cartridge_textures(&mut self) {}
    fn unload_bios_texture(&mut self) {}

    fn log_line(&mut self, message: &str) {
        self.logged.push(message.to_string());
    }

    fn throw_exception(&mut self, message: &str) {
        self.exceptions.push(message.to_string());
    }

    fn wall_clock(&self) -> WallClock {
        WallClock {
            year: 0,
            day_of_year: 0,
            hours: 0,
            minutes: 0,
            seconds: 0,
        }
    }

    fn save_memory_card(&mut self, _file_name: &str, _words: &[Word]) {}
}
