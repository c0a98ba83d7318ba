//! The GPU: 18 control-bus ports, a BIOS texture plus up to
//! [`GPU_MAXIMUM_CARTRIDGE_TEXTURES`] cartridge textures, and the
//! textured-quad rasterization command (`spec.md` §4.7). Grounded on
//! `original_source/DesktopEmulator/ConsoleLogic/V32GPU.{hpp,cpp}` and
//! `V32GPUWriters.cpp`.

use crate::constants::{
    GPU_CLEAR_PENALTY, GPU_MAXIMUM_CARTRIDGE_TEXTURES, GPU_REGIONS_PER_TEXTURE,
    GPU_ROTATION_PENALTY, GPU_SCALING_PENALTY, GPU_TEXTURE_SIZE, PIXEL_CAPACITY_PER_FRAME,
    SCREEN_HEIGHT, SCREEN_PIXELS, SCREEN_WIDTH,
};
use crate::host::{BlendingMode, HostInterface, Quad};
use crate::word::{Color, Word};

const LAST_PORT: u32 = 17;
const FIRST_REGION_PORT: u32 = 12;

const COMMAND_CLEAR_SCREEN: i32 = 0x10;
const COMMAND_DRAW_REGION: i32 = 0x11;
const COMMAND_DRAW_REGION_ZOOMED: i32 = 0x12;
const COMMAND_DRAW_REGION_ROTATED: i32 = 0x13;
const COMMAND_DRAW_REGION_ROTOZOOMED: i32 = 0x14;

const BLENDING_ALPHA: i32 = 0x20;
const BLENDING_ADD: i32 = 0x21;
const BLENDING_SUBTRACT: i32 = 0x22;

fn clamp_i32(value: i32, min: i32, max: i32) -> i32 {
    value.clamp(min, max)
}

fn clamp_f32(value: f32, min: f32, max: f32) -> f32 {
    value.clamp(min, max)
}

/// One drawable rectangle within a texture.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct GpuRegion {
    pub min_x: i32,
    pub min_y: i32,
    pub max_x: i32,
    pub max_y: i32,
    pub hotspot_x: i32,
    pub hotspot_y: i32,
}

impl GpuRegion {
    const fn zeroed() -> Self {
        GpuRegion {
            min_x: 0,
            min_y: 0,
            max_x: 0,
            max_y: 0,
            hotspot_x: 0,
            hotspot_y: 0,
        }
    }
}

/// A texture's full set of named regions.
#[derive(Clone, Debug)]
pub struct GpuTexture {
    pub regions: Vec<GpuRegion>,
}

impl GpuTexture {
    fn new() -> Self {
        GpuTexture {
            regions: vec![GpuRegion::zeroed(); GPU_REGIONS_PER_TEXTURE as usize],
        }
    }

    fn reset_regions(&mut self) {
        for region in &mut self.regions {
            *region = GpuRegion::zeroed();
        }
    }
}

/// Raised when a cartridge declares more textures than the GPU can
/// hold; `Console::load_cartridge` aborts the load on this error.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TooManyTexturesError;

impl std::fmt::Display for TooManyTexturesError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "cartridge declares more textures than the GPU supports")
    }
}

impl std::error::Error for TooManyTexturesError {}

/// The GPU device. A `None` `pointed_texture` means the BIOS texture;
/// `Some(index)` is an index into `cartridge_textures` — an index-based
/// cursor rather than the source's raw pointer, so it stays valid
/// across any future reallocation (`spec.md` §9 redesign note).
pub struct Gpu {
    pub bios_texture: GpuTexture,
    pub cartridge_textures: Vec<GpuTexture>,
    loaded_cartridge_textures: usize,

    pointed_texture: Option<usize>,
    pointed_region: usize,

    pub remaining_pixels: i64,
    pub clear_color: Color,
    pub multiply_color: Color,
    pub active_blending: i32,
    pub selected_texture: i32,
    pub selected_region: i32,

    pub drawing_point_x: i32,
    pub drawing_point_y: i32,
    pub drawing_scale_x: f32,
    pub drawing_scale_y: f32,
    pub drawing_angle: f32,
}

impl Gpu {
    pub fn new() -> Self {
        let gpu = Gpu {
            bios_texture: GpuTexture::new(),
            cartridge_textures: (0..GPU_MAXIMUM_CARTRIDGE_TEXTURES)
                .map(|_| GpuTexture::new())
                .collect(),
            loaded_cartridge_textures: 0,
            pointed_texture: None,
            pointed_region: 0,
            remaining_pixels: PIXEL_CAPACITY_PER_FRAME,
            clear_color: Color::rgba(0, 0, 0, 255),
            multiply_color: Color::rgba(255, 255, 255, 255),
            active_blending: BLENDING_ALPHA,
            selected_texture: -1,
            selected_region: 0,
            drawing_point_x: 0,
            drawing_point_y: 0,
            drawing_scale_x: 1.0,
            drawing_scale_y: 1.0,
            drawing_angle: 0.0,
        };
        gpu
    }

    fn pointed_texture(&self) -> &GpuTexture {
        match self.pointed_texture {
            None => &self.bios_texture,
            Some(i) => &self.cartridge_textures[i],
        }
    }

    fn pointed_texture_mut(&mut self) -> &mut GpuTexture {
        match self.pointed_texture {
            None => &mut self.bios_texture,
            Some(i) => &mut self.cartridge_textures[i],
        }
    }

    fn pointed_region(&self) -> &GpuRegion {
        &self.pointed_texture().regions[self.pointed_region]
    }

    fn pointed_region_mut(&mut self) -> &mut GpuRegion {
        &mut self.pointed_texture_mut().regions[self.pointed_region]
    }

    /// Register how many cartridge textures were loaded, after
    /// `host.load_texture` has been called for each. Rejecting the
    /// load here (rather than after partial registration, as the
    /// source does) keeps GPU state untouched on failure.
    pub fn insert_cartridge_textures(
        &mut self,
        count: usize,
    ) -> Result<(), TooManyTexturesError> {
        if count > GPU_MAXIMUM_CARTRIDGE_TEXTURES {
            return Err(TooManyTexturesError);
        }
        self.loaded_cartridge_textures = count;
        Ok(())
    }

    pub fn remove_cartridge_textures(&mut self, host: &mut dyn HostInterface) {
        self.loaded_cartridge_textures = 0;
        host.unload_cartridge_textures();
    }

    pub fn change_frame(&mut self) {
        self.remaining_pixels = PIXEL_CAPACITY_PER_FRAME;
    }

    /// Resets all registers, clears every region of every texture
    /// (including the BIOS texture) to zero, and reselects the BIOS
    /// texture/region 0. The source has an accidental double-write to
    /// `MinX` that leaves `MinY` unreset; `spec.md` §4 [ADD] calls for
    /// the corrected full-zero behavior, which `reset_regions` gives us.
    pub fn reset(&mut self, host: &mut dyn HostInterface) {
        self.remaining_pixels = PIXEL_CAPACITY_PER_FRAME;
        self.drawing_point_x = 0;
        self.drawing_point_y = 0;
        self.drawing_scale_x = 1.0;
        self.drawing_scale_y = 1.0;
        self.drawing_angle = 0.0;

        self.clear_color = Color::rgba(0, 0, 0, 255);
        self.multiply_color = Color::rgba(255, 255, 255, 255);
        self.active_blending = BLENDING_ALPHA;
        self.selected_texture = -1;
        self.selected_region = 0;

        host.select_texture(None);
        host.set_multiply_color(self.multiply_color);
        host.set_blending_mode(BlendingMode::Alpha);

        self.pointed_texture = None;
        self.pointed_region = 0;

        for texture in &mut self.cartridge_textures {
            texture.reset_regions();
        }
        self.bios_texture.reset_regions();

        host.clear_screen(self.clear_color);
    }

    pub fn read_port(&mut self, local_port: u32) -> Option<Word> {
        if local_port > LAST_PORT || local_port == 0 {
            return None;
        }

        if local_port < FIRST_REGION_PORT {
            Some(match local_port {
                1 => Word::from_integer(self.remaining_pixels.clamp(i32::MIN as i64, i32::MAX as i64) as i32),
                2 => Word { as_color: self.clear_color },
                3 => Word { as_color: self.multiply_color },
                4 => Word::from_integer(self.active_blending),
                5 => Word::from_integer(self.selected_texture),
                6 => Word::from_integer(self.selected_region),
                7 => Word::from_integer(self.drawing_point_x),
                8 => Word::from_integer(self.drawing_point_y),
                9 => Word::from_float(self.drawing_scale_x),
                10 => Word::from_float(self.drawing_scale_y),
                11 => Word::from_float(self.drawing_angle),
                _ => unreachable!(),
            })
        } else {
            let region = *self.pointed_region();
            Some(match local_port - FIRST_REGION_PORT {
                0 => Word::from_integer(region.min_x),
                1 => Word::from_integer(region.min_y),
                2 => Word::from_integer(region.max_x),
                3 => Word::from_integer(region.max_y),
                4 => Word::from_integer(region.hotspot_x),
                5 => Word::from_integer(region.hotspot_y),
                _ => unreachable!(),
            })
        }
    }

    pub fn write_port(&mut self, local_port: u32, value: Word, host: &mut dyn HostInterface) -> bool {
        if local_port > LAST_PORT {
            return false;
        }

        match local_port {
            0 => {
                self.dispatch_command(value.integer(), host);
                true
            }
            1 => false, // RemainingPixels is read-only
            2 => {
                self.clear_color = value.color();
                true
            }
            3 => {
                self.multiply_color = value.color();
                host.set_multiply_color(self.multiply_color);
                true
            }
            4 => self.write_active_blending(value.integer(), host),
            5 => self.write_selected_texture(value.integer(), host),
            6 => self.write_selected_region(value.integer()),
            7 => {
                self.drawing_point_x = clamp_i32(value.integer(), -1000, SCREEN_WIDTH as i32 + 1000);
                true
            }
            8 => {
                self.drawing_point_y =
                    clamp_i32(value.integer(), -1000, SCREEN_HEIGHT as i32 + 1000);
                true
            }
            9 => self.write_scale(value, true),
            10 => self.write_scale(value, false),
            11 => {
                let f = value.float();
                if f.is_nan() || f.is_infinite() {
                    return true;
                }
                self.drawing_angle = clamp_f32(f, -1024.0, 1024.0);
                true
            }
            12 => {
                self.pointed_region_mut().min_x =
                    clamp_i32(value.integer(), 0, GPU_TEXTURE_SIZE as i32 - 1);
                true
            }
            13 => {
                self.pointed_region_mut().min_y =
                    clamp_i32(value.integer(), 0, GPU_TEXTURE_SIZE as i32 - 1);
                true
            }
            14 => {
                self.pointed_region_mut().max_x =
                    clamp_i32(value.integer(), 0, GPU_TEXTURE_SIZE as i32 - 1);
                true
            }
            15 => {
                self.pointed_region_mut().max_y =
                    clamp_i32(value.integer(), 0, GPU_TEXTURE_SIZE as i32 - 1);
                true
            }
            16 => {
                self.pointed_region_mut().hotspot_x = clamp_i32(
                    value.integer(),
                    -(GPU_TEXTURE_SIZE as i32),
                    2 * GPU_TEXTURE_SIZE as i32 - 1,
                );
                true
            }
            17 => {
                self.pointed_region_mut().hotspot_y = clamp_i32(
                    value.integer(),
                    -(GPU_TEXTURE_SIZE as i32),
                    2 * GPU_TEXTURE_SIZE as i32 - 1,
                );
                true
            }
            _ => false,
        }
    }

    fn write_scale(&mut self, value: Word, is_x: bool) -> bool {
        let f = value.float();
        if f.is_nan() || f.is_infinite() {
            return true;
        }
        let clamped = clamp_f32(f, -1024.0, 1024.0);
        if is_x {
            self.drawing_scale_x = clamped;
        } else {
            self.drawing_scale_y = clamped;
        }
        true
    }

    fn write_active_blending(&mut self, raw: i32, host: &mut dyn HostInterface) -> bool {
        let mode = match raw {
            BLENDING_ALPHA => BlendingMode::Alpha,
            BLENDING_ADD => BlendingMode::Add,
            BLENDING_SUBTRACT => BlendingMode::Subtract,
            // Unknown blending codes are silently ignored: no state
            // change, no callback (`spec.md` §9 Open Question (a)).
            _ => return true,
        };
        self.active_blending = raw;
        host.set_blending_mode(mode);
        true
    }

    fn write_selected_texture(&mut self, raw: i32, host: &mut dyn HostInterface) -> bool {
        if raw < -1 || raw >= self.loaded_cartridge_textures as i32 {
            return true;
        }
        self.selected_texture = raw;
        host.select_texture(if raw == -1 { None } else { Some(raw as usize) });

        self.pointed_texture = if raw == -1 { None } else { Some(raw as usize) };
        self.pointed_region = self.selected_region as usize;
        true
    }

    fn write_selected_region(&mut self, raw: i32) -> bool {
        if raw < 0 || raw >= GPU_REGIONS_PER_TEXTURE as i32 {
            return true;
        }
        self.selected_region = raw;
        self.pointed_region = raw as usize;
        true
    }

    fn dispatch_command(&mut self, command: i32, host: &mut dyn HostInterface) {
        match command {
            COMMAND_CLEAR_SCREEN => self.clear_screen(host),
            COMMAND_DRAW_REGION => self.draw_region(false, false, host),
            COMMAND_DRAW_REGION_ZOOMED => self.draw_region(true, false, host),
            COMMAND_DRAW_REGION_ROTATED => self.draw_region(false, true, host),
            COMMAND_DRAW_REGION_ROTOZOOMED => self.draw_region(true, true, host),
            // Unknown command codes are ignored without error.
            _ => {}
        }
    }

    pub fn clear_screen(&mut self, host: &mut dyn HostInterface) {
        if self.remaining_pixels < 0 {
            return;
        }

        let needed = SCREEN_PIXELS as i64 * (1 + GPU_CLEAR_PENALTY);
        self.remaining_pixels -= needed;

        if self.remaining_pixels < 0 {
            self.remaining_pixels = -1;
            return;
        }

        host.clear_screen(self.clear_color);
    }

    /// One method services all 4 draw-region command variants, varying
    /// only which transforms are enabled (`spec.md` §4.7).
    pub fn draw_region(&mut self, scaling: bool, rotation: bool, host: &mut dyn HostInterface) {
        if self.remaining_pixels < 0 {
            return;
        }

        let region = *self.pointed_region();
        let region_width = (region.max_x - region.min_x).abs() + 1;
        let region_height = (region.max_y - region.min_y).abs() + 1;

        let mut render_width = region_width as f32;
        let mut render_height = region_height as f32;

        if scaling {
            render_width *= self.drawing_scale_x.abs();
            render_height *= self.drawing_scale_y.abs();
        }

        let effective_width = (render_width as i32).min(SCREEN_WIDTH as i32);
        let effective_height = (render_height as i32).min(SCREEN_HEIGHT as i32);

        let mut cost_factor = 1i64;
        if scaling {
            cost_factor += GPU_SCALING_PENALTY;
        }
        if rotation {
            cost_factor += GPU_ROTATION_PENALTY;
        }

        let needed = cost_factor * effective_width as i64 * effective_height as i64;
        self.remaining_pixels -= needed;

        if self.remaining_pixels < 0 {
            self.remaining_pixels = -1;
            return;
        }

        let mut texture_min_x = region.min_x as f32 + 0.5;
        let mut texture_max_x = region.max_x as f32 + 0.5;
        let mut texture_min_y = region.min_y as f32 + 0.5;
        let mut texture_max_y = region.max_y as f32 + 0.5;

        if scaling {
            if self.drawing_scale_x.abs() > 1.0 {
                let correction = 0.5 - 1.0 / (2.0 * self.drawing_scale_x.abs());
                if texture_min_x < texture_max_x {
                    texture_min_x -= correction;
                    texture_max_x += correction;
                } else {
                    texture_max_x -= correction;
                    texture_min_x += correction;
                }
            }
            if self.drawing_scale_y.abs() > 1.0 {
                let correction = 0.5 - 1.0 / (2.0 * self.drawing_scale_y.abs());
                if texture_min_y < texture_max_y {
                    texture_min_y -= correction;
                    texture_max_y += correction;
                } else {
                    texture_max_y -= correction;
                    texture_min_y += correction;
                }
            }
        }

        texture_min_x /= GPU_TEXTURE_SIZE as f32;
        texture_max_x /= GPU_TEXTURE_SIZE as f32;
        texture_min_y /= GPU_TEXTURE_SIZE as f32;
        texture_max_y /= GPU_TEXTURE_SIZE as f32;

        let relative_min_x = (region.min_x - region.hotspot_x) as f32;
        let relative_min_y = (region.min_y - region.hotspot_y) as f32;
        let relative_max_x = relative_min_x + region_width as f32;
        let relative_max_y = relative_min_y + region_height as f32;

        let mut vertices = [
            (relative_min_x, relative_min_y),
            (relative_max_x, relative_min_y),
            (relative_min_x, relative_max_y),
            (relative_max_x, relative_max_y),
        ];
        let tex_coords = [
            (texture_min_x, texture_min_y),
            (texture_max_x, texture_min_y),
            (texture_min_x, texture_max_y),
            (texture_max_x, texture_max_y),
        ];

        let (angle_cos, angle_sin) = if rotation {
            (self.drawing_angle.cos(), self.drawing_angle.sin())
        } else {
            (1.0, 0.0)
        };

        for vertex in &mut vertices {
            let (mut x, mut y) = *vertex;

            if scaling {
                x *= self.drawing_scale_x;
                y *= self.drawing_scale_y;
            }

            if rotation {
                let (cx, cy) = (x, y);
                x = cx * angle_cos - cy * angle_sin;
                y = cx * angle_sin + cy * angle_cos;
            }

            x += self.drawing_point_x as f32;
            y += self.drawing_point_y as f32;

            // A quirk of the original rasterizer: negative scaling
            // displaces images by 1 pixel, corrected here after every
            // other transform.
            if scaling {
                if self.drawing_scale_x < 0.0 {
                    x += 1.0;
                }
                if self.drawing_scale_y < 0.0 {
                    y += 1.0;
                }
            }

            *vertex = (x, y);
        }

        host.select_texture(if self.selected_texture == -1 {
            None
        } else {
            Some(self.selected_texture as usize)
        });
        host.draw_quad(Quad {
            vertices,
            tex_coords,
            texture: if self.selected_texture == -1 {
                None
            } else {
                Some(self.selected_texture as usize)
            },
        });
    }
}

impl Default for Gpu {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::NullHost;

    #[test]
    fn reset_zeroes_every_region_fully() {
        let mut gpu = Gpu::new();
        gpu.bios_texture.regions[5].min_x = 7;
        gpu.bios_texture.regions[5].min_y = 9;
        gpu.cartridge_textures[0].regions[3].max_y = 42;

        let mut host = NullHost::default();
        gpu.reset(&mut host);

        assert_eq!(gpu.bios_texture.regions[5].min_x, 0);
        assert_eq!(gpu.bios_texture.regions[5].min_y, 0);
        assert_eq!(gpu.cartridge_textures[0].regions[3].max_y, 0);
    }

    #[test]
    fn unknown_blending_code_is_silently_ignored() {
        let mut gpu = Gpu::new();
        let mut host = NullHost::default();
        let before = gpu.active_blending;
        let accepted = gpu.write_port(4, Word::from_integer(0x99), &mut host);
        assert!(accepted);
        assert_eq!(gpu.active_blending, before);
        assert!(host.logged.is_empty());
    }

    #[test]
    fn scale_write_rejects_nan_and_infinity() {
        let mut gpu = Gpu::new();
        let mut host = NullHost::default();
        gpu.write_port(9, Word::from_float(f32::NAN), &mut host);
        assert_eq!(gpu.drawing_scale_x, 1.0);
        gpu.write_port(9, Word::from_float(f32::INFINITY), &mut host);
        assert_eq!(gpu.drawing_scale_x, 1.0);
    }

    #[test]
    fn remaining_pixels_is_read_only() {
        let mut gpu = Gpu::new();
        let mut host = NullHost::default();
        let accepted = gpu.write_port(1, Word::from_integer(0), &mut host);
        assert!(!accepted);
    }

    #[test]
    fn clear_screen_latches_overflow_to_negative_one() {
        let mut gpu = Gpu::new();
        let mut host = NullHost::default();
        gpu.remaining_pixels = 10;
        gpu.clear_screen(&mut host);
        assert_eq!(gpu.remaining_pixels, -1);

        // further draws are rejected once latched
        gpu.clear_screen(&mut host);
        assert_eq!(gpu.remaining_pixels, -1);
    }

    #[test]
    fn selecting_texture_out_of_range_is_ignored() {
        let mut gpu = Gpu::new();
        let mut host = NullHost::default();
        let before = gpu.selected_texture;
        gpu.write_port(5, Word::from_integer(999_999), &mut host);
        assert_eq!(gpu.selected_texture, before);
    }

    #[test]
    fn insert_cartridge_textures_rejects_overflow() {
        let mut gpu = Gpu::new();
        assert!(gpu.insert_cartridge_textures(GPU_MAXIMUM_CARTRIDGE_TEXTURES + 1).is_err());
        assert!(gpu.insert_cartridge_textures(GPU_MAXIMUM_CARTRIDGE_TEXTURES).is_ok());
    }

    #[derive(Default)]
    struct CountingHost {
        clears: u32,
        draws: u32,
    }

    impl HostInterface for CountingHost {
        fn clear_screen(&mut self, _color: Color) {
            self.clears += 1;
        }
        fn draw_quad(&mut self, _quad: Quad) {
            self.draws += 1;
        }
        fn set_multiply_color(&mut self, _color: Color) {}
        fn set_blending_mode(&mut self, _mode: crate::host::BlendingMode) {}
        fn select_texture(&mut self, _texture: Option<usize>) {}
        fn load_texture(&mut self, _id: usize, _pixels: &[u8]) {}
        fn unload_cartridge_textures(&mut self) {}
        fn unload_bios_texture(&mut self) {}
        fn log_line(&mut self, _message: &str) {}
        fn throw_exception(&mut self, _message: &str) {}
        fn wall_clock(&self) -> crate::host::WallClock {
            crate::host::WallClock {
                year: 0,
                day_of_year: 0,
                hours: 0,
                minutes: 0,
                seconds: 0,
            }
        }
        fn save_memory_card(&mut self, _file_name: &str, _words: &[Word]) {}
    }

    /// `spec.md` §8 end-to-end scenario 4: a full-screen clear followed by
    /// as many full-screen (unscaled, unrotated) draws as the per-frame
    /// pixel budget allows.
    #[test]
    fn pixel_budget_caps_draws_after_a_clear() {
        let mut gpu = Gpu::new();
        let mut host = CountingHost::default();

        gpu.write_port(12, Word::from_integer(0), &mut host); // RegionMinX
        gpu.write_port(13, Word::from_integer(0), &mut host); // RegionMinY
        gpu.write_port(14, Word::from_integer(SCREEN_WIDTH as i32 - 1), &mut host); // RegionMaxX
        gpu.write_port(15, Word::from_integer(SCREEN_HEIGHT as i32 - 1), &mut host); // RegionMaxY

        gpu.clear_screen(&mut host);
        assert_eq!(host.clears, 1);

        for _ in 0..1000 {
            gpu.draw_region(false, false, &mut host);
        }

        let expected = (PIXEL_CAPACITY_PER_FRAME / SCREEN_PIXELS as i64) - 1;
        assert_eq!(host.draws as i64, expected);
        assert_eq!(gpu.remaining_pixels, -1);
    }
}
