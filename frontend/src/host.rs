//! The concrete `HostInterface`: forwards drawing/texture calls to the GL
//! renderer, diagnostics to `eprintln!` (matching the teacher's own
//! plain-text logging texture — no logging crate anywhere in the
//! retrieval pack), and memory-card flushes to disk.

use std::cell::RefCell;
use std::path::Path;
use std::rc::Rc;

use chrono::{Datelike, Timelike};
use v32_core::constants::GPU_TEXTURE_SIZE;
use v32_core::host::{BlendingMode, HostInterface, Quad, WallClock};
use v32_core::word::{Color, Word};

use crate::video::Video;

/// Shared handle to the GL renderer: `Console` owns one clone behind its
/// `HostInterface` object, the frame loop keeps the other to call
/// `present` once per frame after `run_next_frame` returns (presenting
/// is a windowing concern outside what `HostInterface` needs to know).
pub type SharedVideo = Rc<RefCell<Video>>;

pub struct SdlHost {
    video: SharedVideo,
    /// Set by `select_texture` just before a matching `load_texture`
    /// call; `None` means the next `load_texture` is the BIOS texture,
    /// whose `id` argument is a placeholder to be ignored.
    pending_texture: Option<usize>,
}

impl SdlHost {
    pub fn new(video: SharedVideo) -> Self {
        Self {
            video,
            pending_texture: Some(0),
        }
    }
}

impl HostInterface for SdlHost {
    fn clear_screen(&mut self, color: Color) {
        self.video.borrow().clear_screen(color);
    }

    fn draw_quad(&mut self, quad: Quad) {
        self.video.borrow().draw_quad(quad);
    }

    fn set_multiply_color(&mut self, color: Color) {
        self.video.borrow_mut().set_multiply_color(color);
    }

    fn set_blending_mode(&mut self, mode: BlendingMode) {
        self.video.borrow().set_blending_mode(mode);
    }

    fn select_texture(&mut self, texture: Option<usize>) {
        self.pending_texture = texture;
    }

    fn load_texture(&mut self, id: usize, pixels: &[u8]) {
        match self.pending_texture {
            None => self.video.borrow_mut().load_bios_texture(GPU_TEXTURE_SIZE, pixels),
            Some(_) => self
                .video
                .borrow_mut()
                .load_texture(id, GPU_TEXTURE_SIZE, pixels),
        }
    }

    fn unload_cartridge_textures(&mut self) {
        self.video.borrow_mut().unload_cartridge_textures();
    }

    fn unload_bios_texture(&mut self) {
        self.video.borrow_mut().unload_bios_texture();
    }

    fn log_line(&mut self, message: &str) {
        eprintln!("[v32] {message}");
    }

    fn throw_exception(&mut self, message: &str) {
        eprintln!("[v32] error: {message}");
    }

    fn wall_clock(&self) -> WallClock {
        let now = chrono::Local::now();
        WallClock {
            year: now.year(),
            day_of_year: now.ordinal() as i32,
            hours: now.hour() as i32,
            minutes: now.minute() as i32,
            seconds: now.second() as i32,
        }
    }

    fn save_memory_card(&mut self, file_name: &str, words: &[Word]) {
        if let Err(e) = v32_machines::write_memory_card_file(Path::new(file_name), words) {
            eprintln!("[v32] failed to save memory card {file_name}: {e}");
        }
    }
}
