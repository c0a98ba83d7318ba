//! GL window and immediate-mode quad renderer.
//!
//! The GPU's drawing primitive is a transformed textured quad
//! (`v32_core::host::Quad`), not a pixel framebuffer, so unlike a
//! framebuffer-streaming presenter this renders every `draw_quad` call
//! as it arrives during `Console::run_next_frame` and only swaps the
//! window at the end of the frame.

use std::collections::HashMap;

use gl::types::{GLint, GLuint};
use sdl2::video::{GLContext, GLProfile, Window};
use v32_core::host::{BlendingMode, Quad};
use v32_core::word::Color;

pub struct Video {
    window: Window,
    _gl_context: GLContext,
    width: u32,
    height: u32,
    textures: HashMap<Option<usize>, GLuint>,
    multiply_color: Color,
}

impl Video {
    /// Create an SDL window with a GL context sized for `native_width` x
    /// `native_height` at the given integer `scale`.
    pub fn new(
        sdl_video: &sdl2::VideoSubsystem,
        title: &str,
        native_width: u32,
        native_height: u32,
        scale: u32,
    ) -> Self {
        let gl_attr = sdl_video.gl_attr();
        gl_attr.set_context_profile(GLProfile::Compatibility);
        gl_attr.set_context_version(2, 1);
        gl_attr.set_double_buffer(true);

        let window = sdl_video
            .window(title, native_width * scale, native_height * scale)
            .position_centered()
            .opengl()
            .resizable()
            .build()
            .expect("Failed to create window");

        let gl_context = window
            .gl_create_context()
            .expect("Failed to create GL context");
        gl::load_with(|s| sdl_video.gl_get_proc_address(s) as *const _);
        window
            .subsystem()
            .gl_set_swap_interval(sdl2::video::SwapInterval::VSync)
            .ok();

        unsafe {
            gl::Enable(gl::TEXTURE_2D);
            gl::Enable(gl::BLEND);
            gl::ClearColor(0.0, 0.0, 0.0, 1.0);
            gl::Viewport(0, 0, (native_width * scale) as i32, (native_height * scale) as i32);
        }

        Self {
            window,
            _gl_context: gl_context,
            width: native_width,
            height: native_height,
            textures: HashMap::new(),
            multiply_color: Color { r: 255, g: 255, b: 255, a: 255 },
        }
    }

    /// Re-applies the viewport and projection after a window resize.
    pub fn resize(&mut self, width: u32, height: u32) {
        unsafe {
            gl::Viewport(0, 0, width as i32, height as i32);
        }
        self.set_projection();
    }

    fn set_projection(&self) {
        unsafe {
            gl::MatrixMode(gl::PROJECTION);
            gl::LoadIdentity();
            // Native-resolution orthographic projection; SDL scales the
            // default window framebuffer up to the actual drawable size.
            gl::Ortho(0.0, self.width as f64, self.height as f64, 0.0, -1.0, 1.0);
            gl::MatrixMode(gl::MODELVIEW);
            gl::LoadIdentity();
        }
    }

    /// Begin a frame: bind the native-resolution projection and clear
    /// whatever the GPU didn't already clear via `clear_screen`.
    pub fn begin_frame(&self) {
        self.set_projection();
    }

    pub fn clear_screen(&self, color: Color) {
        unsafe {
            gl::ClearColor(
                color.r as f32 / 255.0,
                color.g as f32 / 255.0,
                color.b as f32 / 255.0,
                color.a as f32 / 255.0,
            );
            gl::Clear(gl::COLOR_BUFFER_BIT);
        }
    }

    pub fn set_multiply_color(&mut self, color: Color) {
        self.multiply_color = color;
    }

    pub fn set_blending_mode(&self, mode: BlendingMode) {
        unsafe {
            match mode {
                BlendingMode::Alpha => {
                    gl::BlendEquation(gl::FUNC_ADD);
                    gl::BlendFunc(gl::SRC_ALPHA, gl::ONE_MINUS_SRC_ALPHA);
                }
                BlendingMode::Add => {
                    gl::BlendEquation(gl::FUNC_ADD);
                    gl::BlendFunc(gl::SRC_ALPHA, gl::ONE);
                }
                BlendingMode::Subtract => {
                    gl::BlendEquation(gl::FUNC_REVERSE_SUBTRACT);
                    gl::BlendFunc(gl::SRC_ALPHA, gl::ONE);
                }
            }
        }
    }

    pub fn load_texture(&mut self, id: usize, size: u32, pixels: &[u8]) {
        self.load_texture_keyed(Some(id), size, pixels);
    }

    pub fn load_bios_texture(&mut self, size: u32, pixels: &[u8]) {
        self.load_texture_keyed(None, size, pixels);
    }

    fn load_texture_keyed(&mut self, key: Option<usize>, size: u32, pixels: &[u8]) {
        let mut name: GLuint = 0;
        unsafe {
            gl::GenTextures(1, &mut name);
            gl::BindTexture(gl::TEXTURE_2D, name);
            gl::TexParameteri(gl::TEXTURE_2D, gl::TEXTURE_MIN_FILTER, gl::NEAREST as GLint);
            gl::TexParameteri(gl::TEXTURE_2D, gl::TEXTURE_MAG_FILTER, gl::NEAREST as GLint);
            gl::TexParameteri(gl::TEXTURE_2D, gl::TEXTURE_WRAP_S, gl::CLAMP_TO_EDGE as GLint);
            gl::TexParameteri(gl::TEXTURE_2D, gl::TEXTURE_WRAP_T, gl::CLAMP_TO_EDGE as GLint);
            gl::TexImage2D(
                gl::TEXTURE_2D,
                0,
                gl::RGBA as GLint,
                size as i32,
                size as i32,
                0,
                gl::RGBA,
                gl::UNSIGNED_BYTE,
                pixels.as_ptr() as *const _,
            );
        }
        if let Some(old) = self.textures.insert(key, name) {
            unsafe { gl::DeleteTextures(1, &old) };
        }
    }

    pub fn unload_cartridge_textures(&mut self) {
        let keys: Vec<Option<usize>> = self
            .textures
            .keys()
            .filter(|k| k.is_some())
            .copied()
            .collect();
        for key in keys {
            if let Some(name) = self.textures.remove(&key) {
                unsafe { gl::DeleteTextures(1, &name) };
            }
        }
    }

    pub fn unload_bios_texture(&mut self) {
        if let Some(name) = self.textures.remove(&None) {
            unsafe { gl::DeleteTextures(1, &name) };
        }
    }

    pub fn draw_quad(&self, quad: Quad) {
        unsafe {
            match self.textures.get(&quad.texture) {
                Some(&name) => gl::BindTexture(gl::TEXTURE_2D, name),
                None => return,
            }
            gl::Color4ub(
                self.multiply_color.r,
                self.multiply_color.g,
                self.multiply_color.b,
                self.multiply_color.a,
            );
            gl::Begin(gl::TRIANGLE_FAN);
            for i in 0..4 {
                let (u, v) = quad.tex_coords[i];
                let (x, y) = quad.vertices[i];
                gl::TexCoord2f(u, v);
                gl::Vertex2f(x, y);
            }
            gl::End();
        }
    }

    /// Swap the window's front/back buffers, presenting everything
    /// drawn this frame.
    pub fn present(&mut self) {
        self.window.gl_swap_window();
    }
}
