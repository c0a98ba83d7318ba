//! The frame loop: poll SDL events into gamepad input, run one console
//! frame, present what the GPU drew, pace to 60 Hz via vsync.

use sdl2::event::Event;
use sdl2::keyboard::Scancode;
use v32_core::console::Console;

use crate::host::SharedVideo;
use crate::input::KeyMap;

pub fn run(console: &mut Console, sdl_context: &sdl2::Sdl, video: &SharedVideo, key_map: &KeyMap) {
    let mut event_pump = sdl_context.event_pump().expect("Failed to get event pump");

    'main: loop {
        for event in event_pump.poll_iter() {
            match event {
                Event::Quit { .. } => break 'main,

                Event::KeyDown {
                    scancode: Some(Scancode::Escape),
                    ..
                } => break 'main,

                Event::Window {
                    win_event: sdl2::event::WindowEvent::Resized(w, h),
                    ..
                } => {
                    video.borrow_mut().resize(w as u32, h as u32);
                }

                Event::KeyDown {
                    scancode: Some(sc),
                    repeat: false,
                    ..
                } => {
                    if let Some(binding) = key_map.get(sc) {
                        console.set_gamepad_control(binding.port, binding.control, true);
                    }
                }

                Event::KeyUp {
                    scancode: Some(sc), ..
                } => {
                    if let Some(binding) = key_map.get(sc) {
                        console.set_gamepad_control(binding.port, binding.control, false);
                    }
                }

                _ => {}
            }
        }

        video.borrow().begin_frame();
        console.run_next_frame();
        video.borrow_mut().present();
    }
}
