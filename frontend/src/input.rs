//! Keyboard-to-gamepad mapping. V32 has a fixed 4-port, 11-control
//! gamepad surface (`GamepadControl`), unlike the teacher's per-machine
//! named button list, so the default map binds one keyboard layout to
//! port 0 rather than doing name-based matching against a button list.

use std::collections::HashMap;

use sdl2::keyboard::Scancode;
use v32_core::device::input::GamepadControl;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Binding {
    pub port: usize,
    pub control: GamepadControl,
}

pub struct KeyMap {
    map: HashMap<Scancode, Binding>,
}

impl KeyMap {
    pub fn new() -> Self {
        Self {
            map: HashMap::new(),
        }
    }

    pub fn bind(&mut self, scancode: Scancode, port: usize, control: GamepadControl) {
        self.map.insert(scancode, Binding { port, control });
    }

    pub fn get(&self, scancode: Scancode) -> Option<Binding> {
        self.map.get(&scancode).copied()
    }
}

impl Default for KeyMap {
    fn default() -> Self {
        default_key_map()
    }
}

/// Binds gamepad port 0 to arrow keys, Enter and a keyboard cluster
/// around Z/X/A/S/Q/W. Additional ports are reachable only through a
/// real gamepad, wired up the same way once `sdl2::controller` support
/// is added; out of scope for this reference frontend.
pub fn default_key_map() -> KeyMap {
    let mut km = KeyMap::new();

    let port0 = [
        (Scancode::Left, GamepadControl::Left),
        (Scancode::Right, GamepadControl::Right),
        (Scancode::Up, GamepadControl::Up),
        (Scancode::Down, GamepadControl::Down),
        (Scancode::Return, GamepadControl::Start),
        (Scancode::Z, GamepadControl::A),
        (Scancode::X, GamepadControl::B),
        (Scancode::A, GamepadControl::X),
        (Scancode::S, GamepadControl::Y),
        (Scancode::Q, GamepadControl::L),
        (Scancode::W, GamepadControl::R),
    ];
    for (scancode, control) in port0 {
        km.bind(scancode, 0, control);
    }

    km
}
