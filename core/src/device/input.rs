//! 4 gamepads x 12 boolean controls, real-time vs. sampled state
//! (`spec.md` §4.9).

use crate::bus::PortSlave;
use crate::word::Word;

pub const GAMEPAD_PORTS: usize = 4;

const SELECTED_GAMEPAD: u32 = 0;
const LAST_PORT: u32 = 12;

/// One gamepad's full control state, ordered to match the port
/// enumeration starting right after `SelectedGamepad`.
#[derive(Clone, Copy, Default, Debug, PartialEq, Eq)]
pub struct GamepadState {
    pub connected: bool,
    pub left: bool,
    pub right: bool,
    pub up: bool,
    pub down: bool,
    pub start: bool,
    pub a: bool,
    pub b: bool,
    pub x: bool,
    pub y: bool,
    pub l: bool,
    pub r: bool,
}

impl GamepadState {
    fn field(&self, index: u32) -> bool {
        match index {
            0 => self.connected,
            1 => self.left,
            2 => self.right,
            3 => self.up,
            4 => self.down,
            5 => self.start,
            6 => self.a,
            7 => self.b,
            8 => self.x,
            9 => self.y,
            10 => self.l,
            11 => self.r,
            _ => false,
        }
    }

    fn field_mut(&mut self, index: u32) -> &mut bool {
        match index {
            0 => &mut self.connected,
            1 => &mut self.left,
            2 => &mut self.right,
            3 => &mut self.up,
            4 => &mut self.down,
            5 => &mut self.start,
            6 => &mut self.a,
            7 => &mut self.b,
            8 => &mut self.x,
            9 => &mut self.y,
            10 => &mut self.l,
            11 => &mut self.r,
            _ => panic!("invalid gamepad control index {index}"),
        }
    }
}

/// Which boolean control a host input event targets.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GamepadControl {
    Left,
    Right,
    Up,
    Down,
    Start,
    A,
    B,
    X,
    Y,
    L,
    R,
}

impl GamepadControl {
    fn field_index(self) -> u32 {
        match self {
            GamepadControl::Left => 1,
            GamepadControl::Right => 2,
            GamepadControl::Up => 3,
            GamepadControl::Down => 4,
            GamepadControl::Start => 5,
            GamepadControl::A => 6,
            GamepadControl::B => 7,
            GamepadControl::X => 8,
            GamepadControl::Y => 9,
            GamepadControl::L => 10,
            GamepadControl::R => 11,
        }
    }
}

pub struct GamepadController {
    selected_gamepad: i32,
    real_time: [GamepadState; GAMEPAD_PORTS],
    provided: [GamepadState; GAMEPAD_PORTS],
}

impl GamepadController {
    pub fn new() -> Self {
        GamepadController {
            selected_gamepad: 0,
            real_time: [GamepadState::default(); GAMEPAD_PORTS],
            provided: [GamepadState::default(); GAMEPAD_PORTS],
        }
    }

    /// Host input event: a gamepad was connected or disconnected.
    pub fn set_gamepad_connection(&mut self, port: usize, connected: bool) {
        if let Some(state) = self.real_time.get_mut(port) {
            if !connected {
                *state = GamepadState::default();
            }
            state.connected = connected;
        }
    }

    /// Host input event: a control was pressed or released.
    pub fn set_gamepad_control(&mut self, port: usize, control: GamepadControl, pressed: bool) {
        if let Some(state) = self.real_time.get_mut(port) {
            *state.field_mut(control.field_index()) = pressed;
        }
    }

    pub fn has_gamepad(&self, port: usize) -> bool {
        self.real_time.get(port).is_some_and(|s| s.connected)
    }

    /// Snapshot real-time state into the CPU-visible provided state.
    pub fn change_frame(&mut self) {
        self.provided = self.real_time;
    }

    pub fn reset(&mut self) {
        self.real_time = [GamepadState::default(); GAMEPAD_PORTS];
        self.provided = [GamepadState::default(); GAMEPAD_PORTS];
        self.selected_gamepad = 0;
    }
}

impl Default for GamepadController {
    fn default() -> Self {
        Self::new()
    }
}

impl PortSlave for GamepadController {
    fn read_port(&mut self, local_port: u32) -> Option<Word> {
        if local_port > LAST_PORT {
            return None;
        }

        if local_port == SELECTED_GAMEPAD {
            return Some(Word::from_integer(self.selected_gamepad));
        }

        let state = self.provided[self.selected_gamepad as usize];
        Some(Word::from_integer(state.field(local_port - 1) as i32))
    }

    fn write_port(&mut self, local_port: u32, value: Word) -> bool {
        if local_port > LAST_PORT {
            return false;
        }

        if local_port != SELECTED_GAMEPAD {
            // control readouts are host-driven, not CPU-writable
            return false;
        }

        let mut requested = value.integer();
        requested = requested.clamp(0, GAMEPAD_PORTS as i32 - 1);
        self.selected_gamepad = requested;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn change_frame_snapshots_real_time_into_provided() {
        let mut input = GamepadController::new();
        input.set_gamepad_connection(0, true);
        input.set_gamepad_control(0, GamepadControl::Left, true);

        // not yet visible to the CPU
        assert_eq!(
            input.read_port(1 + GamepadControl::Left.field_index() - 1),
            Some(Word::from_integer(0))
        );

        input.change_frame();
        assert_eq!(
            input
                .read_port(1 + GamepadControl::Left.field_index() - 1)
                .unwrap()
                .integer(),
            1
        );
    }

    #[test]
    fn selected_gamepad_clamped_to_valid_range() {
        let mut input = GamepadController::new();
        input.write_port(0, Word::from_integer(99));
        assert_eq!(input.read_port(0).unwrap().integer(), GAMEPAD_PORTS as i32 - 1);

        input.write_port(0, Word::from_integer(-5));
        assert_eq!(input.read_port(0).unwrap().integer(), 0);
    }

    #[test]
    fn control_ports_are_not_cpu_writable() {
        let mut input = GamepadController::new();
        assert!(!input.write_port(1, Word::from_integer(1)));
    }

    #[test]
    fn disconnect_clears_control_state() {
        let mut input = GamepadController::new();
        input.set_gamepad_connection(0, true);
        input.set_gamepad_control(0, GamepadControl::A, true);
        input.set_gamepad_connection(0, false);
        assert!(!input.has_gamepad(0));
        input.change_frame();
        assert_eq!(input.read_port(1 + GamepadControl::A.field_index() - 1).unwrap().integer(), 0);
    }
}
