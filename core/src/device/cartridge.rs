//! ROM-backed cartridge controller, exposing read-only metadata ports
//! (`spec.md` §4.10).

use crate::bus::PortSlave;
use crate::word::Word;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(u32)]
enum Port {
    Connected = 0,
    ProgramRomSize = 1,
    NumberOfTextures = 2,
    NumberOfSounds = 3,
}

const LAST_PORT: u32 = Port::NumberOfSounds as u32;

#[derive(Default)]
pub struct CartridgeController {
    program_rom_size: i32,
    number_of_textures: i32,
    number_of_sounds: i32,
    pub file_name: String,
    pub title: String,
    pub version: u32,
    pub revision: u32,
}

impl CartridgeController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_connected(&self) -> bool {
        self.program_rom_size > 0
    }

    pub fn connect(
        &mut self,
        program_rom_size: i32,
        number_of_textures: i32,
        number_of_sounds: i32,
        file_name: String,
        title: String,
        version: u32,
        revision: u32,
    ) {
        self.program_rom_size = program_rom_size;
        self.number_of_textures = number_of_textures;
        self.number_of_sounds = number_of_sounds;
        self.file_name = file_name;
        self.title = title;
        self.version = version;
        self.revision = revision;
    }

    pub fn disconnect(&mut self) {
        *self = CartridgeController::default();
    }
}

impl PortSlave for CartridgeController {
    fn read_port(&mut self, local_port: u32) -> Option<Word> {
        if local_port > LAST_PORT {
            return None;
        }

        let value = match local_port {
            0 => self.is_connected() as i32,
            1 => self.program_rom_size,
            2 => self.number_of_textures,
            3 => self.number_of_sounds,
            _ => unreachable!(),
        };

        Some(Word::from_integer(value))
    }

    fn write_port(&mut self, _local_port: u32, _value: Word) -> bool {
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reports_connected_state_and_counts() {
        let mut cart = CartridgeController::new();
        assert_eq!(cart.read_port(0).unwrap().integer(), 0);

        cart.connect(1024, 3, 4, "game.rom".into(), "Game".into(), 1, 0);
        assert_eq!(cart.read_port(0).unwrap().integer(), 1);
        assert_eq!(cart.read_port(2).unwrap().integer(), 3);
        assert_eq!(cart.read_port(3).unwrap().integer(), 4);
    }

    #[test]
    fn all_ports_are_read_only() {
        let mut cart = CartridgeController::new();
        assert!(!cart.write_port(0, Word::from_integer(1)));
    }
}
