//! RAM-backed persistent store with a dirty flag (`spec.md` §4.10).
//! Inherits RAM's memory-bus behavior and additionally tracks whether it
//! needs flushing to disk, matching `V32MemoryCardController`'s dual
//! `VirconControlInterface`/`V32RAM` inheritance in `original_source/`.

use crate::bus::{MemorySlave, PortSlave};
use crate::device::ram::Ram;
use crate::word::Word;

const CONNECTED_PORT: u32 = 0;

pub struct MemoryCardController {
    ram: Ram,
    connected: bool,
    dirty: bool,
    pub file_name: String,
}

impl MemoryCardController {
    pub fn new(size: usize) -> Self {
        MemoryCardController {
            ram: Ram::new(size),
            connected: false,
            dirty: false,
            file_name: String::new(),
        }
    }

    pub fn is_connected(&self) -> bool {
        self.connected
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn connect(&mut self, words: &[Word], file_name: String) {
        self.ram.load_words(words);
        self.connected = true;
        self.dirty = false;
        self.file_name = file_name;
    }

    pub fn create(&mut self, file_name: String) {
        self.ram.clear();
        self.connected = true;
        self.dirty = false;
        self.file_name = file_name;
    }

    pub fn disconnect(&mut self) {
        self.ram.clear();
        self.connected = false;
        self.dirty = false;
        self.file_name.clear();
    }

    /// Called by the console after a successful flush to disk.
    pub fn mark_saved(&mut self) {
        self.dirty = false;
    }

    pub fn words(&self) -> &[Word] {
        self.ram.words()
    }
}

impl MemorySlave for MemoryCardController {
    fn read(&self, local_address: u32) -> Option<Word> {
        self.ram.read(local_address)
    }

    fn write(&mut self, local_address: u32, value: Word) -> bool {
        let ok = self.ram.write(local_address, value);
        if ok {
            self.dirty = true;
        }
        ok
    }
}

impl PortSlave for MemoryCardController {
    fn read_port(&mut self, local_port: u32) -> Option<Word> {
        if local_port != CONNECTED_PORT {
            return None;
        }
        Some(Word::from_integer(self.connected as i32))
    }

    fn write_port(&mut self, _local_port: u32, _value: Word) -> bool {
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn write_sets_dirty_flag_save_clears_it() {
        let mut card = MemoryCardController::new(16);
        card.create("save.card".into());
        assert!(!card.is_dirty());

        card.write(0, Word::from_integer(7));
        assert!(card.is_dirty());

        card.mark_saved();
        assert!(!card.is_dirty());
    }

    #[test]
    fn connected_port_reflects_state() {
        let mut card = MemoryCardController::new(4);
        assert_eq!(card.read_port(0).unwrap().integer(), 0);
        card.create("x".into());
        assert_eq!(card.read_port(0).unwrap().integer(), 1);
    }
}
