//! Parsers for the two on-disk container formats a console needs at the
//! boundary: ROM containers (BIOS/cartridge) and memory-card files.
//! Grounded on `original_source/VirconDefinitions/FileFormats.hpp` and
//! `original_source/DesktopEmulator/ConsoleLogic/V32Console.cpp`'s
//! `LoadBios`/`LoadCartridge`.

pub mod container;
pub mod memory_card_file;

pub use container::{load_bios_container, load_cartridge_container, ContainerError};
pub use memory_card_file::{
    create_memory_card_file, read_memory_card_file, write_memory_card_file, MemoryCardFileError,
};
