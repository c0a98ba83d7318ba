//! End-to-end console scenarios beyond the basic power cycle: cartridge
//! texture upload, a trapping program that halts one frame and resumes
//! the next, and a memory-card write that survives to the next save.

mod common;
use common::{encode, hlt, CountingHost, MODE_IMMEDIATE_ADDRESS_FROM_REGISTER, OP_MOV, OP_POP};

use v32_core::console::{BiosImage, CartridgeImage, CartridgeTexture, Console};
use v32_core::constants::MEMORY_CARD_FIRST;
use v32_core::word::Word;

fn minimal_bios() -> BiosImage {
    BiosImage {
        program_rom: vec![hlt()],
        texture_width: 0,
        texture_height: 0,
        texture_pixels: Vec::new(),
        sound: Vec::new(),
        title: "TESTBIOS".to_string(),
        version: 1,
        revision: 0,
    }
}

fn texture(fill: u8) -> CartridgeTexture {
    CartridgeTexture {
        width: 2,
        height: 2,
        pixels: vec![fill; 2 * 2 * 4],
    }
}

#[test]
fn cartridge_with_three_textures_uploads_each_one() {
    let mut console = Console::new(Box::new(CountingHost::new()));
    console.load_bios(minimal_bios()).unwrap();

    let cartridge = CartridgeImage {
        program_rom: vec![hlt()],
        textures: vec![texture(10), texture(20), texture(30)],
        sounds: vec![vec![], vec![], vec![], vec![]],
        file_name: "cart.rom".to_string(),
        title: "THREETEX".to_string(),
        version: 1,
        revision: 0,
    };
    console.load_cartridge(cartridge).unwrap();

    assert!(console.has_cartridge());
    assert_eq!(console.cartridge_title(), "THREETEX");
}

#[test]
fn stack_underflow_halts_one_frame_and_resumes_next() {
    // POP R0 at the bottom of the stack (SP already at its reset value,
    // one past the top of RAM) must trap StackUnderflow and stop that
    // frame's cycle loop without leaving the CPU permanently halted.
    let program = vec![encode(OP_POP, false, 0, 0, 0, 0), hlt()];
    let mut console = Console::new(Box::new(CountingHost::new()));
    console.load_bios(BiosImage {
        program_rom: program,
        ..minimal_bios()
    }).unwrap();
    console.set_power(true);

    console.run_next_frame();
    assert!(!console.is_cpu_halted());

    console.run_next_frame();
    assert_eq!(console.frame_counter(), 2);
}

#[test]
fn memory_card_write_is_flushed_after_dirty_frame() {
    let program = vec![
        encode(OP_MOV, true, 0, 0, 0, 0), // R0 = 7 (immediate follows)
        Word::from_integer(7),
        encode(
            OP_MOV,
            true,
            0,
            0,
            MODE_IMMEDIATE_ADDRESS_FROM_REGISTER,
            0,
        ), // [MEMORY_CARD_FIRST] = R0 (immediate address follows)
        Word::from_integer(MEMORY_CARD_FIRST as i32),
        hlt(),
    ];
    let mut console = Console::new(Box::new(CountingHost::new()));
    console.load_bios(BiosImage {
        program_rom: program,
        ..minimal_bios()
    }).unwrap();

    let blank = vec![Word::from_integer(0); v32_core::constants::MEMORY_CARD_SIZE as usize];
    console.load_memory_card(&blank, "card.mc".to_string()).unwrap();
    console.set_power(true);

    assert!(!console.was_memory_card_modified());
    console.run_next_frame();

    assert!(!console.was_memory_card_modified(), "flush should have cleared the dirty flag");
}

#[test]
fn set_power_logs_and_stops_sound_on_power_down() {
    let mut console = Console::new(Box::new(CountingHost::new()));
    console.load_bios(minimal_bios()).unwrap();

    console.set_power(true);
    console.set_power(false);

    assert_eq!(console.is_power_on(), false);
}

#[test]
fn set_global_volume_survives_into_next_frame() {
    let mut console = Console::new(Box::new(CountingHost::new()));
    console.load_bios(minimal_bios()).unwrap();
    console.set_power(true);

    console.set_global_volume(0.5);
    console.run_next_frame();
    // No public getter for the mixed volume; this simply exercises the
    // call path end to end and confirms it doesn't panic or trap.
    assert_eq!(console.frame_counter(), 1);
}
