//! End-to-end power-on behavior: a freshly constructed console with a
//! BIOS loaded comes up running, not halted, and advances the frame
//! counter by exactly one per `run_next_frame`.

mod common;
use common::{hlt, CountingHost};

use v32_core::console::{BiosImage, Console};

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

#[test]
fn power_cycle_runs_one_frame() {
    let mut console = Console::new(Box::new(CountingHost::new()));

    console.load_bios(minimal_bios()).unwrap();
    console.set_power(true);

    assert!(console.is_power_on());
    assert!(!console.is_cpu_halted());
    assert_eq!(console.frame_counter(), 0);

    console.run_next_frame();

    assert_eq!(console.frame_counter(), 1);
}

#[test]
fn power_off_console_ignores_run_next_frame() {
    let mut console = Console::new(Box::new(CountingHost::new()));
    console.load_bios(minimal_bios()).unwrap();

    console.run_next_frame();

    assert_eq!(console.frame_counter(), 0);
    assert!(!console.is_power_on());
}
