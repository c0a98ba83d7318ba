//! Reference SDL2+GL frontend: loads a BIOS and cartridge container,
//! drives the console one frame at a time, and presents its GPU draws
//! and SPU audio through SDL2. Not a product — a thin harness proving
//! `v32-core`/`v32-machines` end to end (no file dialogs, no input
//! remapping UI, no debugger).

use std::cell::RefCell;
use std::path::PathBuf;
use std::rc::Rc;

use clap::Parser;
use v32_core::console::Console;
use v32_core::constants::{GAMEPAD_PORTS, SCREEN_HEIGHT, SCREEN_WIDTH};

mod audio;
mod emulator;
mod host;
mod input;
mod settings;
mod video;

use audio::SdlAudioSink;
use host::SdlHost;
use settings::Settings;
use video::Video;

#[derive(Parser, Debug)]
#[command(name = "v32", about = "Reference frontend for the V32 fantasy console core")]
struct Args {
    /// Path to a V32-BIOS container.
    bios: PathBuf,

    /// Path to a V32-CART container.
    cartridge: PathBuf,

    /// Path to a memory-card file; created if it doesn't exist yet.
    #[arg(long)]
    memory_card: Option<PathBuf>,

    /// Integer window scale, overriding the persisted setting.
    #[arg(long)]
    scale: Option<u32>,
}

fn main() {
    let args = Args::parse();
    let mut settings = Settings::load();
    if let Some(scale) = args.scale {
        settings.scale = scale;
    }

    let bios = v32_machines::load_bios_container(&args.bios).unwrap_or_else(|e| {
        eprintln!("[v32] failed to load BIOS {}: {e}", args.bios.display());
        std::process::exit(1);
    });
    let cartridge = v32_machines::load_cartridge_container(&args.cartridge).unwrap_or_else(|e| {
        eprintln!(
            "[v32] failed to load cartridge {}: {e}",
            args.cartridge.display()
        );
        std::process::exit(1);
    });

    let sdl_context = sdl2::init().expect("Failed to initialize SDL2");
    let sdl_video = sdl_context.video().expect("Failed to init SDL video");
    let sdl_audio = sdl_context.audio().expect("Failed to init SDL audio");

    let video: Rc<RefCell<Video>> = Rc::new(RefCell::new(Video::new(
        &sdl_video,
        "V32",
        SCREEN_WIDTH,
        SCREEN_HEIGHT,
        settings.scale,
    )));

    let host = Box::new(SdlHost::new(Rc::clone(&video)));
    let mut console = Console::new(host);

    if let Err(e) = console.load_bios(bios) {
        eprintln!("[v32] BIOS rejected: {e}");
        std::process::exit(1);
    }
    let cartridge_title = cartridge.title.clone();
    if let Err(e) = console.load_cartridge(cartridge) {
        eprintln!("[v32] cartridge rejected: {e}");
        std::process::exit(1);
    }
    eprintln!("[v32] running {cartridge_title}");

    console.set_power(true);
    console.set_global_volume(settings.volume);

    if let Some(path) = &args.memory_card {
        match v32_machines::read_memory_card_file(path) {
            Ok(words) => {
                if let Err(e) = console.load_memory_card(&words, path.display().to_string()) {
                    eprintln!("[v32] memory card rejected: {e}");
                }
            }
            Err(_) => {
                if v32_machines::create_memory_card_file(path).is_ok() {
                    console.create_memory_card(path.display().to_string());
                }
            }
        }
    }

    for port in 0..GAMEPAD_PORTS {
        console.set_gamepad_connection(port, port == 0);
    }

    let sink = Box::new(SdlAudioSink::new(&sdl_audio));
    let playback_handle = console.spawn_playback_thread(sink);

    let key_map = input::default_key_map();
    emulator::run(&mut console, &sdl_context, &video, &key_map);

    console.stop_playback_thread(playback_handle);
    if console.has_memory_card() {
        console.save_memory_card();
    }
    settings.save();
}
