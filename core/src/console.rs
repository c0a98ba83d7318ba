//! The top-level orchestrator: owns every device, wires them behind the
//! two address-decoding switches in [`bus`](crate::bus), and drives one
//! frame at a time. Grounded on
//! `original_source/DesktopEmulator/ConsoleLogic/V32Console.{hpp,cpp}`.

use std::fmt;
use std::thread::JoinHandle;

use crate::bus::{decode_memory_address, decode_port, MemorySlave, PortSlave, SystemBus};
use crate::constants::*;
use crate::cpu::Cpu;
use crate::device::input::GamepadControl;
use crate::device::spu::AudioSink;
use crate::device::{
    CartridgeController, GamepadController, Gpu, MemoryCardController, NullController, Ram, Rng,
    Rom, Spu, Timer,
};
use crate::error::HardwareError;
use crate::host::HostInterface;
use crate::word::{Sample, Word};

/// One already-decoded cartridge texture, handed to [`Console::load_cartridge`]
/// by a loader that has parsed the container format itself (see
/// `v32_machines::container`).
pub struct CartridgeTexture {
    pub width: u32,
    pub height: u32,
    /// RGBA8, row-major, `width * height * 4` bytes.
    pub pixels: Vec<u8>,
}

/// Already-decoded BIOS contents.
pub struct BiosImage {
    pub program_rom: Vec<Word>,
    pub texture_width: u32,
    pub texture_height: u32,
    pub texture_pixels: Vec<u8>,
    pub sound: Vec<Sample>,
    pub title: String,
    pub version: u32,
    pub revision: u32,
}

/// Already-decoded cartridge contents.
pub struct CartridgeImage {
    pub program_rom: Vec<Word>,
    pub textures: Vec<CartridgeTexture>,
    pub sounds: Vec<Vec<Sample>>,
    pub file_name: String,
    pub title: String,
    pub version: u32,
    pub revision: u32,
}

/// Failure raised by the console itself while accepting an already-parsed
/// BIOS/cartridge/memory-card image. Format-level failures (bad signature,
/// truncated file, size mismatch) belong to the loader that produced the
/// image, not here; these are the caps and invariants `Console` owns.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LoadError {
    ProgramRomTooLarge { limit: u32, actual: u32 },
    TooManyTextures { limit: usize, actual: usize },
    TooManySounds { limit: usize, actual: usize },
    TooManySamples { limit: u32, actual: u64 },
    MemoryCardSizeMismatch { expected: u32, actual: usize },
}

impl fmt::Display for LoadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LoadError::ProgramRomTooLarge { limit, actual } => {
                write!(f, "program ROM too large: {actual} words (limit {limit})")
            }
            LoadError::TooManyTextures { limit, actual } => {
                write!(f, "too many textures: {actual} (limit {limit})")
            }
            LoadError::TooManySounds { limit, actual } => {
                write!(f, "too many sounds: {actual} (limit {limit})")
            }
            LoadError::TooManySamples { limit, actual } => {
                write!(f, "too many total sound samples: {actual} (limit {limit})")
            }
            LoadError::MemoryCardSizeMismatch { expected, actual } => {
                write!(f, "memory card has {actual} words, expected {expected}")
            }
        }
    }
}

impl std::error::Error for LoadError {}

/// The `SystemBus` implementation built fresh each instruction, borrowing
/// every device out of a [`Console`] by disjoint field path so the CPU's
/// own `&mut self` can coexist with it. See [`Console::step_cpu`].
struct BusView<'a> {
    ram: &'a mut Ram,
    bios_rom: &'a mut Rom,
    cartridge_rom: &'a mut Rom,
    memory_card: &'a mut MemoryCardController,
    timer: &'a mut Timer,
    rng: &'a mut Rng,
    gpu: &'a mut Gpu,
    spu: &'a mut Spu,
    gamepads: &'a mut GamepadController,
    cartridge: &'a mut CartridgeController,
    null: &'a mut NullController,
    host: &'a mut dyn HostInterface,
}

impl<'a> SystemBus for BusView<'a> {
    fn read_memory(&mut self, addr: u32) -> Result<Word, HardwareError> {
        let (device, local) = decode_memory_address(addr);
        let value = match device {
            0 => self.ram.read(local),
            1 => self.bios_rom.read(local),
            2 => self.cartridge_rom.read(local),
            3 => self.memory_card.read(local),
            _ => unreachable!("decode_memory_address only yields 2 bits"),
        };
        value.ok_or(HardwareError::InvalidMemoryRead)
    }

    fn write_memory(&mut self, addr: u32, value: Word) -> Result<(), HardwareError> {
        let (device, local) = decode_memory_address(addr);
        let ok = match device {
            0 => self.ram.write(local, value),
            1 => self.bios_rom.write(local, value),
            2 => self.cartridge_rom.write(local, value),
            3 => self.memory_card.write(local, value),
            _ => unreachable!("decode_memory_address only yields 2 bits"),
        };
        if ok {
            Ok(())
        } else {
            Err(HardwareError::InvalidMemoryWrite)
        }
    }

    fn read_port(&mut self, port: u32) -> Result<Word, HardwareError> {
        let (device, local) = decode_port(port);
        let value = match device {
            0 => self.timer.read_port(local),
            1 => self.rng.read_port(local),
            2 => self.gpu.read_port(local),
            3 => self.spu.read_port(local),
            4 => self.gamepads.read_port(local),
            5 => self.cartridge.read_port(local),
            6 => self.memory_card.read_port(local),
            7 => self.null.read_port(local),
            _ => unreachable!("decode_port only yields 3 bits"),
        };
        value.ok_or(HardwareError::InvalidPortRead)
    }

    fn write_port(&mut self, port: u32, value: Word) -> Result<(), HardwareError> {
        let (device, local) = decode_port(port);
        let ok = match device {
            0 => self.timer.write_port(local, value),
            1 => self.rng.write_port(local, value),
            2 => self.gpu.write_port(local, value, &mut *self.host),
            3 => self.spu.write_port(local, value),
            4 => self.gamepads.write_port(local, value),
            5 => self.cartridge.write_port(local, value),
            6 => self.memory_card.write_port(local, value),
            7 => self.null.write_port(local, value),
            _ => unreachable!("decode_port only yields 3 bits"),
        };
        if ok {
            Ok(())
        } else {
            Err(HardwareError::InvalidPortWrite)
        }
    }
}

/// The whole machine: CPU, the four memory-bus devices, the eight
/// port-bus devices, and the host's drawing/logging surface, run one
/// frame at a time by [`run_next_frame`](Console::run_next_frame).
pub struct Console {
    power_is_on: bool,

    cpu: Cpu,
    ram: Ram,
    bios_rom: Rom,
    cartridge_rom: Rom,
    memory_card: MemoryCardController,
    timer: Timer,
    rng: Rng,
    gpu: Gpu,
    spu: Spu,
    gamepads: GamepadController,
    cartridge: CartridgeController,
    null: NullController,

    host: Box<dyn HostInterface>,

    bios_file_name: String,
    bios_title: String,
    bios_version: u32,
    bios_revision: u32,

    last_cpu_loads: [f64; 2],
    last_gpu_loads: [f64; 2],
}

impl Console {
    pub fn new(host: Box<dyn HostInterface>) -> Self {
        Console {
            power_is_on: false,
            cpu: Cpu::new(),
            ram: Ram::new(RAM_SIZE as usize),
            bios_rom: Rom::empty(),
            cartridge_rom: Rom::empty(),
            memory_card: MemoryCardController::new(MEMORY_CARD_SIZE as usize),
            timer: Timer::new(),
            rng: Rng::new(),
            gpu: Gpu::new(),
            spu: Spu::new(),
            gamepads: GamepadController::new(),
            cartridge: CartridgeController::new(),
            null: NullController::new(),
            host,
            bios_file_name: String::new(),
            bios_title: String::new(),
            bios_version: 0,
            bios_revision: 0,
            last_cpu_loads: [0.0; 2],
            last_gpu_loads: [0.0; 2],
        }
    }

    /// Builds a [`BusView`] borrowing every device but the CPU, by
    /// destructuring `self` into disjoint field paths rather than going
    /// through a `&self`-taking helper — the latter would borrow all of
    /// `self` and conflict with the live `&mut self.cpu` below.
    fn step_cpu(&mut self) -> Result<(), HardwareError> {
        let Console {
            cpu,
            ram,
            bios_rom,
            cartridge_rom,
            memory_card,
            timer,
            rng,
            gpu,
            spu,
            gamepads,
            cartridge,
            null,
            host,
            ..
        } = self;
        let mut bus = BusView {
            ram,
            bios_rom,
            cartridge_rom,
            memory_card,
            timer,
            rng,
            gpu,
            spu,
            gamepads,
            cartridge,
            null,
            host: &mut **host,
        };
        cpu.step(&mut bus)
    }

    // -- power and frame lifecycle --------------------------------------

    pub fn is_power_on(&self) -> bool {
        self.power_is_on
    }

    pub fn set_power(&mut self, on: bool) {
        self.power_is_on = on;
        self.host.log_line(if on {
            "Console power ON"
        } else {
            "Console power OFF"
        });
        if on {
            self.reset();
        } else {
            self.spu.stop_all_channels();
        }
    }

    /// Resets Timer/RNG/CPU/GPU/SPU/gamepads and clears RAM, matching
    /// `V32Console::Reset`. BIOS/cartridge/memory-card connections and
    /// load history survive a reset.
    pub fn reset(&mut self) {
        self.timer.reset();
        let clock = self.host.wall_clock();
        self.timer.set_current_date(clock.year, clock.day_of_year);
        self.timer
            .set_current_time(clock.hours, clock.minutes, clock.seconds);
        self.rng.reset();
        self.cpu.reset();
        self.gpu.reset(&mut *self.host);
        self.spu.reset();
        self.gamepads.reset();
        self.ram.clear();
        self.last_cpu_loads = [0.0; 2];
        self.last_gpu_loads = [0.0; 2];
    }

    pub fn is_cpu_halted(&self) -> bool {
        self.cpu.halted
    }

    /// Runs up to [`CYCLES_PER_FRAME`] instructions, stopping early on
    /// `Halted`/`Waiting` or a trapped [`HardwareError`] (which aborts
    /// only this frame's loop, matching `V32Console::RunNextFrame`'s
    /// caught `CPUException`). No-op while powered off.
    pub fn run_next_frame(&mut self) {
        if !self.power_is_on {
            return;
        }

        self.timer.change_frame();
        self.cpu.change_frame();
        self.gpu.change_frame();
        self.spu.change_frame();
        self.gamepads.change_frame();

        for _ in 0..CYCLES_PER_FRAME {
            if self.cpu.halted || self.cpu.waiting {
                break;
            }
            self.timer.tick();
            if let Err(error) = self.step_cpu() {
                self.host.log_line(&format!("CPU trap: {error}"));
                break;
            }
        }

        self.last_cpu_loads[1] = self.last_cpu_loads[0];
        self.last_cpu_loads[0] =
            100.0 * (self.timer.cycle_counter() as f64) / (CYCLES_PER_FRAME as f64);

        let used_pixels = PIXEL_CAPACITY_PER_FRAME - self.gpu.remaining_pixels.max(0);
        self.last_gpu_loads[1] = self.last_gpu_loads[0];
        self.last_gpu_loads[0] =
            100.0 * (used_pixels as f64) / (PIXEL_CAPACITY_PER_FRAME as f64);

        self.flush_memory_card_if_dirty();
    }

    /// Writes the memory card back through the host if a local write
    /// made it dirty since the last flush, matching `spec.md` §5's
    /// "memory-card flush happens after the cycle loop but before
    /// `run_next_frame` returns."
    fn flush_memory_card_if_dirty(&mut self) {
        if !self.memory_card.is_connected() || !self.memory_card.is_dirty() {
            return;
        }
        self.host
            .save_memory_card(&self.memory_card.file_name, self.memory_card.words());
        self.memory_card.mark_saved();
    }

    /// The higher of the last two frames' load, since an instruction
    /// that overflows a frame's cycle budget can make one frame read as
    /// 100% and the next read low, matching `GetCPULoad`'s comment.
    pub fn cpu_load(&self) -> f64 {
        self.last_cpu_loads[0].max(self.last_cpu_loads[1])
    }

    pub fn gpu_load(&self) -> f64 {
        self.last_gpu_loads[0].max(self.last_gpu_loads[1])
    }

    /// Frames executed since the last reset, the Timer's `FrameCounter`
    /// register mirrored for diagnostics.
    pub fn frame_counter(&self) -> i32 {
        self.timer.frame_counter()
    }

    // -- BIOS --------------------------------------------------------------

    pub fn has_bios(&self) -> bool {
        self.bios_rom.is_connected()
    }

    pub fn bios_title(&self) -> &str {
        &self.bios_title
    }

    /// Connects the BIOS program ROM, texture and sound. Rejects the
    /// image without touching any existing BIOS state if the program
    /// ROM exceeds [`BIOS_PROGRAM_ROM_SIZE`].
    pub fn load_bios(&mut self, bios: BiosImage) -> Result<(), LoadError> {
        if bios.program_rom.len() as u32 > BIOS_PROGRAM_ROM_SIZE {
            return Err(LoadError::ProgramRomTooLarge {
                limit: BIOS_PROGRAM_ROM_SIZE,
                actual: bios.program_rom.len() as u32,
            });
        }

        self.bios_rom.connect(bios.program_rom);
        // `select_texture(None)` disambiguates this as the BIOS texture;
        // the `id` below is a placeholder the host must ignore, per
        // `HostInterface::select_texture`'s doc.
        self.host.select_texture(None);
        self.host.load_texture(0, &bios.texture_pixels);
        self.spu.load_bios_sound(bios.sound);

        self.bios_file_name.clear();
        self.bios_title = bios.title;
        self.bios_version = bios.version;
        self.bios_revision = bios.revision;
        Ok(())
    }

    pub fn unload_bios(&mut self) {
        self.bios_rom.disconnect();
        self.bios_file_name.clear();
        self.bios_title.clear();
        self.bios_version = 0;
        self.bios_revision = 0;
        self.host.unload_bios_texture();
        self.spu.unload_bios_sound();
    }

    // -- cartridge -----------------------------------------------------

    pub fn has_cartridge(&self) -> bool {
        self.cartridge_rom.is_connected()
    }

    pub fn cartridge_file_name(&self) -> &str {
        &self.cartridge.file_name
    }

    pub fn cartridge_title(&self) -> &str {
        &self.cartridge.title
    }

    /// Connects the cartridge program ROM plus every texture and sound,
    /// matching `V32Console::LoadCartridge`. Rejected images leave any
    /// previously loaded cartridge untouched.
    pub fn load_cartridge(&mut self, cartridge: CartridgeImage) -> Result<(), LoadError> {
        if cartridge.program_rom.len() as u32 > CARTRIDGE_PROGRAM_ROM_SIZE {
            return Err(LoadError::ProgramRomTooLarge {
                limit: CARTRIDGE_PROGRAM_ROM_SIZE,
                actual: cartridge.program_rom.len() as u32,
            });
        }
        if cartridge.textures.len() > GPU_MAXIMUM_CARTRIDGE_TEXTURES {
            return Err(LoadError::TooManyTextures {
                limit: GPU_MAXIMUM_CARTRIDGE_TEXTURES,
                actual: cartridge.textures.len(),
            });
        }
        if cartridge.sounds.len() > SPU_MAXIMUM_CARTRIDGE_SOUNDS {
            return Err(LoadError::TooManySounds {
                limit: SPU_MAXIMUM_CARTRIDGE_SOUNDS,
                actual: cartridge.sounds.len(),
            });
        }
        let total_samples: u64 = cartridge.sounds.iter().map(|s| s.len() as u64).sum();
        if total_samples > SPU_MAXIMUM_CARTRIDGE_SAMPLES as u64 {
            return Err(LoadError::TooManySamples {
                limit: SPU_MAXIMUM_CARTRIDGE_SAMPLES,
                actual: total_samples,
            });
        }

        let program_rom_size = cartridge.program_rom.len() as i32;
        let number_of_textures = cartridge.textures.len();
        let number_of_sounds = cartridge.sounds.len();

        self.cartridge_rom.connect(cartridge.program_rom);

        for (index, texture) in cartridge.textures.iter().enumerate() {
            self.host.select_texture(Some(index));
            self.host.load_texture(index, &texture.pixels);
        }
        self.gpu
            .insert_cartridge_textures(number_of_textures)
            .expect("count already checked against GPU_MAXIMUM_CARTRIDGE_TEXTURES above");

        for (index, samples) in cartridge.sounds.into_iter().enumerate() {
            self.spu.load_cartridge_sound(index, samples);
        }
        self.spu.set_loaded_cartridge_sounds(number_of_sounds);

        self.cartridge.connect(
            program_rom_size,
            number_of_textures as i32,
            number_of_sounds as i32,
            cartridge.file_name,
            cartridge.title,
            cartridge.version,
            cartridge.revision,
        );

        Ok(())
    }

    pub fn unload_cartridge(&mut self) {
        self.cartridge_rom.disconnect();
        self.gpu.remove_cartridge_textures(&mut *self.host);
        self.spu.unload_cartridge_sounds();
        self.cartridge.disconnect();
    }

    // -- memory card -----------------------------------------------------

    pub fn has_memory_card(&self) -> bool {
        self.memory_card.is_connected()
    }

    pub fn was_memory_card_modified(&self) -> bool {
        self.memory_card.is_dirty()
    }

    pub fn memory_card_file_name(&self) -> &str {
        &self.memory_card.file_name
    }

    /// Connects a blank memory card ready to be saved for the first time.
    pub fn create_memory_card(&mut self, file_name: String) {
        self.memory_card.create(file_name);
    }

    pub fn load_memory_card(&mut self, words: &[Word], file_name: String) -> Result<(), LoadError> {
        if words.len() as u32 != MEMORY_CARD_SIZE {
            return Err(LoadError::MemoryCardSizeMismatch {
                expected: MEMORY_CARD_SIZE,
                actual: words.len(),
            });
        }
        self.memory_card.connect(words, file_name);
        Ok(())
    }

    pub fn unload_memory_card(&mut self) {
        self.memory_card.disconnect();
    }

    /// Forces an immediate flush through the host, regardless of the
    /// dirty flag — used when unloading or ejecting a card outside a
    /// frame boundary. Returns whether a card was connected to save.
    pub fn save_memory_card(&mut self) -> bool {
        if !self.memory_card.is_connected() {
            return false;
        }
        self.host
            .save_memory_card(&self.memory_card.file_name, self.memory_card.words());
        self.memory_card.mark_saved();
        true
    }

    // -- gamepads ----------------------------------------------------------

    pub fn set_gamepad_connection(&mut self, port: usize, connected: bool) {
        self.gamepads.set_gamepad_connection(port, connected);
    }

    pub fn set_gamepad_control(&mut self, port: usize, control: GamepadControl, pressed: bool) {
        self.gamepads.set_gamepad_control(port, control, pressed);
    }

    pub fn has_gamepad(&self, port: usize) -> bool {
        self.gamepads.has_gamepad(port)
    }

    // -- audio ---------------------------------------------------------------

    /// Sets the SPU's global mixer volume, the same way a cartridge would
    /// by writing SPU port 1 from the CPU, for a host that wants a
    /// persisted master-volume knob outside the console's own port bus.
    pub fn set_global_volume(&mut self, volume: f32) {
        self.spu.write_port(1, Word::from_float(volume));
    }

    // -- clock -------------------------------------------------------------

    pub fn set_current_date(&mut self, year: i32, day_of_year: i32) {
        self.timer.set_current_date(year, day_of_year);
    }

    pub fn set_current_time(&mut self, hours: i32, minutes: i32, seconds: i32) {
        self.timer.set_current_time(hours, minutes, seconds);
    }

    // -- audio ---------------------------------------------------------

    /// The mixed samples produced during the most recently run frame.
    pub fn get_frame_sound_output(&self) -> &[Sample] {
        self.spu.last_frame_samples()
    }

    /// Spawns the SPU's playback thread against `sink`. The host owns the
    /// returned handle and must pass it back to
    /// [`stop_playback_thread`](Console::stop_playback_thread) before the
    /// console is dropped.
    pub fn spawn_playback_thread(&self, sink: Box<dyn AudioSink>) -> JoinHandle<()> {
        self.spu.spawn_playback_thread(sink)
    }

    pub fn stop_playback_thread(&self, handle: JoinHandle<()>) {
        self.spu.stop_playback_thread(handle);
    }
}
