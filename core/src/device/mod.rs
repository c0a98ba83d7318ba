pub mod cartridge;
pub mod gpu;
pub mod input;
pub mod memcard;
pub mod null;
pub mod ram;
pub mod rng;
pub mod rom;
pub mod spu;
pub mod timer;

pub use cartridge::CartridgeController;
pub use gpu::Gpu;
pub use input::GamepadController;
pub use memcard::MemoryCardController;
pub use null::NullController;
pub use ram::Ram;
pub use rng::Rng;
pub use rom::Rom;
pub use spu::Spu;
pub use timer::Timer;
