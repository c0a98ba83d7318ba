pub mod bus;
pub mod console;
pub mod constants;
pub mod cpu;
pub mod device;
pub mod error;
pub mod host;
pub mod word;

pub mod prelude {
    pub use crate::bus::SystemBus;
    pub use crate::console::Console;
    pub use crate::cpu::Cpu;
    pub use crate::error::HardwareError;
    pub use crate::host::{HostInterface, NullHost};
    pub use crate::word::Word;
}
