//! Error types raised by the core. Each follows the teacher's manual
//! `Display`/`Error` idiom (see `v32_machines::container::ContainerError`) —
//! no `anyhow`, no `thiserror`.

use std::fmt;

/// A CPU hardware-error trap. Raising one aborts the *current frame's*
/// cycle loop only; it never escapes `Console::run_next_frame`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HardwareError {
    InvalidMemoryRead,
    InvalidMemoryWrite,
    InvalidPortRead,
    InvalidPortWrite,
    StackOverflow,
    StackUnderflow,
    DivisionError,
    ArcCosineError,
    ArcTangent2Error,
    LogarithmError,
    PowerError,
}

impl fmt::Display for HardwareError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            HardwareError::InvalidMemoryRead => "invalid memory read",
            HardwareError::InvalidMemoryWrite => "invalid memory write",
            HardwareError::InvalidPortRead => "invalid port read",
            HardwareError::InvalidPortWrite => "invalid port write",
            HardwareError::StackOverflow => "stack overflow",
            HardwareError::StackUnderflow => "stack underflow",
            HardwareError::DivisionError => "division by zero",
            HardwareError::ArcCosineError => "acos argument out of [-1, 1]",
            HardwareError::ArcTangent2Error => "atan2(0, 0) is undefined",
            HardwareError::LogarithmError => "log of a non-positive value",
            HardwareError::PowerError => "negative base with non-integer exponent",
        };
        write!(f, "{text}")
    }
}

impl std::error::Error for HardwareError {}
