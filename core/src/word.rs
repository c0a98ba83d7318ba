//! The 32-bit tagged scalar that flows across every V32 bus.

/// A single 32-bit value reinterpretable under several shapes. All
/// multi-byte representations are little-endian both on disk and in RAM,
/// so the in-memory layout here (plain Rust primitives) already matches
/// the wire format: no byte-swapping is needed on a little-endian host,
/// and loaders normalize explicitly for the opposite case.
#[derive(Clone, Copy, PartialEq)]
pub union Word {
    pub as_integer: i32,
    pub as_unsigned: u32,
    pub as_float: f32,
    pub as_color: Color,
    pub as_sample: Sample,
    pub as_instruction: PackedInstruction,
}

impl Word {
    pub const fn from_integer(v: i32) -> Self {
        Word { as_integer: v }
    }

    pub const fn from_unsigned(v: u32) -> Self {
        Word { as_unsigned: v }
    }

    pub const fn from_float(v: f32) -> Self {
        Word { as_float: v }
    }

    pub const fn zero() -> Self {
        Word { as_unsigned: 0 }
    }

    pub fn integer(self) -> i32 {
        unsafe { self.as_integer }
    }

    pub fn unsigned(self) -> u32 {
        unsafe { self.as_unsigned }
    }

    pub fn float(self) -> f32 {
        unsafe { self.as_float }
    }

    pub fn color(self) -> Color {
        unsafe { self.as_color }
    }

    pub fn sample(self) -> Sample {
        unsafe { self.as_sample }
    }

    pub fn instruction(self) -> PackedInstruction {
        unsafe { self.as_instruction }
    }

    pub fn to_le_bytes(self) -> [u8; 4] {
        unsafe { self.as_unsigned }.to_le_bytes()
    }

    pub fn from_le_bytes(bytes: [u8; 4]) -> Self {
        Word {
            as_unsigned: u32::from_le_bytes(bytes),
        }
    }
}

impl std::fmt::Debug for Word {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Word(0x{:08X})", self.unsigned())
    }
}

impl Default for Word {
    fn default() -> Self {
        Word::zero()
    }
}

impl From<i32> for Word {
    fn from(v: i32) -> Self {
        Word::from_integer(v)
    }
}

impl From<u32> for Word {
    fn from(v: u32) -> Self {
        Word::from_unsigned(v)
    }
}

impl From<f32> for Word {
    fn from(v: f32) -> Self {
        Word::from_float(v)
    }
}

/// Packed `{R,G,B,A}` bytes, in that byte order, matching the GPU's
/// clear/multiply color registers.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(C)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Color { r, g, b, a }
    }
}

/// Packed stereo sample pair, two little-endian `i16`s.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(C)]
pub struct Sample {
    pub left: i16,
    pub right: i16,
}

/// A 32-bit packed CPU instruction: `opcode:6 | uses_immediate:1 | reg1:4
/// | reg2:4 | addressing_mode:3 | port_number:14`, opcode in the most
/// significant 6 bits.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(transparent)]
pub struct PackedInstruction(pub u32);

impl PackedInstruction {
    pub fn opcode(self) -> u32 {
        self.0 >> 26
    }

    pub fn uses_immediate(self) -> bool {
        (self.0 >> 25) & 1 != 0
    }

    pub fn reg1(self) -> u32 {
        (self.0 >> 21) & 0xF
    }

    pub fn reg2(self) -> u32 {
        (self.0 >> 17) & 0xF
    }

    pub fn addressing_mode(self) -> u32 {
        (self.0 >> 14) & 0x7
    }

    pub fn port_number(self) -> u32 {
        self.0 & 0x3FFF
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn integer_float_round_trip_preserves_bit_pattern() {
        let w = Word::from_integer(-12345);
        let bits = w.unsigned();
        let w2 = Word::from_unsigned(bits);
        assert_eq!(w2.integer(), -12345);

        let f = Word::from_float(3.25);
        let bits = f.unsigned();
        assert_eq!(Word::from_unsigned(bits).float(), 3.25);
    }

    #[test]
    fn color_layout_matches_rgba_byte_order() {
        let w = Word {
            as_color: Color::rgba(0x11, 0x22, 0x33, 0x44),
        };
        // little-endian: R is the least significant byte
        assert_eq!(w.unsigned(), 0x4433_2211);
    }

    #[test]
    fn le_byte_round_trip() {
        let w = Word::from_unsigned(0xDEADBEEF);
        let bytes = w.to_le_bytes();
        assert_eq!(bytes, [0xEF, 0xBE, 0xAD, 0xDE]);
        assert_eq!(Word::from_le_bytes(bytes).unsigned(), 0xDEADBEEF);
    }

    #[test]
    fn packed_instruction_field_extraction() {
        // opcode=5, uses_immediate=1, reg1=3, reg2=7, mode=2, port=0
        let raw = (5u32 << 26) | (1 << 25) | (3 << 21) | (7 << 17) | (2 << 14);
        let ins = PackedInstruction(raw);
        assert_eq!(ins.opcode(), 5);
        assert!(ins.uses_immediate());
        assert_eq!(ins.reg1(), 3);
        assert_eq!(ins.reg2(), 7);
        assert_eq!(ins.addressing_mode(), 2);
        assert_eq!(ins.port_number(), 0);
    }
}
