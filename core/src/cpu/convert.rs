//! Data conversion (`CIF`/`CFI`/`CIB`/`CFB`) and the extended float
//! operations (`FLR`/`CEIL`/`ROUND`/`SIN`/`ACOS`/`ATAN2`/`LOG`/`POW`).
//! Grounded on `original_source/DesktopEmulator/Emulator/V32CPUProcessors.cpp`'s
//! `ProcessCIF`..`ProcessCFB` and `ProcessFLR`..`ProcessPOW`.

use super::Cpu;
use crate::error::HardwareError;
use crate::word::Word;

pub(super) fn cif(cpu: &mut Cpu) -> Result<(), HardwareError> {
    let reg1 = cpu.instruction.reg1();
    let r = cpu.register(reg1).integer();
    *cpu.register_mut(reg1) = Word::from_float(r as f32);
    Ok(())
}

pub(super) fn cfi(cpu: &mut Cpu) -> Result<(), HardwareError> {
    let reg1 = cpu.instruction.reg1();
    let r = cpu.register(reg1).float();
    *cpu.register_mut(reg1) = Word::from_integer(r as i32);
    Ok(())
}

pub(super) fn cib(cpu: &mut Cpu) -> Result<(), HardwareError> {
    let reg1 = cpu.instruction.reg1();
    let r = cpu.register(reg1).integer();
    *cpu.register_mut(reg1) = Word::from_integer((r != 0) as i32);
    Ok(())
}

pub(super) fn cfb(cpu: &mut Cpu) -> Result<(), HardwareError> {
    let reg1 = cpu.instruction.reg1();
    let r = cpu.register(reg1).float();
    *cpu.register_mut(reg1) = Word::from_integer((r != 0.0) as i32);
    Ok(())
}

pub(super) fn flr(cpu: &mut Cpu) -> Result<(), HardwareError> {
    let reg1 = cpu.instruction.reg1();
    let r = cpu.register(reg1).float();
    *cpu.register_mut(reg1) = Word::from_float(r.floor());
    Ok(())
}

pub(super) fn ceil(cpu: &mut Cpu) -> Result<(), HardwareError> {
    let reg1 = cpu.instruction.reg1();
    let r = cpu.register(reg1).float();
    *cpu.register_mut(reg1) = Word::from_float(r.ceil());
    Ok(())
}

pub(super) fn round(cpu: &mut Cpu) -> Result<(), HardwareError> {
    let reg1 = cpu.instruction.reg1();
    let r = cpu.register(reg1).float();
    *cpu.register_mut(reg1) = Word::from_float(r.round());
    Ok(())
}

pub(super) fn sin(cpu: &mut Cpu) -> Result<(), HardwareError> {
    let reg1 = cpu.instruction.reg1();
    let r = cpu.register(reg1).float();
    *cpu.register_mut(reg1) = Word::from_float(r.sin());
    Ok(())
}

pub(super) fn acos(cpu: &mut Cpu) -> Result<(), HardwareError> {
    let reg1 = cpu.instruction.reg1();
    let r = cpu.register(reg1).float();
    if !(-1.0..=1.0).contains(&r) {
        return Err(HardwareError::ArcCosineError);
    }
    *cpu.register_mut(reg1) = Word::from_float(r.acos());
    Ok(())
}

pub(super) fn atan2(cpu: &mut Cpu) -> Result<(), HardwareError> {
    let reg1 = cpu.instruction.reg1();
    let reg2 = cpu.instruction.reg2();
    let y = cpu.register(reg1).float();
    let x = cpu.register(reg2).float();
    if y == 0.0 && x == 0.0 {
        return Err(HardwareError::ArcTangent2Error);
    }
    *cpu.register_mut(reg1) = Word::from_float(y.atan2(x));
    Ok(())
}

pub(super) fn log(cpu: &mut Cpu) -> Result<(), HardwareError> {
    let reg1 = cpu.instruction.reg1();
    let r = cpu.register(reg1).float();
    if r <= 0.0 {
        return Err(HardwareError::LogarithmError);
    }
    *cpu.register_mut(reg1) = Word::from_float(r.ln());
    Ok(())
}

pub(super) fn pow(cpu: &mut Cpu) -> Result<(), HardwareError> {
    let reg1 = cpu.instruction.reg1();
    let reg2 = cpu.instruction.reg2();
    let base = cpu.register(reg1).float();
    let exponent = cpu.register(reg2).float();
    if base < 0.0 && exponent.trunc() != exponent {
        return Err(HardwareError::PowerError);
    }
    *cpu.register_mut(reg1) = Word::from_float(base.powf(exponent));
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::word::PackedInstruction;

    fn cpu_reg1(reg1: u32) -> Cpu {
        let mut cpu = Cpu::new();
        cpu.instruction = PackedInstruction(reg1 << 21);
        cpu
    }

    #[test]
    fn cif_cfi_round_trip_through_equal_values() {
        let mut cpu = cpu_reg1(0);
        cpu.registers[0] = Word::from_integer(42);
        cif(&mut cpu).unwrap();
        assert_eq!(cpu.registers[0].float(), 42.0);
        cfi(&mut cpu).unwrap();
        assert_eq!(cpu.registers[0].integer(), 42);
    }

    #[test]
    fn acos_out_of_range_raises_error() {
        let mut cpu = cpu_reg1(0);
        cpu.registers[0] = Word::from_float(2.0);
        assert_eq!(acos(&mut cpu).unwrap_err(), HardwareError::ArcCosineError);
    }

    #[test]
    fn atan2_of_zero_zero_raises_error() {
        let mut cpu = Cpu::new();
        cpu.instruction = PackedInstruction((0 << 21) | (1 << 17));
        cpu.registers[0] = Word::from_float(0.0);
        cpu.registers[1] = Word::from_float(0.0);
        assert_eq!(
            atan2(&mut cpu).unwrap_err(),
            HardwareError::ArcTangent2Error
        );
    }

    #[test]
    fn log_of_nonpositive_raises_error() {
        let mut cpu = cpu_reg1(0);
        cpu.registers[0] = Word::from_float(0.0);
        assert_eq!(log(&mut cpu).unwrap_err(), HardwareError::LogarithmError);
    }

    #[test]
    fn pow_negative_base_fractional_exponent_raises_error() {
        let mut cpu = Cpu::new();
        cpu.instruction = PackedInstruction((0 << 21) | (1 << 17));
        cpu.registers[0] = Word::from_float(-2.0);
        cpu.registers[1] = Word::from_float(0.5);
        assert_eq!(pow(&mut cpu).unwrap_err(), HardwareError::PowerError);
    }

    #[test]
    fn pow_negative_base_integer_exponent_succeeds() {
        let mut cpu = Cpu::new();
        cpu.instruction = PackedInstruction((0 << 21) | (1 << 17));
        cpu.registers[0] = Word::from_float(-2.0);
        cpu.registers[1] = Word::from_float(3.0);
        pow(&mut cpu).unwrap();
        assert_eq!(cpu.registers[0].float(), -8.0);
    }
}
