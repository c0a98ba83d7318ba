//! Bitwise and integer/float arithmetic opcodes. Grounded on
//! `original_source/DesktopEmulator/Emulator/V32CPUProcessors.cpp`'s
//! `ProcessNOT`..`ProcessSHL` and `ProcessIADD`..`ProcessFABS`.

use super::Cpu;
use crate::error::HardwareError;
use crate::word::Word;

fn operand(cpu: &Cpu) -> Word {
    if cpu.instruction.uses_immediate() {
        cpu.immediate_value
    } else {
        cpu.register(cpu.instruction.reg2())
    }
}

pub(super) fn not(cpu: &mut Cpu) -> Result<(), HardwareError> {
    let reg1 = cpu.instruction.reg1();
    let r = cpu.register(reg1).unsigned();
    *cpu.register_mut(reg1) = Word::from_unsigned(!r);
    Ok(())
}

pub(super) fn and(cpu: &mut Cpu) -> Result<(), HardwareError> {
    let value = operand(cpu).unsigned();
    let reg1 = cpu.instruction.reg1();
    let r = cpu.register(reg1).unsigned();
    *cpu.register_mut(reg1) = Word::from_unsigned(r & value);
    Ok(())
}

pub(super) fn or(cpu: &mut Cpu) -> Result<(), HardwareError> {
    let value = operand(cpu).unsigned();
    let reg1 = cpu.instruction.reg1();
    let r = cpu.register(reg1).unsigned();
    *cpu.register_mut(reg1) = Word::from_unsigned(r | value);
    Ok(())
}

pub(super) fn xor(cpu: &mut Cpu) -> Result<(), HardwareError> {
    let value = operand(cpu).unsigned();
    let reg1 = cpu.instruction.reg1();
    let r = cpu.register(reg1).unsigned();
    *cpu.register_mut(reg1) = Word::from_unsigned(r ^ value);
    Ok(())
}

pub(super) fn bnot(cpu: &mut Cpu) -> Result<(), HardwareError> {
    let reg1 = cpu.instruction.reg1();
    let r = cpu.register(reg1).unsigned();
    *cpu.register_mut(reg1) = Word::from_unsigned((r == 0) as u32);
    Ok(())
}

pub(super) fn shl(cpu: &mut Cpu) -> Result<(), HardwareError> {
    let amount = operand(cpu).integer();
    let reg1 = cpu.instruction.reg1();
    let r = cpu.register(reg1).unsigned();
    // Negative shift amounts shift right, per `spec.md` §4.3.
    let shifted = if amount >= 0 {
        r.checked_shl(amount as u32).unwrap_or(0)
    } else {
        r.checked_shr((-amount) as u32).unwrap_or(0)
    };
    *cpu.register_mut(reg1) = Word::from_unsigned(shifted);
    Ok(())
}

pub(super) fn iadd(cpu: &mut Cpu) -> Result<(), HardwareError> {
    let value = operand(cpu).integer();
    let reg1 = cpu.instruction.reg1();
    let r = cpu.register(reg1).integer();
    *cpu.register_mut(reg1) = Word::from_integer(r.wrapping_add(value));
    Ok(())
}

pub(super) fn isub(cpu: &mut Cpu) -> Result<(), HardwareError> {
    let value = operand(cpu).integer();
    let reg1 = cpu.instruction.reg1();
    let r = cpu.register(reg1).integer();
    *cpu.register_mut(reg1) = Word::from_integer(r.wrapping_sub(value));
    Ok(())
}

pub(super) fn imul(cpu: &mut Cpu) -> Result<(), HardwareError> {
    let value = operand(cpu).integer();
    let reg1 = cpu.instruction.reg1();
    let r = cpu.register(reg1).integer();
    *cpu.register_mut(reg1) = Word::from_integer(r.wrapping_mul(value));
    Ok(())
}

pub(super) fn idiv(cpu: &mut Cpu) -> Result<(), HardwareError> {
    let divisor = operand(cpu).integer();
    if divisor == 0 {
        return Err(HardwareError::DivisionError);
    }
    let reg1 = cpu.instruction.reg1();
    let r = cpu.register(reg1).integer();
    *cpu.register_mut(reg1) = Word::from_integer(r.wrapping_div(divisor));
    Ok(())
}

pub(super) fn imod(cpu: &mut Cpu) -> Result<(), HardwareError> {
    let divisor = operand(cpu).integer();
    if divisor == 0 {
        return Err(HardwareError::DivisionError);
    }
    let reg1 = cpu.instruction.reg1();
    let r = cpu.register(reg1).integer();
    *cpu.register_mut(reg1) = Word::from_integer(r.wrapping_rem(divisor));
    Ok(())
}

pub(super) fn isgn(cpu: &mut Cpu) -> Result<(), HardwareError> {
    let reg1 = cpu.instruction.reg1();
    let r = cpu.register(reg1).integer();
    *cpu.register_mut(reg1) = Word::from_integer(r.wrapping_neg());
    Ok(())
}

pub(super) fn imin(cpu: &mut Cpu) -> Result<(), HardwareError> {
    let value = operand(cpu).integer();
    let reg1 = cpu.instruction.reg1();
    let r = cpu.register(reg1).integer();
    *cpu.register_mut(reg1) = Word::from_integer(r.min(value));
    Ok(())
}

pub(super) fn imax(cpu: &mut Cpu) -> Result<(), HardwareError> {
    let value = operand(cpu).integer();
    let reg1 = cpu.instruction.reg1();
    let r = cpu.register(reg1).integer();
    *cpu.register_mut(reg1) = Word::from_integer(r.max(value));
    Ok(())
}

pub(super) fn iabs(cpu: &mut Cpu) -> Result<(), HardwareError> {
    let reg1 = cpu.instruction.reg1();
    let r = cpu.register(reg1).integer();
    *cpu.register_mut(reg1) = Word::from_integer(r.wrapping_abs());
    Ok(())
}

pub(super) fn fadd(cpu: &mut Cpu) -> Result<(), HardwareError> {
    let value = operand(cpu).float();
    let reg1 = cpu.instruction.reg1();
    let r = cpu.register(reg1).float();
    *cpu.register_mut(reg1) = Word::from_float(r + value);
    Ok(())
}

pub(super) fn fsub(cpu: &mut Cpu) -> Result<(), HardwareError> {
    let value = operand(cpu).float();
    let reg1 = cpu.instruction.reg1();
    let r = cpu.register(reg1).float();
    *cpu.register_mut(reg1) = Word::from_float(r - value);
    Ok(())
}

pub(super) fn fmul(cpu: &mut Cpu) -> Result<(), HardwareError> {
    let value = operand(cpu).float();
    let reg1 = cpu.instruction.reg1();
    let r = cpu.register(reg1).float();
    *cpu.register_mut(reg1) = Word::from_float(r * value);
    Ok(())
}

pub(super) fn fdiv(cpu: &mut Cpu) -> Result<(), HardwareError> {
    let divisor = operand(cpu).float();
    if divisor == 0.0 {
        return Err(HardwareError::DivisionError);
    }
    let reg1 = cpu.instruction.reg1();
    let r = cpu.register(reg1).float();
    *cpu.register_mut(reg1) = Word::from_float(r / divisor);
    Ok(())
}

pub(super) fn fmod_(cpu: &mut Cpu) -> Result<(), HardwareError> {
    let divisor = operand(cpu).float();
    if divisor == 0.0 {
        return Err(HardwareError::DivisionError);
    }
    let reg1 = cpu.instruction.reg1();
    let r = cpu.register(reg1).float();
    *cpu.register_mut(reg1) = Word::from_float(r % divisor);
    Ok(())
}

pub(super) fn fsgn(cpu: &mut Cpu) -> Result<(), HardwareError> {
    let reg1 = cpu.instruction.reg1();
    let r = cpu.register(reg1).float();
    *cpu.register_mut(reg1) = Word::from_float(-r);
    Ok(())
}

pub(super) fn fmin(cpu: &mut Cpu) -> Result<(), HardwareError> {
    let value = operand(cpu).float();
    let reg1 = cpu.instruction.reg1();
    let r = cpu.register(reg1).float();
    *cpu.register_mut(reg1) = Word::from_float(r.min(value));
    Ok(())
}

pub(super) fn fmax(cpu: &mut Cpu) -> Result<(), HardwareError> {
    let value = operand(cpu).float();
    let reg1 = cpu.instruction.reg1();
    let r = cpu.register(reg1).float();
    *cpu.register_mut(reg1) = Word::from_float(r.max(value));
    Ok(())
}

pub(super) fn fabs(cpu: &mut Cpu) -> Result<(), HardwareError> {
    let reg1 = cpu.instruction.reg1();
    let r = cpu.register(reg1).float();
    *cpu.register_mut(reg1) = Word::from_float(r.abs());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::word::PackedInstruction;

    fn cpu_reg1(reg1: u32, uses_immediate: bool) -> Cpu {
        let mut cpu = Cpu::new();
        cpu.instruction = PackedInstruction((reg1 << 21) | ((uses_immediate as u32) << 25));
        cpu
    }

    #[test]
    fn shl_negative_amount_shifts_right() {
        let mut cpu = cpu_reg1(0, true);
        cpu.registers[0] = Word::from_unsigned(0b1000);
        cpu.immediate_value = Word::from_integer(-2);
        shl(&mut cpu).unwrap();
        assert_eq!(cpu.registers[0].unsigned(), 0b0010);
    }

    #[test]
    fn idiv_by_zero_raises_division_error() {
        let mut cpu = cpu_reg1(0, true);
        cpu.immediate_value = Word::from_integer(0);
        let err = idiv(&mut cpu).unwrap_err();
        assert_eq!(err, HardwareError::DivisionError);
    }

    #[test]
    fn fmod_matches_rust_float_remainder() {
        let mut cpu = cpu_reg1(0, true);
        cpu.registers[0] = Word::from_float(5.5);
        cpu.immediate_value = Word::from_float(2.0);
        fmod_(&mut cpu).unwrap();
        assert_eq!(cpu.registers[0].float(), 5.5f32 % 2.0f32);
    }

    #[test]
    fn bnot_is_logical_not_of_binary_value() {
        let mut cpu = cpu_reg1(0, false);
        cpu.registers[0] = Word::from_unsigned(0);
        bnot(&mut cpu).unwrap();
        assert_eq!(cpu.registers[0].unsigned(), 1);
    }

    #[test]
    fn iabs_handles_min_value_via_wrapping() {
        let mut cpu = cpu_reg1(0, false);
        cpu.registers[0] = Word::from_integer(i32::MIN);
        iabs(&mut cpu).unwrap();
        assert_eq!(cpu.registers[0].integer(), i32::MIN);
    }
}
