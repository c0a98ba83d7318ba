//! Jumps, calls and the int/float comparison opcodes. Grounded on
//! `original_source/DesktopEmulator/Emulator/V32CPUProcessors.cpp`'s
//! `ProcessJMP`/`ProcessCALL`/`ProcessRET`/`ProcessJT`/`ProcessJF` and the
//! twelve `Process{I,F}{EQ,NE,GT,GE,LT,LE}` comparators.

use super::Cpu;
use crate::bus::SystemBus;
use crate::error::HardwareError;
use crate::word::Word;

fn jump_target(cpu: &Cpu, target_reg: u32) -> Word {
    if cpu.instruction.uses_immediate() {
        cpu.immediate_value
    } else {
        cpu.register(target_reg)
    }
}

pub(super) fn jmp(cpu: &mut Cpu) -> Result<(), HardwareError> {
    cpu.instruction_pointer = jump_target(cpu, cpu.instruction.reg1());
    Ok(())
}

pub(super) fn call(cpu: &mut Cpu, bus: &mut dyn SystemBus) -> Result<(), HardwareError> {
    super::load_store::push_word(cpu, bus, cpu.instruction_pointer)?;
    cpu.instruction_pointer = jump_target(cpu, cpu.instruction.reg1());
    Ok(())
}

pub(super) fn ret(cpu: &mut Cpu, bus: &mut dyn SystemBus) -> Result<(), HardwareError> {
    cpu.instruction_pointer = super::load_store::pop_word(cpu, bus)?;
    Ok(())
}

pub(super) fn jt(cpu: &mut Cpu) -> Result<(), HardwareError> {
    let condition = cpu.register(cpu.instruction.reg1()).unsigned();
    if condition != 0 {
        cpu.instruction_pointer = jump_target(cpu, cpu.instruction.reg2());
    }
    Ok(())
}

pub(super) fn jf(cpu: &mut Cpu) -> Result<(), HardwareError> {
    let condition = cpu.register(cpu.instruction.reg1()).unsigned();
    if condition == 0 {
        cpu.instruction_pointer = jump_target(cpu, cpu.instruction.reg2());
    }
    Ok(())
}

fn compare_operand(cpu: &Cpu) -> Word {
    if cpu.instruction.uses_immediate() {
        cpu.immediate_value
    } else {
        cpu.register(cpu.instruction.reg2())
    }
}

pub(super) fn int_compare(
    cpu: &mut Cpu,
    compare: impl Fn(i32, i32) -> bool,
) -> Result<(), HardwareError> {
    let value = compare_operand(cpu).integer();
    let reg1 = cpu.instruction.reg1();
    let result = compare(cpu.register(reg1).integer(), value);
    *cpu.register_mut(reg1) = Word::from_unsigned(result as u32);
    Ok(())
}

pub(super) fn float_compare(
    cpu: &mut Cpu,
    compare: impl Fn(f32, f32) -> bool,
) -> Result<(), HardwareError> {
    let value = compare_operand(cpu).float();
    let reg1 = cpu.instruction.reg1();
    let result = compare(cpu.register(reg1).float(), value);
    *cpu.register_mut(reg1) = Word::from_unsigned(result as u32);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cpu::REGISTER_COUNT;
    use crate::word::PackedInstruction;

    struct FakeBus;
    impl SystemBus for FakeBus {
        fn read_memory(&mut self, _addr: u32) -> Result<Word, HardwareError> {
            Ok(Word::zero())
        }
        fn write_memory(&mut self, _addr: u32, _value: Word) -> Result<(), HardwareError> {
            Ok(())
        }
        fn read_port(&mut self, _port: u32) -> Result<Word, HardwareError> {
            Ok(Word::zero())
        }
        fn write_port(&mut self, _port: u32, _value: Word) -> Result<(), HardwareError> {
            Ok(())
        }
    }

    fn cpu_with(reg1: u32, reg2: u32, uses_immediate: bool) -> Cpu {
        let mut cpu = Cpu::new();
        let raw = (reg1 << 21) | (reg2 << 17) | ((uses_immediate as u32) << 25);
        cpu.instruction = PackedInstruction(raw);
        cpu
    }

    #[test]
    fn jt_jumps_only_on_nonzero_condition() {
        let mut cpu = cpu_with(0, 1, true);
        cpu.registers[0] = Word::from_integer(1);
        cpu.immediate_value = Word::from_integer(999);
        jt(&mut cpu).unwrap();
        assert_eq!(cpu.instruction_pointer.integer(), 999);
    }

    #[test]
    fn jf_skips_when_condition_true() {
        let mut cpu = cpu_with(0, 1, true);
        cpu.registers[0] = Word::from_integer(1);
        cpu.immediate_value = Word::from_integer(999);
        cpu.instruction_pointer = Word::from_integer(5);
        jf(&mut cpu).unwrap();
        assert_eq!(cpu.instruction_pointer.integer(), 5);
    }

    #[test]
    fn call_pushes_return_address_then_jumps() {
        let mut cpu = cpu_with(0, 0, true);
        cpu.instruction_pointer = Word::from_integer(42);
        cpu.immediate_value = Word::from_integer(1000);
        cpu.registers[super::super::STACK_POINTER] =
            Word::from_integer(crate::constants::RAM_SIZE as i32);
        let mut bus = FakeBus;
        call(&mut cpu, &mut bus).unwrap();
        assert_eq!(cpu.instruction_pointer.integer(), 1000);
        assert_eq!(
            cpu.registers[super::super::STACK_POINTER].integer(),
            crate::constants::RAM_SIZE as i32 - 1
        );
        let _ = REGISTER_COUNT;
    }

    #[test]
    fn ieq_stores_boolean_into_reg1() {
        let mut cpu = cpu_with(0, 1, false);
        cpu.registers[0] = Word::from_integer(5);
        cpu.registers[1] = Word::from_integer(5);
        int_compare(&mut cpu, |a, b| a == b).unwrap();
        assert_eq!(cpu.registers[0].unsigned(), 1);
    }

    #[test]
    fn fgt_compares_as_float() {
        let mut cpu = cpu_with(0, 1, false);
        cpu.registers[0] = Word::from_float(3.0);
        cpu.registers[1] = Word::from_float(2.0);
        float_compare(&mut cpu, |a, b| a > b).unwrap();
        assert_eq!(cpu.registers[0].unsigned(), 1);
    }
}
