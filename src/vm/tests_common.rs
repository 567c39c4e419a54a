//! Shared helpers for the VM test modules below: assembling a raw word
//! list from `Opcode`/operand tuples without pulling in the `milo832-asm`
//! crate (which depends on this one).

use super::*;
use crate::isa::{Instruction, Opcode};

pub(crate) fn word(op: Opcode, rd: u8, rs1: u8, rs2: u8, rs3: u8, imm: i32) -> u64 {
    Instruction::new(op, rd, rs1, rs2, rs3, imm).encode()
}

pub(crate) fn vm_with_program(words: &[u64]) -> Vm<'static> {
    let mut vm = Vm::new();
    vm.load_binary(words).unwrap();
    vm
}

#[test]
fn register_zero_always_reads_zero() {
    let words = [
        word(Opcode::Add, 0, 0, 0, 0, 7),
        word(Opcode::Exit, 0, 0, 0, 0, 0),
    ];
    let mut vm = vm_with_program(&words);
    let _ = vm.exec_fragment(&FragmentIn {
        u: 0.0,
        v: 0.0,
        nx: 0.0,
        ny: 0.0,
        nz: 0.0,
        r: 0.0,
        g: 0.0,
        b: 0.0,
        a: 0.0,
        z: 0.0,
    });
    assert_eq!(vm.register(0).i(), 0);
}

#[test]
fn unknown_opcode_is_reported() {
    // Byte 0xA5 has no matching variant.
    let words = [0xA500_0000_0000_0000u64];
    let mut vm = vm_with_program(&words);
    let result = vm.exec_fragment(&FragmentIn {
        u: 0.0,
        v: 0.0,
        nx: 0.0,
        ny: 0.0,
        nz: 0.0,
        r: 0.0,
        g: 0.0,
        b: 0.0,
        a: 0.0,
        z: 0.0,
    });
    assert!(matches!(result, Err(VmError::UnknownOpcode { byte: 0xA5, .. })));
}

#[test]
fn cycle_limit_aborts_runaway_program() {
    // bra 0 forever.
    let words = [word(Opcode::Bra, 0, 0, 0, 0, 0)];
    let mut vm = vm_with_program(&words);
    vm.max_cycles = 10;
    let result = vm.exec_fragment(&FragmentIn {
        u: 0.0,
        v: 0.0,
        nx: 0.0,
        ny: 0.0,
        nz: 0.0,
        r: 0.0,
        g: 0.0,
        b: 0.0,
        a: 0.0,
        z: 0.0,
    });
    assert!(matches!(result, Err(VmError::CycleLimitExceeded(10))));
}
