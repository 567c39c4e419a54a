use super::tests_common::{vm_with_program, word};
use super::FragmentIn;
use crate::isa::Opcode;

fn blank_fragment() -> FragmentIn {
    FragmentIn {
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
    }
}

#[test]
fn add_prefers_immediate_when_nonzero() {
    let words = [
        word(Opcode::Add, 1, 0, 0, 0, 5),
        word(Opcode::Add, 2, 1, 1, 0, 0), // imm == 0, uses rs2
        word(Opcode::Exit, 0, 0, 0, 0, 0),
    ];
    let mut vm = vm_with_program(&words);
    vm.exec_fragment(&blank_fragment()).unwrap();
    assert_eq!(vm.register(2).i(), 10);
}

#[test]
fn idiv_and_irem_by_zero_yield_zero() {
    let words = [
        word(Opcode::Add, 1, 0, 0, 0, 7),
        word(Opcode::Idiv, 2, 1, 0, 0, 0),
        word(Opcode::Irem, 3, 1, 0, 0, 0),
        word(Opcode::Exit, 0, 0, 0, 0, 0),
    ];
    let mut vm = vm_with_program(&words);
    vm.exec_fragment(&blank_fragment()).unwrap();
    assert_eq!(vm.register(2).i(), 0);
    assert_eq!(vm.register(3).i(), 0);
}

#[test]
fn imad_multiplies_and_accumulates() {
    let words = [
        word(Opcode::Add, 1, 0, 0, 0, 3),
        word(Opcode::Add, 2, 0, 0, 0, 4),
        word(Opcode::Add, 3, 0, 0, 0, 2),
        word(Opcode::Imad, 4, 1, 2, 3, 0), // 3*4+2 = 14
        word(Opcode::Exit, 0, 0, 0, 0, 0),
    ];
    let mut vm = vm_with_program(&words);
    vm.exec_fragment(&blank_fragment()).unwrap();
    assert_eq!(vm.register(4).i(), 14);
}

#[test]
fn iabs_imin_imax_pick_correctly() {
    let words = [
        word(Opcode::Add, 1, 0, 0, 0, -8),
        word(Opcode::Add, 2, 0, 0, 0, 3),
        word(Opcode::Iabs, 3, 1, 0, 0, 0),
        word(Opcode::Imin, 4, 1, 2, 0, 0),
        word(Opcode::Imax, 5, 1, 2, 0, 0),
        word(Opcode::Exit, 0, 0, 0, 0, 0),
    ];
    let mut vm = vm_with_program(&words);
    vm.exec_fragment(&blank_fragment()).unwrap();
    assert_eq!(vm.register(3).i(), 8);
    assert_eq!(vm.register(4).i(), -8);
    assert_eq!(vm.register(5).i(), 3);
}

#[test]
fn slt_sle_seq_write_booleans() {
    let words = [
        word(Opcode::Add, 1, 0, 0, 0, 3),
        word(Opcode::Add, 2, 0, 0, 0, 5),
        word(Opcode::Slt, 10, 1, 2, 0, 0),
        word(Opcode::Sle, 11, 1, 1, 0, 0),
        word(Opcode::Seq, 12, 1, 1, 0, 0),
        word(Opcode::Exit, 0, 0, 0, 0, 0),
    ];
    let mut vm = vm_with_program(&words);
    vm.exec_fragment(&blank_fragment()).unwrap();
    assert_eq!(vm.register(10).i(), 1);
    assert_eq!(vm.register(11).i(), 1);
    assert_eq!(vm.register(12).i(), 1);
}

#[test]
fn shr_is_unsigned_sha_is_arithmetic() {
    let words = [
        word(Opcode::Add, 1, 0, 0, 0, -8), // 0xFFFFFFF8
        word(Opcode::Add, 2, 0, 0, 0, 1),
        word(Opcode::Shr, 3, 1, 2, 0, 0),
        word(Opcode::Sha, 4, 1, 2, 0, 0),
        word(Opcode::Exit, 0, 0, 0, 0, 0),
    ];
    let mut vm = vm_with_program(&words);
    vm.exec_fragment(&blank_fragment()).unwrap();
    assert_eq!(vm.register(3).u(), (-8i32 as u32) >> 1);
    assert_eq!(vm.register(4).i(), -8i32 >> 1);
}

#[test]
fn shift_amount_masked_to_5_bits() {
    let words = [
        word(Opcode::Add, 1, 0, 0, 0, 1),
        word(Opcode::Add, 2, 0, 0, 0, 33), // 33 & 31 == 1
        word(Opcode::Shl, 3, 1, 2, 0, 0),
        word(Opcode::Exit, 0, 0, 0, 0, 0),
    ];
    let mut vm = vm_with_program(&words);
    vm.exec_fragment(&blank_fragment()).unwrap();
    assert_eq!(vm.register(3).u(), 2);
}

#[test]
fn selp_selects_by_predicate_register() {
    let words = [
        word(Opcode::Add, 1, 0, 0, 0, 111),
        word(Opcode::Add, 2, 0, 0, 0, 222),
        word(Opcode::Add, 3, 0, 0, 0, 1), // nonzero predicate
        word(Opcode::Selp, 4, 1, 2, 3, 0),
        word(Opcode::Exit, 0, 0, 0, 0, 0),
    ];
    let mut vm = vm_with_program(&words);
    vm.exec_fragment(&blank_fragment()).unwrap();
    assert_eq!(vm.register(4).i(), 111);
}
