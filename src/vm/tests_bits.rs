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

fn run_with(a: i32, b: i32, op: Opcode, rd: u8) -> super::Vm<'static> {
    let words = [
        word(Opcode::Add, 1, 0, 0, 0, a),
        word(Opcode::Add, 2, 0, 0, 0, b),
        word(op, rd, 1, 2, 0, 0),
        word(Opcode::Exit, 0, 0, 0, 0, 0),
    ];
    let mut vm = vm_with_program(&words);
    vm.exec_fragment(&blank_fragment()).unwrap();
    vm
}

#[test]
fn and_or_xor_not_match_bitwise_semantics() {
    let vm = run_with(0b1100, 0b1010, Opcode::And, 10);
    assert_eq!(vm.register(10).u(), 0b1000);
    let vm = run_with(0b1100, 0b1010, Opcode::Or, 10);
    assert_eq!(vm.register(10).u(), 0b1110);
    let vm = run_with(0b1100, 0b1010, Opcode::Xor, 10);
    assert_eq!(vm.register(10).u(), 0b0110);

    let words = [
        word(Opcode::Add, 1, 0, 0, 0, 0),
        word(Opcode::Not, 2, 1, 0, 0, 0),
        word(Opcode::Exit, 0, 0, 0, 0, 0),
    ];
    let mut vm = vm_with_program(&words);
    vm.exec_fragment(&blank_fragment()).unwrap();
    assert_eq!(vm.register(2).u(), u32::MAX);
}

#[test]
fn popc_counts_set_bits() {
    let words = [
        word(Opcode::Add, 1, 0, 0, 0, 0b1011_0110),
        word(Opcode::Popc, 2, 1, 0, 0, 0),
        word(Opcode::Exit, 0, 0, 0, 0, 0),
    ];
    let mut vm = vm_with_program(&words);
    vm.exec_fragment(&blank_fragment()).unwrap();
    assert_eq!(vm.register(2).i(), 5);
}

#[test]
fn popc_of_value_and_its_complement_sum_to_32() {
    let words = [
        word(Opcode::Add, 1, 0, 0, 0, 0x5A5A),
        word(Opcode::Not, 2, 1, 0, 0, 0),
        word(Opcode::Popc, 3, 1, 0, 0, 0),
        word(Opcode::Popc, 4, 2, 0, 0, 0),
        word(Opcode::Exit, 0, 0, 0, 0, 0),
    ];
    let mut vm = vm_with_program(&words);
    vm.exec_fragment(&blank_fragment()).unwrap();
    assert_eq!(vm.register(3).i() + vm.register(4).i(), 32);
}

#[test]
fn clz_counts_leading_zeros() {
    let words = [
        word(Opcode::Add, 1, 0, 0, 0, 1),
        word(Opcode::Clz, 2, 1, 0, 0, 0),
        word(Opcode::Exit, 0, 0, 0, 0, 0),
    ];
    let mut vm = vm_with_program(&words);
    vm.exec_fragment(&blank_fragment()).unwrap();
    assert_eq!(vm.register(2).i(), 31);
}

#[test]
fn brev_is_its_own_inverse() {
    let words = [
        word(Opcode::Add, 1, 0, 0, 0, 0x1234_5678u32 as i32),
        word(Opcode::Brev, 2, 1, 0, 0, 0),
        word(Opcode::Brev, 3, 2, 0, 0, 0),
        word(Opcode::Exit, 0, 0, 0, 0, 0),
    ];
    let mut vm = vm_with_program(&words);
    vm.exec_fragment(&blank_fragment()).unwrap();
    assert_eq!(vm.register(3).u(), 0x1234_5678);
}

#[test]
fn cnot_is_true_exactly_at_zero() {
    let words = [
        word(Opcode::Add, 1, 0, 0, 0, 0),
        word(Opcode::Add, 2, 0, 0, 0, 9),
        word(Opcode::Cnot, 3, 1, 0, 0, 0),
        word(Opcode::Cnot, 4, 2, 0, 0, 0),
        word(Opcode::Exit, 0, 0, 0, 0, 0),
    ];
    let mut vm = vm_with_program(&words);
    vm.exec_fragment(&blank_fragment()).unwrap();
    assert_eq!(vm.register(3).u(), 1);
    assert_eq!(vm.register(4).u(), 0);
}
