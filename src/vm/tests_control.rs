use super::tests_common::{vm_with_program, word};
use super::*;
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
fn mov_copies_bits_unchanged() {
    let words = [
        word(Opcode::Add, 1, 0, 0, 0, 42),
        word(Opcode::Mov, 2, 1, 0, 0, 0),
        word(Opcode::Exit, 0, 0, 0, 0, 0),
    ];
    let mut vm = vm_with_program(&words);
    vm.exec_fragment(&blank_fragment()).unwrap();
    assert_eq!(vm.register(2).i(), 42);
}

#[test]
fn beq_branches_when_equal() {
    let words = [
        word(Opcode::Beq, 0, 0, 0, 0, 3), // r0 == r0, jump to pc 3
        word(Opcode::Add, 5, 0, 0, 0, 99), // skipped
        word(Opcode::Exit, 0, 0, 0, 0, 0),
        word(Opcode::Add, 5, 0, 0, 0, 7),
        word(Opcode::Exit, 0, 0, 0, 0, 0),
    ];
    let mut vm = vm_with_program(&words);
    vm.exec_fragment(&blank_fragment()).unwrap();
    assert_eq!(vm.register(5).i(), 7);
}

#[test]
fn call_and_ret_round_trip_pc() {
    let words = [
        word(Opcode::Call, 0, 0, 0, 0, 2),
        word(Opcode::Exit, 0, 0, 0, 0, 0),
        word(Opcode::Add, 9, 0, 0, 0, 123),
        word(Opcode::Ret, 0, 0, 0, 0, 0),
    ];
    let mut vm = vm_with_program(&words);
    vm.exec_fragment(&blank_fragment()).unwrap();
    assert_eq!(vm.register(9).i(), 123);
}

#[test]
fn ret_with_empty_stack_halts() {
    let words = [word(Opcode::Ret, 0, 0, 0, 0, 0)];
    let mut vm = vm_with_program(&words);
    let out = vm.exec_fragment(&blank_fragment()).unwrap();
    assert_eq!(vm.status(), ExecStatus::Halted);
    assert!(!out.discard);
}

#[test]
fn tid_is_always_zero_single_lane() {
    let words = [
        word(Opcode::Tid, 1, 0, 0, 0, 0),
        word(Opcode::Exit, 0, 0, 0, 0, 0),
    ];
    let mut vm = vm_with_program(&words);
    vm.exec_fragment(&blank_fragment()).unwrap();
    assert_eq!(vm.register(1).i(), 0);
}

#[test]
fn discard_sets_discarded_status() {
    let words = [word(Opcode::Discard, 0, 0, 0, 0, 0)];
    let mut vm = vm_with_program(&words);
    let out = vm.exec_fragment(&blank_fragment()).unwrap();
    assert_eq!(vm.status(), ExecStatus::Discarded);
    assert!(out.discard);
}

/// Scenario 4 from `spec.md` §8: `ssy END; beq r0, r0, END; nop; END: join; exit`
/// terminates in <= 6 cycles with an empty divergence stack.
#[test]
fn divergence_stack_scenario() {
    let words = [
        word(Opcode::Ssy, 0, 0, 0, 0, 3),  // 0: ssy END(=3)
        word(Opcode::Beq, 0, 0, 0, 0, 3),  // 1: beq r0, r0, END
        word(Opcode::Nop, 0, 0, 0, 0, 0),  // 2: nop (skipped)
        word(Opcode::Join, 0, 0, 0, 0, 0), // 3: END: join
        word(Opcode::Exit, 0, 0, 0, 0, 0), // 4: exit
    ];
    let mut vm = vm_with_program(&words);
    let result = vm.exec_fragment(&blank_fragment());
    assert!(result.is_ok());
    assert!(vm.div_stack.is_empty());
    assert!(vm.cycle_count <= 6);
}

#[test]
fn ssy_overflow_clamps_instead_of_erroring() {
    let mut words = Vec::new();
    for _ in 0..300 {
        words.push(word(Opcode::Ssy, 0, 0, 0, 0, 0));
    }
    words.push(word(Opcode::Exit, 0, 0, 0, 0, 0));
    let mut vm = vm_with_program(&words);
    vm.exec_fragment(&blank_fragment()).unwrap();
    assert_eq!(vm.div_stack.len(), crate::constants::STACK_SIZE);
}
