use super::tests_common::word;
use super::{FragmentIn, Vm};
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

/// Builds a VM whose constant pool holds `values` at consecutive words
/// starting at `0x1000`, with a program that `ldr`s each into `r1, r2, ...`
/// before `extra` runs. There is no assembler available at this layer, so
/// floats are round-tripped through memory the way the original's `.data`
/// constant pool does.
fn vm_with_floats(values: &[f32], extra: &[u64]) -> Vm<'static> {
    let mut vm = Vm::new();
    let data: Vec<(u32, u32)> = values
        .iter()
        .enumerate()
        .map(|(i, v)| (0x1000 + 4 * i as u32, v.to_bits()))
        .collect();
    vm.load_data(&data);

    let mut words = Vec::new();
    for (i, _) in values.iter().enumerate() {
        let addr_reg = 20 + i as u8;
        words.push(word(Opcode::Add, addr_reg, 0, 0, 0, 0x1000 + 4 * i as i32));
        words.push(word(Opcode::Ldr, 1 + i as u8, addr_reg, 0, 0, 0));
    }
    words.extend_from_slice(extra);
    vm.load_binary(&words).unwrap();
    vm
}

#[test]
fn fadd_fsub_fmul_on_loaded_floats() {
    let mut vm = vm_with_floats(
        &[2.0, 3.0],
        &[
            word(Opcode::Fadd, 3, 1, 2, 0, 0),
            word(Opcode::Fsub, 4, 2, 1, 0, 0),
            word(Opcode::Fmul, 5, 1, 2, 0, 0),
            word(Opcode::Exit, 0, 0, 0, 0, 0),
        ],
    );
    vm.exec_fragment(&blank_fragment()).unwrap();
    assert_eq!(vm.register(3).f(), 5.0);
    assert_eq!(vm.register(4).f(), 1.0);
    assert_eq!(vm.register(5).f(), 6.0);
}

#[test]
fn fdiv_by_zero_yields_zero_not_inf() {
    let mut vm = vm_with_floats(
        &[5.0],
        &[
            word(Opcode::Fdiv, 2, 1, 0, 0, 0), // r0 == 0.0
            word(Opcode::Exit, 0, 0, 0, 0, 0),
        ],
    );
    vm.exec_fragment(&blank_fragment()).unwrap();
    assert_eq!(vm.register(2).f(), 0.0);
}

#[test]
fn ffma_multiplies_and_adds() {
    let mut vm = vm_with_floats(
        &[2.0, 3.0, 4.0],
        &[
            word(Opcode::Ffma, 4, 1, 2, 3, 0), // 2*3+4 = 10
            word(Opcode::Exit, 0, 0, 0, 0, 0),
        ],
    );
    vm.exec_fragment(&blank_fragment()).unwrap();
    assert_eq!(vm.register(4).f(), 10.0);
}

#[test]
fn fneg_fabs_roundtrip() {
    let mut vm = vm_with_floats(
        &[3.5],
        &[
            word(Opcode::Fneg, 2, 1, 0, 0, 0),
            word(Opcode::Fabs, 3, 2, 0, 0, 0),
            word(Opcode::Exit, 0, 0, 0, 0, 0),
        ],
    );
    vm.exec_fragment(&blank_fragment()).unwrap();
    assert_eq!(vm.register(2).f(), -3.5);
    assert_eq!(vm.register(3).f(), 3.5);
}

#[test]
fn fmin_fmax_pick_correctly() {
    let mut vm = vm_with_floats(
        &[1.0, 2.0],
        &[
            word(Opcode::Fmin, 3, 1, 2, 0, 0),
            word(Opcode::Fmax, 4, 1, 2, 0, 0),
            word(Opcode::Exit, 0, 0, 0, 0, 0),
        ],
    );
    vm.exec_fragment(&blank_fragment()).unwrap();
    assert_eq!(vm.register(3).f(), 1.0);
    assert_eq!(vm.register(4).f(), 2.0);
}

#[test]
fn ftoi_truncates_and_itof_converts_back() {
    let mut vm = vm_with_floats(
        &[7.75],
        &[
            word(Opcode::Ftoi, 2, 1, 0, 0, 0),
            word(Opcode::Itof, 3, 2, 0, 0, 0),
            word(Opcode::Exit, 0, 0, 0, 0, 0),
        ],
    );
    vm.exec_fragment(&blank_fragment()).unwrap();
    assert_eq!(vm.register(2).i(), 7);
    assert_eq!(vm.register(3).f(), 7.0);
}

/// `FSLT`/`FSLE`/`FSEQ` are reserved-but-dead in the original VM's switch;
/// implemented for real here since `spec.md` documents their shape as
/// matching the integer comparisons.
#[test]
fn float_comparisons_mirror_integer_ones() {
    let mut vm = vm_with_floats(
        &[1.0, 2.0],
        &[
            word(Opcode::Fslt, 10, 1, 2, 0, 0),
            word(Opcode::Fsle, 11, 1, 1, 0, 0),
            word(Opcode::Fseq, 12, 1, 1, 0, 0),
            word(Opcode::Exit, 0, 0, 0, 0, 0),
        ],
    );
    vm.exec_fragment(&blank_fragment()).unwrap();
    assert_eq!(vm.register(10).i(), 1);
    assert_eq!(vm.register(11).i(), 1);
    assert_eq!(vm.register(12).i(), 1);
}

/// SFU guard conventions from `milo_vm.c`'s `sfu_rcp`/`sfu_log2`/
/// `sfu_rsqrt`/`sfu_sqrt`.
#[test]
fn sfu_guards_on_degenerate_inputs() {
    let mut vm = vm_with_floats(
        &[],
        &[
            word(Opcode::SfuRcp, 1, 0, 0, 0, 0),   // rcp(0) = +inf
            word(Opcode::SfuLog2, 2, 0, 0, 0, 0),  // log2(0) = -inf
            word(Opcode::SfuRsqrt, 3, 0, 0, 0, 0), // rsqrt(0) = +inf
            word(Opcode::SfuSqrt, 4, 0, 0, 0, 0),  // sqrt(0) = 0
            word(Opcode::Exit, 0, 0, 0, 0, 0),
        ],
    );
    vm.exec_fragment(&blank_fragment()).unwrap();
    assert_eq!(vm.register(1).f(), f32::INFINITY);
    assert_eq!(vm.register(2).f(), f32::NEG_INFINITY);
    assert_eq!(vm.register(3).f(), f32::INFINITY);
    assert_eq!(vm.register(4).f(), 0.0);
}

#[test]
fn sfu_sqrt_of_negative_clamps_to_zero() {
    let mut vm = vm_with_floats(
        &[-4.0],
        &[
            word(Opcode::SfuSqrt, 2, 1, 0, 0, 0),
            word(Opcode::Exit, 0, 0, 0, 0, 0),
        ],
    );
    vm.exec_fragment(&blank_fragment()).unwrap();
    assert_eq!(vm.register(2).f(), 0.0);
}
