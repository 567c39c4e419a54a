//! The single-instruction step function: decode, read sources, advance pc,
//! perform the opcode's effect. Grounded on `vm_step` in
//! `examples/original_source/tools/shader/milo_vm.c`; kept as a free
//! function over `&mut Vm` the way the teacher's `processor/logic.rs`
//! keeps `tick` as a free function over `&mut [Register]` rather than a
//! method, so the decode/dispatch logic is easy to unit test in isolation.

use super::{Vm, VmError};
use crate::constants::REGISTER_COUNT;
use crate::isa::{Instruction, Opcode};
use crate::memory::Storage;
use crate::register::Register;
use crate::texture;

pub enum StepOutcome {
    Continue,
    Halted,
    Discarded,
    Error(VmError),
}

fn sfu_log2(x: f32) -> f32 {
    if x <= 0.0 {
        f32::NEG_INFINITY
    } else {
        x.log2()
    }
}

fn sfu_rcp(x: f32) -> f32 {
    if x == 0.0 {
        f32::INFINITY
    } else {
        1.0 / x
    }
}

fn sfu_rsqrt(x: f32) -> f32 {
    if x <= 0.0 {
        f32::INFINITY
    } else {
        1.0 / x.sqrt()
    }
}

fn sfu_sqrt(x: f32) -> f32 {
    if x < 0.0 {
        0.0
    } else {
        x.sqrt()
    }
}

pub fn step<'tex>(vm: &mut Vm<'tex>) -> StepOutcome {
    if vm.pc as usize >= vm.code.len() {
        return StepOutcome::Error(VmError::PcOutOfBounds(vm.pc));
    }

    let word = vm.code[vm.pc as usize];
    let inst = match Instruction::decode(word) {
        Some(inst) => inst,
        None => {
            let byte = ((word >> 56) & 0xFF) as u8;
            return StepOutcome::Error(VmError::UnknownOpcode { byte, pc: vm.pc });
        }
    };

    macro_rules! reg {
        ($id:expr) => {
            match reg_index($id) {
                Some(idx) => vm.regs[idx],
                None => return StepOutcome::Error(VmError::InvalidRegister($id)),
            }
        };
    }
    macro_rules! set_reg {
        ($id:expr, $value:expr) => {
            match reg_index($id) {
                Some(idx) => $value(&mut vm.regs[idx]),
                None => return StepOutcome::Error(VmError::InvalidRegister($id)),
            }
        };
    }

    vm.regs[0] = Register::zero();

    let rs1 = reg!(inst.rs1);
    let rs2 = reg!(inst.rs2);
    let f1 = rs1.f();
    let f2 = rs2.f();
    let i1 = rs1.i();
    let i2 = rs2.i();
    let u1 = rs1.u();
    let u2 = rs2.u();
    let imm = inst.imm;

    vm.pc = vm.pc.wrapping_add(1);
    vm.cycle_count += 1;

    match inst.opcode {
        Opcode::Nop => {}

        Opcode::Exit => return StepOutcome::Halted,
        Opcode::Discard => return StepOutcome::Discarded,

        Opcode::Mov => set_reg!(inst.rd, |r: &mut Register| r.set_u(u1)),

        Opcode::Add => {
            let sum = if imm != 0 { i1.wrapping_add(imm) } else { i1.wrapping_add(i2) };
            set_reg!(inst.rd, |r: &mut Register| r.set_i(sum));
        }
        Opcode::Sub => set_reg!(inst.rd, |r: &mut Register| r.set_i(i1.wrapping_sub(i2))),
        Opcode::Mul => set_reg!(inst.rd, |r: &mut Register| r.set_i(i1.wrapping_mul(i2))),
        Opcode::Neg => set_reg!(inst.rd, |r: &mut Register| r.set_i(i1.wrapping_neg())),
        Opcode::Idiv => {
            let v = if i2 == 0 { 0 } else { i1.wrapping_div(i2) };
            set_reg!(inst.rd, |r: &mut Register| r.set_i(v));
        }
        Opcode::Irem => {
            let v = if i2 == 0 { 0 } else { i1.wrapping_rem(i2) };
            set_reg!(inst.rd, |r: &mut Register| r.set_i(v));
        }
        Opcode::Iabs => {
            let v = if i1 < 0 { i1.wrapping_neg() } else { i1 };
            set_reg!(inst.rd, |r: &mut Register| r.set_i(v));
        }
        Opcode::Imin => set_reg!(inst.rd, |r: &mut Register| r.set_i(i1.min(i2))),
        Opcode::Imax => set_reg!(inst.rd, |r: &mut Register| r.set_i(i1.max(i2))),
        Opcode::Imad => {
            let rs3 = reg!(inst.rs3);
            let v = i1.wrapping_mul(i2).wrapping_add(rs3.i());
            set_reg!(inst.rd, |r: &mut Register| r.set_i(v));
        }

        Opcode::Slt => set_reg!(inst.rd, |r: &mut Register| r.set_i((i1 < i2) as i32)),
        Opcode::Sle => set_reg!(inst.rd, |r: &mut Register| r.set_i((i1 <= i2) as i32)),
        Opcode::Seq => set_reg!(inst.rd, |r: &mut Register| r.set_i((i1 == i2) as i32)),

        Opcode::And => set_reg!(inst.rd, |r: &mut Register| r.set_u(u1 & u2)),
        Opcode::Or => set_reg!(inst.rd, |r: &mut Register| r.set_u(u1 | u2)),
        Opcode::Xor => set_reg!(inst.rd, |r: &mut Register| r.set_u(u1 ^ u2)),
        Opcode::Not => set_reg!(inst.rd, |r: &mut Register| r.set_u(!u1)),

        Opcode::Shl => set_reg!(inst.rd, |r: &mut Register| r.set_u(u1 << (u2 & 31))),
        Opcode::Shr => set_reg!(inst.rd, |r: &mut Register| r.set_u(u1 >> (u2 & 31))),
        Opcode::Sha => set_reg!(inst.rd, |r: &mut Register| r.set_i(i1 >> (u2 & 31))),

        Opcode::Fadd => set_reg!(inst.rd, |r: &mut Register| r.set_f(f1 + f2)),
        Opcode::Fsub => set_reg!(inst.rd, |r: &mut Register| r.set_f(f1 - f2)),
        Opcode::Fmul => set_reg!(inst.rd, |r: &mut Register| r.set_f(f1 * f2)),
        Opcode::Fdiv => {
            let v = if f2 != 0.0 { f1 / f2 } else { 0.0 };
            set_reg!(inst.rd, |r: &mut Register| r.set_f(v));
        }
        Opcode::Ffma => {
            let rs3 = reg!(inst.rs3);
            let v = f1 * f2 + rs3.f();
            set_reg!(inst.rd, |r: &mut Register| r.set_f(v));
        }
        Opcode::Fneg => set_reg!(inst.rd, |r: &mut Register| r.set_f(-f1)),
        Opcode::Fabs => set_reg!(inst.rd, |r: &mut Register| r.set_f(f1.abs())),
        Opcode::Fmin => set_reg!(inst.rd, |r: &mut Register| r.set_f(f1.min(f2))),
        Opcode::Fmax => set_reg!(inst.rd, |r: &mut Register| r.set_f(f1.max(f2))),
        Opcode::Ftoi => set_reg!(inst.rd, |r: &mut Register| r.set_i(f1 as i32)),
        Opcode::Itof => set_reg!(inst.rd, |r: &mut Register| r.set_f(i1 as f32)),

        // Float comparisons: reserved in the opcode table but unimplemented
        // in the original's `vm_step` switch. `spec.md` documents them with
        // the same shape as the integer comparisons above, so they are
        // implemented for real here. See DESIGN.md.
        Opcode::Fslt => set_reg!(inst.rd, |r: &mut Register| r.set_i((f1 < f2) as i32)),
        Opcode::Fsle => set_reg!(inst.rd, |r: &mut Register| r.set_i((f1 <= f2) as i32)),
        Opcode::Fseq => set_reg!(inst.rd, |r: &mut Register| r.set_i((f1 == f2) as i32)),

        Opcode::SfuSin => set_reg!(inst.rd, |r: &mut Register| r.set_f(f1.sin())),
        Opcode::SfuCos => set_reg!(inst.rd, |r: &mut Register| r.set_f(f1.cos())),
        Opcode::SfuExp2 => set_reg!(inst.rd, |r: &mut Register| r.set_f(f1.exp2())),
        Opcode::SfuLog2 => set_reg!(inst.rd, |r: &mut Register| r.set_f(sfu_log2(f1))),
        Opcode::SfuRcp => set_reg!(inst.rd, |r: &mut Register| r.set_f(sfu_rcp(f1))),
        Opcode::SfuRsqrt => set_reg!(inst.rd, |r: &mut Register| r.set_f(sfu_rsqrt(f1))),
        Opcode::SfuSqrt => set_reg!(inst.rd, |r: &mut Register| r.set_f(sfu_sqrt(f1))),
        Opcode::SfuTanh => set_reg!(inst.rd, |r: &mut Register| r.set_f(f1.tanh())),

        Opcode::Popc => set_reg!(inst.rd, |r: &mut Register| r.set_i(u1.count_ones() as i32)),
        Opcode::Clz => set_reg!(inst.rd, |r: &mut Register| r.set_i(u1.leading_zeros() as i32)),
        Opcode::Brev => set_reg!(inst.rd, |r: &mut Register| r.set_u(u1.reverse_bits())),
        Opcode::Cnot => set_reg!(inst.rd, |r: &mut Register| r.set_u((u1 == 0) as u32)),

        Opcode::Selp => {
            let rs3 = reg!(inst.rs3);
            let v = if rs3.i() != 0 { u1 } else { u2 };
            set_reg!(inst.rd, |r: &mut Register| r.set_u(v));
        }

        Opcode::Bra => vm.pc = imm as u32,
        Opcode::Beq => {
            if i1 == i2 {
                vm.pc = imm as u32;
            }
        }
        Opcode::Bne => {
            if i1 != i2 {
                vm.pc = imm as u32;
            }
        }
        Opcode::Ssy => {
            if vm.div_stack.len() < crate::constants::STACK_SIZE {
                vm.div_stack.push(imm as u32);
            }
        }
        Opcode::Join => {
            vm.div_stack.pop();
        }
        Opcode::Call => {
            if vm.ret_stack.len() < crate::constants::STACK_SIZE {
                vm.ret_stack.push(vm.pc);
            }
            vm.pc = imm as u32;
        }
        Opcode::Ret => match vm.ret_stack.pop() {
            Some(addr) => vm.pc = addr,
            None => return StepOutcome::Halted,
        },
        Opcode::Tid => set_reg!(inst.rd, |r: &mut Register| r.set_i(0)),
        Opcode::Bar => {}

        Opcode::Tex => {
            let unit = u1 as usize;
            let u = f2;
            let v = reg!(inst.rs2.wrapping_add(1)).f();
            let rgba = match vm.textures.get(unit).and_then(|t| *t) {
                Some(tex) => Some(texture::sample(tex, u, v)),
                None => None,
            };
            match rgba {
                Some(rgba) => {
                    let comps = [
                        ((rgba) & 0xFF) as f32 / 255.0,
                        ((rgba >> 8) & 0xFF) as f32 / 255.0,
                        ((rgba >> 16) & 0xFF) as f32 / 255.0,
                        ((rgba >> 24) & 0xFF) as f32 / 255.0,
                    ];
                    for (i, value) in comps.iter().enumerate() {
                        let id = inst.rd.wrapping_add(i as u8);
                        set_reg!(id, |r: &mut Register| r.set_f(*value));
                    }
                }
                None => {
                    let comps = [1.0f32, 0.0, 1.0, 1.0];
                    for (i, value) in comps.iter().enumerate() {
                        let id = inst.rd.wrapping_add(i as u8);
                        set_reg!(id, |r: &mut Register| r.set_f(*value));
                    }
                }
            }
        }

        Opcode::Ldr => {
            let addr = u1.wrapping_add(imm as u32);
            let value = vm.mem.read_word(addr).unwrap_or(0);
            set_reg!(inst.rd, |r: &mut Register| r.set_u(value));
        }
        Opcode::Str => {
            let addr = u1.wrapping_add(imm as u32);
            let _ = vm.mem.write_word(addr, u2);
        }
        Opcode::Lds | Opcode::Sts => {}
    }

    vm.regs[0] = Register::zero();
    StepOutcome::Continue
}

fn reg_index(id: u8) -> Option<usize> {
    if (id as usize) < REGISTER_COUNT {
        Some(id as usize)
    } else {
        None
    }
}
