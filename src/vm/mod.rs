//! The reference VM: the bit-exact "golden model" against which a hardware
//! implementation is validated.
//!
//! Grounded on `examples/original_source/tools/shader/milo_vm.c`'s
//! `milo_vm_t` state struct and `vm_step`/`milo_vm_exec_fragment`/
//! `milo_vm_exec_vertex`, restructured the way the teacher's
//! `src/processor/mod.rs` + `src/processor/core.rs` split a processor
//! struct from its tick loop.

mod step;

use crate::constants::*;
use crate::memory::{Memory, Storage};
use crate::register::Register;
use crate::texture::Texture;
use std::fmt;

pub use step::StepOutcome;

/// A tagged uniform slot; mirrors the original's `milo_uniform_t` union.
#[derive(Debug, Clone, Copy)]
pub enum Uniform {
    None,
    Float(f32),
    Int(i32),
    Vec2([f32; 2]),
    Vec3([f32; 3]),
    Vec4([f32; 4]),
    Mat3([f32; 9]),
    Mat4([f32; 16]),
}

impl Default for Uniform {
    fn default() -> Uniform {
        Uniform::None
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VmError {
    CodeTooLarge { size: usize, max: usize },
    PcOutOfBounds(u32),
    UnknownOpcode { byte: u8, pc: u32 },
    InvalidRegister(u8),
    CycleLimitExceeded(u64),
}

impl fmt::Display for VmError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            VmError::CodeTooLarge { size, max } => {
                write!(f, "Code too large ({} > {})", size, max)
            }
            VmError::PcOutOfBounds(pc) => write!(f, "PC out of bounds: {}", pc),
            VmError::UnknownOpcode { byte, pc } => {
                write!(f, "Unknown opcode: 0x{:02X} at PC {}", byte, pc)
            }
            VmError::InvalidRegister(id) => write!(f, "Invalid register id: {}", id),
            VmError::CycleLimitExceeded(max) => write!(f, "Exceeded max cycles ({})", max),
        }
    }
}

impl std::error::Error for VmError {}

/// The VM's execution status, made explicit rather than a boolean plus an
/// unwired "discarded" flag (see `SPEC_FULL.md` §4.3/§4.5 for why `discard`
/// gets a real opcode instead of silently defaulting to `Halted`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExecStatus {
    Running,
    Discarded,
    Halted,
    Error(VmError),
}

impl ExecStatus {
    pub fn is_terminal(self) -> bool {
        !matches!(self, ExecStatus::Running)
    }
}

pub struct FragmentIn {
    pub u: f32,
    pub v: f32,
    pub nx: f32,
    pub ny: f32,
    pub nz: f32,
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
    pub z: f32,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct FragmentOut {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
    pub discard: bool,
    pub depth: f32,
}

pub struct VertexIn {
    pub x: f32,
    pub y: f32,
    pub z: f32,
    pub u: f32,
    pub v: f32,
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
    pub nx: f32,
    pub ny: f32,
    pub nz: f32,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct VertexOut {
    pub x: f32,
    pub y: f32,
    pub z: f32,
    pub w: f32,
}

/// The reference VM. `'tex` bounds the lifetime of any bound texture
/// references — textures are borrowed from the caller for the duration of
/// an `exec_*` call, per `spec.md` §5's resource discipline.
pub struct Vm<'tex> {
    pub(crate) regs: [Register; REGISTER_COUNT],
    pub(crate) pc: u32,
    pub(crate) code: Vec<u64>,
    pub(crate) mem: Memory,
    pub(crate) div_stack: Vec<u32>,
    pub(crate) ret_stack: Vec<u32>,
    pub(crate) uniforms: [Uniform; MAX_UNIFORMS],
    pub(crate) textures: [Option<&'tex Texture>; MAX_TEXTURES],
    pub(crate) cycle_count: u64,
    pub max_cycles: u64,
    pub(crate) status: ExecStatus,
}

impl<'tex> Vm<'tex> {
    pub fn new() -> Vm<'tex> {
        Vm {
            regs: [Register::zero(); REGISTER_COUNT],
            pc: 0,
            code: Vec::new(),
            mem: Memory::vm_sized(),
            div_stack: Vec::new(),
            ret_stack: Vec::new(),
            uniforms: [Uniform::None; MAX_UNIFORMS],
            textures: [None; MAX_TEXTURES],
            cycle_count: 0,
            max_cycles: DEFAULT_MAX_CYCLES,
            status: ExecStatus::Running,
        }
    }

    pub fn load_binary(&mut self, words: &[u64]) -> Result<(), VmError> {
        if words.len() > MAX_CODE_WORDS {
            return Err(VmError::CodeTooLarge {
                size: words.len(),
                max: MAX_CODE_WORDS,
            });
        }
        self.code = words.to_vec();
        Ok(())
    }

    /// Places the assembler's `.data` constant-pool entries into VM memory,
    /// as `milo_vm_load_asm` does after encoding the program.
    pub fn load_data(&mut self, entries: &[(u32, u32)]) {
        for &(addr, value) in entries {
            if (addr as usize) + 4 <= MEM_SIZE {
                let _ = self.mem.write_word(addr, value);
            }
        }
    }

    pub fn set_uniform(&mut self, index: usize, value: Uniform) {
        if index < MAX_UNIFORMS {
            self.uniforms[index] = value;
        }
    }

    pub fn bind_texture(&mut self, unit: usize, texture: &'tex Texture) {
        if unit < MAX_TEXTURES {
            self.textures[unit] = Some(texture);
        }
    }

    pub fn unbind_texture(&mut self, unit: usize) {
        if unit < MAX_TEXTURES {
            self.textures[unit] = None;
        }
    }

    pub fn register(&self, id: usize) -> Register {
        self.regs[id]
    }

    pub fn status(&self) -> ExecStatus {
        self.status
    }

    fn reset_state(&mut self) {
        self.regs = [Register::zero(); REGISTER_COUNT];
        self.pc = 0;
        self.div_stack.clear();
        self.ret_stack.clear();
        self.cycle_count = 0;
        self.status = ExecStatus::Running;
    }

    fn run(&mut self) {
        while self.status == ExecStatus::Running {
            if self.cycle_count >= self.max_cycles {
                self.status = ExecStatus::Error(VmError::CycleLimitExceeded(self.max_cycles));
                break;
            }
            match step::step(self) {
                StepOutcome::Continue => {}
                StepOutcome::Halted => self.status = ExecStatus::Halted,
                StepOutcome::Discarded => self.status = ExecStatus::Discarded,
                StepOutcome::Error(e) => self.status = ExecStatus::Error(e),
            }
        }
    }

    /// Runs a fragment shader. Input register bindings follow
    /// `spec.md` §6: `r2-3 = v_texcoord`, `r4-6 = v_normal`, `r7-10 =
    /// v_color`; output is read back from `r4-r7`, the aliasing gap
    /// `spec.md` §9 documents and leaves to the caller to avoid via simple
    /// fragment layouts.
    pub fn exec_fragment(&mut self, input: &FragmentIn) -> Result<FragmentOut, VmError> {
        self.reset_state();
        self.regs[2].set_f(input.u);
        self.regs[3].set_f(input.v);
        self.regs[4].set_f(input.nx);
        self.regs[5].set_f(input.ny);
        self.regs[6].set_f(input.nz);
        self.regs[7].set_f(input.r);
        self.regs[8].set_f(input.g);
        self.regs[9].set_f(input.b);
        self.regs[10].set_f(input.a);

        self.run();

        let out = FragmentOut {
            r: self.regs[4].f(),
            g: self.regs[5].f(),
            b: self.regs[6].f(),
            a: self.regs[7].f(),
            discard: self.status == ExecStatus::Discarded,
            depth: input.z,
        };

        match self.status {
            ExecStatus::Error(e) => Err(e),
            _ => Ok(out),
        }
    }

    /// Runs a vertex shader. Input bindings: `r2-13` per
    /// `spec.md` §6's vertex layout; output is `r1-r4`.
    pub fn exec_vertex(&mut self, input: &VertexIn) -> Result<VertexOut, VmError> {
        self.reset_state();
        self.regs[2].set_f(input.x);
        self.regs[3].set_f(input.y);
        self.regs[4].set_f(input.z);
        self.regs[5].set_f(input.u);
        self.regs[6].set_f(input.v);
        self.regs[7].set_f(input.r);
        self.regs[8].set_f(input.g);
        self.regs[9].set_f(input.b);
        self.regs[10].set_f(input.a);
        self.regs[11].set_f(input.nx);
        self.regs[12].set_f(input.ny);
        self.regs[13].set_f(input.nz);

        self.run();

        let out = VertexOut {
            x: self.regs[1].f(),
            y: self.regs[2].f(),
            z: self.regs[3].f(),
            w: self.regs[4].f(),
        };

        match self.status {
            ExecStatus::Error(e) => Err(e),
            _ => Ok(out),
        }
    }
}

impl<'tex> Default for Vm<'tex> {
    fn default() -> Vm<'tex> {
        Vm::new()
    }
}

#[cfg(test)]
mod tests_common;
#[cfg(test)]
mod tests_control;
#[cfg(test)]
mod tests_float;
#[cfg(test)]
mod tests_int;
#[cfg(test)]
mod tests_bits;
#[cfg(test)]
mod tests_texture;
