//! Reference compiler, assembler, and bit-exact VM for the Milo832 SIMT
//! GPU core: a GLSL-subset shading language lowered to a 64-bit instruction
//! word format, executed by the interpreter in [`vm`].
//!
//! Grounded on `examples/original_source/tools/shader/`: `milo_glsl.c` (the
//! lexer/parser/codegen this crate's `lang` module reimplements), and
//! `milo_vm.c` (the `vm` module). The assembler and binary container that
//! sit on top of this crate live in the separate `milo832-asm` and
//! `milo832-vexfile` workspace members so that `milo832` itself stays a
//! pure types-and-semantics library with no text-format concerns.

#[macro_use]
extern crate num_derive;

pub mod constants;
pub mod isa;
pub mod lang;
pub mod memory;
pub mod register;
pub mod texture;
pub mod vm;
