//! Assembler for the Milo832 SIMT shader processor.
//!
//! The main entry point is [`assemble`], which takes a complete Milo832
//! assembly listing and produces a [`Assembled`]: encoded instruction
//! words ready for `milo832::vm::Vm::load_binary`, a `.data` constant pool
//! ready for `Vm::load_data`, and a [`SourceMap`] associating each
//! assembled instruction with the source line(s) it came from.
//!
//! Parsing is implemented with [pest], one physical line at a time: each
//! line has its comment stripped and is trimmed before being matched
//! against a single `line` rule (`label_def? ~ statement? ~ EOI`). There's
//! no program-wide grammar to fight NEWLINE handling in, since the
//! language has no multi-line constructs.
//!
//! # Assembly Language
//!
//! A program is a sequence of lines. Each line may optionally start with
//! a `label:` definition, and may optionally carry one statement: either
//! an instruction or a `.data address, value` directive. Comments start
//! with `;` or `#` and run to the end of the line.
//!
//! Instructions are one mnemonic followed by zero or more comma-separated
//! operands: registers (`r0`-`r63`), immediates (decimal, `0x`-prefixed
//! hex, or a float literal reinterpreted as its 32-bit bit pattern), or
//! label names. Every mnemonic's operand shape is fixed and is looked up
//! from [`slots`] rather than re-derived per instruction class, since
//! every Milo832 instruction shares one 64-bit word layout.
//!
//! The nine commutative `...i` mnemonics (`addi`, `subi`, `muli`, `andi`,
//! `ori`, `xori`, `shli`, `shri`, `shai`) encode the same opcode as their
//! register-only counterpart with the last operand read as an immediate
//! instead of a register — there is no separate `Opcode` for them.
//!
//! Label references (branch/call/ssy targets) are resolved in a second
//! pass once every label's code index is known, so forward references
//! work the same as backward ones.
//!
//! [pest]: https://docs.rs/pest/

pub mod data;
pub mod error;
pub mod instructions;
pub mod int_util;
pub mod labels;
pub mod parser;
pub mod slots;
pub mod source_map;

pub use error::{AssembleError, Result};
pub use instructions::{assemble, Assembled};
pub use source_map::{SourceMap, SourceMapItem};
