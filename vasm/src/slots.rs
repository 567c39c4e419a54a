//! The per-mnemonic operand table: which [`Opcode`] a mnemonic encodes and
//! what each assembly-text operand position means. Grounded directly on
//! `milo832::vm::step`'s field reads (which register/immediate fields each
//! opcode actually consumes at execution time) rather than invented
//! independently — see `DESIGN.md`.
//!
//! There is no teacher counterpart to copy: `vasm`'s own mnemonic table is
//! driven by per-format pest rules (`instruction_alu`, `instruction_i`, …)
//! because VCPU's encoding varies by instruction class. Milo832's word
//! format is uniform, so `spec.md` §4.4 calls for exactly one generic
//! `instruction` pest rule and this semantic table instead.

use milo832::isa::Opcode;

/// What an assembly-text operand in a given position is interpreted as.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Slot {
    Rd,
    Rs1,
    Rs2,
    Rs3,
    Imm,
    Label,
}

/// A mnemonic's full operand shape: the opcode it encodes, plus the
/// meaning of each operand in source order. `addi`-style aliases share an
/// opcode with their register-only sibling but swap the last `Rs2` slot
/// for `Imm`.
pub struct MnemonicShape {
    pub opcode: Opcode,
    pub slots: &'static [Slot],
}

/// The fixed list of commutative ops with an `...i` immediate-alias
/// spelling, verbatim from `spec.md` §4.4.
pub const IMMEDIATE_ALIASES: &[&str] = &[
    "addi", "subi", "muli", "andi", "ori", "xori", "shli", "shri", "shai",
];

fn base_for_alias(alias: &str) -> Option<&'static str> {
    match alias {
        "addi" => Some("add"),
        "subi" => Some("sub"),
        "muli" => Some("mul"),
        "andi" => Some("and"),
        "ori" => Some("or"),
        "xori" => Some("xor"),
        "shli" => Some("shl"),
        "shri" => Some("shr"),
        "shai" => Some("sha"),
        _ => None,
    }
}

/// Looks up a mnemonic's shape, resolving `...i` immediate aliases to
/// their base opcode with the third operand slot swapped to `Imm`.
pub fn lookup(mnemonic: &str) -> Option<MnemonicShape> {
    if let Some(base) = base_for_alias(mnemonic) {
        let opcode = Opcode::from_mnemonic(base)?;
        return Some(MnemonicShape {
            opcode,
            slots: &[Slot::Rd, Slot::Rs1, Slot::Imm],
        });
    }

    let opcode = Opcode::from_mnemonic(mnemonic)?;
    let slots: &'static [Slot] = match mnemonic {
        "nop" | "exit" | "discard" | "join" | "ret" | "bar" => &[],
        "mov" | "neg" | "not" | "iabs" | "fneg" | "fabs" | "ftoi" | "itof" | "popc" | "clz"
        | "brev" | "cnot" | "sin" | "cos" | "exp2" | "log2" | "rcp" | "rsqrt" | "sqrt"
        | "tanh" => &[Slot::Rd, Slot::Rs1],
        "tid" => &[Slot::Rd],
        "bra" | "call" | "ssy" => &[Slot::Label],
        "beq" | "bne" => &[Slot::Rs1, Slot::Rs2, Slot::Label],
        "add" | "sub" | "mul" | "idiv" | "irem" | "imin" | "imax" | "slt" | "sle" | "seq"
        | "and" | "or" | "xor" | "shl" | "shr" | "sha" | "fadd" | "fsub" | "fmul" | "fdiv"
        | "fmin" | "fmax" | "fslt" | "fsle" | "fseq" | "tex" => {
            &[Slot::Rd, Slot::Rs1, Slot::Rs2]
        }
        "imad" | "ffma" | "selp" => &[Slot::Rd, Slot::Rs1, Slot::Rs2, Slot::Rs3],
        "ldr" => &[Slot::Rd, Slot::Rs1, Slot::Imm],
        "str" => &[Slot::Rs1, Slot::Imm, Slot::Rs2],
        "lds" => &[Slot::Rd, Slot::Rs1, Slot::Imm],
        "sts" => &[Slot::Rs1, Slot::Imm, Slot::Rs2],
        _ => return None,
    };
    Some(MnemonicShape { opcode, slots })
}
