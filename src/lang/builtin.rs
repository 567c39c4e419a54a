//! Closed built-in function enum, per `spec.md` §9's design note ("a closed
//! enum populated from a small table is clearer" than the original's
//! string-comparison dispatch). Mirrors `isa::Opcode`'s own
//! `mnemonic()`/`from_mnemonic()` pair rather than the `EnumFromStr` derive,
//! since these names are lowercase function-call identifiers, not the
//! PascalCase-variant/ALL-CAPS-literal convention `EnumFromStr` expects.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Builtin {
    Sin,
    Cos,
    Sqrt,
    Exp2,
    Log2,
    Rcp,
    Rsqrt,
    Tanh,
    Abs,
    Min,
    Max,
    Clamp,
    Mix,
    Dot,
    Normalize,
    Texture,
}

impl Builtin {
    pub fn from_name(name: &str) -> Option<Builtin> {
        Some(match name {
            "sin" => Builtin::Sin,
            "cos" => Builtin::Cos,
            "sqrt" => Builtin::Sqrt,
            "exp2" => Builtin::Exp2,
            "log2" => Builtin::Log2,
            "rcp" => Builtin::Rcp,
            "rsqrt" => Builtin::Rsqrt,
            "tanh" => Builtin::Tanh,
            "abs" => Builtin::Abs,
            "min" => Builtin::Min,
            "max" => Builtin::Max,
            "clamp" => Builtin::Clamp,
            "mix" => Builtin::Mix,
            "dot" => Builtin::Dot,
            "normalize" => Builtin::Normalize,
            "texture" => Builtin::Texture,
            _ => return None,
        })
    }

    /// Number of call arguments this built-in expects.
    pub fn arity(self) -> usize {
        match self {
            Builtin::Sin
            | Builtin::Cos
            | Builtin::Sqrt
            | Builtin::Exp2
            | Builtin::Log2
            | Builtin::Rcp
            | Builtin::Rsqrt
            | Builtin::Tanh
            | Builtin::Abs
            | Builtin::Normalize => 1,
            Builtin::Min | Builtin::Max | Builtin::Dot | Builtin::Texture => 2,
            Builtin::Clamp | Builtin::Mix => 3,
        }
    }
}
