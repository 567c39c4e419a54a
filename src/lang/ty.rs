//! The closed type enumeration from `spec.md` §3, with the component counts
//! codegen uses to size register ranges.

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Ty {
    Void,
    Int,
    Float,
    Vec2,
    Vec3,
    Vec4,
    Mat3,
    Mat4,
    Sampler2D,
}

impl Ty {
    pub fn from_keyword(name: &str) -> Option<Ty> {
        Some(match name {
            "void" => Ty::Void,
            "int" => Ty::Int,
            "float" => Ty::Float,
            "vec2" => Ty::Vec2,
            "vec3" => Ty::Vec3,
            "vec4" => Ty::Vec4,
            "mat3" => Ty::Mat3,
            "mat4" => Ty::Mat4,
            "sampler2D" => Ty::Sampler2D,
            _ => return None,
        })
    }

    /// Register cells a value of this type occupies. `Sampler2D` has no
    /// register footprint of its own — it names a texture unit, resolved at
    /// codegen time rather than allocated from the register file.
    pub fn component_count(self) -> usize {
        match self {
            Ty::Void => 0,
            Ty::Int | Ty::Float => 1,
            Ty::Vec2 => 2,
            Ty::Vec3 => 3,
            Ty::Vec4 => 4,
            Ty::Mat3 => 9,
            Ty::Mat4 => 16,
            Ty::Sampler2D => 0,
        }
    }
}

impl fmt::Display for Ty {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let name = match self {
            Ty::Void => "void",
            Ty::Int => "int",
            Ty::Float => "float",
            Ty::Vec2 => "vec2",
            Ty::Vec3 => "vec3",
            Ty::Vec4 => "vec4",
            Ty::Mat3 => "mat3",
            Ty::Mat4 => "mat4",
            Ty::Sampler2D => "sampler2D",
        };
        write!(f, "{}", name)
    }
}

/// Storage class of a declaration, per `spec.md` §3.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageClass {
    Local,
    UniformInput,
    StageInput,
    StageOutput,
    Const,
}
