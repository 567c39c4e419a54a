use super::tests_common::{vm_with_program, word};
use super::FragmentIn;
use crate::isa::Opcode;
use crate::texture::Texture;

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

/// `tex rd, unit_reg, u_reg` reads `u` from `rs2` and `v` from `rs2 + 1`,
/// per `milo_vm_exec_fragment`'s argument layout, and writes four
/// consecutive registers starting at `rd`.
#[test]
fn tex_samples_bound_texture_and_unpacks_rgba() {
    let tex = Texture::solid(1, 1, 0x8040_2010); // a=0x80 b=0x40 g=0x20 r=0x10
    let words = [
        word(Opcode::Add, 1, 0, 0, 0, 0), // unit index 0
        word(Opcode::Add, 2, 0, 0, 0, 0), // u = 0.0 (bit pattern happens to be 0)
        word(Opcode::Add, 3, 0, 0, 0, 0), // v = 0.0
        word(Opcode::Tex, 10, 1, 2, 0, 0),
        word(Opcode::Exit, 0, 0, 0, 0, 0),
    ];
    let mut vm = vm_with_program(&words);
    vm.bind_texture(0, &tex);
    vm.exec_fragment(&blank_fragment()).unwrap();

    assert_eq!(vm.register(10).f(), 0x10 as f32 / 255.0);
    assert_eq!(vm.register(11).f(), 0x20 as f32 / 255.0);
    assert_eq!(vm.register(12).f(), 0x40 as f32 / 255.0);
    assert_eq!(vm.register(13).f(), 0x80 as f32 / 255.0);
}

/// An unbound texture unit falls back to `{1, 0, 1, 1}`, distinct from
/// [`crate::texture::MISSING_TEXTURE_RGBA`] which only applies to a
/// zero-dimension texture passed directly to `sample`.
#[test]
fn tex_on_unbound_unit_falls_back_to_magenta_opaque() {
    let words = [
        word(Opcode::Add, 1, 0, 0, 0, 3), // unit 3, never bound
        word(Opcode::Add, 2, 0, 0, 0, 0),
        word(Opcode::Add, 3, 0, 0, 0, 0),
        word(Opcode::Tex, 10, 1, 2, 0, 0),
        word(Opcode::Exit, 0, 0, 0, 0, 0),
    ];
    let mut vm = vm_with_program(&words);
    vm.exec_fragment(&blank_fragment()).unwrap();

    assert_eq!(vm.register(10).f(), 1.0);
    assert_eq!(vm.register(11).f(), 0.0);
    assert_eq!(vm.register(12).f(), 1.0);
    assert_eq!(vm.register(13).f(), 1.0);
}

#[test]
fn unbind_texture_restores_fallback() {
    let tex = Texture::solid(1, 1, 0xFFFF_FFFF);
    let words = [
        word(Opcode::Add, 1, 0, 0, 0, 0),
        word(Opcode::Add, 2, 0, 0, 0, 0),
        word(Opcode::Add, 3, 0, 0, 0, 0),
        word(Opcode::Tex, 10, 1, 2, 0, 0),
        word(Opcode::Exit, 0, 0, 0, 0, 0),
    ];
    let mut vm = vm_with_program(&words);
    vm.bind_texture(0, &tex);
    vm.unbind_texture(0);
    vm.exec_fragment(&blank_fragment()).unwrap();

    assert_eq!(vm.register(10).f(), 1.0);
    assert_eq!(vm.register(11).f(), 0.0);
}
