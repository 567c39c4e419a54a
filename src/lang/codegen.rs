//! Two-pass codegen: symbolic-assembly-text emitter. Grounded on the
//! emitter functions in
//! `examples/original_source/tools/shader/milo_glsl.c` (`emit_expr`,
//! `emit_stmt`, `emit_function`, the register-bump allocator, and the
//! constant-pool interning helper).
//!
//! This module never touches `crate::isa` — it produces the *symbolic
//! assembly text* `spec.md` §2's dataflow names as the codegen artefact;
//! turning that text into 64-bit words is `milo832-asm`'s job, kept out of
//! this crate to avoid a cyclic workspace dependency (see `SPEC_FULL.md`).

use super::ast::*;
use super::symtab::{Symbol, SymbolTable};
use super::ty::{StorageClass, Ty};
use super::builtin::Builtin;
use crate::constants::{CONST_BASE_ADDR, MAX_CONSTANTS, MAX_PARSE_ERRORS};
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodegenError {
    pub line: u32,
    pub message: String,
}

impl fmt::Display for CodegenError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "Line {}: {}", self.line, self.message)
    }
}

impl std::error::Error for CodegenError {}

/// The codegen artefact: symbolic assembly text (instructions plus the
/// `.data ADDR, VALUE` constant-pool suffix) and the same pool as a
/// structured list, for callers (and tests) that don't want to re-parse it
/// out of the text.
#[derive(Debug, Clone)]
pub struct GeneratedAssembly {
    pub text: String,
    pub constants: Vec<(u32, u32)>,
}

#[derive(Debug, Clone, Copy)]
struct Value {
    base: u8,
    ty: Ty,
}

impl Value {
    fn count(&self) -> usize {
        self.ty.component_count().max(1)
    }
}

pub fn generate(program: &Program) -> Result<GeneratedAssembly, Vec<CodegenError>> {
    let mut cg = Codegen::new(program);
    cg.run();
    if cg.errors.is_empty() {
        Ok(cg.finish())
    } else {
        Err(cg.errors)
    }
}

struct Codegen<'a> {
    program: &'a Program,
    symtab: SymbolTable,
    next_register: u8,
    next_texture_unit: u8,
    constants: Vec<(u32, u32)>,
    label_counter: u32,
    errors: Vec<CodegenError>,
    header: String,
    code: String,
    loop_ends: Vec<String>,
    current_function_is_main: bool,
}

impl<'a> Codegen<'a> {
    fn new(program: &'a Program) -> Codegen<'a> {
        Codegen {
            program,
            symtab: SymbolTable::new(),
            next_register: 2, // r0 = zero, r1 = return slot
            next_texture_unit: 0,
            constants: Vec::new(),
            label_counter: 0,
            errors: Vec::new(),
            header: String::new(),
            code: String::new(),
            loop_ends: Vec::new(),
            current_function_is_main: false,
        }
    }

    fn error(&mut self, line: u32, message: impl Into<String>) {
        if self.errors.len() < MAX_PARSE_ERRORS {
            self.errors.push(CodegenError { line, message: message.into() });
        }
    }

    fn alloc(&mut self, count: usize) -> u8 {
        let base = self.next_register;
        self.next_register = self.next_register.saturating_add(count as u8);
        base
    }

    /// Mints a fresh label index, shared by every label that belongs to the
    /// same construct (an `if`'s `else`/`end` pair, a loop's head/end pair)
    /// so they carry matching suffixes.
    fn new_label_index(&mut self) -> u32 {
        self.label_counter += 1;
        self.label_counter
    }

    fn emit(&mut self, line: impl AsRef<str>) {
        self.code.push_str(line.as_ref());
        self.code.push('\n');
    }

    fn intern_constant(&mut self, bits: u32, line: u32) -> u32 {
        if let Some(&(addr, _)) = self.constants.iter().find(|(_, v)| *v == bits) {
            return addr;
        }
        if self.constants.len() >= MAX_CONSTANTS {
            self.error(line, format!("Too many constants (max {})", MAX_CONSTANTS));
            return CONST_BASE_ADDR as u32;
        }
        let addr = CONST_BASE_ADDR as u32 + (self.constants.len() as u32) * 4;
        self.constants.push((addr, bits));
        addr
    }

    fn load_constant(&mut self, bits: u32, line: u32) -> u8 {
        let addr = self.intern_constant(bits, line);
        let addr_reg = self.alloc(1);
        self.emit(format!("addi r{}, r0, {}", addr_reg, addr));
        let dest = self.alloc(1);
        self.emit(format!("ldr r{}, r{}, 0", dest, addr_reg));
        dest
    }

    // ---- pass 1: top-level declarations ----

    fn run(&mut self) {
        for item in &self.program.items {
            if let TopLevel::Global(decl) = item {
                self.declare_global(decl);
            }
        }
        for item in &self.program.items {
            if let TopLevel::Function(func) = item {
                self.lower_function(func);
            }
        }
    }

    fn declare_global(&mut self, decl: &Decl) {
        if decl.ty == Ty::Sampler2D {
            let unit = self.next_texture_unit;
            self.next_texture_unit += 1;
            self.header.push_str(&format!("; {} : sampler2D @ unit {}\n", decl.name, unit));
            self.symtab.declare(Symbol {
                name: decl.name.clone(),
                ty: decl.ty,
                base_register: unit,
                storage: decl.storage,
                location: decl.location,
            });
            return;
        }

        let count = decl.ty.component_count().max(1);
        let base = self.alloc(count);
        self.header.push_str(&format!(
            "; {} : {} @ r{}..r{}\n",
            decl.name,
            decl.ty,
            base,
            base as usize + count - 1
        ));
        self.symtab.declare(Symbol {
            name: decl.name.clone(),
            ty: decl.ty,
            base_register: base,
            storage: decl.storage,
            location: decl.location,
        });
    }

    // ---- pass 2: functions ----

    fn lower_function(&mut self, func: &Function) {
        self.current_function_is_main = func.name == "main";
        self.emit(format!("{}:", func.name));

        for param in &func.params {
            let count = param.ty.component_count().max(1);
            let base = self.alloc(count);
            self.symtab.declare(Symbol {
                name: param.name.clone(),
                ty: param.ty,
                base_register: base,
                storage: StorageClass::Local,
                location: None,
            });
        }

        self.lower_stmts(&func.body);

        let already_terminated = matches!(func.body.last(), Some(Stmt::Return(_)) | Some(Stmt::Discard));
        if !already_terminated {
            self.emit(if self.current_function_is_main { "exit" } else { "ret" });
        }
    }

    fn lower_stmts(&mut self, stmts: &[Stmt]) {
        for stmt in stmts {
            self.lower_stmt(stmt);
        }
    }

    fn lower_stmt(&mut self, stmt: &Stmt) {
        match stmt {
            Stmt::Expr(e) => {
                self.lower_expr(e);
            }
            Stmt::VarDecl(decl) => self.lower_local_decl(decl),
            Stmt::If { cond, then_branch, else_branch } => self.lower_if(cond, then_branch, else_branch),
            Stmt::For { init, cond, step, body } => self.lower_for(init, cond, step, body),
            Stmt::While { cond, body } => self.lower_for(&None, &Some(cond.clone()), &None, body),
            Stmt::Return(value) => self.lower_return(value),
            Stmt::Break => self.lower_break(),
            Stmt::Continue => self.emit("; continue (unresolved, see DESIGN.md)"),
            Stmt::Discard => self.emit("discard"),
            Stmt::Block(inner) => self.lower_stmts(inner),
        }
    }

    fn lower_local_decl(&mut self, decl: &Decl) {
        let base = match &decl.initializer {
            Some(init) => match self.lower_expr(init) {
                Some(v) => v.base,
                None => return,
            },
            None => self.alloc(decl.ty.component_count().max(1)),
        };
        self.symtab.declare(Symbol {
            name: decl.name.clone(),
            ty: decl.ty,
            base_register: base,
            storage: StorageClass::Local,
            location: None,
        });
    }

    /// Always allocates and emits both `else:` and `end:` labels, even for
    /// an else-less `if` — the fuller form `spec.md` §4.3's prose describes,
    /// per the resolution in `SPEC_FULL.md` §4.3.
    fn lower_if(&mut self, cond: &Expr, then_branch: &[Stmt], else_branch: &[Stmt]) {
        let n = self.new_label_index();
        let else_label = format!("else{}", n);
        let end_label = format!("end{}", n);

        self.emit(format!("ssy {}", end_label));
        let cond_val = match self.lower_expr(cond) {
            Some(v) => v,
            None => return,
        };
        self.emit(format!("beq r{}, r0, {}", cond_val.base, else_label));
        self.lower_stmts(then_branch);
        self.emit(format!("bra {}", end_label));
        self.emit(format!("{}:", else_label));
        self.lower_stmts(else_branch);
        self.emit(format!("{}:", end_label));
        self.emit("join");
    }

    fn lower_for(&mut self, init: &Option<Box<Stmt>>, cond: &Option<Expr>, step: &Option<Expr>, body: &[Stmt]) {
        if let Some(init) = init {
            self.lower_stmt(init);
        }

        let n = self.new_label_index();
        let loop_head = format!("loop{}", n);
        let loop_end = format!("end{}", n);

        self.emit(format!("{}:", loop_head));
        self.emit(format!("ssy {}", loop_end));
        if let Some(cond) = cond {
            if let Some(cond_val) = self.lower_expr(cond) {
                self.emit(format!("beq r{}, r0, {}", cond_val.base, loop_end));
            }
        }

        self.loop_ends.push(loop_end.clone());
        self.lower_stmts(body);
        self.loop_ends.pop();

        if let Some(step) = step {
            self.lower_expr(step);
        }
        self.emit(format!("bra {}", loop_head));
        self.emit(format!("{}:", loop_end));
        self.emit("join");
    }

    /// `break` emits `join` *then* `bra end_label` — a bare `join` would
    /// only pop the divergence stack without leaving the loop body. See
    /// `SPEC_FULL.md` §4.3.
    fn lower_break(&mut self) {
        match self.loop_ends.last().cloned() {
            Some(end_label) => {
                self.emit("join");
                self.emit(format!("bra {}", end_label));
            }
            None => self.error(0, "'break' outside of a loop"),
        }
    }

    fn lower_return(&mut self, value: &Option<Expr>) {
        if let Some(expr) = value {
            if let Some(val) = self.lower_expr(expr) {
                for i in 0..val.count() {
                    self.emit(format!("mov r{}, r{}", 1 + i as u8, val.base + i as u8));
                }
            }
        }
        self.emit(if self.current_function_is_main { "exit" } else { "ret" });
    }

    // ---- expressions ----

    fn lower_expr(&mut self, expr: &Expr) -> Option<Value> {
        match expr {
            Expr::IntLit(v, line) => Some(self.lower_int_lit(*v, *line)),
            Expr::FloatLit(v, line) => {
                let bits = (*v as f32).to_bits();
                Some(Value { base: self.load_constant(bits, *line), ty: Ty::Float })
            }
            Expr::Ident(name, line) => match self.symtab.lookup(name) {
                Some(sym) => Some(Value { base: sym.base_register, ty: sym.ty }),
                None => {
                    self.error(*line, format!("Undefined identifier '{}'", name));
                    None
                }
            },
            Expr::Unary { op, operand, .. } => self.lower_unary(*op, operand),
            Expr::Binary { op, lhs, rhs, line } => self.lower_binary(*op, lhs, rhs, *line),
            Expr::Assign { op, target, value, line } => self.lower_assign(*op, target, value, *line),
            Expr::Ternary { cond, then_branch, else_branch, .. } => {
                self.lower_ternary(cond, then_branch, else_branch)
            }
            Expr::Call { callee, args, line } => self.lower_call(callee, args, *line),
            Expr::Construct { ty, args, line } => self.lower_construct(*ty, args, *line),
            Expr::Member { object, swizzle, line } => self.lower_member(object, swizzle, *line),
            Expr::Index { line, .. } => {
                // Array indexing has no lowering rule in `spec.md` §4.3's
                // expression list; left unimplemented rather than guessed.
                self.error(*line, "array indexing is not supported by the emitter");
                None
            }
            Expr::PreIncDec { is_inc, target, line } => self.lower_pre_inc_dec(*is_inc, target, *line),
            Expr::PostIncDec { is_inc, target, line } => self.lower_post_inc_dec(*is_inc, target, *line),
        }
    }

    fn lower_int_lit(&mut self, v: i64, line: u32) -> Value {
        const MIN: i64 = -(1 << 19);
        const MAX: i64 = (1 << 19) - 1;
        if (MIN..=MAX).contains(&v) {
            let dest = self.alloc(1);
            self.emit(format!("addi r{}, r0, {}", dest, v));
            Value { base: dest, ty: Ty::Int }
        } else {
            let dest = self.load_constant(v as i32 as u32, line);
            Value { base: dest, ty: Ty::Int }
        }
    }

    fn lower_unary(&mut self, op: UnOp, operand: &Expr) -> Option<Value> {
        let val = self.lower_expr(operand)?;
        let count = val.count();
        let dest = self.alloc(count);
        for i in 0..count as u8 {
            let mnemonic = match (op, val.ty) {
                (UnOp::Neg, Ty::Int) => "neg",
                (UnOp::Neg, _) => "fneg",
                (UnOp::Not, _) => "xori",
            };
            if mnemonic == "xori" {
                self.emit(format!("xori r{}, r{}, 1", dest + i, val.base + i));
            } else {
                self.emit(format!("{} r{}, r{}", mnemonic, dest + i, val.base + i));
            }
        }
        Some(Value { base: dest, ty: val.ty })
    }

    fn lower_binary(&mut self, op: BinOp, lhs: &Expr, rhs: &Expr, line: u32) -> Option<Value> {
        let lval = self.lower_expr(lhs)?;
        let rval = self.lower_expr(rhs)?;
        let is_int = lval.ty == Ty::Int && rval.ty == Ty::Int;

        match op {
            BinOp::Add | BinOp::Sub | BinOp::Mul | BinOp::Div | BinOp::Rem => {
                if op == BinOp::Rem && !is_int {
                    self.error(line, "'%' is only defined for int operands");
                    return None;
                }
                let count = lval.count();
                let dest = self.alloc(count);
                let mnemonic = arithmetic_mnemonic(op, is_int);
                for i in 0..count as u8 {
                    self.emit(format!("{} r{}, r{}, r{}", mnemonic, dest + i, lval.base + i, rval.base + i));
                }
                Some(Value { base: dest, ty: lval.ty })
            }
            BinOp::Eq | BinOp::Ne => {
                let dest = self.alloc(1);
                let mnemonic = if is_int { "seq" } else { "fseq" };
                self.emit(format!("{} r{}, r{}, r{}", mnemonic, dest, lval.base, rval.base));
                if op == BinOp::Ne {
                    self.emit(format!("xori r{}, r{}, 1", dest, dest));
                }
                Some(Value { base: dest, ty: Ty::Int })
            }
            BinOp::Lt | BinOp::Le | BinOp::Gt | BinOp::Ge => {
                let dest = self.alloc(1);
                // `>`/`>=` are synthesized by swapping operands into `</≤`.
                let (a, b, strict) = match op {
                    BinOp::Lt => (lval.base, rval.base, true),
                    BinOp::Le => (lval.base, rval.base, false),
                    BinOp::Gt => (rval.base, lval.base, true),
                    BinOp::Ge => (rval.base, lval.base, false),
                    _ => unreachable!(),
                };
                let mnemonic = match (is_int, strict) {
                    (true, true) => "slt",
                    (true, false) => "sle",
                    (false, true) => "fslt",
                    (false, false) => "fsle",
                };
                self.emit(format!("{} r{}, r{}, r{}", mnemonic, dest, a, b));
                Some(Value { base: dest, ty: Ty::Int })
            }
            BinOp::And | BinOp::Or => {
                let dest = self.alloc(1);
                let mnemonic = if op == BinOp::And { "and" } else { "or" };
                self.emit(format!("{} r{}, r{}, r{}", mnemonic, dest, lval.base, rval.base));
                Some(Value { base: dest, ty: Ty::Int })
            }
        }
    }

    fn lvalue_regs(&mut self, target: &Expr) -> Option<Vec<u8>> {
        match target {
            Expr::Ident(name, line) => match self.symtab.lookup(name) {
                Some(sym) => {
                    let count = sym.ty.component_count().max(1) as u8;
                    Some((sym.base_register..sym.base_register + count).collect())
                }
                None => {
                    self.error(*line, format!("Undefined identifier '{}'", name));
                    None
                }
            },
            Expr::Member { object, swizzle, line } => {
                let obj = self.lower_expr(object)?;
                let mut regs = Vec::new();
                for c in swizzle.chars() {
                    match swizzle_offset(c) {
                        Some(off) => regs.push(obj.base + off),
                        None => {
                            self.error(*line, format!("Invalid swizzle character '{}'", c));
                            return None;
                        }
                    }
                }
                Some(regs)
            }
            other => {
                self.error(other.line(), "Invalid assignment target");
                None
            }
        }
    }

    fn lower_assign(&mut self, op: AssignOp, target: &Expr, value: &Expr, line: u32) -> Option<Value> {
        let val = self.lower_expr(value)?;
        let regs = self.lvalue_regs(target)?;
        if regs.len() != val.count() {
            self.error(line, "Component count mismatch in assignment");
            return None;
        }
        match op {
            AssignOp::Assign => {
                for (i, &r) in regs.iter().enumerate() {
                    self.emit(format!("mov r{}, r{}", r, val.base + i as u8));
                }
            }
            // Compound assignment always lowers through the float opcode
            // family, per `spec.md` §4.3's literal wording.
            AssignOp::Add | AssignOp::Sub | AssignOp::Mul | AssignOp::Div => {
                let mnemonic = match op {
                    AssignOp::Add => "fadd",
                    AssignOp::Sub => "fsub",
                    AssignOp::Mul => "fmul",
                    AssignOp::Div => "fdiv",
                    AssignOp::Assign => unreachable!(),
                };
                for (i, &r) in regs.iter().enumerate() {
                    self.emit(format!("{} r{}, r{}, r{}", mnemonic, r, r, val.base + i as u8));
                }
            }
        }
        Some(Value { base: regs[0], ty: val.ty })
    }

    fn lower_ternary(&mut self, cond: &Expr, then_branch: &Expr, else_branch: &Expr) -> Option<Value> {
        let cond_val = self.lower_expr(cond)?;
        let then_val = self.lower_expr(then_branch)?;
        let else_val = self.lower_expr(else_branch)?;
        let count = then_val.count();
        let dest = self.alloc(count);
        for i in 0..count as u8 {
            self.emit(format!(
                "selp r{}, r{}, r{}, r{}",
                dest + i,
                then_val.base + i,
                else_val.base + i,
                cond_val.base
            ));
        }
        Some(Value { base: dest, ty: then_val.ty })
    }

    fn lower_member(&mut self, object: &Expr, swizzle: &str, line: u32) -> Option<Value> {
        let obj = self.lower_expr(object)?;
        if swizzle.is_empty() || swizzle.len() > 4 {
            self.error(line, "Swizzle must select 1 to 4 components");
            return None;
        }
        let mut offsets = Vec::with_capacity(swizzle.len());
        for c in swizzle.chars() {
            match swizzle_offset(c) {
                Some(off) => offsets.push(off),
                None => {
                    self.error(line, format!("Invalid swizzle character '{}'", c));
                    return None;
                }
            }
        }
        let dest = self.alloc(offsets.len());
        for (i, &off) in offsets.iter().enumerate() {
            self.emit(format!("mov r{}, r{}", dest + i as u8, obj.base + off));
        }
        let ty = match offsets.len() {
            1 => Ty::Float,
            2 => Ty::Vec2,
            3 => Ty::Vec3,
            _ => Ty::Vec4,
        };
        Some(Value { base: dest, ty })
    }

    /// Expands each argument's component registers into consecutive
    /// destination slots, erroring on a component-count mismatch — a
    /// supplement of the original's first-register-only truncation, per
    /// `SPEC_FULL.md` §4.3.
    fn lower_construct(&mut self, ty: Ty, args: &[Expr], line: u32) -> Option<Value> {
        let mut sources = Vec::new();
        for arg in args {
            let val = self.lower_expr(arg)?;
            for i in 0..val.count() as u8 {
                sources.push(val.base + i);
            }
        }
        let expected = ty.component_count().max(1);
        if sources.len() != expected {
            self.error(
                line,
                format!("'{}' constructor expects {} components, found {}", ty, expected, sources.len()),
            );
            return None;
        }
        let dest = self.alloc(expected);
        for (i, &src) in sources.iter().enumerate() {
            self.emit(format!("mov r{}, r{}", dest + i as u8, src));
        }
        Some(Value { base: dest, ty })
    }

    fn lower_pre_inc_dec(&mut self, is_inc: bool, target: &Expr, line: u32) -> Option<Value> {
        let val = self.lower_expr(target)?;
        let regs = self.lvalue_regs(target)?;
        if regs.len() != 1 {
            self.error(line, "++/-- only apply to scalars");
            return None;
        }
        // `sub` reads `rs2` and ignores the immediate, so `subi rd, rd, 1`
        // (rd - r0) is a no-op. `add` is the only family that consults the
        // immediate, so decrement is `addi rd, rd, -1`.
        let step = if is_inc { 1 } else { -1 };
        self.emit(format!("addi r{}, r{}, {}", regs[0], regs[0], step));
        Some(Value { base: regs[0], ty: val.ty })
    }

    fn lower_post_inc_dec(&mut self, is_inc: bool, target: &Expr, line: u32) -> Option<Value> {
        let val = self.lower_expr(target)?;
        let regs = self.lvalue_regs(target)?;
        if regs.len() != 1 {
            self.error(line, "++/-- only apply to scalars");
            return None;
        }
        let snapshot = self.alloc(1);
        self.emit(format!("mov r{}, r{}", snapshot, regs[0]));
        let step = if is_inc { 1 } else { -1 };
        self.emit(format!("addi r{}, r{}, {}", regs[0], regs[0], step));
        Some(Value { base: snapshot, ty: val.ty })
    }

    fn lower_call(&mut self, callee: &str, args: &[Expr], line: u32) -> Option<Value> {
        let builtin = match Builtin::from_name(callee) {
            Some(b) => b,
            None => {
                self.error(line, format!("Unknown function '{}'", callee));
                return None;
            }
        };
        if args.len() != builtin.arity() {
            self.error(
                line,
                format!("'{}' expects {} argument(s), found {}", callee, builtin.arity(), args.len()),
            );
            return None;
        }
        match builtin {
            Builtin::Sin | Builtin::Cos | Builtin::Sqrt | Builtin::Exp2 | Builtin::Log2 | Builtin::Rcp
            | Builtin::Rsqrt | Builtin::Tanh => {
                let val = self.lower_expr(&args[0])?;
                let mnemonic = sfu_mnemonic(builtin);
                let dest = self.alloc(1);
                self.emit(format!("{} r{}, r{}", mnemonic, dest, val.base));
                Some(Value { base: dest, ty: Ty::Float })
            }
            Builtin::Abs => {
                let val = self.lower_expr(&args[0])?;
                let count = val.count();
                let dest = self.alloc(count);
                for i in 0..count as u8 {
                    self.emit(format!("fabs r{}, r{}", dest + i, val.base + i));
                }
                Some(Value { base: dest, ty: val.ty })
            }
            Builtin::Min | Builtin::Max => {
                let a = self.lower_expr(&args[0])?;
                let b = self.lower_expr(&args[1])?;
                let count = a.count();
                let mnemonic = if builtin == Builtin::Min { "fmin" } else { "fmax" };
                let dest = self.alloc(count);
                for i in 0..count as u8 {
                    self.emit(format!("{} r{}, r{}, r{}", mnemonic, dest + i, a.base + i, b.base + i));
                }
                Some(Value { base: dest, ty: a.ty })
            }
            Builtin::Clamp => {
                let a = self.lower_expr(&args[0])?;
                let lo = self.lower_expr(&args[1])?;
                let hi = self.lower_expr(&args[2])?;
                let count = a.count();
                let tmp = self.alloc(count);
                for i in 0..count as u8 {
                    self.emit(format!("fmax r{}, r{}, r{}", tmp + i, a.base + i, lo.base + i));
                }
                let dest = self.alloc(count);
                for i in 0..count as u8 {
                    self.emit(format!("fmin r{}, r{}, r{}", dest + i, tmp + i, hi.base + i));
                }
                Some(Value { base: dest, ty: a.ty })
            }
            // `mix(a,b,t) -> t <- b-a; t <- t*t; r <- a+t`: the original's
            // documented simplified form, implemented verbatim (it does not
            // actually use the interpolation factor beyond this point).
            Builtin::Mix => {
                let a = self.lower_expr(&args[0])?;
                let b = self.lower_expr(&args[1])?;
                let _t = self.lower_expr(&args[2])?;
                let count = a.count();
                let tmp = self.alloc(count);
                for i in 0..count as u8 {
                    self.emit(format!("fsub r{}, r{}, r{}", tmp + i, b.base + i, a.base + i));
                }
                for i in 0..count as u8 {
                    self.emit(format!("fmul r{}, r{}, r{}", tmp + i, tmp + i, tmp + i));
                }
                let dest = self.alloc(count);
                for i in 0..count as u8 {
                    self.emit(format!("fadd r{}, r{}, r{}", dest + i, a.base + i, tmp + i));
                }
                Some(Value { base: dest, ty: a.ty })
            }
            Builtin::Dot => {
                let a = self.lower_expr(&args[0])?;
                let b = self.lower_expr(&args[1])?;
                let tmp = self.alloc(3);
                for i in 0..3u8 {
                    self.emit(format!("fmul r{}, r{}, r{}", tmp + i, a.base + i, b.base + i));
                }
                let dest = self.alloc(1);
                self.emit(format!("fadd r{}, r{}, r{}", dest, tmp, tmp + 1));
                self.emit(format!("fadd r{}, r{}, r{}", dest, dest, tmp + 2));
                Some(Value { base: dest, ty: Ty::Float })
            }
            Builtin::Normalize => {
                let val = self.lower_expr(&args[0])?;
                let count = val.count();
                let sum = self.alloc(1);
                self.emit(format!("fmul r{}, r{}, r{}", sum, val.base, val.base));
                for i in 1..count as u8 {
                    let tmp = self.alloc(1);
                    self.emit(format!("fmul r{}, r{}, r{}", tmp, val.base + i, val.base + i));
                    self.emit(format!("fadd r{}, r{}, r{}", sum, sum, tmp));
                }
                let scale = self.alloc(1);
                self.emit(format!("rsqrt r{}, r{}", scale, sum));
                let dest = self.alloc(count);
                for i in 0..count as u8 {
                    self.emit(format!("fmul r{}, r{}, r{}", dest + i, val.base + i, scale));
                }
                Some(Value { base: dest, ty: val.ty })
            }
            Builtin::Texture => {
                let unit = match &args[0] {
                    Expr::Ident(name, ident_line) => match self.symtab.lookup(name) {
                        Some(sym) if sym.ty == Ty::Sampler2D => sym.base_register,
                        Some(_) => {
                            self.error(*ident_line, format!("'{}' is not a sampler2D", name));
                            return None;
                        }
                        None => {
                            self.error(*ident_line, format!("Undefined identifier '{}'", name));
                            return None;
                        }
                    },
                    other => {
                        self.error(other.line(), "texture() expects a sampler2D identifier as its first argument");
                        return None;
                    }
                };
                let uv = self.lower_expr(&args[1])?;
                let unit_reg = self.alloc(1);
                self.emit(format!("addi r{}, r0, {}", unit_reg, unit));
                let dest = self.alloc(4);
                self.emit(format!("tex r{}, r{}, r{}", dest, unit_reg, uv.base));
                Some(Value { base: dest, ty: Ty::Vec4 })
            }
        }
    }

    fn finish(self) -> GeneratedAssembly {
        let mut text = self.header;
        if !text.is_empty() {
            text.push('\n');
        }
        text.push_str(&self.code);
        for &(addr, value) in &self.constants {
            text.push_str(&format!(".data {}, {}\n", addr, value));
        }
        GeneratedAssembly { text, constants: self.constants }
    }
}

fn arithmetic_mnemonic(op: BinOp, is_int: bool) -> &'static str {
    match (op, is_int) {
        (BinOp::Add, true) => "add",
        (BinOp::Add, false) => "fadd",
        (BinOp::Sub, true) => "sub",
        (BinOp::Sub, false) => "fsub",
        (BinOp::Mul, true) => "mul",
        (BinOp::Mul, false) => "fmul",
        (BinOp::Div, true) => "idiv",
        (BinOp::Div, false) => "fdiv",
        (BinOp::Rem, true) => "irem",
        (BinOp::Rem, false) => unreachable!("checked by caller"),
        _ => unreachable!(),
    }
}

fn sfu_mnemonic(builtin: Builtin) -> &'static str {
    match builtin {
        Builtin::Sin => "sin",
        Builtin::Cos => "cos",
        Builtin::Sqrt => "sqrt",
        Builtin::Exp2 => "exp2",
        Builtin::Log2 => "log2",
        Builtin::Rcp => "rcp",
        Builtin::Rsqrt => "rsqrt",
        Builtin::Tanh => "tanh",
        _ => unreachable!(),
    }
}

/// `.x|.r|.s -> 0, .y|.g|.t -> 1, .z|.b|.p -> 2, .w|.a|.q -> 3`, per
/// `spec.md` §4.3.
fn swizzle_offset(c: char) -> Option<u8> {
    match c {
        'x' | 'r' | 's' => Some(0),
        'y' | 'g' | 't' => Some(1),
        'z' | 'b' | 'p' => Some(2),
        'w' | 'a' | 'q' => Some(3),
        _ => None,
    }
}
