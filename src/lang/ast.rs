//! Sum-type AST, per `spec.md` §9's redesign note: one constructor per node
//! kind with owned `Vec<T>` children, replacing the original's single
//! tagged node with a next-sibling list.

use super::ty::{StorageClass, Ty};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinOp {
    Add,
    Sub,
    Mul,
    Div,
    Rem,
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
    And,
    Or,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnOp {
    Neg,
    Not,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssignOp {
    Assign,
    Add,
    Sub,
    Mul,
    Div,
}

#[derive(Debug, Clone)]
pub enum Expr {
    IntLit(i64, u32),
    FloatLit(f64, u32),
    Ident(String, u32),
    Unary {
        op: UnOp,
        operand: Box<Expr>,
        line: u32,
    },
    Binary {
        op: BinOp,
        lhs: Box<Expr>,
        rhs: Box<Expr>,
        line: u32,
    },
    Assign {
        op: AssignOp,
        target: Box<Expr>,
        value: Box<Expr>,
        line: u32,
    },
    Ternary {
        cond: Box<Expr>,
        then_branch: Box<Expr>,
        else_branch: Box<Expr>,
        line: u32,
    },
    Call {
        callee: String,
        args: Vec<Expr>,
        line: u32,
    },
    Construct {
        ty: Ty,
        args: Vec<Expr>,
        line: u32,
    },
    Member {
        object: Box<Expr>,
        swizzle: String,
        line: u32,
    },
    Index {
        object: Box<Expr>,
        index: Box<Expr>,
        line: u32,
    },
    PreIncDec {
        is_inc: bool,
        target: Box<Expr>,
        line: u32,
    },
    PostIncDec {
        is_inc: bool,
        target: Box<Expr>,
        line: u32,
    },
}

impl Expr {
    pub fn line(&self) -> u32 {
        match self {
            Expr::IntLit(_, l) | Expr::FloatLit(_, l) | Expr::Ident(_, l) => *l,
            Expr::Unary { line, .. }
            | Expr::Binary { line, .. }
            | Expr::Assign { line, .. }
            | Expr::Ternary { line, .. }
            | Expr::Call { line, .. }
            | Expr::Construct { line, .. }
            | Expr::Member { line, .. }
            | Expr::Index { line, .. }
            | Expr::PreIncDec { line, .. }
            | Expr::PostIncDec { line, .. } => *line,
        }
    }
}

#[derive(Debug, Clone)]
pub enum Stmt {
    Expr(Expr),
    VarDecl(Decl),
    If {
        cond: Expr,
        then_branch: Vec<Stmt>,
        else_branch: Vec<Stmt>,
    },
    For {
        init: Option<Box<Stmt>>,
        cond: Option<Expr>,
        step: Option<Expr>,
        body: Vec<Stmt>,
    },
    While {
        cond: Expr,
        body: Vec<Stmt>,
    },
    Return(Option<Expr>),
    Break,
    Continue,
    Discard,
    Block(Vec<Stmt>),
}

#[derive(Debug, Clone)]
pub struct Decl {
    pub name: String,
    pub ty: Ty,
    pub storage: StorageClass,
    pub location: Option<u32>,
    pub initializer: Option<Expr>,
    pub line: u32,
}

#[derive(Debug, Clone)]
pub struct Param {
    pub name: String,
    pub ty: Ty,
}

#[derive(Debug, Clone)]
pub struct Function {
    pub name: String,
    pub return_ty: Ty,
    pub params: Vec<Param>,
    pub body: Vec<Stmt>,
    pub line: u32,
}

#[derive(Debug, Clone)]
pub enum TopLevel {
    Function(Function),
    Global(Decl),
}

#[derive(Debug, Clone, Default)]
pub struct Program {
    pub items: Vec<TopLevel>,
}
