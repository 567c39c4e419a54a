//! Recursive-descent, precedence-climbing parser. Grounded on
//! `parse_primary`/`parse_postfix`/`parse_unary`/`parse_binary`/
//! `parse_ternary`/`parse_assignment`/`parse_var_decl`/`parse_if`/
//! `parse_for`/`parse_while`/`parse_block`/`parse_stmt`/`parse_function`/
//! `parse_program` in
//! `examples/original_source/tools/shader/milo_glsl.c`.
//!
//! Per `SPEC_FULL.md` §4.2, fatal structural errors (a missing terminator)
//! are propagated immediately via `Result`/`?` rather than accumulated —
//! the 32-error accumulation cap from `spec.md` §4.2/§7 applies to codegen's
//! semantic diagnostics (undefined identifiers, unknown built-ins), not to
//! parsing.

use super::ast::*;
use super::token::{Lexer, Token, TokenKind};
use super::ty::{StorageClass, Ty};
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseError {
    pub line: u32,
    pub message: String,
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "Line {}: {}", self.line, self.message)
    }
}

impl std::error::Error for ParseError {}

type PResult<T> = Result<T, ParseError>;

pub struct Parser<'src> {
    lexer: Lexer<'src>,
}

pub fn parse(src: &str) -> PResult<Program> {
    let mut parser = Parser { lexer: Lexer::new(src) };
    parser.parse_program()
}

impl<'src> Parser<'src> {
    fn peek(&self) -> &Token {
        self.lexer.peek()
    }

    fn bump(&mut self) -> Token {
        self.lexer.next_token()
    }

    fn line(&self) -> u32 {
        self.peek().line
    }

    fn err<T>(&self, message: impl Into<String>) -> PResult<T> {
        Err(ParseError { line: self.line(), message: message.into() })
    }

    fn expect(&mut self, kind: TokenKind) -> PResult<Token> {
        if self.peek().kind == kind {
            Ok(self.bump())
        } else {
            self.err(format!("Expected {:?}, found {:?}", kind, self.peek().kind))
        }
    }

    fn ident(&self) -> Option<String> {
        match &self.peek().kind {
            TokenKind::Ident(name) => Some(name.clone()),
            _ => None,
        }
    }

    fn eat_ident(&mut self, expected: &str) -> bool {
        if self.ident().as_deref() == Some(expected) {
            self.bump();
            true
        } else {
            false
        }
    }

    fn expect_ident(&mut self) -> PResult<String> {
        match self.ident() {
            Some(name) => {
                self.bump();
                Ok(name)
            }
            None => self.err(format!("Expected identifier, found {:?}", self.peek().kind)),
        }
    }

    // ---- top level ----

    fn parse_program(&mut self) -> PResult<Program> {
        let mut program = Program::default();
        let mut pending_location: Option<u32> = None;

        loop {
            match &self.peek().kind {
                TokenKind::Eof => break,
                TokenKind::Hash => {
                    let line = self.line();
                    self.bump();
                    while self.line() == line && self.peek().kind != TokenKind::Eof {
                        self.bump();
                    }
                }
                TokenKind::Ident(name) if name == "precision" => {
                    self.bump();
                    self.expect_ident()?; // qualifier, e.g. "highp"
                    self.expect_ident()?; // type
                    self.expect(TokenKind::Semicolon)?;
                }
                TokenKind::Ident(name) if name == "layout" => {
                    self.bump();
                    self.expect(TokenKind::LParen)?;
                    self.expect_ident()?; // "location"
                    self.expect(TokenKind::Assign)?;
                    let loc = self.expect_int()?;
                    self.expect(TokenKind::RParen)?;
                    pending_location = Some(loc as u32);
                }
                _ => {
                    let item = self.parse_top_level_decl(pending_location.take())?;
                    program.items.push(item);
                }
            }
        }

        Ok(program)
    }

    fn expect_int(&mut self) -> PResult<i64> {
        match self.peek().kind.clone() {
            TokenKind::IntLit(v) => {
                self.bump();
                Ok(v)
            }
            other => self.err(format!("Expected integer literal, found {:?}", other)),
        }
    }

    fn parse_storage_class(&mut self) -> StorageClass {
        if self.eat_ident("uniform") {
            StorageClass::UniformInput
        } else if self.eat_ident("in") {
            StorageClass::StageInput
        } else if self.eat_ident("out") {
            StorageClass::StageOutput
        } else if self.eat_ident("const") {
            StorageClass::Const
        } else {
            StorageClass::Local
        }
    }

    fn parse_type(&mut self) -> PResult<Ty> {
        let line = self.line();
        let name = self.expect_ident()?;
        Ty::from_keyword(&name).ok_or_else(|| ParseError {
            line,
            message: format!("Unknown type '{}'", name),
        })
    }

    fn parse_top_level_decl(&mut self, location: Option<u32>) -> PResult<TopLevel> {
        let storage = self.parse_storage_class();
        let line = self.line();
        let ty = self.parse_type()?;
        let name = self.expect_ident()?;

        if self.peek().kind == TokenKind::LParen {
            let params = self.parse_param_list()?;
            let body = self.parse_block()?;
            return Ok(TopLevel::Function(Function { name, return_ty: ty, params, body, line }));
        }

        let initializer = if self.peek().kind == TokenKind::Assign {
            self.bump();
            Some(self.parse_expression()?)
        } else {
            None
        };
        self.expect(TokenKind::Semicolon)?;
        Ok(TopLevel::Global(Decl { name, ty, storage, location, initializer, line }))
    }

    fn parse_param_list(&mut self) -> PResult<Vec<Param>> {
        self.expect(TokenKind::LParen)?;
        let mut params = Vec::new();
        if self.peek().kind != TokenKind::RParen {
            loop {
                let ty = self.parse_type()?;
                let name = self.expect_ident()?;
                params.push(Param { name, ty });
                if self.peek().kind == TokenKind::Comma {
                    self.bump();
                } else {
                    break;
                }
            }
        }
        self.expect(TokenKind::RParen)?;
        Ok(params)
    }

    // ---- statements ----

    fn parse_block(&mut self) -> PResult<Vec<Stmt>> {
        self.expect(TokenKind::LBrace)?;
        let mut stmts = Vec::new();
        while self.peek().kind != TokenKind::RBrace {
            if self.peek().kind == TokenKind::Eof {
                return self.err("Expected '}'");
            }
            stmts.push(self.parse_stmt()?);
        }
        self.bump();
        Ok(stmts)
    }

    fn stmt_or_block(&mut self) -> PResult<Vec<Stmt>> {
        if self.peek().kind == TokenKind::LBrace {
            self.parse_block()
        } else {
            Ok(vec![self.parse_stmt()?])
        }
    }

    fn starts_type(&self) -> bool {
        matches!(&self.peek().kind, TokenKind::Ident(name) if Ty::from_keyword(name).is_some())
    }

    fn parse_stmt(&mut self) -> PResult<Stmt> {
        match &self.peek().kind {
            TokenKind::LBrace => Ok(Stmt::Block(self.parse_block()?)),
            TokenKind::Ident(name) if name == "if" => self.parse_if(),
            TokenKind::Ident(name) if name == "for" => self.parse_for(),
            TokenKind::Ident(name) if name == "while" => self.parse_while(),
            TokenKind::Ident(name) if name == "return" => {
                self.bump();
                let value = if self.peek().kind == TokenKind::Semicolon {
                    None
                } else {
                    Some(self.parse_expression()?)
                };
                self.expect(TokenKind::Semicolon)?;
                Ok(Stmt::Return(value))
            }
            TokenKind::Ident(name) if name == "break" => {
                self.bump();
                self.expect(TokenKind::Semicolon)?;
                Ok(Stmt::Break)
            }
            TokenKind::Ident(name) if name == "continue" => {
                self.bump();
                self.expect(TokenKind::Semicolon)?;
                Ok(Stmt::Continue)
            }
            TokenKind::Ident(name) if name == "discard" => {
                self.bump();
                self.expect(TokenKind::Semicolon)?;
                Ok(Stmt::Discard)
            }
            _ if self.starts_type() => {
                let decl = self.parse_local_var_decl()?;
                Ok(Stmt::VarDecl(decl))
            }
            _ => {
                let expr = self.parse_expression()?;
                self.expect(TokenKind::Semicolon)?;
                Ok(Stmt::Expr(expr))
            }
        }
    }

    fn parse_local_var_decl(&mut self) -> PResult<Decl> {
        let line = self.line();
        let ty = self.parse_type()?;
        let name = self.expect_ident()?;
        let initializer = if self.peek().kind == TokenKind::Assign {
            self.bump();
            Some(self.parse_expression()?)
        } else {
            None
        };
        self.expect(TokenKind::Semicolon)?;
        Ok(Decl { name, ty, storage: StorageClass::Local, location: None, initializer, line })
    }

    fn parse_if(&mut self) -> PResult<Stmt> {
        self.bump(); // "if"
        self.expect(TokenKind::LParen)?;
        let cond = self.parse_expression()?;
        self.expect(TokenKind::RParen)?;
        let then_branch = self.stmt_or_block()?;
        let else_branch = if self.eat_ident("else") {
            self.stmt_or_block()?
        } else {
            Vec::new()
        };
        Ok(Stmt::If { cond, then_branch, else_branch })
    }

    fn parse_for(&mut self) -> PResult<Stmt> {
        self.bump(); // "for"
        self.expect(TokenKind::LParen)?;

        let init = if self.peek().kind == TokenKind::Semicolon {
            self.bump();
            None
        } else if self.starts_type() {
            Some(Box::new(Stmt::VarDecl(self.parse_local_var_decl()?)))
        } else {
            let e = self.parse_expression()?;
            self.expect(TokenKind::Semicolon)?;
            Some(Box::new(Stmt::Expr(e)))
        };

        let cond = if self.peek().kind == TokenKind::Semicolon {
            None
        } else {
            Some(self.parse_expression()?)
        };
        self.expect(TokenKind::Semicolon)?;

        let step = if self.peek().kind == TokenKind::RParen {
            None
        } else {
            Some(self.parse_expression()?)
        };
        self.expect(TokenKind::RParen)?;

        let body = self.stmt_or_block()?;
        Ok(Stmt::For { init, cond, step, body })
    }

    fn parse_while(&mut self) -> PResult<Stmt> {
        self.bump(); // "while"
        self.expect(TokenKind::LParen)?;
        let cond = self.parse_expression()?;
        self.expect(TokenKind::RParen)?;
        let body = self.stmt_or_block()?;
        Ok(Stmt::While { cond, body })
    }

    // ---- expressions ----

    fn parse_expression(&mut self) -> PResult<Expr> {
        self.parse_assignment()
    }

    fn parse_assignment(&mut self) -> PResult<Expr> {
        let target = self.parse_ternary()?;
        let op = match self.peek().kind {
            TokenKind::Assign => AssignOp::Assign,
            TokenKind::PlusEq => AssignOp::Add,
            TokenKind::MinusEq => AssignOp::Sub,
            TokenKind::StarEq => AssignOp::Mul,
            TokenKind::SlashEq => AssignOp::Div,
            _ => return Ok(target),
        };
        let line = self.line();
        self.bump();
        let value = self.parse_assignment()?;
        Ok(Expr::Assign { op, target: Box::new(target), value: Box::new(value), line })
    }

    fn parse_ternary(&mut self) -> PResult<Expr> {
        let cond = self.parse_or()?;
        if self.peek().kind == TokenKind::Question {
            let line = self.line();
            self.bump();
            let then_branch = self.parse_assignment()?;
            self.expect(TokenKind::Colon)?;
            let else_branch = self.parse_assignment()?;
            Ok(Expr::Ternary {
                cond: Box::new(cond),
                then_branch: Box::new(then_branch),
                else_branch: Box::new(else_branch),
                line,
            })
        } else {
            Ok(cond)
        }
    }

    fn parse_or(&mut self) -> PResult<Expr> {
        let mut lhs = self.parse_and()?;
        while self.peek().kind == TokenKind::OrOr {
            let line = self.line();
            self.bump();
            let rhs = self.parse_and()?;
            lhs = Expr::Binary { op: BinOp::Or, lhs: Box::new(lhs), rhs: Box::new(rhs), line };
        }
        Ok(lhs)
    }

    fn parse_and(&mut self) -> PResult<Expr> {
        let mut lhs = self.parse_equality()?;
        while self.peek().kind == TokenKind::AndAnd {
            let line = self.line();
            self.bump();
            let rhs = self.parse_equality()?;
            lhs = Expr::Binary { op: BinOp::And, lhs: Box::new(lhs), rhs: Box::new(rhs), line };
        }
        Ok(lhs)
    }

    fn parse_equality(&mut self) -> PResult<Expr> {
        let mut lhs = self.parse_relational()?;
        loop {
            let op = match self.peek().kind {
                TokenKind::Eq => BinOp::Eq,
                TokenKind::Ne => BinOp::Ne,
                _ => break,
            };
            let line = self.line();
            self.bump();
            let rhs = self.parse_relational()?;
            lhs = Expr::Binary { op, lhs: Box::new(lhs), rhs: Box::new(rhs), line };
        }
        Ok(lhs)
    }

    fn parse_relational(&mut self) -> PResult<Expr> {
        let mut lhs = self.parse_additive()?;
        loop {
            let op = match self.peek().kind {
                TokenKind::Lt => BinOp::Lt,
                TokenKind::Le => BinOp::Le,
                TokenKind::Gt => BinOp::Gt,
                TokenKind::Ge => BinOp::Ge,
                _ => break,
            };
            let line = self.line();
            self.bump();
            let rhs = self.parse_additive()?;
            lhs = Expr::Binary { op, lhs: Box::new(lhs), rhs: Box::new(rhs), line };
        }
        Ok(lhs)
    }

    fn parse_additive(&mut self) -> PResult<Expr> {
        let mut lhs = self.parse_multiplicative()?;
        loop {
            let op = match self.peek().kind {
                TokenKind::Plus => BinOp::Add,
                TokenKind::Minus => BinOp::Sub,
                _ => break,
            };
            let line = self.line();
            self.bump();
            let rhs = self.parse_multiplicative()?;
            lhs = Expr::Binary { op, lhs: Box::new(lhs), rhs: Box::new(rhs), line };
        }
        Ok(lhs)
    }

    fn parse_multiplicative(&mut self) -> PResult<Expr> {
        let mut lhs = self.parse_unary()?;
        loop {
            let op = match self.peek().kind {
                TokenKind::Star => BinOp::Mul,
                TokenKind::Slash => BinOp::Div,
                TokenKind::Percent => BinOp::Rem,
                _ => break,
            };
            let line = self.line();
            self.bump();
            let rhs = self.parse_unary()?;
            lhs = Expr::Binary { op, lhs: Box::new(lhs), rhs: Box::new(rhs), line };
        }
        Ok(lhs)
    }

    fn parse_unary(&mut self) -> PResult<Expr> {
        let line = self.line();
        match self.peek().kind {
            TokenKind::Minus => {
                self.bump();
                let operand = self.parse_unary()?;
                Ok(Expr::Unary { op: UnOp::Neg, operand: Box::new(operand), line })
            }
            TokenKind::Bang => {
                self.bump();
                let operand = self.parse_unary()?;
                Ok(Expr::Unary { op: UnOp::Not, operand: Box::new(operand), line })
            }
            TokenKind::PlusPlus => {
                self.bump();
                let target = self.parse_unary()?;
                Ok(Expr::PreIncDec { is_inc: true, target: Box::new(target), line })
            }
            TokenKind::MinusMinus => {
                self.bump();
                let target = self.parse_unary()?;
                Ok(Expr::PreIncDec { is_inc: false, target: Box::new(target), line })
            }
            _ => self.parse_postfix(),
        }
    }

    fn parse_postfix(&mut self) -> PResult<Expr> {
        let mut expr = self.parse_primary()?;
        loop {
            match self.peek().kind {
                TokenKind::Dot => {
                    let line = self.line();
                    self.bump();
                    let swizzle = self.expect_ident()?;
                    expr = Expr::Member { object: Box::new(expr), swizzle, line };
                }
                TokenKind::LBracket => {
                    let line = self.line();
                    self.bump();
                    let index = self.parse_expression()?;
                    self.expect(TokenKind::RBracket)?;
                    expr = Expr::Index { object: Box::new(expr), index: Box::new(index), line };
                }
                TokenKind::PlusPlus => {
                    let line = self.line();
                    self.bump();
                    expr = Expr::PostIncDec { is_inc: true, target: Box::new(expr), line };
                }
                TokenKind::MinusMinus => {
                    let line = self.line();
                    self.bump();
                    expr = Expr::PostIncDec { is_inc: false, target: Box::new(expr), line };
                }
                _ => break,
            }
        }
        Ok(expr)
    }

    fn parse_primary(&mut self) -> PResult<Expr> {
        let line = self.line();
        match self.peek().kind.clone() {
            TokenKind::IntLit(v) => {
                self.bump();
                Ok(Expr::IntLit(v, line))
            }
            TokenKind::FloatLit(v) => {
                self.bump();
                Ok(Expr::FloatLit(v, line))
            }
            TokenKind::LParen => {
                self.bump();
                let inner = self.parse_expression()?;
                self.expect(TokenKind::RParen)?;
                Ok(inner)
            }
            TokenKind::Ident(name) => {
                self.bump();
                if self.peek().kind == TokenKind::LParen {
                    let args = self.parse_arg_list()?;
                    if let Some(ty) = Ty::from_keyword(&name) {
                        Ok(Expr::Construct { ty, args, line })
                    } else {
                        Ok(Expr::Call { callee: name, args, line })
                    }
                } else {
                    Ok(Expr::Ident(name, line))
                }
            }
            other => self.err(format!("Unexpected token {:?}", other)),
        }
    }

    fn parse_arg_list(&mut self) -> PResult<Vec<Expr>> {
        self.expect(TokenKind::LParen)?;
        let mut args = Vec::new();
        if self.peek().kind != TokenKind::RParen {
            loop {
                args.push(self.parse_assignment()?);
                if self.peek().kind == TokenKind::Comma {
                    self.bump();
                } else {
                    break;
                }
            }
        }
        self.expect(TokenKind::RParen)?;
        Ok(args)
    }
}
