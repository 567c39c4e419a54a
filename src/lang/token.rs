//! Hand-written lexer. Grounded on `scan_token`/`skip_whitespace` in
//! `examples/original_source/tools/shader/milo_glsl.c`; reimplemented over a
//! `Peekable<CharIndices>`-style cursor with an explicit `enum TokenKind`
//! instead of the original's integer token tags.

use std::iter::Peekable;
use std::str::CharIndices;

#[derive(Debug, Clone, PartialEq)]
pub enum TokenKind {
    Ident(String),
    IntLit(i64),
    FloatLit(f64),

    // Punctuation
    LParen,
    RParen,
    LBrace,
    RBrace,
    LBracket,
    RBracket,
    Comma,
    Semicolon,
    Dot,
    Question,
    Colon,
    Hash,

    // Operators
    Plus,
    Minus,
    Star,
    Slash,
    Percent,
    Assign,
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
    AndAnd,
    OrOr,
    Bang,
    PlusPlus,
    MinusMinus,
    PlusEq,
    MinusEq,
    StarEq,
    SlashEq,

    Eof,
    Error(char),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub line: u32,
}

pub struct Lexer<'src> {
    chars: Peekable<CharIndices<'src>>,
    src: &'src str,
    line: u32,
    lookahead: Option<Token>,
}

impl<'src> Lexer<'src> {
    pub fn new(src: &'src str) -> Lexer<'src> {
        let mut lexer = Lexer {
            chars: src.char_indices().peekable(),
            src,
            line: 1,
            lookahead: None,
        };
        lexer.lookahead = Some(lexer.scan_token());
        lexer
    }

    pub fn peek(&self) -> &Token {
        self.lookahead.as_ref().expect("lexer always has a lookahead token")
    }

    pub fn next_token(&mut self) -> Token {
        let next = self.scan_token();
        std::mem::replace(&mut self.lookahead, Some(next)).unwrap()
    }

    fn bump(&mut self) -> Option<char> {
        let (_, c) = self.chars.next()?;
        if c == '\n' {
            self.line += 1;
        }
        Some(c)
    }

    fn peek_char(&mut self) -> Option<char> {
        self.chars.peek().map(|&(_, c)| c)
    }

    fn peek_pos(&mut self) -> Option<usize> {
        self.chars.peek().map(|&(i, _)| i)
    }

    fn skip_whitespace_and_comments(&mut self) {
        loop {
            match self.peek_char() {
                Some(c) if c.is_ascii_whitespace() => {
                    self.bump();
                }
                Some('/') => {
                    let mut lookahead = self.chars.clone();
                    lookahead.next();
                    match lookahead.peek() {
                        Some(&(_, '/')) => {
                            while !matches!(self.peek_char(), None | Some('\n')) {
                                self.bump();
                            }
                        }
                        Some(&(_, '*')) => {
                            self.bump();
                            self.bump();
                            loop {
                                match self.peek_char() {
                                    None => break,
                                    Some('*') => {
                                        self.bump();
                                        if self.peek_char() == Some('/') {
                                            self.bump();
                                            break;
                                        }
                                    }
                                    Some(_) => {
                                        self.bump();
                                    }
                                }
                            }
                        }
                        _ => break,
                    }
                }
                _ => break,
            }
        }
    }

    fn scan_token(&mut self) -> Token {
        self.skip_whitespace_and_comments();
        let line = self.line;

        let c = match self.bump() {
            Some(c) => c,
            None => return Token { kind: TokenKind::Eof, line },
        };

        let kind = match c {
            '(' => TokenKind::LParen,
            ')' => TokenKind::RParen,
            '{' => TokenKind::LBrace,
            '}' => TokenKind::RBrace,
            '[' => TokenKind::LBracket,
            ']' => TokenKind::RBracket,
            ',' => TokenKind::Comma,
            ';' => TokenKind::Semicolon,
            '.' if !self.peek_char().is_some_and(|c| c.is_ascii_digit()) => TokenKind::Dot,
            '?' => TokenKind::Question,
            ':' => TokenKind::Colon,
            '#' => TokenKind::Hash,

            '+' => match self.peek_char() {
                Some('+') => {
                    self.bump();
                    TokenKind::PlusPlus
                }
                Some('=') => {
                    self.bump();
                    TokenKind::PlusEq
                }
                _ => TokenKind::Plus,
            },
            '-' => match self.peek_char() {
                Some('-') => {
                    self.bump();
                    TokenKind::MinusMinus
                }
                Some('=') => {
                    self.bump();
                    TokenKind::MinusEq
                }
                _ => TokenKind::Minus,
            },
            '*' => match self.peek_char() {
                Some('=') => {
                    self.bump();
                    TokenKind::StarEq
                }
                _ => TokenKind::Star,
            },
            '/' => match self.peek_char() {
                Some('=') => {
                    self.bump();
                    TokenKind::SlashEq
                }
                _ => TokenKind::Slash,
            },
            '%' => TokenKind::Percent,
            '=' => match self.peek_char() {
                Some('=') => {
                    self.bump();
                    TokenKind::Eq
                }
                _ => TokenKind::Assign,
            },
            '!' => match self.peek_char() {
                Some('=') => {
                    self.bump();
                    TokenKind::Ne
                }
                _ => TokenKind::Bang,
            },
            '<' => match self.peek_char() {
                Some('=') => {
                    self.bump();
                    TokenKind::Le
                }
                _ => TokenKind::Lt,
            },
            '>' => match self.peek_char() {
                Some('=') => {
                    self.bump();
                    TokenKind::Ge
                }
                _ => TokenKind::Gt,
            },
            '&' if self.peek_char() == Some('&') => {
                self.bump();
                TokenKind::AndAnd
            }
            '|' if self.peek_char() == Some('|') => {
                self.bump();
                TokenKind::OrOr
            }

            c if c.is_ascii_digit() || (c == '.' && self.peek_char().is_some_and(|c| c.is_ascii_digit())) => {
                return self.scan_number(c, line);
            }
            c if c.is_ascii_alphabetic() || c == '_' => return self.scan_ident(c, line),

            other => TokenKind::Error(other),
        };

        Token { kind, line }
    }

    fn scan_number(&mut self, first: char, line: u32) -> Token {
        let start = self.peek_pos().map(|p| p - first.len_utf8()).unwrap_or(0);
        let mut is_float = first == '.';
        let mut is_hex = false;

        if first == '0' && self.peek_char() == Some('x') {
            is_hex = true;
            self.bump();
            while self.peek_char().is_some_and(|c| c.is_ascii_hexdigit()) {
                self.bump();
            }
        } else {
            while self.peek_char().is_some_and(|c| c.is_ascii_digit()) {
                self.bump();
            }
            if !is_float && self.peek_char() == Some('.') {
                is_float = true;
                self.bump();
                while self.peek_char().is_some_and(|c| c.is_ascii_digit()) {
                    self.bump();
                }
            }
            if matches!(self.peek_char(), Some('e') | Some('E')) {
                let mut lookahead = self.chars.clone();
                lookahead.next();
                let exp_starts = matches!(lookahead.peek(), Some((_, c)) if c.is_ascii_digit() || *c == '+' || *c == '-');
                if exp_starts {
                    is_float = true;
                    self.bump();
                    if matches!(self.peek_char(), Some('+') | Some('-')) {
                        self.bump();
                    }
                    while self.peek_char().is_some_and(|c| c.is_ascii_digit()) {
                        self.bump();
                    }
                }
            }
        }

        let mut has_suffix = false;
        if matches!(self.peek_char(), Some('f') | Some('F')) {
            has_suffix = true;
            self.bump();
        }

        let end = self.peek_pos().unwrap_or(self.src.len());
        let text = &self.src[start..end];
        let text = text.trim_end_matches(['f', 'F']);

        let kind = if is_hex {
            let digits = &text[2..];
            TokenKind::IntLit(i64::from_str_radix(digits, 16).unwrap_or(0))
        } else if is_float || has_suffix {
            TokenKind::FloatLit(text.parse().unwrap_or(0.0))
        } else {
            TokenKind::IntLit(text.parse().unwrap_or(0))
        };

        Token { kind, line }
    }

    fn scan_ident(&mut self, first: char, line: u32) -> Token {
        let start = self.peek_pos().map(|p| p - first.len_utf8()).unwrap_or(0);
        while self.peek_char().is_some_and(|c| c.is_ascii_alphanumeric() || c == '_') {
            self.bump();
        }
        let end = self.peek_pos().unwrap_or(self.src.len());
        let text = &self.src[start..end];
        Token {
            kind: TokenKind::Ident(text.to_string()),
            line,
        }
    }
}
