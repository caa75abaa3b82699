// SPDX-License-Identifier: MIT
// Copyright (c) 2026 The Lumen Authors

//! Single-pass Pratt compiler.
//!
//! Drives the [`Scanner`](crate::scanner::Scanner) and emits bytecode
//! directly into a [`Chunk`]. There is no intermediate AST. Precedence
//! climbing dispatches on token kind ([`infix_precedence`], `call_prefix`,
//! `call_infix`); scope tracking uses a flat `locals` array purely to
//! catch a variable reading itself in its own initializer. Every
//! *reachable* variable read or write still compiles to a global op:
//! this core never emits `OP_GET_LOCAL`/`OP_SET_LOCAL`, matching the
//! reference compiler's actual behavior.

pub mod disassemble;


use core::fmt;

use crate::bytecode::{Chunk, MAX_CONSTANTS, OpCode};
use crate::heap::Heap;
use crate::scanner::{Scanner, Token, TokenKind};
use crate::value::Value;

/// Compilation failed; diagnostics were already printed to stderr as
/// they were discovered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CompileError;

impl fmt::Display for CompileError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "compilation failed")
    }
}

impl std::error::Error for CompileError {}

/// Precedence levels, low to high. [`infix_precedence`] maps each infix
/// operator to its row here, used to decide whether `parse_precedence`
/// should keep consuming.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
#[repr(u8)]
enum Precedence {
    None,
    Assignment,
    Or,
    And,
    Equality,
    Comparison,
    Term,
    Factor,
    Unary,
    Call,
    Primary,
}

impl Precedence {
    const fn next(self) -> Self {
        match self {
            Self::None => Self::Assignment,
            Self::Assignment => Self::Or,
            Self::Or => Self::And,
            Self::And => Self::Equality,
            Self::Equality => Self::Comparison,
            Self::Comparison => Self::Term,
            Self::Term => Self::Factor,
            Self::Factor => Self::Unary,
            Self::Unary => Self::Call,
            Self::Call | Self::Primary => Self::Primary,
        }
    }
}

/// The infix precedence of `kind`, i.e. row 3 of the reference
/// compiler's static `rules[]` table. Expressed as a `match` rather than
/// an array of function pointers, an equivalent mapping per the
/// documented design latitude for the Pratt table's representation.
const fn infix_precedence(kind: TokenKind) -> Precedence {
    match kind {
        TokenKind::Minus | TokenKind::Plus => Precedence::Term,
        TokenKind::Slash | TokenKind::Star => Precedence::Factor,
        TokenKind::BangEqual | TokenKind::EqualEqual => Precedence::Equality,
        TokenKind::Greater | TokenKind::GreaterEqual | TokenKind::Less | TokenKind::LessEqual => {
            Precedence::Comparison
        }
        _ => Precedence::None,
    }
}

/// A name tracked purely so a read of it inside its own initializer can
/// be caught at compile time. `depth == -1` marks "being initialized".
struct Local<'src> {
    name: &'src str,
    depth: i32,
}

/// The single-pass compiler. Borrows the heap so string literals and
/// identifier names intern directly into the same heap the VM will run
/// against.
pub struct Compiler<'src> {
    scanner: Scanner<'src>,
    previous: Token<'src>,
    current: Token<'src>,
    had_error: bool,
    panic_mode: bool,
    chunk: Chunk,
    locals: Vec<Local<'src>>,
    scope_depth: i32,
    heap: &'src mut Heap,
}

/// Declaring more than this many locals in one scope is a compile error;
/// matches `UINT8_COUNT` (one byte can address at most 256 local slots).
const MAX_LOCALS: usize = 256;

impl<'src> Compiler<'src> {
    fn new(source: &'src str, heap: &'src mut Heap) -> Self {
        let missing = Token {
            kind: TokenKind::Eof,
            lexeme: "",
            line: 0,
        };
        Self {
            scanner: Scanner::new(source),
            previous: missing,
            current: missing,
            had_error: false,
            panic_mode: false,
            chunk: Chunk::new(),
            locals: Vec::new(),
            scope_depth: 0,
            heap,
        }
    }

    // ---- token stream -------------------------------------------------

    fn advance(&mut self) {
        self.previous = self.current;
        loop {
            self.current = self.scanner.scan_token();
            if self.current.kind != TokenKind::Error {
                break;
            }
            self.error_at_current(self.current.lexeme);
        }
    }

    fn consume(&mut self, kind: TokenKind, message: &str) {
        if self.current.kind == kind {
            self.advance();
            return;
        }
        self.error_at_current(message);
    }

    fn check(&self, kind: TokenKind) -> bool {
        self.current.kind == kind
    }

    fn match_token(&mut self, kind: TokenKind) -> bool {
        if !self.check(kind) {
            return false;
        }
        self.advance();
        true
    }

    // ---- error reporting ------------------------------------------------

    fn error_at_current(&mut self, message: &str) {
        let token = self.current;
        self.error_at(token, message);
    }

    fn error(&mut self, message: &str) {
        let token = self.previous;
        self.error_at(token, message);
    }

    fn error_at(&mut self, token: Token<'src>, message: &str) {
        if self.panic_mode {
            return;
        }
        self.panic_mode = true;
        eprint!("[line {}] Error", token.line);
        match token.kind {
            TokenKind::Eof => eprint!(" at end"),
            TokenKind::Error => {}
            _ => eprint!(" at '{}'", token.lexeme),
        }
        eprintln!(": {message}.");
        self.had_error = true;
    }

    // ---- bytecode emission ----------------------------------------------

    fn emit_byte(&mut self, byte: u8) {
        let line = self.previous.line;
        self.chunk.write_byte(byte, line);
    }

    fn emit_op(&mut self, op: OpCode) {
        self.emit_byte(op as u8);
    }

    fn emit_op_byte(&mut self, op: OpCode, operand: u8) {
        self.emit_op(op);
        self.emit_byte(operand);
    }

    fn make_constant(&mut self, value: Value) -> u8 {
        let index = self.chunk.add_constant(value);
        if index >= MAX_CONSTANTS {
            self.error("Too many constants in one chunk");
            return 0;
        }
        index as u8
    }

    fn emit_constant(&mut self, value: Value) {
        let index = self.make_constant(value);
        self.emit_op_byte(OpCode::Constant, index);
    }

    // ---- scopes and locals ------------------------------------------------

    fn begin_scope(&mut self) {
        self.scope_depth += 1;
    }

    fn end_scope(&mut self) {
        self.scope_depth -= 1;
        while let Some(local) = self.locals.last() {
            if local.depth <= self.scope_depth {
                break;
            }
            self.emit_op(OpCode::Pop);
            self.locals.pop();
        }
    }

    fn declare_local(&mut self, name: &'src str) {
        if self.locals.len() >= MAX_LOCALS {
            self.error("Too many local variables in one scope");
            return;
        }
        self.locals.push(Local { name, depth: -1 });
    }

    /// Search innermost-to-outermost for `name`. Reports and returns
    /// `None` if the match is still being initialized (`var a = a;`).
    fn resolve_local(&mut self, name: &str) -> Option<usize> {
        for (index, local) in self.locals.iter().enumerate().rev() {
            if local.name == name {
                if local.depth == -1 {
                    self.error("Can't read local variable in its own initializer");
                }
                return Some(index);
            }
        }
        None
    }

    fn mark_initialized(&mut self) {
        if self.scope_depth == 0 {
            return;
        }
        if let Some(local) = self.locals.last_mut() {
            local.depth = self.scope_depth;
        }
    }

    // ---- identifiers -----------------------------------------------------

    fn identifier_constant(&mut self, name: &str) -> u8 {
        let ptr = self.heap.intern(name);
        let value = Value::obj(ptr);
        if let Some(index) = self.chunk.find_constant(value) {
            return index as u8;
        }
        self.make_constant(value)
    }

    fn parse_variable(&mut self, error_message: &str) -> u8 {
        self.consume(TokenKind::Identifier, error_message);
        let name = self.previous.lexeme;
        if self.scope_depth > 0 {
            self.declare_local(name);
            return 0;
        }
        self.identifier_constant(name)
    }

    fn define_variable(&mut self, global: u8) {
        if self.scope_depth > 0 {
            self.mark_initialized();
            return;
        }
        self.emit_op_byte(OpCode::DefineGlobal, global);
    }

    fn named_variable(&mut self, name: &str, can_assign: bool) {
        // Resolved purely to surface "read in its own initializer";
        // every reachable read or write still compiles to a global op.
        self.resolve_local(name);
        let arg = self.identifier_constant(name);
        if can_assign && self.match_token(TokenKind::Equal) {
            self.expression();
            self.emit_op_byte(OpCode::SetGlobal, arg);
        } else {
            self.emit_op_byte(OpCode::GetGlobal, arg);
        }
    }

    // ---- Pratt parsing -----------------------------------------------------

    fn parse_precedence(&mut self, precedence: Precedence) {
        self.advance();
        let can_assign = precedence <= Precedence::Assignment;
        if !self.call_prefix(self.previous.kind, can_assign) {
            self.error("Expect expression");
            return;
        }

        while precedence <= infix_precedence(self.current.kind) {
            self.advance();
            self.call_infix(self.previous.kind, can_assign);
        }

        if can_assign && self.match_token(TokenKind::Equal) {
            self.error("Invalid assignment target");
        }
    }

    fn expression(&mut self) {
        self.parse_precedence(Precedence::Assignment);
    }

    /// Dispatch to the prefix rule for `kind` (the token just consumed
    /// into `previous`). Returns `false` if `kind` has no prefix rule.
    fn call_prefix(&mut self, kind: TokenKind, can_assign: bool) -> bool {
        match kind {
            TokenKind::LeftParen => self.grouping(can_assign),
            TokenKind::Minus | TokenKind::Bang => self.unary(can_assign),
            TokenKind::Identifier => self.variable(can_assign),
            TokenKind::String => self.string(can_assign),
            TokenKind::Number => self.number(can_assign),
            TokenKind::False | TokenKind::Nil | TokenKind::True => self.literal(can_assign),
            _ => return false,
        }
        true
    }

    /// Dispatch to the infix rule for `kind` (the token just consumed
    /// into `previous`). A no-op if `kind` has no infix rule.
    fn call_infix(&mut self, kind: TokenKind, can_assign: bool) {
        match kind {
            TokenKind::Minus
            | TokenKind::Plus
            | TokenKind::Slash
            | TokenKind::Star
            | TokenKind::BangEqual
            | TokenKind::EqualEqual
            | TokenKind::Greater
            | TokenKind::GreaterEqual
            | TokenKind::Less
            | TokenKind::LessEqual => self.binary(can_assign),
            _ => {}
        }
    }

    fn grouping(&mut self, _can_assign: bool) {
        self.expression();
        self.consume(TokenKind::RightParen, "Expect ')' after expression");
    }

    fn number(&mut self, _can_assign: bool) {
        let value: f64 = self.previous.lexeme.parse().unwrap_or(f64::NAN);
        self.emit_constant(Value::number(value));
    }

    fn string(&mut self, _can_assign: bool) {
        let lexeme = self.previous.lexeme;
        let contents = &lexeme[1..lexeme.len() - 1];
        let ptr = self.heap.intern(contents);
        self.emit_constant(Value::obj(ptr));
    }

    fn literal(&mut self, _can_assign: bool) {
        match self.previous.kind {
            TokenKind::False => self.emit_op(OpCode::False),
            TokenKind::True => self.emit_op(OpCode::True),
            TokenKind::Nil => self.emit_op(OpCode::Nil),
            _ => {}
        }
    }

    fn variable(&mut self, can_assign: bool) {
        let name = self.previous.lexeme;
        self.named_variable(name, can_assign);
    }

    fn unary(&mut self, _can_assign: bool) {
        let operator = self.previous.kind;
        self.parse_precedence(Precedence::Unary);
        match operator {
            TokenKind::Minus => self.emit_op(OpCode::Negate),
            TokenKind::Bang => self.emit_op(OpCode::Not),
            _ => {}
        }
    }

    fn binary(&mut self, _can_assign: bool) {
        let operator = self.previous.kind;
        self.parse_precedence(infix_precedence(operator).next());
        match operator {
            TokenKind::BangEqual => {
                self.emit_op(OpCode::Equal);
                self.emit_op(OpCode::Not);
            }
            TokenKind::EqualEqual => self.emit_op(OpCode::Equal),
            TokenKind::Greater => self.emit_op(OpCode::Greater),
            TokenKind::GreaterEqual => {
                self.emit_op(OpCode::Less);
                self.emit_op(OpCode::Not);
            }
            TokenKind::Less => self.emit_op(OpCode::Less),
            TokenKind::LessEqual => {
                self.emit_op(OpCode::Greater);
                self.emit_op(OpCode::Not);
            }
            TokenKind::Plus => self.emit_op(OpCode::Add),
            TokenKind::Minus => self.emit_op(OpCode::Subtract),
            TokenKind::Star => self.emit_op(OpCode::Multiply),
            TokenKind::Slash => self.emit_op(OpCode::Divide),
            _ => {}
        }
    }

    // ---- declarations and statements ------------------------------------

    fn declaration(&mut self) {
        if self.match_token(TokenKind::Var) {
            self.var_declaration();
        } else {
            self.statement();
        }
        if self.panic_mode {
            self.synchronize();
        }
    }

    fn var_declaration(&mut self) {
        let global = self.parse_variable("Expect variable name");
        if self.match_token(TokenKind::Equal) {
            self.expression();
        } else {
            self.emit_op(OpCode::Nil);
        }
        self.consume(
            TokenKind::Semicolon,
            "Expect ';' after variable declaration",
        );
        self.define_variable(global);
    }

    fn statement(&mut self) {
        if self.match_token(TokenKind::Print) {
            self.print_statement();
        } else if self.match_token(TokenKind::LeftBrace) {
            self.begin_scope();
            self.block();
            self.end_scope();
        } else {
            self.expression_statement();
        }
    }

    fn block(&mut self) {
        while !self.check(TokenKind::RightBrace) && !self.check(TokenKind::Eof) {
            self.declaration();
        }
        self.consume(TokenKind::RightBrace, "Expect '}' after a block");
    }

    fn print_statement(&mut self) {
        self.expression();
        self.consume(TokenKind::Semicolon, "Expect ';' after value");
        self.emit_op(OpCode::Print);
    }

    fn expression_statement(&mut self) {
        self.expression();
        self.consume(TokenKind::Semicolon, "Expect ';' after expression");
        self.emit_op(OpCode::Pop);
    }

    fn synchronize(&mut self) {
        self.panic_mode = false;
        while self.current.kind != TokenKind::Eof {
            if self.previous.kind == TokenKind::Semicolon {
                return;
            }
            if matches!(
                self.current.kind,
                TokenKind::Class
                    | TokenKind::Fun
                    | TokenKind::Var
                    | TokenKind::For
                    | TokenKind::If
                    | TokenKind::While
                    | TokenKind::Print
                    | TokenKind::Return
            ) {
                return;
            }
            self.advance();
        }
    }
}

/// Compile `source` into a fresh [`Chunk`], interning every string
/// constant into `heap`.
///
/// # Errors
///
/// Returns [`CompileError`] if any syntax error was found; diagnostics
/// are printed to stderr as they're discovered, matching the reference
/// compiler's immediate `errorAt` reporting.
pub fn compile(source: &str, heap: &mut Heap) -> Result<Chunk, CompileError> {
    let mut compiler = Compiler::new(source, heap);
    compiler.advance();
    while !compiler.match_token(TokenKind::Eof) {
        compiler.declaration();
    }
    compiler.emit_op(OpCode::Return);

    #[cfg(feature = "print-code")]
    if !compiler.had_error {
        disassemble::disassemble_chunk(&compiler.chunk, "code");
    }

    if compiler.had_error {
        Err(CompileError)
    } else {
        Ok(compiler.chunk)
    }
}
