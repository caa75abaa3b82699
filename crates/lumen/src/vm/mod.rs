// SPDX-License-Identifier: MIT
// Copyright (c) 2026 The Lumen Authors

//! Fetch-decode-execute bytecode interpreter.
//!
//! The VM owns everything a running program can observe or allocate: the
//! value stack, the globals table, and the object heap (and therefore the
//! string-intern table). It borrows the [`Chunk`] it executes; the chunk
//! itself is owned by whoever calls [`Vm::interpret`] and is dropped when
//! that call returns, regardless of outcome.

#[cfg(test)]
mod vm_test;

use core::fmt;

use crate::bytecode::{Chunk, OpCode};
use crate::compiler::{self, CompileError};
use crate::heap::Heap;
use crate::object::string_ref;
use crate::table::Table;
use crate::value::{Value, values_equal};

/// Maximum number of values live on the stack at once.
const STACK_MAX: usize = 256;

/// A runtime error raised while executing a chunk.
///
/// Diagnostics are already printed to stderr by the time this value
/// exists, mirroring the reference VM's `runtimeError`, which reports
/// before the caller ever sees a failure result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RuntimeError;

impl fmt::Display for RuntimeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "runtime error")
    }
}

impl std::error::Error for RuntimeError {}

/// The outcome of a failed [`Vm::interpret`] call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InterpretError {
    /// Compilation failed; nothing ran.
    Compile(CompileError),
    /// Compilation succeeded but execution raised a runtime error.
    Runtime(RuntimeError),
}

impl fmt::Display for InterpretError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Compile(e) => write!(f, "{e}"),
            Self::Runtime(e) => write!(f, "{e}"),
        }
    }
}

impl std::error::Error for InterpretError {}

impl From<CompileError> for InterpretError {
    fn from(e: CompileError) -> Self {
        Self::Compile(e)
    }
}

impl From<RuntimeError> for InterpretError {
    fn from(e: RuntimeError) -> Self {
        Self::Runtime(e)
    }
}

/// The stack-based virtual machine.
///
/// Persists across multiple [`Vm::interpret`] calls (as the REPL does),
/// so globals and interned strings accumulate for the lifetime of the
/// process rather than being torn down between lines.
pub struct Vm {
    heap: Heap,
    globals: Table,
    stack: [Value; STACK_MAX],
    stack_top: usize,
}

impl Vm {
    /// A freshly initialized VM: empty stack, empty globals, empty heap.
    #[must_use]
    pub fn new() -> Self {
        Self {
            heap: Heap::new(),
            globals: Table::new(),
            stack: [Value::Nil; STACK_MAX],
            stack_top: 0,
        }
    }

    /// Compile `source` and run it to completion.
    ///
    /// # Errors
    ///
    /// Returns [`InterpretError::Compile`] if `source` fails to compile,
    /// or [`InterpretError::Runtime`] if a runtime error is raised while
    /// running it. Either way, diagnostics have already been printed to
    /// stderr.
    pub fn interpret(&mut self, source: &str) -> Result<(), InterpretError> {
        let chunk = compiler::compile(source, &mut self.heap)?;
        self.run(&chunk)?;
        Ok(())
    }

    fn run(&mut self, chunk: &Chunk) -> Result<(), RuntimeError> {
        let mut ip = 0usize;
        loop {
            #[cfg(feature = "trace-execution")]
            self.trace(chunk, ip);

            let byte = chunk.code[ip];
            ip += 1;
            let Some(op) = OpCode::from_u8(byte) else {
                return Err(self.runtime_error(chunk, ip, "Unknown opcode."));
            };

            match op {
                OpCode::Constant => {
                    let index = chunk.code[ip] as usize;
                    ip += 1;
                    self.push_checked(chunk, ip, chunk.constants[index])?;
                }
                OpCode::Nil => self.push_checked(chunk, ip, Value::nil())?,
                OpCode::True => self.push_checked(chunk, ip, Value::bool(true))?,
                OpCode::False => self.push_checked(chunk, ip, Value::bool(false))?,
                OpCode::Pop => {
                    self.pop();
                }
                OpCode::Equal => {
                    let b = self.pop();
                    let a = self.pop();
                    self.push_checked(chunk, ip, Value::bool(values_equal(a, b)))?;
                }
                OpCode::Greater => self.binary_numeric(chunk, ip, |a, b| Value::bool(a > b))?,
                OpCode::Less => self.binary_numeric(chunk, ip, |a, b| Value::bool(a < b))?,
                OpCode::Add => self.add(chunk, ip)?,
                OpCode::Subtract => self.binary_numeric(chunk, ip, |a, b| Value::number(a - b))?,
                OpCode::Multiply => self.binary_numeric(chunk, ip, |a, b| Value::number(a * b))?,
                OpCode::Divide => self.binary_numeric(chunk, ip, |a, b| Value::number(a / b))?,
                OpCode::Not => {
                    let value = self.pop();
                    self.push_checked(chunk, ip, Value::bool(value.is_falsey()))?;
                }
                OpCode::Negate => self.negate(chunk, ip)?,
                OpCode::Print => {
                    let value = self.pop();
                    println!("{value}");
                }
                OpCode::Jump | OpCode::JumpIfFalse | OpCode::GetLocal | OpCode::SetLocal => {
                    return Err(self.runtime_error(
                        chunk,
                        ip,
                        "Unsupported opcode: reserved for unreachable codegen.",
                    ));
                }
                OpCode::GetGlobal => {
                    let index = chunk.code[ip] as usize;
                    ip += 1;
                    self.get_global(chunk, ip, index)?;
                }
                OpCode::DefineGlobal => {
                    let index = chunk.code[ip] as usize;
                    ip += 1;
                    let name_ptr = Self::constant_name(chunk, index);
                    let value = self.peek(0);
                    self.globals.set(name_ptr, value);
                    self.pop();
                }
                OpCode::SetGlobal => {
                    let index = chunk.code[ip] as usize;
                    ip += 1;
                    self.set_global(chunk, ip, index)?;
                }
                OpCode::Return => return Ok(()),
            }
        }
    }

    fn get_global(&mut self, chunk: &Chunk, ip: usize, index: usize) -> Result<(), RuntimeError> {
        let name_ptr = Self::constant_name(chunk, index);
        match self.globals.get(name_ptr) {
            Some(value) => self.push_checked(chunk, ip, value),
            None => {
                let message = Self::undefined_variable_message(name_ptr);
                Err(self.runtime_error(chunk, ip, &message))
            }
        }
    }

    fn set_global(&mut self, chunk: &Chunk, ip: usize, index: usize) -> Result<(), RuntimeError> {
        let name_ptr = Self::constant_name(chunk, index);
        let value = self.peek(0);
        if self.globals.set(name_ptr, value) {
            // `Table::set` reports a new key; a global assignment must
            // target an already-declared global, so undo the insert.
            self.globals.delete(name_ptr);
            let message = Self::undefined_variable_message(name_ptr);
            return Err(self.runtime_error(chunk, ip, &message));
        }
        Ok(())
    }

    fn add(&mut self, chunk: &Chunk, ip: usize) -> Result<(), RuntimeError> {
        let b = self.pop();
        let a = self.pop();
        match (a, b) {
            (Value::Number(x), Value::Number(y)) => {
                self.push_checked(chunk, ip, Value::number(x + y))
            }
            (Value::Obj(pa), Value::Obj(pb)) if a.is_string() && b.is_string() => {
                let result = self.heap.concat(pa, pb);
                self.push_checked(chunk, ip, Value::obj(result))
            }
            _ => Err(self.runtime_error(
                chunk,
                ip,
                "Operands must be two numbers or two strings.",
            )),
        }
    }

    fn negate(&mut self, chunk: &Chunk, ip: usize) -> Result<(), RuntimeError> {
        match self.peek(0) {
            Value::Number(n) => {
                // In-place mutation of the stack top, same semantics as
                // `push(-pop())` but without the pair of moves.
                self.stack[self.stack_top - 1] = Value::number(-n);
                Ok(())
            }
            _ => Err(self.runtime_error(chunk, ip, "Operand must be a number")),
        }
    }

    fn binary_numeric(
        &mut self,
        chunk: &Chunk,
        ip: usize,
        combine: impl Fn(f64, f64) -> Value,
    ) -> Result<(), RuntimeError> {
        if !self.peek(0).is_number() || !self.peek(1).is_number() {
            return Err(self.runtime_error(chunk, ip, "Operands must be numbers."));
        }
        let b = self.pop();
        let a = self.pop();
        let (Value::Number(x), Value::Number(y)) = (a, b) else {
            unreachable!("peek already confirmed both operands are numbers")
        };
        self.push_checked(chunk, ip, combine(x, y))
    }

    fn constant_name(chunk: &Chunk, index: usize) -> std::ptr::NonNull<crate::object::Obj> {
        match chunk.constants[index] {
            Value::Obj(ptr) => ptr,
            _ => unreachable!("identifier constants are always interned strings"),
        }
    }

    fn undefined_variable_message(name_ptr: std::ptr::NonNull<crate::object::Obj>) -> String {
        // SAFETY: identifier constants are always interned strings.
        let name = unsafe { string_ref(name_ptr) };
        format!("Undefined variable '{}'.", name.bytes)
    }

    fn push_checked(&mut self, chunk: &Chunk, ip: usize, value: Value) -> Result<(), RuntimeError> {
        if self.stack_top >= STACK_MAX {
            return Err(self.runtime_error(chunk, ip, "Stack overflow."));
        }
        self.stack[self.stack_top] = value;
        self.stack_top += 1;
        Ok(())
    }

    /// Pop the top of the stack. Popping an empty stack does not crash:
    /// it reports to stderr and yields `nil`, matching the reference VM.
    fn pop(&mut self) -> Value {
        if self.stack_top == 0 {
            eprintln!("Trying to pop from an empty stack");
            return Value::nil();
        }
        self.stack_top -= 1;
        self.stack[self.stack_top]
    }

    fn peek(&self, distance: usize) -> Value {
        self.stack[self.stack_top - 1 - distance]
    }

    fn runtime_error(&mut self, chunk: &Chunk, ip: usize, message: &str) -> RuntimeError {
        eprintln!("{message}");
        let line = chunk.lines[ip - 1];
        eprintln!("[line {line}] in script");
        self.stack_top = 0;
        RuntimeError
    }

    #[cfg(feature = "trace-execution")]
    fn trace(&self, chunk: &Chunk, ip: usize) {
        print!("          ");
        for slot in &self.stack[..self.stack_top] {
            print!("[ {slot} ]");
        }
        println!();
        crate::compiler::disassemble::disassemble_instruction(chunk, ip);
    }
}

impl Default for Vm {
    fn default() -> Self {
        Self::new()
    }
}
