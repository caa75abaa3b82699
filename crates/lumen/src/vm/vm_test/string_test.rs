// SPDX-License-Identifier: MIT
// Copyright (c) 2026 The Lumen Authors

#![allow(clippy::unwrap_used, clippy::expect_used)]

use super::super::*;
use crate::bytecode::{Chunk, OpCode};
use crate::value::Value;

#[test]
fn add_concatenates_two_strings() {
    let mut vm = Vm::new();
    let a = vm.heap.intern("foo");
    let b = vm.heap.intern("bar");
    let mut chunk = Chunk::new();
    let ia = chunk.add_constant(Value::obj(a));
    let ib = chunk.add_constant(Value::obj(b));
    chunk.write_op(OpCode::Constant, 1);
    chunk.write_byte(ia as u8, 1);
    chunk.write_op(OpCode::Constant, 1);
    chunk.write_byte(ib as u8, 1);
    chunk.write_op(OpCode::Add, 1);
    chunk.write_op(OpCode::Return, 1);
    vm.run(&chunk).expect("should run");
    assert_eq!(vm.peek(0).to_string(), "foobar");
}

#[test]
fn concatenation_dedupes_against_an_existing_interned_string() {
    let mut vm = Vm::new();
    let existing = vm.heap.intern("foobar");
    let a = vm.heap.intern("foo");
    let b = vm.heap.intern("bar");
    let mut chunk = Chunk::new();
    let ia = chunk.add_constant(Value::obj(a));
    let ib = chunk.add_constant(Value::obj(b));
    chunk.write_op(OpCode::Constant, 1);
    chunk.write_byte(ia as u8, 1);
    chunk.write_op(OpCode::Constant, 1);
    chunk.write_byte(ib as u8, 1);
    chunk.write_op(OpCode::Add, 1);
    chunk.write_op(OpCode::Return, 1);
    vm.run(&chunk).expect("should run");
    let Value::Obj(result) = vm.peek(0) else {
        panic!("expected a string result");
    };
    assert_eq!(result, existing);
}

#[test]
fn adding_a_string_to_a_number_is_a_runtime_error() {
    let mut vm = Vm::new();
    let s = vm.heap.intern("foo");
    let mut chunk = Chunk::new();
    let is = chunk.add_constant(Value::obj(s));
    let inum = chunk.add_constant(Value::number(1.0));
    chunk.write_op(OpCode::Constant, 1);
    chunk.write_byte(is as u8, 1);
    chunk.write_op(OpCode::Constant, 1);
    chunk.write_byte(inum as u8, 1);
    chunk.write_op(OpCode::Add, 1);
    chunk.write_op(OpCode::Return, 1);
    let result = vm.run(&chunk);
    assert_eq!(result, Err(RuntimeError));
}
