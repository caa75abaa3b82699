// SPDX-License-Identifier: MIT
// Copyright (c) 2026 The Lumen Authors

#![allow(clippy::unwrap_used, clippy::expect_used)]

use super::{Value, values_equal};
use crate::object::{Obj, ObjKind, ObjString, fnv1a};
use std::ptr::NonNull;

fn string_obj(bytes: &str) -> NonNull<Obj> {
    let boxed = Box::new(Obj {
        kind: ObjKind::String(ObjString {
            bytes: bytes.into(),
            hash: fnv1a(bytes.as_bytes()),
        }),
        next: None,
    });
    NonNull::from(Box::leak(boxed))
}

#[test]
fn predicates_are_mutually_exclusive() {
    let n = Value::nil();
    assert!(n.is_nil());
    assert!(!n.is_bool() && !n.is_number() && !n.is_obj());

    let b = Value::bool(true);
    assert!(b.is_bool());
    assert!(!b.is_nil() && !b.is_number() && !b.is_obj());

    let num = Value::number(1.5);
    assert!(num.is_number());
    assert!(!num.is_nil() && !num.is_bool() && !num.is_obj());
}

#[test]
fn falsey_is_exactly_nil_and_false() {
    assert!(Value::nil().is_falsey());
    assert!(Value::bool(false).is_falsey());
    assert!(!Value::bool(true).is_falsey());
    assert!(!Value::number(0.0).is_falsey());
}

#[test]
fn display_formats_match_print_rules() {
    assert_eq!(Value::nil().to_string(), "nil");
    assert_eq!(Value::bool(true).to_string(), "true");
    assert_eq!(Value::bool(false).to_string(), "false");
    assert_eq!(Value::number(7.0).to_string(), "7");
    assert_eq!(Value::number(3.25).to_string(), "3.25");
    assert_eq!(Value::number(-0.5).to_string(), "-0.5");
}

#[test]
fn display_prints_string_bytes_without_quotes() {
    let ptr = string_obj("hello");
    assert_eq!(Value::obj(ptr).to_string(), "hello");
    unsafe {
        drop(Box::from_raw(ptr.as_ptr()));
    }
}

#[test]
fn values_equal_rejects_mismatched_tags() {
    assert!(!values_equal(Value::nil(), Value::bool(false)));
    assert!(!values_equal(Value::number(0.0), Value::bool(false)));
    assert!(!values_equal(Value::number(1.0), Value::nil()));
}

#[test]
fn values_equal_numbers_follow_ieee_754() {
    assert!(values_equal(Value::number(1.0), Value::number(1.0)));
    assert!(!values_equal(Value::number(f64::NAN), Value::number(f64::NAN)));
}

#[test]
fn values_equal_strings_compare_by_identity() {
    let a = string_obj("same");
    let b = string_obj("same");
    assert!(values_equal(Value::obj(a), Value::obj(a)));
    assert!(!values_equal(Value::obj(a), Value::obj(b)));
    unsafe {
        drop(Box::from_raw(a.as_ptr()));
        drop(Box::from_raw(b.as_ptr()));
    }
}
