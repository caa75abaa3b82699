// SPDX-License-Identifier: MIT
// Copyright (c) 2026 The Lumen Authors

//! The object heap: an intrusive list of every live [`Obj`], plus the
//! string-intern table that makes identity-based string equality sound.
//!
//! There is no garbage collector. Every object allocated through a
//! [`Heap`] is freed exactly once, when the `Heap` itself is dropped.

use std::ptr::NonNull;

use crate::object::{Obj, ObjKind, ObjString, fnv1a, string_ref};
use crate::table::Table;
use crate::value::Value;

/// Owns every heap-allocated [`Obj`] reachable from a VM or compiler.
pub struct Heap {
    objects: Option<NonNull<Obj>>,
    strings: Table,
}

impl Heap {
    /// An empty heap.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            objects: None,
            strings: Table::new(),
        }
    }

    /// Intern `bytes`, returning the existing object if an equal-content
    /// string was already interned, or allocating and registering a new
    /// one otherwise. Two calls with equal content always return the same
    /// pointer.
    pub fn intern(&mut self, bytes: &str) -> NonNull<Obj> {
        let hash = fnv1a(bytes.as_bytes());
        if let Some(existing) = self.strings.find_string(bytes, hash) {
            return existing;
        }
        let ptr = self.push(ObjKind::String(ObjString {
            bytes: bytes.into(),
            hash,
        }));
        self.strings.set(ptr, Value::nil());
        ptr
    }

    /// Concatenate two interned strings and intern the result, deduping
    /// against an existing string with the same bytes if one exists.
    #[must_use]
    pub fn concat(&mut self, a: NonNull<Obj>, b: NonNull<Obj>) -> NonNull<Obj> {
        // SAFETY: callers only pass pointers known to be strings (checked
        // by `Value::is_string` before reaching this point).
        let (a, b) = unsafe { (string_ref(a), string_ref(b)) };
        let mut combined = String::with_capacity(a.bytes.len() + b.bytes.len());
        combined.push_str(&a.bytes);
        combined.push_str(&b.bytes);
        self.intern(&combined)
    }

    fn push(&mut self, kind: ObjKind) -> NonNull<Obj> {
        let boxed = Box::new(Obj {
            kind,
            next: self.objects,
        });
        let ptr = NonNull::from(Box::leak(boxed));
        self.objects = Some(ptr);
        ptr
    }
}

impl Default for Heap {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for Heap {
    fn drop(&mut self) {
        let mut current = self.objects.take();
        while let Some(ptr) = current {
            // SAFETY: every node in this list was leaked from a `Box` by
            // `push` and appears exactly once; we are the sole owner.
            let boxed = unsafe { Box::from_raw(ptr.as_ptr()) };
            current = boxed.next;
            drop(boxed);
        }
    }
}

#[cfg(test)]
mod heap_test;
