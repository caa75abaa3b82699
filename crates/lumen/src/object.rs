// SPDX-License-Identifier: MIT
// Copyright (c) 2026 The Lumen Authors

//! Heap-allocated values.
//!
//! `Obj` is the single heap-object variant type (currently just
//! interned strings). Every `Obj` is linked into the VM's intrusive
//! object list via its `next` field so the whole heap can be freed in
//! one O(n) sweep at VM teardown. There is no garbage collector, no
//! reference counting, and (with only strings as payload) no possibility
//! of cycles.
//!
//! `Value::Obj` holds a non-owning [`NonNull<Obj>`]; the intrusive list
//! is the sole owner and is responsible for dropping every node exactly
//! once.

use std::fmt;
use std::ptr::NonNull;

/// A heap-allocated object.
///
/// Carries the intrusive `next` link used to walk and free the whole
/// heap at teardown.
pub struct Obj {
    pub kind: ObjKind,
    pub(crate) next: Option<NonNull<Obj>>,
}

/// The payload of a heap object.
///
/// Only one variant exists in this core: interned strings. The enum
/// exists so that adding further heap types (pairs, closures, ...) later
/// only means adding a variant here, not a new pointer representation.
pub enum ObjKind {
    String(ObjString),
}

/// An interned, immutable string.
pub struct ObjString {
    pub bytes: Box<str>,
    pub hash: u32,
}

impl Obj {
    /// Borrow this object as a string, if that's what it is.
    #[must_use]
    pub fn as_string(&self) -> Option<&ObjString> {
        match &self.kind {
            ObjKind::String(s) => Some(s),
        }
    }
}

impl fmt::Debug for Obj {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            ObjKind::String(s) => write!(f, "ObjString({:?})", s.bytes),
        }
    }
}

/// Read a string object through a raw pointer.
///
/// Every caller ties the returned reference's lifetime to a borrow of
/// whatever owns the object heap (the VM's or compiler's `Heap`), which
/// is sound because the heap only ever frees objects in bulk at its own
/// `Drop`.
///
/// # Safety
///
/// `ptr` must point at a live `Obj` whose `kind` is `ObjKind::String`.
/// Every `Value::Obj` this crate constructs upholds that, since strings
/// are the only heap kind ever created.
#[must_use]
pub unsafe fn string_ref<'a>(ptr: NonNull<Obj>) -> &'a ObjString {
    // SAFETY: forwarded from the caller.
    let obj = unsafe { ptr.as_ref() };
    match &obj.kind {
        ObjKind::String(s) => s,
    }
}

/// FNV-1a, 32-bit, as used by the reference implementation for string
/// hashing (constant pool dedup and table bucketing both rely on it).
#[must_use]
pub fn fnv1a(bytes: &[u8]) -> u32 {
    const FNV_OFFSET_BASIS: u32 = 0x811c_9dc5;
    const FNV_PRIME: u32 = 0x0100_0193;

    let mut hash = FNV_OFFSET_BASIS;
    for &b in bytes {
        hash ^= u32::from(b);
        hash = hash.wrapping_mul(FNV_PRIME);
    }
    hash
}

#[cfg(test)]
mod object_test;
