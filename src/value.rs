//! Value representation.
//!
//! A `Val` is a 16-byte Copy handle. Integers, booleans, the empty list,
//! symbols and builtins are *immediate*: they live entirely inside the handle
//! and need no heap allocation. Pairs and closures live on the heap and are
//! referenced through an `ObjRef`.
//!
//!   Int(i64)       fixed-width integer
//!   Bool(bool)     #t / #f
//!   Nil            the empty list, also the "no useful value" result
//!   Symbol(SymId)  interned name
//!   Builtin(..)    primitive procedure or special form
//!   Obj(ObjRef)    heap slot holding a pair or a closure
//!
//! Heap and environment handles carry the generation of the slot they were
//! issued for, so a handle to a swept-and-reused slot never aliases the new
//! occupant.

use std::fmt;

use crate::builtins::Builtin;
use crate::symbol::SymId;

/// Index plus generation of an arena slot.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct SlotId {
    pub(crate) index: u32,
    pub(crate) generation: u32,
}

impl fmt::Debug for SlotId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}v{}", self.index, self.generation)
    }
}

/// Reference to a pair or closure on the heap.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct ObjRef(pub(crate) SlotId);

#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub enum Val {
    Int(i64),
    Bool(bool),
    Nil,
    Symbol(SymId),
    Builtin(Builtin),
    Obj(ObjRef),
}

impl Val {
    // ── Constructors ──

    #[inline]
    pub fn int(i: i64) -> Val {
        Val::Int(i)
    }

    #[inline]
    pub fn boolean(b: bool) -> Val {
        Val::Bool(b)
    }

    #[inline]
    pub fn nil() -> Val {
        Val::Nil
    }

    // ── Extractors ──

    #[inline]
    pub fn as_int(self) -> Option<i64> {
        match self {
            Val::Int(i) => Some(i),
            _ => None,
        }
    }

    #[inline]
    pub fn as_bool(self) -> Option<bool> {
        match self {
            Val::Bool(b) => Some(b),
            _ => None,
        }
    }

    #[inline]
    pub fn is_nil(self) -> bool {
        matches!(self, Val::Nil)
    }

    #[inline]
    pub fn as_symbol(self) -> Option<SymId> {
        match self {
            Val::Symbol(id) => Some(id),
            _ => None,
        }
    }

    #[inline]
    pub fn as_builtin(self) -> Option<Builtin> {
        match self {
            Val::Builtin(b) => Some(b),
            _ => None,
        }
    }

    #[inline]
    pub fn as_obj(self) -> Option<ObjRef> {
        match self {
            Val::Obj(r) => Some(r),
            _ => None,
        }
    }

    /// Only #f is falsy; everything else (including 0 and ()) is truthy.
    #[inline]
    pub fn is_truthy(self) -> bool {
        self != Val::Bool(false)
    }
}

impl fmt::Debug for Val {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Val::Int(i) => write!(f, "Int({i})"),
            Val::Bool(b) => write!(f, "Bool({b})"),
            Val::Nil => write!(f, "Nil"),
            Val::Symbol(id) => write!(f, "Sym({id:?})"),
            Val::Builtin(b) => write!(f, "Builtin({})", b.name()),
            Val::Obj(r) => write!(f, "Heap({:?})", r.0),
        }
    }
}
