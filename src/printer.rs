//! Printer for values.
//!
//! The output is the reader's literal syntax, so printing a parsed datum
//! gives back the source text modulo spacing. Procedures have no literal
//! syntax and are rejected.

use std::collections::HashSet;

use crate::error::{Error, Result};
use crate::heap::{Heap, HeapObject};
use crate::symbol::SymbolTable;
use crate::value::{ObjRef, Val};

/// Print a value to a string.
pub fn print_val(val: Val, heap: &Heap, syms: &SymbolTable) -> Result<String> {
    let mut printer = Printer {
        heap,
        syms,
        buf: String::new(),
        active: HashSet::new(),
    };
    printer.write_val(val)?;
    Ok(printer.buf)
}

struct Printer<'a> {
    heap: &'a Heap,
    syms: &'a SymbolTable,
    buf: String,
    /// Pairs on the path from the root to the value being written. Meeting
    /// one of them again means the structure is cyclic.
    active: HashSet<ObjRef>,
}

impl Printer<'_> {
    fn write_val(&mut self, val: Val) -> Result<()> {
        match val {
            Val::Int(i) => self.buf.push_str(&i.to_string()),
            Val::Bool(b) => self.buf.push_str(if b { "#t" } else { "#f" }),
            Val::Nil => self.buf.push_str("()"),
            Val::Symbol(sym) => self.buf.push_str(self.syms.name(sym)),
            Val::Builtin(_) => return Err(Error::runtime("cannot print a procedure")),
            Val::Obj(r) => match self.heap.get(r) {
                Some(HeapObject::Pair(..)) => self.write_list(r)?,
                Some(HeapObject::Closure(_)) => {
                    return Err(Error::runtime("cannot print a procedure"))
                }
                None => return Err(Error::runtime("reference to a collected object")),
            },
        }
        Ok(())
    }

    fn write_list(&mut self, head: ObjRef) -> Result<()> {
        let mut spine = Vec::new();
        let result = self.write_spine(head, &mut spine);
        for r in spine {
            self.active.remove(&r);
        }
        result
    }

    /// Write the list starting at `head`, recording each spine pair entered
    /// into `active` (and into `spine`, so the caller can unwind it).
    fn write_spine(&mut self, head: ObjRef, spine: &mut Vec<ObjRef>) -> Result<()> {
        self.buf.push('(');
        let mut current = head;
        loop {
            if !self.active.insert(current) {
                return Err(Error::runtime("cannot print cyclic structure"));
            }
            spine.push(current);

            let Some(HeapObject::Pair(car, cdr)) = self.heap.get(current) else {
                return Err(Error::runtime("reference to a collected object"));
            };
            let (car, cdr) = (*car, *cdr);
            self.write_val(car)?;

            match cdr {
                Val::Nil => break,
                Val::Obj(next) if self.heap.is_pair(cdr) => {
                    self.buf.push(' ');
                    current = next;
                }
                tail => {
                    self.buf.push_str(" . ");
                    self.write_val(tail)?;
                    break;
                }
            }
        }
        self.buf.push(')');
        Ok(())
    }
}
