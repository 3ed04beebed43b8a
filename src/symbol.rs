//! Symbol table: interns names so identical symbols share one id.
//!
//! Comparing two `SymId`s is the same as comparing the names they stand for.
//! Symbols are immediate values and the table is never collected: it lives
//! as long as the interpreter, growing by one entry per distinct name read.

use std::collections::HashMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SymId(u32);

#[derive(Default)]
pub struct SymbolTable {
    /// name → id
    map: HashMap<String, SymId>,
    /// id → name
    names: Vec<String>,
}

impl SymbolTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Intern a symbol name, returning its id.
    pub fn intern(&mut self, name: &str) -> SymId {
        if let Some(&id) = self.map.get(name) {
            return id;
        }
        let id = SymId(self.names.len() as u32);
        self.names.push(name.to_string());
        self.map.insert(name.to_string(), id);
        id
    }

    /// Look up name by id. Ids only come from `intern` on this table, so
    /// the index is always in range.
    pub fn name(&self, id: SymId) -> &str {
        &self.names[id.0 as usize]
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}
