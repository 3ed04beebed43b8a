//! Environments.
//!
//! An environment is a mapping from symbol ids to Vals, with a parent chain.
//! Frames are stored in an arena and referenced by `EnvId`; like heap
//! objects they are reclaimed by the collector once nothing reaches them.

use std::collections::HashMap;

use crate::arena::Arena;
use crate::error::{Error, Result};
use crate::symbol::SymId;
use crate::value::{SlotId, Val};

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct EnvId(pub(crate) SlotId);

struct Frame {
    bindings: HashMap<SymId, Val>,
    parent: Option<EnvId>,
}

#[derive(Default)]
pub struct EnvStore {
    frames: Arena<Frame>,
}

impl EnvStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a new empty top-level environment.
    pub fn new_top_level(&mut self) -> EnvId {
        EnvId(self.frames.insert(Frame {
            bindings: HashMap::new(),
            parent: None,
        }))
    }

    /// Create a child environment.
    pub fn new_child(&mut self, parent: EnvId) -> EnvId {
        EnvId(self.frames.insert(Frame {
            bindings: HashMap::new(),
            parent: Some(parent),
        }))
    }

    /// Bind `sym` in this frame only, shadowing any outer binding.
    pub fn define(&mut self, env: EnvId, sym: SymId, val: Val) -> Result<()> {
        let frame = self
            .frames
            .get_mut(env.0)
            .ok_or_else(|| Error::runtime("reference to a collected environment"))?;
        frame.bindings.insert(sym, val);
        Ok(())
    }

    /// Nearest frame, walking from `env` outwards, that binds `sym`.
    pub fn find_defining_frame(&self, env: EnvId, sym: SymId) -> Option<EnvId> {
        let mut current = Some(env);
        while let Some(id) = current {
            let frame = self.frames.get(id.0)?;
            if frame.bindings.contains_key(&sym) {
                return Some(id);
            }
            current = frame.parent;
        }
        None
    }

    /// Look up a binding (walks up parent chain).
    pub fn lookup(&self, env: EnvId, sym: SymId) -> Option<Val> {
        let frame = self.find_defining_frame(env, sym)?;
        self.frames.get(frame.0)?.bindings.get(&sym).copied()
    }

    /// Number of live frames
    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    pub fn contains(&self, env: EnvId) -> bool {
        self.frames.contains(env.0)
    }

    // ── Garbage Collection ──

    pub(crate) fn clear_marks(&mut self) {
        self.frames.clear_marks();
    }

    /// Mark a frame. When newly marked, pushes its bound values onto
    /// `values` and returns its parent so the caller can keep tracing.
    pub(crate) fn mark(&mut self, env: EnvId, values: &mut Vec<Val>) -> Option<Option<EnvId>> {
        if !self.frames.mark(env.0) {
            return None;
        }
        let frame = self.frames.get(env.0)?;
        values.extend(frame.bindings.values().copied());
        Some(frame.parent)
    }

    pub(crate) fn sweep(&mut self) -> usize {
        self.frames.sweep()
    }
}
