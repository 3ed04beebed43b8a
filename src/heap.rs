//! Object heap and mark-sweep collector.
//!
//! Every compound value (pair, closure) lives in a slot of the heap arena.
//! Pairs are mutable cells, so unlike immediates they have identity: two
//! `cons` calls with equal contents give two distinct objects.
//!
//! Garbage collection: stop-the-world mark-and-sweep from a single root
//! environment.
//!   1. clear the mark bit on every live object and frame
//!   2. trace from the root frame: a frame marks its bound values and its
//!      parent, a pair marks car and cdr, a closure marks its body and its
//!      captured frame; immediates are terminal
//!   3. sweep every unmarked object and frame
//! Marking stops at already-marked entries, which is what makes cyclic
//! pairs and closures that capture their own defining frame safe to trace.
//! Tracing uses an explicit work list, so long lists do not deepen the host
//! stack.

use std::rc::Rc;

use tracing::debug;

use crate::arena::Arena;
use crate::env::{EnvId, EnvStore};
use crate::symbol::SymId;
use crate::value::{ObjRef, Val};

/// A user procedure created by `lambda`.
#[derive(Debug, Clone)]
pub struct Closure {
    pub params: Rc<[SymId]>,
    /// Evaluated in order; the last value is the result.
    pub body: Rc<[Val]>,
    /// Captured by reference: later definitions in this frame are visible.
    pub env: EnvId,
}

/// The kinds of objects stored on the heap.
#[derive(Debug, Clone)]
pub enum HeapObject {
    /// (car, cdr)
    Pair(Val, Val),
    Closure(Closure),
}

/// Outcome of one collection.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GcStats {
    pub objects_before: usize,
    pub objects_after: usize,
    pub frames_before: usize,
    pub frames_after: usize,
}

impl GcStats {
    pub fn objects_swept(&self) -> usize {
        self.objects_before - self.objects_after
    }

    pub fn frames_swept(&self) -> usize {
        self.frames_before - self.frames_after
    }
}

#[derive(Default)]
pub struct Heap {
    objects: Arena<HeapObject>,
    collections: u64,
}

impl Heap {
    pub fn new() -> Self {
        Self::default()
    }

    // ── Allocation ──

    /// Allocate a fresh pair.
    pub fn cons(&mut self, car: Val, cdr: Val) -> Val {
        Val::Obj(ObjRef(self.objects.insert(HeapObject::Pair(car, cdr))))
    }

    pub fn alloc_closure(&mut self, params: Vec<SymId>, body: Vec<Val>, env: EnvId) -> Val {
        let closure = Closure {
            params: params.into(),
            body: body.into(),
            env,
        };
        Val::Obj(ObjRef(self.objects.insert(HeapObject::Closure(closure))))
    }

    // ── Access ──

    pub fn get(&self, r: ObjRef) -> Option<&HeapObject> {
        self.objects.get(r.0)
    }

    fn object(&self, val: Val) -> Option<&HeapObject> {
        self.get(val.as_obj()?)
    }

    pub fn car(&self, val: Val) -> Option<Val> {
        match self.object(val)? {
            HeapObject::Pair(a, _) => Some(*a),
            _ => None,
        }
    }

    pub fn cdr(&self, val: Val) -> Option<Val> {
        match self.object(val)? {
            HeapObject::Pair(_, b) => Some(*b),
            _ => None,
        }
    }

    /// Replace the car of a pair. Returns false if `pair` is not a pair.
    pub fn set_car(&mut self, pair: Val, new: Val) -> bool {
        let Some(r) = pair.as_obj() else { return false };
        match self.objects.get_mut(r.0) {
            Some(HeapObject::Pair(car, _)) => {
                *car = new;
                true
            }
            _ => false,
        }
    }

    /// Replace the cdr of a pair. Returns false if `pair` is not a pair.
    pub fn set_cdr(&mut self, pair: Val, new: Val) -> bool {
        let Some(r) = pair.as_obj() else { return false };
        match self.objects.get_mut(r.0) {
            Some(HeapObject::Pair(_, cdr)) => {
                *cdr = new;
                true
            }
            _ => false,
        }
    }

    pub fn get_closure(&self, val: Val) -> Option<&Closure> {
        match self.object(val)? {
            HeapObject::Closure(c) => Some(c),
            _ => None,
        }
    }

    pub fn is_pair(&self, val: Val) -> bool {
        matches!(self.object(val), Some(HeapObject::Pair(_, _)))
    }

    pub fn is_closure(&self, val: Val) -> bool {
        matches!(self.object(val), Some(HeapObject::Closure(_)))
    }

    // ── Lists ──

    /// Build a proper list from a slice of Vals.
    pub fn list(&mut self, vals: &[Val]) -> Val {
        let mut result = Val::nil();
        for v in vals.iter().rev() {
            result = self.cons(*v, result);
        }
        result
    }

    /// Convert a proper list to a Vec. Returns None if not a proper list.
    pub fn list_to_vec(&self, mut val: Val) -> Option<Vec<Val>> {
        if !self.is_proper_list(val) {
            return None;
        }
        let mut result = Vec::new();
        while let Some((car, cdr)) = self.pair_parts(val) {
            result.push(car);
            val = cdr;
        }
        Some(result)
    }

    fn pair_parts(&self, val: Val) -> Option<(Val, Val)> {
        match self.object(val)? {
            HeapObject::Pair(a, b) => Some((*a, *b)),
            _ => None,
        }
    }

    /// Shallow spine walk: the car of every pair along the cdr chain, plus
    /// the final cdr as one more element when it is not `()`.
    pub fn spine(&self, val: Val) -> Vec<Val> {
        let mut items = Vec::new();
        let mut current = val;
        while let Some((car, cdr)) = self.pair_parts(current) {
            items.push(car);
            current = cdr;
        }
        if !current.is_nil() {
            items.push(current);
        }
        items
    }

    /// `()` or a finite chain of pairs ending in `()`. A cdr cycle is not a
    /// proper list; detected by advancing a second cursor at double speed.
    pub fn is_proper_list(&self, val: Val) -> bool {
        let mut slow = val;
        let mut fast = val;
        loop {
            if fast.is_nil() {
                return true;
            }
            let Some(next) = self.cdr(fast) else { return false };
            if next.is_nil() {
                return true;
            }
            let Some(next) = self.cdr(next) else { return false };
            fast = next;
            slow = match self.cdr(slow) {
                Some(s) => s,
                None => return false,
            };
            if fast == slow {
                return false;
            }
        }
    }

    // ── Garbage Collection ──

    /// Reclaim every object and frame not reachable from `root`.
    pub fn collect(&mut self, envs: &mut EnvStore, root: EnvId) -> GcStats {
        let objects_before = self.objects.len();
        let frames_before = envs.len();

        self.objects.clear_marks();
        envs.clear_marks();

        let mut pending_vals: Vec<Val> = Vec::new();
        let mut pending_frames: Vec<EnvId> = vec![root];
        loop {
            if let Some(env) = pending_frames.pop() {
                if let Some(Some(parent)) = envs.mark(env, &mut pending_vals) {
                    pending_frames.push(parent);
                }
                continue;
            }
            let Some(val) = pending_vals.pop() else { break };
            let Val::Obj(r) = val else { continue };
            if !self.objects.mark(r.0) {
                continue;
            }
            match self.objects.get(r.0) {
                Some(HeapObject::Pair(car, cdr)) => {
                    pending_vals.push(*car);
                    pending_vals.push(*cdr);
                }
                Some(HeapObject::Closure(c)) => {
                    pending_vals.extend(c.body.iter().copied());
                    pending_frames.push(c.env);
                }
                None => {}
            }
        }

        self.objects.sweep();
        envs.sweep();
        self.collections += 1;

        let stats = GcStats {
            objects_before,
            objects_after: self.objects.len(),
            frames_before,
            frames_after: envs.len(),
        };
        debug!(
            objects_before = stats.objects_before,
            objects_after = stats.objects_after,
            frames_before = stats.frames_before,
            frames_after = stats.frames_after,
            "gc: collection {} swept {} objects, {} frames",
            self.collections,
            stats.objects_swept(),
            stats.frames_swept()
        );
        stats
    }

    /// Number of objects on heap
    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    /// Collections run so far.
    pub fn collections(&self) -> u64 {
        self.collections
    }
}
