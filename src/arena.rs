//! Slot arena with per-entry mark bits.
//!
//! Both the object heap and the environment store keep their contents here.
//! A slot is only ever freed by `sweep`, and a freed slot bumps its
//! generation before it is handed out again, so a stale `SlotId` resolves to
//! `None` instead of to whatever reused the slot.

use crate::value::SlotId;

/// Metadata for GC
struct Entry<T> {
    value: T,
    marked: bool,
}

struct Slot<T> {
    generation: u32,
    entry: Option<Entry<T>>,
}

pub struct Arena<T> {
    slots: Vec<Slot<T>>,
    /// Slot indices released by the last sweeps, reused LIFO.
    free: Vec<u32>,
    len: usize,
}

impl<T> Default for Arena<T> {
    fn default() -> Self {
        Arena {
            slots: Vec::new(),
            free: Vec::new(),
            len: 0,
        }
    }
}

impl<T> Arena<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, value: T) -> SlotId {
        let entry = Entry {
            value,
            marked: false,
        };
        self.len += 1;
        if let Some(index) = self.free.pop() {
            let slot = &mut self.slots[index as usize];
            debug_assert!(slot.entry.is_none(), "free list names an occupied slot");
            slot.entry = Some(entry);
            return SlotId {
                index,
                generation: slot.generation,
            };
        }
        let index = self.slots.len() as u32;
        self.slots.push(Slot {
            generation: 0,
            entry: Some(entry),
        });
        SlotId {
            index,
            generation: 0,
        }
    }

    fn entry(&self, id: SlotId) -> Option<&Entry<T>> {
        let slot = self.slots.get(id.index as usize)?;
        if slot.generation != id.generation {
            return None;
        }
        slot.entry.as_ref()
    }

    fn entry_mut(&mut self, id: SlotId) -> Option<&mut Entry<T>> {
        let slot = self.slots.get_mut(id.index as usize)?;
        if slot.generation != id.generation {
            return None;
        }
        slot.entry.as_mut()
    }

    pub fn get(&self, id: SlotId) -> Option<&T> {
        self.entry(id).map(|e| &e.value)
    }

    pub fn get_mut(&mut self, id: SlotId) -> Option<&mut T> {
        self.entry_mut(id).map(|e| &mut e.value)
    }

    pub fn contains(&self, id: SlotId) -> bool {
        self.entry(id).is_some()
    }

    // ── Garbage Collection ──

    pub fn clear_marks(&mut self) {
        for slot in &mut self.slots {
            if let Some(entry) = slot.entry.as_mut() {
                entry.marked = false;
            }
        }
    }

    /// Mark a live entry. Returns true only the first time, so tracing
    /// through cycles stops at the first revisit.
    pub fn mark(&mut self, id: SlotId) -> bool {
        match self.entry_mut(id) {
            Some(entry) if !entry.marked => {
                entry.marked = true;
                true
            }
            _ => false,
        }
    }

    /// Free every unmarked entry. Returns how many were freed.
    pub fn sweep(&mut self) -> usize {
        let mut swept = 0;
        for (index, slot) in self.slots.iter_mut().enumerate() {
            let dead = matches!(&slot.entry, Some(entry) if !entry.marked);
            if dead {
                slot.entry = None;
                slot.generation = slot.generation.wrapping_add(1);
                self.free.push(index as u32);
                swept += 1;
            }
        }
        self.len -= swept;
        swept
    }

    /// Number of live entries
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}
