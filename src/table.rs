//! Hash table keyed by interned strings, used for the VM's globals.
//!
//! Open addressing with linear probing. Keys are compared by pointer, which
//! is sound because every key comes from the same [`Interner`]. A deleted
//! entry leaves a tombstone (no key, value `true`) so probe sequences that
//! pass through it stay intact; tombstones count toward the load factor
//! until the table is rebuilt.
//!
//! [`Interner`]: crate::interner::Interner

use crate::interner::{grow_capacity, needs_growth, ObjString};
use crate::value::Value;
use std::rc::Rc;

#[derive(Debug, Clone, Default)]
struct Entry {
    key: Option<Rc<ObjString>>,
    value: Value,
}

impl Entry {
    fn is_tombstone(&self) -> bool {
        self.key.is_none() && matches!(self.value, Value::Bool(true))
    }
}

#[derive(Debug, Default)]
pub struct Table {
    entries: Vec<Entry>,
    /// Live entries plus tombstones.
    count: usize,
}

impl Table {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &Rc<ObjString>) -> Option<&Value> {
        if self.entries.is_empty() {
            return None;
        }
        let entry = &self.entries[self.find_slot(key)];
        entry.key.as_ref().map(|_| &entry.value)
    }

    /// Inserts or overwrites `key`. Returns true if the key was new.
    pub fn set(&mut self, key: Rc<ObjString>, value: Value) -> bool {
        if needs_growth(self.count, self.entries.len()) {
            self.grow();
        }
        let slot = self.find_slot(&key);
        let entry = &mut self.entries[slot];
        let is_new = entry.key.is_none();
        if is_new && !entry.is_tombstone() {
            self.count += 1;
        }
        entry.key = Some(key);
        entry.value = value;
        is_new
    }

    /// Removes `key`, leaving a tombstone. Returns false if it was absent.
    pub fn delete(&mut self, key: &Rc<ObjString>) -> bool {
        if self.entries.is_empty() {
            return false;
        }
        let slot = self.find_slot(key);
        let entry = &mut self.entries[slot];
        if entry.key.is_none() {
            return false;
        }
        entry.key = None;
        entry.value = Value::Bool(true);
        true
    }

    /// Number of live entries.
    pub fn len(&self) -> usize {
        self.entries.iter().filter(|entry| entry.key.is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Slot holding `key`, or the slot it should be inserted into: the first
    /// tombstone passed, else the empty slot that ended the probe.
    fn find_slot(&self, key: &Rc<ObjString>) -> usize {
        let capacity = self.entries.len();
        let mut index = (key.hash as usize) % capacity;
        let mut tombstone = None;
        loop {
            let entry = &self.entries[index];
            match &entry.key {
                Some(existing) if Rc::ptr_eq(existing, key) => return index,
                Some(_) => {}
                None if entry.is_tombstone() => {
                    tombstone.get_or_insert(index);
                }
                None => return tombstone.unwrap_or(index),
            }
            index = (index + 1) % capacity;
        }
    }

    fn grow(&mut self) {
        let capacity = grow_capacity(self.entries.len());
        let old = std::mem::replace(&mut self.entries, vec![Entry::default(); capacity]);
        self.count = 0;
        for entry in old {
            if let Some(key) = entry.key {
                let slot = self.find_slot(&key);
                self.entries[slot] = Entry {
                    key: Some(key),
                    value: entry.value,
                };
                self.count += 1;
            }
        }
    }
}
