//! String interning.
//!
//! The [`Interner`] guarantees at most one [`ObjString`] per distinct
//! character sequence, so interned strings compare by pointer. It is an
//! open-addressing set with linear probing that grows to keep its load
//! factor at or below 0.75, and it never evicts. The driver creates one
//! interner per compilation and shares it between the compiler and the VM.

use rustc_hash::FxHasher;
use std::fmt;
use std::hash::Hasher;
use std::rc::Rc;

const MAX_LOAD: f64 = 0.75;
const MIN_CAPACITY: usize = 8;

/// An interned, immutable string with its precomputed hash.
#[derive(Debug, PartialEq, Eq)]
pub struct ObjString {
    pub hash: u64,
    pub chars: Box<str>,
}

impl ObjString {
    pub fn as_str(&self) -> &str {
        &self.chars
    }

    pub fn len(&self) -> usize {
        self.chars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chars.is_empty()
    }
}

impl fmt::Display for ObjString {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(&self.chars)
    }
}

pub fn hash_str(text: &str) -> u64 {
    let mut hasher = FxHasher::default();
    hasher.write(text.as_bytes());
    hasher.finish()
}

/// Grows a table capacity: 8 first, then doubling.
pub(crate) fn grow_capacity(capacity: usize) -> usize {
    if capacity < MIN_CAPACITY {
        MIN_CAPACITY
    } else {
        capacity * 2
    }
}

/// True if inserting one more entry would push `count` over the load factor.
pub(crate) fn needs_growth(count: usize, capacity: usize) -> bool {
    (count + 1) as f64 > capacity as f64 * MAX_LOAD
}

#[derive(Debug, Default)]
pub struct Interner {
    entries: Vec<Option<Rc<ObjString>>>,
    count: usize,
}

impl Interner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the unique string object for `text`, creating it on first use.
    pub fn intern(&mut self, text: &str) -> Rc<ObjString> {
        let hash = hash_str(text);
        if let Some(existing) = self.find(text, hash) {
            return existing;
        }

        if needs_growth(self.count, self.entries.len()) {
            self.grow();
        }
        let string = Rc::new(ObjString {
            hash,
            chars: text.into(),
        });
        let slot = self.probe_empty(hash);
        self.entries[slot] = Some(Rc::clone(&string));
        self.count += 1;
        string
    }

    /// Looks `text` up without interning it.
    pub fn get(&self, text: &str) -> Option<Rc<ObjString>> {
        self.find(text, hash_str(text))
    }

    pub fn len(&self) -> usize {
        self.count
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    pub fn capacity(&self) -> usize {
        self.entries.len()
    }

    fn find(&self, text: &str, hash: u64) -> Option<Rc<ObjString>> {
        let capacity = self.entries.len();
        if capacity == 0 {
            return None;
        }
        let mut index = (hash as usize) % capacity;
        loop {
            match &self.entries[index] {
                None => return None,
                Some(entry) if entry.hash == hash && *entry.chars == *text => {
                    return Some(Rc::clone(entry))
                }
                Some(_) => index = (index + 1) % capacity,
            }
        }
    }

    fn probe_empty(&self, hash: u64) -> usize {
        let capacity = self.entries.len();
        let mut index = (hash as usize) % capacity;
        while self.entries[index].is_some() {
            index = (index + 1) % capacity;
        }
        index
    }

    fn grow(&mut self) {
        let capacity = grow_capacity(self.entries.len());
        let old = std::mem::replace(&mut self.entries, vec![None; capacity]);
        for entry in old.into_iter().flatten() {
            let slot = self.probe_empty(entry.hash);
            self.entries[slot] = Some(entry);
        }
        log::trace!("interner grew to {} slots", capacity);
    }
}
