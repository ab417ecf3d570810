use std::{
    collections::HashMap,
    sync::{Arc, Mutex, MutexGuard},
};

use crate::Coordinates;

/// The outcome of looking up a name in a [`ResolutionCache`]
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Lookup {
    /// The name was resolved before. `None` means it is known to be unresolvable.
    Hit(Option<Coordinates>),
    /// The name was never resolved.
    Miss,
}

/// An in-memory, append-only map between canonical country names and their resolution.
///
/// A cache lives as long as the session that owns it and is shared by every resolution
/// of that session, including concurrent ones. Entries are never overwritten: the first
/// resolution of a name wins. [`ResolutionCache::clear`] resets the session.
#[derive(Debug, Default)]
pub struct ResolutionCache(Mutex<HashMap<Arc<str>, Option<Coordinates>>>);

impl ResolutionCache {
    pub fn new() -> Self {
        Self::default()
    }

    fn entries(&self) -> MutexGuard<'_, HashMap<Arc<str>, Option<Coordinates>>> {
        // entries are only ever inserted whole, so a poisoned map is still consistent
        self.0.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub fn get(&self, name: &str) -> Lookup {
        match self.entries().get(name) {
            Some(value) => Lookup::Hit(*value),
            None => Lookup::Miss,
        }
    }

    /// Stores the resolution of `name` unless one already exists.
    /// Returns the stored resolution.
    pub fn insert(&self, name: &str, value: Option<Coordinates>) -> Option<Coordinates> {
        *self.entries().entry(name.into()).or_insert(value)
    }

    pub fn len(&self) -> usize {
        self.entries().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries().is_empty()
    }

    /// Removes every entry
    pub fn clear(&self) {
        self.entries().clear()
    }
}
