//! Insertion-ordered mapping from archive path to file bytes.
//!
//! # Invariants
//! - Keys are unique; inserting an existing key replaces the value in place
//!   (map semantics: the original insertion position is kept).
//! - Iteration order is insertion order.
//! - Keys are archive-relative paths: never empty, never carrying the
//!   stripped `package/` prefix (the extractor enforces both).

use ahash::AHashMap;

/// Ordered path→bytes mapping produced by archive extraction.
#[derive(Clone, Debug, Default)]
pub struct FileMap {
    entries: Vec<(String, Vec<u8>)>,
    index: AHashMap<String, usize>,
}

impl FileMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: Vec::with_capacity(capacity),
            index: AHashMap::with_capacity(capacity),
        }
    }

    /// Insert a file, replacing the value if the path already exists.
    ///
    /// Collisions are exotic in well-formed archives; the last writer wins
    /// without disturbing the entry's position.
    pub fn insert(&mut self, path: String, bytes: Vec<u8>) {
        match self.index.get(&path) {
            Some(&slot) => self.entries[slot].1 = bytes,
            None => {
                self.index.insert(path.clone(), self.entries.len());
                self.entries.push((path, bytes));
            }
        }
    }

    pub fn get(&self, path: &str) -> Option<&[u8]> {
        self.index
            .get(path)
            .map(|&slot| self.entries[slot].1.as_slice())
    }

    pub fn contains(&self, path: &str) -> bool {
        self.index.contains_key(path)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[u8])> {
        self.entries
            .iter()
            .map(|(path, bytes)| (path.as_str(), bytes.as_slice()))
    }

    /// Paths in insertion order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(path, _)| path.as_str())
    }
}

impl FromIterator<(String, Vec<u8>)> for FileMap {
    fn from_iter<I: IntoIterator<Item = (String, Vec<u8>)>>(iter: I) -> Self {
        let mut map = FileMap::new();
        for (path, bytes) in iter {
            map.insert(path, bytes);
        }
        map
    }
}
