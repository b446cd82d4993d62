//! String Interning Pool
//!
//! Deduplicated storage for tag names, attribute names/values and text
//! content. Variant documents repeat the same class lists and tag names
//! thousands of times, so every distinct string is stored once and nodes
//! refer to it by id. Ids are stable for the lifetime of the document, which
//! also makes them usable as cache keys.

use std::collections::HashMap;
use std::hash::{Hash, Hasher};

/// String interning pool
///
/// Memory layout:
/// - `entries`: (offset, len) into `data` for each interned string ID
/// - `data`: one buffer holding every distinct string
/// - `hash_index`: hash -> list of IDs (handles rare collisions)
#[derive(Debug)]
pub struct StringPool {
    entries: Vec<(u32, u32)>,
    data: String,
    hash_index: HashMap<u64, Vec<u32>>,
}

impl Default for StringPool {
    fn default() -> Self {
        Self::new()
    }
}

impl StringPool {
    /// Create a new empty string pool
    pub fn new() -> Self {
        let mut pool = StringPool {
            entries: Vec::with_capacity(256),
            data: String::with_capacity(4096),
            hash_index: HashMap::new(),
        };
        // Entry 0 is reserved for the empty string
        pool.entries.push((0, 0));
        pool
    }

    #[inline]
    fn compute_hash(s: &str) -> u64 {
        use std::collections::hash_map::DefaultHasher;
        let mut hasher = DefaultHasher::new();
        s.hash(&mut hasher);
        hasher.finish()
    }

    /// Intern a string, returning its id. The empty string is always id 0.
    pub fn intern(&mut self, s: &str) -> u32 {
        if s.is_empty() {
            return 0;
        }

        let hash = Self::compute_hash(s);
        if let Some(id) = self.lookup_hashed(s, hash) {
            return id;
        }

        let offset = self.data.len() as u32;
        self.data.push_str(s);

        let id = self.entries.len() as u32;
        self.entries.push((offset, s.len() as u32));
        self.hash_index.entry(hash).or_default().push(id);

        id
    }

    fn lookup_hashed(&self, s: &str, hash: u64) -> Option<u32> {
        self.hash_index
            .get(&hash)?
            .iter()
            .copied()
            .find(|&id| self.get_str(id) == Some(s))
    }

    /// Get a string by ID
    pub fn get_str(&self, id: u32) -> Option<&str> {
        let &(offset, len) = self.entries.get(id as usize)?;
        let start = offset as usize;
        self.data.get(start..start + len as usize)
    }

    /// Get the number of unique strings stored (including the reserved empty entry)
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if the pool is empty
    pub fn is_empty(&self) -> bool {
        self.entries.len() <= 1 // Entry 0 is reserved
    }
}
