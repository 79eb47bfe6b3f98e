//! In-memory file metadata
//!
//! Maps each filename to its ordered chunk keys and remembers insertion
//! order for listings. The table lives behind a mutex in the master, so
//! racing CREATEs on the same filename serialize and the table only ever
//! holds complete records. Nothing survives a restart.

use std::collections::HashMap;

#[derive(Debug, Default)]
pub struct FileTable {
    records: HashMap<String, Vec<String>>,
    order: Vec<String>,
}

impl FileTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a file's chunk list. Re-creating an existing filename replaces
    /// its chunks atomically and keeps its listing position (last writer
    /// observed).
    pub fn insert(&mut self, filename: String, chunks: Vec<String>) {
        if self.records.insert(filename.clone(), chunks).is_none() {
            self.order.push(filename);
        }
    }

    /// Ordered chunk keys for a filename, if known.
    pub fn chunks(&self, filename: &str) -> Option<Vec<String>> {
        self.records.get(filename).cloned()
    }

    pub fn contains(&self, filename: &str) -> bool {
        self.records.contains_key(filename)
    }

    /// Filenames in insertion order.
    pub fn list(&self) -> Vec<String> {
        self.order.clone()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
