use std::collections::HashMap;

/// Maps a resolved fetch identity (absolute URL or absolute local path) to
/// the output-relative path the resource was saved under.
///
/// One identity maps to at most one on-disk copy, however many documents
/// reference it and however they spell the reference.
#[derive(Debug, Default)]
pub struct ResourceCache {
    entries: HashMap<String, String>,
}

impl ResourceCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, identity: &str) -> Option<&str> {
        self.entries.get(identity).map(String::as_str)
    }

    pub fn insert(&mut self, identity: &str, saved_path: &str) {
        self.entries
            .insert(identity.to_string(), saved_path.to_string());
    }

    /// Drops an entry claimed before its content was fully processed.
    pub fn remove(&mut self, identity: &str) {
        self.entries.remove(identity);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
