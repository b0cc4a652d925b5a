//! In-memory [`ImageSource`] for tests.

use std::collections::HashMap;

use super::ImageSource;

#[derive(Debug, Clone, Default)]
pub struct InMemoryImages {
    files: HashMap<String, Vec<u8>>,
}

impl InMemoryImages {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, path: impl Into<String>, bytes: impl Into<Vec<u8>>) {
        self.files.insert(path.into(), bytes.into());
    }

    pub fn with(mut self, path: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        self.insert(path, bytes);
        self
    }
}

impl ImageSource for InMemoryImages {
    fn read(&self, path: &str) -> Option<Vec<u8>> {
        self.files.get(path).cloned()
    }
}
