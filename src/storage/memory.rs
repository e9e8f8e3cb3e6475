//! In-memory artifact store
//!
//! Used by tests in place of the filesystem store.

use crate::storage::traits::{ArtifactStore, StorageResult};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

#[derive(Debug)]
pub struct MemoryStore {
    label: PathBuf,
    artifacts: Mutex<BTreeMap<String, String>>,
}

impl MemoryStore {
    /// Creates an empty store reporting `label` as its location
    pub fn new(label: impl Into<PathBuf>) -> Self {
        Self {
            label: label.into(),
            artifacts: Mutex::new(BTreeMap::new()),
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, BTreeMap<String, String>> {
        self.artifacts
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Number of stored artifacts
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }
}

impl ArtifactStore for MemoryStore {
    fn has(&self, name: &str) -> bool {
        self.lock().get(name).is_some_and(|content| !content.is_empty())
    }

    fn get(&self, name: &str) -> StorageResult<Option<String>> {
        Ok(self
            .lock()
            .get(name)
            .filter(|content| !content.is_empty())
            .cloned())
    }

    fn put(&self, name: &str, content: &str) -> StorageResult<()> {
        self.lock().insert(name.to_string(), content.to_string());
        Ok(())
    }

    fn names(&self) -> StorageResult<Vec<String>> {
        Ok(self.lock().keys().cloned().collect())
    }

    fn location(&self) -> &Path {
        &self.label
    }
}
