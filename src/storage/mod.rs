//! Storage module for persisting crawl artifacts
//!
//! This module handles all on-disk state of a crawl, including:
//! - The per-author directory layout (`AUTHORS/<last>-<first>/{API,HTML}`)
//! - The page cache that makes crawls resumable
//! - The document store that makes document fetches idempotent
//! - Atomic (temp file + rename) writes

mod fs;
mod memory;
mod traits;

pub use fs::{write_atomic, write_atomic_with, FsStore};
pub use memory::MemoryStore;
pub use traits::{ArtifactStore, StorageError, StorageResult};

use crate::authors::TrackedAuthor;
use crate::crawler::FeedPage;
use crate::url::sanitize_id;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Directory under the output root holding one directory per author
pub const AUTHORS_DIR: &str = "AUTHORS";

/// Per-author subdirectory of raw query pages
pub const PAGES_DIR: &str = "API";

/// Per-author subdirectory of fetched documents
pub const DOCUMENTS_DIR: &str = "HTML";

/// One fetched document
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentRecord {
    pub external_id: String,
    pub sanitized_id: String,
    pub raw_content: String,
}

impl DocumentRecord {
    pub fn new(external_id: &str, raw_content: String) -> Self {
        Self {
            external_id: external_id.to_string(),
            sanitized_id: sanitize_id(external_id),
            raw_content,
        }
    }
}

/// Paths of one author's cache
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthorLayout {
    pub author_dir: PathBuf,
    pub pages_dir: PathBuf,
    pub documents_dir: PathBuf,
}

impl AuthorLayout {
    pub fn new(root: &Path, author: &TrackedAuthor) -> Self {
        let author_dir = root.join(AUTHORS_DIR).join(author.key());
        Self {
            pages_dir: author_dir.join(PAGES_DIR),
            documents_dir: author_dir.join(DOCUMENTS_DIR),
            author_dir,
        }
    }

    /// Opens (creating if needed) the page cache and document store
    pub fn open(&self, author: &TrackedAuthor) -> StorageResult<(PageCache, DocumentStore)> {
        let pages = PageCache::new(Arc::new(FsStore::open(&self.pages_dir)?), author);
        let documents = DocumentStore::new(Arc::new(FsStore::open(&self.documents_dir)?));
        Ok((pages, documents))
    }

    /// Counts cached documents without creating any directory
    pub fn document_count(&self) -> StorageResult<usize> {
        if !self.documents_dir.is_dir() {
            return Ok(0);
        }
        DocumentStore::new(Arc::new(FsStore::open(&self.documents_dir)?)).count()
    }
}

/// Raw query pages of one author, keyed by page index
pub struct PageCache {
    store: Arc<dyn ArtifactStore>,
    author_key: String,
}

impl PageCache {
    pub fn new(store: Arc<dyn ArtifactStore>, author: &TrackedAuthor) -> Self {
        Self {
            store,
            author_key: author.key(),
        }
    }

    /// Artifact name of a page: `page-<index>.xml`
    pub fn artifact_name(page_index: u32) -> String {
        format!("page-{}.xml", page_index)
    }

    /// Returns a cached page if it is present, non-empty and parseable
    ///
    /// Unreadable or corrupt artifacts are logged and treated as a miss so
    /// the page is fetched again.
    pub fn load(&self, page_index: u32) -> Option<FeedPage> {
        let name = Self::artifact_name(page_index);
        let raw = match self.store.get(&name) {
            Ok(Some(raw)) => raw,
            Ok(None) => return None,
            Err(e) => {
                tracing::warn!("Cannot read cached {}: {}", name, e);
                return None;
            }
        };

        match FeedPage::parse(&self.author_key, page_index, raw) {
            Ok(page) => Some(page),
            Err(e) => {
                tracing::warn!("Ignoring corrupt cached {}: {}", name, e);
                None
            }
        }
    }

    /// Persists a page under its index
    pub fn store(&self, page: &FeedPage) -> StorageResult<()> {
        self.store
            .put(&Self::artifact_name(page.page_index), &page.raw_content)
    }

    /// Names of all stored page artifacts
    pub fn stored_pages(&self) -> StorageResult<Vec<String>> {
        Ok(self
            .store
            .names()?
            .into_iter()
            .filter(|name| name.starts_with("page-") && name.ends_with(".xml"))
            .collect())
    }

    pub fn location(&self) -> &Path {
        self.store.location()
    }
}

/// Fetched documents of one author, keyed by sanitized id
pub struct DocumentStore {
    store: Arc<dyn ArtifactStore>,
}

impl DocumentStore {
    pub fn new(store: Arc<dyn ArtifactStore>) -> Self {
        Self { store }
    }

    /// Artifact name of a document: `<sanitized id>.html`
    pub fn artifact_name(external_id: &str) -> String {
        format!("{}.html", sanitize_id(external_id))
    }

    /// Returns true if a non-empty document is already stored
    pub fn contains(&self, external_id: &str) -> bool {
        self.store.has(&Self::artifact_name(external_id))
    }

    /// Persists a document unless one is already stored
    ///
    /// # Returns
    ///
    /// * `Ok(true)` - The document was written
    /// * `Ok(false)` - A document with this id already existed
    pub fn store(&self, record: &DocumentRecord) -> StorageResult<bool> {
        if self.contains(&record.external_id) {
            tracing::debug!("Document {} already stored", record.external_id);
            return Ok(false);
        }
        self.store.put(
            &format!("{}.html", record.sanitized_id),
            &record.raw_content,
        )?;
        Ok(true)
    }

    pub fn load(&self, external_id: &str) -> StorageResult<Option<String>> {
        self.store.get(&Self::artifact_name(external_id))
    }

    /// Number of stored documents
    pub fn count(&self) -> StorageResult<usize> {
        Ok(self
            .store
            .names()?
            .iter()
            .filter(|name| name.ends_with(".html"))
            .count())
    }

    pub fn location(&self) -> &Path {
        self.store.location()
    }
}
