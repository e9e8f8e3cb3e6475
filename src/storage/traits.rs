//! Storage traits and error types
//!
//! This module defines the trait interface for artifact stores and
//! associated error types.

use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors that can occur during storage operations
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to publish {path}: {source}")]
    Persist {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Invalid artifact name: {0:?}")]
    InvalidName(String),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// A flat keyed store of raw text artifacts
///
/// Implementations must never expose a partially written artifact under its
/// final name: `has` and `get` see either nothing or the complete content.
pub trait ArtifactStore: Send + Sync {
    /// Returns true if the artifact exists and is non-empty
    fn has(&self, name: &str) -> bool;

    /// Reads an artifact; missing and empty artifacts are both `None`
    fn get(&self, name: &str) -> StorageResult<Option<String>>;

    /// Writes an artifact, replacing any previous content
    fn put(&self, name: &str, content: &str) -> StorageResult<()>;

    /// Lists artifact names in sorted order
    fn names(&self) -> StorageResult<Vec<String>>;

    /// Where the artifacts live, for reporting
    fn location(&self) -> &Path;
}
