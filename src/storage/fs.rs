//! Filesystem artifact store
//!
//! Every write goes to a scoped temporary file in the target directory and
//! is renamed over the final name once complete. A crash mid-write leaves at
//! most a hidden `.partial-*` file behind, never a truncated artifact.

use crate::storage::traits::{ArtifactStore, StorageError, StorageResult};
use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

const PARTIAL_PREFIX: &str = ".partial-";

/// Directory-backed artifact store
#[derive(Debug, Clone)]
pub struct FsStore {
    dir: PathBuf,
}

impl FsStore {
    /// Opens a store, creating its directory if needed
    pub fn open(dir: impl AsRef<Path>) -> StorageResult<Self> {
        let dir = dir.as_ref().to_path_buf();
        std::fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    fn path_for(&self, name: &str) -> StorageResult<PathBuf> {
        if name.is_empty() || name.starts_with('.') || name.contains(['/', '\\']) {
            return Err(StorageError::InvalidName(name.to_string()));
        }
        Ok(self.dir.join(name))
    }
}

impl ArtifactStore for FsStore {
    fn has(&self, name: &str) -> bool {
        self.path_for(name)
            .ok()
            .and_then(|path| std::fs::metadata(path).ok())
            .is_some_and(|meta| meta.is_file() && meta.len() > 0)
    }

    fn get(&self, name: &str) -> StorageResult<Option<String>> {
        if !self.has(name) {
            return Ok(None);
        }
        let content = std::fs::read_to_string(self.path_for(name)?)?;
        Ok(Some(content))
    }

    fn put(&self, name: &str, content: &str) -> StorageResult<()> {
        let path = self.path_for(name)?;
        write_atomic(&path, content.as_bytes())
    }

    fn names(&self) -> StorageResult<Vec<String>> {
        let mut names = Vec::new();
        for entry in std::fs::read_dir(&self.dir)? {
            let entry = entry?;
            if !entry.file_type()?.is_file() {
                continue;
            }
            if let Some(name) = entry.file_name().to_str() {
                if !name.starts_with('.') {
                    names.push(name.to_string());
                }
            }
        }
        names.sort();
        Ok(names)
    }

    fn location(&self) -> &Path {
        &self.dir
    }
}

/// Atomically writes `content` to `path`
pub fn write_atomic(path: &Path, content: &[u8]) -> StorageResult<()> {
    write_atomic_with(path, |file| file.write_all(content))
}

/// Atomically writes whatever `write` produces to `path`
///
/// If `write` fails, the temporary file is removed and `path` keeps its
/// previous state (absent, or the old complete content).
pub fn write_atomic_with<F>(path: &Path, write: F) -> StorageResult<()>
where
    F: FnOnce(&mut File) -> std::io::Result<()>,
{
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let mut tmp = tempfile::Builder::new()
        .prefix(PARTIAL_PREFIX)
        .tempfile_in(dir)?;
    write(tmp.as_file_mut())?;
    tmp.as_file().sync_all()?;
    tmp.persist(path).map_err(|e| StorageError::Persist {
        path: path.to_path_buf(),
        source: e.error,
    })?;

    tracing::trace!("Wrote {}", path.display());
    Ok(())
}
