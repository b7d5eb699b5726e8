use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::RwLock;

use anyhow::Context as _;

use crate::foundation::error::{LottieError, LottieResult};

/// Where decode workers fetch animation bytes from.
///
/// Called from worker threads, hence `Send + Sync`.
pub trait AssetSource: Send + Sync {
    /// Fetch the raw (usually compressed) bytes behind `url`.
    fn fetch(&self, url: &str) -> LottieResult<Vec<u8>>;
}

/// Reads assets from the local filesystem.
///
/// `file://` URLs and absolute paths are read as-is; everything else is resolved against `root`.
#[derive(Clone, Debug)]
pub struct FileSource {
    root: PathBuf,
}

impl FileSource {
    /// Create a source rooted at `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn resolve(&self, url: &str) -> PathBuf {
        let raw = url.strip_prefix("file://").unwrap_or(url);
        let path = Path::new(raw);
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.root.join(path)
        }
    }
}

impl AssetSource for FileSource {
    fn fetch(&self, url: &str) -> LottieResult<Vec<u8>> {
        if url.is_empty() {
            return Err(LottieError::fetch("empty source url"));
        }
        let path = self.resolve(url);
        let bytes = std::fs::read(&path)
            .with_context(|| format!("read animation '{}'", path.display()))
            .map_err(|e| LottieError::fetch(format!("{e:#}")))?;
        Ok(bytes)
    }
}

/// In-memory asset map.
#[derive(Debug, Default)]
pub struct MemorySource {
    entries: RwLock<HashMap<String, Vec<u8>>>,
}

impl MemorySource {
    /// Empty source.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style [`MemorySource::insert`].
    pub fn with(self, url: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        self.insert(url, bytes);
        self
    }

    /// Add or replace the bytes served for `url`.
    pub fn insert(&self, url: impl Into<String>, bytes: impl Into<Vec<u8>>) {
        let mut entries = match self.entries.write() {
            Ok(g) => g,
            Err(poisoned) => poisoned.into_inner(),
        };
        entries.insert(url.into(), bytes.into());
    }
}

impl AssetSource for MemorySource {
    fn fetch(&self, url: &str) -> LottieResult<Vec<u8>> {
        let entries = self
            .entries
            .read()
            .map_err(|_| LottieError::fetch("memory source lock poisoned"))?;
        entries
            .get(url)
            .cloned()
            .ok_or_else(|| LottieError::fetch(format!("no asset registered for '{url}'")))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/assets/source.rs"]
mod tests;
