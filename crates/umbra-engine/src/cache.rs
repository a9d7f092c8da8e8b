//! Bootstrap cache.
//!
//! On every transition the controller writes `"true"` or `"false"` under one
//! fixed key so that a first-paint script can guess the page's mode before
//! the engine has loaded. The cache is synchronous and string-valued.
//!
//! Two backends are provided: [`MemoryCache`] for tests and embedding, and
//! [`FileCache`], a JSON object on disk.

use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};

use crate::error::CacheError;

/// A synchronous string key/value store.
pub trait BootstrapCache {
    fn read(&self, key: &str) -> Result<Option<String>, CacheError>;

    fn write(&mut self, key: &str, value: &str) -> Result<(), CacheError>;
}

/// Reads a cached enabled flag. Anything other than `"true"` is disabled.
pub fn read_enabled<C: BootstrapCache + ?Sized>(
    cache: &C,
    key: &str,
) -> Result<bool, CacheError> {
    Ok(cache.read(key)?.as_deref() == Some("true"))
}

// === In-memory ===

/// Cache backed by a map; nothing is persisted.
#[derive(Debug, Clone, Default)]
pub struct MemoryCache {
    entries: HashMap<String, String>,
}

impl MemoryCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Direct access for assertions.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }
}

impl BootstrapCache for MemoryCache {
    fn read(&self, key: &str) -> Result<Option<String>, CacheError> {
        Ok(self.entries.get(key).cloned())
    }

    fn write(&mut self, key: &str, value: &str) -> Result<(), CacheError> {
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

// === File-backed ===

/// Cache stored as a flat JSON object. A missing file reads as empty.
#[derive(Debug, Clone)]
pub struct FileCache {
    path: PathBuf,
}

impl FileCache {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load(&self) -> Result<BTreeMap<String, String>, CacheError> {
        let content = match std::fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(BTreeMap::new()),
            Err(source) => {
                return Err(CacheError::Io {
                    path: self.path.clone(),
                    source,
                })
            }
        };
        if content.trim().is_empty() {
            return Ok(BTreeMap::new());
        }
        serde_json::from_str(&content).map_err(|source| CacheError::Corrupt {
            path: self.path.clone(),
            source,
        })
    }
}

impl BootstrapCache for FileCache {
    fn read(&self, key: &str) -> Result<Option<String>, CacheError> {
        Ok(self.load()?.remove(key))
    }

    fn write(&mut self, key: &str, value: &str) -> Result<(), CacheError> {
        let mut entries = self.load()?;
        entries.insert(key.to_string(), value.to_string());
        let json = serde_json::to_string_pretty(&entries).map_err(|source| CacheError::Corrupt {
            path: self.path.clone(),
            source,
        })?;
        std::fs::write(&self.path, json).map_err(|source| CacheError::Io {
            path: self.path.clone(),
            source,
        })
    }
}
