//! Key/value store backends.

use crate::{Error, ErrorContext, Result};
use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, RwLock};
use tracing::debug;

/// String key/value store shared by every client of a process.
///
/// Implementations must make a completed `set`/`remove` visible to every
/// later `get`, from any thread.
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>>;
    fn set(&self, key: &str, value: &str) -> Result<()>;
    fn remove(&self, key: &str) -> Result<()>;
    fn name(&self) -> &'static str;
}

fn poisoned(source: &'static str) -> Error {
    Error::storage_with_context(
        "store lock poisoned",
        ErrorContext::new().with_source(source),
    )
}

/// In-process store. State lives as long as the value does.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: RwLock<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> Result<usize> {
        let entries = self.entries.read().map_err(|_| poisoned("memory_store"))?;
        Ok(entries.len())
    }

    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.len()? == 0)
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let entries = self.entries.read().map_err(|_| poisoned("memory_store"))?;
        Ok(entries.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        let mut entries = self.entries.write().map_err(|_| poisoned("memory_store"))?;
        entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        let mut entries = self.entries.write().map_err(|_| poisoned("memory_store"))?;
        entries.remove(key);
        Ok(())
    }

    fn name(&self) -> &'static str {
        "memory"
    }
}

/// JSON file store. The file is re-read on every access, so separate
/// instances (or processes) pointing at the same path observe each other's
/// writes, and state survives restarts.
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    lock: Mutex<()>,
}

impl FileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    pub fn from_dir(dir: impl AsRef<Path>) -> Self {
        Self::new(dir.as_ref().join("storage.json"))
    }

    /// `<config_dir>/dataorch/storage.json`
    pub fn from_default_location() -> Result<Self> {
        let mut dir = dirs::config_dir().ok_or_else(|| {
            Error::storage_with_context(
                "failed to resolve config directory",
                ErrorContext::new().with_source("file_store"),
            )
        })?;
        dir.push("dataorch");
        Ok(Self::from_dir(dir))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load(&self) -> Result<BTreeMap<String, String>> {
        if !self.path.exists() {
            return Ok(BTreeMap::new());
        }
        let raw = std::fs::read_to_string(&self.path)?;
        if raw.trim().is_empty() {
            return Ok(BTreeMap::new());
        }
        serde_json::from_str(&raw).map_err(|e| {
            Error::storage_with_context(
                format!("failed to parse store file: {}", e),
                ErrorContext::new()
                    .with_details(self.path.display().to_string())
                    .with_source("file_store"),
            )
        })
    }

    fn save(&self, values: &BTreeMap<String, String>) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let text = serde_json::to_string_pretty(values)?;
        // Write-then-rename so a crash never leaves a truncated file behind.
        let tmp = self.path.with_extension("json.tmp");
        std::fs::write(&tmp, text)?;
        std::fs::rename(&tmp, &self.path)?;
        debug!(path = %self.path.display(), entries = values.len(), "store persisted");
        Ok(())
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let _guard = self.lock.lock().map_err(|_| poisoned("file_store"))?;
        Ok(self.load()?.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        let _guard = self.lock.lock().map_err(|_| poisoned("file_store"))?;
        let mut values = self.load()?;
        values.insert(key.to_string(), value.to_string());
        self.save(&values)
    }

    fn remove(&self, key: &str) -> Result<()> {
        let _guard = self.lock.lock().map_err(|_| poisoned("file_store"))?;
        let mut values = self.load()?;
        if values.remove(key).is_some() {
            self.save(&values)?;
        }
        Ok(())
    }

    fn name(&self) -> &'static str {
        "file"
    }
}
