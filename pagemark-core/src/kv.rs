use std::collections::BTreeMap;
use std::fs::{self, File};
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use serde_with::base64::Base64;
use serde_with::serde_as;
use tracing::warn;

#[serde_as]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoredValue {
    Bool(bool),
    Text(String),
    Data(#[serde_as(as = "Base64")] Vec<u8>),
}

pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<StoredValue>>;
    fn set(&self, key: &str, value: StoredValue) -> Result<()>;
    fn remove(&self, key: &str) -> Result<()>;

    fn synchronize(&self) -> Result<()> {
        Ok(())
    }

    fn bool(&self, key: &str) -> bool {
        matches!(self.get(key), Ok(Some(StoredValue::Bool(true))))
    }

    fn text(&self, key: &str) -> Option<String> {
        match self.get(key) {
            Ok(Some(StoredValue::Text(text))) => Some(text),
            _ => None,
        }
    }

    fn data(&self, key: &str) -> Option<Vec<u8>> {
        match self.get(key) {
            Ok(Some(StoredValue::Data(bytes))) => Some(bytes),
            _ => None,
        }
    }
}

pub struct MemoryKeyValueStore {
    inner: Mutex<BTreeMap<String, StoredValue>>,
}

impl MemoryKeyValueStore {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(BTreeMap::new()),
        }
    }
}

impl Default for MemoryKeyValueStore {
    fn default() -> Self {
        Self::new()
    }
}

impl KeyValueStore for MemoryKeyValueStore {
    fn get(&self, key: &str) -> Result<Option<StoredValue>> {
        Ok(self.inner.lock().get(key).cloned())
    }

    fn set(&self, key: &str, value: StoredValue) -> Result<()> {
        self.inner.lock().insert(key.to_owned(), value);
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        self.inner.lock().remove(key);
        Ok(())
    }
}

/// Changes are buffered until `synchronize` or drop.
pub struct FileKeyValueStore {
    path: PathBuf,
    entries: Mutex<FileEntries>,
}

struct FileEntries {
    values: BTreeMap<String, StoredValue>,
    dirty: bool,
}

impl FileKeyValueStore {
    pub fn open(path: PathBuf) -> Result<Self> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("failed to create settings directory at {:?}", parent))?;
        }
        let values = match read_entries(&path) {
            Ok(values) => values,
            Err(err) => {
                warn!(path = ?path, error = ?err, "discarding unreadable settings file");
                BTreeMap::new()
            }
        };
        Ok(Self {
            path,
            entries: Mutex::new(FileEntries {
                values,
                dirty: false,
            }),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn persist(&self, entries: &BTreeMap<String, StoredValue>) -> Result<()> {
        let tmp = self.path.with_extension("json.tmp");
        let payload = serde_json::to_string_pretty(entries)?;
        let mut file = File::create(&tmp)
            .with_context(|| format!("failed to open temp settings file {:?}", tmp))?;
        file.write_all(payload.as_bytes())?;
        file.flush()?;
        fs::rename(&tmp, &self.path)
            .with_context(|| format!("failed to replace settings file {:?}", self.path))?;
        Ok(())
    }
}

fn read_entries(path: &Path) -> Result<BTreeMap<String, StoredValue>> {
    if !path.exists() {
        return Ok(BTreeMap::new());
    }
    let mut file =
        File::open(path).with_context(|| format!("failed to open settings file {:?}", path))?;
    let mut buf = String::new();
    file.read_to_string(&mut buf)?;
    let entries = serde_json::from_str(&buf)
        .with_context(|| format!("failed to decode settings file {:?}", path))?;
    Ok(entries)
}

impl KeyValueStore for FileKeyValueStore {
    fn get(&self, key: &str) -> Result<Option<StoredValue>> {
        Ok(self.entries.lock().values.get(key).cloned())
    }

    fn set(&self, key: &str, value: StoredValue) -> Result<()> {
        let mut entries = self.entries.lock();
        entries.values.insert(key.to_owned(), value);
        entries.dirty = true;
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        let mut entries = self.entries.lock();
        if entries.values.remove(key).is_some() {
            entries.dirty = true;
        }
        Ok(())
    }

    fn synchronize(&self) -> Result<()> {
        let mut entries = self.entries.lock();
        if entries.dirty {
            self.persist(&entries.values)?;
            entries.dirty = false;
        }
        Ok(())
    }
}

impl Drop for FileKeyValueStore {
    fn drop(&mut self) {
        if let Err(err) = self.synchronize() {
            warn!(path = ?self.path, error = ?err, "failed to flush settings file");
        }
    }
}
