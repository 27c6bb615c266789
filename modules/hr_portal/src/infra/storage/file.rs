use anyhow::Context;
use std::collections::BTreeMap;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use super::check_quota;
use crate::domain::ports::KeyValueStorage;

/// Key-value storage kept as one JSON object in a file.
///
/// Every write rewrites the whole file through a temp file in the same directory and
/// an atomic rename, so a failed write leaves the previous file intact.
#[derive(Debug)]
pub struct JsonFileStorage {
    path: PathBuf,
    slots: BTreeMap<String, String>,
    quota: Option<usize>,
    load_error: Option<String>,
}

fn read_slots(path: &Path) -> anyhow::Result<BTreeMap<String, String>> {
    if !path.exists() {
        return Ok(BTreeMap::new());
    }
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("cannot read storage file {}", path.display()))?;
    if raw.trim().is_empty() {
        return Ok(BTreeMap::new());
    }
    serde_json::from_str(&raw)
        .with_context(|| format!("storage file {} is not a JSON object", path.display()))
}

impl JsonFileStorage {
    /// Open (or lazily create) the storage file at `path`.
    ///
    /// An unreadable or malformed file does not fail the open: the error is kept and
    /// returned from every `get` until the next successful write replaces the file.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let (slots, load_error) = match read_slots(&path) {
            Ok(slots) => (slots, None),
            Err(e) => {
                warn!(path = %path.display(), error = %format!("{e:#}"), "storage file unreadable");
                (BTreeMap::new(), Some(format!("{e:#}")))
            }
        };
        debug!(path = %path.display(), slots = slots.len(), "opened file storage");
        Self {
            path,
            slots,
            quota: None,
            load_error,
        }
    }

    pub fn with_quota(mut self, quota: Option<usize>) -> Self {
        self.quota = quota;
        self
    }

    /// Why the file could not be read at open, if it could not.
    pub fn load_error(&self) -> Option<&str> {
        self.load_error.as_deref()
    }

    fn write_out(&self, slots: &BTreeMap<String, String>) -> anyhow::Result<()> {
        let dir = match self.path.parent() {
            Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
            _ => PathBuf::from("."),
        };
        std::fs::create_dir_all(&dir)
            .with_context(|| format!("cannot create storage dir {}", dir.display()))?;

        let body = serde_json::to_string_pretty(slots)?;
        let mut tmp = tempfile::NamedTempFile::new_in(&dir)
            .with_context(|| format!("cannot create temp file in {}", dir.display()))?;
        tmp.write_all(body.as_bytes())?;
        tmp.flush()?;
        tmp.persist(&self.path)
            .with_context(|| format!("cannot replace storage file {}", self.path.display()))?;
        Ok(())
    }
}

impl KeyValueStorage for JsonFileStorage {
    fn get(&self, key: &str) -> anyhow::Result<Option<String>> {
        if let Some(e) = &self.load_error {
            anyhow::bail!("{e}");
        }
        Ok(self.slots.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> anyhow::Result<()> {
        check_quota(&self.slots, key, value, self.quota)?;
        let mut next = self.slots.clone();
        next.insert(key.to_string(), value.to_string());
        self.write_out(&next)?;
        self.slots = next;
        self.load_error = None;
        Ok(())
    }

    fn remove(&mut self, key: &str) -> anyhow::Result<()> {
        if !self.slots.contains_key(key) {
            return Ok(());
        }
        let mut next = self.slots.clone();
        next.remove(key);
        self.write_out(&next)?;
        self.slots = next;
        self.load_error = None;
        Ok(())
    }
}
