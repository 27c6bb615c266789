use parking_lot::Mutex;
use std::collections::BTreeMap;
use std::sync::Arc;

use super::check_quota;
use crate::domain::ports::KeyValueStorage;

#[derive(Debug, Default)]
struct Inner {
    slots: BTreeMap<String, String>,
    quota: Option<usize>,
}

/// Process-local key-value storage. Clones share the same slots, so a handle kept
/// aside outlives a `Store` and can reopen it as a fresh process would.
#[derive(Debug, Clone, Default)]
pub struct InMemoryStorage {
    inner: Arc<Mutex<Inner>>,
}

impl InMemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_quota(quota: usize) -> Self {
        let storage = Self::default();
        storage.set_quota(Some(quota));
        storage
    }

    pub fn set_quota(&self, quota: Option<usize>) {
        self.inner.lock().quota = quota;
    }

    /// Raw slot value, bypassing the trait (diagnostics and tests).
    pub fn raw(&self, key: &str) -> Option<String> {
        self.inner.lock().slots.get(key).cloned()
    }

    pub fn put_raw(&self, key: &str, value: &str) {
        self.inner
            .lock()
            .slots
            .insert(key.to_string(), value.to_string());
    }
}

impl KeyValueStorage for InMemoryStorage {
    fn get(&self, key: &str) -> anyhow::Result<Option<String>> {
        Ok(self.inner.lock().slots.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> anyhow::Result<()> {
        let mut inner = self.inner.lock();
        check_quota(&inner.slots, key, value, inner.quota)?;
        inner.slots.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> anyhow::Result<()> {
        self.inner.lock().slots.remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clones_share_slots() {
        let mut a = InMemoryStorage::new();
        let b = a.clone();
        a.set("k", "v").unwrap();
        assert_eq!(b.get("k").unwrap().as_deref(), Some("v"));

        a.remove("k").unwrap();
        assert!(b.raw("k").is_none());
    }

    #[test]
    fn quota_rejects_oversized_write_and_keeps_old_value() {
        let mut s = InMemoryStorage::with_quota(8);
        s.set("k", "1234").unwrap();

        let err = s.set("k", "123456789").unwrap_err();
        assert!(err.to_string().contains("quota exceeded"));
        assert_eq!(s.raw("k").as_deref(), Some("1234"));
    }
}
