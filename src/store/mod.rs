//! Persisted value store
//!
//! A [`Store`] keeps one value in memory and mirrors it to a
//! [`StorageBackend`] under a fixed key. The value is always replaced as a
//! whole; every replacement is published to subscribers and then written
//! back to storage.
//!
//! Writes are serialized: each one takes the current value under a write
//! lock and holds it until the backend returns, so the last write always
//! carries the latest value. Write failures are logged and swallowed, so
//! after one the in-memory value and the stored value can differ.
//! [`Store::persist`] exposes the write with its result.

pub mod backend;

pub use backend::{FileStorage, MemoryStorage, StorageBackend};

use crate::error::{Error, Result};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::sync::{Arc, Mutex};
use tokio::sync::watch;
use tracing::{debug, warn};

/// A value persisted under a storage key
pub struct Store<T> {
    key: String,
    backend: Arc<dyn StorageBackend>,
    value: watch::Sender<T>,
    writes: Mutex<()>,
}

impl<T> Store<T>
where
    T: Serialize + DeserializeOwned + Clone,
{
    /// Open the store for `key`
    ///
    /// Uses the stored value when there is one that parses, `initial`
    /// otherwise.
    pub fn open(backend: Arc<dyn StorageBackend>, key: impl Into<String>, initial: T) -> Self {
        let key = key.into();

        let value = match backend.get_item(&key) {
            Ok(Some(text)) => match serde_json::from_str(&text) {
                Ok(value) => value,
                Err(e) => {
                    warn!("Stored value for '{}' is unreadable, using initial value: {}", key, e);
                    initial
                }
            },
            Ok(None) => {
                debug!("Nothing stored under '{}', using initial value", key);
                initial
            }
            Err(e) => {
                warn!("Failed to read '{}', using initial value: {}", key, e);
                initial
            }
        };

        let (value, _) = watch::channel(value);
        Self {
            key,
            backend,
            value,
            writes: Mutex::new(()),
        }
    }

    /// Storage key of this store
    pub fn key(&self) -> &str {
        &self.key
    }

    /// A copy of the current value
    pub fn get(&self) -> T {
        self.value.borrow().clone()
    }

    /// Run `f` against the current value without copying it
    pub fn with<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        f(&*self.value.borrow())
    }

    /// Replace the value, notify subscribers, then persist it
    pub fn set(&self, value: T) {
        self.value.send_replace(value);
        self.persist_logged();
    }

    /// Modify the value in place
    ///
    /// `f` returns whether it changed anything; unchanged values are neither
    /// published nor written.
    pub fn update(&self, f: impl FnOnce(&mut T) -> bool) -> bool {
        let modified = self.value.send_if_modified(f);
        if modified {
            self.persist_logged();
        }
        modified
    }

    /// Subscribe to value changes
    pub fn subscribe(&self) -> watch::Receiver<T> {
        self.value.subscribe()
    }

    /// Write the current value to storage
    pub fn persist(&self) -> Result<()> {
        let _guard = self
            .writes
            .lock()
            .map_err(|_| Error::Store(format!("Write lock for '{}' poisoned", self.key)))?;

        let text = serde_json::to_string(&*self.value.borrow())?;
        self.backend.set_item(&self.key, &text)
    }

    fn persist_logged(&self) {
        if let Err(e) = self.persist() {
            warn!("Failed to persist '{}': {}", self.key, e);
        }
    }
}

impl<T> std::fmt::Debug for Store<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Store")
            .field("key", &self.key)
            .field("backend", &self.backend)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::thread;
    use std::time::Duration;
    use tempfile::TempDir;

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct Item {
        name: String,
        tags: Vec<String>,
    }

    fn sample() -> Vec<Item> {
        vec![
            Item {
                name: "first".to_string(),
                tags: vec!["a".to_string()],
            },
            Item {
                name: "second".to_string(),
                tags: vec![],
            },
        ]
    }

    /// Reads like memory storage, refuses every write
    #[derive(Debug, Default)]
    struct ReadOnlyStorage {
        inner: MemoryStorage,
    }

    impl StorageBackend for ReadOnlyStorage {
        fn get_item(&self, key: &str) -> Result<Option<String>> {
            self.inner.get_item(key)
        }

        fn set_item(&self, _key: &str, _value: &str) -> Result<()> {
            Err(Error::Store("quota exceeded".to_string()))
        }

        fn remove_item(&self, key: &str) -> Result<()> {
            self.inner.remove_item(key)
        }
    }

    /// Memory storage whose first write stalls
    #[derive(Debug, Default)]
    struct SlowFirstWrite {
        inner: MemoryStorage,
        stalled: AtomicBool,
    }

    impl StorageBackend for SlowFirstWrite {
        fn get_item(&self, key: &str) -> Result<Option<String>> {
            self.inner.get_item(key)
        }

        fn set_item(&self, key: &str, value: &str) -> Result<()> {
            if !self.stalled.swap(true, Ordering::SeqCst) {
                thread::sleep(Duration::from_millis(300));
            }
            self.inner.set_item(key, value)
        }

        fn remove_item(&self, key: &str) -> Result<()> {
            self.inner.remove_item(key)
        }
    }

    #[test]
    fn test_concurrent_updates_leave_latest_value_stored() {
        let backend: Arc<dyn StorageBackend> = Arc::new(SlowFirstWrite::default());
        let store = Arc::new(Store::open(backend.clone(), "names", Vec::<String>::new()));

        let first = {
            let store = store.clone();
            thread::spawn(move || {
                store.update(|names| {
                    names.insert(0, "a".to_string());
                    true
                });
            })
        };

        thread::sleep(Duration::from_millis(50));
        store.update(|names| {
            names.insert(0, "b".to_string());
            true
        });
        first.join().unwrap();

        assert_eq!(store.get().len(), 2);
        let reopened = Store::open(backend, "names", Vec::<String>::new());
        assert_eq!(reopened.get(), store.get());
    }

    #[test]
    fn test_set_then_reopen() {
        let backend: Arc<dyn StorageBackend> = Arc::new(MemoryStorage::new());

        let store = Store::open(backend.clone(), "items", Vec::<Item>::new());
        store.set(sample());

        let reopened = Store::open(backend, "items", Vec::<Item>::new());
        assert_eq!(reopened.get(), sample());
    }

    #[test]
    fn test_set_then_reopen_on_disk() {
        let temp_dir = TempDir::new().unwrap();
        let backend: Arc<dyn StorageBackend> = Arc::new(FileStorage::new(temp_dir.path()));

        Store::open(backend.clone(), "items", Vec::<Item>::new()).set(sample());

        let reopened = Store::open(backend, "items", Vec::<Item>::new());
        assert_eq!(reopened.get(), sample());
    }

    #[test]
    fn test_missing_value_uses_initial() {
        let backend: Arc<dyn StorageBackend> = Arc::new(MemoryStorage::new());
        let store = Store::open(backend, "items", sample());
        assert_eq!(store.get(), sample());
    }

    #[test]
    fn test_invalid_json_uses_initial() {
        let memory = MemoryStorage::new();
        memory.set_item("items", "{not json").unwrap();
        let backend: Arc<dyn StorageBackend> = Arc::new(memory);

        let store = Store::open(backend, "items", sample());
        assert_eq!(store.get(), sample());
    }

    #[test]
    fn test_wrong_shape_uses_initial() {
        let memory = MemoryStorage::new();
        memory.set_item("items", "null").unwrap();
        let backend: Arc<dyn StorageBackend> = Arc::new(memory);

        let store = Store::open(backend, "items", sample());
        assert_eq!(store.get(), sample());
    }

    #[test]
    fn test_write_failure_keeps_memory_value() {
        let backend: Arc<dyn StorageBackend> = Arc::new(ReadOnlyStorage::default());
        let store = Store::open(backend.clone(), "items", Vec::<Item>::new());

        store.set(sample());

        assert_eq!(store.get(), sample());
        assert!(matches!(store.persist(), Err(Error::Store(_))));
        assert_eq!(backend.get_item("items").unwrap(), None);
    }

    #[test]
    fn test_update_persists_only_changes() {
        let memory = Arc::new(MemoryStorage::new());
        let backend: Arc<dyn StorageBackend> = memory.clone();
        let store = Store::open(backend, "count", 0u32);

        assert!(!store.update(|_| false));
        assert_eq!(memory.get_item("count").unwrap(), None);

        assert!(store.update(|n| {
            *n += 5;
            true
        }));
        assert_eq!(memory.get_item("count").unwrap().as_deref(), Some("5"));
        assert_eq!(store.with(|n| *n), 5);
    }

    #[tokio::test]
    async fn test_subscribers_see_changes() {
        let backend: Arc<dyn StorageBackend> = Arc::new(MemoryStorage::new());
        let store = Store::open(backend, "items", Vec::<Item>::new());
        let mut rx = store.subscribe();

        assert!(!rx.has_changed().unwrap());

        store.set(sample());
        rx.changed().await.unwrap();
        assert_eq!(*rx.borrow_and_update(), sample());

        store.update(|_| false);
        assert!(!rx.has_changed().unwrap());
    }
}
