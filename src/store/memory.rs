use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use crate::app::{ArborError, Result};
use crate::domain::Collection;
use crate::store::{decode, encode, Store};

#[derive(Default)]
struct Inner {
    contents: Mutex<Option<Vec<u8>>>,
    fail_writes: AtomicBool,
    saves: AtomicUsize,
}

/// Store kept in process memory. Clones share the same contents, so a test can
/// keep a handle while the tree owns another.
#[derive(Clone, Default)]
pub struct MemoryStore {
    inner: Arc<Inner>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from an existing serialized document.
    pub fn with_contents(doc: &str) -> Self {
        let store = Self::new();
        store.replace_contents(Some(doc.as_bytes().to_vec()));
        store
    }

    /// Make subsequent saves fail with an IO error.
    pub fn set_fail_writes(&self, fail: bool) {
        self.inner.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Number of successful saves so far.
    pub fn save_count(&self) -> usize {
        self.inner.saves.load(Ordering::SeqCst)
    }

    pub fn contents(&self) -> Option<String> {
        self.lock()
            .as_ref()
            .map(|bytes| String::from_utf8_lossy(bytes).into_owned())
    }

    fn replace_contents(&self, contents: Option<Vec<u8>>) {
        *self.lock() = contents;
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Option<Vec<u8>>> {
        // A poisoned lock still holds the last complete document.
        self.inner
            .contents
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl Store for MemoryStore {
    fn load(&self) -> Result<Collection> {
        match self.lock().as_ref() {
            Some(bytes) => decode(bytes, "memory"),
            None => Err(ArborError::NotFound("memory".into())),
        }
    }

    fn save(&self, collection: &Collection) -> Result<()> {
        if self.inner.fail_writes.load(Ordering::SeqCst) {
            return Err(std::io::Error::other("simulated write failure").into());
        }
        let bytes = encode(collection)?;
        self.replace_contents(Some(bytes));
        self.inner.saves.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}
