use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use parking_lot::Mutex;

/// Key for the link collection served by the HTTP endpoint variant.
pub const HTTP_LINKS_KEY: &str = "globeData";
/// Key for the link collection read from the document store variant.
pub const DOCUMENT_LINKS_KEY: &str = "globeDataFirebase";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    StorageUnavailable,
    InvalidKey(String),
    Io(String),
}

impl std::fmt::Display for StoreError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StoreError::StorageUnavailable => write!(f, "record storage unavailable"),
            StoreError::InvalidKey(key) => write!(f, "invalid record key: {key:?}"),
            StoreError::Io(msg) => write!(f, "record storage error: {msg}"),
        }
    }
}

impl std::error::Error for StoreError {}

/// Key-value blob store holding one serialized collection per key.
///
/// Last write wins; there is no versioning and no expiry. Reading a key that
/// was never written is `Ok(None)`, not an error. A successful `write` is
/// visible to every later `read` in the same process.
pub trait RecordStore: Send + Sync {
    fn read(&self, key: &str) -> Result<Option<String>, StoreError>;
    fn write(&self, key: &str, blob: &str) -> Result<(), StoreError>;
}

impl<T: RecordStore + ?Sized> RecordStore for Arc<T> {
    fn read(&self, key: &str) -> Result<Option<String>, StoreError> {
        (**self).read(key)
    }

    fn write(&self, key: &str, blob: &str) -> Result<(), StoreError> {
        (**self).write(key, blob)
    }
}

#[derive(Debug, Default)]
pub struct InMemoryRecordStore {
    blobs: Mutex<BTreeMap<String, String>>,
    writes: Mutex<u64>,
}

impl InMemoryRecordStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_blob(key: impl Into<String>, blob: impl Into<String>) -> Self {
        let store = Self::new();
        store.blobs.lock().insert(key.into(), blob.into());
        store
    }

    /// Number of successful writes since construction.
    pub fn write_count(&self) -> u64 {
        *self.writes.lock()
    }
}

impl RecordStore for InMemoryRecordStore {
    fn read(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.blobs.lock().get(key).cloned())
    }

    fn write(&self, key: &str, blob: &str) -> Result<(), StoreError> {
        self.blobs.lock().insert(key.to_string(), blob.to_string());
        *self.writes.lock() += 1;
        Ok(())
    }
}

/// One file per key under a root directory (`<root>/<key>.json`).
///
/// Writes go to a temporary sibling first and are renamed into place, so a
/// crash mid-write never leaves a truncated blob behind.
#[derive(Debug)]
pub struct FileRecordStore {
    root: PathBuf,
}

impl FileRecordStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn path_for(&self, key: &str) -> Result<PathBuf, StoreError> {
        let valid = !key.is_empty()
            && !key.starts_with('.')
            && key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.'));
        if !valid {
            return Err(StoreError::InvalidKey(key.to_string()));
        }
        Ok(self.root.join(format!("{key}.json")))
    }
}

impl RecordStore for FileRecordStore {
    fn read(&self, key: &str) -> Result<Option<String>, StoreError> {
        let path = self.path_for(key)?;
        match std::fs::read_to_string(&path) {
            Ok(s) => Ok(Some(s)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(StoreError::Io(format!("read {}: {e}", path.display()))),
        }
    }

    fn write(&self, key: &str, blob: &str) -> Result<(), StoreError> {
        let path = self.path_for(key)?;
        std::fs::create_dir_all(&self.root)
            .map_err(|e| StoreError::Io(format!("create {}: {e}", self.root.display())))?;

        let tmp = path.with_extension("json.tmp");
        std::fs::write(&tmp, blob)
            .map_err(|e| StoreError::Io(format!("write {}: {e}", tmp.display())))?;
        std::fs::rename(&tmp, &path)
            .map_err(|e| StoreError::Io(format!("rename {}: {e}", path.display())))?;
        tracing::debug!(key, bytes = blob.len(), "record blob persisted");
        Ok(())
    }
}

#[cfg(target_arch = "wasm32")]
mod wasm_storage {
    use super::{RecordStore, StoreError};

    /// Browser `localStorage`, one item per key.
    #[derive(Debug, Default)]
    pub struct LocalStorageRecordStore;

    impl LocalStorageRecordStore {
        pub fn new() -> Result<Self, StoreError> {
            window_local_storage()?;
            Ok(Self)
        }
    }

    impl RecordStore for LocalStorageRecordStore {
        fn read(&self, key: &str) -> Result<Option<String>, StoreError> {
            let storage = window_local_storage()?;
            storage
                .get_item(key)
                .map_err(|e| StoreError::Io(format!("get_item({key}) failed: {:?}", e)))
        }

        fn write(&self, key: &str, blob: &str) -> Result<(), StoreError> {
            let storage = window_local_storage()?;
            storage
                .set_item(key, blob)
                .map_err(|e| StoreError::Io(format!("set_item({key}) failed: {:?}", e)))
        }
    }

    fn window_local_storage() -> Result<web_sys::Storage, StoreError> {
        let win = web_sys::window().ok_or(StoreError::StorageUnavailable)?;
        win.local_storage()
            .map_err(|e| StoreError::Io(format!("localStorage error: {:?}", e)))?
            .ok_or(StoreError::StorageUnavailable)
    }
}

#[cfg(target_arch = "wasm32")]
pub use wasm_storage::LocalStorageRecordStore;

#[cfg(not(target_arch = "wasm32"))]
#[derive(Debug)]
pub struct LocalStorageRecordStore;

#[cfg(not(target_arch = "wasm32"))]
impl LocalStorageRecordStore {
    pub fn new() -> Result<Self, StoreError> {
        Err(StoreError::StorageUnavailable)
    }
}

#[cfg(not(target_arch = "wasm32"))]
impl RecordStore for LocalStorageRecordStore {
    fn read(&self, _key: &str) -> Result<Option<String>, StoreError> {
        Err(StoreError::StorageUnavailable)
    }

    fn write(&self, _key: &str, _blob: &str) -> Result<(), StoreError> {
        Err(StoreError::StorageUnavailable)
    }
}
