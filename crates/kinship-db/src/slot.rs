//! Byte-level save storage.
//!
//! A [`SaveSlot`] is a key/value store of UTF-8 strings provided by the
//! hosting game. The gateway only ever uses one fixed key
//! ([`kinship_types::SAVE_DATA_KEY`]) but slots accept any key.
//!
//! | Slot | Backing | Use |
//! |------|---------|-----|
//! | [`MemorySlot`] | shared in-process map | tests, fault injection |
//! | [`JsonFileSlot`] | one file per key in a directory | host binary |

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use crate::error::DbError;

/// Durable string storage keyed by name.
pub trait SaveSlot: Send + Sync {
    /// Read the entry under `key`. A missing entry is `Ok(None)`.
    fn read(&self, key: &str) -> Result<Option<String>, DbError>;

    /// Replace the entry under `key`.
    fn write(&self, key: &str, data: &str) -> Result<(), DbError>;
}

// =========================================================================
// MemorySlot
// =========================================================================

#[derive(Debug, Default)]
struct MemoryInner {
    entries: Mutex<BTreeMap<String, String>>,
    writes: AtomicU64,
    fail_writes: AtomicBool,
}

/// In-memory slot. Clones share the same entries, so a test can keep a
/// handle after moving the slot into a gateway.
#[derive(Debug, Clone, Default)]
pub struct MemorySlot {
    inner: Arc<MemoryInner>,
}

impl MemorySlot {
    /// Create an empty slot.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a slot already holding `data` under `key`.
    pub fn with_entry(key: &str, data: &str) -> Self {
        let slot = Self::new();
        slot.entries().insert(key.to_owned(), data.to_owned());
        slot
    }

    /// Number of successful writes so far.
    pub fn write_count(&self) -> u64 {
        self.inner.writes.load(Ordering::SeqCst)
    }

    /// Make every following write fail until switched off again.
    pub fn set_fail_writes(&self, fail: bool) {
        self.inner.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Current entry under `key`, bypassing failure injection.
    pub fn peek(&self, key: &str) -> Option<String> {
        self.entries().get(key).cloned()
    }

    fn entries(&self) -> std::sync::MutexGuard<'_, BTreeMap<String, String>> {
        self.inner
            .entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

impl SaveSlot for MemorySlot {
    fn read(&self, key: &str) -> Result<Option<String>, DbError> {
        Ok(self.peek(key))
    }

    fn write(&self, key: &str, data: &str) -> Result<(), DbError> {
        if self.inner.fail_writes.load(Ordering::SeqCst) {
            return Err(DbError::Slot(format!("write to {key} refused")));
        }
        self.entries().insert(key.to_owned(), data.to_owned());
        self.inner.writes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

// =========================================================================
// JsonFileSlot
// =========================================================================

/// Directory-backed slot storing each key as `<dir>/<key>.json`.
///
/// Path separators in keys become `__`, so `kinship/romance-data` lives in
/// `kinship__romance-data.json`. Writes go to a temporary sibling first and
/// are renamed into place, so a crash mid-write leaves the previous entry
/// intact.
#[derive(Debug, Clone)]
pub struct JsonFileSlot {
    dir: PathBuf,
}

impl JsonFileSlot {
    /// Open (and create if needed) a slot directory.
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self, DbError> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;
        tracing::debug!(dir = %dir.display(), "Opened save directory");
        Ok(Self { dir })
    }

    /// The slot directory.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// File backing `key`.
    pub fn path_for(&self, key: &str) -> PathBuf {
        let name: String = key.replace(['/', '\\'], "__");
        self.dir.join(format!("{name}.json"))
    }
}

impl SaveSlot for JsonFileSlot {
    fn read(&self, key: &str) -> Result<Option<String>, DbError> {
        match fs::read_to_string(self.path_for(key)) {
            Ok(data) => Ok(Some(data)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(DbError::Io(e)),
        }
    }

    fn write(&self, key: &str, data: &str) -> Result<(), DbError> {
        let path = self.path_for(key);
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, data)?;
        fs::rename(&tmp, &path)?;
        tracing::trace!(path = %path.display(), bytes = data.len(), "Wrote save entry");
        Ok(())
    }
}
