use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use parking_lot::Mutex;

use super::Storage;

/// Storage persisted to a single JSON object file.
///
/// The whole map is rewritten on every mutation through a temporary file
/// and a rename, so a crash mid-write leaves the previous contents intact.
/// An unreadable or corrupt file loads as empty. Write failures are logged
/// and the in-memory view stays authoritative for the rest of the process.
#[derive(Debug)]
pub struct FileStorage {
    path: PathBuf,
    entries: Mutex<BTreeMap<String, String>>,
}

impl FileStorage {
    /// Open (or lazily create) the store at `path`.
    #[must_use]
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let entries = load(&path);
        Self {
            path,
            entries: Mutex::new(entries),
        }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn persist(&self, entries: &BTreeMap<String, String>) {
        if let Err(e) = write_atomically(&self.path, entries) {
            tracing::warn!(path = %self.path.display(), error = %e, "Storage file write failed");
        }
    }
}

fn load(path: &Path) -> BTreeMap<String, String> {
    let bytes = match fs::read(path) {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return BTreeMap::new(),
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "Storage file unreadable; starting empty");
            return BTreeMap::new();
        }
    };
    serde_json::from_slice(&bytes).unwrap_or_else(|e| {
        tracing::warn!(path = %path.display(), error = %e, "Storage file corrupt; starting empty");
        BTreeMap::new()
    })
}

fn write_atomically(path: &Path, entries: &BTreeMap<String, String>) -> io::Result<()> {
    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
        fs::create_dir_all(dir)?;
    }
    let json = serde_json::to_vec_pretty(entries).map_err(io::Error::other)?;
    let tmp = path.with_extension("tmp");
    fs::write(&tmp, json)?;
    fs::rename(&tmp, path)
}

impl Storage for FileStorage {
    fn get_raw(&self, key: &str) -> Option<String> {
        self.entries.lock().get(key).cloned()
    }

    fn set_raw(&self, key: &str, value: String) {
        let mut entries = self.entries.lock();
        entries.insert(key.to_owned(), value);
        self.persist(&entries);
    }

    fn remove(&self, key: &str) {
        let mut entries = self.entries.lock();
        if entries.remove(key).is_some() {
            self.persist(&entries);
        }
    }

    fn clear(&self) {
        let mut entries = self.entries.lock();
        if !entries.is_empty() {
            entries.clear();
            self.persist(&entries);
        }
    }

    fn has(&self, key: &str) -> bool {
        self.entries.lock().contains_key(key)
    }
}
