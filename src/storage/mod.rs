//! Durable key-value persistence.
//!
//! [`Storage`] is the raw text layer a backend implements; [`StorageExt`]
//! adds typed access on top of any backend. No operation ever fails: when the
//! medium is unavailable, writes are dropped and reads return `None`.

mod file;
mod memory;
mod noop;

use std::sync::Arc;

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value as JsonValue;

pub use file::FileStorage;
pub use memory::MemoryStorage;
pub use noop::NoopStorage;

/// Raw text key-value store.
pub trait Storage: Send + Sync {
    fn get_raw(&self, key: &str) -> Option<String>;

    fn set_raw(&self, key: &str, value: String);

    fn remove(&self, key: &str);

    /// Remove every entry.
    fn clear(&self);

    fn has(&self, key: &str) -> bool {
        self.get_raw(key).is_some()
    }
}

/// Typed access over any [`Storage`].
pub trait StorageExt: Storage {
    /// Serialise `value` as JSON text and store it.
    ///
    /// A value that cannot be serialised is logged and not written.
    fn set<T: Serialize + ?Sized>(&self, key: &str, value: &T) {
        match serde_json::to_string(value) {
            Ok(text) => self.set_raw(key, text),
            Err(e) => tracing::warn!(key, error = %e, "Storage value not serialisable; skipped"),
        }
    }

    /// Read `key` back as `T`.
    ///
    /// Tries JSON first, then offers the raw text to `T` as a plain string
    /// (values written as bare text by other writers). Returns `None` if
    /// neither fits.
    fn get<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let raw = self.get_raw(key)?;
        match serde_json::from_str(&raw) {
            Ok(value) => Some(value),
            Err(_) => serde_json::from_value(JsonValue::String(raw)).ok(),
        }
    }
}

impl<S: Storage + ?Sized> StorageExt for S {}

impl<S: Storage + ?Sized> Storage for Arc<S> {
    fn get_raw(&self, key: &str) -> Option<String> {
        (**self).get_raw(key)
    }

    fn set_raw(&self, key: &str, value: String) {
        (**self).set_raw(key, value);
    }

    fn remove(&self, key: &str) {
        (**self).remove(key);
    }

    fn clear(&self) {
        (**self).clear();
    }

    fn has(&self, key: &str) -> bool {
        (**self).has(key)
    }
}

impl<S: Storage + ?Sized> Storage for Box<S> {
    fn get_raw(&self, key: &str) -> Option<String> {
        (**self).get_raw(key)
    }

    fn set_raw(&self, key: &str, value: String) {
        (**self).set_raw(key, value);
    }

    fn remove(&self, key: &str) {
        (**self).remove(key);
    }

    fn clear(&self) {
        (**self).clear();
    }

    fn has(&self, key: &str) -> bool {
        (**self).has(key)
    }
}
