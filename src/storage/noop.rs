use super::Storage;

/// Storage for contexts with no durable medium.
///
/// Writes are discarded and reads always miss, so a session never outlives
/// the process.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopStorage;

impl Storage for NoopStorage {
    fn get_raw(&self, _key: &str) -> Option<String> {
        None
    }

    fn set_raw(&self, _key: &str, _value: String) {}

    fn remove(&self, _key: &str) {}

    fn clear(&self) {}
}
