use thiserror::Error;

#[derive(Debug, Error)]
pub enum CacheError {
    #[error("cache io failed: {0}")]
    Io(String),

    #[error("cache data corrupt: {0}")]
    Corrupt(String),

    #[error("cache failed: {0}")]
    Other(String),
}

/// Fast, non-encrypted key/value cache for profile data and onboarding snapshots.
///
/// Values are strings (raw markers or serialized JSON). Reads are served from
/// memory; writes may be flushed to disk synchronously.
pub trait KeyValueCachePort: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>, CacheError>;

    fn set(&self, key: &str, value: &str) -> Result<(), CacheError>;

    /// Remove a key. Removing a missing key succeeds.
    fn remove(&self, key: &str) -> Result<(), CacheError>;

    /// All keys currently stored, in no particular order.
    fn keys(&self) -> Result<Vec<String>, CacheError>;

    /// Remove every key.
    fn clear(&self) -> Result<(), CacheError>;

    /// Remove every key starting with `prefix`.
    fn remove_prefix(&self, prefix: &str) -> Result<(), CacheError> {
        for key in self.keys()? {
            if key.starts_with(prefix) {
                self.remove(&key)?;
            }
        }
        Ok(())
    }
}
