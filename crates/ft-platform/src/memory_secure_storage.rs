use std::collections::HashMap;
use std::sync::Mutex;

use ft_core::ports::{SecureStorageError, SecureStoragePort};
use zeroize::Zeroize;

/// Process-local credential storage. Nothing survives a restart.
///
/// Used when `storage.secure_backend = "memory"` and by tests.
#[derive(Debug, Default)]
pub struct InMemorySecureStorage {
    entries: Mutex<HashMap<String, Vec<u8>>>,
}

impl InMemorySecureStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.lock().map(|e| e.len()).unwrap_or_default()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lock(
        &self,
    ) -> Result<std::sync::MutexGuard<'_, HashMap<String, Vec<u8>>>, SecureStorageError> {
        self.entries
            .lock()
            .map_err(|_| SecureStorageError::Unavailable("in-memory storage poisoned".into()))
    }
}

impl SecureStoragePort for InMemorySecureStorage {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, SecureStorageError> {
        Ok(self.lock()?.get(key).cloned())
    }

    fn set(&self, key: &str, value: &[u8]) -> Result<(), SecureStorageError> {
        if let Some(mut old) = self.lock()?.insert(key.to_string(), value.to_vec()) {
            old.zeroize();
        }
        Ok(())
    }

    fn delete(&self, key: &str) -> Result<(), SecureStorageError> {
        if let Some(mut old) = self.lock()?.remove(key) {
            old.zeroize();
        }
        Ok(())
    }
}
