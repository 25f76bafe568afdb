use std::sync::Arc;

use ft_core::ports::{SecureStorageError, SecureStoragePort};
use tracing::{debug, warn};

/// Namespace owning the session's credentials.
pub const AUTH_NAMESPACE: &str = "auth";
pub const ACCESS_TOKEN_KEY: &str = "access_token";
pub const REFRESH_TOKEN_KEY: &str = "refresh_token";
pub const BIOMETRIC_CREDENTIAL_KEY: &str = "biometric_credential";

/// Async, never-failing view of a [`SecureStoragePort`] for one owner.
///
/// Keys are stored as `{namespace}_{key}` so two consumers of the same
/// keychain service cannot collide. Backend calls may block on the platform
/// keychain and run on the blocking pool.
#[derive(Clone)]
pub struct SecureCredentialStore {
    storage: Arc<dyn SecureStoragePort>,
    namespace: String,
}

impl SecureCredentialStore {
    pub fn new(storage: Arc<dyn SecureStoragePort>, namespace: impl Into<String>) -> Self {
        Self {
            storage,
            namespace: namespace.into(),
        }
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    fn storage_key(&self, key: &str) -> String {
        format!("{}_{}", self.namespace, key)
    }

    async fn run<T, F>(&self, op: &'static str, key: &str, f: F) -> Option<T>
    where
        T: Send + 'static,
        F: FnOnce(&dyn SecureStoragePort, &str) -> Result<T, SecureStorageError> + Send + 'static,
    {
        let storage = Arc::clone(&self.storage);
        let storage_key = self.storage_key(key);
        let joined =
            tokio::task::spawn_blocking(move || f(storage.as_ref(), &storage_key)).await;

        match joined {
            Ok(Ok(value)) => Some(value),
            Ok(Err(err)) => {
                warn!(op, key, namespace = %self.namespace, error = %err, "secure storage operation failed");
                None
            }
            Err(err) => {
                warn!(op, key, namespace = %self.namespace, error = %err, "secure storage task failed");
                None
            }
        }
    }

    /// Read a value, telling a missing key apart from a backend failure.
    pub async fn try_get(&self, key: &str) -> Result<Option<String>, SecureStorageError> {
        let storage = Arc::clone(&self.storage);
        let storage_key = self.storage_key(key);
        let bytes = tokio::task::spawn_blocking(move || storage.get(&storage_key))
            .await
            .map_err(|err| SecureStorageError::Other(format!("secure storage task failed: {err}")))??;
        bytes
            .map(|bytes| {
                String::from_utf8(bytes)
                    .map_err(|_| SecureStorageError::Corrupt(format!("{key} is not valid UTF-8")))
            })
            .transpose()
    }

    /// Read a value. Missing keys, backend failures and non-UTF-8 data all read as `None`.
    pub async fn get(&self, key: &str) -> Option<String> {
        match self.try_get(key).await {
            Ok(value) => value,
            Err(err) => {
                warn!(op = "get", key, namespace = %self.namespace, error = %err, "secure storage operation failed");
                None
            }
        }
    }

    /// Write a value. Returns whether the backend accepted it.
    pub async fn set(&self, key: &str, value: &str) -> bool {
        let bytes = value.as_bytes().to_vec();
        let stored = self
            .run("set", key, move |storage, k| storage.set(k, &bytes))
            .await
            .is_some();
        if stored {
            debug!(key, namespace = %self.namespace, "secure value stored");
        }
        stored
    }

    /// Delete a value. Deleting a missing key is a success.
    pub async fn remove(&self, key: &str) -> bool {
        self.run("remove", key, |storage, k| storage.delete(k))
            .await
            .is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::sync::Mutex;

    #[derive(Default)]
    struct MapStorage {
        entries: Mutex<HashMap<String, Vec<u8>>>,
        fail: bool,
    }

    impl SecureStoragePort for MapStorage {
        fn get(&self, key: &str) -> Result<Option<Vec<u8>>, SecureStorageError> {
            if self.fail {
                return Err(SecureStorageError::Unavailable("keychain locked".into()));
            }
            Ok(self.entries.lock().unwrap().get(key).cloned())
        }

        fn set(&self, key: &str, value: &[u8]) -> Result<(), SecureStorageError> {
            if self.fail {
                return Err(SecureStorageError::Unavailable("keychain locked".into()));
            }
            self.entries
                .lock()
                .unwrap()
                .insert(key.to_string(), value.to_vec());
            Ok(())
        }

        fn delete(&self, key: &str) -> Result<(), SecureStorageError> {
            if self.fail {
                return Err(SecureStorageError::Unavailable("keychain locked".into()));
            }
            self.entries.lock().unwrap().remove(key);
            Ok(())
        }
    }

    #[tokio::test]
    async fn keys_are_namespaced() {
        let backend = Arc::new(MapStorage::default());
        let store = SecureCredentialStore::new(backend.clone(), AUTH_NAMESPACE);

        assert!(store.set(ACCESS_TOKEN_KEY, "a").await);
        assert_eq!(store.get(ACCESS_TOKEN_KEY).await.as_deref(), Some("a"));
        assert!(backend
            .entries
            .lock()
            .unwrap()
            .contains_key("auth_access_token"));
    }

    #[tokio::test]
    async fn backend_failures_read_as_absent() {
        let backend = Arc::new(MapStorage {
            fail: true,
            ..Default::default()
        });
        let store = SecureCredentialStore::new(backend, AUTH_NAMESPACE);

        assert!(store.get(ACCESS_TOKEN_KEY).await.is_none());
        assert!(matches!(
            store.try_get(ACCESS_TOKEN_KEY).await,
            Err(SecureStorageError::Unavailable(_))
        ));
        assert!(!store.set(ACCESS_TOKEN_KEY, "a").await);
        assert!(!store.remove(ACCESS_TOKEN_KEY).await);
    }

    #[tokio::test]
    async fn non_utf8_value_reads_as_absent() {
        let backend = Arc::new(MapStorage::default());
        backend
            .entries
            .lock()
            .unwrap()
            .insert("auth_access_token".into(), vec![0xff, 0xfe]);
        let store = SecureCredentialStore::new(backend, AUTH_NAMESPACE);

        assert!(store.get(ACCESS_TOKEN_KEY).await.is_none());
        assert!(matches!(
            store.try_get(ACCESS_TOKEN_KEY).await,
            Err(SecureStorageError::Corrupt(_))
        ));
        assert!(matches!(store.try_get(REFRESH_TOKEN_KEY).await, Ok(None)));
    }
}
