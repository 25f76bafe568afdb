use keyring::Entry;
use ft_core::ports::{SecureStorageError, SecureStoragePort};

/// Keychain-backed credential storage (Keychain, Credential Manager, Secret Service).
///
/// 基于系统钥匙串的凭据存储。
#[derive(Debug, Clone)]
pub struct SystemSecureStorage {
    service: String,
}

impl SystemSecureStorage {
    /// Entries are grouped under `service` in the platform keychain.
    pub fn new(service: impl Into<String>) -> Self {
        Self {
            service: service.into(),
        }
    }

    pub fn service(&self) -> &str {
        &self.service
    }

    fn entry_for_key(&self, key: &str) -> Result<Entry, SecureStorageError> {
        Entry::new(&self.service, key).map_err(|e| match e {
            keyring::Error::NoStorageAccess(inner) => {
                SecureStorageError::Unavailable(inner.to_string())
            }
            other => SecureStorageError::Other(format!("failed to create keyring entry: {other}")),
        })
    }
}

fn map_keyring_error(action: &str, err: keyring::Error) -> SecureStorageError {
    match err {
        keyring::Error::PlatformFailure(msg) => SecureStorageError::PermissionDenied(msg.to_string()),
        keyring::Error::NoStorageAccess(msg) => SecureStorageError::Unavailable(msg.to_string()),
        keyring::Error::BadEncoding(_) => {
            SecureStorageError::Corrupt(format!("failed to {action} keyring entry: bad encoding"))
        }
        other => SecureStorageError::Other(format!("failed to {action} keyring entry: {other}")),
    }
}

impl SecureStoragePort for SystemSecureStorage {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, SecureStorageError> {
        let entry = self.entry_for_key(key)?;
        match entry.get_secret() {
            Ok(secret) => Ok(Some(secret)),
            Err(keyring::Error::NoEntry) => Ok(None),
            Err(err) => Err(map_keyring_error("read", err)),
        }
    }

    fn set(&self, key: &str, value: &[u8]) -> Result<(), SecureStorageError> {
        let entry = self.entry_for_key(key)?;
        entry
            .set_secret(value)
            .map_err(|err| map_keyring_error("write", err))
    }

    fn delete(&self, key: &str) -> Result<(), SecureStorageError> {
        let entry = self.entry_for_key(key)?;
        match entry.delete_credential() {
            Ok(()) | Err(keyring::Error::NoEntry) => Ok(()),
            Err(err) => Err(map_keyring_error("delete", err)),
        }
    }
}
