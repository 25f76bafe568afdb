//! Secure storage selection.

use std::{io, path::Path, sync::Arc};

use ft_core::config::SecureBackendKind;
use ft_core::ports::SecureStoragePort;

use crate::{
    capability::{detect_storage_capability, SecureStorageCapability},
    file_secure_storage::FileSecureStorage,
    memory_secure_storage::InMemorySecureStorage,
    system_secure_storage::SystemSecureStorage,
};

#[derive(Debug, thiserror::Error)]
pub enum SecureStorageFactoryError {
    #[error("secure storage unsupported: {capability:?}")]
    Unsupported { capability: SecureStorageCapability },

    #[error("failed to initialize file-based secure storage: {0}")]
    FileBasedInit(#[from] io::Error),
}

fn storage_from_capability(
    capability: SecureStorageCapability,
    app_data_root: &Path,
    service: &str,
) -> Result<Arc<dyn SecureStoragePort>, SecureStorageFactoryError> {
    match capability {
        SecureStorageCapability::SystemKeyring => {
            log::info!("Using system keyring for secure storage (service: {service})");
            Ok(Arc::new(SystemSecureStorage::new(service)) as Arc<dyn SecureStoragePort>)
        }
        SecureStorageCapability::FileBasedKeystore => {
            log::warn!("Using file-based secure storage under {}", app_data_root.display());
            Ok(Arc::new(FileSecureStorage::new_in_app_data_root(app_data_root)?)
                as Arc<dyn SecureStoragePort>)
        }
        SecureStorageCapability::Unsupported => {
            log::error!("Secure storage unsupported: {:?}", capability);
            Err(SecureStorageFactoryError::Unsupported { capability })
        }
    }
}

/// Build the credential storage backend selected by `kind`.
///
/// `Auto` probes the platform; the file backend lives under
/// `<app_data_root>/keyring`.
pub fn create_secure_storage(
    kind: SecureBackendKind,
    app_data_root: &Path,
    service: &str,
) -> Result<Arc<dyn SecureStoragePort>, SecureStorageFactoryError> {
    match kind {
        SecureBackendKind::Auto => {
            let capability = detect_storage_capability();
            log::debug!("Detected secure storage capability: {:?}", capability);
            storage_from_capability(capability, app_data_root, service)
        }
        SecureBackendKind::System => storage_from_capability(
            SecureStorageCapability::SystemKeyring,
            app_data_root,
            service,
        ),
        SecureBackendKind::File => storage_from_capability(
            SecureStorageCapability::FileBasedKeystore,
            app_data_root,
            service,
        ),
        SecureBackendKind::Memory => {
            log::warn!("Using in-memory secure storage; credentials will not survive a restart");
            Ok(Arc::new(InMemorySecureStorage::new()) as Arc<dyn SecureStoragePort>)
        }
    }
}
