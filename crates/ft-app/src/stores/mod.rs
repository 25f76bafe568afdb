//! Fail-open adapters over the storage ports.
//!
//! Nothing here returns a storage error to the containers: failures are
//! logged and surface as "absent" on read and "no-op" on write.

pub mod profile_cache;
pub mod secure_credential_store;

pub use profile_cache::{keys, ProfileCache};
pub use secure_credential_store::{
    SecureCredentialStore, ACCESS_TOKEN_KEY, AUTH_NAMESPACE, BIOMETRIC_CREDENTIAL_KEY,
    REFRESH_TOKEN_KEY,
};
