//! # ft-platform
//!
//! Platform-specific implementations for FitTrack.
//!
//! This crate contains the secure credential storage backends that talk to
//! the operating system keychain, plus the file-based and in-memory fallbacks.

pub mod app_dirs;
pub mod capability;
pub mod file_secure_storage;
pub mod memory_secure_storage;
pub mod secure_storage;
pub mod system_secure_storage;

pub use app_dirs::{resolve_app_data_root, AppDirsError};
pub use file_secure_storage::FileSecureStorage;
pub use memory_secure_storage::InMemorySecureStorage;
pub use secure_storage::{create_secure_storage, SecureStorageFactoryError};
pub use system_secure_storage::SystemSecureStorage;
