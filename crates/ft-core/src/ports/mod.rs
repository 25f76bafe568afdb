//! Port interfaces for the application layer
//!
//! Ports define the contract between the containers (application layer) and
//! the storage, clock, router and network implementations. Implementations
//! live in `ft-platform` (secure storage) and `ft-infra` (cache, clock, HTTP);
//! the router is provided by the UI shell.
//!
//! ## Port Placement Guidelines
//!
//! A port belongs here only if it is implemented outside `ft-app`.
//! Contracts between two application-layer objects stay in `ft-app`.

pub mod auth_api;
mod cache;
mod clock;
mod navigator;
pub mod secure_storage;

pub use auth_api::{AuthApiError, AuthApiPort, AuthResponse, Credentials, SignUpRequest, TokenPair};
pub use cache::{CacheError, KeyValueCachePort};
pub use clock::ClockPort;
pub use navigator::NavigatorPort;
pub use secure_storage::{SecureStorageError, SecureStoragePort};
