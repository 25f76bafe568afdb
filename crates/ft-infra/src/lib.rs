//! # ft-infra
//!
//! Infrastructure adapters for the FitTrack ports: the fast profile cache
//! backends, clocks, and the HTTP client for the backend auth API.

pub mod auth_api;
pub mod cache;
pub mod time;

pub use auth_api::HttpAuthApi;
pub use cache::{FileKeyValueCache, InMemoryKeyValueCache};
pub use time::{ManualClock, SystemClock};
