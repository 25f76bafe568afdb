//! Fast key/value cache backends.

mod file_cache;
mod memory_cache;

pub use file_cache::FileKeyValueCache;
pub use memory_cache::InMemoryKeyValueCache;
