use std::collections::BTreeMap;
use std::sync::RwLock;

use ft_core::ports::{CacheError, KeyValueCachePort};

#[derive(Debug, Default)]
pub struct InMemoryKeyValueCache {
    entries: RwLock<BTreeMap<String, String>>,
}

impl InMemoryKeyValueCache {
    pub fn new() -> Self {
        Self::default()
    }
}

fn poisoned<T>(_: T) -> CacheError {
    CacheError::Other("in-memory cache lock poisoned".into())
}

impl KeyValueCachePort for InMemoryKeyValueCache {
    fn get(&self, key: &str) -> Result<Option<String>, CacheError> {
        Ok(self.entries.read().map_err(poisoned)?.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), CacheError> {
        self.entries
            .write()
            .map_err(poisoned)?
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), CacheError> {
        self.entries.write().map_err(poisoned)?.remove(key);
        Ok(())
    }

    fn keys(&self) -> Result<Vec<String>, CacheError> {
        Ok(self.entries.read().map_err(poisoned)?.keys().cloned().collect())
    }

    fn clear(&self) -> Result<(), CacheError> {
        self.entries.write().map_err(poisoned)?.clear();
        Ok(())
    }

    fn remove_prefix(&self, prefix: &str) -> Result<(), CacheError> {
        self.entries
            .write()
            .map_err(poisoned)?
            .retain(|key, _| !key.starts_with(prefix));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn remove_prefix_keeps_other_keys() {
        let cache = InMemoryKeyValueCache::new();
        cache.set("user:u-1:meals", "[]").unwrap();
        cache.set("user:u-1:journal", "[]").unwrap();
        cache.set("user:u-2:meals", "[]").unwrap();
        cache.set("onboarding_completed", "true").unwrap();

        cache.remove_prefix("user:u-1:").unwrap();

        let mut keys = cache.keys().unwrap();
        keys.sort();
        assert_eq!(keys, vec!["onboarding_completed", "user:u-2:meals"]);
    }
}
