use std::sync::{Arc, PoisonError, RwLock};

use chrono::{DateTime, Utc};
use ft_core::ports::{CacheError, KeyValueCachePort};
use ft_core::profile::{JournalEntry, LoggedMeal, UserPreferences};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, warn};

/// Cache key layout.
///
/// Device-scope keys are bare; per-user keys live under `user:{id}:`.
pub mod keys {
    pub const ONBOARDING_PROGRESS: &str = "onboarding_progress";
    pub const ONBOARDING_COMPLETED: &str = "onboarding_completed";
    pub const ONBOARDING_START_TIME: &str = "onboarding_start_time";
    pub const ONBOARDING_COMPLETION_TIME: &str = "onboarding_completion_time";
    pub const USER_PROFILE: &str = "user_profile";
    /// Completion flag written by the session store of older installs.
    pub const LEGACY_SESSION_HAS_ONBOARDED: &str = "session_has_onboarded";

    pub const USER_PREFERENCES: &str = "preferences";
    pub const JOURNAL_ENTRIES: &str = "journal_entries";
    pub const LOGGED_MEALS: &str = "logged_meals";

    pub fn user_prefix(user_id: &str) -> String {
        format!("user:{user_id}:")
    }

    pub fn user_key(user_id: &str, key: &str) -> String {
        format!("user:{user_id}:{key}")
    }
}

/// Fast, non-sensitive cache for profile data and the onboarding snapshot.
///
/// 快速缓存：失败只记录日志，不向调用方抛出。
///
/// The `try_*` methods report failures for callers that surface them in UI
/// state; everything else is fail-open.
pub struct ProfileCache {
    cache: Arc<dyn KeyValueCachePort>,
    user_namespace: RwLock<Option<String>>,
}

impl ProfileCache {
    pub fn new(cache: Arc<dyn KeyValueCachePort>) -> Self {
        Self {
            cache,
            user_namespace: RwLock::new(None),
        }
    }

    // ===== raw strings =====

    pub fn try_get_string(&self, key: &str) -> Result<Option<String>, CacheError> {
        self.cache.get(key)
    }

    pub fn get_string(&self, key: &str) -> Option<String> {
        match self.try_get_string(key) {
            Ok(value) => value,
            Err(err) => {
                warn!(key, error = %err, "cache read failed");
                None
            }
        }
    }

    pub fn try_set_string(&self, key: &str, value: &str) -> Result<(), CacheError> {
        self.cache.set(key, value)
    }

    pub fn set_string(&self, key: &str, value: &str) {
        if let Err(err) = self.try_set_string(key, value) {
            warn!(key, error = %err, "cache write failed");
        }
    }

    pub fn try_remove(&self, key: &str) -> Result<(), CacheError> {
        self.cache.remove(key)
    }

    pub fn remove(&self, key: &str) {
        if let Err(err) = self.try_remove(key) {
            warn!(key, error = %err, "cache remove failed");
        }
    }

    // ===== JSON =====

    /// Deserialization failures are logged and read as `None`.
    pub fn get_json<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let raw = self.get_string(key)?;
        match serde_json::from_str(&raw) {
            Ok(value) => Some(value),
            Err(err) => {
                warn!(key, error = %err, "cached value is not valid JSON for its type");
                None
            }
        }
    }

    pub fn try_set_json<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> Result<(), CacheError> {
        let raw = serde_json::to_string(value)
            .map_err(|err| CacheError::Corrupt(format!("serialize {key}: {err}")))?;
        self.try_set_string(key, &raw)
    }

    pub fn set_json<T: Serialize + ?Sized>(&self, key: &str, value: &T) {
        if let Err(err) = self.try_set_json(key, value) {
            warn!(key, error = %err, "cache write failed");
        }
    }

    // ===== markers =====

    /// `"true"`/`"false"` markers. Anything else reads as `None`.
    pub fn get_bool(&self, key: &str) -> Option<bool> {
        match self.get_string(key)?.as_str() {
            "true" => Some(true),
            "false" => Some(false),
            other => {
                warn!(key, value = other, "cached marker is not a boolean");
                None
            }
        }
    }

    pub fn try_set_bool(&self, key: &str, value: bool) -> Result<(), CacheError> {
        self.try_set_string(key, if value { "true" } else { "false" })
    }

    pub fn set_bool(&self, key: &str, value: bool) {
        if let Err(err) = self.try_set_bool(key, value) {
            warn!(key, error = %err, "cache write failed");
        }
    }

    /// RFC 3339 timestamps.
    pub fn get_timestamp(&self, key: &str) -> Option<DateTime<Utc>> {
        let raw = self.get_string(key)?;
        match DateTime::parse_from_rfc3339(&raw) {
            Ok(ts) => Some(ts.with_timezone(&Utc)),
            Err(err) => {
                warn!(key, error = %err, "cached timestamp is malformed");
                None
            }
        }
    }

    pub fn try_set_timestamp(&self, key: &str, value: DateTime<Utc>) -> Result<(), CacheError> {
        self.try_set_string(key, &value.to_rfc3339())
    }

    pub fn set_timestamp(&self, key: &str, value: DateTime<Utc>) {
        if let Err(err) = self.try_set_timestamp(key, value) {
            warn!(key, error = %err, "cache write failed");
        }
    }

    // ===== user scope =====

    /// Select whose per-user keys the `user_*` helpers address.
    pub fn set_user_namespace(&self, user_id: Option<&str>) {
        let mut namespace = self
            .user_namespace
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        *namespace = user_id.map(str::to_string);
    }

    pub fn user_namespace(&self) -> Option<String> {
        self.user_namespace
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn scoped_key(&self, key: &str) -> Option<String> {
        self.user_namespace()
            .map(|user_id| keys::user_key(&user_id, key))
    }

    pub fn get_user_json<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let scoped = self.scoped_key(key)?;
        self.get_json(&scoped)
    }

    pub fn set_user_json<T: Serialize + ?Sized>(&self, key: &str, value: &T) {
        match self.scoped_key(key) {
            Some(scoped) => self.set_json(&scoped, value),
            None => debug!(key, "no signed-in user; per-user cache write dropped"),
        }
    }

    pub fn remove_user(&self, key: &str) {
        if let Some(scoped) = self.scoped_key(key) {
            self.remove(&scoped);
        }
    }

    /// Wipe the current user's scope. Device-scope keys survive.
    pub fn clear(&self) {
        let Some(user_id) = self.user_namespace() else {
            debug!("no signed-in user; nothing to clear");
            return;
        };
        if let Err(err) = self.cache.remove_prefix(&keys::user_prefix(&user_id)) {
            warn!(error = %err, "failed to clear user cache scope");
        }
    }

    /// Factory reset: wipe every key on the device.
    pub fn clear_all(&self) {
        if let Err(err) = self.cache.clear() {
            warn!(error = %err, "failed to clear cache");
        }
    }

    // ===== cached domain lists =====

    pub fn journal_entries(&self) -> Vec<JournalEntry> {
        self.get_user_json(keys::JOURNAL_ENTRIES).unwrap_or_default()
    }

    pub fn save_journal_entries(&self, entries: &[JournalEntry]) {
        self.set_user_json(keys::JOURNAL_ENTRIES, entries);
    }

    pub fn logged_meals(&self) -> Vec<LoggedMeal> {
        self.get_user_json(keys::LOGGED_MEALS).unwrap_or_default()
    }

    pub fn save_logged_meals(&self, meals: &[LoggedMeal]) {
        self.set_user_json(keys::LOGGED_MEALS, meals);
    }

    pub fn user_preferences(&self) -> UserPreferences {
        self.get_user_json(keys::USER_PREFERENCES).unwrap_or_default()
    }

    pub fn save_user_preferences(&self, preferences: &UserPreferences) {
        self.set_user_json(keys::USER_PREFERENCES, preferences);
    }
}
