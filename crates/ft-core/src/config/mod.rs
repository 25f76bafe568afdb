//! # Configuration DTO / 配置数据
//!
//! Maps the TOML configuration file to [`AppConfig`]. Missing keys take the
//! documented defaults; malformed values are reported as errors.

use std::path::PathBuf;
use std::str::FromStr;

use crate::navigation::GuardTiming;

pub const DEFAULT_KEYRING_SERVICE: &str = "FitTrack";
pub const DEFAULT_API_BASE_URL: &str = "http://localhost:3000";

/// Which secure storage backend to use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SecureBackendKind {
    /// Detect from the platform (system keyring when available).
    #[default]
    Auto,
    System,
    File,
    Memory,
}

impl FromStr for SecureBackendKind {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "" | "auto" => Ok(Self::Auto),
            "system" | "keyring" => Ok(Self::System),
            "file" => Ok(Self::File),
            "memory" => Ok(Self::Memory),
            other => Err(anyhow::anyhow!("unknown secure storage backend: {other}")),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageConfig {
    /// Root directory for the cache file and file-based keyring.
    /// Empty means "resolve from the platform data dir".
    pub data_dir: PathBuf,
    pub secure_backend: SecureBackendKind,
    pub keyring_service: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::new(),
            secure_backend: SecureBackendKind::Auto,
            keyring_service: DEFAULT_KEYRING_SERVICE.to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct HydrationConfig {
    /// Upper bound for each container's restore. `None` waits forever.
    pub timeout_ms: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiConfig {
    pub base_url: String,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_API_BASE_URL.to_string(),
        }
    }
}

/// Application configuration.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AppConfig {
    pub storage: StorageConfig,
    pub guard: GuardTiming,
    pub hydration: HydrationConfig,
    pub api: ApiConfig,
}

impl AppConfig {
    /// Create AppConfig from a parsed TOML document.
    pub fn from_toml(toml_value: &toml::Value) -> anyhow::Result<Self> {
        let defaults = Self::default();
        let get = |section: &str, key: &str| toml_value.get(section).and_then(|s| s.get(key));

        let str_or = |section: &str, key: &str, fallback: &str| -> anyhow::Result<String> {
            match get(section, key) {
                None => Ok(fallback.to_string()),
                Some(value) => value
                    .as_str()
                    .map(str::to_string)
                    .ok_or_else(|| anyhow::anyhow!("{section}.{key} must be a string")),
            }
        };
        let u64_opt = |section: &str, key: &str| -> anyhow::Result<Option<u64>> {
            match get(section, key) {
                None => Ok(None),
                Some(value) => value
                    .as_integer()
                    .and_then(|v| u64::try_from(v).ok())
                    .map(Some)
                    .ok_or_else(|| anyhow::anyhow!("{section}.{key} must be a non-negative integer")),
            }
        };

        Ok(Self {
            storage: StorageConfig {
                data_dir: PathBuf::from(str_or("storage", "data_dir", "")?),
                secure_backend: str_or("storage", "secure_backend", "auto")?.parse()?,
                keyring_service: str_or(
                    "storage",
                    "keyring_service",
                    &defaults.storage.keyring_service,
                )?,
            },
            guard: GuardTiming {
                debounce_ms: u64_opt("guard", "debounce_ms")?
                    .unwrap_or(defaults.guard.debounce_ms),
                navigating_latch_ms: u64_opt("guard", "navigating_latch_ms")?
                    .unwrap_or(defaults.guard.navigating_latch_ms),
            },
            hydration: HydrationConfig {
                timeout_ms: u64_opt("hydration", "timeout_ms")?,
            },
            api: ApiConfig {
                base_url: str_or("api", "base_url", &defaults.api.base_url)?,
            },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_document_yields_defaults() {
        let value: toml::Value = toml::from_str("").unwrap();
        let config = AppConfig::from_toml(&value).unwrap();
        assert_eq!(config, AppConfig::default());
        assert_eq!(config.guard.debounce_ms, 100);
        assert_eq!(config.guard.navigating_latch_ms, 1_000);
        assert!(config.hydration.timeout_ms.is_none());
    }

    #[test]
    fn all_sections_are_mapped() {
        let value: toml::Value = toml::from_str(
            r#"
            [storage]
            data_dir = "/tmp/fittrack"
            secure_backend = "file"
            keyring_service = "FitTrackDev"

            [guard]
            debounce_ms = 50
            navigating_latch_ms = 500

            [hydration]
            timeout_ms = 3000

            [api]
            base_url = "https://api.example.com"
            "#,
        )
        .unwrap();

        let config = AppConfig::from_toml(&value).unwrap();
        assert_eq!(config.storage.data_dir, PathBuf::from("/tmp/fittrack"));
        assert_eq!(config.storage.secure_backend, SecureBackendKind::File);
        assert_eq!(config.storage.keyring_service, "FitTrackDev");
        assert_eq!(config.guard.debounce_ms, 50);
        assert_eq!(config.guard.navigating_latch_ms, 500);
        assert_eq!(config.hydration.timeout_ms, Some(3_000));
        assert_eq!(config.api.base_url, "https://api.example.com");
    }

    #[test]
    fn unknown_backend_is_rejected() {
        let value: toml::Value = toml::from_str("[storage]\nsecure_backend = \"floppy\"").unwrap();
        assert!(AppConfig::from_toml(&value).is_err());
    }

    #[test]
    fn negative_timeout_is_rejected() {
        let value: toml::Value = toml::from_str("[hydration]\ntimeout_ms = -1").unwrap();
        assert!(AppConfig::from_toml(&value).is_err());
    }
}
