//! Application data directory resolution.

use std::path::{Path, PathBuf};

const APP_DIR_NAME: &str = "fittrack";

#[derive(Debug, thiserror::Error)]
pub enum AppDirsError {
    #[error("platform data-local directory is unavailable")]
    DataLocalDirUnavailable,
}

/// `fittrack`, or `fittrack-<profile>` when `FT_PROFILE` is set, so several
/// profiles can run side by side on one machine.
fn resolved_app_dir_name() -> String {
    match std::env::var("FT_PROFILE") {
        Ok(profile) if !profile.is_empty() => format!("{APP_DIR_NAME}-{profile}"),
        _ => APP_DIR_NAME.to_string(),
    }
}

/// Resolve the root directory for the cache file and the file-based keyring.
///
/// A non-empty `configured` path wins. Otherwise the platform data-local
/// directory joined with the app dir name is used.
pub fn resolve_app_data_root(configured: &Path) -> Result<PathBuf, AppDirsError> {
    resolve_with_base(configured, dirs::data_local_dir())
}

fn resolve_with_base(configured: &Path, base: Option<PathBuf>) -> Result<PathBuf, AppDirsError> {
    if !configured.as_os_str().is_empty() {
        return Ok(configured.to_path_buf());
    }
    let base = base.ok_or(AppDirsError::DataLocalDirUnavailable)?;
    Ok(base.join(resolved_app_dir_name()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    static FT_PROFILE_ENV_LOCK: Mutex<()> = Mutex::new(());

    fn with_ft_profile<T>(value: Option<&str>, f: impl FnOnce() -> T) -> T {
        let _guard = FT_PROFILE_ENV_LOCK.lock().unwrap();
        let previous = std::env::var("FT_PROFILE").ok();

        match value {
            Some(profile) => std::env::set_var("FT_PROFILE", profile),
            None => std::env::remove_var("FT_PROFILE"),
        }

        let result = f();

        match previous {
            Some(profile) => std::env::set_var("FT_PROFILE", profile),
            None => std::env::remove_var("FT_PROFILE"),
        }

        result
    }

    #[test]
    fn configured_dir_wins() {
        let root = resolve_with_base(Path::new("/srv/ft"), Some(PathBuf::from("/tmp"))).unwrap();
        assert_eq!(root, PathBuf::from("/srv/ft"));
    }

    #[test]
    fn empty_config_appends_app_dir_name() {
        with_ft_profile(None, || {
            let root = resolve_with_base(Path::new(""), Some(PathBuf::from("/tmp"))).unwrap();
            assert_eq!(root, PathBuf::from("/tmp/fittrack"));
        });
    }

    #[test]
    fn profiles_get_isolated_dirs() {
        let a = with_ft_profile(Some("a"), || {
            resolve_with_base(Path::new(""), Some(PathBuf::from("/tmp"))).unwrap()
        });
        let b = with_ft_profile(Some("b"), || {
            resolve_with_base(Path::new(""), Some(PathBuf::from("/tmp"))).unwrap()
        });
        assert_eq!(a, PathBuf::from("/tmp/fittrack-a"));
        assert_eq!(b, PathBuf::from("/tmp/fittrack-b"));
    }

    #[test]
    fn missing_platform_dir_is_an_error() {
        assert!(matches!(
            resolve_with_base(Path::new(""), None),
            Err(AppDirsError::DataLocalDirUnavailable)
        ));
    }
}
