use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use ft_core::ports::{SecureStorageError, SecureStoragePort};

/// File-based credential storage for Android, development or headless environments.
///
/// 基于文件的凭据存储（开发/无桌面环境回退）。
///
/// Each key is one file `<base_dir>/<key>.bin`, written atomically and
/// restricted to the owner on unix.
#[derive(Debug, Clone)]
pub struct FileSecureStorage {
    base_dir: PathBuf,
}

impl FileSecureStorage {
    /// Create file secure storage rooted at `<app_data_root>/keyring`.
    pub fn new_in_app_data_root(app_data_root: &Path) -> Result<Self, io::Error> {
        let base_dir = app_data_root.join("keyring");
        fs::create_dir_all(&base_dir)?;
        Ok(Self { base_dir })
    }

    /// Construct with a concrete base directory. The directory must exist.
    pub fn with_base_dir(base_dir: PathBuf) -> Self {
        Self { base_dir }
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    fn file_path(&self, key: &str) -> Result<PathBuf, SecureStorageError> {
        if key.is_empty() {
            return Err(SecureStorageError::Other("empty secure storage key".into()));
        }
        // Keys become file names; anything outside [A-Za-z0-9_.-] is escaped.
        let mut name = String::with_capacity(key.len());
        for ch in key.chars() {
            if ch.is_ascii_alphanumeric() || matches!(ch, '_' | '-' | '.') {
                name.push(ch);
            } else {
                name.push_str(&format!("%{:02X}", ch as u32));
            }
        }
        if name.starts_with('.') {
            name.insert(0, '_');
        }
        Ok(self.base_dir.join(format!("{name}.bin")))
    }

    fn map_io_error(context: &str, err: io::Error) -> SecureStorageError {
        match err.kind() {
            io::ErrorKind::PermissionDenied => {
                SecureStorageError::PermissionDenied(format!("{context}: {err}"))
            }
            _ => SecureStorageError::Other(format!("{context}: {err}")),
        }
    }
}

impl SecureStoragePort for FileSecureStorage {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, SecureStorageError> {
        let path = self.file_path(key)?;
        match fs::read(&path) {
            Ok(bytes) => Ok(Some(bytes)),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(err) => Err(Self::map_io_error(
                "failed to read secure storage file",
                err,
            )),
        }
    }

    fn set(&self, key: &str, value: &[u8]) -> Result<(), SecureStorageError> {
        let path = self.file_path(key)?;
        let temp_path = path.with_extension("tmp");
        fs::write(&temp_path, value)
            .map_err(|err| Self::map_io_error("failed to write secure storage temp file", err))?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            fs::set_permissions(&temp_path, fs::Permissions::from_mode(0o600)).map_err(|err| {
                Self::map_io_error("failed to set secure storage permissions", err)
            })?;
        }

        fs::rename(&temp_path, &path)
            .map_err(|err| Self::map_io_error("failed to rename secure storage file", err))
    }

    fn delete(&self, key: &str) -> Result<(), SecureStorageError> {
        let path = self.file_path(key)?;
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(Self::map_io_error(
                "failed to delete secure storage file",
                err,
            )),
        }
    }
}
