use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use ft_core::ports::{CacheError, KeyValueCachePort};
use tracing::warn;

type Entries = BTreeMap<String, String>;

/// Key/value cache persisted as a single JSON object file.
///
/// The whole file is loaded at open and served from memory. Every mutation
/// rewrites the file through a temp file + rename; the in-memory map only
/// changes after the write lands.
#[derive(Debug)]
pub struct FileKeyValueCache {
    path: PathBuf,
    entries: Mutex<Entries>,
}

impl FileKeyValueCache {
    /// Open (or lazily create) the cache file at `path`.
    ///
    /// A corrupt file is moved aside to `<path>.corrupt` and the cache starts empty.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, CacheError> {
        let path = path.into();
        let entries = match fs::read_to_string(&path) {
            Ok(content) => match serde_json::from_str::<Entries>(&content) {
                Ok(entries) => entries,
                Err(err) => {
                    warn!(path = %path.display(), error = %err, "cache file corrupt, starting empty");
                    let aside = path.with_extension("json.corrupt");
                    if let Err(err) = fs::rename(&path, &aside) {
                        warn!(error = %err, "failed to move corrupt cache file aside");
                    }
                    Entries::new()
                }
            },
            Err(err) if err.kind() == io::ErrorKind::NotFound => Entries::new(),
            Err(err) => return Err(io_error("read cache file", &path, err)),
        };

        Ok(Self {
            path,
            entries: Mutex::new(entries),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, Entries>, CacheError> {
        self.entries
            .lock()
            .map_err(|_| CacheError::Other("file cache lock poisoned".into()))
    }

    /// Apply `mutate` to a copy, persist it, then commit it to memory.
    fn mutate(&self, mutate: impl FnOnce(&mut Entries)) -> Result<(), CacheError> {
        let mut guard = self.lock()?;
        let mut next = guard.clone();
        mutate(&mut next);
        if next == *guard {
            return Ok(());
        }
        self.atomic_write(&next)?;
        *guard = next;
        Ok(())
    }

    fn atomic_write(&self, entries: &Entries) -> Result<(), CacheError> {
        if let Some(dir) = self.path.parent() {
            fs::create_dir_all(dir).map_err(|err| io_error("create cache dir", dir, err))?;
        }

        let content = serde_json::to_string(entries)
            .map_err(|err| CacheError::Corrupt(format!("serialize cache: {err}")))?;

        let tmp_path = self.path.with_extension("json.tmp");
        fs::write(&tmp_path, content).map_err(|err| io_error("write temp cache", &tmp_path, err))?;
        fs::rename(&tmp_path, &self.path)
            .map_err(|err| io_error("rename temp cache", &self.path, err))
    }
}

fn io_error(action: &str, path: &Path, err: io::Error) -> CacheError {
    CacheError::Io(format!("{action} failed ({}): {err}", path.display()))
}

impl KeyValueCachePort for FileKeyValueCache {
    fn get(&self, key: &str) -> Result<Option<String>, CacheError> {
        Ok(self.lock()?.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), CacheError> {
        self.mutate(|entries| {
            entries.insert(key.to_string(), value.to_string());
        })
    }

    fn remove(&self, key: &str) -> Result<(), CacheError> {
        self.mutate(|entries| {
            entries.remove(key);
        })
    }

    fn keys(&self) -> Result<Vec<String>, CacheError> {
        Ok(self.lock()?.keys().cloned().collect())
    }

    fn clear(&self) -> Result<(), CacheError> {
        self.mutate(Entries::clear)
    }

    fn remove_prefix(&self, prefix: &str) -> Result<(), CacheError> {
        self.mutate(|entries| entries.retain(|key, _| !key.starts_with(prefix)))
    }
}
