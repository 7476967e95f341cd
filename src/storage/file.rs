use std::fs::{self, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::thread;
use std::time::{Duration, Instant};

use parking_lot::Mutex;
use serde_json::{Map, Value};
use tracing::{error, info, warn};

use super::RecordStore;
use crate::errors::{PocketlinkError, Result};

const LOCK_TIMEOUT: Duration = Duration::from_secs(5);
const LOCK_RETRY_INTERVAL: Duration = Duration::from_millis(5);
// 持锁进程崩溃后遗留的锁文件
const LOCK_STALE_AFTER: Duration = Duration::from_secs(30);

/// Keeps every key in one JSON document on disk.
///
/// Nothing is cached: every read parses the file, every mutation re-reads it
/// inside the critical section, applies the change and replaces the file with
/// a rename. Mutations are serialized within the process by a mutex and
/// across processes by a `<file>.lock` sibling created with `create_new`.
pub struct FileStore {
    file_path: PathBuf,
    lock_path: PathBuf,
    write_lock: Mutex<()>,
}

impl FileStore {
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file_path = path.as_ref().to_path_buf();
        Self::ensure_parent(&file_path)?;

        let store = Self {
            lock_path: sibling(&file_path, "lock"),
            file_path,
            write_lock: Mutex::new(()),
        };

        let entries = store.with_document(|document| {
            if document.is_none() {
                info!(
                    "Store file not found, creating empty store at {}",
                    store.file_path.display()
                );
                return Ok((0, true));
            }
            Ok((document.as_ref().map_or(0, Map::len), false))
        })?;
        info!(
            "FileStore initialized from {} with {} keys",
            store.file_path.display(),
            entries
        );

        Ok(store)
    }

    pub fn path(&self) -> &Path {
        &self.file_path
    }

    /// Runs `mutate` on a fresh copy of the document while holding both
    /// locks. The second element of the returned tuple says whether the
    /// document has to be written back. A missing file is passed as `None`.
    fn with_document<R, F>(&self, mutate: F) -> Result<R>
    where
        F: FnOnce(&mut Option<Map<String, Value>>) -> Result<(R, bool)>,
    {
        let _local = self.write_lock.lock();
        let _file_lock = LockFile::acquire(&self.lock_path)?;

        let mut document = Self::read_document(&self.file_path)?;
        let (output, dirty) = mutate(&mut document)?;
        if dirty {
            let document = document.unwrap_or_default();
            Self::write_document(&self.file_path, &document)?;
        }

        Ok(output)
    }

    fn read_document(path: &Path) -> Result<Option<Map<String, Value>>> {
        match fs::read_to_string(path) {
            Ok(content) => match serde_json::from_str::<Value>(&content) {
                Ok(Value::Object(map)) => Ok(Some(map)),
                Ok(_) => Err(PocketlinkError::serialization(format!(
                    "Store file {} does not contain a JSON object",
                    path.display()
                ))),
                Err(e) => {
                    error!("Failed to parse store file {}: {}", path.display(), e);
                    Err(PocketlinkError::serialization(format!(
                        "Failed to parse store file {}: {}",
                        path.display(),
                        e
                    )))
                }
            },
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(PocketlinkError::store_failure(format!(
                "Failed to read store file {}: {}",
                path.display(),
                e
            ))),
        }
    }

    fn ensure_parent(path: &Path) -> Result<()> {
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
            && !parent.exists()
        {
            fs::create_dir_all(parent).map_err(|e| {
                PocketlinkError::store_failure(format!(
                    "Failed to create directory {}: {}",
                    parent.display(),
                    e
                ))
            })?;
        }
        Ok(())
    }

    /// Writes to `<file>.tmp` and renames it over the store file, so readers
    /// never see a half-written document.
    fn write_document(path: &Path, entries: &Map<String, Value>) -> Result<()> {
        let json = serde_json::to_string_pretty(entries)?;
        let tmp_path = sibling(path, "tmp");

        fs::write(&tmp_path, json)
            .and_then(|_| fs::rename(&tmp_path, path))
            .map_err(|e| {
                let _ = fs::remove_file(&tmp_path);
                PocketlinkError::store_failure(format!(
                    "Failed to write store file {}: {}",
                    path.display(),
                    e
                ))
            })
    }
}

impl RecordStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<Value>> {
        Ok(Self::read_document(&self.file_path)?.and_then(|mut document| document.remove(key)))
    }

    fn set(&self, key: &str, value: &Value) -> Result<()> {
        self.with_document(|document| {
            document
                .get_or_insert_with(Map::new)
                .insert(key.to_string(), value.clone());
            Ok(((), true))
        })
    }

    fn remove(&self, key: &str) -> Result<()> {
        self.with_document(|document| {
            let removed = document.as_mut().and_then(|d| d.remove(key)).is_some();
            Ok(((), removed))
        })
    }

    fn update(
        &self,
        key: &str,
        apply: &mut dyn FnMut(Option<Value>) -> Result<Value>,
    ) -> Result<()> {
        self.with_document(|document| {
            let current = document.as_ref().and_then(|d| d.get(key).cloned());
            let next = apply(current)?;
            document
                .get_or_insert_with(Map::new)
                .insert(key.to_string(), next);
            Ok(((), true))
        })
    }

    fn backend_name(&self) -> &'static str {
        "file"
    }
}

fn sibling(path: &Path, extension: &str) -> PathBuf {
    let mut name = path.as_os_str().to_owned();
    name.push(".");
    name.push(extension);
    PathBuf::from(name)
}

/// Exclusive lock held while the lock file exists. Removed on drop.
struct LockFile {
    path: PathBuf,
}

impl LockFile {
    fn acquire(path: &Path) -> Result<Self> {
        let deadline = Instant::now() + LOCK_TIMEOUT;

        loop {
            match OpenOptions::new().write(true).create_new(true).open(path) {
                Ok(mut file) => {
                    let _ = write!(file, "{}", std::process::id());
                    return Ok(Self {
                        path: path.to_path_buf(),
                    });
                }
                Err(e) if e.kind() == ErrorKind::AlreadyExists => {
                    if Self::is_stale(path) {
                        warn!("Removing stale store lock {}", path.display());
                        let _ = fs::remove_file(path);
                        continue;
                    }
                    if Instant::now() >= deadline {
                        return Err(PocketlinkError::store_failure(format!(
                            "Timed out waiting for store lock {}",
                            path.display()
                        )));
                    }
                    thread::sleep(LOCK_RETRY_INTERVAL);
                }
                Err(e) => {
                    return Err(PocketlinkError::store_failure(format!(
                        "Failed to create store lock {}: {}",
                        path.display(),
                        e
                    )));
                }
            }
        }
    }

    fn is_stale(path: &Path) -> bool {
        fs::metadata(path)
            .and_then(|m| m.modified())
            .ok()
            .and_then(|modified| modified.elapsed().ok())
            .is_some_and(|age| age > LOCK_STALE_AFTER)
    }
}

impl Drop for LockFile {
    fn drop(&mut self) {
        let _ = fs::remove_file(&self.path);
    }
}
