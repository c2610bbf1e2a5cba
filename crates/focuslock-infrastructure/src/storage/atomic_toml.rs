//! Atomic TOML record files.
//!
//! Every write goes to a sibling tmp file, is fsynced, then renamed over the
//! target, so a reader only ever sees the previous or the new record.

use serde::{Serialize, de::DeserializeOwned};
use std::fs::{self, File, OpenOptions};
use std::io::{ErrorKind, Write as IoWrite};
use std::marker::PhantomData;
use std::path::{Path, PathBuf};
use thiserror::Error;

use focuslock_core::FocusError;

/// Errors that can occur during atomic TOML operations.
#[derive(Debug, Error)]
pub enum AtomicTomlError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("TOML serialization error: {0}")]
    Serialize(#[from] toml::ser::Error),
    #[error("Lock error: {0}")]
    Lock(String),
}

impl From<AtomicTomlError> for FocusError {
    fn from(err: AtomicTomlError) -> Self {
        match err {
            AtomicTomlError::Io(e) => e.into(),
            AtomicTomlError::Parse(e) => e.into(),
            AtomicTomlError::Serialize(e) => e.into(),
            AtomicTomlError::Lock(message) => FocusError::storage(message),
        }
    }
}

/// A handle to a single TOML record on disk.
///
/// Provides:
/// - **Atomicity**: tmp file + rename
/// - **Isolation**: an exclusive `flock` on a sibling `.<name>.lock` file
///   around each write, honoured across processes (unix only; elsewhere
///   writers are not serialized beyond the rename)
/// - **Durability**: fsync before rename
///
/// The lock file is never deleted. Removing it while another writer waits
/// on it would let a third writer lock a fresh inode concurrently.
pub struct AtomicTomlFile<T> {
    path: PathBuf,
    _phantom: PhantomData<T>,
}

impl<T> AtomicTomlFile<T>
where
    T: Serialize + DeserializeOwned,
{
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            _phantom: PhantomData,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Loads and deserializes the record.
    ///
    /// # Returns
    ///
    /// - `Ok(Some(T))`: Successfully loaded and deserialized
    /// - `Ok(None)`: File doesn't exist or is empty
    /// - `Err`: Failed to read or parse the file
    pub fn load(&self) -> Result<Option<T>, AtomicTomlError> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        if content.trim().is_empty() {
            return Ok(None);
        }

        Ok(Some(toml::from_str(&content)?))
    }

    /// Serializes `data` and atomically replaces the record.
    ///
    /// Serialization happens before anything touches the disk, so a value
    /// that cannot be encoded leaves the old record in place.
    pub fn save(&self, data: &T) -> Result<(), AtomicTomlError> {
        let toml_string = toml::to_string_pretty(data)?;

        let _lock = FileLock::acquire(&self.path)?;

        let tmp_path = self.temp_path()?;
        let result = Self::write_and_sync(&tmp_path, toml_string.as_bytes())
            .and_then(|()| fs::rename(&tmp_path, &self.path));

        if let Err(e) = result {
            // Best effort: never leave a stray tmp file next to the records.
            let _ = fs::remove_file(&tmp_path);
            return Err(e.into());
        }

        Ok(())
    }

    /// Removes the record. A missing file is not an error.
    pub fn remove(&self) -> Result<(), AtomicTomlError> {
        let _lock = FileLock::acquire(&self.path)?;
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    fn write_and_sync(path: &Path, bytes: &[u8]) -> std::io::Result<()> {
        let mut tmp_file = File::create(path)?;
        tmp_file.write_all(bytes)?;
        tmp_file.sync_all()
    }

    fn temp_path(&self) -> Result<PathBuf, AtomicTomlError> {
        sibling_path(&self.path, "tmp")
    }
}

/// Hidden sibling `.<file name>.<suffix>` of `path`.
fn sibling_path(path: &Path, suffix: &str) -> Result<PathBuf, AtomicTomlError> {
    let parent = path.parent().ok_or_else(|| {
        std::io::Error::new(ErrorKind::InvalidInput, "Path has no parent directory")
    })?;
    let file_name = path
        .file_name()
        .ok_or_else(|| std::io::Error::new(ErrorKind::InvalidInput, "Path has no file name"))?;

    Ok(parent.join(format!(".{}.{}", file_name.to_string_lossy(), suffix)))
}

/// An exclusive lock held until the guard is dropped and the handle closes.
struct FileLock {
    #[allow(dead_code)]
    file: File,
}

impl FileLock {
    fn acquire(path: &Path) -> Result<Self, AtomicTomlError> {
        let lock_path = sibling_path(path, "lock")?;

        let file = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(false)
            .open(&lock_path)?;

        #[cfg(unix)]
        {
            use fs2::FileExt;
            file.lock_exclusive()
                .map_err(|e| AtomicTomlError::Lock(format!("Failed to acquire lock: {}", e)))?;
        }

        Ok(FileLock { file })
    }
}
