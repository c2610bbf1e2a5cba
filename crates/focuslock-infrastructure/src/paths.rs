//! Unified path management for focuslock files.
//!
//! # Directory Structure
//!
//! ```text
//! ~/.config/focuslock/          # Config directory
//! └── config.toml               # Application configuration
//!
//! ~/.local/share/focuslock/     # Data directory
//! ├── documents/                # One <uuid>.toml record per document
//! └── logs/                     # focuslock.log.YYYY-MM-DD
//! ```
//!
//! Tests and `--data-dir` style overrides pass an explicit base directory,
//! in which case every path lives under that base instead.

use std::path::{Path, PathBuf};
use thiserror::Error;

use focuslock_core::FocusError;

const APP_DIR: &str = "focuslock";

/// Errors that can occur during path resolution.
#[derive(Debug, Error)]
pub enum PathError {
    /// The platform has no config/data directory for this user.
    #[error("Cannot determine the {0} directory for this platform")]
    PlatformDirNotFound(&'static str),
}

impl From<PathError> for FocusError {
    fn from(err: PathError) -> Self {
        FocusError::config(err.to_string())
    }
}

/// Resolves every location focuslock reads from or writes to.
#[derive(Debug, Clone, Default)]
pub struct FocusPaths {
    base_dir: Option<PathBuf>,
}

impl FocusPaths {
    /// Creates a resolver. `None` uses the platform directories.
    pub fn new(base_dir: Option<&Path>) -> Self {
        Self {
            base_dir: base_dir.map(Path::to_path_buf),
        }
    }

    pub fn config_dir(&self) -> Result<PathBuf, PathError> {
        match &self.base_dir {
            Some(base) => Ok(base.to_path_buf()),
            None => dirs::config_dir()
                .map(|dir| dir.join(APP_DIR))
                .ok_or(PathError::PlatformDirNotFound("config")),
        }
    }

    pub fn data_dir(&self) -> Result<PathBuf, PathError> {
        match &self.base_dir {
            Some(base) => Ok(base.to_path_buf()),
            None => dirs::data_dir()
                .map(|dir| dir.join(APP_DIR))
                .ok_or(PathError::PlatformDirNotFound("data")),
        }
    }

    pub fn config_file(&self) -> Result<PathBuf, PathError> {
        Ok(self.config_dir()?.join("config.toml"))
    }

    /// Default location of document records, used when the config does not
    /// override it.
    pub fn documents_dir(&self) -> Result<PathBuf, PathError> {
        Ok(self.data_dir()?.join("documents"))
    }

    pub fn logs_dir(&self) -> Result<PathBuf, PathError> {
        Ok(self.data_dir()?.join("logs"))
    }
}
