//! Configuration service implementation.
//!
//! Loads `FocusConfig` from `config.toml` and caches it for the lifetime of
//! the process.

use std::path::PathBuf;
use std::sync::{Arc, PoisonError, RwLock};

use focuslock_core::config::FocusConfig;
use focuslock_core::error::Result;

use crate::paths::FocusPaths;
use crate::storage::AtomicTomlFile;

/// Configuration service that loads and caches the root configuration.
#[derive(Debug, Clone)]
pub struct ConfigService {
    paths: FocusPaths,
    config: Arc<RwLock<Option<FocusConfig>>>,
}

impl ConfigService {
    /// Creates a service reading from the given paths. Nothing is read until
    /// the first `get_config` call.
    pub fn new(paths: FocusPaths) -> Self {
        Self {
            paths,
            config: Arc::new(RwLock::new(None)),
        }
    }

    /// Gets the configuration, loading it from file if not cached.
    ///
    /// A missing file is created with defaults. A malformed file is logged
    /// and the defaults are used instead.
    pub fn get_config(&self) -> FocusConfig {
        {
            let cached = self.config.read().unwrap_or_else(PoisonError::into_inner);
            if let Some(config) = cached.as_ref() {
                return config.clone();
            }
        }

        let loaded = self.load_config().unwrap_or_else(|e| {
            tracing::warn!("[ConfigService] Falling back to default configuration: {}", e);
            FocusConfig::default()
        });

        let mut cached = self.config.write().unwrap_or_else(PoisonError::into_inner);
        *cached = Some(loaded.clone());
        loaded
    }

    /// Invalidates the cache, forcing a reload on next access.
    pub fn invalidate_cache(&self) {
        let mut cached = self.config.write().unwrap_or_else(PoisonError::into_inner);
        *cached = None;
    }

    /// Directory holding document records, honouring the config override.
    pub fn documents_dir(&self) -> Result<PathBuf> {
        match self.get_config().storage.documents_dir {
            Some(dir) => Ok(dir),
            None => Ok(self.paths.documents_dir()?),
        }
    }

    pub fn paths(&self) -> &FocusPaths {
        &self.paths
    }

    fn load_config(&self) -> Result<FocusConfig> {
        let path = self.paths.config_file()?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let file = AtomicTomlFile::<FocusConfig>::new(path);

        match file.load()? {
            Some(config) => Ok(config),
            None => {
                let config = FocusConfig::default();
                file.save(&config)?;
                tracing::info!(
                    "[ConfigService] Wrote default configuration to {:?}",
                    file.path()
                );
                Ok(config)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_missing_file_is_created_with_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let service = ConfigService::new(FocusPaths::new(Some(temp_dir.path())));

        let config = service.get_config();
        assert_eq!(config, FocusConfig::default());
        assert!(temp_dir.path().join("config.toml").exists());
    }

    #[test]
    fn test_reads_existing_file() {
        let temp_dir = TempDir::new().unwrap();
        std::fs::write(
            temp_dir.path().join("config.toml"),
            "[autosave]\ndelay_ms = 750\n\n[storage]\ndocuments_dir = \"/srv/writing\"\n",
        )
        .unwrap();
        let service = ConfigService::new(FocusPaths::new(Some(temp_dir.path())));

        assert_eq!(service.get_config().autosave.delay_ms, 750);
        assert_eq!(
            service.documents_dir().unwrap(),
            PathBuf::from("/srv/writing")
        );
    }

    #[test]
    fn test_malformed_file_falls_back_to_defaults() {
        let temp_dir = TempDir::new().unwrap();
        std::fs::write(temp_dir.path().join("config.toml"), "[autosave\n").unwrap();
        let service = ConfigService::new(FocusPaths::new(Some(temp_dir.path())));

        assert_eq!(service.get_config(), FocusConfig::default());
        assert_eq!(
            service.documents_dir().unwrap(),
            temp_dir.path().join("documents")
        );
    }

    #[test]
    fn test_cache_and_invalidate() {
        let temp_dir = TempDir::new().unwrap();
        let service = ConfigService::new(FocusPaths::new(Some(temp_dir.path())));
        assert_eq!(service.get_config().autosave.delay_ms, 2000);

        std::fs::write(
            temp_dir.path().join("config.toml"),
            "[autosave]\ndelay_ms = 10\n",
        )
        .unwrap();
        assert_eq!(service.get_config().autosave.delay_ms, 2000);

        service.invalidate_cache();
        assert_eq!(service.get_config().autosave.delay_ms, 10);
    }
}
