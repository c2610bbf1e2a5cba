//! Composition root for the CLI.

use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use focuslock_application::SessionController;
use focuslock_core::document::DocumentRepository;
use focuslock_core::network::NetworkGate;
use focuslock_infrastructure::{
    ConfigService, FileDocumentStore, FocusPaths, network_gate_from_config,
};

pub struct App {
    pub paths: FocusPaths,
    config_service: ConfigService,
}

/// Resolves paths without touching the disk, so logging can be installed
/// before anything is loaded.
pub fn bootstrap(data_dir: Option<&Path>) -> Result<App> {
    let paths = FocusPaths::new(data_dir);
    let config_service = ConfigService::new(paths.clone());
    Ok(App {
        paths,
        config_service,
    })
}

impl App {
    /// Loads configuration and documents and wires the session controller.
    ///
    /// The gate is returned as well so the process can wait for its last
    /// command before exiting.
    pub fn into_controller(self) -> Result<(SessionController, Arc<dyn NetworkGate>)> {
        let config = self.config_service.get_config();
        let documents_dir = self
            .config_service
            .documents_dir()
            .context("Failed to resolve documents directory")?;

        tracing::info!("[Bootstrap] Opening document store at {:?}", documents_dir);
        let store: Arc<dyn DocumentRepository> = Arc::new(
            FileDocumentStore::open(&documents_dir)
                .with_context(|| format!("Failed to open document store at {:?}", documents_dir))?,
        );
        let network_gate = network_gate_from_config(&config.network);

        let controller =
            SessionController::new(store, Arc::clone(&network_gate), config.autosave);
        Ok((controller, network_gate))
    }
}
