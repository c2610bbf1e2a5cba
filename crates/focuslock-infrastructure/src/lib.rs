//! Infrastructure layer for focuslock: file-backed document storage,
//! configuration loading, platform paths and network gate adapters.

pub mod config_service;
pub mod dto;
pub mod file_document_store;
pub mod network_gate;
pub mod paths;
pub mod storage;

pub use crate::config_service::ConfigService;
pub use crate::file_document_store::FileDocumentStore;
pub use crate::network_gate::{NoopNetworkGate, SystemNetworkGate, network_gate_from_config};
pub use crate::paths::FocusPaths;
