use std::sync::Arc;

use crate::adapters::storage::LocalStorage;
use crate::config::ServerConfig;
use crate::core::registry::{Registry, SharedRegistry};

pub struct State {
    pub registry: SharedRegistry,
    pub config: ServerConfig,
    pub downloads: Option<LocalStorage>,
}

impl State {
    pub fn new(config: ServerConfig) -> Arc<Self> {
        Self::with_registry(config, Registry::shared())
    }

    pub fn with_registry(config: ServerConfig, registry: SharedRegistry) -> Arc<Self> {
        let downloads = config.downloads_dir.as_ref().map(LocalStorage::new);

        Arc::new(Self {
            registry,
            config,
            downloads,
        })
    }
}
