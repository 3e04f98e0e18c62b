use crate::config::ServerConfig;
use crate::registry::ConnectionManager;
use std::path::PathBuf;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// Open WebSocket sessions
    pub connections: ConnectionManager,
    pub test_page_path: PathBuf,
}

impl AppState {
    pub fn new(config: &ServerConfig) -> Self {
        Self {
            connections: ConnectionManager::new(),
            test_page_path: config.test_page_path.clone(),
        }
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new(&ServerConfig::default())
    }
}
