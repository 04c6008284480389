//! Shared application state for the engine API.

use std::sync::Arc;

use crate::config::ConfigLoader;

/// Shared application state.
///
/// Configuration is loaded once at startup and shared read-only across
/// request handlers.
#[derive(Clone)]
pub struct AppState {
    /// The loaded engine configuration.
    config: Arc<ConfigLoader>,
}

impl AppState {
    /// Creates a new application state with the given configuration loader.
    pub fn new(config: ConfigLoader) -> Self {
        Self {
            config: Arc::new(config),
        }
    }

    /// Returns a reference to the configuration loader.
    pub fn config(&self) -> &ConfigLoader {
        &self.config
    }
}
