use std::sync::Arc;

use crate::config::ServiceConfig;
use crate::translator::TranslationBackend;

/// Shared handler state: the startup configuration and the provider client.
/// Both are read-only after construction, so handlers share them without
/// locking.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<ServiceConfig>,
    pub translator: Arc<dyn TranslationBackend>,
}

impl AppState {
    pub fn new(config: ServiceConfig, translator: Arc<dyn TranslationBackend>) -> Self {
        Self {
            config: Arc::new(config),
            translator,
        }
    }
}
