use std::sync::Arc;

use crate::auth::TokenService;
use crate::config::AppConfig;
use crate::database::Store;
use crate::media::MediaStorage;

/// Shared handles passed to every handler
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub store: Arc<dyn Store>,
    pub tokens: TokenService,
    pub media: MediaStorage,
}

impl AppState {
    pub fn new(config: AppConfig, store: Arc<dyn Store>) -> Self {
        let tokens = TokenService::from_config(&config.security);
        let media = MediaStorage::from_config(&config.media);
        Self {
            config: Arc::new(config),
            store,
            tokens,
            media,
        }
    }
}
