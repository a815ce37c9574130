use khmedia_core::Config;
use khmedia_infra::AdminAccessGuard;
use khmedia_services::MediaService;
use std::sync::Arc;

/// Shared application state handed to every handler.
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub media: MediaService,
    pub guard: Arc<AdminAccessGuard>,
}

impl AppState {
    pub fn new(config: Config, media: MediaService, guard: Arc<AdminAccessGuard>) -> Self {
        Self {
            config,
            media,
            guard,
        }
    }

    pub fn admin_prefix(&self) -> String {
        self.config.admin.path_prefix()
    }
}
