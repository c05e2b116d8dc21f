//! Shared state handed to every Axum handler

use std::sync::Arc;

use stay_common::AppConfig;
use stay_service::ServiceContext;

/// Cheap to clone; both halves sit behind `Arc`.
#[derive(Clone)]
pub struct AppState {
    services: Arc<ServiceContext>,
    config: Arc<AppConfig>,
}

impl AppState {
    pub fn new(services: ServiceContext, config: AppConfig) -> Self {
        Self {
            services: Arc::new(services),
            config: Arc::new(config),
        }
    }

    /// Repositories, Redis and JWT service used by the handlers
    pub fn service_context(&self) -> &ServiceContext {
        &self.services
    }

    /// Owned handle for the message dispatcher task
    pub fn shared_context(&self) -> Arc<ServiceContext> {
        Arc::clone(&self.services)
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("env", &self.config.app.env)
            .finish_non_exhaustive()
    }
}
