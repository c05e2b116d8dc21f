//! State shared by every gateway connection task

use crate::broadcast::EventDispatcher;
use crate::connection::ConnectionManager;
use stay_service::ServiceContext;
use std::sync::Arc;

#[derive(Clone)]
pub struct GatewayState {
    services: Arc<ServiceContext>,
    connections: Arc<ConnectionManager>,
    dispatcher: Arc<EventDispatcher>,
}

impl GatewayState {
    /// The dispatcher must route into the same `connections` registry.
    pub fn new(
        services: ServiceContext,
        connections: Arc<ConnectionManager>,
        dispatcher: Arc<EventDispatcher>,
    ) -> Self {
        Self {
            services: Arc::new(services),
            connections,
            dispatcher,
        }
    }

    /// Token checks and thread authorization
    pub fn service_context(&self) -> &ServiceContext {
        &self.services
    }

    pub fn connection_manager(&self) -> &ConnectionManager {
        &self.connections
    }

    pub fn shared_connection_manager(&self) -> Arc<ConnectionManager> {
        Arc::clone(&self.connections)
    }

    /// Redis subscriptions for the threads sessions follow
    pub fn event_dispatcher(&self) -> &EventDispatcher {
        &self.dispatcher
    }

    pub fn shared_event_dispatcher(&self) -> Arc<EventDispatcher> {
        Arc::clone(&self.dispatcher)
    }
}

impl std::fmt::Debug for GatewayState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GatewayState")
            .field("connections", &self.connections.connection_count())
            .field("threads", &self.connections.thread_count())
            .finish_non_exhaustive()
    }
}
