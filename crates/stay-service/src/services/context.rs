//! Service context - dependency container for services
//!
//! Holds all repositories, the pub/sub publisher, and other dependencies
//! needed by services.

use std::sync::Arc;

use stay_cache::{Publisher, RedisPool};
use stay_common::{JwtService, PortalConfig};
use stay_core::traits::{
    CleaningTaskRepository, GuestServiceRepository, MessageDeliveryRepository, MessageRepository,
    MessageRuleRepository, MessageTemplateRepository, MessageThreadRepository,
    PropertyRepository, ReservationRepository, ReservationServiceRepository, RoomTypeRepository,
    RoomUnitRepository, ScheduledMessageRepository, UserRepository,
};
use stay_db::{
    PgCleaningTaskRepository, PgGuestServiceRepository, PgMessageDeliveryRepository,
    PgMessageRepository, PgMessageRuleRepository, PgMessageTemplateRepository,
    PgMessageThreadRepository, PgPool, PgPropertyRepository, PgReservationRepository,
    PgReservationServiceRepository, PgRoomTypeRepository, PgRoomUnitRepository,
    PgScheduledMessageRepository, PgUserRepository,
};

use super::error::{ServiceError, ServiceResult};

/// Service context containing all dependencies
///
/// This is the main dependency container that gets passed to all services.
/// It provides access to:
/// - Database repositories
/// - Redis pub/sub for message events
/// - JWT service for verifying staff tokens
/// - Guest portal settings (public URL, default timezone)
#[derive(Clone)]
pub struct ServiceContext {
    // Database pool
    pool: PgPool,

    // Redis pool
    redis_pool: RedisPool,

    // Repositories
    property_repo: Arc<dyn PropertyRepository>,
    room_type_repo: Arc<dyn RoomTypeRepository>,
    room_unit_repo: Arc<dyn RoomUnitRepository>,
    reservation_repo: Arc<dyn ReservationRepository>,
    cleaning_task_repo: Arc<dyn CleaningTaskRepository>,
    user_repo: Arc<dyn UserRepository>,
    message_rule_repo: Arc<dyn MessageRuleRepository>,
    message_template_repo: Arc<dyn MessageTemplateRepository>,
    scheduled_message_repo: Arc<dyn ScheduledMessageRepository>,
    thread_repo: Arc<dyn MessageThreadRepository>,
    message_repo: Arc<dyn MessageRepository>,
    delivery_repo: Arc<dyn MessageDeliveryRepository>,
    guest_service_repo: Arc<dyn GuestServiceRepository>,
    reservation_service_repo: Arc<dyn ReservationServiceRepository>,

    // Pub/Sub
    publisher: Publisher,

    // Services
    jwt_service: Arc<JwtService>,
    portal: Arc<PortalConfig>,
}

impl ServiceContext {
    /// Create a new service context with all dependencies
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        pool: PgPool,
        redis_pool: RedisPool,
        property_repo: Arc<dyn PropertyRepository>,
        room_type_repo: Arc<dyn RoomTypeRepository>,
        room_unit_repo: Arc<dyn RoomUnitRepository>,
        reservation_repo: Arc<dyn ReservationRepository>,
        cleaning_task_repo: Arc<dyn CleaningTaskRepository>,
        user_repo: Arc<dyn UserRepository>,
        message_rule_repo: Arc<dyn MessageRuleRepository>,
        message_template_repo: Arc<dyn MessageTemplateRepository>,
        scheduled_message_repo: Arc<dyn ScheduledMessageRepository>,
        thread_repo: Arc<dyn MessageThreadRepository>,
        message_repo: Arc<dyn MessageRepository>,
        delivery_repo: Arc<dyn MessageDeliveryRepository>,
        guest_service_repo: Arc<dyn GuestServiceRepository>,
        reservation_service_repo: Arc<dyn ReservationServiceRepository>,
        jwt_service: Arc<JwtService>,
        portal: PortalConfig,
    ) -> Self {
        let publisher = Publisher::new(redis_pool.clone());

        Self {
            pool,
            redis_pool,
            property_repo,
            room_type_repo,
            room_unit_repo,
            reservation_repo,
            cleaning_task_repo,
            user_repo,
            message_rule_repo,
            message_template_repo,
            scheduled_message_repo,
            thread_repo,
            message_repo,
            delivery_repo,
            guest_service_repo,
            reservation_service_repo,
            publisher,
            jwt_service,
            portal: Arc::new(portal),
        }
    }

    /// Context backed by the PostgreSQL repositories
    pub fn postgres(
        pool: PgPool,
        redis_pool: RedisPool,
        jwt_service: Arc<JwtService>,
        portal: PortalConfig,
    ) -> Self {
        Self::new(
            pool.clone(),
            redis_pool,
            Arc::new(PgPropertyRepository::new(pool.clone())),
            Arc::new(PgRoomTypeRepository::new(pool.clone())),
            Arc::new(PgRoomUnitRepository::new(pool.clone())),
            Arc::new(PgReservationRepository::new(pool.clone())),
            Arc::new(PgCleaningTaskRepository::new(pool.clone())),
            Arc::new(PgUserRepository::new(pool.clone())),
            Arc::new(PgMessageRuleRepository::new(pool.clone())),
            Arc::new(PgMessageTemplateRepository::new(pool.clone())),
            Arc::new(PgScheduledMessageRepository::new(pool.clone())),
            Arc::new(PgMessageThreadRepository::new(pool.clone())),
            Arc::new(PgMessageRepository::new(pool.clone())),
            Arc::new(PgMessageDeliveryRepository::new(pool.clone())),
            Arc::new(PgGuestServiceRepository::new(pool.clone())),
            Arc::new(PgReservationServiceRepository::new(pool)),
            jwt_service,
            portal,
        )
    }

    // === Pools ===

    /// Get the PostgreSQL connection pool
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Get the Redis connection pool
    pub fn redis_pool(&self) -> &RedisPool {
        &self.redis_pool
    }

    // === Repositories ===

    pub fn property_repo(&self) -> &dyn PropertyRepository {
        self.property_repo.as_ref()
    }

    pub fn room_type_repo(&self) -> &dyn RoomTypeRepository {
        self.room_type_repo.as_ref()
    }

    pub fn room_unit_repo(&self) -> &dyn RoomUnitRepository {
        self.room_unit_repo.as_ref()
    }

    pub fn reservation_repo(&self) -> &dyn ReservationRepository {
        self.reservation_repo.as_ref()
    }

    pub fn cleaning_task_repo(&self) -> &dyn CleaningTaskRepository {
        self.cleaning_task_repo.as_ref()
    }

    pub fn user_repo(&self) -> &dyn UserRepository {
        self.user_repo.as_ref()
    }

    pub fn message_rule_repo(&self) -> &dyn MessageRuleRepository {
        self.message_rule_repo.as_ref()
    }

    pub fn message_template_repo(&self) -> &dyn MessageTemplateRepository {
        self.message_template_repo.as_ref()
    }

    pub fn scheduled_message_repo(&self) -> &dyn ScheduledMessageRepository {
        self.scheduled_message_repo.as_ref()
    }

    pub fn thread_repo(&self) -> &dyn MessageThreadRepository {
        self.thread_repo.as_ref()
    }

    pub fn message_repo(&self) -> &dyn MessageRepository {
        self.message_repo.as_ref()
    }

    pub fn delivery_repo(&self) -> &dyn MessageDeliveryRepository {
        self.delivery_repo.as_ref()
    }

    pub fn guest_service_repo(&self) -> &dyn GuestServiceRepository {
        self.guest_service_repo.as_ref()
    }

    pub fn reservation_service_repo(&self) -> &dyn ReservationServiceRepository {
        self.reservation_service_repo.as_ref()
    }

    // === Pub/Sub ===

    /// Get the Redis pub/sub publisher
    pub fn publisher(&self) -> &Publisher {
        &self.publisher
    }

    // === Settings ===

    /// Get the JWT service
    pub fn jwt_service(&self) -> &JwtService {
        self.jwt_service.as_ref()
    }

    /// Guest portal settings
    pub fn portal(&self) -> &PortalConfig {
        self.portal.as_ref()
    }
}

impl std::fmt::Debug for ServiceContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServiceContext")
            .field("pool", &"PgPool")
            .field("redis_pool", &self.redis_pool)
            .field("repositories", &"...")
            .field("portal", &self.portal)
            .finish()
    }
}

/// Builder for creating a `ServiceContext` with custom repositories
#[derive(Default)]
pub struct ServiceContextBuilder {
    pool: Option<PgPool>,
    redis_pool: Option<RedisPool>,
    property_repo: Option<Arc<dyn PropertyRepository>>,
    room_type_repo: Option<Arc<dyn RoomTypeRepository>>,
    room_unit_repo: Option<Arc<dyn RoomUnitRepository>>,
    reservation_repo: Option<Arc<dyn ReservationRepository>>,
    cleaning_task_repo: Option<Arc<dyn CleaningTaskRepository>>,
    user_repo: Option<Arc<dyn UserRepository>>,
    message_rule_repo: Option<Arc<dyn MessageRuleRepository>>,
    message_template_repo: Option<Arc<dyn MessageTemplateRepository>>,
    scheduled_message_repo: Option<Arc<dyn ScheduledMessageRepository>>,
    thread_repo: Option<Arc<dyn MessageThreadRepository>>,
    message_repo: Option<Arc<dyn MessageRepository>>,
    delivery_repo: Option<Arc<dyn MessageDeliveryRepository>>,
    guest_service_repo: Option<Arc<dyn GuestServiceRepository>>,
    reservation_service_repo: Option<Arc<dyn ReservationServiceRepository>>,
    jwt_service: Option<Arc<JwtService>>,
    portal: Option<PortalConfig>,
}

impl ServiceContextBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn pool(mut self, pool: PgPool) -> Self {
        self.pool = Some(pool);
        self
    }

    pub fn redis_pool(mut self, redis_pool: RedisPool) -> Self {
        self.redis_pool = Some(redis_pool);
        self
    }

    pub fn property_repo(mut self, repo: Arc<dyn PropertyRepository>) -> Self {
        self.property_repo = Some(repo);
        self
    }

    pub fn room_type_repo(mut self, repo: Arc<dyn RoomTypeRepository>) -> Self {
        self.room_type_repo = Some(repo);
        self
    }

    pub fn room_unit_repo(mut self, repo: Arc<dyn RoomUnitRepository>) -> Self {
        self.room_unit_repo = Some(repo);
        self
    }

    pub fn reservation_repo(mut self, repo: Arc<dyn ReservationRepository>) -> Self {
        self.reservation_repo = Some(repo);
        self
    }

    pub fn cleaning_task_repo(mut self, repo: Arc<dyn CleaningTaskRepository>) -> Self {
        self.cleaning_task_repo = Some(repo);
        self
    }

    pub fn user_repo(mut self, repo: Arc<dyn UserRepository>) -> Self {
        self.user_repo = Some(repo);
        self
    }

    pub fn message_rule_repo(mut self, repo: Arc<dyn MessageRuleRepository>) -> Self {
        self.message_rule_repo = Some(repo);
        self
    }

    pub fn message_template_repo(mut self, repo: Arc<dyn MessageTemplateRepository>) -> Self {
        self.message_template_repo = Some(repo);
        self
    }

    pub fn scheduled_message_repo(mut self, repo: Arc<dyn ScheduledMessageRepository>) -> Self {
        self.scheduled_message_repo = Some(repo);
        self
    }

    pub fn thread_repo(mut self, repo: Arc<dyn MessageThreadRepository>) -> Self {
        self.thread_repo = Some(repo);
        self
    }

    pub fn message_repo(mut self, repo: Arc<dyn MessageRepository>) -> Self {
        self.message_repo = Some(repo);
        self
    }

    pub fn delivery_repo(mut self, repo: Arc<dyn MessageDeliveryRepository>) -> Self {
        self.delivery_repo = Some(repo);
        self
    }

    pub fn guest_service_repo(mut self, repo: Arc<dyn GuestServiceRepository>) -> Self {
        self.guest_service_repo = Some(repo);
        self
    }

    pub fn reservation_service_repo(mut self, repo: Arc<dyn ReservationServiceRepository>) -> Self {
        self.reservation_service_repo = Some(repo);
        self
    }

    pub fn jwt_service(mut self, service: Arc<JwtService>) -> Self {
        self.jwt_service = Some(service);
        self
    }

    pub fn portal(mut self, portal: PortalConfig) -> Self {
        self.portal = Some(portal);
        self
    }

    /// Build the `ServiceContext`
    ///
    /// # Errors
    /// Returns `ServiceError::Validation` if any required dependency is missing
    pub fn build(self) -> ServiceResult<ServiceContext> {
        fn required<T>(value: Option<T>, name: &str) -> ServiceResult<T> {
            value.ok_or_else(|| ServiceError::validation(format!("{name} is required")))
        }

        Ok(ServiceContext::new(
            required(self.pool, "pool")?,
            required(self.redis_pool, "redis_pool")?,
            required(self.property_repo, "property_repo")?,
            required(self.room_type_repo, "room_type_repo")?,
            required(self.room_unit_repo, "room_unit_repo")?,
            required(self.reservation_repo, "reservation_repo")?,
            required(self.cleaning_task_repo, "cleaning_task_repo")?,
            required(self.user_repo, "user_repo")?,
            required(self.message_rule_repo, "message_rule_repo")?,
            required(self.message_template_repo, "message_template_repo")?,
            required(self.scheduled_message_repo, "scheduled_message_repo")?,
            required(self.thread_repo, "thread_repo")?,
            required(self.message_repo, "message_repo")?,
            required(self.delivery_repo, "delivery_repo")?,
            required(self.guest_service_repo, "guest_service_repo")?,
            required(self.reservation_service_repo, "reservation_service_repo")?,
            required(self.jwt_service, "jwt_service")?,
            required(self.portal, "portal")?,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_reports_first_missing_dependency() {
        let err = ServiceContextBuilder::new().build().unwrap_err();
        assert!(err.to_string().contains("pool is required"));
    }
}
