//! Guest chat
//!
//! One thread per reservation. Every insert or read-receipt update is
//! published to Redis so the realtime gateway can push it to subscribers.

use chrono::Utc;
use stay_core::entities::{Message, MessageThread, Reservation, SenderRole};
use stay_core::traits::{MessageQuery, PageRequest};
use stay_core::{Capabilities, MessageEvent};
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;
use validator::Validate;

use crate::dto::{
    MarkReadResponse, MessageListQuery, MessageResponse, PostMessageRequest, ThreadResponse,
};

use super::context::ServiceContext;
use super::error::{ServiceError, ServiceResult};
use super::permission::{Actor, PermissionService};

/// Build a history query, clamping the page size
pub fn history_query(query: &MessageListQuery) -> MessageQuery {
    MessageQuery {
        before: query.before,
        limit: query
            .limit
            .unwrap_or(PageRequest::DEFAULT_LIMIT)
            .clamp(1, PageRequest::MAX_LIMIT),
    }
}

/// Messaging service
pub struct MessagingService<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> MessagingService<'a> {
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    async fn publish(&self, property_id: Uuid, event: MessageEvent) {
        if let Err(e) = self
            .ctx
            .publisher()
            .publish_message_event(property_id, &event)
            .await
        {
            warn!(message_id = %event.record().id, error = %e, "Failed to publish message event");
        }
    }

    // ========================================================================
    // Shared by host, guest and automation
    // ========================================================================

    /// The reservation's thread, created on first use
    #[instrument(skip(self, reservation), fields(reservation_id = %reservation.id))]
    pub async fn thread_for(&self, reservation: &Reservation) -> ServiceResult<MessageThread> {
        Ok(self
            .ctx
            .thread_repo()
            .get_or_create(reservation.id, reservation.property_id)
            .await?)
    }

    /// Thread history, oldest first
    pub async fn history(
        &self,
        thread: &MessageThread,
        query: &MessageListQuery,
    ) -> ServiceResult<Vec<MessageResponse>> {
        let messages = self
            .ctx
            .message_repo()
            .list_by_thread(thread.id, history_query(query))
            .await?;
        Ok(messages.iter().map(MessageResponse::from).collect())
    }

    /// Store a message, bump the thread and publish the insert
    #[instrument(skip(self, thread, message), fields(thread_id = %thread.id, role = %message.sender_role))]
    pub async fn deliver(&self, thread: &MessageThread, message: Message) -> ServiceResult<Message> {
        Message::validate_content(&message.content)?;

        self.ctx.message_repo().create(&message).await?;
        self.ctx
            .thread_repo()
            .touch(thread.id, message.created_at)
            .await?;
        self.publish(thread.property_id, MessageEvent::inserted(&message))
            .await;

        debug!(message_id = %message.id, "Message stored");
        Ok(message)
    }

    /// Mark what `reader` has not read yet and publish each update
    #[instrument(skip(self, thread), fields(thread_id = %thread.id))]
    pub async fn mark_read(
        &self,
        thread: &MessageThread,
        reader: SenderRole,
    ) -> ServiceResult<MarkReadResponse> {
        let updated = self
            .ctx
            .message_repo()
            .mark_read(thread.id, reader, Utc::now())
            .await?;

        for message in &updated {
            self.publish(thread.property_id, MessageEvent::updated(message))
                .await;
        }
        Ok(MarkReadResponse {
            updated: updated.len(),
        })
    }

    /// Post an automated message into the reservation's thread
    #[instrument(skip(self, reservation, content), fields(reservation_id = %reservation.id))]
    pub async fn post_system_message(
        &self,
        reservation: &Reservation,
        content: String,
        scheduled_message_id: Uuid,
    ) -> ServiceResult<Message> {
        let thread = self.thread_for(reservation).await?;
        self.deliver(&thread, Message::automated(thread.id, content, scheduled_message_id))
            .await
    }

    /// Post as the guest of a reservation
    pub async fn post_as_guest(
        &self,
        reservation: &Reservation,
        request: PostMessageRequest,
    ) -> ServiceResult<MessageResponse> {
        request.validate()?;
        let thread = self.thread_for(reservation).await?;
        let message = Message::new(thread.id, SenderRole::Guest, None, request.content);
        let message = self.deliver(&thread, message).await?;

        info!(thread_id = %thread.id, message_id = %message.id, "Guest message posted");
        Ok(MessageResponse::from(&message))
    }

    // ========================================================================
    // Host side
    // ========================================================================

    /// Thread `thread_id`, if `actor` may read it
    pub async fn load_thread(&self, actor: &Actor, thread_id: Uuid) -> ServiceResult<MessageThread> {
        actor.require(Capabilities::MANAGE_MESSAGING)?;
        let thread = self
            .ctx
            .thread_repo()
            .find_by_id(thread_id)
            .await?
            .ok_or_else(|| ServiceError::not_found("MessageThread", thread_id.to_string()))?;
        PermissionService::new(self.ctx)
            .require_property(actor, thread.property_id)
            .await?;
        Ok(thread)
    }

    /// Thread of a reservation, created if missing
    #[instrument(skip(self))]
    pub async fn reservation_thread(
        &self,
        actor: &Actor,
        reservation_id: Uuid,
    ) -> ServiceResult<ThreadResponse> {
        actor.require(Capabilities::MANAGE_MESSAGING)?;
        let (reservation, _) = PermissionService::new(self.ctx)
            .require_reservation(actor, reservation_id)
            .await?;
        Ok(ThreadResponse::from(self.thread_for(&reservation).await?))
    }

    /// Inbox of a property, most recent activity first
    #[instrument(skip(self))]
    pub async fn list_threads(
        &self,
        actor: &Actor,
        property_id: Uuid,
        page: PageRequest,
    ) -> ServiceResult<Vec<ThreadResponse>> {
        actor.require(Capabilities::MANAGE_MESSAGING)?;
        PermissionService::new(self.ctx)
            .require_property(actor, property_id)
            .await?;

        let threads = self
            .ctx
            .thread_repo()
            .list_by_property(property_id, page)
            .await?;
        Ok(threads.iter().map(ThreadResponse::from).collect())
    }

    #[instrument(skip(self))]
    pub async fn list_messages(
        &self,
        actor: &Actor,
        thread_id: Uuid,
        query: MessageListQuery,
    ) -> ServiceResult<Vec<MessageResponse>> {
        let thread = self.load_thread(actor, thread_id).await?;
        self.history(&thread, &query).await
    }

    #[instrument(skip(self, request))]
    pub async fn post_as_host(
        &self,
        actor: &Actor,
        thread_id: Uuid,
        request: PostMessageRequest,
    ) -> ServiceResult<MessageResponse> {
        request.validate()?;
        let thread = self.load_thread(actor, thread_id).await?;

        let message = Message::new(
            thread.id,
            SenderRole::Host,
            Some(actor.user_id),
            request.content,
        );
        let message = self.deliver(&thread, message).await?;

        info!(thread_id = %thread_id, message_id = %message.id, "Host message posted");
        Ok(MessageResponse::from(&message))
    }

    #[instrument(skip(self))]
    pub async fn mark_read_as_host(
        &self,
        actor: &Actor,
        thread_id: Uuid,
    ) -> ServiceResult<MarkReadResponse> {
        let thread = self.load_thread(actor, thread_id).await?;
        self.mark_read(&thread, SenderRole::Host).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_history_query_defaults() {
        let query = history_query(&MessageListQuery::default());
        assert_eq!(query.limit, PageRequest::DEFAULT_LIMIT);
        assert!(query.before.is_none());
    }

    #[test]
    fn test_history_query_clamps_limit() {
        let query = history_query(&MessageListQuery {
            before: None,
            limit: Some(10_000),
        });
        assert_eq!(query.limit, PageRequest::MAX_LIMIT);

        let query = history_query(&MessageListQuery {
            before: None,
            limit: Some(0),
        });
        assert_eq!(query.limit, 1);
    }
}
