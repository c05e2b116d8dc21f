//! Thread, message and delivery mappers

use stay_core::entities::{Message, MessageDelivery, MessageThread};
use stay_core::DomainError;

use super::parse_column;
use crate::models::{MessageDeliveryModel, MessageModel, MessageThreadModel};

impl From<MessageThreadModel> for MessageThread {
    fn from(model: MessageThreadModel) -> Self {
        MessageThread {
            id: model.id,
            reservation_id: model.reservation_id,
            property_id: model.property_id,
            last_message_at: model.last_message_at,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}

impl TryFrom<MessageModel> for Message {
    type Error = DomainError;

    fn try_from(model: MessageModel) -> Result<Self, Self::Error> {
        Ok(Message {
            id: model.id,
            thread_id: model.thread_id,
            sender_role: parse_column("messages.sender_role", &model.sender_role)?,
            sender_id: model.sender_id,
            content: model.content,
            scheduled_message_id: model.scheduled_message_id,
            read_at: model.read_at,
            created_at: model.created_at,
            updated_at: model.updated_at,
        })
    }
}

impl TryFrom<MessageDeliveryModel> for MessageDelivery {
    type Error = DomainError;

    fn try_from(model: MessageDeliveryModel) -> Result<Self, Self::Error> {
        Ok(MessageDelivery {
            id: model.id,
            message_id: model.message_id,
            channel: parse_column("message_deliveries.channel", &model.channel)?,
            status: parse_column("message_deliveries.status", &model.status)?,
            error: model.error,
            attempted_at: model.attempted_at,
            delivered_at: model.delivered_at,
        })
    }
}
