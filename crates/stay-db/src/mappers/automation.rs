//! Message rule, template and scheduled message mappers

use stay_core::entities::{MessageRule, MessageTemplate, ScheduledMessage};
use stay_core::DomainError;

use super::parse_column;
use crate::models::{MessageRuleModel, MessageTemplateModel, ScheduledMessageModel};

impl TryFrom<MessageRuleModel> for MessageRule {
    type Error = DomainError;

    fn try_from(model: MessageRuleModel) -> Result<Self, Self::Error> {
        Ok(MessageRule {
            id: model.id,
            property_id: model.property_id,
            template_id: model.template_id,
            name: model.name,
            rule_type: parse_column("message_rules.rule_type", &model.rule_type)?,
            delay_minutes: model.delay_minutes,
            days: model.days,
            hours: model.hours,
            at_time: model.at_time,
            backfill: parse_column("message_rules.backfill", &model.backfill)?,
            timezone: model.timezone,
            is_active: model.is_active,
            created_at: model.created_at,
            updated_at: model.updated_at,
        })
    }
}

impl From<MessageTemplateModel> for MessageTemplate {
    fn from(model: MessageTemplateModel) -> Self {
        MessageTemplate {
            id: model.id,
            property_id: model.property_id,
            name: model.name,
            subject: model.subject,
            body: model.body,
            language: model.language,
            is_active: model.is_active,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}

impl TryFrom<ScheduledMessageModel> for ScheduledMessage {
    type Error = DomainError;

    fn try_from(model: ScheduledMessageModel) -> Result<Self, Self::Error> {
        Ok(ScheduledMessage {
            id: model.id,
            reservation_id: model.reservation_id,
            rule_id: model.rule_id,
            template_id: model.template_id,
            run_at: model.run_at,
            status: parse_column("scheduled_messages.status", &model.status)?,
            attempts: model.attempts,
            last_error: model.last_error,
            sent_at: model.sent_at,
            message_id: model.message_id,
            created_at: model.created_at,
            updated_at: model.updated_at,
        })
    }
}
