//! Message automation service
//!
//! Rule and template CRUD, and planning: turning a property's active rules
//! into `scheduled_messages` rows for one reservation.

use std::collections::HashSet;

use chrono::Utc;
use stay_core::automation::{parse_timezone, plan, ReservationTimeline, SchedulePlan};
use stay_core::entities::{
    MessageRule, MessageTemplate, Property, Reservation, ReservationStatus, RoomUnit,
    ScheduledMessage, ScheduledMessageStatus, TemplateContext,
};
use stay_core::Capabilities;
use stay_common::PortalConfig;
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;
use validator::Validate;

use crate::dto::{
    parse_clock_time, CreateMessageRuleRequest, CreateMessageTemplateRequest,
    MessageRuleResponse, MessageTemplateResponse, PlanSummaryResponse, ScheduledMessageResponse,
    UpdateMessageRuleRequest, UpdateMessageTemplateRequest,
};

use super::context::ServiceContext;
use super::error::{ServiceError, ServiceResult};
use super::permission::{Actor, PermissionService};

/// Placeholder values for a reservation's messages
pub fn template_context(
    reservation: &Reservation,
    property: &Property,
    unit: Option<&RoomUnit>,
    portal: &PortalConfig,
) -> TemplateContext {
    let wifi = match unit {
        Some(unit) => unit.effective_wifi(property),
        None => stay_core::WifiCredentials {
            ssid: property.wifi_ssid.clone(),
            password: property.wifi_password.clone(),
        },
    };

    TemplateContext {
        guest_name: reservation.booking_name.clone(),
        property_name: property.name.clone(),
        check_in_date: reservation.check_in_date.to_string(),
        check_out_date: reservation.check_out_date.to_string(),
        portal_url: Some(portal.guest_url(&reservation.guest_token)),
        room_number: unit.map(|u| u.unit_number.clone()),
        wifi_ssid: wifi.ssid,
        wifi_password: wifi.password,
    }
}

/// Automation service
pub struct AutomationService<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> AutomationService<'a> {
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    // ========================================================================
    // Planning
    // ========================================================================

    /// Re-plan a reservation on behalf of staff
    #[instrument(skip(self))]
    pub async fn plan_for_reservation(
        &self,
        actor: &Actor,
        reservation_id: Uuid,
    ) -> ServiceResult<PlanSummaryResponse> {
        actor.require(Capabilities::MANAGE_MESSAGING)?;
        let (reservation, property) = PermissionService::new(self.ctx)
            .require_reservation(actor, reservation_id)
            .await?;
        self.replan(&reservation, &property).await
    }

    /// Cancel the reservation's pending rows and plan every active rule of
    /// its property again.
    ///
    /// Rules that already produced a sent or failed row are left alone so a
    /// booking change never re-sends a message. A rule whose earlier row was
    /// skipped is planned again only when its new time is still ahead.
    #[instrument(skip(self, reservation, property), fields(reservation_id = %reservation.id))]
    pub async fn replan(
        &self,
        reservation: &Reservation,
        property: &Property,
    ) -> ServiceResult<PlanSummaryResponse> {
        let scheduled_repo = self.ctx.scheduled_message_repo();

        let mut summary = PlanSummaryResponse {
            reservation_id: reservation.id,
            cancelled: scheduled_repo
                .cancel_pending_for_reservation(reservation.id)
                .await?,
            ..PlanSummaryResponse::default()
        };

        if matches!(
            reservation.status,
            ReservationStatus::Cancelled | ReservationStatus::NoShow
        ) {
            debug!(status = %reservation.status, "Reservation inactive, nothing planned");
            return Ok(summary);
        }

        let existing = scheduled_repo.list_by_reservation(reservation.id).await?;
        let finished: HashSet<Uuid> = existing
            .iter()
            .filter(|s| {
                matches!(
                    s.status,
                    ScheduledMessageStatus::Sent | ScheduledMessageStatus::Failed
                )
            })
            .map(|s| s.rule_id)
            .collect();
        let skipped_before: HashSet<Uuid> = existing
            .iter()
            .filter(|s| s.status == ScheduledMessageStatus::Skipped)
            .map(|s| s.rule_id)
            .collect();

        let rules = self
            .ctx
            .message_rule_repo()
            .list_by_property(property.id, true)
            .await?;

        let timeline = ReservationTimeline::new(reservation, property);
        let now = Utc::now();
        let mut rows = Vec::new();

        for rule in rules.iter().filter(|r| !finished.contains(&r.id)) {
            let tz_name = rule.timezone.as_deref().unwrap_or(&property.timezone);
            let decision = parse_timezone(tz_name).and_then(|tz| plan(rule, &timeline, tz, now));

            match decision {
                Ok(SchedulePlan::At(run_at)) => {
                    rows.push(ScheduledMessage::new(
                        reservation.id,
                        rule.id,
                        rule.template_id,
                        run_at,
                        ScheduledMessageStatus::Pending,
                    ));
                    summary.scheduled += 1;
                }
                Ok(SchedulePlan::Skipped(_)) if skipped_before.contains(&rule.id) => {}
                Ok(SchedulePlan::Skipped(run_at)) => {
                    rows.push(ScheduledMessage::new(
                        reservation.id,
                        rule.id,
                        rule.template_id,
                        run_at,
                        ScheduledMessageStatus::Skipped,
                    ));
                    summary.skipped += 1;
                }
                Ok(SchedulePlan::Drop) => summary.dropped += 1,
                Err(e) => {
                    warn!(rule_id = %rule.id, error = %e, "Rule could not be planned");
                    summary.dropped += 1;
                }
            }
        }

        scheduled_repo.insert_many(&rows).await?;

        info!(
            cancelled = summary.cancelled,
            scheduled = summary.scheduled,
            skipped = summary.skipped,
            dropped = summary.dropped,
            "Messages planned"
        );
        Ok(summary)
    }

    /// Scheduled rows of a reservation
    #[instrument(skip(self))]
    pub async fn list_scheduled(
        &self,
        actor: &Actor,
        reservation_id: Uuid,
    ) -> ServiceResult<Vec<ScheduledMessageResponse>> {
        actor.require(Capabilities::MANAGE_MESSAGING)?;
        PermissionService::new(self.ctx)
            .require_reservation(actor, reservation_id)
            .await?;

        let rows = self
            .ctx
            .scheduled_message_repo()
            .list_by_reservation(reservation_id)
            .await?;
        Ok(rows.iter().map(ScheduledMessageResponse::from).collect())
    }

    /// Cancel one pending row
    #[instrument(skip(self))]
    pub async fn cancel_scheduled(
        &self,
        actor: &Actor,
        scheduled_id: Uuid,
    ) -> ServiceResult<ScheduledMessageResponse> {
        actor.require(Capabilities::MANAGE_MESSAGING)?;

        let repo = self.ctx.scheduled_message_repo();
        let row = repo
            .find_by_id(scheduled_id)
            .await?
            .ok_or_else(|| ServiceError::not_found("ScheduledMessage", scheduled_id.to_string()))?;
        PermissionService::new(self.ctx)
            .require_reservation(actor, row.reservation_id)
            .await?;

        if !row.is_pending() {
            return Err(ServiceError::conflict(format!(
                "scheduled message is already {}",
                row.status
            )));
        }
        repo.cancel(scheduled_id).await?;

        let row = repo
            .find_by_id(scheduled_id)
            .await?
            .ok_or_else(|| ServiceError::not_found("ScheduledMessage", scheduled_id.to_string()))?;

        info!(scheduled_id = %scheduled_id, "Scheduled message cancelled");
        Ok(ScheduledMessageResponse::from(&row))
    }

    // ========================================================================
    // Rules
    // ========================================================================

    async fn load_rule(&self, actor: &Actor, rule_id: Uuid) -> ServiceResult<MessageRule> {
        let rule = self
            .ctx
            .message_rule_repo()
            .find_by_id(rule_id)
            .await?
            .ok_or_else(|| ServiceError::not_found("MessageRule", rule_id.to_string()))?;
        PermissionService::new(self.ctx)
            .require_property(actor, rule.property_id)
            .await?;
        Ok(rule)
    }

    /// A rule may use a shared template or one of its own property
    async fn check_template_for(&self, template_id: Uuid, property_id: Uuid) -> ServiceResult<()> {
        let template = self
            .ctx
            .message_template_repo()
            .find_by_id(template_id)
            .await?
            .ok_or_else(|| ServiceError::not_found("MessageTemplate", template_id.to_string()))?;

        match template.property_id {
            Some(owner) if owner != property_id => Err(ServiceError::validation(
                "template belongs to another property",
            )),
            _ => Ok(()),
        }
    }

    #[instrument(skip(self))]
    pub async fn list_rules(
        &self,
        actor: &Actor,
        property_id: Uuid,
    ) -> ServiceResult<Vec<MessageRuleResponse>> {
        actor.require(Capabilities::MANAGE_MESSAGING)?;
        PermissionService::new(self.ctx)
            .require_property(actor, property_id)
            .await?;

        let rules = self
            .ctx
            .message_rule_repo()
            .list_by_property(property_id, false)
            .await?;
        Ok(rules.iter().map(MessageRuleResponse::from).collect())
    }

    #[instrument(skip(self))]
    pub async fn get_rule(&self, actor: &Actor, rule_id: Uuid) -> ServiceResult<MessageRuleResponse> {
        actor.require(Capabilities::MANAGE_MESSAGING)?;
        Ok(MessageRuleResponse::from(self.load_rule(actor, rule_id).await?))
    }

    #[instrument(skip(self, request))]
    pub async fn create_rule(
        &self,
        actor: &Actor,
        property_id: Uuid,
        request: CreateMessageRuleRequest,
    ) -> ServiceResult<MessageRuleResponse> {
        actor.require(Capabilities::MANAGE_MESSAGING)?;
        request.validate()?;
        PermissionService::new(self.ctx)
            .require_property(actor, property_id)
            .await?;
        self.check_template_for(request.template_id, property_id)
            .await?;

        let mut rule = MessageRule::new(
            property_id,
            request.template_id,
            request.name,
            request.rule_type,
        );
        rule.delay_minutes = request.delay_minutes;
        rule.days = request.days;
        rule.hours = request.hours;
        rule.at_time = request
            .at_time
            .as_deref()
            .map(|t| parse_clock_time("atTime", t))
            .transpose()?;
        rule.backfill = request.backfill;
        if let Some(tz) = request.timezone {
            parse_timezone(&tz)?;
            rule.timezone = Some(tz);
        }
        rule.is_active = request.is_active;
        rule.validate()?;

        self.ctx.message_rule_repo().create(&rule).await?;

        info!(rule_id = %rule.id, rule_type = %rule.rule_type, "Message rule created");
        Ok(MessageRuleResponse::from(rule))
    }

    /// Update a rule. Pending rows created from it are cancelled; they are
    /// re-created the next time the reservation is planned.
    #[instrument(skip(self, request))]
    pub async fn update_rule(
        &self,
        actor: &Actor,
        rule_id: Uuid,
        request: UpdateMessageRuleRequest,
    ) -> ServiceResult<MessageRuleResponse> {
        actor.require(Capabilities::MANAGE_MESSAGING)?;
        request.validate()?;
        let mut rule = self.load_rule(actor, rule_id).await?;

        if let Some(template_id) = request.template_id {
            self.check_template_for(template_id, rule.property_id).await?;
            rule.template_id = template_id;
        }
        if let Some(name) = request.name {
            rule.name = name;
        }
        if let Some(rule_type) = request.rule_type {
            rule.rule_type = rule_type;
        }
        if let Some(minutes) = request.delay_minutes {
            rule.delay_minutes = Some(minutes);
        }
        if let Some(days) = request.days {
            rule.days = Some(days);
        }
        if let Some(hours) = request.hours {
            rule.hours = Some(hours);
        }
        if let Some(t) = request.at_time.as_deref() {
            rule.at_time = Some(parse_clock_time("atTime", t)?);
        }
        if let Some(backfill) = request.backfill {
            rule.backfill = backfill;
        }
        if let Some(tz) = request.timezone {
            parse_timezone(&tz)?;
            rule.timezone = Some(tz);
        }
        if let Some(active) = request.is_active {
            rule.is_active = active;
        }
        rule.validate()?;
        rule.updated_at = Utc::now();

        self.ctx.message_rule_repo().update(&rule).await?;
        let cancelled = self
            .ctx
            .scheduled_message_repo()
            .cancel_pending_for_rule(rule_id)
            .await?;

        info!(rule_id = %rule_id, cancelled, "Message rule updated");
        Ok(MessageRuleResponse::from(rule))
    }

    #[instrument(skip(self))]
    pub async fn delete_rule(&self, actor: &Actor, rule_id: Uuid) -> ServiceResult<()> {
        actor.require(Capabilities::MANAGE_MESSAGING)?;
        self.load_rule(actor, rule_id).await?;

        self.ctx
            .scheduled_message_repo()
            .cancel_pending_for_rule(rule_id)
            .await?;
        self.ctx.message_rule_repo().delete(rule_id).await?;

        info!(rule_id = %rule_id, "Message rule deleted");
        Ok(())
    }

    // ========================================================================
    // Templates
    // ========================================================================

    /// Shared templates are managed by admins; property templates by
    /// whoever may access the property
    async fn check_template_access(&self, actor: &Actor, property_id: Option<Uuid>) -> ServiceResult<()> {
        match property_id {
            Some(id) => {
                PermissionService::new(self.ctx)
                    .require_property(actor, id)
                    .await?;
                Ok(())
            }
            None => actor.require(Capabilities::ALL_PROPERTIES),
        }
    }

    async fn load_template(&self, template_id: Uuid) -> ServiceResult<MessageTemplate> {
        self.ctx
            .message_template_repo()
            .find_by_id(template_id)
            .await?
            .ok_or_else(|| ServiceError::not_found("MessageTemplate", template_id.to_string()))
    }

    /// Templates of a property plus the shared ones. Without a property,
    /// admins get everything and owners the shared templates.
    #[instrument(skip(self))]
    pub async fn list_templates(
        &self,
        actor: &Actor,
        property_id: Option<Uuid>,
    ) -> ServiceResult<Vec<MessageTemplateResponse>> {
        actor.require(Capabilities::MANAGE_MESSAGING)?;
        if let Some(id) = property_id {
            PermissionService::new(self.ctx)
                .require_property(actor, id)
                .await?;
        }

        let templates = self.ctx.message_template_repo().list(property_id).await?;
        let see_all = property_id.is_some() || actor.can(Capabilities::ALL_PROPERTIES);
        Ok(templates
            .iter()
            .filter(|t| see_all || t.property_id.is_none())
            .map(MessageTemplateResponse::from)
            .collect())
    }

    #[instrument(skip(self))]
    pub async fn get_template(
        &self,
        actor: &Actor,
        template_id: Uuid,
    ) -> ServiceResult<MessageTemplateResponse> {
        actor.require(Capabilities::MANAGE_MESSAGING)?;
        let template = self.load_template(template_id).await?;
        if let Some(property_id) = template.property_id {
            PermissionService::new(self.ctx)
                .require_property(actor, property_id)
                .await?;
        }
        Ok(MessageTemplateResponse::from(template))
    }

    #[instrument(skip(self, request))]
    pub async fn create_template(
        &self,
        actor: &Actor,
        request: CreateMessageTemplateRequest,
    ) -> ServiceResult<MessageTemplateResponse> {
        actor.require(Capabilities::MANAGE_MESSAGING)?;
        request.validate()?;
        self.check_template_access(actor, request.property_id).await?;

        let mut template = MessageTemplate::new(request.property_id, request.name, request.body);
        template.subject = request.subject;
        if let Some(language) = request.language {
            template.language = language;
        }

        self.ctx.message_template_repo().create(&template).await?;

        info!(template_id = %template.id, "Message template created");
        Ok(MessageTemplateResponse::from(template))
    }

    #[instrument(skip(self, request))]
    pub async fn update_template(
        &self,
        actor: &Actor,
        template_id: Uuid,
        request: UpdateMessageTemplateRequest,
    ) -> ServiceResult<MessageTemplateResponse> {
        actor.require(Capabilities::MANAGE_MESSAGING)?;
        request.validate()?;
        let mut template = self.load_template(template_id).await?;
        self.check_template_access(actor, template.property_id).await?;

        if let Some(name) = request.name {
            template.name = name;
        }
        if let Some(subject) = request.subject {
            template.subject = Some(subject);
        }
        if let Some(body) = request.body {
            template.body = body;
        }
        if let Some(language) = request.language {
            template.language = language;
        }
        if let Some(active) = request.is_active {
            template.is_active = active;
        }
        template.updated_at = Utc::now();

        self.ctx.message_template_repo().update(&template).await?;

        info!(template_id = %template_id, "Message template updated");
        Ok(MessageTemplateResponse::from(template))
    }

    #[instrument(skip(self))]
    pub async fn delete_template(&self, actor: &Actor, template_id: Uuid) -> ServiceResult<()> {
        actor.require(Capabilities::MANAGE_MESSAGING)?;
        let template = self.load_template(template_id).await?;
        self.check_template_access(actor, template.property_id).await?;

        self.ctx.message_template_repo().delete(template_id).await?;

        info!(template_id = %template_id, "Message template deleted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn portal() -> PortalConfig {
        PortalConfig {
            public_base_url: "https://stay.example.com/".to_string(),
            default_timezone: "Asia/Tokyo".to_string(),
        }
    }

    fn fixtures() -> (Reservation, Property) {
        let mut property = Property::new("Villa Sakura".to_string(), None, "Asia/Tokyo".to_string());
        property.wifi_ssid = Some("sakura-guest".to_string());
        property.wifi_password = Some("welcome".to_string());

        let reservation = Reservation::new(
            property.id,
            "Anna Smith".to_string(),
            NaiveDate::from_ymd_opt(2024, 3, 5).unwrap(),
            NaiveDate::from_ymd_opt(2024, 3, 8).unwrap(),
            "abcdefghijklmnopqrstuvwxyz".to_string(),
        );
        (reservation, property)
    }

    #[test]
    fn test_template_context_without_unit_uses_property_wifi() {
        let (reservation, property) = fixtures();
        let ctx = template_context(&reservation, &property, None, &portal());

        assert_eq!(ctx.guest_name, "Anna Smith");
        assert_eq!(ctx.check_in_date, "2024-03-05");
        assert_eq!(
            ctx.portal_url.as_deref(),
            Some("https://stay.example.com/guest/abcdefghijklmnopqrstuvwxyz")
        );
        assert_eq!(ctx.room_number, None);
        assert_eq!(ctx.wifi_ssid.as_deref(), Some("sakura-guest"));
    }

    #[test]
    fn test_template_context_with_unit_override() {
        let (reservation, property) = fixtures();
        let mut unit = RoomUnit::new(Uuid::new_v4(), "201".to_string());
        unit.wifi_ssid = Some("room-201".to_string());
        unit.wifi_password = Some("secret201".to_string());

        let ctx = template_context(&reservation, &property, Some(&unit), &portal());
        assert_eq!(ctx.room_number.as_deref(), Some("201"));
        assert_eq!(ctx.wifi_ssid.as_deref(), Some("room-201"));

        let template = MessageTemplate::new(
            None,
            "Arrival".to_string(),
            "Hi {{guest_name}}, room {{room_number}}, wifi {{wifi_ssid}} / {{wifi_password}}"
                .to_string(),
        );
        assert_eq!(
            template.render(&ctx),
            "Hi Anna Smith, room 201, wifi room-201 / secret201"
        );
    }
}
