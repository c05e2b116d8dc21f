//! Scheduled message dispatcher
//!
//! Polls `scheduled_messages` for due rows, renders their template and
//! posts the result into the reservation's chat thread as a system
//! message. Rows are claimed with a lease (`FOR UPDATE SKIP LOCKED`), so
//! several API processes can run a dispatcher each without sending a row
//! twice.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use stay_common::SchedulerConfig;
use stay_core::entities::{
    DeliveryChannel, MessageDelivery, ReservationStatus, ScheduledMessage,
};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{interval, MissedTickBehavior};
use tracing::{debug, error, info, instrument, warn};

use crate::services::automation::template_context;
use crate::services::{MessagingService, ServiceContext, ServiceResult};

/// Counts from one dispatch pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DispatchSummary {
    pub claimed: usize,
    pub sent: usize,
    pub skipped: usize,
    pub failed: usize,
}

/// What happened to a single claimed row
#[derive(Debug)]
enum Outcome {
    Sent,
    Skipped(&'static str),
}

/// Background dispatcher for automated guest messages
pub struct MessageDispatcher {
    ctx: Arc<ServiceContext>,
    config: SchedulerConfig,
}

impl MessageDispatcher {
    pub fn new(ctx: Arc<ServiceContext>, config: SchedulerConfig) -> Self {
        Self { ctx, config }
    }

    /// Spawn the polling loop; it exits when `shutdown` flips to `true`
    pub fn spawn(self, shutdown: watch::Receiver<bool>) -> JoinHandle<()> {
        tokio::spawn(async move {
            self.run(shutdown).await;
        })
    }

    async fn run(&self, mut shutdown: watch::Receiver<bool>) {
        let period = Duration::from_secs(self.config.interval_secs.max(1));
        info!(
            interval = ?period,
            batch_size = self.config.batch_size,
            lease_secs = self.config.lease_secs,
            "Starting message dispatcher"
        );

        let mut ticker = interval(period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    match self.run_once().await {
                        Ok(summary) if summary.claimed > 0 => {
                            info!(
                                claimed = summary.claimed,
                                sent = summary.sent,
                                skipped = summary.skipped,
                                failed = summary.failed,
                                "Dispatch pass finished"
                            );
                        }
                        Ok(_) => debug!("No scheduled messages due"),
                        Err(e) => error!(error = %e, "Dispatch pass failed"),
                    }
                }
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        info!("Message dispatcher stopped");
                        return;
                    }
                }
            }
        }
    }

    /// Claim and process one batch of due rows
    pub async fn run_once(&self) -> ServiceResult<DispatchSummary> {
        let repo = self.ctx.scheduled_message_repo();
        let claimed = repo
            .claim_due(Utc::now(), self.config.batch_size, self.config.lease_secs)
            .await?;

        let mut summary = DispatchSummary {
            claimed: claimed.len(),
            ..DispatchSummary::default()
        };

        for row in claimed {
            match self.dispatch(&row).await {
                Ok(Outcome::Sent) => summary.sent += 1,
                Ok(Outcome::Skipped(reason)) => {
                    repo.mark_skipped(row.id, reason).await?;
                    summary.skipped += 1;
                }
                Err(e) => {
                    let give_up = row.attempts >= ScheduledMessage::MAX_ATTEMPTS;
                    warn!(
                        scheduled_id = %row.id,
                        attempts = row.attempts,
                        give_up,
                        error = %e,
                        "Scheduled message failed"
                    );
                    repo.mark_failed(row.id, &e.to_string(), give_up).await?;
                    summary.failed += 1;
                }
            }
        }

        Ok(summary)
    }

    #[instrument(skip(self, row), fields(scheduled_id = %row.id, reservation_id = %row.reservation_id))]
    async fn dispatch(&self, row: &ScheduledMessage) -> ServiceResult<Outcome> {
        let Some(reservation) = self
            .ctx
            .reservation_repo()
            .find_by_id(row.reservation_id)
            .await?
        else {
            return Ok(Outcome::Skipped("reservation no longer exists"));
        };
        if matches!(
            reservation.status,
            ReservationStatus::Cancelled | ReservationStatus::NoShow
        ) {
            return Ok(Outcome::Skipped("reservation is not active"));
        }

        let Some(template) = self
            .ctx
            .message_template_repo()
            .find_by_id(row.template_id)
            .await?
            .filter(|t| t.is_active)
        else {
            return Ok(Outcome::Skipped("template unavailable"));
        };

        let Some(property) = self
            .ctx
            .property_repo()
            .find_by_id(reservation.property_id)
            .await?
        else {
            return Ok(Outcome::Skipped("property no longer exists"));
        };

        let unit = match reservation.room_unit_id {
            Some(unit_id) => self.ctx.room_unit_repo().find_by_id(unit_id).await?,
            None => None,
        };

        let ctx = template_context(&reservation, &property, unit.as_ref(), self.ctx.portal());
        let content = template.render(&ctx);

        let message = MessagingService::new(&self.ctx)
            .post_system_message(&reservation, content, row.id)
            .await?;

        let now = Utc::now();
        if let Err(e) = self
            .ctx
            .delivery_repo()
            .create(&MessageDelivery::delivered(message.id, DeliveryChannel::InApp, now))
            .await
        {
            warn!(message_id = %message.id, error = %e, "Failed to record delivery");
        }
        self.ctx
            .scheduled_message_repo()
            .mark_sent(row.id, message.id, now)
            .await?;

        info!(message_id = %message.id, template_id = %template.id, "Scheduled message sent");
        Ok(Outcome::Sent)
    }
}

impl std::fmt::Debug for MessageDispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MessageDispatcher")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

