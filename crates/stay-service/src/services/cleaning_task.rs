//! Cleaning task service
//!
//! Managers (owners, admins) handle every task of their properties.
//! Cleaners list and progress only the tasks assigned to them.

use chrono::Utc;
use stay_core::entities::{CleaningTask, CleaningTaskStatus, Reservation};
use stay_core::traits::{CleaningTaskFilter, PageRequest};
use stay_core::{Capabilities, DomainError};
use tracing::{debug, info, instrument};
use uuid::Uuid;
use validator::Validate;

use crate::dto::{
    AssignCleanerRequest, CleaningTaskListQuery, CleaningTaskResponse, CreateCleaningTaskRequest,
    UpdateCleaningStatusRequest, UpdateCleaningTaskRequest,
};

use super::context::ServiceContext;
use super::error::{ServiceError, ServiceResult};
use super::permission::{Actor, PermissionService};

/// Cleaning task service
pub struct CleaningTaskService<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> CleaningTaskService<'a> {
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    async fn find(&self, task_id: Uuid) -> ServiceResult<CleaningTask> {
        self.ctx
            .cleaning_task_repo()
            .find_by_id(task_id)
            .await?
            .ok_or_else(|| ServiceError::not_found("CleaningTask", task_id.to_string()))
    }

    /// Load a task the actor manages
    async fn load_managed(&self, actor: &Actor, task_id: Uuid) -> ServiceResult<CleaningTask> {
        actor.require(Capabilities::MANAGE_CLEANING)?;
        let task = self.find(task_id).await?;
        PermissionService::new(self.ctx)
            .require_property(actor, task.property_id)
            .await?;
        Ok(task)
    }

    /// Load a task the actor manages or is assigned to
    async fn load_visible(&self, actor: &Actor, task_id: Uuid) -> ServiceResult<CleaningTask> {
        if actor.can(Capabilities::MANAGE_CLEANING) {
            return self.load_managed(actor, task_id).await;
        }
        actor.require(Capabilities::WORK_CLEANING)?;

        let task = self.find(task_id).await?;
        if !task.is_assigned_to(actor.user_id) {
            return Err(DomainError::NotAssignedCleaner.into());
        }
        Ok(task)
    }

    /// The assignee must be an active user allowed to clean
    async fn check_cleaner(&self, cleaner_id: Uuid) -> ServiceResult<()> {
        let cleaner = self
            .ctx
            .user_repo()
            .find_by_id(cleaner_id)
            .await?
            .filter(|u| u.is_active)
            .ok_or(DomainError::UserNotFound(cleaner_id))?;

        if !cleaner.capabilities().has(Capabilities::WORK_CLEANING) {
            return Err(ServiceError::validation(format!(
                "{} cannot be assigned cleaning tasks",
                cleaner.role
            )));
        }
        Ok(())
    }

    #[instrument(skip(self))]
    pub async fn list(
        &self,
        actor: &Actor,
        query: CleaningTaskListQuery,
        page: PageRequest,
    ) -> ServiceResult<Vec<CleaningTaskResponse>> {
        let filter = if actor.can(Capabilities::MANAGE_CLEANING) {
            CleaningTaskFilter {
                property_id: query.property_id,
                owner_id: actor.owner_scope(),
                cleaner_id: query.cleaner_id,
                status: query.status,
                date_from: query.date_from,
                date_to: query.date_to,
            }
        } else {
            actor.require(Capabilities::WORK_CLEANING)?;
            CleaningTaskFilter {
                property_id: query.property_id,
                owner_id: None,
                cleaner_id: Some(actor.user_id),
                status: query.status,
                date_from: query.date_from,
                date_to: query.date_to,
            }
        };

        let tasks = self.ctx.cleaning_task_repo().list(&filter, page).await?;
        Ok(tasks.iter().map(CleaningTaskResponse::from).collect())
    }

    #[instrument(skip(self))]
    pub async fn get(&self, actor: &Actor, task_id: Uuid) -> ServiceResult<CleaningTaskResponse> {
        Ok(CleaningTaskResponse::from(self.load_visible(actor, task_id).await?))
    }

    #[instrument(skip(self, request))]
    pub async fn create(
        &self,
        actor: &Actor,
        request: CreateCleaningTaskRequest,
    ) -> ServiceResult<CleaningTaskResponse> {
        actor.require(Capabilities::MANAGE_CLEANING)?;
        request.validate()?;
        PermissionService::new(self.ctx)
            .require_property(actor, request.property_id)
            .await?;

        if let Some(reservation_id) = request.reservation_id {
            let reservation = self
                .ctx
                .reservation_repo()
                .find_by_id(reservation_id)
                .await?
                .ok_or(DomainError::ReservationNotFound(reservation_id))?;
            if reservation.property_id != request.property_id {
                return Err(ServiceError::validation(
                    "reservation belongs to another property",
                ));
            }
        }

        let now = Utc::now();
        let mut task = CleaningTask::new(request.property_id, request.scheduled_date);
        task.room_unit_id = request.room_unit_id;
        task.reservation_id = request.reservation_id;
        task.notes = request.notes;
        if let Some(cleaner_id) = request.cleaner_id {
            self.check_cleaner(cleaner_id).await?;
            task.assign(cleaner_id, now)?;
        }

        self.ctx.cleaning_task_repo().create(&task).await?;

        info!(task_id = %task.id, date = %task.scheduled_date, "Cleaning task created");
        Ok(CleaningTaskResponse::from(task))
    }

    #[instrument(skip(self, request))]
    pub async fn update(
        &self,
        actor: &Actor,
        task_id: Uuid,
        request: UpdateCleaningTaskRequest,
    ) -> ServiceResult<CleaningTaskResponse> {
        request.validate()?;
        let mut task = self.load_managed(actor, task_id).await?;

        if let Some(unit_id) = request.room_unit_id {
            task.room_unit_id = Some(unit_id);
        }
        if let Some(date) = request.scheduled_date {
            task.scheduled_date = date;
        }
        if let Some(notes) = request.notes {
            task.notes = Some(notes);
        }
        task.updated_at = Utc::now();

        self.ctx.cleaning_task_repo().update(&task).await?;

        info!(task_id = %task_id, "Cleaning task updated");
        Ok(CleaningTaskResponse::from(task))
    }

    #[instrument(skip(self, request))]
    pub async fn assign(
        &self,
        actor: &Actor,
        task_id: Uuid,
        request: AssignCleanerRequest,
    ) -> ServiceResult<CleaningTaskResponse> {
        let mut task = self.load_managed(actor, task_id).await?;
        self.check_cleaner(request.cleaner_id).await?;

        task.assign(request.cleaner_id, Utc::now())?;
        self.ctx.cleaning_task_repo().update(&task).await?;

        info!(task_id = %task_id, cleaner_id = %request.cleaner_id, "Cleaner assigned");
        Ok(CleaningTaskResponse::from(task))
    }

    /// Progress a task. Cleaners may start and complete their own tasks but
    /// not cancel or reassign them.
    #[instrument(skip(self, request))]
    pub async fn update_status(
        &self,
        actor: &Actor,
        task_id: Uuid,
        request: UpdateCleaningStatusRequest,
    ) -> ServiceResult<CleaningTaskResponse> {
        let mut task = self.load_visible(actor, task_id).await?;

        let manager = actor.can(Capabilities::MANAGE_CLEANING);
        if !manager
            && !matches!(
                request.status,
                CleaningTaskStatus::InProgress | CleaningTaskStatus::Completed
            )
        {
            return Err(ServiceError::permission_denied(
                Capabilities::MANAGE_CLEANING.list().join(", "),
            ));
        }
        if request.status == CleaningTaskStatus::Assigned && task.cleaner_id.is_none() {
            return Err(ServiceError::validation("assign a cleaner first"));
        }

        let previous = task.status;
        task.transition_to(request.status, Utc::now())?;
        self.ctx.cleaning_task_repo().update(&task).await?;

        info!(task_id = %task_id, from = %previous, to = %task.status, "Cleaning status changed");
        Ok(CleaningTaskResponse::from(task))
    }

    /// Hard delete
    #[instrument(skip(self))]
    pub async fn delete(&self, actor: &Actor, task_id: Uuid) -> ServiceResult<()> {
        self.load_managed(actor, task_id).await?;
        self.ctx.cleaning_task_repo().delete(task_id).await?;

        info!(task_id = %task_id, "Cleaning task deleted");
        Ok(())
    }

    /// Create the departure-day turnover task unless the reservation
    /// already has one
    #[instrument(skip(self, reservation), fields(reservation_id = %reservation.id))]
    pub async fn ensure_turnover_task(&self, reservation: &Reservation) -> ServiceResult<Option<Uuid>> {
        let repo = self.ctx.cleaning_task_repo();
        if !repo.find_by_reservation(reservation.id).await?.is_empty() {
            debug!("Turnover task already exists");
            return Ok(None);
        }

        let task = CleaningTask::for_departure(
            reservation.property_id,
            reservation.room_unit_id,
            reservation.id,
            reservation.check_out_date,
        );
        repo.create(&task).await?;

        info!(task_id = %task.id, date = %task.scheduled_date, "Turnover task created");
        Ok(Some(task.id))
    }
}
