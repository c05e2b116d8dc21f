//! Cleaning task mapper

use stay_core::entities::CleaningTask;
use stay_core::DomainError;

use super::parse_column;
use crate::models::CleaningTaskModel;

impl TryFrom<CleaningTaskModel> for CleaningTask {
    type Error = DomainError;

    fn try_from(model: CleaningTaskModel) -> Result<Self, Self::Error> {
        Ok(CleaningTask {
            id: model.id,
            property_id: model.property_id,
            room_unit_id: model.room_unit_id,
            reservation_id: model.reservation_id,
            cleaner_id: model.cleaner_id,
            scheduled_date: model.scheduled_date,
            status: parse_column("cleaning_tasks.status", &model.status)?,
            notes: model.notes,
            assigned_at: model.assigned_at,
            started_at: model.started_at,
            completed_at: model.completed_at,
            created_at: model.created_at,
            updated_at: model.updated_at,
        })
    }
}
