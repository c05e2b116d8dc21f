//! Cleaning task entity

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::DomainError;

/// Cleaning task status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum CleaningTaskStatus {
    #[default]
    Pending,
    Assigned,
    InProgress,
    Completed,
    Cancelled,
}

impl CleaningTaskStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Assigned => "assigned",
            Self::InProgress => "in_progress",
            Self::Completed => "completed",
            Self::Cancelled => "cancelled",
        }
    }

    #[inline]
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Cancelled)
    }
}

impl fmt::Display for CleaningTaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CleaningTaskStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "assigned" => Ok(Self::Assigned),
            "in_progress" => Ok(Self::InProgress),
            "completed" => Ok(Self::Completed),
            "cancelled" => Ok(Self::Cancelled),
            other => Err(DomainError::ValidationError(format!(
                "unknown cleaning task status: {other}"
            ))),
        }
    }
}

/// Cleaning task entity
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CleaningTask {
    pub id: Uuid,
    pub property_id: Uuid,
    pub room_unit_id: Option<Uuid>,
    pub reservation_id: Option<Uuid>,
    pub cleaner_id: Option<Uuid>,
    pub scheduled_date: NaiveDate,
    pub status: CleaningTaskStatus,
    pub notes: Option<String>,
    pub assigned_at: Option<DateTime<Utc>>,
    pub started_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl CleaningTask {
    /// Create a pending task for a date
    pub fn new(property_id: Uuid, scheduled_date: NaiveDate) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            property_id,
            room_unit_id: None,
            reservation_id: None,
            cleaner_id: None,
            scheduled_date,
            status: CleaningTaskStatus::Pending,
            notes: None,
            assigned_at: None,
            started_at: None,
            completed_at: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Turnover task for a reservation's departure day
    pub fn for_departure(
        property_id: Uuid,
        room_unit_id: Option<Uuid>,
        reservation_id: Uuid,
        departure: NaiveDate,
    ) -> Self {
        let mut task = Self::new(property_id, departure);
        task.room_unit_id = room_unit_id;
        task.reservation_id = Some(reservation_id);
        task
    }

    /// Check whether the status graph allows `next`
    pub fn can_transition_to(&self, next: CleaningTaskStatus) -> bool {
        use CleaningTaskStatus as S;
        match (self.status, next) {
            (a, b) if a == b => !a.is_terminal(),
            (from, S::Cancelled) => !from.is_terminal(),
            (S::Pending, S::Assigned | S::InProgress) => true,
            (S::Assigned, S::Pending | S::InProgress) => true,
            (S::InProgress, S::Completed) => true,
            _ => false,
        }
    }

    /// Apply a status change; timestamps are filled the first time the
    /// matching status is reached and never cleared afterwards.
    pub fn transition_to(
        &mut self,
        next: CleaningTaskStatus,
        now: DateTime<Utc>,
    ) -> Result<(), DomainError> {
        if !self.can_transition_to(next) {
            return Err(DomainError::InvalidStatusTransition {
                from: self.status.to_string(),
                to: next.to_string(),
            });
        }

        match next {
            CleaningTaskStatus::Assigned => {
                self.assigned_at.get_or_insert(now);
            }
            CleaningTaskStatus::InProgress => {
                self.started_at.get_or_insert(now);
            }
            CleaningTaskStatus::Completed => {
                self.started_at.get_or_insert(now);
                self.completed_at.get_or_insert(now);
            }
            CleaningTaskStatus::Pending | CleaningTaskStatus::Cancelled => {}
        }

        self.status = next;
        self.updated_at = now;
        Ok(())
    }

    /// Assign a cleaner, moving a pending task to `assigned`
    pub fn assign(&mut self, cleaner_id: Uuid, now: DateTime<Utc>) -> Result<(), DomainError> {
        if self.status.is_terminal() {
            return Err(DomainError::InvalidStatusTransition {
                from: self.status.to_string(),
                to: CleaningTaskStatus::Assigned.to_string(),
            });
        }
        self.cleaner_id = Some(cleaner_id);
        if self.status == CleaningTaskStatus::Pending {
            self.transition_to(CleaningTaskStatus::Assigned, now)?;
        } else {
            self.assigned_at.get_or_insert(now);
            self.updated_at = now;
        }
        Ok(())
    }

    /// Whether the given cleaner is assigned to this task
    #[inline]
    pub fn is_assigned_to(&self, cleaner_id: Uuid) -> bool {
        self.cleaner_id == Some(cleaner_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn task() -> CleaningTask {
        CleaningTask::new(Uuid::new_v4(), NaiveDate::from_ymd_opt(2024, 3, 8).unwrap())
    }

    #[test]
    fn test_full_lifecycle_sets_timestamps() {
        let mut t = task();
        let t0 = Utc::now();
        let cleaner = Uuid::new_v4();

        t.assign(cleaner, t0).unwrap();
        assert_eq!(t.status, CleaningTaskStatus::Assigned);
        assert_eq!(t.assigned_at, Some(t0));

        let t1 = t0 + Duration::minutes(30);
        t.transition_to(CleaningTaskStatus::InProgress, t1).unwrap();
        assert_eq!(t.started_at, Some(t1));

        let t2 = t1 + Duration::minutes(45);
        t.transition_to(CleaningTaskStatus::Completed, t2).unwrap();
        assert_eq!(t.completed_at, Some(t2));
        assert_eq!(t.started_at, Some(t1));
        assert_eq!(t.assigned_at, Some(t0));
    }

    #[test]
    fn test_timestamps_not_overwritten() {
        let mut t = task();
        let t0 = Utc::now();
        t.transition_to(CleaningTaskStatus::Assigned, t0).unwrap();
        t.transition_to(CleaningTaskStatus::Pending, t0).unwrap();
        t.transition_to(CleaningTaskStatus::Assigned, t0 + Duration::hours(1))
            .unwrap();
        assert_eq!(t.assigned_at, Some(t0));
    }

    #[test]
    fn test_completing_directly_from_pending_is_rejected() {
        let mut t = task();
        let err = t
            .transition_to(CleaningTaskStatus::Completed, Utc::now())
            .unwrap_err();
        assert!(matches!(err, DomainError::InvalidStatusTransition { .. }));
    }

    #[test]
    fn test_terminal_statuses() {
        let mut t = task();
        t.transition_to(CleaningTaskStatus::Cancelled, Utc::now())
            .unwrap();
        assert!(!t.can_transition_to(CleaningTaskStatus::Pending));
        assert!(t.assign(Uuid::new_v4(), Utc::now()).is_err());
    }

    #[test]
    fn test_status_parse() {
        assert_eq!(
            "in_progress".parse::<CleaningTaskStatus>().unwrap(),
            CleaningTaskStatus::InProgress
        );
        assert!("done".parse::<CleaningTaskStatus>().is_err());
    }
}
