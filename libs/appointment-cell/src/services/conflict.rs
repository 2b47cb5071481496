use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{debug, warn};
use uuid::Uuid;

use crate::models::AppointmentError;
use crate::store::AppointmentStore;

/// Two half-open intervals [start1, end1) and [start2, end2) collide iff
/// each starts before the other ends. Touching endpoints do not conflict:
/// a slot ending at 10:00 leaves 10:00 free.
pub fn intervals_overlap(
    start1: DateTime<Utc>,
    end1: DateTime<Utc>,
    start2: DateTime<Utc>,
    end2: DateTime<Utc>,
) -> bool {
    start1 < end2 && start2 < end1
}

/// Read-only overlap check over a doctor's active appointments.
pub struct ConflictDetectionService {
    store: Arc<dyn AppointmentStore>,
}

impl ConflictDetectionService {
    pub fn new(store: Arc<dyn AppointmentStore>) -> Self {
        Self { store }
    }

    /// Check whether [start_time, end_time) collides with any non-cancelled
    /// appointment of the doctor. `exclude_appointment_id` skips the record
    /// being rescheduled so it does not conflict with its own prior slot.
    pub async fn has_conflict(
        &self,
        doctor_id: Uuid,
        start_time: DateTime<Utc>,
        end_time: DateTime<Utc>,
        exclude_appointment_id: Option<Uuid>,
    ) -> Result<bool, AppointmentError> {
        if start_time >= end_time {
            return Err(AppointmentError::InvalidTime(
                "Interval start must come before its end".to_string(),
            ));
        }

        debug!(
            "Checking conflicts for doctor {} from {} to {}",
            doctor_id, start_time, end_time
        );

        let existing = self
            .store
            .find_by_doctor_and_range(doctor_id, start_time, end_time)
            .await;

        let conflicting = existing
            .iter()
            .filter(|apt| apt.blocks_calendar())
            .filter(|apt| Some(apt.id) != exclude_appointment_id)
            .filter(|apt| intervals_overlap(start_time, end_time, apt.start_time, apt.end_time()))
            .count();

        if conflicting > 0 {
            warn!(
                "Conflict detected for doctor {} - {} overlapping appointments",
                doctor_id, conflicting
            );
        }

        Ok(conflicting > 0)
    }
}
