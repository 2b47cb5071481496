use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration as StdDuration;

use chrono::Duration;
use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};
use tracing::{debug, info, warn};
use uuid::Uuid;

use doctor_cell::services::doctor::DoctorRegistry;
use patient_cell::services::patient::PatientRegistry;
use shared_utils::clock::Clock;

use crate::models::{
    Appointment, AppointmentError, AppointmentStatus, ScheduleAppointmentRequest,
    UpdateAppointmentRequest,
};
use crate::services::conflict::ConflictDetectionService;
use crate::services::notification::{AppointmentConfirmation, NotificationDispatcher};
use crate::store::AppointmentStore;

/// One async mutex per doctor id. Holding a doctor's lock serializes
/// check-conflict + persist for that doctor while bookings for other
/// doctors proceed untouched.
pub struct DoctorLocks {
    locks: Mutex<HashMap<Uuid, Arc<AsyncMutex<()>>>>,
}

impl DoctorLocks {
    pub fn new() -> Self {
        Self {
            locks: Mutex::new(HashMap::new()),
        }
    }

    fn lock_for(&self, doctor_id: Uuid) -> Arc<AsyncMutex<()>> {
        let mut locks = self.locks.lock().unwrap();
        locks
            .entry(doctor_id)
            .or_insert_with(|| Arc::new(AsyncMutex::new(())))
            .clone()
    }

    /// Bounded wait: a contended doctor surfaces as a retryable error
    /// instead of a hung request.
    pub async fn acquire(
        &self,
        doctor_id: Uuid,
        wait: StdDuration,
    ) -> Result<OwnedMutexGuard<()>, AppointmentError> {
        let lock = self.lock_for(doctor_id);
        match tokio::time::timeout(wait, lock.lock_owned()).await {
            Ok(guard) => Ok(guard),
            Err(_) => {
                warn!("Timed out waiting for doctor {} scheduling lock", doctor_id);
                Err(AppointmentError::SchedulerBusy)
            }
        }
    }
}

impl Default for DoctorLocks {
    fn default() -> Self {
        Self::new()
    }
}

/// Orchestrates appointment creation and updates.
///
/// The critical section is per doctor: conflicts are re-checked and the
/// record persisted under that doctor's lock, so two overlapping bookings
/// can never both commit. Confirmation notices go out after the lock is
/// released and never affect the outcome.
pub struct SchedulingCoordinator {
    store: Arc<dyn AppointmentStore>,
    patients: Arc<PatientRegistry>,
    doctors: Arc<DoctorRegistry>,
    conflicts: ConflictDetectionService,
    locks: DoctorLocks,
    notifier: NotificationDispatcher,
    clock: Arc<dyn Clock>,
    lock_wait: StdDuration,
}

impl SchedulingCoordinator {
    pub fn new(
        store: Arc<dyn AppointmentStore>,
        patients: Arc<PatientRegistry>,
        doctors: Arc<DoctorRegistry>,
        notifier: NotificationDispatcher,
        clock: Arc<dyn Clock>,
        lock_wait: StdDuration,
    ) -> Self {
        Self {
            conflicts: ConflictDetectionService::new(Arc::clone(&store)),
            store,
            patients,
            doctors,
            locks: DoctorLocks::new(),
            notifier,
            clock,
            lock_wait,
        }
    }

    pub fn conflicts(&self) -> &ConflictDetectionService {
        &self.conflicts
    }

    pub async fn schedule(
        &self,
        request: ScheduleAppointmentRequest,
    ) -> Result<Appointment, AppointmentError> {
        info!(
            "Scheduling appointment: patient={}, doctor={}, start={}",
            request.patient_id, request.doctor_id, request.start_time
        );

        let patient = self
            .patients
            .find(request.patient_id)
            .await
            .ok_or(AppointmentError::PatientNotFound)?;

        let doctor = self
            .doctors
            .find(request.doctor_id)
            .await
            .ok_or(AppointmentError::DoctorNotFound)?;

        let now = self.clock.now();
        if request.start_time <= now {
            return Err(AppointmentError::InvalidTime(
                "Appointment must be scheduled for a future time".to_string(),
            ));
        }

        let end_time = request.start_time + Duration::minutes(doctor.consultation_duration_minutes);

        let appointment = {
            let _guard = self.locks.acquire(doctor.id, self.lock_wait).await?;

            // Re-read under the lock: a booking that slipped in while we
            // were waiting must be visible to this check.
            if self
                .conflicts
                .has_conflict(doctor.id, request.start_time, end_time, None)
                .await?
            {
                return Err(AppointmentError::ConflictDetected);
            }

            let appointment = Appointment {
                id: Uuid::new_v4(),
                patient_id: patient.id,
                doctor_id: doctor.id,
                start_time: request.start_time,
                duration_minutes: doctor.consultation_duration_minutes,
                status: AppointmentStatus::Scheduled,
                reason: request.reason,
                created_at: now,
                updated_at: now,
            };

            self.store.save(appointment).await
        };

        // Post-commit, outside the lock. A failed or dropped confirmation
        // never rolls back the booking.
        self.notifier.dispatch(AppointmentConfirmation {
            recipient_email: patient.email,
            recipient_name: patient.full_name_en,
            doctor_name: doctor.name_en,
            starts_at: appointment.start_time,
        });

        info!("Appointment scheduled with ID: {}", appointment.id);
        Ok(appointment)
    }

    pub async fn reschedule(
        &self,
        appointment_id: Uuid,
        request: UpdateAppointmentRequest,
    ) -> Result<Appointment, AppointmentError> {
        info!("Updating appointment ID: {}", appointment_id);

        let mut appointment = self
            .store
            .find_by_id(appointment_id)
            .await
            .ok_or(AppointmentError::NotFound)?;

        match request.start_time {
            Some(new_start) => {
                let now = self.clock.now();
                if new_start <= now {
                    return Err(AppointmentError::InvalidTime(
                        "Rescheduled time must be in the future".to_string(),
                    ));
                }

                let new_end = new_start + Duration::minutes(appointment.duration_minutes);

                let _guard = self.locks.acquire(appointment.doctor_id, self.lock_wait).await?;

                // The appointment must not conflict with its own prior slot.
                if self
                    .conflicts
                    .has_conflict(appointment.doctor_id, new_start, new_end, Some(appointment.id))
                    .await?
                {
                    return Err(AppointmentError::ConflictDetected);
                }

                appointment.start_time = new_start;
                apply_non_time_fields(&mut appointment, &request);
                appointment.updated_at = now;

                let updated = self.store.save(appointment).await;
                info!("Appointment {} rescheduled to {}", appointment_id, new_start);
                Ok(updated)
            }
            None => {
                // Status and reason changes do not move the interval, so no
                // lock and no conflict re-check.
                debug!("Applying status/reason update to appointment {}", appointment_id);
                apply_non_time_fields(&mut appointment, &request);
                appointment.updated_at = self.clock.now();

                let updated = self.store.save(appointment).await;
                info!("Appointment {} updated successfully", appointment_id);
                Ok(updated)
            }
        }
    }

    pub async fn get_appointment(
        &self,
        appointment_id: Uuid,
    ) -> Result<Appointment, AppointmentError> {
        self.store
            .find_by_id(appointment_id)
            .await
            .ok_or(AppointmentError::NotFound)
    }

    pub async fn appointments_for_patient(&self, patient_id: Uuid) -> Vec<Appointment> {
        self.store.find_by_patient(patient_id).await
    }

    pub async fn appointments_for_doctor(&self, doctor_id: Uuid) -> Vec<Appointment> {
        self.store.find_by_doctor(doctor_id).await
    }
}

fn apply_non_time_fields(appointment: &mut Appointment, request: &UpdateAppointmentRequest) {
    if let Some(status) = request.status {
        appointment.status = status;
    }
    if let Some(reason) = &request.reason {
        appointment.reason = Some(reason.clone());
    }
}
