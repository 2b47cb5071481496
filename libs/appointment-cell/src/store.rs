use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::models::Appointment;

/// Narrow persistence interface the scheduling core consumes. Appointments
/// are never deleted through it, only saved and re-saved with a new status.
#[async_trait]
pub trait AppointmentStore: Send + Sync {
    async fn find_by_id(&self, id: Uuid) -> Option<Appointment>;

    /// Appointments of `doctor_id` whose occupied slot intersects
    /// [from, to), any status. Precise overlap and status filtering are the
    /// conflict detector's job.
    async fn find_by_doctor_and_range(
        &self,
        doctor_id: Uuid,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Vec<Appointment>;

    async fn find_by_patient(&self, patient_id: Uuid) -> Vec<Appointment>;

    async fn find_by_doctor(&self, doctor_id: Uuid) -> Vec<Appointment>;

    /// Upsert by id, returning the stored record.
    async fn save(&self, appointment: Appointment) -> Appointment;
}

/// Single-node store backing the service and its tests.
pub struct InMemoryAppointmentStore {
    appointments: RwLock<HashMap<Uuid, Appointment>>,
}

impl InMemoryAppointmentStore {
    pub fn new() -> Self {
        Self {
            appointments: RwLock::new(HashMap::new()),
        }
    }

    pub fn shared() -> Arc<Self> {
        Arc::new(Self::new())
    }
}

impl Default for InMemoryAppointmentStore {
    fn default() -> Self {
        Self::new()
    }
}

fn by_start_time(appointments: &mut [Appointment]) {
    appointments.sort_by_key(|a| a.start_time);
}

#[async_trait]
impl AppointmentStore for InMemoryAppointmentStore {
    async fn find_by_id(&self, id: Uuid) -> Option<Appointment> {
        self.appointments.read().await.get(&id).cloned()
    }

    async fn find_by_doctor_and_range(
        &self,
        doctor_id: Uuid,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Vec<Appointment> {
        let mut found: Vec<Appointment> = self
            .appointments
            .read()
            .await
            .values()
            .filter(|a| a.doctor_id == doctor_id && a.start_time < to && from < a.end_time())
            .cloned()
            .collect();
        by_start_time(&mut found);
        found
    }

    async fn find_by_patient(&self, patient_id: Uuid) -> Vec<Appointment> {
        let mut found: Vec<Appointment> = self
            .appointments
            .read()
            .await
            .values()
            .filter(|a| a.patient_id == patient_id)
            .cloned()
            .collect();
        by_start_time(&mut found);
        found
    }

    async fn find_by_doctor(&self, doctor_id: Uuid) -> Vec<Appointment> {
        let mut found: Vec<Appointment> = self
            .appointments
            .read()
            .await
            .values()
            .filter(|a| a.doctor_id == doctor_id)
            .cloned()
            .collect();
        by_start_time(&mut found);
        found
    }

    async fn save(&self, appointment: Appointment) -> Appointment {
        self.appointments
            .write()
            .await
            .insert(appointment.id, appointment.clone());
        appointment
    }
}
