use std::collections::HashMap;

use tokio::sync::RwLock;
use tracing::{debug, info};
use uuid::Uuid;

use crate::models::{Doctor, DoctorError, NewDoctor, Specialty};

/// Reference data store for doctors. Read-only from the scheduling core's
/// perspective; entries are added by the startup seeder.
pub struct DoctorRegistry {
    doctors: RwLock<HashMap<Uuid, Doctor>>,
}

impl DoctorRegistry {
    pub fn new() -> Self {
        Self {
            doctors: RwLock::new(HashMap::new()),
        }
    }

    pub async fn register(&self, new_doctor: NewDoctor) -> Doctor {
        let doctor = Doctor {
            id: Uuid::new_v4(),
            name_en: new_doctor.name_en,
            name_ar: new_doctor.name_ar,
            specialty: new_doctor.specialty,
            years_of_experience: new_doctor.years_of_experience,
            consultation_duration_minutes: new_doctor.consultation_duration_minutes,
        };

        self.doctors.write().await.insert(doctor.id, doctor.clone());
        info!("Registered doctor {} ({})", doctor.name_en, doctor.id);
        doctor
    }

    pub async fn find(&self, id: Uuid) -> Option<Doctor> {
        self.doctors.read().await.get(&id).cloned()
    }

    pub async fn get(&self, id: Uuid) -> Result<Doctor, DoctorError> {
        self.find(id).await.ok_or(DoctorError::NotFound)
    }

    pub async fn list(&self) -> Vec<Doctor> {
        let mut doctors: Vec<Doctor> = self.doctors.read().await.values().cloned().collect();
        doctors.sort_by(|a, b| a.name_en.cmp(&b.name_en));
        doctors
    }

    pub async fn list_by_specialty(&self, specialty: Specialty) -> Vec<Doctor> {
        debug!("Fetching doctors by specialty: {}", specialty);
        let mut doctors: Vec<Doctor> = self
            .doctors
            .read()
            .await
            .values()
            .filter(|d| d.specialty == specialty)
            .cloned()
            .collect();
        doctors.sort_by(|a, b| a.name_en.cmp(&b.name_en));
        doctors
    }

    pub async fn search_by_name(&self, fragment: &str) -> Vec<Doctor> {
        let needle = fragment.to_lowercase();
        let mut doctors: Vec<Doctor> = self
            .doctors
            .read()
            .await
            .values()
            .filter(|d| {
                d.name_en.to_lowercase().contains(&needle) || d.name_ar.contains(fragment)
            })
            .cloned()
            .collect();
        doctors.sort_by(|a, b| a.name_en.cmp(&b.name_en));
        doctors
    }
}

impl Default for DoctorRegistry {
    fn default() -> Self {
        Self::new()
    }
}
