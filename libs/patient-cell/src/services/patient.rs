use std::collections::HashMap;

use chrono::Utc;
use tokio::sync::RwLock;
use tracing::{debug, info};
use uuid::Uuid;

use crate::models::{PagedResponse, Patient, PatientError, RegisterPatientRequest};

/// In-memory patient records. Soft delete only: removed patients stay in
/// the map with `deleted = true` and disappear from lookups.
pub struct PatientRegistry {
    patients: RwLock<HashMap<Uuid, Patient>>,
}

impl PatientRegistry {
    pub fn new() -> Self {
        Self {
            patients: RwLock::new(HashMap::new()),
        }
    }

    pub async fn register(&self, request: RegisterPatientRequest) -> Result<Patient, PatientError> {
        info!("Registering patient with email: {}", request.email);

        let mut patients = self.patients.write().await;

        if patients
            .values()
            .any(|p| !p.deleted && p.email.eq_ignore_ascii_case(&request.email))
        {
            return Err(PatientError::Duplicate {
                field: "email",
                value: request.email,
            });
        }
        if patients
            .values()
            .any(|p| !p.deleted && p.national_id == request.national_id)
        {
            return Err(PatientError::Duplicate {
                field: "national_id",
                value: request.national_id,
            });
        }

        let now = Utc::now();
        let patient = Patient {
            id: Uuid::new_v4(),
            full_name_en: request.full_name_en,
            full_name_ar: request.full_name_ar,
            email: request.email,
            mobile_number: request.mobile_number,
            date_of_birth: request.date_of_birth,
            national_id: request.national_id,
            deleted: false,
            created_at: now,
            updated_at: now,
        };

        patients.insert(patient.id, patient.clone());
        info!("Patient registered successfully with ID: {}", patient.id);
        Ok(patient)
    }

    pub async fn find(&self, id: Uuid) -> Option<Patient> {
        self.patients
            .read()
            .await
            .get(&id)
            .filter(|p| !p.deleted)
            .cloned()
    }

    pub async fn get(&self, id: Uuid) -> Result<Patient, PatientError> {
        self.find(id).await.ok_or(PatientError::NotFound)
    }

    pub async fn list(&self, page: usize, size: usize) -> PagedResponse<Patient> {
        debug!("Fetching patients, page: {}", page);

        let size = size.clamp(1, 100);
        let mut all: Vec<Patient> = self
            .patients
            .read()
            .await
            .values()
            .filter(|p| !p.deleted)
            .cloned()
            .collect();
        all.sort_by(|a, b| a.full_name_en.cmp(&b.full_name_en));

        let total_elements = all.len();
        let total_pages = total_elements.div_ceil(size);
        let items = all.into_iter().skip(page * size).take(size).collect();

        PagedResponse {
            items,
            page,
            size,
            total_elements,
            total_pages,
        }
    }

    pub async fn soft_delete(&self, id: Uuid) -> Result<(), PatientError> {
        info!("Soft deleting patient with ID: {}", id);

        let mut patients = self.patients.write().await;
        match patients.get_mut(&id) {
            Some(patient) if !patient.deleted => {
                patient.deleted = true;
                patient.updated_at = Utc::now();
                Ok(())
            }
            _ => Err(PatientError::NotFound),
        }
    }
}

impl Default for PatientRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use chrono::NaiveDate;

    fn registration(email: &str, national_id: &str) -> RegisterPatientRequest {
        RegisterPatientRequest {
            full_name_en: "John Doe".to_string(),
            full_name_ar: "جون دو".to_string(),
            email: email.to_string(),
            mobile_number: "+96650000000".to_string(),
            date_of_birth: NaiveDate::from_ymd_opt(1990, 1, 1).unwrap(),
            national_id: national_id.to_string(),
        }
    }

    #[tokio::test]
    async fn register_and_fetch() {
        let registry = PatientRegistry::new();
        let patient = registry
            .register(registration("john@example.com", "1000000001"))
            .await
            .unwrap();

        let fetched = registry.get(patient.id).await.unwrap();
        assert_eq!(fetched.email, "john@example.com");
    }

    #[tokio::test]
    async fn duplicate_email_is_rejected() {
        let registry = PatientRegistry::new();
        registry
            .register(registration("john@example.com", "1000000001"))
            .await
            .unwrap();

        let result = registry
            .register(registration("John@Example.com", "1000000002"))
            .await;

        assert_matches!(result, Err(PatientError::Duplicate { field: "email", .. }));
    }

    #[tokio::test]
    async fn duplicate_national_id_is_rejected() {
        let registry = PatientRegistry::new();
        registry
            .register(registration("john@example.com", "1000000001"))
            .await
            .unwrap();

        let result = registry
            .register(registration("jane@example.com", "1000000001"))
            .await;

        assert_matches!(
            result,
            Err(PatientError::Duplicate { field: "national_id", .. })
        );
    }

    #[tokio::test]
    async fn soft_deleted_patient_disappears_from_lookups() {
        let registry = PatientRegistry::new();
        let patient = registry
            .register(registration("john@example.com", "1000000001"))
            .await
            .unwrap();

        registry.soft_delete(patient.id).await.unwrap();

        assert_matches!(registry.get(patient.id).await, Err(PatientError::NotFound));
        assert_matches!(
            registry.soft_delete(patient.id).await,
            Err(PatientError::NotFound)
        );
        assert_eq!(registry.list(0, 20).await.total_elements, 0);
    }

    #[tokio::test]
    async fn listing_is_paged() {
        let registry = PatientRegistry::new();
        for i in 0..5 {
            registry
                .register(registration(
                    &format!("patient{}@example.com", i),
                    &format!("10000000{:02}", i),
                ))
                .await
                .unwrap();
        }

        let page = registry.list(1, 2).await;
        assert_eq!(page.items.len(), 2);
        assert_eq!(page.total_elements, 5);
        assert_eq!(page.total_pages, 3);
    }
}
