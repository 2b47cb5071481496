use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use shared_models::error::AppError;

/// Scheduling view of a doctor. `consultation_duration_minutes` is fixed
/// per doctor and derives every appointment interval booked with them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Doctor {
    pub id: Uuid,
    pub name_en: String,
    pub name_ar: String,
    pub specialty: Specialty,
    pub years_of_experience: i32,
    pub consultation_duration_minutes: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewDoctor {
    pub name_en: String,
    pub name_ar: String,
    pub specialty: Specialty,
    pub years_of_experience: i32,
    pub consultation_duration_minutes: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Specialty {
    GeneralPractice,
    Cardiology,
    Dermatology,
    Orthopedics,
    Pediatrics,
    Neurology,
    Ophthalmology,
    Ent,
    Gynecology,
    Urology,
    Psychiatry,
    Dentistry,
}

impl fmt::Display for Specialty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Specialty::GeneralPractice => "GENERAL_PRACTICE",
            Specialty::Cardiology => "CARDIOLOGY",
            Specialty::Dermatology => "DERMATOLOGY",
            Specialty::Orthopedics => "ORTHOPEDICS",
            Specialty::Pediatrics => "PEDIATRICS",
            Specialty::Neurology => "NEUROLOGY",
            Specialty::Ophthalmology => "OPHTHALMOLOGY",
            Specialty::Ent => "ENT",
            Specialty::Gynecology => "GYNECOLOGY",
            Specialty::Urology => "UROLOGY",
            Specialty::Psychiatry => "PSYCHIATRY",
            Specialty::Dentistry => "DENTISTRY",
        };
        write!(f, "{}", name)
    }
}

#[derive(Debug, Clone, thiserror::Error)]
pub enum DoctorError {
    #[error("Doctor not found")]
    NotFound,
}

impl From<DoctorError> for AppError {
    fn from(err: DoctorError) -> Self {
        match err {
            DoctorError::NotFound => AppError::NotFound(err.to_string()),
        }
    }
}
