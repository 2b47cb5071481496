pub mod handlers;
pub mod models;
pub mod router;
pub mod services;

pub use models::{PagedResponse, Patient, PatientError, RegisterPatientRequest};
pub use services::patient::PatientRegistry;
