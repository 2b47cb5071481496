pub mod handlers;
pub mod models;
pub mod router;
pub mod services;

pub use models::{Doctor, DoctorError, NewDoctor, Specialty};
pub use services::doctor::DoctorRegistry;
