pub mod handlers;
pub mod models;
pub mod router;
pub mod services;
pub mod store;

pub use models::{
    Appointment, AppointmentError, AppointmentStatus, ConflictCheckResponse,
    ScheduleAppointmentRequest, UpdateAppointmentRequest,
};
pub use services::conflict::ConflictDetectionService;
pub use services::notification::{
    AppointmentConfirmation, NotificationClient, NotificationDispatcher,
};
pub use services::scheduling::{DoctorLocks, SchedulingCoordinator};
pub use store::{AppointmentStore, InMemoryAppointmentStore};
