use std::sync::Arc;

use axum::{
    extract::{Extension, Path, Query, State},
    http::StatusCode,
    Json,
};
use tracing::debug;
use uuid::Uuid;

use shared_models::auth::AuthUser;
use shared_models::error::AppError;

use crate::models::{
    Appointment, ConflictCheckQuery, ConflictCheckResponse, ScheduleAppointmentRequest,
    UpdateAppointmentRequest,
};
use crate::services::scheduling::SchedulingCoordinator;

pub async fn schedule_appointment(
    State(coordinator): State<Arc<SchedulingCoordinator>>,
    Extension(user): Extension<AuthUser>,
    Json(request): Json<ScheduleAppointmentRequest>,
) -> Result<(StatusCode, Json<Appointment>), AppError> {
    debug!("Appointment booking requested by {}", user.username);

    let appointment = coordinator.schedule(request).await?;
    Ok((StatusCode::CREATED, Json(appointment)))
}

pub async fn get_appointment(
    State(coordinator): State<Arc<SchedulingCoordinator>>,
    Path(appointment_id): Path<Uuid>,
) -> Result<Json<Appointment>, AppError> {
    let appointment = coordinator.get_appointment(appointment_id).await?;
    Ok(Json(appointment))
}

pub async fn update_appointment(
    State(coordinator): State<Arc<SchedulingCoordinator>>,
    Extension(user): Extension<AuthUser>,
    Path(appointment_id): Path<Uuid>,
    Json(request): Json<UpdateAppointmentRequest>,
) -> Result<Json<Appointment>, AppError> {
    debug!(
        "Appointment {} update requested by {}",
        appointment_id, user.username
    );

    let appointment = coordinator.reschedule(appointment_id, request).await?;
    Ok(Json(appointment))
}

pub async fn get_patient_appointments(
    State(coordinator): State<Arc<SchedulingCoordinator>>,
    Path(patient_id): Path<Uuid>,
) -> Result<Json<Vec<Appointment>>, AppError> {
    Ok(Json(coordinator.appointments_for_patient(patient_id).await))
}

pub async fn get_doctor_appointments(
    State(coordinator): State<Arc<SchedulingCoordinator>>,
    Path(doctor_id): Path<Uuid>,
) -> Result<Json<Vec<Appointment>>, AppError> {
    Ok(Json(coordinator.appointments_for_doctor(doctor_id).await))
}

pub async fn check_appointment_conflicts(
    State(coordinator): State<Arc<SchedulingCoordinator>>,
    Query(query): Query<ConflictCheckQuery>,
) -> Result<Json<ConflictCheckResponse>, AppError> {
    let has_conflict = coordinator
        .conflicts()
        .has_conflict(
            query.doctor_id,
            query.start_time,
            query.end_time,
            query.exclude_appointment_id,
        )
        .await?;

    Ok(Json(ConflictCheckResponse { has_conflict }))
}
