use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use tracing::debug;
use uuid::Uuid;

use shared_models::error::AppError;

use crate::models::{PagedResponse, PageQuery, Patient, RegisterPatientRequest};
use crate::services::patient::PatientRegistry;

pub async fn register_patient(
    State(registry): State<Arc<PatientRegistry>>,
    Json(request): Json<RegisterPatientRequest>,
) -> Result<(StatusCode, Json<Patient>), AppError> {
    let patient = registry.register(request).await?;
    Ok((StatusCode::CREATED, Json(patient)))
}

pub async fn get_patient(
    State(registry): State<Arc<PatientRegistry>>,
    Path(patient_id): Path<Uuid>,
) -> Result<Json<Patient>, AppError> {
    let patient = registry.get(patient_id).await?;
    Ok(Json(patient))
}

pub async fn list_patients(
    State(registry): State<Arc<PatientRegistry>>,
    Query(query): Query<PageQuery>,
) -> Result<Json<PagedResponse<Patient>>, AppError> {
    debug!("Listing patients: {:?}", query);
    let page = registry
        .list(query.page.unwrap_or(0), query.size.unwrap_or(20))
        .await;
    Ok(Json(page))
}

pub async fn delete_patient(
    State(registry): State<Arc<PatientRegistry>>,
    Path(patient_id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    registry.soft_delete(patient_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
