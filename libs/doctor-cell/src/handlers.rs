use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::Deserialize;
use tracing::debug;
use uuid::Uuid;

use shared_models::error::AppError;

use crate::models::{Doctor, Specialty};
use crate::services::doctor::DoctorRegistry;

#[derive(Debug, Deserialize)]
pub struct DoctorSearchQuery {
    pub name: String,
}

pub async fn list_doctors(
    State(registry): State<Arc<DoctorRegistry>>,
) -> Result<Json<Vec<Doctor>>, AppError> {
    debug!("Fetching all doctors");
    Ok(Json(registry.list().await))
}

pub async fn get_doctor(
    State(registry): State<Arc<DoctorRegistry>>,
    Path(doctor_id): Path<Uuid>,
) -> Result<Json<Doctor>, AppError> {
    let doctor = registry.get(doctor_id).await?;
    Ok(Json(doctor))
}

pub async fn get_doctors_by_specialty(
    State(registry): State<Arc<DoctorRegistry>>,
    Path(specialty): Path<Specialty>,
) -> Result<Json<Vec<Doctor>>, AppError> {
    Ok(Json(registry.list_by_specialty(specialty).await))
}

pub async fn search_doctors(
    State(registry): State<Arc<DoctorRegistry>>,
    Query(query): Query<DoctorSearchQuery>,
) -> Result<Json<Vec<Doctor>>, AppError> {
    Ok(Json(registry.search_by_name(&query.name).await))
}
