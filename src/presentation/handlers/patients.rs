use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use chrono::NaiveDate;
use serde::Deserialize;

use crate::domain::{NewPatient, Patient, PatientId};
use crate::presentation::error::ApiError;
use crate::presentation::extractors::AuthenticatedUser;
use crate::presentation::state::AppState;

#[derive(Deserialize)]
pub struct CreatePatientRequest {
    pub name: String,
    pub date_of_birth: Option<NaiveDate>,
    pub gender: Option<String>,
    pub medical_notes: Option<String>,
}

fn not_found() -> ApiError {
    ApiError::NotFound("Patient not found".to_string())
}

/// Patients owned by another user are reported as missing.
#[tracing::instrument(skip(state), fields(user_id = %user_id))]
pub async fn get_patient_handler(
    State(state): State<AppState>,
    AuthenticatedUser(user_id): AuthenticatedUser,
    Path(id): Path<String>,
) -> Result<Json<Patient>, ApiError> {
    let id: i64 = id.parse().map_err(|_| not_found())?;

    match state.patients.find_by_id(PatientId::new(id)).await? {
        Some(patient) if patient.user_id == user_id => Ok(Json(patient)),
        _ => Err(not_found()),
    }
}

#[tracing::instrument(skip(state, payload), fields(user_id = %user_id))]
pub async fn create_patient_handler(
    State(state): State<AppState>,
    AuthenticatedUser(user_id): AuthenticatedUser,
    payload: Result<Json<CreatePatientRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<Patient>), ApiError> {
    let Json(request) = payload?;

    let name = request.name.trim();
    if name.is_empty() {
        return Err(ApiError::BadRequest("Patient name is required".to_string()));
    }

    let patient = state
        .patients
        .create(&NewPatient {
            user_id,
            name: name.to_string(),
            date_of_birth: request.date_of_birth,
            gender: request.gender,
            medical_notes: request.medical_notes,
        })
        .await?;

    tracing::info!(patient_id = %patient.id, "Patient created");
    Ok((StatusCode::CREATED, Json(patient)))
}

#[tracing::instrument(skip(state), fields(user_id = %user_id))]
pub async fn list_patients_handler(
    State(state): State<AppState>,
    AuthenticatedUser(user_id): AuthenticatedUser,
) -> Result<Json<Vec<Patient>>, ApiError> {
    Ok(Json(state.patients.list_for_user(user_id).await?))
}
