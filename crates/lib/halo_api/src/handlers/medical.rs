//! Patient and medical record handlers. Any authenticated role may call these.

use std::collections::HashMap;

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::{Extension, Json};

use crate::AppState;
use crate::error::AppResult;
use crate::middleware::auth::AuthenticatedUser;
use crate::models::{
    ApiResponse, MedicalRecordRequest, MedicalRecordResponse, PatientResponse,
    RecordPatientRequest,
};
use crate::services::medical;

/// `POST /v1/medical/patient`
pub async fn record_patient_handler(
    State(state): State<AppState>,
    Json(body): Json<RecordPatientRequest>,
) -> AppResult<(StatusCode, Json<ApiResponse<PatientResponse>>)> {
    let patient = body.validate()?;
    let data = medical::record_patient(&state, &patient).await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::with_data("Patient recorded successfully", data)),
    ))
}

/// `GET /v1/medical/patient`
pub async fn list_patients_handler(
    State(state): State<AppState>,
    Query(params): Query<HashMap<String, String>>,
) -> AppResult<Json<ApiResponse<Vec<PatientResponse>>>> {
    let data = medical::list_patients(&state, &params).await?;
    Ok(Json(ApiResponse::with_data(
        "Patients retrieved successfully",
        data,
    )))
}

/// `POST /v1/medical/record`
pub async fn save_medical_record_handler(
    State(state): State<AppState>,
    Extension(AuthenticatedUser(staff)): Extension<AuthenticatedUser>,
    Json(body): Json<MedicalRecordRequest>,
) -> AppResult<(StatusCode, Json<ApiResponse<MedicalRecordResponse>>)> {
    let record = body.validate()?;
    let data = medical::save_medical_record(&state, &record, &staff).await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::with_data("Medical record saved successfully", data)),
    ))
}

/// `GET /v1/medical/record`
pub async fn list_medical_records_handler(
    State(state): State<AppState>,
    Query(params): Query<HashMap<String, String>>,
) -> AppResult<Json<ApiResponse<Vec<MedicalRecordResponse>>>> {
    let data = medical::list_medical_records(&state, &params).await?;
    Ok(Json(ApiResponse::with_data(
        "Medical records retrieved successfully",
        data,
    )))
}
