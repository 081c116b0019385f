//! Patient and medical record service.

use std::collections::HashMap;

use halo_core::filter::build_filter;
use halo_core::filter::maps::{MEDICAL_RECORD_FILTERS, PATIENT_FILTERS};
use halo_core::medical::{self, NewMedicalRecord, NewPatient};
use halo_core::models::user::Identity;

use super::with_deadline;
use crate::AppState;
use crate::error::AppResult;
use crate::models::{MedicalRecordResponse, PatientResponse};

pub async fn record_patient(state: &AppState, patient: &NewPatient) -> AppResult<PatientResponse> {
    let row = with_deadline(
        state.config.context_timeout(),
        medical::record_patient(&state.pool, patient),
    )
    .await?;
    Ok(row.into())
}

pub async fn list_patients(
    state: &AppState,
    params: &HashMap<String, String>,
) -> AppResult<Vec<PatientResponse>> {
    let spec = build_filter(params, PATIENT_FILTERS);
    let rows = with_deadline(
        state.config.context_timeout(),
        medical::list_patients(&state.pool, &spec),
    )
    .await?;
    Ok(rows.into_iter().map(PatientResponse::from).collect())
}

/// Save a record authored by `staff`, the caller's authenticated identity.
pub async fn save_medical_record(
    state: &AppState,
    record: &NewMedicalRecord,
    staff: &Identity,
) -> AppResult<MedicalRecordResponse> {
    let row = with_deadline(
        state.config.context_timeout(),
        medical::save_medical_record(&state.pool, record, staff),
    )
    .await?;
    Ok(row.into())
}

pub async fn list_medical_records(
    state: &AppState,
    params: &HashMap<String, String>,
) -> AppResult<Vec<MedicalRecordResponse>> {
    let spec = build_filter(params, MEDICAL_RECORD_FILTERS);
    let rows = with_deadline(
        state.config.context_timeout(),
        medical::list_medical_records(&state.pool, &spec),
    )
    .await?;
    Ok(rows.into_iter().map(MedicalRecordResponse::from).collect())
}
