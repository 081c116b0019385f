//! Patient and medical record persistence.

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use thiserror::Error;
use tracing::debug;
use uuid::Uuid;

use crate::filter::maps::{MEDICAL_RECORD_FILTERS, PATIENT_FILTERS};
use crate::filter::{FilterSpec, bind_params, render};
use crate::models::medical::Gender;
use crate::models::user::Identity;
use crate::ids;

const PATIENT_COLUMNS: &str = "id, phone_number, name, birth_date, is_male, img_url, created_at";

const MEDICAL_RECORD_COLUMNS: &str = "id, patient_id, patient_phone_number, patient_name, \
     patient_birth_date, patient_is_male, patient_img_url, symptoms, medications, \
     staff_id, staff_nip, staff_name, created_at";

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct PatientRow {
    pub id: String,
    pub phone_number: String,
    pub name: String,
    pub birth_date: DateTime<Utc>,
    pub is_male: bool,
    pub img_url: String,
    pub created_at: DateTime<Utc>,
}

impl PatientRow {
    pub fn gender(&self) -> Gender {
        Gender::from_is_male(self.is_male)
    }
}

/// A medical record with the patient and staff snapshots taken when it was
/// written.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct MedicalRecordRow {
    pub id: Uuid,
    pub patient_id: String,
    pub patient_phone_number: String,
    pub patient_name: String,
    pub patient_birth_date: DateTime<Utc>,
    pub patient_is_male: bool,
    pub patient_img_url: String,
    pub symptoms: String,
    pub medications: String,
    pub staff_id: Uuid,
    pub staff_nip: String,
    pub staff_name: String,
    pub created_at: DateTime<Utc>,
}

/// Validated patient input.
#[derive(Debug, Clone)]
pub struct NewPatient {
    /// 16-digit identity number.
    pub id: String,
    /// Digits only; the leading `+` is already stripped.
    pub phone_number: String,
    pub name: String,
    pub birth_date: DateTime<Utc>,
    pub gender: Gender,
    pub img_url: String,
}

#[derive(Debug, Clone)]
pub struct NewMedicalRecord {
    pub patient_id: String,
    pub symptoms: String,
    pub medications: String,
}

#[derive(Debug, Error)]
pub enum MedicalError {
    #[error("Patient already registered")]
    DuplicatePatient,

    #[error("Patient not found")]
    PatientNotFound,

    #[error("Database error: {0}")]
    DbError(sqlx::Error),
}

impl From<sqlx::Error> for MedicalError {
    fn from(e: sqlx::Error) -> Self {
        if e.as_database_error()
            .is_some_and(|db| db.is_unique_violation())
        {
            MedicalError::DuplicatePatient
        } else {
            MedicalError::DbError(e)
        }
    }
}

/// Register a patient.
pub async fn record_patient(pool: &PgPool, patient: &NewPatient) -> Result<PatientRow, MedicalError> {
    let row = sqlx::query_as::<_, PatientRow>(&format!(
        "INSERT INTO patients (id, phone_number, name, birth_date, is_male, img_url) \
         VALUES ($1, $2, $3, $4, $5, $6) RETURNING {PATIENT_COLUMNS}"
    ))
    .bind(&patient.id)
    .bind(&patient.phone_number)
    .bind(&patient.name)
    .bind(patient.birth_date)
    .bind(patient.gender.is_male())
    .bind(&patient.img_url)
    .fetch_one(pool)
    .await?;
    Ok(row)
}

/// List patients matching `spec`.
pub async fn list_patients(
    pool: &PgPool,
    spec: &FilterSpec,
) -> Result<Vec<PatientRow>, MedicalError> {
    let rendered = render(spec, PATIENT_FILTERS);
    let sql = format!("SELECT {PATIENT_COLUMNS} FROM patients{}", rendered.fragment);
    let rows = bind_params(sqlx::query_as::<_, PatientRow>(&sql), &rendered.params)
        .fetch_all(pool)
        .await?;
    Ok(rows)
}

/// Write a medical record for an existing patient, snapshotting the patient
/// row and the authoring staff member.
pub async fn save_medical_record(
    pool: &PgPool,
    record: &NewMedicalRecord,
    staff: &Identity,
) -> Result<MedicalRecordRow, MedicalError> {
    let row = sqlx::query_as::<_, MedicalRecordRow>(&format!(
        "INSERT INTO medical_records (id, patient_id, patient_phone_number, patient_name, \
             patient_birth_date, patient_is_male, patient_img_url, symptoms, medications, \
             staff_id, staff_nip, staff_name) \
         SELECT $1, id, phone_number, name, birth_date, is_male, img_url, $3, $4, $5, $6, $7 \
         FROM patients WHERE id = $2 \
         RETURNING {MEDICAL_RECORD_COLUMNS}"
    ))
    .bind(ids::record_id())
    .bind(&record.patient_id)
    .bind(&record.symptoms)
    .bind(&record.medications)
    .bind(staff.id)
    .bind(&staff.nip)
    .bind(&staff.name)
    .fetch_optional(pool)
    .await?
    .ok_or(MedicalError::PatientNotFound)?;

    debug!(record_id = %row.id, staff_id = %staff.id, "medical record saved");
    Ok(row)
}

/// List medical records matching `spec`.
pub async fn list_medical_records(
    pool: &PgPool,
    spec: &FilterSpec,
) -> Result<Vec<MedicalRecordRow>, MedicalError> {
    let rendered = render(spec, MEDICAL_RECORD_FILTERS);
    let sql = format!(
        "SELECT {MEDICAL_RECORD_COLUMNS} FROM medical_records{}",
        rendered.fragment
    );
    let rows = bind_params(sqlx::query_as::<_, MedicalRecordRow>(&sql), &rendered.params)
        .fetch_all(pool)
        .await?;
    Ok(rows)
}
