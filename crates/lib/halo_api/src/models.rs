//! Request and response bodies, with request validation.
//!
//! Every `validate` collects all violations and reports them together as a
//! single `400`.

use std::fmt;

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use uuid::Uuid;

use halo_core::medical::{MedicalRecordRow, NewMedicalRecord, NewPatient, PatientRow};
use halo_core::models::medical::Gender;
use halo_core::models::user::{Nip, Role};
use halo_core::users::UserRow;

use crate::error::{AppError, AppResult};

const USER_NAME_LEN: (usize, usize) = (5, 50);
const PASSWORD_LEN: (usize, usize) = (5, 33);
const PATIENT_NAME_LEN: (usize, usize) = (3, 30);
const PHONE_LEN: (usize, usize) = (10, 15);
const PHONE_PREFIX: &str = "+62";
const IDENTITY_NUMBER_LEN: usize = 16;
const FREE_TEXT_LEN: (usize, usize) = (1, 2000);

/// Error body returned by every failing route.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
}

/// Success envelope.
#[derive(Debug, Clone, Serialize)]
pub struct ApiResponse<T> {
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

impl<T> ApiResponse<T> {
    pub fn with_data(message: &str, data: T) -> Self {
        Self {
            message: message.to_string(),
            data: Some(data),
        }
    }
}

impl ApiResponse<()> {
    pub fn message(message: &str) -> Self {
        Self {
            message: message.to_string(),
            data: None,
        }
    }
}

/// A digit string carried as a JSON number (`nip`, `identityNumber`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NumericId(pub String);

impl NumericId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for NumericId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for NumericId {
    fn deserialize<D: Deserializer<'de>>(d: D) -> Result<Self, D::Error> {
        let n = u64::deserialize(d)
            .map_err(|_| serde::de::Error::custom("value must be a number"))?;
        Ok(NumericId(n.to_string()))
    }
}

impl Serialize for NumericId {
    fn serialize<S: Serializer>(&self, s: S) -> Result<S::Ok, S::Error> {
        match self.0.parse::<u64>() {
            Ok(n) => s.serialize_u64(n),
            Err(_) => s.serialize_str(&self.0),
        }
    }
}

/// Accumulates validation messages.
#[derive(Debug, Default)]
struct Violations(Vec<String>);

impl Violations {
    fn push(&mut self, msg: impl Into<String>) {
        self.0.push(msg.into());
    }

    fn text_len(&mut self, field: &str, value: &str, (min, max): (usize, usize)) {
        let len = value.chars().count();
        if len == 0 {
            self.push(format!("{field} is required"));
        } else if len < min || len > max {
            self.push(format!("{field} must have {min} to {max} characters"));
        }
    }

    fn nip(&mut self, nip: Option<&NumericId>, role: Role) -> Option<Nip> {
        let Some(raw) = nip else {
            self.push("nip is required");
            return None;
        };
        match Nip::parse_for(raw.as_str(), role) {
            Ok(nip) => Some(nip),
            Err(e) => {
                self.0.extend(e.0);
                None
            }
        }
    }

    fn identity_number(&mut self, id: Option<&NumericId>) -> Option<String> {
        let Some(raw) = id else {
            self.push("identityNumber is required");
            return None;
        };
        if raw.as_str().len() != IDENTITY_NUMBER_LEN {
            self.push(format!(
                "identityNumber must have {IDENTITY_NUMBER_LEN} characters"
            ));
            return None;
        }
        Some(raw.0.clone())
    }

    fn image_url(&mut self, raw: &str) {
        if raw.is_empty() {
            self.push("identity card scan image URL is required");
        } else if !is_public_url(raw) {
            self.push("identity card scan image URL must be a valid URL");
        }
    }

    fn finish(self) -> AppResult<()> {
        if self.0.is_empty() {
            Ok(())
        } else {
            Err(AppError::Validation(self.0.join("; ")))
        }
    }
}

/// http(s) URL whose host contains a dot.
fn is_public_url(raw: &str) -> bool {
    url::Url::parse(raw).is_ok_and(|u| {
        matches!(u.scheme(), "http" | "https") && u.host_str().is_some_and(|h| h.contains('.'))
    })
}

fn rfc3339(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Millis, true)
}

// ---------------------------------------------------------------------------
// Users
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
pub struct RegisterItRequest {
    pub nip: Option<NumericId>,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub password: String,
}

impl RegisterItRequest {
    pub fn validate(&self) -> AppResult<Nip> {
        let mut v = Violations::default();
        let nip = v.nip(self.nip.as_ref(), Role::It);
        v.text_len("name", &self.name, USER_NAME_LEN);
        v.text_len("password", &self.password, PASSWORD_LEN);
        v.finish()?;
        nip.ok_or_else(|| AppError::Validation("nip is required".into()))
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoginRequest {
    pub nip: Option<NumericId>,
    #[serde(default)]
    pub password: String,
}

impl LoginRequest {
    /// A NIP for the wrong role passes here; the route rejects it as an
    /// unknown NIP instead.
    pub fn validate(&self) -> AppResult<Nip> {
        let mut v = Violations::default();
        let nip = match self.nip.as_ref() {
            None => {
                v.push("nip is required");
                None
            }
            Some(raw) => match Nip::parse(raw.as_str()) {
                Ok(nip) => Some(nip),
                Err(e) => {
                    v.0.extend(e.0);
                    None
                }
            },
        };
        v.text_len("password", &self.password, PASSWORD_LEN);
        v.finish()?;
        nip.ok_or_else(|| AppError::Validation("nip is required".into()))
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterNurseRequest {
    pub nip: Option<NumericId>,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub identity_card_scan_img: String,
}

impl RegisterNurseRequest {
    pub fn validate(&self) -> AppResult<Nip> {
        let mut v = Violations::default();
        let nip = v.nip(self.nip.as_ref(), Role::Nurse);
        v.text_len("name", &self.name, USER_NAME_LEN);
        v.image_url(&self.identity_card_scan_img);
        v.finish()?;
        nip.ok_or_else(|| AppError::Validation("nip is required".into()))
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct UpdateNurseRequest {
    pub nip: Option<NumericId>,
    #[serde(default)]
    pub name: String,
}

impl UpdateNurseRequest {
    pub fn validate(&self) -> AppResult<Nip> {
        let mut v = Violations::default();
        let nip = v.nip(self.nip.as_ref(), Role::Nurse);
        v.text_len("name", &self.name, USER_NAME_LEN);
        v.finish()?;
        nip.ok_or_else(|| AppError::Validation("nip is required".into()))
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct UpdateAccessRequest {
    #[serde(default)]
    pub password: String,
}

impl UpdateAccessRequest {
    pub fn validate(&self) -> AppResult<()> {
        let mut v = Violations::default();
        v.text_len("password", &self.password, PASSWORD_LEN);
        v.finish()
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthUserResponse {
    pub user_id: Uuid,
    pub nip: NumericId,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub access_token: Option<String>,
}

impl AuthUserResponse {
    pub fn new(user_id: Uuid, nip: &str, name: &str, access_token: Option<String>) -> Self {
        Self {
            user_id,
            nip: NumericId(nip.to_string()),
            name: name.to_string(),
            access_token,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    pub user_id: Uuid,
    pub nip: NumericId,
    pub name: String,
    pub created_at: String,
}

impl From<UserRow> for UserResponse {
    fn from(row: UserRow) -> Self {
        Self {
            user_id: row.id,
            nip: NumericId(row.nip),
            name: row.name,
            created_at: rfc3339(row.created_at),
        }
    }
}

// ---------------------------------------------------------------------------
// Medical
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordPatientRequest {
    pub identity_number: Option<NumericId>,
    #[serde(default)]
    pub phone_number: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub birth_date: String,
    #[serde(default)]
    pub gender: String,
    #[serde(default)]
    pub identity_card_scan_img: String,
}

impl RecordPatientRequest {
    pub fn validate(&self) -> AppResult<NewPatient> {
        let mut v = Violations::default();

        let id = v.identity_number(self.identity_number.as_ref());

        let phone = self.phone_number.as_str();
        let phone_len = phone.chars().count();
        if phone.is_empty() {
            v.push("phoneNumber is required");
        } else if phone_len < PHONE_LEN.0 || phone_len > PHONE_LEN.1 {
            v.push(format!(
                "phoneNumber must have {} to {} characters",
                PHONE_LEN.0, PHONE_LEN.1
            ));
        } else if !phone.starts_with(PHONE_PREFIX) {
            v.push(format!("phoneNumber must start with {PHONE_PREFIX}"));
        }

        v.text_len("name", &self.name, PATIENT_NAME_LEN);

        let birth_date = if self.birth_date.is_empty() {
            v.push("birthDate is required");
            None
        } else {
            match DateTime::parse_from_rfc3339(&self.birth_date) {
                Ok(d) => Some(d.with_timezone(&Utc)),
                Err(_) => {
                    v.push("birthDate must be an RFC 3339 timestamp");
                    None
                }
            }
        };

        let gender = if self.gender.is_empty() {
            v.push("gender is required");
            None
        } else {
            let g = Gender::parse(&self.gender);
            if g.is_none() {
                v.push("gender must be either male or female");
            }
            g
        };

        v.image_url(&self.identity_card_scan_img);
        v.finish()?;

        match (id, birth_date, gender) {
            (Some(id), Some(birth_date), Some(gender)) => Ok(NewPatient {
                id,
                phone_number: phone.trim_start_matches('+').to_string(),
                name: self.name.clone(),
                birth_date,
                gender,
                img_url: self.identity_card_scan_img.clone(),
            }),
            _ => Err(AppError::Validation("invalid patient".into())),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PatientResponse {
    pub identity_number: NumericId,
    pub phone_number: String,
    pub name: String,
    pub birth_date: String,
    pub gender: Gender,
    pub created_at: String,
}

impl From<PatientRow> for PatientResponse {
    fn from(row: PatientRow) -> Self {
        let gender = row.gender();
        Self {
            identity_number: NumericId(row.id),
            phone_number: format!("+{}", row.phone_number),
            name: row.name,
            birth_date: rfc3339(row.birth_date),
            gender,
            created_at: rfc3339(row.created_at),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MedicalRecordRequest {
    pub identity_number: Option<NumericId>,
    #[serde(default)]
    pub symptoms: String,
    #[serde(default)]
    pub medications: String,
}

impl MedicalRecordRequest {
    pub fn validate(&self) -> AppResult<NewMedicalRecord> {
        let mut v = Violations::default();
        let patient_id = v.identity_number(self.identity_number.as_ref());
        v.text_len("symptoms", &self.symptoms, FREE_TEXT_LEN);
        v.text_len("medications", &self.medications, FREE_TEXT_LEN);
        v.finish()?;

        let patient_id =
            patient_id.ok_or_else(|| AppError::Validation("identityNumber is required".into()))?;
        Ok(NewMedicalRecord {
            patient_id,
            symptoms: self.symptoms.clone(),
            medications: self.medications.clone(),
        })
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IdentityDetail {
    pub identity_number: NumericId,
    pub phone_number: String,
    pub name: String,
    pub birth_date: String,
    pub gender: Gender,
    pub identity_card_scan_img: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatedBy {
    pub nip: NumericId,
    pub name: String,
    pub user_id: Uuid,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MedicalRecordResponse {
    pub identity_detail: IdentityDetail,
    pub symptoms: String,
    pub medications: String,
    pub created_at: String,
    pub created_by: CreatedBy,
}

impl From<MedicalRecordRow> for MedicalRecordResponse {
    fn from(row: MedicalRecordRow) -> Self {
        Self {
            identity_detail: IdentityDetail {
                identity_number: NumericId(row.patient_id),
                phone_number: format!("+{}", row.patient_phone_number),
                name: row.patient_name,
                birth_date: rfc3339(row.patient_birth_date),
                gender: Gender::from_is_male(row.patient_is_male),
                identity_card_scan_img: row.patient_img_url,
            },
            symptoms: row.symptoms,
            medications: row.medications,
            created_at: rfc3339(row.created_at),
            created_by: CreatedBy {
                nip: NumericId(row.staff_nip),
                name: row.staff_name,
                user_id: row.staff_id,
            },
        }
    }
}

// ---------------------------------------------------------------------------
// Image / info
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageUploadResponse {
    pub image_url: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct VersionResponse {
    pub version: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    pub status: String,
    pub idle_conns: usize,
    pub total_conns: u32,
    pub max_conns: u32,
}
