//! Staff identity, roles, and the NIP staff number.

use std::fmt;

use chrono::{Datelike, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use super::medical::Gender;

/// Number of digits in a NIP.
pub const NIP_LEN: usize = 13;

/// Earliest year a NIP may encode.
const NIP_MIN_YEAR: i32 = 2000;

/// Staff role. The NIP prefix determines it at registration time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Role {
    #[serde(rename = "IT")]
    It,
    Nurse,
}

impl Role {
    /// Wire name of the role (`"IT"` / `"Nurse"`).
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::It => "IT",
            Role::Nurse => "Nurse",
        }
    }

    /// The three-digit NIP prefix that encodes this role.
    pub fn nip_prefix(&self) -> &'static str {
        match self {
            Role::It => "615",
            Role::Nurse => "303",
        }
    }

    /// Resolve the role encoded by a NIP prefix.
    pub fn from_nip(nip: &str) -> Option<Self> {
        match nip.get(..3)? {
            "615" => Some(Role::It),
            "303" => Some(Role::Nurse),
            _ => None,
        }
    }

    /// Loose parse used by list filters: `it` / `nurse`, any case.
    pub fn parse_loose(raw: &str) -> Option<Self> {
        let raw = raw.trim();
        if raw.eq_ignore_ascii_case("it") {
            Some(Role::It)
        } else if raw.eq_ignore_ascii_case("nurse") {
            Some(Role::Nurse)
        } else {
            None
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// All problems found while validating a NIP, reported together.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{}", .0.join("; "))]
pub struct NipError(pub Vec<String>);

/// A validated 13-digit staff number.
///
/// Layout: role prefix (3), gender (1), year (4), month (2), sequence (3).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Nip(String);

impl Nip {
    /// Validate a NIP whose role prefix must be `role`'s.
    pub fn parse_for(raw: &str, role: Role) -> Result<Self, NipError> {
        Self::validate(raw, Some(role))
    }

    /// Validate a NIP carrying any known role prefix.
    pub fn parse(raw: &str) -> Result<Self, NipError> {
        Self::validate(raw, None)
    }

    fn validate(raw: &str, role: Option<Role>) -> Result<Self, NipError> {
        if raw.len() != NIP_LEN || !raw.bytes().all(|b| b.is_ascii_digit()) {
            return Err(NipError(vec![format!("nip must have {NIP_LEN} digits")]));
        }

        let mut errs = Vec::new();

        match role {
            Some(role) if &raw[..3] != role.nip_prefix() => errs.push(format!(
                "nip must have {} in the first three characters",
                role.nip_prefix()
            )),
            None if Role::from_nip(raw).is_none() => {
                errs.push("nip must start with a known role prefix".to_string())
            }
            _ => {}
        }

        if !matches!(&raw[3..4], "1" | "2") {
            errs.push("nip must have 1 or 2 in the fourth character".to_string());
        }

        let year: i32 = raw[4..8].parse().unwrap_or(0);
        if year < NIP_MIN_YEAR || year > Utc::now().year() {
            errs.push(format!(
                "nip must have valid year from {NIP_MIN_YEAR} to current year"
            ));
        }

        let month: u32 = raw[8..10].parse().unwrap_or(0);
        if !(1..=12).contains(&month) {
            errs.push("nip must have valid month from 1 to 12".to_string());
        }

        if errs.is_empty() {
            Ok(Self(raw.to_string()))
        } else {
            Err(NipError(errs))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Role encoded by the prefix. Always present for a validated NIP.
    pub fn role(&self) -> Role {
        Role::from_nip(&self.0).unwrap_or(Role::Nurse)
    }

    /// Gender encoded by the fourth digit.
    pub fn gender(&self) -> Gender {
        if &self.0[3..4] == "1" {
            Gender::Male
        } else {
            Gender::Female
        }
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for Nip {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Identity resolved for an authenticated request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub id: Uuid,
    pub nip: String,
    pub name: String,
    pub role: Role,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nurse_nip_is_accepted_for_nurse_role() {
        let nip = Nip::parse_for("3031200101234", Role::Nurse).unwrap();
        assert_eq!(nip.role(), Role::Nurse);
        assert_eq!(nip.gender(), Gender::Male);
    }

    #[test]
    fn it_nip_prefix_encodes_it_role() {
        let nip = Nip::parse("6152200112001").unwrap();
        assert_eq!(nip.role(), Role::It);
        assert_eq!(nip.gender(), Gender::Female);
    }

    #[test]
    fn wrong_prefix_for_role_is_rejected() {
        let err = Nip::parse_for("3031200101234", Role::It).unwrap_err();
        assert_eq!(err.0, vec!["nip must have 615 in the first three characters"]);
    }

    #[test]
    fn short_nip_reports_only_length() {
        let err = Nip::parse("30312001").unwrap_err();
        assert_eq!(err.0.len(), 1);
        assert!(err.to_string().contains("13 digits"));
    }

    #[test]
    fn every_violation_is_collected() {
        // bad gender digit, year before 2000, month 13
        let err = Nip::parse("3033199913123").unwrap_err();
        assert_eq!(err.0.len(), 3, "{err}");
    }

    #[test]
    fn unknown_prefix_is_rejected_without_role() {
        assert!(Nip::parse("1111200101234").is_err());
    }

    #[test]
    fn future_year_is_rejected() {
        let next_year = Utc::now().year() + 1;
        let raw = format!("3031{next_year}01234");
        assert!(Nip::parse(&raw).is_err());
    }

    #[test]
    fn role_parse_loose_ignores_case() {
        assert_eq!(Role::parse_loose("IT"), Some(Role::It));
        assert_eq!(Role::parse_loose("nurse"), Some(Role::Nurse));
        assert_eq!(Role::parse_loose("admin"), None);
    }

    #[test]
    fn role_serializes_to_wire_names() {
        assert_eq!(serde_json::to_string(&Role::It).unwrap(), "\"IT\"");
        assert_eq!(serde_json::to_string(&Role::Nurse).unwrap(), "\"Nurse\"");
    }
}
