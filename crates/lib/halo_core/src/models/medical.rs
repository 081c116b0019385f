//! Patient and medical record domain values.

use serde::{Deserialize, Serialize};

/// Patient gender, stored as `is_male`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    Male,
    Female,
}

impl Gender {
    pub fn from_is_male(is_male: bool) -> Self {
        if is_male { Gender::Male } else { Gender::Female }
    }

    pub fn is_male(&self) -> bool {
        matches!(self, Gender::Male)
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "male" => Some(Gender::Male),
            "female" => Some(Gender::Female),
            _ => None,
        }
    }
}
