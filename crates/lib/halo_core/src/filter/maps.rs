//! Column maps for each listable entity.

use super::{ColumnFilter, MatchKind, ValueKind};

pub static USER_FILTERS: &[ColumnFilter] = &[
    ColumnFilter {
        param: "userId",
        column: "id",
        matching: MatchKind::Exact,
        value: ValueKind::Uuid,
    },
    ColumnFilter {
        param: "name",
        column: "name",
        matching: MatchKind::Substring,
        value: ValueKind::Text,
    },
    ColumnFilter {
        param: "nip",
        column: "nip",
        matching: MatchKind::Prefix,
        value: ValueKind::Digits,
    },
    ColumnFilter {
        param: "role",
        column: "is_it",
        matching: MatchKind::Exact,
        value: ValueKind::Role,
    },
];

pub static PATIENT_FILTERS: &[ColumnFilter] = &[
    ColumnFilter {
        param: "identityNumber",
        column: "id",
        matching: MatchKind::Exact,
        value: ValueKind::Digits,
    },
    ColumnFilter {
        param: "name",
        column: "name",
        matching: MatchKind::Substring,
        value: ValueKind::Text,
    },
    ColumnFilter {
        param: "phoneNumber",
        column: "phone_number",
        matching: MatchKind::Prefix,
        value: ValueKind::Phone,
    },
];

pub static MEDICAL_RECORD_FILTERS: &[ColumnFilter] = &[
    ColumnFilter {
        param: "identityDetail.identityNumber",
        column: "patient_id",
        matching: MatchKind::Exact,
        value: ValueKind::Digits,
    },
    ColumnFilter {
        param: "createdBy.userId",
        column: "staff_id",
        matching: MatchKind::Exact,
        value: ValueKind::Uuid,
    },
    ColumnFilter {
        param: "createdBy.nip",
        column: "staff_nip",
        matching: MatchKind::Exact,
        value: ValueKind::Digits,
    },
];
