//! Identifiers minted by the API. Patients are keyed by their 16-digit
//! identity number and never get one of these.

use uuid::Uuid;

/// Primary key for a new staff row. UUIDv7, so it sorts with `created_at`.
pub fn staff_id() -> Uuid {
    Uuid::now_v7()
}

/// Primary key for a new medical record.
pub fn record_id() -> Uuid {
    Uuid::now_v7()
}

/// Object name for an uploaded file: a fresh UUIDv7 plus `extension`.
pub fn object_name(extension: &str) -> String {
    format!("{}.{extension}", Uuid::now_v7())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn row_ids_are_time_ordered() {
        let first = staff_id();
        let second = record_id();
        assert_eq!(first.get_version(), Some(uuid::Version::SortRand));
        assert!(second >= first);
    }

    #[test]
    fn object_name_keeps_extension() {
        let name = object_name("jpg");
        let (stem, ext) = name.rsplit_once('.').unwrap();
        assert_eq!(ext, "jpg");
        assert!(Uuid::parse_str(stem).is_ok());
    }
}
