//! # halo_core
//!
//! Core domain logic for Halo: staff identities and NIP rules, token issuing
//! and caching, the request auth gate, list-query filters, and persistence.

pub mod auth;
pub mod filter;
pub mod ids;
pub mod medical;
pub mod migrate;
pub mod models;
pub mod users;

/// Returns the crate version.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn version_is_not_empty() {
        assert!(!version().is_empty());
    }
}
