//! Domain models shared by the auth pipeline, persistence, and the API layer.

pub mod auth;
pub mod medical;
pub mod user;
