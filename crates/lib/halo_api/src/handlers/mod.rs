//! Request handlers.

pub mod image;
pub mod info;
pub mod medical;
pub mod user;
