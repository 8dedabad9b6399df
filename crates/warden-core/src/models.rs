//! Domain models for Warden.

pub mod permission;
pub mod role;
pub mod user;
