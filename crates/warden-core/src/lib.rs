//! Warden Core — domain models, repository traits and the error taxonomy
//! shared by every Warden crate.
//!
//! Storage adapters implement the traits in [`repository`]; the services in
//! `warden-rbac` are generic over them so the authorization logic has no
//! dependency on a particular store.

pub mod credential;
pub mod error;
pub mod models;
pub mod normalize;
pub mod repository;

pub use credential::CredentialHasher;
pub use error::{WardenError, WardenResult};
pub use repository::{ListQuery, Page, Pagination};
