//! User domain model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    /// Trimmed and lower-cased; unique across all users.
    pub email: String,
    /// Salted one-way hash of the user's secret. Never serialized.
    #[serde(skip_serializing, default)]
    pub password_hash: String,
    /// At most one role. `None` is the default state.
    pub role_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Store-level input for a new user. The secret is already hashed.
#[derive(Debug, Clone)]
pub struct CreateUser {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: String,
    pub password_hash: String,
}

#[derive(Debug, Clone, Default)]
pub struct UpdateUser {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub password_hash: Option<String>,
}

/// Caller-facing input for registering a user with a plaintext secret.
#[derive(Debug, Clone, Deserialize)]
pub struct NewUser {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: String,
    pub secret: String,
}

/// Caller-facing partial update. Absent fields are left untouched.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UserChanges {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub secret: Option<String>,
}
