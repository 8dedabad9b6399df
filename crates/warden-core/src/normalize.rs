//! Input normalization shared by the services and the storage adapters.
//!
//! Names are trimmed, emails are trimmed and lower-cased, and optional
//! free-text fields collapse to `None` when blank.

use uuid::Uuid;

use crate::error::{WardenError, WardenResult};

/// Trim a required name. Fails when nothing is left.
pub fn name(field: &str, raw: &str) -> WardenResult<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(WardenError::validation(format!("{field} must not be empty")));
    }
    Ok(trimmed.to_string())
}

/// Trim and lower-case an email address.
pub fn email(raw: &str) -> WardenResult<String> {
    let normalized = raw.trim().to_lowercase();
    if normalized.is_empty() {
        return Err(WardenError::validation("email must not be empty"));
    }
    match normalized.split_once('@') {
        Some((local, domain)) if !local.is_empty() && !domain.is_empty() => Ok(normalized),
        _ => Err(WardenError::validation(format!(
            "email is malformed: {normalized}"
        ))),
    }
}

/// Trim an optional free-text field; blank becomes `None`.
pub fn optional(raw: Option<String>) -> Option<String> {
    raw.map(|s| s.trim().to_string()).filter(|s| !s.is_empty())
}

/// Trim a plaintext secret before it is hashed or verified.
pub fn secret(raw: &str) -> WardenResult<&str> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(WardenError::validation("secret must not be empty"));
    }
    Ok(trimmed)
}

/// Drop repeated ids, keeping the first occurrence of each.
pub fn unique_ids(ids: impl IntoIterator<Item = Uuid>) -> Vec<Uuid> {
    let mut out: Vec<Uuid> = Vec::new();
    for id in ids {
        if !out.contains(&id) {
            out.push(id);
        }
    }
    out
}
