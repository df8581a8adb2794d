//! Caller identity as carried by the `user` session cookie.

use serde::{Deserialize, Deserializer, Serialize};

/// Role names that grant unrestricted visibility, compared case-insensitively.
const ADMIN_ROLES: [&str; 2] = ["administrador", "admin"];

/// Authenticated caller decoded from the session cookie.
///
/// # Examples
/// ```
/// use crm_bff::domain::SessionUser;
///
/// let user: SessionUser =
///     serde_json::from_str(r#"{"id":"7","name":"Ana","role":"ADMINISTRADOR"}"#)
///         .expect("cookie payload");
/// assert_eq!(user.id, Some(7));
/// assert!(user.is_admin());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionUser {
    /// ERP user key; cookies carry it as a number or numeric string.
    #[serde(default, deserialize_with = "numeric_id")]
    pub id: Option<i64>,
    /// Display name.
    #[serde(default)]
    pub name: Option<String>,
    /// Role label as stored on the user record.
    #[serde(default)]
    pub role: String,
}

impl SessionUser {
    /// Whether the role grants admin visibility.
    #[must_use]
    pub fn is_admin(&self) -> bool {
        is_admin_role(&self.role)
    }
}

/// Whether `role` names an administrator.
#[must_use]
pub fn is_admin_role(role: &str) -> bool {
    let trimmed = role.trim();
    ADMIN_ROLES
        .iter()
        .any(|admin| trimmed.eq_ignore_ascii_case(admin))
}

fn numeric_id<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<i64>, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Int(i64),
        Text(String),
    }

    Ok(match Option::<Raw>::deserialize(deserializer)? {
        Some(Raw::Int(value)) => Some(value),
        Some(Raw::Text(text)) => text.trim().parse().ok(),
        None => None,
    })
}
