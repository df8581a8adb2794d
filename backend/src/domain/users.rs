//! Application users stored in the ERP's `AD_USUARIOSVENDAS` entity.
//!
//! Unlike funnels and leads, users travel to the client in camelCase and the
//! stored password hash never leaves the service.

use serde::{Deserialize, Deserializer, Serialize};
use utoipa::ToSchema;

use super::schema::ErpRecord;

/// Role written for self-registered users.
pub const REGISTERED_ROLE: &str = "Usuário";
/// Role assumed when the ERP row carries none.
pub const DEFAULT_ROLE: &str = "Vendedor";

/// Account status.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub enum UserStatus {
    /// Awaiting approval.
    #[default]
    #[serde(rename = "pendente")]
    Pending,
    /// Approved.
    #[serde(rename = "ativo")]
    Active,
    /// Blocked, which is also how users are deleted.
    #[serde(rename = "bloqueado")]
    Blocked,
}

impl UserStatus {
    /// ERP text for the status.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pendente",
            Self::Active => "ativo",
            Self::Blocked => "bloqueado",
        }
    }

    /// Parse ERP text, treating anything unknown as pending.
    #[must_use]
    pub fn parse(raw: &str) -> Self {
        match raw.trim().to_lowercase().as_str() {
            "ativo" => Self::Active,
            "bloqueado" => Self::Blocked,
            _ => Self::Pending,
        }
    }
}

/// A user as seen by the application.
#[derive(Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct User {
    /// ERP key; `0` when the ERP has not reported one yet.
    pub id: i64,
    /// Display name.
    pub name: String,
    /// Login e-mail.
    pub email: String,
    /// Role label.
    pub role: String,
    /// Account status.
    pub status: UserStatus,
    /// Stored bcrypt hash.
    #[serde(skip)]
    pub password_hash: String,
    /// Avatar URL or empty.
    pub avatar: String,
    /// Linked ERP salesperson.
    pub cod_vendedor: Option<String>,
}

impl std::fmt::Debug for User {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("User")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("email", &self.email)
            .field("role", &self.role)
            .field("status", &self.status)
            .field("avatar", &self.avatar)
            .field("cod_vendedor", &self.cod_vendedor)
            .finish_non_exhaustive()
    }
}

impl From<&ErpRecord> for User {
    fn from(record: &ErpRecord) -> Self {
        Self {
            id: record
                .get("CODUSUARIO")
                .and_then(|raw| raw.trim().parse().ok())
                .unwrap_or_default(),
            name: record.text("NOME"),
            email: record.text("EMAIL"),
            role: record
                .non_blank("FUNCAO")
                .unwrap_or_else(|| DEFAULT_ROLE.to_owned()),
            status: record
                .get("STATUS")
                .map(UserStatus::parse)
                .unwrap_or_default(),
            password_hash: record.text("SENHA"),
            avatar: record.text("AVATAR"),
            cod_vendedor: record.non_blank("CODVEND"),
        }
    }
}

/// Data for an administrator-created user.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct NewUser {
    /// Display name.
    pub name: String,
    /// Login e-mail.
    pub email: String,
    /// Plain password, or an existing bcrypt hash to store verbatim.
    pub password: String,
    /// Role label.
    #[serde(default = "default_role")]
    pub role: String,
    /// Initial status.
    #[serde(default)]
    pub status: UserStatus,
    /// Avatar URL.
    #[serde(default)]
    pub avatar: Option<String>,
    /// Linked ERP salesperson.
    #[serde(default)]
    pub cod_vendedor: Option<String>,
}

/// Partial update; absent fields keep their stored value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserPatch {
    /// New display name.
    #[serde(default)]
    pub name: Option<String>,
    /// New e-mail.
    #[serde(default)]
    pub email: Option<String>,
    /// New role.
    #[serde(default)]
    pub role: Option<String>,
    /// New status.
    #[serde(default)]
    pub status: Option<UserStatus>,
    /// New avatar.
    #[serde(default)]
    pub avatar: Option<String>,
    /// New salesperson link; an explicit `null` clears it.
    #[serde(default, deserialize_with = "present")]
    #[schema(value_type = Option<String>)]
    pub cod_vendedor: Option<Option<String>>,
    /// New password; blank keeps the current one.
    #[serde(default)]
    pub password: Option<String>,
}

impl UserPatch {
    /// Patch that only changes the status.
    #[must_use]
    pub fn status(status: UserStatus) -> Self {
        Self {
            status: Some(status),
            ..Self::default()
        }
    }
}

fn default_role() -> String {
    DEFAULT_ROLE.to_owned()
}

/// Distinguish an explicit `null` from an absent key.
fn present<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<Option<String>>, D::Error> {
    Option::<String>::deserialize(deserializer).map(Some)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use serde_json::json;

    #[rstest]
    fn user_defaults_missing_columns() {
        let record: ErpRecord = [("CODUSUARIO", "5"), ("NOME", "Ana"), ("STATUS", "??")]
            .into_iter()
            .collect();

        let user = User::from(&record);
        assert_eq!(user.id, 5);
        assert_eq!(user.role, DEFAULT_ROLE);
        assert_eq!(user.status, UserStatus::Pending);
        assert_eq!(user.cod_vendedor, None);
    }

    #[rstest]
    fn user_serialises_camel_case_without_hash() {
        let record: ErpRecord = [
            ("CODUSUARIO", "5"),
            ("SENHA", "$2b$10$secret"),
            ("STATUS", "ativo"),
            ("CODVEND", "12"),
        ]
        .into_iter()
        .collect();

        let value = serde_json::to_value(User::from(&record)).expect("serialise");
        assert_eq!(value["codVendedor"], "12");
        assert_eq!(value["status"], "ativo");
        assert!(value.get("passwordHash").is_none());
        assert!(!value.to_string().contains("secret"));
        assert!(!format!("{:?}", User::from(&record)).contains("secret"));
    }

    #[rstest]
    #[case::pending("pendente", UserStatus::Pending)]
    #[case::active("Ativo", UserStatus::Active)]
    #[case::blocked("bloqueado", UserStatus::Blocked)]
    fn status_parses_case_insensitively(#[case] raw: &str, #[case] expected: UserStatus) {
        assert_eq!(UserStatus::parse(raw), expected);
        assert_eq!(expected.as_str(), UserStatus::parse(expected.as_str()).as_str());
    }

    #[rstest]
    #[case::absent(json!({}), None)]
    #[case::cleared(json!({ "codVendedor": null }), Some(None))]
    #[case::set(json!({ "codVendedor": "9" }), Some(Some("9".to_owned())))]
    fn patch_distinguishes_null_from_absent(
        #[case] raw: serde_json::Value,
        #[case] expected: Option<Option<String>>,
    ) {
        let patch: UserPatch = serde_json::from_value(raw).expect("patch");
        assert_eq!(patch.cod_vendedor, expected);
    }

    #[rstest]
    fn new_user_defaults_role_and_status() {
        let user: NewUser = serde_json::from_value(json!({
            "name": "Ana",
            "email": "ana@example.com",
            "password": "pw"
        }))
        .expect("new user");
        assert_eq!(user.role, DEFAULT_ROLE);
        assert_eq!(user.status, UserStatus::Pending);
    }
}
