//! Funnel, stage, and permission projections of the ERP entities.
//!
//! Serialised field names match the ERP columns so the web client can keep
//! consuming the shapes it already knows.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::erp_date::{ErpDate, erp_flag, lenient_id, parse_optional_date};
use super::schema::ErpRecord;

/// Colour applied when a funnel or stage is saved without one.
pub const DEFAULT_COLOR: &str = "#3b82f6";

/// A sales funnel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Funnel {
    /// ERP key.
    #[serde(rename = "CODFUNIL")]
    pub id: String,
    /// Display name.
    #[serde(rename = "NOME")]
    pub name: String,
    /// Free-text description.
    #[serde(rename = "DESCRICAO")]
    pub description: String,
    /// Hex colour.
    #[serde(rename = "COR")]
    pub color: String,
    /// Soft-delete flag, `S`/`N` on the wire.
    #[serde(rename = "ATIVO", with = "erp_flag")]
    #[schema(value_type = String, example = "S")]
    pub active: bool,
    /// Creation date, `DD/MM/YYYY`.
    #[serde(rename = "DATA_CRIACAO")]
    #[schema(value_type = Option<String>, example = "16/10/2026")]
    pub created_at: Option<ErpDate>,
    /// Last update date, `DD/MM/YYYY`.
    #[serde(rename = "DATA_ATUALIZACAO")]
    #[schema(value_type = Option<String>, example = "16/10/2026")]
    pub updated_at: Option<ErpDate>,
}

impl From<&ErpRecord> for Funnel {
    fn from(record: &ErpRecord) -> Self {
        Self {
            id: record.text("CODFUNIL"),
            name: record.text("NOME"),
            description: record.text("DESCRICAO"),
            color: record.text("COR"),
            active: record.get("ATIVO").is_some_and(erp_flag::is_set),
            created_at: parse_optional_date(record.get("DATA_CRIACAO")),
            updated_at: parse_optional_date(record.get("DATA_ATUALIZACAO")),
        }
    }
}

/// A stage inside a funnel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct FunnelStage {
    /// ERP key.
    #[serde(rename = "CODESTAGIO")]
    pub id: String,
    /// Owning funnel.
    #[serde(rename = "CODFUNIL")]
    pub funnel_id: String,
    /// Display name.
    #[serde(rename = "NOME")]
    pub name: String,
    /// Position within the funnel, ascending.
    #[serde(rename = "ORDEM")]
    pub rank: i64,
    /// Hex colour.
    #[serde(rename = "COR")]
    pub color: String,
    /// Soft-delete flag.
    #[serde(rename = "ATIVO", with = "erp_flag")]
    #[schema(value_type = String, example = "S")]
    pub active: bool,
}

impl From<&ErpRecord> for FunnelStage {
    fn from(record: &ErpRecord) -> Self {
        Self {
            id: record.text("CODESTAGIO"),
            funnel_id: record.text("CODFUNIL"),
            name: record.text("NOME"),
            rank: record
                .get("ORDEM")
                .and_then(|raw| raw.trim().parse().ok())
                .unwrap_or_default(),
            color: record.text("COR"),
            active: record.get("ATIVO").is_some_and(erp_flag::is_set),
        }
    }
}

/// One funnel grant for one user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FunnelPermission {
    /// ERP key of the grant row.
    pub id: String,
    /// Granted funnel.
    pub funnel_id: String,
}

impl From<&ErpRecord> for FunnelPermission {
    fn from(record: &ErpRecord) -> Self {
        Self {
            id: record.text("CODFUNILUSUARIO"),
            funnel_id: record.text("CODFUNIL"),
        }
    }
}

/// Client payload for creating or updating a funnel.
///
/// A missing `CODFUNIL` means insert.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, ToSchema)]
pub struct FunnelDraft {
    /// Key of the funnel to update.
    #[serde(rename = "CODFUNIL", default, deserialize_with = "lenient_id")]
    pub id: Option<String>,
    /// Display name.
    #[serde(rename = "NOME", default)]
    pub name: Option<String>,
    /// Description.
    #[serde(rename = "DESCRICAO", default)]
    pub description: Option<String>,
    /// Hex colour; blank falls back to [`DEFAULT_COLOR`].
    #[serde(rename = "COR", default)]
    pub color: Option<String>,
}

/// Client payload for creating or updating a stage.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, ToSchema)]
pub struct StageDraft {
    /// Key of the stage to update.
    #[serde(rename = "CODESTAGIO", default, deserialize_with = "lenient_id")]
    pub id: Option<String>,
    /// Owning funnel; required for inserts.
    #[serde(rename = "CODFUNIL", default, deserialize_with = "lenient_id")]
    pub funnel_id: Option<String>,
    /// Display name.
    #[serde(rename = "NOME", default)]
    pub name: Option<String>,
    /// Position within the funnel.
    #[serde(rename = "ORDEM", default)]
    pub rank: Option<i64>,
    /// Hex colour.
    #[serde(rename = "COR", default)]
    pub color: Option<String>,
}

/// Value or empty string.
pub(crate) fn or_blank(value: Option<&String>) -> String {
    value.cloned().unwrap_or_default()
}

/// Non-blank colour or the default.
pub(crate) fn color_or_default(value: Option<&String>) -> String {
    value
        .map(|color| color.trim())
        .filter(|color| !color.is_empty())
        .unwrap_or(DEFAULT_COLOR)
        .to_owned()
}
