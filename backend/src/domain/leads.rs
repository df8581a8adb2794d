//! Lead projection of the `AD_LEADS` entity and the client draft used to
//! write it.

use serde::{Deserialize, Deserializer, Serialize};
use utoipa::ToSchema;

use super::erp_date::{ErpDate, erp_flag, lenient_id, parse_optional_date};
use super::schema::ErpRecord;

/// Lifecycle of a lead.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LeadStatus {
    /// Still being worked.
    EmAndamento,
    /// Closed as won.
    Ganho,
    /// Closed as lost.
    Perdido,
}

impl LeadStatus {
    /// ERP text for the status.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::EmAndamento => "EM_ANDAMENTO",
            Self::Ganho => "GANHO",
            Self::Perdido => "PERDIDO",
        }
    }

    /// Parse ERP text; unknown values yield `None`.
    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim() {
            "EM_ANDAMENTO" => Some(Self::EmAndamento),
            "GANHO" => Some(Self::Ganho),
            "PERDIDO" => Some(Self::Perdido),
            _ => None,
        }
    }
}

/// A sales lead.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Lead {
    /// ERP key.
    #[serde(rename = "CODLEAD")]
    pub id: String,
    /// Display name.
    #[serde(rename = "NOME")]
    pub name: String,
    /// Free-text description.
    #[serde(rename = "DESCRICAO")]
    pub description: String,
    /// Monetary value.
    #[serde(rename = "VALOR")]
    pub value: f64,
    /// Current stage.
    #[serde(rename = "CODESTAGIO")]
    pub stage_id: String,
    /// Owning funnel.
    #[serde(rename = "CODFUNIL")]
    pub funnel_id: String,
    /// Due date, `DD/MM/YYYY`.
    #[serde(rename = "DATA_VENCIMENTO")]
    #[schema(value_type = Option<String>, example = "31/12/2026")]
    pub due_date: Option<ErpDate>,
    /// Tag label.
    #[serde(rename = "TIPO_TAG")]
    pub tag_type: String,
    /// Tag colour.
    #[serde(rename = "COR_TAG")]
    pub tag_color: String,
    /// Business partner, when linked.
    #[serde(rename = "CODPARC")]
    pub partner_id: Option<String>,
    /// User who created the lead.
    #[serde(rename = "CODUSUARIO")]
    pub owner_id: Option<i64>,
    /// Soft-delete flag.
    #[serde(rename = "ATIVO", with = "erp_flag")]
    #[schema(value_type = String, example = "S")]
    pub active: bool,
    /// Creation date.
    #[serde(rename = "DATA_CRIACAO")]
    #[schema(value_type = Option<String>)]
    pub created_at: Option<ErpDate>,
    /// Last update date.
    #[serde(rename = "DATA_ATUALIZACAO")]
    #[schema(value_type = Option<String>)]
    pub updated_at: Option<ErpDate>,
    /// Lifecycle status; `None` when the ERP holds an unknown value.
    #[serde(rename = "STATUS_LEAD")]
    pub status: Option<LeadStatus>,
    /// Why the lead was lost.
    #[serde(rename = "MOTIVO_PERDA")]
    pub loss_reason: Option<String>,
    /// When the lead was won or lost.
    #[serde(rename = "DATA_CONCLUSAO")]
    #[schema(value_type = Option<String>)]
    pub completed_at: Option<ErpDate>,
}

impl From<&ErpRecord> for Lead {
    fn from(record: &ErpRecord) -> Self {
        Self {
            id: record.text("CODLEAD"),
            name: record.text("NOME"),
            description: record.text("DESCRICAO"),
            value: record
                .get("VALOR")
                .and_then(parse_amount)
                .unwrap_or_default(),
            stage_id: record.text("CODESTAGIO"),
            funnel_id: record.text("CODFUNIL"),
            due_date: parse_optional_date(record.get("DATA_VENCIMENTO")),
            tag_type: record.text("TIPO_TAG"),
            tag_color: record.text("COR_TAG"),
            partner_id: record.non_blank("CODPARC"),
            owner_id: record
                .get("CODUSUARIO")
                .and_then(|raw| raw.trim().parse().ok()),
            active: record.get("ATIVO").is_some_and(erp_flag::is_set),
            created_at: parse_optional_date(record.get("DATA_CRIACAO")),
            updated_at: parse_optional_date(record.get("DATA_ATUALIZACAO")),
            status: record.get("STATUS_LEAD").and_then(LeadStatus::parse),
            loss_reason: record.non_blank("MOTIVO_PERDA"),
            completed_at: parse_optional_date(record.get("DATA_CONCLUSAO")),
        }
    }
}

/// Client payload for creating or updating a lead.
///
/// A missing `CODLEAD` means insert. Owner and status are not accepted: they
/// are set once on insert.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, ToSchema)]
pub struct LeadDraft {
    /// Key of the lead to update.
    #[serde(rename = "CODLEAD", default, deserialize_with = "lenient_id")]
    pub id: Option<String>,
    /// Display name.
    #[serde(rename = "NOME", default)]
    pub name: Option<String>,
    /// Description.
    #[serde(rename = "DESCRICAO", default)]
    pub description: Option<String>,
    /// Monetary value, as a number or numeric string.
    #[serde(rename = "VALOR", default, deserialize_with = "lenient_amount")]
    pub value: Option<f64>,
    /// Target stage.
    #[serde(rename = "CODESTAGIO", default, deserialize_with = "lenient_id")]
    pub stage_id: Option<String>,
    /// Due date in ISO or ERP form.
    #[serde(rename = "DATA_VENCIMENTO", default)]
    pub due_date: Option<String>,
    /// Tag label.
    #[serde(rename = "TIPO_TAG", default)]
    pub tag_type: Option<String>,
    /// Tag colour.
    #[serde(rename = "COR_TAG", default)]
    pub tag_color: Option<String>,
    /// Linked partner; absent clears the link.
    #[serde(rename = "CODPARC", default, deserialize_with = "lenient_id")]
    pub partner_id: Option<String>,
    /// Owning funnel.
    #[serde(rename = "CODFUNIL", default, deserialize_with = "lenient_id")]
    pub funnel_id: Option<String>,
}

fn parse_amount(raw: &str) -> Option<f64> {
    raw.trim().replace(',', ".").parse().ok()
}

fn lenient_amount<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<f64>, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Number(f64),
        Text(String),
    }

    match Option::<Raw>::deserialize(deserializer)? {
        None => Ok(None),
        Some(Raw::Number(value)) => Ok(Some(value)),
        Some(Raw::Text(text)) if text.trim().is_empty() => Ok(None),
        Some(Raw::Text(text)) => parse_amount(&text)
            .map(Some)
            .ok_or_else(|| serde::de::Error::custom(format!("invalid amount: {text}"))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use serde_json::json;

    #[rstest]
    fn lead_maps_from_normalised_record() {
        let record: ErpRecord = [
            ("CODLEAD", "12"),
            ("NOME", "Acme"),
            ("VALOR", "1500.5"),
            ("CODUSUARIO", "7"),
            ("ATIVO", "S"),
            ("STATUS_LEAD", "GANHO"),
            ("DATA_VENCIMENTO", "31/12/2026"),
            ("CODPARC", " "),
        ]
        .into_iter()
        .collect();

        let lead = Lead::from(&record);
        assert_eq!(lead.id, "12");
        assert!((lead.value - 1500.5).abs() < f64::EPSILON);
        assert_eq!(lead.owner_id, Some(7));
        assert_eq!(lead.status, Some(LeadStatus::Ganho));
        assert_eq!(lead.partner_id, None, "blank partner is no partner");
        assert_eq!(
            lead.due_date.map(|date| date.to_string()).as_deref(),
            Some("31/12/2026")
        );
    }

    #[rstest]
    #[case::known("PERDIDO", Some(LeadStatus::Perdido))]
    #[case::padded(" EM_ANDAMENTO ", Some(LeadStatus::EmAndamento))]
    #[case::unknown("ARQUIVADO", None)]
    fn status_parses_erp_text(#[case] raw: &str, #[case] expected: Option<LeadStatus>) {
        assert_eq!(LeadStatus::parse(raw), expected);
    }

    #[rstest]
    fn status_serialises_as_erp_text() {
        let value = serde_json::to_value(LeadStatus::EmAndamento).expect("serialise");
        assert_eq!(value, json!("EM_ANDAMENTO"));
        assert_eq!(LeadStatus::EmAndamento.as_str(), "EM_ANDAMENTO");
    }

    #[rstest]
    #[case::number(json!(250), Some(250.0))]
    #[case::text(json!("99,90"), Some(99.9))]
    #[case::blank(json!(""), None)]
    #[case::null(json!(null), None)]
    fn draft_value_is_lenient(#[case] raw: serde_json::Value, #[case] expected: Option<f64>) {
        let draft: LeadDraft =
            serde_json::from_value(json!({ "NOME": "x", "VALOR": raw })).expect("draft");
        assert_eq!(draft.value, expected);
    }

    #[rstest]
    fn draft_rejects_garbage_amount() {
        let result = serde_json::from_value::<LeadDraft>(json!({ "VALOR": "lots" }));
        assert!(result.is_err());
    }

    #[rstest]
    fn draft_ignores_owner_and_status() {
        let draft: LeadDraft = serde_json::from_value(json!({
            "CODLEAD": 4,
            "CODUSUARIO": 99,
            "STATUS_LEAD": "GANHO"
        }))
        .expect("unknown keys are ignored");
        assert_eq!(draft.id.as_deref(), Some("4"));
    }
}
