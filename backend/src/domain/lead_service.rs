//! Lead use-cases over the ERP gateway.

use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;
use tracing::{debug, info};

use super::criteria::{Criteria, CriteriaValue};
use super::erp_date::{ErpDate, erp_flag, to_erp_date};
use super::funnel_service::resolve_inserted;
use super::funnels::{DEFAULT_COLOR, or_blank};
use super::leads::{Lead, LeadDraft, LeadStatus};
use super::ports::{ErpGateway, LeadsCommand, LeadsQuery};
use super::read_after_write::ReadAfterWrite;
use super::schema::{FieldValue, LEADS, LoadRequest, SaveRequest};
use super::Error;

/// Lead service backed by an [`ErpGateway`].
#[derive(Clone)]
pub struct LeadService {
    gateway: Arc<dyn ErpGateway>,
    clock: Arc<dyn Clock>,
    read_after_write: ReadAfterWrite,
}

impl LeadService {
    /// Build the service with the default read-after-write policy.
    pub fn new(gateway: Arc<dyn ErpGateway>, clock: Arc<dyn Clock>) -> Self {
        Self {
            gateway,
            clock,
            read_after_write: ReadAfterWrite::default(),
        }
    }

    /// Replace the read-after-write policy.
    #[must_use]
    pub fn with_read_after_write(mut self, policy: ReadAfterWrite) -> Self {
        self.read_after_write = policy;
        self
    }

    fn today(&self) -> String {
        ErpDate::today(self.clock.as_ref()).to_string()
    }

    async fn load_leads(&self, criteria: Criteria) -> Result<Vec<Lead>, Error> {
        let request = LoadRequest::new(&LEADS).filter(criteria)?;
        let records = self.gateway.load(&request).await?;
        debug!(count = records.len(), "leads loaded");
        Ok(records.iter().map(Lead::from).collect())
    }

    /// Editable columns shared by inserts and updates, in ERP order.
    fn editable_values(draft: &LeadDraft) -> Result<Vec<(&'static str, FieldValue)>, Error> {
        let due_date = to_erp_date(draft.due_date.as_deref().unwrap_or_default())?;
        let tag_color = draft
            .tag_color
            .as_deref()
            .filter(|color| !color.trim().is_empty())
            .unwrap_or(DEFAULT_COLOR);
        Ok(vec![
            ("NOME", or_blank(draft.name.as_ref()).into()),
            ("DESCRICAO", or_blank(draft.description.as_ref()).into()),
            ("VALOR", draft.value.unwrap_or_default().to_string().into()),
            ("CODESTAGIO", or_blank(draft.stage_id.as_ref()).into()),
            ("DATA_VENCIMENTO", due_date.into()),
            ("TIPO_TAG", or_blank(draft.tag_type.as_ref()).into()),
            ("COR_TAG", tag_color.into()),
            ("CODPARC", draft.partner_id.clone().into()),
            ("CODFUNIL", or_blank(draft.funnel_id.as_ref()).into()),
        ])
    }
}

#[async_trait]
impl LeadsQuery for LeadService {
    async fn list_leads(&self, user_id: Option<i64>, is_admin: bool) -> Result<Vec<Lead>, Error> {
        if is_admin {
            return self.load_leads(Criteria::active()).await;
        }
        let Some(user_id) = user_id else {
            debug!("lead listing without user id; returning empty");
            return Ok(Vec::new());
        };
        self.load_leads(Criteria::active().and(Criteria::eq("CODUSUARIO", user_id)))
            .await
    }
}

#[async_trait]
impl LeadsCommand for LeadService {
    async fn save_lead(&self, draft: LeadDraft, creator_id: Option<i64>) -> Result<Lead, Error> {
        let today = self.today();
        let mut values = Self::editable_values(&draft)?;

        let request = if let Some(id) = draft.id.as_deref() {
            values.push(("DATA_ATUALIZACAO", today.into()));
            SaveRequest::update(&LEADS, id, values)?
        } else {
            values.extend([
                (
                    "CODUSUARIO",
                    creator_id.map(|id| id.to_string()).unwrap_or_default().into(),
                ),
                ("ATIVO", erp_flag::YES.into()),
                ("DATA_CRIACAO", today.clone().into()),
                ("DATA_ATUALIZACAO", today.into()),
                ("STATUS_LEAD", LeadStatus::EmAndamento.as_str().into()),
            ]);
            SaveRequest::insert(&LEADS, values)?
        };

        let outcome = self.gateway.save(&request).await?;
        self.read_after_write.settle().await;
        let leads = self.load_leads(Criteria::active()).await?;

        let saved = match draft.id.as_deref() {
            Some(id) => leads.into_iter().find(|lead| lead.id == id),
            None => resolve_inserted(leads, outcome.primary_key.as_deref(), |lead| {
                lead.id.as_str()
            }),
        };
        let lead = saved.ok_or_else(|| Error::not_found("lead not found after save"))?;
        info!(lead_id = %lead.id, "lead saved");
        Ok(lead)
    }

    async fn update_lead_stage(
        &self,
        lead_id: &str,
        stage_id: &str,
    ) -> Result<Option<Lead>, Error> {
        let request = SaveRequest::update(
            &LEADS,
            lead_id,
            vec![
                ("CODESTAGIO", stage_id.into()),
                ("DATA_ATUALIZACAO", self.today().into()),
            ],
        )?;
        self.gateway.save(&request).await?;
        self.read_after_write.settle().await;

        let lead = self
            .load_leads(Criteria::Eq("CODLEAD", CriteriaValue::key(lead_id)).and(Criteria::active()))
            .await?
            .into_iter()
            .find(|lead| lead.id == lead_id);
        info!(lead_id, stage_id, found = lead.is_some(), "lead moved");
        Ok(lead)
    }

    async fn delete_lead(&self, lead_id: &str) -> Result<(), Error> {
        let request = SaveRequest::update(
            &LEADS,
            lead_id,
            vec![
                ("ATIVO", erp_flag::NO.into()),
                ("DATA_ATUALIZACAO", self.today().into()),
            ],
        )?;
        self.gateway.save(&request).await?;
        info!(lead_id, "lead deactivated");
        Ok(())
    }
}

#[cfg(test)]
#[path = "lead_service_tests.rs"]
mod tests;
