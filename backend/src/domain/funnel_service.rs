//! Funnel, stage, and permission use-cases over the ERP gateway.

use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;
use tracing::{debug, info};

use super::criteria::{Criteria, CriteriaValue};
use super::erp_date::{ErpDate, erp_flag};
use super::funnels::{
    Funnel, FunnelDraft, FunnelPermission, FunnelStage, StageDraft, color_or_default, or_blank,
};
use super::ports::{ErpGateway, FunnelsCommand, FunnelsQuery};
use super::read_after_write::ReadAfterWrite;
use super::schema::{
    FUNNEL_PERMISSIONS, FUNNEL_STAGES, FUNNELS, FieldValue, LoadRequest, SaveRequest, SortOrder,
};
use super::Error;

/// Funnel service backed by an [`ErpGateway`].
#[derive(Clone)]
pub struct FunnelService {
    gateway: Arc<dyn ErpGateway>,
    clock: Arc<dyn Clock>,
    read_after_write: ReadAfterWrite,
}

impl FunnelService {
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

    async fn load_funnels(&self, criteria: Criteria) -> Result<Vec<Funnel>, Error> {
        let request = LoadRequest::new(&FUNNELS).filter(criteria)?;
        let records = self.gateway.load(&request).await?;
        Ok(records.iter().map(Funnel::from).collect())
    }

    async fn load_stages(&self, criteria: Criteria) -> Result<Vec<FunnelStage>, Error> {
        let request = LoadRequest::new(&FUNNEL_STAGES)
            .filter(criteria)?
            .order_by("ORDEM", SortOrder::Ascending)?;
        let mut stages: Vec<FunnelStage> = self
            .gateway
            .load(&request)
            .await?
            .iter()
            .map(FunnelStage::from)
            .collect();
        stages.sort_by_key(|stage| stage.rank);
        Ok(stages)
    }

    async fn active_grants(
        &self,
        criteria: Criteria,
        fields: &[&'static str],
    ) -> Result<Vec<FunnelPermission>, Error> {
        let request = LoadRequest::new(&FUNNEL_PERMISSIONS)
            .select(fields)?
            .filter(criteria.and(Criteria::active()))?;
        let records = self.gateway.load(&request).await?;
        Ok(records.iter().map(FunnelPermission::from).collect())
    }
}

/// Pick the row a write produced: the echoed key when it resolves, else the last row.
pub(crate) fn resolve_inserted<T>(
    rows: Vec<T>,
    echoed_key: Option<&str>,
    key_of: impl Fn(&T) -> &str,
) -> Option<T> {
    let mut rows = rows;
    let echoed = echoed_key.and_then(|key| rows.iter().position(|row| key_of(row) == key));
    match echoed {
        Some(position) => Some(rows.swap_remove(position)),
        None => rows.pop(),
    }
}

#[async_trait]
impl FunnelsQuery for FunnelService {
    async fn list_funnels(
        &self,
        user_id: Option<i64>,
        is_admin: bool,
    ) -> Result<Vec<Funnel>, Error> {
        if is_admin {
            return self.load_funnels(Criteria::active()).await;
        }
        let Some(user_id) = user_id else {
            debug!("funnel listing without user id; returning empty");
            return Ok(Vec::new());
        };

        let funnel_ids = self.list_user_funnels(user_id).await?;
        if funnel_ids.is_empty() {
            debug!(user_id, "user has no funnel grants");
            return Ok(Vec::new());
        }

        let keys = funnel_ids.iter().map(|id| CriteriaValue::key(id)).collect();
        self.load_funnels(Criteria::In("CODFUNIL", keys).and(Criteria::active()))
            .await
    }

    async fn list_stages(&self, funnel_id: &str) -> Result<Vec<FunnelStage>, Error> {
        self.load_stages(
            Criteria::Eq("CODFUNIL", CriteriaValue::key(funnel_id)).and(Criteria::active()),
        )
        .await
    }

    async fn list_user_funnels(&self, user_id: i64) -> Result<Vec<String>, Error> {
        let grants = self
            .active_grants(Criteria::eq("CODUSUARIO", user_id), &["CODFUNIL"])
            .await?;
        let mut funnel_ids: Vec<String> = Vec::with_capacity(grants.len());
        for grant in grants {
            if !grant.funnel_id.is_empty() && !funnel_ids.contains(&grant.funnel_id) {
                funnel_ids.push(grant.funnel_id);
            }
        }
        Ok(funnel_ids)
    }
}

#[async_trait]
impl FunnelsCommand for FunnelService {
    async fn save_funnel(&self, draft: FunnelDraft) -> Result<Funnel, Error> {
        let today = self.today();
        let mut values: Vec<(&'static str, FieldValue)> = vec![
            ("NOME", or_blank(draft.name.as_ref()).into()),
            ("DESCRICAO", or_blank(draft.description.as_ref()).into()),
            ("COR", color_or_default(draft.color.as_ref()).into()),
        ];
        let request = if let Some(id) = draft.id.as_deref() {
            values.push(("DATA_ATUALIZACAO", today.into()));
            SaveRequest::update(&FUNNELS, id, values)?
        } else {
            values.extend([
                ("ATIVO", erp_flag::YES.into()),
                ("DATA_CRIACAO", today.clone().into()),
                ("DATA_ATUALIZACAO", today.into()),
            ]);
            SaveRequest::insert(&FUNNELS, values)?
        };

        let outcome = self.gateway.save(&request).await?;
        self.read_after_write.settle().await;
        let funnels = self.list_funnels(None, true).await?;

        let saved = match draft.id.as_deref() {
            Some(id) => funnels.into_iter().find(|funnel| funnel.id == id),
            None => resolve_inserted(funnels, outcome.primary_key.as_deref(), |funnel| {
                funnel.id.as_str()
            }),
        };
        let funnel = saved.ok_or_else(|| Error::not_found("funnel not found after save"))?;
        info!(funnel_id = %funnel.id, "funnel saved");
        Ok(funnel)
    }

    async fn save_stage(&self, draft: StageDraft) -> Result<FunnelStage, Error> {
        let name = or_blank(draft.name.as_ref());
        let rank = draft.rank.unwrap_or_default().to_string();
        let color = color_or_default(draft.color.as_ref());

        if let Some(id) = draft.id.as_deref() {
            let request = SaveRequest::update(
                &FUNNEL_STAGES,
                id,
                vec![
                    ("NOME", name.into()),
                    ("ORDEM", rank.into()),
                    ("COR", color.into()),
                ],
            )?;
            self.gateway.save(&request).await?;
            self.read_after_write.settle().await;
            let stage = self
                .load_stages(Criteria::Eq("CODESTAGIO", CriteriaValue::key(id)))
                .await?
                .into_iter()
                .find(|stage| stage.id == id)
                .ok_or_else(|| Error::not_found("stage not found after update"))?;
            info!(stage_id = %stage.id, "stage updated");
            return Ok(stage);
        }

        let funnel_id = draft
            .funnel_id
            .as_deref()
            .ok_or_else(|| Error::invalid_request("CODFUNIL is required to create a stage"))?;
        let request = SaveRequest::insert(
            &FUNNEL_STAGES,
            vec![
                ("CODFUNIL", funnel_id.into()),
                ("NOME", name.into()),
                ("ORDEM", rank.into()),
                ("COR", color.into()),
                ("ATIVO", erp_flag::YES.into()),
            ],
        )?;
        let outcome = self.gateway.save(&request).await?;
        self.read_after_write.settle().await;

        let stages = self.list_stages(funnel_id).await?;
        let stage = resolve_inserted(stages, outcome.primary_key.as_deref(), |stage| {
            stage.id.as_str()
        })
        .ok_or_else(|| Error::not_found("no stage found after save"))?;
        info!(stage_id = %stage.id, funnel_id, "stage created");
        Ok(stage)
    }

    async fn delete_funnel(&self, funnel_id: &str) -> Result<(), Error> {
        let request = SaveRequest::update(
            &FUNNELS,
            funnel_id,
            vec![
                ("ATIVO", erp_flag::NO.into()),
                ("DATA_ATUALIZACAO", self.today().into()),
            ],
        )?;
        self.gateway.save(&request).await?;
        info!(funnel_id, "funnel deactivated");
        Ok(())
    }

    async fn delete_stage(&self, stage_id: &str) -> Result<(), Error> {
        let request =
            SaveRequest::update(&FUNNEL_STAGES, stage_id, vec![("ATIVO", erp_flag::NO.into())])?;
        self.gateway.save(&request).await?;
        info!(stage_id, "stage deactivated");
        Ok(())
    }

    async fn assign_funnel(&self, funnel_id: &str, user_id: i64) -> Result<(), Error> {
        let request = SaveRequest::insert(
            &FUNNEL_PERMISSIONS,
            vec![
                ("CODFUNIL", funnel_id.into()),
                ("CODUSUARIO", user_id.to_string().into()),
                ("ATIVO", erp_flag::YES.into()),
            ],
        )?;
        self.gateway.save(&request).await?;
        info!(funnel_id, user_id, "funnel granted");
        Ok(())
    }

    async fn remove_funnel_permission(&self, funnel_id: &str, user_id: i64) -> Result<(), Error> {
        let grants = self
            .active_grants(
                Criteria::Eq("CODFUNIL", CriteriaValue::key(funnel_id))
                    .and(Criteria::eq("CODUSUARIO", user_id)),
                &["CODFUNILUSUARIO", "CODFUNIL", "CODUSUARIO"],
            )
            .await?;
        if grants.is_empty() {
            debug!(funnel_id, user_id, "no active grant to remove");
            return Ok(());
        }

        for grant in &grants {
            let request = SaveRequest::update(
                &FUNNEL_PERMISSIONS,
                grant.id.as_str(),
                vec![("ATIVO", erp_flag::NO.into())],
            )?;
            self.gateway.save(&request).await?;
        }
        info!(funnel_id, user_id, removed = grants.len(), "funnel grants revoked");
        Ok(())
    }
}

#[cfg(test)]
#[path = "funnel_service_tests.rs"]
mod tests;
