//! Driving port for lead writes.

use async_trait::async_trait;

use crate::domain::{Error, Lead, LeadDraft};

/// Domain use-case port for mutating leads.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LeadsCommand: Send + Sync {
    /// Insert (no key) or update a lead; `creator_id` becomes the owner on insert.
    async fn save_lead(&self, draft: LeadDraft, creator_id: Option<i64>) -> Result<Lead, Error>;

    /// Move a lead to another stage and return it when it can be re-read.
    async fn update_lead_stage(&self, lead_id: &str, stage_id: &str)
    -> Result<Option<Lead>, Error>;

    /// Soft-delete a lead.
    async fn delete_lead(&self, lead_id: &str) -> Result<(), Error>;
}
