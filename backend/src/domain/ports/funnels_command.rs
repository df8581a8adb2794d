//! Driving port for funnel writes.

use async_trait::async_trait;

use crate::domain::{Error, Funnel, FunnelDraft, FunnelStage, StageDraft};

/// Domain use-case port for mutating funnels, stages, and grants.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait FunnelsCommand: Send + Sync {
    /// Insert (no key) or update (key present) a funnel and return the stored row.
    async fn save_funnel(&self, draft: FunnelDraft) -> Result<Funnel, Error>;

    /// Insert or update a stage and return the stored row.
    async fn save_stage(&self, draft: StageDraft) -> Result<FunnelStage, Error>;

    /// Soft-delete a funnel.
    async fn delete_funnel(&self, funnel_id: &str) -> Result<(), Error>;

    /// Soft-delete a stage.
    async fn delete_stage(&self, stage_id: &str) -> Result<(), Error>;

    /// Grant `user_id` visibility of `funnel_id`.
    async fn assign_funnel(&self, funnel_id: &str, user_id: i64) -> Result<(), Error>;

    /// Soft-delete every active grant of `funnel_id` to `user_id`.
    async fn remove_funnel_permission(&self, funnel_id: &str, user_id: i64) -> Result<(), Error>;
}
